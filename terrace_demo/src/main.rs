mod config;
mod obj;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use config::DemoConfig;
use terrace_pipeline::{FinishedTerrain, GenerationRequest, Orchestrator, TickOutcome};

fn main() {
    println!("=== TERRACE DEMO: STEPPED TERRAIN GENERATOR ===\n");

    if let Err(e) = run() {
        eprintln!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Usage: terrace_demo [config.json] [output_dir]
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => DemoConfig::load(Path::new(&path))?,
        None => DemoConfig::default(),
    };
    let output_dir = args.next().map(PathBuf::from);
    if let Some(dir) = &output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut orchestrator = Orchestrator::new();
    let mut synchronous = Vec::new();
    for job in &config.jobs {
        let id = orchestrator.submit(job.parameters.clone(), job.request);
        if job.request == GenerationRequest::Synchronous {
            synchronous.push(id);
        }
    }
    println!("[QUEUE] {} jobs submitted ({} synchronous)", config.jobs.len(), synchronous.len());

    let mut finished = 0;
    let mut failed = 0;

    for id in synchronous {
        match orchestrator.run_until_ready(id) {
            Ok(_) => {
                let terrain = orchestrator.take_mesh(id)?;
                report(&terrain, output_dir.as_deref())?;
                finished += 1;
            }
            Err(e) => {
                log::error!("Job {} failed: {}", id, e);
                failed += 1;
            }
        }
    }

    let ticks_per_frame = config.ticks_per_frame.max(1);
    let mut frame = 0;
    while orchestrator.has_pending_work() && frame < config.max_frames {
        frame += 1;
        for _ in 0..ticks_per_frame {
            match orchestrator.tick() {
                TickOutcome::Initialized(ids) => {
                    log::debug!("[FRAME {}] Initialized {:?}", frame, ids);
                }
                TickOutcome::Advanced { id, phase } => {
                    log::debug!("[FRAME {}] Job {} -> {}", frame, id, phase);
                }
                TickOutcome::Failed { id, error } => {
                    log::error!("[FRAME {}] Job {} failed: {}", frame, id, error);
                    failed += 1;
                }
                TickOutcome::Idle => break,
            }
        }

        // Hand ready geometry to the mesh builder as soon as it appears
        for id in orchestrator.ready_jobs() {
            let terrain = orchestrator.take_mesh(id)?;
            report(&terrain, output_dir.as_deref())?;
            finished += 1;
        }
    }

    if orchestrator.has_pending_work() {
        log::warn!("Frame limit {} reached with work still pending", config.max_frames);
    }
    for job in orchestrator.jobs() {
        log::debug!(
            "Job {} ({:?}) ended in {} after {} phases",
            job.id(),
            job.request(),
            job.current_phase(),
            job.stats().len()
        );
    }
    orchestrator.remove_finished();

    println!(
        "\n[DONE] {} finished, {} failed, {} frames",
        finished, failed, frame
    );
    Ok(())
}

fn report(terrain: &FinishedTerrain, output_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = &terrain.mesh;
    println!(
        "[MESH] Job {}: {} vertices, {} floor triangles, {} wall triangles",
        terrain.id,
        mesh.buffers.vertex_count(),
        mesh.floor_triangle_count,
        mesh.wall_triangle_count()
    );

    if let Some(fragment) = terrain.fragment_report {
        if fragment.truncated {
            println!(
                "[MESH]   depth {} requested, {} applied (triangle ceiling)",
                fragment.requested_depth, fragment.applied_depth
            );
        }
    }

    if let Err(e) = mesh.buffers.validate() {
        log::warn!("Job {} produced invalid buffers: {}", terrain.id, e);
    }

    if let Some(dir) = output_dir {
        let path = dir.join(format!("terrain_{}.obj", terrain.id.0));
        let mut out = BufWriter::new(File::create(&path)?);
        obj::write_obj(&mut out, terrain)?;
        println!("[MESH]   written to {}", path.display());
    }
    Ok(())
}
