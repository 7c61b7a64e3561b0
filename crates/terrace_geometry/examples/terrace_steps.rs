use terrace_geometry::{fragment_with_report, generate, sculpt, terrace, GenerationParameters};

fn main() {
    println!("=== Terrace Steps Demo ===\n");

    for params in [GenerationParameters::planar(), GenerationParameters::spherical()] {
        let heights = params.terrace_heights();
        println!("{:?} terrain (seed {}):", params.kind, params.seed);
        println!("  Terrace heights: {:?}", heights.as_slice());

        let base = generate(&params);
        println!("  Base shape: {} vertices, {} triangles", base.vertex_count(), base.triangle_count());

        let (fragmented, report) = fragment_with_report(base, params.depth, params.kind);
        println!(
            "  Fragmented: {} triangles at depth {}/{}{}",
            report.triangle_count,
            report.applied_depth,
            report.requested_depth,
            if report.truncated { " (truncated)" } else { "" }
        );

        let sculpted = sculpt(fragmented, &params);
        let terraced = terrace(sculpted, &heights, &params);
        println!(
            "  Terraced: {} vertices, {} floor + {} wall triangles",
            terraced.buffers.vertex_count(),
            terraced.floor_triangle_count,
            terraced.wall_triangle_count()
        );
        println!(
            "  Buffer size: {} bytes positions, {} bytes indices",
            terraced.buffers.position_bytes().len(),
            terraced.buffers.index_bytes().len()
        );
        println!();
    }
}
