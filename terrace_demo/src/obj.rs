use std::io::{self, Write};

use terrace_pipeline::FinishedTerrain;

/// Write finished terrain as Wavefront OBJ, floor and walls as separate groups
pub fn write_obj<W: Write>(out: &mut W, terrain: &FinishedTerrain) -> io::Result<()> {
    let mesh = &terrain.mesh;

    writeln!(out, "# terrace_demo job {}", terrain.id)?;
    writeln!(
        out,
        "# {} vertices, {} floor triangles, {} wall triangles",
        mesh.buffers.vertex_count(),
        mesh.floor_triangle_count,
        mesh.wall_triangle_count()
    )?;

    for p in &mesh.buffers.positions {
        writeln!(out, "v {} {} {}", p[0], p[1], p[2])?;
    }

    write_group(out, "floor", mesh.floor_indices())?;
    write_group(out, "walls", mesh.wall_indices())?;
    Ok(())
}

fn write_group<W: Write>(out: &mut W, name: &str, indices: &[u32]) -> io::Result<()> {
    if indices.is_empty() {
        return Ok(());
    }

    writeln!(out, "g {}", name)?;
    // OBJ indices are 1-based
    for tri in indices.chunks_exact(3) {
        writeln!(out, "f {} {} {}", tri[0] + 1, tri[1] + 1, tri[2] + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrace_geometry::{MeshBuffers, TerracedMesh};
    use terrace_pipeline::JobId;

    #[test]
    fn test_obj_groups() {
        let buffers = MeshBuffers::new(
            vec![[0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 0.0, 0.0]],
            vec![0, 2, 1, 1, 2, 3],
        );
        let terrain = FinishedTerrain {
            id: JobId(3),
            mesh: TerracedMesh {
                buffers,
                floor_triangle_count: 1,
            },
            fragment_report: None,
        };

        let mut out = Vec::new();
        write_obj(&mut out, &terrain).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.iter().filter(|l| l.starts_with("v ")).count(), 4);
        let floor = lines.iter().position(|l| *l == "g floor").unwrap();
        let walls = lines.iter().position(|l| *l == "g walls").unwrap();
        assert_eq!(lines[floor + 1], "f 1 3 2");
        assert_eq!(lines[walls + 1], "f 2 3 4");
        assert!(floor < walls);
    }
}
