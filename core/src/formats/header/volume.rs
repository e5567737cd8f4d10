//! Volume header: value range and mesh count up front, one block per mesh,
//! shared quantity and scale factor on the trailing two lines.
//!
//! ```text
//! DataValMax: 1.7
//! DataValMin: 0
//! MeshNum: 2
//! Meshes:
//! <5 lines per mesh>
//! Quantity: soot density
//! ScaleFactor: 150
//! ```

use std::fmt::Write;

use crate::meta::VolumeInfo;

use super::{grid, HeaderError, Lines};

const FIRST_BLOCK: usize = 4;

pub fn parse_volume(text: &str) -> Result<Vec<VolumeInfo>, HeaderError> {
    let lines = Lines::new(text);

    let max_value = lines.f32_value(0)?;
    let min_value = lines.f32_value(1)?;
    let mesh_count = lines.usize_value(2)?;

    // The leading reads guarantee at least three lines at this point.
    let quantity = lines.value(lines.len() - 2)?.to_lowercase();
    let scale_factor = lines.f32_value(lines.len() - 1)?;

    let mut meshes = Vec::with_capacity(mesh_count);
    for m in 0..mesh_count {
        let mut info = grid::parse_block(&lines, FIRST_BLOCK + m * grid::BLOCK_LINES)?;
        info.min_value = min_value;
        info.max_value = max_value;
        info.scale_factor = scale_factor;
        info.quantity = quantity.clone();
        meshes.push(VolumeInfo { grid: info });
    }
    Ok(meshes)
}

/// Inverse of [`parse_volume`]. The shared lines are taken from the first
/// mesh; all meshes of one dataset carry the same range, quantity and scale.
pub fn serialize_volume(meshes: &[VolumeInfo]) -> String {
    let mut out = String::new();
    let first = meshes.first().map(|v| &v.grid);

    let max = first.map_or(0., |g| g.max_value);
    let min = first.map_or(0., |g| g.min_value);
    writeln!(out, "DataValMax: {max}").unwrap();
    writeln!(out, "DataValMin: {min}").unwrap();
    writeln!(out, "MeshNum: {}", meshes.len()).unwrap();
    writeln!(out, "Meshes:").unwrap();
    for mesh in meshes {
        grid::write_block(&mut out, &mesh.grid);
    }
    writeln!(out, "Quantity: {}", first.map_or("", |g| &g.quantity)).unwrap();
    writeln!(out, "ScaleFactor: {}", first.map_or(1., |g| g.scale_factor)).unwrap();
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::{IVec4, Vec3F, Vec4F};

    const HEADER: &str = "\
DataValMax: 1.7
DataValMin: 0
MeshNum: 2
Meshes:
Mesh: Mesh01
MeshPos: 0 0 0
DimSize: 120 20 30 40
Spacing: 0.1 0.5 0.5 0.25
DataFile: demo_smoke.dat
Mesh: Mesh02
MeshPos: 10 0 0
DimSize: 120 20 30 40
Spacing: 0.1 0.5 0.5 0.25
DataFile: demo_smoke_2.dat
Quantity: Soot Density
ScaleFactor: 150
";

    #[test]
    fn parses_meshes_and_shared_lines() {
        let meshes = parse_volume(HEADER).unwrap();
        assert_eq!(meshes.len(), 2);

        let g = &meshes[0].grid;
        assert_eq!(g.import_name, "Mesh01");
        assert_eq!(g.canonical_name, "demo_smoke");
        assert_eq!(g.dimensions, IVec4::new(20, 30, 40, 120));
        assert_eq!(g.spacing, Vec4F::new(0.5, 0.5, 0.25, 0.1));
        assert_eq!(g.max_value, 1.7);
        assert_eq!(g.scale_factor, 150.);
        // Quantities compare lower-cased.
        assert_eq!(g.quantity, "soot density");

        assert_eq!(meshes[1].grid.mesh_origin, Vec3F::new(10., 0., 0.));
        assert_eq!(meshes[1].grid.canonical_name, "demo_smoke_2");
    }

    #[test]
    fn blank_lines_do_not_shift_offsets() {
        let spaced = HEADER.replace("Meshes:\n", "Meshes:\n\n\n");
        assert_eq!(parse_volume(&spaced).unwrap(), parse_volume(HEADER).unwrap());
    }

    #[test]
    fn truncated_header_is_rejected() {
        let lines: Vec<&str> = HEADER.lines().take(7).collect();
        assert!(parse_volume(&lines.join("\n")).is_err());
    }

    #[test]
    fn roundtrips() {
        let meshes = parse_volume(HEADER).unwrap();
        let text = serialize_volume(&meshes);
        assert_eq!(parse_volume(&text).unwrap(), meshes);
    }
}
