//! Slice header: identical to the volume layout, shifted down one line by the
//! leading `CellCentered` flag.

use std::fmt::Write;

use crate::meta::SliceInfo;

use super::{grid, HeaderError, Lines};

const FIRST_BLOCK: usize = 5;

pub fn parse_slice(text: &str) -> Result<Vec<SliceInfo>, HeaderError> {
    let lines = Lines::new(text);

    let cell_centered = lines.i64_value(0)? != 0;
    let max_value = lines.f32_value(1)?;
    let min_value = lines.f32_value(2)?;
    let mesh_count = lines.usize_value(3)?;

    let quantity = lines.value(lines.len() - 2)?.to_lowercase();
    let scale_factor = lines.f32_value(lines.len() - 1)?;

    let mut meshes = Vec::with_capacity(mesh_count);
    for m in 0..mesh_count {
        let mut info = grid::parse_block(&lines, FIRST_BLOCK + m * grid::BLOCK_LINES)?;
        info.min_value = min_value;
        info.max_value = max_value;
        info.scale_factor = scale_factor;
        info.quantity = quantity.clone();
        meshes.push(SliceInfo {
            grid: info,
            cell_centered,
        });
    }
    Ok(meshes)
}

pub fn serialize_slice(meshes: &[SliceInfo]) -> String {
    let mut out = String::new();
    let first_grid = meshes.first().map(|s| &s.grid);

    let cell_centered = meshes.first().is_some_and(|s| s.cell_centered);
    writeln!(out, "CellCentered: {}", i32::from(cell_centered)).unwrap();
    writeln!(out, "DataValMax: {}", first_grid.map_or(0., |g| g.max_value)).unwrap();
    writeln!(out, "DataValMin: {}", first_grid.map_or(0., |g| g.min_value)).unwrap();
    writeln!(out, "MeshNum: {}", meshes.len()).unwrap();
    writeln!(out, "Meshes:").unwrap();
    for mesh in meshes {
        grid::write_block(&mut out, &mesh.grid);
    }
    writeln!(out, "Quantity: {}", first_grid.map_or("", |g| &g.quantity)).unwrap();
    writeln!(
        out,
        "ScaleFactor: {}",
        first_grid.map_or(1., |g| g.scale_factor)
    )
    .unwrap();
    out
}
