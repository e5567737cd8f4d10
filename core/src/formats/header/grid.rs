//! The per-mesh block shared by slice and volume headers: five `key: value`
//! lines at a fixed stride, in any order within the block.

use std::fmt::Write;

use crate::geom::{IVec4, Vec3F, Vec4F};
use crate::meta::GridInfo;

use super::{HeaderError, Lines};

pub(super) const BLOCK_LINES: usize = 5;

/// Parses one mesh block starting at `start`. The shared header fields
/// (value range, quantity, scale factor) are filled in by the caller.
pub(super) fn parse_block(lines: &Lines, start: usize) -> Result<GridInfo, HeaderError> {
    let mut info = GridInfo {
        import_name: String::new(),
        canonical_name: String::new(),
        dimensions: IVec4::default(),
        spacing: Vec4F::default(),
        mesh_origin: Vec3F::ZERO,
        min_value: 0.,
        max_value: 0.,
        scale_factor: 1.,
        quantity: String::new(),
        data_file_name: String::new(),
    };

    for line in start..start + BLOCK_LINES {
        let (key, value) = lines.entry(line)?;
        match key {
            "Mesh" => info.import_name = value.to_string(),
            "MeshPos" => {
                let [x, y, z] = lines.f32_values::<3>(line)?;
                info.mesh_origin = Vec3F::new(x, y, z);
            }
            "DimSize" => {
                let [w, x, y, z] = lines.i64_values::<4>(line)?;
                info.dimensions = IVec4::new(x, y, z, w);
            }
            "Spacing" => {
                let [w, x, y, z] = lines.f32_values::<4>(line)?;
                info.spacing = Vec4F::new(x, y, z, w);
            }
            "DataFile" => info.data_file_name = value.to_string(),
            _ => {
                return Err(HeaderError::UnknownKey {
                    line,
                    key: key.to_string(),
                })
            }
        }
    }

    info.canonical_name = super::file_stem(&info.data_file_name).to_string();
    Ok(info)
}

pub(super) fn write_block(out: &mut String, info: &GridInfo) {
    let d = info.dimensions;
    let s = info.spacing;
    let p = info.mesh_origin;
    // Unwrap is fine, writing to a String cannot fail.
    writeln!(out, "Mesh: {}", info.import_name).unwrap();
    writeln!(out, "MeshPos: {} {} {}", p.x, p.y, p.z).unwrap();
    writeln!(out, "DimSize: {} {} {} {}", d.w, d.x, d.y, d.z).unwrap();
    writeln!(out, "Spacing: {} {} {} {}", s.w, s.x, s.y, s.z).unwrap();
    writeln!(out, "DataFile: {}", info.data_file_name).unwrap();
}
