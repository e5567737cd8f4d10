//! Boundary header: one obstruction with several faces and several
//! quantities. Face geometry blocks come first, then one block per quantity
//! pointing at that quantity's data file; the shared timestep count closes
//! the file.
//!
//! ```text
//! BoundingBox: 0 2 0 1 0 1
//! NumOrientations: 2
//! NumQuantities: 1
//! Orientations:
//! <3 lines per face>
//! Quantities:
//! <5 lines per quantity>
//! TimeSteps: 120
//! ```

use std::fmt::Write;

use crate::geom::{IVec4, Orientation, Vec4F};
use crate::meta::BoundaryInfo;

use super::{HeaderError, Lines};

const FIRST_ORIENTATION: usize = 4;
const ORIENTATION_LINES: usize = 3;
const QUANTITY_LINES: usize = 5;

/// `name` is the header's own file stem; boundary data files are per
/// quantity, so the dataset name cannot be derived from them.
pub fn parse_boundary(text: &str, name: &str) -> Result<BoundaryInfo, HeaderError> {
    let lines = Lines::new(text);

    let mut info = BoundaryInfo {
        canonical_name: name.to_string(),
        bounding_box: lines.f32_values::<6>(0)?,
        ..Default::default()
    };
    let orientation_count = lines.usize_value(1)?;
    let quantity_count = lines.usize_value(2)?;

    let first_quantity = FIRST_ORIENTATION + 1 + orientation_count * ORIENTATION_LINES;
    let time_steps = lines.i64_value(first_quantity + quantity_count * QUANTITY_LINES)?;

    for o in 0..orientation_count {
        let start = FIRST_ORIENTATION + o * ORIENTATION_LINES;
        let id = lines.i64_value(start)? as i32;
        let orientation = Orientation::from_id(id)
            .ok_or(HeaderError::InvalidOrientation { line: start, id })?;
        let [x, y] = lines.i64_values::<2>(start + 1)?;
        let [w, sx, sy] = lines.f32_values::<3>(start + 2)?;

        info.orientations.push(orientation);
        info.dimensions
            .insert(orientation, IVec4::new(x, y, 1, time_steps));
        info.spacings.insert(orientation, Vec4F::new(sx, sy, 0., w));
    }

    for q in 0..quantity_count {
        let start = first_quantity + q * QUANTITY_LINES;
        let quantity = lines.value(start)?.to_lowercase();
        let data_file = lines.value(start + 1)?.to_string();
        let max_value = lines.f32_value(start + 2)?;
        let min_value = lines.f32_value(start + 3)?;
        let scale_factor = lines.f32_value(start + 4)?;

        info.data_file_names.insert(quantity.clone(), data_file);
        info.max_values.insert(quantity.clone(), max_value);
        info.min_values.insert(quantity.clone(), min_value);
        info.scale_factors.insert(quantity.clone(), scale_factor);
        info.quantities.push(quantity);
    }

    Ok(info)
}

pub fn serialize_boundary(info: &BoundaryInfo) -> String {
    let mut out = String::new();
    let b = info.bounding_box;
    writeln!(
        out,
        "BoundingBox: {} {} {} {} {} {}",
        b[0], b[1], b[2], b[3], b[4], b[5]
    )
    .unwrap();
    writeln!(out, "NumOrientations: {}", info.orientations.len()).unwrap();
    writeln!(out, "NumQuantities: {}", info.quantities.len()).unwrap();
    writeln!(out, "Orientations:").unwrap();
    for o in &info.orientations {
        let d = info.dimensions.get(o).copied().unwrap_or_default();
        let s = info.spacings.get(o).copied().unwrap_or_default();
        writeln!(out, "BoundaryOrientation: {o}").unwrap();
        writeln!(out, "DimSize: {} {}", d.x, d.y).unwrap();
        writeln!(out, "Spacing: {} {} {}", s.w, s.x, s.y).unwrap();
    }
    writeln!(out, "Quantities:").unwrap();
    for q in &info.quantities {
        writeln!(out, "Quantity: {q}").unwrap();
        writeln!(
            out,
            "DataFile: {}",
            info.data_file_names.get(q).map_or("", String::as_str)
        )
        .unwrap();
        writeln!(out, "MaxValue: {}", info.max_values.get(q).unwrap_or(&0.)).unwrap();
        writeln!(out, "MinValue: {}", info.min_values.get(q).unwrap_or(&0.)).unwrap();
        writeln!(
            out,
            "ScaleFactor: {}",
            info.scale_factors.get(q).unwrap_or(&1.)
        )
        .unwrap();
    }
    writeln!(out, "TimeSteps: {}", info.time_count()).unwrap();
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::Vec3F;

    const HEADER: &str = "\
BoundingBox: 0 2 0 1 0 1
NumOrientations: 2
NumQuantities: 2
Orientations:
BoundaryOrientation: -1
DimSize: 4 6
Spacing: 0.1 0.5 0.5
BoundaryOrientation: 3
DimSize: 8 2
Spacing: 0.1 0.25 0.25
Quantities:
Quantity: WALL TEMPERATURE
DataFile: obst_1_temp.dat
MaxValue: 350
MinValue: 20
ScaleFactor: 0.77
Quantity: RADIATIVE HEAT FLUX
DataFile: obst_1_rad.dat
MaxValue: 15
MinValue: 0
ScaleFactor: 17
TimeSteps: 120
";

    #[test]
    fn parses_faces_and_quantities() {
        let info = parse_boundary(HEADER, "obst_1").unwrap();
        assert_eq!(info.canonical_name, "obst_1");
        assert_eq!(
            info.orientations,
            vec![Orientation::NegX, Orientation::PosZ]
        );
        assert_eq!(
            info.dimensions[&Orientation::NegX],
            IVec4::new(4, 6, 1, 120)
        );
        assert_eq!(
            info.spacings[&Orientation::PosZ],
            Vec4F::new(0.25, 0.25, 0., 0.1)
        );
        assert_eq!(info.quantities, vec!["wall temperature", "radiative heat flux"]);
        assert_eq!(info.max_values["wall temperature"], 350.);
        assert_eq!(info.data_file_names["radiative heat flux"], "obst_1_rad.dat");
        assert_eq!(info.time_count(), 120);
        assert_eq!(info.frame_interval(), 0.1);
    }

    #[test]
    fn derived_sizes() {
        let info = parse_boundary(HEADER, "obst_1").unwrap();
        assert_eq!(info.frame_byte_size(Orientation::NegX), Some(24));
        assert_eq!(info.face_byte_size(Orientation::PosZ), Some(16 * 120));
        assert_eq!(info.total_byte_size(), (24 + 16) * 120);
        assert_eq!(
            info.world_dimensions(Orientation::NegX),
            Some(Vec3F::new(2., 3., 0.))
        );
    }

    #[test]
    fn unknown_orientation_id_is_rejected() {
        let bad = HEADER.replace("BoundaryOrientation: -1", "BoundaryOrientation: 4");
        assert_eq!(
            parse_boundary(&bad, "obst_1"),
            Err(HeaderError::InvalidOrientation { line: 4, id: 4 })
        );
    }

    #[test]
    fn roundtrips() {
        let info = parse_boundary(HEADER, "obst_1").unwrap();
        let text = serialize_boundary(&info);
        assert_eq!(parse_boundary(&text, "obst_1").unwrap(), info);
    }
}
