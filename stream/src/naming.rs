//! Frame asset names.
//!
//! One persisted frame is named
//! `{prefix}_{dataset}[_{quantity}][_Face{orientation}]_Data_t{index}`, with
//! `OT`/`ST`/`VT` for obstruction, slice and volume series. Everything before
//! `_Data_t` is the series stem; the numeric suffix orders the frames.
//! `t10` sorts after `t9`, so lexical ordering is never used.

use smokevis_core::geom::Orientation;

/// Which of the three dataset kinds a frame series belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FrameKind {
    Obstruction,
    Slice,
    Volume,
}

impl FrameKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            FrameKind::Obstruction => "OT",
            FrameKind::Slice => "ST",
            FrameKind::Volume => "VT",
        }
    }
}

/// Stem shared by every frame of one (dataset, quantity, face) series.
///
/// Quantity names may contain spaces; they are flattened to underscores so
/// the stem stays a single path token.
pub fn series_stem(
    kind: FrameKind,
    dataset: &str,
    quantity: Option<&str>,
    orientation: Option<Orientation>,
) -> String {
    let mut stem = format!("{}_{}", kind.prefix(), dataset);
    if let Some(q) = quantity {
        stem.push('_');
        stem.push_str(&q.replace(' ', "_"));
    }
    if let Some(o) = orientation {
        stem.push_str(&format!("_Face{o}"));
    }
    stem
}

pub fn frame_name(stem: &str, index: usize) -> String {
    format!("{stem}_Data_t{index}")
}

/// Splits a frame name (without extension) into its stem and timestep index.
pub fn split_index(name: &str) -> Option<(&str, usize)> {
    let at = name.rfind("_Data_t")?;
    let index = name[at + "_Data_t".len()..].parse().ok()?;
    Some((&name[..at], index))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stems() {
        assert_eq!(
            series_stem(FrameKind::Volume, "demo_smoke", None, None),
            "VT_demo_smoke"
        );
        assert_eq!(
            series_stem(
                FrameKind::Obstruction,
                "obst_1",
                Some("wall temperature"),
                Some(Orientation::NegY),
            ),
            "OT_obst_1_wall_temperature_Face-2"
        );
    }

    #[test]
    fn names_split_back() {
        let name = frame_name("ST_demo_temp_y0", 17);
        assert_eq!(name, "ST_demo_temp_y0_Data_t17");
        assert_eq!(split_index(&name), Some(("ST_demo_temp_y0", 17)));
        assert_eq!(split_index("ST_demo"), None);
        assert_eq!(split_index("ST_demo_Data_tx"), None);
    }

    #[test]
    fn numeric_suffix_orders_frames() {
        let mut names = vec![
            frame_name("VT_smoke", 10),
            frame_name("VT_smoke", 2),
            frame_name("VT_smoke", 9),
        ];
        names.sort_by_key(|n| split_index(n).map(|(_, i)| i));
        assert_eq!(
            names,
            vec!["VT_smoke_Data_t2", "VT_smoke_Data_t9", "VT_smoke_Data_t10"]
        );
    }
}
