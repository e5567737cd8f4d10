//! Strongly-typed metadata for one imported dataset, as described by its
//! intermediate header file.
//!
//! All quantity names are stored lower-cased and trimmed, so lookups are
//! case-insensitive by construction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geom::{IVec4, Orientation, Vec3F, Vec4F};

/// Every sample in a persisted frame asset is a single quantized byte.
pub const BYTES_PER_SAMPLE: i64 = 1;

/// Metadata shared by slice and volume datasets: one regular grid over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridInfo {
    /// Mesh id the dataset was exported from.
    pub import_name: String,
    /// Name derived from the data file stem, used for frame asset naming.
    pub canonical_name: String,
    /// Spatial extents plus timestep count in `w`; unused spatial axes are 1.
    pub dimensions: IVec4,
    /// Physical cell size per axis plus the emission interval (seconds) in `w`.
    pub spacing: Vec4F,
    /// Physical-space placement offset of the mesh.
    pub mesh_origin: Vec3F,
    /// Smallest value of the quantity over the whole series. Immutable once parsed.
    pub min_value: f32,
    /// Largest value of the quantity over the whole series. Immutable once parsed.
    pub max_value: f32,
    /// Multiplicative factor relating stored quantized values to physical values.
    pub scale_factor: f32,
    /// Physical field the data describes, e.g. "temperature".
    pub quantity: String,
    /// Path of the flat binary frame file, relative to the header.
    pub data_file_name: String,
}

impl GridInfo {
    /// Physical size of the grid, recomputed from spacing and dimensions so it
    /// can never go stale.
    pub fn world_dimensions(&self) -> Vec3F {
        let d = self.dimensions;
        let s = self.spacing;
        Vec3F::new(s.x * d.x as f32, s.y * d.y as f32, s.z * d.z as f32)
    }

    pub fn cell_count(&self) -> i64 {
        self.dimensions.cell_count()
    }

    /// Bytes of one timestep frame.
    pub fn frame_byte_size(&self) -> i64 {
        self.cell_count() * BYTES_PER_SAMPLE
    }

    /// Bytes of the whole series, all timesteps concatenated.
    pub fn total_byte_size(&self) -> i64 {
        self.frame_byte_size() * self.dimensions.w
    }

    pub fn time_count(&self) -> usize {
        self.dimensions.w as usize
    }

    /// Seconds between two emitted timesteps.
    pub fn frame_interval(&self) -> f32 {
        self.spacing.w
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceInfo {
    pub grid: GridInfo,
    pub cell_centered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub grid: GridInfo,
}

/// Boundary (obstruction) datasets store one 2D series per face, and carry
/// several quantities side by side. Faces differ in area, so dimensions and
/// spacings are per-orientation; value ranges are per-quantity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundaryInfo {
    pub canonical_name: String,
    /// Axis-aligned bounding box of the obstruction: x0 x1 y0 y1 z0 z1.
    pub bounding_box: [f32; 6],
    /// Face orientations in header order. The binary data file concatenates
    /// faces in exactly this order, so it must be preserved.
    pub orientations: Vec<Orientation>,
    /// Per-face extents; `w` is the shared timestep count.
    pub dimensions: HashMap<Orientation, IVec4>,
    /// Per-face cell sizes; `w` is the shared emission interval.
    pub spacings: HashMap<Orientation, Vec4F>,
    pub quantities: Vec<String>,
    pub data_file_names: HashMap<String, String>,
    pub min_values: HashMap<String, f32>,
    pub max_values: HashMap<String, f32>,
    pub scale_factors: HashMap<String, f32>,
}

impl BoundaryInfo {
    pub fn world_dimensions(&self, orientation: Orientation) -> Option<Vec3F> {
        let d = self.dimensions.get(&orientation)?;
        let s = self.spacings.get(&orientation)?;
        Some(Vec3F::new(
            s.x * d.x as f32,
            s.y * d.y as f32,
            s.z * d.z as f32,
        ))
    }

    /// Bytes of one timestep frame of one face.
    pub fn frame_byte_size(&self, orientation: Orientation) -> Option<i64> {
        let d = self.dimensions.get(&orientation)?;
        Some(d.x * d.y * BYTES_PER_SAMPLE)
    }

    /// Bytes of one face across all timesteps.
    pub fn face_byte_size(&self, orientation: Orientation) -> Option<i64> {
        let d = self.dimensions.get(&orientation)?;
        Some(d.x * d.y * d.w * BYTES_PER_SAMPLE)
    }

    /// Bytes of one quantity's data file: all faces, all timesteps.
    pub fn total_byte_size(&self) -> i64 {
        self.orientations
            .iter()
            .filter_map(|o| self.face_byte_size(*o))
            .sum()
    }

    pub fn time_count(&self) -> usize {
        self.orientations
            .first()
            .and_then(|o| self.dimensions.get(o))
            .map_or(0, |d| d.w as usize)
    }

    pub fn frame_interval(&self) -> f32 {
        self.orientations
            .first()
            .and_then(|o| self.spacings.get(o))
            .map_or(0., |s| s.w)
    }
}

/// Tagged variant over the three dataset kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DatasetInfo {
    Boundary(BoundaryInfo),
    Slice(SliceInfo),
    Volume(VolumeInfo),
}

impl DatasetInfo {
    pub fn canonical_name(&self) -> &str {
        match self {
            DatasetInfo::Boundary(b) => &b.canonical_name,
            DatasetInfo::Slice(s) => &s.grid.canonical_name,
            DatasetInfo::Volume(v) => &v.grid.canonical_name,
        }
    }

    pub fn time_count(&self) -> usize {
        match self {
            DatasetInfo::Boundary(b) => b.time_count(),
            DatasetInfo::Slice(s) => s.grid.time_count(),
            DatasetInfo::Volume(v) => v.grid.time_count(),
        }
    }

    pub fn frame_interval(&self) -> f32 {
        match self {
            DatasetInfo::Boundary(b) => b.frame_interval(),
            DatasetInfo::Slice(s) => s.grid.frame_interval(),
            DatasetInfo::Volume(v) => v.grid.frame_interval(),
        }
    }
}
