//! Import pipeline: header to typed metadata, raw `.dat` samples to
//! quantized per-timestep frame files on disk.
//!
//! Slices and boundaries normalize into their header value range; volumes
//! carrying a density quantity go through Beer-Lambert instead, so the stored
//! byte is a transmission factor. Frames already on disk are kept, making
//! re-imports cheap.

use std::path::{Path, PathBuf};

use thiserror::Error;

use smokevis_core::convert::{self, ConvertError};
use smokevis_core::formats::dat::{self, DatError, RAW_SAMPLE_BYTES};
use smokevis_core::formats::header::{self, HeaderError};
use smokevis_core::meta::DatasetInfo;

use crate::assets::{AssetError, FrameSequence};
use crate::naming::{self, FrameKind};
use crate::sim::Context;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read header {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid header {path}")]
    Header {
        path: PathBuf,
        #[source]
        source: HeaderError,
    },
    #[error(transparent)]
    Dat(#[from] DatError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// One dataset's metadata plus the frame series written for it. Boundaries
/// produce one series per (quantity, face); slices and volumes produce one.
pub struct ImportedDataset {
    pub info: DatasetInfo,
    pub sequences: Vec<FrameSequence>,
}

/// Imports every dataset a simulation manifest references. A failing dataset
/// is logged and skipped; the rest of the batch still imports.
pub fn import_simulation(
    manifest_path: &Path,
    context: &Context,
) -> Result<Vec<ImportedDataset>, ImportError> {
    let text = read_header(manifest_path)?;
    let manifest = header::parse_simulation(&text).map_err(|source| ImportError::Header {
        path: manifest_path.to_path_buf(),
        source,
    })?;
    let base = header_dir(manifest_path);

    let mut imported = Vec::new();
    for path in &manifest.obstruction_paths {
        match import_boundary(&base.join(path), context) {
            Ok(dataset) => imported.push(dataset),
            Err(error) => tracing::warn!(path = %path, %error, "skipping obstruction"),
        }
    }
    for path in &manifest.slice_paths {
        match import_slice(&base.join(path), context) {
            Ok(datasets) => imported.extend(datasets),
            Err(error) => tracing::warn!(path = %path, %error, "skipping slice"),
        }
    }
    for path in &manifest.volume_paths {
        match import_volume(&base.join(path), context) {
            Ok(datasets) => imported.extend(datasets),
            Err(error) => tracing::warn!(path = %path, %error, "skipping volume"),
        }
    }
    tracing::info!(datasets = imported.len(), "simulation import finished");
    Ok(imported)
}

/// One imported dataset per mesh in the volume header.
pub fn import_volume(
    header_path: &Path,
    context: &Context,
) -> Result<Vec<ImportedDataset>, ImportError> {
    let text = read_header(header_path)?;
    let meshes = header::parse_volume(&text).map_err(|source| ImportError::Header {
        path: header_path.to_path_buf(),
        source,
    })?;
    let base = header_dir(header_path);

    let mut imported = Vec::with_capacity(meshes.len());
    for mesh in meshes {
        let grid = &mesh.grid;
        let values = load_values(&base.join(&grid.data_file_name), grid.total_byte_size())?;
        let bytes = if grid.quantity.contains("density") {
            convert::density_to_transmission(&values, context.extinction_coefficient)
        } else {
            convert::normalize_to_range(&values, grid.min_value, grid.max_value)?
        };

        let frame_size = grid.frame_byte_size() as usize;
        if frame_size == 0 {
            tracing::warn!(name = %grid.canonical_name, "volume mesh has no cells, skipping");
            continue;
        }
        let stem = naming::series_stem(FrameKind::Volume, &grid.canonical_name, None, None);
        let sequence = FrameSequence::write(
            &context.output_dir,
            &stem,
            dat::frames(&bytes, frame_size),
        )?;
        tracing::info!(name = %grid.canonical_name, frames = sequence.len(), "imported volume");
        imported.push(ImportedDataset {
            info: DatasetInfo::Volume(mesh),
            sequences: vec![sequence],
        });
    }
    Ok(imported)
}

pub fn import_slice(
    header_path: &Path,
    context: &Context,
) -> Result<Vec<ImportedDataset>, ImportError> {
    let text = read_header(header_path)?;
    let meshes = header::parse_slice(&text).map_err(|source| ImportError::Header {
        path: header_path.to_path_buf(),
        source,
    })?;
    let base = header_dir(header_path);

    let mut imported = Vec::with_capacity(meshes.len());
    for mesh in meshes {
        let grid = &mesh.grid;
        let values = load_values(&base.join(&grid.data_file_name), grid.total_byte_size())?;
        let bytes = convert::normalize_to_range(&values, grid.min_value, grid.max_value)?;

        let frame_size = grid.frame_byte_size() as usize;
        if frame_size == 0 {
            tracing::warn!(name = %grid.canonical_name, "slice mesh has no cells, skipping");
            continue;
        }
        let stem = naming::series_stem(FrameKind::Slice, &grid.canonical_name, None, None);
        let sequence = FrameSequence::write(
            &context.output_dir,
            &stem,
            dat::frames(&bytes, frame_size),
        )?;
        tracing::info!(name = %grid.canonical_name, frames = sequence.len(), "imported slice");
        imported.push(ImportedDataset {
            info: DatasetInfo::Slice(mesh),
            sequences: vec![sequence],
        });
    }
    Ok(imported)
}

/// One series per (quantity, face): each quantity's data file concatenates
/// the full per-face series in header orientation order.
pub fn import_boundary(
    header_path: &Path,
    context: &Context,
) -> Result<ImportedDataset, ImportError> {
    let text = read_header(header_path)?;
    let name = header_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("boundary");
    let info = header::parse_boundary(&text, name).map_err(|source| ImportError::Header {
        path: header_path.to_path_buf(),
        source,
    })?;
    let base = header_dir(header_path);

    let mut sequences = Vec::new();
    for quantity in &info.quantities {
        let (Some(data_file), Some(&min), Some(&max)) = (
            info.data_file_names.get(quantity),
            info.min_values.get(quantity),
            info.max_values.get(quantity),
        ) else {
            continue;
        };
        let values = load_values(&base.join(data_file), info.total_byte_size())?;
        let bytes = convert::normalize_to_range(&values, min, max)?;

        let mut offset = 0usize;
        for &orientation in &info.orientations {
            let face_len = info.face_byte_size(orientation).unwrap_or(0) as usize;
            let face = &bytes[offset..offset + face_len];
            offset += face_len;

            let frame_size = info.frame_byte_size(orientation).unwrap_or(0) as usize;
            if frame_size == 0 {
                tracing::warn!(name, %orientation, "face has no cells, skipping");
                continue;
            }
            let stem = naming::series_stem(
                FrameKind::Obstruction,
                name,
                Some(quantity.as_str()),
                Some(orientation),
            );
            sequences.push(FrameSequence::write(
                &context.output_dir,
                &stem,
                dat::frames(face, frame_size),
            )?);
        }
    }
    tracing::info!(name, series = sequences.len(), "imported obstruction");
    Ok(ImportedDataset {
        info: DatasetInfo::Boundary(info),
        sequences,
    })
}

/// Loads a `.dat` file of `samples` little-endian f32 values.
fn load_values(path: &Path, samples: i64) -> Result<Vec<f32>, ImportError> {
    let expected = samples as u64 * RAW_SAMPLE_BYTES as u64;
    let raw = dat::load_expected(path, expected)?;
    Ok(dat::decode_f32(&raw))
}

fn read_header(path: &Path) -> Result<String, ImportError> {
    std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn header_dir(path: &Path) -> PathBuf {
    path.parent().unwrap_or(Path::new("")).to_path_buf()
}
