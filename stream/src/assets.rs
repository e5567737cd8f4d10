//! Persisted frame assets: one file per timestep, quantized single-byte
//! samples, named by [`crate::naming`] with a `.raw` extension.
//!
//! Handles are cheap and live for the whole session; the bulk frame data only
//! exists inside the cache window.

use std::io;
use std::path::{Path, PathBuf};

use ndarray::ArrayView3;
use thiserror::Error;

use smokevis_core::geom::IVec4;

use crate::naming;

pub const FRAME_EXTENSION: &str = "raw";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to write frame {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to scan {dir}")]
    Scan {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("series {stem}: found {found} frames, expected {expected}")]
    CountMismatch {
        stem: String,
        expected: usize,
        found: usize,
    },
    #[error("series {stem}: no frame for timestep {index}")]
    Gap { stem: String, index: usize },
}

/// Location of one persisted frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHandle {
    pub path: PathBuf,
    pub name: String,
    pub index: usize,
}

/// Ordered frame handles of one series, one per timestep.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    stem: String,
    frames: Vec<FrameHandle>,
}

impl FrameSequence {
    /// Builds a sequence from loose handles; they are sorted by timestep.
    pub fn new(stem: impl Into<String>, mut frames: Vec<FrameHandle>) -> Self {
        frames.sort_by_key(|f| f.index);
        Self {
            stem: stem.into(),
            frames,
        }
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn handle(&self, index: usize) -> Option<&FrameHandle> {
        self.frames.get(index)
    }

    pub fn handles(&self) -> &[FrameHandle] {
        &self.frames
    }

    /// Writes one file per frame under `dir`. Frames already on disk are kept
    /// as they are, so re-importing a simulation is idempotent.
    pub fn write<'a>(
        dir: &Path,
        stem: &str,
        frames: impl Iterator<Item = &'a [u8]>,
    ) -> Result<Self, AssetError> {
        std::fs::create_dir_all(dir).map_err(|source| AssetError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut handles = Vec::new();
        for (index, frame) in frames.enumerate() {
            let name = naming::frame_name(stem, index);
            let path = dir.join(format!("{name}.{FRAME_EXTENSION}"));
            if path.exists() {
                tracing::debug!(name, "frame already present, skipping");
            } else {
                std::fs::write(&path, frame).map_err(|source| AssetError::Write {
                    path: path.clone(),
                    source,
                })?;
            }
            handles.push(FrameHandle { path, name, index });
        }
        Ok(Self::new(stem, handles))
    }

    /// Recovers a previously written series by scanning `dir` for frames with
    /// this stem. The series must be complete: exactly `expected` frames with
    /// contiguous timestep indices starting at 0.
    pub fn scan(dir: &Path, stem: &str, expected: usize) -> Result<Self, AssetError> {
        let entries = std::fs::read_dir(dir).map_err(|source| AssetError::Scan {
            dir: dir.to_path_buf(),
            source,
        })?;

        let mut frames = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| AssetError::Scan {
                dir: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FRAME_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some((found_stem, index)) = naming::split_index(name) else {
                continue;
            };
            if found_stem != stem {
                continue;
            }
            frames.push(FrameHandle {
                name: name.to_string(),
                path: path.clone(),
                index,
            });
        }

        let sequence = Self::new(stem, frames);
        if sequence.len() != expected {
            return Err(AssetError::CountMismatch {
                stem: stem.to_string(),
                expected,
                found: sequence.len(),
            });
        }
        for (position, frame) in sequence.frames.iter().enumerate() {
            if frame.index != position {
                return Err(AssetError::Gap {
                    stem: stem.to_string(),
                    index: position,
                });
            }
        }
        Ok(sequence)
    }
}

/// 3D view over one volume frame, indexed `[z][y][x]`.
pub fn frame_view(data: &[u8], dimensions: IVec4) -> Option<ArrayView3<'_, u8>> {
    let shape = (
        dimensions.z as usize,
        dimensions.y as usize,
        dimensions.x as usize,
    );
    ArrayView3::from_shape(shape, data).ok()
}
