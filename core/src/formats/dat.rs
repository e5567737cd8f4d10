//! Loader for the flat binary frame files referenced by headers.
//!
//! A `.dat` file is the plain concatenation of equally sized frames with no
//! framing or checksums of its own, so the only validation possible is the
//! byte count implied by the header.

use std::io;
use std::path::{Path, PathBuf};
use std::slice::ChunksExact;

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

/// Size of one raw sample in a `.dat` file: little-endian f32, quantized to
/// single bytes only when frame assets are written.
pub const RAW_SAMPLE_BYTES: usize = 4;

#[derive(Debug, Error)]
pub enum DatError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is {actual} bytes, expected at least {expected}")]
    TooShort {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
}

/// Reads a data file and checks it against the size the header promised.
///
/// A short file is a hard error. A long file is only logged; trailing bytes
/// are dropped so downstream frame slicing stays exact.
pub fn load_expected(path: &Path, expected: u64) -> Result<Vec<u8>, DatError> {
    let mut data = std::fs::read(path).map_err(|source| DatError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let actual = data.len() as u64;
    if actual < expected {
        return Err(DatError::TooShort {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    if actual > expected {
        tracing::warn!(
            path = %path.display(),
            expected,
            actual,
            "data file longer than header declares, ignoring trailing bytes"
        );
        data.truncate(expected as usize);
    }
    Ok(data)
}

/// Decodes a raw buffer of little-endian f32 samples. Trailing bytes that do
/// not complete a sample are ignored.
pub fn decode_f32(data: &[u8]) -> Vec<f32> {
    let count = data.len() / RAW_SAMPLE_BYTES;
    let mut out = vec![0f32; count];
    LittleEndian::read_f32_into(&data[..count * RAW_SAMPLE_BYTES], &mut out);
    out
}

/// Fixed-stride iterator over the frames of a loaded data file.
pub fn frames(data: &[u8], frame_size: usize) -> ChunksExact<'_, u8> {
    data.chunks_exact(frame_size)
}

/// One frame by timestep index, `None` past the end of the file.
pub fn frame(data: &[u8], index: usize, frame_size: usize) -> Option<&[u8]> {
    let start = index.checked_mul(frame_size)?;
    data.get(start..start + frame_size)
}
