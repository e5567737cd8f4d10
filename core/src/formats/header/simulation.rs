//! Simulation manifest: three counts, then bulleted paths to the per-dataset
//! headers, grouped by kind.
//!
//! ```text
//! NumObstructions: 2
//! NumSlices: 1
//! NumVolumes: 1
//! Obstructions:
//! - obst_1.yaml
//! - obst_2.yaml
//! Slices:
//! - slice_1.yaml
//! Volumes:
//! - smoke.yaml
//! ```

use std::fmt::Write;

use super::{HeaderError, Lines};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimulationManifest {
    pub obstruction_paths: Vec<String>,
    pub slice_paths: Vec<String>,
    pub volume_paths: Vec<String>,
}

pub fn parse_simulation(text: &str) -> Result<SimulationManifest, HeaderError> {
    let lines = Lines::new(text);

    let obstruction_count = lines.usize_value(0)?;
    let slice_count = lines.usize_value(1)?;
    let volume_count = lines.usize_value(2)?;

    let mut manifest = SimulationManifest::default();
    for i in 0..obstruction_count {
        manifest.obstruction_paths.push(bullet(&lines, 4 + i)?);
    }
    for i in 0..slice_count {
        manifest
            .slice_paths
            .push(bullet(&lines, 5 + obstruction_count + i)?);
    }
    for i in 0..volume_count {
        manifest
            .volume_paths
            .push(bullet(&lines, 6 + obstruction_count + slice_count + i)?);
    }
    Ok(manifest)
}

/// Strips the `- ` list prefix. Two characters are dropped unconditionally,
/// matching the writer side of the format.
fn bullet(lines: &Lines, line: usize) -> Result<String, HeaderError> {
    let raw = lines.raw(line)?;
    Ok(raw.get(2..).unwrap_or("").to_string())
}

pub fn serialize_simulation(manifest: &SimulationManifest) -> String {
    let mut out = String::new();
    writeln!(out, "NumObstructions: {}", manifest.obstruction_paths.len()).unwrap();
    writeln!(out, "NumSlices: {}", manifest.slice_paths.len()).unwrap();
    writeln!(out, "NumVolumes: {}", manifest.volume_paths.len()).unwrap();
    writeln!(out, "Obstructions:").unwrap();
    for path in &manifest.obstruction_paths {
        writeln!(out, "- {path}").unwrap();
    }
    writeln!(out, "Slices:").unwrap();
    for path in &manifest.slice_paths {
        writeln!(out, "- {path}").unwrap();
    }
    writeln!(out, "Volumes:").unwrap();
    for path in &manifest.volume_paths {
        writeln!(out, "- {path}").unwrap();
    }
    out
}
