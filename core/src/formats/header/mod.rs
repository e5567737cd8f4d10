//! Parsers for the line-positional text headers written by the external
//! preprocessing script, one per dataset kind, plus the simulation manifest.
//!
//! The format is strictly positional: section offsets are computed
//! arithmetically from counts declared in the leading lines, and blocks have a
//! fixed line stride. There are no key-driven sections and no reordering —
//! changing the layout breaks every previously exported dataset, so the
//! offsets below are part of the on-disk contract. Empty lines are culled
//! before indexing, matching the original consumer of the format.
//!
//! Each parser is a pure function of the input text and fails with a
//! [`HeaderError`] carrying the 0-based (culled) line number.

mod boundary;
mod grid;
mod simulation;
mod slice;
mod volume;

pub use boundary::{parse_boundary, serialize_boundary};
pub use simulation::{parse_simulation, serialize_simulation, SimulationManifest};
pub use slice::{parse_slice, serialize_slice};
pub use volume::{parse_volume, serialize_volume};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum HeaderError {
    #[error("header ends after {len} lines, expected a line at index {line}")]
    MissingLine { line: usize, len: usize },
    #[error("line {line}: expected a `key: value` entry")]
    MissingSeparator { line: usize },
    #[error("line {line}: malformed integer {value:?}")]
    MalformedInt { line: usize, value: String },
    #[error("line {line}: malformed float {value:?}")]
    MalformedFloat { line: usize, value: String },
    #[error("line {line}: unknown key {key:?}")]
    UnknownKey { line: usize, key: String },
    #[error("line {line}: invalid face orientation id {id}")]
    InvalidOrientation { line: usize, id: i32 },
    #[error("line {line}: expected {expected} values, found {found}")]
    WrongValueCount {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Indexed view over the non-empty lines of a header file.
pub(crate) struct Lines<'a> {
    lines: Vec<&'a str>,
}

impl<'a> Lines<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text
                .lines()
                .map(str::trim_end)
                .filter(|l| !l.trim().is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn raw(&self, line: usize) -> Result<&'a str, HeaderError> {
        self.lines.get(line).copied().ok_or(HeaderError::MissingLine {
            line,
            len: self.lines.len(),
        })
    }

    /// Splits `key: value` at the first `": "` separator.
    pub fn entry(&self, line: usize) -> Result<(&'a str, &'a str), HeaderError> {
        let raw = self.raw(line)?;
        raw.split_once(": ")
            .map(|(k, v)| (k.trim(), v.trim()))
            .ok_or(HeaderError::MissingSeparator { line })
    }

    pub fn value(&self, line: usize) -> Result<&'a str, HeaderError> {
        Ok(self.entry(line)?.1)
    }

    pub fn f32_value(&self, line: usize) -> Result<f32, HeaderError> {
        parse_f32(self.value(line)?, line)
    }

    pub fn i64_value(&self, line: usize) -> Result<i64, HeaderError> {
        parse_i64(self.value(line)?, line)
    }

    pub fn usize_value(&self, line: usize) -> Result<usize, HeaderError> {
        let v = self.i64_value(line)?;
        usize::try_from(v).map_err(|_| HeaderError::MalformedInt {
            line,
            value: v.to_string(),
        })
    }

    /// Whitespace-separated floats, exactly `N` of them.
    pub fn f32_values<const N: usize>(&self, line: usize) -> Result<[f32; N], HeaderError> {
        let fields = self.fields::<N>(line)?;
        let mut out = [0f32; N];
        for (slot, field) in out.iter_mut().zip(fields) {
            *slot = parse_f32(field, line)?;
        }
        Ok(out)
    }

    /// Whitespace-separated integers, exactly `N` of them.
    pub fn i64_values<const N: usize>(&self, line: usize) -> Result<[i64; N], HeaderError> {
        let fields = self.fields::<N>(line)?;
        let mut out = [0i64; N];
        for (slot, field) in out.iter_mut().zip(fields) {
            *slot = parse_i64(field, line)?;
        }
        Ok(out)
    }

    fn fields<const N: usize>(&self, line: usize) -> Result<[&'a str; N], HeaderError> {
        let value = self.value(line)?;
        let fields: Vec<&str> = value.split_whitespace().collect();
        fields
            .try_into()
            .map_err(|fields: Vec<&str>| HeaderError::WrongValueCount {
                line,
                expected: N,
                found: fields.len(),
            })
    }
}

pub(crate) fn parse_f32(value: &str, line: usize) -> Result<f32, HeaderError> {
    value.parse().map_err(|_| HeaderError::MalformedFloat {
        line,
        value: value.to_string(),
    })
}

pub(crate) fn parse_i64(value: &str, line: usize) -> Result<i64, HeaderError> {
    value.parse().map_err(|_| HeaderError::MalformedInt {
        line,
        value: value.to_string(),
    })
}

/// File name without directory and extension, tolerant of both separators.
pub fn file_stem(path: &str) -> &str {
    let name = path
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(path);
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn culls_empty_lines() {
        let lines = Lines::new("a: 1\n\r\n\nb: 2\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.entry(1).unwrap(), ("b", "2"));
    }

    #[test]
    fn missing_line_reports_length() {
        let lines = Lines::new("a: 1");
        assert_eq!(
            lines.raw(3),
            Err(HeaderError::MissingLine { line: 3, len: 1 })
        );
    }

    #[test]
    fn vector_values() {
        let lines = Lines::new("Spacing: 0.1 0.5 0.5 0.25");
        assert_eq!(lines.f32_values::<4>(0).unwrap(), [0.1, 0.5, 0.5, 0.25]);
        assert!(matches!(
            lines.f32_values::<3>(0),
            Err(HeaderError::WrongValueCount { expected: 3, found: 4, .. })
        ));
    }

    #[test]
    fn file_stem_strips_dirs_and_extension() {
        assert_eq!(file_stem("out/smoke/demo_smoke.dat"), "demo_smoke");
        assert_eq!(file_stem("C:\\out\\demo.dat"), "demo");
        assert_eq!(file_stem("plain"), "plain");
    }
}
