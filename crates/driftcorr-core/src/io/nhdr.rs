//! Rewriting of detached NRRD headers with a drift-corrected origin.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{DriftError, Result};
use crate::frame::{Offset3D, ShiftSequence, SpacingVector};

use super::layout::{corrected_header_path, header_path};

const ORIGIN_FIELD: &str = "space origin";
const TYPE_FIELD: &str = "type";
const CORRECTED_TYPE: &str = "ushort";

/// A detached NRRD header, kept line by line so unknown fields survive a
/// rewrite untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct NrrdHeader {
    lines: Vec<String>,
}

impl NrrdHeader {
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<String> = text.lines().map(str::to_owned).collect();
        match lines.first() {
            Some(magic) if magic.starts_with("NRRD") => Ok(Self { lines }),
            _ => Err(DriftError::InvalidInput(
                "not a NRRD header: missing NRRD magic line".into(),
            )),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }

    fn field_index(&self, key: &str) -> Option<usize> {
        self.lines.iter().position(|line| {
            split_field(line).is_some_and(|(k, _)| k.eq_ignore_ascii_case(key))
        })
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.field_index(key)
            .and_then(|i| split_field(&self.lines[i]))
            .map(|(_, v)| v)
    }

    /// Replace a field in place, or append it after the last field.
    pub fn set_field(&mut self, key: &str, value: &str) {
        let line = format!("{}: {}", key, value);
        match self.field_index(key) {
            Some(i) => self.lines[i] = line,
            None => {
                let at = self
                    .lines
                    .iter()
                    .rposition(|l| split_field(l).is_some())
                    .map_or(self.lines.len(), |i| i + 1);
                self.lines.insert(at, line);
            }
        }
    }

    /// Per-axis voxel spacing, from `spacings` or the lengths of the
    /// `space directions` vectors.
    pub fn spacing(&self) -> Result<SpacingVector> {
        let values: Vec<f64> = if let Some(s) = self.field("spacings") {
            s.split_whitespace()
                .filter(|t| !t.eq_ignore_ascii_case("nan"))
                .map(parse_number)
                .collect::<Result<_>>()?
        } else if let Some(d) = self.field("space directions") {
            parse_directions(d)?
        } else {
            return Err(DriftError::InvalidInput(
                "header has neither spacings nor space directions".into(),
            ));
        };

        match values.as_slice() {
            [xs, ys, zs] => Ok(SpacingVector {
                xs: *xs,
                ys: *ys,
                zs: *zs,
            }),
            _ => Err(DriftError::InvalidInput(format!(
                "expected 3 spatial axes, found {}",
                values.len()
            ))),
        }
    }

    /// Set the space origin to `origin` and the sample type to `ushort`.
    pub fn apply_origin(&mut self, origin: [f64; 3]) {
        if self.field("space").is_none() && self.field("space dimension").is_none() {
            self.set_field("space dimension", "3");
        }
        self.set_field(
            ORIGIN_FIELD,
            &format!("({},{},{})", origin[0], origin[1], origin[2]),
        );
        self.set_field(TYPE_FIELD, CORRECTED_TYPE);
    }
}

impl fmt::Display for NrrdHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// `key: value`; comments and `key:=value` pairs are not fields.
fn split_field(line: &str) -> Option<(&str, &str)> {
    if line.starts_with('#') || line.contains(":=") {
        return None;
    }
    let (key, value) = line.split_once(": ")?;
    Some((key.trim(), value.trim()))
}

fn parse_number(token: &str) -> Result<f64> {
    token
        .trim()
        .parse::<f64>()
        .map_err(|_| DriftError::InvalidInput(format!("not a number: {:?}", token)))
}

/// Norms of the `(a, b, c)` vectors; `none` axes are skipped.
///
/// Vectors may carry spaces after their commas, so the value is split on the
/// parenthesised groups rather than on whitespace.
fn parse_directions(value: &str) -> Result<Vec<f64>> {
    let mut norms = Vec::new();
    for group in value.split(')') {
        let group = group.trim();
        if group.is_empty() {
            continue;
        }
        let (prefix, vector) = match group.split_once('(') {
            Some((prefix, vector)) => (prefix, Some(vector)),
            None => (group, None),
        };
        for token in prefix.split_whitespace() {
            if !token.eq_ignore_ascii_case("none") {
                return Err(DriftError::InvalidInput(format!(
                    "unexpected token in space directions: {:?}",
                    token
                )));
            }
        }
        if let Some(vector) = vector {
            let components = vector
                .split(',')
                .map(parse_number)
                .collect::<Result<Vec<f64>>>()?;
            norms.push(components.iter().map(|c| c * c).sum::<f64>().sqrt());
        }
    }
    Ok(norms)
}

/// Outcome of rewriting the headers of a sequence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NhdrReport {
    pub written: Vec<PathBuf>,
    /// Frames whose header was absent or unusable.
    pub skipped: Vec<usize>,
}

/// Writes `<NNN>-corr.nhdr` next to every `<NNN>.nhdr` in a directory.
pub struct NhdrOffsetWriter {
    dir: PathBuf,
}

impl NhdrOffsetWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Rewrite one frame's header with `offset` (in voxels) as its origin.
    pub fn write_frame(&self, frame: usize, offset: Offset3D) -> Result<PathBuf> {
        let src = header_path(&self.dir, frame);
        let mut header = NrrdHeader::load(&src)?;
        let origin = header.spacing()?.scale(offset);
        header.apply_origin(origin);
        let dst = corrected_header_path(&self.dir, frame);
        header.save(&dst)?;
        Ok(dst)
    }

    /// Rewrite the header of every frame in `offsets`. Missing headers are
    /// logged and skipped.
    pub fn write_all(&self, offsets: &ShiftSequence) -> NhdrReport {
        let mut report = NhdrReport::default();
        for (frame, &offset) in offsets.iter().enumerate() {
            let src = header_path(&self.dir, frame);
            if !src.exists() {
                warn!(path = %src.display(), "Header does not exist");
                report.skipped.push(frame);
                continue;
            }
            match self.write_frame(frame, offset) {
                Ok(path) => report.written.push(path),
                Err(e) => {
                    warn!(path = %src.display(), error = %e, "Header rewrite failed");
                    report.skipped.push(frame);
                }
            }
        }
        info!(
            written = report.written.len(),
            skipped = report.skipped.len(),
            "Headers rewritten"
        );
        report
    }
}
