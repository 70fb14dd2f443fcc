use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{DriftError, Result};
use crate::frame::{Offset3D, PairwiseShift, ShiftSequence};

use super::layout::shift_record_path;

/// Write a pairwise shift as a single `x y z frame` line.
pub fn write_shift_record(path: &Path, shift: &PairwiseShift) -> Result<()> {
    let [x, y, z, frame] = shift.to_record();
    fs::write(path, format!("{} {} {} {}\n", x, y, z, frame))?;
    debug!(path = %path.display(), "Shift record written");
    Ok(())
}

/// Parse an `x y z [frame]` record. A missing frame column defaults to
/// `fallback_frame`.
pub fn parse_shift_record(text: &str, fallback_frame: usize) -> Result<PairwiseShift> {
    let values = text
        .split_whitespace()
        .map(|t| {
            t.parse::<f64>()
                .map_err(|_| DriftError::InvalidInput(format!("not a number: {:?}", t)))
        })
        .collect::<Result<Vec<f64>>>()?;

    let (shift, frame) = match values.as_slice() {
        [x, y, z] => (Offset3D::new(*x, *y, *z), fallback_frame),
        [x, y, z, f] => {
            if !(f.fract() == 0.0 && *f >= 0.0) {
                return Err(DriftError::InvalidInput(format!(
                    "frame column must be a non-negative integer, got {}",
                    f
                )));
            }
            (Offset3D::new(*x, *y, *z), *f as usize)
        }
        _ => {
            return Err(DriftError::InvalidInput(format!(
                "expected 3 or 4 values in shift record, got {}",
                values.len()
            )))
        }
    };
    if shift.components().iter().any(|v| !v.is_finite()) {
        return Err(DriftError::InvalidInput(
            "shift record holds a non-finite value".into(),
        ));
    }
    Ok(PairwiseShift { frame, shift })
}

pub fn read_shift_record(path: &Path, fallback_frame: usize) -> Result<PairwiseShift> {
    let text = fs::read_to_string(path)?;
    parse_shift_record(&text, fallback_frame)
}

/// Shift records of frames `0..=last` in `dir`.
///
/// Absent or unreadable records are logged and skipped; integration treats
/// them as missing data.
pub fn read_shift_records(dir: &Path, last: usize) -> Vec<PairwiseShift> {
    let mut records = Vec::with_capacity(last + 1);
    for frame in 0..=last {
        let path = shift_record_path(dir, frame);
        if !path.exists() {
            warn!(path = %path.display(), "Shift record does not exist");
            continue;
        }
        match read_shift_record(&path, frame) {
            Ok(record) => records.push(record),
            Err(e) => warn!(path = %path.display(), error = %e, "Unreadable shift record"),
        }
    }
    records
}

/// Write one `x y z` line per frame.
pub fn write_offsets(path: &Path, offsets: &ShiftSequence) -> Result<()> {
    let mut text = String::new();
    for o in offsets {
        text.push_str(&format!("{} {} {}\n", o.dx, o.dy, o.dz));
    }
    fs::write(path, text)?;
    debug!(path = %path.display(), frames = offsets.len(), "Offsets written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_record_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("000-corr1.txt");
        write_shift_record(&path, &PairwiseShift::sentinel()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "0 0 0 0\n");
    }

    #[test]
    fn parses_fractional_shift() {
        let r = parse_shift_record("0.5 -1.25 2\t7\n", 0).unwrap();
        assert_eq!(r.frame, 7);
        assert_eq!(r.shift, Offset3D::new(0.5, -1.25, 2.0));
    }

    #[test]
    fn three_columns_use_fallback_frame() {
        let r = parse_shift_record("1 2 3", 9).unwrap();
        assert_eq!(r.frame, 9);
    }

    #[test]
    fn rejects_malformed_records() {
        assert!(parse_shift_record("1 2", 0).is_err());
        assert!(parse_shift_record("1 2 x 4", 0).is_err());
        assert!(parse_shift_record("1 2 3 4.5", 0).is_err());
        assert!(parse_shift_record("NaN 0 0 1", 0).is_err());
    }
}
