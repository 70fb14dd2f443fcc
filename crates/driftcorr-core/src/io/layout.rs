//! File naming of a dataset directory.
//!
//! A dataset root holds `reg/` (projections and shift records) and `nhdr/`
//! (per-frame volume headers). Every per-frame file starts with the frame
//! index zero-padded to three digits.

use std::path::{Path, PathBuf};

use crate::consts::{CORRECTED_HEADER_SUFFIX, FRAME_INDEX_DIGITS, SHIFT_RECORD_SUFFIX};
use crate::frame::Projection;

pub const REGISTRATION_DIR: &str = "reg";
pub const HEADER_DIR: &str = "nhdr";
pub const OFFSETS_FILE: &str = "offsets.txt";
pub const SMOOTHED_OFFSETS_FILE: &str = "offsets-smooth.txt";

/// `7` -> `"007"`. Wider indices are written in full.
pub fn zero_pad(frame: usize) -> String {
    format!("{:0width$}", frame, width = FRAME_INDEX_DIGITS)
}

pub fn projection_path(dir: &Path, frame: usize, projection: Projection) -> PathBuf {
    dir.join(format!("{}-{}.png", zero_pad(frame), projection))
}

pub fn shift_record_path(dir: &Path, frame: usize) -> PathBuf {
    dir.join(format!("{}{}", zero_pad(frame), SHIFT_RECORD_SUFFIX))
}

pub fn header_path(dir: &Path, frame: usize) -> PathBuf {
    dir.join(format!("{}.nhdr", zero_pad(frame)))
}

pub fn corrected_header_path(dir: &Path, frame: usize) -> PathBuf {
    dir.join(format!("{}{}", zero_pad(frame), CORRECTED_HEADER_SUFFIX))
}
