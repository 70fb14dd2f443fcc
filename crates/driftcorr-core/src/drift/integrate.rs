use std::collections::BTreeMap;

use tracing::warn;

use crate::error::DriftError;
use crate::frame::{Offset3D, PairwiseShift, ShiftSequence};

/// Absolute offsets together with the frames whose pairwise shift was absent.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainIntegration {
    pub offsets: ShiftSequence,
    /// Frames that contributed a zero shift because none was available.
    pub missing: Vec<usize>,
}

impl ChainIntegration {
    pub fn is_missing(&self, frame: usize) -> bool {
        self.missing.binary_search(&frame).is_ok()
    }

    /// One `MissingData` warning per frame without a pairwise shift.
    pub fn warnings(&self) -> Vec<DriftError> {
        self.missing
            .iter()
            .map(|&frame| DriftError::MissingData { frame })
            .collect()
    }
}

/// Running sum of pairwise shifts. `pairwise[k]` is the shift of frame `k + 1`
/// relative to frame `k`; frame 0 is always the identity.
pub fn integrate(pairwise: &[Offset3D]) -> ShiftSequence {
    let mut offsets = ShiftSequence::identity();
    for &shift in pairwise {
        let next = offsets.last() + shift;
        offsets.push(next);
    }
    offsets
}

/// Like [`integrate`], but entries may be absent. An absent shift freezes the
/// drift for that frame and is reported in [`ChainIntegration::missing`].
pub fn integrate_partial(pairwise: &[Option<Offset3D>]) -> ChainIntegration {
    let mut offsets = ShiftSequence::identity();
    let mut missing = Vec::new();
    for (k, shift) in pairwise.iter().enumerate() {
        let frame = k + 1;
        let shift = match shift {
            Some(s) => *s,
            None => {
                warn!(frame, "No pairwise shift, assuming zero drift");
                missing.push(frame);
                Offset3D::ZERO
            }
        };
        let next = offsets.last() + shift;
        offsets.push(next);
    }
    ChainIntegration { offsets, missing }
}

/// Integrate records keyed by frame index for a sequence of `frame_count`
/// frames. Sentinel and out-of-range records are ignored.
pub fn integrate_records(frame_count: usize, records: &[PairwiseShift]) -> ChainIntegration {
    let mut by_frame = BTreeMap::new();
    for record in records {
        if record.frame == 0 {
            continue;
        }
        if record.frame >= frame_count {
            warn!(
                frame = record.frame,
                frame_count, "Pairwise shift beyond last frame ignored"
            );
            continue;
        }
        if by_frame.insert(record.frame, record.shift).is_some() {
            warn!(frame = record.frame, "Duplicate pairwise shift, keeping the last one");
        }
    }

    let pairwise: Vec<Option<Offset3D>> = (1..frame_count.max(1))
        .map(|frame| by_frame.get(&frame).copied())
        .collect();
    integrate_partial(&pairwise)
}
