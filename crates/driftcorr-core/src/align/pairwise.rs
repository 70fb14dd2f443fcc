//! Registration of temporally adjacent frames from their three projections.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{DriftError, Result};
use crate::frame::{
    Axis3, ImageBuffer, Offset2D, Offset3D, PairwiseShift, Projection, ProjectionSet,
};
use crate::pipeline::config::RegistrationConfig;

use super::correlation::{search, CorrelationMap, DiscreteMatch};
use super::subpixel::{refine_peak, RefineParams, Refinement};

/// Discrete and refined registration of one 2D image pair.
#[derive(Clone, Debug)]
pub struct Registration2D {
    pub map: CorrelationMap,
    pub discrete: DiscreteMatch,
    pub refinement: Refinement,
}

impl Registration2D {
    /// Offset of B relative to A: `B(x, y) ≈ A(x + dx, y + dy)`.
    pub fn shift(&self) -> Offset2D {
        self.refinement.offset
    }
}

/// Discrete search followed by sub-pixel refinement of one image pair.
pub fn register_images(
    a: &ImageBuffer,
    b: &ImageBuffer,
    bound: usize,
    params: &RefineParams,
) -> Result<Registration2D> {
    let found = search(a, b, bound)?;
    let refinement = refine_peak(&found.map, &found.best, params)?;
    Ok(Registration2D {
        map: found.map,
        discrete: found.best,
        refinement,
    })
}

/// Reduce three projection shifts to one 3D shift.
///
/// Each physical axis is seen by exactly two projections; its value is the
/// mean of those two estimates. The column/row axes of every projection come
/// from [`Projection::axes`].
pub fn combine_projection_shifts(shifts: &[(Projection, Offset2D)]) -> Result<Offset3D> {
    let mut sum = [0.0f64; 3];
    let mut count = [0usize; 3];
    for (projection, shift) in shifts {
        let (col_axis, row_axis) = projection.axes();
        for (axis, value) in [(col_axis, shift.dx), (row_axis, shift.dy)] {
            let i = axis_slot(axis);
            sum[i] += value;
            count[i] += 1;
        }
    }

    if count.iter().any(|&c| c != 2) {
        return Err(DriftError::InvalidInput(format!(
            "each axis needs two projection estimates, got x:{} y:{} z:{}",
            count[0], count[1], count[2]
        )));
    }
    Ok(Offset3D::from_components([
        sum[0] / 2.0,
        sum[1] / 2.0,
        sum[2] / 2.0,
    ]))
}

fn axis_slot(axis: Axis3) -> usize {
    match axis {
        Axis3::X => 0,
        Axis3::Y => 1,
        Axis3::Z => 2,
    }
}

/// Estimate the 3D shift of `next` relative to `prev`.
///
/// The three projections are registered in parallel. Any failure is wrapped
/// with the frame index and the projection it came from.
pub fn estimate_pair(
    prev: &ProjectionSet,
    next: &ProjectionSet,
    frame: usize,
    config: &RegistrationConfig,
) -> Result<Offset3D> {
    let params = config.refine_params()?;
    let bound = config.offset_bound;

    let shifts: Vec<(Projection, Offset2D)> = Projection::ALL
        .par_iter()
        .map(|&projection| -> Result<(Projection, Offset2D)> {
            let reg = register_images(prev.get(projection), next.get(projection), bound, &params)
                .map_err(|e| e.in_pair(frame, projection))?;
            debug!(
                frame,
                %projection,
                dx = reg.shift().dx,
                dy = reg.shift().dy,
                score = reg.refinement.score,
                "Projection registered"
            );
            Ok((projection, reg.shift()))
        })
        .collect::<Result<_>>()?;

    combine_projection_shifts(&shifts)
}

/// Shift of `frames[frame]` relative to `frames[frame - 1]`.
///
/// Frame 0, or a sequence with a single frame, has no predecessor and yields
/// the sentinel record without running any search.
pub fn register_pair(
    frames: &[ProjectionSet],
    frame: usize,
    config: &RegistrationConfig,
) -> Result<PairwiseShift> {
    if frames.len() <= 1 || frame == 0 {
        return Ok(PairwiseShift::sentinel());
    }
    if frame >= frames.len() {
        return Err(DriftError::InvalidInput(format!(
            "frame {} out of range (total: {})",
            frame,
            frames.len()
        )));
    }

    let shift = estimate_pair(&frames[frame - 1], &frames[frame], frame, config)?;
    info!(
        frame,
        dx = shift.dx,
        dy = shift.dy,
        dz = shift.dz,
        "Pairwise shift"
    );
    Ok(PairwiseShift { frame, shift })
}
