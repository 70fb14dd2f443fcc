use tracing::debug;

use crate::consts::{INITIAL_STEP_SIZE, MAX_STEP_RETRIES, STEP_BACKOFF, STEP_CREEP};
use crate::error::{DriftError, Result};
use crate::frame::Offset2D;
use crate::kernel::KernelPair;

use super::correlation::{CorrelationMap, DiscreteMatch};
use super::probe::KernelProbe;

/// Parameters of the gradient-ascent peak refinement.
#[derive(Clone, Copy, Debug)]
pub struct RefineParams {
    pub kernels: KernelPair,
    /// Relative score gain below which an accepted step ends the ascent.
    pub epsilon: f64,
    pub max_iters: usize,
}

/// Sub-pixel location of the correlation peak.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Refinement {
    pub offset: Offset2D,
    /// Reconstructed score at `offset`.
    pub score: f64,
    /// Accepted gradient-ascent steps; 0 when refinement was skipped.
    pub iterations: usize,
}

/// Fail with `BoundaryTooClose` when the kernel footprint around the discrete
/// maximum would reach the edge of the correlation map.
pub fn check_boundary(best: &DiscreteMatch, bound: usize, kernels: &KernelPair) -> Result<()> {
    let radius = kernels.support_radius();
    if best.margin(bound) < radius {
        return Err(DriftError::BoundaryTooClose {
            ox: best.ox,
            oy: best.oy,
            bound,
            radius,
        });
    }
    Ok(())
}

/// Refine the discrete maximum of `map` to sub-pixel precision.
///
/// The correlation map is treated as a continuous field reconstructed with
/// `params.kernels`. Starting from `best`, steps along the gradient are
/// accepted when they stay inside the map and do not lower the score; a
/// rejected step shrinks the step size and retries the same iteration.
/// With the `box box` pair the discrete maximum is returned as is.
pub fn refine_peak(
    map: &CorrelationMap,
    best: &DiscreteMatch,
    params: &RefineParams,
) -> Result<Refinement> {
    let bound = map.radius();
    check_boundary(best, bound, &params.kernels)?;

    if params.kernels.is_nearest() {
        return Ok(Refinement {
            offset: Offset2D::new(best.ox as f64, best.oy as f64),
            score: best.score,
            iterations: 0,
        });
    }

    let failure = |iterations, reason| DriftError::ConvergenceFailure {
        start_x: best.ox,
        start_y: best.oy,
        iterations,
        reason,
    };

    let field = map.scores().view();
    let center = bound as f64;
    let mut probe = KernelProbe::new(params.kernels, 2);

    // Map-local [row, col] position.
    let mut pos0 = [best.oy as f64 + center, best.ox as f64 + center];
    let start = probe.probe(field, &pos0)?;
    if start.out_of_domain || !start.value.is_finite() {
        return Err(failure(0, "starting score is undefined"));
    }
    let mut val0 = start.value;
    let mut grad0 = [start.gradient[0], start.gradient[1]];
    let mut step = INITIAL_STEP_SIZE;

    for iter in 0..params.max_iters {
        let mut retries = 0;
        let (pos1, val1, grad1) = loop {
            let candidate = [pos0[0] + step * grad0[0], pos0[1] + step * grad0[1]];
            let res = probe.probe(field, &candidate)?;
            if res.out_of_domain || !res.value.is_finite() || res.value < val0 {
                step *= STEP_BACKOFF;
                retries += 1;
                if retries > MAX_STEP_RETRIES {
                    return Err(failure(iter, "step retry ceiling exceeded"));
                }
                continue;
            }
            step *= STEP_CREEP;
            break (candidate, res.value, [res.gradient[0], res.gradient[1]]);
        };

        let gain = if val1 == 0.0 {
            0.0
        } else {
            (val1 - val0) / val1.abs()
        };
        if gain < params.epsilon {
            let offset = Offset2D::new(pos1[1] - center, pos1[0] - center);
            debug!(
                dx = offset.dx,
                dy = offset.dy,
                score = val1,
                iterations = iter + 1,
                "Sub-pixel refinement converged"
            );
            return Ok(Refinement {
                offset,
                score: val1,
                iterations: iter + 1,
            });
        }

        val0 = val1;
        pos0 = pos1;
        grad0 = grad1;
    }

    Err(failure(params.max_iters, "iteration limit reached"))
}
