/// Minimum number of correlation-map cells times overlap pixels to use
/// row-level Rayon parallelism in the discrete search.
pub const PARALLEL_WORK_THRESHOLD: usize = 1 << 20;

/// Minimum frame-pair count to use pair-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Initial gradient-ascent step size, in correlation-map pixels per unit gradient.
pub const INITIAL_STEP_SIZE: f64 = 10.0;

/// Step-size multiplier applied after a rejected step.
pub const STEP_BACKOFF: f64 = 0.5;

/// Step-size multiplier applied after an accepted step.
pub const STEP_CREEP: f64 = 1.2;

/// Maximum rejected steps within one gradient-ascent iteration.
/// 0.5^64 shrinks any step below f64 resolution.
pub const MAX_STEP_RETRIES: usize = 64;

/// Default maximum offset searched by the discrete correlation.
pub const DEFAULT_OFFSET_BOUND: usize = 10;

/// Default relative-gain convergence threshold for sub-pixel refinement.
pub const DEFAULT_EPSILON: f64 = 1e-4;

/// Default iteration cap for sub-pixel refinement.
pub const DEFAULT_MAX_ITERS: usize = 100;

/// Default median window (frames) for temporal outlier suppression.
pub const DEFAULT_MEDIAN_WINDOW: usize = 3;

/// Default Gaussian sigma (frames) for temporal smoothing.
pub const DEFAULT_BLUR_SIGMA: f64 = 2.0;

/// Default Gaussian sigma (frames) for the boundary mask.
pub const DEFAULT_MASK_SIGMA: f64 = 1.5;

/// Default Gaussian half-width, in units of sigma.
pub const DEFAULT_GAUSSIAN_CUT: f64 = 3.0;

/// Number of digits in zero-padded frame indices of file names.
pub const FRAME_INDEX_DIGITS: usize = 3;

/// Suffix of per-frame pairwise shift records.
pub const SHIFT_RECORD_SUFFIX: &str = "-corr1.txt";

/// Suffix of rewritten per-frame headers.
pub const CORRECTED_HEADER_SUFFIX: &str = "-corr.nhdr";
