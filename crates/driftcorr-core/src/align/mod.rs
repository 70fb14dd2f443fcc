pub mod correlation;
mod pairwise;
pub mod probe;
pub mod subpixel;

pub use correlation::{search, CorrelationMap, CorrelationSearch, DiscreteMatch};
pub use pairwise::{
    combine_projection_shifts, estimate_pair, register_images, register_pair, Registration2D,
};
pub use probe::{KernelProbe, ProbeResult};
pub use subpixel::{check_boundary, refine_peak, RefineParams, Refinement};
