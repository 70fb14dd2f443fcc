pub mod integrate;
pub mod smooth;

pub use integrate::{integrate, integrate_partial, integrate_records, ChainIntegration};
pub use smooth::{boundary_weights, smooth};
