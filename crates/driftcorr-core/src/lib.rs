pub mod align;
pub mod consts;
pub mod drift;
pub mod error;
pub mod filters;
pub mod frame;
pub mod io;
pub mod kernel;
pub mod pipeline;
