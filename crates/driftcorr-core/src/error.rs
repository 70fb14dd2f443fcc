use thiserror::Error;

use crate::frame::Projection;

#[derive(Error, Debug)]
pub enum DriftError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error(
        "Best offset ({ox}, {oy}) is within kernel support {radius} of the search boundary; \
         increase the offset bound (currently {bound})"
    )]
    BoundaryTooClose {
        ox: i32,
        oy: i32,
        bound: usize,
        radius: usize,
    },

    #[error(
        "Sub-pixel refinement did not converge from offset ({start_x}, {start_y}) \
         after {iterations} iterations ({reason})"
    )]
    ConvergenceFailure {
        start_x: i32,
        start_y: i32,
        iterations: usize,
        reason: &'static str,
    },

    #[error("No pairwise shift for frame {frame}")]
    MissingData { frame: usize },

    #[error("Unknown kernel: {0}")]
    UnknownKernel(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Frame {frame} ({projection} projection): {source}")]
    FramePair {
        frame: usize,
        projection: Projection,
        #[source]
        source: Box<DriftError>,
    },

    #[error("Empty frame sequence")]
    EmptySequence,
}

impl DriftError {
    /// Attach frame/projection context to a per-projection failure.
    pub fn in_pair(self, frame: usize, projection: Projection) -> Self {
        Self::FramePair {
            frame,
            projection,
            source: Box::new(self),
        }
    }

    /// True for the failures that only invalidate a single frame pair.
    pub fn is_per_pair(&self) -> bool {
        match self {
            Self::FramePair { source, .. } => source.is_per_pair(),
            Self::InvalidInput(_)
            | Self::InvalidDimensions { .. }
            | Self::BoundaryTooClose { .. }
            | Self::ConvergenceFailure { .. }
            | Self::MissingData { .. } => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DriftError>;
