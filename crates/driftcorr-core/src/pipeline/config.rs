use std::fmt;

use serde::{Deserialize, Serialize};

use crate::align::RefineParams;
use crate::consts::{
    DEFAULT_BLUR_SIGMA, DEFAULT_EPSILON, DEFAULT_GAUSSIAN_CUT, DEFAULT_MASK_SIGMA,
    DEFAULT_MAX_ITERS, DEFAULT_MEDIAN_WINDOW, DEFAULT_OFFSET_BOUND,
};
use crate::error::{DriftError, Result};
use crate::kernel::{Kernel, KernelPair};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftConfig {
    #[serde(default)]
    pub registration: RegistrationConfig,
    #[serde(default)]
    pub smoothing: SmoothingConfig,
}

impl DriftConfig {
    pub fn validate(&self) -> Result<()> {
        self.registration.validate()?;
        self.smoothing.validate()
    }
}

/// Parameters of the per-pair registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Largest offset, in pixels, tried by the discrete search.
    pub offset_bound: usize,
    /// Reconstruction kernel for sub-pixel refinement, `box` to disable it.
    pub kernel: Kernel,
    /// Derivative of `kernel`, `box` when refinement is disabled.
    pub derivative: Kernel,
    /// Relative score gain at which gradient ascent stops.
    pub epsilon: f64,
    pub max_iters: usize,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            offset_bound: DEFAULT_OFFSET_BOUND,
            kernel: Kernel::C4Hexic,
            derivative: Kernel::C4HexicD,
            epsilon: DEFAULT_EPSILON,
            max_iters: DEFAULT_MAX_ITERS,
        }
    }
}

impl RegistrationConfig {
    /// Integer-only registration with the `box box` pair.
    pub fn nearest() -> Self {
        Self {
            kernel: Kernel::Box,
            derivative: Kernel::Box,
            ..Self::default()
        }
    }

    pub fn kernels(&self) -> Result<KernelPair> {
        KernelPair::new(self.kernel, self.derivative)
    }

    pub fn refine_params(&self) -> Result<RefineParams> {
        self.validate()?;
        Ok(RefineParams {
            kernels: self.kernels()?,
            epsilon: self.epsilon,
            max_iters: self.max_iters,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.offset_bound < 1 {
            return Err(DriftError::InvalidConfig(
                "offset_bound must be at least 1".into(),
            ));
        }
        if !(self.epsilon > 0.0) {
            return Err(DriftError::InvalidConfig(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if self.max_iters < 1 {
            return Err(DriftError::InvalidConfig(
                "max_iters must be at least 1".into(),
            ));
        }
        self.kernels()?;
        Ok(())
    }
}

impl fmt::Display for RegistrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bound {} / kernel {} {} / eps {:e} / max {} iters",
            self.offset_bound, self.kernel, self.derivative, self.epsilon, self.max_iters
        )
    }
}

/// Parameters of the temporal smoothing of the offset sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Odd number of frames in the median window; 1 disables the median.
    pub median_window: usize,
    /// Gaussian sigma, in frames, of the main blur.
    pub blur_sigma: f64,
    /// Half-width of the main blur, in units of `blur_sigma`.
    pub blur_cut: f64,
    /// Gaussian sigma, in frames, of the endpoint mask blur.
    pub mask_sigma: f64,
    pub mask_cut: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            median_window: DEFAULT_MEDIAN_WINDOW,
            blur_sigma: DEFAULT_BLUR_SIGMA,
            blur_cut: DEFAULT_GAUSSIAN_CUT,
            mask_sigma: DEFAULT_MASK_SIGMA,
            mask_cut: DEFAULT_GAUSSIAN_CUT,
        }
    }
}

impl SmoothingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.median_window == 0 || self.median_window % 2 == 0 {
            return Err(DriftError::InvalidConfig(format!(
                "median_window must be odd, got {}",
                self.median_window
            )));
        }
        for (name, value) in [
            ("blur_sigma", self.blur_sigma),
            ("blur_cut", self.blur_cut),
            ("mask_sigma", self.mask_sigma),
            ("mask_cut", self.mask_cut),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(DriftError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for SmoothingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "median {} / blur σ={} / mask σ={}",
            self.median_window, self.blur_sigma, self.mask_sigma
        )
    }
}
