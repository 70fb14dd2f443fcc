//! Separable 1D reconstruction kernels.
//!
//! Kernels are a closed set of variants. A kernel that can be differentiated
//! names its derivative through [`Kernel::derivative`]; derivative kernels and
//! the box/tent kernels have none.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DriftError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Kernel {
    /// Nearest neighbor.
    Box,
    /// Linear interpolation.
    Tent,
    /// Uniform cubic B-spline (approximating).
    BSpline3,
    BSpline3D,
    /// Catmull-Rom cubic (interpolating).
    CatmullRom,
    CatmullRomD,
    /// C4-continuous, fourth-order accurate hexic.
    C4Hexic,
    C4HexicD,
}

impl Kernel {
    pub const ALL: [Kernel; 8] = [
        Kernel::Box,
        Kernel::Tent,
        Kernel::BSpline3,
        Kernel::BSpline3D,
        Kernel::CatmullRom,
        Kernel::CatmullRomD,
        Kernel::C4Hexic,
        Kernel::C4HexicD,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Tent => "tent",
            Self::BSpline3 => "bspln3",
            Self::BSpline3D => "bspln3d",
            Self::CatmullRom => "ctmr",
            Self::CatmullRomD => "ctmrd",
            Self::C4Hexic => "c4hexic",
            Self::C4HexicD => "c4hexicd",
        }
    }

    pub fn from_name(name: &str) -> Option<Kernel> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Full width of the non-zero region, in samples.
    pub fn support(self) -> usize {
        match self {
            Self::Box => 1,
            Self::Tent => 2,
            Self::BSpline3 | Self::BSpline3D | Self::CatmullRom | Self::CatmullRomD => 4,
            Self::C4Hexic | Self::C4HexicD => 6,
        }
    }

    /// Number of samples on either side of the center that a kernel of this
    /// support can touch.
    pub fn support_radius(self) -> usize {
        self.support().div_ceil(2)
    }

    pub fn derivative(self) -> Option<Kernel> {
        match self {
            Self::BSpline3 => Some(Self::BSpline3D),
            Self::CatmullRom => Some(Self::CatmullRomD),
            Self::C4Hexic => Some(Self::C4HexicD),
            _ => None,
        }
    }

    pub fn has_derivative(self) -> bool {
        self.derivative().is_some()
    }

    pub fn eval(self, x: f64) -> f64 {
        let ax = x.abs();
        match self {
            Self::Box => {
                if ax < 0.5 {
                    1.0
                } else if ax == 0.5 {
                    0.5
                } else {
                    0.0
                }
            }
            Self::Tent => {
                if ax < 1.0 {
                    1.0 - ax
                } else {
                    0.0
                }
            }
            Self::BSpline3 => bspline3(ax),
            Self::BSpline3D => x.signum() * bspline3_d(ax),
            Self::CatmullRom => catmull_rom(ax),
            Self::CatmullRomD => x.signum() * catmull_rom_d(ax),
            Self::C4Hexic => c4hexic(ax),
            Self::C4HexicD => x.signum() * c4hexic_d(ax),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kernel {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self> {
        Kernel::from_name(s).ok_or_else(|| DriftError::UnknownKernel(s.to_string()))
    }
}

impl TryFrom<String> for Kernel {
    type Error = DriftError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Kernel> for String {
    fn from(k: Kernel) -> String {
        k.name().to_string()
    }
}

fn bspline3(x: f64) -> f64 {
    if x < 1.0 {
        2.0 / 3.0 + x * x * (-1.0 + x / 2.0)
    } else if x < 2.0 {
        let t = 2.0 - x;
        t * t * t / 6.0
    } else {
        0.0
    }
}

fn bspline3_d(x: f64) -> f64 {
    if x < 1.0 {
        x * (-2.0 + 1.5 * x)
    } else if x < 2.0 {
        let t = 2.0 - x;
        -t * t / 2.0
    } else {
        0.0
    }
}

fn catmull_rom(x: f64) -> f64 {
    if x < 1.0 {
        1.0 + x * x * (-2.5 + 1.5 * x)
    } else if x < 2.0 {
        2.0 + x * (-4.0 + x * (2.5 - 0.5 * x))
    } else {
        0.0
    }
}

fn catmull_rom_d(x: f64) -> f64 {
    if x < 1.0 {
        x * (-5.0 + 4.5 * x)
    } else if x < 2.0 {
        -4.0 + x * (5.0 - 1.5 * x)
    } else {
        0.0
    }
}

fn c4hexic(x: f64) -> f64 {
    if x < 1.0 {
        69.0 / 80.0 + x * x * (-23.0 / 16.0 + x * x * (19.0 / 16.0 + x * (-7.0 / 12.0 + x / 16.0)))
    } else if x < 2.0 {
        3.0 / 160.0
            + x * (35.0 / 8.0
                + x * (-341.0 / 32.0
                    + x * (10.0 + x * (-147.0 / 32.0 + x * (25.0 / 24.0 - 3.0 * x / 32.0)))))
    } else if x < 3.0 {
        1539.0 / 160.0
            + x * (-189.0 / 8.0
                + x * (747.0 / 32.0
                    + x * (-12.0 + x * (109.0 / 32.0 + x * (-61.0 / 120.0 + x / 32.0)))))
    } else {
        0.0
    }
}

fn c4hexic_d(x: f64) -> f64 {
    if x < 1.0 {
        x * (-23.0 / 8.0 + x * x * (19.0 / 4.0 + x * (-35.0 / 12.0 + 3.0 * x / 8.0)))
    } else if x < 2.0 {
        35.0 / 8.0
            + x * (-341.0 / 16.0
                + x * (30.0 + x * (-147.0 / 8.0 + x * (125.0 / 24.0 - 9.0 * x / 16.0))))
    } else if x < 3.0 {
        -189.0 / 8.0
            + x * (747.0 / 16.0
                + x * (-36.0 + x * (109.0 / 8.0 + x * (-61.0 / 24.0 + 3.0 * x / 16.0))))
    } else {
        0.0
    }
}

/// A value kernel together with the kernel used for its derivative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KernelPair {
    pub kernel: Kernel,
    pub derivative: Kernel,
}

impl KernelPair {
    /// The `box box` pair, which disables sub-pixel refinement.
    pub const NEAREST: KernelPair = KernelPair {
        kernel: Kernel::Box,
        derivative: Kernel::Box,
    };

    /// Pair a kernel with its registered derivative.
    pub fn with_derivative(kernel: Kernel) -> Result<Self> {
        let derivative = kernel.derivative().ok_or_else(|| {
            DriftError::InvalidConfig(format!("kernel '{}' has no derivative", kernel))
        })?;
        Ok(Self { kernel, derivative })
    }

    pub fn new(kernel: Kernel, derivative: Kernel) -> Result<Self> {
        if kernel == Kernel::Box && derivative == Kernel::Box {
            return Ok(Self::NEAREST);
        }
        match kernel.derivative() {
            Some(d) if d == derivative => Ok(Self { kernel, derivative }),
            _ => Err(DriftError::InvalidConfig(format!(
                "'{}' is not the derivative of kernel '{}'",
                derivative, kernel
            ))),
        }
    }

    pub fn from_names(kernel: &str, derivative: &str) -> Result<Self> {
        Self::new(kernel.parse()?, derivative.parse()?)
    }

    /// True when refinement is skipped and the discrete maximum is used.
    pub fn is_nearest(&self) -> bool {
        self.kernel == Kernel::Box && self.derivative == Kernel::Box
    }

    pub fn support(&self) -> usize {
        self.kernel.support().max(self.derivative.support())
    }

    pub fn support_radius(&self) -> usize {
        self.support().div_ceil(2)
    }
}

impl fmt::Display for KernelPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kernel, self.derivative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition_sum(kernel: Kernel, a: f64) -> f64 {
        let r = kernel.support_radius() as i64 + 1;
        (-r..=r).map(|i| kernel.eval(a - i as f64)).sum()
    }

    #[test]
    fn interpolating_kernels_sum_to_one() {
        for kernel in [Kernel::Tent, Kernel::BSpline3, Kernel::CatmullRom, Kernel::C4Hexic] {
            for a in [0.0, 0.1, 0.25, 0.5, 0.77] {
                let s = partition_sum(kernel, a);
                assert!((s - 1.0).abs() < 1e-12, "{kernel} at {a}: sum {s}");
            }
        }
    }

    #[test]
    fn derivative_kernels_sum_to_zero() {
        for kernel in [Kernel::BSpline3D, Kernel::CatmullRomD, Kernel::C4HexicD] {
            for a in [0.0, 0.3, 0.5, 0.9] {
                let s = partition_sum(kernel, a);
                assert!(s.abs() < 1e-12, "{kernel} at {a}: sum {s}");
            }
        }
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let h = 1e-6;
        for kernel in [Kernel::BSpline3, Kernel::CatmullRom, Kernel::C4Hexic] {
            let d = kernel.derivative().unwrap();
            for x in [-2.7, -1.4, -0.6, 0.3, 0.8, 1.5, 2.2] {
                let fd = (kernel.eval(x + h) - kernel.eval(x - h)) / (2.0 * h);
                assert!((fd - d.eval(x)).abs() < 1e-6, "{kernel} at {x}");
            }
        }
    }

    #[test]
    fn kernels_vanish_outside_support() {
        for kernel in Kernel::ALL {
            let half = kernel.support() as f64 / 2.0;
            assert_eq!(kernel.eval(half + 0.01), 0.0, "{kernel}");
            assert_eq!(kernel.eval(-half - 0.01), 0.0, "{kernel}");
        }
    }

    #[test]
    fn names_round_trip() {
        for kernel in Kernel::ALL {
            assert_eq!(Kernel::from_name(kernel.name()), Some(kernel));
        }
        assert!("gauss".parse::<Kernel>().is_err());
    }

    #[test]
    fn pair_requires_matching_derivative() {
        assert!(KernelPair::from_names("box", "box").unwrap().is_nearest());
        assert!(KernelPair::from_names("ctmr", "ctmrd").is_ok());
        assert!(KernelPair::from_names("ctmr", "bspln3d").is_err());
        assert!(KernelPair::from_names("tent", "tent").is_err());
        assert_eq!(
            KernelPair::with_derivative(Kernel::C4Hexic).unwrap().support_radius(),
            3
        );
    }
}
