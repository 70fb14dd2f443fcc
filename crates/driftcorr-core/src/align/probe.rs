//! Convolution-based reconstruction of value and gradient at a real-valued
//! position inside a sampled scalar field of any dimension.
//!
//! Positions and gradients are in index space, in the array's axis order
//! (`[row, col]` for a 2D field). Mapping to world space is up to the caller.

use ndarray::{ArrayView, Dimension, IntoDimension, Slice};

use crate::error::{DriftError, Result};
use crate::kernel::KernelPair;

#[derive(Clone, Debug, PartialEq)]
pub struct ProbeResult {
    pub value: f64,
    pub gradient: Vec<f64>,
    /// Some sample needed by the kernel lies outside the field; `value` and
    /// `gradient` are NaN.
    pub out_of_domain: bool,
}

impl ProbeResult {
    fn outside(ndim: usize) -> Self {
        Self {
            value: f64::NAN,
            gradient: vec![f64::NAN; ndim],
            out_of_domain: true,
        }
    }
}

/// Separable kernel probe with its own weight scratch.
///
/// One probe is owned by one refinement; nothing is shared between threads.
#[derive(Clone, Debug)]
pub struct KernelProbe {
    kernels: KernelPair,
    ndim: usize,
    lo: i64,
    hi: i64,
    weights: Vec<f64>,
    dweights: Vec<f64>,
    base: Vec<i64>,
}

impl KernelProbe {
    pub fn new(kernels: KernelPair, ndim: usize) -> Self {
        let support = kernels.support() as i64;
        let (lo, hi) = if support % 2 == 0 {
            (1 - support / 2, support / 2)
        } else {
            ((1 - support) / 2, (support - 1) / 2)
        };
        let taps = (hi - lo + 1) as usize;
        Self {
            kernels,
            ndim,
            lo,
            hi,
            weights: vec![0.0; ndim * taps],
            dweights: vec![0.0; ndim * taps],
            base: vec![0; ndim],
        }
    }

    /// Offsets, relative to the base sample, touched by the kernel.
    pub fn window(&self) -> (i64, i64) {
        (self.lo, self.hi)
    }

    fn taps(&self) -> usize {
        (self.hi - self.lo + 1) as usize
    }

    /// Reconstruct the field and its gradient at `pos`.
    pub fn probe<D: Dimension>(
        &mut self,
        field: ArrayView<'_, f64, D>,
        pos: &[f64],
    ) -> Result<ProbeResult> {
        if field.ndim() != self.ndim || pos.len() != self.ndim {
            return Err(DriftError::InvalidInput(format!(
                "probe built for {} axes, got {}-D field and {}-D position",
                self.ndim,
                field.ndim(),
                pos.len()
            )));
        }

        let even = self.kernels.support() % 2 == 0;
        let taps = self.taps();
        let shape = field.shape().to_vec();

        let mut inside = true;
        for (ax, &p) in pos.iter().enumerate() {
            if !p.is_finite() {
                inside = false;
                break;
            }
            let n = if even { p.floor() } else { (p + 0.5).floor() };
            let a = p - n;
            let n = n as i64;
            if n + self.lo < 0 || n + self.hi > shape[ax] as i64 - 1 {
                inside = false;
            }
            self.base[ax] = n;
            for (t, i) in (self.lo..=self.hi).enumerate() {
                self.weights[ax * taps + t] = self.kernels.kernel.eval(a - i as f64);
                self.dweights[ax * taps + t] = self.kernels.derivative.eval(a - i as f64);
            }
        }
        if !inside {
            return Ok(ProbeResult::outside(self.ndim));
        }

        let (lo, hi) = (self.lo, self.hi);
        let base = &self.base;
        let window = field.slice_each_axis(|desc| {
            let n = base[desc.axis.index()];
            Slice::new((n + lo) as isize, Some((n + hi + 1) as isize), 1)
        });

        let mut value = 0.0;
        let mut gradient = vec![0.0; self.ndim];
        for (idx, &v) in window.indexed_iter() {
            let ix = idx.into_dimension();
            let ix = ix.slice();

            let mut w = 1.0;
            for (ax, &t) in ix.iter().enumerate() {
                w *= self.weights[ax * taps + t];
            }
            value += v * w;

            for (g, grad) in gradient.iter_mut().enumerate() {
                let mut wg = 1.0;
                for (ax, &t) in ix.iter().enumerate() {
                    wg *= if ax == g {
                        self.dweights[ax * taps + t]
                    } else {
                        self.weights[ax * taps + t]
                    };
                }
                *grad += v * wg;
            }
        }

        Ok(ProbeResult {
            value,
            gradient,
            out_of_domain: false,
        })
    }
}
