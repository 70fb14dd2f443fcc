//! Discrete normalized cross-correlation search.
//!
//! For every integer offset `(ox, oy)` in `[-bound, bound]²` the score
//! `Σ a·b / (√Σa² · √Σb²)` is computed over the region where both
//! `a = A[y + oy, x + ox]` and `b = B[y, x]` are in bounds. The best offset
//! therefore satisfies `B(x, y) ≈ A(x + ox, y + oy)`.

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use tracing::debug;

use crate::consts::PARALLEL_WORK_THRESHOLD;
use crate::error::{DriftError, Result};
use crate::frame::ImageBuffer;

/// Score of every integer offset within `radius`, indexed `[[oy + radius, ox + radius]]`.
#[derive(Clone, Debug)]
pub struct CorrelationMap {
    radius: usize,
    scores: Array2<f64>,
}

impl CorrelationMap {
    /// Wrap a precomputed square score grid of odd side length.
    pub fn from_scores(scores: Array2<f64>) -> Result<Self> {
        let (h, w) = scores.dim();
        if h != w || h % 2 == 0 {
            return Err(DriftError::InvalidInput(format!(
                "correlation map must be square with odd side, got {}x{}",
                w, h
            )));
        }
        Ok(Self {
            radius: (h - 1) / 2,
            scores,
        })
    }

    /// Highest-scoring offset, first in raster order on ties.
    pub fn best(&self) -> DiscreteMatch {
        find_best(&self.scores, self.radius)
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Side length, `2 * radius + 1`.
    pub fn size(&self) -> usize {
        2 * self.radius + 1
    }

    pub fn scores(&self) -> &Array2<f64> {
        &self.scores
    }

    pub fn score(&self, ox: i32, oy: i32) -> Option<f64> {
        let r = self.radius as i64;
        let (col, row) = (ox as i64 + r, oy as i64 + r);
        if col < 0 || row < 0 {
            return None;
        }
        self.scores.get((row as usize, col as usize)).copied()
    }
}

/// Integer offset with the highest score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiscreteMatch {
    pub ox: i32,
    pub oy: i32,
    pub score: f64,
}

impl DiscreteMatch {
    /// Distance in pixels from the best offset to the edge of the search window.
    pub fn margin(&self, bound: usize) -> usize {
        bound.saturating_sub(self.ox.unsigned_abs().max(self.oy.unsigned_abs()) as usize)
    }
}

#[derive(Clone, Debug)]
pub struct CorrelationSearch {
    pub map: CorrelationMap,
    pub best: DiscreteMatch,
}

impl CorrelationSearch {
    /// The maximum sits on the edge of the window: the true peak may lie
    /// outside it and the bound should be increased.
    pub fn on_boundary(&self) -> bool {
        self.best.margin(self.map.radius) == 0
    }
}

/// Run the discrete search of B against A for offsets up to `bound`.
pub fn search(a: &ImageBuffer, b: &ImageBuffer, bound: usize) -> Result<CorrelationSearch> {
    check_input(a, "A")?;
    check_input(b, "B")?;
    if a.sample_type() != b.sample_type() {
        return Err(DriftError::InvalidInput(format!(
            "sample types differ: A is {}, B is {}",
            a.sample_type(),
            b.sample_type()
        )));
    }
    if bound == 0 {
        return Err(DriftError::InvalidInput(
            "offset bound must be at least 1".into(),
        ));
    }

    let aa = a.to_f64();
    let bb = b.to_f64();
    let size = 2 * bound + 1;
    let (h, w) = bb.dim();
    let mut scores = Array2::<f64>::zeros((size, size));

    if size * size * h * w >= PARALLEL_WORK_THRESHOLD {
        let rows: Vec<Vec<f64>> = (0..size)
            .into_par_iter()
            .map(|row| {
                let oy = row as i64 - bound as i64;
                (0..size)
                    .map(|col| {
                        let ox = col as i64 - bound as i64;
                        cross_correlation(aa.view(), bb.view(), ox, oy)
                    })
                    .collect()
            })
            .collect();

        for (row, row_data) in rows.into_iter().enumerate() {
            for (col, val) in row_data.into_iter().enumerate() {
                scores[[row, col]] = val;
            }
        }
    } else {
        for ((row, col), cell) in scores.indexed_iter_mut() {
            let oy = row as i64 - bound as i64;
            let ox = col as i64 - bound as i64;
            *cell = cross_correlation(aa.view(), bb.view(), ox, oy);
        }
    }

    let best = find_best(&scores, bound);
    if !best.score.is_finite() {
        return Err(DriftError::InvalidInput(format!(
            "no correlation score within bound {}: images are blank or never overlap",
            bound
        )));
    }
    debug!(
        ox = best.ox,
        oy = best.oy,
        score = best.score,
        bound,
        "Discrete correlation maximum"
    );

    Ok(CorrelationSearch {
        map: CorrelationMap {
            radius: bound,
            scores,
        },
        best,
    })
}

fn check_input(image: &ImageBuffer, name: &str) -> Result<()> {
    if !image.is_integer() {
        return Err(DriftError::InvalidInput(format!(
            "image {} must hold integer samples, got {}",
            name,
            image.sample_type()
        )));
    }
    let (h, w) = image.dim();
    if h == 0 || w == 0 {
        return Err(DriftError::InvalidDimensions {
            width: w,
            height: h,
        });
    }
    Ok(())
}

/// Normalized cross-correlation of B placed at offset `(ox, oy)` inside A.
///
/// Returns NaN when the overlap is empty or entirely zero.
pub fn cross_correlation(a: ArrayView2<f64>, b: ArrayView2<f64>, ox: i64, oy: i64) -> f64 {
    let (ha, wa) = a.dim();
    let (hb, wb) = b.dim();

    let x_lo = 0i64.max(-ox);
    let x_hi = (wa as i64 - 1 - ox).min(wb as i64 - 1);
    let y_lo = 0i64.max(-oy);
    let y_hi = (ha as i64 - 1 - oy).min(hb as i64 - 1);
    if x_lo > x_hi || y_lo > y_hi {
        return f64::NAN;
    }

    let mut dot = 0.0f64;
    let mut len_a = 0.0f64;
    let mut len_b = 0.0f64;
    for y in y_lo..=y_hi {
        let row_a = a.row((y + oy) as usize);
        let row_b = b.row(y as usize);
        for x in x_lo..=x_hi {
            let va = row_a[(x + ox) as usize];
            let vb = row_b[x as usize];
            dot += va * vb;
            len_a += va * va;
            len_b += vb * vb;
        }
    }

    dot / (len_a.sqrt() * len_b.sqrt())
}

/// Raster scan over `(oy, ox)`; the first strictly greater score wins.
fn find_best(scores: &Array2<f64>, bound: usize) -> DiscreteMatch {
    let mut best = DiscreteMatch {
        ox: 0,
        oy: 0,
        score: f64::NEG_INFINITY,
    };
    for ((row, col), &score) in scores.indexed_iter() {
        if score > best.score {
            best = DiscreteMatch {
                ox: col as i32 - bound as i32,
                oy: row as i32 - bound as i32,
                score,
            };
        }
    }
    best
}
