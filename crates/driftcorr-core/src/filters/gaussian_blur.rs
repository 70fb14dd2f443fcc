use ndarray::Array2;
use rayon::prelude::*;

/// Minimum pixel count (h*w) to justify row-level parallelism.
const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Normalized Gaussian weights reaching `cut * sigma` samples either side.
pub fn make_gaussian_kernel(sigma: f64, cut: f64) -> Vec<f64> {
    let radius = (sigma * cut).ceil() as usize;
    let size = 2 * radius + 1;
    let mut kernel = vec![0.0f64; size];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f64;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f64 - radius as f64;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

/// Blur a 1D signal. Samples beyond either end repeat the end value.
pub fn gaussian_blur_1d(signal: &[f64], sigma: f64, cut: f64) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }
    let kernel = make_gaussian_kernel(sigma, cut);
    let radius = kernel.len() / 2;
    let n = signal.len() as isize;

    (0..signal.len())
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(ki, &kv)| {
                    let src = (i as isize + ki as isize - radius as isize).clamp(0, n - 1);
                    signal[src as usize] * kv
                })
                .sum()
        })
        .collect()
}

/// Separable Gaussian blur of an image with clamped borders.
pub fn gaussian_blur_array(data: &Array2<f32>, sigma: f32) -> Array2<f32> {
    let kernel: Vec<f32> = make_gaussian_kernel(sigma as f64, 3.0)
        .into_iter()
        .map(|v| v as f32)
        .collect();
    let row_pass = convolve_rows(data, &kernel);
    convolve_cols(&row_pass, &kernel)
}

fn convolve_rows(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;
    let sample = |row: usize, col: usize| -> f32 {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let src_col =
                (col as isize + ki as isize - radius as isize).clamp(0, w as isize - 1) as usize;
            sum += data[[row, src_col]] * kv;
        }
        sum
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        let rows: Vec<Vec<f32>> = (0..h)
            .into_par_iter()
            .map(|row| (0..w).map(|col| sample(row, col)).collect())
            .collect();
        collect_rows(rows, h, w)
    } else {
        Array2::from_shape_fn((h, w), |(row, col)| sample(row, col))
    }
}

fn convolve_cols(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;
    let sample = |row: usize, col: usize| -> f32 {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let src_row =
                (row as isize + ki as isize - radius as isize).clamp(0, h as isize - 1) as usize;
            sum += data[[src_row, col]] * kv;
        }
        sum
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        let rows: Vec<Vec<f32>> = (0..h)
            .into_par_iter()
            .map(|row| (0..w).map(|col| sample(row, col)).collect())
            .collect();
        collect_rows(rows, h, w)
    } else {
        Array2::from_shape_fn((h, w), |(row, col)| sample(row, col))
    }
}

fn collect_rows(rows: Vec<Vec<f32>>, h: usize, w: usize) -> Array2<f32> {
    let mut result = Array2::<f32>::zeros((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalized_and_sized_by_cut() {
        let k = make_gaussian_kernel(2.0, 3.0);
        assert_eq!(k.len(), 13);
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(k[6] > k[5] && k[5] > k[0]);
    }

    #[test]
    fn clamped_blur_keeps_constant_signal() {
        let out = gaussian_blur_1d(&[4.0; 7], 2.0, 3.0);
        assert!(out.iter().all(|v| (v - 4.0).abs() < 1e-12));
    }

    #[test]
    fn blur_spreads_an_impulse_symmetrically() {
        let mut signal = vec![0.0; 21];
        signal[10] = 1.0;
        let out = gaussian_blur_1d(&signal, 1.5, 3.0);
        assert!((out[9] - out[11]).abs() < 1e-15);
        assert!(out[10] < 1.0);
        assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }
}
