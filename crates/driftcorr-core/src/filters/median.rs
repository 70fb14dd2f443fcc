/// Sliding median along a 1D signal. `window` is odd; samples beyond either
/// end repeat the end value.
pub fn median_filter_1d(signal: &[f64], window: usize) -> Vec<f64> {
    let n = signal.len();
    if n == 0 || window <= 1 {
        return signal.to_vec();
    }
    let radius = (window / 2) as isize;
    let mut values = vec![0.0f64; 2 * radius as usize + 1];

    (0..n)
        .map(|i| {
            for (k, v) in values.iter_mut().enumerate() {
                let src = (i as isize + k as isize - radius).clamp(0, n as isize - 1);
                *v = signal[src as usize];
            }
            compute_median(&mut values)
        })
        .collect()
}

/// Median via `select_nth_unstable`, averaging the middle pair for even counts.
pub(crate) fn compute_median(values: &mut [f64]) -> f64 {
    let n = values.len();
    if n == 1 {
        values[0]
    } else if n % 2 == 1 {
        let mid = n / 2;
        *values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b)).1
    } else {
        let mid = n / 2;
        values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        values[..mid].select_nth_unstable_by(mid - 1, |a, b| a.total_cmp(b));
        (values[mid - 1] + values[mid]) / 2.0
    }
}
