#[allow(dead_code)]
mod common;

use driftcorr_core::align::{refine_peak, register_images, CorrelationMap, RefineParams};
use driftcorr_core::error::DriftError;
use driftcorr_core::kernel::{Kernel, KernelPair};
use ndarray::Array2;

fn params(kernel: Kernel) -> RefineParams {
    RefineParams {
        kernels: KernelPair::with_derivative(kernel).unwrap(),
        epsilon: 1e-4,
        max_iters: 100,
    }
}

/// Map of a smooth peak centred at offset `(px, py)`.
fn gaussian_map(radius: usize, px: f64, py: f64, sigma: f64) -> CorrelationMap {
    let size = 2 * radius + 1;
    let scores = Array2::from_shape_fn((size, size), |(row, col)| {
        let ox = col as f64 - radius as f64;
        let oy = row as f64 - radius as f64;
        (-((ox - px).powi(2) + (oy - py).powi(2)) / (2.0 * sigma * sigma)).exp()
    });
    CorrelationMap::from_scores(scores).unwrap()
}

// ---------------------------------------------------------------------------
// Refinement of synthetic maps
// ---------------------------------------------------------------------------

#[test]
fn test_refines_gaussian_peak_with_each_kernel() {
    let map = gaussian_map(10, 0.3, -0.2, 2.0);
    let best = map.best();
    assert_eq!((best.ox, best.oy), (0, 0));
    for kernel in [Kernel::CatmullRom, Kernel::BSpline3, Kernel::C4Hexic] {
        let r = refine_peak(&map, &best, &params(kernel)).unwrap();
        assert!(
            (r.offset.dx - 0.3).abs() < 0.08 && (r.offset.dy + 0.2).abs() < 0.08,
            "{}: refined to ({}, {})",
            kernel,
            r.offset.dx,
            r.offset.dy
        );
        assert!(r.iterations >= 1);
    }
}

#[test]
fn test_peak_on_grid_point_stays_put() {
    let map = gaussian_map(6, -2.0, 1.0, 1.5);
    let best = map.best();
    let r = refine_peak(&map, &best, &params(Kernel::CatmullRom)).unwrap();
    assert!((r.offset.dx + 2.0).abs() < 1e-3);
    assert!((r.offset.dy - 1.0).abs() < 1e-3);
}

#[test]
fn test_iteration_limit_is_a_convergence_failure() {
    let map = gaussian_map(10, 0.45, 0.4, 1.5);
    let best = map.best();
    let p = RefineParams {
        epsilon: 1e-12,
        max_iters: 1,
        ..params(Kernel::CatmullRom)
    };
    let result = refine_peak(&map, &best, &p);
    assert!(matches!(
        result,
        Err(DriftError::ConvergenceFailure { iterations: 1, .. })
    ));
}

#[test]
fn test_maximum_near_edge_is_too_close() {
    let map = gaussian_map(5, 4.0, 0.0, 1.5);
    let best = map.best();
    assert_eq!(best.ox, 4);
    // Catmull-Rom needs two samples on each side of the maximum.
    let result = refine_peak(&map, &best, &params(Kernel::CatmullRom));
    assert!(matches!(
        result,
        Err(DriftError::BoundaryTooClose { ox: 4, radius: 2, .. })
    ));
    // The nearest pair only needs the maximum itself inside.
    let nearest = RefineParams {
        kernels: KernelPair::NEAREST,
        ..params(Kernel::CatmullRom)
    };
    let r = refine_peak(&map, &best, &nearest).unwrap();
    assert_eq!(r.offset.dx, 4.0);
}

// ---------------------------------------------------------------------------
// End to end on noisy images
// ---------------------------------------------------------------------------

#[test]
fn test_noisy_integer_shift_is_recovered() {
    let (a, b) = common::shifted_pair(64, (3.0, -2.0), 5.0, 3);
    let reg = register_images(&a, &b, 10, &params(Kernel::CatmullRom)).unwrap();
    assert!((reg.shift().dx - 3.0).abs() < 0.5);
    assert!((reg.shift().dy + 2.0).abs() < 0.5);
}

#[test]
fn test_fractional_shift_is_refined_past_integer_grid() {
    let (a, b) = common::shifted_pair(64, (2.4, -1.3), 2.0, 17);
    let reg = register_images(&a, &b, 10, &params(Kernel::C4Hexic)).unwrap();
    assert_eq!((reg.discrete.ox, reg.discrete.oy), (2, -1));
    assert!((reg.shift().dx - 2.4).abs() < 0.25);
    assert!((reg.shift().dy + 1.3).abs() < 0.25);
}

#[test]
fn test_small_bound_reports_boundary() {
    let (a, b) = common::shifted_pair(64, (2.0, 2.0), 5.0, 3);
    let result = register_images(&a, &b, 2, &params(Kernel::CatmullRom));
    assert!(matches!(result, Err(DriftError::BoundaryTooClose { .. })));
}
