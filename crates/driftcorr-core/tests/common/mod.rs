use driftcorr_core::frame::{ImageBuffer, Offset3D, ProjectionSet};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Isotropic Gaussian blob in volume coordinates.
#[derive(Clone, Copy, Debug)]
pub struct Blob {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub amplitude: f64,
    pub sigma: f64,
}

/// Random blobs scattered over (and slightly beyond) a `size`³ volume.
pub fn random_blobs(size: usize, count: usize, seed: u64) -> Vec<Blob> {
    let mut rng = StdRng::seed_from_u64(seed);
    let hi = size as f64 + 5.0;
    (0..count)
        .map(|_| Blob {
            x: rng.random_range(-5.0..hi),
            y: rng.random_range(-5.0..hi),
            z: rng.random_range(-5.0..hi),
            amplitude: rng.random_range(1500.0..4000.0),
            sigma: rng.random_range(2.5..6.0),
        })
        .collect()
}

/// Standard normal sample via Box-Muller.
pub fn gauss(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.random_range(f64::EPSILON..1.0);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Render `f(col + shift.0, row + shift.1) + noise` as a 16-bit image, where
/// `f` sums the 2D footprints of `blobs` over the axes picked by `coords`.
pub fn render<F>(
    width: usize,
    height: usize,
    blobs: &[Blob],
    coords: F,
    shift: (f64, f64),
    noise: f64,
    rng: &mut StdRng,
) -> ImageBuffer
where
    F: Fn(&Blob) -> (f64, f64),
{
    let data = Array2::from_shape_fn((height, width), |(row, col)| {
        let x = col as f64 + shift.0;
        let y = row as f64 + shift.1;
        let v: f64 = blobs
            .iter()
            .map(|b| {
                let (bx, by) = coords(b);
                let d2 = (x - bx).powi(2) + (y - by).powi(2);
                b.amplitude * (-d2 / (2.0 * b.sigma * b.sigma)).exp()
            })
            .sum();
        let n = if noise > 0.0 { noise * gauss(rng) } else { 0.0 };
        (100.0 + v + n).round().clamp(0.0, 65535.0) as u16
    });
    ImageBuffer::from(data)
}

/// Image pair with `B(x, y) = A(x + shift.0, y + shift.1)` plus independent noise.
pub fn shifted_pair(
    size: usize,
    shift: (f64, f64),
    noise: f64,
    seed: u64,
) -> (ImageBuffer, ImageBuffer) {
    let blobs = random_blobs(size, 14, seed);
    let mut rng = StdRng::seed_from_u64(seed + 1);
    let xy = |b: &Blob| (b.x, b.y);
    let a = render(size, size, &blobs, xy, (0.0, 0.0), noise, &mut rng);
    let b = render(size, size, &blobs, xy, shift, noise, &mut rng);
    (a, b)
}

/// Projections of a blob volume whose content at frame `i` is the frame-0
/// content sampled at `p + drift[i]`.
pub fn drifting_sequence(size: usize, drift: &[Offset3D], seed: u64) -> Vec<ProjectionSet> {
    let blobs = random_blobs(size, 24, seed);
    let mut rng = StdRng::seed_from_u64(seed + 1);
    drift
        .iter()
        .map(|d| ProjectionSet {
            xy: render(size, size, &blobs, |b| (b.x, b.y), (d.dx, d.dy), 2.0, &mut rng),
            xz: render(size, size, &blobs, |b| (b.x, b.z), (d.dx, d.dz), 2.0, &mut rng),
            yz: render(size, size, &blobs, |b| (b.y, b.z), (d.dy, d.dz), 2.0, &mut rng),
        })
        .collect()
}
