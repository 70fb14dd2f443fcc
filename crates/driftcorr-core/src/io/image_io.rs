use std::path::Path;

use image::{DynamicImage, Luma};
use ndarray::Array2;
use tracing::debug;

use crate::align::CorrelationMap;
use crate::error::{DriftError, Result};
use crate::filters::gaussian_blur::gaussian_blur_array;
use crate::frame::{ImageBuffer, Projection, ProjectionSet};

use super::layout::projection_path;

/// Load a single-channel 8- or 16-bit image. Anything else is rejected.
pub fn load_image(path: &Path) -> Result<ImageBuffer> {
    let img = image::open(path)?;
    let (w, h) = (img.width() as usize, img.height() as usize);
    match img {
        DynamicImage::ImageLuma8(buf) => ImageBuffer::from_u8(w, h, buf.into_raw()),
        DynamicImage::ImageLuma16(buf) => ImageBuffer::from_u16(w, h, buf.into_raw()),
        other => Err(DriftError::InvalidInput(format!(
            "{}: expected a single-channel integer image, got {:?}",
            path.display(),
            other.color()
        ))),
    }
}

/// Load the XY, XZ and YZ projections of `frame` from `dir`.
pub fn load_projection_set(dir: &Path, frame: usize) -> Result<ProjectionSet> {
    let [xy, xz, yz] = Projection::ALL.map(|p| load_image(&projection_path(dir, frame, p)));
    let set = ProjectionSet {
        xy: xy?,
        xz: xz?,
        yz: yz?,
    };
    debug!(frame, dir = %dir.display(), "Projections loaded");
    Ok(set)
}

/// Save a 16-bit single-channel image as PNG or TIFF, by file extension.
pub fn save_u16(data: &Array2<u16>, path: &Path) -> Result<()> {
    let (h, w) = data.dim();
    let pixels: Vec<u16> = data.iter().copied().collect();
    let img = image::ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .ok_or(DriftError::InvalidDimensions {
            width: w,
            height: h,
        })?;
    img.save(path)?;
    Ok(())
}

/// Save a correlation map as a 16-bit TIFF, min/max normalised. Cells
/// without a score are written as 0.
pub fn save_correlation_map(map: &CorrelationMap, path: &Path) -> Result<()> {
    let scores = map.scores();
    let quantized = quantize_u16(&scores.mapv(|v| v as f32));
    save_u16(&quantized, path)?;
    debug!(path = %path.display(), size = map.size(), "Correlation map saved");
    Ok(())
}

/// Blur a projection and requantize it to the full 16-bit range, ready for
/// [`search`](crate::align::search).
pub fn prepare_correlation_image(projection: &Array2<f32>, sigma: f32) -> Result<ImageBuffer> {
    let (h, w) = projection.dim();
    if h == 0 || w == 0 {
        return Err(DriftError::InvalidDimensions {
            width: w,
            height: h,
        });
    }
    if !(sigma >= 0.0) {
        return Err(DriftError::InvalidInput(format!(
            "blur sigma must be non-negative, got {}",
            sigma
        )));
    }
    let blurred = if sigma > 0.0 {
        gaussian_blur_array(projection, sigma)
    } else {
        projection.clone()
    };
    Ok(ImageBuffer::from(quantize_u16(&blurred)))
}

/// Linear map of the finite range onto `0..=65535`. Non-finite samples and
/// constant images map to 0.
fn quantize_u16(data: &Array2<f32>) -> Array2<u16> {
    let (lo, hi) = data
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = hi - lo;
    if !(range > 0.0) {
        return Array2::zeros(data.dim());
    }
    data.mapv(|v| {
        if v.is_finite() {
            ((v - lo) / range * 65535.0).round().clamp(0.0, 65535.0) as u16
        } else {
            0
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn quantize_spans_full_range() {
        let q = quantize_u16(&array![[1.0, 2.0], [3.0, f32::NAN]]);
        assert_eq!(q, array![[0, 32768], [65535, 0]]);
    }

    #[test]
    fn constant_image_quantizes_to_zero() {
        let q = quantize_u16(&Array2::from_elem((3, 3), 7.0));
        assert!(q.iter().all(|&v| v == 0));
    }

    #[test]
    fn prepared_image_is_u16() {
        let data = Array2::from_shape_fn((16, 16), |(r, c)| (r * c) as f32);
        let img = prepare_correlation_image(&data, 1.0).unwrap();
        assert!(img.is_integer());
        assert_eq!(img.dim(), (16, 16));
    }
}
