use std::fmt;
use std::ops::{Add, Index};

use ndarray::Array2;
use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{DriftError, Result};

/// Sample storage of an [`ImageBuffer`], row-major with shape `(height, width)`.
#[derive(Clone, Debug)]
pub enum Samples {
    U8(Array2<u8>),
    U16(Array2<u16>),
    F32(Array2<f32>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleType {
    U8,
    U16,
    F32,
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::F32 => write!(f, "f32"),
        }
    }
}

/// A single-channel 2D image, read-only once constructed.
#[derive(Clone, Debug)]
pub struct ImageBuffer {
    samples: Samples,
}

impl ImageBuffer {
    pub fn from_u8(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let array = shape_checked(width, height, data)?;
        Ok(Self {
            samples: Samples::U8(array),
        })
    }

    pub fn from_u16(width: usize, height: usize, data: Vec<u16>) -> Result<Self> {
        let array = shape_checked(width, height, data)?;
        Ok(Self {
            samples: Samples::U16(array),
        })
    }

    pub fn from_f32(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        let array = shape_checked(width, height, data)?;
        Ok(Self {
            samples: Samples::F32(array),
        })
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub fn width(&self) -> usize {
        self.dim().1
    }

    pub fn height(&self) -> usize {
        self.dim().0
    }

    /// `(height, width)`, matching ndarray's row-major shape.
    pub fn dim(&self) -> (usize, usize) {
        match &self.samples {
            Samples::U8(a) => a.dim(),
            Samples::U16(a) => a.dim(),
            Samples::F32(a) => a.dim(),
        }
    }

    pub fn sample_type(&self) -> SampleType {
        match &self.samples {
            Samples::U8(_) => SampleType::U8,
            Samples::U16(_) => SampleType::U16,
            Samples::F32(_) => SampleType::F32,
        }
    }

    pub fn is_integer(&self) -> bool {
        !matches!(self.samples, Samples::F32(_))
    }

    /// Widen every sample to `f64`.
    pub fn to_f64(&self) -> Array2<f64> {
        match &self.samples {
            Samples::U8(a) => widen(a),
            Samples::U16(a) => widen(a),
            Samples::F32(a) => widen(a),
        }
    }
}

impl From<Array2<u8>> for ImageBuffer {
    fn from(array: Array2<u8>) -> Self {
        Self {
            samples: Samples::U8(array),
        }
    }
}

impl From<Array2<u16>> for ImageBuffer {
    fn from(array: Array2<u16>) -> Self {
        Self {
            samples: Samples::U16(array),
        }
    }
}

impl From<Array2<f32>> for ImageBuffer {
    fn from(array: Array2<f32>) -> Self {
        Self {
            samples: Samples::F32(array),
        }
    }
}

fn shape_checked<T>(width: usize, height: usize, data: Vec<T>) -> Result<Array2<T>> {
    if width == 0 || height == 0 {
        return Err(DriftError::InvalidDimensions { width, height });
    }
    let len = data.len();
    Array2::from_shape_vec((height, width), data).map_err(|_| {
        DriftError::InvalidInput(format!(
            "buffer holds {} samples, {}x{} image needs {}",
            len,
            width,
            height,
            width * height
        ))
    })
}

fn widen<T: AsPrimitive<f64>>(array: &Array2<T>) -> Array2<f64> {
    array.mapv(|v| v.as_())
}

/// Physical axis of the volumetric data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis3 {
    X,
    Y,
    Z,
}

/// One of the three canonical 2D projections of a volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Projection {
    XY,
    XZ,
    YZ,
}

impl Projection {
    pub const ALL: [Projection; 3] = [Projection::XY, Projection::XZ, Projection::YZ];

    /// Physical axes along the image columns and rows, in that order.
    pub fn axes(self) -> (Axis3, Axis3) {
        match self {
            Self::XY => (Axis3::X, Axis3::Y),
            Self::XZ => (Axis3::X, Axis3::Z),
            Self::YZ => (Axis3::Y, Axis3::Z),
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XY => write!(f, "XY"),
            Self::XZ => write!(f, "XZ"),
            Self::YZ => write!(f, "YZ"),
        }
    }
}

/// The XY, XZ and YZ projections of one volumetric time frame.
#[derive(Clone, Debug)]
pub struct ProjectionSet {
    pub xy: ImageBuffer,
    pub xz: ImageBuffer,
    pub yz: ImageBuffer,
}

impl ProjectionSet {
    pub fn get(&self, projection: Projection) -> &ImageBuffer {
        match projection {
            Projection::XY => &self.xy,
            Projection::XZ => &self.xz,
            Projection::YZ => &self.yz,
        }
    }
}

/// Real-valued 2D offset in pixels, `dx` along columns and `dy` along rows.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset2D {
    pub dx: f64,
    pub dy: f64,
}

impl Offset2D {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// Real-valued 3D offset in voxels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset3D {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Offset3D {
    pub const ZERO: Offset3D = Offset3D {
        dx: 0.0,
        dy: 0.0,
        dz: 0.0,
    };

    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }

    pub fn component(&self, axis: Axis3) -> f64 {
        match axis {
            Axis3::X => self.dx,
            Axis3::Y => self.dy,
            Axis3::Z => self.dz,
        }
    }

    pub fn from_components(c: [f64; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }

    pub fn components(&self) -> [f64; 3] {
        [self.dx, self.dy, self.dz]
    }
}

impl Add for Offset3D {
    type Output = Offset3D;

    fn add(self, rhs: Offset3D) -> Offset3D {
        Offset3D::new(self.dx + rhs.dx, self.dy + rhs.dy, self.dz + rhs.dz)
    }
}

/// Physical voxel spacing of a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpacingVector {
    pub xs: f64,
    pub ys: f64,
    pub zs: f64,
}

impl SpacingVector {
    /// Convert a voxel offset into a physical-space delta.
    pub fn scale(&self, offset: Offset3D) -> [f64; 3] {
        [
            self.xs * offset.dx,
            self.ys * offset.dy,
            self.zs * offset.dz,
        ]
    }
}

/// Registration output for one adjacent frame pair: the shift of `frame`
/// relative to `frame - 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairwiseShift {
    pub frame: usize,
    pub shift: Offset3D,
}

impl PairwiseShift {
    /// The `(0, 0, 0, 0)` row emitted when there is no previous frame.
    pub fn sentinel() -> Self {
        Self {
            frame: 0,
            shift: Offset3D::ZERO,
        }
    }

    pub fn to_record(&self) -> [f64; 4] {
        [
            self.shift.dx,
            self.shift.dy,
            self.shift.dz,
            self.frame as f64,
        ]
    }
}

/// Absolute per-frame offsets relative to frame 0. Index 0 is always the
/// identity.
#[derive(Clone, Debug, PartialEq)]
pub struct ShiftSequence {
    offsets: Vec<Offset3D>,
}

impl ShiftSequence {
    pub fn identity() -> Self {
        Self {
            offsets: vec![Offset3D::ZERO],
        }
    }

    pub(crate) fn from_vec(offsets: Vec<Offset3D>) -> Self {
        debug_assert!(!offsets.is_empty());
        Self { offsets }
    }

    pub(crate) fn push(&mut self, offset: Offset3D) {
        self.offsets.push(offset);
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn last(&self) -> Offset3D {
        self.offsets.last().copied().unwrap_or_default()
    }

    pub fn as_slice(&self) -> &[Offset3D] {
        &self.offsets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Offset3D> {
        self.offsets.iter()
    }

    /// One component of every offset, in frame order.
    pub fn axis(&self, axis: Axis3) -> Vec<f64> {
        self.offsets.iter().map(|o| o.component(axis)).collect()
    }
}

impl Index<usize> for ShiftSequence {
    type Output = Offset3D;

    fn index(&self, index: usize) -> &Offset3D {
        &self.offsets[index]
    }
}

impl<'a> IntoIterator for &'a ShiftSequence {
    type Item = &'a Offset3D;
    type IntoIter = std::slice::Iter<'a, Offset3D>;

    fn into_iter(self) -> Self::IntoIter {
        self.offsets.iter()
    }
}
