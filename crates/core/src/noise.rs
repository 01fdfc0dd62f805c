//! Two-dimensional Perlin noise field, normalized to [0, 1].
//!
//! A [`NoiseField`] is generated once per (permutation, size, scale) and then
//! sampled read-only by any number of path sessions. Values are stored in
//! row-major order.

use crate::error::WalkError;
use crate::permutation::{PermutationTable, PERMUTATION_SIZE};

/// Substitute scale used when the caller passes a non-positive (or NaN) scale,
/// or one so small that the lattice coordinates overflow.
///
/// This is a leniency policy carried over from the interactive tool: a bad
/// scale produces a very coarse field instead of an error.
pub const SCALE_EPSILON: f64 = 0.001;

/// Upper clamp for normalized sample coordinates, keeping the far edge of the
/// canvas inside the last grid cell.
pub const MAX_NORMALIZED: f64 = 0.99999;

/// Quintic fade `6t^5 - 15t^4 + 10t^3`.
///
/// First and second derivatives are zero at `t = 0` and `t = 1`, which hides
/// the lattice when interpolating between cells.
#[inline]
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product of `(dx, dy)` with one of the four diagonal gradients selected
/// by the low two bits of `hash`.
#[inline]
pub fn grad(hash: usize, dx: f64, dy: f64) -> f64 {
    let (u, v) = if hash & 3 < 2 { (dx, dy) } else { (dy, dx) };
    let u = if hash & 1 == 0 { u } else { -u };
    let v = if hash & 2 == 0 { v } else { -v };
    u + v
}

/// Splits a non-negative lattice coordinate into its reduced cell index and
/// fractional offset.
#[inline]
fn split(coord: f64) -> (usize, f64) {
    let cell = coord.floor();
    ((cell as usize) % PERMUTATION_SIZE, coord - cell)
}

/// Raw gradient noise at `(x, y)`, roughly in [-1, 1].
fn perlin(perm: &PermutationTable, x: f64, y: f64) -> f64 {
    let (xi, xf) = split(x);
    let (yi, yf) = split(y);

    let n00 = grad(perm.hash(xi, yi), xf, yf);
    let n10 = grad(perm.hash(xi + 1, yi), xf - 1.0, yf);
    let n01 = grad(perm.hash(xi, yi + 1), xf, yf - 1.0);
    let n11 = grad(perm.hash(xi + 1, yi + 1), xf - 1.0, yf - 1.0);

    let u = fade(xf);
    let v = fade(yf);
    lerp(lerp(n00, n10, u), lerp(n01, n11, u), v)
}

/// Distance between adjacent samples when `count` samples span `[0, count / scale)`.
#[inline]
fn lattice_step(count: usize, scale: f64) -> f64 {
    (count as f64 / scale) / count as f64
}

/// True when every sample coordinate along an axis of `count` cells is finite.
fn lattice_is_finite(count: usize, scale: f64) -> bool {
    let step = lattice_step(count, scale);
    step.is_finite() && (step * (count - 1) as f64).is_finite()
}

/// `count` evenly spaced samples over `[0, count / scale)`, endpoint excluded.
fn lattice_coords(count: usize, scale: f64) -> Vec<f64> {
    let step = lattice_step(count, scale);
    (0..count).map(|i| i as f64 * step).collect()
}

/// An immutable grid of Perlin noise values in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseField {
    width: usize,
    height: usize,
    scale: f64,
    data: Vec<f64>,
}

impl NoiseField {
    /// Generates a `width` x `height` noise grid.
    ///
    /// Cell `(i, j)` samples noise space at `(i / scale, j / scale)`, so larger
    /// scales zoom in. A non-positive or NaN `scale`, or a positive one small
    /// enough to overflow the lattice coordinates, is replaced by
    /// [`SCALE_EPSILON`]; [`NoiseField::scale`] reports the value actually used.
    ///
    /// Returns `WalkError::InvalidDimensions` if either dimension is zero or
    /// `width * height` overflows `usize`.
    pub fn generate(
        perm: &PermutationTable,
        width: usize,
        height: usize,
        scale: f64,
    ) -> Result<Self, WalkError> {
        let len = checked_len(width, height)?;
        let usable =
            scale > 0.0 && lattice_is_finite(width, scale) && lattice_is_finite(height, scale);
        let scale = if usable { scale } else { SCALE_EPSILON };

        let xs = lattice_coords(width, scale);
        let ys = lattice_coords(height, scale);

        let mut data = Vec::with_capacity(len);
        for &y in &ys {
            data.extend(xs.iter().map(|&x| (perlin(perm, x, y) + 1.0) * 0.5));
        }

        Ok(Self {
            width,
            height,
            scale,
            data,
        })
    }

    /// Creates a field filled with `value`, clamped to [0, 1] (NaN becomes 0).
    /// Scale is 1.
    pub fn filled(width: usize, height: usize, value: f64) -> Result<Self, WalkError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            scale: 1.0,
            data: vec![unit_value(value); len],
        })
    }

    /// Creates a field from pre-built row-major data.
    ///
    /// Values are clamped to [0, 1] and NaN becomes 0, so the range invariant
    /// holds for every field regardless of origin.
    pub fn from_data(width: usize, height: usize, data: Vec<f64>) -> Result<Self, WalkError> {
        let len = checked_len(width, height)?;
        if data.len() != len {
            return Err(WalkError::InvalidDimensions);
        }
        Ok(Self {
            width,
            height,
            scale: 1.0,
            data: data.into_iter().map(unit_value).collect(),
        })
    }

    /// Field width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Field height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The effective scale the field was generated with.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Row-major values.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Value at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// Samples the cell covering normalized position `(nx, ny)`.
    ///
    /// Both coordinates are clamped to `[0, MAX_NORMALIZED]` and scaled by the
    /// grid size, then truncated. Any finite or non-finite input maps to a
    /// valid cell.
    pub fn sample_normalized(&self, nx: f64, ny: f64) -> f64 {
        let ix = cell_index(nx, self.width);
        let iy = cell_index(ny, self.height);
        self.data[iy * self.width + ix]
    }

    /// Iterates over all cells yielding `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.data.iter().enumerate().map(|(i, &v)| {
            let x = i % self.width;
            let y = i / self.width;
            (x, y, v)
        })
    }
}

fn checked_len(width: usize, height: usize) -> Result<usize, WalkError> {
    if width == 0 || height == 0 {
        return Err(WalkError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(WalkError::InvalidDimensions)
}

fn unit_value(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

fn cell_index(normalized: f64, size: usize) -> usize {
    // NaN clamps to NaN and casts to 0.
    let n = normalized.clamp(0.0, MAX_NORMALIZED);
    ((n * size as f64) as usize).min(size - 1)
}
