//! Pure-computation pixel buffers from a [`NoiseField`] plus a path overlay.
//!
//! This module is always available (no feature gate); the `png` snapshot
//! path and any other presentation layer share the same conversion and the
//! same rasterizer.

use glam::DVec2;
use noise_walk_core::{NoiseField, Point2D, WalkError};

/// RGBA8 color.
pub type Rgba = [u8; 4];

pub const PATH_COLOR: Rgba = [0, 0, 0, 255];
pub const START_COLOR: Rgba = [255, 0, 0, 255];
pub const TARGET_COLOR: Rgba = [0, 0, 255, 255];

/// Path stroke width in pixels (round caps).
pub const PATH_WIDTH: f64 = 2.0;
pub const MARKER_RADIUS: f64 = 6.0;
/// Ring stroke width, centered on [`MARKER_RADIUS`].
pub const MARKER_OUTLINE: f64 = 3.0;

/// Segments shorter than this on both axes are not drawn.
const MIN_SEGMENT_DELTA: f64 = 1e-6;

/// Maps field values to 8-bit gray: `v * 255`, clamped, then truncated.
pub fn field_to_gray(field: &NoiseField) -> Vec<u8> {
    field.data().iter().map(|&v| to_gray(v)).collect()
}

/// Same as [`field_to_gray`] but as opaque RGBA8 (`width * height * 4` bytes).
pub fn field_to_rgba(field: &NoiseField) -> Vec<u8> {
    field
        .data()
        .iter()
        .flat_map(|&v| {
            let g = to_gray(v);
            [g, g, g, 255u8]
        })
        .collect()
}

fn to_gray(v: f64) -> u8 {
    (v * 255.0).clamp(0.0, 255.0) as u8
}

/// A traversal drawn over the noise background: the path polyline and the
/// A (red) / B (blue) ring markers, in canvas coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    start: Option<Point2D>,
    target: Option<Point2D>,
    points: Vec<Point2D>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay with both markers and no path yet.
    pub fn with_endpoints(start: Point2D, target: Point2D) -> Self {
        Self {
            start: Some(start),
            target: Some(target),
            points: Vec::new(),
        }
    }

    pub fn set_endpoints(&mut self, start: Point2D, target: Point2D) {
        self.start = Some(start);
        self.target = Some(target);
    }

    /// Appends a path vertex.
    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    /// Removes the path, keeping the markers.
    pub fn clear_path(&mut self) {
        self.points.clear();
    }

    pub fn start(&self) -> Option<Point2D> {
        self.start
    }

    pub fn target(&self) -> Option<Point2D> {
        self.target
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// Consecutive vertex pairs, skipping zero-length segments.
    pub fn segments(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        self.points
            .windows(2)
            .map(|w| (w[0], w[1]))
            .filter(|(a, b)| {
                (a.x - b.x).abs() > MIN_SEGMENT_DELTA || (a.y - b.y).abs() > MIN_SEGMENT_DELTA
            })
    }

    /// Rasterizes the overlay into an RGBA8 buffer of `width` x `height`.
    ///
    /// Markers are drawn first and the path on top. Anything outside the
    /// buffer is clipped. Returns `InvalidDimensions` if the buffer length
    /// does not match.
    pub fn draw(&self, rgba: &mut [u8], width: usize, height: usize) -> Result<(), WalkError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(WalkError::InvalidDimensions)?;
        if rgba.len() != expected || expected == 0 {
            return Err(WalkError::InvalidDimensions);
        }
        let mut canvas = Raster {
            rgba,
            width,
            height,
        };

        if let Some(a) = self.start {
            canvas.ring(a, MARKER_RADIUS, MARKER_OUTLINE, START_COLOR);
        }
        if let Some(b) = self.target {
            canvas.ring(b, MARKER_RADIUS, MARKER_OUTLINE, TARGET_COLOR);
        }
        for (a, b) in self.segments() {
            canvas.stroke(a, b, PATH_WIDTH, PATH_COLOR);
        }
        Ok(())
    }
}

struct Raster<'a> {
    rgba: &'a mut [u8],
    width: usize,
    height: usize,
}

impl Raster<'_> {
    /// Paints every pixel whose center satisfies `inside`, scanning the
    /// bounding box `[min, max]` clipped to the buffer.
    fn fill_where(&mut self, min: DVec2, max: DVec2, color: Rgba, inside: impl Fn(DVec2) -> bool) {
        let clip = |v: f64, len: usize| v.clamp(0.0, len as f64) as usize;
        let (x0, x1) = (clip(min.x.floor(), self.width), clip(max.x.ceil(), self.width));
        let (y0, y1) = (clip(min.y.floor(), self.height), clip(max.y.ceil(), self.height));
        for y in y0..y1 {
            for x in x0..x1 {
                let center = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                if inside(center) {
                    let i = (y * self.width + x) * 4;
                    self.rgba[i..i + 4].copy_from_slice(&color);
                }
            }
        }
    }

    /// Thick line with round caps.
    fn stroke(&mut self, a: Point2D, b: Point2D, width: f64, color: Rgba) {
        let (a, b) = (DVec2::from(a), DVec2::from(b));
        let half = width * 0.5;
        let pad = DVec2::splat(half);
        let ab = b - a;
        let len_sq = ab.length_squared();
        self.fill_where(a.min(b) - pad, a.max(b) + pad, color, |p| {
            let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
            p.distance(a + ab * t) <= half
        });
    }

    /// Circle outline of `radius`, `outline` pixels thick.
    fn ring(&mut self, center: Point2D, radius: f64, outline: f64, color: Rgba) {
        let c = DVec2::from(center);
        let half = outline * 0.5;
        let reach = DVec2::splat(radius + half);
        self.fill_where(c - reach, c + reach, color, |p| {
            (p.distance(c) - radius).abs() <= half
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(width: usize, height: usize) -> Vec<u8> {
        vec![200; width * height * 4]
    }

    fn pixel(buf: &[u8], width: usize, x: usize, y: usize) -> Rgba {
        let i = (y * width + x) * 4;
        [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
    }

    #[test]
    fn field_to_gray_truncates_and_scales() {
        let field = NoiseField::from_data(4, 1, vec![0.0, 1.0, 0.25, 0.3]).unwrap();
        assert_eq!(field_to_gray(&field), vec![0, 255, 63, 76]);
        let half = NoiseField::filled(2, 2, 0.5).unwrap();
        assert_eq!(field_to_gray(&half), vec![127; 4]);
    }

    #[test]
    fn field_to_rgba_correct_length_and_opaque() {
        let field = NoiseField::filled(8, 4, 0.3).unwrap();
        let buf = field_to_rgba(&field);
        assert_eq!(buf.len(), 8 * 4 * 4);
        for px in buf.chunks_exact(4) {
            assert_eq!(px[3], 255);
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn draw_rejects_mismatched_buffer() {
        let overlay = Overlay::new();
        let mut buf = vec![0; 10];
        assert!(matches!(
            overlay.draw(&mut buf, 4, 4),
            Err(WalkError::InvalidDimensions)
        ));
    }

    #[test]
    fn horizontal_segment_is_two_pixels_thick() {
        let mut overlay = Overlay::new();
        overlay.push(Point2D::new(2.0, 5.0));
        overlay.push(Point2D::new(17.0, 5.0));
        let mut buf = blank(20, 10);
        overlay.draw(&mut buf, 20, 10).unwrap();

        assert_eq!(pixel(&buf, 20, 10, 4), PATH_COLOR);
        assert_eq!(pixel(&buf, 20, 10, 5), PATH_COLOR);
        assert_eq!(pixel(&buf, 20, 10, 3), [200; 4]);
        assert_eq!(pixel(&buf, 20, 10, 6), [200; 4]);
        // Round cap reaches one pixel past each end, no further.
        assert_eq!(pixel(&buf, 20, 1, 5), PATH_COLOR);
        assert_eq!(pixel(&buf, 20, 0, 5), [200; 4]);
        assert_eq!(pixel(&buf, 20, 18, 5), [200; 4]);
    }

    #[test]
    fn markers_are_rings_in_endpoint_colors() {
        let overlay = Overlay::with_endpoints(Point2D::new(10.5, 10.5), Point2D::new(30.5, 10.5));
        let mut buf = blank(41, 21);
        overlay.draw(&mut buf, 41, 21).unwrap();

        assert_eq!(pixel(&buf, 41, 16, 10), START_COLOR);
        assert_eq!(pixel(&buf, 41, 4, 10), START_COLOR);
        assert_eq!(pixel(&buf, 41, 10, 10), [200; 4], "ring center stays empty");
        assert_eq!(pixel(&buf, 41, 13, 10), [200; 4]);
        assert_eq!(pixel(&buf, 41, 18, 10), [200; 4]);
        assert_eq!(pixel(&buf, 41, 36, 10), TARGET_COLOR);
    }

    #[test]
    fn path_is_drawn_over_markers() {
        let mut overlay = Overlay::with_endpoints(Point2D::new(10.5, 10.5), Point2D::new(30.5, 10.5));
        overlay.push(Point2D::new(10.5, 10.5));
        overlay.push(Point2D::new(30.5, 10.5));
        let mut buf = blank(41, 21);
        overlay.draw(&mut buf, 41, 21).unwrap();
        assert_eq!(pixel(&buf, 41, 16, 10), PATH_COLOR);
        assert_eq!(pixel(&buf, 41, 10, 4), START_COLOR);
    }

    #[test]
    fn zero_length_segments_are_skipped() {
        let mut overlay = Overlay::new();
        overlay.push(Point2D::new(5.0, 5.0));
        overlay.push(Point2D::new(5.0, 5.0 + 1e-9));
        assert_eq!(overlay.segments().count(), 0);
        let mut buf = blank(10, 10);
        overlay.draw(&mut buf, 10, 10).unwrap();
        assert!(buf.iter().all(|&b| b == 200));
    }

    #[test]
    fn off_canvas_geometry_is_clipped() {
        let mut overlay = Overlay::with_endpoints(Point2D::new(-50.0, -50.0), Point2D::new(500.0, 3.0));
        overlay.push(Point2D::new(-100.0, 2.0));
        overlay.push(Point2D::new(100.0, 2.0));
        let mut buf = blank(8, 8);
        overlay.draw(&mut buf, 8, 8).unwrap();
        assert_eq!(pixel(&buf, 8, 4, 2), PATH_COLOR);
        assert_eq!(pixel(&buf, 8, 4, 6), [200; 4]);
    }

    #[test]
    fn clear_path_keeps_markers() {
        let mut overlay = Overlay::with_endpoints(Point2D::new(1.0, 1.0), Point2D::new(2.0, 2.0));
        overlay.push(Point2D::new(1.0, 1.0));
        overlay.clear_path();
        assert!(overlay.points().is_empty());
        assert_eq!(overlay.start(), Some(Point2D::new(1.0, 1.0)));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn drawing_never_panics_and_only_uses_overlay_colors(
                pts in proptest::collection::vec((-50.0_f64..80.0, -50.0_f64..80.0), 0..20),
            ) {
                let mut overlay = Overlay::with_endpoints(Point2D::new(5.0, 5.0), Point2D::new(25.0, 20.0));
                for (x, y) in pts {
                    overlay.push(Point2D::new(x, y));
                }
                let mut buf = blank(32, 24);
                overlay.draw(&mut buf, 32, 24).unwrap();
                for px in buf.chunks_exact(4) {
                    let px: Rgba = [px[0], px[1], px[2], px[3]];
                    prop_assert!(
                        px == [200; 4] || px == PATH_COLOR || px == START_COLOR || px == TARGET_COLOR
                    );
                }
            }
        }
    }
}
