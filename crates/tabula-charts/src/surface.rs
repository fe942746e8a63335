//! Drawing-surface abstraction and the geometry it speaks
//!
//! Renderers never touch a canvas directly: they emit rectangles, wedges,
//! lines and text through [`DrawingSurface`]. Coordinates are surface
//! pixels with the y axis pointing down; angles are radians increasing
//! clockwise on screen, with `-PI/2` at twelve o'clock.

use crate::layout::SurfaceMetrics;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tabula_core::Color;

const ELLIPSIS: &str = "…";

// ============================================================================
// GEOMETRY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` along `angle` from this point
    pub fn polar(&self, radius: f64, angle: f64) -> Self {
        Self::new(self.x + radius * angle.cos(), self.y + radius * angle.sin())
    }

    pub fn distance(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive on every edge
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn inset(&self, amount: f64) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }
}

/// Annular wedge; `inner_radius = 0` is a plain pie slice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub center: Point,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl Sector {
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }

    /// Same angles, both radii multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            inner_radius: self.inner_radius * factor,
            outer_radius: self.outer_radius * factor,
            ..*self
        }
    }

    /// Polar hit test: radius within the ring and angle within the sweep,
    /// with both angles folded into `[0, 2PI)` and wraparound handled
    pub fn contains(&self, p: Point) -> bool {
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        let r = dx.hypot(dy);
        if r < self.inner_radius || r > self.outer_radius {
            return false;
        }

        let sweep = self.sweep();
        if sweep >= TAU {
            return true;
        }
        if sweep <= 0.0 {
            return false;
        }

        let angle = normalize_angle(dy.atan2(dx));
        let start = normalize_angle(self.start_angle);
        let end = normalize_angle(self.end_angle);
        if start <= end {
            angle >= start && angle <= end
        } else {
            angle >= start || angle <= end
        }
    }
}

/// Fold any angle into `[0, 2PI)`
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU { 0.0 } else { a }
}

// ============================================================================
// TEXT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextBaseline {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: f64,
    pub color: Color,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    pub bold: bool,
    /// Clockwise rotation in radians about the anchor
    pub rotation: f64,
}

impl TextStyle {
    pub fn new(size: f64, color: Color) -> Self {
        Self {
            size,
            color,
            ..Self::default()
        }
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn baseline(mut self, baseline: TextBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn rotated(mut self, radians: f64) -> Self {
        self.rotation = radians;
        self
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 12.0,
            color: tabula_core::colors::TEXT_DARK,
            align: TextAlign::Left,
            baseline: TextBaseline::Middle,
            bold: false,
            rotation: 0.0,
        }
    }
}

// ============================================================================
// STRATEGY PATTERN: Drawing Surface
// ============================================================================

/// Primitive drawing capability consumed by the renderers
pub trait DrawingSurface {
    /// Nominal size and, when known, the displayed (CSS) size
    fn metrics(&self) -> SurfaceMetrics;

    /// Color the chart background is painted with
    fn background(&self) -> Color;

    fn fill_rect(&mut self, rect: Rect, fill: Color);

    fn stroke_rect(&mut self, rect: Rect, stroke: Color, width: f64);

    fn fill_sector(&mut self, sector: Sector, fill: Color);

    fn fill_circle(&mut self, center: Point, radius: f64, fill: Color);

    fn line(&mut self, from: Point, to: Point, stroke: Color, width: f64);

    fn polyline(&mut self, points: &[Point], stroke: Color, width: f64) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], stroke, width);
        }
    }

    fn text(&mut self, text: &str, at: Point, style: &TextStyle);

    /// Rendered width of `text` at font `size`
    fn measure_text(&self, text: &str, size: f64) -> f64;
}

/// Trim characters off `text` until it plus an ellipsis fits `max_width`.
///
/// Text that already fits is returned unchanged; if not even the ellipsis
/// fits the result is empty.
pub fn truncate_to_width<F>(text: &str, max_width: f64, size: f64, measure: F) -> String
where
    F: Fn(&str, f64) -> f64,
{
    if measure(text, size) <= max_width {
        return text.to_string();
    }

    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>().trim_end().to_string() + ELLIPSIS;
        if measure(&candidate, size) <= max_width {
            return candidate;
        }
    }

    if measure(ELLIPSIS, size) <= max_width {
        ELLIPSIS.to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn chars_measure(text: &str, size: f64) -> f64 {
        text.chars().count() as f64 * size * 0.5
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(10.0, 10.0, 20.0, 5.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(30.0, 15.0)));
        assert!(!r.contains(Point::new(30.1, 15.0)));
    }

    #[test]
    fn test_sector_hit_test_with_wraparound() {
        // from 10 o'clock through 12 to 2 o'clock: crosses angle 0 after folding
        let s = Sector {
            center: Point::new(0.0, 0.0),
            inner_radius: 0.0,
            outer_radius: 10.0,
            start_angle: -FRAC_PI_2 - 0.5,
            end_angle: -FRAC_PI_2 + 0.5,
        };
        assert!(s.contains(Point::new(0.0, -5.0)));
        assert!(!s.contains(Point::new(0.0, 5.0)));
        assert!(!s.contains(Point::new(0.0, -11.0)));

        let wrap = Sector {
            start_angle: 1.5 * PI,
            end_angle: 2.5 * PI,
            ..s
        };
        // straight right is angle 0, inside [270deg, 450deg)
        assert!(wrap.contains(Point::new(5.0, 0.0)));
        assert!(!wrap.contains(Point::new(-5.0, 0.0)));
    }

    #[test]
    fn test_sector_ring_bounds() {
        let ring = Sector {
            center: Point::new(50.0, 50.0),
            inner_radius: 20.0,
            outer_radius: 40.0,
            start_angle: -FRAC_PI_2,
            end_angle: -FRAC_PI_2 + TAU,
        };
        assert!(!ring.contains(Point::new(55.0, 50.0)));
        assert!(ring.contains(Point::new(80.0, 50.0)));
        assert!(!ring.contains(Point::new(95.0, 50.0)));
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(-FRAC_PI_2) - 1.5 * PI).abs() < 1e-12);
        assert_eq!(normalize_angle(TAU), 0.0);
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("Sales", 100.0, 10.0, chars_measure), "Sales");
        // 5 px per char: 20 px fits 4 chars including the ellipsis
        assert_eq!(truncate_to_width("Research", 20.0, 10.0, chars_measure), "Res…");
        assert_eq!(truncate_to_width("Research", 2.0, 10.0, chars_measure), "");
    }
}
