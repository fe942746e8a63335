//! Recording drawing surface
//!
//! `Scene` keeps every primitive it is asked to draw, in order. The SVG
//! components paint its shapes; tests inspect them directly.

use crate::chartkit::sector_path;
use crate::layout::SurfaceMetrics;
use crate::surface::{DrawingSurface, Point, Rect, Sector, TextStyle};
use serde::Serialize;
use tabula_core::{Color, colors};

/// Average glyph width as a share of the font size
pub const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// One recorded primitive
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Shape {
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<(Color, f64)>,
    },
    Sector {
        sector: Sector,
        fill: Color,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Color,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Color,
        width: f64,
    },
    Polyline {
        points: Vec<Point>,
        stroke: Color,
        width: f64,
    },
    Text {
        text: String,
        at: Point,
        style: TextStyle,
    },
}

impl Shape {
    /// SVG path data for sector shapes
    pub fn svg_path(&self) -> Option<String> {
        match self {
            Shape::Sector { sector, .. } => Some(sector_path(
                sector.center.x,
                sector.center.y,
                sector.inner_radius,
                sector.outer_radius,
                sector.start_angle,
                sector.end_angle,
            )),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Shape::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// In-memory [`DrawingSurface`]
#[derive(Debug, Clone)]
pub struct Scene {
    metrics: SurfaceMetrics,
    background: Color,
    shapes: Vec<Shape>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            metrics: SurfaceMetrics::new(width, height),
            background: colors::BACKGROUND,
            shapes: Vec::new(),
        }
    }

    pub fn with_metrics(metrics: SurfaceMetrics) -> Self {
        Self {
            metrics,
            background: colors::BACKGROUND,
            shapes: Vec::new(),
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn into_shapes(self) -> Vec<Shape> {
        self.shapes
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    pub fn texts(&self) -> Vec<&str> {
        self.shapes.iter().filter_map(Shape::as_text).collect()
    }

    pub fn sectors(&self) -> Vec<&Sector> {
        self.shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Sector { sector, .. } => Some(sector),
                _ => None,
            })
            .collect()
    }

    /// Filled rectangles, in draw order
    pub fn filled_rects(&self) -> Vec<(Rect, Color)> {
        self.shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Rect {
                    rect,
                    fill: Some(fill),
                    ..
                } => Some((*rect, *fill)),
                _ => None,
            })
            .collect()
    }
}

impl DrawingSurface for Scene {
    fn metrics(&self) -> SurfaceMetrics {
        self.metrics
    }

    fn background(&self) -> Color {
        self.background
    }

    fn fill_rect(&mut self, rect: Rect, fill: Color) {
        self.shapes.push(Shape::Rect {
            rect,
            fill: Some(fill),
            stroke: None,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Color, width: f64) {
        self.shapes.push(Shape::Rect {
            rect,
            fill: None,
            stroke: Some((stroke, width)),
        });
    }

    fn fill_sector(&mut self, sector: Sector, fill: Color) {
        self.shapes.push(Shape::Sector { sector, fill });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, fill: Color) {
        self.shapes.push(Shape::Circle { center, radius, fill });
    }

    fn line(&mut self, from: Point, to: Point, stroke: Color, width: f64) {
        self.shapes.push(Shape::Line {
            from,
            to,
            stroke,
            width,
        });
    }

    fn polyline(&mut self, points: &[Point], stroke: Color, width: f64) {
        self.shapes.push(Shape::Polyline {
            points: points.to_vec(),
            stroke,
            width,
        });
    }

    fn text(&mut self, text: &str, at: Point, style: &TextStyle) {
        self.shapes.push(Shape::Text {
            text: text.to_string(),
            at,
            style: *style,
        });
    }

    fn measure_text(&self, text: &str, size: f64) -> f64 {
        text.chars().count() as f64 * size * GLYPH_WIDTH_RATIO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut scene = Scene::new(100.0, 100.0);
        scene.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK);
        scene.text("hi", Point::new(5.0, 5.0), &TextStyle::default());
        scene.polyline(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)], Color::BLACK, 1.0);

        assert_eq!(scene.shapes().len(), 3);
        assert_eq!(scene.texts(), vec!["hi"]);
        assert_eq!(scene.filled_rects().len(), 1);
        assert!(matches!(scene.shapes()[2], Shape::Polyline { .. }));
    }

    #[test]
    fn test_measure_text() {
        let scene = Scene::new(10.0, 10.0);
        assert!((scene.measure_text("abcde", 10.0) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_sector_svg_path() {
        let shape = Shape::Sector {
            sector: Sector {
                center: Point::new(50.0, 50.0),
                inner_radius: 0.0,
                outer_radius: 10.0,
                start_angle: 0.0,
                end_angle: 1.0,
            },
            fill: Color::BLACK,
        };
        let path = shape.svg_path().unwrap();
        assert!(path.starts_with("M60.00,50.00"));
        assert!(path.contains('A'));
        assert!(path.ends_with('Z'));
    }
}
