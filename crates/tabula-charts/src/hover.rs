//! Per-frame hover resolution
//!
//! Renderers register one hit region per interactive element, in draw
//! order. After every chart has drawn, [`Frame::resolve`] tests the pointer
//! against the regions from the last registered to the first, so the
//! topmost element wins.

use crate::surface::{Point, Rect, Sector};
use serde::Serialize;

/// Geometry of an interactive element, in absolute surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum HitShape {
    Rect(Rect),
    Sector(Sector),
}

impl HitShape {
    pub fn contains(&self, p: Point) -> bool {
        match self {
            HitShape::Rect(r) => r.contains(p),
            HitShape::Sector(s) => s.contains(p),
        }
    }
}

/// An interactive element and the tooltip lines it shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitRegion {
    pub shape: HitShape,
    pub content: Vec<String>,
}

/// The single hovered element of a frame, if any
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HoverState {
    pub active: bool,
    pub pointer_x: f64,
    pub pointer_y: f64,
    pub content: Vec<String>,
}

impl HoverState {
    pub fn pointer(&self) -> Point {
        Point::new(self.pointer_x, self.pointer_y)
    }

    pub fn reset(&mut self) {
        self.active = false;
    }
}

/// One render pass: the pointer position and the regions drawn so far
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pointer: Option<Point>,
    regions: Vec<HitRegion>,
}

impl Frame {
    pub fn new(pointer: Option<Point>) -> Self {
        Self {
            pointer,
            regions: Vec::new(),
        }
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn regions(&self) -> &[HitRegion] {
        &self.regions
    }

    /// Register a region; returns its draw-order index
    pub fn register(&mut self, shape: HitShape, content: Vec<String>) -> usize {
        self.regions.push(HitRegion { shape, content });
        self.regions.len() - 1
    }

    /// Whether the pointer is over `shape` right now.
    ///
    /// Renderers use this for highlight feedback while drawing; it does not
    /// decide the tooltip, [`Frame::resolve`] does.
    pub fn is_over(&self, shape: &HitShape) -> bool {
        self.pointer.is_some_and(|p| shape.contains(p))
    }

    /// Draw-order index of the topmost region under the pointer
    pub fn hovered_index(&self) -> Option<usize> {
        let p = self.pointer?;
        self.regions.iter().rposition(|r| r.shape.contains(p))
    }

    /// Hover state for this frame: the topmost hit, or inactive
    pub fn resolve(&self) -> HoverState {
        let Some(p) = self.pointer else {
            return HoverState::default();
        };
        match self.hovered_index() {
            Some(i) => {
                tracing::trace!(region = i, x = p.x, y = p.y, "Hover hit");
                HoverState {
                    active: true,
                    pointer_x: p.x,
                    pointer_y: p.y,
                    content: self.regions[i].content.clone(),
                }
            }
            None => HoverState {
                active: false,
                pointer_x: p.x,
                pointer_y: p.y,
                content: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, TAU};

    fn rect(x: f64, y: f64, w: f64, h: f64) -> HitShape {
        HitShape::Rect(Rect::new(x, y, w, h))
    }

    #[test]
    fn test_no_pointer_is_inactive() {
        let mut frame = Frame::new(None);
        frame.register(rect(0.0, 0.0, 10.0, 10.0), vec!["a".into()]);
        assert!(!frame.resolve().active);
        assert_eq!(frame.hovered_index(), None);
    }

    #[test]
    fn test_last_registered_wins_overlap() {
        let mut frame = Frame::new(Some(Point::new(5.0, 5.0)));
        frame.register(rect(0.0, 0.0, 10.0, 10.0), vec!["below".into()]);
        frame.register(rect(2.0, 2.0, 10.0, 10.0), vec!["above".into()]);
        frame.register(rect(50.0, 50.0, 10.0, 10.0), vec!["elsewhere".into()]);

        let hover = frame.resolve();
        assert!(hover.active);
        assert_eq!(hover.content, vec!["above".to_string()]);
        assert_eq!(frame.hovered_index(), Some(1));
        assert_eq!(hover.pointer(), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_miss_keeps_pointer() {
        let mut frame = Frame::new(Some(Point::new(100.0, 100.0)));
        frame.register(rect(0.0, 0.0, 10.0, 10.0), vec!["a".into()]);
        let hover = frame.resolve();
        assert!(!hover.active);
        assert_eq!(hover.pointer_x, 100.0);
    }

    #[test]
    fn test_sector_regions() {
        let ring = HitShape::Sector(Sector {
            center: Point::new(0.0, 0.0),
            inner_radius: 5.0,
            outer_radius: 10.0,
            start_angle: -FRAC_PI_2,
            end_angle: -FRAC_PI_2 + TAU,
        });
        let mut frame = Frame::new(Some(Point::new(0.0, 0.0)));
        assert!(!frame.is_over(&ring));
        frame.register(ring, vec!["ring".into()]);
        assert!(!frame.resolve().active);

        let frame = Frame::new(Some(Point::new(7.0, 0.0)));
        assert!(frame.is_over(&ring));
    }
}
