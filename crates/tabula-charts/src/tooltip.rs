//! Tooltip placement and the end-of-frame tooltip pass

use crate::hover::HoverState;
use crate::layout::{ElementSizes, ResponsiveOptions, responsive_scale};
use crate::surface::{DrawingSurface, Point, Rect, TextAlign, TextBaseline, TextStyle};
use tabula_core::colors;

/// Gap between the pointer and the tooltip box
pub const TOOLTIP_OFFSET: f64 = 12.0;
pub const TOOLTIP_PADDING: f64 = 8.0;
const LINE_SPACING: f64 = 1.4;

/// Box and text anchors for one tooltip
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipLayout {
    pub rect: Rect,
    pub lines: Vec<(String, Point)>,
    pub font_size: f64,
}

impl TooltipLayout {
    /// Place `lines` near `pointer` inside `bounds`.
    ///
    /// The box sits below-right of the pointer, flips left or up when it
    /// would overflow, and is finally clamped into `bounds`.
    pub fn compute<F>(pointer: Point, lines: &[String], bounds: Rect, font_size: f64, measure: F) -> Self
    where
        F: Fn(&str, f64) -> f64,
    {
        let text_width = lines
            .iter()
            .map(|l| measure(l, font_size))
            .fold(0.0_f64, f64::max);
        let line_height = font_size * LINE_SPACING;
        let width = text_width + TOOLTIP_PADDING * 2.0;
        let height = line_height * lines.len() as f64 + TOOLTIP_PADDING * 2.0;

        let mut x = pointer.x + TOOLTIP_OFFSET;
        if x + width > bounds.right() {
            x = pointer.x - TOOLTIP_OFFSET - width;
        }
        let mut y = pointer.y + TOOLTIP_OFFSET;
        if y + height > bounds.bottom() {
            y = pointer.y - TOOLTIP_OFFSET - height;
        }
        x = x.min(bounds.right() - width).max(bounds.x);
        y = y.min(bounds.bottom() - height).max(bounds.y);

        let rect = Rect::new(x, y, width, height);
        let lines = lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let anchor = Point::new(
                    x + TOOLTIP_PADDING,
                    y + TOOLTIP_PADDING + line_height * (i as f64 + 0.5),
                );
                (line.clone(), anchor)
            })
            .collect();

        Self {
            rect,
            lines,
            font_size,
        }
    }
}

/// Paint the tooltip for `hover` and consume it.
///
/// Runs once per frame after every chart has drawn. `active` is always
/// false afterwards so a tooltip never outlives the frame it was hit in.
pub fn draw_tooltip<S: DrawingSurface>(surface: &mut S, hover: &mut HoverState) -> Option<TooltipLayout> {
    if !hover.active || hover.content.is_empty() {
        hover.reset();
        return None;
    }

    let metrics = surface.metrics();
    let (dw, dh) = metrics.displayed(metrics.width, metrics.height);
    let sizes = ElementSizes::for_scale(responsive_scale(dw, dh, &ResponsiveOptions::default()));
    let layout = TooltipLayout::compute(
        hover.pointer(),
        &hover.content,
        metrics.bounds(),
        sizes.tooltip_font,
        |t, s| surface.measure_text(t, s),
    );

    surface.fill_rect(layout.rect, colors::TOOLTIP_BG);
    let style = TextStyle::new(layout.font_size, colors::TOOLTIP_TEXT)
        .align(TextAlign::Left)
        .baseline(TextBaseline::Middle);
    for (i, (line, at)) in layout.lines.iter().enumerate() {
        let style = if i == 0 { style.bold() } else { style };
        surface.text(line, *at, &style);
    }

    hover.reset();
    Some(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    fn measure(text: &str, size: f64) -> f64 {
        text.chars().count() as f64 * size * 0.5
    }

    fn lines() -> Vec<String> {
        vec!["Sales".to_string(), "count: 70".to_string()]
    }

    #[test]
    fn test_places_below_right() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 300.0);
        let t = TooltipLayout::compute(Point::new(10.0, 10.0), &lines(), bounds, 10.0, measure);
        assert_eq!(t.rect.x, 22.0);
        assert_eq!(t.rect.y, 22.0);
        // widest line is 9 chars at 5 px
        assert_eq!(t.rect.width, 45.0 + 16.0);
        assert_eq!(t.lines.len(), 2);
    }

    #[test]
    fn test_flips_near_edges_and_stays_inside() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 300.0);
        let t = TooltipLayout::compute(Point::new(395.0, 295.0), &lines(), bounds, 10.0, measure);
        assert!(t.rect.right() <= 395.0);
        assert!(t.rect.bottom() <= 295.0);
        assert!(t.rect.x >= 0.0 && t.rect.y >= 0.0);
    }

    #[test]
    fn test_draw_consumes_state() {
        let mut scene = Scene::new(400.0, 300.0);
        let mut hover = HoverState {
            active: true,
            pointer_x: 50.0,
            pointer_y: 50.0,
            content: lines(),
        };
        assert!(draw_tooltip(&mut scene, &mut hover).is_some());
        assert!(!hover.active);
        assert_eq!(scene.texts(), vec!["Sales", "count: 70"]);

        // second pass in a frame without a hit draws nothing
        assert!(draw_tooltip(&mut scene, &mut hover).is_none());
        assert_eq!(scene.shapes().len(), 3);
    }
}
