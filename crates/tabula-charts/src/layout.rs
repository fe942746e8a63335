//! Responsive layout resolution
//!
//! A chart is designed at a nominal size but may be displayed smaller (CSS
//! scaled canvas, narrow viewport). The resolver derives one scale factor
//! from the displayed size and uses it for margins and element sizes so
//! text stays legible and the plot area never collapses.

use crate::surface::Rect;
use crate::{ChartDimensions, ChartMargin};
use serde::{Deserialize, Serialize};

/// Displayed size at which everything renders at full size
pub const BASELINE: f64 = 400.0;
pub const MIN_SCALE: f64 = 0.6;
pub const MAX_SCALE: f64 = 1.0;
pub const MIN_MARGIN: f64 = 10.0;
/// Displayed widths below this get extra right padding
pub const NARROW_WIDTH: f64 = 640.0;
pub const NARROW_PADDING: f64 = 12.0;
pub const MAX_MARGIN_RATIO_X: f64 = 0.36;
pub const MAX_MARGIN_RATIO_Y: f64 = 0.32;

/// Nominal surface size plus the size it is actually displayed at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMetrics {
    pub width: f64,
    pub height: f64,
    pub display_width: Option<f64>,
    pub display_height: Option<f64>,
}

impl SurfaceMetrics {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            display_width: None,
            display_height: None,
        }
    }

    pub fn with_display(mut self, width: f64, height: f64) -> Self {
        self.display_width = Some(width);
        self.display_height = Some(height);
        self
    }

    /// Only the displayed width is known; height follows the aspect ratio
    pub fn with_display_width(mut self, width: f64) -> Self {
        self.display_width = Some(width);
        self
    }

    /// Display pixels per nominal unit on each axis
    pub fn display_ratio(&self) -> (f64, f64) {
        let rx = match self.display_width {
            Some(w) if self.width > 0.0 && w > 0.0 => w / self.width,
            _ => 1.0,
        };
        let ry = match self.display_height {
            Some(h) if self.height > 0.0 && h > 0.0 => h / self.height,
            _ => rx,
        };
        (rx, ry)
    }

    /// Displayed size of a region given in nominal units
    pub fn displayed(&self, width: f64, height: f64) -> (f64, f64) {
        let (rx, ry) = self.display_ratio();
        (width * rx, height * ry)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Responsive behavior knobs shared by every chart type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponsiveOptions {
    /// `false` pins the scale at 1
    pub responsive: bool,
    /// Explicit scale; wins over the computed one
    #[serde(rename = "responsiveScale")]
    pub scale: Option<f64>,
    pub narrow_padding: bool,
}

impl Default for ResponsiveOptions {
    fn default() -> Self {
        Self {
            responsive: true,
            scale: None,
            narrow_padding: true,
        }
    }
}

/// Scale factor in `[MIN_SCALE, MAX_SCALE]` for a region displayed at
/// `display_width x display_height`
pub fn responsive_scale(display_width: f64, display_height: f64, opts: &ResponsiveOptions) -> f64 {
    if let Some(explicit) = opts.scale {
        if explicit.is_finite() && explicit > 0.0 {
            return explicit;
        }
        tracing::debug!(scale = explicit, "Ignoring non-positive responsive scale");
    }
    if !opts.responsive {
        return MAX_SCALE;
    }
    let min_dim = display_width.min(display_height);
    if !min_dim.is_finite() || min_dim <= 0.0 {
        return MAX_SCALE;
    }
    (min_dim / BASELINE).clamp(MIN_SCALE, MAX_SCALE)
}

// ============================================================================
// ELEMENT SIZES
// ============================================================================

/// Pixel sizes for chart elements at a given scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementSizes {
    pub tick_length: f64,
    pub tick_font: f64,
    pub label_font: f64,
    pub value_font: f64,
    pub title_font: f64,
    pub subtitle_font: f64,
    pub tooltip_font: f64,
    pub point_size: f64,
    pub line_width: f64,
    pub label_padding: f64,
}

fn sized(base: f64, scale: f64, min: f64, max: f64) -> f64 {
    (base * scale).clamp(min, max)
}

impl ElementSizes {
    pub fn for_scale(scale: f64) -> Self {
        Self {
            tick_length: sized(6.0, scale, 3.0, 6.0),
            tick_font: sized(11.0, scale, 8.0, 11.0),
            label_font: sized(12.0, scale, 9.0, 12.0),
            value_font: sized(11.0, scale, 8.0, 11.0),
            title_font: sized(16.0, scale, 12.0, 16.0),
            subtitle_font: sized(12.0, scale, 9.0, 12.0),
            tooltip_font: sized(12.0, scale, 10.0, 12.0),
            point_size: sized(6.0, scale, 3.0, 6.0),
            line_width: sized(2.0, scale, 1.0, 2.0),
            label_padding: sized(4.0, scale, 2.0, 4.0),
        }
    }

    /// Vertical room taken by the title block
    pub fn title_block(&self, title: bool, subtitle: bool) -> f64 {
        let mut h = 0.0;
        if title {
            h += self.title_font + self.label_padding * 2.0;
        }
        if subtitle {
            h += self.subtitle_font + self.label_padding;
        }
        h
    }
}

impl Default for ElementSizes {
    fn default() -> Self {
        Self::for_scale(MAX_SCALE)
    }
}

// ============================================================================
// MARGINS
// ============================================================================

/// Which decorations need room around the plot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decorations {
    pub title: bool,
    pub subtitle: bool,
    pub x_label: bool,
    pub y_label: bool,
}

/// Effective margin for a chart of `width x height` nominal units.
///
/// Each side is scaled, raised to room for decorations and to
/// [`MIN_MARGIN`], then capped at a share of the dimension so the plot
/// area always keeps most of the chart.
#[allow(clippy::too_many_arguments)]
pub fn resolve_margin(
    nominal: ChartMargin,
    width: f64,
    height: f64,
    display_width: f64,
    scale: f64,
    sizes: &ElementSizes,
    decorations: Decorations,
    opts: &ResponsiveOptions,
) -> ChartMargin {
    let mut m = ChartMargin::new(
        nominal.top * scale,
        nominal.right * scale,
        nominal.bottom * scale,
        nominal.left * scale,
    );

    let title_room = sizes.title_block(decorations.title, decorations.subtitle);
    if title_room > 0.0 {
        m.top = m.top.max(title_room + sizes.label_padding * 2.0);
    }
    if decorations.x_label {
        let needed = sizes.tick_length + sizes.tick_font + sizes.label_font + sizes.label_padding * 3.0;
        m.bottom = m.bottom.max(needed);
    }
    if decorations.y_label {
        m.left = m.left.max(sizes.label_font + sizes.label_padding * 2.0);
    }
    if opts.narrow_padding && display_width < NARROW_WIDTH {
        m.right += NARROW_PADDING;
    }

    let cap_x = width * MAX_MARGIN_RATIO_X;
    let cap_y = height * MAX_MARGIN_RATIO_Y;
    let fit = |v: f64, cap: f64| v.max(MIN_MARGIN).min(cap);
    ChartMargin::new(
        fit(m.top, cap_y),
        fit(m.right, cap_x),
        fit(m.bottom, cap_y),
        fit(m.left, cap_x),
    )
}

// ============================================================================
// RESOLVED LAYOUT
// ============================================================================

/// Everything a renderer needs to place elements for one chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLayout {
    pub scale: f64,
    /// The chart's own box on the surface
    pub region: Rect,
    pub dims: ChartDimensions,
    /// Plot area in absolute surface coordinates
    pub plot: Rect,
    pub sizes: ElementSizes,
}

impl ResolvedLayout {
    pub fn margin(&self) -> ChartMargin {
        self.dims.margin
    }
}

/// Resolve scale, margins and sizes for a chart occupying `region`
pub fn resolve_layout(
    metrics: &SurfaceMetrics,
    region: Rect,
    nominal: ChartMargin,
    decorations: Decorations,
    opts: &ResponsiveOptions,
) -> ResolvedLayout {
    let (display_w, display_h) = metrics.displayed(region.width, region.height);
    let scale = responsive_scale(display_w, display_h, opts);
    let sizes = ElementSizes::for_scale(scale);
    let margin = resolve_margin(
        nominal,
        region.width,
        region.height,
        display_w,
        scale,
        &sizes,
        decorations,
        opts,
    );
    let dims = ChartDimensions::new(region.width, region.height).with_margin(margin);
    let plot = Rect::new(
        region.x + margin.left,
        region.y + margin.top,
        dims.inner_width(),
        dims.inner_height(),
    );

    tracing::trace!(scale, ?margin, "Resolved chart layout");

    ResolvedLayout {
        scale,
        region,
        dims,
        plot,
        sizes,
    }
}
