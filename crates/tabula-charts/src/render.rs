//! Pieces shared by every renderer: option fields, outcomes, titles, and
//! the error and empty-data placeholders

use crate::layout::{Decorations, ResolvedLayout, ResponsiveOptions, SurfaceMetrics, resolve_layout};
use crate::surface::{DrawingSurface, Point, Rect, TextAlign, TextBaseline, TextStyle, truncate_to_width};
use crate::{ChartMargin, MarginOptions};
use serde::{Deserialize, Serialize};
use tabula_core::{ChartError, ChartResult, Table, colors};

/// Placeholder text when nothing can be plotted
pub const NO_DATA_MESSAGE: &str = "No valid data";

/// What a render call produced
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome<G> {
    /// Chart drawn; carries the computed geometry
    Rendered(G),
    /// Placeholder drawn because no valid rows remained
    NoData,
    /// Error block drawn in place of the chart
    Error(ChartError),
}

impl<G> RenderOutcome<G> {
    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderOutcome::Rendered(_))
    }

    pub fn geometry(&self) -> Option<&G> {
        match self {
            RenderOutcome::Rendered(g) => Some(g),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ChartError> {
        match self {
            RenderOutcome::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// Option fields every chart type accepts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommonOptions {
    /// Chart width; defaults to the rest of the surface
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Position of the chart on a shared surface
    pub offset_x: f64,
    pub offset_y: f64,
    pub margin: MarginOptions,
    #[serde(flatten)]
    pub responsive: ResponsiveOptions,
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

impl CommonOptions {
    /// The chart's box on a surface of `metrics`
    pub fn region(&self, metrics: &SurfaceMetrics) -> Rect {
        Rect::new(
            self.offset_x,
            self.offset_y,
            self.width.unwrap_or(metrics.width - self.offset_x).max(0.0),
            self.height.unwrap_or(metrics.height - self.offset_y).max(0.0),
        )
    }

    pub fn decorations(&self) -> Decorations {
        Decorations {
            title: self.title.is_some(),
            subtitle: self.subtitle.is_some(),
            ..Default::default()
        }
    }

    pub fn resolve(&self, metrics: &SurfaceMetrics, defaults: ChartMargin, decorations: Decorations) -> ResolvedLayout {
        resolve_layout(
            metrics,
            self.region(metrics),
            self.margin.resolve(defaults),
            decorations,
            &self.responsive,
        )
    }
}

/// Look up `requested`, or the column at `fallback` when none was given
pub fn resolve_column(table: &Table, requested: Option<&str>, fallback: usize) -> ChartResult<String> {
    match requested {
        Some(name) if table.has_column(name) => Ok(name.to_string()),
        Some(name) => Err(ChartError::not_found(name)),
        None => table
            .column_names()
            .get(fallback)
            .cloned()
            .ok_or_else(|| ChartError::configuration(format!("table has no column at position {fallback}"))),
    }
}

/// Title and subtitle centered above the plot
pub fn draw_titles<S: DrawingSurface>(surface: &mut S, layout: &ResolvedLayout, title: Option<&str>, subtitle: Option<&str>) {
    let sizes = &layout.sizes;
    let cx = layout.region.center().x;
    let max_width = layout.region.width - sizes.label_padding * 2.0;
    let mut y = layout.region.y + sizes.label_padding * 2.0;

    if let Some(title) = title {
        let text = truncate_to_width(title, max_width, sizes.title_font, |t, s| surface.measure_text(t, s));
        let style = TextStyle::new(sizes.title_font, colors::TEXT_DARK)
            .align(TextAlign::Center)
            .baseline(TextBaseline::Top)
            .bold();
        surface.text(&text, Point::new(cx, y), &style);
        y += sizes.title_font + sizes.label_padding;
    }
    if let Some(subtitle) = subtitle {
        let text = truncate_to_width(subtitle, max_width, sizes.subtitle_font, |t, s| surface.measure_text(t, s));
        let style = TextStyle::new(sizes.subtitle_font, colors::TEXT_MUTED)
            .align(TextAlign::Center)
            .baseline(TextBaseline::Top);
        surface.text(&text, Point::new(cx, y), &style);
    }
}

/// Clearly marked block drawn instead of a chart
pub fn draw_error_block<S: DrawingSurface>(surface: &mut S, layout: &ResolvedLayout, error: &ChartError) {
    let sizes = &layout.sizes;
    let block = layout.plot;
    surface.fill_rect(block, colors::ERROR_FILL);
    surface.stroke_rect(block, colors::ERROR_BORDER, sizes.line_width);

    let mut lines = vec![heading(error).to_string()];
    match error {
        ChartError::DataQuality {
            invalid_rows,
            total_rows,
            columns,
        } => {
            lines.push(format!("{invalid_rows} of {total_rows} row(s) have invalid values"));
            lines.extend(columns.iter().map(|(c, n)| format!("{n} invalid in '{c}'")));
        }
        other => lines.push(other.to_string()),
    }

    let max_width = block.width - sizes.label_padding * 4.0;
    let line_height = sizes.label_font * 1.5;
    let top = block.center().y - line_height * (lines.len() as f64 - 1.0) / 2.0;
    for (i, line) in lines.iter().enumerate() {
        let text = truncate_to_width(line, max_width, sizes.label_font, |t, s| surface.measure_text(t, s));
        let mut style = TextStyle::new(sizes.label_font, colors::ERROR_TEXT).align(TextAlign::Center);
        if i == 0 {
            style = style.bold();
        }
        surface.text(&text, Point::new(block.center().x, top + line_height * i as f64), &style);
    }
}

fn heading(error: &ChartError) -> &'static str {
    match error {
        ChartError::DataQuality { .. } => "Data quality error",
        ChartError::NotFound { .. } => "Missing column",
        ChartError::Configuration(_) => "Configuration error",
    }
}

/// Muted placeholder with a centered message
pub fn draw_placeholder<S: DrawingSurface>(surface: &mut S, layout: &ResolvedLayout, message: &str) {
    let sizes = &layout.sizes;
    surface.fill_rect(layout.plot, colors::PLACEHOLDER);
    let text = truncate_to_width(
        message,
        layout.plot.width - sizes.label_padding * 2.0,
        sizes.label_font,
        |t, s| surface.measure_text(t, s),
    );
    let style = TextStyle::new(sizes.label_font, colors::TEXT_MUTED).align(TextAlign::Center);
    surface.text(&text, layout.plot.center(), &style);
}
