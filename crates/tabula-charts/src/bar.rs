//! Bar chart renderer
//!
//! One band per category row. Grouped mode puts one sub-bar per value
//! column side by side in the band; stacked mode piles the segments from
//! the baseline. All bars share one value domain `[0, max]`.

use crate::chartkit::{BandScale, DEFAULT_TICK_COUNT, LinearScale, Scale, format_tick, format_value};
use crate::hover::{Frame, HitShape};
use crate::layout::ResolvedLayout;
use crate::render::{
    CommonOptions, NO_DATA_MESSAGE, RenderOutcome, draw_error_block, draw_placeholder, draw_titles, resolve_column,
};
use crate::surface::{DrawingSurface, Point, Rect, TextAlign, TextBaseline, TextStyle, truncate_to_width};
use crate::validate::{NanPolicy, resolve_policy, validate};
use crate::ChartMargin;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use tabula_core::{ChartResult, Color, Palette, Table, colors};

/// Share of a band covered by its bars
pub const BAR_GAP_RATIO: f64 = 0.8;
/// Vertical bars longer than this hold their label inside in `auto` mode
pub const AUTO_INSIDE_MIN_LENGTH: f64 = 24.0;
/// Lightening applied to the hovered bar
pub const HOVER_LIGHTEN: f64 = 0.3;

// ============================================================================
// OPTIONS
// ============================================================================

/// One value column or several
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    One(String),
    Many(Vec<String>),
}

impl ColumnSpec {
    pub fn names(&self) -> Vec<String> {
        match self {
            ColumnSpec::One(c) => vec![c.clone()],
            ColumnSpec::Many(cs) => cs.clone(),
        }
    }
}

impl From<&str> for ColumnSpec {
    fn from(c: &str) -> Self {
        ColumnSpec::One(c.to_string())
    }
}

impl From<Vec<&str>> for ColumnSpec {
    fn from(cs: Vec<&str>) -> Self {
        ColumnSpec::Many(cs.into_iter().map(String::from).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    #[default]
    Grouped,
    Stacked,
}

/// Where value labels go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarLabelPosition {
    Auto,
    Inside,
    Outside,
    #[serde(alias = "start")]
    Bottom,
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BarOptions {
    /// Category column; first column when unset
    #[serde(alias = "category")]
    pub x: Option<String>,
    /// Value column(s); second column when unset
    #[serde(alias = "values")]
    pub y: Option<ColumnSpec>,
    pub orientation: Orientation,
    pub mode: BarMode,
    pub label_pos: BarLabelPosition,
    pub palette: Option<Palette>,
    pub nan_policy: Option<NanPolicy>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub show_grid: bool,
    #[serde(flatten)]
    pub common: CommonOptions,
}

impl Default for BarOptions {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            orientation: Orientation::default(),
            mode: BarMode::default(),
            label_pos: BarLabelPosition::default(),
            palette: None,
            nan_policy: None,
            x_label: None,
            y_label: None,
            show_grid: true,
            common: CommonOptions::default(),
        }
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// A value label attached to one bar
#[derive(Debug, Clone, PartialEq)]
pub struct BarLabel {
    pub text: String,
    pub at: Point,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    pub color: Color,
    pub inside: bool,
}

/// One drawn bar or stack segment
#[derive(Debug, Clone, PartialEq)]
pub struct BarRect {
    pub row: usize,
    /// Position of the value column
    pub series: usize,
    pub category: String,
    pub column: String,
    pub value: f64,
    pub rect: Rect,
    pub color: Color,
    pub label: Option<BarLabel>,
}

impl BarRect {
    /// Extent along the value axis
    pub fn length(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Vertical => self.rect.height,
            Orientation::Horizontal => self.rect.width,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryLabel {
    pub text: String,
    pub at: Point,
}

/// Value-axis tick: data value and its surface coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTick {
    pub value: f64,
    pub position: f64,
}

/// Computed bar chart geometry, ready to paint
#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub layout: ResolvedLayout,
    pub orientation: Orientation,
    pub mode: BarMode,
    pub domain_max: f64,
    pub band: f64,
    pub bars: Vec<BarRect>,
    pub categories: Vec<CategoryLabel>,
    pub ticks: Vec<AxisTick>,
    /// Cells left out because they were not valid numbers
    pub skipped: usize,
}

impl BarLayout {
    /// Place every bar, label and tick inside `layout.plot`
    pub fn compute<F>(
        table: &Table,
        category: &str,
        columns: &[String],
        opts: &BarOptions,
        layout: ResolvedLayout,
        background: Color,
        measure: F,
    ) -> Self
    where
        F: Fn(&str, f64) -> f64,
    {
        let plot = layout.plot;
        let sizes = layout.sizes;
        let orientation = opts.orientation;
        let n = table.len();
        let series = columns.len().max(1);
        let palette = opts.palette.clone().unwrap_or_default();

        let (cat_len, value_len) = match orientation {
            Orientation::Vertical => (plot.width, plot.height),
            Orientation::Horizontal => (plot.height, plot.width),
        };

        let domain_max = domain_max(table, columns, opts.mode);
        let value_scale = LinearScale::new().domain(0.0, domain_max).range(0.0, value_len);
        let bands = BandScale::new(n)
            .range(0.0, cat_len)
            .padding(1.0 - BAR_GAP_RATIO);
        let band = bands.step();
        let inner = bands.bandwidth();

        // rect from (offset along category axis, thickness, base and length along value axis)
        let place = |along: f64, thickness: f64, base: f64, length: f64| match orientation {
            Orientation::Vertical => Rect::new(plot.x + along, plot.bottom() - base - length, thickness, length),
            Orientation::Horizontal => Rect::new(plot.x + base, plot.y + along, length, thickness),
        };

        let mut bars = Vec::new();
        let mut skipped = 0;
        for (row, record) in table.records().iter().enumerate() {
            let category_text = table.cell(row, category).to_string();
            let start = bands.scale(row);
            let mut stacked_base = 0.0;

            for (j, column) in columns.iter().enumerate() {
                let Some(value) = record.get(column).and_then(|v| v.to_number()) else {
                    skipped += 1;
                    continue;
                };
                let length = value_scale.scale(value.max(0.0)).max(0.0);
                let rect = match opts.mode {
                    BarMode::Grouped => {
                        let sub = inner / series as f64;
                        place(start + sub * j as f64, sub, 0.0, length)
                    }
                    BarMode::Stacked => {
                        let r = place(start, inner, stacked_base, length);
                        stacked_base += length;
                        r
                    }
                };
                let color = if columns.len() > 1 {
                    palette.color(j)
                } else {
                    palette.color(row)
                };
                let label = place_label(
                    &format_value(value),
                    rect,
                    color,
                    background,
                    orientation,
                    opts.label_pos,
                    sizes.value_font,
                    sizes.label_padding,
                    &measure,
                );
                bars.push(BarRect {
                    row,
                    series: j,
                    category: category_text.clone(),
                    column: column.clone(),
                    value,
                    rect,
                    color,
                    label,
                });
            }
        }

        let categories = (0..n)
            .map(|row| {
                let raw = table.cell(row, category).to_string();
                let center = bands.scale_center(row);
                match orientation {
                    Orientation::Vertical => CategoryLabel {
                        text: truncate_to_width(&raw, band, sizes.label_font, &measure),
                        at: Point::new(
                            plot.x + center,
                            plot.bottom() + sizes.tick_length + sizes.label_padding,
                        ),
                    },
                    Orientation::Horizontal => {
                        let room = layout.margin().left - sizes.tick_length - sizes.label_padding * 2.0;
                        CategoryLabel {
                            text: truncate_to_width(&raw, room, sizes.label_font, &measure),
                            at: Point::new(
                                plot.x - sizes.tick_length - sizes.label_padding,
                                plot.y + center,
                            ),
                        }
                    }
                }
            })
            .collect();

        let ticks = value_scale
            .ticks(DEFAULT_TICK_COUNT)
            .into_iter()
            .map(|value| {
                let offset = value_scale.scale(value);
                let position = match orientation {
                    Orientation::Vertical => plot.bottom() - offset,
                    Orientation::Horizontal => plot.x + offset,
                };
                AxisTick { value, position }
            })
            .collect();

        Self {
            layout,
            orientation,
            mode: opts.mode,
            domain_max,
            band,
            bars,
            categories,
            ticks,
            skipped,
        }
    }
}

/// Largest stacked sum or single value across rows, at least 1
pub fn domain_max(table: &Table, columns: &[String], mode: BarMode) -> f64 {
    let row_max = table.records().iter().map(|record| {
        let values = columns
            .iter()
            .filter_map(|c| record.get(c).and_then(|v| v.to_number()))
            .map(|v| v.max(0.0));
        match mode {
            BarMode::Stacked => values.sum::<f64>(),
            BarMode::Grouped => values.fold(0.0, f64::max),
        }
    });
    row_max.filter(|v| v.is_finite()).fold(1.0, f64::max)
}

#[allow(clippy::too_many_arguments)]
fn place_label<F>(
    text: &str,
    rect: Rect,
    fill: Color,
    background: Color,
    orientation: Orientation,
    position: BarLabelPosition,
    font: f64,
    pad: f64,
    measure: &F,
) -> Option<BarLabel>
where
    F: Fn(&str, f64) -> f64,
{
    let inside = match position {
        BarLabelPosition::None => return None,
        BarLabelPosition::Inside | BarLabelPosition::Bottom => true,
        BarLabelPosition::Outside => false,
        BarLabelPosition::Auto => match orientation {
            Orientation::Horizontal => measure(text, font) + pad * 2.0 <= rect.width,
            Orientation::Vertical => rect.height > AUTO_INSIDE_MIN_LENGTH,
        },
    };
    let color = if inside {
        fill.contrast_text()
    } else {
        background.contrast_text()
    };
    let center = rect.center();

    let (at, align, baseline) = match (orientation, position, inside) {
        (Orientation::Vertical, BarLabelPosition::Bottom, _) => {
            (Point::new(center.x, rect.bottom() - pad), TextAlign::Center, TextBaseline::Bottom)
        }
        (Orientation::Horizontal, BarLabelPosition::Bottom, _) => {
            (Point::new(rect.x + pad, center.y), TextAlign::Left, TextBaseline::Middle)
        }
        (Orientation::Vertical, _, true) => (Point::new(center.x, rect.y + pad), TextAlign::Center, TextBaseline::Top),
        (Orientation::Vertical, _, false) => {
            (Point::new(center.x, rect.y - pad), TextAlign::Center, TextBaseline::Bottom)
        }
        (Orientation::Horizontal, _, true) => {
            (Point::new(rect.right() - pad, center.y), TextAlign::Right, TextBaseline::Middle)
        }
        (Orientation::Horizontal, _, false) => {
            (Point::new(rect.right() + pad, center.y), TextAlign::Left, TextBaseline::Middle)
        }
    };

    Some(BarLabel {
        text: text.to_string(),
        at,
        align,
        baseline,
        color,
        inside,
    })
}

// ============================================================================
// RENDERING
// ============================================================================

fn resolve_columns(table: &Table, opts: &BarOptions) -> ChartResult<(String, Vec<String>)> {
    let category = resolve_column(table, opts.x.as_deref(), 0)?;
    let values = match &opts.y {
        Some(requested) => requested
            .names()
            .iter()
            .map(|c| resolve_column(table, Some(c.as_str()), 1))
            .collect::<ChartResult<Vec<_>>>()?,
        None => vec![resolve_column(table, None, 1)?],
    };
    Ok((category, values))
}

/// Render a bar chart of `table` onto `surface`, registering one hit
/// region per bar with `frame`.
///
/// Invalid value cells only drop their own bar unless the effective NaN
/// policy is strict, in which case an error block replaces the chart.
pub fn render_bar<S: DrawingSurface>(
    table: &Table,
    opts: &BarOptions,
    surface: &mut S,
    frame: &mut Frame,
) -> RenderOutcome<BarLayout> {
    let metrics = surface.metrics();
    let mut decorations = opts.common.decorations();
    decorations.x_label = opts.x_label.is_some();
    decorations.y_label = opts.y_label.is_some();
    let layout = opts.common.resolve(&metrics, ChartMargin::bar(), decorations);

    draw_titles(surface, &layout, opts.common.title.as_deref(), opts.common.subtitle.as_deref());

    let (category, columns) = match resolve_columns(table, opts) {
        Ok(cols) => cols,
        Err(err) => {
            tracing::warn!(error = %err, "Bar chart columns could not be resolved");
            draw_error_block(surface, &layout, &err);
            return RenderOutcome::Error(err);
        }
    };

    if table.is_empty() {
        draw_placeholder(surface, &layout, NO_DATA_MESSAGE);
        return RenderOutcome::NoData;
    }

    let policy = resolve_policy(opts.nan_policy, NanPolicy::Warn);
    if let Err(err) = validate(table, &columns, policy) {
        tracing::warn!(error = %err, "Bar chart aborted by strict NaN policy");
        draw_error_block(surface, &layout, &err);
        return RenderOutcome::Error(err);
    }

    let background = surface.background();
    let geometry = BarLayout::compute(table, &category, &columns, opts, layout, background, |t, s| {
        surface.measure_text(t, s)
    });
    paint(surface, frame, &geometry, opts);

    tracing::debug!(
        bars = geometry.bars.len(),
        skipped = geometry.skipped,
        "Rendered bar chart"
    );
    RenderOutcome::Rendered(geometry)
}

fn paint<S: DrawingSurface>(surface: &mut S, frame: &mut Frame, g: &BarLayout, opts: &BarOptions) {
    let plot = g.layout.plot;
    let sizes = g.layout.sizes;
    let region = g.layout.region;
    let tick_style = TextStyle::new(sizes.tick_font, colors::TEXT_MUTED);

    // value axis grid and ticks
    for tick in &g.ticks {
        let text = format_tick(tick.value);
        match g.orientation {
            Orientation::Vertical => {
                if opts.show_grid {
                    surface.line(
                        Point::new(plot.x, tick.position),
                        Point::new(plot.right(), tick.position),
                        colors::GRID,
                        1.0,
                    );
                }
                surface.line(
                    Point::new(plot.x - sizes.tick_length, tick.position),
                    Point::new(plot.x, tick.position),
                    colors::AXIS,
                    1.0,
                );
                surface.text(
                    &text,
                    Point::new(plot.x - sizes.tick_length - sizes.label_padding, tick.position),
                    &tick_style.align(TextAlign::Right),
                );
            }
            Orientation::Horizontal => {
                if opts.show_grid {
                    surface.line(
                        Point::new(tick.position, plot.y),
                        Point::new(tick.position, plot.bottom()),
                        colors::GRID,
                        1.0,
                    );
                }
                surface.line(
                    Point::new(tick.position, plot.bottom()),
                    Point::new(tick.position, plot.bottom() + sizes.tick_length),
                    colors::AXIS,
                    1.0,
                );
                surface.text(
                    &text,
                    Point::new(tick.position, plot.bottom() + sizes.tick_length + sizes.label_padding),
                    &tick_style.align(TextAlign::Center).baseline(TextBaseline::Top),
                );
            }
        }
    }

    for bar in &g.bars {
        let shape = HitShape::Rect(bar.rect);
        let fill = if frame.is_over(&shape) {
            bar.color.lighten(HOVER_LIGHTEN)
        } else {
            bar.color
        };
        surface.fill_rect(bar.rect, fill);
        frame.register(
            shape,
            vec![bar.category.clone(), format!("{}: {}", bar.column, format_value(bar.value))],
        );
    }

    for label in g.bars.iter().filter_map(|b| b.label.as_ref()) {
        let style = TextStyle::new(sizes.value_font, label.color)
            .align(label.align)
            .baseline(label.baseline);
        surface.text(&label.text, label.at, &style);
    }

    // baseline axis
    let (from, to) = match g.orientation {
        Orientation::Vertical => (Point::new(plot.x, plot.bottom()), Point::new(plot.right(), plot.bottom())),
        Orientation::Horizontal => (Point::new(plot.x, plot.y), Point::new(plot.x, plot.bottom())),
    };
    surface.line(from, to, colors::AXIS, 1.0);

    let category_style = TextStyle::new(sizes.label_font, colors::TEXT_DARK);
    let category_style = match g.orientation {
        Orientation::Vertical => category_style.align(TextAlign::Center).baseline(TextBaseline::Top),
        Orientation::Horizontal => category_style.align(TextAlign::Right),
    };
    for label in &g.categories {
        surface.text(&label.text, label.at, &category_style);
    }

    let axis_title = TextStyle::new(sizes.label_font, colors::TEXT_DARK).align(TextAlign::Center);
    if let Some(x_label) = &opts.x_label {
        surface.text(
            x_label,
            Point::new(plot.center().x, region.bottom() - sizes.label_padding),
            &axis_title.baseline(TextBaseline::Bottom),
        );
    }
    if let Some(y_label) = &opts.y_label {
        surface.text(
            y_label,
            Point::new(region.x + sizes.label_padding + sizes.label_font / 2.0, plot.center().y),
            &axis_title.rotated(-FRAC_PI_2),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use tabula_core::{ChartError, Value, record};

    fn sales() -> Table {
        Table::from_records(vec![
            record([("region", Value::from("North")), ("q1", Value::from(10.0)), ("q2", Value::from(20.0))]),
            record([("region", Value::from("South")), ("q1", Value::from(30.0)), ("q2", Value::from(10.0))]),
            record([("region", Value::from("East")), ("q1", Value::from(5.0)), ("q2", Value::from(5.0))]),
        ])
    }

    fn draw(table: &Table, opts: &BarOptions) -> (Scene, Frame, RenderOutcome<BarLayout>) {
        let mut scene = Scene::new(600.0, 400.0);
        let mut frame = Frame::new(None);
        let outcome = render_bar(table, opts, &mut scene, &mut frame);
        (scene, frame, outcome)
    }

    #[test]
    fn test_options_from_json_aliases() {
        let opts: BarOptions = serde_json::from_str(
            r##"{"category": "region", "values": ["q1", "q2"], "mode": "stacked",
                "orientation": "horizontal", "labelPos": "start", "palette": ["#000", "#fff"],
                "nanPolicy": "strict", "width": 300, "unknownKey": true}"##,
        )
        .unwrap();
        assert_eq!(opts.x.as_deref(), Some("region"));
        assert_eq!(opts.y, Some(ColumnSpec::from(vec!["q1", "q2"])));
        assert_eq!(opts.mode, BarMode::Stacked);
        assert_eq!(opts.orientation, Orientation::Horizontal);
        assert_eq!(opts.label_pos, BarLabelPosition::Bottom);
        assert_eq!(opts.nan_policy, Some(NanPolicy::Strict));
        assert_eq!(opts.common.width, Some(300.0));
        assert!(opts.show_grid);
        assert_eq!(opts.palette.unwrap().len(), 2);
    }

    #[test]
    fn test_default_columns_and_single_series_colors() {
        let (_, _, outcome) = draw(&sales(), &BarOptions::default());
        let g = outcome.geometry().unwrap();
        assert_eq!(g.bars.len(), 3);
        assert!(g.bars.iter().all(|b| b.column == "q1"));
        // single value column: color per category row
        let palette = Palette::default();
        for bar in &g.bars {
            assert_eq!(bar.color, palette.color(bar.row));
        }
        assert_eq!(g.domain_max, 30.0);
    }

    #[test]
    fn test_grouped_sub_bars_share_band() {
        let opts = BarOptions {
            y: Some(vec!["q1", "q2"].into()),
            ..Default::default()
        };
        let (_, _, outcome) = draw(&sales(), &opts);
        let g = outcome.geometry().unwrap();
        assert_eq!(g.bars.len(), 6);
        let expected = g.band * BAR_GAP_RATIO / 2.0;
        for bar in &g.bars {
            assert!((bar.rect.width - expected).abs() < 1e-9);
            // multiple value columns: color per column
            assert_eq!(bar.color, Palette::default().color(bar.series));
        }
        // grouped domain is the largest single value
        assert_eq!(g.domain_max, 30.0);
        let tallest = g.bars.iter().map(|b| b.rect.height).fold(0.0, f64::max);
        assert!((tallest - g.layout.plot.height).abs() < 1e-9);
    }

    #[test]
    fn test_stacked_segments_are_contiguous() {
        let opts = BarOptions {
            y: Some(vec!["q1", "q2"].into()),
            mode: BarMode::Stacked,
            ..Default::default()
        };
        let (_, _, outcome) = draw(&sales(), &opts);
        let g = outcome.geometry().unwrap();
        assert_eq!(g.domain_max, 40.0);
        let north: Vec<&BarRect> = g.bars.iter().filter(|b| b.row == 0).collect();
        assert_eq!(north.len(), 2);
        assert!((north[0].rect.y - north[1].rect.bottom()).abs() < 1e-9);
        assert!((north[0].rect.bottom() - g.layout.plot.bottom()).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_cell_skips_only_its_bar() {
        let table = Table::from_records(vec![
            record([("k", Value::from("a")), ("v", Value::from(10.0))]),
            record([("k", Value::from("b")), ("v", Value::from(f64::NAN))]),
            record([("k", Value::from("c")), ("v", Value::from(30.0))]),
        ]);
        let (_, _, outcome) = draw(&table, &BarOptions::default());
        let g = outcome.geometry().unwrap();
        assert_eq!(g.bars.len(), 2);
        assert_eq!(g.skipped, 1);
        assert_eq!(g.categories.len(), 3);
    }

    #[test]
    fn test_strict_policy_draws_error_block() {
        let table = Table::from_records(vec![
            record([("k", Value::from("a")), ("v", Value::Null)]),
        ]);
        let opts = BarOptions {
            nan_policy: Some(NanPolicy::Strict),
            ..Default::default()
        };
        let (scene, frame, outcome) = draw(&table, &opts);
        assert!(outcome.error().unwrap().is_data_quality());
        assert!(scene.texts().contains(&"Data quality error"));
        assert!(frame.regions().is_empty());
    }

    #[test]
    fn test_missing_column_is_error_outcome() {
        let opts = BarOptions {
            y: Some("nope".into()),
            ..Default::default()
        };
        let (_, _, outcome) = draw(&sales(), &opts);
        assert_eq!(outcome, RenderOutcome::Error(ChartError::not_found("nope")));
    }

    #[test]
    fn test_empty_table_shows_placeholder() {
        let table = Table::new(["k", "v"]);
        let (scene, _, outcome) = draw(&table, &BarOptions::default());
        assert_eq!(outcome, RenderOutcome::NoData);
        assert!(scene.texts().contains(&NO_DATA_MESSAGE));
    }

    #[test]
    fn test_auto_labels_inside_or_outside() {
        let table = Table::from_records(vec![
            record([("k", Value::from("big")), ("v", Value::from(100.0))]),
            record([("k", Value::from("tiny")), ("v", Value::from(1.0))]),
        ]);
        let opts = BarOptions {
            label_pos: BarLabelPosition::Auto,
            ..Default::default()
        };
        let (_, _, outcome) = draw(&table, &opts);
        let g = outcome.geometry().unwrap();
        let big = g.bars[0].label.as_ref().unwrap();
        let tiny = g.bars[1].label.as_ref().unwrap();
        assert!(big.inside);
        assert_eq!(big.color, g.bars[0].color.contrast_text());
        assert!(!tiny.inside);
        assert_eq!(tiny.color, colors::BACKGROUND.contrast_text());
        assert!(tiny.at.y < g.bars[1].rect.y);
    }

    #[test]
    fn test_horizontal_auto_uses_text_width() {
        let table = Table::from_records(vec![
            record([("k", Value::from("a")), ("v", Value::from(1000.0))]),
            record([("k", Value::from("b")), ("v", Value::from(1.5))]),
        ]);
        let opts = BarOptions {
            orientation: Orientation::Horizontal,
            label_pos: BarLabelPosition::Auto,
            ..Default::default()
        };
        let (_, _, outcome) = draw(&table, &opts);
        let g = outcome.geometry().unwrap();
        assert!(g.bars[0].label.as_ref().unwrap().inside);
        let small = g.bars[1].label.as_ref().unwrap();
        assert!(!small.inside);
        assert!(small.at.x > g.bars[1].rect.right());
    }

    #[test]
    fn test_long_categories_truncated() {
        let rows: Vec<_> = (0..12)
            .map(|i| record([("k", Value::from(format!("Department number {i}"))), ("v", Value::from(i as f64))]))
            .collect();
        let (_, _, outcome) = draw(&Table::from_records(rows), &BarOptions::default());
        let g = outcome.geometry().unwrap();
        assert!(g.categories.iter().all(|c| c.text.ends_with('…') || c.text.is_empty()));
    }

    fn label_at(orientation: Orientation, position: BarLabelPosition) -> BarLabel {
        let rect = Rect::new(10.0, 50.0, 20.0, 100.0);
        let measure = |t: &str, s: f64| t.chars().count() as f64 * s * 0.6;
        place_label(
            "7",
            rect,
            Color::rgb(20, 20, 120),
            colors::BACKGROUND,
            orientation,
            position,
            11.0,
            4.0,
            &measure,
        )
        .unwrap()
    }

    #[test]
    fn test_outside_labels_sit_past_the_bar_end() {
        let v = label_at(Orientation::Vertical, BarLabelPosition::Outside);
        assert_eq!(v.at, Point::new(20.0, 46.0));
        assert_eq!((v.align, v.baseline), (TextAlign::Center, TextBaseline::Bottom));
        assert!(!v.inside);
        // outside text reads against the background, not the bar
        assert_eq!(v.color, colors::BACKGROUND.contrast_text());
        assert_eq!(v.color, colors::TEXT_DARK);

        let h = label_at(Orientation::Horizontal, BarLabelPosition::Outside);
        assert_eq!(h.at, Point::new(34.0, 100.0));
        assert_eq!((h.align, h.baseline), (TextAlign::Left, TextBaseline::Middle));
        assert_eq!(h.color, colors::TEXT_DARK);
    }

    #[test]
    fn test_bottom_labels_sit_at_the_baseline() {
        let v = label_at(Orientation::Vertical, BarLabelPosition::Bottom);
        assert_eq!(v.at, Point::new(20.0, 146.0));
        assert_eq!((v.align, v.baseline), (TextAlign::Center, TextBaseline::Bottom));
        assert!(v.inside);
        // inside text contrasts with the dark bar fill
        assert_eq!(v.color, colors::TEXT_LIGHT);

        let h = label_at(Orientation::Horizontal, BarLabelPosition::Bottom);
        assert_eq!(h.at, Point::new(14.0, 100.0));
        assert_eq!((h.align, h.baseline), (TextAlign::Left, TextBaseline::Middle));
        assert_eq!(h.color, colors::TEXT_LIGHT);
    }

    #[test]
    fn test_rendered_outside_labels_follow_each_bar() {
        let opts = BarOptions {
            label_pos: BarLabelPosition::Outside,
            ..Default::default()
        };
        let (scene, _, outcome) = draw(&sales(), &opts);
        let g = outcome.geometry().unwrap();
        let pad = g.layout.sizes.label_padding;
        for bar in &g.bars {
            let label = bar.label.as_ref().unwrap();
            assert!((label.at.y - (bar.rect.y - pad)).abs() < 1e-9);
            assert!(scene.texts().contains(&label.text.as_str()));
        }
    }

    #[test]
    fn test_hover_registers_and_highlights() {
        let mut scene = Scene::new(600.0, 400.0);
        let mut layout_frame = Frame::new(None);
        let outcome = render_bar(&sales(), &BarOptions::default(), &mut scene, &mut layout_frame);
        let target = outcome.geometry().unwrap().bars[1].clone();
        assert_eq!(layout_frame.regions().len(), 3);

        let mut scene = Scene::new(600.0, 400.0);
        let mut frame = Frame::new(Some(target.rect.center()));
        render_bar(&sales(), &BarOptions::default(), &mut scene, &mut frame);
        let hover = frame.resolve();
        assert!(hover.active);
        assert_eq!(hover.content, vec!["South".to_string(), "q1: 30".to_string()]);
        assert!(
            scene
                .filled_rects()
                .iter()
                .any(|(r, c)| *r == target.rect && *c == target.color.lighten(HOVER_LIGHTEN))
        );
    }

    #[test]
    fn test_ticks_are_nice_values() {
        let (_, _, outcome) = draw(&sales(), &BarOptions::default());
        let g = outcome.geometry().unwrap();
        let values: Vec<f64> = g.ticks.iter().map(|t| t.value).collect();
        // 30 / 5 = 6 snaps up to an interval of 10
        assert_eq!(values, vec![0.0, 10.0, 20.0, 30.0]);
        assert!((g.ticks[0].position - g.layout.plot.bottom()).abs() < 1e-9);
    }
}
