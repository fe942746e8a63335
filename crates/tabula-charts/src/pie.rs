//! Pie and donut chart renderer
//!
//! Slices start at twelve o'clock and run clockwise in row order, each
//! sweeping `value / total` of a full turn with no gaps between them.
//! Partial data changes every percentage, so the chart-type default NaN
//! policy is strict.

use crate::chartkit::format_value;
use crate::hover::{Frame, HitShape};
use crate::layout::ResolvedLayout;
use crate::render::{
    CommonOptions, NO_DATA_MESSAGE, RenderOutcome, draw_error_block, draw_placeholder, draw_titles, resolve_column,
};
use crate::surface::{DrawingSurface, Point, Rect, Sector, TextAlign, TextBaseline, TextStyle, truncate_to_width};
use crate::validate::{NanPolicy, resolve_policy, validate};
use crate::ChartMargin;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};
use tabula_core::{ChartResult, Color, Palette, Table, colors};

/// Angle of the first slice edge (twelve o'clock)
pub const START_ANGLE: f64 = -FRAC_PI_2;
pub const DEFAULT_HOLE_RADIUS: f64 = 0.5;
/// Inside labels of slices narrower than this (radians) are hidden
pub const MIN_INSIDE_SWEEP: f64 = 0.2;
/// Solid pie inside-label radius as a share of the outer radius
pub const INSIDE_LABEL_RATIO: f64 = 0.65;
/// Radial pop of the hovered slice
pub const HOVER_POP: f64 = 1.06;
pub const SLICE_ALPHA: f64 = 0.9;
const FIT_RATIO: f64 = 0.95;
const FIT_RATIO_OUTSIDE: f64 = 0.7;
const OUTSIDE_OFFSET: f64 = 16.0;
const ELBOW_LENGTH: f64 = 10.0;
const OUTSIDE_MAX_WIDTH: f64 = 110.0;

// ============================================================================
// OPTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieStyle {
    #[default]
    Pie,
    Donut,
}

/// Text shown on each slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelContent {
    Name,
    Value,
    #[default]
    Percent,
    NameValue,
    NamePercent,
    #[serde(alias = "name_value_percent")]
    All,
}

impl LabelContent {
    pub fn render(&self, name: &str, value: f64, percent: f64) -> String {
        let value = format_value(value);
        let percent = format_percent(percent);
        match self {
            LabelContent::Name => name.to_string(),
            LabelContent::Value => value,
            LabelContent::Percent => percent,
            LabelContent::NameValue => format!("{name}: {value}"),
            LabelContent::NamePercent => format!("{name} ({percent})"),
            LabelContent::All => format!("{name}: {value} ({percent})"),
        }
    }
}

/// Percentage rounded to a whole number
pub fn format_percent(percent: f64) -> String {
    format!("{}%", percent.round() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieLabelPosition {
    #[default]
    Inside,
    Outside,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PieOptions {
    /// Slice name column; first column when unset
    pub label: Option<String>,
    /// Slice value column; second column when unset
    pub value: Option<String>,
    pub style: PieStyle,
    /// Hole diameter as a share of the outer diameter, in (0, 1)
    pub hole_radius: f64,
    pub label_content: LabelContent,
    pub label_pos: PieLabelPosition,
    pub show_connectors: bool,
    pub palette: Option<Palette>,
    /// Outer radius; fitted to the plot when unset
    pub radius: Option<f64>,
    pub nan_policy: Option<NanPolicy>,
    #[serde(flatten)]
    pub common: CommonOptions,
}

impl Default for PieOptions {
    fn default() -> Self {
        Self {
            label: None,
            value: None,
            style: PieStyle::default(),
            hole_radius: DEFAULT_HOLE_RADIUS,
            label_content: LabelContent::default(),
            label_pos: PieLabelPosition::default(),
            show_connectors: true,
            palette: None,
            radius: None,
            nan_policy: None,
            common: CommonOptions::default(),
        }
    }
}

impl PieOptions {
    /// Hole ratio, or the default when out of range
    pub fn effective_hole(&self) -> f64 {
        if self.hole_radius > 0.0 && self.hole_radius < 1.0 {
            self.hole_radius
        } else {
            tracing::debug!(hole_radius = self.hole_radius, "Hole radius out of range, using default");
            DEFAULT_HOLE_RADIUS
        }
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PieLabel {
    pub text: String,
    pub at: Point,
    pub align: TextAlign,
    pub color: Color,
    /// Edge, elbow and end points for outside labels
    pub connector: Option<Vec<Point>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub row: usize,
    pub name: String,
    pub value: f64,
    /// Share of the total, 0 to 100, unrounded
    pub percent: f64,
    /// Ring geometry; inner radius is the hole for donuts
    pub sector: Sector,
    pub color: Color,
    pub label: Option<PieLabel>,
}

impl PieSlice {
    pub fn sweep(&self) -> f64 {
        self.sector.sweep()
    }

    pub fn tooltip(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            format!("Value: {}", format_value(self.value)),
            format!("Share: {}", format_percent(self.percent)),
        ]
    }
}

/// Computed pie geometry, ready to paint
#[derive(Debug, Clone, PartialEq)]
pub struct PieLayout {
    pub layout: ResolvedLayout,
    pub style: PieStyle,
    pub center: Point,
    pub radius: f64,
    pub inner_radius: f64,
    pub total: f64,
    pub slices: Vec<PieSlice>,
    /// Rows left out as invalid or negative
    pub filtered: usize,
    /// Of those, rows with a negative value
    pub negative: usize,
}

impl PieLayout {
    /// Slices for every valid non-negative row; `None` when nothing
    /// remains to plot
    pub fn compute<F>(
        table: &Table,
        label_column: &str,
        value_column: &str,
        opts: &PieOptions,
        layout: ResolvedLayout,
        background: Color,
        measure: F,
    ) -> Option<Self>
    where
        F: Fn(&str, f64) -> f64,
    {
        let mut rows = Vec::new();
        let mut filtered = 0;
        let mut negative = 0;
        for (row, record) in table.records().iter().enumerate() {
            match record.get(value_column).and_then(|v| v.to_number()) {
                Some(v) if v >= 0.0 && v.is_finite() => rows.push((row, v)),
                Some(v) if v < 0.0 => {
                    negative += 1;
                    filtered += 1;
                }
                _ => filtered += 1,
            }
        }
        if negative > 0 {
            tracing::debug!(negative, column = value_column, "Skipped negative pie values");
        }

        let total: f64 = rows.iter().map(|(_, v)| v).sum();
        if rows.is_empty() || total <= 0.0 {
            return None;
        }

        let plot = layout.plot;
        let scale = layout.scale;
        let center = plot.center();
        let fit = if opts.label_pos == PieLabelPosition::Outside {
            FIT_RATIO_OUTSIDE
        } else {
            FIT_RATIO
        };
        let radius = opts
            .radius
            .filter(|r| *r > 0.0)
            .unwrap_or(plot.width.min(plot.height) / 2.0 * fit);
        let inner_radius = match opts.style {
            PieStyle::Pie => 0.0,
            PieStyle::Donut => radius * opts.effective_hole(),
        };
        let palette = opts.palette.clone().unwrap_or_default();

        let mut slices = Vec::with_capacity(rows.len());
        let mut start = START_ANGLE;
        let last = rows.len() - 1;
        for (i, (row, value)) in rows.into_iter().enumerate() {
            let end = if i == last {
                START_ANGLE + TAU
            } else {
                start + value / total * TAU
            };
            let sector = Sector {
                center,
                inner_radius,
                outer_radius: radius,
                start_angle: start,
                end_angle: end,
            };
            let name = table.cell(row, label_column).to_string();
            let percent = value / total * 100.0;
            let color = palette.color(i);
            let text = opts.label_content.render(&name, value, percent);
            let label = match opts.label_pos {
                PieLabelPosition::None => None,
                PieLabelPosition::Inside => inside_label(&text, &sector, color, layout.sizes.value_font, &measure),
                PieLabelPosition::Outside => outside_label(
                    &text,
                    &sector,
                    plot,
                    scale,
                    background,
                    layout.sizes.value_font,
                    layout.sizes.label_padding,
                    opts.show_connectors,
                    &measure,
                ),
            };

            slices.push(PieSlice {
                row,
                name,
                value,
                percent,
                sector,
                color,
                label,
            });
            start = end;
        }

        Some(Self {
            layout,
            style: opts.style,
            center,
            radius,
            inner_radius,
            total,
            slices,
            filtered,
            negative,
        })
    }
}

fn inside_label<F>(text: &str, sector: &Sector, fill: Color, font: f64, measure: &F) -> Option<PieLabel>
where
    F: Fn(&str, f64) -> f64,
{
    let sweep = sector.sweep();
    if sweep < MIN_INSIDE_SWEEP {
        return None;
    }
    let r = if sector.inner_radius > 0.0 {
        (sector.inner_radius + sector.outer_radius) / 2.0
    } else {
        sector.outer_radius * INSIDE_LABEL_RATIO
    };
    let text = truncate_to_width(text, sweep * r * 0.9, font, measure);
    if text.is_empty() {
        return None;
    }
    Some(PieLabel {
        text,
        at: sector.center.polar(r, sector.mid_angle()),
        align: TextAlign::Center,
        color: fill.contrast_text(),
        connector: None,
    })
}

#[allow(clippy::too_many_arguments)]
fn outside_label<F>(
    text: &str,
    sector: &Sector,
    plot: Rect,
    scale: f64,
    background: Color,
    font: f64,
    pad: f64,
    connectors: bool,
    measure: &F,
) -> Option<PieLabel>
where
    F: Fn(&str, f64) -> f64,
{
    let mid = sector.mid_angle();
    let right_side = mid.cos() >= 0.0;
    let edge = sector.center.polar(sector.outer_radius, mid);
    let elbow = sector.center.polar(sector.outer_radius + OUTSIDE_OFFSET * scale, mid);
    let elbow_len = ELBOW_LENGTH * scale;
    let end = Point::new(
        if right_side { elbow.x + elbow_len } else { elbow.x - elbow_len },
        elbow.y,
    );

    let text = truncate_to_width(text, OUTSIDE_MAX_WIDTH * scale, font, measure);
    if text.is_empty() {
        return None;
    }
    let width = measure(&text, font);
    let (x, align) = if right_side {
        ((end.x + pad).min(plot.right() - width).max(plot.x), TextAlign::Left)
    } else {
        ((end.x - pad).max(plot.x + width).min(plot.right()), TextAlign::Right)
    };

    Some(PieLabel {
        text,
        at: Point::new(x, end.y.clamp(plot.y, plot.bottom())),
        align,
        color: background.contrast_text(),
        connector: connectors.then(|| vec![edge, elbow, end]),
    })
}

// ============================================================================
// RENDERING
// ============================================================================

fn resolve_columns(table: &Table, opts: &PieOptions) -> ChartResult<(String, String)> {
    Ok((
        resolve_column(table, opts.label.as_deref(), 0)?,
        resolve_column(table, opts.value.as_deref(), 1)?,
    ))
}

/// Render a pie or donut chart of `table` onto `surface`, registering one
/// hit region per slice with `frame`.
///
/// Under the strict policy any invalid value replaces the chart with an
/// error block and no slices are computed. Otherwise invalid rows are
/// dropped before percentages are taken.
pub fn render_pie<S: DrawingSurface>(
    table: &Table,
    opts: &PieOptions,
    surface: &mut S,
    frame: &mut Frame,
) -> RenderOutcome<PieLayout> {
    let metrics = surface.metrics();
    let layout = opts
        .common
        .resolve(&metrics, ChartMargin::pie(), opts.common.decorations());

    draw_titles(surface, &layout, opts.common.title.as_deref(), opts.common.subtitle.as_deref());

    let (label_column, value_column) = match resolve_columns(table, opts) {
        Ok(cols) => cols,
        Err(err) => {
            tracing::warn!(error = %err, "Pie chart columns could not be resolved");
            draw_error_block(surface, &layout, &err);
            return RenderOutcome::Error(err);
        }
    };

    let policy = resolve_policy(opts.nan_policy, NanPolicy::Strict);
    if let Err(err) = validate(table, &[value_column.as_str()], policy) {
        tracing::warn!(error = %err, "Pie chart aborted by strict NaN policy");
        draw_error_block(surface, &layout, &err);
        return RenderOutcome::Error(err);
    }

    let background = surface.background();
    let computed = PieLayout::compute(
        table,
        &label_column,
        &value_column,
        opts,
        layout,
        background,
        |t, s| surface.measure_text(t, s),
    );
    let Some(geometry) = computed else {
        draw_placeholder(surface, &layout, NO_DATA_MESSAGE);
        return RenderOutcome::NoData;
    };

    paint(surface, frame, &geometry);
    tracing::debug!(
        slices = geometry.slices.len(),
        filtered = geometry.filtered,
        "Rendered pie chart"
    );
    RenderOutcome::Rendered(geometry)
}

fn paint<S: DrawingSurface>(surface: &mut S, frame: &mut Frame, g: &PieLayout) {
    let sizes = g.layout.sizes;

    for slice in &g.slices {
        let shape = HitShape::Sector(slice.sector);
        let wedge = Sector {
            inner_radius: 0.0,
            ..slice.sector
        };
        if frame.is_over(&shape) {
            surface.fill_sector(wedge.scaled(HOVER_POP), slice.color.with_alpha(1.0));
        } else {
            surface.fill_sector(wedge, slice.color.with_alpha(SLICE_ALPHA));
        }
        frame.register(shape, slice.tooltip());
    }

    if g.style == PieStyle::Donut {
        let background = surface.background();
        surface.fill_circle(g.center, g.inner_radius, background);
    }

    for label in g.slices.iter().filter_map(|s| s.label.as_ref()) {
        if let Some(points) = &label.connector {
            surface.polyline(points, colors::CONNECTOR, 1.0);
        }
        let style = TextStyle::new(sizes.value_font, label.color)
            .align(label.align)
            .baseline(TextBaseline::Middle);
        surface.text(&label.text, label.at, &style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Scene, Shape};
    use tabula_core::{ChartError, Value, record};

    fn departments() -> Table {
        Table::from_records(vec![
            record([("category", Value::from("R&D")), ("count", Value::from(30.0))]),
            record([("category", Value::from("Sales")), ("count", Value::from(70.0))]),
        ])
    }

    fn draw(table: &Table, opts: &PieOptions) -> (Scene, Frame, RenderOutcome<PieLayout>) {
        let mut scene = Scene::new(400.0, 400.0);
        let mut frame = Frame::new(None);
        let outcome = render_pie(table, opts, &mut scene, &mut frame);
        (scene, frame, outcome)
    }

    #[test]
    fn test_label_templates() {
        assert_eq!(LabelContent::Name.render("A", 30.0, 30.0), "A");
        assert_eq!(LabelContent::Value.render("A", 30.0, 30.0), "30");
        assert_eq!(LabelContent::Percent.render("A", 30.0, 29.6), "30%");
        assert_eq!(LabelContent::NameValue.render("A", 30.0, 30.0), "A: 30");
        assert_eq!(LabelContent::NamePercent.render("A", 30.0, 30.0), "A (30%)");
        assert_eq!(LabelContent::All.render("A", 30.0, 30.0), "A: 30 (30%)");
    }

    #[test]
    fn test_options_from_json() {
        let opts: PieOptions = serde_json::from_str(
            r#"{"label": "category", "value": "count", "style": "donut", "holeRadius": 0.6,
                "labelContent": "name_value_percent", "labelPos": "outside", "showConnectors": false,
                "extra": [1, 2]}"#,
        )
        .unwrap();
        assert_eq!(opts.style, PieStyle::Donut);
        assert_eq!(opts.hole_radius, 0.6);
        assert_eq!(opts.label_content, LabelContent::All);
        assert_eq!(opts.label_pos, PieLabelPosition::Outside);
        assert!(!opts.show_connectors);

        let defaults: PieOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, PieOptions::default());
    }

    #[test]
    fn test_slices_start_at_top_and_close_the_turn() {
        let (_, _, outcome) = draw(&departments(), &PieOptions::default());
        let g = outcome.geometry().unwrap();
        assert_eq!(g.slices.len(), 2);
        assert_eq!(g.slices[0].sector.start_angle, START_ANGLE);
        assert!((g.slices[0].sweep() - 0.3 * TAU).abs() < 1e-12);
        assert_eq!(g.slices[1].sector.start_angle, g.slices[0].sector.end_angle);
        assert_eq!(g.slices[1].sector.end_angle, START_ANGLE + TAU);
        assert_eq!(g.slices[0].label.as_ref().unwrap().text, "30%");
        assert_eq!(g.slices[1].label.as_ref().unwrap().text, "70%");
    }

    #[test]
    fn test_strict_default_blocks_invalid_data() {
        let table = Table::from_records(vec![
            record([("k", Value::from("a")), ("v", Value::from(10.0))]),
            record([("k", Value::from("b")), ("v", Value::from(f64::NAN))]),
        ]);
        let (scene, frame, outcome) = draw(&table, &PieOptions::default());
        assert_eq!(
            outcome,
            RenderOutcome::Error(ChartError::DataQuality {
                invalid_rows: 1,
                total_rows: 2,
                columns: vec![("v".to_string(), 1)],
            })
        );
        assert!(scene.sectors().is_empty());
        assert!(frame.regions().is_empty());
    }

    #[test]
    fn test_warn_filters_invalid_rows_before_percentages() {
        let table = Table::from_records(vec![
            record([("k", Value::from("a")), ("v", Value::from(25.0))]),
            record([("k", Value::from("b")), ("v", Value::from("n/a"))]),
            record([("k", Value::from("c")), ("v", Value::from(75.0))]),
        ]);
        let opts = PieOptions {
            nan_policy: Some(NanPolicy::Warn),
            ..Default::default()
        };
        let (_, _, outcome) = draw(&table, &opts);
        let g = outcome.geometry().unwrap();
        assert_eq!(g.slices.len(), 2);
        assert_eq!(g.filtered, 1);
        assert_eq!(g.total, 100.0);
        assert_eq!(g.slices[1].row, 2);
        assert!((g.slices[1].percent - 75.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_values_skipped() {
        let table = Table::from_records(vec![
            record([("k", Value::from("a")), ("v", Value::from(-5.0))]),
            record([("k", Value::from("b")), ("v", Value::from(5.0))]),
        ]);
        // default policy is strict; negatives are numbers, so they pass it
        let (_, _, outcome) = draw(&table, &PieOptions::default());
        let g = outcome.geometry().unwrap();
        assert_eq!(g.slices.len(), 1);
        assert!((g.slices[0].sweep() - TAU).abs() < 1e-12);
        assert_eq!(g.negative, 1);
        assert_eq!(g.filtered, 1);
    }

    #[test]
    fn test_no_valid_rows_shows_placeholder() {
        let table = Table::from_records(vec![record([("k", Value::from("a")), ("v", Value::from(""))])]);
        let opts = PieOptions {
            nan_policy: Some(NanPolicy::Silent),
            ..Default::default()
        };
        let (scene, _, outcome) = draw(&table, &opts);
        assert_eq!(outcome, RenderOutcome::NoData);
        assert!(scene.texts().contains(&NO_DATA_MESSAGE));

        let zeros = Table::from_records(vec![record([("k", Value::from("a")), ("v", Value::from(0.0))])]);
        assert_eq!(draw(&zeros, &PieOptions::default()).2, RenderOutcome::NoData);
    }

    #[test]
    fn test_donut_overlays_background_disc() {
        let opts = PieOptions {
            style: PieStyle::Donut,
            hole_radius: 0.4,
            ..Default::default()
        };
        let (scene, _, outcome) = draw(&departments(), &opts);
        let g = outcome.geometry().unwrap();
        assert!((g.inner_radius - g.radius * 0.4).abs() < 1e-12);
        let disc = scene.shapes().iter().find_map(|s| match s {
            Shape::Circle { radius, fill, .. } => Some((*radius, *fill)),
            _ => None,
        });
        assert_eq!(disc, Some((g.inner_radius, colors::BACKGROUND)));

        // inside labels sit midway within the ring
        let label = g.slices[1].label.as_ref().unwrap();
        let r = label.at.distance(g.center);
        assert!((r - (g.inner_radius + g.radius) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_hole_radius_falls_back() {
        let opts = PieOptions {
            hole_radius: 1.5,
            ..Default::default()
        };
        assert_eq!(opts.effective_hole(), DEFAULT_HOLE_RADIUS);
    }

    #[test]
    fn test_thin_slice_inside_label_hidden() {
        let table = Table::from_records(vec![
            record([("k", Value::from("big")), ("v", Value::from(99.0))]),
            record([("k", Value::from("thin")), ("v", Value::from(1.0))]),
        ]);
        let (_, _, outcome) = draw(&table, &PieOptions::default());
        let g = outcome.geometry().unwrap();
        assert!(g.slices[0].label.is_some());
        assert!(g.slices[1].label.is_none());
    }

    #[test]
    fn test_outside_labels_clamped_with_connectors() {
        let opts = PieOptions {
            label_pos: PieLabelPosition::Outside,
            label_content: LabelContent::All,
            ..Default::default()
        };
        let (scene, _, outcome) = draw(&departments(), &opts);
        let g = outcome.geometry().unwrap();
        let plot = g.layout.plot;
        for slice in &g.slices {
            let label = slice.label.as_ref().unwrap();
            assert!(label.at.x >= plot.x && label.at.x <= plot.right());
            assert_eq!(label.connector.as_ref().unwrap().len(), 3);
        }
        let polylines = scene
            .shapes()
            .iter()
            .filter(|s| matches!(s, Shape::Polyline { .. }))
            .count();
        assert_eq!(polylines, 2);
    }

    #[test]
    fn test_hover_pops_slice_and_reports_share() {
        let (_, _, outcome) = draw(&departments(), &PieOptions::default());
        let g = outcome.geometry().unwrap();
        let target = &g.slices[1];
        let pointer = g.center.polar(g.radius * 0.5, target.sector.mid_angle());

        let mut scene = Scene::new(400.0, 400.0);
        let mut frame = Frame::new(Some(pointer));
        render_pie(&departments(), &PieOptions::default(), &mut scene, &mut frame);
        let hover = frame.resolve();
        assert!(hover.active);
        assert_eq!(hover.content, vec!["Sales", "Value: 70", "Share: 70%"]);

        let popped = scene.sectors()[1];
        assert!((popped.outer_radius - g.radius * HOVER_POP).abs() < 1e-9);
        assert_eq!(scene.sectors()[0].outer_radius, g.radius);
    }
}
