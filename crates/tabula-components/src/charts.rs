//! Chart descriptions and per-frame computation
//!
//! A frame is one full pass: every chart renders onto a fresh [`Scene`]
//! in order, hover is resolved against the registered regions, and the
//! tooltip is drawn last so it sits above all charts.

use tabula_charts::{
    BarOptions, DrawingSurface, Frame, HoverState, PieOptions, PieStyle, Point, RenderOutcome, Scene, Shape,
    SurfaceMetrics, TooltipLayout, draw_tooltip, render_bar, render_pie,
};
use tabula_core::{ChartError, ChartResult, Color, Table};

/// One chart to draw on a canvas
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    Bar { table: Table, options: BarOptions },
    Pie { table: Table, options: PieOptions },
}

impl ChartSpec {
    pub fn bar(table: Table, options: BarOptions) -> Self {
        Self::Bar { table, options }
    }

    pub fn pie(table: Table, options: PieOptions) -> Self {
        Self::Pie { table, options }
    }

    /// Build from a chart kind (`bar`, `pie` or `donut`) and a JSON option bag
    pub fn from_json(kind: &str, table: Table, options: serde_json::Value) -> ChartResult<Self> {
        let invalid = |e: serde_json::Error| ChartError::configuration(format!("invalid {kind} options: {e}"));
        match kind {
            "bar" => Ok(Self::bar(table, serde_json::from_value(options).map_err(invalid)?)),
            "pie" => Ok(Self::pie(table, serde_json::from_value(options).map_err(invalid)?)),
            "donut" => {
                let mut options: PieOptions = serde_json::from_value(options).map_err(invalid)?;
                options.style = PieStyle::Donut;
                Ok(Self::pie(table, options))
            }
            other => Err(ChartError::configuration(format!("unknown chart kind '{other}'"))),
        }
    }

    /// Render onto `surface`, returning the error drawn in place of the chart
    pub fn render<S: DrawingSurface>(&self, surface: &mut S, frame: &mut Frame) -> Option<ChartError> {
        match self {
            Self::Bar { table, options } => outcome_error(render_bar(table, options, surface, frame)),
            Self::Pie { table, options } => outcome_error(render_pie(table, options, surface, frame)),
        }
    }
}

fn outcome_error<G>(outcome: RenderOutcome<G>) -> Option<ChartError> {
    match outcome {
        RenderOutcome::Error(e) => Some(e),
        _ => None,
    }
}

/// Everything one frame produced
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub background: Color,
    pub shapes: Vec<Shape>,
    /// Hover as resolved, before the tooltip consumed it
    pub hover: HoverState,
    pub tooltip: Option<TooltipLayout>,
    /// Last error drawn by any chart
    pub error: Option<ChartError>,
}

/// Render all `charts` for one pointer position
pub fn compute_frame(charts: &[ChartSpec], metrics: SurfaceMetrics, pointer: Option<Point>) -> FrameOutput {
    let mut scene = Scene::with_metrics(metrics);
    let mut frame = Frame::new(pointer);
    let mut error = None;

    for chart in charts {
        if let Some(e) = chart.render(&mut scene, &mut frame) {
            error = Some(e);
        }
    }

    let hover = frame.resolve();
    let mut pending = hover.clone();
    let tooltip = draw_tooltip(&mut scene, &mut pending);

    FrameOutput {
        background: scene.background(),
        shapes: scene.into_shapes(),
        hover,
        tooltip,
        error,
    }
}
