//! Chart canvas components

use crate::charts::{ChartSpec, compute_frame};
use crate::paint::paint_shape;
use leptos::prelude::*;
use leptos::svg::Svg;
use tabula_charts::{BarOptions, ChartDimensions, PieOptions};
use tabula_core::Table;
use tabula_state::{ChartState, try_use_chart_state, use_chart_state};
use wasm_bindgen::JsCast;

/// Map a client position onto a `width` x `height` viewBox drawn with
/// `xMidYMid meet` into `bounds` (left, top, width, height)
pub fn client_to_surface(
    client: (f64, f64),
    bounds: (f64, f64, f64, f64),
    width: f64,
    height: f64,
) -> Option<(f64, f64)> {
    let (left, top, bw, bh) = bounds;
    if bw <= 0.0 || bh <= 0.0 || width <= 0.0 || height <= 0.0 {
        return None;
    }
    let scale = (bw / width).min(bh / height);
    let pad_x = (bw - width * scale) / 2.0;
    let pad_y = (bh - height * scale) / 2.0;
    Some(((client.0 - left - pad_x) / scale, (client.1 - top - pad_y) / scale))
}

/// SVG canvas that draws every chart in `charts` on one surface
#[component]
pub fn ChartCanvas(
    #[prop(into)] charts: Signal<Vec<ChartSpec>>,
    #[prop(default = 800.0)] width: f64,
    #[prop(default = 400.0)] height: f64,
    /// State to drive; falls back to the context, then to a private one
    #[prop(optional)]
    state: Option<ChartState>,
) -> impl IntoView {
    let state = state.or_else(try_use_chart_state).unwrap_or_default();
    let svg_ref = NodeRef::<Svg>::new();

    // One full frame per change of pointer, data or display size
    let frame = Memo::new(move |_| {
        let metrics = state.metrics(width, height);
        let pointer = state.pointer.get();
        charts.with(|charts| compute_frame(charts, metrics, pointer))
    });

    Effect::new(move |_| {
        let out = frame.get();
        if let Some(err) = &out.error {
            tracing::debug!(error = %err, "chart drawn as error block");
        }
        state.set_hover(out.hover);
        state.set_error(out.error);
    });

    // Displayed size is known once mounted
    Effect::new(move |_| {
        if let Some(svg) = svg_ref.get() {
            let rect = svg.get_bounding_client_rect();
            state.set_display(rect.width(), rect.height());
        }
    });

    let on_move = move |ev: web_sys::MouseEvent| {
        let Some(element) = ev.current_target().and_then(|t| t.dyn_into::<web_sys::Element>().ok()) else {
            return;
        };
        let rect = element.get_bounding_client_rect();
        let bounds = (rect.left(), rect.top(), rect.width(), rect.height());
        let client = (ev.client_x() as f64, ev.client_y() as f64);
        if let Some((x, y)) = client_to_surface(client, bounds, width, height) {
            state.set_display(rect.width(), rect.height());
            state.set_pointer(x, y);
        }
    };

    view! {
        <svg
            class="chart-canvas"
            node_ref=svg_ref
            viewBox=ChartDimensions::new(width, height).viewbox()
            preserveAspectRatio="xMidYMid meet"
            style="width: 100%; height: auto; display: block;"
            on:mousemove=on_move
            on:mouseleave=move |_| state.clear_pointer()
        >
            {move || {
                let out = frame.get();
                view! {
                    <rect width=width height=height fill=out.background.to_css() />
                    {out.shapes.into_iter().map(paint_shape).collect_view()}
                }
            }}
        </svg>
    }
}

/// Single bar chart filling its own canvas
#[component]
pub fn BarChart(
    #[prop(into)] table: Signal<Table>,
    #[prop(optional)] options: Option<BarOptions>,
    #[prop(default = 800.0)] width: f64,
    #[prop(default = 400.0)] height: f64,
) -> impl IntoView {
    let options = options.unwrap_or_default();
    let charts = Signal::derive(move || vec![ChartSpec::bar(table.get(), options.clone())]);

    view! { <ChartCanvas charts=charts width=width height=height /> }
}

/// Single pie or donut chart filling its own canvas
#[component]
pub fn PieChart(
    #[prop(into)] table: Signal<Table>,
    #[prop(optional)] options: Option<PieOptions>,
    #[prop(default = 400.0)] width: f64,
    #[prop(default = 400.0)] height: f64,
) -> impl IntoView {
    let options = options.unwrap_or_default();
    let charts = Signal::derive(move || vec![ChartSpec::pie(table.get(), options.clone())]);

    view! { <ChartCanvas charts=charts width=width height=height /> }
}

/// Last chart error reported through the shared state, if any
#[component]
pub fn ChartStatus(#[prop(optional)] state: Option<ChartState>) -> impl IntoView {
    let state = state.unwrap_or_else(use_chart_state);

    view! {
        <div class="chart-status">
            {move || match state.last_error.get() {
                Some(err) => view! { <span class="status-error">{err.to_string()}</span> }.into_any(),
                None => view! { <span class="status-ok">"OK"</span> }.into_any(),
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_to_surface_exact_fit() {
        let p = client_to_surface((110.0, 70.0), (10.0, 20.0, 400.0, 200.0), 800.0, 400.0).unwrap();
        assert_eq!(p, (200.0, 100.0));
    }

    #[test]
    fn test_client_to_surface_letterboxed() {
        // 800x400 drawn into a 400x400 box: 100px bands above and below
        let p = client_to_surface((200.0, 100.0), (0.0, 0.0, 400.0, 400.0), 800.0, 400.0).unwrap();
        assert_eq!(p, (400.0, 0.0));
        assert!(client_to_surface((0.0, 0.0), (0.0, 0.0, 0.0, 100.0), 800.0, 400.0).is_none());
    }
}
