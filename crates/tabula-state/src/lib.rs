//! # tabula-state
//!
//! Reactive chart state for Tabula.
//! Holds the pointer, the displayed size of the canvas and the last resolved
//! hover in Leptos signals so a chart canvas recomputes one frame whenever
//! any of them changes.

use leptos::prelude::*;
use tabula_charts::{HoverState, NanPolicy, Point, SurfaceMetrics, clear_default_nan_policy, set_default_nan_policy};
use tabula_core::ChartError;

// ============================================================================
// CHART STATE
// ============================================================================

/// Shared state for one or more chart canvases
#[derive(Clone, Copy)]
pub struct ChartState {
    /// Pointer position in surface coordinates, `None` when outside
    pub pointer: RwSignal<Option<Point>>,
    /// Size the canvas is displayed at, in CSS pixels
    pub display: RwSignal<Option<(f64, f64)>>,
    /// Hover resolved during the last frame
    pub hover: RwSignal<HoverState>,
    /// Process-wide NaN policy, mirrored for the UI
    pub nan_policy: RwSignal<Option<NanPolicy>>,
    /// Last error a renderer drew in place of a chart
    pub last_error: RwSignal<Option<ChartError>>,
}

impl ChartState {
    pub fn new() -> Self {
        Self {
            pointer: RwSignal::new(None),
            display: RwSignal::new(None),
            hover: RwSignal::new(HoverState::default()),
            nan_policy: RwSignal::new(None),
            last_error: RwSignal::new(None),
        }
    }

    // ========================================================================
    // Pointer
    // ========================================================================

    pub fn set_pointer(&self, x: f64, y: f64) {
        self.pointer.set(Some(Point::new(x, y)));
    }

    /// Pointer left the canvas
    pub fn clear_pointer(&self) {
        self.pointer.set(None);
        self.hover.update(HoverState::reset);
    }

    // ========================================================================
    // Display size
    // ========================================================================

    pub fn set_display(&self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 && self.display.get_untracked() != Some((width, height)) {
            self.display.set(Some((width, height)));
        }
    }

    /// Surface metrics for a canvas of nominal `width` x `height`
    pub fn metrics(&self, width: f64, height: f64) -> SurfaceMetrics {
        let base = SurfaceMetrics::new(width, height);
        match self.display.get() {
            Some((dw, dh)) => base.with_display(dw, dh),
            None => base,
        }
    }

    // ========================================================================
    // Frame results
    // ========================================================================

    pub fn set_hover(&self, hover: HoverState) {
        self.hover.set(hover);
    }

    pub fn is_hovering(&self) -> bool {
        self.hover.get().active
    }

    pub fn set_error(&self, error: Option<ChartError>) {
        if self.last_error.get_untracked() != error {
            self.last_error.set(error);
        }
    }

    pub fn has_error(&self) -> bool {
        self.last_error.get().is_some()
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Set the process-wide NaN policy; `None` restores per-chart defaults
    pub fn set_nan_policy(&self, policy: Option<NanPolicy>) {
        match policy {
            Some(policy) => set_default_nan_policy(policy),
            None => clear_default_nan_policy(),
        }
        tracing::debug!(policy = ?policy, "default NaN policy changed");
        self.nan_policy.set(policy);
    }
}

impl Default for ChartState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CONTEXT HELPERS
// ============================================================================

/// Provide chart state context to component tree
pub fn provide_chart_state() -> ChartState {
    let state = ChartState::new();
    provide_context(state);
    state
}

/// Use chart state from context
pub fn use_chart_state() -> ChartState {
    expect_context::<ChartState>()
}

/// Try to get chart state from context (returns None if not provided)
pub fn try_use_chart_state() -> Option<ChartState> {
    use_context::<ChartState>()
}
