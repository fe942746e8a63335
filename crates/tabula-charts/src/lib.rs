//! # tabula-charts
//!
//! Chart computation and rendering for Tabula tables.
//! Turns a [`Table`](tabula_core::Table) plus typed options into geometry
//! painted on an abstract [`DrawingSurface`], with hover hit regions.
//!
//! ## Architecture
//!
//! Uses Strategy pattern for:
//! - Scale computation (linear, band, nice intervals)
//! - Drawing surfaces (recording `Scene`, or any host canvas)
//!
//! ## Modules
//!
//! - `chartkit` - Core primitives: scales, nice ticks, paths, formatters
//! - `validate` - NaN policy and invalid-cell reports
//! - `layout` - responsive scale, margins and element sizes
//! - `surface` / `scene` - drawing abstraction and a recording surface
//! - `hover` / `tooltip` - per-frame hit testing and tooltip placement
//! - `bar` / `pie` - the renderers

pub mod bar;
pub mod chartkit;
pub mod hover;
pub mod layout;
pub mod pie;
pub mod render;
pub mod scene;
pub mod surface;
pub mod tooltip;
pub mod validate;

pub use bar::*;
pub use chartkit::*;
pub use hover::*;
pub use layout::*;
pub use pie::*;
pub use render::*;
pub use scene::*;
pub use surface::*;
pub use tooltip::*;
pub use validate::*;

// Re-export colors from tabula-core for convenience
pub use tabula_core::colors;

use serde::{Deserialize, Serialize};

/// Chart margin configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl ChartMargin {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }

    pub const fn uniform(margin: f64) -> Self {
        Self::new(margin, margin, margin, margin)
    }

    pub const fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Standard chart margins
    pub const fn standard() -> Self {
        Self::new(20.0, 60.0, 30.0, 60.0)
    }

    /// Bar charts: room for category labels on the left and below
    pub const fn bar() -> Self {
        Self::new(30.0, 30.0, 50.0, 80.0)
    }

    /// Pie charts: even breathing room
    pub const fn pie() -> Self {
        Self::uniform(30.0)
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

impl Default for ChartMargin {
    fn default() -> Self {
        Self::standard()
    }
}

/// Partial margin from an option record; unset sides keep the chart default
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginOptions {
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
}

impl MarginOptions {
    pub fn resolve(&self, defaults: ChartMargin) -> ChartMargin {
        ChartMargin {
            top: self.top.unwrap_or(defaults.top),
            right: self.right.unwrap_or(defaults.right),
            bottom: self.bottom.unwrap_or(defaults.bottom),
            left: self.left.unwrap_or(defaults.left),
        }
    }
}

/// Chart dimensions with margin handling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartDimensions {
    pub width: f64,
    pub height: f64,
    pub margin: ChartMargin,
}

impl ChartDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margin: ChartMargin::default(),
        }
    }

    pub fn with_margin(mut self, margin: ChartMargin) -> Self {
        self.margin = margin;
        self
    }

    /// Inner width (excluding margins)
    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    /// Inner height (excluding margins)
    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }

    /// ViewBox string for SVG
    pub fn viewbox(&self) -> String {
        format!("0 0 {} {}", self.width, self.height)
    }
}

impl Default for ChartDimensions {
    fn default() -> Self {
        Self::new(800.0, 400.0)
    }
}
