//! # tabula-components
//!
//! Leptos SVG components for Tabula.
//! A [`ChartCanvas`] renders a list of charts onto one recorded scene per
//! frame and paints the recorded shapes as SVG.

pub mod canvas;
pub mod charts;
pub mod paint;

pub use canvas::*;
pub use charts::*;
pub use paint::*;
