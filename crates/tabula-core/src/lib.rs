//! # tabula-core
//!
//! Core data types for the Tabula charting engine.
//! Implements Strategy pattern for number formatting.
//!
//! ## Modules
//!
//! - `value` - scalar cells and numeric coercion
//! - `table` - ordered in-memory table with filter/group/pivot/sort
//! - `color` - typed colors, parsing, contrast, palettes
//! - `error` - shared error taxonomy

pub mod color;
pub mod error;
pub mod table;
pub mod value;

pub use color::*;
pub use error::*;
pub use table::*;
pub use value::*;

// ============================================================================
// STRATEGY PATTERN: Formatters
// ============================================================================

/// Strategy trait for rendering numbers as label text
pub trait NumberFormatter: Send + Sync {
    fn format(&self, num: f64) -> String;
}

/// Integers plain, fractions trimmed to at most `decimals` places
#[derive(Debug, Clone)]
pub struct DecimalFormatter {
    pub decimals: usize,
}

impl Default for DecimalFormatter {
    fn default() -> Self {
        Self { decimals: 2 }
    }
}

impl NumberFormatter for DecimalFormatter {
    fn format(&self, num: f64) -> String {
        if num.fract() == 0.0 {
            return format_number(num);
        }
        let fixed = format!("{:.prec$}", num, prec = self.decimals);
        if fixed.contains('.') {
            fixed.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            fixed
        }
    }
}

/// Compact formatter for large numbers (K, M, B suffixes)
#[derive(Debug, Clone, Default)]
pub struct CompactNumberFormatter;

impl NumberFormatter for CompactNumberFormatter {
    fn format(&self, num: f64) -> String {
        let abs = num.abs();
        let sign = if num < 0.0 { "-" } else { "" };

        if abs >= 1_000_000_000.0 {
            format!("{}{:.2}B", sign, abs / 1_000_000_000.0)
        } else if abs >= 1_000_000.0 {
            format!("{}{:.2}M", sign, abs / 1_000_000.0)
        } else if abs >= 1_000.0 {
            format!("{}{:.2}K", sign, abs / 1_000.0)
        } else {
            DecimalFormatter::default().format(num)
        }
    }
}

// ============================================================================
// COLOR CONSTANTS
// ============================================================================

pub mod colors {
    use crate::Color;

    pub const BACKGROUND: Color = Color::WHITE;
    pub const TEXT_DARK: Color = Color::rgb(33, 33, 33);
    pub const TEXT_LIGHT: Color = Color::rgb(250, 250, 250);
    pub const TEXT_MUTED: Color = Color::rgb(117, 117, 117);
    pub const AXIS: Color = Color::rgb(97, 97, 97);
    pub const GRID: Color = Color::rgb(224, 224, 224);
    pub const CONNECTOR: Color = Color::rgb(158, 158, 158);
    pub const ERROR_FILL: Color = Color::rgb(253, 236, 234);
    pub const ERROR_BORDER: Color = Color::rgb(211, 47, 47);
    pub const ERROR_TEXT: Color = Color::rgb(183, 28, 28);
    pub const PLACEHOLDER: Color = Color::rgb(245, 245, 245);
    pub const TOOLTIP_BG: Color = Color::rgba(33, 33, 33, 230);
    pub const TOOLTIP_TEXT: Color = Color::rgb(250, 250, 250);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_formatter_trims() {
        let f = DecimalFormatter::default();
        assert_eq!(f.format(30.0), "30");
        assert_eq!(f.format(2.5), "2.5");
        assert_eq!(f.format(1.23456), "1.23");
    }

    #[test]
    fn test_compact_formatter() {
        let formatter = CompactNumberFormatter;
        assert_eq!(formatter.format(1_500_000.0), "1.50M");
        assert_eq!(formatter.format(2_500.0), "2.50K");
        assert_eq!(formatter.format(500.0), "500");
    }
}
