//! # chartkit
//!
//! Core chart primitives: scales, nice intervals, path builders, axis
//! number formatting.
//! Implements Strategy pattern for flexible scale behaviors.

use std::fmt::Write;
use tabula_core::{CompactNumberFormatter, DecimalFormatter, NumberFormatter};

// ============================================================================
// STRATEGY PATTERN: Scale Trait
// ============================================================================

/// Strategy trait for scales (maps domain values to range values)
pub trait Scale: Send + Sync {
    /// Scale a value from domain to range
    fn scale(&self, value: f64) -> f64;

    /// Tick values at a nice interval, inside the domain
    fn ticks(&self, count: usize) -> Vec<f64>;
}

// ============================================================================
// NICE INTERVALS
// ============================================================================

/// Default number of ticks requested from [`nice_scale`]
pub const DEFAULT_TICK_COUNT: usize = 5;

const NICE_MULTIPLIERS: [f64; 4] = [1.0, 2.0, 5.0, 10.0];

/// Rounded axis bounds and tick spacing for a numeric range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NiceScale {
    pub interval: f64,
    pub nice_min: f64,
    pub nice_max: f64,
}

impl NiceScale {
    /// Every multiple of `interval` from `nice_min` to `nice_max` inclusive
    pub fn ticks(&self) -> Vec<f64> {
        let first = (self.nice_min / self.interval).round();
        let steps = ((self.nice_max - self.nice_min) / self.interval).round().max(0.0) as usize;
        (0..=steps)
            .map(|i| (first + i as f64) * self.interval)
            .collect()
    }

    pub fn tick_count(&self) -> usize {
        ((self.nice_max - self.nice_min) / self.interval).round().max(0.0) as usize + 1
    }
}

/// Human-friendly bounds for `[data_min, data_max]`.
///
/// The interval is 1, 2, 5 or 10 times a power of ten, chosen as the
/// smallest such value at least `(max - min) / target_ticks`. A zero-width
/// range gets an interval of 1.
pub fn nice_scale(data_min: f64, data_max: f64, target_ticks: usize) -> NiceScale {
    if !data_min.is_finite() || !data_max.is_finite() {
        return NiceScale {
            interval: 1.0,
            nice_min: 0.0,
            nice_max: 1.0,
        };
    }
    let (lo, hi) = if data_min <= data_max {
        (data_min, data_max)
    } else {
        (data_max, data_min)
    };

    let range = hi - lo;
    let interval = if range == 0.0 {
        1.0
    } else {
        let rough = range / target_ticks.max(1) as f64;
        let magnitude = 10.0_f64.powf(rough.log10().floor());
        let normalized = rough / magnitude;
        let multiplier = NICE_MULTIPLIERS
            .iter()
            .copied()
            .find(|m| *m >= normalized - 1e-9)
            .unwrap_or(10.0);
        multiplier * magnitude
    };

    let mut nice_min = (lo / interval).floor() * interval;
    let mut nice_max = (hi / interval).ceil() * interval;
    // floating point can land one step inside the data range
    if nice_min > lo {
        nice_min -= interval;
    }
    if nice_max < hi {
        nice_max += interval;
    }

    NiceScale {
        interval,
        nice_min,
        nice_max,
    }
}

// ============================================================================
// LINEAR SCALE
// ============================================================================

/// Linear scale (D3-style continuous scale)
#[derive(Debug, Clone)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new() -> Self {
        Self {
            domain: (0.0, 1.0),
            range: (0.0, 1.0),
        }
    }

    pub fn domain(mut self, min: f64, max: f64) -> Self {
        self.domain = (min, max);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.range = (min, max);
        self
    }
}

impl Default for LinearScale {
    fn default() -> Self {
        Self::new()
    }
}

impl Scale for LinearScale {
    fn scale(&self, value: f64) -> f64 {
        let (d_min, d_max) = self.domain;
        let (r_min, r_max) = self.range;

        if (d_max - d_min).abs() < f64::EPSILON {
            return (r_min + r_max) / 2.0;
        }

        r_min + (value - d_min) / (d_max - d_min) * (r_max - r_min)
    }

    fn ticks(&self, count: usize) -> Vec<f64> {
        let (min, max) = self.domain;
        if min == max || count == 0 {
            return vec![min];
        }

        let epsilon = (max - min).abs() * 1e-9;
        nice_scale(min, max, count)
            .ticks()
            .into_iter()
            .filter(|t| *t >= min.min(max) - epsilon && *t <= max.max(min) + epsilon)
            .collect()
    }
}

// ============================================================================
// BAND SCALE (categorical axis)
// ============================================================================

/// Band scale: one equal slot per category, with a bar occupying
/// `1 - padding` of each slot, centered
#[derive(Debug, Clone)]
pub struct BandScale {
    domain_count: usize,
    range: (f64, f64),
    padding: f64,
}

impl BandScale {
    pub fn new(count: usize) -> Self {
        Self {
            domain_count: count,
            range: (0.0, 1.0),
            padding: 0.2,
        }
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.range = (min, max);
        self
    }

    pub fn padding(mut self, padding: f64) -> Self {
        self.padding = padding.clamp(0.0, 1.0);
        self
    }

    /// Width of the occupied part of a slot
    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Full slot size
    pub fn step(&self) -> f64 {
        if self.domain_count == 0 {
            return 0.0;
        }

        let (r_min, r_max) = self.range;
        (r_max - r_min) / self.domain_count as f64
    }

    /// Start of the slot for `index`
    pub fn slot_start(&self, index: usize) -> f64 {
        self.range.0 + index as f64 * self.step()
    }

    /// Start of the occupied part of the slot for `index`
    pub fn scale(&self, index: usize) -> f64 {
        if self.domain_count == 0 {
            return self.range.0;
        }
        self.slot_start(index) + self.step() * self.padding / 2.0
    }

    /// Get center position for index
    pub fn scale_center(&self, index: usize) -> f64 {
        self.slot_start(index) + self.step() / 2.0
    }
}

impl Default for BandScale {
    fn default() -> Self {
        Self::new(10)
    }
}

// ============================================================================
// PATH BUILDER (fluent API)
// ============================================================================

/// SVG path builder with fluent API
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    commands: String,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self {
            commands: String::with_capacity(256),
        }
    }

    pub fn move_to(mut self, x: f64, y: f64) -> Self {
        let _ = write!(self.commands, "M{:.2},{:.2}", x, y);
        self
    }

    pub fn line_to(mut self, x: f64, y: f64) -> Self {
        let _ = write!(self.commands, "L{:.2},{:.2}", x, y);
        self
    }

    pub fn arc_to(
        mut self,
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) -> Self {
        let _ = write!(
            self.commands,
            "A{:.2},{:.2},{:.2},{},{},{:.2},{:.2}",
            rx, ry, rotation, large_arc as u8, sweep as u8, x, y
        );
        self
    }

    pub fn close(mut self) -> Self {
        self.commands.push('Z');
        self
    }

    pub fn build(self) -> String {
        self.commands
    }
}

/// Closed path for an annular wedge (`inner = 0` gives a pie slice).
///
/// Angles are radians in screen space, increasing clockwise. Full turns are
/// split into two half arcs since one SVG arc cannot close on itself.
pub fn sector_path(cx: f64, cy: f64, inner: f64, outer: f64, start: f64, end: f64) -> String {
    let sweep = (end - start).abs();
    let at = |r: f64, a: f64| (cx + r * a.cos(), cy + r * a.sin());

    if sweep >= std::f64::consts::TAU - 1e-9 {
        let mid = start + std::f64::consts::PI;
        let (sx, sy) = at(outer, start);
        let (mx, my) = at(outer, mid);
        let mut path = PathBuilder::new()
            .move_to(sx, sy)
            .arc_to(outer, outer, 0.0, false, true, mx, my)
            .arc_to(outer, outer, 0.0, false, true, sx, sy)
            .close();
        if inner > 0.0 {
            let (ix, iy) = at(inner, start);
            let (jx, jy) = at(inner, mid);
            path = path
                .move_to(ix, iy)
                .arc_to(inner, inner, 0.0, false, false, jx, jy)
                .arc_to(inner, inner, 0.0, false, false, ix, iy)
                .close();
        }
        return path.build();
    }

    let large = sweep > std::f64::consts::PI;
    let (ox1, oy1) = at(outer, start);
    let (ox2, oy2) = at(outer, end);
    let builder = PathBuilder::new()
        .move_to(ox1, oy1)
        .arc_to(outer, outer, 0.0, large, true, ox2, oy2);

    if inner > 0.0 {
        let (ix2, iy2) = at(inner, end);
        let (ix1, iy1) = at(inner, start);
        builder
            .line_to(ix2, iy2)
            .arc_to(inner, inner, 0.0, large, false, ix1, iy1)
            .close()
            .build()
    } else {
        builder.line_to(cx, cy).close().build()
    }
}

// ============================================================================
// FORMATTERS
// ============================================================================

/// Format large numbers with K/M/B suffixes
pub fn format_large_number(num: f64) -> String {
    CompactNumberFormatter.format(num)
}

/// Format a data value for labels and tooltips
pub fn format_value(num: f64) -> String {
    DecimalFormatter::default().format(num)
}

/// Format an axis tick: compact suffixes for large magnitudes
pub fn format_tick(num: f64) -> String {
    if num.abs() >= 10_000.0 {
        format_large_number(num)
    } else {
        format_value(num)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_scale() {
        let scale = LinearScale::new()
            .domain(0.0, 100.0)
            .range(0.0, 500.0);

        assert_eq!(scale.scale(0.0), 0.0);
        assert_eq!(scale.scale(50.0), 250.0);
        assert_eq!(scale.scale(100.0), 500.0);
    }

    #[test]
    fn test_linear_ticks_use_nice_interval() {
        // 7 / 5 = 1.4 snaps up to 2, never an even split of 1.75
        let scale = LinearScale::new().domain(0.0, 7.0).range(0.0, 100.0);
        assert_eq!(scale.ticks(5), vec![0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_band_scale() {
        let scale = BandScale::new(5).range(0.0, 100.0).padding(0.2);
        assert_eq!(scale.step(), 20.0);
        assert!((scale.bandwidth() - 16.0).abs() < 1e-9);
        assert!((scale.scale(1) - 22.0).abs() < 1e-9);
        assert_eq!(scale.scale_center(0), 10.0);
    }

    #[test]
    fn test_nice_scale_basic() {
        let nice = nice_scale(0.0, 97.0, 5);
        assert_eq!(nice.interval, 20.0);
        assert_eq!(nice.nice_min, 0.0);
        assert_eq!(nice.nice_max, 100.0);
        assert_eq!(nice.ticks(), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
    }

    #[test]
    fn test_nice_scale_snaps_up() {
        // rough interval 0.3 -> 0.5
        let nice = nice_scale(0.1, 1.6, 5);
        assert!((nice.interval - 0.5).abs() < 1e-12);
        assert_eq!(nice.nice_min, 0.0);
        assert_eq!(nice.nice_max, 2.0);

        // rough interval exactly 2 stays 2
        assert_eq!(nice_scale(0.0, 10.0, 5).interval, 2.0);
        // rough interval 11 -> 20
        assert_eq!(nice_scale(0.0, 55.0, 5).interval, 20.0);
    }

    #[test]
    fn test_nice_scale_degenerate_range() {
        let nice = nice_scale(5.0, 5.0, 5);
        assert_eq!(nice.interval, 1.0);
        assert_eq!(nice.ticks(), vec![5.0]);
    }

    #[test]
    fn test_nice_scale_law_holds_over_many_ranges() {
        let ranges = [
            (-3.7, 12.2),
            (0.001, 0.0093),
            (1234.0, 98765.0),
            (-500.0, -20.0),
            (0.0, 1.0),
            (17.0, 17.5),
        ];
        for (lo, hi) in ranges {
            for target in [2, 5, 10] {
                let nice = nice_scale(lo, hi, target);
                assert!(nice.nice_min <= lo, "{lo}..{hi}");
                assert!(nice.nice_max >= hi, "{lo}..{hi}");
                let steps = (nice.nice_max - nice.nice_min) / nice.interval;
                assert!((steps - steps.round()).abs() < 1e-6, "{lo}..{hi}");

                let ticks = nice.ticks();
                for pair in ticks.windows(2) {
                    assert!((pair[1] - pair[0] - nice.interval).abs() < nice.interval * 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_nice_ticks_stay_in_domain() {
        let scale = LinearScale::new().domain(0.0, 97.0);
        assert_eq!(scale.ticks(5), vec![0.0, 20.0, 40.0, 60.0, 80.0]);
    }

    #[test]
    fn test_path_builder() {
        let path = PathBuilder::new()
            .move_to(0.0, 0.0)
            .line_to(100.0, 100.0)
            .close()
            .build();

        assert!(path.contains("M0.00,0.00"));
        assert!(path.contains("L100.00,100.00"));
        assert!(path.contains("Z"));
    }

    #[test]
    fn test_sector_path_shapes() {
        let wedge = sector_path(0.0, 0.0, 0.0, 10.0, 0.0, 1.0);
        assert!(wedge.starts_with("M10.00,0.00"));
        assert!(wedge.contains("L0.00,0.00"));

        let ring = sector_path(0.0, 0.0, 5.0, 10.0, 0.0, std::f64::consts::TAU);
        assert_eq!(ring.matches('M').count(), 2);
    }

    #[test]
    fn test_format_large_number() {
        assert_eq!(format_large_number(1_500_000.0), "1.50M");
        assert_eq!(format_large_number(2_500.0), "2.50K");
        assert_eq!(format_tick(2_500.0), "2500");
        assert_eq!(format_value(12.346), "12.35");
    }
}
