//! NaN-policy validation of numeric columns

use indexmap::IndexMap;
use parking_lot::{RwLock, const_rwlock};
use serde::{Deserialize, Serialize};
use tabula_core::{ChartError, ChartResult, Table, Value};

/// How invalid numeric cells are reported before rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NanPolicy {
    /// Log a summary and continue
    #[default]
    Warn,
    /// Continue without output
    Silent,
    /// Fail with a data-quality error
    Strict,
}

impl NanPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NanPolicy::Warn => "warn",
            NanPolicy::Silent => "silent",
            NanPolicy::Strict => "strict",
        }
    }
}

impl std::str::FromStr for NanPolicy {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(NanPolicy::Warn),
            "silent" => Ok(NanPolicy::Silent),
            "strict" => Ok(NanPolicy::Strict),
            other => Err(ChartError::configuration(format!("unknown NaN policy '{other}'"))),
        }
    }
}

// ============================================================================
// PROCESS DEFAULT
// ============================================================================

static DEFAULT_POLICY: RwLock<Option<NanPolicy>> = const_rwlock(None);

/// Set the process-wide policy used when a chart call does not pick one
pub fn set_default_nan_policy(policy: NanPolicy) {
    *DEFAULT_POLICY.write() = Some(policy);
    tracing::debug!(policy = policy.as_str(), "Default NaN policy set");
}

/// Forget the process-wide policy; chart types fall back to their own default
pub fn clear_default_nan_policy() {
    *DEFAULT_POLICY.write() = None;
}

pub fn default_nan_policy() -> Option<NanPolicy> {
    *DEFAULT_POLICY.read()
}

/// Effective policy: call override, then process default, then the chart
/// type's own default
pub fn resolve_policy(call: Option<NanPolicy>, chart_default: NanPolicy) -> NanPolicy {
    resolve_policy_with(call, default_nan_policy(), chart_default)
}

pub fn resolve_policy_with(
    call: Option<NanPolicy>,
    process: Option<NanPolicy>,
    chart_default: NanPolicy,
) -> NanPolicy {
    call.or(process).unwrap_or(chart_default)
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Outcome of checking columns for invalid numeric cells
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub has_invalid: bool,
    /// Rows with at least one invalid checked cell
    pub invalid_rows: usize,
    pub invalid_row_indices: Vec<usize>,
    /// Invalid cell count per checked column, in check order
    pub column_counts: IndexMap<String, usize>,
    pub total_rows: usize,
    pub policy: NanPolicy,
}

impl ValidationReport {
    pub fn is_row_invalid(&self, row: usize) -> bool {
        self.invalid_row_indices.binary_search(&row).is_ok()
    }

    pub fn invalid_count(&self, column: &str) -> usize {
        self.column_counts.get(column).copied().unwrap_or(0)
    }

    /// Columns with at least one invalid cell, with their counts
    pub fn offending_columns(&self) -> Vec<(String, usize)> {
        self.column_counts
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(c, n)| (c.clone(), *n))
            .collect()
    }

    pub fn to_error(&self) -> ChartError {
        ChartError::DataQuality {
            invalid_rows: self.invalid_rows,
            total_rows: self.total_rows,
            columns: self.offending_columns(),
        }
    }
}

/// A cell that cannot be used as a number: null, blank, NaN, or text that
/// fails numeric coercion
pub fn is_invalid_cell(value: &Value) -> bool {
    value.to_number().is_none()
}

/// Check `columns` of `table` under `policy`.
///
/// `Strict` turns any invalid cell into [`ChartError::DataQuality`]; `Warn`
/// logs a summary; `Silent` only reports.
pub fn validate<S: AsRef<str>>(
    table: &Table,
    columns: &[S],
    policy: NanPolicy,
) -> ChartResult<ValidationReport> {
    let mut column_counts: IndexMap<String, usize> = columns
        .iter()
        .map(|c| (c.as_ref().to_string(), 0))
        .collect();
    let mut invalid_row_indices = Vec::new();

    for (i, row) in table.records().iter().enumerate() {
        let mut row_invalid = false;
        for (column, count) in column_counts.iter_mut() {
            let invalid = row.get(column).is_none_or(is_invalid_cell);
            if invalid {
                *count += 1;
                row_invalid = true;
            }
        }
        if row_invalid {
            invalid_row_indices.push(i);
        }
    }

    let report = ValidationReport {
        has_invalid: !invalid_row_indices.is_empty(),
        invalid_rows: invalid_row_indices.len(),
        invalid_row_indices,
        column_counts,
        total_rows: table.len(),
        policy,
    };

    if report.has_invalid {
        match policy {
            NanPolicy::Strict => return Err(report.to_error()),
            NanPolicy::Warn => tracing::warn!(
                invalid_rows = report.invalid_rows,
                total_rows = report.total_rows,
                columns = %tabula_core::describe_counts(&report.offending_columns()),
                "Invalid numeric values found"
            ),
            NanPolicy::Silent => {}
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::record;

    fn table() -> Table {
        Table::from_records(vec![
            record([("name", Value::from("a")), ("v", Value::from(10.0))]),
            record([("name", Value::from("b")), ("v", Value::from(f64::NAN))]),
            record([("name", Value::from("c")), ("v", Value::from("30"))]),
            record([("name", Value::from("d")), ("v", Value::from(""))]),
        ])
    }

    #[test]
    fn test_invalid_cells() {
        assert!(is_invalid_cell(&Value::Null));
        assert!(is_invalid_cell(&Value::from("")));
        assert!(is_invalid_cell(&Value::from("abc")));
        assert!(is_invalid_cell(&Value::from(f64::NAN)));
        assert!(!is_invalid_cell(&Value::from("12.5")));
        assert!(!is_invalid_cell(&Value::from(0.0)));
    }

    #[test]
    fn test_warn_reports_and_continues() {
        let report = validate(&table(), &["v"], NanPolicy::Warn).unwrap();
        assert!(report.has_invalid);
        assert_eq!(report.invalid_rows, 2);
        assert_eq!(report.invalid_row_indices, vec![1, 3]);
        assert_eq!(report.invalid_count("v"), 2);
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.policy, NanPolicy::Warn);
        assert!(report.is_row_invalid(3));
        assert!(!report.is_row_invalid(2));
    }

    #[test]
    fn test_strict_fails_with_counts() {
        let err = validate(&table(), &["v"], NanPolicy::Strict).unwrap_err();
        assert_eq!(
            err,
            ChartError::DataQuality {
                invalid_rows: 2,
                total_rows: 4,
                columns: vec![("v".to_string(), 2)],
            }
        );
    }

    #[test]
    fn test_strict_passes_clean_data() {
        let report = validate(&table().head(1), &["v"], NanPolicy::Strict).unwrap();
        assert!(!report.has_invalid);
        assert_eq!(report.invalid_rows, 0);
    }

    #[test]
    fn test_missing_column_counts_every_row() {
        let report = validate(&table(), &["nope"], NanPolicy::Silent).unwrap();
        assert_eq!(report.invalid_count("nope"), 4);
    }

    #[test]
    fn test_policy_resolution_order() {
        use NanPolicy::*;
        assert_eq!(resolve_policy_with(Some(Silent), Some(Strict), Warn), Silent);
        assert_eq!(resolve_policy_with(None, Some(Silent), Strict), Silent);
        assert_eq!(resolve_policy_with(None, None, Strict), Strict);
        assert_eq!("STRICT".parse::<NanPolicy>().unwrap(), Strict);
        assert!("loud".parse::<NanPolicy>().is_err());
    }

    #[test]
    fn test_policy_serde_lowercase() {
        let p: NanPolicy = serde_json::from_str("\"silent\"").unwrap();
        assert_eq!(p, NanPolicy::Silent);
    }
}
