//! Error taxonomy shared by the data model and the renderers.

use thiserror::Error;

/// Errors raised by table construction, column lookups and strict validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    /// Malformed construction input or an unusable option value
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A referenced column does not exist
    #[error("column not found: '{column}'")]
    NotFound { column: String },

    /// Invalid cells found while validating under the strict policy
    #[error(
        "data quality error: {invalid_rows} of {total_rows} row(s) invalid ({})",
        describe_counts(.columns)
    )]
    DataQuality {
        invalid_rows: usize,
        total_rows: usize,
        /// Offending columns with their invalid-cell counts, in check order
        columns: Vec<(String, usize)>,
    },
}

/// Result alias used across the workspace
pub type ChartResult<T> = Result<T, ChartError>;

impl ChartError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn not_found(column: impl Into<String>) -> Self {
        Self::NotFound {
            column: column.into(),
        }
    }

    pub fn is_data_quality(&self) -> bool {
        matches!(self, Self::DataQuality { .. })
    }
}

/// "value: 2, weight: 1"
pub fn describe_counts(columns: &[(String, usize)]) -> String {
    columns
        .iter()
        .map(|(name, count)| format!("{name}: {count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_quality_message_names_columns() {
        let err = ChartError::DataQuality {
            invalid_rows: 2,
            total_rows: 5,
            columns: vec![("value".into(), 2), ("weight".into(), 1)],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 of 5"));
        assert!(msg.contains("value: 2"));
        assert!(msg.contains("weight: 1"));
        assert!(err.is_data_quality());
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            ChartError::not_found("price").to_string(),
            "column not found: 'price'"
        );
    }
}
