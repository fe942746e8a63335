//! Scalar cell values

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single table cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Null, empty text or a NaN number
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Number(n) => n.is_nan(),
            Self::Text(s) => s.trim().is_empty(),
            Self::Bool(_) => false,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Loose numeric coercion.
    ///
    /// Numbers pass through, booleans become 1/0, text is trimmed and parsed.
    /// Null, empty text, NaN and unparseable text yield `None`.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Number(n) if n.is_nan() => None,
            Self::Number(n) => Some(*n),
            Self::Text(s) => parse_number(s),
        }
    }

    /// Comparison used by filter operators: numeric when both sides coerce
    /// to numbers, otherwise by displayed text. Null never orders.
    pub fn loose_cmp(&self, other: &Value) -> Option<Ordering> {
        if self.is_null() || other.is_null() {
            return None;
        }
        match (self.to_number(), other.to_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => Some(self.to_string().cmp(&other.to_string())),
        }
    }

    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Null, _) | (_, Self::Null) => false,
            _ => self.loose_cmp(other) == Some(Ordering::Equal),
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Rust accepts "nan"/"inf" spellings that loose numeric coercion does not
    if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return match trimmed {
            "Infinity" | "+Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        };
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Display form of a number: integers without a fractional part
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else if n.is_nan() {
        "NaN".to_string()
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

// ============================================================================
// GROUP KEY
// ============================================================================

/// Hashable wrapper used to bucket rows by cell value.
///
/// Numbers hash by bit pattern with `-0.0` folded into `0.0` and every NaN
/// folded into one key.
#[derive(Debug, Clone)]
pub struct GroupKey(Value);

impl GroupKey {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    fn number_bits(n: f64) -> u64 {
        if n.is_nan() {
            f64::NAN.to_bits()
        } else if n == 0.0 {
            0.0_f64.to_bits()
        } else {
            n.to_bits()
        }
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Value::Number(a), Value::Number(b)) => Self::number_bits(*a) == Self::number_bits(*b),
            (a, b) => a == b,
        }
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Number(n) => Self::number_bits(*n).hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::from(3.5).to_number(), Some(3.5));
        assert_eq!(Value::from(" 42 ").to_number(), Some(42.0));
        assert_eq!(Value::from(true).to_number(), Some(1.0));
        assert_eq!(Value::from("1e3").to_number(), Some(1000.0));
        assert_eq!(Value::from("abc").to_number(), None);
        assert_eq!(Value::from("nan").to_number(), None);
        assert_eq!(Value::from("").to_number(), None);
        assert_eq!(Value::Null.to_number(), None);
        assert_eq!(Value::from(f64::NAN).to_number(), None);
    }

    #[test]
    fn test_display_drops_integer_fraction() {
        assert_eq!(Value::from(30.0).to_string(), "30");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn test_loose_comparisons() {
        assert_eq!(
            Value::from("10").loose_cmp(&Value::from(9.0)),
            Some(Ordering::Greater)
        );
        assert!(Value::from("b").loose_cmp(&Value::from("a")) == Some(Ordering::Greater));
        assert!(Value::Null.loose_cmp(&Value::from(1.0)).is_none());
        assert!(Value::from(5.0).loose_eq(&Value::from("5")));
        assert!(Value::Null.loose_eq(&Value::Null));
    }

    #[test]
    fn test_group_key_folds_signed_zero() {
        use std::collections::HashSet;
        let mut keys = HashSet::new();
        keys.insert(GroupKey::new(Value::from(0.0)));
        keys.insert(GroupKey::new(Value::from(-0.0)));
        keys.insert(GroupKey::new(Value::from("0")));
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!([1.5, "x", null, true]);
        let values: Vec<Value> = json
            .as_array()
            .map(|a| a.iter().map(Value::from).collect())
            .unwrap_or_default();
        assert_eq!(
            values,
            vec![Value::from(1.5), Value::from("x"), Value::Null, Value::from(true)]
        );
    }
}
