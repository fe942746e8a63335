//! In-memory tabular data model
//!
//! A [`Table`] is an ordered list of named columns plus an ordered list of
//! rows. Rows are insertion-ordered maps from column name to [`Value`].
//! Every derivation (`filter`, `select`, `sort`, `group`, `pivot`, ...)
//! returns a new table; the receiver is left untouched. The only mutating
//! operations carry an `_in_place` suffix.

use crate::{ChartError, ChartResult, GroupKey, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

static NULL: Value = Value::Null;

/// One row: column name to cell value, in column order
pub type Record = IndexMap<String, Value>;

/// Build a [`Record`] from `(name, value)` pairs
pub fn record<K, V, I>(pairs: I) -> Record
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

// ============================================================================
// OPERATORS
// ============================================================================

/// Comparison operator for [`Table::filter_by`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl FilterOp {
    /// Parse `>`, `<`, `>=`, `<=`, `==`, `!=`
    pub fn parse(op: &str) -> Option<Self> {
        match op.trim() {
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            ">=" => Some(Self::Ge),
            "<=" => Some(Self::Le),
            "==" | "===" => Some(Self::Eq),
            "!=" | "!==" => Some(Self::Ne),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }

    pub fn matches(&self, cell: &Value, target: &Value) -> bool {
        match self {
            Self::Eq => cell.loose_eq(target),
            Self::Ne => !cell.loose_eq(target),
            Self::Gt => cell.loose_cmp(target) == Some(Ordering::Greater),
            Self::Lt => cell.loose_cmp(target) == Some(Ordering::Less),
            Self::Ge => matches!(
                cell.loose_cmp(target),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::Le => matches!(
                cell.loose_cmp(target),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

/// Sort direction for [`Table::sort`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl FromStr for SortOrder {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(ChartError::configuration(format!(
                "unknown sort order '{other}'"
            ))),
        }
    }
}

/// Reduction applied by [`Table::pivot`] and [`Table::aggregate`].
///
/// Every aggregate of an empty set is `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    #[default]
    Sum,
    #[serde(alias = "avg", alias = "average")]
    Mean,
    Count,
    Min,
    Max,
}

impl Aggregate {
    pub fn apply(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            Self::Sum => values.iter().sum(),
            Self::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Self::Count => values.len() as f64,
            Self::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Count includes every present cell; the others need numeric cells
    fn collect(&self, cell: &Value, into: &mut Vec<f64>) {
        match self {
            Self::Count if !cell.is_null() => into.push(1.0),
            Self::Count => {}
            _ => {
                if let Some(n) = cell.to_number() {
                    into.push(n);
                }
            }
        }
    }
}

impl FromStr for Aggregate {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "mean" | "avg" | "average" => Ok(Self::Mean),
            "count" => Ok(Self::Count),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            other => Err(ChartError::configuration(format!(
                "unknown aggregate '{other}'"
            ))),
        }
    }
}

// ============================================================================
// TABLE
// ============================================================================

/// Ordered rows with named, ordered columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    /// Empty table with the given header
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        let mut header: Vec<String> = Vec::new();
        for name in columns {
            let name = name.into();
            if !header.contains(&name) {
                header.push(name);
            }
        }
        Self {
            columns: header,
            rows: Vec::new(),
        }
    }

    /// Build from uniform records; the header is the first record's keys
    pub fn from_records(records: Vec<Record>) -> Self {
        let columns = records
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        Self {
            columns,
            rows: records,
        }
    }

    /// Build from positional rows. A column list is required.
    ///
    /// Short rows leave trailing cells absent; extra values are ignored.
    pub fn from_rows<S: Into<String>>(
        rows: Vec<Vec<Value>>,
        columns: Option<Vec<S>>,
    ) -> ChartResult<Self> {
        let Some(columns) = columns else {
            return Err(ChartError::configuration(
                "positional rows require a column list",
            ));
        };
        let mut table = Self::new(columns);
        table.rows = rows
            .into_iter()
            .map(|values| {
                table
                    .columns
                    .iter()
                    .cloned()
                    .zip(values)
                    .collect::<Record>()
            })
            .collect();
        Ok(table)
    }

    /// Build from JSON: an array of objects, or an array of arrays plus
    /// a column list
    pub fn from_json(json: &serde_json::Value, columns: Option<Vec<String>>) -> ChartResult<Self> {
        let items = json
            .as_array()
            .ok_or_else(|| ChartError::configuration("table JSON must be an array"))?;

        if items.iter().all(|item| item.is_object()) {
            let records = items
                .iter()
                .filter_map(|item| item.as_object())
                .map(|obj| {
                    obj.iter()
                        .map(|(k, v)| (k.clone(), Value::from(v)))
                        .collect::<Record>()
                })
                .collect();
            let mut table = Self::from_records(records);
            if let Some(columns) = columns {
                table.columns = columns;
            }
            return Ok(table);
        }

        let rows = items
            .iter()
            .map(|item| {
                item.as_array()
                    .map(|cells| cells.iter().map(Value::from).collect::<Vec<_>>())
                    .ok_or_else(|| {
                        ChartError::configuration("rows must all be objects or all be arrays")
                    })
            })
            .collect::<ChartResult<Vec<_>>>()?;
        Self::from_rows(rows, columns)
    }

    /// Parse a JSON document and build a table from it
    pub fn from_json_str(json: &str, columns: Option<Vec<String>>) -> ChartResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ChartError::configuration(format!("invalid table JSON: {e}")))?;
        Self::from_json(&value, columns)
    }

    /// New table sharing this header
    fn derive(&self, rows: Vec<Record>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Column names in order (copy)
    pub fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    /// Column names in order (borrowed)
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Rows in order (copy)
    pub fn rows(&self) -> Vec<Record> {
        self.rows.clone()
    }

    /// Rows in order (borrowed)
    pub fn records(&self) -> &[Record] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Record> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Cell values of one column in row order; absent cells are `Null`
    pub fn column(&self, name: &str) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| row.get(name).cloned().unwrap_or_default())
            .collect()
    }

    /// Cell at (row, column), `Null` when absent
    pub fn cell(&self, row: usize, column: &str) -> &Value {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL)
    }

    /// Distinct values of a column in first-occurrence order
    pub fn unique(&self, column: &str) -> Vec<Value> {
        let mut seen: IndexMap<GroupKey, ()> = IndexMap::new();
        for row in &self.rows {
            let cell = row.get(column).cloned().unwrap_or_default();
            seen.entry(GroupKey::new(cell)).or_insert(());
        }
        seen.into_keys().map(GroupKey::into_value).collect()
    }

    /// Scalar reduction of one column
    pub fn aggregate(&self, column: &str, agg: Aggregate) -> f64 {
        let mut values = Vec::new();
        for row in &self.rows {
            if let Some(cell) = row.get(column) {
                agg.collect(cell, &mut values);
            }
        }
        agg.apply(&values)
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Self {
        self.derive(self.rows.iter().take(n).cloned().collect())
    }

    // ========================================================================
    // Row selection
    // ========================================================================

    /// Rows for which `predicate` holds
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Record) -> bool,
    {
        self.derive(self.rows.iter().filter(|r| predicate(r)).cloned().collect())
    }

    /// Rows whose `column` cell compares against `value` with `op`.
    ///
    /// An unrecognized operator keeps every row.
    pub fn filter_by(&self, column: &str, op: &str, value: impl Into<Value>) -> Self {
        match FilterOp::parse(op) {
            Some(op) => self.filter_op(column, op, value),
            None => {
                tracing::debug!("Unknown filter operator '{}', keeping all rows", op);
                self.clone()
            }
        }
    }

    /// Typed form of [`Table::filter_by`]
    pub fn filter_op(&self, column: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        let target = value.into();
        self.filter(|row| {
            let cell = row.get(column).unwrap_or(&NULL);
            op.matches(cell, &target)
        })
    }

    /// Stable sort by one column.
    ///
    /// Two numbers compare numerically; any other pair compares as
    /// lower-cased text. Missing cells (null, NaN, absent) go last in either
    /// direction. Ties keep their original relative order.
    pub fn sort(&self, column: &str, order: SortOrder) -> Self {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| {
            let a = a.get(column).unwrap_or(&NULL);
            let b = b.get(column).unwrap_or(&NULL);
            match (a.is_missing(), b.is_missing()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let ord = compare_for_sort(a, b);
                    match order {
                        SortOrder::Ascending => ord,
                        SortOrder::Descending => ord.reverse(),
                    }
                }
            }
        });
        self.derive(rows)
    }

    // ========================================================================
    // Column selection
    // ========================================================================

    /// Only the given columns that exist here, in the given order
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Self {
        let mut keep: Vec<String> = Vec::new();
        for name in columns {
            let name = name.as_ref();
            if self.has_column(name) && !keep.iter().any(|k| k == name) {
                keep.push(name.to_string());
            }
        }
        let rows = self
            .rows
            .iter()
            .map(|row| {
                keep.iter()
                    .filter_map(|k| row.get(k).map(|v| (k.clone(), v.clone())))
                    .collect()
            })
            .collect();
        Self {
            columns: keep,
            rows,
        }
    }

    /// Every column except the given ones
    pub fn drop<S: AsRef<str>>(&self, columns: &[S]) -> Self {
        let excluded = |name: &str| columns.iter().any(|c| c.as_ref() == name);
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .filter(|(k, _)| !excluded(k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .collect();
        Self {
            columns: self
                .columns
                .iter()
                .filter(|c| !excluded(c))
                .cloned()
                .collect(),
            rows,
        }
    }

    // ========================================================================
    // Column rewriting
    // ========================================================================

    /// Copy with `f` applied to every present cell of `column`
    pub fn transform<F>(&self, column: &str, f: F) -> Self
    where
        F: Fn(&Value) -> Value,
    {
        let mut out = self.clone();
        out.transform_in_place(column, f);
        out
    }

    /// Apply `f` to every present cell of `column`, mutating this table
    pub fn transform_in_place<F>(&mut self, column: &str, f: F) -> &mut Self
    where
        F: Fn(&Value) -> Value,
    {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(column) {
                *cell = f(cell);
            }
        }
        self
    }

    /// Copy with column `old` renamed to `new`
    pub fn rename(&self, old: &str, new: &str) -> ChartResult<Self> {
        let mut out = self.clone();
        out.rename_in_place(old, new)?;
        Ok(out)
    }

    /// Rename a column header and every row key, mutating this table
    pub fn rename_in_place(&mut self, old: &str, new: &str) -> ChartResult<&mut Self> {
        let position = self
            .columns
            .iter()
            .position(|c| c == old)
            .ok_or_else(|| ChartError::not_found(old))?;
        if old == new {
            return Ok(self);
        }
        if self.has_column(new) {
            return Err(ChartError::configuration(format!(
                "cannot rename '{old}' to '{new}': column already exists"
            )));
        }

        self.columns[position] = new.to_string();
        for row in &mut self.rows {
            if let Some((index, _, value)) = row.shift_remove_full(old) {
                row.shift_insert(index, new.to_string(), value);
            }
        }
        Ok(self)
    }

    // ========================================================================
    // Grouping
    // ========================================================================

    /// Rows bucketed by the value of `column`, buckets in first-occurrence
    /// order and rows in original order within each bucket
    pub fn group_by(&self, column: &str) -> IndexMap<GroupKey, Vec<Record>> {
        let mut groups: IndexMap<GroupKey, Vec<Record>> = IndexMap::new();
        for row in &self.rows {
            let key = GroupKey::new(row.get(column).cloned().unwrap_or_default());
            groups.entry(key).or_default().push(row.clone());
        }
        groups
    }

    /// One row per group: `{ column: key, ..aggregate(rows) }`
    pub fn group<F>(&self, column: &str, aggregate: F) -> Self
    where
        F: Fn(&[Record]) -> Record,
    {
        let rows: Vec<Record> = self
            .group_by(column)
            .into_iter()
            .map(|(key, members)| {
                let mut row = Record::new();
                row.insert(column.to_string(), key.into_value());
                for (name, value) in aggregate(&members) {
                    if name != column {
                        row.insert(name, value);
                    }
                }
                row
            })
            .collect();

        if rows.is_empty() {
            return Self::new([column]);
        }
        Self::from_records(rows)
    }

    /// Cross-tabulate: one row per distinct `index` value, one column per
    /// distinct `columns` value (sorted ascending), cells aggregated from
    /// `values`. Combinations with no rows are `0`. A column key whose
    /// name is already taken gets a `_2`, `_3`, ... suffix.
    pub fn pivot(&self, index: &str, columns: &str, values: &str, agg: Aggregate) -> Self {
        let mut row_keys: IndexMap<GroupKey, ()> = IndexMap::new();
        let mut col_keys: IndexMap<GroupKey, ()> = IndexMap::new();
        let mut cells: IndexMap<(GroupKey, GroupKey), Vec<f64>> = IndexMap::new();

        for row in &self.rows {
            let rk = GroupKey::new(row.get(index).cloned().unwrap_or_default());
            let ck = GroupKey::new(row.get(columns).cloned().unwrap_or_default());
            row_keys.entry(rk.clone()).or_insert(());
            col_keys.entry(ck.clone()).or_insert(());

            let bucket = cells.entry((rk, ck)).or_default();
            if let Some(cell) = row.get(values) {
                agg.collect(cell, bucket);
            }
        }

        let mut col_order: Vec<GroupKey> = col_keys.into_keys().collect();
        col_order.sort_by(|a, b| compare_pivot_keys(a.value(), b.value()));

        let mut header = vec![index.to_string()];
        for key in &col_order {
            let name = unique_column_name(&header, key.to_string());
            header.push(name);
        }

        let rows = row_keys
            .into_keys()
            .map(|rk| {
                let mut out = Record::new();
                out.insert(index.to_string(), rk.value().clone());
                for (ck, name) in col_order.iter().zip(&header[1..]) {
                    let total = cells
                        .get(&(rk.clone(), ck.clone()))
                        .map_or(0.0, |bucket| agg.apply(bucket));
                    out.insert(name.clone(), Value::Number(total));
                }
                out
            })
            .collect();

        Self {
            columns: header,
            rows,
        }
    }
}

/// `base`, or `base_2`, `base_3`, ... when already taken
fn unique_column_name(taken: &[String], base: String) -> String {
    if !taken.contains(&base) {
        return base;
    }
    let name = (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_default();
    tracing::debug!(column = %base, renamed = %name, "Pivot column name already taken");
    name
}

fn compare_for_sort(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        _ => a
            .to_string()
            .to_lowercase()
            .cmp(&b.to_string().to_lowercase()),
    }
}

fn compare_pivot_keys(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

impl From<Vec<Record>> for Table {
    fn from(records: Vec<Record>) -> Self {
        Self::from_records(records)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| {
                self.rows
                    .iter()
                    .map(|r| r.get(c).map_or(0, |v| v.to_string().chars().count()))
                    .fold(c.chars().count(), usize::max)
            })
            .collect();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect();
        writeln!(f, "{}", header.join(" | ").trim_end())?;

        for row in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(c, w)| {
                    let text = row.get(c).map(|v| v.to_string()).unwrap_or_default();
                    format!("{:<w$}", text, w = *w)
                })
                .collect();
            writeln!(f, "{}", cells.join(" | ").trim_end())?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
