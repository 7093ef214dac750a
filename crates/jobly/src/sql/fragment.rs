use super::param::Param;
use crate::error::{JoblyError, JoblyResult};
use crate::ident::check_column;
use std::collections::HashSet;

/// Static external-name → column-name table.
///
/// Only names that differ need an entry; anything not listed passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnMap<'a> {
    entries: &'a [(&'a str, &'a str)],
}

impl<'a> ColumnMap<'a> {
    /// A table with no translations.
    pub const EMPTY: ColumnMap<'static> = ColumnMap { entries: &[] };

    pub const fn new(entries: &'a [(&'a str, &'a str)]) -> Self {
        Self { entries }
    }

    /// Resolve the column for an external field name.
    pub fn column_for<'s>(&'s self, field: &'s str) -> &'s str {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map_or(field, |(_, column)| *column)
    }
}

/// A piece of SQL with `$n` placeholders and the values bound to them, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Fragment<V> {
    clause: String,
    values: Vec<V>,
    offset: usize,
}

impl<V> Fragment<V> {
    /// A fragment with no clauses and no values.
    pub fn empty() -> Self {
        Self {
            clause: String::new(),
            values: Vec::new(),
            offset: 0,
        }
    }

    /// The joined clause text, e.g. `salary = $1, equity = $2`.
    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn into_values(self) -> Vec<V> {
        self.values
    }

    /// `true` when no clause was emitted; callers must then omit `WHERE` / refuse `SET`.
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// Placeholder index for the next value appended after this fragment's values.
    pub fn next_placeholder(&self) -> usize {
        self.offset + self.values.len() + 1
    }

    /// Append ` WHERE <clause>` to `sql`, or nothing when the fragment is empty.
    pub fn write_where(&self, sql: &mut String) {
        if !self.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.clause);
        }
    }
}

/// Accumulates clauses and bind values, numbering placeholders in emission order.
#[derive(Debug)]
pub struct FragmentBuilder<V> {
    separator: &'static str,
    clauses: Vec<String>,
    values: Vec<V>,
    offset: usize,
}

impl<V> FragmentBuilder<V> {
    pub fn new(separator: &'static str) -> Self {
        Self {
            separator,
            clauses: Vec::new(),
            values: Vec::new(),
            offset: 0,
        }
    }

    /// Builder for a `SET` list (`", "`-joined assignments).
    pub fn assignments() -> Self {
        Self::new(", ")
    }

    /// Builder for a `WHERE` body (`" AND "`-joined predicates).
    pub fn predicates() -> Self {
        Self::new(" AND ")
    }

    /// Number placeholders after `already_bound` values the statement binds first.
    pub fn starting_after(mut self, already_bound: usize) -> Self {
        self.offset = already_bound;
        self
    }

    /// Emit `<column> <op> $n` and bind `value` to `$n`.
    ///
    /// `column` is written verbatim and must come from code, not from request input.
    pub fn bind(&mut self, column: &str, op: &str, value: V) -> &mut Self {
        self.values.push(value);
        let n = self.offset + self.values.len();
        self.clauses.push(format!("{column} {op} ${n}"));
        self
    }

    /// Emit a predicate that binds nothing, e.g. `equity > 0`.
    pub fn literal(&mut self, clause: impl Into<String>) -> &mut Self {
        self.clauses.push(clause.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn finish(self) -> Fragment<V> {
        Fragment {
            clause: self.clauses.join(self.separator),
            values: self.values,
            offset: self.offset,
        }
    }
}

/// Build the body of a `SET` clause from an ordered field → value sequence.
///
/// Assignments are emitted in iteration order; `$i` is bound to the i-th value. Field
/// names are translated through `columns` and must resolve to plain identifiers.
///
/// # Errors
///
/// [`JoblyError::InvalidArgument`] when `data` is empty, when two fields resolve to the same
/// column, or when a resolved column is not a valid identifier.
pub fn build_set_fragment<K, V, I>(data: I, columns: ColumnMap<'_>) -> JoblyResult<Fragment<V>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
{
    let mut builder = FragmentBuilder::assignments();
    let mut assigned = HashSet::new();

    for (field, value) in data {
        let column = columns.column_for(field.as_ref());
        check_column(column)?;
        if !assigned.insert(column.to_string()) {
            return Err(JoblyError::invalid_argument(format!(
                "column '{column}' assigned more than once"
            )));
        }
        builder.bind(column, "=", value);
    }

    if builder.is_empty() {
        return Err(JoblyError::invalid_argument("No data"));
    }
    Ok(builder.finish())
}

/// A filter object that knows which of its keys map to predicates.
///
/// Implementations emit predicates in a fixed, documented key order and skip keys that are
/// absent.
pub trait FilterSpec {
    fn write_predicates(&self, builder: &mut FragmentBuilder<Param>);
}

/// Build a `WHERE` body from an optional filter.
///
/// `None`, or a filter with no recognized keys set, yields an empty fragment.
pub fn build_filter_fragment<F: FilterSpec + ?Sized>(filter: Option<&F>) -> Fragment<Param> {
    let mut builder = FragmentBuilder::predicates();
    if let Some(filter) = filter {
        filter.write_predicates(&mut builder);
    }
    builder.finish()
}
