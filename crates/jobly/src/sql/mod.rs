//! Parameterized SQL assembly.
//!
//! - [`query()`] runs a hand-written statement that already uses `$1, $2, ...`.
//! - [`build_set_fragment`] and [`build_filter_fragment`] produce variable-length `SET` and
//!   `WHERE` bodies whose placeholders line up with the returned bind values.
//!
//! Values never appear in SQL text. Column names only come from code-controlled tables and
//! are checked with [`check_column`](crate::ident::check_column) before use.
//!
//! # Example
//!
//! ```ignore
//! use jobly::sql::{ColumnMap, Param, build_set_fragment};
//!
//! let set = build_set_fragment(
//!     [("salary", Param::new(110_000_i32)), ("companyHandle", Param::new("acme"))],
//!     ColumnMap::new(&[("companyHandle", "company_handle")]),
//! )?;
//! assert_eq!(set.clause(), "salary = $1, company_handle = $2");
//! assert_eq!(set.next_placeholder(), 3);
//! ```

mod fragment;
mod param;
mod query;


pub use fragment::{
    ColumnMap, FilterSpec, Fragment, FragmentBuilder, build_filter_fragment, build_set_fragment,
};
pub use param::{Param, params_ref};
pub use query::Query;

/// Build a query from a pre-numbered SQL string (`$1, $2, ...`).
pub fn query(sql: impl Into<String>) -> Query {
    Query::new(sql)
}

/// Wrap `input` as a `%...%` substring pattern for `LIKE`/`ILIKE`.
///
/// `\`, `%` and `_` in the input are escaped so they match literally.
pub fn contains_pattern(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 2);
    out.push('%');
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}
