//! Column-name checks for dynamically assembled SQL.
//!
//! Postgres cannot bind identifiers as parameters, so any column name that ends up in a
//! generated fragment must be a plain identifier: one or more dot-separated segments, each
//! matching `[A-Za-z_][A-Za-z0-9_$]*`. Quoted identifiers are not accepted here.

use crate::error::{JoblyError, JoblyResult};

/// Validate a (possibly dotted) unquoted column name.
pub fn check_column(name: &str) -> JoblyResult<()> {
    if name.is_empty() {
        return Err(JoblyError::invalid_argument("Column name cannot be empty"));
    }

    for segment in name.split('.') {
        let mut chars = segment.chars();
        let Some(first) = chars.next() else {
            return Err(JoblyError::invalid_argument(format!(
                "Empty identifier segment in column name '{name}'"
            )));
        };
        if !(first == '_' || first.is_ascii_alphabetic()) {
            return Err(JoblyError::invalid_argument(format!(
                "Invalid identifier start character '{first}' in column name '{name}'"
            )));
        }
        if let Some(bad) = chars.find(|c| !(*c == '_' || *c == '$' || c.is_ascii_alphanumeric())) {
            return Err(JoblyError::invalid_argument(format!(
                "Invalid character '{bad}' in column name '{name}'"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_and_dotted() {
        assert!(check_column("salary").is_ok());
        assert!(check_column("jobs.company_handle").is_ok());
        assert!(check_column("my_var$1").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert!(check_column("").is_err());
    }

    #[test]
    fn rejects_start_digit() {
        assert!(check_column("1salary").is_err());
    }

    #[test]
    fn rejects_injection_attempts() {
        assert!(check_column("title = 'x'; DROP TABLE jobs; --").is_err());
        assert!(check_column("title name").is_err());
        assert!(check_column(r#""title""#).is_err());
    }

    #[test]
    fn rejects_bad_dots() {
        assert!(check_column("jobs..title").is_err());
        assert!(check_column("jobs.").is_err());
        assert!(check_column(".title").is_err());
    }
}
