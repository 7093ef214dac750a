//! Hand-written SQL with positional parameters.

use super::param::{Param, params_ref};
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::row::FromRow;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A statement whose SQL already contains `$1, $2, ...`, plus the values bound to them.
///
/// # Example
///
/// ```ignore
/// use jobly::sql::query;
///
/// let job: Option<Job> = query("SELECT * FROM jobs WHERE id = $1")
///     .tag("jobs.get")
///     .bind(id)
///     .fetch_opt_as(&conn)
///     .await?;
/// ```
#[derive(Debug)]
#[must_use]
pub struct Query {
    sql: String,
    params: Vec<Param>,
    tag: Option<String>,
}

impl Query {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            tag: None,
        }
    }

    /// Associate a tag for logging.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Bind the next positional parameter.
    pub fn bind<T: ToSql + Sync + Send + 'static>(mut self, value: T) -> Self {
        self.params.push(Param::new(value));
        self
    }

    /// Bind already-wrapped values, in order, after any bound so far.
    pub fn bind_all(mut self, values: impl IntoIterator<Item = Param>) -> Self {
        self.params.extend(values);
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    fn tag_or_default(&self) -> &str {
        self.tag.as_deref().unwrap_or("-")
    }

    /// Execute the query and return all rows
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> JoblyResult<Vec<Row>> {
        let params = params_ref(&self.params);
        conn.query_tagged(self.tag_or_default(), &self.sql, &params)
            .await
    }

    /// Execute the query and return all rows mapped to type T
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the query and return the first row, or [`JoblyError::NotFound`] if there is none
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<T> {
        let row = self
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found("Expected one row, got none"))?;
        T::from_row(&row)
    }

    /// Execute the query and return at most one row
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> JoblyResult<Option<Row>> {
        let params = params_ref(&self.params);
        conn.query_opt_tagged(self.tag_or_default(), &self.sql, &params)
            .await
    }

    /// Execute the query and return at most one row mapped to type T
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> JoblyResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the query and return the number of affected rows
    pub async fn execute(&self, conn: &impl GenericClient) -> JoblyResult<u64> {
        let params = params_ref(&self.params);
        conn.execute_tagged(self.tag_or_default(), &self.sql, &params)
            .await
    }
}
