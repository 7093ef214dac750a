//! `tracing` instrumentation for store calls.
//!
//! [`TracedClient`] wraps any [`GenericClient`] and emits, under the `jobly.sql` target:
//! - one event before each statement (tag, parameter count, SQL), at a configurable level;
//! - one `DEBUG` event after it (elapsed time, row count);
//! - a `WARN` event instead when the statement fails or exceeds the slow threshold.
//!
//! Bind values are never logged.

use crate::client::GenericClient;
use crate::error::JoblyResult;
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Level;

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A [`GenericClient`] that logs every statement it forwards.
///
/// ```ignore
/// let client = pool.get().await?;
/// let traced = TracedClient::new(&client).slow_query_threshold(Duration::from_millis(200));
/// let jobs = Job::find_all(&traced, None).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TracedClient<C> {
    client: C,
    level: Level,
    max_sql_length: Option<usize>,
    slow_query_threshold: Option<Duration>,
}

impl<C: GenericClient> TracedClient<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            level: Level::DEBUG,
            max_sql_length: Some(200),
            slow_query_threshold: None,
        }
    }

    /// Override the level of the pre-execution event.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Statements slower than this are reported at `WARN`.
    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub fn inner(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    fn display_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn before(&self, tag: &str, sql: &str, param_count: usize) {
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.display_sql(sql);
        emit_at_level!(
            self.level,
            target: "jobly.sql",
            tag,
            param_count,
            sql = %sql,
            "executing statement"
        );
    }

    fn after<T>(&self, tag: &str, started: Instant, result: &JoblyResult<T>, rows: impl Fn(&T) -> u64) {
        let elapsed = started.elapsed();
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        match result {
            Ok(value) => {
                let rows = rows(value);
                match self.slow_query_threshold {
                    Some(threshold) if elapsed > threshold => tracing::warn!(
                        target: "jobly.sql",
                        tag,
                        elapsed_ms,
                        rows,
                        "slow statement"
                    ),
                    _ => tracing::debug!(target: "jobly.sql", tag, elapsed_ms, rows, "statement done"),
                }
            }
            Err(err) => tracing::warn!(
                target: "jobly.sql",
                tag,
                elapsed_ms,
                error = %err,
                "statement failed"
            ),
        }
    }

    async fn query_inner(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Vec<Row>> {
        self.before(tag, sql, params.len());
        let started = Instant::now();
        let result = self.client.query_tagged(tag, sql, params).await;
        self.after(tag, started, &result, |rows| rows.len() as u64);
        result
    }

    async fn execute_inner(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<u64> {
        self.before(tag, sql, params.len());
        let started = Instant::now();
        let result = self.client.execute_tagged(tag, sql, params).await;
        self.after(tag, started, &result, |affected| *affected);
        result
    }
}

impl<C: GenericClient> GenericClient for TracedClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        self.query_inner("-", sql, params).await
    }

    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Vec<Row>> {
        self.query_inner(tag, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<u64> {
        self.execute_inner("-", sql, params).await
    }

    async fn execute_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<u64> {
        self.execute_inner(tag, sql, params).await
    }
}
