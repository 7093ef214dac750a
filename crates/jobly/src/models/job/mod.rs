//! Job postings: create, filtered list, get, partial update, remove.
//!
//! Every operation is a single statement against a [`GenericClient`], so any of them can run
//! inside a caller-managed transaction.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::row::{FromRow, RowExt};
use crate::sql::{
    ColumnMap, FilterSpec, FragmentBuilder, Param, Query, build_filter_fragment,
    build_set_fragment, contains_pattern, query,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tokio_postgres::Row;


/// External (camelCase) field names whose column differs.
pub const JOB_COLUMNS: ColumnMap<'static> = ColumnMap::new(&[("companyHandle", "company_handle")]);

const RETURNING: &str = "id, title, salary, equity, company_handle";

/// A stored job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// Input for [`Job::create`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Criteria for [`Job::find_all`].
///
/// Recognized keys: `title` (case-insensitive substring), `minSalary` (inclusive),
/// `hasEquity` (only `true` filters). Unknown keys are ignored when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    pub has_equity: Option<bool>,
}

impl JobFilter {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn min_salary(mut self, min_salary: i32) -> Self {
        self.min_salary = Some(min_salary);
        self
    }

    pub fn has_equity(mut self, has_equity: bool) -> Self {
        self.has_equity = Some(has_equity);
        self
    }
}

impl FilterSpec for JobFilter {
    // Order is fixed: title, minSalary, hasEquity.
    fn write_predicates(&self, builder: &mut FragmentBuilder<Param>) {
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            builder.bind("title", "ILIKE", Param::new(contains_pattern(title)));
        }
        if let Some(min_salary) = self.min_salary {
            builder.bind("salary", ">=", Param::new(min_salary));
        }
        if self.has_equity == Some(true) {
            builder.literal("equity > 0");
        }
    }
}

/// Partial update for [`Job::update`]. Only `Some` fields are written.
///
/// `salary` and `equity` are nullable: `Some(None)` clears the column, `None` leaves it
/// untouched. In JSON, an explicit `null` means `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub equity: Option<Option<Decimal>>,
}

fn present<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

impl JobPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn salary(mut self, salary: Option<i32>) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn equity(mut self, equity: Option<Decimal>) -> Self {
        self.equity = Some(equity);
        self
    }

    /// Supplied fields as (external name, value), in declaration order.
    pub fn changes(&self) -> Vec<(&'static str, Param)> {
        let mut out = Vec::new();
        if let Some(title) = &self.title {
            out.push(("title", Param::new(title.clone())));
        }
        if let Some(salary) = self.salary {
            out.push(("salary", Param::new(salary)));
        }
        if let Some(equity) = self.equity {
            out.push(("equity", Param::new(equity)));
        }
        out
    }
}

impl Job {
    /// Insert a job and return it with its generated id.
    ///
    /// A constraint failure (missing company, negative salary, equity above 1) comes back as
    /// [`JoblyError::ConstraintViolation`].
    pub async fn create(conn: &impl GenericClient, data: &NewJob) -> JoblyResult<Job> {
        let job: Job = query(format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {RETURNING}"
        ))
        .tag("jobs.create")
        .bind(data.title.clone())
        .bind(data.salary)
        .bind(data.equity)
        .bind(data.company_handle.clone())
        .fetch_one_as(conn)
        .await?;

        tracing::debug!(target: "jobly.jobs", id = job.id, company = %job.company_handle, "job created");
        Ok(job)
    }

    /// List jobs ordered by title, optionally filtered.
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: Option<&JobFilter>,
    ) -> JoblyResult<Vec<Job>> {
        find_all_query(filter).fetch_all_as(conn).await
    }

    /// Fetch one job by id.
    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
        query(format!("SELECT {RETURNING} FROM jobs WHERE id = $1"))
            .tag("jobs.get")
            .bind(id)
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Apply a partial update and return the updated job.
    ///
    /// An empty patch is rejected with [`JoblyError::InvalidArgument`] before anything is sent
    /// to the store.
    pub async fn update(conn: &impl GenericClient, id: i32, patch: &JobPatch) -> JoblyResult<Job> {
        update_query(id, patch)?
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Delete a job.
    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        let deleted = query("DELETE FROM jobs WHERE id = $1")
            .tag("jobs.remove")
            .bind(id)
            .execute(conn)
            .await?;
        if deleted == 0 {
            return Err(not_found(id));
        }
        tracing::debug!(target: "jobly.jobs", id, "job removed");
        Ok(())
    }
}

fn not_found(id: i32) -> JoblyError {
    JoblyError::not_found(format!("No job: {id}"))
}

pub(crate) fn find_all_query(filter: Option<&JobFilter>) -> Query {
    let filter = build_filter_fragment(filter);
    let mut sql = format!("SELECT {RETURNING} FROM jobs");
    filter.write_where(&mut sql);
    sql.push_str(" ORDER BY title, id");
    query(sql).tag("jobs.find_all").bind_all(filter.into_values())
}

pub(crate) fn update_query(id: i32, patch: &JobPatch) -> JoblyResult<Query> {
    let set = build_set_fragment(patch.changes(), JOB_COLUMNS)?;
    // The id is bound after every SET value, so its placeholder is values.len() + 1.
    let id_idx = set.next_placeholder();
    let sql = format!(
        "UPDATE jobs SET {} WHERE id = ${id_idx} RETURNING {RETURNING}",
        set.clause()
    );
    Ok(query(sql)
        .tag("jobs.update")
        .bind_all(set.into_values())
        .bind(id))
}
