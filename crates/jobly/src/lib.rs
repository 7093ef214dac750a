//! # jobly
//!
//! Data-access layer for a job-postings service on PostgreSQL.
//!
//! ## Features
//!
//! - **Placeholder-safe SQL**: variable-length `SET` and `WHERE` bodies come from
//!   [`sql::build_set_fragment`] / [`sql::build_filter_fragment`]; values are always bound
//! - **Resource operations**: [`Job::create`], [`Job::find_all`], [`Job::get`], [`Job::update`],
//!   [`Job::remove`], with a missing id reported as [`JoblyError::NotFound`]
//! - **Transaction-friendly**: pass a transaction anywhere a [`GenericClient`] is expected
//! - **Constraint mapping**: unique / foreign-key / check failures become
//!   [`JoblyError::ConstraintViolation`]
//! - **Authorization gates** and HS256 caller tokens in [`auth`]
//! - **Statement logging** through [`TracedClient`]
//!
//! ```ignore
//! use jobly::{Config, Job, JobFilter, TracedClient, create_pool_from_config};
//!
//! let config = Config::from_env()?;
//! let pool = create_pool_from_config(&config)?;
//! let client = pool.get().await?;
//! let traced = TracedClient::new(&client);
//!
//! let filter = JobFilter::default().title("eng").has_equity(true);
//! let jobs = Job::find_all(&traced, Some(&filter)).await?;
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod ident;
pub mod models;
pub mod monitor;
pub mod row;
pub mod sql;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "migrate")]
pub mod migrate;

pub use auth::{Caller, TokenService, ensure_admin, ensure_correct_user_or_admin, ensure_logged_in};
pub use client::GenericClient;
pub use config::Config;
pub use error::{ConstraintKind, JoblyError, JoblyResult};
pub use models::{Job, JobFilter, JobPatch, NewJob};
pub use monitor::TracedClient;
pub use row::{FromRow, RowExt};
pub use sql::query;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_from_config, create_pool_with_config};
