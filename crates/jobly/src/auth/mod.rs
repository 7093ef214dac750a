//! Authorization gates and request identity.
//!
//! The gates are pure functions over the authenticated caller (if any); they never touch the
//! store. Identity comes from a verified token, see [`token::TokenService`].

pub mod token;

use crate::error::{JoblyError, JoblyResult};
use serde::{Deserialize, Serialize};

pub use token::{Claims, SmokeReport, TokenService};

/// The authenticated principal making a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl Caller {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_admin: false,
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_admin: true,
        }
    }
}

/// Allow when a caller is present, whoever it is.
pub fn ensure_logged_in(caller: Option<&Caller>) -> JoblyResult<&Caller> {
    caller.ok_or_else(|| JoblyError::unauthorized("login required"))
}

/// Allow only administrators.
pub fn ensure_admin(caller: Option<&Caller>) -> JoblyResult<()> {
    match caller {
        Some(c) if c.is_admin => Ok(()),
        _ => Err(JoblyError::unauthorized("admin required")),
    }
}

/// Allow administrators, or the caller whose username is `owner`.
///
/// Username comparison is exact (case-sensitive).
pub fn ensure_correct_user_or_admin(caller: Option<&Caller>, owner: &str) -> JoblyResult<()> {
    match caller {
        Some(c) if c.is_admin || c.username == owner => Ok(()),
        Some(c) => {
            tracing::debug!(target: "jobly.auth", caller = %c.username, owner, "access denied");
            Err(JoblyError::unauthorized(format!(
                "{} may not act on behalf of {owner}",
                c.username
            )))
        }
        None => Err(JoblyError::unauthorized("login required")),
    }
}
