//! Schema migrations via [`refinery`].
//!
//! The SQL files under `migrations/` are embedded at compile time, so a built binary can
//! bring any database up to date without the source tree.
//!
//! ```ignore
//! let (mut client, connection) = tokio_postgres::connect(&config.database_url, NoTls).await?;
//! tokio::spawn(connection);
//! let report = jobly::migrate::run(&mut client).await?;
//! ```

use crate::error::JoblyResult;

pub use refinery::Report;

mod embedded {
    refinery::embed_migrations!("migrations");
}

/// Apply every pending embedded migration on a single connection.
pub async fn run(client: &mut tokio_postgres::Client) -> JoblyResult<Report> {
    let report = embedded::migrations::runner().run_async(client).await?;
    for migration in report.applied_migrations() {
        tracing::info!(
            target: "jobly.migrate",
            version = migration.version(),
            name = %migration.name(),
            "applied migration"
        );
    }
    Ok(report)
}

/// Names of the embedded migrations, oldest first, as `V{version}__{name}`.
pub fn embedded_names() -> Vec<String> {
    embedded::migrations::runner()
        .get_migrations()
        .iter()
        .map(|m| format!("V{}__{}", m.version(), m.name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_migration_is_embedded() {
        assert_eq!(embedded_names(), vec!["V1__create_companies_and_jobs"]);
    }
}
