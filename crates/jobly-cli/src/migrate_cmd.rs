use crate::cli::ConnArgs;
use crate::config;
use anyhow::Context;

async fn connect(database_url: &str) -> anyhow::Result<tokio_postgres::Client> {
    let (client, connection) = tokio_postgres::connect(database_url, tokio_postgres::NoTls)
        .await
        .with_context(|| format!("failed to connect to database: {database_url}"))?;

    tokio::spawn(async move {
        if let Err(err) = connection.await {
            tracing::error!(target: "jobly.cli", error = %err, "connection error");
        }
    });

    Ok(client)
}

pub async fn run(conn: ConnArgs) -> anyhow::Result<()> {
    let config = config::resolve(&conn)?;
    let mut client = connect(&config.database_url).await?;

    let report = jobly::migrate::run(&mut client)
        .await
        .context("failed to apply migrations")?;

    let applied = report.applied_migrations();
    if applied.is_empty() {
        println!("schema is up to date ({} known)", jobly::migrate::embedded_names().len());
        return Ok(());
    }
    for m in applied {
        println!("applied V{}__{}", m.version(), m.name());
    }
    Ok(())
}
