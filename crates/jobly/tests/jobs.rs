//! Store-backed job tests. Each test runs inside a transaction over temporary tables built
//! from the embedded schema, then rolls back.

use jobly::{ConstraintKind, GenericClient, Job, JobFilter, JobPatch, JoblyError, JoblyResult, NewJob};
use rust_decimal::Decimal;
use tokio_postgres::{Client, NoTls};

const SCHEMA: &str = include_str!("../migrations/V1__create_companies_and_jobs.sql");

async fn connect(test: &str) -> Option<Client> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            return None;
        }
    };
    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .expect("connect to DATABASE_URL");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("connection error: {e}");
        }
    });
    Some(client)
}

async fn seed(tx: &tokio_postgres::Transaction<'_>) -> JoblyResult<()> {
    tx.batch_execute(&SCHEMA.replace("CREATE TABLE", "CREATE TEMP TABLE"))
        .await?;
    tx.execute(
        "INSERT INTO companies (handle, name, description) VALUES ('acme', 'Acme', 'Anvils')",
        &[],
    )
    .await?;
    Ok(())
}

fn new_job(title: &str, salary: Option<i32>, equity: Option<Decimal>) -> NewJob {
    NewJob {
        title: title.to_string(),
        salary,
        equity,
        company_handle: "acme".to_string(),
    }
}

#[tokio::test]
async fn create_get_update_remove() -> JoblyResult<()> {
    let Some(mut client) = connect("create_get_update_remove").await else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    seed(&tx).await?;

    let created = Job::create(&tx, &new_job("Engineer", Some(100_000), Some(Decimal::new(1, 1)))).await?;
    assert_eq!(created.title, "Engineer");
    assert_eq!(created.company_handle, "acme");

    let fetched = Job::get(&tx, created.id).await?;
    assert_eq!(fetched, created);

    let updated = Job::update(&tx, created.id, &JobPatch::default().salary(Some(110_000))).await?;
    assert_eq!(updated.salary, Some(110_000));
    assert_eq!(updated.title, "Engineer");
    assert_eq!(updated.equity, Some(Decimal::new(1, 1)));

    let cleared = Job::update(&tx, created.id, &JobPatch::default().equity(None)).await?;
    assert_eq!(cleared.equity, None);

    Job::remove(&tx, created.id).await?;
    let err = Job::get(&tx, created.id).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(Job::remove(&tx, created.id).await.unwrap_err().is_not_found());

    tx.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn list_filters() -> JoblyResult<()> {
    let Some(mut client) = connect("list_filters").await else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    seed(&tx).await?;

    Job::create(&tx, &new_job("Manager", None, None)).await?;
    Job::create(&tx, &new_job("Engineer", Some(100_000), Some(Decimal::new(1, 1)))).await?;
    Job::create(&tx, &new_job("Designer", Some(80_000), Some(Decimal::ZERO))).await?;

    let all = Job::find_all(&tx, None).await?;
    let titles: Vec<&str> = all.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(titles, vec!["Designer", "Engineer", "Manager"]);

    let eng = Job::find_all(&tx, Some(&JobFilter::default().title("eng"))).await?;
    assert_eq!(eng.len(), 1);
    assert_eq!(eng[0].title, "Engineer");

    let equity = Job::find_all(&tx, Some(&JobFilter::default().has_equity(true))).await?;
    let titles: Vec<&str> = equity.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(titles, vec!["Engineer"]);

    let paid = Job::find_all(&tx, Some(&JobFilter::default().min_salary(80_000))).await?;
    assert_eq!(paid.len(), 2);

    let none = Job::find_all(&tx, Some(&JobFilter::default().title("100%"))).await?;
    assert!(none.is_empty());

    tx.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn missing_company_is_foreign_key_violation() -> JoblyResult<()> {
    let Some(mut client) = connect("missing_company_is_foreign_key_violation").await else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    seed(&tx).await?;

    let mut job = new_job("Ghost", None, None);
    job.company_handle = "nope".to_string();
    let err = Job::create(&tx, &job).await.unwrap_err();
    assert!(matches!(
        err,
        JoblyError::ConstraintViolation {
            kind: ConstraintKind::ForeignKey,
            ..
        }
    ));
    assert_eq!(err.status_code(), 400);

    tx.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn check_constraints_are_reported() -> JoblyResult<()> {
    let Some(mut client) = connect("check_constraints_are_reported").await else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    seed(&tx).await?;

    let err = Job::create(&tx, &new_job("Overpaid", None, Some(Decimal::new(15, 1))))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        JoblyError::ConstraintViolation {
            kind: ConstraintKind::Check,
            ..
        }
    ));

    tx.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn duplicate_company_is_unique_violation() -> JoblyResult<()> {
    let Some(mut client) = connect("duplicate_company_is_unique_violation").await else {
        return Ok(());
    };
    let tx = client.transaction().await?;
    seed(&tx).await?;

    let err = GenericClient::execute(
        &tx,
        "INSERT INTO companies (handle, name, description) VALUES ('acme', 'Acme 2', 'x')",
        &[],
    )
    .await
    .unwrap_err();
    assert!(err.is_unique_violation());

    tx.rollback().await?;
    Ok(())
}
