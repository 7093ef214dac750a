use crate::cli::{JobIdArgs, JobsCommand, JobsListArgs};
use crate::config;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use jobly::{Job, TracedClient};

pub async fn run(cmd: JobsCommand) -> anyhow::Result<()> {
    match cmd {
        JobsCommand::List(args) => run_list(args).await,
        JobsCommand::Get(args) => run_get(args).await,
        JobsCommand::Delete(args) => run_delete(args).await,
    }
}

async fn run_list(args: JobsListArgs) -> anyhow::Result<()> {
    let config = config::resolve(&args.conn)?;
    let pool = jobly::create_pool_from_config(&config)?;
    let client = TracedClient::new(pool.get().await?);

    let jobs = Job::find_all(&client, Some(&args.filter)).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
    } else {
        println!("{}", jobs_table(&jobs));
        println!("{} job(s)", jobs.len());
    }
    Ok(())
}

async fn run_get(args: JobIdArgs) -> anyhow::Result<()> {
    let config = config::resolve(&args.conn)?;
    let pool = jobly::create_pool_from_config(&config)?;
    let client = TracedClient::new(pool.get().await?);

    let job = Job::get(&client, args.id).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&job)?);
    } else {
        println!("{}", jobs_table(std::slice::from_ref(&job)));
    }
    Ok(())
}

async fn run_delete(args: JobIdArgs) -> anyhow::Result<()> {
    let config = config::resolve(&args.conn)?;
    let pool = jobly::create_pool_from_config(&config)?;
    let client = TracedClient::new(pool.get().await?);

    Job::remove(&client, args.id).await?;
    if args.json {
        println!("{}", serde_json::json!({ "deleted": args.id }));
    } else {
        println!("deleted job {}", args.id);
    }
    Ok(())
}

fn header(name: &str) -> Cell {
    Cell::new(name).add_attribute(Attribute::Bold).fg(Color::Cyan)
}

fn jobs_table(jobs: &[Job]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            header("ID"),
            header("Title"),
            header("Salary"),
            header("Equity"),
            header("Company"),
        ]);

    for job in jobs {
        let salary = job.salary.map_or_else(|| "(null)".to_string(), |s| s.to_string());
        let equity = job.equity.map_or_else(|| "(null)".to_string(), |e| e.to_string());
        table.add_row(vec![
            Cell::new(job.id).fg(Color::Yellow),
            Cell::new(&job.title),
            Cell::new(salary).fg(Color::Green),
            Cell::new(equity),
            Cell::new(&job.company_handle).fg(Color::DarkGrey),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn table_shows_nulls_explicitly() {
        let jobs = vec![
            Job {
                id: 1,
                title: "Engineer".into(),
                salary: Some(100_000),
                equity: Some(Decimal::new(5, 2)),
                company_handle: "acme".into(),
            },
            Job {
                id: 2,
                title: "Intern".into(),
                salary: None,
                equity: None,
                company_handle: "acme".into(),
            },
        ];
        let rendered = jobs_table(&jobs).to_string();
        assert!(rendered.contains("Engineer"));
        assert!(rendered.contains("100000"));
        assert!(rendered.contains("0.05"));
        assert!(rendered.contains("(null)"));
    }
}
