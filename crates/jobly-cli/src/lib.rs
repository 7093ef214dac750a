mod cli;
mod config;
mod jobs_cmd;
mod migrate_cmd;
mod token_cmd;

use tracing_subscriber::EnvFilter;

/// Log to stderr so table and JSON output on stdout stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    init_tracing();
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Migrate(conn) => migrate_cmd::run(conn).await,
        cli::Command::Jobs(cmd) => jobs_cmd::run(cmd).await,
        cli::Command::Token(cmd) => token_cmd::run(cmd),
    }
}
