use jobly::JobFilter;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Migrate,
    Jobs,
    JobsList,
    JobsGet,
    JobsDelete,
    Token,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Migrate(ConnArgs),
    Jobs(JobsCommand),
    Token(TokenCommand),
}

/// Where settings come from: optional TOML file, then an explicit database override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnArgs {
    pub config: Option<PathBuf>,
    pub database: Option<String>,
}

#[derive(Debug, Clone)]
pub enum JobsCommand {
    List(JobsListArgs),
    Get(JobIdArgs),
    Delete(JobIdArgs),
}

#[derive(Debug, Clone)]
pub struct JobsListArgs {
    pub conn: ConnArgs,
    pub filter: JobFilter,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct JobIdArgs {
    pub conn: ConnArgs,
    pub id: i32,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub enum TokenCommand {
    Smoke(ConnArgs),
    Sign(TokenSignArgs),
    Verify(TokenVerifyArgs),
}

#[derive(Debug, Clone)]
pub struct TokenSignArgs {
    pub conn: ConnArgs,
    pub username: String,
    pub admin: bool,
}

#[derive(Debug, Clone)]
pub struct TokenVerifyArgs {
    pub conn: ConnArgs,
    pub token: String,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "migrate" => parse_migrate(it.map(|s| s.as_str())),
        "jobs" => parse_jobs(it.map(|s| s.as_str())),
        "token" => parse_token(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Consume `--config` / `--database` (both `--flag value` and `--flag=value`).
///
/// Returns `false` when `token` is not a connection flag.
fn parse_conn_flag<'a>(
    token: &'a str,
    it: &mut impl Iterator<Item = &'a str>,
    conn: &mut ConnArgs,
) -> anyhow::Result<bool> {
    match token {
        "--config" => {
            let Some(v) = it.next() else {
                anyhow::bail!("--config requires a value");
            };
            conn.config = Some(PathBuf::from(v));
        }
        _ if token.starts_with("--config=") => {
            conn.config = Some(PathBuf::from(token.trim_start_matches("--config=")));
        }
        "--database" => {
            let Some(v) = it.next() else {
                anyhow::bail!("--database requires a value");
            };
            conn.database = Some(v.to_string());
        }
        _ if token.starts_with("--database=") => {
            conn.database = Some(token.trim_start_matches("--database=").to_string());
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn parse_migrate<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut conn = ConnArgs::default();

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Migrate)),
            _ if parse_conn_flag(token, &mut it, &mut conn)? => {}
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Migrate(conn))
}

fn parse_id(v: &str) -> anyhow::Result<i32> {
    v.parse::<i32>()
        .map_err(|_| anyhow::anyhow!("job id must be an integer, got: {v}"))
}

fn parse_jobs<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut subcmd: Option<&str> = None;

    let mut conn = ConnArgs::default();
    let mut json = false;
    let mut filter = JobFilter::default();
    let mut id: Option<i32> = None;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => {
                return Ok(Command::Help(match subcmd {
                    None => HelpTopic::Jobs,
                    Some("list") => HelpTopic::JobsList,
                    Some("get") => HelpTopic::JobsGet,
                    Some("delete") => HelpTopic::JobsDelete,
                    Some(other) => anyhow::bail!("unknown subcommand: {other}"),
                }));
            }
            "list" | "get" | "delete" if subcmd.is_none() => {
                subcmd = Some(token);
            }
            _ if parse_conn_flag(token, &mut it, &mut conn)? => {}
            "--json" => json = true,
            "--title" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--title requires a value");
                };
                filter.title = Some(v.to_string());
            }
            _ if token.starts_with("--title=") => {
                filter.title = Some(token.trim_start_matches("--title=").to_string());
            }
            "--min-salary" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--min-salary requires a value");
                };
                filter.min_salary = Some(parse_min_salary(v)?);
            }
            _ if token.starts_with("--min-salary=") => {
                filter.min_salary = Some(parse_min_salary(token.trim_start_matches("--min-salary="))?);
            }
            "--has-equity" => filter.has_equity = Some(true),
            other if !other.starts_with('-') && matches!(subcmd, Some("get" | "delete")) => {
                if id.is_some() {
                    anyhow::bail!("unexpected extra argument: {other}");
                }
                id = Some(parse_id(other)?);
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    let cmd = match subcmd {
        None => return Ok(Command::Help(HelpTopic::Jobs)),
        Some("list") => JobsCommand::List(JobsListArgs { conn, filter, json }),
        Some(name @ ("get" | "delete")) => {
            let Some(id) = id else {
                anyhow::bail!("jobs {name} requires <ID>");
            };
            let args = JobIdArgs { conn, id, json };
            if name == "get" {
                JobsCommand::Get(args)
            } else {
                JobsCommand::Delete(args)
            }
        }
        Some(other) => anyhow::bail!("unknown subcommand: {other}"),
    };

    Ok(Command::Jobs(cmd))
}

fn parse_min_salary(v: &str) -> anyhow::Result<i32> {
    v.parse::<i32>()
        .map_err(|_| anyhow::anyhow!("--min-salary must be an integer, got: {v}"))
}

fn parse_token<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut subcmd: Option<&str> = None;

    let mut conn = ConnArgs::default();
    let mut admin = false;
    let mut positional: Option<String> = None;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Token)),
            "smoke" | "sign" | "verify" if subcmd.is_none() => {
                subcmd = Some(token);
            }
            _ if parse_conn_flag(token, &mut it, &mut conn)? => {}
            "--admin" => admin = true,
            other if !other.starts_with('-') && matches!(subcmd, Some("sign" | "verify")) => {
                if positional.is_some() {
                    anyhow::bail!("unexpected extra argument: {other}");
                }
                positional = Some(other.to_string());
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    let cmd = match subcmd {
        None => return Ok(Command::Help(HelpTopic::Token)),
        Some("smoke") => TokenCommand::Smoke(conn),
        Some("sign") => {
            let Some(username) = positional else {
                anyhow::bail!("token sign requires <USERNAME>");
            };
            TokenCommand::Sign(TokenSignArgs {
                conn,
                username,
                admin,
            })
        }
        Some("verify") => {
            let Some(token) = positional else {
                anyhow::bail!("token verify requires <TOKEN>");
            };
            TokenCommand::Verify(TokenVerifyArgs { conn, token })
        }
        Some(other) => anyhow::bail!("unknown subcommand: {other}"),
    };

    Ok(Command::Token(cmd))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
jobly - Jobly data-access tools

USAGE:
  jobly <COMMAND> [OPTIONS]

COMMANDS:
  migrate               Apply pending schema migrations
  jobs                  List, show and delete job postings
  token                 Sign and verify caller tokens

GLOBAL OPTIONS:
  --config <FILE>       TOML settings file (overrides environment)
  --database <URL>      Database URL (overrides config and DATABASE_URL)
  -h, --help            Print help

ENVIRONMENT:
  DATABASE_URL, SECRET_KEY, JOBLY_ENV, JOBLY_POOL_SIZE, JOBLY_TOKEN_TTL_SECS, RUST_LOG

Run `jobly <command> --help` for more."
            );
        }
        HelpTopic::Migrate => {
            println!(
                "\
USAGE:
  jobly migrate [OPTIONS]

OPTIONS:
  --config <FILE>       Settings file
  --database <URL>      Database URL (overrides config)
  -h, --help            Print help"
            );
        }
        HelpTopic::Jobs => {
            println!(
                "\
USAGE:
  jobly jobs list [OPTIONS]
  jobly jobs get <ID> [OPTIONS]
  jobly jobs delete <ID> [OPTIONS]

Run `jobly jobs <subcommand> --help` for more."
            );
        }
        HelpTopic::JobsList => {
            println!(
                "\
USAGE:
  jobly jobs list [OPTIONS]

OPTIONS:
  --title <TEXT>        Case-insensitive substring of the title
  --min-salary <N>      Only jobs paying at least N
  --has-equity          Only jobs with equity above zero
  --json                Print JSON instead of a table
  --config <FILE>       Settings file
  --database <URL>      Database URL (overrides config)
  -h, --help            Print help"
            );
        }
        HelpTopic::JobsGet => {
            println!(
                "\
USAGE:
  jobly jobs get <ID> [OPTIONS]

OPTIONS:
  --json                Print JSON instead of a table
  --config <FILE>       Settings file
  --database <URL>      Database URL (overrides config)
  -h, --help            Print help"
            );
        }
        HelpTopic::JobsDelete => {
            println!(
                "\
USAGE:
  jobly jobs delete <ID> [OPTIONS]

OPTIONS:
  --config <FILE>       Settings file
  --database <URL>      Database URL (overrides config)
  -h, --help            Print help"
            );
        }
        HelpTopic::Token => {
            println!(
                "\
USAGE:
  jobly token smoke
  jobly token sign <USERNAME> [--admin]
  jobly token verify <TOKEN>

SUBCOMMANDS:
  smoke                 Sign and verify a fixed test payload
  sign                  Issue a token for a caller
  verify                Check a token and print its caller

OPTIONS:
  --admin               Mark the signed caller as administrator
  --config <FILE>       Settings file (for SECRET_KEY / token TTL)
  -h, --help            Print help"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("jobly")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn no_args_prints_root_help() {
        let cmd = parse_args(&args(&[])).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::Root)));
    }

    #[test]
    fn parse_jobs_list_with_filters() {
        let cmd = parse_args(&args(&[
            "jobs",
            "list",
            "--title",
            "eng",
            "--min-salary=90000",
            "--has-equity",
            "--database",
            "postgres://localhost/jobly",
        ]))
        .unwrap();
        let Command::Jobs(JobsCommand::List(list)) = cmd else {
            panic!("expected jobs list");
        };
        assert_eq!(
            list.filter,
            JobFilter::default().title("eng").min_salary(90_000).has_equity(true)
        );
        assert_eq!(list.conn.database.as_deref(), Some("postgres://localhost/jobly"));
        assert!(!list.json);
    }

    #[test]
    fn parse_jobs_get_and_delete() {
        let cmd = parse_args(&args(&["jobs", "get", "7", "--json"])).unwrap();
        let Command::Jobs(JobsCommand::Get(get)) = cmd else {
            panic!("expected jobs get");
        };
        assert_eq!(get.id, 7);
        assert!(get.json);

        let cmd = parse_args(&args(&["jobs", "delete", "--config=jobly.toml", "9"])).unwrap();
        let Command::Jobs(JobsCommand::Delete(del)) = cmd else {
            panic!("expected jobs delete");
        };
        assert_eq!(del.id, 9);
        assert_eq!(del.conn.config, Some(PathBuf::from("jobly.toml")));
    }

    #[test]
    fn jobs_get_requires_integer_id() {
        assert!(parse_args(&args(&["jobs", "get"])).is_err());
        assert!(parse_args(&args(&["jobs", "get", "abc"])).is_err());
        assert!(parse_args(&args(&["jobs", "get", "1", "2"])).is_err());
    }

    #[test]
    fn parse_token_sign_admin() {
        let cmd = parse_args(&args(&["token", "sign", "root", "--admin"])).unwrap();
        let Command::Token(TokenCommand::Sign(sign)) = cmd else {
            panic!("expected token sign");
        };
        assert_eq!(sign.username, "root");
        assert!(sign.admin);
    }

    #[test]
    fn subcommand_help_topics() {
        let cmd = parse_args(&args(&["jobs", "list", "--help"])).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::JobsList)));
        let cmd = parse_args(&args(&["token"])).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::Token)));
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        assert!(parse_args(&args(&["deploy"])).is_err());
        assert!(parse_args(&args(&["migrate", "--force"])).is_err());
        assert!(parse_args(&args(&["jobs", "list", "--min-salary", "lots"])).is_err());
    }
}
