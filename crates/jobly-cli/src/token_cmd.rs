use crate::cli::{TokenCommand, TokenSignArgs, TokenVerifyArgs};
use crate::config;
use anyhow::Context;
use jobly::auth::token::smoke_test;
use jobly::{Caller, TokenService};

pub fn run(cmd: TokenCommand) -> anyhow::Result<()> {
    match cmd {
        TokenCommand::Smoke(conn) => {
            let config = config::resolve(&conn)?;
            let report = smoke_test(&config.secret_key).context("token smoke test failed")?;
            println!("Generated Token: {}", report.token);
            println!(
                "Decoded Token: {}",
                serde_json::to_string_pretty(&report.decoded)?
            );
            Ok(())
        }
        TokenCommand::Sign(args) => run_sign(args),
        TokenCommand::Verify(args) => run_verify(args),
    }
}

fn run_sign(args: TokenSignArgs) -> anyhow::Result<()> {
    let config = config::resolve(&args.conn)?;
    let caller = Caller {
        username: args.username,
        is_admin: args.admin,
    };
    let token = TokenService::from_config(&config).sign(&caller)?;
    println!("{token}");
    Ok(())
}

fn run_verify(args: TokenVerifyArgs) -> anyhow::Result<()> {
    let config = config::resolve(&args.conn)?;
    let caller = TokenService::from_config(&config).verify(args.token.trim())?;
    println!("{}", serde_json::to_string_pretty(&caller)?);
    Ok(())
}
