//! CLI tool to mint a signed access token for the query service.
//!
//! Prints the token to stdout; any usage, validation, or config failure
//! is reported on stderr and exits with code 1.

use clap::Parser;
use std::process::ExitCode;

use neuquery_cli::auth::{generate_token, load_app_secret, parse_expiration, TokenError};

/// Mint a signed access token from a local secret
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Email address embedded in the token
    email: String,

    /// Expiration timestamp (RFC 3339, YYYY-MM-DDTHH:MM:SS, or YYYY-MM-DD)
    expiration: String,

    /// Path to a JSON config file with an `appsecret` field
    config_path: String,
}

fn run(args: &Args) -> Result<String, TokenError> {
    let expiration = parse_expiration(&args.expiration)?;
    let app_secret = load_app_secret(&args.config_path)?;
    generate_token(&args.email, expiration, &app_secret)
}

fn main() -> ExitCode {
    // try_parse instead of parse: usage failures exit with code 1 like
    // every other failure of this tool.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code: u8 = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    match run(&args) {
        Ok(token) => {
            println!("{}", token);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::from(1)
        }
    }
}
