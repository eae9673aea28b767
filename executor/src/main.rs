//! CLI entry point for the alphaflex order executor.
//!
//! Prints exactly one JSON document on stdout; logs go to stderr.

use std::path::PathBuf;
use std::process;

use chrono::Utc;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use log::error;

use alphaflex_executor::auth::{self, LoginOutcome};
use alphaflex_executor::broker;
use alphaflex_executor::clock::{Clock, SystemClock};
use alphaflex_executor::config::Config;
use alphaflex_executor::error::{Operation, Result};
use alphaflex_executor::execution::Executor;
use alphaflex_executor::holdings;
use alphaflex_executor::output::Document;
use alphaflex_executor::verify::{self, Verification};

#[derive(Parser)]
#[command(name = "alphaflex-order")]
#[command(about = "Place weighted portfolio buys and liquidations on a brokerage account")]
#[command(version)]
struct Cli {
    /// Path to an optional config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Spend a dollar amount across holdings by weight
    Place {
        /// Total dollars to invest
        #[arg(allow_negative_numbers = true)]
        total_amount: f64,

        /// Holdings JSON array, or @path to a file holding one
        holdings: String,
    },

    /// Liquidate the full position in each listed holding
    Sell {
        /// Holdings JSON array, or @path to a file holding one
        holdings: String,
    },

    /// Look up an order's status
    Verify { order_id: String },

    /// Log in and store a session token
    Login {
        username: String,

        /// MFA code, if already known
        #[arg(long)]
        mfa_code: Option<String>,
    },

    /// Revoke and delete the stored session token
    Logout,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let doc = match Cli::try_parse() {
        Ok(cli) => run(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => Document::failure(&argument_error(&e)),
    };

    println!("{}", doc.as_str());
    process::exit(doc.exit_code());
}

fn argument_error(e: &clap::Error) -> String {
    let rendered = e.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    format!("Invalid arguments: {}", first.trim_start_matches("error: "))
}

fn run(cli: Cli) -> Document {
    let config = match Config::load_or_default(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!("Error loading config: {e}");
            return Document::failure(&e.to_string());
        }
    };

    match cli.command {
        Command::Place {
            total_amount,
            holdings: arg,
        } => batch(Operation::Place, || {
            let holdings = holdings::from_argument(&arg, true)?;
            with_executor(&config, |exec| {
                Ok(Document::success(&exec.place(total_amount, &holdings)?))
            })
        }),
        Command::Sell { holdings: arg } => batch(Operation::Sell, || {
            let holdings = holdings::from_argument(&arg, false)?;
            with_executor(&config, |exec| Ok(Document::success(&exec.sell(&holdings)?)))
        }),
        Command::Verify { order_id } => batch(Operation::Verify, || {
            let session = broker::open_session(&config)?;
            let brokerage = broker::connect(&config, &session)?;
            let clock = SystemClock;
            Ok(
                match verify::verify_order(&session, brokerage.as_ref(), &clock, &order_id)? {
                    Verification::Found(status) => Document::success(&status),
                    Verification::NotFound(id) => Document::order_not_found(&id, clock.now()),
                },
            )
        }),
        Command::Login { username, mfa_code } => login(&config, &username, mfa_code),
        Command::Logout => logout(&config),
    }
}

/// Run a place/sell/verify command, mapping a top-level error to the
/// tagged error document.
fn batch(operation: Operation, f: impl FnOnce() -> Result<Document>) -> Document {
    f().unwrap_or_else(|e| {
        error!("{operation:?} failed: {e}");
        Document::command_error(&e, operation, Utc::now())
    })
}

fn with_executor(
    config: &Config,
    f: impl FnOnce(&mut Executor<'_>) -> Result<Document>,
) -> Result<Document> {
    let session = broker::open_session(config)?;
    let brokerage = broker::connect(config, &session)?;
    let clock = SystemClock;
    let mut executor = Executor::new(brokerage.as_ref(), &session, &clock).configured(config)?;
    f(&mut executor)
}

fn login(config: &Config, username: &str, mfa_code: Option<String>) -> Document {
    try_login(config, username, mfa_code).unwrap_or_else(|e| {
        error!("Login error: {e}");
        Document::failure(&e.to_string())
    })
}

fn try_login(config: &Config, username: &str, mfa_code: Option<String>) -> Result<Document> {
    let credentials = auth::credentials(username, mfa_code)?;
    let mut session = broker::open_session(config)?;
    Ok(match auth::login(&mut session, credentials, auth::prompt_mfa_code)? {
        LoginOutcome::LoggedIn => {
            let brokerage = broker::connect(config, &session)?;
            Document::success(&auth::account_summary(brokerage.as_ref())?)
        }
        LoginOutcome::MfaRequired => Document::mfa_required(),
        LoginOutcome::Rejected(message) => Document::failure(&message),
    })
}

fn logout(config: &Config) -> Document {
    #[derive(serde::Serialize)]
    struct LoggedOut {
        message: &'static str,
    }

    let result = broker::open_session(config).and_then(|mut session| auth::logout(&mut session));
    match result {
        Ok(()) => Document::success(&LoggedOut {
            message: "Logged out",
        }),
        Err(e) => {
            error!("Logout error: {e}");
            Document::failure(&e.to_string())
        }
    }
}
