//! Folio CLI - Command line interface for the investment tracker.
//!
//! Output is JSON on stdout; logs go to stderr.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use folio_core::{
    provider::{InMemoryPriceProvider, JsonFilePriceProvider},
    ApiResponse, EntryForm, PriceProvider, Session, Settings,
};
use serde::Serialize;
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio CLI - transaction ledger, portfolio value and risk")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to ~/.folio/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON price file, overriding the one in the settings
    #[arg(long, global = true)]
    prices: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session reading commands from stdin
    Session,
    /// One-shot overview of a list of transactions
    Report {
        /// Transaction as "buy|sell TICKER SHARES PRICE [YYYY-MM-DD]" (repeatable)
        #[arg(long = "tx")]
        transactions: Vec<String>,
        /// Value holdings at this date instead of the latest close
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Show the configured macro indicators
    Macro,
}

const SESSION_HELP: &str = "\
buy|sell TICKER SHARES PRICE [YYYY-MM-DD]  record a transaction
ledger                                    list transactions
holdings                                  net shares per ticker
value [YYYY-MM-DD]                        portfolio value
returns                                   blended daily returns
risk                                      Sharpe ratio and value-at-risk
overview                                  everything above at once
macro                                     macro indicators
help                                      this text
quit                                      end the session (the ledger is discarded)";

/// Log level used until the settings are loaded.
const DEFAULT_LOG_LEVEL: &str = "warn";

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging before settings load so its own logs are kept.
    // RUST_LOG wins; otherwise the configured level replaces the default.
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter, filter_handle) = reload::Layer::new(
        env_filter.unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL)),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let settings = match &cli.config {
        Some(path) => Settings::load_from_path(path),
        None => Settings::load(),
    }
    .context("Failed to load settings")?;

    if !from_env {
        if let Err(e) = filter_handle.reload(EnvFilter::new(&settings.log_level)) {
            tracing::warn!("Could not apply log level '{}': {}", settings.log_level, e);
        }
    }

    let provider = load_provider(cli.prices.as_ref().or(settings.price_file.as_ref()))?;
    let mut session = Session::new(settings);

    match cli.command {
        Commands::Session => run_session(&mut session, provider.as_ref())?,
        Commands::Report {
            transactions,
            as_of,
        } => println!(
            "{}",
            handle_report(&mut session, provider.as_ref(), &transactions, as_of)
        ),
        Commands::Macro => println!("{}", respond(session.macro_indicators())),
    }

    Ok(())
}

fn load_provider(path: Option<&PathBuf>) -> Result<Box<dyn PriceProvider>> {
    match path {
        Some(path) => {
            let provider = JsonFilePriceProvider::from_path(path)
                .with_context(|| format!("Failed to load prices from {}", path.display()))?;
            Ok(Box::new(provider))
        }
        None => {
            tracing::warn!("No price file configured; every ticker will be unpriced");
            Ok(Box::new(InMemoryPriceProvider::new()))
        }
    }
}

fn respond<T: Serialize>(data: T) -> String {
    render(&ApiResponse::ok(data))
}

fn fail(error: impl ToString) -> String {
    render(&ApiResponse::<()>::err(error.to_string()))
}

fn render<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string_pretty(response).unwrap_or_else(|e| error_json(&e.to_string()))
}

/// Minimal error response, built without going through `ApiResponse`.
fn error_json(message: &str) -> String {
    json!({ "ok": false, "error": message }).to_string()
}

fn run_session(session: &mut Session, provider: &dyn PriceProvider) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if matches!(command, "quit" | "exit") {
            break;
        }

        writeln!(stdout, "{}", handle_command(session, provider, command))?;
        stdout.flush()?;
    }

    tracing::info!(
        "Session ended, discarding {} transactions",
        session.ledger().len()
    );
    Ok(())
}

fn handle_command(session: &mut Session, provider: &dyn PriceProvider, command: &str) -> String {
    let mut words = command.split_whitespace();
    let verb = words.next().unwrap_or_default().to_lowercase();

    match verb.as_str() {
        "buy" | "sell" => match command.parse::<EntryForm>() {
            Ok(form) => match session.record(form) {
                Ok(transaction) => respond(json!({ "transaction": transaction })),
                Err(e) => fail(e),
            },
            Err(e) => fail(e),
        },
        "ledger" => respond(json!({ "transactions": session.ledger().transactions() })),
        "holdings" => respond(json!({ "holdings": session.holdings() })),
        "value" => match words.next() {
            Some(date) => match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                Ok(date) => respond(session.valuation_as_of(provider, date)),
                Err(_) => fail(format!("Invalid date '{}', expected YYYY-MM-DD", date)),
            },
            None => respond(session.valuation(provider)),
        },
        "returns" => {
            let returns = session.returns(provider);
            if returns.is_empty() {
                fail("Not enough data: no return observations yet")
            } else {
                respond(returns)
            }
        }
        "risk" => match session.risk(provider) {
            Ok(report) => respond(report),
            Err(e) => fail(e),
        },
        "overview" => match session.overview(provider) {
            Ok(overview) => respond(overview),
            Err(e) => fail(e),
        },
        "macro" => respond(session.macro_indicators()),
        "help" => respond(json!({ "commands": SESSION_HELP.lines().collect::<Vec<_>>() })),
        other => fail(format!("Unknown command '{}'. Type 'help' for a list.", other)),
    }
}

fn handle_report(
    session: &mut Session,
    provider: &dyn PriceProvider,
    transactions: &[String],
    as_of: Option<NaiveDate>,
) -> String {
    for entry in transactions {
        let recorded = entry
            .parse::<EntryForm>()
            .and_then(|form| session.record(form).map(|_| ()));
        if let Err(e) = recorded {
            return fail(format!("{}: {}", entry, e));
        }
    }

    match session.overview(provider) {
        Ok(mut overview) => {
            if let Some(date) = as_of {
                overview.valuation = session.valuation_as_of(provider, date);
            }
            respond(overview)
        }
        Err(e) => fail(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(output: &str) -> serde_json::Value {
        serde_json::from_str(output).unwrap()
    }

    #[test]
    fn test_error_json_escapes_message() {
        let output = error_json("bad \"quote\" and \\ backslash\nnewline");
        let value = parse(&output);

        assert_eq!(value["ok"], false);
        assert_eq!(value["error"], "bad \"quote\" and \\ backslash\nnewline");
    }

    #[test]
    fn test_value_at_earliest_date() {
        let mut session = Session::default();
        let provider = InMemoryPriceProvider::new();
        handle_command(&mut session, &provider, "buy AAPL 10 100 2024-01-02");

        let command = format!("value {}", NaiveDate::MIN.format("%Y-%m-%d"));
        let value = parse(&handle_command(&mut session, &provider, &command));

        assert_eq!(value["ok"], true);
        assert_eq!(value["data"]["total"], 0.0);
    }

    #[test]
    fn test_unknown_command_fails() {
        let mut session = Session::default();
        let provider = InMemoryPriceProvider::new();
        let value = parse(&handle_command(&mut session, &provider, "frobnicate"));

        assert_eq!(value["ok"], false);
        assert!(value["error"].as_str().unwrap().contains("frobnicate"));
    }
}
