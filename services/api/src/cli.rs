use crate::demo::{run_demo, DemoArgs};
use crate::report::{run_audit, run_validate, AuditArgs, ValidateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use haken_contracts::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Haken Contract Validator",
    about = "Validate and audit labor dispatch contracts from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Validate one candidate contract against a ceiling and existing contracts
    Validate(ValidateArgs),
    /// Audit a contract book as of a given date
    Audit(AuditArgs),
    /// Walk through the reference dispatch scenarios
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON contract book (factories and contracts) to preload
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Validate(args) => run_validate(args),
        Command::Audit(args) => run_audit(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["haken-contracts-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn audit_accepts_an_explicit_as_of() {
        let cli = Cli::try_parse_from([
            "haken-contracts-api",
            "audit",
            "--input",
            "book.json",
            "--as-of",
            "2025-06-01",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Audit(args)) => {
                assert_eq!(args.input, PathBuf::from("book.json"));
                assert_eq!(
                    args.as_of,
                    chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn malformed_dates_are_rejected_by_the_parser() {
        let result = Cli::try_parse_from([
            "haken-contracts-api",
            "audit",
            "--input",
            "book.json",
            "--as-of",
            "June 1st",
        ]);
        assert!(result.is_err());
    }
}
