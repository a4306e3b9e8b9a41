//! # validate-json entry point
//!
//! Parses arguments, installs logging to stderr and maps the outcome of
//! [`run_validate`] to an exit code.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vjson_cli::validate::{run_validate, ValidateArgs};

/// Validate JSON and YAML documents against a JSON Schema Draft 04 schema.
///
/// Exits with status 0 and no output when the input is valid. Otherwise
/// prints the error to stderr and exits with status 1.
#[derive(Parser, Debug)]
#[command(name = "validate-json", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit log events as JSON lines instead of human-readable text.
    #[arg(long)]
    log_json: bool,

    #[command(flatten)]
    args: ValidateArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG, when set, takes precedence over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match run_validate(&cli.args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn cli_parse_required_flags() {
        let cli = Cli::try_parse_from(["validate-json", "--schema", "s.json", "--input", "d.json"])
            .unwrap();
        assert_eq!(cli.args.schema, Path::new("s.json"));
        assert_eq!(cli.args.input, Path::new("d.json"));
        assert!(!cli.args.network);
        assert!(!cli.args.strict_integer);
        assert_eq!(cli.args.fetch_timeout, 30);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.log_json);
    }

    #[test]
    fn cli_parse_log_json() {
        let cli = Cli::try_parse_from([
            "validate-json",
            "--log-json",
            "--schema",
            "s.json",
            "--input",
            "d.json",
        ])
        .unwrap();
        assert!(cli.log_json);
    }

    #[test]
    fn cli_parse_requires_schema_and_input() {
        assert!(Cli::try_parse_from(["validate-json", "--input", "d.json"]).is_err());
        assert!(Cli::try_parse_from(["validate-json", "--schema", "s.json"]).is_err());
    }

    #[test]
    fn cli_parse_extra_lists() {
        let cli = Cli::try_parse_from([
            "validate-json",
            "--schema",
            "s.json",
            "--input",
            "d.json",
            "--extra",
            "a.json b.yaml",
            "--extra",
            "c.json",
            "-n",
            "--fetch-timeout",
            "5",
            "--strict-integer",
            "-vv",
        ])
        .unwrap();
        let extra: Vec<_> = cli.args.extra_files().collect();
        assert_eq!(extra, [Path::new("a.json"), Path::new("b.yaml"), Path::new("c.json")]);
        assert!(cli.args.network);
        assert!(cli.args.strict_integer);
        assert_eq!(cli.args.fetch_timeout, 5);
        assert_eq!(cli.verbose, 2);
    }
}
