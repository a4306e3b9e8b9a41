//! # Validate Command
//!
//! Loads the schema, pre-loads any extra documents, then validates the
//! input. The schema is meta-checked before anything else is read.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use vjson_schema::{Loader, Validator, ValidatorOptions};

use crate::document;
use crate::fetch::{HttpFetcher, DEFAULT_TIMEOUT_SECS};

/// Arguments for a validation run.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the schema to validate against.
    #[arg(long)]
    pub schema: PathBuf,

    /// Path to the JSON or YAML document to validate.
    #[arg(long)]
    pub input: PathBuf,

    /// Space-separated schema files to pre-load for remote references.
    /// Each must declare an "id". May be given more than once.
    #[arg(long, value_name = "FILES")]
    pub extra: Vec<String>,

    /// Fetch referenced schemas from remote hosts.
    #[arg(short = 'n', long)]
    pub network: bool,

    /// Timeout for each remote fetch, in seconds.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub fetch_timeout: u64,

    /// Require "integer" values to have no fractional part.
    #[arg(long)]
    pub strict_integer: bool,
}

impl ValidateArgs {
    /// Every extra file, in the order given.
    pub fn extra_files(&self) -> impl Iterator<Item = &Path> {
        self.extra
            .iter()
            .flat_map(|list| list.split_whitespace())
            .map(Path::new)
    }
}

/// Run one validation.
///
/// # Errors
///
/// Any read, parse, schema, resolution or validation failure. The message
/// is suitable for printing as-is.
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let schema = document::load(&args.schema)?;
    vjson_schema::check_schema(&schema).map_err(|e| anyhow!("Schema is not valid: {e}"))?;

    let loader = if args.network {
        let fetcher = HttpFetcher::new(Duration::from_secs(args.fetch_timeout))
            .context("failed to set up remote fetching")?;
        Loader::with_fetcher(Arc::new(fetcher))
    } else {
        Loader::new()
    };
    loader.enable_network_access(args.network);

    for path in args.extra_files() {
        let doc = document::load(path)?;
        let id = loader
            .add(doc)
            .with_context(|| format!("failed to pre-load {}", path.display()))?;
        tracing::info!(path = %path.display(), %id, "pre-loaded schema");
    }

    let mut options = ValidatorOptions::default();
    options.with_strict_integer(args.strict_integer);
    let validator = Validator::with_options(schema, Some(Arc::new(loader)), options)
        .map_err(|e| anyhow!("Schema is not valid: {e}"))?;

    let input = document::load(&args.input)?;
    if let Err(e) = validator.validate(&input) {
        bail!("{e}");
    }
    tracing::info!(input = %args.input.display(), "input is valid");
    Ok(())
}
