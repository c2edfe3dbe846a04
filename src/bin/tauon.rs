//! tauon CLI - configuration-driven API conformance checks.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::exit;
use tauon::{config, resolver, Reporter, ReqwestExecutor, Runner};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Exit code for config/IO errors. Failure counts are capped below
/// this value, so it can never collide with a failed-test count.
const CONFIG_ERROR_EXIT: i32 = 255;

/// Map a failed-test count to an exit code. Unix exit codes are
/// 8-bit, so large counts are capped at 254; 255 stays reserved
/// for config errors.
fn failure_exit_code(failed: usize) -> i32 {
    i32::try_from(failed).unwrap_or(254).min(254)
}

/// Run declarative HTTP conformance tests from a JSON document.
#[derive(Parser, Debug)]
#[command(name = "tauon", version, about)]
struct Cli {
    /// Path to the JSON test document.
    test_file: PathBuf,

    /// Output detail: 0 = one line per host, 1 = markers only,
    /// 2 = markers plus failure details.
    #[arg(
        short = 'v',
        long = "verbose-level",
        default_value_t = 2,
        value_parser = clap::value_parser!(u8).range(0..=2)
    )]
    verbose_level: u8,

    /// Override the document's target host.
    #[arg(long = "host")]
    host: Option<String>,

    /// Extra global headers (KEY=VALUE, repeatable); override
    /// document-level headers on conflict.
    #[arg(long = "headers", value_name = "KEY=VALUE", num_args = 1..)]
    headers: Vec<String>,

    /// Per-request timeout in seconds; overrides the document's
    /// `timeout` key.
    #[arg(short = 't', long = "timeout")]
    timeout: Option<u64>,
}

fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load, validate, and run the document. Returns the failed-test
/// count, which becomes the process exit code.
async fn run(args: Cli) -> Result<usize> {
    let document = config::load_document(&args.test_file)?;
    let host = config::effective_host(&document, args.host.as_deref())?;

    let cli_headers = config::parse_header_overrides(&args.headers)?;
    let global_headers = config::effective_headers(&document, &cli_headers);

    // Validate everything before executing anything.
    let cases = resolver::resolve(&document, &host, &global_headers)?;

    let timeout = args
        .timeout
        .or(document.timeout)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let executor = Box::new(ReqwestExecutor::new(timeout)?);
    let mut runner = Runner::new(executor, Reporter::new(args.verbose_level));

    let summary = runner.run(&host, &cases).await;
    Ok(summary.failed)
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    init_tracing();

    let code = match run(args).await {
        Ok(failed) => failure_exit_code(failed),
        Err(err) => {
            error!("{err:#}");
            CONFIG_ERROR_EXIT
        }
    };
    exit(code)
}
