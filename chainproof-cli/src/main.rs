//! Chainproof CLI - verify notarized log archives against the public ledger

mod logger;
mod output;
mod request;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chainproof_core::{LedgerConfig, ProgressFn, reconcile};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "chainproof",
    version,
    about = "Verify that a log archive was notarized on the public ledger"
)]
struct Cli {
    /// Verification ticket file (JSON)
    #[arg(long, value_name = "FILE")]
    ticket: Option<PathBuf>,

    /// Log archive (ZIP) to verify
    #[arg(long, value_name = "FILE")]
    archive: PathBuf,

    /// Owner address (alternative to --ticket)
    #[arg(long)]
    owner: Option<String>,

    /// Namespace (alternative to --ticket)
    #[arg(long)]
    namespace: Option<String>,

    /// First day of the window, YYYY-MM-DD (alternative to --ticket)
    #[arg(long)]
    date_start: Option<String>,

    /// Last day of the window, YYYY-MM-DD (alternative to --ticket)
    #[arg(long)]
    date_end: Option<String>,

    /// Ledger gateway base URL
    #[arg(long, env = "CHAINPROOF_GATEWAY", default_value = "https://arweave.net")]
    gateway: String,

    /// App-Name tag value to filter on
    #[arg(long, env = "CHAINPROOF_APP_NAME", default_value = "chainproof")]
    app_name: String,

    /// Records per ledger page
    #[arg(long, default_value_t = 100)]
    page_size: u32,

    /// Emit the report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logger::init_logger(&cli.log_level);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    // 1. Resolve the verification request (ticket file > flags > prompts)
    let flags = request::RequestFlags {
        owner: cli.owner,
        namespace: cli.namespace,
        date_start: cli.date_start,
        date_end: cli.date_end,
    };
    let verification = request::resolve(cli.ticket.as_deref(), flags, request::stdin_prompt)?;

    // 2. Load the archive
    let archive = std::fs::read(&cli.archive)
        .with_context(|| format!("Failed to read archive {}", cli.archive.display()))?;
    tracing::debug!(bytes = archive.len(), "Loaded archive");

    // 3. Reconcile against the ledger
    let client = LedgerConfig::new(cli.gateway.as_str())
        .with_app_name(cli.app_name.as_str())
        .with_page_size(cli.page_size)
        .build_client();

    let progress: Arc<ProgressFn> = if cli.quiet {
        Arc::new(|_: &str| {})
    } else {
        Arc::new(|msg: &str| eprintln!("{msg}"))
    };

    let report = reconcile(&client, &verification, archive, progress).await?;

    // 4. Render the report
    if cli.json {
        println!("{}", output::render_json(&report)?);
    } else {
        println!("{}", output::render_human(&report));
    }

    Ok(report.is_clean())
}
