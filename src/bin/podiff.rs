//! CLI binary for podiff.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `CompareConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use podiff::{
    compare_to_file, ApiKey, CompareConfig, CompareProgressCallback, ProgressCallback, Stage,
    API_KEY_ENV_VAR, REPORT_FILE_NAME,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner that follows the pipeline's stage events.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Comparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl CompareProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_message(stage.to_string());
    }

    fn on_compare_complete(&self, _report_len: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Compare two orders, print the report, write po_so_comparison.pdf
  podiff purchase_order.pdf sales_order.pdf

  # Write the report PDF somewhere specific
  podiff po.pdf so.pdf -o reports/acme_q3.pdf

  # Use a different model
  podiff --model llama-3.3-70b-versatile po.pdf so.pdf

  # Any OpenAI-compatible endpoint
  podiff --base-url http://localhost:11434/v1 --api-key-env OLLAMA_KEY po.pdf so.pdf

  # Stats as JSON on stdout (report suppressed)
  podiff --json po.pdf so.pdf

ENVIRONMENT VARIABLES:
  GROQ_API_KEY          API key for the default (Groq) endpoint
  PODIFF_MODEL          Override the completion model
  PODIFF_BASE_URL       Override the API base URL

SETUP:
  1. Set API key:   export GROQ_API_KEY=gsk_...
  2. Compare:       podiff po.pdf so.pdf
"#;

/// Compare a Purchase Order against a Sales Order using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "podiff",
    version,
    about = "Compare a Purchase Order against a Sales Order using an LLM",
    long_about = "Extract text from a Purchase Order PDF and a Sales Order PDF, ask a \
chat-completion model for a structured field-by-field comparison, and write the cleaned \
report both to stdout and to a printable PDF.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Purchase Order PDF.
    po: PathBuf,

    /// Sales Order PDF.
    so: PathBuf,

    /// Write the report PDF to this path.
    #[arg(short, long, env = "PODIFF_OUTPUT", default_value = REPORT_FILE_NAME)]
    output: PathBuf,

    /// Completion model ID.
    #[arg(long, env = "PODIFF_MODEL")]
    model: Option<String>,

    /// Base URL of an OpenAI-compatible chat-completions API.
    #[arg(long, env = "PODIFF_BASE_URL")]
    base_url: Option<String>,

    /// Environment variable holding the API key.
    #[arg(long, default_value = API_KEY_ENV_VAR)]
    api_key_env: String,

    /// Max pages read per document.
    #[arg(long, env = "PODIFF_MAX_PAGES", default_value_t = 10)]
    max_pages: usize,

    /// Character budget per extracted text (exact prefix truncation).
    #[arg(long, env = "PODIFF_MAX_CHARS", default_value_t = 10_000)]
    max_chars: usize,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "PODIFF_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Completion request timeout in seconds.
    #[arg(long, env = "PODIFF_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "PODIFF_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Print run statistics as JSON instead of the report text.
    #[arg(long)]
    json: bool,

    /// Suppress the report on stdout (the PDF is still written).
    #[arg(long)]
    no_report: bool,

    /// Disable the spinner.
    #[arg(long, env = "PODIFF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PODIFF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PODIFF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // spinner provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    // The key is resolved before anything else: a missing key halts here,
    // with no file read and no request sent.
    let api_key = ApiKey::from_env_var(&cli.api_key_env)?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn CompareProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, api_key, progress_cb).await?;

    // ── Run comparison ───────────────────────────────────────────────────
    let output = compare_to_file(&cli.po, &cli.so, &cli.output, &config)
        .await
        .context("Comparison failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output.stats).context("Failed to serialise stats")?
        );
    } else if !cli.no_report {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.report.as_bytes())
            .context("Failed to write to stdout")?;
        if !output.report.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if !cli.quiet {
        eprintln!(
            "{}  report written to {}  {}",
            green("✔"),
            bold(&cli.output.display().to_string()),
            dim(&format!(
                "({} PO pages, {} SO pages, {}ms)",
                output.stats.po_pages, output.stats.so_pages, output.stats.total_duration_ms
            )),
        );
        if output.stats.duplicate_blocks_removed > 0 {
            eprintln!(
                "   {}",
                dim(&format!(
                    "{} duplicated section(s) removed",
                    output.stats.duplicate_blocks_removed
                )),
            );
        }
        if output.stats.input_tokens > 0 {
            eprintln!(
                "   {} tokens in  /  {} tokens out",
                dim(&output.stats.input_tokens.to_string()),
                dim(&output.stats.output_tokens.to_string()),
            );
        }
    }

    Ok(())
}

/// Map CLI args to `CompareConfig`.
async fn build_config(
    cli: &Cli,
    api_key: ApiKey,
    progress: Option<ProgressCallback>,
) -> Result<CompareConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {path:?}"))?,
        )
    } else {
        None
    };

    let mut builder = CompareConfig::builder(api_key)
        .max_pages(cli.max_pages)
        .max_doc_chars(cli.max_chars)
        .temperature(cli.temperature)
        .api_timeout_secs(cli.timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url.clone());
    }
    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
