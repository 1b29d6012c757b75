//! CLI binary for doc-insights.
//!
//! Without a file argument it serves the web UI; with one it runs the whole
//! flow once and prints the report to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use doc_insights::web::{self, AppState};
use doc_insights::{InsightsConfig, PromptTemplate, SummaryStyle, Workflow};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve the web UI on http://127.0.0.1:8501
  doc-insights

  # One-shot report for a file, printed to stdout
  doc-insights report.pdf --style executive > report.md

  # Use another backend through edgequake-llm
  doc-insights --provider ollama --model llama3.2 notes.txt

  # Print the prompt template and exit
  doc-insights --show-template

ENVIRONMENT VARIABLES:
  HUGGINGFACEHUB_API_TOKEN  Bearer token for the Hugging Face Inference API
  DOC_INSIGHTS_MODEL        Model id
  DOC_INSIGHTS_PROVIDER     edgequake-llm provider instead of Hugging Face
  DOC_INSIGHTS_API_BASE     Inference API base URL
  DOC_INSIGHTS_TEMPLATE     Prompt template path
  DOC_INSIGHTS_BIND         Web UI listen address
  DOC_INSIGHTS_MAX_CHARS    Document characters kept in the prompt
  PDFIUM_LIB_PATH           Path to libpdfium when it is not installed system-wide

A .env file in the working directory is loaded first.
"#;

#[derive(Parser, Debug)]
#[command(
    name = "doc-insights",
    version,
    about = "Generate summary, keywords and questions for a PDF or TXT document",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document to process once. Omit to serve the web UI.
    file: Option<PathBuf>,

    /// Summary style for one-shot mode.
    #[arg(short, long, default_value = "brief")]
    style: SummaryStyle,

    /// Print the prompt template and exit.
    #[arg(long)]
    show_template: bool,

    #[arg(long, env = "HUGGINGFACEHUB_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "DOC_INSIGHTS_MODEL", default_value = doc_insights::config::DEFAULT_MODEL)]
    model: String,

    /// edgequake-llm provider name (openai, anthropic, ollama, ...).
    #[arg(long, env = "DOC_INSIGHTS_PROVIDER")]
    provider: Option<String>,

    #[arg(long, env = "DOC_INSIGHTS_API_BASE", default_value = doc_insights::config::DEFAULT_API_BASE)]
    api_base: String,

    #[arg(long, env = "DOC_INSIGHTS_TEMPLATE", default_value = doc_insights::config::DEFAULT_TEMPLATE_PATH)]
    template: PathBuf,

    #[arg(long, env = "DOC_INSIGHTS_BIND", default_value = "127.0.0.1:8501")]
    bind: SocketAddr,

    #[arg(long, env = "DOC_INSIGHTS_MAX_CHARS", default_value_t = 10_000)]
    max_chars: usize,

    #[arg(short, long)]
    verbose: bool,

    #[arg(short, long)]
    quiet: bool,
}

fn build_config(cli: &Cli) -> Result<InsightsConfig> {
    let mut builder = InsightsConfig::builder()
        .model(&cli.model)
        .api_token_opt(cli.token.clone())
        .api_base(&cli.api_base)
        .template_path(&cli.template)
        .max_document_chars(cli.max_chars);
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    Ok(builder.build()?)
}

fn spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

async fn run_once(cli: &Cli, workflow: &Workflow, path: &Path) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let bar = (!cli.quiet).then(|| {
        spinner(format!(
            "Generating {} summary, keywords & questions... Please wait.",
            cli.style
        ))
    });
    let result = workflow.run(&file_name, bytes, cli.style).await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    let output = result.context("Report generation failed")?;

    if output.truncated && !cli.quiet {
        eprintln!(
            "{} {}",
            yellow("⚠"),
            doc_insights::pipeline::compose::truncation_notice(workflow.config().max_document_chars)
        );
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(output.report.markdown.as_bytes())
        .context("Failed to write to stdout")?;

    if !cli.quiet {
        eprintln!(
            "{} Insights generated successfully!  {}",
            green("✔"),
            dim(&format!(
                "{} · {}ms",
                output.report.model, output.report.duration_ms
            ))
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || cli.file.is_some() {
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

    if cli.show_template {
        let template = PromptTemplate::load(&cli.template)?;
        print!("{}", template.as_str());
        return Ok(());
    }

    // Credential and client problems stop the process before any work.
    let config = build_config(&cli)?;
    let workflow = Workflow::from_config(config)?;

    match cli.file {
        Some(ref path) => run_once(&cli, &workflow, path).await,
        None => {
            let state = Arc::new(AppState::new(workflow));
            web::serve(cli.bind, state)
                .await
                .with_context(|| format!("Web server on {} failed", cli.bind))
        }
    }
}
