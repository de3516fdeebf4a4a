//! `tally` command line and HTTP front end.
//!
//! Every command resolves the same inputs before doing work:
//!
//! - an optional TOML config (`--config`) with `[parser]`, `[report]` and
//!   `[server]` sections
//! - the dictionary (`--dictionary`, `$TALLY_DICTIONARY_FILE` or inline JSON
//!   in `$TALLY_DICTIONARY`); a missing or malformed dictionary aborts
//!
//! Reports are built sequentially, one batch per invocation or request.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::AppConfig;
use http_api::HttpState;
use render::OutputFormat;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tally_parser::NameTokenizer;
use tally_protocol::serialize_json_pretty;
use tally_report::Processor;

mod config;
mod http_api;
mod pipeline;
mod render;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Count activity-log records against a name dictionary", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML config with [parser], [report] and [server] sections
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dictionary JSON file (env: TALLY_DICTIONARY_FILE, or inline TALLY_DICTIONARY)
    #[arg(long, global = true)]
    dictionary: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a report from .docx documents, .zip archives or .json tables
    Report(ReportArgs),

    /// Split labels into qualifier and name
    Tokenize(TokenizeArgs),

    /// Validate the dictionary and list its groups
    #[command(name = "check-dictionary")]
    CheckDictionary(CheckDictionaryArgs),

    /// Serve reports over HTTP (POST /report, POST /archive)
    ServeHttp(ServeArgs),
}

#[derive(Args)]
struct ReportArgs {
    /// Documents or archives, in report order
    #[arg(required_unless_present = "early")]
    paths: Vec<PathBuf>,

    /// Documents or archives whose records ending before the cutoff hour are dropped
    #[arg(long)]
    early: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args)]
struct TokenizeArgs {
    /// Raw labels
    #[arg(required = true)]
    labels: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CheckDictionaryArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address, e.g. 127.0.0.1:4000 (default: 0.0.0.0:$PORT, then 127.0.0.1:4000)
    #[arg(long)]
    bind: Option<String>,
}

#[derive(Serialize)]
struct TokenizedLabel<'a> {
    label: &'a str,
    #[serde(rename = "type")]
    kind: String,
    name: String,
}

#[derive(Serialize)]
struct DictionarySummary {
    groups: usize,
    names: usize,
    canonical: Vec<String>,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = AppConfig::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Report(args) => run_report(args, &config, cli.dictionary)?,
        Commands::Tokenize(args) => run_tokenize(args, &config)?,
        Commands::CheckDictionary(args) => run_check_dictionary(args, cli.dictionary)?,
        Commands::ServeHttp(args) => serve_http(args, config, cli.dictionary).await?,
    }

    Ok(())
}

fn build_processor(config: &AppConfig, dictionary: Option<PathBuf>) -> Result<Processor> {
    let dictionary = config::resolve_dictionary(dictionary.as_deref())?;
    let processor = Processor::from_config(dictionary, &config.parser, config.report.clone())?;
    log::debug!(
        "dictionary: {} group(s), {} name(s)",
        processor.dictionary().len(),
        processor.dictionary().identities().count()
    );
    Ok(processor)
}

fn run_report(args: ReportArgs, config: &AppConfig, dictionary: Option<PathBuf>) -> Result<()> {
    let processor = build_processor(config, dictionary)?;
    let files = pipeline::read_inputs(&args.paths, &args.early)?;
    let data = pipeline::process_files(&processor, &files);

    if !data.errors.is_empty() {
        log::warn!("{} file(s) skipped", data.errors.len());
    }

    let output = render::render(&data, args.format)?;
    print_stdout(output.trim_end())
}

fn run_tokenize(args: TokenizeArgs, config: &AppConfig) -> Result<()> {
    let tokenizer = NameTokenizer::from_config(&config.parser);
    let tokenized: Vec<TokenizedLabel<'_>> = args
        .labels
        .iter()
        .map(|label| {
            let qualified = tokenizer.tokenize(label);
            TokenizedLabel {
                label,
                kind: qualified.kind,
                name: qualified.name,
            }
        })
        .collect();

    if args.json {
        return print_stdout(&serialize_json_pretty(&tokenized)?);
    }

    let lines: Vec<String> = tokenized
        .iter()
        .map(|t| format!("{}\t{}", t.kind, t.name))
        .collect();
    print_stdout(&lines.join("\n"))
}

fn run_check_dictionary(args: CheckDictionaryArgs, dictionary: Option<PathBuf>) -> Result<()> {
    let dictionary = config::resolve_dictionary(dictionary.as_deref())?;
    let summary = DictionarySummary {
        groups: dictionary.len(),
        names: dictionary.identities().count(),
        canonical: dictionary
            .groups()
            .iter()
            .filter_map(|group| group.first())
            .map(ToString::to_string)
            .collect(),
    };

    if args.json {
        return print_stdout(&serialize_json_pretty(&summary)?);
    }

    let mut out = format!(
        "Dictionary OK: {} group(s), {} name(s)\n",
        summary.groups, summary.names
    );
    for (idx, group) in dictionary.groups().iter().enumerate() {
        let aliases = group.len().saturating_sub(1);
        out.push_str(&format!("{}. {}", idx + 1, summary.canonical[idx]));
        if aliases > 0 {
            out.push_str(&format!(" (+{aliases} alias(es))"));
        }
        out.push('\n');
    }
    print_stdout(out.trim_end())
}

async fn serve_http(args: ServeArgs, config: AppConfig, dictionary: Option<PathBuf>) -> Result<()> {
    let processor = build_processor(&config, dictionary)?;
    let bind = config::resolve_bind(args.bind.as_deref());

    let state = Arc::new(HttpState {
        processor,
        server: config.server,
    });
    let early_field = state.server.early_field.clone();
    let app = http_api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    let local_addr = listener.local_addr()?;
    let base_url = format!("http://{local_addr}");

    print_stdout(&format!("Serving reports: {base_url}/report"))?;
    print_stdout(&format!("Health endpoint: {base_url}/health"))?;
    print_stdout(&format!("Try: curl {base_url}/health"))?;
    print_stdout(&format!(
        "Try: curl -F files=@day.docx -F {early_field}=@night.docx '{base_url}/report?format=text'"
    ))?;
    print_stdout(&format!(
        "Try: curl --data-binary @batch.zip '{base_url}/archive?format=json'"
    ))?;

    axum::serve(listener, app).await?;
    Ok(())
}
