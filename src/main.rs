//! firecrawl-pipes main entry point
//!
//! Command-line front end for the Firecrawl pipelines: crawl a site, check a
//! crawl job, scrape a page, map a site, extract structured data, or answer a
//! free-text chat message.

use anyhow::Context;
use clap::{Parser, Subcommand};
use firecrawl_pipes::api::OutputFormat;
use firecrawl_pipes::config::{load_config_from_env, load_config_with_hash, mask_api_key, Config};
use firecrawl_pipes::message::parse_path_list;
use firecrawl_pipes::{CancellationToken, Pipelines};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// firecrawl-pipes: thin pipelines over the Firecrawl API
///
/// The API key comes from the config file or FIRECRAWL_API_KEY. Press
/// Ctrl-C to stop waiting on a running job.
#[derive(Parser, Debug)]
#[command(name = "firecrawl-pipes")]
#[command(version = "1.0.0")]
#[command(about = "Crawl, scrape, map and extract websites with Firecrawl", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (environment only when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a website and print the content of every page
    Crawl {
        url: String,

        /// Maximum number of pages to crawl
        #[arg(long)]
        limit: Option<u32>,

        /// Maximum link depth from the start URL
        #[arg(long)]
        max_depth: Option<u32>,

        /// Comma-separated path patterns to include
        #[arg(long)]
        include: Option<String>,

        /// Comma-separated path patterns to exclude
        #[arg(long)]
        exclude: Option<String>,

        /// Content format to print (markdown, html, rawHtml, links)
        #[arg(long, value_parser = parse_format)]
        format: Option<OutputFormat>,
    },

    /// Check the status of a crawl job without waiting
    Status { job_id: String },

    /// Scrape a single page
    Scrape {
        url: String,

        /// Content format to print (markdown, html, rawHtml, links)
        #[arg(long, value_parser = parse_format)]
        format: Option<OutputFormat>,
    },

    /// List the URLs of a website
    Map {
        url: String,

        /// Only return URLs related to this term
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Extract structured data from one or more pages
    Extract {
        #[arg(required = true)]
        urls: Vec<String>,

        /// What to extract
        #[arg(long, default_value = "")]
        prompt: String,

        /// JSON schema the extracted data should follow
        #[arg(long)]
        schema: Option<String>,
    },

    /// Check the status of an extract job without waiting
    ExtractStatus { job_id: String },

    /// Answer a free-text message the way a chat host would
    Ask { message: Vec<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load(cli.config.as_ref())?;
    tracing::debug!(
        "Using {} with key {}",
        config.api.base_url,
        mask_api_key(&config.api.api_key)
    );

    let pipelines = Pipelines::new(config).context("invalid configuration")?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    let output = run(&pipelines, cli.command, &cancel).await?;
    println!("{}", output);

    Ok(())
}

/// Loads the configuration file when given, otherwise the environment
fn load(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => load_config_from_env().context("failed to load configuration from environment"),
    }
}

async fn run(
    pipelines: &Pipelines,
    command: Command,
    cancel: &CancellationToken,
) -> anyhow::Result<String> {
    let output = match command {
        Command::Crawl {
            url,
            limit,
            max_depth,
            include,
            exclude,
            format,
        } => {
            let mut request = pipelines.crawl_request(url);
            if let Some(limit) = limit {
                request.limit = limit;
            }
            if let Some(max_depth) = max_depth {
                request.max_depth = max_depth;
            }
            if let Some(include) = include {
                request.include_paths = parse_path_list(&include);
            }
            if let Some(exclude) = exclude {
                request.exclude_paths = parse_path_list(&exclude);
            }
            if let Some(format) = format {
                request.scrape_options.formats = vec![format];
            }
            pipelines.crawl_with(&request, cancel).await?
        }
        Command::Status { job_id } => pipelines.crawl_status(&job_id, cancel).await?,
        Command::Scrape { url, format } => {
            let mut request = pipelines.scrape_request(url);
            if let Some(format) = format {
                request.options.formats = vec![format];
            }
            pipelines.scrape(&request, cancel).await?
        }
        Command::Map { url, search } => {
            let request = pipelines.map_request(url, search);
            pipelines.map(&request, cancel).await?
        }
        Command::Extract {
            urls,
            prompt,
            schema,
        } => {
            let schema = schema
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .context("--schema is not valid JSON")?;
            let request = pipelines.extract_request(urls, &prompt, schema);
            pipelines.extract(&request, cancel).await?
        }
        Command::ExtractStatus { job_id } => pipelines.extract_status(&job_id, cancel).await?,
        Command::Ask { message } => pipelines.respond(&message.join(" "), cancel).await?,
    };

    Ok(output)
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    OutputFormat::parse(s).ok_or_else(|| {
        format!(
            "unknown format '{}' (expected markdown, html, rawHtml or links)",
            s
        )
    })
}

/// Sets up logging based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("firecrawl_pipes=info,warn"),
            1 => EnvFilter::new("firecrawl_pipes=debug,info"),
            2 => EnvFilter::new("firecrawl_pipes=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
