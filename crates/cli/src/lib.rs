//! # `formscout-cli` Library Crate
//!
//! Argument parsing and command handlers for the `formscout` binary.

use anyhow::Result;
use clap::{Parser, Subcommand};
use formscout::report::render_text;
use formscout::{
    ExtractError, ExtractionRequest, ExtractorRegistry, ScannerConfig, SurveyInfo, SurveyScanner,
    UserAction,
};
use formscout_web::{GatewayConfig, ProxyEndpoint, ProxyGateway};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

// --- CLI Argument Structs ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a survey page and print its metadata
    Extract(ExtractArgs),
    /// Print which platform a URL belongs to, without fetching it
    Detect(DetectArgs),
    /// List the platforms with a dedicated extraction strategy
    Platforms,
}

#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// The public survey URL.
    pub url: String,
    /// Print the result as JSON instead of text.
    #[arg(long)]
    pub json: bool,
    /// Proxy URL templates to try in order. `{url}` is replaced by the
    /// encoded target, `{raw_url}` by the target as-is.
    #[arg(long = "proxy", env = "FORMSCOUT_PROXIES", value_delimiter = ',')]
    pub proxies: Vec<String>,
    /// Timeout for a single proxy attempt, in milliseconds.
    #[arg(long, env = "FORMSCOUT_ATTEMPT_TIMEOUT_MS", default_value_t = 5_000)]
    pub attempt_timeout_ms: u64,
    /// Deadline for the whole extraction, in milliseconds.
    #[arg(long, env = "FORMSCOUT_DEADLINE_MS", default_value_t = 12_000)]
    pub deadline_ms: u64,
    /// Shortest body accepted from a proxy.
    #[arg(
        long,
        env = "FORMSCOUT_MIN_BODY_LEN",
        default_value_t = formscout::MIN_PLAUSIBLE_BODY_LEN
    )]
    pub min_body_len: usize,
    /// Skip the personal-data scan.
    #[arg(long)]
    pub no_personal_data_scan: bool,
}

#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// The URL to classify.
    pub url: String,
}

// --- JSON Error Output ---

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    action: UserAction,
}

/// A stable machine-readable code for each failure.
pub fn error_code(err: &ExtractError) -> &'static str {
    match err {
        ExtractError::InvalidUrl { .. } => "invalid_url",
        ExtractError::FormNotPublic { .. } => "form_not_public",
        ExtractError::AllProxiesExhausted { .. } => "all_proxies_exhausted",
        ExtractError::ExtractionTimeout(_) => "extraction_timeout",
        ExtractError::MissingFetcher | ExtractError::ClientBuild(_) => "internal",
    }
}

/// Renders a failure as `{"error": {"code", "message", "action"}}`.
pub fn format_error_json(err: &ExtractError) -> Result<String> {
    let response = ErrorResponse {
        error: ErrorBody {
            code: error_code(err),
            message: err.to_string(),
            action: err.user_action(),
        },
    };
    Ok(serde_json::to_string_pretty(&response)?)
}

// --- Public Entrypoint ---

/// The main entry point for the `formscout` binary.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Extract(args) => handle_extract(args).await,
        Commands::Detect(args) => handle_detect(args),
        Commands::Platforms => handle_platforms(),
    }
}

/// Builds the gateway settings from the command-line flags. An empty proxy
/// list keeps the built-in public proxies.
pub fn build_gateway_config(args: &ExtractArgs) -> GatewayConfig {
    let mut config = GatewayConfig {
        attempt_timeout_ms: args.attempt_timeout_ms,
        min_body_len: args.min_body_len,
        ..GatewayConfig::default()
    };
    let proxies: Vec<ProxyEndpoint> = args
        .proxies
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(ProxyEndpoint::from_template)
        .collect();
    if !proxies.is_empty() {
        config.proxies = proxies;
    }
    config
}

/// Renders a result as pretty JSON or as `Label: value` text.
pub fn format_output(info: &SurveyInfo, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(info)?)
    } else {
        Ok(render_text(info))
    }
}

// --- Command Handlers ---

async fn handle_extract(args: ExtractArgs) -> Result<()> {
    info!("Starting 'extract' command for {}", args.url);

    let gateway = ProxyGateway::new(build_gateway_config(&args))?;
    let scanner = SurveyScanner::builder()
        .fetcher(Arc::new(gateway))
        .config(ScannerConfig {
            deadline_ms: args.deadline_ms,
            personal_data_scan: !args.no_personal_data_scan,
        })
        .build()?;

    match scanner.extract(&ExtractionRequest::new(&args.url)).await {
        Ok(info) => {
            println!("{}", format_output(&info, args.json)?);
            Ok(())
        }
        Err(e) => {
            if args.json {
                println!("{}", format_error_json(&e)?);
            }
            Err(e.into())
        }
    }
}

fn handle_detect(args: DetectArgs) -> Result<()> {
    let platform = formscout::detect(&args.url);
    let status = if platform.is_supported() {
        "supported"
    } else {
        "generic metadata only"
    };
    println!("{} ({status})", platform.display_name());
    Ok(())
}

fn handle_platforms() -> Result<()> {
    let registry = ExtractorRegistry::with_defaults();
    for platform in registry.platforms() {
        println!(
            "{:<16} {}",
            platform.display_name(),
            registry.get(platform).describe()
        );
    }
    Ok(())
}
