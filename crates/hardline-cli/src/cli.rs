//! CLI for the hardline resilient HTTP client.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use url::Url;

use hardline_core::config;
use hardline_core::outcome::Outcome;
use hardline_core::request::{Body, Method, Request, TIMEOUT_HEADER};
use hardline_core::stack;
use hardline_core::transport::Transport;

/// Top-level CLI for the hardline HTTP client.
#[derive(Debug, Parser)]
#[command(name = "hardline")]
#[command(about = "hardline: resilient HTTP client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a URL through the full resilience stack and print the body.
    Fetch {
        /// HTTP or HTTPS URL to fetch.
        url: String,

        /// Request method.
        #[arg(long, short = 'X', default_value = "GET")]
        method: String,

        /// Extra request header, as "Name: value". Repeatable.
        #[arg(long, short = 'H', value_name = "HEADER")]
        header: Vec<String>,

        /// Request body sent with the request.
        #[arg(long, short = 'd', value_name = "DATA")]
        data: Option<String>,

        /// Write the response body to this file instead of stdout.
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,

        /// Per-request timeout in milliseconds (overrides the config default).
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,

        /// Skip the retry layer; transient failures surface immediately.
        #[arg(long)]
        no_retry: bool,
    },

    /// Print the resolved configuration file path and contents.
    Config,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                url,
                method,
                header,
                data,
                output,
                timeout_ms,
                no_retry,
            } => {
                let mut transport = if no_retry {
                    stack::build_transport_without_retry(&cfg)
                } else {
                    stack::build_transport(&cfg)
                };
                let request = build_request(&cfg, &url, &method, &header, data, timeout_ms)?;
                let outcome = transport.attempt(request);
                report(outcome, output)
            }
            CliCommand::Config => {
                let path = config::config_path()?;
                println!("{}", path.display());
                if path.exists() {
                    print!("{}", fs::read_to_string(&path)?);
                }
                Ok(())
            }
        }
    }
}

fn build_request(
    cfg: &config::HardlineConfig,
    url: &str,
    method: &str,
    headers: &[String],
    data: Option<String>,
    timeout_ms: Option<u64>,
) -> Result<Request> {
    let url = Url::parse(url).with_context(|| format!("invalid URL: {url}"))?;
    let method = Method::from_str(method)?;
    let mut request = Request::new(url).with_method(method);
    for raw in headers {
        let (name, value) = raw
            .split_once(':')
            .with_context(|| format!("header must be \"Name: value\", got {raw:?}"))?;
        request = request.with_header(name.trim(), value.trim());
    }
    if let Some(ms) = timeout_ms.or(cfg.default_timeout_ms) {
        request = request.with_header(TIMEOUT_HEADER, ms.to_string());
    }
    if let Some(data) = data {
        request = request.with_body(Body::Bytes(data.into_bytes()));
    }
    Ok(request)
}

/// Print the outcome. The body goes to stdout (or `output`); everything
/// else is a status line on stderr. Non-success outcomes exit nonzero.
fn report(outcome: Outcome, output: Option<PathBuf>) -> Result<()> {
    match &outcome {
        Outcome::Success { response, .. } => {
            let body = response.body().bytes()?;
            match output {
                Some(path) => fs::write(&path, &body)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => io::stdout().write_all(&body)?,
            }
            tracing::info!(status = response.status(), bytes = body.len(), "fetched");
            Ok(())
        }
        other => bail!("{other}"),
    }
}
