//! Glacier Tool - tree hashes and request signatures from the command line.
//!
//! # Usage
//!
//! ```text
//! glacier-tool treehash [FILE]...
//! glacier-tool sign METHOD URL [BODY_FILE]
//! ```
//!
//! `treehash` prints the tree hash, linear SHA-256, and length of each file,
//! or of standard input when no file is given. `sign` prints the headers of a
//! signed request without sending it.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GLACIER_REGION` | `us-east-1` | Region requests are scoped to |
//! | `GLACIER_SERVICE` | `glacier` | Service requests are scoped to |
//! | `AWS_ACCESS_KEY_ID` | *(unset)* | Access key for `sign` (`ACCESS_KEY` also accepted) |
//! | `AWS_SECRET_ACCESS_KEY` | *(unset)* | Secret key for `sign` (`SECRET_KEY` also accepted) |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use glacier_auth::RequestSigner;
use glacier_auth::sigv4::format_amz_date;
use glacier_core::{Credentials, GlacierConfig};
use glacier_treehash::{Checksums, checksums, checksums_async};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Glacier API version sent with every signed request.
const GLACIER_API_VERSION: &str = "2012-06-01";

/// Tree hashes and request signatures for the Glacier API.
#[derive(Clone, Debug, Parser)]
#[command(name = "glacier-tool", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Print tree hash, linear SHA-256, and length of each file.
    #[command(name = "treehash", alias = "th")]
    TreeHash {
        /// Files to hash; standard input when none is given.
        files: Vec<PathBuf>,
    },
    /// Print the headers of a signed request without sending it.
    #[command(name = "sign")]
    Sign {
        /// HTTP method, such as GET or PUT.
        method: String,
        /// Full request URL.
        url: String,
        /// File whose content becomes the request body.
        body: Option<PathBuf>,
    },
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
/// Logs go to stderr so stdout carries only results.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Read credentials from `ACCESS_KEY` / `SECRET_KEY`, falling back to the
/// standard AWS variables.
fn credentials_from_env() -> Result<Credentials> {
    let access_key = std::env::var("ACCESS_KEY")
        .or_else(|_| std::env::var("AWS_ACCESS_KEY_ID"))
        .context("AWS_ACCESS_KEY_ID is not set")?;
    let secret_key = std::env::var("SECRET_KEY")
        .or_else(|_| std::env::var("AWS_SECRET_ACCESS_KEY"))
        .context("AWS_SECRET_ACCESS_KEY is not set")?;

    Ok(Credentials::new(access_key, secret_key))
}

fn format_checksums(checksums: &Checksums, label: &str) -> String {
    format!(
        "{}  {}  {}  {label}",
        checksums.tree_hash, checksums.linear_hash, checksums.content_length
    )
}

async fn run_treehash(paths: Vec<PathBuf>) -> Result<()> {
    if paths.is_empty() {
        let checksums = checksums_async(Box::pin(tokio::io::stdin()))
            .await
            .context("failed to hash standard input")?;
        println!("{}", format_checksums(&checksums, "-"));
        return Ok(());
    }

    for path in paths {
        let file = tokio::fs::File::open(&path)
            .await
            .with_context(|| format!("cannot open {}", path.display()))?;
        let checksums = checksums_async(file)
            .await
            .with_context(|| format!("failed to hash {}", path.display()))?;
        println!("{}", format_checksums(&checksums, &path.display().to_string()));
    }

    Ok(())
}

/// Build a request carrying the headers Glacier expects, ready for signing.
fn build_request(method: &str, url: &str, body: Vec<u8>) -> Result<http::Request<Vec<u8>>> {
    let mut builder = http::Request::builder()
        .method(method)
        .uri(url)
        .header("x-amz-date", format_amz_date(&Utc::now()))
        .header("x-amz-glacier-version", GLACIER_API_VERSION);

    if !body.is_empty() {
        let checksums = checksums(body.as_slice()).context("failed to hash request body")?;
        debug!(
            content_length = checksums.content_length,
            chunk_count = checksums.chunk_count,
            "Hashed request body"
        );
        builder = builder
            .header("x-amz-content-sha256", checksums.linear_hash)
            .header("x-amz-sha256-tree-hash", checksums.tree_hash.to_hex());
    }

    builder
        .body(body)
        .with_context(|| format!("invalid request: {method} {url}"))
}

async fn run_sign(
    config: &GlacierConfig,
    method: &str,
    url: &str,
    body: Option<PathBuf>,
) -> Result<()> {
    let signer = RequestSigner::from_config(credentials_from_env()?, config)?;

    let body = match body {
        Some(path) => tokio::fs::read(&path)
            .await
            .with_context(|| format!("cannot read {}", path.display()))?,
        None => Vec::new(),
    };

    let mut request = build_request(method, url, body)?;
    signer.sign(&mut request)?;

    println!("{} {}", request.method(), request.uri());
    for (name, value) in request.headers() {
        println!("{name}: {}", String::from_utf8_lossy(value.as_bytes()));
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = GlacierConfig::from_env();
    init_tracing(&config.log_level)?;

    info!(
        region = %config.region,
        service = %config.service,
        "starting glacier-tool",
    );

    match cli.command {
        Command::TreeHash { files } => run_treehash(files).await,
        Command::Sign { method, url, body } => run_sign(&config, &method, &url, body).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("glacier-tool").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn test_should_have_valid_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_should_parse_treehash_with_files() {
        assert_eq!(
            parse(&["treehash", "a.bin", "b.bin"]).unwrap(),
            Command::TreeHash {
                files: vec![PathBuf::from("a.bin"), PathBuf::from("b.bin")]
            }
        );
    }

    #[test]
    fn test_should_parse_treehash_without_files_as_stdin() {
        assert_eq!(
            parse(&["treehash"]).unwrap(),
            Command::TreeHash { files: Vec::new() }
        );
    }

    #[test]
    fn test_should_parse_sign_with_optional_body() {
        assert_eq!(
            parse(&["sign", "GET", "https://example.com/-/vaults"]).unwrap(),
            Command::Sign {
                method: "GET".to_owned(),
                url: "https://example.com/-/vaults".to_owned(),
                body: None,
            }
        );
        assert_eq!(
            parse(&["sign", "POST", "https://example.com/", "archive.bin"]).unwrap(),
            Command::Sign {
                method: "POST".to_owned(),
                url: "https://example.com/".to_owned(),
                body: Some(PathBuf::from("archive.bin")),
            }
        );
    }

    #[test]
    fn test_should_reject_bad_arguments() {
        assert!(parse(&["sign", "GET"]).is_err());
        assert!(parse(&["sign", "GET", "https://example.com/", "a", "b"]).is_err());
        assert!(parse(&["upload"]).is_err());
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn test_should_add_checksum_headers_for_body() {
        let request = build_request(
            "POST",
            "https://glacier.us-east-1.amazonaws.com/-/vaults/examplevault/archives",
            b"Hello World".to_vec(),
        )
        .unwrap();

        let headers = request.headers();
        assert_eq!(headers["x-amz-glacier-version"], GLACIER_API_VERSION);
        assert_eq!(
            headers["x-amz-sha256-tree-hash"],
            "a591a6d40bf420404a011733cfb7b190d62c65bf0bcda32b57b277d9ad9f146e"
        );
        assert_eq!(
            headers["x-amz-content-sha256"],
            "a591a6d40bf420404a011733cfb7b190d62c65bf0bcda32b57b277d9ad9f146e"
        );
        assert!(headers.contains_key("x-amz-date"));
    }

    #[test]
    fn test_should_omit_checksum_headers_without_body() {
        let request = build_request("GET", "https://example.com/-/vaults", Vec::new()).unwrap();
        assert!(!request.headers().contains_key("x-amz-sha256-tree-hash"));
    }

    #[test]
    fn test_should_sign_built_request() {
        let signer = RequestSigner::new(
            Credentials::new("AKIDEXAMPLE", "secret"),
            glacier_core::Region::US_EAST_1,
            "glacier",
        );
        let mut request = build_request(
            "PUT",
            "https://glacier.us-east-1.amazonaws.com/-/vaults/examplevault",
            Vec::new(),
        )
        .unwrap();

        let signature = signer.sign(&mut request).unwrap();
        let auth = request.headers()["authorization"].to_str().unwrap();
        assert!(auth.contains("/us-east-1/glacier/aws4_request"));
        assert!(auth.ends_with(signature.as_str()));
    }
}
