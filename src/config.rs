use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Parser;
use reqwest::Url;
use std::{env, path::PathBuf};

/// Environment variable holding the upload endpoint.
pub const ENDPOINT_ENV: &str = "VIDEO_UPLOAD_ENDPOINT";

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub endpoint: String,
}

/// Command-line arguments: configuration plus the values to fill the form with.
#[derive(Parser, Debug)]
#[command(author, version, about = "Upload a video with title, location and schedule")]
pub struct Args {
    /// Upload endpoint URL (overrides VIDEO_UPLOAD_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Video title
    #[arg(long, default_value = "")]
    pub title: String,

    /// Where the video was recorded or will be shown
    #[arg(long, default_value = "")]
    pub location: String,

    /// Scheduled start time, RFC 3339 (defaults to now)
    #[arg(long)]
    pub start: Option<DateTime<Utc>>,

    /// Override the MIME type guessed from the file extension
    #[arg(long)]
    pub format: Option<String>,

    /// Accept the terms and conditions
    #[arg(long)]
    pub accept_terms: bool,

    /// Media file(s) to attach; only the first one is uploaded
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and the form values.
    pub fn from_env_and_args() -> Result<(Self, Args)> {
        let args = Args::parse();

        let env_endpoint = match env::var(ENDPOINT_ENV) {
            Ok(value) => Some(value),
            Err(env::VarError::NotPresent) => None,
            Err(err) => return Err(err).context(format!("reading {}", ENDPOINT_ENV)),
        };

        let cfg = Self {
            endpoint: resolve_endpoint(args.endpoint.clone(), env_endpoint)?,
        };

        Ok((cfg, args))
    }
}

/// CLI value wins over the environment. The result must be an absolute
/// http(s) URL.
pub fn resolve_endpoint(cli: Option<String>, env_value: Option<String>) -> Result<String> {
    let Some(raw) = cli.or(env_value).filter(|v| !v.trim().is_empty()) else {
        bail!(
            "no upload endpoint configured; pass --endpoint or set {}",
            ENDPOINT_ENV
        );
    };

    let url = Url::parse(raw.trim())
        .with_context(|| format!("parsing upload endpoint `{}`", raw))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("upload endpoint must use http or https, got `{}`", url.scheme());
    }

    Ok(url.to_string())
}
