use std::env;

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;

const DEFAULT_URL: &str = "http://127.0.0.1:8000/health";

#[derive(Deserialize)]
struct HealthStatus {
    model_loaded: bool,
}

fn main() -> Result<()> {
    let url = env::args().nth(1).unwrap_or_else(|| DEFAULT_URL.to_string());
    let url = Url::parse(&url).with_context(|| format!("Invalid URL {url}"))?;

    let response = reqwest::blocking::get(url)?;
    if !response.status().is_success() {
        bail!("Health check failed with status {}", response.status());
    }

    let status: HealthStatus = response
        .json()
        .context("Health check returned an unexpected body")?;
    if !status.model_loaded {
        bail!("Service is up but reports no model loaded");
    }

    Ok(())
}
