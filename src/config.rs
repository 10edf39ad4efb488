use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap_serde_derive::ClapSerde;

#[derive(ClapSerde, Debug)]
pub struct Config {
    /// The address the listener binds to
    #[default("0.0.0.0".to_string())]
    #[arg(short, long, env)]
    pub(crate) address: String,

    /// The port the listener binds to
    #[default(8000)]
    #[arg(short, long, env)]
    pub(crate) port: u16,

    /// Path of the model artifact loaded at startup
    #[default(PathBuf::from("model/model.json"))]
    #[arg(short, long, env)]
    pub(crate) model_path: PathBuf,

    /// Maximum accepted request body size in bytes
    #[default(64 * 1024)]
    #[arg(short, long, env)]
    pub(crate) body_limit: usize,
}

impl Config {
    /// Reads a TOML configuration file. A file that does not exist yields `Ok(None)`, any other
    /// read or parse failure is an error.
    pub fn from_toml(path: &str) -> Result<Option<<Config as ClapSerde>::Opt>> {
        let str = match std::fs::read_to_string(path) {
            Ok(str) => str,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read configuration file {path}"))
            }
        };
        Self::from_toml_str(&str)
            .with_context(|| format!("Invalid configuration file {path}"))
            .map(Some)
    }

    pub fn from_toml_str(str: &str) -> Result<<Config as ClapSerde>::Opt> {
        let opt = toml::from_str(str).context("Failed to parse configuration")?;
        Ok(opt)
    }
}
