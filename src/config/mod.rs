mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, path::PathBuf};
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads the YAML config named by `CONFIG_PATH` (or `config.yaml`), then
/// layers the environment on top. Call `dotenvy::dotenv()` first so values
/// from a local `.env` file are visible here.
pub async fn load() -> Result<Config> {
    let explicit = env::var("CONFIG_PATH").ok();
    let config_path = explicit
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    debug!("Loading configuration from: {}", config_path);

    let mut config = match tokio::fs::read_to_string(&config_path).await {
        Ok(config_str) => parse(&config_str)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
            info!("No {} found, using built-in defaults", DEFAULT_CONFIG_PATH);
            Config::default()
        }
        Err(e) => {
            return Err(Error::config(format!(
                "Failed to read {}: {}",
                config_path, e
            )));
        }
    };

    config.apply_overrides(|key| env::var(key).ok());
    config.validate()?;

    Ok(config)
}

pub fn parse(config_str: &str) -> Result<Config> {
    Ok(serde_yaml::from_str(config_str)?)
}

impl Config {
    /// Applies environment-style overrides. `lookup` is `std::env::var` in
    /// production; tests pass a closure over a map.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) =
            non_empty("REPLICATE_API_TOKEN").or_else(|| non_empty("REPLICATE_API_KEY"))
        {
            self.replicate.api_token = token.trim().to_string();
        }
        if let Some(base_url) = non_empty("REPLICATE_API_BASE") {
            self.replicate.base_url = base_url.trim().to_string();
        }
        if let Some(model) = non_empty("REPLICATE_MODEL") {
            self.replicate.model = model.trim().to_string();
        }
        if let Some(dir) = non_empty("TRYON_SCRATCH_DIR") {
            self.tryon.scratch_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.replicate.api_token.trim().is_empty() {
            return Err(Error::config(
                "Replicate API token is missing; set REPLICATE_API_TOKEN (e.g. in .env)",
            ));
        }
        if self.replicate.model.trim().is_empty() {
            return Err(Error::config("replicate.model must not be empty"));
        }
        if self.server.port == 0 {
            return Err(Error::config("server.port must not be 0"));
        }
        Ok(())
    }
}
