//! Configuration loader — merges defaults, config.toml, and env vars.

use common::{DashConfig, Error};
use std::path::Path;

fn validate_config(config: &DashConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.backend_url.trim().is_empty() {
        issues.push("backend_url must not be empty".into());
    } else if !config.backend_url.starts_with("http://")
        && !config.backend_url.starts_with("https://")
    {
        issues.push("backend_url must be an http(s) URL".into());
    }
    if config.symbol.trim().is_empty() {
        issues.push("symbol must not be empty".into());
    }
    if config.palette.is_empty() {
        issues.push("palette must contain at least one color".into());
    }
    let mut colors = config.palette.clone();
    colors.sort();
    colors.dedup();
    if colors.len() != config.palette.len() {
        issues.push("palette colors must be unique".into());
    }
    if config.timing.request_timeout_secs == 0 {
        issues.push("timing.request_timeout_secs must be > 0".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load dashboard configuration from environment and optional config file.
pub fn load_config() -> Result<DashConfig, Error> {
    // 1. Load .env from the project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = DashConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(url) = std::env::var("NARRATIVE_BACKEND_URL") {
        config.backend_url = url;
    }
    if let Ok(symbol) = std::env::var("NARRATIVE_SYMBOL") {
        config.symbol = symbol;
    }
    if let Ok(raw) = std::env::var("NARRATIVE_REQUEST_TIMEOUT_SECS") {
        let parsed = raw.trim().parse::<u64>().map_err(|_| {
            Error::Config("NARRATIVE_REQUEST_TIMEOUT_SECS must be an integer > 0".into())
        })?;
        if parsed == 0 {
            return Err(Error::Config(
                "NARRATIVE_REQUEST_TIMEOUT_SECS must be an integer > 0".into(),
            ));
        }
        config.timing.request_timeout_secs = parsed;
    }

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}
