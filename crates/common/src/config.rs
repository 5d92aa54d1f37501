//! Dashboard configuration types.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashConfig {
    /// Base URL of the narrative lookup backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Reference symbol whose price series anchors the chart.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Color palette; its length caps the number of active searches.
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,

    /// Color used for the reference price series.
    #[serde(default = "default_price_color")]
    pub price_color: String,

    /// HTTP timing parameters.
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Timing configuration (all values in seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// HTTP request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_backend_url() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_symbol() -> String {
    "BTC-USD".into()
}

fn default_price_color() -> String {
    "#90caf9".into()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_palette() -> Vec<String> {
    vec![
        "#d500f9".into(),
        "#f50057".into(),
        "#00a152".into(),
        "#ff6d00".into(),
        "#ffc400".into(),
        "#ffffff".into(),
    ]
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            symbol: default_symbol(),
            palette: default_palette(),
            price_color: default_price_color(),
            timing: TimingConfig::default(),
        }
    }
}
