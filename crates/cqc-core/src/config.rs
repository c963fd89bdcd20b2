//! `cqc.toml` + `CQC_*` env var configuration.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "0.0.0.0";
/// Per-turn budget (spec §5): the AI Oracle gets at most 10s of this.
pub const TURN_BUDGET_MS: u64 = 15_000;
pub const ORACLE_TIMEOUT_MS: u64 = 10_000;
pub const SESSION_TTL_SECS: u64 = 24 * 3600;
pub const GHOST_TICK_SECS: u64 = 30 * 60;

/// Top-level config (`cqc.toml` + `CQC_*` env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CqcConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub oracle: OracleConfig,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub gateway_webhook: GatewayWebhookConfig,
    #[serde(default)]
    pub workers: WorkersConfig,
}

impl Default for CqcConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            database: DatabaseConfig::default(),
            oracle: OracleConfig {
                base_url: default_oracle_base_url(),
                api_key: String::new(),
                model: default_oracle_model(),
                timeout_ms: ORACLE_TIMEOUT_MS,
            },
            telegram: None,
            gateway_webhook: GatewayWebhookConfig::default(),
            workers: WorkersConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// The AI Oracle: a text -> structured-entity extraction endpoint.
/// Treated as an external collaborator; the CQC owns only the retry/backoff
/// envelope around it (see `cqc_oracle::retry`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_oracle_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_oracle_model")]
    pub model: String,
    #[serde(default = "default_oracle_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
}

/// Static bearer-token auth for the gateway-style (WhatsApp) inbound webhook,
/// injected by the Channel Router's pre-hop service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayWebhookConfig {
    #[serde(default)]
    pub enabled: bool,
    pub secret: Option<String>,
    /// Where the pre-hop gateway service accepts outbound sends back to
    /// WhatsApp; `None` disables worker-initiated pushes over this channel.
    #[serde(default)]
    pub outbound_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkersConfig {
    #[serde(default = "default_ghost_interval_secs")]
    pub ghost_interval_secs: u64,
    #[serde(default = "default_digest_hour_utc")]
    pub digest_hour_utc: u32,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            ghost_interval_secs: default_ghost_interval_secs(),
            digest_hour_utc: default_digest_hour_utc(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_oracle_base_url() -> String {
    "https://api.anthropic.com".to_string()
}
fn default_oracle_model() -> String {
    "claude-haiku-4-5".to_string()
}
fn default_oracle_timeout_ms() -> u64 {
    ORACLE_TIMEOUT_MS
}
fn default_ghost_interval_secs() -> u64 {
    GHOST_TICK_SECS
}
fn default_digest_hour_utc() -> u32 {
    6
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.cqc/cqc.db", home)
}

impl CqcConfig {
    /// Load config from a TOML file with `CQC_*` env var overrides.
    ///
    /// Checks in order: explicit path argument, then `~/.cqc/cqc.toml`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: CqcConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("CQC_").split("_"))
            .extract()
            .map_err(|e| crate::error::CqcError::Configuration(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.cqc/cqc.toml", home)
}
