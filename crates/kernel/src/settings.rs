use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use shopfront_db::ConnectOptions;

const DEFAULT_ENV: &str = "development";
const ENV_VAR_NAME: &str = "SHOPFRONT_ENV";
const LEGACY_ENV_VAR_NAME: &str = "NODE_ENV";
const CONFIG_DIR_ENV: &str = "SHOPFRONT_CONFIG_DIR";
const ENV_PREFIX: &str = "SHOPFRONT";

/// Connection string variables, checked in order; the first non-empty one wins.
const DATABASE_URL_VARS: &[&str] = &["MONGODB_URI", "DATABASE_URL", "MONGO_URL"];
const PORT_VAR: &str = "PORT";
const ALLOWED_ORIGINS_VAR: &str = "CLIENT_URL";

const REDACTED: &str = "<redacted>";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected development/staging/production/test",
                other
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay,
    /// `SHOPFRONT__SECTION__KEY` variables, and finally the legacy variables.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let lookup = |name: &str| std::env::var(name).ok();
        let environment = resolve_environment(lookup)?;

        let config_dir = match lookup(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let cfg = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = environment;
        settings.apply_legacy_overrides(lookup)?;

        Ok(settings)
    }

    /// Apply the unprefixed variables older deployments set (`MONGODB_URI`,
    /// `PORT`, `CLIENT_URL`, ...). They take precedence over file values.
    pub fn apply_legacy_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = first_non_empty(DATABASE_URL_VARS.iter().map(|&name| lookup(name))) {
            self.database.url = Some(url);
        }

        if let Some(port) = non_empty(lookup(PORT_VAR)) {
            self.server.port = port
                .parse()
                .with_context(|| format!("invalid {PORT_VAR} value '{port}'"))?;
        }

        if let Some(origins) = non_empty(lookup(ALLOWED_ORIGINS_VAR)) {
            self.server.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(())
    }

    /// Copy of the settings that is safe to print or log.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.database.url.is_some() {
            copy.database.url = Some(REDACTED.to_string());
        }
        copy
    }
}

/// `SHOPFRONT_ENV`, then `NODE_ENV`, then `development`.
pub fn resolve_environment<F>(lookup: F) -> anyhow::Result<Environment>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup(ENV_VAR_NAME))
        .or_else(|| non_empty(lookup(LEGACY_ENV_VAR_NAME)))
        .unwrap_or_else(|| DEFAULT_ENV.to_string())
        .parse()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn first_non_empty<I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    values.into_iter().find_map(non_empty)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "ServerSettings::default_body_limit_bytes")]
    pub body_limit_bytes: usize,
    #[serde(default = "ServerSettings::default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "ServerSettings::default_enable_sample_seed")]
    pub enable_sample_seed: bool,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        5000
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }

    fn default_body_limit_bytes() -> usize {
        100 * 1024
    }

    fn default_allowed_origins() -> Vec<String> {
        vec!["http://localhost:3000".to_string()]
    }

    fn default_enable_sample_seed() -> bool {
        true
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
            body_limit_bytes: Self::default_body_limit_bytes(),
            allowed_origins: Self::default_allowed_origins(),
            enable_sample_seed: Self::default_enable_sample_seed(),
        }
    }
}

/// What to do when the database cannot be reached at startup.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
pub enum StartupPolicy {
    /// Abort startup.
    #[serde(rename = "fail_fast")]
    FailFast,
    /// Log, keep a disconnected handle, and serve anyway.
    #[default]
    #[serde(rename = "degrade")]
    DegradeAndServe,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "DatabaseSettings::default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "DatabaseSettings::default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default)]
    pub startup_policy: StartupPolicy,
}

impl DatabaseSettings {
    fn default_max_connections() -> u32 {
        5
    }

    fn default_connect_timeout_ms() -> u64 {
        5000
    }

    /// `None` when no connection string is configured.
    pub fn connect_options(&self) -> Option<ConnectOptions> {
        let url = non_empty(self.url.clone())?;
        Some(ConnectOptions {
            url,
            max_connections: self.max_connections,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
        })
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: Self::default_max_connections(),
            connect_timeout_ms: Self::default_connect_timeout_ms(),
            startup_policy: StartupPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// Default `tracing` filter directive; `RUST_LOG` wins when set.
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
