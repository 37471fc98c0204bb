use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variables prefixed with this override file values,
/// e.g. `VOICE_AGENT__CONTROLLER__CONNECT_URL`.
pub const ENV_PREFIX: &str = "VOICE_AGENT";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub controller: ControllerConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Settings handed to each new session
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Endpoint the transport calls to obtain room credentials
    pub connect_url: String,
    /// Acquire the microphone during device initialization
    pub enable_mic: bool,
    /// Acquire the camera during device initialization
    pub enable_cam: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            connect_url: "http://localhost:7860/connect".to_string(),
            enable_mic: true,
            enable_cam: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 7861,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "voice_agent_client=info".to_string(),
            with_target: false,
        }
    }
}

impl Config {
    /// Load configuration from `path` (optional) layered under environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        Ok(settings.try_deserialize()?)
    }
}
