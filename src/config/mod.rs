use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for embedding applications. Everything the
/// engine needs is carried here explicitly; nothing reads ambient process
/// state after `load()`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let model_path = env::var("MODEL_PATH").ok().map(PathBuf::from);
        let benchmarks_csv = env::var("BENCHMARKS_CSV").ok().map(PathBuf::from);

        let analyzer_timeout_secs = env::var("ANALYZER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout)?;

        let analyzer = AnalyzerSettings {
            api_key: env::var("ANALYZER_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env::var("ANALYZER_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            model: env::var("ANALYZER_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            timeout: Duration::from_secs(analyzer_timeout_secs),
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            engine: EngineConfig {
                model_path,
                benchmarks_csv,
                analyzer,
            },
        })
    }
}

/// Settings feeding the assessment engine construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub model_path: Option<PathBuf>,
    pub benchmarks_csv: Option<PathBuf>,
    pub analyzer: AnalyzerSettings,
}

/// Credentials and endpoint for the external analyzer service. An absent
/// API key means the engine runs on the deterministic offline analyzers.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTimeout => {
                write!(f, "ANALYZER_TIMEOUT_SECS must be a whole number of seconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
