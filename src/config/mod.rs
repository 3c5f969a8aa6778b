//! Environment-driven configuration.
//!
//! Values are read once at startup (after `dotenvy` has loaded `.env`) and
//! shared read-only afterwards.

use crate::error::StartupError;
use crate::indicators::structure::SUPPORT_RESISTANCE_WINDOW;
use crate::services::market_data::{is_supported_interval, SUPPORTED_INTERVALS};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Current deployment environment (`APP_ENV`), defaults to `sandbox`.
pub fn get_environment() -> String {
    env::var("APP_ENV")
        .map(|v| v.trim().to_lowercase())
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "sandbox".to_string())
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/sequence_model.json"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarketDataConfig {
    pub base_url: String,
    pub interval: String,
    pub limit: usize,
    pub timeout: Duration,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            interval: "1h".to_string(),
            limit: 500,
            timeout: Duration::from_millis(5_000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdvisoryConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: usize,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_millis(5_000),
            max_retries: 1,
            max_tokens: 150,
            temperature: 0.0,
        }
    }
}

/// Rule thresholds used by the structure detector and fusion policy.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub support_resistance_window: usize,
    pub breaker_block_limit: usize,
    pub fusion_confidence_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            support_resistance_window: SUPPORT_RESISTANCE_WINDOW,
            breaker_block_limit: 5,
            fusion_confidence_threshold: 0.80,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub market_data: MarketDataConfig,
    pub advisory: AdvisoryConfig,
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, StartupError> {
        let defaults = Self::default();

        let server = ServerConfig {
            port: parse_var("PORT", defaults.server.port)?,
        };

        let model = ModelConfig {
            path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model.path),
        };

        let market_data = MarketDataConfig {
            base_url: url_var("BINANCE_BASE_URL", &defaults.market_data.base_url)?,
            interval: env::var("CANDLE_INTERVAL").unwrap_or(defaults.market_data.interval),
            limit: parse_var("CANDLE_LIMIT", defaults.market_data.limit)?,
            timeout: Duration::from_millis(parse_var(
                "MARKET_DATA_TIMEOUT_MS",
                defaults.market_data.timeout.as_millis() as u64,
            )?),
        };

        let advisory = AdvisoryConfig {
            base_url: url_var("ADVISORY_BASE_URL", &defaults.advisory.base_url)?,
            model: env::var("ADVISORY_MODEL").unwrap_or(defaults.advisory.model),
            timeout: Duration::from_millis(parse_var(
                "ADVISORY_TIMEOUT_MS",
                defaults.advisory.timeout.as_millis() as u64,
            )?),
            max_retries: parse_var("ADVISORY_MAX_RETRIES", defaults.advisory.max_retries)?,
            max_tokens: parse_var("ADVISORY_MAX_TOKENS", defaults.advisory.max_tokens)?,
            temperature: defaults.advisory.temperature,
        };

        let analysis = AnalysisConfig {
            support_resistance_window: parse_var(
                "SUPPORT_RESISTANCE_WINDOW",
                defaults.analysis.support_resistance_window,
            )?,
            breaker_block_limit: parse_var(
                "BREAKER_BLOCK_LIMIT",
                defaults.analysis.breaker_block_limit,
            )?,
            fusion_confidence_threshold: parse_var(
                "FUSION_CONFIDENCE_THRESHOLD",
                defaults.analysis.fusion_confidence_threshold,
            )?,
        };

        let config = Self {
            server,
            model,
            market_data,
            advisory,
            analysis,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StartupError> {
        let threshold = self.analysis.fusion_confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(StartupError::Config(format!(
                "FUSION_CONFIDENCE_THRESHOLD must be within [0, 1], got {}",
                threshold
            )));
        }
        if self.analysis.support_resistance_window == 0 {
            return Err(StartupError::Config(
                "SUPPORT_RESISTANCE_WINDOW must be positive".to_string(),
            ));
        }
        if !is_supported_interval(&self.market_data.interval) {
            return Err(StartupError::Config(format!(
                "CANDLE_INTERVAL must be one of {}, got '{}'",
                SUPPORTED_INTERVALS.join(", "),
                self.market_data.interval
            )));
        }
        if self.market_data.limit == 0 || self.market_data.limit > 1000 {
            return Err(StartupError::Config(format!(
                "CANDLE_LIMIT must be within 1..=1000, got {}",
                self.market_data.limit
            )));
        }
        Ok(())
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T, StartupError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map_err(|e| {
            StartupError::Config(format!("{} has invalid value '{}': {}", key, raw, e))
        }),
        _ => Ok(default),
    }
}

fn url_var(key: &str, default: &str) -> Result<String, StartupError> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    let parsed = Url::parse(raw.trim())
        .map_err(|e| StartupError::Config(format!("{} is not a valid URL: {}", key, e)))?;
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
