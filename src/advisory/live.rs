//! OpenAI-compatible chat completions client.

use backon::{ExponentialBuilder, Retryable};
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use super::AdvisoryContext;
use crate::config::AdvisoryConfig;
use crate::error::AdvisoryError;
use crate::models::credentials::AdvisoryCredentials;
use crate::models::signal::{AdvisoryDecision, SignalDirection};

const SYSTEM_PROMPT: &str = "You are an expert cryptocurrency trading analyst.";
const DECISION_TAG: &str = "DECISION:";
const REASON_TAG: &str = "REASON:";

pub struct LiveAdvisory {
    client: reqwest::Client,
    config: AdvisoryConfig,
    credentials: AdvisoryCredentials,
}

impl fmt::Debug for LiveAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveAdvisory")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl LiveAdvisory {
    pub fn new(
        client: reqwest::Client,
        config: AdvisoryConfig,
        credentials: AdvisoryCredentials,
    ) -> Self {
        Self {
            client,
            config,
            credentials,
        }
    }

    /// Ask the service, retrying transient failures with exponential backoff.
    pub async fn request(&self, ctx: &AdvisoryContext<'_>) -> Result<AdvisoryDecision, AdvisoryError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(250))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(self.config.max_retries);

        (|| async { self.request_once(ctx).await })
            .retry(backoff)
            .when(AdvisoryError::is_retryable)
            .notify(|err: &AdvisoryError, delay: Duration| {
                warn!(
                    symbol = %ctx.symbol,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying advisory request"
                );
            })
            .await
    }

    async fn request_once(&self, ctx: &AdvisoryContext<'_>) -> Result<AdvisoryDecision, AdvisoryError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(ctx) }
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature
        });

        let timeout_ms = self.config.timeout.as_millis() as u64;
        let response = self
            .client
            .post(&url)
            .timeout(self.config.timeout)
            .bearer_auth(&self.credentials.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout_ms))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AdvisoryError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| transport_error(e, timeout_ms))?;
        let content = payload
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| AdvisoryError::Malformed("missing message content".to_string()))?;

        debug!(symbol = %ctx.symbol, "Advisory response received");
        parse_decision(content)
    }
}

fn transport_error(err: reqwest::Error, timeout_ms: u64) -> AdvisoryError {
    if err.is_timeout() {
        AdvisoryError::Timeout(timeout_ms)
    } else {
        AdvisoryError::from(err)
    }
}

pub fn build_prompt(ctx: &AdvisoryContext<'_>) -> String {
    let ind = ctx.indicators;
    format!(
        "Analyze the following trading data for {symbol}:\n\
         \n\
         Current price: {price:.2}\n\
         \n\
         Technical Indicators:\n\
         - RSI: {rsi:.2}\n\
         - MACD: {macd:.4}\n\
         - MACD Signal: {signal:.4}\n\
         - MACD Histogram: {hist:.4}\n\
         - EMA 9: {ema9:.2}\n\
         - EMA 21: {ema21:.2}\n\
         - EMA 50: {ema50:.2}\n\
         \n\
         Support/Resistance:\n\
         - Support: {support:.2}\n\
         - Resistance: {resistance:.2}\n\
         \n\
         Provide a trading decision (LONG, SHORT, or HOLD) with a brief explanation.\n\
         Format your response as: DECISION: [signal] | REASON: [explanation]",
        symbol = ctx.symbol,
        price = ctx.current_price,
        rsi = ind.rsi,
        macd = ind.macd.macd,
        signal = ind.macd.signal,
        hist = ind.macd.histogram,
        ema9 = ind.ema.ema_9,
        ema21 = ind.ema.ema_21,
        ema50 = ind.ema.ema_50,
        support = ctx.levels.support,
        resistance = ctx.levels.resistance,
    )
}

/// Parse `DECISION: <LONG|SHORT|HOLD> | REASON: <text>`.
///
/// A missing or unknown decision is malformed. A missing reason falls back to
/// the full response text.
pub fn parse_decision(content: &str) -> Result<AdvisoryDecision, AdvisoryError> {
    let upper = content.to_ascii_uppercase();
    let start = upper
        .find(DECISION_TAG)
        .ok_or_else(|| AdvisoryError::Malformed(format!("no {} in '{}'", DECISION_TAG, content)))?;

    let token: String = upper[start + DECISION_TAG.len()..]
        .trim_start()
        .trim_start_matches(&['[', '*', '"'][..])
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    let signal: SignalDirection = token
        .parse()
        .map_err(AdvisoryError::Malformed)?;

    let reason = match upper.find(REASON_TAG) {
        Some(idx) => content[idx + REASON_TAG.len()..].trim().to_string(),
        None => content.trim().to_string(),
    };
    let reason = if reason.is_empty() {
        format!("Advisory service returned {}", signal)
    } else {
        reason
    };

    Ok(AdvisoryDecision { signal, reason })
}
