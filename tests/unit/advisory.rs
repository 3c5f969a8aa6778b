//! Unit tests for the advisory adapter (fallback rules, response parsing)

use fusetrade::advisory::live::{build_prompt, parse_decision};
use fusetrade::advisory::{Advisor, AdvisoryContext, AdvisorySource, FallbackAdvisory};
use fusetrade::config::AdvisoryConfig;
use fusetrade::error::AdvisoryError;
use fusetrade::models::credentials::{AdvisoryCredentials, MarketDataCredentials};
use fusetrade::models::indicators::{EmaFamily, IndicatorSet, MacdIndicator};
use fusetrade::models::signal::SignalDirection;
use fusetrade::models::structure::StructureLevels;

fn indicators(rsi: f64, histogram: f64, ema_21: f64) -> IndicatorSet {
    IndicatorSet {
        rsi,
        macd: MacdIndicator {
            macd: histogram,
            signal: 0.0,
            histogram,
        },
        ema: EmaFamily {
            ema_9: ema_21,
            ema_21,
            ema_50: ema_21,
        },
    }
}

const LEVELS: StructureLevels = StructureLevels {
    support: 90.0,
    resistance: 110.0,
};

fn decide(rsi: f64, histogram: f64, ema_21: f64, price: f64) -> (SignalDirection, String) {
    let set = indicators(rsi, histogram, ema_21);
    let ctx = AdvisoryContext {
        symbol: "BTCUSDT",
        current_price: price,
        indicators: &set,
        levels: &LEVELS,
    };
    let decision = FallbackAdvisory.decide(&ctx);
    (decision.signal, decision.reason)
}

#[test]
fn test_fallback_long_when_all_bullish_conditions_hold() {
    let (signal, reason) = decide(25.0, 0.4, 100.0, 101.0);
    assert_eq!(signal, SignalDirection::Long);
    assert!(reason.contains("oversold"), "{}", reason);
    assert!(reason.contains("above EMA21"), "{}", reason);
}

#[test]
fn test_fallback_short_when_all_bearish_conditions_hold() {
    let (signal, reason) = decide(75.0, -0.4, 100.0, 99.0);
    assert_eq!(signal, SignalDirection::Short);
    assert!(reason.contains("overbought"), "{}", reason);
    assert!(reason.contains("below EMA21"), "{}", reason);
}

#[test]
fn test_fallback_hold_when_any_condition_is_missing() {
    for (rsi, hist, price) in [
        (25.0, -0.4, 101.0),
        (25.0, 0.4, 99.0),
        (45.0, 0.4, 101.0),
        (75.0, 0.4, 99.0),
        (30.0, 0.4, 101.0),
    ] {
        let (signal, reason) = decide(rsi, hist, 100.0, price);
        assert_eq!(signal, SignalDirection::Hold, "rsi={} hist={} price={}", rsi, hist, price);
        assert!(reason.starts_with("No aligned setup"), "{}", reason);
    }
}

#[test]
fn test_parse_well_formed_response() {
    let decision =
        parse_decision("DECISION: LONG | REASON: Momentum turning up above EMA21.").unwrap();
    assert_eq!(decision.signal, SignalDirection::Long);
    assert_eq!(decision.reason, "Momentum turning up above EMA21.");
}

#[test]
fn test_parse_tolerates_case_and_brackets() {
    let decision = parse_decision("decision: [short] | reason: overbought").unwrap();
    assert_eq!(decision.signal, SignalDirection::Short);
    assert_eq!(decision.reason, "overbought");
}

#[test]
fn test_parse_missing_reason_uses_full_text() {
    let decision = parse_decision("DECISION: HOLD").unwrap();
    assert_eq!(decision.signal, SignalDirection::Hold);
    assert_eq!(decision.reason, "DECISION: HOLD");
}

#[test]
fn test_parse_rejects_malformed_content() {
    assert!(matches!(
        parse_decision("I think you should go long."),
        Err(AdvisoryError::Malformed(_))
    ));
    assert!(matches!(
        parse_decision("DECISION: BUY | REASON: cheap"),
        Err(AdvisoryError::Malformed(_))
    ));
}

#[test]
fn test_prompt_carries_features_and_format() {
    let set = indicators(55.5, 0.25, 100.0);
    let ctx = AdvisoryContext {
        symbol: "ETHUSDT",
        current_price: 101.25,
        indicators: &set,
        levels: &LEVELS,
    };
    let prompt = build_prompt(&ctx);
    assert!(prompt.contains("ETHUSDT"));
    assert!(prompt.contains("RSI: 55.50"));
    assert!(prompt.contains("Support: 90.00"));
    assert!(prompt.contains("DECISION: [signal] | REASON: [explanation]"));
}

#[test]
fn test_only_retryable_errors_are_retried() {
    assert!(AdvisoryError::Timeout(100).is_retryable());
    assert!(AdvisoryError::RateLimited.is_retryable());
    assert!(AdvisoryError::Status {
        status: 503,
        body: String::new()
    }
    .is_retryable());
    assert!(!AdvisoryError::Status {
        status: 401,
        body: String::new()
    }
    .is_retryable());
    assert!(!AdvisoryError::Malformed("x".to_string()).is_retryable());
}

#[tokio::test]
async fn test_missing_or_blank_credentials_select_fallback() {
    let client = reqwest::Client::new();
    let advisor = Advisor::select(client.clone(), AdvisoryConfig::default(), None);
    assert!(matches!(advisor, Advisor::Fallback(_)));

    let blank = Some(AdvisoryCredentials::new("   "));
    let advisor = Advisor::select(client.clone(), AdvisoryConfig::default(), blank);
    assert!(matches!(advisor, Advisor::Fallback(_)));

    let set = indicators(50.0, 0.0, 100.0);
    let ctx = AdvisoryContext {
        symbol: "BTCUSDT",
        current_price: 100.0,
        indicators: &set,
        levels: &LEVELS,
    };
    let outcome = advisor.decide(&ctx).await;
    assert_eq!(outcome.source, AdvisorySource::Fallback);
    assert!(!outcome.decision.reason.is_empty());

    let live = Advisor::select(
        client,
        AdvisoryConfig::default(),
        Some(AdvisoryCredentials::new("sk-test")),
    );
    assert!(matches!(live, Advisor::Live(_)));
}

#[test]
fn test_debug_output_redacts_secrets() {
    let advisory = format!("{:?}", AdvisoryCredentials::new("sk-very-secret"));
    let market = format!("{:?}", MarketDataCredentials::new("mbx-key", "mbx-secret"));
    let live = format!(
        "{:?}",
        Advisor::select(
            reqwest::Client::new(),
            AdvisoryConfig::default(),
            Some(AdvisoryCredentials::new("sk-very-secret"))
        )
    );

    assert!(!advisory.contains("sk-very-secret"));
    assert!(!market.contains("mbx-key") && !market.contains("mbx-secret"));
    assert!(!live.contains("sk-very-secret"));
    assert!(live.contains("redacted"));
}
