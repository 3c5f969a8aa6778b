//! Advisory opinion: an external reasoning service with a rule-based fallback.
//!
//! Both variants produce the same [`AdvisoryDecision`] shape. The only trace
//! of which path ran is the [`AdvisorySource`] carried next to it.

pub mod fallback;
pub mod live;

use serde::Serialize;
use tracing::warn;

use crate::config::AdvisoryConfig;
use crate::models::credentials::AdvisoryCredentials;
use crate::models::indicators::IndicatorSet;
use crate::models::signal::AdvisoryDecision;
use crate::models::structure::StructureLevels;

pub use fallback::FallbackAdvisory;
pub use live::LiveAdvisory;

/// Market snapshot the advisory path reasons over.
#[derive(Debug, Clone, Copy)]
pub struct AdvisoryContext<'a> {
    pub symbol: &'a str,
    pub current_price: f64,
    pub indicators: &'a IndicatorSet,
    pub levels: &'a StructureLevels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorySource {
    Live,
    Fallback,
}

impl AdvisorySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisorySource::Live => "live",
            AdvisorySource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryOutcome {
    pub decision: AdvisoryDecision,
    pub source: AdvisorySource,
}

/// Advisory capability, picked per request from the caller's credentials.
#[derive(Debug)]
pub enum Advisor {
    Live(LiveAdvisory),
    Fallback(FallbackAdvisory),
}

impl Advisor {
    pub fn select(
        client: reqwest::Client,
        config: AdvisoryConfig,
        credentials: Option<AdvisoryCredentials>,
    ) -> Self {
        match credentials.filter(AdvisoryCredentials::is_usable) {
            Some(creds) => Advisor::Live(LiveAdvisory::new(client, config, creds)),
            None => Advisor::Fallback(FallbackAdvisory),
        }
    }

    /// Never fails: any live error degrades to the rule engine.
    pub async fn decide(&self, ctx: &AdvisoryContext<'_>) -> AdvisoryOutcome {
        match self {
            Advisor::Live(live) => match live.request(ctx).await {
                Ok(decision) => AdvisoryOutcome {
                    decision,
                    source: AdvisorySource::Live,
                },
                Err(e) => {
                    warn!(symbol = %ctx.symbol, error = %e, "Advisory service failed, using fallback rules");
                    AdvisoryOutcome {
                        decision: FallbackAdvisory.decide(ctx),
                        source: AdvisorySource::Fallback,
                    }
                }
            },
            Advisor::Fallback(rules) => AdvisoryOutcome {
                decision: rules.decide(ctx),
                source: AdvisorySource::Fallback,
            },
        }
    }
}
