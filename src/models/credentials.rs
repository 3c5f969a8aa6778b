//! Per-user secrets handed over by the identity layer.
//!
//! Held only for the lifetime of one request. `Debug` never prints the
//! secret material.

use std::fmt;

#[derive(Clone)]
pub struct MarketDataCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl MarketDataCredentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn is_usable(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl fmt::Debug for MarketDataCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketDataCredentials")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct AdvisoryCredentials {
    pub api_key: String,
}

impl AdvisoryCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn is_usable(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl fmt::Debug for AdvisoryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisoryCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Everything the caller may supply. Unusable (blank) entries are dropped.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub market_data: Option<MarketDataCredentials>,
    pub advisory: Option<AdvisoryCredentials>,
}

impl Credentials {
    pub fn new(
        market_data: Option<MarketDataCredentials>,
        advisory: Option<AdvisoryCredentials>,
    ) -> Self {
        Self {
            market_data: market_data.filter(MarketDataCredentials::is_usable),
            advisory: advisory.filter(AdvisoryCredentials::is_usable),
        }
    }
}
