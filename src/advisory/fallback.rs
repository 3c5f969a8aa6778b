//! Deterministic rule engine over RSI, MACD and EMA alignment.

use super::AdvisoryContext;
use crate::indicators::momentum::{RSI_OVERBOUGHT, RSI_OVERSOLD};
use crate::models::signal::{AdvisoryDecision, SignalDirection};

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackAdvisory;

impl FallbackAdvisory {
    /// LONG needs oversold RSI, positive MACD histogram and price above EMA21.
    /// SHORT mirrors all three. Anything else is HOLD.
    pub fn decide(&self, ctx: &AdvisoryContext<'_>) -> AdvisoryDecision {
        let rsi = ctx.indicators.rsi;
        let histogram = ctx.indicators.macd.histogram;
        let ema_21 = ctx.indicators.ema.ema_21;
        let price = ctx.current_price;

        let long = rsi < RSI_OVERSOLD && histogram > 0.0 && price > ema_21;
        let short = rsi > RSI_OVERBOUGHT && histogram < 0.0 && price < ema_21;

        let (signal, headline) = if long {
            (SignalDirection::Long, "Bullish alignment")
        } else if short {
            (SignalDirection::Short, "Bearish alignment")
        } else {
            (SignalDirection::Hold, "No aligned setup")
        };

        let rsi_state = if rsi < RSI_OVERSOLD {
            "oversold"
        } else if rsi > RSI_OVERBOUGHT {
            "overbought"
        } else {
            "neutral"
        };
        let macd_state = if histogram > 0.0 {
            "positive"
        } else if histogram < 0.0 {
            "negative"
        } else {
            "flat"
        };
        let ema_state = if price > ema_21 {
            "above"
        } else if price < ema_21 {
            "below"
        } else {
            "at"
        };

        AdvisoryDecision {
            signal,
            reason: format!(
                "{}: RSI {:.2} {}, MACD histogram {:.4} {}, price {:.2} {} EMA21 {:.2}",
                headline, rsi, rsi_state, histogram, macd_state, price, ema_state, ema_21
            ),
        }
    }
}
