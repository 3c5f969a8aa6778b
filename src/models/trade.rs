use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeSetup {
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit_1: f64,
    pub take_profit_2: f64,
    pub take_profit_3: f64,
    pub risk_reward_ratio: f64,
}

impl TradeSetup {
    /// Distance between entry and stop.
    pub fn risk(&self) -> f64 {
        (self.entry_price - self.stop_loss).abs()
    }
}
