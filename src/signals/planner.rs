//! Trade planner: final signal plus structure levels to concrete prices.

use crate::error::GeometryError;
use crate::models::signal::SignalDirection;
use crate::models::structure::StructureLevels;
use crate::models::trade::TradeSetup;

/// Stop sits 2% beyond the structure level.
pub const STOP_BUFFER: f64 = 0.02;
pub const TAKE_PROFIT_MULTIPLES: [f64; 3] = [1.5, 2.5, 4.0];

pub struct TradePlanner;

impl TradePlanner {
    /// `Ok(None)` for HOLD. LONG stops below support, SHORT above resistance.
    /// The structure level must sit strictly on the protective side of the
    /// entry, and the buffered stop must leave positive risk.
    pub fn plan(
        signal: SignalDirection,
        current_price: f64,
        levels: &StructureLevels,
    ) -> Result<Option<TradeSetup>, GeometryError> {
        let entry = current_price;
        let (level, stop_loss, direction) = match signal {
            SignalDirection::Hold => return Ok(None),
            SignalDirection::Long => (levels.support, levels.support * (1.0 - STOP_BUFFER), 1.0),
            SignalDirection::Short => (
                levels.resistance,
                levels.resistance * (1.0 + STOP_BUFFER),
                -1.0,
            ),
        };

        let clearance = (entry - level) * direction;
        if clearance.is_nan() || clearance <= 0.0 {
            return Err(GeometryError::InvalidTradeGeometry(format!(
                "{} entry {} is not beyond its structure level {}",
                signal, entry, level
            )));
        }

        let risk = (entry - stop_loss) * direction;
        if !risk.is_finite() || risk <= 0.0 {
            return Err(GeometryError::InvalidTradeGeometry(format!(
                "{} entry {} with stop {} gives non-positive risk {}",
                signal, entry, stop_loss, risk
            )));
        }

        let [tp1, tp2, tp3] = TAKE_PROFIT_MULTIPLES.map(|m| entry + direction * m * risk);

        Ok(Some(TradeSetup {
            entry_price: entry,
            stop_loss,
            take_profit_1: tp1,
            take_profit_2: tp2,
            take_profit_3: tp3,
            risk_reward_ratio: TAKE_PROFIT_MULTIPLES[0],
        }))
    }
}
