//! Liquidation price and trigger check.
//!
//! Two approximations of the liquidation price exist for this terminal: a fixed
//! ratio off entry (0.8x for longs, 1.2x for shorts) and a leverage-scaled offset
//! (`1 -/+ k / leverage`). The terminal picks one [`LiquidationModel`] in config
//! and uses it everywhere, for the order-form estimate and for new positions.

use crate::types::{Leverage, Price, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// prices are never allowed to reach zero
const MIN_LIQUIDATION_PRICE: Decimal = dec!(0.0001);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum LiquidationModel {
    /// entry * (1 - buffer) for BUY, entry * (1 + buffer) for SELL. leverage is ignored.
    FixedRatio { buffer: Decimal },
    /// entry * (1 - k / leverage) for BUY, entry * (1 + k / leverage) for SELL.
    LeverageScaled { k: Decimal },
}

impl Default for LiquidationModel {
    fn default() -> Self {
        LiquidationModel::FixedRatio { buffer: dec!(0.2) }
    }
}

impl LiquidationModel {
    pub fn leverage_scaled() -> Self {
        LiquidationModel::LeverageScaled { k: dec!(0.9) }
    }

    // fraction of entry the price may move against the position
    fn adverse_move(&self, leverage: Leverage) -> Decimal {
        match self {
            LiquidationModel::FixedRatio { buffer } => *buffer,
            LiquidationModel::LeverageScaled { k } => *k / leverage.as_decimal(),
        }
    }

    pub fn liquidation_price(&self, entry_price: Price, leverage: Leverage, side: Side) -> Price {
        let offset = self.adverse_move(leverage);
        let factor = match side {
            Side::Buy => Decimal::ONE - offset,
            Side::Sell => Decimal::ONE + offset,
        };
        Price::new_unchecked((entry_price.value() * factor).max(MIN_LIQUIDATION_PRICE))
    }
}

/// True once the mark has crossed the liquidation price on the losing side.
pub fn is_liquidatable(side: Side, mark_price: Price, liquidation_price: Price) -> bool {
    match side {
        Side::Buy => mark_price <= liquidation_price,
        Side::Sell => mark_price >= liquidation_price,
    }
}
