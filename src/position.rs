// 4.0: open position tracking. pnl = size * (mark - entry) * side sign.
// 4.1 has revalue/reduce at the bottom.

use crate::liquidation::LiquidationModel;
use crate::margin::{margin_required, notional};
use crate::types::{Leverage, MarginMode, PositionId, Price, Quote, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub symbol: String,
    pub side: Side,
    // base units, always positive. direction lives in `side`
    pub size: Decimal,
    pub entry_price: Price,
    pub mark_price: Price,
    pub leverage: Leverage,
    pub margin: Quote,
    pub margin_mode: MarginMode,
    pub pnl: Quote,
    pub pnl_percent: Decimal,
    pub liquidation_price: Price,
}

impl Position {
    /// Opens a position from a market fill. Entry and mark start equal, so pnl is zero.
    pub fn open(
        id: PositionId,
        symbol: impl Into<String>,
        side: Side,
        size: Decimal,
        price: Price,
        leverage: Leverage,
        margin_mode: MarginMode,
        model: &LiquidationModel,
    ) -> Self {
        let margin = margin_required(notional(size, price), leverage);
        Self {
            id,
            symbol: symbol.into(),
            side,
            size,
            entry_price: price,
            mark_price: price,
            leverage,
            margin,
            margin_mode,
            pnl: Quote::zero(),
            pnl_percent: Decimal::ZERO,
            liquidation_price: model.liquidation_price(price, leverage, side),
        }
    }

    pub fn notional_at_mark(&self) -> Quote {
        notional(self.size, self.mark_price)
    }
}

// 4.1: the pnl formula. shorts flip the sign.
pub fn calculate_pnl(side: Side, size: Decimal, entry_price: Price, mark_price: Price) -> Quote {
    let diff = mark_price.value().saturating_sub(entry_price.value());
    Quote::new(size.saturating_mul(diff).saturating_mul(side.sign()))
}

// pnl as a percent of margin. None when margin is zero.
pub fn pnl_percent(pnl: Quote, margin: Quote) -> Option<Decimal> {
    pnl.value()
        .checked_div(margin.value())
        .and_then(|r| r.checked_mul(dec!(100)))
}

// 4.2: mark moved. pnl and pnl% follow, nothing else changes
pub fn revalue(position: &Position, mark_price: Price) -> Position {
    let pnl = calculate_pnl(position.side, position.size, position.entry_price, mark_price);
    Position {
        mark_price,
        pnl,
        pnl_percent: pnl_percent(pnl, position.margin).unwrap_or(Decimal::ZERO),
        ..position.clone()
    }
}

// margin edited. pnl% is relative to margin so it has to be recomputed
pub fn with_margin(position: &Position, margin: Quote) -> Position {
    Position {
        margin,
        pnl_percent: pnl_percent(position.pnl, margin).unwrap_or(Decimal::ZERO),
        ..position.clone()
    }
}

#[derive(Debug, Clone)]
pub struct PositionUpdate {
    pub new_position: Option<Position>,
    pub closed_size: Decimal,
    pub realized_pnl: Quote,
    pub margin_released: Quote,
}

// 4.3: closes `amount` of the position at `exit_price`. margin is released in the
// same fraction as size; entry and liquidation price stay where they were.
pub fn reduce_position(position: &Position, amount: Decimal, exit_price: Price) -> PositionUpdate {
    debug_assert!(amount > Decimal::ZERO, "reduce amount must be positive");

    let amount = amount.min(position.size);
    let realized = calculate_pnl(position.side, amount, position.entry_price, exit_price);

    if amount >= position.size {
        return PositionUpdate {
            new_position: None,
            closed_size: position.size,
            realized_pnl: realized,
            margin_released: position.margin,
        };
    }

    let fraction = amount / position.size;
    let margin_released = position.margin.mul(fraction);
    let remaining = Position {
        size: position.size - amount,
        margin: position.margin.sub(margin_released),
        ..position.clone()
    };
    let remaining = revalue(&remaining, position.mark_price);

    PositionUpdate {
        new_position: Some(remaining),
        closed_size: amount,
        realized_pnl: realized,
        margin_released,
    }
}
