//! Resting limit orders.
//!
//! There is no matching engine: a limit order sits in the open-orders list until
//! the user cancels it. Market orders never rest; they only show up in the order
//! history as already filled.

use crate::types::{Leverage, MarginMode, OrderId, OrderType, Price, Side, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Open,
    Filled,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    pub amount: Decimal,
    pub filled: Decimal,
    pub leverage: Leverage,
    pub margin_mode: MarginMode,
    pub status: OrderStatus,
    pub time: Timestamp,
}

impl Order {
    pub fn new_limit(
        id: OrderId,
        symbol: impl Into<String>,
        side: Side,
        price: Price,
        amount: Decimal,
        leverage: Leverage,
        margin_mode: MarginMode,
        time: Timestamp,
    ) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            price,
            amount,
            filled: Decimal::ZERO,
            leverage,
            margin_mode,
            status: OrderStatus::Open,
            time,
        }
    }

    /// History entry for a market order that filled in full on submission.
    pub fn filled_market(
        id: OrderId,
        symbol: impl Into<String>,
        side: Side,
        price: Price,
        amount: Decimal,
        leverage: Leverage,
        margin_mode: MarginMode,
        time: Timestamp,
    ) -> Self {
        Self {
            order_type: OrderType::Market,
            filled: amount,
            status: OrderStatus::Filled,
            ..Self::new_limit(id, symbol, side, price, amount, leverage, margin_mode, time)
        }
    }

    // what the order history shows after a cancel. fills so far are kept
    pub fn canceled(&self) -> Self {
        Self {
            status: OrderStatus::Canceled,
            ..self.clone()
        }
    }

    pub fn remaining(&self) -> Decimal {
        self.amount - self.filled
    }

    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }
}

/// Everything the order form submits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub side: Side,
    pub order_type: OrderType,
    pub size: Decimal,
    pub price: Decimal,
    pub leverage: u32,
    pub margin_mode: MarginMode,
}

impl OrderRequest {
    pub fn market(side: Side, size: Decimal, price: Decimal, leverage: u32) -> Self {
        Self {
            side,
            order_type: OrderType::Market,
            size,
            price,
            leverage,
            margin_mode: MarginMode::Cross,
        }
    }

    pub fn limit(side: Side, size: Decimal, price: Decimal, leverage: u32) -> Self {
        Self {
            order_type: OrderType::Limit,
            ..Self::market(side, size, price, leverage)
        }
    }

    pub fn with_margin_mode(mut self, margin_mode: MarginMode) -> Self {
        self.margin_mode = margin_mode;
        self
    }
}
