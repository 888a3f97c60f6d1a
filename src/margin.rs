//! Margin and fee math.
//!
//! Initial margin is notional divided by leverage. Maintenance margin is a flat
//! rate of notional at mark. Everything here is a pure function over explicit
//! inputs; division by a zero denominator comes back as `None` so callers decide
//! what to show.

use crate::types::{Leverage, Price, Quote};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Taker fee applied to every market fill: 5 bps.
pub const DEFAULT_FEE_RATE: Decimal = dec!(0.0005);

// saturates instead of overflowing. the terminal caps inputs well below that
pub fn notional(size: Decimal, price: Price) -> Quote {
    Quote::new(size.abs().saturating_mul(price.value()))
}

pub fn margin_required(notional: Quote, leverage: Leverage) -> Quote {
    Quote::new(notional.value() / leverage.as_decimal())
}

pub fn maintenance_margin(notional: Quote, maintenance_margin_rate: Decimal) -> Quote {
    notional.mul(maintenance_margin_rate)
}

pub fn trading_fee(notional: Quote, fee_rate: Decimal) -> Quote {
    notional.mul(fee_rate)
}

// maintenance / balance. None when the balance is zero.
pub fn margin_ratio(maintenance_margin: Quote, margin_balance: Quote) -> Option<Decimal> {
    maintenance_margin.value().checked_div(margin_balance.value())
}

// margin ratio as shown in the account panel, in percent.
pub fn margin_ratio_percent(maintenance_margin: Quote, margin_balance: Quote) -> Option<Decimal> {
    margin_ratio(maintenance_margin, margin_balance).and_then(|r| r.checked_mul(dec!(100)))
}

/// Isolated margin balance: what the position could hand back right now.
pub fn isolated_margin_balance(margin: Quote, pnl: Quote) -> Quote {
    margin.add(pnl)
}

// notional / margin. the leverage a position actually runs at after margin edits.
pub fn effective_leverage(notional: Quote, margin: Quote) -> Option<Decimal> {
    notional.value().checked_div(margin.value())
}
