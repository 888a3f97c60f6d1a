//! Order-form and margin-modal projections.
//!
//! Nothing here touches state. The order form calls [`estimate_trade`] on every
//! keystroke; the margin modal calls [`preview_margin_adjustment`].

use crate::liquidation::LiquidationModel;
use crate::margin::{effective_leverage, margin_required, notional, trading_fee};
use crate::position::Position;
use crate::types::{Leverage, Price, Quote, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// The order form accepts size either in base units (XAU) or in quote units (USDC).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum OrderAmount {
    Base(Decimal),
    Quote(Decimal),
}

impl OrderAmount {
    pub fn base_size(&self, price: Price) -> Decimal {
        match self {
            OrderAmount::Base(size) => *size,
            OrderAmount::Quote(value) => *value / price.value(),
        }
    }

    pub fn quote_value(&self, price: Price) -> Quote {
        match self {
            OrderAmount::Base(size) => notional(*size, price),
            OrderAmount::Quote(value) => Quote::new(*value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEstimate {
    pub base_size: Decimal,
    pub notional: Quote,
    pub margin_required: Quote,
    pub max_open_notional: Quote,
    pub max_open_size: Decimal,
    pub estimated_fee: Quote,
    pub long_liquidation_price: Price,
    pub short_liquidation_price: Price,
}

pub fn estimate_trade(
    amount: OrderAmount,
    price: Price,
    leverage: Leverage,
    available: Quote,
    fee_rate: Decimal,
    model: &LiquidationModel,
) -> TradeEstimate {
    let position_notional = amount.quote_value(price);
    let max_open_notional = available.mul(leverage.as_decimal());

    TradeEstimate {
        base_size: amount.base_size(price),
        notional: position_notional,
        margin_required: margin_required(position_notional, leverage),
        max_open_notional,
        max_open_size: max_open_notional.value() / price.value(),
        estimated_fee: trading_fee(position_notional, fee_rate),
        long_liquidation_price: model.liquidation_price(price, leverage, Side::Buy),
        short_liquidation_price: model.liquidation_price(price, leverage, Side::Sell),
    }
}

// slider helper: `percent` (0..=100) of the max openable notional, expressed in the unit the form shows
pub fn amount_for_percent(
    percent: u8,
    available: Quote,
    leverage: Leverage,
    price: Price,
    in_quote: bool,
) -> OrderAmount {
    let pct = Decimal::from(percent.min(100)) / dec!(100);
    let target = available.value() * leverage.as_decimal() * pct;
    if in_quote {
        OrderAmount::Quote(target.round_dp(2))
    } else {
        OrderAmount::Base((target / price.value()).round_dp(4))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginAdjustment {
    Add,
    Extract,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginPreview {
    pub old_margin: Quote,
    pub new_margin: Quote,
    pub old_leverage: Decimal,
    pub new_leverage: Decimal,
    // margin / notional in percent
    pub old_margin_rate: Decimal,
    pub new_margin_rate: Decimal,
    pub old_liquidation_price: Price,
    pub projected_liquidation_price: Price,
}

// what the margin modal shows before confirming. liquidation shifts by the
// same fraction the margin changes: down for add on a long, up for extract.
pub fn preview_margin_adjustment(
    position: &Position,
    kind: MarginAdjustment,
    amount: Quote,
) -> MarginPreview {
    let old_margin = position.margin;
    let new_margin = match kind {
        MarginAdjustment::Add => old_margin.add(amount),
        MarginAdjustment::Extract => old_margin.sub(amount).max_zero(),
    };

    let position_notional = position.notional_at_mark();
    let old_leverage = effective_leverage(position_notional, old_margin).unwrap_or(Decimal::ZERO);
    let new_leverage = effective_leverage(position_notional, new_margin).unwrap_or(old_leverage);

    let rate = |m: Quote| {
        m.value()
            .checked_div(position_notional.value())
            .and_then(|r| r.checked_mul(dec!(100)))
            .unwrap_or(Decimal::ZERO)
    };

    // falls back to the current liquidation price when the projection is
    // non-positive or out of range
    let old_liq = position.liquidation_price.value();
    let projected = amount
        .value()
        .checked_div(old_margin.value())
        .and_then(|ratio| old_liq.checked_mul(ratio))
        .and_then(|shift| match kind {
            MarginAdjustment::Add => old_liq.checked_sub(shift),
            MarginAdjustment::Extract => old_liq.checked_add(shift),
        })
        .and_then(Price::new)
        .unwrap_or(position.liquidation_price);

    MarginPreview {
        old_margin,
        new_margin,
        old_leverage,
        new_leverage,
        old_margin_rate: rate(old_margin),
        new_margin_rate: rate(new_margin),
        old_liquidation_price: position.liquidation_price,
        projected_liquidation_price: projected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::margin::DEFAULT_FEE_RATE;
    use crate::types::{MarginMode, PositionId};

    fn px(v: Decimal) -> Price {
        Price::new_unchecked(v)
    }

    #[test]
    fn estimate_in_base_units() {
        let est = estimate_trade(
            OrderAmount::Base(dec!(1)),
            px(dec!(2800)),
            Leverage::new(20).unwrap(),
            Quote::new(dec!(1000)),
            DEFAULT_FEE_RATE,
            &LiquidationModel::default(),
        );

        assert_eq!(est.base_size, dec!(1));
        assert_eq!(est.notional.value(), dec!(2800));
        assert_eq!(est.margin_required.value(), dec!(140));
        assert_eq!(est.estimated_fee.value(), dec!(1.4));
        assert_eq!(est.max_open_notional.value(), dec!(20000));
        assert_eq!(est.long_liquidation_price.value(), dec!(2240));
        assert_eq!(est.short_liquidation_price.value(), dec!(3360));
    }

    #[test]
    fn estimate_in_quote_units() {
        let est = estimate_trade(
            OrderAmount::Quote(dec!(1400)),
            px(dec!(2800)),
            Leverage::new(10).unwrap(),
            Quote::new(dec!(100)),
            DEFAULT_FEE_RATE,
            &LiquidationModel::default(),
        );

        assert_eq!(est.base_size, dec!(0.5));
        assert_eq!(est.margin_required.value(), dec!(140));
    }

    #[test]
    fn estimate_follows_configured_model() {
        let est = estimate_trade(
            OrderAmount::Base(dec!(1)),
            px(dec!(2800)),
            Leverage::new(20).unwrap(),
            Quote::new(dec!(1000)),
            DEFAULT_FEE_RATE,
            &LiquidationModel::leverage_scaled(),
        );
        assert_eq!(est.long_liquidation_price.value(), dec!(2674));
    }

    #[test]
    fn slider_amounts() {
        let lev = Leverage::new(20).unwrap();
        let avail = Quote::new(dec!(1000));

        assert_eq!(
            amount_for_percent(50, avail, lev, px(dec!(2800)), true),
            OrderAmount::Quote(dec!(10000))
        );
        // 10000 / 2800 = 3.5714...
        assert_eq!(
            amount_for_percent(50, avail, lev, px(dec!(2800)), false),
            OrderAmount::Base(dec!(3.5714))
        );
        // clamps above 100
        assert_eq!(
            amount_for_percent(150, avail, lev, px(dec!(2800)), true),
            OrderAmount::Quote(dec!(20000))
        );
    }

    #[test]
    fn margin_preview_add_and_extract() {
        let pos = Position::open(
            PositionId(1),
            "XAUUSDC",
            Side::Buy,
            dec!(1),
            px(dec!(2800)),
            Leverage::new(20).unwrap(),
            MarginMode::Isolated,
            &LiquidationModel::default(),
        );

        let add = preview_margin_adjustment(&pos, MarginAdjustment::Add, Quote::new(dec!(140)));
        assert_eq!(add.new_margin.value(), dec!(280));
        assert_eq!(add.old_leverage, dec!(20));
        assert_eq!(add.new_leverage, dec!(10));
        assert_eq!(add.old_margin_rate, dec!(5));
        assert_eq!(add.new_margin_rate, dec!(10));
        // 2240 - 2240 * (140 / 140) would be zero, projected falls back to current
        assert_eq!(add.projected_liquidation_price.value(), dec!(2240));

        let extract = preview_margin_adjustment(&pos, MarginAdjustment::Extract, Quote::new(dec!(14)));
        assert_eq!(extract.new_margin.value(), dec!(126));
        // 2240 + 2240 * 0.1
        assert_eq!(extract.projected_liquidation_price.value(), dec!(2464));
    }
}
