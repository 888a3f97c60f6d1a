//! Wallet balance and the derived account panel.
//!
//! The wallet holds free collateral. [`AccountInfo`] is never stored: it is
//! recomputed from the open positions plus the wallet every time it is read.

use crate::margin::{isolated_margin_balance, maintenance_margin, margin_ratio_percent};
use crate::position::Position;
use crate::types::{MarginMode, Quote};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub balance: Quote,
    pub total_deposited: Quote,
    pub total_withdrawn: Quote,
    pub realized_pnl: Quote,
    pub fees_paid: Quote,
}

impl Wallet {
    pub fn new(balance: Quote) -> Self {
        Self {
            balance,
            total_deposited: Quote::zero(),
            total_withdrawn: Quote::zero(),
            realized_pnl: Quote::zero(),
            fees_paid: Quote::zero(),
        }
    }

    pub fn deposit(&mut self, amount: Quote) {
        self.balance = self.balance.add(amount);
        self.total_deposited = self.total_deposited.add(amount);
    }

    pub fn withdraw(&mut self, amount: Quote) -> Result<(), WalletError> {
        self.ensure_available(amount)?;
        self.balance = self.balance.sub(amount);
        self.total_withdrawn = self.total_withdrawn.add(amount);
        Ok(())
    }

    pub fn reserve(&mut self, amount: Quote) -> Result<(), WalletError> {
        self.ensure_available(amount)?;
        self.balance = self.balance.sub(amount);
        Ok(())
    }

    pub fn charge_fee(&mut self, fee: Quote) {
        self.balance = self.balance.sub(fee);
        self.fees_paid = self.fees_paid.add(fee);
    }

    pub fn release(&mut self, amount: Quote) {
        self.balance = self.balance.add(amount);
    }

    // released margin plus pnl, floored at zero: a position cannot lose more than its margin
    pub fn settle_close(&mut self, margin_released: Quote, realized_pnl: Quote) -> Quote {
        let payout = margin_released.add(realized_pnl).max_zero();
        self.balance = self.balance.add(payout);
        self.realized_pnl = self.realized_pnl.add(realized_pnl);
        payout
    }

    // liquidated: the margin was already reserved, it just never comes back
    pub fn forfeit(&mut self, margin_lost: Quote) {
        self.realized_pnl = self.realized_pnl.sub(margin_lost);
    }

    pub fn ensure_available(&self, amount: Quote) -> Result<(), WalletError> {
        if amount > self.balance {
            return Err(WalletError::InsufficientBalance {
                requested: amount,
                available: self.balance,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Quote, available: Quote },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub total_value: Quote,
    pub unrealized_pnl: Quote,
    // percent
    pub margin_ratio: Decimal,
    pub maintenance_margin: Quote,
    pub margin_balance: Quote,
    pub wallet_balance: Quote,
}

/// Which margin figures the panel shows.
#[derive(Debug, Clone, Copy)]
pub enum AccountView<'a> {
    Cross,
    Isolated(&'a Position),
}

// wallet plus everything locked in positions, marked to market
fn total_value(positions: &[Position], wallet: &Wallet) -> Quote {
    let locked: Quote = positions.iter().map(|p| isolated_margin_balance(p.margin, p.pnl)).sum();
    wallet.balance.add(locked)
}

pub fn calculate_account_info(
    positions: &[Position],
    wallet: &Wallet,
    view: AccountView<'_>,
    maintenance_margin_rate: Decimal,
) -> AccountInfo {
    let total_value = total_value(positions, wallet);

    match view {
        AccountView::Cross => {
            let cross: Vec<&Position> = positions
                .iter()
                .filter(|p| p.margin_mode == MarginMode::Cross)
                .collect();

            let unrealized_pnl: Quote = cross.iter().map(|p| p.pnl).sum();
            let maintenance: Quote = cross
                .iter()
                .map(|p| maintenance_margin(p.notional_at_mark(), maintenance_margin_rate))
                .sum();
            let position_equity: Quote = cross
                .iter()
                .map(|p| isolated_margin_balance(p.margin, p.pnl))
                .sum();
            let margin_balance = wallet.balance.add(position_equity);

            AccountInfo {
                total_value,
                unrealized_pnl,
                margin_ratio: margin_ratio_percent(maintenance, margin_balance)
                    .unwrap_or(Decimal::ZERO),
                maintenance_margin: maintenance,
                margin_balance,
                wallet_balance: wallet.balance,
            }
        }
        AccountView::Isolated(position) => {
            let position_notional = position.notional_at_mark();
            let maintenance = maintenance_margin(position_notional, maintenance_margin_rate);

            AccountInfo {
                total_value,
                unrealized_pnl: position.pnl,
                margin_ratio: margin_ratio_percent(maintenance, position_notional)
                    .unwrap_or(Decimal::ZERO),
                maintenance_margin: maintenance,
                margin_balance: isolated_margin_balance(position.margin, position.pnl),
                wallet_balance: wallet.balance,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liquidation::LiquidationModel;
    use crate::position::revalue;
    use crate::types::{Leverage, PositionId, Price, Side};
    use rust_decimal_macros::dec;

    const MMR: Decimal = dec!(0.005);

    fn position(id: u64, mode: MarginMode, mark: Decimal) -> Position {
        let pos = Position::open(
            PositionId(id),
            "XAUUSDC",
            Side::Buy,
            dec!(1),
            Price::new_unchecked(dec!(2800)),
            Leverage::new(20).unwrap(),
            mode,
            &LiquidationModel::default(),
        );
        revalue(&pos, Price::new_unchecked(mark))
    }

    #[test]
    fn wallet_reserve_and_release() {
        let mut wallet = Wallet::new(Quote::new(dec!(1000)));
        wallet.reserve(Quote::new(dec!(140))).unwrap();
        assert_eq!(wallet.balance.value(), dec!(860));

        wallet.release(Quote::new(dec!(140)));
        assert_eq!(wallet.balance.value(), dec!(1000));
    }

    #[test]
    fn wallet_rejects_overdraw() {
        let mut wallet = Wallet::new(Quote::new(dec!(100)));
        let err = wallet.withdraw(Quote::new(dec!(150))).unwrap_err();
        assert!(matches!(err, WalletError::InsufficientBalance { .. }));
        assert_eq!(wallet.balance.value(), dec!(100));
    }

    #[test]
    fn settle_close_floors_at_zero() {
        let mut wallet = Wallet::new(Quote::zero());
        let payout = wallet.settle_close(Quote::new(dec!(140)), Quote::new(dec!(-200)));
        assert_eq!(payout.value(), dec!(0));
        assert_eq!(wallet.balance.value(), dec!(0));
        assert_eq!(wallet.realized_pnl.value(), dec!(-200));
    }

    #[test]
    fn cross_view_no_positions() {
        let wallet = Wallet::new(Quote::new(dec!(1000)));
        let info = calculate_account_info(&[], &wallet, AccountView::Cross, MMR);

        assert_eq!(info.total_value.value(), dec!(1000));
        assert_eq!(info.margin_balance.value(), dec!(1000));
        assert_eq!(info.maintenance_margin.value(), dec!(0));
        assert_eq!(info.margin_ratio, dec!(0));
    }

    #[test]
    fn cross_view_aggregates_cross_only() {
        let wallet = Wallet::new(Quote::new(dec!(860)));
        let positions = vec![
            position(1, MarginMode::Cross, dec!(2850)),
            position(2, MarginMode::Isolated, dec!(2850)),
        ];

        let info = calculate_account_info(&positions, &wallet, AccountView::Cross, MMR);

        assert_eq!(info.unrealized_pnl.value(), dec!(50));
        // 2850 * 0.005
        assert_eq!(info.maintenance_margin.value(), dec!(14.25));
        // 860 + 140 + 50
        assert_eq!(info.margin_balance.value(), dec!(1050));
        // wallet + both positions at (140 + 50)
        assert_eq!(info.total_value.value(), dec!(1240));
    }

    #[test]
    fn isolated_view_uses_real_ratio() {
        let wallet = Wallet::new(Quote::new(dec!(500)));
        let pos = position(1, MarginMode::Isolated, dec!(2800));
        let positions = vec![pos.clone()];

        let info = calculate_account_info(&positions, &wallet, AccountView::Isolated(&pos), MMR);

        assert_eq!(info.margin_balance.value(), dec!(140));
        assert_eq!(info.maintenance_margin.value(), dec!(14));
        // 14 / 2800 * 100
        assert_eq!(info.margin_ratio, dec!(0.5));
    }
}
