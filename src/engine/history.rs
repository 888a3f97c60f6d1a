//! Order, trade and transaction history.

use super::core::Terminal;
use crate::history::{Trade, Transaction, TransactionKind};
use crate::order::Order;
use crate::position::Position;
use crate::types::{OrderId, Price, Quote, Side, TradeId, TransactionId};
use rust_decimal::Decimal;

impl Terminal {
    /// Closed orders, newest first.
    pub fn order_history(&self) -> &[Order] {
        self.history.orders()
    }

    pub fn trade_history(&self) -> &[Trade] {
        self.history.trades()
    }

    /// Wallet movements from trading. `None` lists every kind.
    pub fn transactions(&self, kind: Option<TransactionKind>) -> Vec<&Transaction> {
        self.history.transactions(kind)
    }

    // 11.6: a market fill is an order, a trade and a fee debit
    pub(super) fn record_fill(&mut self, position: &Position, fee: Quote) {
        let order = Order::filled_market(
            OrderId(self.next_id()),
            position.symbol.clone(),
            position.side,
            position.entry_price,
            position.size,
            position.leverage,
            position.margin_mode,
            self.current_time,
        );
        self.history.record_order(order);
        self.record_trade(
            &position.symbol,
            position.side,
            position.entry_price,
            position.size,
            fee,
            Quote::zero(),
        );
        self.record_transaction(
            TransactionKind::TradingFee,
            &position.symbol,
            fee.mul(Decimal::NEGATIVE_ONE),
        );
    }

    // closing trades go the other way
    pub(super) fn record_close_trade(
        &mut self,
        position: &Position,
        exit_price: Price,
        amount: Decimal,
        realized_pnl: Quote,
    ) {
        self.record_trade(
            &position.symbol,
            position.side.opposite(),
            exit_price,
            amount,
            Quote::zero(),
            realized_pnl,
        );
        if !realized_pnl.value().is_zero() {
            self.record_transaction(TransactionKind::RealizedPnl, &position.symbol, realized_pnl);
        }
    }

    pub(super) fn record_liquidation_trade(&mut self, position: &Position) {
        let lost = position.margin.mul(Decimal::NEGATIVE_ONE);
        self.record_trade(
            &position.symbol,
            position.side.opposite(),
            position.mark_price,
            position.size,
            Quote::zero(),
            lost,
        );
        self.record_transaction(TransactionKind::Liquidation, &position.symbol, lost);
    }

    fn record_trade(
        &mut self,
        symbol: &str,
        side: Side,
        price: Price,
        amount: Decimal,
        fee: Quote,
        realized_pnl: Quote,
    ) {
        let trade = Trade {
            id: TradeId(self.next_id()),
            symbol: symbol.to_string(),
            side,
            price,
            amount,
            total: Quote::new(price.value() * amount),
            fee,
            realized_pnl,
            time: self.current_time,
        };
        self.history.record_trade(trade);
    }

    fn record_transaction(&mut self, kind: TransactionKind, symbol: &str, amount: Quote) {
        let transaction = Transaction {
            id: TransactionId(self.next_id()),
            kind,
            symbol: symbol.to_string(),
            amount,
            time: self.current_time,
        };
        self.history.record_transaction(transaction);
    }
}

#[cfg(test)]
mod tests {
    use crate::config::TerminalConfig;
    use crate::engine::Terminal;
    use crate::history::TransactionKind;
    use crate::order::{OrderRequest, OrderStatus};
    use crate::price_feed::PriceQuote;
    use crate::session::WalletProvider;
    use crate::types::{OrderType, Price, Quote, Side, Timestamp};
    use rust_decimal_macros::dec;

    fn signed_terminal() -> Terminal {
        let mut config = TerminalConfig::default();
        config.initial_wallet_balance = Quote::new(dec!(1000));
        let mut terminal = Terminal::new(config);
        terminal.connect_wallet(WalletProvider::Metamask);
        terminal.sign_message().unwrap();
        terminal
    }

    #[test]
    fn market_fill_records_order_trade_and_fee() {
        let mut terminal = signed_terminal();
        terminal
            .place_order(OrderRequest::market(Side::Buy, dec!(1), dec!(2800), 20))
            .unwrap();

        let order = &terminal.order_history()[0];
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.order_type, OrderType::Market);
        assert_eq!(order.filled, dec!(1));

        let trade = &terminal.trade_history()[0];
        assert_eq!(trade.side, Side::Buy);
        assert_eq!(trade.total.value(), dec!(2800));
        assert_eq!(trade.fee.value(), dec!(1.4));

        let fees = terminal.transactions(Some(TransactionKind::TradingFee));
        assert_eq!(fees.len(), 1);
        assert_eq!(fees[0].amount.value(), dec!(-1.4));
    }

    #[test]
    fn cancels_land_in_order_history() {
        let mut terminal = signed_terminal();
        let id = terminal
            .place_order(OrderRequest::limit(Side::Buy, dec!(1), dec!(2790), 5))
            .unwrap()
            .order()
            .unwrap()
            .id;
        terminal
            .place_order(OrderRequest::limit(Side::Sell, dec!(1), dec!(2850), 5))
            .unwrap();
        terminal
            .place_order(OrderRequest::limit(Side::Sell, dec!(1), dec!(2860), 5))
            .unwrap();

        terminal.cancel_order(id).unwrap();
        assert_eq!(terminal.order_history().len(), 1);
        assert_eq!(terminal.order_history()[0].id, id);
        assert_eq!(terminal.order_history()[0].status, OrderStatus::Canceled);

        terminal.cancel_all().unwrap();
        assert_eq!(terminal.order_history().len(), 3);
        assert!(terminal
            .order_history()
            .iter()
            .all(|o| o.status == OrderStatus::Canceled));
        // resting orders never trade
        assert!(terminal.trade_history().is_empty());
    }

    #[test]
    fn close_records_opposite_trade_and_pnl() {
        let mut terminal = signed_terminal();
        let id = terminal
            .place_order(OrderRequest::market(Side::Buy, dec!(1), dec!(2800), 20))
            .unwrap()
            .position()
            .unwrap()
            .id;
        terminal
            .close_position(id, OrderType::Limit, Some(dec!(2830)), None)
            .unwrap();

        let trade = &terminal.trade_history()[0];
        assert_eq!(trade.side, Side::Sell);
        assert_eq!(trade.price.value(), dec!(2830));
        assert_eq!(trade.realized_pnl.value(), dec!(30));
        assert_eq!(terminal.trade_history().len(), 2);

        let pnl = terminal.transactions(Some(TransactionKind::RealizedPnl));
        assert_eq!(pnl.len(), 1);
        assert_eq!(pnl[0].amount.value(), dec!(30));
        // fee then pnl, newest first
        assert_eq!(terminal.transactions(None).len(), 2);
        assert_eq!(terminal.transactions(None)[0].kind, TransactionKind::RealizedPnl);
    }

    #[test]
    fn flat_close_skips_pnl_transaction() {
        let mut terminal = signed_terminal();
        let id = terminal
            .place_order(OrderRequest::market(Side::Sell, dec!(1), dec!(2800), 10))
            .unwrap()
            .position()
            .unwrap()
            .id;
        terminal.close_position(id, OrderType::Market, None, None).unwrap();

        assert_eq!(terminal.trade_history().len(), 2);
        assert!(terminal
            .transactions(Some(TransactionKind::RealizedPnl))
            .is_empty());
    }

    #[test]
    fn liquidation_records_margin_loss() {
        let mut terminal = signed_terminal();
        terminal
            .place_order(OrderRequest::market(Side::Buy, dec!(1), dec!(2800), 20))
            .unwrap();

        let mark = Price::new_unchecked(dec!(2200));
        terminal
            .apply_quote(&PriceQuote {
                symbol: "XAUUSDC".to_string(),
                last: mark,
                mark,
                index: mark,
                time: Timestamp::from_millis(1_000),
            })
            .unwrap();

        let trade = &terminal.trade_history()[0];
        assert_eq!(trade.side, Side::Sell);
        assert_eq!(trade.price, mark);
        assert_eq!(trade.realized_pnl.value(), dec!(-140));

        let liquidations = terminal.transactions(Some(TransactionKind::Liquidation));
        assert_eq!(liquidations.len(), 1);
        assert_eq!(liquidations[0].amount.value(), dec!(-140));
        assert_eq!(
            terminal.history().total(TransactionKind::Liquidation).value(),
            dec!(-140)
        );
    }
}
