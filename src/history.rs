// 5.3 history.rs: the bottom-panel history tabs. closed orders, executed trades
// and wallet transactions, all newest first and append-only.

use crate::order::{Order, OrderStatus};
use crate::store::{Keyed, RecordList};
use crate::types::{Price, Quote, Side, Timestamp, TradeId, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One execution: a market fill, a close or a liquidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub symbol: String,
    pub side: Side,
    pub price: Price,
    pub amount: Decimal,
    // price * amount
    pub total: Quote,
    pub fee: Quote,
    pub realized_pnl: Quote,
    pub time: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionKind {
    TradingFee,
    RealizedPnl,
    Liquidation,
}

/// Signed wallet movement caused by trading. Fees and losses are negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub symbol: String,
    pub amount: Quote,
    pub time: Timestamp,
}

impl Keyed for Trade {
    type Id = TradeId;

    fn key(&self) -> TradeId {
        self.id
    }
}

impl Keyed for Transaction {
    type Id = TransactionId;

    fn key(&self) -> TransactionId {
        self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradingHistory {
    orders: RecordList<Order>,
    trades: RecordList<Trade>,
    transactions: RecordList<Transaction>,
}

impl TradingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only orders that reached a final state belong here.
    pub fn record_order(&mut self, order: Order) {
        debug_assert!(order.status != OrderStatus::Open, "open orders live in the order store");
        self.orders.prepend(order);
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.trades.prepend(trade);
    }

    pub fn record_transaction(&mut self, transaction: Transaction) {
        self.transactions.prepend(transaction);
    }

    pub fn orders(&self) -> &[Order] {
        self.orders.as_slice()
    }

    pub fn trades(&self) -> &[Trade] {
        self.trades.as_slice()
    }

    /// `None` lists everything, like the "all" filter.
    pub fn transactions(&self, kind: Option<TransactionKind>) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| kind.map_or(true, |k| t.kind == k))
            .collect()
    }

    pub fn total(&self, kind: TransactionKind) -> Quote {
        self.transactions
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount)
            .sum()
    }
}
