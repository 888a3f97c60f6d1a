// 10.0: every state change produces an event. the terminal keeps a bounded audit log
// of them, oldest dropped first. the EventPayload enum lists all event types.

use crate::estimate::MarginAdjustment;
use crate::i18n::Language;
use crate::ledger::TransferStatus;
use crate::session::WalletProvider;
use crate::types::{
    Leverage, MarginMode, OrderId, OrderType, PositionId, Price, Quote, RecordId, Side, Timestamp,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // Session events
    WalletConnected(WalletConnectedEvent),
    MessageSigned,
    Disconnected(DisconnectedEvent),
    LanguageChanged(Language),

    // Trade events
    OrderPlaced(OrderPlacedEvent),
    OrderCanceled(OrderCanceledEvent),

    // Position events
    PositionOpened(PositionOpenedEvent),
    PositionClosed(PositionClosedEvent),
    MarginAdjusted(MarginAdjustedEvent),

    // Account events
    Deposit(TransferEvent),
    Withdrawal(TransferEvent),

    // Risk events
    Liquidation(LiquidationEvent),

    // Market data events
    MarkPriceUpdate(MarkPriceUpdateEvent),
    MarketSelected(MarketSelectedEvent),
    FundingRolled(FundingRolledEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConnectedEvent {
    pub provider: WalletProvider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisconnectedEvent {
    pub positions_dropped: usize,
    pub orders_dropped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedEvent {
    pub order_id: OrderId,
    pub symbol: String,
    pub side: Side,
    pub price: Price,
    pub amount: Decimal,
    pub leverage: Leverage,
    pub margin_mode: MarginMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCanceledEvent {
    pub order_id: OrderId,
    pub symbol: String,
    pub reason: CancelReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    UserRequested,
    CancelAll,
    Disconnected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionOpenedEvent {
    pub position_id: PositionId,
    pub symbol: String,
    pub side: Side,
    pub size: Decimal,
    pub entry_price: Price,
    pub margin: Quote,
    pub fee: Quote,
    pub leverage: Leverage,
    pub liquidation_price: Price,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionClosedEvent {
    pub position_id: PositionId,
    pub symbol: String,
    pub close_type: OrderType,
    pub exit_price: Price,
    pub closed_size: Decimal,
    pub remaining_size: Decimal,
    pub realized_pnl: Quote,
    pub margin_returned: Quote,
    pub close_reason: CloseReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    UserClosed,
    CloseAll,
    Disconnected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginAdjustedEvent {
    pub position_id: PositionId,
    pub kind: MarginAdjustment,
    pub amount: Quote,
    pub old_margin: Quote,
    pub new_margin: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferEvent {
    pub record_id: RecordId,
    pub amount: Quote,
    pub fee: Option<Quote>,
    pub status: TransferStatus,
    pub new_balance: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidationEvent {
    pub position_id: PositionId,
    pub symbol: String,
    pub side: Side,
    pub size: Decimal,
    pub mark_price: Price,
    pub liquidation_price: Price,
    pub margin_lost: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkPriceUpdateEvent {
    pub symbol: String,
    pub last_price: Price,
    pub mark_price: Price,
    pub index_price: Price,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSelectedEvent {
    pub previous: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingRolledEvent {
    pub symbol: String,
    pub funding_rate: Decimal,
    pub next_funding_time: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn liquidation_event_serializes() {
        let event = Event::new(
            EventId(3),
            Timestamp::from_millis(1000),
            EventPayload::Liquidation(LiquidationEvent {
                position_id: PositionId(1),
                symbol: "XAUUSDC".to_string(),
                side: Side::Buy,
                size: dec!(1),
                mark_price: Price::new_unchecked(dec!(2239)),
                liquidation_price: Price::new_unchecked(dec!(2240)),
                margin_lost: Quote::new(dec!(140)),
            }),
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["id"], 3);
        assert!(json["payload"]["Liquidation"].is_object());
    }
}
