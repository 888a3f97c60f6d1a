// 11.0 engine/core.rs: the terminal. holds session, wallet, positions, orders,
// ledger, trading history, markets, notifications and the audit log. one owner, synchronous commands.

use super::results::{TerminalError, ValidationError};
use crate::account::{calculate_account_info, AccountInfo, AccountView, Wallet};
use crate::config::TerminalConfig;
use crate::events::{Event, EventId, EventPayload};
use crate::history::TradingHistory;
use crate::i18n::{Language, MessageKey};
use crate::ledger::AssetLedger;
use crate::market::{MarketCatalog, MarketData};
use crate::notification::{NotificationId, NotificationKind, NotificationQueue};
use crate::position::Position;
use crate::session::Session;
use crate::store::{OrderStore, PositionStore};
use crate::order::Order;
use crate::order_book::{BookSnapshot, RecentTrades};
use crate::types::{Leverage, PositionId, Price, RecordId, Timestamp};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// largest amount or price any command accepts. the product of two such values
// stays far inside Decimal's range, so notional and pnl math cannot overflow.
pub(super) const MAX_INPUT: Decimal = dec!(1_000_000_000_000);
// smallest price accepted. keeps quote-to-base conversions bounded too
pub(super) const MIN_PRICE: Decimal = dec!(0.0001);

/** 11.1: terminal struct. all state lives here */
#[derive(Debug)]
pub struct Terminal {
    pub(super) config: TerminalConfig,
    pub(super) session: Session,
    pub(super) language: Language,
    pub(super) wallet: Wallet,
    pub(super) positions: PositionStore,
    pub(super) orders: OrderStore,
    pub(super) ledger: AssetLedger,
    pub(super) history: TradingHistory,
    pub(super) markets: MarketCatalog,
    // depth and tape of the active market only
    pub(super) book: Option<BookSnapshot>,
    pub(super) recent_trades: RecentTrades,
    pub(super) notifications: NotificationQueue,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    // positions, orders and ledger records share this counter
    pub(super) next_id: u64,
    pub(super) rng: StdRng,
    pub(super) current_time: Timestamp,
}

impl Terminal {
    pub fn new(config: TerminalConfig) -> Self {
        Self::starting_at(config, Timestamp::from_millis(0))
    }

    pub fn starting_at(config: TerminalConfig, now: Timestamp) -> Self {
        let mut terminal = Self {
            session: Session::new(),
            language: Language::default(),
            wallet: Wallet::new(config.initial_wallet_balance),
            positions: PositionStore::new(),
            orders: OrderStore::new(),
            ledger: AssetLedger::new(config.ledger.clone()),
            history: TradingHistory::new(),
            markets: MarketCatalog::new(config.markets.clone(), now),
            book: None,
            recent_trades: RecentTrades::new(config.feed.recent_trades_cap),
            notifications: NotificationQueue::new(config.notifications),
            events: Vec::new(),
            next_event_id: 1,
            next_id: 1,
            rng: StdRng::seed_from_u64(config.rng_seed),
            current_time: now,
            config,
        };
        if terminal.config.seed_history {
            terminal.seed_asset_history();
        }
        terminal
    }

    // sample transfers draw ids from the shared counter
    fn seed_asset_history(&mut self) {
        let Self {
            ledger,
            rng,
            next_id,
            current_time,
            ..
        } = self;
        let seeded = ledger.seed_samples(
            || {
                let id = *next_id;
                *next_id += 1;
                RecordId(id)
            },
            rng,
            *current_time,
        );
        tracing::debug!(seeded, "Asset history seeded");
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
        self.on_clock();
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, millis: i64) {
        self.current_time = self.current_time.plus_millis(millis);
        self.on_clock();
    }

    fn on_clock(&mut self) {
        self.notifications.tick(self.current_time);
        self.roll_funding();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn positions(&self) -> &[Position] {
        self.positions.as_slice()
    }

    pub fn position(&self, id: PositionId) -> Option<&Position> {
        self.positions.get(id)
    }

    pub fn orders(&self) -> &[Order] {
        self.orders.as_slice()
    }

    pub fn ledger(&self) -> &AssetLedger {
        &self.ledger
    }

    pub fn history(&self) -> &TradingHistory {
        &self.history
    }

    pub fn markets(&self) -> &MarketCatalog {
        &self.markets
    }

    pub fn active_market(&self) -> Option<&MarketData> {
        self.markets.active()
    }

    pub fn order_book(&self) -> Option<&BookSnapshot> {
        self.book.as_ref()
    }

    pub fn recent_trades(&self) -> &RecentTrades {
        &self.recent_trades
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn dismiss_notification(&mut self, id: NotificationId) {
        self.notifications.dismiss(id, self.current_time);
    }

    // 11.2: cross view, recomputed from scratch
    pub fn account_info(&self) -> AccountInfo {
        calculate_account_info(
            self.positions.as_slice(),
            &self.wallet,
            AccountView::Cross,
            self.config.trading.maintenance_margin_rate,
        )
    }

    pub fn isolated_account_info(&self, id: PositionId) -> Result<AccountInfo, TerminalError> {
        let position = self
            .positions
            .get(id)
            .ok_or(TerminalError::PositionNotFound(id))?;
        Ok(calculate_account_info(
            self.positions.as_slice(),
            &self.wallet,
            AccountView::Isolated(position),
            self.config.trading.maintenance_margin_rate,
        ))
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub(super) fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(super) fn require_signed(&mut self) -> Result<(), TerminalError> {
        if self.session.is_signed() {
            return Ok(());
        }
        let prompt = self.session.raise_prompt();
        tracing::warn!(?prompt, "Command refused, wallet not signed");
        self.notify(NotificationKind::Warning, MessageKey::ConnectRequired);
        Err(TerminalError::NotAuthenticated)
    }

    pub(super) fn validate_leverage(&self, requested: u32) -> Result<Leverage, ValidationError> {
        let max = self.config.trading.max_leverage;
        Leverage::new(requested)
            .filter(|l| l.value() <= max)
            .ok_or(ValidationError::InvalidLeverage { requested, max })
    }

    pub(super) fn validate_amount(amount: Decimal) -> Result<Decimal, ValidationError> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(amount));
        }
        if amount > MAX_INPUT {
            return Err(ValidationError::OutOfRange(amount));
        }
        Ok(amount)
    }

    pub(super) fn validate_price(price: Decimal) -> Result<Price, ValidationError> {
        if price <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice(price));
        }
        if !(MIN_PRICE..=MAX_INPUT).contains(&price) {
            return Err(ValidationError::OutOfRange(price));
        }
        Ok(Price::new_unchecked(price))
    }

    // validation failures get an error toast. auth refusals raised their own
    // warning already and a missing position is a stale click
    pub(super) fn report_failure<T>(
        &mut self,
        result: Result<T, TerminalError>,
    ) -> Result<T, TerminalError> {
        if let Err(TerminalError::Validation(reason)) = &result {
            self.notify(
                NotificationKind::Error,
                MessageKey::Rejected {
                    reason: reason.clone(),
                },
            );
        }
        result
    }

    pub(super) fn notify(&mut self, kind: NotificationKind, key: MessageKey) -> NotificationId {
        self.notifications
            .push_message(kind, &key, self.language, self.current_time)
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        tracing::trace!(event_id = event.id.0, payload = ?event.payload, "Event");

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}
