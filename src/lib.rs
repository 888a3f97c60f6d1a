// perps-terminal: client-side core of a simulated perpetual futures terminal.
// positions, orders, wallet and asset ledger for gold/silver perps quoted in USDC.
// all data is mocked locally; commands are synchronous apart from the quote
// ticker and the phased transfer helpers.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: ids, Side, Price, Quote, Leverage, Timestamp
//   2.x  order.rs: resting limit orders, order requests
//   3.x  margin.rs: notional, margin, fee, margin ratio math
//   3.1  estimate.rs: order-form estimate, margin-modal preview
//   4.x  position.rs: position struct, pnl, revalue/reduce
//   5.x  store.rs: newest-first position and order lists
//   5.3  history.rs: order, trade and transaction history
//   6.x  liquidation.rs: liquidation price model, trigger check
//   7.x  notification.rs: toast queue with visible/exiting phases
//   7.1  i18n.rs: notification copy per language
//   8.x  config.rs: trading params, ledger rules, timings, env presets
//   9.x  price_feed.rs: feed source trait, quote walk, cancellable ticker task
//   9.1  order_book.rs: mock depth and recent-trades tape
//   9.2  ledger.rs: deposit/withdraw history (mocked)
//   9.3  transfer.rs: phased transfer simulation with cancel
//   10.x events.rs: state transition events for audit
//   11.x engine/: the terminal: session, orders, positions, funds, pricing
//   12.x account.rs: wallet + derived account panel
//   13.x market.rs: market catalog, 24h stats, funding clock
//   14.x session.rs: wallet connect/sign state

// core trading modules
pub mod account;
pub mod engine;
pub mod estimate;
pub mod events;
pub mod history;
pub mod liquidation;
pub mod margin;
pub mod market;
pub mod order;
pub mod position;
pub mod store;
pub mod types;

// session and presentation support
pub mod i18n;
pub mod notification;
pub mod session;

// integration modules
pub mod config;
pub mod ledger;
pub mod order_book;
pub mod price_feed;
pub mod transfer;

// re exports for convenience
pub use account::*;
pub use engine::*;
pub use estimate::*;
pub use events::*;
pub use history::*;
pub use liquidation::*;
pub use margin::*;
pub use market::*;
pub use order::*;
pub use position::*;
pub use store::*;
pub use types::*;
pub use config::{ConfigError, Environment, FeedConfig, TerminalConfig, TradingConfig};
pub use i18n::{Language, MessageKey};
pub use ledger::{AssetHistoryRecord, AssetLedger, LedgerRules, TransferKind, TransferStatus};
pub use notification::{Notification, NotificationId, NotificationKind, NotificationQueue};
pub use order_book::{BookLevel, BookSnapshot, MarketTrade, MockOrderBookSource, RecentTrades};
pub use price_feed::{FeedSource, FeedTicker, PriceQuote, RandomWalkSource};
pub use session::{ConnectPrompt, Session, SessionState, WalletProvider};
pub use transfer::{cancel_pair, run_transfer, CancelHandle, CancelSignal, PhaseDelays, TransferError, TransferPhase};
