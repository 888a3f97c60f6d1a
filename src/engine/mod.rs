// 11.0: the terminal. named commands validate input, mutate positions, orders,
// wallet and ledger through the calculator, and record an event plus a
// notification for every state change. no I/O apart from the async transfer helpers.

mod core;
mod funding;
mod funds;
mod history;
mod liquidations;
mod orders;
mod positions;
mod pricing;
mod results;
mod session;

pub use core::Terminal;
pub use results::{
    CloseResult, LiquidationResult, Placement, QuoteOutcome, TerminalError, ValidationError,
};
