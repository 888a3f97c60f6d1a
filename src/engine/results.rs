// 11.0.2: result types and errors for terminal commands.

use crate::account::WalletError;
use crate::order::Order;
use crate::position::Position;
use crate::transfer::TransferError;
use crate::types::{OrderType, PositionId, Price, Quote, Side};
use rust_decimal::Decimal;

/// What a successful `place_order` produced.
#[derive(Debug, Clone)]
pub enum Placement {
    /// Market order: filled immediately into a new position.
    Filled { position: Position, fee: Quote },
    /// Limit order: resting in the open-orders list.
    Resting(Order),
}

impl Placement {
    pub fn position(&self) -> Option<&Position> {
        match self {
            Placement::Filled { position, .. } => Some(position),
            Placement::Resting(_) => None,
        }
    }

    pub fn order(&self) -> Option<&Order> {
        match self {
            Placement::Filled { .. } => None,
            Placement::Resting(order) => Some(order),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CloseResult {
    pub position_id: PositionId,
    pub close_type: OrderType,
    pub exit_price: Price,
    pub closed_size: Decimal,
    pub realized_pnl: Quote,
    pub margin_released: Quote,
    // what went back into the wallet
    pub payout: Quote,
    // None after a full close
    pub remaining: Option<Position>,
}

#[derive(Debug, Clone)]
pub struct LiquidationResult {
    pub position_id: PositionId,
    pub symbol: String,
    pub side: Side,
    pub size: Decimal,
    pub mark_price: Price,
    pub liquidation_price: Price,
    pub margin_lost: Quote,
}

#[derive(Debug, Clone, Default)]
pub struct QuoteOutcome {
    pub revalued: usize,
    pub liquidations: Vec<LiquidationResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("Price must be positive, got {0}")]
    NonPositivePrice(Decimal),

    #[error("Value {0} is beyond the accepted range")]
    OutOfRange(Decimal),

    #[error("Leverage {requested}x is outside 1x..={max}x")]
    InvalidLeverage { requested: u32, max: u32 },

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Quote, available: Quote },

    #[error("Extract of {requested} exceeds withdrawable margin {available}")]
    ExceedsWithdrawableMargin { requested: Quote, available: Quote },

    #[error("Unknown market {0}")]
    UnknownMarket(String),

    #[error("No active market")]
    NoActiveMarket,
}

impl From<WalletError> for ValidationError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::InsufficientBalance { requested, available } => {
                ValidationError::InsufficientBalance { requested, available }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TerminalError {
    #[error("Wallet not connected and signed")]
    NotAuthenticated,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Position {0} not found")]
    PositionNotFound(PositionId),

    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),
}

impl From<WalletError> for TerminalError {
    fn from(err: WalletError) -> Self {
        TerminalError::Validation(err.into())
    }
}
