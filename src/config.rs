// 8.0 config.rs: all settings in one place. fees, margins, ledger rules, timings.
// 8.1 presets per environment, validate() before handing it to the terminal.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ledger::LedgerRules;
use crate::liquidation::LiquidationModel;
use crate::margin::DEFAULT_FEE_RATE;
use crate::market::MarketSpec;
use crate::notification::NotificationTimings;
use crate::transfer::PhaseDelays;
use crate::types::Quote;

/** 8.2: trading parameters. rates are fractions, 0.0005 = 0.05% */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    // Fee on notional for market fills
    pub fee_rate: Decimal,
    // Maintenance margin as a fraction of notional at mark
    pub maintenance_margin_rate: Decimal,
    // Margin that must stay in a position after an extract
    pub maintenance_floor: Quote,
    // Highest leverage the order form accepts
    pub max_leverage: u32,
    pub liquidation_model: LiquidationModel,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            fee_rate: DEFAULT_FEE_RATE,
            maintenance_margin_rate: dec!(0.005), // 0.5%
            maintenance_floor: Quote::new(dec!(100)),
            max_leverage: 20,
            liquidation_model: LiquidationModel::default(),
        }
    }
}

// Quote and order-book ticker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub tick_interval_ms: u64,
    // Max move of the mock last price per tick, in cents
    pub step_cents: i64,
    pub channel_buffer: usize,
    // Levels per side of the mock book
    pub book_depth: usize,
    pub recent_trades_cap: usize,
    // Prints generated for an empty tape
    pub backlog_trades: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            step_cents: 25,
            channel_buffer: 64,
            book_depth: 12,
            recent_trades_cap: 20,
            backlog_trades: 15,
        }
    }
}

// The complete terminal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    pub trading: TradingConfig,
    pub ledger: LedgerRules,
    pub feed: FeedConfig,
    pub notifications: NotificationTimings,
    pub transfer_delays: PhaseDelays,
    // First entry is the market selected at startup
    pub markets: Vec<MarketSpec>,
    pub initial_wallet_balance: Quote,
    // Audit log bound, oldest events dropped first
    pub max_events: usize,
    // Seeds tx hashes and the mock price walk
    pub rng_seed: u64,
    // Start the asset history with sample transfers in every status
    pub seed_history: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            trading: TradingConfig::default(),
            ledger: LedgerRules::default(),
            feed: FeedConfig::default(),
            notifications: NotificationTimings::default(),
            transfer_delays: PhaseDelays::default(),
            markets: vec![MarketSpec::xau_usdc(), MarketSpec::xag_usdc()],
            initial_wallet_balance: Quote::zero(),
            max_events: 10_000,
            rng_seed: 0x5eed,
            seed_history: false,
        }
    }
}

impl TerminalConfig {
    // Demo preset: funded wallet, fast ticks, quick transfers
    pub fn demo() -> Self {
        Self {
            initial_wallet_balance: Quote::new(dec!(10000)),
            feed: FeedConfig {
                tick_interval_ms: 250,
                ..FeedConfig::default()
            },
            seed_history: true,
            transfer_delays: PhaseDelays {
                approve_ms: 300,
                swap_ms: 300,
                deposit_ms: 300,
                withdraw_ms: 300,
            },
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    // Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let trading = &self.trading;

        if trading.fee_rate < Decimal::ZERO || trading.fee_rate >= dec!(0.01) {
            return Err(ConfigError::InvalidFees {
                reason: "Fee rate must be in [0, 1%)".to_string(),
            });
        }

        if trading.maintenance_margin_rate <= Decimal::ZERO
            || trading.maintenance_margin_rate >= Decimal::ONE
        {
            return Err(ConfigError::InvalidMargin {
                reason: "Maintenance margin rate must be between 0 and 1".to_string(),
            });
        }

        if trading.maintenance_floor.is_negative() {
            return Err(ConfigError::InvalidMargin {
                reason: "Maintenance floor cannot be negative".to_string(),
            });
        }

        if trading.max_leverage == 0 {
            return Err(ConfigError::InvalidMargin {
                reason: "Max leverage must be at least 1x".to_string(),
            });
        }

        match trading.liquidation_model {
            LiquidationModel::FixedRatio { buffer } if buffer <= Decimal::ZERO || buffer >= Decimal::ONE => {
                return Err(ConfigError::InvalidMargin {
                    reason: "Liquidation buffer must be between 0 and 1".to_string(),
                });
            }
            LiquidationModel::LeverageScaled { k } if k <= Decimal::ZERO || k > Decimal::ONE => {
                return Err(ConfigError::InvalidMargin {
                    reason: "Liquidation factor must be in (0, 1]".to_string(),
                });
            }
            _ => {}
        }

        if self.ledger.withdraw_fee.is_negative() || !self.ledger.review_threshold.is_positive() {
            return Err(ConfigError::InvalidLedger {
                reason: "Withdraw fee must be >= 0 and review threshold > 0".to_string(),
            });
        }

        if self.markets.is_empty() {
            return Err(ConfigError::InvalidMarket {
                reason: "Need at least one market".to_string(),
            });
        }

        for spec in &self.markets {
            if spec.initial_price <= Decimal::ZERO {
                return Err(ConfigError::InvalidMarket {
                    reason: format!("{} needs a positive initial price", spec.symbol),
                });
            }
            if spec.funding_interval_ms <= 0 {
                return Err(ConfigError::InvalidMarket {
                    reason: format!("{} needs a positive funding interval", spec.symbol),
                });
            }
        }

        if self.feed.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidFeed {
                reason: "Tick interval must be positive".to_string(),
            });
        }

        if self.feed.book_depth == 0 || self.feed.recent_trades_cap == 0 {
            return Err(ConfigError::InvalidFeed {
                reason: "Book depth and recent trades cap must be positive".to_string(),
            });
        }

        if self.max_events == 0 {
            return Err(ConfigError::InvalidFeed {
                reason: "Event log must hold at least one event".to_string(),
            });
        }

        if self.initial_wallet_balance.is_negative() {
            return Err(ConfigError::InvalidLedger {
                reason: "Initial wallet balance cannot be negative".to_string(),
            });
        }

        Ok(())
    }
}

// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid margin settings: {reason}")]
    InvalidMargin { reason: String },
    #[error("Invalid market settings: {reason}")]
    InvalidMarket { reason: String },
    #[error("Invalid fee settings: {reason}")]
    InvalidFees { reason: String },
    #[error("Invalid ledger settings: {reason}")]
    InvalidLedger { reason: String },
    #[error("Invalid feed settings: {reason}")]
    InvalidFeed { reason: String },
    #[error("Could not parse config: {reason}")]
    Parse { reason: String },
    #[error("Could not read config {path}: {reason}")]
    Io { path: String, reason: String },
}

// Environment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Demo,
}

impl Environment {
    pub fn config(&self) -> TerminalConfig {
        match self {
            Environment::Development => TerminalConfig::default(),
            Environment::Demo => TerminalConfig::demo(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = TerminalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.trading.max_leverage, 20);
        assert_eq!(config.markets[0].symbol, "XAUUSDC");
    }

    #[test]
    fn test_environment_presets() {
        assert!(Environment::Development.config().validate().is_ok());
        assert!(Environment::Demo.config().validate().is_ok());
        assert!(Environment::Demo.config().initial_wallet_balance.is_positive());
    }

    #[test]
    fn test_invalid_margin() {
        let mut config = TerminalConfig::default();
        config.trading.maintenance_margin_rate = dec!(1.1);

        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::InvalidMargin { .. })));
    }

    #[test]
    fn test_invalid_liquidation_buffer() {
        let mut config = TerminalConfig::default();
        config.trading.liquidation_model = LiquidationModel::FixedRatio { buffer: dec!(1) };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMargin { .. })));
    }

    #[test]
    fn test_no_markets() {
        let mut config = TerminalConfig::default();
        config.markets.clear();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMarket { .. })));
    }

    #[test]
    fn test_config_serialization() {
        let config = TerminalConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back = TerminalConfig::from_json(&json).unwrap();
        assert_eq!(back.markets.len(), config.markets.len());
        assert_eq!(back.trading.liquidation_model, config.trading.liquidation_model);
    }

    #[test]
    fn test_empty_trade_tape_rejected() {
        let mut config = TerminalConfig::default();
        config.feed.recent_trades_cap = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidFeed { .. })));
    }

    #[test]
    fn test_parse_error() {
        let err = TerminalConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
