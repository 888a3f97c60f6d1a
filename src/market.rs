//! Market catalog and per-market statistics.
//!
//! Each market carries its last/mark/index prices, rolling 24h statistics and
//! funding state. Funding here is display-only: the rate and countdown are
//! shown, nothing is settled against positions.

use crate::price_feed::PriceQuote;
use crate::types::{Price, Timestamp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const ONE_HOUR_MS: i64 = 60 * 60 * 1000;
const YEAR_MS: i64 = 365 * 24 * ONE_HOUR_MS;

/// Static market configuration (immutable after creation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSpec {
    /// Trading symbol, e.g. "XAUUSDC"
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    /// Opening last/mark/index price
    pub initial_price: Decimal,
    /// Percent per funding interval
    pub funding_rate: Decimal,
    pub funding_interval_ms: i64,
}

impl MarketSpec {
    pub fn xau_usdc() -> Self {
        Self {
            symbol: "XAUUSDC".to_string(),
            base_asset: "XAU".to_string(),
            quote_asset: "USDC".to_string(),
            initial_price: dec!(2800),
            funding_rate: dec!(0.0100),
            funding_interval_ms: ONE_HOUR_MS,
        }
    }

    pub fn xag_usdc() -> Self {
        Self {
            symbol: "XAGUSDC".to_string(),
            base_asset: "XAG".to_string(),
            quote_asset: "USDC".to_string(),
            initial_price: dec!(32.50),
            funding_rate: dec!(0.0050),
            funding_interval_ms: ONE_HOUR_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketData {
    pub spec: MarketSpec,
    pub last_price: Price,
    pub mark_price: Price,
    pub index_price: Price,
    /// Reference price the 24h change is measured from
    pub open_24h: Price,
    pub high_24h: Price,
    pub low_24h: Price,
    pub funding_rate: Decimal,
    pub next_funding_time: Timestamp,
}

impl MarketData {
    pub fn new(spec: MarketSpec, now: Timestamp) -> Option<Self> {
        let price = Price::new(spec.initial_price)?;
        let next_funding_time = now.plus_millis(spec.funding_interval_ms);
        Some(Self {
            funding_rate: spec.funding_rate,
            spec,
            last_price: price,
            mark_price: price,
            index_price: price,
            open_24h: price,
            high_24h: price,
            low_24h: price,
            next_funding_time,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.spec.symbol
    }

    pub fn apply_quote(&mut self, quote: &PriceQuote) {
        self.last_price = quote.last;
        self.mark_price = quote.mark;
        self.index_price = quote.index;
        self.high_24h = self.high_24h.max(quote.last);
        self.low_24h = self.low_24h.min(quote.last);
    }

    pub fn change_24h(&self) -> Decimal {
        self.last_price.value() - self.open_24h.value()
    }

    pub fn change_24h_percent(&self) -> Decimal {
        self.change_24h()
            .checked_div(self.open_24h.value())
            .map(|r| r * dec!(100))
            .unwrap_or(Decimal::ZERO)
    }

    /// Funding rate annualized: rate per interval times intervals per year.
    /// With hourly funding this is `rate * 24 * 365`.
    pub fn estimated_apr(&self) -> Decimal {
        let per_year = Decimal::from(YEAR_MS / self.spec.funding_interval_ms.max(1));
        self.funding_rate * per_year
    }

    // positive rate: longs pay shorts
    pub fn longs_pay(&self) -> bool {
        self.funding_rate >= Decimal::ZERO
    }

    pub fn funding_countdown(&self, now: Timestamp) -> String {
        let diff = (self.next_funding_time.as_millis() - now.as_millis()).max(0);
        let h = diff / ONE_HOUR_MS;
        let m = (diff % ONE_HOUR_MS) / 60_000;
        let s = (diff % 60_000) / 1000;
        format!("{:02}:{:02}:{:02}", h, m, s)
    }

    // moves next_funding_time past `now`. returns how many intervals elapsed
    pub fn roll_funding(&mut self, now: Timestamp) -> u32 {
        let interval = self.spec.funding_interval_ms.max(1);
        let mut rolled = 0;
        while now >= self.next_funding_time {
            self.next_funding_time = self.next_funding_time.plus_millis(interval);
            rolled += 1;
        }
        rolled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketCatalog {
    markets: Vec<MarketData>,
    active: usize,
}

impl MarketCatalog {
    // first spec is the active market. specs with a non-positive price are skipped
    pub fn new(specs: Vec<MarketSpec>, now: Timestamp) -> Self {
        let markets = specs
            .into_iter()
            .filter_map(|spec| MarketData::new(spec, now))
            .collect();
        Self { markets, active: 0 }
    }

    pub fn active(&self) -> Option<&MarketData> {
        self.markets.get(self.active)
    }

    pub fn get(&self, symbol: &str) -> Option<&MarketData> {
        self.markets.iter().find(|m| m.symbol() == symbol)
    }

    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut MarketData> {
        self.markets.iter_mut().find(|m| m.symbol() == symbol)
    }

    pub fn select(&mut self, symbol: &str) -> Option<&MarketData> {
        let index = self.markets.iter().position(|m| m.symbol() == symbol)?;
        self.active = index;
        self.markets.get(index)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.markets.iter().map(|m| m.symbol())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MarketData> {
        self.markets.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}
