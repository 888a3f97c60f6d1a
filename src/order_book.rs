// Order Book
//
// Mock depth and tape for the active market. The source walks a mid price,
// lays fixed-step levels either side of it and jiggles their amounts every
// tick; some ticks also print a trade. It plugs into FeedTicker like the
// quote walk does.

use crate::price_feed::FeedSource;
use crate::types::{Price, Side, Timestamp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const LEVEL_STEP: Decimal = dec!(0.5);
const MIN_LEVEL_AMOUNT: Decimal = dec!(0.1);
const MIN_TRADE_AMOUNT: Decimal = dec!(0.001);
const MIN_MID: Decimal = dec!(0.01);
// gap between generated backlog trades
const BACKLOG_SPACING_MS: i64 = 5_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub amount: Decimal,
    // running sum of amount from the top of the book outwards
    pub total: Decimal,
}

/// A print on the public tape. Not one of the user's own trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTrade {
    pub id: u64,
    pub symbol: String,
    pub side: Side,
    pub price: Price,
    pub amount: Decimal,
    pub time: Timestamp,
}

/// One order-book tick: both sides best first, plus an optional new print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub symbol: String,
    pub asks: Vec<BookLevel>,
    pub bids: Vec<BookLevel>,
    pub last: Price,
    pub trade: Option<MarketTrade>,
    pub time: Timestamp,
}

impl BookSnapshot {
    pub fn best_ask(&self) -> Option<&BookLevel> {
        self.asks.first()
    }

    pub fn best_bid(&self) -> Option<&BookLevel> {
        self.bids.first()
    }

    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()?.price.value() - self.best_bid()?.price.value())
    }
}

/// Newest-first tape, oldest prints fall off past `cap`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTrades {
    cap: usize,
    trades: VecDeque<MarketTrade>,
}

impl RecentTrades {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            trades: VecDeque::with_capacity(cap),
        }
    }

    pub fn push(&mut self, trade: MarketTrade) {
        self.trades.push_front(trade);
        self.trades.truncate(self.cap);
    }

    /// Replace the tape with a newest-first backlog.
    pub fn reset(&mut self, backlog: Vec<MarketTrade>) {
        self.trades = backlog.into_iter().take(self.cap).collect();
    }

    pub fn clear(&mut self) {
        self.trades.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarketTrade> {
        self.trades.iter()
    }

    pub fn latest(&self) -> Option<&MarketTrade> {
        self.trades.front()
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct MockOrderBookSource {
    symbol: String,
    mid: Decimal,
    ask_amounts: Vec<Decimal>,
    bid_amounts: Vec<Decimal>,
    // chance in percent that a tick prints a trade
    trade_chance: u32,
    next_trade_id: u64,
    rng: StdRng,
}

impl MockOrderBookSource {
    pub fn new(symbol: impl Into<String>, start: Price, depth: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let side = |rng: &mut StdRng| -> Vec<Decimal> {
            (0..depth)
                .map(|_| Decimal::new(rng.gen_range(100..=2_000), 3))
                .collect()
        };
        let ask_amounts = side(&mut rng);
        let bid_amounts = side(&mut rng);
        Self {
            symbol: symbol.into(),
            mid: start.value(),
            ask_amounts,
            bid_amounts,
            trade_chance: 60,
            next_trade_id: 1,
            rng,
        }
    }

    pub fn with_trade_chance(mut self, percent: u32) -> Self {
        self.trade_chance = percent.min(100);
        self
    }

    pub fn mid(&self) -> Decimal {
        self.mid
    }

    /// Backlog for an empty tape: `count` prints within 2.5 of the mid,
    /// 5 s apart, newest first ending at `now`.
    pub fn backlog(&mut self, count: usize, now: Timestamp) -> Vec<MarketTrade> {
        (0..count)
            .filter_map(|i| {
                let offset = Decimal::new(self.rng.gen_range(-250..=250), 2);
                let price = Price::new((self.mid + offset).max(MIN_MID))?;
                let amount = Decimal::new(self.rng.gen_range(1..=2_000), 3);
                let time = now.plus_millis(-(i as i64) * BACKLOG_SPACING_MS);
                Some(self.make_trade(price, amount, time))
            })
            .collect()
    }

    pub fn snapshot(&self, trade: Option<MarketTrade>, now: Timestamp) -> Option<BookSnapshot> {
        Some(BookSnapshot {
            symbol: self.symbol.clone(),
            asks: levels(self.mid, &self.ask_amounts, Side::Sell),
            bids: levels(self.mid, &self.bid_amounts, Side::Buy),
            last: Price::new(self.mid)?,
            trade,
            time: now,
        })
    }

    fn perturb(&mut self) {
        let rng = &mut self.rng;
        for amount in self.ask_amounts.iter_mut().chain(self.bid_amounts.iter_mut()) {
            let step = Decimal::new(rng.gen_range(-500..=500), 3);
            *amount = (*amount + step).max(MIN_LEVEL_AMOUNT);
        }
    }

    fn make_trade(&mut self, price: Price, amount: Decimal, time: Timestamp) -> MarketTrade {
        let side = if self.rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        let id = self.next_trade_id;
        self.next_trade_id += 1;
        MarketTrade {
            id,
            symbol: self.symbol.clone(),
            side,
            price,
            amount,
            time,
        }
    }
}

// asks climb away from the mid, bids fall away from it. levels that would sit
// at or below zero are left out
fn levels(mid: Decimal, amounts: &[Decimal], side: Side) -> Vec<BookLevel> {
    let mut total = Decimal::ZERO;
    amounts
        .iter()
        .enumerate()
        .filter_map(|(i, &amount)| {
            let offset = LEVEL_STEP * Decimal::from(i as u64 + 1);
            let price = match side {
                Side::Sell => mid + offset,
                Side::Buy => mid - offset,
            };
            let price = Price::new(price)?;
            total += amount;
            Some(BookLevel {
                price,
                amount,
                total,
            })
        })
        .collect()
}

impl FeedSource for MockOrderBookSource {
    type Tick = BookSnapshot;

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn next_tick(&mut self, now: Timestamp) -> Option<BookSnapshot> {
        let step = Decimal::new(self.rng.gen_range(-25..=25), 2);
        self.mid = (self.mid + step).max(MIN_MID);
        self.perturb();

        let trade = if self.rng.gen_range(0..100) < self.trade_chance {
            let amount = Decimal::new(self.rng.gen_range(0..=1_200), 3).max(MIN_TRADE_AMOUNT);
            let price = Price::new(self.mid)?;
            Some(self.make_trade(price, amount, now))
        } else {
            None
        };

        self.snapshot(trade, now)
    }
}
