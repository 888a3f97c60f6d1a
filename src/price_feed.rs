// Price Feed
//
// The terminal never talks to a real oracle. Ticks come from a FeedSource:
// the quote walk here, or the mock order book in order_book.rs. FeedTicker
// drives any source on a tokio interval and pushes ticks down a channel until
// it is stopped or dropped.

use crate::types::{Price, Timestamp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// One tick for one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub last: Price,
    pub mark: Price,
    pub index: Price,
    pub time: Timestamp,
}

/// Anything that produces periodic updates for one market. Implement this to
/// plug in a real feed.
pub trait FeedSource: Send {
    type Tick: Send + 'static;

    fn symbol(&self) -> &str;

    /// Next update, or None when the source has nothing this tick.
    fn next_tick(&mut self, now: Timestamp) -> Option<Self::Tick>;
}

const MIN_TICK: Decimal = dec!(0.01);

/// Mock source: random walk of up to `step_cents` per tick on the last price,
/// mark and index a few cents either side of it.
#[derive(Debug, Clone)]
pub struct RandomWalkSource {
    symbol: String,
    last: Decimal,
    step_cents: i64,
    spread_cents: i64,
    rng: StdRng,
}

impl RandomWalkSource {
    pub fn new(symbol: impl Into<String>, start: Price, seed: u64) -> Self {
        Self {
            symbol: symbol.into(),
            last: start.value(),
            step_cents: 25,
            spread_cents: 5,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_step_cents(mut self, step_cents: i64) -> Self {
        self.step_cents = step_cents.abs();
        self
    }

    pub fn last(&self) -> Decimal {
        self.last
    }

    fn jitter(&mut self, cents: i64) -> Decimal {
        Decimal::new(self.rng.gen_range(-cents..=cents), 2)
    }
}

impl FeedSource for RandomWalkSource {
    type Tick = PriceQuote;

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn next_tick(&mut self, now: Timestamp) -> Option<PriceQuote> {
        let step = self.jitter(self.step_cents);
        self.last = (self.last + step).max(MIN_TICK);

        let mark = (self.last + self.jitter(self.spread_cents)).max(MIN_TICK);
        let index = (self.last + self.jitter(self.spread_cents)).max(MIN_TICK);

        Some(PriceQuote {
            symbol: self.symbol.clone(),
            last: Price::new(self.last)?,
            mark: Price::new(mark)?,
            index: Price::new(index)?,
            time: now,
        })
    }
}

/// Handle to a running feed task. `stop` ends it cleanly and hands the source
/// back; dropping the handle aborts the task.
pub struct FeedTicker<S> {
    stop_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<S>>,
}

impl<S: FeedSource + 'static> FeedTicker<S> {
    pub fn spawn(source: S, period: Duration, buffer: usize) -> (Self, mpsc::Receiver<S::Tick>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_ticker(source, period, tx, stop_rx));

        (
            Self {
                stop_tx,
                handle: Some(handle),
            },
            rx,
        )
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub async fn stop(mut self) -> Option<S> {
        let _ = self.stop_tx.send(true);
        let handle = self.handle.take()?;
        match handle.await {
            Ok(source) => Some(source),
            Err(e) => {
                tracing::warn!(error = %e, "Feed ticker task did not finish cleanly");
                None
            }
        }
    }
}

impl<S> Drop for FeedTicker<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run_ticker<S: FeedSource>(
    mut source: S,
    period: Duration,
    tx: mpsc::Sender<S::Tick>,
    mut stop_rx: watch::Receiver<bool>,
) -> S {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await; // consume the first immediate tick

    tracing::info!(symbol = %source.symbol(), period_ms = period.as_millis() as u64, "Feed ticker started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(tick) = source.next_tick(Timestamp::now()) else {
                    continue;
                };
                tracing::debug!(symbol = %source.symbol(), "Feed tick");
                if tx.send(tick).await.is_err() {
                    tracing::debug!("Feed receiver dropped, stopping ticker");
                    break;
                }
            }
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
        }
    }

    tracing::info!(symbol = %source.symbol(), "Feed ticker stopped");
    source
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(seed: u64) -> RandomWalkSource {
        RandomWalkSource::new("XAUUSDC", Price::new_unchecked(dec!(2800)), seed)
    }

    #[test]
    fn walk_stays_within_step() {
        let mut src = source(42);
        let mut prev = src.last();
        for i in 0..200 {
            let quote = src.next_tick(Timestamp::from_millis(i)).unwrap();
            let moved = (quote.last.value() - prev).abs();
            assert!(moved <= dec!(0.25), "moved {} in one tick", moved);
            assert!((quote.mark.value() - quote.last.value()).abs() <= dec!(0.05));
            prev = quote.last.value();
        }
    }

    #[test]
    fn same_seed_same_path() {
        let mut a = source(7);
        let mut b = source(7);
        for i in 0..20 {
            assert_eq!(
                a.next_tick(Timestamp::from_millis(i)),
                b.next_tick(Timestamp::from_millis(i))
            );
        }
    }

    #[test]
    fn price_never_goes_non_positive() {
        let mut src = RandomWalkSource::new("DUST", Price::new_unchecked(dec!(0.02)), 1)
            .with_step_cents(500);
        for i in 0..100 {
            let quote = src.next_tick(Timestamp::from_millis(i)).unwrap();
            assert!(quote.last.value() >= MIN_TICK);
        }
    }

    #[tokio::test]
    async fn ticker_emits_then_stops() {
        let (ticker, mut rx) = FeedTicker::spawn(source(3), Duration::from_millis(10), 8);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.symbol, "XAUUSDC");
        assert!(ticker.is_running());

        let returned = ticker.stop().await.unwrap();
        assert_eq!(returned.symbol(), "XAUUSDC");

        // drain whatever was buffered, then the channel closes
        while rx.recv().await.is_some() {}
    }

    #[tokio::test]
    async fn dropping_ticker_aborts_task() {
        let (ticker, mut rx) = FeedTicker::spawn(source(5), Duration::from_millis(10), 8);
        rx.recv().await.unwrap();
        drop(ticker);

        let closed = tokio::time::timeout(Duration::from_secs(1), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok());
    }
}
