//! Quote ticks, order-book ticks and market selection.

use super::core::Terminal;
use super::results::{QuoteOutcome, TerminalError, ValidationError};
use crate::events::{EventPayload, MarkPriceUpdateEvent, MarketSelectedEvent};
use crate::market::MarketData;
use crate::order_book::{BookSnapshot, MarketTrade};
use crate::position::revalue;
use crate::price_feed::PriceQuote;

impl Terminal {
    /// Apply one tick: market stats move, every position on that symbol is
    /// revalued at the new mark, and any that crossed liquidation are closed out.
    pub fn apply_quote(&mut self, quote: &PriceQuote) -> Result<QuoteOutcome, TerminalError> {
        for price in [quote.last, quote.mark, quote.index] {
            Self::validate_price(price.value())?;
        }
        let market = self
            .markets
            .get_mut(&quote.symbol)
            .ok_or_else(|| ValidationError::UnknownMarket(quote.symbol.clone()))?;
        market.apply_quote(quote);

        tracing::debug!(
            symbol = %quote.symbol,
            last = %quote.last,
            mark = %quote.mark,
            index = %quote.index,
            "Quote applied"
        );

        self.emit_event(EventPayload::MarkPriceUpdate(MarkPriceUpdateEvent {
            symbol: quote.symbol.clone(),
            last_price: quote.last,
            mark_price: quote.mark,
            index_price: quote.index,
        }));

        let to_revalue: Vec<_> = self
            .positions
            .iter()
            .filter(|p| p.symbol == quote.symbol)
            .map(|p| revalue(p, quote.mark))
            .collect();
        let revalued = to_revalue.len();
        for position in to_revalue {
            self.positions.replace(position);
        }

        let liquidations = self.liquidate_crossed(&quote.symbol);
        Ok(QuoteOutcome {
            revalued,
            liquidations,
        })
    }

    /// Store an order-book tick and push its print onto the tape. Ticks for a
    /// market that is not active are dropped and return `Ok(false)`.
    pub fn apply_book(&mut self, snapshot: BookSnapshot) -> Result<bool, TerminalError> {
        if self.markets.get(&snapshot.symbol).is_none() {
            return Err(ValidationError::UnknownMarket(snapshot.symbol).into());
        }
        if !self.is_active(&snapshot.symbol) {
            tracing::debug!(symbol = %snapshot.symbol, "Book tick for inactive market dropped");
            return Ok(false);
        }

        if let Some(trade) = &snapshot.trade {
            self.recent_trades.push(trade.clone());
        }
        tracing::debug!(
            symbol = %snapshot.symbol,
            asks = snapshot.asks.len(),
            bids = snapshot.bids.len(),
            tape = self.recent_trades.len(),
            "Book applied"
        );
        self.book = Some(snapshot);
        Ok(true)
    }

    /// Fill the tape for the active market, newest first. Prints for any
    /// other symbol are skipped.
    pub fn load_trade_backlog(&mut self, backlog: Vec<MarketTrade>) {
        let active: Vec<MarketTrade> = backlog
            .into_iter()
            .filter(|t| self.is_active(&t.symbol))
            .collect();
        self.recent_trades.reset(active);
    }

    fn is_active(&self, symbol: &str) -> bool {
        self.markets.active().is_some_and(|m| m.symbol() == symbol)
    }

    pub fn select_market(&mut self, symbol: &str) -> Result<&MarketData, TerminalError> {
        let previous = self
            .markets
            .active()
            .map(|m| m.symbol().to_string())
            .unwrap_or_default();

        if self.markets.get(symbol).is_none() {
            tracing::warn!(%symbol, "Unknown market selected");
            let unknown = Err(ValidationError::UnknownMarket(symbol.to_string()).into());
            return self.report_failure(unknown);
        }

        if previous != symbol {
            tracing::info!(%previous, %symbol, "Market selected");
            // the old market's depth and tape no longer apply
            self.book = None;
            self.recent_trades.clear();
            self.emit_event(EventPayload::MarketSelected(MarketSelectedEvent {
                previous,
                symbol: symbol.to_string(),
            }));
        }

        self.markets
            .select(symbol)
            .ok_or_else(|| ValidationError::UnknownMarket(symbol.to_string()).into())
    }
}
