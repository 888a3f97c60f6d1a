//! Funding clock. Rates are display-only, so the only state change is the
//! next funding time rolling forward.

use super::core::Terminal;
use crate::events::{EventPayload, FundingRolledEvent};

impl Terminal {
    /// Roll every market whose funding time has passed. Returns the number of
    /// markets that rolled.
    pub fn roll_funding(&mut self) -> usize {
        let now = self.current_time;
        let mut rolled = Vec::new();

        for market in self.markets.iter_mut() {
            let intervals = market.roll_funding(now);
            if intervals > 0 {
                tracing::debug!(
                    symbol = %market.symbol(),
                    intervals,
                    next = market.next_funding_time.as_millis(),
                    "Funding interval rolled"
                );
                rolled.push(FundingRolledEvent {
                    symbol: market.symbol().to_string(),
                    funding_rate: market.funding_rate,
                    next_funding_time: market.next_funding_time,
                });
            }
        }

        let count = rolled.len();
        for event in rolled {
            self.emit_event(EventPayload::FundingRolled(event));
        }
        count
    }

    /// `HH:MM:SS` until the active market's next funding.
    pub fn funding_countdown(&self) -> Option<String> {
        self.markets
            .active()
            .map(|m| m.funding_countdown(self.current_time))
    }
}
