//! Liquidation detection and execution.

use super::core::Terminal;
use super::results::LiquidationResult;
use crate::events::{EventPayload, LiquidationEvent};
use crate::i18n::MessageKey;
use crate::liquidation::is_liquidatable;
use crate::notification::NotificationKind;
use crate::position::Position;

impl Terminal {
    /// Close out every position on `symbol` whose mark has crossed its
    /// liquidation price. The margin is forfeited.
    pub(super) fn liquidate_crossed(&mut self, symbol: &str) -> Vec<LiquidationResult> {
        let liquidatable: Vec<Position> = self
            .positions
            .iter()
            .filter(|p| p.symbol == symbol)
            .filter(|p| is_liquidatable(p.side, p.mark_price, p.liquidation_price))
            .cloned()
            .collect();

        let mut results = Vec::with_capacity(liquidatable.len());
        for position in liquidatable {
            self.positions.remove(position.id);
            self.wallet.forfeit(position.margin);
            self.record_liquidation_trade(&position);

            tracing::warn!(
                position_id = %position.id,
                symbol = %position.symbol,
                side = ?position.side,
                mark = %position.mark_price,
                liquidation_price = %position.liquidation_price,
                margin_lost = %position.margin,
                "Position liquidated"
            );

            self.emit_event(EventPayload::Liquidation(LiquidationEvent {
                position_id: position.id,
                symbol: position.symbol.clone(),
                side: position.side,
                size: position.size,
                mark_price: position.mark_price,
                liquidation_price: position.liquidation_price,
                margin_lost: position.margin,
            }));
            self.notify(
                NotificationKind::Liquidation,
                MessageKey::Liquidated {
                    symbol: position.symbol.clone(),
                    side: position.side,
                    price: position.mark_price,
                    margin_lost: position.margin,
                },
            );

            results.push(LiquidationResult {
                position_id: position.id,
                symbol: position.symbol,
                side: position.side,
                size: position.size,
                mark_price: position.mark_price,
                liquidation_price: position.liquidation_price,
                margin_lost: position.margin,
            });
        }

        results
    }
}
