//! Position close and margin management.

use super::core::{Terminal, MAX_INPUT};
use super::results::{CloseResult, TerminalError, ValidationError};
use crate::estimate::{preview_margin_adjustment, MarginAdjustment, MarginPreview};
use crate::events::{CloseReason, EventPayload, MarginAdjustedEvent, PositionClosedEvent};
use crate::i18n::MessageKey;
use crate::notification::NotificationKind;
use crate::position::{reduce_position, with_margin, Position};
use crate::types::{OrderType, PositionId, Price, Quote, Side};
use rust_decimal::Decimal;

impl Terminal {
    /// Close all or part of a position.
    ///
    /// MARKET closes at the current mark; LIMIT at `close_price` (mark when
    /// absent). `close_amount` below size is a partial close: size and margin
    /// shrink by the same fraction. Anything at or above size closes it fully.
    pub fn close_position(
        &mut self,
        id: PositionId,
        close_type: OrderType,
        close_price: Option<Decimal>,
        close_amount: Option<Decimal>,
    ) -> Result<CloseResult, TerminalError> {
        let result = self.try_close_position(id, close_type, close_price, close_amount);
        self.report_failure(result)
    }

    fn try_close_position(
        &mut self,
        id: PositionId,
        close_type: OrderType,
        close_price: Option<Decimal>,
        close_amount: Option<Decimal>,
    ) -> Result<CloseResult, TerminalError> {
        self.require_signed()?;

        let position = self
            .positions
            .get(id)
            .ok_or(TerminalError::PositionNotFound(id))?;

        let exit_price = match (close_type, close_price) {
            (OrderType::Limit, Some(p)) => Self::validate_price(p)?,
            _ => position.mark_price,
        };
        let amount = match close_amount {
            Some(a) => Self::validate_amount(a)?,
            None => position.size,
        };

        let result = self.apply_close(id, close_type, exit_price, amount, CloseReason::UserClosed)?;

        self.notify(
            NotificationKind::Success,
            MessageKey::PositionClosed {
                symbol: result.symbol,
                side: result.side,
                amount: result.inner.closed_size,
                realized_pnl: result.inner.realized_pnl,
            },
        );

        Ok(result.inner)
    }

    /// Close every position at mark.
    pub fn close_all(&mut self) -> Result<Vec<CloseResult>, TerminalError> {
        self.require_signed()?;

        let ids: Vec<PositionId> = self.positions.iter().map(|p| p.id).collect();
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            results.push(self.settle_at_mark(id, CloseReason::CloseAll)?);
        }

        if !results.is_empty() {
            tracing::info!(count = results.len(), "All positions closed");
            self.notify(
                NotificationKind::Success,
                MessageKey::PositionsClosed {
                    count: results.len(),
                },
            );
        }
        Ok(results)
    }

    pub(super) fn settle_at_mark(
        &mut self,
        id: PositionId,
        reason: CloseReason,
    ) -> Result<CloseResult, TerminalError> {
        let position = self
            .positions
            .get(id)
            .ok_or(TerminalError::PositionNotFound(id))?;
        let (mark, size) = (position.mark_price, position.size);
        Ok(self.apply_close(id, OrderType::Market, mark, size, reason)?.inner)
    }

    fn apply_close(
        &mut self,
        id: PositionId,
        close_type: OrderType,
        exit_price: Price,
        amount: Decimal,
        reason: CloseReason,
    ) -> Result<SidedClose, TerminalError> {
        let position = self
            .positions
            .get(id)
            .ok_or(TerminalError::PositionNotFound(id))?
            .clone();

        let update = reduce_position(&position, amount, exit_price);
        let payout = self
            .wallet
            .settle_close(update.margin_released, update.realized_pnl);

        self.record_close_trade(&position, exit_price, update.closed_size, update.realized_pnl);

        let remaining_size = match &update.new_position {
            Some(remaining) => {
                self.positions.replace(remaining.clone());
                remaining.size
            }
            None => {
                self.positions.remove(id);
                Decimal::ZERO
            }
        };

        tracing::info!(
            position_id = %id,
            symbol = %position.symbol,
            ?reason,
            %exit_price,
            closed = %update.closed_size,
            remaining = %remaining_size,
            realized_pnl = %update.realized_pnl,
            %payout,
            "Position closed"
        );

        self.emit_event(EventPayload::PositionClosed(PositionClosedEvent {
            position_id: id,
            symbol: position.symbol.clone(),
            close_type,
            exit_price,
            closed_size: update.closed_size,
            remaining_size,
            realized_pnl: update.realized_pnl,
            margin_returned: payout,
            close_reason: reason,
        }));

        Ok(SidedClose {
            side: position.side,
            symbol: position.symbol,
            inner: CloseResult {
                position_id: id,
                close_type,
                exit_price,
                closed_size: update.closed_size,
                realized_pnl: update.realized_pnl,
                margin_released: update.margin_released,
                payout,
                remaining: update.new_position,
            },
        })
    }

    /// Move margin between the wallet and a position.
    ///
    /// Add draws from the wallet. Extract is capped so the position keeps at
    /// least the maintenance floor. The liquidation price is not recomputed;
    /// use [`Terminal::preview_margin`] for the projected figure.
    pub fn adjust_margin(
        &mut self,
        id: PositionId,
        kind: MarginAdjustment,
        amount: Decimal,
    ) -> Result<Position, TerminalError> {
        let result = self.try_adjust_margin(id, kind, amount);
        self.report_failure(result)
    }

    fn try_adjust_margin(
        &mut self,
        id: PositionId,
        kind: MarginAdjustment,
        amount: Decimal,
    ) -> Result<Position, TerminalError> {
        self.require_signed()?;

        let amount = Quote::new(Self::validate_amount(amount)?);
        let position = self
            .positions
            .get(id)
            .ok_or(TerminalError::PositionNotFound(id))?
            .clone();

        let new_margin = match kind {
            MarginAdjustment::Add => {
                if let Err(e) = self.wallet.reserve(amount) {
                    tracing::warn!(error = %e, position_id = %id, "Margin add rejected");
                    return Err(e.into());
                }
                position.margin.add(amount)
            }
            MarginAdjustment::Extract => {
                let available = self.max_extractable(&position);
                if amount > available {
                    tracing::warn!(position_id = %id, requested = %amount, %available, "Margin extract rejected");
                    return Err(ValidationError::ExceedsWithdrawableMargin {
                        requested: amount,
                        available,
                    }
                    .into());
                }
                self.wallet.release(amount);
                position.margin.sub(amount)
            }
        };

        let updated = with_margin(&position, new_margin);
        self.positions.replace(updated.clone());

        tracing::info!(position_id = %id, ?kind, %amount, old = %position.margin, new = %new_margin, "Margin adjusted");

        self.emit_event(EventPayload::MarginAdjusted(MarginAdjustedEvent {
            position_id: id,
            kind,
            amount,
            old_margin: position.margin,
            new_margin,
        }));
        self.notify(NotificationKind::Success, MessageKey::MarginAdjusted { kind, amount });

        Ok(updated)
    }

    // margin above the maintenance floor
    pub(super) fn max_extractable(&self, position: &Position) -> Quote {
        position
            .margin
            .sub(self.config.trading.maintenance_floor)
            .max_zero()
    }

    pub fn withdrawable_margin(&self, id: PositionId) -> Result<Quote, TerminalError> {
        let position = self
            .positions
            .get(id)
            .ok_or(TerminalError::PositionNotFound(id))?;
        Ok(self.max_extractable(position))
    }

    pub fn preview_margin(
        &self,
        id: PositionId,
        kind: MarginAdjustment,
        amount: Decimal,
    ) -> Result<MarginPreview, TerminalError> {
        let position = self
            .positions
            .get(id)
            .ok_or(TerminalError::PositionNotFound(id))?;
        // an empty modal field previews as zero
        if amount < Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(amount).into());
        }
        if amount > MAX_INPUT {
            return Err(ValidationError::OutOfRange(amount).into());
        }
        Ok(preview_margin_adjustment(position, kind, Quote::new(amount)))
    }
}

// close result plus what the notification needs once the position is gone
struct SidedClose {
    side: Side,
    symbol: String,
    inner: CloseResult,
}
