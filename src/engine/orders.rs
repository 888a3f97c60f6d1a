//! Order placement and cancellation.

use super::core::{Terminal, MAX_INPUT};
use super::results::{Placement, TerminalError, ValidationError};
use crate::estimate::{estimate_trade, OrderAmount, TradeEstimate};
use crate::events::{
    CancelReason, EventPayload, OrderCanceledEvent, OrderPlacedEvent, PositionOpenedEvent,
};
use crate::i18n::MessageKey;
use crate::margin::{margin_required, notional, trading_fee};
use crate::notification::NotificationKind;
use crate::order::{Order, OrderRequest};
use crate::position::Position;
use crate::types::{Leverage, OrderId, OrderType, PositionId, Price};
use rust_decimal::Decimal;

impl Terminal {
    /// Place an order on the active market.
    ///
    /// MARKET fills at `price` straight into a new position and reserves
    /// margin plus fee from the wallet. LIMIT rests in the open-orders list;
    /// its margin must be covered but nothing is reserved.
    pub fn place_order(&mut self, request: OrderRequest) -> Result<Placement, TerminalError> {
        let result = self.try_place_order(request);
        self.report_failure(result)
    }

    fn try_place_order(&mut self, request: OrderRequest) -> Result<Placement, TerminalError> {
        self.require_signed()?;

        let validated = self.validate_request(&request);
        let (size, price, leverage) = match validated {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, ?request, "Order rejected");
                return Err(e.into());
            }
        };

        let symbol = self
            .markets
            .active()
            .map(|m| m.symbol().to_string())
            .ok_or(ValidationError::NoActiveMarket)?;

        let placement = match request.order_type {
            OrderType::Market => self.fill_market(symbol, request, size, price, leverage)?,
            OrderType::Limit => self.rest_limit(symbol, request, size, price, leverage)?,
        };
        Ok(placement)
    }

    fn validate_request(
        &self,
        request: &OrderRequest,
    ) -> Result<(Decimal, Price, Leverage), ValidationError> {
        let size = Self::validate_amount(request.size)?;
        let price = Self::validate_price(request.price)?;
        let leverage = self.validate_leverage(request.leverage)?;
        Ok((size, price, leverage))
    }

    fn fill_market(
        &mut self,
        symbol: String,
        request: OrderRequest,
        size: Decimal,
        price: Price,
        leverage: Leverage,
    ) -> Result<Placement, TerminalError> {
        let position_notional = notional(size, price);
        let margin = margin_required(position_notional, leverage);
        let fee = trading_fee(position_notional, self.config.trading.fee_rate);

        if let Err(e) = self.wallet.ensure_available(margin.add(fee)) {
            tracing::warn!(error = %e, %symbol, "Market order rejected");
            return Err(e.into());
        }

        let id = PositionId(self.next_id());
        let position = Position::open(
            id,
            symbol.clone(),
            request.side,
            size,
            price,
            leverage,
            request.margin_mode,
            &self.config.trading.liquidation_model,
        );

        self.wallet.reserve(margin)?;
        self.wallet.charge_fee(fee);
        self.positions.prepend(position.clone());
        self.record_fill(&position, fee);

        tracing::info!(
            position_id = %id,
            %symbol,
            side = ?request.side,
            %size,
            %price,
            %margin,
            %fee,
            liquidation_price = %position.liquidation_price,
            "Market order filled"
        );

        self.emit_event(EventPayload::PositionOpened(PositionOpenedEvent {
            position_id: id,
            symbol: symbol.clone(),
            side: request.side,
            size,
            entry_price: price,
            margin,
            fee,
            leverage,
            liquidation_price: position.liquidation_price,
        }));
        self.notify(
            NotificationKind::Success,
            MessageKey::MarketOrderFilled {
                symbol,
                side: request.side,
                size,
                price,
                fee,
            },
        );

        Ok(Placement::Filled { position, fee })
    }

    fn rest_limit(
        &mut self,
        symbol: String,
        request: OrderRequest,
        size: Decimal,
        price: Price,
        leverage: Leverage,
    ) -> Result<Placement, TerminalError> {
        let margin = margin_required(notional(size, price), leverage);
        if let Err(e) = self.wallet.ensure_available(margin) {
            tracing::warn!(error = %e, %symbol, "Limit order rejected");
            return Err(e.into());
        }

        let id = OrderId(self.next_id());
        let order = Order::new_limit(
            id,
            symbol.clone(),
            request.side,
            price,
            size,
            leverage,
            request.margin_mode,
            self.current_time,
        );
        self.orders.prepend(order.clone());

        tracing::info!(order_id = %id, %symbol, side = ?request.side, %size, %price, "Limit order resting");

        self.emit_event(EventPayload::OrderPlaced(OrderPlacedEvent {
            order_id: id,
            symbol: symbol.clone(),
            side: request.side,
            price,
            amount: size,
            leverage,
            margin_mode: request.margin_mode,
        }));
        self.notify(
            NotificationKind::Success,
            MessageKey::OrderCreated {
                symbol,
                side: request.side,
                price,
                amount: size,
                leverage: leverage.value(),
            },
        );

        Ok(Placement::Resting(order))
    }

    /// Cancel a resting order. An unknown id changes nothing and returns `Ok(None)`.
    pub fn cancel_order(&mut self, id: OrderId) -> Result<Option<Order>, TerminalError> {
        self.require_signed()?;

        let Some(order) = self.orders.remove(id) else {
            tracing::debug!(order_id = %id, "Cancel for unknown order ignored");
            return Ok(None);
        };

        tracing::info!(order_id = %id, symbol = %order.symbol, "Order canceled");
        self.record_cancel(&order, CancelReason::UserRequested);
        self.notify(
            NotificationKind::Info,
            MessageKey::OrderCanceled {
                symbol: order.symbol.clone(),
            },
        );
        Ok(Some(order))
    }

    pub fn cancel_all(&mut self) -> Result<Vec<Order>, TerminalError> {
        self.require_signed()?;

        let canceled = self.orders.clear();
        for order in &canceled {
            self.record_cancel(order, CancelReason::CancelAll);
        }

        if !canceled.is_empty() {
            tracing::info!(count = canceled.len(), "All orders canceled");
            self.notify(
                NotificationKind::Info,
                MessageKey::OrdersCanceled {
                    count: canceled.len(),
                },
            );
        }
        Ok(canceled)
    }

    pub(super) fn record_cancel(&mut self, order: &Order, reason: CancelReason) {
        self.history.record_order(order.canceled());
        self.emit_event(EventPayload::OrderCanceled(OrderCanceledEvent {
            order_id: order.id,
            symbol: order.symbol.clone(),
            reason,
        }));
    }

    /// Order-form preview on the active market. `price` falls back to the last price.
    pub fn estimate_order(
        &self,
        amount: OrderAmount,
        price: Option<Decimal>,
        leverage: u32,
    ) -> Result<TradeEstimate, TerminalError> {
        let market = self.markets.active().ok_or(ValidationError::NoActiveMarket)?;
        // an empty form field is a zero amount, which still previews
        let raw = match amount {
            OrderAmount::Base(v) | OrderAmount::Quote(v) => v,
        };
        if raw < Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(raw).into());
        }
        if raw > MAX_INPUT {
            return Err(ValidationError::OutOfRange(raw).into());
        }
        let price = match price {
            Some(p) => Self::validate_price(p)?,
            None => market.last_price,
        };
        let leverage = self.validate_leverage(leverage)?;

        Ok(estimate_trade(
            amount,
            price,
            leverage,
            self.wallet.balance,
            self.config.trading.fee_rate,
            &self.config.trading.liquidation_model,
        ))
    }
}
