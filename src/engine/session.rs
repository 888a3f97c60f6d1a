//! Session commands: connect, sign, disconnect, language.

use super::core::Terminal;
use super::results::TerminalError;
use crate::events::{
    CancelReason, CloseReason, DisconnectedEvent, EventPayload, WalletConnectedEvent,
};
use crate::i18n::{Language, MessageKey};
use crate::notification::NotificationKind;
use crate::session::{ConnectPrompt, WalletProvider};

impl Terminal {
    /// Picks a wallet. The session still has to sign before it can trade.
    pub fn connect_wallet(&mut self, provider: WalletProvider) {
        self.session.connect(provider);
        tracing::info!(provider = provider.display_name(), "Wallet connected");
        self.emit_event(EventPayload::WalletConnected(WalletConnectedEvent { provider }));
    }

    pub fn sign_message(&mut self) -> Result<(), TerminalError> {
        if !self.session.sign() {
            tracing::warn!("Sign requested with no wallet connected");
            return Err(TerminalError::NotAuthenticated);
        }

        tracing::info!(provider = ?self.session.provider(), "Session signed");
        self.emit_event(EventPayload::MessageSigned);
        self.notify(NotificationKind::Success, MessageKey::Welcome);
        Ok(())
    }

    /// Drops the session. Open positions are settled at mark and resting
    /// orders dropped, so the wallet keeps what the positions were worth.
    pub fn disconnect(&mut self) {
        let positions_dropped = self.positions.len();
        let ids: Vec<_> = self.positions.iter().map(|p| p.id).collect();
        for id in ids {
            if let Err(e) = self.settle_at_mark(id, CloseReason::Disconnected) {
                tracing::warn!(error = %e, position_id = %id, "Could not settle position on disconnect");
            }
        }

        let orders = self.orders.clear();
        let orders_dropped = orders.len();
        for order in orders {
            self.record_cancel(&order, CancelReason::Disconnected);
        }

        self.session.disconnect();
        tracing::info!(positions_dropped, orders_dropped, "Wallet disconnected");
        self.emit_event(EventPayload::Disconnected(DisconnectedEvent {
            positions_dropped,
            orders_dropped,
        }));
    }

    /// The user closed the connect modal. Returns the prompt that was showing.
    pub fn dismiss_connect_prompt(&mut self) -> Option<ConnectPrompt> {
        let prompt = self.session.take_prompt();
        if let Some(prompt) = prompt {
            tracing::debug!(?prompt, "Connect prompt dismissed");
        }
        prompt
    }

    pub fn set_language(&mut self, language: Language) {
        if self.language == language {
            return;
        }
        self.language = language;
        tracing::debug!(language = language.code(), "Language changed");
        self.emit_event(EventPayload::LanguageChanged(language));
    }
}
