//! Deposits and withdrawals.
//!
//! The sync commands commit straight to the wallet and the ledger. The
//! `*_with_progress` variants first walk the transfer phases and commit only
//! if nobody cancelled.

use super::core::Terminal;
use super::results::TerminalError;
use crate::events::{EventPayload, TransferEvent};
use crate::i18n::MessageKey;
use crate::ledger::{mock_tx_hash, AssetHistoryRecord, TransferKind};
use crate::notification::NotificationKind;
use crate::transfer::{run_transfer, CancelSignal, TransferPhase};
use crate::types::{Quote, RecordId};
use rust_decimal::Decimal;

impl Terminal {
    pub fn deposit(&mut self, amount: Decimal) -> Result<AssetHistoryRecord, TerminalError> {
        let result = self.try_deposit(amount);
        self.report_failure(result)
    }

    fn try_deposit(&mut self, amount: Decimal) -> Result<AssetHistoryRecord, TerminalError> {
        self.require_signed()?;
        let amount = Quote::new(Self::validate_amount(amount)?);

        self.wallet.deposit(amount);
        let record = self.record_transfer(TransferKind::Deposit, amount);

        tracing::info!(record_id = record.id.0, %amount, balance = %self.wallet.balance, "Deposit completed");

        self.emit_event(EventPayload::Deposit(TransferEvent {
            record_id: record.id,
            amount,
            fee: None,
            status: record.status,
            new_balance: self.wallet.balance,
        }));
        self.notify(NotificationKind::Success, MessageKey::DepositSuccess { amount });
        Ok(record)
    }

    /// Debits `amount` from the wallet. The withdraw fee comes out of the
    /// transferred amount, not on top of it.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<AssetHistoryRecord, TerminalError> {
        let result = self.try_withdraw(amount);
        self.report_failure(result)
    }

    fn try_withdraw(&mut self, amount: Decimal) -> Result<AssetHistoryRecord, TerminalError> {
        self.require_signed()?;
        let amount = Quote::new(Self::validate_amount(amount)?);

        if let Err(e) = self.wallet.withdraw(amount) {
            tracing::warn!(error = %e, %amount, "Withdrawal rejected");
            return Err(e.into());
        }
        let record = self.record_transfer(TransferKind::Withdraw, amount);

        tracing::info!(
            record_id = record.id.0,
            %amount,
            transferred = %record.transferred_amount(),
            status = ?record.status,
            balance = %self.wallet.balance,
            "Withdrawal recorded"
        );

        self.emit_event(EventPayload::Withdrawal(TransferEvent {
            record_id: record.id,
            amount,
            fee: record.fee,
            status: record.status,
            new_balance: self.wallet.balance,
        }));
        self.notify(NotificationKind::Success, MessageKey::WithdrawSuccess { amount });
        Ok(record)
    }

    fn record_transfer(&mut self, kind: TransferKind, amount: Quote) -> AssetHistoryRecord {
        let id = RecordId(self.next_id());
        let hash = mock_tx_hash(&mut self.rng);
        let time = self.current_time;
        match kind {
            TransferKind::Deposit => self.ledger.record_deposit(id, amount, hash, time).clone(),
            TransferKind::Withdraw => self.ledger.record_withdraw(id, amount, hash, time).clone(),
        }
    }

    pub async fn deposit_with_progress<F>(
        &mut self,
        amount: Decimal,
        cancel: CancelSignal,
        on_phase: F,
    ) -> Result<AssetHistoryRecord, TerminalError>
    where
        F: FnMut(TransferPhase),
    {
        self.require_signed()?;
        let checked = Self::validate_amount(amount).map_err(TerminalError::from);
        self.report_failure(checked)?;

        let delays = self.config.transfer_delays;
        run_transfer(TransferKind::Deposit, &delays, cancel, on_phase).await?;
        self.deposit(amount)
    }

    pub async fn withdraw_with_progress<F>(
        &mut self,
        amount: Decimal,
        cancel: CancelSignal,
        on_phase: F,
    ) -> Result<AssetHistoryRecord, TerminalError>
    where
        F: FnMut(TransferPhase),
    {
        self.require_signed()?;
        let checked = Self::validate_amount(amount)
            .map_err(TerminalError::from)
            .and_then(|a| Ok(self.wallet.ensure_available(Quote::new(a))?));
        self.report_failure(checked)?;

        let delays = self.config.transfer_delays;
        run_transfer(TransferKind::Withdraw, &delays, cancel, on_phase).await?;
        self.withdraw(amount)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::TerminalConfig;
    use crate::engine::{Terminal, TerminalError, ValidationError};
    use crate::ledger::TransferStatus;
    use crate::session::WalletProvider;
    use crate::transfer::{cancel_pair, PhaseDelays, TransferError, TransferPhase};
    use crate::types::Quote;
    use rust_decimal_macros::dec;

    fn signed_terminal() -> Terminal {
        let mut config = TerminalConfig::default();
        config.initial_wallet_balance = Quote::new(dec!(1000));
        config.transfer_delays = PhaseDelays::instant();
        let mut terminal = Terminal::new(config);
        terminal.connect_wallet(WalletProvider::BinanceWallet);
        terminal.sign_message().unwrap();
        terminal
    }

    #[test]
    fn deposit_credits_wallet() {
        let mut terminal = signed_terminal();
        let record = terminal.deposit(dec!(500)).unwrap();

        assert_eq!(record.status, TransferStatus::Completed);
        assert_eq!(record.fee, None);
        assert!(record.hash.starts_with("0x"));
        assert_eq!(terminal.wallet().balance.value(), dec!(1500));
        assert_eq!(terminal.ledger().len(), 1);
    }

    #[test]
    fn withdraw_debits_and_reviews_large_amounts() {
        let mut terminal = signed_terminal();
        let large = terminal.withdraw(dec!(150)).unwrap();
        let small = terminal.withdraw(dec!(50)).unwrap();

        assert_eq!(large.status, TransferStatus::Reviewing);
        assert_eq!(small.status, TransferStatus::Completed);
        assert_eq!(small.transferred_amount().value(), dec!(49.5));
        assert_eq!(terminal.wallet().balance.value(), dec!(800));
        assert_eq!(terminal.ledger().records()[0].id, small.id);
    }

    #[test]
    fn withdraw_more_than_wallet_rejected() {
        let mut terminal = signed_terminal();
        let err = terminal.withdraw(dec!(1000.01)).unwrap_err();
        assert!(matches!(
            err,
            TerminalError::Validation(ValidationError::InsufficientBalance { .. })
        ));
        assert!(terminal.ledger().is_empty());
    }

    #[test]
    fn unsigned_deposit_raises_prompt() {
        let mut terminal = Terminal::new(TerminalConfig::default());
        assert_eq!(terminal.deposit(dec!(10)).unwrap_err(), TerminalError::NotAuthenticated);
        assert!(terminal.session().pending_prompt().is_some());
    }

    #[tokio::test]
    async fn phased_deposit_commits_after_phases() {
        let mut terminal = signed_terminal();
        let (_handle, signal) = cancel_pair();
        let mut phases = Vec::new();

        let record = terminal
            .deposit_with_progress(dec!(200), signal, |p| phases.push(p))
            .await
            .unwrap();

        assert_eq!(record.amount.value(), dec!(200));
        assert_eq!(phases.len(), 3);
        assert_eq!(phases[2], TransferPhase::Depositing);
    }

    #[tokio::test]
    async fn cancelled_withdraw_commits_nothing() {
        let mut terminal = signed_terminal();
        let (handle, signal) = cancel_pair();
        handle.cancel();

        let err = terminal
            .withdraw_with_progress(dec!(50), signal, |_| {})
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TerminalError::Transfer(TransferError::Cancelled {
                phase: TransferPhase::Withdrawing
            })
        );
        assert!(terminal.ledger().is_empty());
        assert_eq!(terminal.wallet().balance.value(), dec!(1000));
    }
}
