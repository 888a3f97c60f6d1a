// 9.3 transfer.rs: the deposit/withdraw progress the user watches before a
// ledger entry exists. each phase is a timed delay. cancelling at any point
// ends the flow with nothing committed; the caller commits on Ok.

use crate::ledger::TransferKind;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferPhase {
    Approving,
    Swapping,
    Depositing,
    Withdrawing,
}

impl TransferPhase {
    pub fn sequence(kind: TransferKind) -> &'static [TransferPhase] {
        match kind {
            TransferKind::Deposit => &[
                TransferPhase::Approving,
                TransferPhase::Swapping,
                TransferPhase::Depositing,
            ],
            TransferKind::Withdraw => &[TransferPhase::Withdrawing],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PhaseDelays {
    pub approve_ms: u64,
    pub swap_ms: u64,
    pub deposit_ms: u64,
    pub withdraw_ms: u64,
}

impl Default for PhaseDelays {
    fn default() -> Self {
        Self {
            approve_ms: 1_500,
            swap_ms: 1_500,
            deposit_ms: 1_500,
            withdraw_ms: 2_000,
        }
    }
}

impl PhaseDelays {
    pub fn instant() -> Self {
        Self {
            approve_ms: 0,
            swap_ms: 0,
            deposit_ms: 0,
            withdraw_ms: 0,
        }
    }

    fn for_phase(&self, phase: TransferPhase) -> Duration {
        let ms = match phase {
            TransferPhase::Approving => self.approve_ms,
            TransferPhase::Swapping => self.swap_ms,
            TransferPhase::Depositing => self.deposit_ms,
            TransferPhase::Withdrawing => self.withdraw_ms,
        };
        Duration::from_millis(ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("Transfer cancelled during {phase:?}")]
    Cancelled { phase: TransferPhase },
}

/// Held by whoever can abort the flow (the modal's close button).
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

#[derive(Debug, Clone)]
pub struct CancelSignal(watch::Receiver<bool>);

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), CancelSignal(rx))
}

/// Runs every phase of `kind` in order, calling `on_phase` as each starts.
/// A dropped CancelHandle does not cancel.
pub async fn run_transfer<F>(
    kind: TransferKind,
    delays: &PhaseDelays,
    mut cancel: CancelSignal,
    mut on_phase: F,
) -> Result<(), TransferError>
where
    F: FnMut(TransferPhase),
{
    for &phase in TransferPhase::sequence(kind) {
        if cancel.is_cancelled() {
            tracing::info!(?kind, ?phase, "Transfer cancelled");
            return Err(TransferError::Cancelled { phase });
        }
        on_phase(phase);
        tracing::debug!(?kind, ?phase, "Transfer phase started");

        let delay = sleep(delays.for_phase(phase));
        tokio::pin!(delay);
        loop {
            tokio::select! {
                _ = &mut delay => break,
                changed = cancel.0.changed() => {
                    if changed.is_err() {
                        // sender gone, nobody can cancel any more
                        (&mut delay).await;
                        break;
                    }
                    if cancel.is_cancelled() {
                        tracing::info!(?kind, ?phase, "Transfer cancelled");
                        return Err(TransferError::Cancelled { phase });
                    }
                }
            }
        }
    }

    Ok(())
}
