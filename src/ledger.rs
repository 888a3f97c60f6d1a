// 9.2 ledger.rs: MOCKED custody. deposits and withdrawals only produce history
// records and wallet balance changes, no real token transfers.

use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Quote, RecordId, Timestamp};

pub const SETTLEMENT_ASSET: &str = "USDC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    Deposit,
    Withdraw,
}

// only Completed and Reviewing come out of the terminal's own transfers. the
// rest appear in seeded sample history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Completed,
    Reviewing,
    Processing,
    Confirming,
    Rejected,
    Failed,
}

impl TransferStatus {
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            TransferStatus::Reviewing | TransferStatus::Processing | TransferStatus::Confirming
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetHistoryRecord {
    pub id: RecordId,
    pub asset: String,
    pub kind: TransferKind,
    // what the user asked for, before fees
    pub amount: Quote,
    pub fee: Option<Quote>,
    pub hash: String,
    pub status: TransferStatus,
    pub time: Timestamp,
}

impl AssetHistoryRecord {
    // what actually moves on chain
    pub fn transferred_amount(&self) -> Quote {
        match self.fee {
            Some(fee) => self.amount.sub(fee).max_zero(),
            None => self.amount,
        }
    }
}

/// Withdraw rules. Both numbers are business constants other systems rely on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRules {
    pub withdraw_fee: Quote,
    // withdrawals at or above this go to manual review
    pub review_threshold: Quote,
}

impl Default for LedgerRules {
    fn default() -> Self {
        Self {
            withdraw_fee: Quote::new(dec!(0.5)),
            review_threshold: Quote::new(dec!(100)),
        }
    }
}

impl LedgerRules {
    pub fn withdraw_status(&self, amount: Quote) -> TransferStatus {
        if amount >= self.review_threshold {
            TransferStatus::Reviewing
        } else {
            TransferStatus::Completed
        }
    }
}

// "0x" + 8 hex digits + "...", the truncated hash the history table shows
pub fn mock_tx_hash<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("0x{:08x}...", rng.gen::<u32>())
}

// kind, amount, status, hours before now. oldest first
const SAMPLE_HISTORY: [(TransferKind, Decimal, TransferStatus, i64); 6] = [
    (TransferKind::Deposit, dec!(2000), TransferStatus::Completed, 72),
    (TransferKind::Withdraw, dec!(150), TransferStatus::Rejected, 60),
    (TransferKind::Deposit, dec!(500), TransferStatus::Failed, 48),
    (TransferKind::Withdraw, dec!(80), TransferStatus::Completed, 30),
    (TransferKind::Deposit, dec!(1000), TransferStatus::Confirming, 2),
    (TransferKind::Withdraw, dec!(250), TransferStatus::Processing, 1),
];

const HOUR_MS: i64 = 60 * 60 * 1000;

/// Append-only transfer history, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetLedger {
    rules: LedgerRules,
    records: Vec<AssetHistoryRecord>,
}

impl AssetLedger {
    pub fn new(rules: LedgerRules) -> Self {
        Self {
            rules,
            records: Vec::new(),
        }
    }

    pub fn rules(&self) -> &LedgerRules {
        &self.rules
    }

    pub fn record_deposit(
        &mut self,
        id: RecordId,
        amount: Quote,
        hash: String,
        time: Timestamp,
    ) -> &AssetHistoryRecord {
        self.push(AssetHistoryRecord {
            id,
            asset: SETTLEMENT_ASSET.to_string(),
            kind: TransferKind::Deposit,
            amount,
            fee: None,
            hash,
            status: TransferStatus::Completed,
            time,
        })
    }

    pub fn record_withdraw(
        &mut self,
        id: RecordId,
        amount: Quote,
        hash: String,
        time: Timestamp,
    ) -> &AssetHistoryRecord {
        let status = self.rules.withdraw_status(amount);
        let fee = self.rules.withdraw_fee;
        self.push(AssetHistoryRecord {
            id,
            asset: SETTLEMENT_ASSET.to_string(),
            kind: TransferKind::Withdraw,
            amount,
            fee: Some(fee),
            hash,
            status,
            time,
        })
    }

    /// Prefill the history with one sample transfer per status so a fresh
    /// account has something to show. Balances are not touched.
    pub fn seed_samples<R: Rng + ?Sized>(
        &mut self,
        mut next_id: impl FnMut() -> RecordId,
        rng: &mut R,
        now: Timestamp,
    ) -> usize {
        for (kind, amount, status, hours_ago) in SAMPLE_HISTORY {
            let fee = match kind {
                TransferKind::Deposit => None,
                TransferKind::Withdraw => Some(self.rules.withdraw_fee),
            };
            self.push(AssetHistoryRecord {
                id: next_id(),
                asset: SETTLEMENT_ASSET.to_string(),
                kind,
                amount: Quote::new(amount),
                fee,
                hash: mock_tx_hash(rng),
                status,
                time: now.plus_millis(-hours_ago * HOUR_MS),
            });
        }
        SAMPLE_HISTORY.len()
    }

    fn push(&mut self, record: AssetHistoryRecord) -> &AssetHistoryRecord {
        self.records.insert(0, record);
        &self.records[0]
    }

    pub fn records(&self) -> &[AssetHistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn pending_withdrawals(&self) -> Decimal {
        self.records
            .iter()
            .filter(|r| r.kind == TransferKind::Withdraw && r.status.is_pending())
            .map(|r| r.amount.value())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ledger() -> AssetLedger {
        AssetLedger::new(LedgerRules::default())
    }

    #[test]
    fn deposit_is_completed_without_fee() {
        let mut ledger = ledger();
        let record = ledger.record_deposit(
            RecordId(1),
            Quote::new(dec!(500)),
            "0xabc...".to_string(),
            Timestamp::from_millis(0),
        );

        assert_eq!(record.status, TransferStatus::Completed);
        assert_eq!(record.fee, None);
        assert_eq!(record.transferred_amount().value(), dec!(500));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn withdraw_review_threshold() {
        let mut ledger = ledger();
        let t = Timestamp::from_millis(0);

        let s150 = ledger.record_withdraw(RecordId(1), Quote::new(dec!(150)), String::new(), t).status;
        let s50 = ledger.record_withdraw(RecordId(2), Quote::new(dec!(50)), String::new(), t).status;
        let s100 = ledger.record_withdraw(RecordId(3), Quote::new(dec!(100)), String::new(), t).status;
        let s99 = ledger.record_withdraw(RecordId(4), Quote::new(dec!(99.99)), String::new(), t).status;

        assert_eq!(s150, TransferStatus::Reviewing);
        assert_eq!(s50, TransferStatus::Completed);
        assert_eq!(s100, TransferStatus::Reviewing);
        assert_eq!(s99, TransferStatus::Completed);
    }

    #[test]
    fn withdraw_fee_deducted_and_floored() {
        let mut ledger = ledger();
        let t = Timestamp::from_millis(0);

        let record = ledger.record_withdraw(RecordId(1), Quote::new(dec!(50)), String::new(), t);
        assert_eq!(record.fee, Some(Quote::new(dec!(0.5))));
        assert_eq!(record.transferred_amount().value(), dec!(49.5));

        let tiny = ledger.record_withdraw(RecordId(2), Quote::new(dec!(0.3)), String::new(), t);
        assert_eq!(tiny.transferred_amount().value(), dec!(0));
    }

    #[test]
    fn newest_record_first() {
        let mut ledger = ledger();
        let t = Timestamp::from_millis(0);
        ledger.record_deposit(RecordId(1), Quote::new(dec!(10)), String::new(), t);
        ledger.record_withdraw(RecordId(2), Quote::new(dec!(5)), String::new(), t);

        assert_eq!(ledger.records()[0].id, RecordId(2));
        assert_eq!(ledger.records()[1].id, RecordId(1));
    }

    #[test]
    fn pending_withdrawals_sum_reviewing() {
        let mut ledger = ledger();
        let t = Timestamp::from_millis(0);
        ledger.record_withdraw(RecordId(1), Quote::new(dec!(150)), String::new(), t);
        ledger.record_withdraw(RecordId(2), Quote::new(dec!(20)), String::new(), t);

        assert_eq!(ledger.pending_withdrawals(), dec!(150));
    }

    #[test]
    fn samples_cover_every_status() {
        let mut ledger = ledger();
        let mut rng = StdRng::seed_from_u64(3);
        let mut id = 0;
        let now = Timestamp::from_millis(100 * HOUR_MS);
        let seeded = ledger.seed_samples(
            || {
                id += 1;
                RecordId(id)
            },
            &mut rng,
            now,
        );

        assert_eq!(seeded, 6);
        let statuses: Vec<TransferStatus> = ledger.records().iter().map(|r| r.status).collect();
        for status in [
            TransferStatus::Completed,
            TransferStatus::Processing,
            TransferStatus::Confirming,
            TransferStatus::Rejected,
            TransferStatus::Failed,
        ] {
            assert!(statuses.contains(&status), "{:?} missing", status);
        }
        // newest first: the processing withdraw from an hour ago
        assert_eq!(ledger.records()[0].status, TransferStatus::Processing);
        assert_eq!(ledger.records()[0].time, now.plus_millis(-HOUR_MS));
        assert_eq!(ledger.records()[0].id, RecordId(6));
        // processing counts as pending, rejected does not
        assert_eq!(ledger.pending_withdrawals(), dec!(250));
        assert!(!TransferStatus::Failed.is_pending());
    }

    #[test]
    fn tx_hash_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let hash = mock_tx_hash(&mut rng);
        assert!(hash.starts_with("0x"));
        assert!(hash.ends_with("..."));
        assert_eq!(hash.len(), 2 + 8 + 3);
    }
}
