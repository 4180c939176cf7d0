/// Local Token Ledger
///
/// Tracks cumulative claimed and spent totals per wallet identity. The
/// available balance is always derived (`claimed - spent`, floored at zero),
/// never stored.

use std::sync::Arc;

use crate::cooldown::remaining_millis;
use crate::error::LedgerError;
use crate::identity::WalletIdentity;
use crate::storage::{RecordStore, WalletRecord};

pub struct Ledger {
    records: Arc<RecordStore>,
}

impl Ledger {
    pub fn new(records: Arc<RecordStore>) -> Self {
        Self { records }
    }

    /// Spendable balance. Zero for identities never seen.
    pub fn get_available_balance(&self, identity: &WalletIdentity) -> Result<u64, LedgerError> {
        Ok(self.records.load(identity)?.available())
    }

    pub fn has_sufficient_balance(
        &self,
        identity: &WalletIdentity,
        amount: u64,
    ) -> Result<bool, LedgerError> {
        Ok(self.get_available_balance(identity)? >= amount)
    }

    /// Snapshot of everything stored for `identity`
    pub fn totals(&self, identity: &WalletIdentity) -> Result<WalletRecord, LedgerError> {
        Ok(self.records.load(identity)?)
    }

    /// Credit `amount` to the claimed total. Not idempotent.
    pub fn record_claim(&self, identity: &WalletIdentity, amount: u64) -> Result<u64, LedgerError> {
        validate_amount(amount)?;
        let available = self.records.update(identity, |record| {
            credit(record, amount)?;
            Ok(record.available())
        })?;
        log::info!("Recorded claim of {} for {} (available {})", amount, identity, available);
        Ok(available)
    }

    /// Credit a claim and start the cooldown in one write.
    ///
    /// The cooldown is re-checked against `now_millis` inside the identity's
    /// critical section, so a caller that checked earlier and then awaited
    /// cannot double-claim.
    pub fn claim_with_cooldown(
        &self,
        identity: &WalletIdentity,
        amount: u64,
        now_millis: i64,
        window_millis: u64,
    ) -> Result<u64, LedgerError> {
        validate_amount(amount)?;
        let available = self.records.update(identity, |record| {
            let remaining =
                remaining_millis(record.last_claim_at, now_millis, window_millis);
            if remaining > 0 {
                return Err(LedgerError::CooldownActive {
                    remaining_millis: remaining,
                });
            }
            credit(record, amount)?;
            record.last_claim_at = Some(now_millis);
            Ok(record.available())
        })?;
        log::info!(
            "Claimed {} for {} at {} (available {})",
            amount,
            identity,
            now_millis,
            available
        );
        Ok(available)
    }

    /// Deduct `amount` if the available balance covers it.
    ///
    /// On `InsufficientBalance` nothing is written.
    pub fn record_spend(&self, identity: &WalletIdentity, amount: u64) -> Result<u64, LedgerError> {
        self.record_spend_within(identity, amount, WalletRecord::available)
    }

    /// Deduct `amount` if `spendable(record)` covers it. The check and the
    /// write share one critical section.
    pub(crate) fn record_spend_within<F>(
        &self,
        identity: &WalletIdentity,
        amount: u64,
        spendable: F,
    ) -> Result<u64, LedgerError>
    where
        F: FnOnce(&WalletRecord) -> u64,
    {
        validate_amount(amount)?;
        let remaining = self.records.update(identity, |record| {
            let available = spendable(record);
            if available < amount {
                return Err(LedgerError::InsufficientBalance {
                    required: amount,
                    available,
                });
            }
            record.total_spent = record.total_spent.checked_add(amount).ok_or_else(|| {
                LedgerError::InvalidAmount(format!("spent total overflows with {}", amount))
            })?;
            Ok(available - amount)
        });

        match &remaining {
            Ok(left) => log::info!("Spent {} for {} ({} left)", amount, identity, left),
            Err(e) => log::warn!("Spend of {} for {} rejected: {}", amount, identity, e),
        }
        remaining
    }
}

fn validate_amount(amount: u64) -> Result<(), LedgerError> {
    if amount == 0 {
        return Err(LedgerError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn credit(record: &mut WalletRecord, amount: u64) -> Result<(), LedgerError> {
    record.total_claimed = record.total_claimed.checked_add(amount).ok_or_else(|| {
        LedgerError::InvalidAmount(format!("claimed total overflows with {}", amount))
    })?;
    Ok(())
}
