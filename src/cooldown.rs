/// Cooldown Gate
///
/// Enforces a fixed wait between successful claims of the same wallet. The
/// gate is `Waiting` after a claim and becomes `Ready` again purely by
/// elapsed time; there is no event for that transition, it is recomputed on
/// every query.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::error::LedgerError;
use crate::identity::WalletIdentity;
use crate::storage::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CooldownState {
    Ready,
    Waiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownStatus {
    pub can_claim: bool,
    pub remaining_millis: u64,
}

impl CooldownStatus {
    pub fn state(&self) -> CooldownState {
        if self.can_claim {
            CooldownState::Ready
        } else {
            CooldownState::Waiting
        }
    }
}

pub struct CooldownGate {
    records: Arc<RecordStore>,
    clock: Arc<dyn Clock>,
    window: Duration,
}

impl CooldownGate {
    pub fn new(records: Arc<RecordStore>, clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            records,
            clock,
            window,
        }
    }

    pub fn window_millis(&self) -> u64 {
        self.window.as_millis() as u64
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    pub fn check_status(&self, identity: &WalletIdentity) -> Result<CooldownStatus, LedgerError> {
        let record = self.records.load(identity)?;
        let remaining = remaining_millis(
            record.last_claim_at,
            self.clock.now_millis(),
            self.window_millis(),
        );
        Ok(CooldownStatus {
            can_claim: remaining == 0,
            remaining_millis: remaining,
        })
    }

    /// Start the cooldown now. Call once per successful claim, after the
    /// ledger has recorded it.
    pub fn record_claim_time(&self, identity: &WalletIdentity) -> Result<(), LedgerError> {
        let now = self.clock.now_millis();
        self.records.update(identity, |record| {
            record.last_claim_at = Some(now);
            Ok(())
        })?;
        log::debug!("Cooldown started for {} at {}", identity, now);
        Ok(())
    }

    /// Start the cooldown only if it has elapsed, re-checked inside the
    /// identity's critical section. For claims that credit nothing to the
    /// local ledger, such as SOL airdrops.
    pub fn start_if_ready(&self, identity: &WalletIdentity) -> Result<(), LedgerError> {
        let now = self.clock.now_millis();
        let window = self.window_millis();
        self.records.update(identity, |record| {
            let remaining = remaining_millis(record.last_claim_at, now, window);
            if remaining > 0 {
                return Err(LedgerError::CooldownActive {
                    remaining_millis: remaining,
                });
            }
            record.last_claim_at = Some(now);
            Ok(())
        })?;
        log::debug!("Cooldown started for {} at {}", identity, now);
        Ok(())
    }
}

/// Wait left before the next claim. A last claim in the future (clock skew)
/// counts as a claim made just now.
pub fn remaining_millis(last_claim_at: Option<i64>, now_millis: i64, window_millis: u64) -> u64 {
    match last_claim_at {
        None => 0,
        Some(last) => {
            let elapsed = now_millis.saturating_sub(last);
            if elapsed < 0 {
                window_millis
            } else {
                window_millis.saturating_sub(elapsed as u64)
            }
        }
    }
}

/// Whole minutes and seconds, floor-rounded: `754_000` becomes `"12m 34s"`.
pub fn format_remaining(millis: u64) -> String {
    let minutes = millis / 60_000;
    let seconds = (millis % 60_000) / 1_000;
    format!("{}m {}s", minutes, seconds)
}
