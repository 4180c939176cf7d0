/// Balance Reconciliation Adapter
///
/// Relates the local ledger to a balance fetched from elsewhere. The policy
/// is always explicit; there is no implicit default inside this module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::LedgerError;
use crate::identity::WalletIdentity;
use crate::ledger::Ledger;
use crate::storage::WalletRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationPolicy {
    /// Spendable = remote balance minus local spend. For claims settled on-chain.
    TrustRemote,
    /// Spendable = local claimed minus local spent. Remote balance is informational.
    LocalLedger,
}

impl ReconciliationPolicy {
    /// Spendable figure under this policy. An unknown remote balance counts as zero.
    pub fn spendable(&self, record: &WalletRecord, remote_balance: Option<u64>) -> u64 {
        match self {
            ReconciliationPolicy::TrustRemote => remote_balance
                .unwrap_or(0)
                .saturating_sub(record.total_spent),
            ReconciliationPolicy::LocalLedger => record.available(),
        }
    }

    pub fn needs_remote(&self) -> bool {
        matches!(self, ReconciliationPolicy::TrustRemote)
    }
}

impl fmt::Display for ReconciliationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconciliationPolicy::TrustRemote => write!(f, "remote"),
            ReconciliationPolicy::LocalLedger => write!(f, "local"),
        }
    }
}

impl FromStr for ReconciliationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remote" | "trust_remote" | "a" => Ok(ReconciliationPolicy::TrustRemote),
            "local" | "local_ledger" | "b" => Ok(ReconciliationPolicy::LocalLedger),
            other => Err(format!("Unknown reconciliation policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayBalance {
    pub spendable: u64,
    /// Last remote figure, shown as-is regardless of policy
    pub remote: Option<u64>,
}

pub struct Reconciler {
    policy: ReconciliationPolicy,
    ledger: Arc<Ledger>,
}

impl Reconciler {
    pub fn new(policy: ReconciliationPolicy, ledger: Arc<Ledger>) -> Self {
        Self { policy, ledger }
    }

    pub fn policy(&self) -> ReconciliationPolicy {
        self.policy
    }

    pub fn display_balance(
        &self,
        identity: &WalletIdentity,
        remote_balance: Option<u64>,
    ) -> Result<DisplayBalance, LedgerError> {
        let record = self.ledger.totals(identity)?;
        Ok(DisplayBalance {
            spendable: self.policy.spendable(&record, remote_balance),
            remote: remote_balance,
        })
    }

    /// Spend gated on this policy's spendable figure
    pub fn spend(
        &self,
        identity: &WalletIdentity,
        amount: u64,
        remote_balance: Option<u64>,
    ) -> Result<u64, LedgerError> {
        let policy = self.policy;
        self.ledger
            .record_spend_within(identity, amount, |record| policy.spendable(record, remote_balance))
    }
}
