//! 内存积分账本
//!
//! 使用 DashMap 按账户分片，每个账户一把读写锁，
//! 流水追加与汇总更新在同一把写锁内完成

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;

use super::traits::LedgerStore;
use crate::error::{LoyaltyError, Result};
use crate::models::{PointsSummary, SummaryDelta, Transaction, TransactionType};

#[derive(Debug, Default)]
struct AccountLedger {
    summary: PointsSummary,
    transactions: Vec<Transaction>,
}

/// 内存积分账本
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedgerStore {
    accounts: Arc<DashMap<String, Arc<RwLock<AccountLedger>>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self, account_id: &str) -> Option<Arc<RwLock<AccountLedger>>> {
        self.accounts.get(account_id).map(|entry| Arc::clone(entry.value()))
    }

    fn ledger_or_create(&self, account_id: &str) -> Arc<RwLock<AccountLedger>> {
        Arc::clone(
            self.accounts
                .entry(account_id.to_string())
                .or_default()
                .value(),
        )
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn summary(&self, account_id: &str) -> Result<PointsSummary> {
        Ok(self
            .ledger(account_id)
            .map(|ledger| ledger.read().summary)
            .unwrap_or_default())
    }

    async fn transactions(&self, account_id: &str) -> Result<Vec<Transaction>> {
        Ok(self
            .ledger(account_id)
            .map(|ledger| ledger.read().transactions.clone())
            .unwrap_or_default())
    }

    async fn accounts(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.accounts.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }

    async fn find_earned_by_order(
        &self,
        account_id: &str,
        order_id: &str,
    ) -> Result<Option<Transaction>> {
        Ok(self.ledger(account_id).and_then(|ledger| {
            ledger
                .read()
                .transactions
                .iter()
                .find(|tx| {
                    tx.transaction_type == TransactionType::Earned
                        && tx.related_order_id.as_deref() == Some(order_id)
                })
                .cloned()
        }))
    }

    async fn count_redemptions(&self, account_id: &str, reward_id: &str) -> Result<u64> {
        Ok(self
            .ledger(account_id)
            .map(|ledger| {
                ledger
                    .read()
                    .transactions
                    .iter()
                    .filter(|tx| {
                        tx.transaction_type == TransactionType::Redeemed
                            && tx.related_reward_id.as_deref() == Some(reward_id)
                    })
                    .count() as u64
            })
            .unwrap_or(0))
    }

    async fn append_and_update_summary(
        &self,
        account_id: &str,
        transaction: Transaction,
        delta: SummaryDelta,
    ) -> Result<PointsSummary> {
        if transaction.account_id != account_id {
            return Err(LoyaltyError::Internal(format!(
                "流水账户不匹配: {} != {}",
                transaction.account_id, account_id
            )));
        }

        let ledger = self.ledger_or_create(account_id);
        let mut ledger = ledger.write();

        let next = ledger.summary.apply(&delta).ok_or_else(|| {
            LoyaltyError::Internal(format!(
                "汇总更新破坏恒等式: account={}, summary={:?}, delta={:?}",
                account_id, ledger.summary, delta
            ))
        })?;

        ledger.transactions.push(transaction);
        ledger.summary = next;
        Ok(next)
    }
}
