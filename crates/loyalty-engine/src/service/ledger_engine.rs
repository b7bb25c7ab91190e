//! 积分账本引擎
//!
//! 负责积分的入账、兑换、过期以及等级查询，是唯一允许修改积分汇总与流水的组件。
//!
//! ## 兑换流程
//!
//! 1. 获取账户锁 -> 2. 获取奖品锁 -> 3. 校验奖品、余额、库存、兑换上限
//! 4. 扣减库存（预占） -> 5. 追加流水并更新汇总 -> 6. 失败时归还库存
//!
//! ## 并发控制策略
//!
//! - 账户锁：同一账户的入账、兑换、过期串行执行
//! - 奖品锁：同一奖品的库存检查与扣减串行执行
//! - 加锁顺序固定为先账户后奖品

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, instrument, warn};

use loyalty_shared::observability::metrics;

use crate::error::{LoyaltyError, Result};
use crate::lock::LockManager;
use crate::models::{
    PointsSummary, Reward, SummaryDelta, Tier, Transaction, TransactionType, open_lots,
};
use crate::repository::{LedgerStore, RewardCatalog};
use crate::service::dto::{AccountOverview, ExpireReport};
use crate::tier::{TierCalculator, TierProgress};

/// 账户概览中“即将过期”的窗口天数
pub const EXPIRING_SOON_DAYS: i64 = 30;

/// 引擎运行参数
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 入账积分的有效期
    pub points_validity: Duration,
    /// 同一订单重复入账时返回首次记录
    pub dedupe_orders: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            points_validity: Duration::days(365),
            dedupe_orders: false,
        }
    }
}

/// 积分账本引擎
///
/// 存储与奖品目录通过 trait 注入，引擎本身不持有全局状态
pub struct LedgerEngine<S, C> {
    store: Arc<S>,
    catalog: Arc<C>,
    calculator: TierCalculator,
    locks: LockManager,
    config: EngineConfig,
}

impl<S, C> LedgerEngine<S, C>
where
    S: LedgerStore,
    C: RewardCatalog,
{
    pub fn new(
        store: Arc<S>,
        catalog: Arc<C>,
        calculator: TierCalculator,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            calculator,
            locks: LockManager::new(),
            config,
        }
    }

    pub fn calculator(&self) -> &TierCalculator {
        &self.calculator
    }

    pub fn locks(&self) -> &LockManager {
        &self.locks
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 消费返积分
    ///
    /// 按当前等级倍率计算：`floor(order_amount * multiplier)`。
    /// 开启 `dedupe_orders` 时，同一订单重复入账直接返回首次的流水。
    #[instrument(skip(self, description), fields(account_id = %account_id, order_id = %order_id))]
    pub async fn earn_points(
        &self,
        account_id: &str,
        order_id: &str,
        order_amount: f64,
        description: &str,
    ) -> Result<Transaction> {
        if !order_amount.is_finite() || order_amount < 0.0 {
            return Err(LoyaltyError::InvalidAmount(format!(
                "订单金额必须为非负有限数, 实际 {}",
                order_amount
            )));
        }

        let _account = self.locks.lock_account(account_id).await;

        if self.config.dedupe_orders {
            if let Some(existing) = self.store.find_earned_by_order(account_id, order_id).await? {
                info!(transaction_id = %existing.id, "订单已入账，返回已存在的流水");
                return Ok(existing);
            }
        }

        let summary = self.store.summary(account_id).await?;
        let tier = self.calculator.current_tier(summary.total);
        let multiplier = tier.multiplier;
        let points = tier.points_for(order_amount).ok_or_else(|| {
            LoyaltyError::InvalidAmount(format!("订单金额过大: {}", order_amount))
        })?;
        ensure_credit_fits(&summary, points)?;

        let now = Utc::now();
        let transaction = Transaction::earned(
            account_id,
            order_id,
            points,
            description,
            now,
            now + self.config.points_validity,
        );

        let summary = self
            .store
            .append_and_update_summary(account_id, transaction.clone(), SummaryDelta::credit(points))
            .await?;

        metrics::record_points_earned(TransactionType::Earned.as_str(), points.unsigned_abs());
        info!(
            transaction_id = %transaction.id,
            points = points,
            multiplier = multiplier,
            available = summary.available,
            "积分入账成功"
        );

        Ok(transaction)
    }

    /// 发放奖励积分（不乘等级倍率）
    #[instrument(skip(self, description), fields(account_id = %account_id))]
    pub async fn grant_bonus(
        &self,
        account_id: &str,
        points: i64,
        description: &str,
    ) -> Result<Transaction> {
        if points <= 0 {
            return Err(LoyaltyError::InvalidAmount(format!(
                "奖励积分必须大于 0, 实际 {}",
                points
            )));
        }

        let _account = self.locks.lock_account(account_id).await;

        let summary = self.store.summary(account_id).await?;
        ensure_credit_fits(&summary, points)?;

        let now = Utc::now();
        let transaction = Transaction::bonus(
            account_id,
            points,
            description,
            now,
            now + self.config.points_validity,
        );

        let summary = self
            .store
            .append_and_update_summary(account_id, transaction.clone(), SummaryDelta::credit(points))
            .await?;

        metrics::record_points_earned(TransactionType::Bonus.as_str(), points.unsigned_abs());
        info!(
            transaction_id = %transaction.id,
            points = points,
            available = summary.available,
            "奖励积分发放成功"
        );

        Ok(transaction)
    }

    /// 兑换奖品
    ///
    /// 整个检查与修改过程在账户锁和奖品锁内完成，
    /// 每种拒绝原因返回对应的错误类型
    #[instrument(skip(self), fields(account_id = %account_id, reward_id = %reward_id))]
    pub async fn redeem_reward(&self, account_id: &str, reward_id: &str) -> Result<Transaction> {
        let result = self.redeem_locked(account_id, reward_id).await;

        match &result {
            Ok(transaction) => {
                metrics::record_redemption("success", transaction.magnitude().unsigned_abs());
            }
            Err(e) => {
                metrics::record_redemption(e.error_code(), 0);
                if e.is_business_error() {
                    info!(error_code = e.error_code(), reason = %e, "兑换被拒绝");
                } else {
                    warn!(error = %e, "兑换失败");
                }
            }
        }

        result
    }

    async fn redeem_locked(&self, account_id: &str, reward_id: &str) -> Result<Transaction> {
        let _account = self.locks.lock_account(account_id).await;
        let _reward = self.locks.lock_reward(reward_id).await;

        let reward = self.validate_redemption(account_id, reward_id).await?;

        // 先预占库存，流水写入失败时归还
        if !self.catalog.decrement_stock(reward_id).await? {
            return Err(LoyaltyError::OutOfStock(reward_id.to_string()));
        }

        let transaction = Transaction::redeemed(account_id, &reward, Utc::now());
        let appended = self
            .store
            .append_and_update_summary(
                account_id,
                transaction.clone(),
                SummaryDelta::redeem(reward.points_required),
            )
            .await;

        match appended {
            Ok(summary) => {
                info!(
                    transaction_id = %transaction.id,
                    points = reward.points_required,
                    available = summary.available,
                    "奖品兑换成功"
                );
                Ok(transaction)
            }
            Err(e) => {
                if let Err(release_err) = self.catalog.release_stock(reward_id).await {
                    error!(
                        reward_id = %reward_id,
                        error = %release_err,
                        "库存回滚失败"
                    );
                }
                Err(e)
            }
        }
    }

    /// 按固定顺序校验兑换条件
    ///
    /// 不存在 -> 已下架 -> 积分不足 -> 无库存 -> 超出兑换上限
    async fn validate_redemption(&self, account_id: &str, reward_id: &str) -> Result<Reward> {
        let reward = self
            .catalog
            .get(reward_id)
            .await?
            .ok_or_else(|| LoyaltyError::RewardNotFound(reward_id.to_string()))?;

        if !reward.is_active {
            return Err(LoyaltyError::RewardInactive(reward_id.to_string()));
        }

        let summary = self.store.summary(account_id).await?;
        if !reward.is_affordable(summary.available) {
            return Err(LoyaltyError::InsufficientPoints {
                required: reward.points_required,
                available: summary.available,
            });
        }

        if !reward.has_stock() {
            return Err(LoyaltyError::OutOfStock(reward_id.to_string()));
        }

        if let Some(limit) = reward.max_redemptions {
            let redeemed = self.store.count_redemptions(account_id, reward_id).await?;
            if redeemed >= u64::from(limit) {
                return Err(LoyaltyError::RedemptionLimitReached {
                    reward_id: reward_id.to_string(),
                    limit,
                });
            }
        }

        Ok(reward)
    }

    /// 按当前时间执行过期
    pub async fn expire_points(&self) -> Result<ExpireReport> {
        self.expire_points_at(Utc::now()).await
    }

    /// 清零所有 `expires_at <= now` 且仍有剩余的积分批次
    #[instrument(skip(self))]
    pub async fn expire_points_at(&self, now: DateTime<Utc>) -> Result<ExpireReport> {
        let mut report = ExpireReport::default();

        for account_id in self.store.accounts().await? {
            let _account = self.locks.lock_account(&account_id).await;
            report.accounts_scanned += 1;

            let transactions = self.store.transactions(&account_id).await?;
            for lot in open_lots(&transactions) {
                if !lot.is_expired_at(now) {
                    continue;
                }

                let transaction = Transaction::expired(&account_id, &lot, now);
                self.store
                    .append_and_update_summary(
                        &account_id,
                        transaction,
                        SummaryDelta::expire(lot.remaining),
                    )
                    .await?;

                debug!(
                    account_id = %account_id,
                    lot_id = %lot.transaction_id,
                    points = lot.remaining,
                    "积分批次已过期"
                );
                report.transactions_created += 1;
                report.points_expired += lot.remaining;
            }
        }

        if !report.is_empty() {
            metrics::record_points_expired(
                report.transactions_created as u64,
                report.points_expired.unsigned_abs(),
            );
            info!(
                accounts_scanned = report.accounts_scanned,
                transactions_created = report.transactions_created,
                points_expired = report.points_expired,
                "积分过期处理完成"
            );
        }

        Ok(report)
    }

    /// 当前可兑换的奖品快照，按所需积分、ID 排序
    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn get_available_rewards(&self, account_id: &str) -> Result<Vec<Reward>> {
        let summary = self.store.summary(account_id).await?;

        let mut rewards = Vec::new();
        for reward in self.catalog.list().await? {
            if !(reward.is_redeemable() && reward.is_affordable(summary.available)) {
                continue;
            }
            // 已达到单账户兑换上限的奖品不再展示
            if let Some(limit) = reward.max_redemptions {
                let redeemed = self.store.count_redemptions(account_id, &reward.id).await?;
                if redeemed >= u64::from(limit) {
                    continue;
                }
            }
            rewards.push(reward);
        }

        rewards.sort_by(|a, b| {
            a.points_required
                .cmp(&b.points_required)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(rewards)
    }

    pub async fn summary(&self, account_id: &str) -> Result<PointsSummary> {
        self.store.summary(account_id).await
    }

    pub async fn current_tier(&self, account_id: &str) -> Result<Tier> {
        let summary = self.store.summary(account_id).await?;
        Ok(self.calculator.current_tier(summary.total).clone())
    }

    pub async fn tier_progress(&self, account_id: &str) -> Result<TierProgress> {
        let summary = self.store.summary(account_id).await?;
        Ok(self.calculator.progress(summary.total))
    }

    /// 最近的流水（新的在前）
    pub async fn transactions(&self, account_id: &str, limit: usize) -> Result<Vec<Transaction>> {
        let mut transactions = self.store.transactions(account_id).await?;
        transactions.reverse();
        transactions.truncate(limit);
        Ok(transactions)
    }

    /// 未来 `within` 时间内将过期的积分
    pub async fn expiring_points(&self, account_id: &str, within: Duration) -> Result<i64> {
        self.expiring_points_at(account_id, Utc::now(), within).await
    }

    pub async fn expiring_points_at(
        &self,
        account_id: &str,
        now: DateTime<Utc>,
        within: Duration,
    ) -> Result<i64> {
        let transactions = self.store.transactions(account_id).await?;
        let deadline = now + within;
        Ok(open_lots(&transactions)
            .iter()
            .filter(|lot| lot.expires_between(now, deadline))
            .map(|lot| lot.remaining)
            .sum())
    }

    /// 账户概览
    pub async fn overview(&self, account_id: &str) -> Result<AccountOverview> {
        let summary = self.store.summary(account_id).await?;
        let expiring_soon = self
            .expiring_points(account_id, Duration::days(EXPIRING_SOON_DAYS))
            .await?;

        Ok(AccountOverview {
            account_id: account_id.to_string(),
            summary,
            tier: self.calculator.current_tier(summary.total).clone(),
            progress: self.calculator.progress(summary.total),
            expiring_soon,
        })
    }
}

/// 入账后 total 不能溢出 i64
fn ensure_credit_fits(summary: &PointsSummary, points: i64) -> Result<()> {
    summary.total.checked_add(points).map(|_| ()).ok_or_else(|| {
        LoyaltyError::InvalidAmount(format!(
            "入账 {} 积分将使累计积分溢出, 当前累计 {}",
            points, summary.total
        ))
    })
}
