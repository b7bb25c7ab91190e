//! 积分账本实体定义
//!
//! 包含积分汇总、流水记录以及用于过期计算的积分批次

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::TransactionType;
use super::reward::Reward;

/// 账户积分汇总
///
/// 恒等式 `total == available + used + expired`，且四项均非负
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsSummary {
    /// 累计获得
    pub total: i64,
    /// 当前可用
    pub available: i64,
    /// 累计已兑换
    pub used: i64,
    /// 累计已过期
    pub expired: i64,
}

impl PointsSummary {
    pub fn new(total: i64, available: i64, used: i64, expired: i64) -> Self {
        Self {
            total,
            available,
            used,
            expired,
        }
    }

    /// 检查汇总恒等式与非负约束
    pub fn is_consistent(&self) -> bool {
        self.total >= 0
            && self.available >= 0
            && self.used >= 0
            && self.expired >= 0
            && self.available.checked_add(self.used).and_then(|v| v.checked_add(self.expired))
                == Some(self.total)
    }

    /// 应用汇总变化量
    ///
    /// 溢出或结果破坏恒等式时返回 None，原值不变
    pub fn apply(&self, delta: &SummaryDelta) -> Option<Self> {
        let next = Self {
            total: self.total.checked_add(delta.total)?,
            available: self.available.checked_add(delta.available)?,
            used: self.used.checked_add(delta.used)?,
            expired: self.expired.checked_add(delta.expired)?,
        };
        next.is_consistent().then_some(next)
    }

    /// 从流水重建汇总
    ///
    /// 增量维护的汇总必须始终等于该折叠结果
    pub fn fold<'a, I>(transactions: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        transactions
            .into_iter()
            .try_fold(Self::default(), |summary, tx| {
                summary.apply(&SummaryDelta::for_transaction(tx))
            })
    }
}

/// 积分汇总变化量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryDelta {
    pub total: i64,
    pub available: i64,
    pub used: i64,
    pub expired: i64,
}

impl SummaryDelta {
    /// 入账：total 与 available 同时增加
    pub fn credit(points: i64) -> Self {
        Self {
            total: points,
            available: points,
            ..Default::default()
        }
    }

    /// 兑换：available 转入 used
    pub fn redeem(cost: i64) -> Self {
        Self {
            available: -cost,
            used: cost,
            ..Default::default()
        }
    }

    /// 过期：available 转入 expired
    pub fn expire(points: i64) -> Self {
        Self {
            available: -points,
            expired: points,
            ..Default::default()
        }
    }

    /// 由流水推导变化量
    pub fn for_transaction(tx: &Transaction) -> Self {
        match tx.transaction_type {
            TransactionType::Earned | TransactionType::Bonus => Self::credit(tx.points),
            TransactionType::Redeemed => Self::redeem(-tx.points),
            TransactionType::Expired => Self::expire(-tx.points),
        }
    }
}

/// 积分流水
///
/// 只追加不修改；points 带符号（入账为正，兑换/过期为负）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub points: i64,
    pub description: String,
    /// 关联订单（消费返积分）
    #[serde(default)]
    pub related_order_id: Option<String>,
    /// 关联奖品（兑换）
    #[serde(default)]
    pub related_reward_id: Option<String>,
    /// 关联的入账流水（过期时指向失效的批次）
    #[serde(default)]
    pub related_transaction_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    /// 积分过期时间（仅入账类流水）
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Transaction {
    fn base(
        account_id: &str,
        transaction_type: TransactionType,
        points: i64,
        description: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            account_id: account_id.to_string(),
            transaction_type,
            points,
            description,
            related_order_id: None,
            related_reward_id: None,
            related_transaction_id: None,
            created_at: now,
            expires_at: None,
        }
    }

    /// 创建消费返积分记录
    pub fn earned(
        account_id: &str,
        order_id: &str,
        points: i64,
        description: impl Into<String>,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            related_order_id: Some(order_id.to_string()),
            expires_at: Some(expires_at),
            ..Self::base(account_id, TransactionType::Earned, points, description.into(), now)
        }
    }

    /// 创建奖励积分记录
    pub fn bonus(
        account_id: &str,
        points: i64,
        description: impl Into<String>,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            expires_at: Some(expires_at),
            ..Self::base(account_id, TransactionType::Bonus, points, description.into(), now)
        }
    }

    /// 创建兑换消耗记录
    pub fn redeemed(account_id: &str, reward: &Reward, now: DateTime<Utc>) -> Self {
        Self {
            related_reward_id: Some(reward.id.clone()),
            ..Self::base(
                account_id,
                TransactionType::Redeemed,
                -reward.points_required,
                format!("Redeemed: {}", reward.name),
                now,
            )
        }
    }

    /// 创建过期记录，扣减整个批次的剩余积分
    pub fn expired(account_id: &str, lot: &PointLot, now: DateTime<Utc>) -> Self {
        Self {
            related_transaction_id: Some(lot.transaction_id),
            ..Self::base(
                account_id,
                TransactionType::Expired,
                -lot.remaining,
                format!("Expired: {} points", lot.remaining),
                now,
            )
        }
    }

    /// 变动的绝对值
    pub fn magnitude(&self) -> i64 {
        self.points.abs()
    }
}

/// 积分批次
///
/// 每笔入账流水形成一个批次，兑换按先进先出（FIFO）顺序消耗批次，
/// 过期只清零其指向的批次
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointLot {
    pub transaction_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub original: i64,
    pub remaining: i64,
}

impl PointLot {
    /// 批次是否已到期（到期时间点当刻即视为到期）
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|t| t <= now)
    }

    /// 批次是否在 `[now, deadline]` 窗口内到期
    pub fn expires_between(&self, now: DateTime<Utc>, deadline: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|t| t > now && t <= deadline)
    }
}

/// 按追加顺序回放流水，返回仍有剩余积分的批次
///
/// 批次按 `created_at` 从旧到新排列，时间相同的按追加顺序；兑换按此顺序 FIFO 扣减
pub fn open_lots(transactions: &[Transaction]) -> Vec<PointLot> {
    let mut lots: Vec<PointLot> = Vec::new();

    for tx in transactions {
        if tx.transaction_type.opens_lot() {
            // 插到所有不晚于它的批次之后，保持 (created_at, 追加顺序) 有序
            let position = lots.partition_point(|lot| lot.created_at <= tx.created_at);
            lots.insert(
                position,
                PointLot {
                    transaction_id: tx.id,
                    created_at: tx.created_at,
                    expires_at: tx.expires_at,
                    original: tx.points,
                    remaining: tx.points,
                },
            );
            continue;
        }

        match tx.transaction_type {
            TransactionType::Redeemed => consume_fifo(&mut lots, tx.magnitude()),
            TransactionType::Expired => {
                let target = tx
                    .related_transaction_id
                    .and_then(|id| lots.iter_mut().find(|lot| lot.transaction_id == id));
                match target {
                    Some(lot) => lot.remaining = (lot.remaining - tx.magnitude()).max(0),
                    // 未指明批次的过期记录同样按 FIFO 扣减
                    None => consume_fifo(&mut lots, tx.magnitude()),
                }
            }
            TransactionType::Earned | TransactionType::Bonus => {}
        }
    }

    lots.retain(|lot| lot.remaining > 0);
    lots
}

fn consume_fifo(lots: &mut [PointLot], mut amount: i64) {
    for lot in lots.iter_mut() {
        if amount == 0 {
            break;
        }
        let take = lot.remaining.min(amount);
        lot.remaining -= take;
        amount -= take;
    }
}
