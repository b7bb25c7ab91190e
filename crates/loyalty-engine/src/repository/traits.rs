//! 仓储 Trait 定义
//!
//! 服务层只依赖这里的抽象，存储实现由调用方注入，测试中使用 mock

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{PointsSummary, Reward, SummaryDelta, Transaction};

/// 积分账本仓储接口
///
/// `append_and_update_summary` 必须原子地追加流水并更新汇总：
/// 要么两者都生效，要么都不生效
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// 账户汇总，未知账户返回全零汇总
    async fn summary(&self, account_id: &str) -> Result<PointsSummary>;

    /// 账户全部流水，按追加顺序
    async fn transactions(&self, account_id: &str) -> Result<Vec<Transaction>>;

    /// 已有流水的账户列表
    async fn accounts(&self) -> Result<Vec<String>>;

    /// 按订单号查找入账流水
    async fn find_earned_by_order(
        &self,
        account_id: &str,
        order_id: &str,
    ) -> Result<Option<Transaction>>;

    /// 账户对某奖品的累计兑换次数
    async fn count_redemptions(&self, account_id: &str, reward_id: &str) -> Result<u64>;

    /// 原子追加流水并应用汇总变化量，返回更新后的汇总
    async fn append_and_update_summary(
        &self,
        account_id: &str,
        transaction: Transaction,
        delta: SummaryDelta,
    ) -> Result<PointsSummary>;
}

/// 奖品目录仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardCatalog: Send + Sync {
    async fn get(&self, reward_id: &str) -> Result<Option<Reward>>;

    async fn list(&self) -> Result<Vec<Reward>>;

    /// 扣减一件库存
    ///
    /// 库存为 0 时返回 false；无限库存直接返回 true；奖品不存在返回 `RewardNotFound`
    async fn decrement_stock(&self, reward_id: &str) -> Result<bool>;

    /// 归还一件库存（兑换失败时回滚）
    async fn release_stock(&self, reward_id: &str) -> Result<()>;
}
