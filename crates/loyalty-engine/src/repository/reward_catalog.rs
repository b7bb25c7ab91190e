//! 内存奖品目录

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::traits::RewardCatalog;
use crate::error::{LoyaltyError, Result};
use crate::models::Reward;

/// 内存奖品目录
///
/// 库存增减在 DashMap 分片锁内完成，同一奖品的并发扣减不会超卖
#[derive(Debug, Default, Clone)]
pub struct InMemoryRewardCatalog {
    rewards: Arc<DashMap<String, Reward>>,
}

impl InMemoryRewardCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用给定奖品初始化目录
    pub fn with_rewards(rewards: impl IntoIterator<Item = Reward>) -> Result<Self> {
        let catalog = Self::new();
        for reward in rewards {
            catalog.upsert(reward)?;
        }
        Ok(catalog)
    }

    /// 新增或覆盖奖品
    pub fn upsert(&self, reward: Reward) -> Result<()> {
        reward.validate()?;
        debug!(reward_id = %reward.id, "Reward upserted");
        self.rewards.insert(reward.id.clone(), reward);
        Ok(())
    }

    /// 上架/下架
    pub fn set_active(&self, reward_id: &str, is_active: bool) -> Result<()> {
        let mut reward = self
            .rewards
            .get_mut(reward_id)
            .ok_or_else(|| LoyaltyError::RewardNotFound(reward_id.to_string()))?;
        reward.is_active = is_active;
        Ok(())
    }

    /// 补货，对不限量奖品无效
    pub fn restock(&self, reward_id: &str, quantity: u32) -> Result<()> {
        let mut reward = self
            .rewards
            .get_mut(reward_id)
            .ok_or_else(|| LoyaltyError::RewardNotFound(reward_id.to_string()))?;
        if let Some(stock) = reward.stock.as_mut() {
            *stock = stock.saturating_add(quantity);
        }
        Ok(())
    }
}

#[async_trait]
impl RewardCatalog for InMemoryRewardCatalog {
    async fn get(&self, reward_id: &str) -> Result<Option<Reward>> {
        Ok(self.rewards.get(reward_id).map(|r| r.value().clone()))
    }

    async fn list(&self) -> Result<Vec<Reward>> {
        Ok(self.rewards.iter().map(|r| r.value().clone()).collect())
    }

    async fn decrement_stock(&self, reward_id: &str) -> Result<bool> {
        let mut reward = self
            .rewards
            .get_mut(reward_id)
            .ok_or_else(|| LoyaltyError::RewardNotFound(reward_id.to_string()))?;

        match reward.stock.as_mut() {
            None => Ok(true),
            Some(0) => Ok(false),
            Some(stock) => {
                *stock -= 1;
                Ok(true)
            }
        }
    }

    async fn release_stock(&self, reward_id: &str) -> Result<()> {
        self.restock(reward_id, 1)
    }
}
