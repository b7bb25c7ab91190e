//! 奖品实体定义

use serde::{Deserialize, Serialize};

use super::enums::RewardCategory;
use crate::error::{LoyaltyError, Result};

/// 可兑换奖品
///
/// 由外部目录管理创建和补货，引擎只在兑换成功时扣减库存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// 兑换所需积分（必须大于 0）
    pub points_required: i64,
    pub category: RewardCategory,
    pub is_active: bool,
    /// 剩余库存（None 表示不限量）
    #[serde(default)]
    pub stock: Option<u32>,
    /// 单个账户可兑换的最大次数（None 表示不限）
    #[serde(default)]
    pub max_redemptions: Option<u32>,
}

impl Reward {
    /// 检查是否有库存
    pub fn has_stock(&self) -> bool {
        self.stock.is_none_or(|remaining| remaining > 0)
    }

    /// 可用积分是否足够兑换
    pub fn is_affordable(&self, available: i64) -> bool {
        available >= self.points_required
    }

    /// 检查是否可兑换（上架且有库存）
    pub fn is_redeemable(&self) -> bool {
        self.is_active && self.has_stock()
    }

    /// 校验目录数据
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(LoyaltyError::Configuration("奖品 ID 不能为空".to_string()));
        }
        if self.points_required <= 0 {
            return Err(LoyaltyError::Configuration(format!(
                "奖品 {} 的兑换积分必须大于 0, 实际 {}",
                self.id, self.points_required
            )));
        }
        Ok(())
    }
}
