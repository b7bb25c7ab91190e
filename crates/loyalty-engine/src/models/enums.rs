//! 积分引擎枚举类型定义
//!
//! 所有枚举都支持 JSON（serde）序列化，匹配处一律穷举

use serde::{Deserialize, Serialize};

/// 积分流水类型
///
/// 正向类型增加可用积分，负向类型减少可用积分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// 消费返积分（+）- 订单完成后按等级倍率入账
    Earned,
    /// 兑换消耗（-）- 兑换奖品扣减
    Redeemed,
    /// 过期（-）- 积分有效期结束
    Expired,
    /// 奖励积分（+）- 活动赠送，不参与倍率计算
    Bonus,
}

impl TransactionType {
    /// 是否会形成可过期的积分批次
    pub fn opens_lot(&self) -> bool {
        match self {
            Self::Earned | Self::Bonus => true,
            Self::Redeemed | Self::Expired => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Earned => "earned",
            Self::Redeemed => "redeemed",
            Self::Expired => "expired",
            Self::Bonus => "bonus",
        }
    }
}

/// 奖品分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardCategory {
    /// 主食
    Food,
    /// 饮品
    Beverage,
    /// 甜点
    Dessert,
    /// 折扣券
    Discount,
    /// 周边商品 - 实物，需要配送
    Merchandise,
    /// 体验类 - 主厨餐桌、烹饪课程等
    Experience,
}

/// 会员等级权益
///
/// 由等级表配置，替代松散的字符串集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TierBenefit {
    /// 消费返积分
    PointsOnPurchases,
    /// 生日礼遇
    BirthdayReward,
    /// 免费配送
    FreeDelivery,
    /// 优先订座
    PriorityReservations,
    /// 会员专属活动
    ExclusiveEvents,
    /// 每单赠送甜点
    ComplimentaryDessert,
    /// 专属客服
    PersonalConcierge,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_opens_lot() {
        assert!(TransactionType::Earned.opens_lot());
        assert!(TransactionType::Bonus.opens_lot());
        assert!(!TransactionType::Redeemed.opens_lot());
        assert!(!TransactionType::Expired.opens_lot());
    }

    #[test]
    fn test_transaction_type_serialization() {
        assert_eq!(
            serde_json::to_string(&TransactionType::Redeemed).unwrap(),
            "\"redeemed\""
        );
        assert_eq!(
            serde_json::from_str::<TransactionType>("\"bonus\"").unwrap(),
            TransactionType::Bonus
        );
        assert_eq!(TransactionType::Expired.as_str(), "expired");
    }

    #[test]
    fn test_reward_category_serialization() {
        assert_eq!(
            serde_json::to_string(&RewardCategory::Merchandise).unwrap(),
            "\"MERCHANDISE\""
        );
        assert_eq!(
            serde_json::from_str::<RewardCategory>("\"DESSERT\"").unwrap(),
            RewardCategory::Dessert
        );
    }

    #[test]
    fn test_tier_benefit_serialization() {
        assert_eq!(
            serde_json::to_string(&TierBenefit::FreeDelivery).unwrap(),
            "\"FREE_DELIVERY\""
        );
        assert!(serde_json::from_str::<TierBenefit>("\"FREE_PARKING\"").is_err());
    }
}
