//! 会员等级实体定义

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::enums::TierBenefit;

/// 会员等级
///
/// 覆盖左闭右开的累计积分区间 `[min_points, max_points)`，
/// 最后一个等级没有上限（`max_points = None`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    pub id: String,
    pub name: String,
    /// 区间下界（含）
    pub min_points: i64,
    /// 区间上界（不含），None 表示无上限
    pub max_points: Option<i64>,
    pub benefits: BTreeSet<TierBenefit>,
    /// 消费返积分倍率（正有限数）
    pub multiplier: f64,
}

impl Tier {
    /// 累计积分是否落在本等级区间内
    pub fn contains(&self, total_points: i64) -> bool {
        total_points >= self.min_points && self.max_points.is_none_or(|max| total_points < max)
    }

    /// 是否为最高等级
    pub fn is_terminal(&self) -> bool {
        self.max_points.is_none()
    }

    pub fn has_benefit(&self, benefit: TierBenefit) -> bool {
        self.benefits.contains(&benefit)
    }

    /// 按倍率折算订单金额，向下取整；结果超出 i64 范围时返回 None
    pub fn points_for(&self, order_amount: f64) -> Option<i64> {
        let points = (order_amount * self.multiplier).floor();
        (points.is_finite() && points >= 0.0 && points < i64::MAX as f64).then_some(points as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_tier(min: i64, max: Option<i64>, multiplier: f64) -> Tier {
        Tier {
            id: "silver".to_string(),
            name: "Silver".to_string(),
            min_points: min,
            max_points: max,
            benefits: BTreeSet::from([TierBenefit::PointsOnPurchases, TierBenefit::FreeDelivery]),
            multiplier,
        }
    }

    #[test]
    fn test_tier_contains_is_closed_open() {
        let tier = create_test_tier(500, Some(1500), 2.0);
        assert!(!tier.contains(499));
        assert!(tier.contains(500));
        assert!(tier.contains(1499));
        assert!(!tier.contains(1500));
    }

    #[test]
    fn test_terminal_tier_is_unbounded() {
        let tier = create_test_tier(3000, None, 4.0);
        assert!(tier.is_terminal());
        assert!(tier.contains(i64::MAX));
        assert!(!tier.contains(2999));
    }

    #[test]
    fn test_points_for_floors() {
        let tier = create_test_tier(0, Some(500), 1.5);
        assert_eq!(tier.points_for(20.0), Some(30));
        assert_eq!(tier.points_for(19.99), Some(29));
        assert_eq!(tier.points_for(0.0), Some(0));
        assert_eq!(tier.points_for(f64::MAX), None);
    }

    #[test]
    fn test_has_benefit() {
        let tier = create_test_tier(500, Some(1500), 2.0);
        assert!(tier.has_benefit(TierBenefit::FreeDelivery));
        assert!(!tier.has_benefit(TierBenefit::PersonalConcierge));
    }
}
