//! 会员等级计算器
//!
//! 纯函数：累计积分 -> 当前等级、下一等级与升级进度

use serde::Serialize;

use crate::error::{LoyaltyError, Result};
use crate::models::Tier;

/// 升级进度
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierProgress {
    pub current_tier: Tier,
    pub next_tier: Option<Tier>,
    /// 当前等级内已累计的积分
    pub current: i64,
    /// 升到下一等级所需的区间宽度（最高等级为 0）
    pub next: i64,
    /// 进度百分比，封顶 100
    pub percentage: f64,
}

/// 会员等级计算器
///
/// 构造时校验等级表，运行期不会因配置失败
#[derive(Debug, Clone)]
pub struct TierCalculator {
    tiers: Vec<Tier>,
}

impl TierCalculator {
    /// 校验等级表并创建计算器
    ///
    /// 要求：非空；首个等级从 0 开始；按 min_points 升序且首尾相接；
    /// 只有最后一个等级无上限；倍率为正有限数；ID 不重复
    pub fn new(tiers: Vec<Tier>) -> Result<Self> {
        validate_table(&tiers)?;
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// 当前等级：区间包含 total 的等级，均不匹配时返回最后一个等级
    pub fn current_tier(&self, total_points: i64) -> &Tier {
        self.tiers
            .iter()
            .find(|tier| tier.contains(total_points))
            .unwrap_or_else(|| self.last())
    }

    /// 紧随其后的等级，已是最高等级时返回 None
    pub fn next_tier(&self, current: &Tier) -> Option<&Tier> {
        if current.is_terminal() {
            return None;
        }
        let index = self.tiers.iter().position(|tier| tier.id == current.id)?;
        self.tiers.get(index + 1)
    }

    /// 当前等级的消费返积分倍率
    pub fn multiplier_for(&self, total_points: i64) -> f64 {
        self.current_tier(total_points).multiplier
    }

    /// 计算升级进度
    pub fn progress(&self, total_points: i64) -> TierProgress {
        let current_tier = self.current_tier(total_points);
        let next_tier = self.next_tier(current_tier);

        let current = total_points - current_tier.min_points;
        let (next, percentage) = match next_tier {
            Some(next_tier) => {
                let span = next_tier.min_points - current_tier.min_points;
                let percentage = (100.0 * current as f64 / span as f64).min(100.0);
                (span, percentage)
            }
            None => (0, 100.0),
        };

        TierProgress {
            current_tier: current_tier.clone(),
            next_tier: next_tier.cloned(),
            current,
            next,
            percentage,
        }
    }

    fn last(&self) -> &Tier {
        // new() 保证等级表非空
        &self.tiers[self.tiers.len() - 1]
    }
}

fn validate_table(tiers: &[Tier]) -> Result<()> {
    let Some(first) = tiers.first() else {
        return Err(LoyaltyError::Configuration("等级表不能为空".to_string()));
    };

    if first.min_points != 0 {
        return Err(LoyaltyError::Configuration(format!(
            "首个等级 {} 必须从 0 积分开始, 实际 {}",
            first.id, first.min_points
        )));
    }

    for (index, tier) in tiers.iter().enumerate() {
        if !(tier.multiplier.is_finite() && tier.multiplier > 0.0) {
            return Err(LoyaltyError::Configuration(format!(
                "等级 {} 的倍率必须为正数, 实际 {}",
                tier.id, tier.multiplier
            )));
        }

        if tiers[..index].iter().any(|other| other.id == tier.id) {
            return Err(LoyaltyError::Configuration(format!(
                "等级 ID 重复: {}",
                tier.id
            )));
        }

        let is_last = index + 1 == tiers.len();
        match (tier.max_points, is_last) {
            (None, true) => {}
            (None, false) => {
                return Err(LoyaltyError::Configuration(format!(
                    "只有最后一个等级可以无上限: {}",
                    tier.id
                )));
            }
            (Some(max), true) => {
                return Err(LoyaltyError::Configuration(format!(
                    "最后一个等级 {} 不能设置上限 {}",
                    tier.id, max
                )));
            }
            (Some(max), false) => {
                if max <= tier.min_points {
                    return Err(LoyaltyError::Configuration(format!(
                        "等级 {} 的区间为空: [{}, {})",
                        tier.id, tier.min_points, max
                    )));
                }
                let next = &tiers[index + 1];
                if next.min_points != max {
                    return Err(LoyaltyError::Configuration(format!(
                        "等级 {} 与 {} 之间存在间隙或重叠: {} != {}",
                        tier.id, next.id, max, next.min_points
                    )));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_tiers;
    use crate::models::TierBenefit;
    use std::collections::BTreeSet;

    fn tier(id: &str, min: i64, max: Option<i64>, multiplier: f64) -> Tier {
        Tier {
            id: id.to_string(),
            name: id.to_uppercase(),
            min_points: min,
            max_points: max,
            benefits: BTreeSet::from([TierBenefit::PointsOnPurchases]),
            multiplier,
        }
    }

    fn calculator() -> TierCalculator {
        TierCalculator::new(default_tiers()).unwrap()
    }

    #[test]
    fn test_tier_boundary_499_500() {
        let calc = calculator();
        let bronze = calc.current_tier(499);
        assert_eq!(bronze.id, "bronze");
        assert_eq!(bronze.multiplier, 1.0);

        let silver = calc.current_tier(500);
        assert_eq!(silver.id, "silver");
        assert_eq!(silver.multiplier, 2.0);
    }

    #[test]
    fn test_current_tier_terminal() {
        let calc = calculator();
        assert_eq!(calc.current_tier(3000).id, "platinum");
        assert_eq!(calc.current_tier(1_000_000).id, "platinum");
    }

    #[test]
    fn test_current_tier_falls_back_to_last() {
        let calc = calculator();
        // 负数不在任何区间内
        assert_eq!(calc.current_tier(-1).id, "platinum");
    }

    #[test]
    fn test_next_tier() {
        let calc = calculator();
        let bronze = calc.current_tier(0).clone();
        assert_eq!(calc.next_tier(&bronze).unwrap().id, "silver");

        let platinum = calc.current_tier(5000).clone();
        assert!(calc.next_tier(&platinum).is_none());
    }

    #[test]
    fn test_progress_within_tier() {
        let calc = calculator();
        let progress = calc.progress(250);
        assert_eq!(progress.current_tier.id, "bronze");
        assert_eq!(progress.next_tier.as_ref().unwrap().id, "silver");
        assert_eq!(progress.current, 250);
        assert_eq!(progress.next, 500);
        assert_eq!(progress.percentage, 50.0);
    }

    #[test]
    fn test_progress_silver() {
        let calc = calculator();
        let progress = calc.progress(1000);
        assert_eq!(progress.current_tier.id, "silver");
        assert_eq!(progress.current, 500);
        assert_eq!(progress.next, 1000);
        assert_eq!(progress.percentage, 50.0);
    }

    #[test]
    fn test_progress_terminal_tier() {
        let calc = calculator();
        let progress = calc.progress(4200);
        assert_eq!(progress.current_tier.id, "platinum");
        assert!(progress.next_tier.is_none());
        assert_eq!(progress.current, 1200);
        assert_eq!(progress.next, 0);
        assert_eq!(progress.percentage, 100.0);
    }

    #[test]
    fn test_multiplier_for() {
        let calc = calculator();
        assert_eq!(calc.multiplier_for(0), 1.0);
        assert_eq!(calc.multiplier_for(1500), 3.0);
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = TierCalculator::new(vec![]).unwrap_err();
        assert!(matches!(err, LoyaltyError::Configuration(_)));
    }

    #[test]
    fn test_gap_rejected() {
        let tiers = vec![
            tier("bronze", 0, Some(500), 1.0),
            tier("silver", 600, None, 2.0),
        ];
        assert!(TierCalculator::new(tiers).is_err());
    }

    #[test]
    fn test_overlap_rejected() {
        let tiers = vec![
            tier("bronze", 0, Some(500), 1.0),
            tier("silver", 400, None, 2.0),
        ];
        assert!(TierCalculator::new(tiers).is_err());
    }

    #[test]
    fn test_bounded_last_tier_rejected() {
        let tiers = vec![tier("bronze", 0, Some(500), 1.0)];
        assert!(TierCalculator::new(tiers).is_err());
    }

    #[test]
    fn test_unbounded_middle_tier_rejected() {
        let tiers = vec![tier("bronze", 0, None, 1.0), tier("silver", 500, None, 2.0)];
        assert!(TierCalculator::new(tiers).is_err());
    }

    #[test]
    fn test_invalid_multiplier_rejected() {
        assert!(TierCalculator::new(vec![tier("bronze", 0, None, 0.0)]).is_err());
        assert!(TierCalculator::new(vec![tier("bronze", 0, None, f64::NAN)]).is_err());
    }

    #[test]
    fn test_first_tier_must_start_at_zero() {
        assert!(TierCalculator::new(vec![tier("bronze", 10, None, 1.0)]).is_err());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let tiers = vec![
            tier("bronze", 0, Some(500), 1.0),
            tier("bronze", 500, None, 2.0),
        ];
        assert!(TierCalculator::new(tiers).is_err());
    }

    #[test]
    fn test_single_unbounded_tier() {
        let calc = TierCalculator::new(vec![tier("member", 0, None, 1.0)]).unwrap();
        let progress = calc.progress(42);
        assert_eq!(progress.percentage, 100.0);
        assert_eq!(progress.next, 0);
    }
}
