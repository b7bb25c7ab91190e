//! 积分引擎业务配置
//!
//! 与 `AppConfig` 共用同一组配置源，读取 `[loyalty]` 段：
//!
//! ```toml
//! [loyalty]
//! points_validity_days = 365
//! dedupe_orders = false
//!
//! [[loyalty.tiers]]
//! id = "bronze"
//! name = "Bronze"
//! min_points = 0
//! max_points = 500
//! multiplier = 1.0
//! benefits = ["POINTS_ON_PURCHASES"]
//! ```

use std::time::Duration;

use ::config::ConfigError;
use serde::Deserialize;

use loyalty_shared::config::load_layered;

use crate::error::{LoyaltyError, Result};
use crate::models::{Reward, RewardCategory, Tier, TierBenefit};
use crate::service::EngineConfig;

/// 等级配置项
#[derive(Debug, Clone, Deserialize)]
pub struct TierConfig {
    pub id: String,
    pub name: String,
    pub min_points: i64,
    #[serde(default)]
    pub max_points: Option<i64>,
    #[serde(default)]
    pub benefits: Vec<TierBenefit>,
    pub multiplier: f64,
}

impl From<TierConfig> for Tier {
    fn from(config: TierConfig) -> Self {
        Tier {
            id: config.id,
            name: config.name,
            min_points: config.min_points,
            max_points: config.max_points,
            benefits: config.benefits.into_iter().collect(),
            multiplier: config.multiplier,
        }
    }
}

/// 奖品配置项（启动时灌入内存目录）
#[derive(Debug, Clone, Deserialize)]
pub struct RewardConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub points_required: i64,
    pub category: RewardCategory,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub max_redemptions: Option<u32>,
}

impl From<RewardConfig> for Reward {
    fn from(config: RewardConfig) -> Self {
        Reward {
            id: config.id,
            name: config.name,
            description: config.description,
            points_required: config.points_required,
            category: config.category,
            is_active: config.is_active,
            stock: config.stock,
            max_redemptions: config.max_redemptions,
        }
    }
}

/// 过期 Worker 配置
#[derive(Debug, Clone, Deserialize)]
pub struct ExpireWorkerConfig {
    /// 轮询间隔（秒）
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for ExpireWorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl ExpireWorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// 积分业务配置
#[derive(Debug, Clone, Deserialize)]
pub struct LoyaltyConfig {
    /// 入账积分的有效天数
    #[serde(default = "default_points_validity_days")]
    pub points_validity_days: i64,
    /// 同一订单重复入账时返回首次记录而不重复加分
    #[serde(default)]
    pub dedupe_orders: bool,
    #[serde(default = "default_tier_configs")]
    pub tiers: Vec<TierConfig>,
    #[serde(default)]
    pub rewards: Vec<RewardConfig>,
    #[serde(default)]
    pub expire_worker: ExpireWorkerConfig,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            points_validity_days: default_points_validity_days(),
            dedupe_orders: false,
            tiers: default_tier_configs(),
            rewards: Vec::new(),
            expire_worker: ExpireWorkerConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServiceSettings {
    #[serde(default)]
    loyalty: LoyaltyConfig,
}

impl LoyaltyConfig {
    /// 从分层配置源加载 `[loyalty]` 段
    pub fn load(service_name: &str) -> std::result::Result<Self, ConfigError> {
        let settings: ServiceSettings = load_layered(service_name)?;
        Ok(settings.loyalty)
    }

    /// 等级表（未校验，交给 `TierCalculator::new`）
    pub fn tier_table(&self) -> Vec<Tier> {
        self.tiers.iter().cloned().map(Tier::from).collect()
    }

    /// 初始奖品目录（逐项校验）
    pub fn catalog(&self) -> Result<Vec<Reward>> {
        self.rewards
            .iter()
            .cloned()
            .map(Reward::from)
            .map(|reward| reward.validate().map(|_| reward))
            .collect()
    }

    /// 引擎运行参数
    pub fn engine_config(&self) -> Result<EngineConfig> {
        if self.points_validity_days <= 0 {
            return Err(LoyaltyError::Configuration(format!(
                "积分有效天数必须大于 0, 实际 {}",
                self.points_validity_days
            )));
        }
        Ok(EngineConfig {
            points_validity: chrono::Duration::days(self.points_validity_days),
            dedupe_orders: self.dedupe_orders,
        })
    }
}

/// 默认等级表
///
/// Bronze [0, 500) x1, Silver [500, 1500) x2, Gold [1500, 3000) x3, Platinum [3000, ∞) x4
pub fn default_tiers() -> Vec<Tier> {
    default_tier_configs().into_iter().map(Tier::from).collect()
}

fn default_tier_configs() -> Vec<TierConfig> {
    use TierBenefit::*;

    let tier = |id: &str, name: &str, min, max, multiplier, benefits: &[TierBenefit]| TierConfig {
        id: id.to_string(),
        name: name.to_string(),
        min_points: min,
        max_points: max,
        benefits: benefits.to_vec(),
        multiplier,
    };

    vec![
        tier("bronze", "Bronze", 0, Some(500), 1.0, &[PointsOnPurchases]),
        tier(
            "silver",
            "Silver",
            500,
            Some(1500),
            2.0,
            &[PointsOnPurchases, BirthdayReward],
        ),
        tier(
            "gold",
            "Gold",
            1500,
            Some(3000),
            3.0,
            &[PointsOnPurchases, BirthdayReward, FreeDelivery, PriorityReservations],
        ),
        tier(
            "platinum",
            "Platinum",
            3000,
            None,
            4.0,
            &[
                PointsOnPurchases,
                BirthdayReward,
                FreeDelivery,
                PriorityReservations,
                ExclusiveEvents,
                ComplimentaryDessert,
                PersonalConcierge,
            ],
        ),
    ]
}

fn default_true() -> bool {
    true
}

fn default_points_validity_days() -> i64 {
    365
}

fn default_poll_interval_secs() -> u64 {
    300
}
