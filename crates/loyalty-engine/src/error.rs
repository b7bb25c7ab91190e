//! 积分引擎错误类型
//!
//! 区分业务规则拒绝（调用方应展示给用户）与存储层故障（调用方可重试）

use thiserror::Error;

/// 积分引擎错误类型
#[derive(Debug, Error)]
pub enum LoyaltyError {
    // === 入账相关错误 ===
    #[error("无效的金额: {0}")]
    InvalidAmount(String),

    // === 兑换相关错误 ===
    #[error("奖品不存在: {0}")]
    RewardNotFound(String),

    #[error("奖品已下架: {0}")]
    RewardInactive(String),

    #[error("可用积分不足: 需要 {required}, 可用 {available}")]
    InsufficientPoints { required: i64, available: i64 },

    #[error("奖品库存不足: reward_id={0}")]
    OutOfStock(String),

    #[error("已达到兑换次数上限: reward_id={reward_id}, limit={limit}")]
    RedemptionLimitReached { reward_id: String, limit: u32 },

    // === 配置错误 ===
    #[error("配置错误: {0}")]
    Configuration(String),

    // === 系统错误 ===
    #[error("存储不可用: {0}")]
    StoreUnavailable(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 积分引擎 Result 类型别名
pub type Result<T> = std::result::Result<T, LoyaltyError>;

impl LoyaltyError {
    /// 检查是否为可重试的错误
    ///
    /// 只有存储层的瞬时故障值得重试，业务规则拒绝重试也不会改变结果
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Configuration(_) | Self::StoreUnavailable(_) | Self::Internal(_)
        )
    }

    /// 获取错误码（用于展示层映射提示文案）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::RewardNotFound(_) => "REWARD_NOT_FOUND",
            Self::RewardInactive(_) => "REWARD_INACTIVE",
            Self::InsufficientPoints { .. } => "INSUFFICIENT_POINTS",
            Self::OutOfStock(_) => "OUT_OF_STOCK",
            Self::RedemptionLimitReached { .. } => "REDEMPTION_LIMIT_REACHED",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_retryable() {
        assert!(LoyaltyError::StoreUnavailable("connection reset".to_string()).is_retryable());
        assert!(!LoyaltyError::OutOfStock("r-1".to_string()).is_retryable());
        assert!(
            !LoyaltyError::InsufficientPoints {
                required: 30,
                available: 20
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_error_is_business_error() {
        assert!(LoyaltyError::RewardNotFound("r-1".to_string()).is_business_error());
        assert!(LoyaltyError::RewardInactive("r-1".to_string()).is_business_error());
        assert!(LoyaltyError::InvalidAmount("-1".to_string()).is_business_error());
        assert!(!LoyaltyError::StoreUnavailable("down".to_string()).is_business_error());
        assert!(!LoyaltyError::Configuration("empty".to_string()).is_business_error());
    }

    #[test]
    fn test_error_code() {
        assert_eq!(
            LoyaltyError::OutOfStock("r-1".to_string()).error_code(),
            "OUT_OF_STOCK"
        );
        assert_eq!(
            LoyaltyError::InsufficientPoints {
                required: 25,
                available: 20
            }
            .error_code(),
            "INSUFFICIENT_POINTS"
        );
        assert_eq!(
            LoyaltyError::StoreUnavailable("x".to_string()).error_code(),
            "STORE_UNAVAILABLE"
        );
    }

    #[test]
    fn test_error_display() {
        let err = LoyaltyError::InsufficientPoints {
            required: 25,
            available: 20,
        };
        assert!(err.to_string().contains("25"));
        assert!(err.to_string().contains("20"));

        let err = LoyaltyError::RedemptionLimitReached {
            reward_id: "free-coffee".to_string(),
            limit: 2,
        };
        assert!(err.to_string().contains("free-coffee"));
    }
}
