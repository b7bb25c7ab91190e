//! 积分引擎领域模型
//!
//! 包含积分账本、会员等级、奖品目录的核心实体定义

pub mod enums;
pub mod ledger;
pub mod reward;
pub mod tier;

// 重新导出常用类型
pub use enums::{RewardCategory, TierBenefit, TransactionType};
pub use ledger::{PointLot, PointsSummary, SummaryDelta, Transaction, open_lots};
pub use reward::Reward;
pub use tier::Tier;
