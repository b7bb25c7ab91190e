//! 服务层数据传输对象

use serde::{Deserialize, Serialize};

use crate::models::{PointsSummary, Tier};
use crate::tier::TierProgress;

/// 一轮过期扫描的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpireReport {
    pub accounts_scanned: usize,
    pub transactions_created: usize,
    pub points_expired: i64,
}

impl ExpireReport {
    /// 本轮是否没有任何积分过期
    pub fn is_empty(&self) -> bool {
        self.transactions_created == 0
    }
}

/// 账户概览
///
/// 展示层常用的汇总、当前等级与升级进度的组合
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOverview {
    pub account_id: String,
    pub summary: PointsSummary,
    pub tier: Tier,
    pub progress: TierProgress,
    /// 30 天内即将过期的积分
    pub expiring_soon: i64,
}
