//! 会员积分账本与等级引擎
//!
//! 记录会员的积分流水，按累计积分计算会员等级，支持消费返积分与奖品兑换。
//!
//! ## 核心功能
//!
//! - **积分入账**：按当前等级倍率将订单金额折算为积分
//! - **奖品兑换**：在账户锁与奖品锁内原子地扣减积分和库存
//! - **积分过期**：按批次（FIFO）清零到期积分
//! - **等级查询**：当前等级、下一等级与升级进度
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `config`: 业务配置（等级表、奖品目录、有效期）
//! - `tier`: 等级计算器
//! - `repository`: 账本与奖品目录仓储
//! - `lock`: 进程内锁管理
//! - `service`: 积分账本引擎
//! - `worker`: 过期处理 Worker

pub mod config;
pub mod error;
pub mod lock;
pub mod models;
pub mod repository;
pub mod service;
pub mod tier;
pub mod worker;

pub use config::{LoyaltyConfig, default_tiers};
pub use error::{LoyaltyError, Result};
pub use lock::{LockGuard, LockManager};
pub use models::*;
pub use repository::{InMemoryLedgerStore, InMemoryRewardCatalog, LedgerStore, RewardCatalog};
pub use service::{AccountOverview, EngineConfig, ExpireReport, LedgerEngine, dto};
pub use tier::{TierCalculator, TierProgress};
pub use worker::ExpireWorker;

/// 基于内存存储的引擎
pub type InMemoryLedgerEngine = LedgerEngine<InMemoryLedgerStore, InMemoryRewardCatalog>;
