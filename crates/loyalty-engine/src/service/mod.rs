//! 服务层
//!
//! 实现积分业务逻辑，协调仓储层、等级计算与锁管理。
//!
//! ## 模块结构
//!
//! - `dto`: 数据传输对象定义
//! - `ledger_engine`: 入账、兑换、过期与查询

pub mod dto;
mod ledger_engine;

pub use dto::*;
pub use ledger_engine::{EXPIRING_SOON_DAYS, EngineConfig, LedgerEngine};
