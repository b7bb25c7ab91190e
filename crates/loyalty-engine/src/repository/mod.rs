//! 仓储层
//!
//! 账本与奖品目录的抽象接口及内存实现

mod ledger_store;
mod reward_catalog;
mod traits;

pub use ledger_store::InMemoryLedgerStore;
pub use reward_catalog::InMemoryRewardCatalog;
pub use traits::{LedgerStore, RewardCatalog};

#[cfg(test)]
pub use traits::{MockLedgerStore, MockRewardCatalog};
