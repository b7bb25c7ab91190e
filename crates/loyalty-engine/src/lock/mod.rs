//! 锁模块
//!
//! 提供按账户、按奖品粒度的进程内互斥锁。
//!
//! ## 加锁顺序
//!
//! 兑换需要同时持有账户锁与奖品锁，统一先账户后奖品，避免死锁：
//!
//! ```ignore
//! let _account = locks.lock_account(account_id).await;
//! let _reward = locks.lock_reward(reward_id).await;
//! ```

mod lock_manager;

pub use lock_manager::{LockGuard, LockManager};
