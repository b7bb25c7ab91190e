//! 进程内锁管理器
//!
//! 按资源 key 分配异步互斥锁，同一账户或同一奖品的写操作串行执行。

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, instrument};

/// 进程内锁管理器
///
/// key 对应的互斥锁按需创建，`prune` 回收无人持有的条目
#[derive(Debug, Default, Clone)]
pub struct LockManager {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl LockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取账户锁
    pub async fn lock_account(&self, account_id: &str) -> LockGuard {
        self.acquire(&format!("account:{}", account_id)).await
    }

    /// 获取奖品锁
    pub async fn lock_reward(&self, reward_id: &str) -> LockGuard {
        self.acquire(&format!("reward:{}", reward_id)).await
    }

    /// 获取锁，锁被占用时等待
    #[instrument(skip(self))]
    pub async fn acquire(&self, key: &str) -> LockGuard {
        // 先克隆出 Arc 再等待，不能跨 await 持有 DashMap 的分片锁
        let mutex = Arc::clone(self.locks.entry(key.to_string()).or_default().value());
        let guard = mutex.lock_owned().await;
        debug!(key = %key, "Lock acquired");
        LockGuard {
            key: key.to_string(),
            _guard: guard,
        }
    }

    /// 回收当前无人持有也无人等待的锁条目，返回回收数量
    pub fn prune(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
        let pruned = before.saturating_sub(self.locks.len());
        if pruned > 0 {
            debug!(pruned = pruned, "Idle locks pruned");
        }
        pruned
    }

    /// 当前登记的锁条目数
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// 锁守卫
///
/// drop 时自动释放
#[derive(Debug)]
pub struct LockGuard {
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl LockGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        debug!(key = %self.key, "Lock released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_lock_key_format() {
        let locks = LockManager::new();
        let account = locks.lock_account("acc-1").await;
        let reward = locks.lock_reward("free-coffee").await;
        assert_eq!(account.key(), "account:acc-1");
        assert_eq!(reward.key(), "reward:free-coffee");
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = LockManager::new();
        let _account = locks.lock_account("acc-1").await;

        let other =
            tokio::time::timeout(Duration::from_millis(100), locks.lock_account("acc-2")).await;
        assert!(other.is_ok());

        // 同 ID 的账户锁与奖品锁互不影响
        let reward =
            tokio::time::timeout(Duration::from_millis(100), locks.lock_reward("acc-1")).await;
        assert!(reward.is_ok());
    }

    #[tokio::test]
    async fn test_acquire_waits_for_release() {
        let locks = LockManager::new();
        let guard = locks.acquire("reward:r1").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("reward:r1").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[test]
    fn test_waiter_woken_on_release() {
        let locks = LockManager::new();
        let guard = tokio_test::block_on(locks.lock_account("acc-1"));

        let mut waiter = tokio_test::task::spawn(locks.lock_account("acc-1"));
        tokio_test::assert_pending!(waiter.poll());

        drop(guard);
        assert!(waiter.is_woken());
        let second = tokio_test::assert_ready!(waiter.poll());
        assert_eq!(second.key(), "account:acc-1");
    }

    #[tokio::test]
    async fn test_prune_keeps_held_locks() {
        let locks = LockManager::new();
        let held = locks.acquire("account:held").await;
        drop(locks.acquire("account:idle").await);
        assert_eq!(locks.len(), 2);

        assert_eq!(locks.prune(), 1);
        assert_eq!(locks.len(), 1);

        drop(held);
        assert_eq!(locks.prune(), 1);
        assert!(locks.is_empty());
    }
}
