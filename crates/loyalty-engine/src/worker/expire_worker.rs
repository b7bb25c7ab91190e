//! 积分过期处理 Worker
//!
//! 定期驱动引擎清零已到期的积分批次，并回收空闲的锁条目

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use loyalty_shared::observability::metrics;
use tracing::{error, info};

use crate::error::Result;
use crate::repository::{LedgerStore, RewardCatalog};
use crate::service::{ExpireReport, LedgerEngine};

/// 过期处理 Worker
///
/// 以固定间隔轮询，单轮出错只记录日志，不中断循环
pub struct ExpireWorker<S, C> {
    engine: Arc<LedgerEngine<S, C>>,
    /// 轮询间隔（默认 300 秒）
    poll_interval: Duration,
}

impl<S, C> ExpireWorker<S, C>
where
    S: LedgerStore,
    C: RewardCatalog,
{
    pub fn new(engine: Arc<LedgerEngine<S, C>>, poll_interval: Duration) -> Self {
        Self {
            engine,
            poll_interval,
        }
    }

    /// 使用默认间隔创建 ExpireWorker
    pub fn with_defaults(engine: Arc<LedgerEngine<S, C>>) -> Self {
        Self::new(engine, Duration::from_secs(300))
    }

    /// 执行一轮过期处理
    pub async fn run_once(&self) -> Result<ExpireReport> {
        let report = self.engine.expire_points().await;
        self.engine.locks().prune();
        metrics::set_worker_last_run("expire_worker");
        report
    }

    /// 主循环：持续处理直到 `shutdown` 完成
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(poll_interval = ?self.poll_interval, "ExpireWorker 已启动");
        tokio::pin!(shutdown);

        loop {
            if let Err(e) = self.run_once().await {
                error!(error = %e, "处理积分过期出错");
            }

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!("ExpireWorker 已停止");
    }
}
