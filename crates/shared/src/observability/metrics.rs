//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。
//! 未安装 recorder 时（如单元测试），记录函数为空操作。

use anyhow::Result;
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

use metrics_exporter_prometheus::PrometheusBuilder;

use super::ObservabilityConfig;

/// Metrics 资源守卫
pub struct MetricsHandle {
    addr: SocketAddr,
}

impl MetricsHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

/// 初始化 Prometheus 指标导出
///
/// 在指定端口启动导出器自带的 HTTP listener，需要在 tokio 运行时内调用。
pub fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    register_common_metrics(&config.service_name);
    info!("Metrics exporter listening on {}", addr);

    Ok(MetricsHandle { addr })
}

/// 注册积分业务指标的描述
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!(
        "loyalty_points_earned_total",
        "Total points credited by earn and bonus operations"
    );
    metrics::describe_counter!(
        "loyalty_redemptions_total",
        "Total redemption attempts, labelled by outcome"
    );
    metrics::describe_counter!(
        "loyalty_points_redeemed_total",
        "Total points spent on rewards"
    );
    metrics::describe_counter!(
        "loyalty_points_expired_total",
        "Total points moved from available to expired"
    );
    metrics::describe_gauge!(
        "loyalty_worker_last_run_timestamp",
        "Unix timestamp of the last completed worker cycle"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录积分入账（消费返积分 / 奖励积分）
#[inline]
pub fn record_points_earned(kind: &str, points: u64) {
    metrics::counter!("loyalty_points_earned_total", "kind" => kind.to_string()).increment(points);
}

/// 记录兑换结果
///
/// `outcome` 为 "success" 或错误码（如 "OUT_OF_STOCK"）
#[inline]
pub fn record_redemption(outcome: &str, points: u64) {
    metrics::counter!("loyalty_redemptions_total", "outcome" => outcome.to_string()).increment(1);
    if points > 0 {
        metrics::counter!("loyalty_points_redeemed_total").increment(points);
    }
}

/// 记录积分过期
#[inline]
pub fn record_points_expired(transactions: u64, points: u64) {
    metrics::counter!("loyalty_expired_transactions_total").increment(transactions);
    metrics::counter!("loyalty_points_expired_total").increment(points);
}

/// 记录 Worker 最近一次完成时间
#[inline]
pub fn set_worker_last_run(worker: &str) {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();
    metrics::gauge!("loyalty_worker_last_run_timestamp", "worker" => worker.to_string()).set(now);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_do_not_panic() {
        record_points_earned("earned", 50);
        record_points_earned("bonus", 10);
        record_redemption("success", 30);
        record_redemption("OUT_OF_STOCK", 0);
        record_points_expired(2, 120);
        set_worker_last_run("expire_worker");
    }
}
