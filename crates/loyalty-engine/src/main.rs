//! 会员积分引擎服务
//!
//! 加载配置、初始化可观测性、灌入奖品目录，然后运行过期 Worker 直到收到 Ctrl-C。

use std::sync::Arc;

use loyalty_engine::{
    ExpireWorker, InMemoryLedgerEngine, InMemoryLedgerStore, InMemoryRewardCatalog, LoyaltyConfig,
    TierCalculator,
};
use loyalty_shared::{config::AppConfig, observability};
use tracing::{error, info};

const SERVICE_NAME: &str = "loyalty-engine";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 统一加载配置：config/default.toml -> config/{env}.toml -> config/{service}.toml -> 环境变量
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_default();
    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config)?;

    let loyalty = LoyaltyConfig::load(SERVICE_NAME)?;

    // 等级表或奖品配置非法时直接退出
    let calculator = TierCalculator::new(loyalty.tier_table())?;
    let catalog = InMemoryRewardCatalog::with_rewards(loyalty.catalog()?)?;
    let engine_config = loyalty.engine_config()?;

    info!(
        environment = %config.environment,
        tiers = calculator.tiers().len(),
        rewards = loyalty.rewards.len(),
        points_validity_days = loyalty.points_validity_days,
        dedupe_orders = engine_config.dedupe_orders,
        "Starting {}",
        SERVICE_NAME
    );

    let engine: Arc<InMemoryLedgerEngine> = Arc::new(InMemoryLedgerEngine::new(
        Arc::new(InMemoryLedgerStore::new()),
        Arc::new(catalog),
        calculator,
        engine_config,
    ));

    let worker = ExpireWorker::new(engine, loyalty.expire_worker.poll_interval());
    worker
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "监听退出信号失败");
            }
            info!("收到退出信号，正在停止");
        })
        .await;

    Ok(())
}
