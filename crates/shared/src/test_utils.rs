//! 测试工具模块
//!
//! 提供测试所需的唯一 ID 生成和日志初始化辅助函数，
//! 保证并行测试之间互不干扰。

use std::sync::Once;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// 生成唯一的测试账户 ID
pub fn test_account_id() -> String {
    format!("test-account-{}", Uuid::new_v4())
}

/// 生成唯一的测试订单 ID
///
/// 使用原子计数器确保同一进程内严格递增
pub fn test_order_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("ORD-{:08}", COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// 生成唯一的测试奖品 ID
pub fn test_reward_id() -> String {
    format!("test-reward-{}", Uuid::new_v4())
}

/// 初始化测试日志（多次调用安全）
///
/// 输出交给 libtest 捕获，失败用例可看到完整日志
pub fn init_test_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
