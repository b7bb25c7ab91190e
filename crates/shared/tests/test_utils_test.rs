//! 测试工具函数的集成测试

use std::collections::HashSet;

use loyalty_shared::test_utils::{
    init_test_tracing, test_account_id, test_order_id, test_reward_id,
};

#[test]
fn test_order_ids_unique_across_threads() {
    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(|| (0..100).map(|_| test_order_id()).collect::<Vec<_>>()))
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(seen.insert(id), "duplicate order id generated");
        }
    }
    assert_eq!(seen.len(), 800);
}

#[test]
fn test_account_and_reward_ids_differ() {
    let account = test_account_id();
    let reward = test_reward_id();
    assert_ne!(account, reward);
    assert!(reward.starts_with("test-reward-"));
}

#[test]
fn test_init_test_tracing_is_idempotent() {
    init_test_tracing();
    init_test_tracing();
}
