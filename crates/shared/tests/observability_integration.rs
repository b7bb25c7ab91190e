//! 可观测性模块集成测试
//!
//! 未安装全局 recorder 时，所有记录函数都应是无副作用的空操作。

mod metrics_tests {
    use loyalty_shared::observability::metrics::{
        record_points_earned, record_points_expired, record_redemption, set_worker_last_run,
    };

    #[test]
    fn test_record_points_earned() {
        record_points_earned("earned", 0);
        record_points_earned("earned", 500);
        record_points_earned("bonus", 25);
    }

    #[test]
    fn test_record_redemption_outcomes() {
        record_redemption("success", 30);
        record_redemption("INSUFFICIENT_POINTS", 0);
        record_redemption("OUT_OF_STOCK", 0);
        record_redemption("REWARD_INACTIVE", 0);
    }

    #[test]
    fn test_record_points_expired() {
        record_points_expired(0, 0);
        record_points_expired(3, 1200);
    }

    #[test]
    fn test_set_worker_last_run() {
        set_worker_last_run("expire_worker");
    }
}

mod config_tests {
    use loyalty_shared::observability::ObservabilityConfig;

    #[test]
    fn test_config_clone_keeps_fields() {
        let config = ObservabilityConfig {
            json_logs: true,
            metrics_port: 9200,
            ..Default::default()
        }
        .with_service_name("loyalty-engine");
        let cloned = config.clone();

        assert_eq!(cloned.service_name, "loyalty-engine");
        assert_eq!(cloned.metrics_port, 9200);
        assert!(cloned.json_logs);
    }
}
