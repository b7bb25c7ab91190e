//! 后台 Worker
//!
//! - `expire_worker`: 定期清零到期积分

mod expire_worker;

pub use expire_worker::ExpireWorker;
