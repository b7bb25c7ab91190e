//! 会员等级模块

mod calculator;

pub use calculator::{TierCalculator, TierProgress};
