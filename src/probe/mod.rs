//! # 权限探测模块
//!
//! 用回调拿到的密钥对逐项访问商店接口，汇总出能力报告

pub mod coupon;
pub mod descriptors;
pub mod report;
pub mod runner;

pub use coupon::TestCoupon;
pub use descriptors::{ProbeDescriptor, ProbeRequest, standard_probes};
pub use report::{Capability, CapabilityFlags, CapabilityReport};
pub use runner::{ProbeOutcome, run_probes};
