//! # 探测项定义
//!
//! 每个探测项是一条声明：名称、请求、对应的能力标记。

use serde_json::Value;

use super::{Capability, TestCoupon};
use crate::config::{ProbeConfig, StoreConfig};

/// 探测请求
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeRequest {
    /// GET 请求
    Get {
        /// 相对商店根地址的路径
        path: String,
    },
    /// POST 请求
    Post {
        /// 相对商店根地址的路径
        path: String,
        /// JSON 请求体
        body: Value,
    },
}

impl ProbeRequest {
    /// 请求路径
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Get { path } | Self::Post { path, .. } => path,
        }
    }

    /// HTTP 方法名
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::Get { .. } => "GET",
            Self::Post { .. } => "POST",
        }
    }
}

/// 单个探测项
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeDescriptor {
    /// 日志中使用的名称
    pub name: &'static str,
    /// 结果写入的能力标记
    pub capability: Capability,
    /// 要发起的请求
    pub request: ProbeRequest,
}

impl ProbeDescriptor {
    fn get(name: &'static str, capability: Capability, path: String) -> Self {
        Self {
            name,
            capability,
            request: ProbeRequest::Get { path },
        }
    }
}

/// 标准的五项探测，按执行顺序排列
///
/// 每次调用都会生成新的测试优惠券代码。
#[must_use]
pub fn standard_probes(store: &StoreConfig, probe: &ProbeConfig) -> Vec<ProbeDescriptor> {
    let api = store.api_path.trim_end_matches('/');
    let legacy_api = store.legacy_api_path.trim_end_matches('/');
    let coupon = TestCoupon::generate(&probe.coupon_code_prefix);

    vec![
        ProbeDescriptor::get(
            "General settings",
            Capability::SettingsGeneral,
            format!("{api}/settings/general"),
        ),
        ProbeDescriptor::get(
            "Email settings",
            Capability::SettingsEmail,
            format!("{api}/settings/email"),
        ),
        ProbeDescriptor::get(
            "System status",
            Capability::SystemStatus,
            format!("{api}/system_status"),
        ),
        ProbeDescriptor::get("Coupons read", Capability::CouponsRead, format!("{api}/coupons")),
        ProbeDescriptor {
            name: "Coupons write",
            capability: Capability::CouponsWrite,
            request: ProbeRequest::Post {
                path: format!("{legacy_api}/coupons"),
                body: coupon.to_request_body(),
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn standard_plan_covers_every_capability_in_order() {
        let probes = standard_probes(&StoreConfig::default(), &ProbeConfig::default());

        let capabilities: Vec<Capability> = probes.iter().map(|p| p.capability).collect();
        assert_eq!(capabilities, Capability::ALL.to_vec());

        let requests: Vec<(&str, &str)> = probes
            .iter()
            .map(|p| (p.request.method(), p.request.path()))
            .collect();
        assert_eq!(
            requests,
            vec![
                ("GET", "/wp-json/wc/v2/settings/general"),
                ("GET", "/wp-json/wc/v2/settings/email"),
                ("GET", "/wp-json/wc/v2/system_status"),
                ("GET", "/wp-json/wc/v2/coupons"),
                ("POST", "/wc-api/v3/coupons"),
            ]
        );
    }

    #[test]
    fn each_plan_gets_a_fresh_coupon() {
        let first = standard_probes(&StoreConfig::default(), &ProbeConfig::default());
        let second = standard_probes(&StoreConfig::default(), &ProbeConfig::default());
        assert_ne!(first[4].request, second[4].request);
    }
}
