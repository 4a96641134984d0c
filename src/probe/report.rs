//! # 能力报告

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// 被探测的权限能力
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// 读取常规设置
    SettingsGeneral,
    /// 读取邮件设置
    SettingsEmail,
    /// 读取系统状态
    SystemStatus,
    /// 读取优惠券
    CouponsRead,
    /// 创建优惠券
    CouponsWrite,
}

impl Capability {
    /// 全部能力，按探测顺序排列
    pub const ALL: [Self; 5] = [
        Self::SettingsGeneral,
        Self::SettingsEmail,
        Self::SystemStatus,
        Self::CouponsRead,
        Self::CouponsWrite,
    ];

    /// 报告中的字段名
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::SettingsGeneral => "settingsGeneral",
            Self::SettingsEmail => "settingsEmail",
            Self::SystemStatus => "systemStatus",
            Self::CouponsRead => "couponsRead",
            Self::CouponsWrite => "couponsWrite",
        }
    }
}

/// 五项能力的结果标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct CapabilityFlags {
    /// `/settings/general` 可读
    pub settings_general: bool,
    /// `/settings/email` 可读
    pub settings_email: bool,
    /// `/system_status` 可读
    pub system_status: bool,
    /// 优惠券可读
    pub coupons_read: bool,
    /// 可创建优惠券
    pub coupons_write: bool,
}

impl CapabilityFlags {
    /// 所有能力先假定可用，探测失败时再置为 `false`
    #[must_use]
    pub const fn optimistic() -> Self {
        Self {
            settings_general: true,
            settings_email: true,
            system_status: true,
            coupons_read: true,
            coupons_write: true,
        }
    }

    /// 读取某项能力
    #[must_use]
    pub const fn get(&self, capability: Capability) -> bool {
        match capability {
            Capability::SettingsGeneral => self.settings_general,
            Capability::SettingsEmail => self.settings_email,
            Capability::SystemStatus => self.system_status,
            Capability::CouponsRead => self.coupons_read,
            Capability::CouponsWrite => self.coupons_write,
        }
    }

    /// 设置某项能力
    pub fn set(&mut self, capability: Capability, granted: bool) {
        match capability {
            Capability::SettingsGeneral => self.settings_general = granted,
            Capability::SettingsEmail => self.settings_email = granted,
            Capability::SystemStatus => self.system_status = granted,
            Capability::CouponsRead => self.coupons_read = granted,
            Capability::CouponsWrite => self.coupons_write = granted,
        }
    }

    /// 可用能力数量
    #[must_use]
    pub fn granted_count(&self) -> usize {
        Capability::ALL.iter().filter(|c| self.get(**c)).count()
    }
}

/// 一次返回请求生成的报告，渲染后即丢弃
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityReport {
    /// 商店地址
    pub url: String,
    /// 各项能力
    pub accesses: CapabilityFlags,
    /// 失败探测的错误信息，按探测顺序
    pub errors: Vec<String>,
    /// 回调收到的原始凭证载荷
    pub data: Value,
}

impl CapabilityReport {
    /// 格式化为缩进 JSON 文本
    #[must_use]
    pub fn to_pretty_text(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("<unrenderable report: {e}>"))
    }

    /// 固定的示例报告，用于调试页面与前端样式检查，不访问任何商店
    #[must_use]
    pub fn fixture() -> Self {
        let mut accesses = CapabilityFlags::optimistic();
        accesses.set(Capability::SystemStatus, false);
        accesses.set(Capability::CouponsWrite, false);

        Self {
            url: "https://shop.example".to_string(),
            accesses,
            errors: vec![
                "HTTP 403 from /wp-json/wc/v2/system_status: Sorry, you cannot view this resource."
                    .to_string(),
                "HTTP 401 from /wc-api/v3/coupons: The API key provided does not have write permissions."
                    .to_string(),
            ],
            data: json!({
                "key_id": 1,
                "user_id": "00000000-0000-7000-8000-000000000000",
                "consumer_key": "ck_0000000000000000000000000000000000000000",
                "consumer_secret": "cs_0000000000000000000000000000000000000000",
                "key_permissions": "read_write"
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flags_serialize_with_report_field_names() {
        let mut flags = CapabilityFlags::optimistic();
        flags.set(Capability::CouponsWrite, false);

        let value = serde_json::to_value(flags).unwrap();
        for capability in Capability::ALL {
            assert_eq!(value[capability.key()], capability != Capability::CouponsWrite);
        }
        assert_eq!(flags.granted_count(), 4);
    }

    #[test]
    fn fixture_is_deterministic() {
        assert_eq!(
            CapabilityReport::fixture().to_pretty_text(),
            CapabilityReport::fixture().to_pretty_text()
        );
        assert_eq!(CapabilityReport::fixture().errors.len(), 2);
    }

    #[test]
    fn report_text_contains_all_sections() {
        let text = CapabilityReport::fixture().to_pretty_text();
        for section in ["\"url\"", "\"accesses\"", "\"errors\"", "\"data\"", "\"couponsWrite\": false"] {
            assert!(text.contains(section), "missing {section}");
        }
    }
}
