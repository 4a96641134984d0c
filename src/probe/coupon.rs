//! # 测试优惠券
//!
//! 写入权限通过旧版 `wc-api/v3` 接口创建优惠券来验证

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// 用于写入探测的测试优惠券（旧版 REST API 格式）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCoupon {
    /// 代码，带唯一后缀
    pub code: String,
    /// 折扣类型，序列化为 `type`
    #[serde(rename = "type")]
    pub discount_type: String,
    /// 折扣数值
    pub amount: String,
    /// 是否不可与其他优惠券叠加
    pub individual_use: bool,
    /// 适用商品
    pub product_ids: Vec<u64>,
    /// 排除商品
    pub exclude_product_ids: Vec<u64>,
    /// 是否包邮
    pub enable_free_shipping: bool,
    /// 适用分类
    pub product_category_ids: Vec<u64>,
    /// 排除分类
    pub exclude_product_category_ids: Vec<u64>,
    /// 是否排除特价商品
    pub exclude_sale_items: bool,
    /// 最低消费
    pub minimum_amount: String,
    /// 最高消费，`0.00` 表示不限
    pub maximum_amount: String,
    /// 限定客户邮箱
    pub customer_emails: Vec<String>,
    /// 描述
    pub description: String,
}

#[derive(Serialize)]
struct CouponEnvelope<'a> {
    coupon: &'a TestCoupon,
}

impl TestCoupon {
    /// 生成代码唯一的测试优惠券：10% 折扣、仅限单独使用、满 100 可用、排除特价商品
    #[must_use]
    pub fn generate(code_prefix: &str) -> Self {
        Self {
            code: format!("{code_prefix}{}", Uuid::now_v7()),
            discount_type: "percent".to_string(),
            amount: "10".to_string(),
            individual_use: true,
            product_ids: Vec::new(),
            exclude_product_ids: Vec::new(),
            enable_free_shipping: false,
            product_category_ids: Vec::new(),
            exclude_product_category_ids: Vec::new(),
            exclude_sale_items: true,
            minimum_amount: "100.00".to_string(),
            maximum_amount: "0.00".to_string(),
            customer_emails: Vec::new(),
            description: String::new(),
        }
    }

    /// 请求体 `{"coupon": {...}}`
    #[must_use]
    pub fn to_request_body(&self) -> Value {
        serde_json::to_value(CouponEnvelope { coupon: self }).unwrap_or(Value::Null)
    }
}
