use crate::error::ActionError;
use crate::models::{FieldErrors, InvoiceInput, InvoiceStatus};
use bigdecimal::{BigDecimal, Zero};
use serde::Deserialize;
use std::str::FromStr;

pub const FIELD_CUSTOMER_ID: &str = "customerId";
pub const FIELD_AMOUNT: &str = "amount";
pub const FIELD_STATUS: &str = "status";

pub const MSG_SELECT_CUSTOMER: &str = "Please select a customer.";
pub const MSG_AMOUNT_GT_ZERO: &str = "Please enter an amount greater than $0";
pub const MSG_SELECT_STATUS: &str = "Please select an invoice status.";

/// 发票表单原始字段 (均为字符串, 可能缺失)
///
/// id 与 date 不由表单提交, 不在此结构中
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceForm {
    #[serde(rename = "customerId")]
    pub customer_id: Option<String>,
    pub amount: Option<String>,
    pub status: Option<String>,
}

impl InvoiceForm {
    /// 不抛错的校验: 始终返回成功值或字段错误 (create 使用)
    pub fn safe_parse(&self) -> Result<InvoiceInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let customer_id = match self.customer_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Some(id.to_string()),
            _ => {
                errors.push(FIELD_CUSTOMER_ID, MSG_SELECT_CUSTOMER);
                None
            }
        };

        let amount = match coerce_amount(self.amount.as_deref()) {
            Some(amount) => Some(amount),
            None => {
                errors.push(FIELD_AMOUNT, MSG_AMOUNT_GT_ZERO);
                None
            }
        };

        let status = match self.status.as_deref().map(InvoiceStatus::from_str) {
            Some(Ok(status)) => Some(status),
            _ => {
                errors.push(FIELD_STATUS, MSG_SELECT_STATUS);
                None
            }
        };

        match (customer_id, amount, status) {
            (Some(customer_id), Some(amount), Some(status)) => Ok(InvoiceInput {
                customer_id,
                amount,
                status,
            }),
            _ => Err(errors),
        }
    }

    /// 校验失败时返回 ActionError::Validation, 供调用方用 `?` 向上传播 (update 使用)
    pub fn parse(&self) -> Result<InvoiceInput, ActionError> {
        self.safe_parse().map_err(ActionError::Validation)
    }
}

/// 金额原始串最大长度
const MAX_AMOUNT_LEN: usize = 32;
/// 允许的十进制指数范围 (BigDecimal scale), 超出范围的运算代价随指数增长
const AMOUNT_SCALE_RANGE: std::ops::RangeInclusive<i64> = -18..=18;

/// 金额: 字符串 -> 十进制, 缺失/空串按 0 处理, 必须 > 0 且分值可用 i64 表示
///
/// 长度与指数在任何运算前检查
fn coerce_amount(raw: Option<&str>) -> Option<BigDecimal> {
    let raw = raw.map(str::trim).unwrap_or("");
    if raw.len() > MAX_AMOUNT_LEN {
        return None;
    }
    let amount = if raw.is_empty() {
        BigDecimal::zero()
    } else {
        BigDecimal::from_str(raw).ok()?
    };

    let (_, scale) = amount.as_bigint_and_exponent();
    if !AMOUNT_SCALE_RANGE.contains(&scale) {
        return None;
    }
    if amount <= BigDecimal::zero() {
        return None;
    }
    crate::models::invoice::to_cents(&amount)?;
    Some(amount)
}
