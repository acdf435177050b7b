use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// 发票状态 (pending / paid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            _ => Err(()),
        }
    }
}

/// 校验通过的表单输入 (每次请求构造, 用完即弃)
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceInput {
    pub customer_id: String,
    pub amount: BigDecimal,
    pub status: InvoiceStatus,
}

impl InvoiceInput {
    /// 金额转为整数分: round(amount * 100)
    ///
    /// 超出 i64 范围时返回 None
    pub fn amount_in_cents(&self) -> Option<i64> {
        to_cents(&self.amount)
    }
}

pub(crate) fn to_cents(amount: &BigDecimal) -> Option<i64> {
    let hundred = BigDecimal::from(100i64);
    (amount * &hundred).round(0).to_i64()
}

/// 发票表 (invoices)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: String,
    pub customer_id: String,
    pub amount: i64,        // 单位: 分
    pub status: InvoiceStatus,
    pub date: NaiveDate,    // 创建日 (UTC)
}

/// 待插入的发票行, id 由数据库生成
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub customer_id: String,
    pub amount_cents: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// 更新字段 (不含 date)
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceChanges {
    pub customer_id: String,
    pub amount_cents: i64,
    pub status: InvoiceStatus,
}
