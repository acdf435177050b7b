use crate::db::{InvoiceStore, RepositoryError};
use crate::models::{InvoiceChanges, InvoiceRecord, NewInvoice};
use async_trait::async_trait;
use sqlx::PgPool;

/// 发票表 PostgreSQL 实现
///
/// id / customer_id 为 uuid 列, 以文本传参后显式转换, 非法 id 表现为数据库错误
#[derive(Clone)]
pub struct PgInvoiceStore {
    pool: PgPool,
}

impl PgInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    /// 插入一张发票
    async fn insert(&self, invoice: &NewInvoice) -> Result<(), RepositoryError> {
        let start_time = std::time::Instant::now();

        let result = sqlx::query(
            r#"
            INSERT INTO invoices (customer_id, amount, status, date)
            VALUES ($1::uuid, $2, $3, $4)
            "#
        )
        .bind(&invoice.customer_id)
        .bind(invoice.amount_cents)
        .bind(invoice.status)
        .bind(invoice.date)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            "INSERT invoices 完成, 影响 {} 行, 耗时: {:?}",
            result.rows_affected(),
            start_time.elapsed()
        );
        Ok(())
    }

    /// 按 id 更新客户/金额/状态, date 保持不变
    async fn update(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET customer_id = $1::uuid, amount = $2, status = $3
            WHERE id = $4::uuid
            "#
        )
        .bind(&changes.customer_id)
        .bind(changes.amount_cents)
        .bind(changes.status)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// 按 id 删除
    async fn delete(&self, id: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1::uuid")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// 发票列表 (按日期降序)
    async fn list(&self, limit: i64) -> Result<Vec<InvoiceRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, InvoiceRecord>(
            r#"
            SELECT id::text AS id,
                   customer_id::text AS customer_id,
                   amount::int8 AS amount,
                   status,
                   date
            FROM invoices
            ORDER BY date DESC, id
            LIMIT $1
            "#
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
