pub mod pool;
pub mod queries;
pub mod users;

use crate::models::{InvoiceChanges, InvoiceRecord, NewInvoice, User};
use async_trait::async_trait;
use thiserror::Error;

pub use pool::create_pool;
pub use queries::PgInvoiceStore;
pub use users::PgUserStore;

/// 存储层错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// 发票持久化抽象 (每个方法对应单条 SQL)
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn insert(&self, invoice: &NewInvoice) -> Result<(), RepositoryError>;
    /// 返回受影响行数
    async fn update(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, RepositoryError>;
    async fn delete(&self, id: &str) -> Result<u64, RepositoryError>;
    async fn list(&self, limit: i64) -> Result<Vec<InvoiceRecord>, RepositoryError>;
}

/// 用户查询抽象 (登录用)
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}
