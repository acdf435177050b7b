//! PostgreSQL 连接池

use crate::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::time::Duration;
use tracing::log::LevelFilter;

/// 写入 pg_stat_activity.application_name
pub const APPLICATION_NAME: &str = "invoice-dashboard";

/// 由配置生成连接参数: 非法 URL 在此报错, 不会等到首次连接
pub fn connect_options(cfg: &DatabaseConfig) -> Result<PgConnectOptions, sqlx::Error> {
    let options = cfg
        .url
        .parse::<PgConnectOptions>()?
        .application_name(APPLICATION_NAME)
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(cfg.slow_statement_ms));
    Ok(options)
}

pub fn pool_options(cfg: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .min_connections(cfg.min_connections.min(cfg.max_connections))
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
}

/// 创建数据库连接池, 启动时即建立连接以尽早暴露配置错误
pub async fn create_pool(cfg: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let options = connect_options(cfg)?;
    let pool = pool_options(cfg).connect_with(options).await?;

    tracing::info!(
        min_connections = cfg.min_connections,
        max_connections = cfg.max_connections,
        "database pool ready"
    );
    Ok(pool)
}
