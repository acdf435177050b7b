use axum::{routing::{get, post}, Router};
use clap::Parser;
use invoice_dashboard_rust::api::{self, AppState};
use invoice_dashboard_rust::cli::{Cli, Command};
use invoice_dashboard_rust::db::{InvoiceStore, PgInvoiceStore, PgUserStore};
use invoice_dashboard_rust::service::{hash_password, CredentialsProvider, ViewCache};
use invoice_dashboard_rust::{create_pool, AppConfig, Authenticator, InvoiceActions};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::HashPassword { password }) => {
            println!("{}", hash_password(&password)?);
            Ok(())
        }
        None | Some(Command::Serve) => serve().await,
    }
}

async fn serve() -> Result<(), Box<dyn std::error::Error>> {
    // 加载配置
    let config = AppConfig::load()?;

    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .with_max_level(config.log_level())
        .init();

    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    // 组装依赖
    let store: Arc<dyn InvoiceStore> = Arc::new(PgInvoiceStore::new(pool.clone()));
    let cache = Arc::new(ViewCache::new());
    let provider = Arc::new(CredentialsProvider::new(Arc::new(PgUserStore::new(pool))));

    let state = AppState {
        actions: Arc::new(InvoiceActions::new(store.clone(), cache.clone())),
        authenticator: Arc::new(Authenticator::new(provider)),
        store,
        cache,
        list_limit: config.cache.list_limit,
        post_login_redirect: config.auth.post_login_redirect.clone(),
    };

    // 构建路由
    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/dashboard/invoices", get(api::list_invoices))
        .route("/dashboard/invoices/create", post(api::create_invoice))
        .route("/dashboard/invoices/:id/edit", post(api::update_invoice))
        .route("/dashboard/invoices/:id/delete", post(api::delete_invoice))
        .route("/login", post(api::authenticate))
        .layer(ServiceBuilder::new())
        .with_state(state);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /dashboard/invoices              - invoice list (cached)");
    info!("  POST /dashboard/invoices/create       - create invoice");
    info!("  POST /dashboard/invoices/:id/edit     - update invoice");
    info!("  POST /dashboard/invoices/:id/delete   - delete invoice");
    info!("  POST /login                           - credentials sign-in");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
