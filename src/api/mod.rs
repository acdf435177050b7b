pub mod handlers;

pub use handlers::*;

use crate::db::InvoiceStore;
use crate::service::{Authenticator, InvoiceActions, ViewCache};
use std::sync::Arc;

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub actions: Arc<InvoiceActions>,
    pub authenticator: Arc<Authenticator>,
    pub store: Arc<dyn InvoiceStore>,
    pub cache: Arc<ViewCache>,
    pub list_limit: i64,
    pub post_login_redirect: String,
}
