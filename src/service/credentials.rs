use crate::db::UserStore;
use crate::models::{Credentials, SignedInUser};
use crate::service::auth::{AuthErrorKind, ProviderError, SignInProvider, SignInStrategy};
use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use async_trait::async_trait;
use rand::rngs::OsRng;
use std::sync::Arc;

const MIN_PASSWORD_LEN: usize = 6;

fn rejected() -> ProviderError {
    ProviderError::Authentication {
        kind: AuthErrorKind::CredentialsSignin,
    }
}

/// 生成 argon2 PHC 哈希串 (写入 users.password)
pub fn hash_password(password: &str) -> Result<String, ProviderError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ProviderError::Hash(e.to_string()))
}

/// 账号密码登录: 解析凭据 -> 按邮箱查用户 -> 校验 argon2 哈希
///
/// 邮箱不存在时仍对占位哈希做一次校验, 使两条失败路径耗时相当
pub struct CredentialsProvider {
    users: Arc<dyn UserStore>,
    dummy_hash: Option<String>,
}

impl CredentialsProvider {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        let dummy_hash = match hash_password("invoice-dashboard-placeholder") {
            Ok(hash) => Some(hash),
            Err(e) => {
                tracing::warn!(error = %e, "failed to prepare placeholder password hash");
                None
            }
        };
        Self { users, dummy_hash }
    }

    fn burn_verification(&self, password: &str) {
        if let Some(hash) = self.dummy_hash.as_deref().and_then(|h| PasswordHash::new(h).ok()) {
            let _ = verify_password(password, &hash);
        }
    }
}

fn verify_password(password: &str, hash: &PasswordHash<'_>) -> bool {
    Argon2::default().verify_password(password.as_bytes(), hash).is_ok()
}

/// 邮箱需含 '@', 密码至少 6 位; 不合法视为凭据错误
fn parse_credentials(credentials: &Credentials) -> Option<(&str, &str)> {
    let email = credentials.email.as_deref()?.trim();
    let password = credentials.password.as_deref()?;
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || password.chars().count() < MIN_PASSWORD_LEN {
        return None;
    }
    Some((email, password))
}

#[async_trait]
impl SignInProvider for CredentialsProvider {
    async fn sign_in(
        &self,
        strategy: SignInStrategy,
        credentials: &Credentials,
    ) -> Result<SignedInUser, ProviderError> {
        match strategy {
            SignInStrategy::Credentials => {}
        }

        let Some((email, password)) = parse_credentials(credentials) else {
            tracing::debug!("malformed credentials");
            return Err(rejected());
        };

        let Some(user) = self.users.find_by_email(email).await? else {
            self.burn_verification(password);
            tracing::debug!(email, "no user for email");
            return Err(rejected());
        };

        let parsed = PasswordHash::new(&user.password).map_err(|e| ProviderError::Hash(e.to_string()))?;
        if !verify_password(password, &parsed) {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(rejected());
        }

        Ok(user.into())
    }
}
