use crate::db::RepositoryError;
use crate::models::{Credentials, SignedInUser};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub const MSG_INCORRECT_CREDENTIALS: &str = "Incorrect credentials.";
pub const MSG_SOMETHING_WENT_WRONG: &str = "Something went wrong.";

/// 登录方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInStrategy {
    Credentials,
}

/// 认证类错误的子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// 账号或密码错误
    CredentialsSignin,
    AccessDenied,
    Configuration,
    CallbackRouteError,
    Verification,
}

/// 登录提供方错误: 认证类 (带子类型) 与其它非认证类错误
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("authentication failed: {kind:?}")]
    Authentication { kind: AuthErrorKind },

    #[error("user store error: {0}")]
    Store(#[from] RepositoryError),

    #[error("password hash error: {0}")]
    Hash(String),
}

#[async_trait]
pub trait SignInProvider: Send + Sync {
    async fn sign_in(
        &self,
        strategy: SignInStrategy,
        credentials: &Credentials,
    ) -> Result<SignedInUser, ProviderError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// 登录成功, 由调用方完成会话/跳转
    SignedIn(SignedInUser),
    /// 面向用户的错误信息
    Rejected(String),
}

pub struct Authenticator {
    provider: Arc<dyn SignInProvider>,
}

impl Authenticator {
    pub fn new(provider: Arc<dyn SignInProvider>) -> Self {
        Self { provider }
    }

    /// 凭据登录
    ///
    /// 认证类错误转换为提示信息, 其它错误原样返回
    pub async fn authenticate(
        &self,
        _prev_state: Option<&str>,
        credentials: &Credentials,
    ) -> Result<AuthOutcome, ProviderError> {
        match self.provider.sign_in(SignInStrategy::Credentials, credentials).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "user signed in");
                Ok(AuthOutcome::SignedIn(user))
            }
            Err(ProviderError::Authentication { kind }) => {
                tracing::warn!(?kind, "sign-in rejected");
                let message = match kind {
                    AuthErrorKind::CredentialsSignin => MSG_INCORRECT_CREDENTIALS,
                    AuthErrorKind::AccessDenied
                    | AuthErrorKind::Configuration
                    | AuthErrorKind::CallbackRouteError
                    | AuthErrorKind::Verification => MSG_SOMETHING_WENT_WRONG,
                };
                Ok(AuthOutcome::Rejected(message.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mock::StubProvider;
    use super::*;

    fn user() -> SignedInUser {
        SignedInUser {
            id: "u1".into(),
            name: "User".into(),
            email: "user@nextmail.com".into(),
        }
    }

    async fn run(result: Result<SignedInUser, ProviderError>) -> Result<AuthOutcome, ProviderError> {
        let auth = Authenticator::new(Arc::new(StubProvider::returning(result)));
        auth.authenticate(None, &Credentials::default()).await
    }

    #[tokio::test]
    async fn test_success_signs_in() {
        assert_eq!(run(Ok(user())).await.unwrap(), AuthOutcome::SignedIn(user()));
    }

    #[tokio::test]
    async fn test_bad_credentials_message() {
        let outcome = run(Err(ProviderError::Authentication {
            kind: AuthErrorKind::CredentialsSignin,
        }))
        .await
        .unwrap();
        assert_eq!(outcome, AuthOutcome::Rejected(MSG_INCORRECT_CREDENTIALS.to_string()));
    }

    #[tokio::test]
    async fn test_other_auth_kinds_map_to_generic_message() {
        for kind in [
            AuthErrorKind::AccessDenied,
            AuthErrorKind::Configuration,
            AuthErrorKind::CallbackRouteError,
            AuthErrorKind::Verification,
        ] {
            let outcome = run(Err(ProviderError::Authentication { kind })).await.unwrap();
            assert_eq!(outcome, AuthOutcome::Rejected(MSG_SOMETHING_WENT_WRONG.to_string()));
        }
    }

    #[tokio::test]
    async fn test_non_auth_errors_are_returned_unchanged() {
        let err = run(Err(ProviderError::Store(RepositoryError::Database(
            sqlx::Error::PoolTimedOut,
        ))))
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Store(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        ));

        let err = run(Err(ProviderError::Hash("bad".into()))).await.unwrap_err();
        assert!(matches!(err, ProviderError::Hash(msg) if msg == "bad"));
    }
}
