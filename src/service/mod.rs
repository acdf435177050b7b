pub mod auth;
pub mod credentials;
pub mod invoice_actions;
pub mod revalidate;

pub use auth::{AuthErrorKind, AuthOutcome, Authenticator, ProviderError, SignInProvider, SignInStrategy};
pub use credentials::{hash_password, CredentialsProvider};
pub use invoice_actions::{InvoiceActions, INVOICES_PATH};
pub use revalidate::{Revalidator, ViewCache};
