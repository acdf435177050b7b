pub mod form;
pub mod invoice;
pub mod state;
pub mod user;

pub use form::InvoiceForm;
pub use invoice::{InvoiceChanges, InvoiceInput, InvoiceRecord, InvoiceStatus, NewInvoice};
pub use state::{ActionOutcome, ActionState, FieldErrors};
pub use user::{Credentials, SignedInUser, User};
