//! Mailing-list capture for unlocked results.
//!
//! Unlocking results must never wait on, or fail because of, the external
//! list. Quiz stores hand requests to a [`MailingListHandle`]; a
//! [`MailingListWorker`] delivers them in the background.

mod handle;
mod http;
mod traits;
mod validation;

pub use handle::{create_mailing_system, MailingListHandle, MailingListWorker, SubscriptionRequest};
pub use http::HttpMailingList;
pub use traits::{MailingList, MailingListError};
pub use validation::{validate_email, EmailError};
