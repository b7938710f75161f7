//! Mailing-list trait and error type.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailingListError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Subscription rejected with status {status}")]
    Rejected { status: u16 },

    #[error("Mailing list unavailable: {0}")]
    Unavailable(String),
}

/// An external list that collects opted-in email addresses.
#[async_trait]
pub trait MailingList: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Subscribe an address. Called at most once per unlock, never retried.
    async fn subscribe(&self, email: &str) -> Result<(), MailingListError>;
}
