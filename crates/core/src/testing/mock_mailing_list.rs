//! Mock mailing list for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::mailing::{MailingList, MailingListError};

/// Records every subscription attempt.
///
/// ```rust,ignore
/// use timeline_quiz_core::testing::MockMailingList;
///
/// let list = Arc::new(MockMailingList::new());
/// let (handle, worker) = create_mailing_system(list.clone(), 10);
///
/// // ... unlock some results, run the worker ...
/// assert_eq!(list.subscribed().await, vec!["user@example.com".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct MockMailingList {
    /// Addresses that were accepted.
    subscribed: Arc<RwLock<Vec<String>>>,
    /// Every address passed to `subscribe`, accepted or not.
    attempts: Arc<RwLock<Vec<String>>>,
    /// When true, every subscription is rejected.
    fail: Arc<RwLock<bool>>,
}

impl MockMailingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Addresses accepted so far.
    pub async fn subscribed(&self) -> Vec<String> {
        self.subscribed.read().await.clone()
    }

    /// Number of subscribe calls, including failed ones.
    pub async fn attempt_count(&self) -> usize {
        self.attempts.read().await.len()
    }

    /// Reject all further subscriptions.
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }
}

#[async_trait]
impl MailingList for MockMailingList {
    fn name(&self) -> &str {
        "mock"
    }

    async fn subscribe(&self, email: &str) -> Result<(), MailingListError> {
        self.attempts.write().await.push(email.to_string());

        if *self.fail.read().await {
            return Err(MailingListError::Rejected { status: 503 });
        }

        self.subscribed.write().await.push(email.to_string());
        Ok(())
    }
}
