use std::sync::Arc;

use tokio::sync::mpsc;

use super::MailingList;

/// A subscription captured when results are unlocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub email: String,
    pub opt_in: bool,
}

/// Handle for submitting subscriptions without waiting on the list.
///
/// Cheaply cloneable. Requests go through a bounded channel to a
/// [`MailingListWorker`]. A disabled handle drops every request.
#[derive(Debug, Clone, Default)]
pub struct MailingListHandle {
    tx: Option<mpsc::Sender<SubscriptionRequest>>,
}

impl MailingListHandle {
    /// Create a handle from a channel sender
    pub fn new(tx: mpsc::Sender<SubscriptionRequest>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A handle with no list behind it.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Try to queue a subscription without blocking.
    ///
    /// Returns true if the request was queued. A full or closed channel is
    /// logged and reported as false; the caller is never failed.
    pub fn try_submit(&self, request: SubscriptionRequest) -> bool {
        let Some(tx) = &self.tx else {
            tracing::debug!("Mailing list disabled, dropping subscription request");
            return false;
        };
        match tx.try_send(request) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to queue subscription request: {}", e);
                false
            }
        }
    }
}

/// Background task that forwards opted-in subscriptions to the list.
pub struct MailingListWorker {
    rx: mpsc::Receiver<SubscriptionRequest>,
    list: Arc<dyn MailingList>,
}

impl MailingListWorker {
    pub fn new(rx: mpsc::Receiver<SubscriptionRequest>, list: Arc<dyn MailingList>) -> Self {
        Self { rx, list }
    }

    /// Run the worker until every handle is dropped.
    pub async fn run(mut self) {
        tracing::info!(list = self.list.name(), "Mailing list worker started");

        while let Some(request) = self.rx.recv().await {
            // Consent is checked here as well so a stray request cannot subscribe anyone.
            if !request.opt_in {
                continue;
            }

            let domain = email_domain(&request.email);
            match self.list.subscribe(&request.email).await {
                Ok(()) => tracing::info!(domain, "Mailing list subscription submitted"),
                Err(e) => tracing::warn!(domain, "Mailing list subscription failed: {}", e),
            }
        }

        tracing::info!("Mailing list worker shutting down");
    }
}

fn email_domain(email: &str) -> &str {
    email.rsplit_once('@').map(|(_, domain)| domain).unwrap_or("")
}

/// Create a complete mailing-list system
///
/// Returns:
/// - `MailingListHandle` - clone this into every quiz store
/// - `MailingListWorker` - spawn this with `tokio::spawn(worker.run())`
pub fn create_mailing_system(
    list: Arc<dyn MailingList>,
    buffer_size: usize,
) -> (MailingListHandle, MailingListWorker) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (MailingListHandle::new(tx), MailingListWorker::new(rx, list))
}
