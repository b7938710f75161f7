//! Hosted signup-form client.
//!
//! Posts the same fields an embedded newsletter signup form would: the
//! address as `EMAIL`, an optional `tags` id and an empty bot-trap field.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{MailingList, MailingListError};
use crate::config::MailingListConfig;

/// Mailing list reached by posting a signup form over HTTP.
pub struct HttpMailingList {
    client: Client,
    url: String,
    tags: Option<String>,
    honeypot_field: Option<String>,
}

impl HttpMailingList {
    pub fn new(config: &MailingListConfig) -> Result<Self, MailingListError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.into()))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            tags: config.tags.clone(),
            honeypot_field: config.honeypot_field.clone(),
        })
    }

    fn form_fields<'a>(&'a self, email: &'a str) -> Vec<(&'a str, &'a str)> {
        let mut fields = vec![("EMAIL", email)];
        if let Some(tags) = &self.tags {
            fields.push(("tags", tags.as_str()));
        }
        if let Some(field) = &self.honeypot_field {
            fields.push((field.as_str(), ""));
        }
        fields
    }
}

#[async_trait]
impl MailingList for HttpMailingList {
    fn name(&self) -> &str {
        "http_form"
    }

    async fn subscribe(&self, email: &str) -> Result<(), MailingListError> {
        debug!("Posting signup form to {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .form(&self.form_fields(email))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailingListError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
