//! Email address checks applied before results are unlocked.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use thiserror::Error;

/// Maximum address length per RFC 5321.
const MAX_EMAIL_LENGTH: usize = 254;

/// Throwaway inbox providers that are refused.
const DISPOSABLE_DOMAINS: &[&str] = &[
    "10minutemail.com",
    "tempmail.org",
    "guerrillamail.com",
    "mailinator.com",
    "0-mail.com",
    "throwaway.email",
    "temp-mail.org",
    "fakeinbox.com",
];

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"#,
    )
    .expect("email pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("Email is required")]
    Missing,

    #[error("Please enter a valid email address")]
    InvalidFormat,

    #[error("Email address is too long")]
    TooLong,

    #[error("Please enter a valid email domain")]
    InvalidDomain,

    #[error("Please use a permanent email address")]
    Disposable,
}

/// Validate an address, reporting the first failed rule.
pub fn validate_email(email: &str) -> Result<(), EmailError> {
    if email.is_empty() {
        return Err(EmailError::Missing);
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(EmailError::InvalidFormat);
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(EmailError::TooLong);
    }

    let domain = email.split('@').nth(1).unwrap_or_default();
    if domain.len() < 3 || !domain.contains('.') {
        return Err(EmailError::InvalidDomain);
    }
    if DISPOSABLE_DOMAINS.contains(&domain.to_lowercase().as_str()) {
        return Err(EmailError::Disposable);
    }

    Ok(())
}
