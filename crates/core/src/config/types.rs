use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub quiz: QuizConfig,
    #[serde(default)]
    pub mailing_list: Option<MailingListConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Sessions untouched for this long are dropped from memory (default: 60)
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_minutes: default_session_idle_minutes(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_session_idle_minutes() -> u32 {
    60
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("timeline-quiz.db")
}

/// Quiz behaviour configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuizConfig {
    /// Number of undo steps kept per attempt (default: 10)
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Persisted progress older than this is discarded on restore (default: 168 = 7 days)
    #[serde(default = "default_snapshot_ttl_hours")]
    pub snapshot_ttl_hours: u32,
    /// Optional TOML file with `[[items]]` entries; the built-in set is used when absent
    #[serde(default)]
    pub items_path: Option<PathBuf>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            snapshot_ttl_hours: default_snapshot_ttl_hours(),
            items_path: None,
        }
    }
}

fn default_history_capacity() -> usize {
    10
}

fn default_snapshot_ttl_hours() -> u32 {
    7 * 24
}

/// Mailing-list form endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailingListConfig {
    /// Form POST endpoint (e.g., "https://example.list-manage.com/subscribe/post?u=...&id=...")
    pub url: String,
    /// Optional tag id attached to every subscription
    #[serde(default)]
    pub tags: Option<String>,
    /// Optional bot-protection field posted empty
    #[serde(default)]
    pub honeypot_field: Option<String>,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    10
}

/// Sanitized config for API responses (endpoint secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub quiz: QuizConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailing_list: Option<SanitizedMailingListConfig>,
}

/// Sanitized mailing-list config (only the host is shown, the list ids in the query are hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMailingListConfig {
    pub host: String,
    pub tags_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            quiz: config.quiz.clone(),
            mailing_list: config
                .mailing_list
                .as_ref()
                .map(|m| SanitizedMailingListConfig {
                    host: url_host(&m.url),
                    tags_configured: m.tags.is_some(),
                    timeout_secs: m.timeout_secs,
                }),
        }
    }
}

fn url_host(url: &str) -> String {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    without_scheme
        .split(['/', '?'])
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.server.session_idle_minutes, 60);
        assert_eq!(config.database.path.to_str().unwrap(), "timeline-quiz.db");
        assert_eq!(config.quiz.history_capacity, 10);
        assert_eq!(config.quiz.snapshot_ttl_hours, 168);
        assert!(config.quiz.items_path.is_none());
        assert!(config.mailing_list.is_none());
    }

    #[test]
    fn test_deserialize_quiz_section() {
        let toml = r#"
[quiz]
history_capacity = 25
snapshot_ttl_hours = 24
items_path = "/etc/quiz/items.toml"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.quiz.history_capacity, 25);
        assert_eq!(config.quiz.snapshot_ttl_hours, 24);
        assert_eq!(
            config.quiz.items_path.unwrap().to_str().unwrap(),
            "/etc/quiz/items.toml"
        );
    }

    #[test]
    fn test_deserialize_with_mailing_list() {
        let toml = r#"
[mailing_list]
url = "https://lists.example.com/subscribe/post?u=abc&id=def"
tags = "248414"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let mailing = config.mailing_list.as_ref().unwrap();
        assert_eq!(mailing.tags.as_deref(), Some("248414"));
        assert!(mailing.honeypot_field.is_none());
        assert_eq!(mailing.timeout_secs, 10); // default
    }

    #[test]
    fn test_sanitized_config_hides_list_ids() {
        let config = Config {
            mailing_list: Some(MailingListConfig {
                url: "https://lists.example.com/subscribe/post?u=secret&id=secret".to_string(),
                tags: None,
                honeypot_field: None,
                timeout_secs: 5,
            }),
            ..Default::default()
        };

        let sanitized = SanitizedConfig::from(&config);
        let mailing = sanitized.mailing_list.as_ref().unwrap();
        assert_eq!(mailing.host, "lists.example.com");
        assert!(!mailing.tags_configured);
        assert_eq!(mailing.timeout_secs, 5);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_sanitized_config_without_mailing_list() {
        let sanitized = SanitizedConfig::from(&Config::default());
        assert_eq!(sanitized.server.port, 8080);
        assert!(sanitized.mailing_list.is_none());
    }
}
