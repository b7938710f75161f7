use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Session idle timeout is not 0
/// - Undo history keeps at least one step
/// - Snapshot expiry window is not 0
/// - Mailing-list URL is not empty when the section is present
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.server.session_idle_minutes == 0 {
        return Err(ConfigError::ValidationError(
            "server.session_idle_minutes cannot be 0".to_string(),
        ));
    }

    if config.quiz.history_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "quiz.history_capacity cannot be 0".to_string(),
        ));
    }

    if config.quiz.snapshot_ttl_hours == 0 {
        return Err(ConfigError::ValidationError(
            "quiz.snapshot_ttl_hours cannot be 0".to_string(),
        ));
    }

    if let Some(mailing) = &config.mailing_list {
        if mailing.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "mailing_list.url cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
