use std::sync::Arc;

use timeline_quiz_core::{
    Config, ItemCatalog, MailingListHandle, QuizSettings, SanitizedConfig, SnapshotStorage,
};

use crate::sessions::SessionRegistry;

/// Shared application state
pub struct AppState {
    config: Config,
    catalog: Arc<ItemCatalog>,
    sessions: SessionRegistry,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<ItemCatalog>,
        storage: Arc<dyn SnapshotStorage>,
        mailing: MailingListHandle,
    ) -> Self {
        let settings = QuizSettings::from_config(&config.quiz);
        let sessions = SessionRegistry::new(Arc::clone(&catalog), settings, storage, mailing);
        Self {
            config,
            catalog,
            sessions,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }
}
