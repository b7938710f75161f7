pub mod catalog;
pub mod config;
pub mod mailing;
pub mod quiz;
pub mod random;
pub mod storage;
pub mod testing;

pub use catalog::{firearms, load_catalog, CatalogError, Item, ItemCatalog, ItemId};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, MailingListConfig,
    QuizConfig, SanitizedConfig,
};
pub use mailing::{
    create_mailing_system, validate_email, EmailError, HttpMailingList, MailingList,
    MailingListError, MailingListHandle, MailingListWorker, SubscriptionRequest,
};
pub use quiz::{
    Board, CorrectPlacement, IncorrectPlacement, Location, Performance, QuizError, QuizResults,
    QuizSettings, QuizStore, StartOutcome, Tier,
};
pub use random::{OsRandom, RandomSource};
pub use storage::{
    create_snapshot_writer, QueuedSnapshotStorage, SnapshotStorage, SnapshotWriter,
    SqliteSnapshotStorage, StorageError,
};
