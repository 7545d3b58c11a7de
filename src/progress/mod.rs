//! Session Recorder: per-activity progress documents on top of an external
//! key-value store.

pub mod models;
pub mod recorder;
pub mod store;

pub use models::{
    ActivityProgress, HandUsage, ProgressDocument, ProgressSummary, SessionExtras, SessionRecord,
    MAX_HISTORY,
};
pub use recorder::{SessionRecorder, APP_KEY};
pub use store::{storage_key, JsonFileStore, MemoryStore, ProgressStore, SqliteStore};
