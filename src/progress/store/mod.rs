use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

mod json_file;
mod memory;
mod migrations;
mod sqlite;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

const KEY_PREFIX: &str = "nmda-therapy-";

/// Physical key under which an app's progress document is stored.
pub fn storage_key(app_key: &str) -> String {
    format!("{KEY_PREFIX}{app_key}")
}

/// Per-device key-value persistence for progress documents.
///
/// Implementations map `app_key` through [`storage_key`] so documents from
/// different back-ends stay interchangeable.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn load(&self, app_key: &str) -> Result<Option<Value>>;

    async fn save(&self, app_key: &str, data: &Value) -> Result<()>;

    async fn clear(&self, app_key: &str) -> Result<()>;
}
