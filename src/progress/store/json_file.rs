use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;

use super::{storage_key, ProgressStore};

/// One pretty-printed JSON file per app key inside `dir`.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create progress directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, app_key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", storage_key(app_key)))
    }
}

#[async_trait]
impl ProgressStore for JsonFileStore {
    async fn load(&self, app_key: &str) -> Result<Option<Value>> {
        let path = self.path_for(app_key);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read progress from {}", path.display()))
            }
        };
        let value = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse progress in {}", path.display()))?;
        Ok(Some(value))
    }

    async fn save(&self, app_key: &str, data: &Value) -> Result<()> {
        let path = self.path_for(app_key);
        let serialized = serde_json::to_string_pretty(data)?;
        // Write-then-rename; readers never observe a truncated document.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serialized)
            .await
            .with_context(|| format!("failed to write progress to {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))
    }

    async fn clear(&self, app_key: &str) -> Result<()> {
        let path = self.path_for(app_key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("failed to remove {}", path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("progress")).unwrap();
        store
            .save("handy-helper", &json!({ "catchStars": { "bestScore": 4 } }))
            .await
            .unwrap();
        assert!(dir
            .path()
            .join("progress/nmda-therapy-handy-helper.json")
            .exists());

        let reopened = JsonFileStore::new(dir.path().join("progress")).unwrap();
        let value = reopened.load("handy-helper").await.unwrap().unwrap();
        assert_eq!(value["catchStars"]["bestScore"], 4);
    }

    #[tokio::test]
    async fn missing_and_cleared_documents() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().to_path_buf()).unwrap();
        assert!(store.load("handy-helper").await.unwrap().is_none());
        store.clear("handy-helper").await.unwrap();

        store.save("handy-helper", &json!({})).await.unwrap();
        store.clear("handy-helper").await.unwrap();
        assert!(store.load("handy-helper").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().to_path_buf()).unwrap();
        std::fs::write(dir.path().join("nmda-therapy-handy-helper.json"), "{not json").unwrap();
        assert!(store.load("handy-helper").await.is_err());
    }
}
