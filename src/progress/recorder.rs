use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;

use super::{
    models::{ActivityProgress, ProgressDocument, ProgressSummary, SessionRecord},
    store::ProgressStore,
};
use crate::activity::ActivityKind;

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// App key all HandyHelper activities record under.
pub const APP_KEY: &str = "handy-helper";

/// Appends session summaries to the app's progress document.
#[derive(Clone)]
pub struct SessionRecorder {
    store: Arc<dyn ProgressStore>,
    app_key: String,
}

impl SessionRecorder {
    pub fn new(store: Arc<dyn ProgressStore>, app_key: impl Into<String>) -> Self {
        Self {
            store,
            app_key: app_key.into(),
        }
    }

    pub fn handy_helper(store: Arc<dyn ProgressStore>) -> Self {
        Self::new(store, APP_KEY)
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    /// Loads the progress document; an absent document is an empty one.
    pub async fn load(&self) -> Result<ProgressDocument> {
        match self.store.load(&self.app_key).await? {
            Some(value) => serde_json::from_value(value)
                .with_context(|| format!("progress document for {} is malformed", self.app_key)),
            None => Ok(ProgressDocument::default()),
        }
    }

    /// Read-modify-write of the document with one new session appended.
    ///
    /// A malformed stored document is reported, never overwritten.
    pub async fn record(&self, activity: ActivityKind, record: SessionRecord) -> Result<()> {
        let mut document = self.load().await?;
        let score = record.score;
        document.record(activity.as_str(), record);
        document.last_updated = Some(Utc::now());

        let value = serde_json::to_value(&document)?;
        self.store
            .save(&self.app_key, &value)
            .await
            .with_context(|| format!("failed to save {} progress", activity.as_str()))?;

        log_info!(
            "Recorded {} session (score {}) under {}",
            activity.as_str(),
            score,
            self.app_key
        );
        Ok(())
    }

    pub async fn activity_progress(
        &self,
        activity: ActivityKind,
    ) -> Result<Option<ActivityProgress>> {
        Ok(self.load().await?.activities.remove(activity.as_str()))
    }

    pub async fn summaries(&self) -> Result<Vec<ProgressSummary>> {
        Ok(self.load().await?.summaries())
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear(&self.app_key).await
    }
}
