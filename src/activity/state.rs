use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::utils::time::whole_seconds;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ActivityStatus {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// Session score. Never negative; penalties clamp at zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Score(u32);

impl Score {
    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn add(&mut self, points: u32) {
        self.0 = self.0.saturating_add(points);
    }

    pub fn penalize(&mut self, points: u32) {
        self.0 = self.0.saturating_sub(points);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityState {
    pub status: ActivityStatus,
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub score: Score,
    pub elapsed_ms: u64,
    #[serde(skip)]
    pub running_anchor: Option<Instant>,
}

impl Default for ActivityState {
    fn default() -> Self {
        Self {
            status: ActivityStatus::Idle,
            session_id: None,
            started_at: None,
            score: Score::default(),
            elapsed_ms: 0,
            running_anchor: None,
        }
    }
}

impl ActivityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole seconds, as shown on the HUD and stored in session records.
    pub fn elapsed_secs(&self) -> u64 {
        whole_seconds(self.elapsed_ms)
    }

    pub fn is_running(&self) -> bool {
        self.status == ActivityStatus::Running
    }

    pub fn begin_session(&mut self, session_id: String, start_at: DateTime<Utc>, now: Instant) {
        *self = Self {
            status: ActivityStatus::Running,
            session_id: Some(session_id),
            started_at: Some(start_at),
            score: Score::default(),
            elapsed_ms: 0,
            running_anchor: Some(now),
        };
    }

    /// Recomputes elapsed time from the start anchor. Never moves backwards.
    pub fn sync_elapsed(&mut self, now: Instant) -> u64 {
        if let (ActivityStatus::Running, Some(anchor)) = (self.status, self.running_anchor) {
            let elapsed = now.saturating_duration_since(anchor).as_millis() as u64;
            self.elapsed_ms = self.elapsed_ms.max(elapsed);
        }
        self.elapsed_ms
    }

    pub fn stop(&mut self, now: Instant) {
        self.sync_elapsed(now);
        self.status = ActivityStatus::Stopped;
        self.running_anchor = None;
    }
}
