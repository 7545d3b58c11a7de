//! Progress document layout.
//!
//! One document per app key. Each activity key (`whichHand`, `catchStars`,
//! ...) maps to its aggregate stats and a bounded session history:
//! ```json
//! {
//!   "whichHand": {
//!     "sessionsCompleted": 3, "bestScore": 10, "totalScore": 24,
//!     "handUsage": { "left": 12, "right": 12 },
//!     "history": [{ "date": "...", "score": 8, "time": 71, "maxScore": 10,
//!                   "handUsage": { "left": 4, "right": 4 } }]
//!   },
//!   "lastUpdated": "2026-10-19T09:30:00Z"
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::landmarks::Handedness;

/// Most recent sessions kept per activity; older entries are evicted first.
pub const MAX_HISTORY: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandUsage {
    pub left: u32,
    pub right: u32,
}

impl HandUsage {
    pub fn record(&mut self, hand: Handedness) {
        match hand {
            Handedness::Left => self.left += 1,
            Handedness::Right => self.right += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.left + self.right
    }

    pub fn accumulate(&mut self, other: &HandUsage) {
        self.left += other.left;
        self.right += other.right;
    }

    /// Rounded left/right percentages, `None` before any hand was used.
    pub fn percentages(&self) -> Option<(u32, u32)> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let pct = |n: u32| ((n as f64 / total as f64) * 100.0).round() as u32;
        Some((pct(self.left), pct(self.right)))
    }
}

/// Variant-specific fields appended to a session record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExtras {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand_usage: Option<HandUsage>,
}

/// Summary of one finished session. Written once, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub date: DateTime<Utc>,
    pub score: u32,
    /// Whole seconds the session ran.
    pub time: u64,
    #[serde(flatten)]
    pub extras: SessionExtras,
}

impl SessionRecord {
    pub fn new(date: DateTime<Utc>, score: u32, time: u64, extras: SessionExtras) -> Self {
        Self {
            date,
            score,
            time,
            extras,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityProgress {
    pub sessions_completed: u32,
    pub best_score: u32,
    #[serde(default)]
    pub total_score: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand_usage: Option<HandUsage>,
    #[serde(default)]
    pub history: Vec<SessionRecord>,
}

impl ActivityProgress {
    pub fn apply(&mut self, record: SessionRecord) {
        self.sessions_completed += 1;
        self.best_score = self.best_score.max(record.score);
        self.total_score += u64::from(record.score);

        if let Some(usage) = &record.extras.hand_usage {
            self.hand_usage
                .get_or_insert_with(HandUsage::default)
                .accumulate(usage);
        }

        self.history.push(record);
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
    }

    pub fn average_score(&self) -> u32 {
        if self.sessions_completed == 0 {
            return 0;
        }
        (self.total_score as f64 / f64::from(self.sessions_completed)).round() as u32
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub activities: BTreeMap<String, ActivityProgress>,
}

impl ProgressDocument {
    pub fn activity(&self, key: &str) -> Option<&ActivityProgress> {
        self.activities.get(key)
    }

    pub fn record(&mut self, key: &str, record: SessionRecord) {
        self.activities
            .entry(key.to_string())
            .or_default()
            .apply(record);
    }

    /// Stats-view rows for every activity with at least one session.
    pub fn summaries(&self) -> Vec<ProgressSummary> {
        self.activities
            .iter()
            .filter(|(_, progress)| progress.sessions_completed > 0)
            .map(|(key, progress)| ProgressSummary::from_progress(key, progress))
            .collect()
    }
}

/// Aggregates shown on the stats screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub activity: String,
    pub sessions_completed: u32,
    pub best_score: u32,
    pub total_score: u64,
    pub average_score: u32,
    pub left_hand_percent: Option<u32>,
    pub right_hand_percent: Option<u32>,
}

impl ProgressSummary {
    pub fn from_progress(key: &str, progress: &ActivityProgress) -> Self {
        let percentages = progress.hand_usage.as_ref().and_then(HandUsage::percentages);
        Self {
            activity: key.to_string(),
            sessions_completed: progress.sessions_completed,
            best_score: progress.best_score,
            total_score: progress.total_score,
            average_score: progress.average_score(),
            left_hand_percent: percentages.map(|(left, _)| left),
            right_hand_percent: percentages.map(|(_, right)| right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(score: u32) -> SessionRecord {
        SessionRecord::new(
            Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
            score,
            30,
            SessionExtras::default(),
        )
    }

    #[test]
    fn history_keeps_fifty_most_recent() {
        let mut progress = ActivityProgress::default();
        for score in 1..=51 {
            progress.apply(record(score));
        }
        assert_eq!(progress.history.len(), MAX_HISTORY);
        assert_eq!(progress.history.first().unwrap().score, 2);
        assert_eq!(progress.history.last().unwrap().score, 51);
        assert_eq!(progress.sessions_completed, 51);
        assert_eq!(progress.best_score, 51);
    }

    #[test]
    fn accumulates_hand_usage_and_average() {
        let mut progress = ActivityProgress::default();
        let mut first = record(7);
        first.extras.hand_usage = Some(HandUsage { left: 3, right: 4 });
        let mut second = record(10);
        second.extras.hand_usage = Some(HandUsage { left: 6, right: 4 });
        progress.apply(first);
        progress.apply(second);

        assert_eq!(progress.hand_usage, Some(HandUsage { left: 9, right: 8 }));
        assert_eq!(progress.average_score(), 9);

        let summary = ProgressSummary::from_progress("whichHand", &progress);
        assert_eq!(summary.left_hand_percent, Some(53));
        assert_eq!(summary.right_hand_percent, Some(47));
    }

    #[test]
    fn document_json_shape() {
        let mut doc = ProgressDocument::default();
        let mut entry = record(8);
        entry.extras = SessionExtras {
            max_score: Some(10),
            hand_usage: Some(HandUsage { left: 5, right: 3 }),
        };
        doc.record("whichHand", entry);
        doc.record("catchStars", record(4));

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["whichHand"]["sessionsCompleted"], 1);
        assert_eq!(value["whichHand"]["history"][0]["maxScore"], 10);
        assert_eq!(value["whichHand"]["history"][0]["handUsage"]["left"], 5);
        assert_eq!(value["whichHand"]["history"][0]["date"], "2026-10-19T09:00:00Z");
        assert!(value["catchStars"]["history"][0].get("handUsage").is_none());
        assert!(value.get("lastUpdated").is_none());

        let parsed: ProgressDocument = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn reads_documents_without_aggregate_fields() {
        let doc: ProgressDocument = serde_json::from_str(
            r#"{
                "balloonPop": {
                    "sessionsCompleted": 1,
                    "bestScore": 3,
                    "history": [{ "date": "2026-01-02T03:04:05.000Z", "score": 3, "time": 42 }]
                },
                "lastUpdated": "2026-01-02T03:04:06.000Z"
            }"#,
        )
        .unwrap();
        let progress = doc.activity("balloonPop").unwrap();
        assert_eq!(progress.total_score, 0);
        assert_eq!(progress.history[0].time, 42);
        assert!(doc.last_updated.is_some());
    }

    #[test]
    fn percentages_absent_without_usage() {
        assert_eq!(HandUsage::default().percentages(), None);
    }
}
