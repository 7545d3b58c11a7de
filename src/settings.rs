use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
    activities::{
        hand_tracker::HAND_TRACKER_FPS,
        which_hand::{TargetOrder, DEFAULT_MAX_ROUNDS, WHICH_HAND_FPS},
    },
    activity::{ActivityKind, DEFAULT_FPS, MAX_FPS},
    gesture::{CanvasSize, GestureConfig},
};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Cadence per variant, in frames per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CadenceSettings {
    pub which_hand: u32,
    pub hand_tracker: u32,
    pub catch_stars: u32,
    pub balloon_pop: u32,
    pub duck_catch: u32,
}

impl Default for CadenceSettings {
    fn default() -> Self {
        Self {
            which_hand: WHICH_HAND_FPS,
            hand_tracker: HAND_TRACKER_FPS,
            catch_stars: DEFAULT_FPS,
            balloon_pop: DEFAULT_FPS,
            duck_catch: DEFAULT_FPS,
        }
    }
}

impl CadenceSettings {
    pub fn fps(&self, kind: ActivityKind) -> u32 {
        match kind {
            ActivityKind::WhichHand => self.which_hand,
            ActivityKind::HandTracker => self.hand_tracker,
            ActivityKind::CatchStars => self.catch_stars,
            ActivityKind::BalloonPop => self.balloon_pop,
            ActivityKind::DuckCatch => self.duck_catch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhichHandSettings {
    pub max_rounds: u32,
    pub target_order: TargetOrder,
}

impl Default for WhichHandSettings {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            target_order: TargetOrder::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    pub canvas: CanvasSize,
    /// Fixed RNG seed; sessions are unseeded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub cadence: CadenceSettings,
    pub which_hand: WhichHandSettings,
    pub gesture: GestureConfig,
}

impl EngineSettings {
    pub fn validate(&self) -> Result<()> {
        self.canvas.validate()?;
        self.gesture.validate().context("invalid gesture settings")?;
        if let Some(kind) = ActivityKind::ALL
            .into_iter()
            .find(|kind| !(1..=MAX_FPS).contains(&self.cadence.fps(*kind)))
        {
            bail!("cadence for {kind} must be between 1 and {MAX_FPS} fps");
        }
        if self.which_hand.max_rounds == 0 {
            bail!("which-hand max rounds must be at least 1");
        }
        Ok(())
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<EngineSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log_warn!(
                    "Ignoring unreadable settings at {}: {err}",
                    path.display()
                );
                EngineSettings::default()
            })
        } else {
            EngineSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> EngineSettings {
        self.read().clone()
    }

    /// Validates, stores, and persists new settings.
    pub fn update(&self, settings: EngineSettings) -> Result<()> {
        settings.validate()?;
        let mut guard = self.write();
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: EngineSettings = serde_json::from_str(&contents)?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &EngineSettings) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, EngineSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, EngineSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        let settings = store.settings();
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(settings.cadence.fps(ActivityKind::WhichHand), 20);
        assert_eq!(settings.cadence.fps(ActivityKind::DuckCatch), 30);
        assert_eq!(settings.which_hand.max_rounds, 10);
    }

    #[test]
    fn garbage_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.settings(), EngineSettings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let contents = r#"{
            "seed": 42,
            "whichHand": {"targetOrder": "balanced"},
            "gesture": {"pinchThreshold": 0.05}
        }"#;
        fs::write(&path, contents).unwrap();
        let settings = SettingsStore::new(path).unwrap().settings();
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.which_hand.target_order, TargetOrder::Balanced);
        assert_eq!(settings.which_hand.max_rounds, 10);
        assert_eq!(settings.gesture.pinch_threshold, 0.05);
        assert_eq!(settings.gesture.hold_duration_ms, 2000);
    }

    #[test]
    fn update_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut settings = store.settings();
        settings.which_hand.max_rounds = 4;
        settings.cadence.catch_stars = 60;
        store.update(settings.clone()).unwrap();

        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.settings(), settings);
        reopened.reload().unwrap();
        assert_eq!(reopened.settings().cadence.catch_stars, 60);
    }

    #[test]
    fn update_rejects_invalid_settings() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        let mut settings = store.settings();
        settings.cadence.balloon_pop = 0;
        assert!(store.update(settings).is_err());
        assert!(!store.path().exists());
    }

    #[test]
    fn rejects_cadence_above_max() {
        let mut settings = EngineSettings::default();
        settings.cadence.duck_catch = MAX_FPS;
        assert!(settings.validate().is_ok());
        settings.cadence.duck_catch = MAX_FPS + 1;
        assert!(settings.validate().is_err());
    }
}
