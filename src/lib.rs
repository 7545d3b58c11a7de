pub mod activities;
pub mod activity;
pub mod gesture;
pub mod landmarks;
pub mod progress;
pub mod replay;
pub mod settings;
pub mod utils;

use std::{env, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use log::info;

pub use activities::GestureActivity;
pub use activity::{Activity, ActivityKind, ActivityRunner, ActivityStatus, Presenter, StopReport};
pub use landmarks::{FrameSnapshot, HandSnapshot, Handedness, LandmarkSource, SharedFrame};
pub use progress::{ProgressStore, SessionRecorder, SqliteStore};
pub use settings::{EngineSettings, SettingsStore};

use replay::{replay_session, LogPresenter, Recording};

const DATA_DIR_ENV: &str = "HANDY_HELPER_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "handy-helper-data";
const USAGE: &str = "usage: handy-helper <activity> <recording.jsonl>";

/// Replays a landmark recording into one activity and stores the session
/// in the local progress database.
pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut args = env::args().skip(1);
    let (kind, recording_path) = match (args.next(), args.next()) {
        (Some(kind), Some(path)) => (kind.parse::<ActivityKind>()?, PathBuf::from(path)),
        _ => bail!("{USAGE}"),
    };

    info!("HandyHelper starting up...");

    let data_dir = env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data dir {}", data_dir.display()))?;

    let settings_store = SettingsStore::new(data_dir.join("settings.json"))?;
    let settings = settings_store.settings();
    settings.validate().context("invalid settings.json")?;

    let recording = Recording::load(&recording_path)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(async move {
        let store = SqliteStore::new(data_dir.join("handy-helper.sqlite3"))?;
        let store: Arc<dyn ProgressStore> = Arc::new(store);

        let report = replay_session(
            kind,
            recording,
            &settings,
            Arc::clone(&store),
            Box::new(LogPresenter::default()),
        )
        .await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        if !report.persisted {
            log::warn!("Session {} was not saved", report.session_id);
        }

        let recorder = SessionRecorder::handy_helper(store);
        for summary in recorder.summaries().await? {
            info!(
                "{}: {} sessions, best {}, average {}",
                summary.activity,
                summary.sessions_completed,
                summary.best_score,
                summary.average_score
            );
        }
        Ok(())
    })
}
