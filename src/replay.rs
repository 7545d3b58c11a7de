//! Offline sessions driven by recorded landmark frames.
//!
//! A recording is JSON Lines, one detector result per line:
//! `{"tMs": 1200, "hands": [{"landmarks": [...21 points], "handedness": "Left"}]}`.

use std::{
    fs,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::{
    activities::GestureActivity,
    activity::{ActivityKind, ActivityRunner, ActivityStatus, Presenter, RenderFrame, StopReport},
    landmarks::{FrameSnapshot, LandmarkSource},
    progress::{ProgressStore, SessionRecorder},
    settings::EngineSettings,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

const STATUS_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedFrame {
    pub t_ms: u64,
    #[serde(default)]
    pub hands: FrameSnapshot,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recording {
    frames: Vec<RecordedFrame>,
}

impl Recording {
    /// Frames must be in non-decreasing time order.
    pub fn new(frames: Vec<RecordedFrame>) -> Result<Self> {
        if let Some(pair) = frames.windows(2).find(|pair| pair[1].t_ms < pair[0].t_ms) {
            bail!(
                "recording goes back in time: {}ms after {}ms",
                pair[1].t_ms,
                pair[0].t_ms
            );
        }
        Ok(Self { frames })
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let frames = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str::<RecordedFrame>(line)
                    .with_context(|| format!("bad frame on line {}", idx + 1))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(frames)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read recording {}", path.display()))?;
        Self::parse(&contents)
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn duration_ms(&self) -> u64 {
        self.frames.last().map_or(0, |frame| frame.t_ms)
    }

    /// Latest frame at or before `t_ms`; empty before the first one.
    pub fn frame_at(&self, t_ms: u64) -> FrameSnapshot {
        let idx = self.frames.partition_point(|frame| frame.t_ms <= t_ms);
        match idx {
            0 => FrameSnapshot::empty(),
            idx => self.frames[idx - 1].hands.clone(),
        }
    }
}

/// Plays a recording back against the tokio clock.
pub struct ReplaySource {
    recording: Recording,
    started: Mutex<Instant>,
}

impl ReplaySource {
    pub fn new(recording: Recording) -> Self {
        Self {
            recording,
            started: Mutex::new(Instant::now()),
        }
    }

    /// Restarts playback from the first frame.
    pub fn rewind(&self) {
        *self.started.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Instant::now();
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }
}

impl LandmarkSource for ReplaySource {
    fn detected_hands(&self) -> FrameSnapshot {
        let started = *self.started.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.recording.frame_at(elapsed_ms)
    }
}

/// Logs score and prompt changes instead of drawing.
#[derive(Debug, Default)]
pub struct LogPresenter {
    score: Option<u32>,
    prompt: Option<String>,
    frames: u64,
}

impl LogPresenter {
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Presenter for LogPresenter {
    fn set_score_display(&mut self, score: u32) {
        if self.score != Some(score) {
            log_info!("score {score}");
            self.score = Some(score);
        }
    }

    fn draw_frame(&mut self, frame: &RenderFrame) -> Result<()> {
        self.frames += 1;
        if frame.prompt != self.prompt {
            if let Some(prompt) = &frame.prompt {
                log_info!(
                    "[{}] {} {}",
                    frame.time_label(),
                    prompt,
                    frame.subtext.as_deref().unwrap_or_default()
                );
            }
            self.prompt = frame.prompt.clone();
        }
        log_debug!("frame {} with {} sprites", self.frames, frame.sprites.len());
        Ok(())
    }
}

/// Runs one activity for the length of the recording, or until it
/// completes on its own, and returns the session report.
pub async fn replay_session(
    kind: ActivityKind,
    recording: Recording,
    settings: &EngineSettings,
    store: Arc<dyn ProgressStore>,
    presenter: Box<dyn Presenter>,
) -> Result<StopReport> {
    let activity = GestureActivity::from_settings(kind, settings)?;
    let duration = Duration::from_millis(recording.duration_ms());
    let source = Arc::new(ReplaySource::new(recording));
    let recorder = SessionRecorder::handy_helper(store);

    let mut runner = ActivityRunner::new(
        activity,
        source.clone(),
        presenter,
        recorder,
        settings.canvas,
    )?;
    if let Some(seed) = settings.seed {
        runner = runner.with_seed(seed);
    }

    source.rewind();
    runner.start().await?;
    log_info!(
        "Replaying {} frames into {kind} over {:.1}s",
        source.recording().frames().len(),
        duration.as_secs_f64()
    );

    let deadline = Instant::now() + duration;
    while Instant::now() < deadline && runner.status().await == ActivityStatus::Running {
        let remaining = deadline.saturating_duration_since(Instant::now());
        tokio::time::sleep(STATUS_POLL.min(remaining)).await;
    }

    match runner.stop().await? {
        Some(report) => Ok(report),
        None => runner
            .last_report()
            .await
            .context("session ended without a report"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{models::fixtures::hand_at, Handedness};

    fn line(t_ms: u64, hands: &FrameSnapshot) -> String {
        serde_json::to_string(&RecordedFrame {
            t_ms,
            hands: hands.clone(),
        })
        .unwrap()
    }

    #[test]
    fn parses_jsonl_and_skips_blank_lines() {
        let left = FrameSnapshot::new(vec![hand_at(Handedness::Left, 0.2, 0.3)]);
        let contents = format!("{}\n\n{}\n", line(0, &FrameSnapshot::empty()), line(500, &left));
        let recording = Recording::parse(&contents).unwrap();
        assert_eq!(recording.frames().len(), 2);
        assert_eq!(recording.duration_ms(), 500);
        assert!(recording.frame_at(499).is_empty());
        assert_eq!(recording.frame_at(500), left);
        assert_eq!(recording.frame_at(10_000), left);
    }

    #[test]
    fn reports_line_of_bad_frame() {
        let contents = format!("{}\n{{\"tMs\": \"soon\"}}\n", line(0, &FrameSnapshot::empty()));
        let err = Recording::parse(&contents).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn rejects_out_of_order_frames() {
        let contents = format!(
            "{}\n{}\n",
            line(100, &FrameSnapshot::empty()),
            line(50, &FrameSnapshot::empty())
        );
        assert!(Recording::parse(&contents).is_err());
    }

    #[test]
    fn empty_before_first_frame() {
        let right = FrameSnapshot::new(vec![hand_at(Handedness::Right, 0.5, 0.5)]);
        let recording = Recording::new(vec![RecordedFrame {
            t_ms: 200,
            hands: right,
        }])
        .unwrap();
        assert!(recording.frame_at(0).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn source_follows_the_tokio_clock() {
        let right = FrameSnapshot::new(vec![hand_at(Handedness::Right, 0.5, 0.5)]);
        let recording = Recording::new(vec![
            RecordedFrame {
                t_ms: 0,
                hands: FrameSnapshot::empty(),
            },
            RecordedFrame {
                t_ms: 1000,
                hands: right.clone(),
            },
        ])
        .unwrap();
        let source = ReplaySource::new(recording);
        assert!(source.detected_hands().is_empty());
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(source.detected_hands(), right);
        source.rewind();
        assert!(source.detected_hands().is_empty());
    }
}
