use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{
    presenter::{Presenter, RenderFrame},
    state::{ActivityState, ActivityStatus},
    Activity, ActivityKind, StartContext, TickContext, TickOutcome, MAX_FPS,
};
use crate::{
    gesture::CanvasSize,
    landmarks::{FrameSnapshot, LandmarkSource},
    progress::{SessionRecord, SessionRecorder},
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Outcome of one finished session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopReport {
    pub activity: ActivityKind,
    pub session_id: String,
    pub score: u32,
    pub elapsed_secs: u64,
    /// `None` for variants that do not record sessions.
    pub record: Option<SessionRecord>,
    /// False when the record could not be written; the session still ended.
    pub persisted: bool,
}

struct Session<A: Activity> {
    activity: A,
    state: ActivityState,
    presenter: Box<dyn Presenter>,
    rng: StdRng,
    failure: Option<anyhow::Error>,
    last_report: Option<StopReport>,
}

impl<A: Activity> Session<A> {
    fn tick(
        &mut self,
        hands: &FrameSnapshot,
        canvas: CanvasSize,
        now: Instant,
    ) -> Result<TickOutcome> {
        let now_ms = self.state.sync_elapsed(now);
        let mut ctx = TickContext {
            now_ms,
            hands,
            canvas,
            score: &mut self.state.score,
            rng: &mut self.rng,
        };
        let outcome = self.activity.update(&mut ctx)?;
        self.redraw()?;
        Ok(outcome)
    }

    fn redraw(&mut self) -> Result<()> {
        let score = self.state.score.value();
        let mut frame = RenderFrame::new(self.activity.kind(), score, self.state.elapsed_secs());
        self.activity.render(&mut frame);
        self.presenter.set_score_display(score);
        self.presenter.draw_frame(&frame)
    }

    /// Ends the running session and writes its summary. Callers check that
    /// the session is running, so this happens once per session.
    async fn finish(&mut self, recorder: &SessionRecorder) -> StopReport {
        self.state.stop(Instant::now());
        self.activity.stop();

        let kind = self.activity.kind();
        let score = self.state.score.value();
        let elapsed_secs = self.state.elapsed_secs();
        let session_id = self.state.session_id.clone().unwrap_or_default();

        let (record, persisted) = match self.activity.session_extras() {
            Some(extras) => {
                let record = SessionRecord::new(Utc::now(), score, elapsed_secs, extras);
                match recorder.record(kind, record.clone()).await {
                    Ok(()) => (Some(record), true),
                    Err(err) => {
                        log_warn!("Failed to save {} session {}: {err:?}", kind, session_id);
                        (Some(record), false)
                    }
                }
            }
            None => (None, true),
        };

        log_info!(
            "{} session {} stopped: score {}, {}s",
            kind,
            session_id,
            score,
            elapsed_secs
        );

        let report = StopReport {
            activity: kind,
            session_id,
            score,
            elapsed_secs,
            record,
            persisted,
        };
        self.last_report = Some(report.clone());
        report
    }
}

struct Ticker {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Shared by every clone of a runner. Dropping the last clone cancels the
/// cadence; an unfinished session is left unrecorded.
#[derive(Default)]
struct TickerSlot {
    current: Mutex<Option<Ticker>>,
}

impl Drop for TickerSlot {
    fn drop(&mut self) {
        if let Some(ticker) = self.current.get_mut().take() {
            log_warn!("Runner dropped with a live cadence; cancelling it");
            ticker.cancel.cancel();
        }
    }
}

/// Runs one activity at a time against a landmark source.
///
/// The cadence task and the public methods serialize on one session lock,
/// so variant state is only ever touched by one caller at a time.
pub struct ActivityRunner<A: Activity> {
    session: Arc<Mutex<Session<A>>>,
    source: Arc<dyn LandmarkSource>,
    recorder: SessionRecorder,
    canvas: CanvasSize,
    seed: Option<u64>,
    ticker: Arc<TickerSlot>,
}

impl<A: Activity> Clone for ActivityRunner<A> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            source: Arc::clone(&self.source),
            recorder: self.recorder.clone(),
            canvas: self.canvas,
            seed: self.seed,
            ticker: Arc::clone(&self.ticker),
        }
    }
}

impl<A: Activity> ActivityRunner<A> {
    pub fn new(
        activity: A,
        source: Arc<dyn LandmarkSource>,
        presenter: Box<dyn Presenter>,
        recorder: SessionRecorder,
        canvas: CanvasSize,
    ) -> Result<Self> {
        canvas.validate()?;
        if !(1..=MAX_FPS).contains(&activity.fps()) {
            bail!(
                "{} cadence must be between 1 and {MAX_FPS} fps, got {}",
                activity.kind(),
                activity.fps()
            );
        }

        Ok(Self {
            session: Arc::new(Mutex::new(Session {
                activity,
                state: ActivityState::new(),
                presenter,
                rng: StdRng::from_entropy(),
                failure: None,
                last_report: None,
            })),
            source,
            recorder,
            canvas,
            seed: None,
            ticker: Arc::new(TickerSlot::default()),
        })
    }

    /// Seeds spawn randomness so sessions replay identically.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub async fn state(&self) -> ActivityState {
        let mut guard = self.session.lock().await;
        guard.state.sync_elapsed(Instant::now());
        guard.state.clone()
    }

    pub async fn status(&self) -> ActivityStatus {
        self.session.lock().await.state.status
    }

    /// Report of the most recently finished session, whether it was stopped
    /// explicitly or completed on its own.
    pub async fn last_report(&self) -> Option<StopReport> {
        self.session.lock().await.last_report.clone()
    }

    /// Read access to the variant between ticks.
    pub async fn inspect<R>(&self, f: impl FnOnce(&A, &ActivityState) -> R) -> R {
        let guard = self.session.lock().await;
        f(&guard.activity, &guard.state)
    }

    /// Opens a new session.
    ///
    /// A cadence failure that no `stop()` collected is returned here instead
    /// of starting; the following call starts normally.
    pub async fn start(&self) -> Result<ActivityState> {
        // A finished cadence task may still be parked here.
        self.cancel_ticker().await?;

        let fps = {
            let mut guard = self.session.lock().await;
            if guard.state.is_running() {
                bail!("{} is already running", guard.activity.kind());
            }
            if let Some(err) = guard.failure.take() {
                let kind = guard.activity.kind();
                return Err(err.context(format!("previous {kind} session failed")));
            }

            let session = &mut *guard;
            session.rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            session
                .state
                .begin_session(Uuid::new_v4().to_string(), Utc::now(), Instant::now());

            let mut ctx = StartContext {
                canvas: self.canvas,
                rng: &mut session.rng,
            };
            session.activity.start(&mut ctx);
            if let Err(err) = session.redraw() {
                session.activity.stop();
                session.state = ActivityState::new();
                return Err(err.context("initial draw failed"));
            }

            log_info!(
                "Started {} session {} at {} fps",
                session.activity.kind(),
                session.state.session_id.as_deref().unwrap_or_default(),
                session.activity.fps()
            );
            session.activity.fps()
        };

        self.spawn_ticker(fps).await;
        Ok(self.state().await)
    }

    /// Cancels the cadence and records the session.
    ///
    /// Idempotent: returns `Ok(None)` when nothing is running, including
    /// after the variant completed on its own. A cadence failure is
    /// returned as an error after the session has been summarized.
    pub async fn stop(&self) -> Result<Option<StopReport>> {
        let join_result = self.cancel_ticker().await;

        let mut guard = self.session.lock().await;
        let report = if guard.state.is_running() {
            Some(guard.finish(&self.recorder).await)
        } else {
            None
        };

        join_result?;
        if let Some(err) = guard.failure.take() {
            return Err(err.context(format!("{} cadence failed", guard.activity.kind())));
        }
        Ok(report)
    }

    async fn spawn_ticker(&self, fps: u32) {
        let mut ticker_guard = self.ticker.current.lock().await;
        if let Some(previous) = ticker_guard.take() {
            previous.cancel.cancel();
            previous.handle.abort();
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let session = Arc::clone(&self.session);
        let source = Arc::clone(&self.source);
        let recorder = self.recorder.clone();
        let canvas = self.canvas;
        let period = Duration::from_secs_f64(1.0 / f64::from(fps));

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks: u64 = 0;

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let hands = source.detected_hands();
                        let mut guard = session.lock().await;
                        if !guard.state.is_running() {
                            break;
                        }

                        ticks = ticks.wrapping_add(1);
                        match guard.tick(&hands, canvas, Instant::now()) {
                            Ok(TickOutcome::Continue) => {
                                log_debug!(
                                    "{} tick {} score {} hands {}",
                                    guard.activity.kind(),
                                    ticks,
                                    guard.state.score.value(),
                                    hands.len()
                                );
                            }
                            Ok(TickOutcome::Complete) => {
                                log_info!(
                                    "{} completed after {} ticks",
                                    guard.activity.kind(),
                                    ticks
                                );
                                guard.finish(&recorder).await;
                                break;
                            }
                            Err(err) => {
                                log_error!("{} update failed: {err:?}", guard.activity.kind());
                                guard.failure = Some(err);
                                guard.finish(&recorder).await;
                                break;
                            }
                        }
                    }
                }
            }
        });

        *ticker_guard = Some(Ticker { handle, cancel });
    }

    async fn cancel_ticker(&self) -> Result<()> {
        let ticker = self.ticker.current.lock().await.take();
        match ticker {
            Some(Ticker { handle, cancel }) => {
                cancel.cancel();
                handle
                    .await
                    .map_err(|err| anyhow!("{err}"))
                    .context("cadence task failed to join")
            }
            None => Ok(()),
        }
    }
}
