use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};

use anyhow::Result;
use thiserror::Error;

use crate::config::{AppConfig, CategoryId, MANUAL_TITLE, ModeConfig, ModeId, Timeframe, mode};
use crate::data::{CandleNormalizer, DetectionTransport, HttpTrainerClient, MarketDataProvider};
use crate::domain::{Candle, ObZone};
use crate::models::{SelectionError, SelectionStateMachine};

use super::dispatcher::{DetectionDispatcher, DetectionResult};
use super::messages::{DetectionKind, JobRequest, JobResult};
use super::state::{Notice, NoticeLevel};
use super::worker;

#[cfg(debug_assertions)]
use crate::config::DF;

/// Synchronous rejections of a user trigger. None of them touch the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("Still checking {0}…")]
    Busy(String),
    #[error("Candles are still loading")]
    Loading,
    #[error("No candles loaded yet")]
    NoCandles,
    #[error("Unknown action \"{0}\"")]
    UnknownAction(String),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("Background worker stopped")]
    WorkerGone,
}

/// Owns the current view (mode, timeframe, series, overlay, selection) and
/// talks to the background worker. The UI calls `poll` once per frame.
pub struct TrainerEngine {
    // Common Channels
    job_tx: Sender<JobRequest>,     // UI writes to this
    result_rx: Receiver<JobResult>, // UI reads from this

    config: AppConfig,
    mode: &'static ModeConfig,
    timeframe: Timeframe,

    /// Replaced wholesale on every applied fetch.
    candles: Vec<Candle>,
    series_revision: u64,
    /// View epoch the shown series was fetched for.
    series_epoch: Option<u64>,

    zones: Vec<ObZone>,
    zones_revision: u64,

    /// Only the result of this fetch is applied.
    latest_fetch_seq: u64,
    /// Bumped on timeframe/mode change; detections issued under an older epoch lose their zones.
    view_epoch: u64,

    is_loading: bool,
    /// Label of the in-flight detection, if any.
    checking: Option<String>,
    last_result: Option<String>,

    selection: SelectionStateMachine,
    notices: Vec<Notice>,
}

impl TrainerEngine {
    /// Spawn the worker and issue the first fetch.
    pub fn new(
        config: AppConfig,
        mode_id: ModeId,
        timeframe: Timeframe,
        provider: Arc<dyn MarketDataProvider>,
        transport: Arc<dyn DetectionTransport>,
    ) -> Self {
        let (job_tx, job_rx) = channel::<JobRequest>();
        let (result_tx, result_rx) = channel::<JobResult>();

        let normalizer = Arc::new(CandleNormalizer::new(provider, &config));
        let dispatcher = Arc::new(DetectionDispatcher::new(transport));
        worker::spawn_worker_thread(job_rx, result_tx, normalizer, dispatcher);

        let mut engine = Self {
            job_tx,
            result_rx,
            config,
            mode: mode(mode_id),
            timeframe,
            candles: Vec::new(),
            series_revision: 0,
            series_epoch: None,
            zones: Vec::new(),
            zones_revision: 0,
            latest_fetch_seq: 0,
            view_epoch: 0,
            is_loading: false,
            checking: None,
            last_result: None,
            selection: SelectionStateMachine::default(),
            notices: Vec::new(),
        };
        engine.request_fetch();
        engine
    }

    /// Same as `new`, wired to the real HTTP service.
    pub fn with_http(config: AppConfig, mode_id: ModeId, timeframe: Timeframe) -> Result<Self> {
        let client = Arc::new(HttpTrainerClient::new(config.clone())?);
        Ok(Self::new(config, mode_id, timeframe, client.clone(), client))
    }

    // --- ACCESSORS ---

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn mode(&self) -> &'static ModeConfig {
        self.mode
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn series_revision(&self) -> u64 {
        self.series_revision
    }

    pub fn zones(&self) -> &[ObZone] {
        &self.zones
    }

    pub fn zones_revision(&self) -> u64 {
        self.zones_revision
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn checking(&self) -> Option<&str> {
        self.checking.as_deref()
    }

    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    pub fn selection(&self) -> &SelectionStateMachine {
        &self.selection
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notices.push(Notice::new(level, text));
    }

    // --- VIEW CHANGES ---

    pub fn set_timeframe(&mut self, timeframe: Timeframe) {
        if timeframe == self.timeframe {
            return;
        }
        self.timeframe = timeframe;
        self.reset_view();
        self.request_fetch();
    }

    pub fn set_mode(&mut self, mode_id: ModeId) {
        if mode_id == self.mode.id {
            return;
        }
        self.mode = mode(mode_id);
        self.last_result = None;
        self.reset_view();
        self.request_fetch();
    }

    /// Re-fetch the current view. Selection and overlay are kept.
    pub fn refresh(&mut self) {
        self.request_fetch();
    }

    // Zones and selection belong to the old view.
    fn reset_view(&mut self) {
        self.view_epoch += 1;
        self.selection.reset();
        self.replace_zones(Vec::new());
    }

    fn replace_zones(&mut self, zones: Vec<ObZone>) {
        self.zones = zones;
        self.zones_revision += 1;
    }

    fn request_fetch(&mut self) {
        self.latest_fetch_seq += 1;
        let req = JobRequest::FetchCandles {
            seq: self.latest_fetch_seq,
            timeframe: self.timeframe,
            amount: self.mode.candle_amount,
        };

        #[cfg(debug_assertions)]
        if DF.log_fetch {
            log::info!(
                "Fetch #{} requested: {} {} x{}",
                self.latest_fetch_seq,
                self.config.instrument,
                self.timeframe,
                self.mode.candle_amount
            );
        }

        if self.job_tx.send(req).is_err() {
            log::error!("Worker is gone; fetch #{} dropped", self.latest_fetch_seq);
            self.is_loading = false;
            self.notify(NoticeLevel::Error, TriggerError::WorkerGone.to_string());
            return;
        }
        self.is_loading = true;
    }

    // --- TRIGGERS ---

    /// Run one of the current mode's auto actions on the loaded series.
    pub fn trigger_action(&mut self, key: &str) -> Result<(), TriggerError> {
        if let Some(label) = &self.checking {
            return Err(TriggerError::Busy(label.clone()));
        }
        let action = self
            .mode
            .action(key)
            .ok_or_else(|| TriggerError::UnknownAction(key.to_string()))?;
        self.ensure_current_series()?;

        self.send_detection(
            action.label,
            self.mode.title,
            DetectionKind::Auto {
                mode: self.mode,
                action: action.key,
                candles: self.candles.clone(),
            },
        )
    }

    /// Submit the tagged candles in canonical order. The selection is cleared once sent.
    pub fn confirm_manual(&mut self) -> Result<(), TriggerError> {
        if let Some(label) = &self.checking {
            return Err(TriggerError::Busy(label.clone()));
        }
        if !self.mode.manual_selection {
            return Err(TriggerError::UnknownAction(MANUAL_TITLE.to_string()));
        }
        if self.is_loading {
            return Err(TriggerError::Loading);
        }
        let payload = self.selection.build_ordered_payload()?;

        self.send_detection(MANUAL_TITLE, MANUAL_TITLE, DetectionKind::Manual { payload })?;
        self.selection.reset();
        Ok(())
    }

    // Triggers only run on a settled series that belongs to the current view.
    fn ensure_current_series(&self) -> Result<(), TriggerError> {
        if self.is_loading {
            return Err(TriggerError::Loading);
        }
        if self.series_epoch != Some(self.view_epoch) || self.candles.is_empty() {
            return Err(TriggerError::NoCandles);
        }
        Ok(())
    }

    fn send_detection(&mut self, busy_label: &str, title: &str, kind: DetectionKind) -> Result<(), TriggerError> {
        let req = JobRequest::Detect {
            epoch: self.view_epoch,
            label: title.to_string(),
            kind,
        };
        self.job_tx.send(req).map_err(|_| TriggerError::WorkerGone)?;
        self.checking = Some(busy_label.to_string());

        #[cfg(debug_assertions)]
        if DF.log_detection {
            log::info!("Detection requested: {} (epoch {})", busy_label, self.view_epoch);
        }
        Ok(())
    }

    // --- SELECTION ---

    /// Tag a resolved chart click with the active category.
    ///
    /// Returns `Ok(None)` when the candle is not part of the current view's series.
    pub fn toggle_candle(&mut self, candle: Candle) -> Result<Option<usize>, TriggerError> {
        self.ensure_current_series()?;
        if self
            .candles
            .binary_search_by_key(&candle.time, |c| c.time)
            .is_err()
        {
            #[cfg(debug_assertions)]
            if DF.log_selection {
                log::info!("Selection: t={} is not in the current series, ignored", candle.time);
            }
            return Ok(None);
        }
        Ok(Some(self.selection.toggle_candle(candle)?))
    }

    pub fn set_active_category(&mut self, id: CategoryId) {
        self.selection.set_active_category(id);
    }

    pub fn reset_selection(&mut self) {
        self.selection.reset();
    }

    // --- RESULTS ---

    /// Drain every finished job. Never blocks.
    pub fn poll(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            self.apply_result(result);
        }
    }

    /// Apply one worker result, dropping it if the view has moved on.
    pub fn apply_result(&mut self, result: JobResult) {
        match result {
            JobResult::Candles {
                seq,
                timeframe,
                outcome,
                duration_ms,
            } => {
                if seq != self.latest_fetch_seq {
                    #[cfg(debug_assertions)]
                    if DF.log_fetch {
                        log::info!("Fetch #{} is stale (latest #{}), dropped", seq, self.latest_fetch_seq);
                    }
                    return;
                }
                self.is_loading = false;

                if let Some(err) = outcome.error {
                    // Keep whatever is on screen.
                    self.notify(
                        NoticeLevel::Error,
                        format!("Failed to load {} candles: {}", timeframe, err),
                    );
                    return;
                }

                #[cfg(debug_assertions)]
                if DF.log_fetch {
                    log::info!(
                        "Fetch #{} applied: {} candles ({} ms)",
                        seq,
                        outcome.candles.len(),
                        duration_ms
                    );
                }
                #[cfg(not(debug_assertions))]
                let _ = duration_ms;

                self.candles = outcome.candles;
                self.series_revision += 1;
                self.series_epoch = Some(self.view_epoch);
            }
            JobResult::Detection {
                epoch,
                label,
                manual,
                result,
                duration_ms,
            } => {
                self.checking = None;

                if epoch != self.view_epoch {
                    #[cfg(debug_assertions)]
                    if DF.log_detection {
                        log::info!("{} result from epoch {} dropped (now {})", label, epoch, self.view_epoch);
                    }
                    return;
                }

                #[cfg(debug_assertions)]
                if DF.log_detection {
                    log::info!("{} finished in {} ms", label, duration_ms);
                }
                #[cfg(not(debug_assertions))]
                let _ = duration_ms;

                self.apply_detection(&label, manual, result);
            }
        }
    }

    fn apply_detection(&mut self, label: &str, manual: bool, result: DetectionResult) {
        let banner = if manual {
            result.manual_banner()
        } else {
            result.banner(label)
        };
        let level = match (result.failed, result.found) {
            (true, _) => NoticeLevel::Error,
            (false, true) => NoticeLevel::Success,
            (false, false) => NoticeLevel::Info,
        };

        if !manual && !result.failed {
            self.replace_zones(result.zones);
        }
        self.notify(level, banner.clone());
        self.last_result = Some(banner);
    }
}
