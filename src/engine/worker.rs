use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use tokio::runtime::Runtime;

use super::dispatcher::DetectionDispatcher;
use super::messages::{DetectionKind, JobRequest, JobResult};

use crate::data::CandleNormalizer;
use crate::utils::AppInstant;

/// Spawns the single background worker. Jobs run one at a time, in send order.
///
/// The thread exits when every `Sender<JobRequest>` is dropped.
pub fn spawn_worker_thread(
    rx: Receiver<JobRequest>,
    tx: Sender<JobResult>,
    normalizer: Arc<CandleNormalizer>,
    dispatcher: Arc<DetectionDispatcher>,
) {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Worker could not start its runtime: {}", e);
                return;
            }
        };
        while let Ok(req) = rx.recv() {
            let result = rt.block_on(process_request(req, &normalizer, &dispatcher));
            if tx.send(result).is_err() {
                // UI is gone.
                break;
            }
        }
    });
}

pub async fn process_request(
    req: JobRequest,
    normalizer: &CandleNormalizer,
    dispatcher: &DetectionDispatcher,
) -> JobResult {
    let start = AppInstant::now();
    match req {
        JobRequest::FetchCandles {
            seq,
            timeframe,
            amount,
        } => {
            let outcome = crate::trace_time!(&format!("Fetch #{} [{} x{}]", seq, timeframe, amount), 1_500_000, {
                normalizer.fetch(timeframe, amount).await
            });
            JobResult::Candles {
                seq,
                timeframe,
                outcome,
                duration_ms: start.elapsed().as_millis(),
            }
        }
        JobRequest::Detect { epoch, label, kind } => {
            let manual = matches!(kind, DetectionKind::Manual { .. });
            let result = crate::trace_time!(&format!("Detect [{}]", label), 1_500_000, {
                match &kind {
                    DetectionKind::Auto {
                        mode,
                        action,
                        candles,
                    } => match mode.action(action) {
                        Some(action) => dispatcher.run(mode, candles, action).await,
                        None => {
                            log::error!("{} has no action {}", mode.title, action);
                            super::DetectionResult::error()
                        }
                    },
                    DetectionKind::Manual { payload } => dispatcher.run_manual(payload).await,
                }
            });
            JobResult::Detection {
                epoch,
                label,
                manual,
                result,
                duration_ms: start.elapsed().as_millis(),
            }
        }
    }
}
