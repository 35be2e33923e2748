use crate::config::{ModeConfig, Timeframe};
use crate::data::FetchOutcome;
use crate::domain::Candle;

use super::dispatcher::DetectionResult;

/// What a detection job should check.
#[derive(Debug, Clone)]
pub enum DetectionKind {
    /// A mode button: the mode row decides endpoint and body.
    Auto {
        mode: &'static ModeConfig,
        action: &'static str,
        candles: Vec<Candle>,
    },
    /// The manual confirm, already in canonical role order.
    Manual { payload: Vec<Candle> },
}

/// Work for the background worker. Processed strictly in send order.
#[derive(Debug, Clone)]
pub enum JobRequest {
    FetchCandles {
        seq: u64,
        timeframe: Timeframe,
        amount: usize,
    },
    Detect {
        /// View epoch at issue time.
        epoch: u64,
        /// Banner title, e.g. "Order Blocks" or "Manual OB".
        label: String,
        kind: DetectionKind,
    },
}

/// The result returned by the worker
#[derive(Debug, Clone)]
pub enum JobResult {
    Candles {
        seq: u64,
        timeframe: Timeframe,
        outcome: FetchOutcome,
        duration_ms: u128,
    },
    Detection {
        epoch: u64,
        label: String,
        /// Manual confirms never touch the zone overlay.
        manual: bool,
        result: DetectionResult,
        duration_ms: u128,
    },
}
