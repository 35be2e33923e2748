//! Debugging feature flags.

pub struct LogFlags {
    /// Candle requests, sequence numbers and stale drops.
    pub log_fetch: bool,

    /// Detection payloads and normalized results.
    pub log_detection: bool,

    /// Anything about the manual role selection.
    pub log_selection: bool,

    /// Series/overlay pushes and click resolution in the chart controller.
    pub log_chart: bool,

    /// Activate trace_time macro (for scope-level timing)
    pub log_performance: bool,
}

pub const DF: LogFlags = LogFlags {
    log_fetch: true,
    log_detection: true,
    log_selection: false,
    log_chart: false,
    log_performance: false,
};
