//! Remote detection service configuration

/// Hyperparameters the order-block endpoint always receives.
pub struct OrderBlockParams {
    pub require_displacement: bool,
    pub min_body_ratio: f64,
}

pub struct ClientDefaults {
    pub base_url: &'static str,
    pub timeout_ms: u64,
}

pub struct ManualLimits {
    /// Soft sanity floor for a manual confirm (3 prior + 1 + 1 + 3 displacement is the ideal).
    pub min_candles: usize,
}

pub struct TrainerApiConfig {
    pub client: ClientDefaults,
    /// Max candles kept after normalization (older ones are dropped).
    pub window: usize,
    pub instrument: &'static str,
    pub manual: ManualLimits,
    pub order_block: OrderBlockParams,
    pub manual_endpoint: &'static str,
    pub candles_endpoint: &'static str,
}

pub const TRAINER_API: TrainerApiConfig = TrainerApiConfig {
    client: ClientDefaults {
        base_url: "http://127.0.0.1:8000",
        timeout_ms: 15_000,
    },
    window: 200,
    instrument: "GBPUSD",
    manual: ManualLimits { min_candles: 5 },
    order_block: OrderBlockParams {
        require_displacement: true,
        min_body_ratio: 0.45,
    },
    manual_endpoint: "check_manual_ob",
    candles_endpoint: "get_candles",
};

/// Process-wide settings resolved once at start-up and handed to constructors.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub base_url: String,
    pub instrument: String,
    pub window: usize,
    pub timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: TRAINER_API.client.base_url.to_string(),
            instrument: TRAINER_API.instrument.to_string(),
            window: TRAINER_API.window,
            timeout_ms: TRAINER_API.client.timeout_ms,
        }
    }
}

impl AppConfig {
    /// `{base}/{endpoint}/` with exactly one slash between the parts.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}/", self.base_url.trim_end_matches('/'), endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_joins_cleanly() {
        let cfg = AppConfig {
            base_url: "http://localhost:9000/".into(),
            ..AppConfig::default()
        };
        assert_eq!(
            cfg.endpoint_url("check_fvg"),
            "http://localhost:9000/check_fvg/"
        );
    }
}
