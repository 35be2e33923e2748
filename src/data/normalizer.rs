use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use itertools::Itertools;
use serde_json::{Map, Value};

use crate::config::{AppConfig, Timeframe};
use crate::data::MarketDataProvider;
use crate::domain::{Candle, is_strictly_increasing};
use crate::utils::{epoch_ms_to_sec, iso_to_epoch_ms};

#[cfg(debug_assertions)]
use crate::config::DF;

/// Result of one fetch. A failure is carried as `error` next to an empty series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub candles: Vec<Candle>,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            candles: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Fetches raw candle payloads and turns them into a canonical, windowed series.
pub struct CandleNormalizer {
    provider: Arc<dyn MarketDataProvider>,
    instrument: String,
    window: usize,
}

impl CandleNormalizer {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: &AppConfig) -> Self {
        Self {
            provider,
            instrument: config.instrument.clone(),
            window: config.window,
        }
    }

    /// Never fails: network and parse errors come back as an empty outcome.
    pub async fn fetch(&self, timeframe: Timeframe, amount: usize) -> FetchOutcome {
        let raw = match self
            .provider
            .fetch_raw_candles(&self.instrument, timeframe, amount)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Error fetching candles ({} {}): {:#}", self.instrument, timeframe, e);
                return FetchOutcome::failed(format!("{:#}", e));
            }
        };

        match normalize(&raw, self.window) {
            Ok(candles) => {
                #[cfg(debug_assertions)]
                if DF.log_fetch {
                    log::info!(
                        "Normalized {} candles for {} {} (window {})",
                        candles.len(),
                        self.instrument,
                        timeframe,
                        self.window
                    );
                }
                FetchOutcome {
                    candles,
                    error: None,
                }
            }
            Err(e) => {
                log::error!("Error parsing candles ({} {}): {:#}", self.instrument, timeframe, e);
                FetchOutcome::failed(format!("{:#}", e))
            }
        }
    }
}

/// Flat or singly-nested array of candle-like records -> last `window` canonical candles,
/// strictly increasing in `time`.
pub fn normalize(payload: &Value, window: usize) -> Result<Vec<Candle>> {
    let items = payload
        .as_array()
        .ok_or_else(|| anyhow!("candle payload is not an array"))?;

    let flat: Vec<&Value> = if items.first().is_some_and(Value::is_array) {
        items
            .iter()
            .flat_map(|item| match item {
                Value::Array(inner) => inner.iter().collect::<Vec<_>>(),
                other => vec![other],
            })
            .collect()
    } else {
        items.iter().collect()
    };

    let mut candles = flat
        .iter()
        .enumerate()
        .map(|(i, record)| parse_record(record).with_context(|| format!("record {}", i)))
        .collect::<Result<Vec<Candle>>>()?;

    if !is_strictly_increasing(&candles) {
        log::warn!("Candle times are out of order or repeated; sorting and keeping the last of each time");
        candles = sort_unique_by_time(candles);
    }

    let start = candles.len().saturating_sub(window);
    Ok(candles.split_off(start))
}

// Stable sort, so the later record wins a repeated time.
fn sort_unique_by_time(candles: Vec<Candle>) -> Vec<Candle> {
    candles
        .into_iter()
        .sorted_by_key(|c| c.time)
        .coalesce(|a, b| if a.time == b.time { Ok(b) } else { Err((a, b)) })
        .collect()
}

fn parse_record(record: &Value) -> Result<Candle> {
    let obj = record
        .as_object()
        .ok_or_else(|| anyhow!("record is not an object"))?;

    Ok(Candle {
        time: parse_time(obj)?,
        open: parse_number(obj, &["_open", "open"])?,
        high: parse_number(obj, &["high"])?,
        low: parse_number(obj, &["low"])?,
        close: parse_number(obj, &["close"])?,
    })
}

// `timestamp` is ISO text or epoch millis; a bare `time` is already epoch seconds.
fn parse_time(obj: &Map<String, Value>) -> Result<i64> {
    if let Some(ts) = obj.get("timestamp") {
        let ms = match ts {
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .ok()
                .or_else(|| iso_to_epoch_ms(s))
                .ok_or_else(|| anyhow!("invalid timestamp {:?}", s))?,
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                .ok_or_else(|| anyhow!("invalid timestamp {}", n))?,
            other => bail!("invalid timestamp {}", other),
        };
        return Ok(epoch_ms_to_sec(ms));
    }

    obj.get("time")
        .and_then(|t| t.as_i64().or_else(|| t.as_f64().map(|f| f.trunc() as i64)))
        .ok_or_else(|| anyhow!("missing timestamp"))
}

fn parse_number(obj: &Map<String, Value>, keys: &[&str]) -> Result<f64> {
    for key in keys {
        if let Some(val) = obj.get(*key) {
            if let Some(n) = val.as_f64() {
                return Ok(n);
            }
            if let Some(n) = val.as_str().and_then(|s| s.trim().parse::<f64>().ok()) {
                return Ok(n);
            }
        }
    }
    Err(anyhow!("missing numeric field {:?}", keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    fn raw(ts: &str, open: f64) -> Value {
        json!({ "timestamp": ts, "_open": open, "high": open + 1.0, "low": open - 1.0, "close": open + 0.5 })
    }

    #[test]
    fn maps_iso_timestamp_and_renames_open() {
        let payload = json!([raw("2024-03-01T10:15:00Z", 1.5)]);
        let out = normalize(&payload, 200).unwrap();
        assert_eq!(out, vec![Candle::new(1_709_288_100, 1.5, 2.5, 0.5, 2.0)]);
    }

    #[test]
    fn epoch_millis_truncate_to_seconds() {
        let payload = json!([{ "timestamp": 1_709_288_100_999i64, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5 }]);
        assert_eq!(normalize(&payload, 200).unwrap()[0].time, 1_709_288_100);
    }

    #[test]
    fn flattens_one_level_of_nesting() {
        let payload = json!([
            [raw("2024-03-01T10:00:00Z", 1.0), raw("2024-03-01T10:05:00Z", 2.0)],
            [raw("2024-03-01T10:10:00Z", 3.0)]
        ]);
        let out = normalize(&payload, 200).unwrap();
        assert_eq!(out.iter().map(|c| c.open).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn keeps_only_the_newest_window() {
        let payload = Value::Array(
            (0..10)
                .map(|i| json!({ "time": i * 60, "open": i as f64, "high": 1.0, "low": 0.0, "close": 0.5 }))
                .collect(),
        );
        let out = normalize(&payload, 4).unwrap();
        assert_eq!(out.iter().map(|c| c.time).collect::<Vec<_>>(), vec![360, 420, 480, 540]);
    }

    #[test]
    fn unordered_and_repeated_times_are_sorted_and_deduplicated() {
        let bar = |time: i64, open: f64| json!({ "time": time, "open": open, "high": 9.0, "low": 0.0, "close": 1.0 });
        let payload = json!([bar(600, 1.0), bar(0, 2.0), bar(300, 3.0), bar(600, 4.0), bar(900, 5.0)]);

        let out = normalize(&payload, 3).unwrap();
        assert_eq!(out.iter().map(|c| c.time).collect::<Vec<_>>(), vec![300, 600, 900]);
        // The later of the two 600 records wins.
        assert_eq!(out[1].open, 4.0);
    }

    #[test]
    fn empty_array_is_a_valid_empty_series() {
        assert!(normalize(&json!([]), 200).unwrap().is_empty());
    }

    #[test]
    fn non_array_and_broken_records_fail() {
        assert!(normalize(&json!({ "detail": "nope" }), 200).is_err());
        assert!(normalize(&json!([{ "timestamp": "soon", "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0 }]), 200).is_err());
        assert!(normalize(&json!([{ "timestamp": 0, "high": 1.0, "low": 1.0, "close": 1.0 }]), 200).is_err());
    }

    struct StaticProvider(Result<Value, String>);

    #[async_trait]
    impl MarketDataProvider for StaticProvider {
        async fn fetch_raw_candles(&self, _: &str, _: Timeframe, _: usize) -> Result<Value> {
            self.0.clone().map_err(|e| anyhow!(e))
        }
    }

    #[tokio::test]
    async fn fetch_failure_becomes_empty_outcome_with_error() {
        let normalizer = CandleNormalizer::new(
            Arc::new(StaticProvider(Err("connection refused".into()))),
            &AppConfig::default(),
        );
        let out = normalizer.fetch(Timeframe::M5, 43).await;
        assert!(out.candles.is_empty());
        assert!(out.error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn fetch_parse_failure_becomes_empty_outcome_with_error() {
        let normalizer = CandleNormalizer::new(
            Arc::new(StaticProvider(Ok(json!("oops")))),
            &AppConfig::default(),
        );
        let out = normalizer.fetch(Timeframe::M1, 3).await;
        assert!(out.is_failure());
        assert!(out.candles.is_empty());
    }

    #[tokio::test]
    async fn fetch_success_uses_configured_window() {
        let payload = Value::Array(
            (0..5)
                .map(|i| json!({ "time": i, "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0 }))
                .collect(),
        );
        let cfg = AppConfig {
            window: 2,
            ..AppConfig::default()
        };
        let normalizer = CandleNormalizer::new(Arc::new(StaticProvider(Ok(payload))), &cfg);
        let out = normalizer.fetch(Timeframe::H1, 5).await;
        assert_eq!(out.error, None);
        assert_eq!(out.candles.iter().map(|c| c.time).collect::<Vec<_>>(), vec![3, 4]);
    }
}
