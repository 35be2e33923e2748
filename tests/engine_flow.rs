//! Drives `TrainerEngine` end to end against in-memory services.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::{Value, json};

use ict_trainer::config::{CategoryId, ModeId, Timeframe};
use ict_trainer::data::{DetectionTransport, MarketDataProvider};
use ict_trainer::engine::{NoticeLevel, TriggerError};
use ict_trainer::{AppConfig, TrainerEngine};

/// Serves `count` five-minute candles, or an error when `count` is None.
struct FakeMarket {
    count: Option<usize>,
    requests: Mutex<Vec<(Timeframe, usize)>>,
}

impl FakeMarket {
    fn new(count: Option<usize>) -> Arc<Self> {
        Arc::new(Self {
            count,
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl MarketDataProvider for FakeMarket {
    async fn fetch_raw_candles(&self, _instrument: &str, timeframe: Timeframe, amount: usize) -> Result<Value> {
        self.requests.lock().unwrap().push((timeframe, amount));
        let count = self.count.ok_or_else(|| anyhow!("connection refused"))?;
        // Hourly bars live in a different time range so the two views never share a candle.
        let base_ms = match timeframe {
            Timeframe::H1 => 1_800_000_000_000i64,
            _ => 1_700_000_000_000i64,
        };
        let rows: Vec<Value> = (0..count)
            .map(|i| {
                let open = 1.25 + i as f64 * 0.001;
                json!({
                    "timestamp": base_ms + i as i64 * 300_000,
                    "_open": open,
                    "high": open + 0.002,
                    "low": open - 0.002,
                    "close": open + 0.001,
                })
            })
            .collect();
        Ok(Value::Array(rows))
    }
}

/// Answers every endpoint with a fixed reply and records what was posted.
struct FakeService {
    posts: Mutex<Vec<(String, Value)>>,
}

impl FakeService {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            posts: Mutex::new(Vec::new()),
        })
    }

    fn posts(&self) -> Vec<(String, Value)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl DetectionTransport for FakeService {
    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.posts.lock().unwrap().push((endpoint.to_string(), body.clone()));
        Ok(match endpoint {
            "check_order_block" => json!({
                "ok": true,
                "matches": [{ "ob": { "time": 1_700_000_300i64, "low": 1.249, "high": 1.253 } }]
            }),
            "check_manual_ob" => json!({ "is_ob": true, "direction": "bullish", "reason": "" }),
            _ => json!({ "is_fvg": false, "reason": "no gap" }),
        })
    }
}

fn engine(mode: ModeId, market: Arc<FakeMarket>, service: Arc<FakeService>) -> TrainerEngine {
    TrainerEngine::new(AppConfig::default(), mode, Timeframe::M5, market, service)
}

/// Poll until `done` holds or five seconds pass.
fn poll_until(engine: &mut TrainerEngine, done: impl Fn(&TrainerEngine) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        engine.poll();
        if done(engine) {
            return;
        }
        assert!(Instant::now() < deadline, "engine did not settle in time");
        thread::sleep(Duration::from_millis(5));
    }
}

fn settled(e: &TrainerEngine) -> bool {
    !e.is_loading() && e.checking().is_none()
}

#[test]
fn order_block_check_draws_zones() {
    let market = FakeMarket::new(Some(43));
    let service = FakeService::new();
    let mut e = engine(ModeId::OrderBlock, market.clone(), service.clone());

    poll_until(&mut e, settled);
    assert_eq!(e.candles().len(), 43);
    assert_eq!(market.requests.lock().unwrap()[0], (Timeframe::M5, 43));

    e.trigger_action("bull_ob").unwrap();
    assert_eq!(e.checking(), Some("Bullish Order Block"));
    poll_until(&mut e, settled);

    let zones = e.zones();
    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0].low, 1.249);
    assert_eq!(e.last_result(), Some("Order Blocks · YES ✅"));

    let posts = service.posts();
    assert_eq!(posts[0].0, "check_order_block");
    assert_eq!(posts[0].1["direction"], "bullish");
    assert_eq!(posts[0].1["candles"].as_array().unwrap().len(), 43);
}

#[test]
fn second_trigger_while_checking_is_rejected() {
    let mut e = engine(ModeId::OrderBlock, FakeMarket::new(Some(43)), FakeService::new());
    poll_until(&mut e, settled);

    e.trigger_action("bear_ob").unwrap();
    assert_eq!(
        e.trigger_action("bull_ob"),
        Err(TriggerError::Busy("Bearish Order Block".to_string()))
    );
    poll_until(&mut e, settled);
}

#[test]
fn manual_confirm_posts_canonical_order_and_keeps_zones() {
    let service = FakeService::new();
    let mut e = engine(ModeId::OrderBlock, FakeMarket::new(Some(43)), service.clone());
    poll_until(&mut e, settled);
    let candles = e.candles().to_vec();

    // Tagged out of order on purpose.
    e.set_active_category(CategoryId::Displacement);
    e.toggle_candle(candles[20]).unwrap();
    e.set_active_category(CategoryId::Prior);
    e.toggle_candle(candles[10]).unwrap();
    e.toggle_candle(candles[11]).unwrap();
    e.set_active_category(CategoryId::Engulf);
    e.toggle_candle(candles[13]).unwrap();
    e.set_active_category(CategoryId::LastTrend);
    e.toggle_candle(candles[12]).unwrap();

    e.confirm_manual().unwrap();
    assert!(e.selection().is_empty());
    poll_until(&mut e, settled);

    let posts = service.posts();
    let (endpoint, body) = posts.last().unwrap();
    assert_eq!(endpoint, "check_manual_ob");
    let times: Vec<i64> = body["candles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["time"].as_i64().unwrap())
        .collect();
    let expected: Vec<i64> = [10, 11, 12, 13, 20].iter().map(|&i| candles[i].time).collect();
    assert_eq!(times, expected);

    assert!(e.zones().is_empty());
    assert_eq!(e.last_result(), Some("Manual OB · VALID BULLISH OB ✅"));
}

#[test]
fn manual_confirm_with_too_few_candles_never_posts() {
    let service = FakeService::new();
    let mut e = engine(ModeId::OrderBlock, FakeMarket::new(Some(43)), service.clone());
    poll_until(&mut e, settled);
    let first = e.candles()[0];
    e.toggle_candle(first).unwrap();

    assert!(matches!(e.confirm_manual(), Err(TriggerError::Selection(_))));
    assert_eq!(e.selection().len(), 1);
    assert!(service.posts().is_empty());
}

#[test]
fn timeframe_switch_discards_the_running_check() {
    let mut e = engine(ModeId::OrderBlock, FakeMarket::new(Some(43)), FakeService::new());
    poll_until(&mut e, settled);

    e.trigger_action("bull_ob").unwrap();
    e.set_timeframe(Timeframe::M15);
    poll_until(&mut e, settled);

    assert!(e.zones().is_empty());
    assert_eq!(e.last_result(), None);
    assert_eq!(e.timeframe(), Timeframe::M15);
    assert_eq!(e.candles().len(), 43);
}

#[test]
fn triggers_wait_for_the_new_view_to_load() {
    let service = FakeService::new();
    let mut e = engine(ModeId::OrderBlock, FakeMarket::new(Some(43)), service.clone());
    poll_until(&mut e, settled);
    let old = e.candles().to_vec();

    e.set_timeframe(Timeframe::H1);
    assert_eq!(e.trigger_action("bull_ob"), Err(TriggerError::Loading));
    assert_eq!(e.toggle_candle(old[0]), Err(TriggerError::Loading));
    assert_eq!(e.confirm_manual(), Err(TriggerError::Loading));
    assert!(service.posts().is_empty());

    poll_until(&mut e, settled);
    assert_eq!(e.candles()[0].time, 1_800_000_000);
    assert_eq!(e.toggle_candle(old[0]), Ok(None));
    assert!(e.selection().is_empty());

    e.trigger_action("bull_ob").unwrap();
    poll_until(&mut e, settled);
    let posts = service.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].1["candles"][0]["time"], 1_800_000_000i64);
    assert_eq!(e.zones().len(), 1);
}

#[test]
fn failed_fetch_surfaces_an_error_notice() {
    let mut e = engine(ModeId::Fvg, FakeMarket::new(None), FakeService::new());
    poll_until(&mut e, |e| !e.is_loading());

    assert!(e.candles().is_empty());
    let notices = e.take_notices();
    assert!(
        notices
            .iter()
            .any(|n| n.level == NoticeLevel::Error && n.text.contains("connection refused"))
    );
    assert_eq!(e.trigger_action("check_fvg"), Err(TriggerError::NoCandles));
}
