use std::sync::Arc;

use anyhow::{Result, anyhow};
use serde_json::{Value, json};

use crate::config::{
    Direction, MANUAL_RESPONSE, MANUAL_TITLE, ModeAction, ModeConfig, RequestShape, ResponseShape,
    TRAINER_API,
};
use crate::data::DetectionTransport;
use crate::domain::{Candle, ObZone};
use crate::utils::{epoch_ms_to_sec, iso_to_epoch_ms};

#[cfg(debug_assertions)]
use crate::config::DF;

/// Uniform verdict for every endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionResult {
    pub found: bool,
    pub reason_text: String,
    pub zones: Vec<ObZone>,
    /// Direction reported by the service (manual check), if any.
    pub direction: Option<Direction>,
    /// Transport, server or decode failure. Distinct from "not found".
    pub failed: bool,
}

impl DetectionResult {
    pub fn error() -> Self {
        Self {
            found: false,
            reason_text: "error".to_string(),
            failed: true,
            ..Default::default()
        }
    }

    /// `"{title} · YES ✅"`, `"{title} · NO ❌ – reason"` or `"{title} · Error"`.
    pub fn banner(&self, title: &str) -> String {
        if self.failed {
            return format!("{} · Error", title);
        }
        if self.found {
            format!("{} · YES ✅", title)
        } else {
            format!("{} · NO ❌{}", title, reason_suffix(&self.reason_text))
        }
    }

    /// Banner for the manual confirm, which names the direction on success.
    pub fn manual_banner(&self) -> String {
        if self.failed {
            return format!("{} · Error", MANUAL_TITLE);
        }
        if self.found {
            match self.direction {
                Some(d) => format!("{} · VALID {} OB ✅", MANUAL_TITLE, d.to_string().to_uppercase()),
                None => format!("{} · VALID OB ✅", MANUAL_TITLE),
            }
        } else {
            format!("{} · NOT valid ❌{}", MANUAL_TITLE, reason_suffix(&self.reason_text))
        }
    }
}

fn reason_suffix(reason: &str) -> String {
    if reason.is_empty() {
        String::new()
    } else {
        format!(" – {}", reason)
    }
}

/// Builds mode-specific bodies, posts them, and folds the replies into a `DetectionResult`.
pub struct DetectionDispatcher {
    transport: Arc<dyn DetectionTransport>,
}

impl DetectionDispatcher {
    pub fn new(transport: Arc<dyn DetectionTransport>) -> Self {
        Self { transport }
    }

    /// Run one auto action of `mode` against `candles`. Never fails.
    pub async fn run(&self, mode: &ModeConfig, candles: &[Candle], action: &ModeAction) -> DetectionResult {
        let (endpoint, body) = match build_request(mode, candles, action) {
            Ok(req) => req,
            Err(e) => {
                log::error!("{} request could not be built: {:#}", mode.title, e);
                return DetectionResult::error();
            }
        };
        self.post_and_normalize(endpoint, &body, mode.response, action.direction)
            .await
    }

    /// Post an already ordered manual selection. Never fails.
    pub async fn run_manual(&self, payload: &[Candle]) -> DetectionResult {
        let body = match candles_body(payload) {
            Ok(body) => body,
            Err(e) => {
                log::error!("{} request could not be built: {:#}", MANUAL_TITLE, e);
                return DetectionResult::error();
            }
        };
        self.post_and_normalize(TRAINER_API.manual_endpoint, &body, MANUAL_RESPONSE, None)
            .await
    }

    async fn post_and_normalize(
        &self,
        endpoint: &str,
        body: &Value,
        shape: ResponseShape,
        requested: Option<Direction>,
    ) -> DetectionResult {
        match self.transport.post_json(endpoint, body).await {
            Ok(reply) => {
                let result = normalize_response(shape, &reply, requested);
                #[cfg(debug_assertions)]
                if DF.log_detection {
                    log::info!(
                        "{} -> found={} zones={} reason={:?}",
                        endpoint,
                        result.found,
                        result.zones.len(),
                        result.reason_text
                    );
                }
                result
            }
            Err(e) => {
                log::error!("Detection via {} failed: {:#}", endpoint, e);
                DetectionResult::error()
            }
        }
    }
}

fn candles_body(candles: &[Candle]) -> Result<Value> {
    Ok(json!({ "candles": serde_json::to_value(candles)? }))
}

/// Endpoint and exact JSON body for one auto action.
pub fn build_request(mode: &ModeConfig, candles: &[Candle], action: &ModeAction) -> Result<(&'static str, Value)> {
    let mut body = candles_body(candles)?;

    if mode.request != RequestShape::CandlesOnly {
        let direction = action
            .direction
            .ok_or_else(|| anyhow!("action {} of {} has no direction", action.key, mode.id))?;
        body["direction"] = json!(direction);
    }
    if mode.request == RequestShape::OrderBlock {
        body["require_displacement"] = json!(TRAINER_API.order_block.require_displacement);
        body["min_body_ratio"] = json!(TRAINER_API.order_block.min_body_ratio);
    }

    Ok((mode.endpoint, body))
}

/// Fold one endpoint's reply into the uniform result, keyed by its response shape.
pub fn normalize_response(shape: ResponseShape, reply: &Value, requested: Option<Direction>) -> DetectionResult {
    let reason = |v: &Value| v.as_str().unwrap_or_default().to_string();

    match shape {
        ResponseShape::FlagWithReason => DetectionResult {
            found: truthy(&reply["is_fvg"]) || truthy(&reply["found"]) || truthy(&reply["success"]),
            reason_text: reason(&reply["reason"]),
            ..Default::default()
        },
        ResponseShape::OrderBlockMatches => {
            let matches = reply["matches"].as_array().map(Vec::as_slice).unwrap_or(&[]);
            let found = truthy(&reply["ok"]) && !matches.is_empty();
            let zones = if found {
                matches.iter().filter_map(|m| parse_zone(m, requested)).collect()
            } else {
                Vec::new()
            };
            DetectionResult {
                found,
                reason_text: reason(&reply["reason"]),
                zones,
                ..Default::default()
            }
        }
        ResponseShape::OkWithInfo => {
            let info_reason = reason(&reply["info"]["reason"]);
            DetectionResult {
                found: truthy(&reply["ok"]),
                reason_text: if info_reason.is_empty() {
                    reason(&reply["reason"])
                } else {
                    info_reason
                },
                ..Default::default()
            }
        }
        ResponseShape::ManualOrderBlock => DetectionResult {
            found: truthy(&reply["is_ob"]),
            reason_text: reason(&reply["reason"]),
            direction: reply["direction"].as_str().and_then(Direction::from_loose),
            ..Default::default()
        },
    }
}

// JSON truthiness: true, non-zero numbers and non-empty strings.
fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    }
}

fn parse_zone(m: &Value, requested: Option<Direction>) -> Option<ObZone> {
    let ob = &m["ob"];
    let direction = m["direction"]
        .as_str()
        .and_then(Direction::from_loose)
        .or(requested)?;
    let low = ob["low"].as_f64()?;
    let high = ob["high"].as_f64()?;
    let time = match &ob["time"] {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => iso_to_epoch_ms(s).map(epoch_ms_to_sec)?,
        _ => return None,
    };
    Some(ObZone {
        direction,
        time,
        low,
        high,
    })
}
