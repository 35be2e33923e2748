use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde_json::Value;

use crate::config::{AppConfig, TRAINER_API, Timeframe};

/// Abstract interface for fetching raw (un-normalized) candle payloads.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_raw_candles(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        amount: usize,
    ) -> Result<Value>;
}

/// Abstract interface for the remote pattern checks.
#[async_trait]
pub trait DetectionTransport: Send + Sync {
    /// POST `body` to `endpoint` and return the decoded JSON reply.
    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value>;
}

/// The real service: one reqwest client shared by candle fetches and checks.
pub struct HttpTrainerClient {
    config: AppConfig,
    http: reqwest::Client,
}

impl HttpTrainerClient {
    pub fn new(config: AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(concat!("ict-trainer/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self { config, http })
    }

    async fn read_json(resp: reqwest::Response, what: &str) -> Result<Value> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("{} returned HTTP {}: {}", what, status, body.trim());
        }
        resp.json::<Value>()
            .await
            .with_context(|| format!("{} returned invalid JSON", what))
    }
}

#[async_trait]
impl MarketDataProvider for HttpTrainerClient {
    async fn fetch_raw_candles(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        amount: usize,
    ) -> Result<Value> {
        let url = self.config.endpoint_url(TRAINER_API.candles_endpoint);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("instrument", instrument.to_string()),
                ("timeframe", timeframe.as_query()),
                ("amount", amount.to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        Self::read_json(resp, TRAINER_API.candles_endpoint).await
    }
}

#[async_trait]
impl DetectionTransport for HttpTrainerClient {
    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let url = self.config.endpoint_url(endpoint);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;

        Self::read_json(resp, endpoint).await
    }
}
