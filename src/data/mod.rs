mod normalizer;
mod provider;

pub use {
    normalizer::{CandleNormalizer, FetchOutcome, normalize},
    provider::{DetectionTransport, HttpTrainerClient, MarketDataProvider},
};
