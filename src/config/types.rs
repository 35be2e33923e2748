//! Small shared enums (Immutable Blueprints)

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Candle timeframes offered in the toolbar.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, Display,
    Default,
)]
pub enum Timeframe {
    #[strum(to_string = "1m")]
    #[serde(rename = "1m")]
    M1,
    #[strum(to_string = "3m")]
    #[serde(rename = "3m")]
    M3,
    #[default]
    #[strum(to_string = "5m")]
    #[serde(rename = "5m")]
    M5,
    #[strum(to_string = "15m")]
    #[serde(rename = "15m")]
    M15,
    #[strum(to_string = "1h")]
    #[serde(rename = "1h")]
    H1,
}

impl Timeframe {
    /// The query value the candle endpoint expects (e.g. `5m`).
    pub fn as_query(&self) -> String {
        self.to_string()
    }
}

/// Pattern direction carried by actions, request bodies and zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    /// Lenient parse for response payloads ("bull", "Bullish", "LONG" ...).
    pub fn from_loose(text: &str) -> Option<Self> {
        let t = text.trim().to_ascii_lowercase();
        if t.starts_with("bull") || t == "long" || t == "buy" {
            Some(Self::Bullish)
        } else if t.starts_with("bear") || t == "short" || t == "sell" {
            Some(Self::Bearish)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn timeframe_query_strings() {
        let all: Vec<String> = Timeframe::iter().map(|tf| tf.as_query()).collect();
        assert_eq!(all, vec!["1m", "3m", "5m", "15m", "1h"]);
        assert_eq!(Timeframe::from_str("15m").unwrap(), Timeframe::M15);
        assert_eq!(Timeframe::default(), Timeframe::M5);
    }

    #[test]
    fn direction_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Direction::Bullish).unwrap(), "bullish");
        assert_eq!(Direction::Bearish.to_string(), "bearish");
        assert_eq!(Direction::from_loose("Bearish"), Some(Direction::Bearish));
        assert_eq!(Direction::from_loose("sideways"), None);
    }
}
