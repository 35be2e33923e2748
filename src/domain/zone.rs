use serde::{Deserialize, Serialize};

use crate::config::Direction;

/// A detected order-block price range, drawn as an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObZone {
    pub direction: Direction,
    pub time: i64,
    pub low: f64,
    pub high: f64,
}

impl ObZone {
    pub fn label(&self) -> &'static str {
        match self.direction {
            Direction::Bullish => "Bullish OB",
            Direction::Bearish => "Bearish OB",
        }
    }
}
