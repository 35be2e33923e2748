use serde::{Deserialize, Serialize};

// Define the CandleType enum
#[derive(Debug, PartialEq)]
pub enum CandleType {
    Bullish,
    Bearish,
}

/// One canonical OHLC bar. `time` (epoch seconds) is the identity key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Candle {
            time,
            open,
            high,
            low,
            close,
        }
    }

    // A method to determine the type of candle
    pub fn get_type(&self) -> CandleType {
        if self.close >= self.open {
            CandleType::Bullish
        } else {
            CandleType::Bearish
        }
    }

    // Returns the low and high of the candle body as a tuple
    pub fn body_range(&self) -> (f64, f64) {
        match self.get_type() {
            CandleType::Bullish => (self.open, self.close),
            CandleType::Bearish => (self.close, self.open),
        }
    }
}

impl std::fmt::Display for Candle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "O:{} H:{} L:{} C:{}",
            self.open, self.high, self.low, self.close
        )
    }
}

/// True when `time` strictly increases across the slice.
pub fn is_strictly_increasing(candles: &[Candle]) -> bool {
    candles.windows(2).all(|w| w[0].time < w[1].time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_range_orders_open_close() {
        let up = Candle::new(0, 1.0, 3.0, 0.5, 2.0);
        let down = Candle::new(60, 2.0, 3.0, 0.5, 1.0);
        assert_eq!(up.get_type(), CandleType::Bullish);
        assert_eq!(up.body_range(), (1.0, 2.0));
        assert_eq!(down.body_range(), (1.0, 2.0));
    }

    #[test]
    fn serializes_canonical_field_names() {
        let c = Candle::new(1_700_000_000, 1.25, 1.26, 1.24, 1.255);
        let v = serde_json::to_value(c).unwrap();
        assert_eq!(v["time"], 1_700_000_000);
        assert_eq!(v["open"], 1.25);
        assert!(v.get("_open").is_none());
    }

    #[test]
    fn strictly_increasing_check() {
        let a = Candle::new(1, 1.0, 1.0, 1.0, 1.0);
        let b = Candle::new(2, 1.0, 1.0, 1.0, 1.0);
        assert!(is_strictly_increasing(&[a, b]));
        assert!(!is_strictly_increasing(&[b, a]));
        assert!(!is_strictly_increasing(&[a, a]));
    }
}
