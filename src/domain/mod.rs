// Domain types and value objects
mod candle;
mod zone;

pub use candle::{Candle, CandleType, is_strictly_increasing};
pub use zone::ObZone;
