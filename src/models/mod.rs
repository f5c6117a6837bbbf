mod candle;
mod period;
mod symbol;
pub mod indicators;

pub use candle::{Candle, Series};
pub use period::{day_count, interval_for, Granularity, Period, TimestampFormat};
pub use symbol::{AssetClass, SymbolRef};
