//! 시그널 엔진의 기본 타입.

pub mod decimal;
pub mod symbol;
pub mod timeframe;

pub use decimal::{DecimalExt, Percentage, Price, Quantity};
pub use symbol::{MarketType, Symbol};
pub use timeframe::Timeframe;
