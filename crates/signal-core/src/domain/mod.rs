//! 시그널 엔진의 도메인 모델.
//!
//! 모든 도메인 타입은 값 객체입니다. 계산 시점에 생성되고 갱신되지 않으며,
//! 영속화는 외부 협력자의 책임입니다.

pub mod level;
pub mod market_data;
pub mod pattern;
pub mod provider;
pub mod score;
pub mod trend;

pub use level::*;
pub use market_data::*;
pub use pattern::*;
pub use provider::*;
pub use score::*;
pub use trend::*;
