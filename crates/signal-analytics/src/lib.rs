//! 정량 분석 엔진.
//!
//! 이 크레이트는 캔들 시리즈로부터 기술적 분석 시그널을 생성하는
//! 다섯 개의 순수 계산 엔진을 제공합니다:
//!
//! - [`indicators`]: 지표 엔진 (SMA/EMA/MACD/RSI/스토캐스틱/볼린저 등)
//! - [`levels`]: 레벨 엔진 (스윙 기반 지지/저항 발견 및 병합)
//! - [`patterns`]: 패턴 엔진 (박스권/돌파/추세 구간 감지)
//! - [`multi_timeframe`]: 추세 집계기 (타임프레임별 분류 + 가중 융합)
//! - [`comprehensive`]: 종합 스코어러 (추세/모멘텀/변동성 점수 + 신호)
//!
//! 모든 엔진은 동일 입력에 대해 결정적이며 공유 가변 상태를 갖지 않습니다.
//! 캔들 수집·캐싱·영속화는 [`signal_core::CandleProvider`] 뒤의 외부
//! 협력자가 담당하고, [`analyzer::MarketAnalyzer`]가 그 경계를 연결합니다.

pub mod analyzer;
pub mod comprehensive;
pub mod indicators;
pub mod levels;
pub mod multi_timeframe;
pub mod patterns;

pub use analyzer::{ComprehensiveAnalysis, MarketAnalyzer};
pub use comprehensive::ComprehensiveScorer;
pub use indicators::{
    BollingerBandsParams,
    BollingerBandsResult,
    EmaParams,
    IndicatorEngine,
    IndicatorError,
    IndicatorResult,
    MacdParams,
    MacdResult,
    MomentumCalculator,
    MomentumParams,
    RsiParams,
    SmaParams,
    StochasticParams,
    StochasticResult,
    TrendIndicators,
    VolatilityIndicators,
    WilliamsRParams,
};
pub use levels::LevelEngine;
pub use multi_timeframe::TrendAggregator;
pub use patterns::{
    BoxDetector, BreakoutDetector, PatternDetector, PatternEngine, PatternError,
    PatternRecognition, ReversalDetector, TrendRunDetector,
};
