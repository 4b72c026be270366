//! 기술적 지표 모듈.
//!
//! 이 모듈은 캔들 시리즈에 대한 순수 수치 함수들을 제공합니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **SMA**: 단순 이동평균 (Simple Moving Average)
//! - **EMA**: 지수 이동평균 (Exponential Moving Average)
//! - **MACD**: 이동평균 수렴/확산 (Moving Average Convergence Divergence)
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수 (Wilder 평활)
//! - **Stochastic**: 스토캐스틱 오실레이터
//! - **Williams %R**: 윌리엄스 퍼센트 레인지
//! - **Momentum**: 가격 변화율
//!
//! ## 변동성 지표 (Volatility Indicators)
//! - **Bollinger Bands**: 볼린저 밴드
//! - **수익률 변동성**: 단순 수익률의 모표준편차
//!
//! # 계약
//!
//! 입력 길이가 지표의 최소 요구 길이보다 짧으면 **빈 벡터**를 반환합니다.
//! 이는 에러가 아니라 정상적인 빈 결과입니다. 출력은 시리즈 끝에 정렬되며,
//! 룩백을 만족하지 못하는 앞쪽 캔들은 탈락합니다. NaN/Infinity 입력은
//! 필터링하지 않고 그대로 전파합니다 (상류 데이터 품질 버그 신호).
//!
//! # 사용 예시
//!
//! ```ignore
//! use signal_analytics::indicators::{IndicatorEngine, RsiParams, SmaParams};
//!
//! let engine = IndicatorEngine::new();
//! let sma = engine.sma(&closes, SmaParams { period: 20 });
//! let rsi = engine.rsi(&closes, RsiParams { period: 14 });
//! ```

pub mod momentum;
pub mod trend;
pub mod volatility;

use rust_decimal::Decimal;
use thiserror::Error;

pub use momentum::{
    MomentumCalculator, MomentumParams, RsiParams, StochasticParams, StochasticResult,
    WilliamsRParams,
};
pub use trend::{EmaParams, MacdParams, MacdResult, SmaParams, TrendIndicators};
pub use volatility::{BollingerBandsParams, BollingerBandsResult, VolatilityIndicators};

/// 지표 계산 오류.
///
/// 데이터 부족은 오류가 아니라 빈 결과이므로 여기에 포함되지 않습니다.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 통합 지표 엔진.
///
/// 모든 기술적 지표 계산을 위한 통합 인터페이스를 제공합니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 단순 이동평균. [`TrendIndicators::sma`] 참조.
    pub fn sma(&self, prices: &[Decimal], params: SmaParams) -> Vec<Decimal> {
        self.trend.sma(prices, params)
    }

    /// 지수 이동평균. [`TrendIndicators::ema`] 참조.
    pub fn ema(&self, prices: &[Decimal], params: EmaParams) -> Vec<Decimal> {
        self.trend.ema(prices, params)
    }

    /// MACD. [`TrendIndicators::macd`] 참조.
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> Vec<MacdResult> {
        self.trend.macd(prices, params)
    }

    /// RSI. [`MomentumCalculator::rsi`] 참조.
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> Vec<Decimal> {
        self.momentum.rsi(prices, params)
    }

    /// 스토캐스틱. [`MomentumCalculator::stochastic`] 참조.
    pub fn stochastic(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: StochasticParams,
    ) -> Vec<StochasticResult> {
        self.momentum.stochastic(high, low, close, params)
    }

    /// Williams %R. [`MomentumCalculator::williams_r`] 참조.
    pub fn williams_r(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: WilliamsRParams,
    ) -> Vec<Decimal> {
        self.momentum.williams_r(high, low, close, params)
    }

    /// 모멘텀 (가격 변화율). [`MomentumCalculator::momentum`] 참조.
    pub fn momentum(&self, prices: &[Decimal], params: MomentumParams) -> Vec<Decimal> {
        self.momentum.momentum(prices, params)
    }

    /// 볼린저 밴드. [`VolatilityIndicators::bollinger_bands`] 참조.
    pub fn bollinger_bands(
        &self,
        prices: &[Decimal],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        self.volatility.bollinger_bands(prices, params)
    }

    /// 단순 수익률의 모표준편차. [`VolatilityIndicators::returns_volatility`] 참조.
    pub fn returns_volatility(&self, prices: &[Decimal]) -> Decimal {
        self.volatility.returns_volatility(prices)
    }
}
