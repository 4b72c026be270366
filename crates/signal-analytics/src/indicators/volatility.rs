//! 변동성 지표 (Volatility Indicators).
//!
//! - Bollinger Bands
//! - 단순 수익률의 모표준편차 (레벨 반폭 계산 등에 사용)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use signal_core::DecimalExt;

use super::{IndicatorError, IndicatorResult};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsParams {
    /// 이동평균 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_dev_multiplier: Decimal,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: dec!(2.0),
        }
    }
}

/// 볼린저 밴드 결과 한 지점.
///
/// 불변식: `upper >= middle >= lower`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsResult {
    /// 상단 밴드 (중간 + 표준편차 × 배수).
    pub upper: Decimal,
    /// 중간 밴드 (SMA).
    pub middle: Decimal,
    /// 하단 밴드 (중간 - 표준편차 × 배수).
    pub lower: Decimal,
}

impl BollingerBandsResult {
    /// 밴드 폭 비율 ((상단 - 하단) / 중간).
    pub fn width(&self) -> Decimal {
        if self.middle.is_zero() {
            return Decimal::ZERO;
        }
        (self.upper - self.lower) / self.middle
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    /// 새로운 변동성 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 볼린저 밴드 계산.
    ///
    /// 중간 = SMA(period), 표준편차는 같은 창의 모표준편차
    /// (period로 나눔, period-1 아님), 상단/하단 = 중간 ± 편차 × 배수.
    ///
    /// 입력이 기간보다 짧으면 빈 벡터를 반환합니다.
    ///
    /// # 에러
    ///
    /// 배수가 음수이면 `InvalidParameter` (밴드가 뒤집히는 것을 방지).
    pub fn bollinger_bands(
        &self,
        prices: &[Decimal],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        if params.std_dev_multiplier < Decimal::ZERO {
            return Err(IndicatorError::InvalidParameter(
                "표준편차 배수는 음수일 수 없습니다".to_string(),
            ));
        }

        let period = params.period;
        if period == 0 || prices.len() < period {
            return Ok(Vec::new());
        }

        let period_decimal = Decimal::from(period);
        let mut result = Vec::with_capacity(prices.len() - period + 1);

        for i in period - 1..prices.len() {
            let window = &prices[i + 1 - period..=i];
            let middle: Decimal = window.iter().sum::<Decimal>() / period_decimal;

            let variance: Decimal = window
                .iter()
                .map(|p| {
                    let diff = *p - middle;
                    diff * diff
                })
                .sum::<Decimal>()
                / period_decimal;
            let std_dev = variance.sqrt_approx();

            let band = std_dev * params.std_dev_multiplier;
            result.push(BollingerBandsResult {
                upper: middle + band,
                middle,
                lower: middle - band,
            });
        }

        Ok(result)
    }

    /// 단순 수익률의 모표준편차 계산.
    ///
    /// r_i = (p_i - p_{i-1}) / p_{i-1} 를 전체 시리즈에 대해 구한 뒤
    /// 모표준편차를 반환합니다. 시리즈가 2개 미만이면 0입니다.
    pub fn returns_volatility(&self, prices: &[Decimal]) -> Decimal {
        if prices.len() < 2 {
            return Decimal::ZERO;
        }

        let returns: Vec<Decimal> = prices
            .windows(2)
            .filter(|pair| !pair[0].is_zero())
            .map(|pair| (pair[1] - pair[0]) / pair[0])
            .collect();

        if returns.is_empty() {
            return Decimal::ZERO;
        }

        let n = Decimal::from(returns.len());
        let mean: Decimal = returns.iter().sum::<Decimal>() / n;
        let variance: Decimal = returns
            .iter()
            .map(|r| {
                let diff = *r - mean;
                diff * diff
            })
            .sum::<Decimal>()
            / n;

        variance.sqrt_approx()
    }
}
