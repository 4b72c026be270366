//! 모멘텀 지표 (Momentum Indicators).
//!
//! 가격 모멘텀과 과매수/과매도 상태를 측정하는 지표들을 제공합니다.
//! - RSI (Relative Strength Index, Wilder 평활)
//! - Stochastic Oscillator
//! - Williams %R
//! - 가격 변화율 모멘텀

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 스토캐스틱 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StochasticParams {
    /// %K 기간 (기본: 14).
    pub k_period: usize,
    /// %D 기간 (smoothing, 기본: 3).
    pub d_period: usize,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

/// 스토캐스틱 결과 한 지점.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StochasticResult {
    /// %K (Fast Stochastic).
    pub k: Decimal,
    /// %D (%K의 SMA).
    pub d: Decimal,
}

/// Williams %R 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WilliamsRParams {
    /// 관찰 기간 (기본: 14).
    pub period: usize,
}

impl Default for WilliamsRParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 모멘텀 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MomentumParams {
    /// 비교 기간 (기본: 10).
    pub period: usize,
}

impl Default for MomentumParams {
    fn default() -> Self {
        Self { period: 10 }
    }
}

/// 0으로 나누기 방지를 위한 평균 하락폭 하한.
const LOSS_FLOOR: Decimal = dec!(0.0001);

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// Wilder 평활 방식:
    /// - 초기 avgGain/avgLoss는 최초 `period`개 상승폭/하락폭의 단순 평균
    /// - 이후 avg = (avg × (period - 1) + 신규값) / period
    /// - RS = avgGain / avgLoss (하락폭 하한 0.0001), RSI = 100 - 100/(1+RS)
    ///
    /// 출력 길이는 `len - period`이며 항상 [0, 100] 범위입니다.
    /// 입력이 `period + 1`보다 짧으면 빈 벡터를 반환합니다.
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> Vec<Decimal> {
        let period = params.period;

        if period == 0 || prices.len() < period + 1 {
            return Vec::new();
        }

        // 상승폭/하락폭 분리
        let mut gains = Vec::with_capacity(prices.len() - 1);
        let mut losses = Vec::with_capacity(prices.len() - 1);
        for pair in prices.windows(2) {
            let delta = pair[1] - pair[0];
            if delta > Decimal::ZERO {
                gains.push(delta);
                losses.push(Decimal::ZERO);
            } else {
                gains.push(Decimal::ZERO);
                losses.push(-delta);
            }
        }

        let period_decimal = Decimal::from(period);
        let prev_decimal = Decimal::from(period - 1);

        // 초기 평균은 단순 평균으로 시작
        let mut avg_gain: Decimal = gains[..period].iter().sum::<Decimal>() / period_decimal;
        let mut avg_loss: Decimal = losses[..period].iter().sum::<Decimal>() / period_decimal;

        let mut result = Vec::with_capacity(prices.len() - period);
        result.push(Self::rsi_value(avg_gain, avg_loss));

        for i in period..gains.len() {
            avg_gain = (avg_gain * prev_decimal + gains[i]) / period_decimal;
            avg_loss = (avg_loss * prev_decimal + losses[i]) / period_decimal;
            result.push(Self::rsi_value(avg_gain, avg_loss));
        }

        result
    }

    /// 평균 상승폭/하락폭에서 RSI 값을 계산합니다.
    fn rsi_value(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
        let loss = avg_loss.max(LOSS_FLOOR);
        let rs = avg_gain / loss;
        dec!(100) - (dec!(100) / (Decimal::ONE + rs))
    }

    /// 스토캐스틱 오실레이터 계산.
    ///
    /// %K = (종가 - 기간 최저가) / (기간 최고가 - 기간 최저가) × 100
    /// %D = %K의 SMA(d_period)
    ///
    /// 결과는 %D가 계산 가능한 지점부터 끝 정렬됩니다.
    pub fn stochastic(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: StochasticParams,
    ) -> Vec<StochasticResult> {
        let len = high.len().min(low.len()).min(close.len());

        if params.k_period == 0 || params.d_period == 0 {
            return Vec::new();
        }
        if len < params.k_period + params.d_period - 1 {
            return Vec::new();
        }

        // %K 시리즈
        let mut k_series = Vec::with_capacity(len - params.k_period + 1);
        for i in params.k_period - 1..len {
            let window = i + 1 - params.k_period..=i;
            let highest = high[window.clone()].iter().copied().fold(high[i], Decimal::max);
            let lowest = low[window].iter().copied().fold(low[i], Decimal::min);
            let range = highest - lowest;

            let k = if range.is_zero() {
                dec!(50)
            } else {
                (close[i] - lowest) / range * dec!(100)
            };
            k_series.push(k);
        }

        // %D = %K의 SMA
        let d_decimal = Decimal::from(params.d_period);
        let mut result = Vec::with_capacity(k_series.len() - params.d_period + 1);
        for i in params.d_period - 1..k_series.len() {
            let d: Decimal =
                k_series[i + 1 - params.d_period..=i].iter().sum::<Decimal>() / d_decimal;
            result.push(StochasticResult { k: k_series[i], d });
        }

        result
    }

    /// Williams %R 계산.
    ///
    /// %R = (기간 최고가 - 종가) / (기간 최고가 - 기간 최저가) × -100
    ///
    /// 출력은 [-100, 0] 범위입니다.
    pub fn williams_r(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: WilliamsRParams,
    ) -> Vec<Decimal> {
        let len = high.len().min(low.len()).min(close.len());

        if params.period == 0 || len < params.period {
            return Vec::new();
        }

        let mut result = Vec::with_capacity(len - params.period + 1);
        for i in params.period - 1..len {
            let window = i + 1 - params.period..=i;
            let highest = high[window.clone()].iter().copied().fold(high[i], Decimal::max);
            let lowest = low[window].iter().copied().fold(low[i], Decimal::min);
            let range = highest - lowest;

            let r = if range.is_zero() {
                dec!(-50)
            } else {
                (highest - close[i]) / range * dec!(-100)
            };
            result.push(r);
        }

        result
    }

    /// 모멘텀 (가격 변화율) 계산.
    ///
    /// momentum = (close[i] - close[i - period]) / close[i - period] × 100
    ///
    /// 입력이 `period + 1`보다 짧으면 빈 벡터를 반환합니다.
    pub fn momentum(&self, prices: &[Decimal], params: MomentumParams) -> Vec<Decimal> {
        let period = params.period;

        if period == 0 || prices.len() < period + 1 {
            return Vec::new();
        }

        let mut result = Vec::with_capacity(prices.len() - period);
        for i in period..prices.len() {
            let base = prices[i - period];
            if base.is_zero() {
                result.push(Decimal::ZERO);
            } else {
                result.push((prices[i] - base) / base * dec!(100));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(values: &[i64]) -> Vec<Decimal> {
        values.iter().map(|&v| Decimal::from(v)).collect()
    }

    #[test]
    fn test_rsi_bounds() {
        let data = prices(&[
            100, 102, 101, 103, 105, 104, 106, 108, 107, 109, 111, 110, 112, 114, 113, 115, 117,
            116, 118, 120,
        ]);
        let rsi = MomentumCalculator::new().rsi(&data, RsiParams::default());
        assert_eq!(rsi.len(), data.len() - 14);
        assert!(rsi.iter().all(|&v| v >= Decimal::ZERO && v <= dec!(100)));
    }

    #[test]
    fn test_rsi_all_gains_near_100() {
        let data: Vec<Decimal> = (1..=30).map(Decimal::from).collect();
        let rsi = MomentumCalculator::new().rsi(&data, RsiParams::default());
        // 하락이 전혀 없으면 하락폭 하한 덕분에 100에 수렴
        assert!(rsi.iter().all(|&v| v > dec!(99)));
    }

    #[test]
    fn test_rsi_short_input_is_empty() {
        let data = prices(&[100; 14]);
        let rsi = MomentumCalculator::new().rsi(&data, RsiParams::default());
        assert!(rsi.is_empty());
    }

    #[test]
    fn test_stochastic_range() {
        let high = prices(&[10, 11, 12, 13, 14, 15, 16, 17, 18, 19]);
        let low = prices(&[8, 9, 10, 11, 12, 13, 14, 15, 16, 17]);
        let close = prices(&[9, 10, 11, 12, 13, 14, 15, 16, 17, 18]);
        let result = MomentumCalculator::new().stochastic(
            &high,
            &low,
            &close,
            StochasticParams { k_period: 5, d_period: 3 },
        );
        assert_eq!(result.len(), 4);
        assert!(result
            .iter()
            .all(|r| r.k >= Decimal::ZERO && r.k <= dec!(100)));
    }

    #[test]
    fn test_williams_r_range() {
        let high = prices(&[10, 11, 12, 13, 14]);
        let low = prices(&[8, 9, 10, 11, 12]);
        let close = prices(&[9, 10, 11, 12, 14]);
        let result = MomentumCalculator::new().williams_r(
            &high,
            &low,
            &close,
            WilliamsRParams { period: 5 },
        );
        assert_eq!(result.len(), 1);
        // 종가가 기간 최고가와 같으면 %R = 0
        assert_eq!(result[0], Decimal::ZERO);
    }

    #[test]
    fn test_momentum_rate_of_change() {
        let data = prices(&[100, 100, 100, 100, 100, 110]);
        let result = MomentumCalculator::new().momentum(&data, MomentumParams { period: 5 });
        assert_eq!(result, vec![dec!(10)]);
    }
}
