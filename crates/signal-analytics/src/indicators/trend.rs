//! 추세 지표 (Trend Indicators).
//!
//! 이동평균 기반의 추세 지표들을 제공합니다.
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)
//! - MACD (Moving Average Convergence Divergence)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 12 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// MACD 결과 한 지점.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Decimal,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Decimal,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Decimal,
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// SMA = (P1 + P2 + ... + Pn) / n
    ///
    /// 출력 길이는 `len - period + 1`이며 시리즈 끝에 정렬됩니다.
    /// 입력이 기간보다 짧으면 빈 벡터를 반환합니다.
    pub fn sma(&self, prices: &[Decimal], params: SmaParams) -> Vec<Decimal> {
        let period = params.period;

        if period == 0 || prices.len() < period {
            return Vec::new();
        }

        let period_decimal = Decimal::from(period);
        let mut result = Vec::with_capacity(prices.len() - period + 1);

        for i in period - 1..prices.len() {
            let sum: Decimal = prices[i + 1 - period..=i].iter().sum();
            result.push(sum / period_decimal);
        }

        result
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// 첫 값은 최초 `period`개의 SMA로 시작하고, 이후는
    /// EMA = (현재가 × k) + (이전 EMA × (1 - k)), k = 2 / (period + 1).
    ///
    /// 파생 시리즈(예: MACD 라인)에도 동일한 점화식이 적용됩니다.
    /// 출력 길이는 `len - period + 1`이며, 입력이 짧으면 빈 벡터입니다.
    pub fn ema(&self, prices: &[Decimal], params: EmaParams) -> Vec<Decimal> {
        let period = params.period;

        if period == 0 || prices.len() < period {
            return Vec::new();
        }

        let multiplier = dec!(2) / Decimal::from(period + 1);
        let mut result = Vec::with_capacity(prices.len() - period + 1);

        // 첫 EMA는 SMA로 시작
        let initial_sma: Decimal = prices[..period].iter().sum::<Decimal>() / Decimal::from(period);
        result.push(initial_sma);

        let mut prev_ema = initial_sma;
        for price in prices.iter().skip(period) {
            let ema = (*price * multiplier) + (prev_ema * (Decimal::ONE - multiplier));
            result.push(ema);
            prev_ema = ema;
        }

        result
    }

    /// MACD 계산.
    ///
    /// MACD 라인 = 단기 EMA - 장기 EMA (두 시리즈 중 짧은 쪽에 끝 정렬,
    /// 긴 쪽 앞부분 탈락). 시그널 라인 = MACD 라인의 EMA(signal_period).
    /// 히스토그램 = MACD - 시그널.
    ///
    /// 최소 요구 길이는 `slow_period + signal_period`이며,
    /// 미달이면 빈 벡터를 반환합니다.
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> Vec<MacdResult> {
        if params.fast_period == 0 || params.slow_period == 0 || params.signal_period == 0 {
            return Vec::new();
        }

        let min_required = params.slow_period + params.signal_period;
        if prices.len() < min_required {
            return Vec::new();
        }

        let fast = self.ema(prices, EmaParams { period: params.fast_period });
        let slow = self.ema(prices, EmaParams { period: params.slow_period });

        // 짧은 쪽(slow)에 맞춰 긴 쪽 앞부분을 잘라 정렬
        let offset = fast.len().saturating_sub(slow.len());
        let macd_line: Vec<Decimal> = fast[offset..]
            .iter()
            .zip(slow.iter())
            .map(|(f, s)| f - s)
            .collect();

        let signal_line = self.ema(&macd_line, EmaParams { period: params.signal_period });
        if signal_line.is_empty() {
            return Vec::new();
        }

        let macd_offset = macd_line.len() - signal_line.len();
        macd_line[macd_offset..]
            .iter()
            .zip(signal_line.iter())
            .map(|(&macd, &signal)| MacdResult {
                macd,
                signal,
                histogram: macd - signal,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(values: &[i64]) -> Vec<Decimal> {
        values.iter().map(|&v| Decimal::from(v)).collect()
    }

    #[test]
    fn test_sma_basic() {
        let data = prices(&[1, 2, 3, 4, 5]);
        let sma = TrendIndicators::new().sma(&data, SmaParams { period: 3 });
        assert_eq!(sma, vec![dec!(2), dec!(3), dec!(4)]);
    }

    #[test]
    fn test_sma_short_input_is_empty() {
        let data = prices(&[1, 2]);
        let sma = TrendIndicators::new().sma(&data, SmaParams { period: 3 });
        assert!(sma.is_empty());
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let data = prices(&[10, 20, 30, 40]);
        let ema = TrendIndicators::new().ema(&data, EmaParams { period: 3 });
        // 첫 값 = SMA(10,20,30) = 20, 다음 = 40×0.5 + 20×0.5 = 30
        assert_eq!(ema[0], dec!(20));
        assert_eq!(ema[1], dec!(30));
    }

    #[test]
    fn test_ema_constant_series_stays_constant() {
        // period 9의 승수는 2/10 = 0.2로 정확히 표현되므로 등호 비교 가능
        let data = vec![dec!(42); 50];
        let ema = TrendIndicators::new().ema(&data, EmaParams { period: 9 });
        assert_eq!(ema.len(), 42);
        assert!(ema.iter().all(|&v| v == dec!(42)));
    }

    #[test]
    fn test_macd_minimum_length() {
        let engine = TrendIndicators::new();
        let params = MacdParams::default();

        let short = vec![dec!(100); 34];
        assert!(engine.macd(&short, params).is_empty());

        let enough = vec![dec!(100); 35];
        let macd = engine.macd(&enough, params);
        assert!(!macd.is_empty());
        // 상수 시리즈에서 MACD/히스토그램은 0 (Decimal 반올림 오차 한도 내)
        let eps = dec!(0.000000000000000001);
        assert!(macd.iter().all(|m| m.macd.abs() < eps));
        assert!(macd.iter().all(|m| m.histogram.abs() < eps));
    }

    #[test]
    fn test_zero_period_is_empty() {
        let data = prices(&[1, 2, 3]);
        let engine = TrendIndicators::new();
        assert!(engine.sma(&data, SmaParams { period: 0 }).is_empty());
        assert!(engine.ema(&data, EmaParams { period: 0 }).is_empty());
    }
}
