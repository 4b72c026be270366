//! 패턴 엔진.
//!
//! 캔들 데이터와 레벨 엔진 출력을 소비하여 차트 패턴을 인식합니다.
//!
//! 감지기는 [`PatternDetector`] trait로 등록되는 닫힌 집합입니다:
//! - [`BoxDetector`]: 지지/저항 사이 횡보 박스권
//! - [`BreakoutDetector`]: 레벨 돌파
//! - [`TrendRunDetector`]: 방향성 추세 구간
//! - [`ReversalDetector`]: 반전 패턴 확장 지점 (아직 패턴을 반환하지 않음)
//!
//! [`PatternEngine::recognize_all`]은 모든 감지기를 실행하고 실패를
//! 격리합니다. 한 감지기의 실패가 전체 호출을 중단시키지 않으며,
//! 실패한 감지기 이름은 결과에 함께 보고됩니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use signal_core::{
    Kline, Level, LevelAnalysis, LevelType, PatternConfig, PatternKind, PatternResult, TradeSignal,
};
use thiserror::Error;
use tracing::warn;

/// 패턴 감지 오류.
#[derive(Debug, Error)]
pub enum PatternError {
    /// 계산 오류
    #[error("계산 오류: {0}")]
    Calculation(String),
}

/// 패턴 감지기 trait.
///
/// 모든 감지기는 순수 함수로 동작합니다. 데이터가 부족하면 빈 결과를
/// 반환하고, 실제 계산 실패만 에러로 보고합니다.
pub trait PatternDetector: Send + Sync {
    /// 감지기 이름 (실패 보고에 사용).
    fn name(&self) -> &'static str;

    /// 패턴을 감지합니다.
    fn detect(
        &self,
        candles: &[Kline],
        levels: &LevelAnalysis,
    ) -> Result<Vec<PatternResult>, PatternError>;
}

/// 박스권 감지기.
///
/// 지지/저항 쌍마다 높이 비율, 지속 기간, 내부 유지 비율, 경계 터치
/// 횟수를 검증합니다. 신호는 항상 NEUTRAL입니다.
#[derive(Debug)]
pub struct BoxDetector {
    config: PatternConfig,
}

impl BoxDetector {
    /// 새 박스권 감지기를 생성합니다.
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    /// 한 쌍의 레벨에 대해 박스권을 검증합니다.
    fn check_pair(
        &self,
        candles: &[Kline],
        support: &Level,
        resistance: &Level,
    ) -> Option<PatternResult> {
        let sup = support.price();
        let res = resistance.price();
        if res <= sup || sup <= Decimal::ZERO {
            return None;
        }

        let height_ratio = ((res - sup) / sup).to_f64().unwrap_or(0.0);
        if height_ratio < self.config.box_min_height || height_ratio > self.config.box_max_height {
            return None;
        }

        // 경계 터치 인덱스 수집 (1% 허용 오차)
        let tolerance = self.config.touch_tolerance;
        let touches_boundary = |price: Decimal, boundary: Decimal| {
            ((price - boundary) / boundary)
                .abs()
                .to_f64()
                .unwrap_or(f64::MAX)
                <= tolerance
        };

        let mut sup_touches = 0usize;
        let mut res_touches = 0usize;
        let mut first_touch = None;
        let mut last_touch = None;

        for (i, candle) in candles.iter().enumerate() {
            let hit_support = touches_boundary(candle.low, sup);
            let hit_resistance = touches_boundary(candle.high, res);
            if hit_support {
                sup_touches += 1;
            }
            if hit_resistance {
                res_touches += 1;
            }
            if hit_support || hit_resistance {
                first_touch.get_or_insert(i);
                last_touch = Some(i);
            }
        }

        let (start, end) = (first_touch?, last_touch?);
        let window = &candles[start..=end];

        if window.len() < self.config.box_min_duration {
            return None;
        }
        if sup_touches < self.config.min_boundary_touches
            || res_touches < self.config.min_boundary_touches
        {
            return None;
        }

        // 내부 유지 비율: [지지×0.99, 저항×1.01] 범위를 벗어나지 않은 캔들
        let floor = sup * dec_ratio(1.0 - tolerance);
        let ceiling = res * dec_ratio(1.0 + tolerance);
        let inside = window
            .iter()
            .filter(|k| k.low >= floor && k.high <= ceiling)
            .count();
        let within_ratio = inside as f64 / window.len() as f64;

        if within_ratio < self.config.box_containment {
            return None;
        }

        Some(PatternResult {
            kind: PatternKind::Box,
            signal: TradeSignal::Neutral,
            confidence: (within_ratio * 100.0).min(95.0),
            start_time: window[0].open_time,
            end_time: window[window.len() - 1].close_time,
            description: format!(
                "박스권: 지지 {} / 저항 {} 사이 {}캔들 횡보",
                sup,
                res,
                window.len()
            ),
            key_levels: vec![support.clone(), resistance.clone()],
        })
    }
}

impl PatternDetector for BoxDetector {
    fn name(&self) -> &'static str {
        "box"
    }

    fn detect(
        &self,
        candles: &[Kline],
        levels: &LevelAnalysis,
    ) -> Result<Vec<PatternResult>, PatternError> {
        let mut patterns = Vec::new();
        for support in &levels.supports {
            for resistance in &levels.resistances {
                if let Some(pattern) = self.check_pair(candles, support, resistance) {
                    patterns.push(pattern);
                }
            }
        }
        Ok(patterns)
    }
}

/// 레벨 돌파 감지기.
///
/// 마지막 종가의 1% 이내에 있는 레벨이 기대 방향으로 돌파되었는지
/// 확인합니다. 저항 상향 돌파 → BUY, 지지 하향 돌파 → SELL.
#[derive(Debug)]
pub struct BreakoutDetector {
    config: PatternConfig,
}

impl BreakoutDetector {
    /// 새 돌파 감지기를 생성합니다.
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    /// 직전 20캔들 거래량 평균 대비 마지막 캔들 거래량 확인.
    fn volume_confirmed(&self, candles: &[Kline]) -> bool {
        let Some(last) = candles.last() else {
            return false;
        };
        let window_start = candles.len().saturating_sub(20);
        let window = &candles[window_start..];
        let total: Decimal = window.iter().map(|k| k.volume).sum();
        if window.is_empty() || total.is_zero() {
            return false;
        }
        let mean = total / Decimal::from(window.len());
        last.volume > mean * dec_ratio(self.config.volume_confirmation_factor)
    }
}

impl PatternDetector for BreakoutDetector {
    fn name(&self) -> &'static str {
        "breakout"
    }

    fn detect(
        &self,
        candles: &[Kline],
        levels: &LevelAnalysis,
    ) -> Result<Vec<PatternResult>, PatternError> {
        let Some(last) = candles.last() else {
            return Ok(Vec::new());
        };
        let close = last.close;
        if close <= Decimal::ZERO {
            return Ok(Vec::new());
        }

        let volume_bonus = if self.volume_confirmed(candles) { 20.0 } else { 0.0 };
        let window_start = candles.len().saturating_sub(20);

        let mut patterns = Vec::new();
        for level in levels.supports.iter().chain(levels.resistances.iter()) {
            let center = level.price();
            if center <= Decimal::ZERO {
                continue;
            }

            let distance = ((close - center) / center).abs().to_f64().unwrap_or(f64::MAX);
            if distance > self.config.breakout_proximity {
                continue;
            }

            let signal = match level.level_type {
                LevelType::Resistance if close > center => TradeSignal::Buy,
                LevelType::Support if close < center => TradeSignal::Sell,
                _ => continue,
            };

            let breakout_pct = distance;
            let confidence = (50.0
                + f64::from(level.strength.weight()) * 5.0
                + volume_bonus
                + (breakout_pct * 1000.0).min(15.0))
            .min(100.0);

            if confidence < self.config.breakout_min_confidence {
                continue;
            }

            patterns.push(PatternResult {
                kind: PatternKind::Breakout,
                signal,
                confidence,
                start_time: candles[window_start].open_time,
                end_time: last.close_time,
                description: format!(
                    "{} 레벨 {} 돌파 (현재가 {})",
                    level.level_type, center, close
                ),
                key_levels: vec![level.clone()],
            });
        }

        Ok(patterns)
    }
}

/// 방향성 추세 구간 감지기.
///
/// 최근 `trend_run_period`개 구간의 상승/하락 이동 비율로 추세 강도를
/// 계산합니다. 강도 = |상승 - 하락| / (상승 + 하락).
#[derive(Debug)]
pub struct TrendRunDetector {
    config: PatternConfig,
}

impl TrendRunDetector {
    /// 새 추세 구간 감지기를 생성합니다.
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }
}

impl PatternDetector for TrendRunDetector {
    fn name(&self) -> &'static str {
        "trend_run"
    }

    fn detect(
        &self,
        candles: &[Kline],
        _levels: &LevelAnalysis,
    ) -> Result<Vec<PatternResult>, PatternError> {
        let period = self.config.trend_run_period;
        if period == 0 || candles.len() < period + 1 {
            return Ok(Vec::new());
        }

        let window = &candles[candles.len() - period - 1..];
        let mut up = 0usize;
        let mut down = 0usize;
        for pair in window.windows(2) {
            if pair[1].close > pair[0].close {
                up += 1;
            } else if pair[1].close < pair[0].close {
                down += 1;
            }
        }

        let total = up + down;
        if total == 0 {
            return Ok(Vec::new());
        }

        let strength = (up as f64 - down as f64).abs() / total as f64;
        if strength < self.config.trend_run_min_strength {
            return Ok(Vec::new());
        }

        let signal = if up > down {
            TradeSignal::Buy
        } else {
            TradeSignal::Sell
        };

        Ok(vec![PatternResult {
            kind: PatternKind::TrendRun,
            signal,
            confidence: strength * 100.0,
            start_time: window[0].open_time,
            end_time: window[window.len() - 1].close_time,
            description: format!(
                "추세 구간: 최근 {}캔들 중 상승 {} / 하락 {}",
                period, up, down
            ),
            key_levels: Vec::new(),
        }])
    }
}

/// 반전 패턴 감지기 (확장 지점).
///
/// 이중 천장/바닥, 헤드앤숄더의 인터페이스는 정의되어 있지만 감지
/// 로직은 아직 구현되지 않았습니다. 항상 빈 결과를 반환합니다.
/// 구현 투자 전에 제품 오너와 우선순위를 확인할 것.
#[derive(Debug, Default)]
pub struct ReversalDetector;

impl ReversalDetector {
    /// 새 반전 패턴 감지기를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// 이 감지기가 다룰 패턴 종류.
    pub fn supported_kinds(&self) -> &'static [PatternKind] {
        &[
            PatternKind::DoubleTop,
            PatternKind::DoubleBottom,
            PatternKind::HeadAndShoulders,
        ]
    }
}

impl PatternDetector for ReversalDetector {
    fn name(&self) -> &'static str {
        "reversal"
    }

    fn detect(
        &self,
        _candles: &[Kline],
        _levels: &LevelAnalysis,
    ) -> Result<Vec<PatternResult>, PatternError> {
        Ok(Vec::new())
    }
}

/// 패턴 인식 결과.
///
/// 부분 실패 정책: 실패한 감지기는 결과에서 제외되고 이름만 보고됩니다.
#[derive(Debug, Default)]
pub struct PatternRecognition {
    /// 감지된 패턴 (신뢰도 내림차순)
    pub patterns: Vec<PatternResult>,
    /// 실패한 감지기 이름
    pub failed_detectors: Vec<String>,
}

/// 패턴 엔진.
pub struct PatternEngine {
    detectors: Vec<Box<dyn PatternDetector>>,
}

impl PatternEngine {
    /// 기본 감지기 세트로 패턴 엔진을 생성합니다.
    pub fn new() -> Self {
        Self::with_config(PatternConfig::default())
    }

    /// 지정한 설정의 기본 감지기 세트로 패턴 엔진을 생성합니다.
    pub fn with_config(config: PatternConfig) -> Self {
        Self {
            detectors: vec![
                Box::new(BoxDetector::new(config.clone())),
                Box::new(BreakoutDetector::new(config.clone())),
                Box::new(TrendRunDetector::new(config)),
                Box::new(ReversalDetector::new()),
            ],
        }
    }

    /// 감지기를 추가 등록합니다.
    pub fn register(&mut self, detector: Box<dyn PatternDetector>) {
        self.detectors.push(detector);
    }

    /// 모든 감지기를 실행하고 결과를 신뢰도 내림차순으로 융합합니다.
    ///
    /// 개별 감지기의 실패는 격리되어 로그로 남고, 나머지 결과는
    /// 정상적으로 반환됩니다.
    pub fn recognize_all(&self, candles: &[Kline], levels: &LevelAnalysis) -> PatternRecognition {
        let mut recognition = PatternRecognition::default();

        for detector in &self.detectors {
            match detector.detect(candles, levels) {
                Ok(patterns) => recognition.patterns.extend(patterns),
                Err(e) => {
                    warn!(detector = detector.name(), error = %e, "pattern detector failed");
                    recognition.failed_detectors.push(detector.name().to_string());
                }
            }
        }

        recognition.patterns.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        recognition
    }
}

impl Default for PatternEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// f64 설정 비율을 Decimal로 변환합니다.
fn dec_ratio(value: f64) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LevelEngine;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use signal_core::{Symbol, Timeframe};

    fn candle(i: i64, high: Decimal, low: Decimal, close: Decimal) -> Kline {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Kline::new(
            Symbol::crypto("BTC", "USDT"),
            Timeframe::H1,
            start + Duration::hours(i),
            close,
            high,
            low,
            close,
            dec!(1000),
            start + Duration::hours(i + 1),
        )
    }

    /// 100과 110 사이를 왕복하는 박스권 시리즈.
    fn box_series(len: i64) -> Vec<Kline> {
        (0..len)
            .map(|i| {
                if i % 2 == 0 {
                    // 지지 터치
                    candle(i, dec!(105), dec!(100), dec!(101))
                } else {
                    // 저항 터치
                    candle(i, dec!(110), dec!(104), dec!(108))
                }
            })
            .collect()
    }

    fn analysis_for(candles: &[Kline]) -> LevelAnalysis {
        LevelEngine::new().analyze(candles, Timeframe::H1)
    }

    #[test]
    fn test_box_pattern_detected() {
        let candles = box_series(40);
        let levels = analysis_for(&candles);
        let detector = BoxDetector::new(PatternConfig::default());
        let patterns = detector.detect(&candles, &levels).unwrap();

        assert!(!patterns.is_empty(), "박스권이 감지되어야 한다");
        let best = &patterns[0];
        assert_eq!(best.signal, TradeSignal::Neutral);
        assert!(best.confidence >= 70.0);
    }

    #[test]
    fn test_trend_run_on_monotonic_rise() {
        let candles: Vec<Kline> = (0..30)
            .map(|i| {
                let price = Decimal::from(100 + i);
                candle(i, price + dec!(1), price - dec!(1), price)
            })
            .collect();
        let levels = analysis_for(&candles);
        let detector = TrendRunDetector::new(PatternConfig::default());
        let patterns = detector.detect(&candles, &levels).unwrap();

        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].signal, TradeSignal::Buy);
        assert_eq!(patterns[0].confidence, 100.0);
    }

    #[test]
    fn test_trend_run_silent_on_chop() {
        let candles = box_series(40);
        let detector = TrendRunDetector::new(PatternConfig::default());
        let patterns = detector.detect(&candles, &analysis_for(&candles)).unwrap();
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_reversal_detector_returns_nothing() {
        let candles = box_series(40);
        let detector = ReversalDetector::new();
        assert_eq!(detector.supported_kinds().len(), 3);
        let patterns = detector.detect(&candles, &analysis_for(&candles)).unwrap();
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_recognize_all_sorted_by_confidence() {
        let candles = box_series(40);
        let levels = analysis_for(&candles);
        let recognition = PatternEngine::new().recognize_all(&candles, &levels);

        assert!(recognition.failed_detectors.is_empty());
        for pair in recognition.patterns.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn test_short_input_yields_no_patterns() {
        let candles = box_series(5);
        let levels = analysis_for(&candles);
        let recognition = PatternEngine::new().recognize_all(&candles, &levels);
        assert!(recognition.patterns.iter().all(|p| p.kind != PatternKind::Box));
    }
}
