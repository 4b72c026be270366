//! 종합 스코어러.
//!
//! 단일 타임프레임의 지표 출력과 인식된 패턴, 레벨 분석을 결합하여
//! 추세/모멘텀/변동성 점수와 최종 매매 신호를 산출합니다.
//!
//! 점수 체계:
//! - 추세: SMA20/SMA50 대비 가격 위치의 가중합, [-100, 100]
//! - 모멘텀: RSI와 MACD 히스토그램의 결합, 볼린저 밴드 위치 보정, [-100, 100]
//! - 변동성: 볼린저 밴드 폭 비율, [0, 100]
//!
//! 신호는 combined = (추세 + 모멘텀) / 2 에 대해 +20 초과 BUY,
//! -20 미만 SELL, 그 외 NEUTRAL입니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use signal_core::{ComprehensiveScore, Kline, LevelAnalysis, PatternResult, TradeSignal};
use tracing::debug;

use crate::indicators::{
    BollingerBandsParams, BollingerBandsResult, IndicatorEngine, MacdParams, RsiParams, SmaParams,
};

/// 종합 스코어러.
#[derive(Debug, Default)]
pub struct ComprehensiveScorer {
    indicators: IndicatorEngine,
}

impl ComprehensiveScorer {
    /// 새 종합 스코어러를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 캔들, 패턴, 레벨에서 종합 점수를 계산합니다.
    ///
    /// 데이터가 부족해 일부 지표가 비어 있으면 해당 항은 생략되고
    /// 나머지로 계산합니다. 입력이 비어 있어도 실패하지 않습니다.
    pub fn score(
        &self,
        candles: &[Kline],
        patterns: &[PatternResult],
        levels: &LevelAnalysis,
    ) -> ComprehensiveScore {
        let closes: Vec<Decimal> = candles.iter().map(|k| k.close).collect();
        let price = closes.last().copied().unwrap_or(Decimal::ZERO);

        let sma20 = self.indicators.sma(&closes, SmaParams { period: 20 });
        let sma50 = self.indicators.sma(&closes, SmaParams { period: 50 });
        let rsi = self.indicators.rsi(&closes, RsiParams::default());
        let macd = self.indicators.macd(&closes, MacdParams::default());
        let bollinger = self
            .indicators
            .bollinger_bands(&closes, BollingerBandsParams::default())
            .unwrap_or_default();

        let mut trend = self.trend_score(price, sma20.last(), sma50.last());
        let mut momentum = self.momentum_score(price, rsi.last(), macd.last().map(|m| m.histogram), bollinger.last());
        let volatility = self.volatility_score(bollinger.last());

        // 패턴 보정
        for pattern in patterns {
            let ratio = pattern.confidence / 100.0;
            match pattern.signal {
                TradeSignal::Buy => {
                    trend += 20.0 * ratio;
                    momentum += 15.0 * ratio;
                }
                TradeSignal::Sell => {
                    trend -= 20.0 * ratio;
                    momentum -= 15.0 * ratio;
                }
                TradeSignal::Neutral => {}
            }
        }
        let trend = trend.clamp(-100.0, 100.0);
        let momentum = momentum.clamp(-100.0, 100.0);

        let combined = (trend + momentum) / 2.0;
        let (signal, confidence) = Self::signal_and_confidence(combined);

        let max_pattern_confidence = patterns
            .iter()
            .map(|p| p.confidence)
            .fold(0.0_f64, f64::max);
        let confidence = ((confidence + max_pattern_confidence) / 2.0).round();

        debug!(
            trend,
            momentum, volatility, %signal, confidence, "종합 점수 계산 완료"
        );

        let summary = self.summarize(trend, momentum, volatility, patterns, levels);

        ComprehensiveScore {
            trend,
            momentum,
            volatility,
            signal,
            confidence,
            summary,
        }
    }

    /// 추세 점수: SMA 대비 가격 위치의 가중합.
    ///
    /// 각 항은 해당 SMA가 계산 가능할 때만 더해집니다.
    fn trend_score(&self, price: Decimal, sma20: Option<&Decimal>, sma50: Option<&Decimal>) -> f64 {
        let mut score = 0.0;

        if let Some(&s20) = sma20 {
            if let Some(pct) = relative_pct(price, s20) {
                score += 0.4 * pct;
            }
        }
        if let Some(&s50) = sma50 {
            if let Some(pct) = relative_pct(price, s50) {
                score += 0.3 * pct;
            }
        }
        if let (Some(&s20), Some(&s50)) = (sma20, sma50) {
            if let Some(pct) = relative_pct(s20, s50) {
                score += 0.3 * pct;
            }
        }

        score.clamp(-100.0, 100.0)
    }

    /// 모멘텀 점수: RSI 편차와 MACD 히스토그램의 평균, 밴드 위치 보정.
    fn momentum_score(
        &self,
        price: Decimal,
        rsi: Option<&Decimal>,
        histogram: Option<Decimal>,
        band: Option<&BollingerBandsResult>,
    ) -> f64 {
        let rsi_term = rsi
            .and_then(|r| r.to_f64())
            .map(|r| (r - 50.0) * 2.0)
            .unwrap_or(0.0);
        let macd_term = histogram
            .and_then(|h| h.to_f64())
            .map(|h| (h * 1000.0).clamp(-50.0, 50.0))
            .unwrap_or(0.0);

        let mut score = (rsi_term + macd_term) / 2.0;

        // 볼린저 밴드 상/하단 20% 구간 보정
        if let Some(b) = band {
            let range = b.upper - b.lower;
            if range > Decimal::ZERO {
                let position = ((price - b.lower) / range).to_f64().unwrap_or(0.5);
                if position >= 0.8 {
                    score += 10.0;
                } else if position <= 0.2 {
                    score -= 10.0;
                }
            }
        }

        score.clamp(-100.0, 100.0)
    }

    /// 변동성 점수: 밴드 폭 비율 × 500.
    fn volatility_score(&self, band: Option<&BollingerBandsResult>) -> f64 {
        band.map(|b| (b.width().to_f64().unwrap_or(0.0) * 500.0).clamp(0.0, 100.0))
            .unwrap_or(0.0)
    }

    /// combined 점수에서 신호와 기본 신뢰도를 결정합니다.
    fn signal_and_confidence(combined: f64) -> (TradeSignal, f64) {
        if combined > 20.0 {
            (TradeSignal::Buy, combined.abs().min(95.0))
        } else if combined < -20.0 {
            (TradeSignal::Sell, combined.abs().min(95.0))
        } else {
            (TradeSignal::Neutral, 50.0 + combined.abs())
        }
    }

    /// 사람이 읽을 수 있는 요약을 생성합니다.
    fn summarize(
        &self,
        trend: f64,
        momentum: f64,
        volatility: f64,
        patterns: &[PatternResult],
        levels: &LevelAnalysis,
    ) -> String {
        let trend_text = if trend > 30.0 {
            "강한 상승 추세"
        } else if trend > 10.0 {
            "상승 추세"
        } else if trend < -30.0 {
            "강한 하락 추세"
        } else if trend < -10.0 {
            "하락 추세"
        } else {
            "횡보"
        };

        let momentum_text = if momentum > 30.0 {
            "강한 상승 모멘텀"
        } else if momentum > 10.0 {
            "상승 모멘텀"
        } else if momentum < -30.0 {
            "강한 하락 모멘텀"
        } else if momentum < -10.0 {
            "하락 모멘텀"
        } else {
            "중립 모멘텀"
        };

        let volatility_text = if volatility > 60.0 {
            "높은 변동성"
        } else if volatility < 20.0 {
            "낮은 변동성"
        } else {
            "보통 변동성"
        };

        let high_confidence_patterns = patterns.iter().filter(|p| p.confidence > 70.0).count();
        let strong_levels = levels
            .supports
            .iter()
            .chain(levels.resistances.iter())
            .filter(|l| l.strength.weight() >= 3)
            .count();

        format!(
            "{}, {}, {} | 고신뢰 패턴 {}개, 강한 레벨 {}개",
            trend_text, momentum_text, volatility_text, high_confidence_patterns, strong_levels
        )
    }
}

/// (a - b) / b × 100. b가 0이면 None.
fn relative_pct(a: Decimal, b: Decimal) -> Option<f64> {
    if b.is_zero() {
        return None;
    }
    ((a - b) / b * Decimal::ONE_HUNDRED).to_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use signal_core::{PatternKind, Symbol, Timeframe};

    fn candle(i: i64, close: Decimal) -> Kline {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Kline::new(
            Symbol::crypto("BTC", "USDT"),
            Timeframe::H1,
            start + Duration::hours(i),
            close,
            close + dec!(1),
            close - dec!(1),
            close,
            dec!(1000),
            start + Duration::hours(i + 1),
        )
    }

    fn empty_levels() -> LevelAnalysis {
        crate::levels::LevelEngine::new().analyze(&[], Timeframe::H1)
    }

    fn pattern(signal: TradeSignal, confidence: f64) -> PatternResult {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        PatternResult {
            kind: PatternKind::Breakout,
            signal,
            confidence,
            start_time: t,
            end_time: t,
            description: String::new(),
            key_levels: Vec::new(),
        }
    }

    #[test]
    fn test_signal_thresholds() {
        // (30 + 20) / 2 = 25 → BUY, 신뢰도 25
        let (signal, conf) = ComprehensiveScorer::signal_and_confidence((30.0 + 20.0) / 2.0);
        assert_eq!(signal, TradeSignal::Buy);
        assert_eq!(conf, 25.0);

        // (-40 + -10) / 2 = -25 → SELL
        let (signal, conf) = ComprehensiveScorer::signal_and_confidence((-40.0 + -10.0) / 2.0);
        assert_eq!(signal, TradeSignal::Sell);
        assert_eq!(conf, 25.0);

        // (5 + -5) / 2 = 0 → NEUTRAL, 신뢰도 50
        let (signal, conf) = ComprehensiveScorer::signal_and_confidence(0.0);
        assert_eq!(signal, TradeSignal::Neutral);
        assert_eq!(conf, 50.0);

        // 경계값 20은 NEUTRAL
        let (signal, _) = ComprehensiveScorer::signal_and_confidence(20.0);
        assert_eq!(signal, TradeSignal::Neutral);
    }

    #[test]
    fn test_score_on_rising_series_is_buyish() {
        let candles: Vec<Kline> = (0..100)
            .map(|i| {
                let price = 100.0 * 1.01f64.powi(i as i32);
                candle(i, Decimal::from_f64_retain(price).unwrap())
            })
            .collect();
        let score = ComprehensiveScorer::new().score(&candles, &[], &empty_levels());

        assert!(score.trend > 0.0);
        assert!(score.momentum > 0.0);
        assert_eq!(score.signal, TradeSignal::Buy);
        assert!(score.confidence <= 95.0);
    }

    #[test]
    fn test_flat_series_rsi_floor_drags_momentum() {
        let candles: Vec<Kline> = (0..100).map(|i| candle(i, dec!(100))).collect();
        let score = ComprehensiveScorer::new().score(&candles, &[], &empty_levels());

        // 움직임이 전혀 없으면 하락폭 하한 때문에 RSI = 0이 되어
        // 모멘텀 항이 (0 - 50) × 2 / 2 = -50 까지 내려간다
        assert_eq!(score.trend, 0.0);
        assert_eq!(score.volatility, 0.0);
        assert_eq!(score.momentum, -50.0);
    }

    #[test]
    fn test_trend_score_weighting() {
        let scorer = ComprehensiveScorer::new();
        // 0.4×10% + 0.3×10% + 0.3×0% = 7.0
        let score = scorer.trend_score(dec!(110), Some(&dec!(100)), Some(&dec!(100)));
        assert!((score - 7.0).abs() < 1e-9);

        // SMA50이 없으면 해당 항 생략
        let score = scorer.trend_score(dec!(110), Some(&dec!(100)), None);
        assert!((score - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_momentum_score_components() {
        let scorer = ComprehensiveScorer::new();
        // RSI 70 → (70-50)×2 = 40, 히스토그램 0.01 → 10 → (40+10)/2 = 25
        let score = scorer.momentum_score(dec!(100), Some(&dec!(70)), Some(dec!(0.01)), None);
        assert!((score - 25.0).abs() < 1e-9);

        // 밴드 상단 20% 구간이면 +10
        let band = BollingerBandsResult {
            upper: dec!(110),
            middle: dec!(100),
            lower: dec!(90),
        };
        let score = scorer.momentum_score(dec!(109), Some(&dec!(50)), Some(Decimal::ZERO), Some(&band));
        assert!((score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input_does_not_panic() {
        let score = ComprehensiveScorer::new().score(&[], &[], &empty_levels());
        assert_eq!(score.signal, TradeSignal::Neutral);
        // combined 0 → 기본 신뢰도 50, 패턴 없음 → (50 + 0) / 2 = 25
        assert_eq!(score.confidence, 25.0);
    }

    #[test]
    fn test_buy_pattern_pushes_scores_up() {
        // 10캔들이면 모든 지표가 비어 기본 점수는 0
        let candles: Vec<Kline> = (0..10).map(|i| candle(i, dec!(100))).collect();
        let scorer = ComprehensiveScorer::new();
        let base = scorer.score(&candles, &[], &empty_levels());
        let with_pattern = scorer.score(
            &candles,
            &[pattern(TradeSignal::Buy, 100.0)],
            &empty_levels(),
        );

        assert_eq!(base.combined_score(), 0.0);
        assert!(with_pattern.trend > base.trend);
        assert!(with_pattern.momentum > base.momentum);
        // 추세 +20, 모멘텀 +15 → combined 17.5
        assert!((with_pattern.combined_score() - 17.5).abs() < 1e-9);
    }

    #[test]
    fn test_final_confidence_averages_pattern_confidence() {
        let candles: Vec<Kline> = (0..10).map(|i| candle(i, dec!(100))).collect();
        let score = ComprehensiveScorer::new().score(
            &candles,
            &[pattern(TradeSignal::Neutral, 80.0)],
            &empty_levels(),
        );
        // combined 0 → 기본 50, 패턴 최대 80 → (50 + 80) / 2 = 65
        assert_eq!(score.confidence, 65.0);
    }

    #[test]
    fn test_summary_mentions_trend_state() {
        let candles: Vec<Kline> = (0..100)
            .map(|i| {
                let price = 100.0 * 1.01f64.powi(i as i32);
                candle(i, Decimal::from_f64_retain(price).unwrap())
            })
            .collect();
        let score = ComprehensiveScorer::new().score(&candles, &[], &empty_levels());
        assert!(score.summary.contains("상승"));
    }
}
