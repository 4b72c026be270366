//! 다중 타임프레임 추세 집계기.
//!
//! 타임프레임별로 EMA20/60/120 기반의 7단계 추세를 분류하고,
//! 타임프레임 가중치로 융합하여 종합 추세와 매매 제안을 생성합니다.
//!
//! 이 모듈은 순수 계산만 담당합니다. 캔들 조회와 타임프레임별 병렬
//! 실행은 분석기 파사드의 책임입니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use signal_core::{
    Kline, MultiTimeframeTrend, RiskLevel, SuggestedAction, Timeframe, TimeframeTrend,
    TradingSuggestion, TrendAlignment, TrendConfig, TrendDirection,
};
use std::collections::HashMap;
use tracing::debug;

use crate::indicators::{EmaParams, TrendIndicators, VolatilityIndicators};

/// EMA120 계산과 기울기 산출에 필요한 최소 캔들 수.
const MIN_CANDLES: usize = 120;

/// 다중 타임프레임 추세 집계기.
pub struct TrendAggregator {
    trend: TrendIndicators,
    volatility: VolatilityIndicators,
    config: TrendConfig,
}

impl TrendAggregator {
    /// 기본 설정으로 집계기를 생성합니다.
    pub fn new() -> Self {
        Self::with_config(TrendConfig::default())
    }

    /// 지정한 설정으로 집계기를 생성합니다.
    pub fn with_config(config: TrendConfig) -> Self {
        Self {
            trend: TrendIndicators::new(),
            volatility: VolatilityIndicators::new(),
            config,
        }
    }

    /// 단일 타임프레임의 추세를 분류합니다.
    ///
    /// EMA120 계산이 불가능한 짧은 시리즈는 `None`을 반환합니다
    /// (데이터 부족은 오류가 아님).
    pub fn classify(&self, candles: &[Kline], timeframe: Timeframe) -> Option<TimeframeTrend> {
        if candles.len() < MIN_CANDLES {
            debug!(
                %timeframe,
                candles = candles.len(),
                "추세 분류에 필요한 캔들 수 미달"
            );
            return None;
        }

        let closes: Vec<Decimal> = candles.iter().map(|k| k.close).collect();
        let ema20 = self.trend.ema(&closes, EmaParams { period: 20 });
        let ema60 = self.trend.ema(&closes, EmaParams { period: 60 });
        let ema120 = self.trend.ema(&closes, EmaParams { period: 120 });

        let (&e20, &e60, &e120) = (ema20.last()?, ema60.last()?, ema120.last()?);
        let price = *closes.last()?;

        // EMA20 한 스텝 상대 기울기
        let slope = if ema20.len() >= 2 {
            let prev = ema20[ema20.len() - 2];
            if prev.is_zero() {
                0.0
            } else {
                (e20 / prev - Decimal::ONE).to_f64().unwrap_or(0.0)
            }
        } else {
            0.0
        };

        let trend = self.classify_direction(price, e20, e60, e120, slope);
        let trend_strength = self.trend_strength(&closes, candles, price, e20, e60, e120);

        let vol_window = &closes[closes.len().saturating_sub(21)..];
        let volatility = self
            .volatility
            .returns_volatility(vol_window)
            .to_f64()
            .unwrap_or(0.0);

        let mut confidence = trend_strength * 0.7;
        if trend.is_strong() {
            confidence += 15.0;
        } else if trend != TrendDirection::Ranging {
            confidence += 10.0;
        }
        if volatility < self.config.low_volatility {
            confidence += 10.0;
        } else if volatility > self.config.high_volatility {
            confidence -= 10.0;
        }
        let confidence = confidence.clamp(0.0, 100.0);

        let divergence = self.detect_divergence(&closes, &ema20);

        Some(TimeframeTrend {
            timeframe,
            trend,
            confidence,
            trend_strength,
            current_price: price,
            ema20: e20,
            ema60: e60,
            ema120: e120,
            divergence,
        })
    }

    /// EMA 배열과 기울기에서 7단계 추세를 결정합니다.
    fn classify_direction(
        &self,
        price: Decimal,
        e20: Decimal,
        e60: Decimal,
        e120: Decimal,
        slope: f64,
    ) -> TrendDirection {
        let extension = dec_ratio(self.config.strong_extension);

        if price > e20 && e20 > e60 && e60 > e120 {
            if slope > self.config.strong_slope && price >= e20 * (Decimal::ONE + extension) {
                TrendDirection::StrongUptrend
            } else if slope > self.config.normal_slope {
                TrendDirection::Uptrend
            } else {
                TrendDirection::WeakUptrend
            }
        } else if price < e20 && e20 < e60 && e60 < e120 {
            if slope < -self.config.strong_slope && price <= e20 * (Decimal::ONE - extension) {
                TrendDirection::StrongDowntrend
            } else if slope < -self.config.normal_slope {
                TrendDirection::Downtrend
            } else {
                TrendDirection::WeakDowntrend
            }
        } else {
            TrendDirection::Ranging
        }
    }

    /// 추세 강도 (0 ~ 100).
    ///
    /// 구성: EMA 정렬 40(완전)/25(부분) + EMA 간격 최대 20
    /// + 5캔들 모멘텀 최대 20 + 최근 10캔들 방향 일관성 최대 20.
    fn trend_strength(
        &self,
        closes: &[Decimal],
        candles: &[Kline],
        price: Decimal,
        e20: Decimal,
        e60: Decimal,
        e120: Decimal,
    ) -> f64 {
        let mut strength = 0.0;

        let full_up = price > e20 && e20 > e60 && e60 > e120;
        let full_down = price < e20 && e20 < e60 && e60 < e120;
        let partial_up = e20 > e60 && e60 > e120;
        let partial_down = e20 < e60 && e60 < e120;
        if full_up || full_down {
            strength += 40.0;
        } else if partial_up || partial_down {
            strength += 25.0;
        }

        // EMA 간격
        if !e60.is_zero() && !e120.is_zero() {
            let spread = ((e20 / e60 - Decimal::ONE).abs() + (e60 / e120 - Decimal::ONE).abs())
                .to_f64()
                .unwrap_or(0.0)
                * 100.0;
            strength += (spread * 2.0).min(20.0);
        }

        // 5캔들 모멘텀
        if closes.len() >= 6 {
            let base = closes[closes.len() - 6];
            if !base.is_zero() {
                let momentum = (price / base - Decimal::ONE)
                    .abs()
                    .to_f64()
                    .unwrap_or(0.0)
                    * 100.0;
                strength += (momentum * 4.0).min(20.0);
            }
        }

        // 최근 10캔들 방향 일관성
        let tail = &candles[candles.len().saturating_sub(10)..];
        if !tail.is_empty() {
            let bullish = tail.iter().filter(|k| k.is_bullish()).count();
            let bearish = tail.iter().filter(|k| k.is_bearish()).count();
            let dominant = bullish.max(bearish);
            strength += dominant as f64 / tail.len() as f64 * 20.0;
        }

        strength.clamp(0.0, 100.0)
    }

    /// 가격-EMA 다이버전스 감지.
    ///
    /// 종가가 최근 20캔들 극값의 2% 이내에 있는데 EMA20은 자신의
    /// 20캔들 극값에서 2% 이상 떨어져 있으면 true입니다.
    fn detect_divergence(&self, closes: &[Decimal], ema20: &[Decimal]) -> bool {
        if closes.len() < 20 || ema20.len() < 20 {
            return false;
        }

        let tolerance = dec_ratio(self.config.divergence_tolerance);
        let recent_closes = &closes[closes.len() - 20..];
        let recent_ema = &ema20[ema20.len() - 20..];
        let last_close = closes[closes.len() - 1];
        let last_ema = ema20[ema20.len() - 1];

        let close_high = recent_closes.iter().copied().fold(last_close, Decimal::max);
        let close_low = recent_closes.iter().copied().fold(last_close, Decimal::min);
        let ema_high = recent_ema.iter().copied().fold(last_ema, Decimal::max);
        let ema_low = recent_ema.iter().copied().fold(last_ema, Decimal::min);

        let near_high = !close_high.is_zero()
            && last_close >= close_high * (Decimal::ONE - tolerance)
            && !ema_high.is_zero()
            && last_ema < ema_high * (Decimal::ONE - tolerance);
        let near_low = !close_low.is_zero()
            && last_close <= close_low * (Decimal::ONE + tolerance)
            && !ema_low.is_zero()
            && last_ema > ema_low * (Decimal::ONE + tolerance);

        near_high || near_low
    }

    /// 타임프레임별 추세를 가중 융합합니다.
    ///
    /// 분석된 타임프레임이 하나도 없으면 `None`을 반환합니다. 일부
    /// 타임프레임만 있어도 나머지로 집계합니다 (부분 실패 허용).
    pub fn aggregate(
        &self,
        trends: Vec<TimeframeTrend>,
        failed_timeframes: Vec<Timeframe>,
    ) -> Option<MultiTimeframeTrend> {
        if trends.is_empty() {
            return None;
        }

        // 타임프레임 가중 평균 점수
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for t in &trends {
            let weight = f64::from(t.timeframe.weight());
            weighted_sum += t.trend.score() * weight;
            weight_total += weight;
        }
        let overall_trend = TrendDirection::from_score(weighted_sum / weight_total);

        let alignment = self.alignment(&trends, overall_trend);

        let mean_confidence =
            trends.iter().map(|t| t.confidence).sum::<f64>() / trends.len() as f64;
        let overall_confidence =
            (mean_confidence + alignment.alignment_score * 0.2).min(100.0);

        let suggestion = self.suggestion(overall_trend, &alignment);

        let timeframes: HashMap<Timeframe, TimeframeTrend> =
            trends.into_iter().map(|t| (t.timeframe, t)).collect();

        Some(MultiTimeframeTrend {
            overall_trend,
            overall_confidence,
            timeframes,
            alignment,
            suggestion,
            failed_timeframes,
        })
    }

    /// 타임프레임 간 정렬도를 계산합니다.
    ///
    /// RANGING은 방향이 없으므로 정렬 그룹으로 세지 않습니다.
    fn alignment(&self, trends: &[TimeframeTrend], overall: TrendDirection) -> TrendAlignment {
        let up = trends.iter().filter(|t| t.trend.is_up()).count();
        let down = trends.iter().filter(|t| t.trend.is_down()).count();

        let largest = up.max(down);
        let alignment_score = largest as f64 / trends.len() as f64 * 100.0;
        let is_aligned = largest as f64 / trends.len() as f64 >= self.config.alignment_ratio;

        let conflicting_timeframes = trends
            .iter()
            .filter(|t| {
                (overall.is_up() && t.trend.is_down()) || (overall.is_down() && t.trend.is_up())
            })
            .map(|t| t.timeframe)
            .collect();

        TrendAlignment {
            is_aligned,
            alignment_score,
            conflicting_timeframes,
        }
    }

    /// 종합 추세와 정렬도에서 매매 제안을 도출합니다.
    fn suggestion(&self, overall: TrendDirection, alignment: &TrendAlignment) -> TradingSuggestion {
        if alignment.is_aligned && alignment.alignment_score > 80.0 && overall.is_up() {
            let action = if overall.is_strong() {
                SuggestedAction::StrongBuy
            } else {
                SuggestedAction::Buy
            };
            TradingSuggestion {
                action,
                reason: format!("타임프레임 정렬 상승 추세 ({})", overall),
                risk_level: RiskLevel::Low,
            }
        } else if alignment.is_aligned && alignment.alignment_score > 80.0 && overall.is_down() {
            let action = if overall.is_strong() {
                SuggestedAction::StrongSell
            } else {
                SuggestedAction::Sell
            };
            TradingSuggestion {
                action,
                reason: format!("타임프레임 정렬 하락 추세 ({})", overall),
                risk_level: RiskLevel::Low,
            }
        } else if alignment.alignment_score < 50.0 {
            TradingSuggestion {
                action: SuggestedAction::Wait,
                reason: "타임프레임 간 추세 불일치".to_string(),
                risk_level: RiskLevel::High,
            }
        } else {
            TradingSuggestion {
                action: SuggestedAction::Hold,
                reason: format!("부분 정렬 상태 ({})", overall),
                risk_level: RiskLevel::Medium,
            }
        }
    }
}

impl Default for TrendAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// f64 설정 비율을 Decimal로 변환합니다.
fn dec_ratio(value: f64) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or(Decimal::ZERO)
}
