//! 레벨 엔진.
//!
//! 원시 캔들에서 스윙 고점/저점과 거래량 이상 캔들을 찾아 지지/저항
//! 레벨로 변환하고, 근접 중복 레벨을 병합하여 신뢰도가 매겨진
//! 레벨 목록을 생성합니다.
//!
//! # 알고리즘
//!
//! 1. 스윙 감지: 좌우 대칭 구간(`swing_lookback`) 내 최고가/최저가 판정
//! 2. 레벨 구성: 현재가 위(0.1% 마진)의 스윙 고점 → 저항,
//!    아래의 스윙 저점 → 지지 (같은 방향 레벨은 생성하지 않음)
//! 3. 가격 구간: 반폭 = 가격 × 시리즈 변동성 × 0.5
//! 4. 터치 집계: 관련 극값(지지=저가, 저항=고가)이 구간 안에 든 캔들 수
//! 5. 강도 점수(0~10) → WEAK/MEDIUM/STRONG/MAJOR (임계값 4/6/8)
//! 6. 신뢰도(0~100): 기본 50 + 터치 + 강도/타임프레임 보너스 ± 변동성 보정
//! 7. 거래량 이상 캔들(평균 2배 초과)은 MEDIUM/70 레벨 추가 생성
//! 8. 병합: 같은 유형이고 현재가의 1% 이내인 레벨은 가중 평균으로 통합

use rust_decimal::Decimal;
use signal_core::{
    Kline, KeyLevels, Level, LevelAnalysis, LevelConfig, LevelStrength, LevelType, PriceRange,
    Timeframe, TradingZone,
};
use tracing::debug;

use crate::indicators::VolatilityIndicators;

/// 레벨 엔진.
///
/// 설정된 휴리스틱으로 캔들 시리즈를 분석합니다. 상태를 갖지 않으며
/// 동일 입력에 대해 결정적입니다.
#[derive(Debug, Default)]
pub struct LevelEngine {
    volatility: VolatilityIndicators,
    config: LevelConfig,
}

impl LevelEngine {
    /// 기본 설정으로 레벨 엔진을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 지정한 설정으로 레벨 엔진을 생성합니다.
    pub fn with_config(config: LevelConfig) -> Self {
        Self {
            volatility: VolatilityIndicators::new(),
            config,
        }
    }

    /// 캔들 시리즈에서 지지/저항 레벨을 분석합니다.
    ///
    /// 캔들이 충분하지 않으면 빈 분석 결과를 반환합니다 (에러 아님).
    pub fn analyze(&self, candles: &[Kline], timeframe: Timeframe) -> LevelAnalysis {
        let Some(last) = candles.last() else {
            return Self::empty_analysis();
        };

        let current_price = last.close;
        if current_price <= Decimal::ZERO {
            return Self::empty_analysis();
        }

        let closes: Vec<Decimal> = candles.iter().map(|k| k.close).collect();
        let volatility = self.volatility.returns_volatility(&closes);

        let mut raw = self.swing_levels(candles, timeframe, current_price, volatility);
        raw.extend(self.volume_anomaly_levels(candles, timeframe, current_price, volatility));

        let consolidated = self.consolidate(raw, current_price);

        let mut supports: Vec<Level> = consolidated
            .iter()
            .filter(|l| l.level_type == LevelType::Support)
            .cloned()
            .collect();
        let mut resistances: Vec<Level> = consolidated
            .into_iter()
            .filter(|l| l.level_type == LevelType::Resistance)
            .collect();

        // 지지는 가격 내림차순(현재가에 가까운 순), 저항은 오름차순
        supports.sort_by(|a, b| b.price().cmp(&a.price()));
        resistances.sort_by(|a, b| a.price().cmp(&b.price()));

        let key_levels = Self::key_levels(&supports, &resistances);
        let trading_zones = self.trading_zones(&supports, &resistances);

        debug!(
            supports = supports.len(),
            resistances = resistances.len(),
            zones = trading_zones.len(),
            %current_price,
            "level analysis complete"
        );

        LevelAnalysis {
            supports,
            resistances,
            key_levels,
            trading_zones,
            current_price,
            volatility,
            candle_count: candles.len(),
        }
    }

    /// 스윙 고점/저점에서 레벨을 구성합니다.
    fn swing_levels(
        &self,
        candles: &[Kline],
        timeframe: Timeframe,
        current_price: Decimal,
        volatility: Decimal,
    ) -> Vec<Level> {
        let lookback = self.config.swing_lookback;
        if lookback == 0 || candles.len() < 2 * lookback + 1 {
            return Vec::new();
        }

        let margin = dec_ratio(self.config.side_margin);
        let upper_bound = current_price * (Decimal::ONE + margin);
        let lower_bound = current_price * (Decimal::ONE - margin);

        let mut levels = Vec::new();

        for i in lookback..candles.len() - lookback {
            let window = &candles[i - lookback..=i + lookback];
            let candle = &candles[i];

            let is_swing_high = window.iter().all(|k| candle.high >= k.high);
            let is_swing_low = window.iter().all(|k| candle.low <= k.low);

            if is_swing_high && candle.high > upper_bound {
                levels.push(self.build_level(
                    candles,
                    timeframe,
                    LevelType::Resistance,
                    candle.high,
                    current_price,
                    volatility,
                    None,
                ));
            }

            if is_swing_low && candle.low < lower_bound {
                levels.push(self.build_level(
                    candles,
                    timeframe,
                    LevelType::Support,
                    candle.low,
                    current_price,
                    volatility,
                    None,
                ));
            }
        }

        levels
    }

    /// 거래량 이상 캔들에서 레벨을 구성합니다.
    ///
    /// 평균 거래량의 `volume_spike_factor`배를 초과하는 캔들의 고가/저가는
    /// MEDIUM 강도, 신뢰도 70의 레벨을 추가로 생성합니다.
    fn volume_anomaly_levels(
        &self,
        candles: &[Kline],
        timeframe: Timeframe,
        current_price: Decimal,
        volatility: Decimal,
    ) -> Vec<Level> {
        if candles.is_empty() {
            return Vec::new();
        }

        let total: Decimal = candles.iter().map(|k| k.volume).sum();
        let mean = total / Decimal::from(candles.len());
        if mean.is_zero() {
            return Vec::new();
        }
        let threshold = mean * dec_ratio(self.config.volume_spike_factor);

        let margin = dec_ratio(self.config.side_margin);
        let upper_bound = current_price * (Decimal::ONE + margin);
        let lower_bound = current_price * (Decimal::ONE - margin);

        let fixed = Some((LevelStrength::Medium, 70.0));
        let mut levels = Vec::new();

        for candle in candles.iter().filter(|k| k.volume > threshold) {
            if candle.high > upper_bound {
                levels.push(self.build_level(
                    candles,
                    timeframe,
                    LevelType::Resistance,
                    candle.high,
                    current_price,
                    volatility,
                    fixed,
                ));
            }
            if candle.low < lower_bound {
                levels.push(self.build_level(
                    candles,
                    timeframe,
                    LevelType::Support,
                    candle.low,
                    current_price,
                    volatility,
                    fixed,
                ));
            }
        }

        levels
    }

    /// 중심 가격으로부터 레벨 하나를 구성합니다.
    ///
    /// `fixed`가 주어지면 강도/신뢰도를 점수 대신 고정값으로 사용합니다
    /// (거래량 이상 레벨).
    #[allow(clippy::too_many_arguments)]
    fn build_level(
        &self,
        candles: &[Kline],
        timeframe: Timeframe,
        level_type: LevelType,
        center: Decimal,
        current_price: Decimal,
        volatility: Decimal,
        fixed: Option<(LevelStrength, f64)>,
    ) -> Level {
        let half_width = center * volatility * dec_ratio(self.config.half_width_factor);
        let price_range = PriceRange::around(center, half_width);

        let mut touch_count = 0u32;
        let mut last_touch = None;
        for candle in candles {
            let extreme = match level_type {
                LevelType::Support => candle.low,
                LevelType::Resistance => candle.high,
            };
            if price_range.contains(extreme) {
                touch_count += 1;
                last_touch = Some(candle.open_time);
            }
        }

        let (strength, confidence) = match fixed {
            Some(pair) => pair,
            None => {
                let score = self.strength_score(touch_count, timeframe, center, current_price);
                let strength = LevelStrength::from_score(score);
                let confidence =
                    self.confidence(touch_count, strength, timeframe, volatility);
                (strength, confidence)
            }
        };

        Level {
            level_type,
            price_range,
            strength,
            confidence,
            touch_count,
            last_touch,
            timeframe,
            is_active: true,
        }
    }

    /// 0~10 강도 점수를 계산합니다.
    ///
    /// 터치 횟수 등급(≥5:4 / ≥3:3 / ≥2:2 / 그 외:1) + 타임프레임 가중치
    /// + 현재가 근접 보너스(5% 이내 2점, 10% 이내 1점).
    fn strength_score(
        &self,
        touch_count: u32,
        timeframe: Timeframe,
        center: Decimal,
        current_price: Decimal,
    ) -> u32 {
        let touch_score = match touch_count {
            t if t >= 5 => 4,
            t if t >= 3 => 3,
            t if t >= 2 => 2,
            _ => 1,
        };

        let distance = ((center - current_price) / current_price).abs();
        let proximity_score = if distance <= dec_ratio(self.config.near_ratio) {
            2
        } else if distance <= dec_ratio(self.config.far_ratio) {
            1
        } else {
            0
        };

        touch_score + timeframe.weight() + proximity_score
    }

    /// 0~100 신뢰도를 계산합니다.
    ///
    /// 기본 50 + 터치×10 + 강도 보너스 + 타임프레임 보너스 ± 변동성 보정.
    fn confidence(
        &self,
        touch_count: u32,
        strength: LevelStrength,
        timeframe: Timeframe,
        volatility: Decimal,
    ) -> f64 {
        let timeframe_bonus = match timeframe.weight() {
            4 => 15.0,
            3 => 10.0,
            2 => 5.0,
            _ => 0.0,
        };

        let volatility_adjustment = if volatility < dec_ratio(self.config.low_volatility) {
            10.0
        } else if volatility > dec_ratio(self.config.high_volatility) {
            -10.0
        } else {
            0.0
        };

        let confidence = 50.0
            + f64::from(touch_count) * 10.0
            + strength.confidence_bonus()
            + timeframe_bonus
            + volatility_adjustment;

        confidence.clamp(0.0, 100.0)
    }

    /// 근접 중복 레벨을 병합합니다.
    ///
    /// 같은 유형이고 중심 간 거리가 현재가의 `merge_tolerance` 이내인
    /// 레벨은 (타임프레임 가중치 × 강도 가중치) 가중 평균 중심으로
    /// 통합됩니다. 터치는 합산, 신뢰도는 min(기존+10, 100), 강도는 더
    /// 강한 쪽을 취합니다. 병합 후 신뢰도가 `min_confidence` 미만인
    /// 레벨은 폐기합니다. 추가 병합이 없어질 때까지 반복하므로 이미
    /// 병합된 목록에 다시 적용해도 결과가 변하지 않습니다.
    pub fn consolidate(&self, levels: Vec<Level>, current_price: Decimal) -> Vec<Level> {
        let tolerance = current_price * dec_ratio(self.config.merge_tolerance);

        let mut merged = levels;
        // 결정성을 위해 (유형, 중심) 기준 정렬
        merged.sort_by(|a, b| {
            (a.level_type as u8)
                .cmp(&(b.level_type as u8))
                .then(a.price().cmp(&b.price()))
        });

        loop {
            let (next, changed) = Self::merge_pass(merged, tolerance);
            merged = next;
            if !changed {
                break;
            }
        }

        merged
            .into_iter()
            .filter(|l| l.confidence >= self.config.min_confidence)
            .collect()
    }

    /// 병합 1회 패스. 변경 여부를 함께 반환합니다.
    fn merge_pass(levels: Vec<Level>, tolerance: Decimal) -> (Vec<Level>, bool) {
        let mut result: Vec<Level> = Vec::with_capacity(levels.len());
        let mut changed = false;

        for level in levels {
            let slot = result.iter_mut().find(|existing| {
                existing.level_type == level.level_type
                    && (existing.price() - level.price()).abs() <= tolerance
            });

            match slot {
                Some(existing) => {
                    *existing = Self::merge_two(existing, &level);
                    changed = true;
                }
                None => result.push(level),
            }
        }

        (result, changed)
    }

    /// 두 레벨을 하나로 병합합니다.
    fn merge_two(existing: &Level, incoming: &Level) -> Level {
        let weight = |l: &Level| {
            Decimal::from(l.timeframe.weight() * l.strength.weight())
        };
        let w_a = weight(existing);
        let w_b = weight(incoming);
        let center = (existing.price() * w_a + incoming.price() * w_b) / (w_a + w_b);

        let half_width = |l: &Level| (l.price_range.max - l.price_range.min) / Decimal::from(2);
        let merged_half_width = half_width(existing).max(half_width(incoming));

        Level {
            level_type: existing.level_type,
            price_range: PriceRange::around(center, merged_half_width),
            strength: existing.strength.max(incoming.strength),
            confidence: (existing.confidence + 10.0).min(100.0),
            touch_count: existing.touch_count + incoming.touch_count,
            last_touch: existing.last_touch.max(incoming.last_touch),
            timeframe: if incoming.timeframe.weight() > existing.timeframe.weight() {
                incoming.timeframe
            } else {
                existing.timeframe
            },
            is_active: true,
        }
    }

    /// 현재가 기준 핵심 레벨을 선정합니다.
    ///
    /// 입력 목록은 이미 현재가에 가까운 순으로 정렬되어 있습니다.
    fn key_levels(supports: &[Level], resistances: &[Level]) -> KeyLevels {
        let strongest = |levels: &[Level]| {
            levels
                .iter()
                .max_by(|a, b| {
                    a.strength.cmp(&b.strength).then(
                        a.confidence
                            .partial_cmp(&b.confidence)
                            .unwrap_or(std::cmp::Ordering::Equal),
                    )
                })
                .cloned()
        };

        KeyLevels {
            nearest_support: supports.first().cloned(),
            nearest_resistance: resistances.first().cloned(),
            strongest_support: strongest(supports),
            strongest_resistance: strongest(resistances),
        }
    }

    /// 매수/매도 구간을 도출합니다.
    ///
    /// 강도가 WEAK가 아니고 신뢰도가 `zone_min_confidence`를 초과하는
    /// 레벨만 구간으로 승격됩니다.
    fn trading_zones(&self, supports: &[Level], resistances: &[Level]) -> Vec<TradingZone> {
        supports
            .iter()
            .chain(resistances.iter())
            .filter(|l| {
                l.strength != LevelStrength::Weak
                    && l.confidence > self.config.zone_min_confidence
            })
            .map(|l| TradingZone {
                zone_type: l.level_type,
                price_range: l.price_range,
                strength: l.strength,
                confidence: l.confidence,
            })
            .collect()
    }

    fn empty_analysis() -> LevelAnalysis {
        LevelAnalysis {
            supports: Vec::new(),
            resistances: Vec::new(),
            key_levels: KeyLevels::default(),
            trading_zones: Vec::new(),
            current_price: Decimal::ZERO,
            volatility: Decimal::ZERO,
            candle_count: 0,
        }
    }
}

/// f64 설정 비율을 Decimal로 변환합니다.
fn dec_ratio(value: f64) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or(Decimal::ZERO)
}
