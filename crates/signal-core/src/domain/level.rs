//! 지지/저항 레벨 타입.
//!
//! 이 모듈은 레벨 엔진이 생성하는 지지/저항 관련 타입을 정의합니다:
//! - `LevelType` - 지지 또는 저항
//! - `LevelStrength` - 레벨 강도 등급
//! - `Level` - 신뢰도가 매겨진 지지/저항 가격 구간
//! - `KeyLevels` - 현재가 기준 핵심 레벨
//! - `TradingZone` - 매수/매도 구간
//! - `LevelAnalysis` - 레벨 엔진의 전체 출력

use crate::types::{Price, Timeframe};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 레벨 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelType {
    /// 지지 레벨 (현재가 아래)
    Support,
    /// 저항 레벨 (현재가 위)
    Resistance,
}

impl std::fmt::Display for LevelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelType::Support => write!(f, "SUPPORT"),
            LevelType::Resistance => write!(f, "RESISTANCE"),
        }
    }
}

/// 레벨 강도 등급.
///
/// 내림차순 서열: MAJOR > STRONG > MEDIUM > WEAK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelStrength {
    /// 약함
    Weak,
    /// 보통
    Medium,
    /// 강함
    Strong,
    /// 주요 레벨
    Major,
}

impl LevelStrength {
    /// 0~10 강도 점수를 등급으로 변환합니다 (임계값 4/6/8).
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 8 => LevelStrength::Major,
            s if s >= 6 => LevelStrength::Strong,
            s if s >= 4 => LevelStrength::Medium,
            _ => LevelStrength::Weak,
        }
    }

    /// 병합 가중 평균에 사용되는 강도 가중치.
    pub fn weight(&self) -> u32 {
        match self {
            LevelStrength::Weak => 1,
            LevelStrength::Medium => 2,
            LevelStrength::Strong => 3,
            LevelStrength::Major => 4,
        }
    }

    /// 신뢰도 계산에 사용되는 강도 보너스.
    pub fn confidence_bonus(&self) -> f64 {
        match self {
            LevelStrength::Major => 20.0,
            LevelStrength::Strong => 15.0,
            LevelStrength::Medium => 10.0,
            LevelStrength::Weak => 0.0,
        }
    }
}

/// 레벨의 가격 구간.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    /// 구간 하단
    pub min: Price,
    /// 구간 상단
    pub max: Price,
    /// 구간 중심
    pub center: Price,
}

impl PriceRange {
    /// 중심과 반폭으로 구간을 생성합니다.
    pub fn around(center: Price, half_width: Decimal) -> Self {
        Self {
            min: center - half_width,
            max: center + half_width,
            center,
        }
    }

    /// 가격이 구간 안에 있는지 확인합니다.
    pub fn contains(&self, price: Price) -> bool {
        price >= self.min && price <= self.max
    }
}

/// 신뢰도가 매겨진 지지/저항 레벨.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// 레벨 유형
    pub level_type: LevelType,
    /// 가격 구간
    pub price_range: PriceRange,
    /// 강도 등급
    pub strength: LevelStrength,
    /// 신뢰도 (0 ~ 100)
    pub confidence: f64,
    /// 터치 횟수
    pub touch_count: u32,
    /// 마지막 터치 시각
    pub last_touch: Option<DateTime<Utc>>,
    /// 발견된 타임프레임
    pub timeframe: Timeframe,
    /// 활성 여부
    pub is_active: bool,
}

impl Level {
    /// 레벨 중심 가격을 반환합니다.
    pub fn price(&self) -> Price {
        self.price_range.center
    }

    /// 현재가 대비 거리 비율(절대값)을 반환합니다.
    pub fn distance_ratio(&self, current_price: Price) -> Decimal {
        if current_price.is_zero() {
            return Decimal::ZERO;
        }
        ((self.price_range.center - current_price) / current_price).abs()
    }
}

/// 현재가 기준 핵심 레벨.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyLevels {
    /// 현재가에 가장 가까운 지지
    pub nearest_support: Option<Level>,
    /// 현재가에 가장 가까운 저항
    pub nearest_resistance: Option<Level>,
    /// 가장 강한 지지
    pub strongest_support: Option<Level>,
    /// 가장 강한 저항
    pub strongest_resistance: Option<Level>,
}

/// 매수/매도 구간.
///
/// 강도가 WEAK가 아니고 신뢰도가 60을 초과하는 레벨에서 파생됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingZone {
    /// 구간 유형 (지지 = 매수 구간, 저항 = 매도 구간)
    pub zone_type: LevelType,
    /// 가격 구간
    pub price_range: PriceRange,
    /// 기반 레벨의 강도
    pub strength: LevelStrength,
    /// 기반 레벨의 신뢰도
    pub confidence: f64,
}

/// 레벨 엔진의 전체 출력.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelAnalysis {
    /// 지지 레벨 (가격 내림차순, 현재가에 가까운 순)
    pub supports: Vec<Level>,
    /// 저항 레벨 (가격 오름차순, 현재가에 가까운 순)
    pub resistances: Vec<Level>,
    /// 핵심 레벨
    pub key_levels: KeyLevels,
    /// 매수/매도 구간
    pub trading_zones: Vec<TradingZone>,
    /// 분석 시점의 현재가 (마지막 종가)
    pub current_price: Price,
    /// 시리즈 수익률의 모표준편차 (레벨 반폭 계산에 사용된 값)
    pub volatility: Decimal,
    /// 분석에 사용된 캔들 개수
    pub candle_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_strength_from_score() {
        assert_eq!(LevelStrength::from_score(9), LevelStrength::Major);
        assert_eq!(LevelStrength::from_score(8), LevelStrength::Major);
        assert_eq!(LevelStrength::from_score(7), LevelStrength::Strong);
        assert_eq!(LevelStrength::from_score(5), LevelStrength::Medium);
        assert_eq!(LevelStrength::from_score(3), LevelStrength::Weak);
    }

    #[test]
    fn test_strength_ordering() {
        assert!(LevelStrength::Major > LevelStrength::Strong);
        assert!(LevelStrength::Strong > LevelStrength::Medium);
        assert!(LevelStrength::Medium > LevelStrength::Weak);
    }

    #[test]
    fn test_price_range_contains() {
        let range = PriceRange::around(dec!(100), dec!(2));
        assert!(range.contains(dec!(99)));
        assert!(range.contains(dec!(102)));
        assert!(!range.contains(dec!(102.5)));
    }
}
