//! 추세 분석 타입.
//!
//! 이 모듈은 추세 집계기가 생성하는 타입을 정의합니다:
//! - `TrendDirection` - 7단계 추세 상태
//! - `TimeframeTrend` - 단일 타임프레임 추세
//! - `TrendAlignment` - 타임프레임 간 정렬도
//! - `TradingSuggestion` - 매매 제안
//! - `MultiTimeframeTrend` - 다중 타임프레임 종합 추세

use crate::types::{Price, Timeframe};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 7단계 추세 상태.
///
/// 강한 상승부터 강한 하락까지 서열이 있는 열거형입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// 강한 상승 추세
    StrongUptrend,
    /// 상승 추세
    Uptrend,
    /// 약한 상승 추세
    WeakUptrend,
    /// 횡보
    Ranging,
    /// 약한 하락 추세
    WeakDowntrend,
    /// 하락 추세
    Downtrend,
    /// 강한 하락 추세
    StrongDowntrend,
}

impl TrendDirection {
    /// 가중 집계에 사용되는 7점 점수 (+3 ~ -3).
    pub fn score(&self) -> f64 {
        match self {
            TrendDirection::StrongUptrend => 3.0,
            TrendDirection::Uptrend => 2.0,
            TrendDirection::WeakUptrend => 1.0,
            TrendDirection::Ranging => 0.0,
            TrendDirection::WeakDowntrend => -1.0,
            TrendDirection::Downtrend => -2.0,
            TrendDirection::StrongDowntrend => -3.0,
        }
    }

    /// 가중 평균 점수에서 추세 상태를 결정합니다 (임계값 ±2.5/±1.5/±0.5).
    pub fn from_score(score: f64) -> Self {
        if score >= 2.5 {
            TrendDirection::StrongUptrend
        } else if score >= 1.5 {
            TrendDirection::Uptrend
        } else if score >= 0.5 {
            TrendDirection::WeakUptrend
        } else if score <= -2.5 {
            TrendDirection::StrongDowntrend
        } else if score <= -1.5 {
            TrendDirection::Downtrend
        } else if score <= -0.5 {
            TrendDirection::WeakDowntrend
        } else {
            TrendDirection::Ranging
        }
    }

    /// 상승 계열인지 확인합니다.
    pub fn is_up(&self) -> bool {
        self.score() > 0.0
    }

    /// 하락 계열인지 확인합니다.
    pub fn is_down(&self) -> bool {
        self.score() < 0.0
    }

    /// 강한 추세(STRONG 계열)인지 확인합니다.
    pub fn is_strong(&self) -> bool {
        matches!(
            self,
            TrendDirection::StrongUptrend | TrendDirection::StrongDowntrend
        )
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TrendDirection::StrongUptrend => "STRONG_UPTREND",
            TrendDirection::Uptrend => "UPTREND",
            TrendDirection::WeakUptrend => "WEAK_UPTREND",
            TrendDirection::Ranging => "RANGING",
            TrendDirection::WeakDowntrend => "WEAK_DOWNTREND",
            TrendDirection::Downtrend => "DOWNTREND",
            TrendDirection::StrongDowntrend => "STRONG_DOWNTREND",
        };
        write!(f, "{}", s)
    }
}

/// 단일 타임프레임의 추세 분석 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeframeTrend {
    /// 타임프레임
    pub timeframe: Timeframe,
    /// 추세 상태
    pub trend: TrendDirection,
    /// 신뢰도 (0 ~ 100)
    pub confidence: f64,
    /// 추세 강도 (0 ~ 100)
    pub trend_strength: f64,
    /// 현재가 (마지막 종가)
    pub current_price: Price,
    /// EMA20 마지막 값
    pub ema20: Price,
    /// EMA60 마지막 값
    pub ema60: Price,
    /// EMA120 마지막 값
    pub ema120: Price,
    /// 다이버전스 감지 여부
    pub divergence: bool,
}

/// 타임프레임 간 추세 정렬도.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendAlignment {
    /// 정렬 여부 (분석된 타임프레임의 75% 이상이 같은 방향)
    pub is_aligned: bool,
    /// 정렬 점수 (최대 동일 방향 그룹 크기 / 전체 × 100)
    pub alignment_score: f64,
    /// 종합 추세와 반대 방향인 타임프레임
    pub conflicting_timeframes: Vec<Timeframe>,
}

/// 매매 제안 액션.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// 강한 매수
    StrongBuy,
    /// 매수
    Buy,
    /// 보유
    Hold,
    /// 매도
    Sell,
    /// 강한 매도
    StrongSell,
    /// 관망
    Wait,
}

/// 리스크 수준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// 낮음
    Low,
    /// 보통
    Medium,
    /// 높음
    High,
}

/// 매매 제안.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSuggestion {
    /// 제안 액션
    pub action: SuggestedAction,
    /// 제안 근거
    pub reason: String,
    /// 리스크 수준
    pub risk_level: RiskLevel,
}

/// 다중 타임프레임 종합 추세.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiTimeframeTrend {
    /// 종합 추세
    pub overall_trend: TrendDirection,
    /// 종합 신뢰도 (0 ~ 100)
    pub overall_confidence: f64,
    /// 타임프레임별 추세
    pub timeframes: HashMap<Timeframe, TimeframeTrend>,
    /// 정렬도
    pub alignment: TrendAlignment,
    /// 매매 제안
    pub suggestion: TradingSuggestion,
    /// 데이터 조회에 실패하여 집계에서 제외된 타임프레임
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub failed_timeframes: Vec<Timeframe>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_score_roundtrip() {
        assert_eq!(
            TrendDirection::from_score(TrendDirection::StrongUptrend.score()),
            TrendDirection::StrongUptrend
        );
        assert_eq!(TrendDirection::from_score(0.0), TrendDirection::Ranging);
        assert_eq!(TrendDirection::from_score(0.4), TrendDirection::Ranging);
        assert_eq!(TrendDirection::from_score(-1.7), TrendDirection::Downtrend);
        assert_eq!(TrendDirection::from_score(2.5), TrendDirection::StrongUptrend);
    }

    #[test]
    fn test_trend_direction_helpers() {
        assert!(TrendDirection::WeakUptrend.is_up());
        assert!(TrendDirection::StrongDowntrend.is_down());
        assert!(TrendDirection::StrongDowntrend.is_strong());
        assert!(!TrendDirection::Ranging.is_up());
        assert!(!TrendDirection::Ranging.is_down());
    }
}
