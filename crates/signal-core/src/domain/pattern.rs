//! 차트 패턴 타입.
//!
//! 이 모듈은 패턴 엔진이 생성하는 타입을 정의합니다:
//! - `TradeSignal` - 매수/매도/중립 신호
//! - `PatternKind` - 패턴 종류
//! - `PatternResult` - 감지된 패턴 결과

use crate::domain::level::Level;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 매매 신호 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSignal {
    /// 매수
    Buy,
    /// 매도
    Sell,
    /// 중립
    Neutral,
}

impl std::fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSignal::Buy => write!(f, "BUY"),
            TradeSignal::Sell => write!(f, "SELL"),
            TradeSignal::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// 차트 패턴 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// 박스권 (지지/저항 사이 횡보)
    Box,
    /// 레벨 돌파
    Breakout,
    /// 방향성 추세 구간
    TrendRun,
    /// 이중 천장
    DoubleTop,
    /// 이중 바닥
    DoubleBottom,
    /// 헤드앤숄더
    HeadAndShoulders,
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternKind::Box => write!(f, "BOX"),
            PatternKind::Breakout => write!(f, "BREAKOUT"),
            PatternKind::TrendRun => write!(f, "TREND_RUN"),
            PatternKind::DoubleTop => write!(f, "DOUBLE_TOP"),
            PatternKind::DoubleBottom => write!(f, "DOUBLE_BOTTOM"),
            PatternKind::HeadAndShoulders => write!(f, "HEAD_AND_SHOULDERS"),
        }
    }
}

/// 감지된 차트 패턴.
///
/// 분석 호출마다 새로 생성되며 영속화되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternResult {
    /// 패턴 종류
    pub kind: PatternKind,
    /// 신호 방향
    pub signal: TradeSignal,
    /// 신뢰도 (0 ~ 100)
    pub confidence: f64,
    /// 패턴 시작 시각
    pub start_time: DateTime<Utc>,
    /// 패턴 종료 시각
    pub end_time: DateTime<Utc>,
    /// 사람이 읽을 수 있는 설명
    pub description: String,
    /// 패턴을 구성하는 핵심 레벨 (있는 경우)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub key_levels: Vec<Level>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_display() {
        assert_eq!(TradeSignal::Buy.to_string(), "BUY");
        assert_eq!(TradeSignal::Neutral.to_string(), "NEUTRAL");
    }

    #[test]
    fn test_pattern_kind_serde() {
        let json = serde_json::to_string(&PatternKind::HeadAndShoulders).unwrap();
        assert_eq!(json, "\"head_and_shoulders\"");
    }
}
