//! 종합 점수 타입.
//!
//! 이 모듈은 종합 스코어러가 생성하는 타입을 정의합니다.

use crate::domain::pattern::TradeSignal;
use serde::{Deserialize, Serialize};

/// 단일 타임프레임의 종합 점수.
///
/// 불변식: `signal`은 combined_score = (trend + momentum) / 2 에 대해
/// 20 초과면 BUY, -20 미만이면 SELL, 그 외 NEUTRAL 입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveScore {
    /// 추세 점수 (-100 ~ 100)
    pub trend: f64,
    /// 모멘텀 점수 (-100 ~ 100)
    pub momentum: f64,
    /// 변동성 점수 (0 ~ 100)
    pub volatility: f64,
    /// 매매 신호
    pub signal: TradeSignal,
    /// 신뢰도 (0 ~ 100)
    pub confidence: f64,
    /// 사람이 읽을 수 있는 요약
    pub summary: String,
}

impl ComprehensiveScore {
    /// 추세와 모멘텀의 산술 평균.
    pub fn combined_score(&self) -> f64 {
        (self.trend + self.momentum) / 2.0
    }
}
