//! 분석 설정 관리.
//!
//! 이 모듈은 분석 엔진의 튜닝 가능한 휴리스틱을 정의합니다.
//! 알고리즘에 하드코딩하지 않고 설정으로 분리하여 개별적으로
//! 튜닝/테스트할 수 있도록 합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 분석 엔진 전체 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// 레벨 엔진 설정
    #[serde(default)]
    pub levels: LevelConfig,
    /// 패턴 엔진 설정
    #[serde(default)]
    pub patterns: PatternConfig,
    /// 추세 집계기 설정
    #[serde(default)]
    pub trend: TrendConfig,
}

/// 레벨 엔진 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LevelConfig {
    /// 스윙 감지 좌우 대칭 구간 크기
    pub swing_lookback: usize,
    /// 같은 방향 레벨 제외 마진 (0.001 = 0.1%)
    pub side_margin: f64,
    /// 레벨 반폭 계수 (가격 × 변동성 × 계수)
    pub half_width_factor: f64,
    /// 근접 보너스 기준: 현재가 대비 5% 이내
    pub near_ratio: f64,
    /// 근접 보너스 기준: 현재가 대비 10% 이내
    pub far_ratio: f64,
    /// 거래량 이상 캔들 기준 배수 (평균 대비)
    pub volume_spike_factor: f64,
    /// 레벨 병합 허용 거리 (현재가 대비 비율)
    pub merge_tolerance: f64,
    /// 병합 후 레벨 유지 최소 신뢰도
    pub min_confidence: f64,
    /// 매매 구간 편입 최소 신뢰도
    pub zone_min_confidence: f64,
    /// 저변동성 판정 기준 (수익률 표준편차)
    pub low_volatility: f64,
    /// 고변동성 판정 기준 (수익률 표준편차)
    pub high_volatility: f64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            swing_lookback: 5,
            side_margin: 0.001,
            half_width_factor: 0.5,
            near_ratio: 0.05,
            far_ratio: 0.10,
            volume_spike_factor: 2.0,
            merge_tolerance: 0.01,
            min_confidence: 40.0,
            zone_min_confidence: 60.0,
            low_volatility: 0.02,
            high_volatility: 0.05,
        }
    }
}

/// 패턴 엔진 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PatternConfig {
    /// 박스 높이 하한 (지지가 대비 비율)
    pub box_min_height: f64,
    /// 박스 높이 상한 (지지가 대비 비율)
    pub box_max_height: f64,
    /// 박스 최소 지속 캔들 수
    pub box_min_duration: usize,
    /// 박스 내부 유지 비율 하한
    pub box_containment: f64,
    /// 경계 터치 허용 오차
    pub touch_tolerance: f64,
    /// 경계별 최소 터치 횟수
    pub min_boundary_touches: usize,
    /// 돌파 판정 레벨 근접 기준 (종가 대비 비율)
    pub breakout_proximity: f64,
    /// 돌파 패턴 최소 신뢰도
    pub breakout_min_confidence: f64,
    /// 거래량 확인 배수 (직전 20캔들 평균 대비)
    pub volume_confirmation_factor: f64,
    /// 추세 구간 관찰 기간
    pub trend_run_period: usize,
    /// 추세 구간 최소 강도
    pub trend_run_min_strength: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            box_min_height: 0.02,
            box_max_height: 0.15,
            box_min_duration: 20,
            box_containment: 0.70,
            touch_tolerance: 0.01,
            min_boundary_touches: 2,
            breakout_proximity: 0.01,
            breakout_min_confidence: 60.0,
            volume_confirmation_factor: 1.5,
            trend_run_period: 20,
            trend_run_min_strength: 0.6,
        }
    }
}

/// 추세 집계기 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrendConfig {
    /// 타임프레임당 요청 캔들 수
    pub candle_limit: usize,
    /// 강한 추세 EMA20 기울기 기준
    pub strong_slope: f64,
    /// 보통 추세 EMA20 기울기 기준
    pub normal_slope: f64,
    /// 강한 추세 가격 확장 기준 (EMA20 대비)
    pub strong_extension: f64,
    /// 저변동성 판정 기준 (20캔들)
    pub low_volatility: f64,
    /// 고변동성 판정 기준 (20캔들)
    pub high_volatility: f64,
    /// 다이버전스 판정 허용 오차
    pub divergence_tolerance: f64,
    /// 정렬 판정 기준 (동일 방향 그룹 비율)
    pub alignment_ratio: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            candle_limit: 200,
            strong_slope: 0.002,
            normal_slope: 0.001,
            strong_extension: 0.05,
            low_volatility: 0.02,
            high_volatility: 0.05,
            divergence_tolerance: 0.02,
            alignment_ratio: 0.75,
        }
    }
}

impl AnalysisConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일 값은 기본값을 덮어쓰고, `SIGNAL__` 접두사의 환경 변수가
    /// 파일 값을 다시 덮어씁니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("SIGNAL")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_heuristics() {
        let config = AnalysisConfig::default();
        assert_eq!(config.levels.swing_lookback, 5);
        assert_eq!(config.patterns.box_min_duration, 20);
        assert_eq!(config.patterns.box_min_height, 0.02);
        assert_eq!(config.patterns.box_max_height, 0.15);
        assert_eq!(config.trend.candle_limit, 200);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = AnalysisConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.levels.swing_lookback, config.levels.swing_lookback);
        assert_eq!(parsed.trend.alignment_ratio, config.trend.alignment_ratio);
    }
}
