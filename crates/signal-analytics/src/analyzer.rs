//! 시장 분석기 파사드.
//!
//! 캔들 제공자와 다섯 개의 분석 엔진을 묶어 세 가지 진입점을 제공합니다:
//! - [`MarketAnalyzer::analyze_support_resistance`] - 지지/저항 레벨 분석
//! - [`MarketAnalyzer::analyze_multi_timeframe_trend`] - 다중 타임프레임 추세
//! - [`MarketAnalyzer::perform_comprehensive_analysis`] - 종합 분석 리포트
//!
//! 부분 실패 정책: 하위 분석(타임프레임 조회, 패턴 감지기) 하나의 실패는
//! 전체 요청을 중단하지 않고 결과에서 제외된 뒤 이름으로 보고됩니다.
//! 분석 엔진은 시계를 읽지 않으며, 리포트 시각은 마지막 캔들의 종료
//! 시각에서 가져옵니다 (같은 입력이면 같은 출력).

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use signal_core::{
    AnalysisConfig, CandleProvider, ComprehensiveScore, Kline, LevelAnalysis, MultiTimeframeTrend,
    PatternResult, SignalError, SignalResult, Symbol, Timeframe,
};
use tracing::{info, instrument, warn};

use crate::comprehensive::ComprehensiveScorer;
use crate::levels::LevelEngine;
use crate::multi_timeframe::TrendAggregator;
use crate::patterns::PatternEngine;

/// 단일 심볼/타임프레임의 종합 분석 리포트.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveAnalysis {
    /// 분석 대상 심볼
    pub symbol: Symbol,
    /// 분석 타임프레임
    pub timeframe: Timeframe,
    /// 분석 기준 시각 (마지막 캔들 종료 시각)
    pub analyzed_at: DateTime<Utc>,
    /// 종합 점수
    pub score: ComprehensiveScore,
    /// 인식된 패턴 (신뢰도 내림차순)
    pub patterns: Vec<PatternResult>,
    /// 레벨 분석
    pub levels: LevelAnalysis,
    /// 실패한 하위 분석 이름
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub failed_analyses: Vec<String>,
}

/// 시장 분석기.
///
/// 제공자는 캔들 조회만 담당하고, 모든 계산은 내부 엔진이 수행합니다.
pub struct MarketAnalyzer<P> {
    provider: P,
    levels: LevelEngine,
    patterns: PatternEngine,
    scorer: ComprehensiveScorer,
    aggregator: TrendAggregator,
    config: AnalysisConfig,
}

impl<P: CandleProvider> MarketAnalyzer<P> {
    /// 기본 설정으로 분석기를 생성합니다.
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, AnalysisConfig::default())
    }

    /// 지정한 설정으로 분석기를 생성합니다.
    pub fn with_config(provider: P, config: AnalysisConfig) -> Self {
        Self {
            provider,
            levels: LevelEngine::with_config(config.levels.clone()),
            patterns: PatternEngine::with_config(config.patterns.clone()),
            scorer: ComprehensiveScorer::new(),
            aggregator: TrendAggregator::with_config(config.trend.clone()),
            config,
        }
    }

    /// 지지/저항 레벨을 분석합니다.
    ///
    /// # 에러
    ///
    /// 잘못된 심볼이면 `InvalidInput`, 캔들 조회 실패면 `Data`.
    /// 캔들이 부족한 경우는 에러가 아니라 빈 분석 결과입니다.
    #[instrument(skip(self), fields(%symbol, %timeframe))]
    pub async fn analyze_support_resistance(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> SignalResult<LevelAnalysis> {
        validate_symbol(symbol)?;

        let candles = self.fetch(symbol, timeframe).await?;
        let analysis = self.levels.analyze(&candles, timeframe);
        info!(
            supports = analysis.supports.len(),
            resistances = analysis.resistances.len(),
            "레벨 분석 완료"
        );
        Ok(analysis)
    }

    /// 다중 타임프레임 추세를 분석합니다.
    ///
    /// 고정 타임프레임 세트(15m/1h/4h/1d)를 병렬 조회한 뒤 성공한
    /// 타임프레임만으로 집계합니다. 실패한 타임프레임은 결과의
    /// `failed_timeframes`에 보고됩니다.
    ///
    /// # 에러
    ///
    /// 잘못된 심볼이면 `InvalidInput`, 모든 타임프레임이 실패하면 `Data`.
    #[instrument(skip(self), fields(%symbol))]
    pub async fn analyze_multi_timeframe_trend(
        &self,
        symbol: &Symbol,
    ) -> SignalResult<MultiTimeframeTrend> {
        validate_symbol(symbol)?;

        let fetches = Timeframe::TREND_SET
            .iter()
            .map(|&tf| async move { (tf, self.fetch(symbol, tf).await) });
        let results = join_all(fetches).await;

        let mut trends = Vec::new();
        let mut failed = Vec::new();
        for (timeframe, result) in results {
            match result {
                Ok(candles) => match self.aggregator.classify(&candles, timeframe) {
                    Some(trend) => trends.push(trend),
                    None => {
                        warn!(%timeframe, "캔들 부족으로 타임프레임 제외");
                        failed.push(timeframe);
                    }
                },
                Err(e) => {
                    warn!(%timeframe, error = %e, "타임프레임 캔들 조회 실패");
                    failed.push(timeframe);
                }
            }
        }

        self.aggregator
            .aggregate(trends, failed)
            .ok_or_else(|| SignalError::Data("분석 가능한 타임프레임이 없습니다".to_string()))
    }

    /// 종합 분석을 수행합니다.
    ///
    /// 레벨 분석, 패턴 인식, 종합 점수를 하나의 리포트로 묶습니다.
    /// 실패한 패턴 감지기는 `failed_analyses`에 `pattern:<이름>` 형태로
    /// 보고됩니다.
    #[instrument(skip(self), fields(%symbol, %timeframe))]
    pub async fn perform_comprehensive_analysis(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> SignalResult<ComprehensiveAnalysis> {
        validate_symbol(symbol)?;

        let candles = self.fetch(symbol, timeframe).await?;

        let levels = self.levels.analyze(&candles, timeframe);
        let recognition = self.patterns.recognize_all(&candles, &levels);
        let score = self.scorer.score(&candles, &recognition.patterns, &levels);

        let failed_analyses = recognition
            .failed_detectors
            .iter()
            .map(|name| format!("pattern:{}", name))
            .collect();

        let analyzed_at = candles
            .last()
            .map(|k| k.close_time)
            .unwrap_or_else(Utc::now);

        info!(
            signal = %score.signal,
            confidence = score.confidence,
            patterns = recognition.patterns.len(),
            "종합 분석 완료"
        );

        Ok(ComprehensiveAnalysis {
            symbol: symbol.clone(),
            timeframe,
            analyzed_at,
            score,
            patterns: recognition.patterns,
            levels,
            failed_analyses,
        })
    }

    /// 캔들을 조회합니다. 제공자 오류는 `Data` 오류로 변환됩니다.
    async fn fetch(&self, symbol: &Symbol, timeframe: Timeframe) -> SignalResult<Vec<Kline>> {
        self.provider
            .get_candles(symbol, timeframe, self.config.trend.candle_limit)
            .await
            .map_err(|e| SignalError::Data(e.to_string()))
    }
}

/// 심볼 입력 검증. 계산 시작 전에 거부합니다.
fn validate_symbol(symbol: &Symbol) -> SignalResult<()> {
    if !symbol.is_valid() {
        return Err(SignalError::InvalidInput(format!(
            "잘못된 심볼: {}",
            symbol
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use signal_core::ProviderError;
    use std::collections::HashMap;

    /// 타임프레임별 고정 캔들을 반환하는 테스트 제공자.
    struct MockProvider {
        candles: HashMap<Timeframe, Vec<Kline>>,
        fail_timeframes: Vec<Timeframe>,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                candles: HashMap::new(),
                fail_timeframes: Vec::new(),
            }
        }

        fn with_series(mut self, timeframe: Timeframe, candles: Vec<Kline>) -> Self {
            self.candles.insert(timeframe, candles);
            self
        }

        fn failing(mut self, timeframe: Timeframe) -> Self {
            self.fail_timeframes.push(timeframe);
            self
        }
    }

    #[async_trait]
    impl CandleProvider for MockProvider {
        async fn get_candles(
            &self,
            _symbol: &Symbol,
            timeframe: Timeframe,
            limit: usize,
        ) -> Result<Vec<Kline>, ProviderError> {
            if self.fail_timeframes.contains(&timeframe) {
                return Err(ProviderError::Network("connection refused".to_string()));
            }
            let series = self.candles.get(&timeframe).cloned().unwrap_or_default();
            Ok(series.into_iter().take(limit).collect())
        }
    }

    fn rising_series(timeframe: Timeframe, len: i64) -> Vec<Kline> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let step = chrono::Duration::from_std(timeframe.duration()).unwrap();
        (0..len)
            .map(|i| {
                let price =
                    Decimal::from_f64_retain(100.0 * 1.005f64.powi(i as i32)).unwrap();
                Kline::new(
                    Symbol::crypto("BTC", "USDT"),
                    timeframe,
                    start + step * i as i32,
                    price - dec!(0.2),
                    price + dec!(0.5),
                    price - dec!(0.5),
                    price,
                    dec!(1000),
                    start + step * (i + 1) as i32,
                )
            })
            .collect()
    }

    fn symbol() -> Symbol {
        Symbol::crypto("BTC", "USDT")
    }

    #[tokio::test]
    async fn test_invalid_symbol_rejected() {
        let analyzer = MarketAnalyzer::new(MockProvider::new());
        let bad = Symbol::crypto("", "USDT");

        let result = analyzer
            .analyze_support_resistance(&bad, Timeframe::H1)
            .await;
        assert!(matches!(result, Err(SignalError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_empty_candles_give_empty_analysis() {
        let analyzer = MarketAnalyzer::new(MockProvider::new());
        let analysis = analyzer
            .analyze_support_resistance(&symbol(), Timeframe::H1)
            .await
            .unwrap();

        assert!(analysis.supports.is_empty());
        assert!(analysis.resistances.is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_as_data_error() {
        let provider = MockProvider::new().failing(Timeframe::H1);
        let analyzer = MarketAnalyzer::new(provider);

        let result = analyzer
            .analyze_support_resistance(&symbol(), Timeframe::H1)
            .await;
        assert!(matches!(result, Err(SignalError::Data(_))));
    }

    #[tokio::test]
    async fn test_multi_timeframe_partial_failure_tolerated() {
        let mut provider = MockProvider::new().failing(Timeframe::D1);
        for tf in [Timeframe::M15, Timeframe::H1, Timeframe::H4] {
            provider = provider.with_series(tf, rising_series(tf, 200));
        }
        let analyzer = MarketAnalyzer::new(provider);

        let result = analyzer
            .analyze_multi_timeframe_trend(&symbol())
            .await
            .unwrap();

        assert_eq!(result.failed_timeframes, vec![Timeframe::D1]);
        assert_eq!(result.timeframes.len(), 3);
        assert!(result.overall_trend.is_up());
    }

    #[tokio::test]
    async fn test_multi_timeframe_all_failed_is_error() {
        let provider = Timeframe::TREND_SET
            .iter()
            .fold(MockProvider::new(), |p, &tf| p.failing(tf));
        let analyzer = MarketAnalyzer::new(provider);

        let result = analyzer.analyze_multi_timeframe_trend(&symbol()).await;
        assert!(matches!(result, Err(SignalError::Data(_))));
    }

    #[tokio::test]
    async fn test_comprehensive_analysis_timestamp_from_last_candle() {
        let series = rising_series(Timeframe::H1, 200);
        let expected = series.last().unwrap().close_time;
        let provider = MockProvider::new().with_series(Timeframe::H1, series);
        let analyzer = MarketAnalyzer::new(provider);

        let report = analyzer
            .perform_comprehensive_analysis(&symbol(), Timeframe::H1)
            .await
            .unwrap();

        assert_eq!(report.analyzed_at, expected);
        assert!(report.failed_analyses.is_empty());
        assert!(report.score.trend > 0.0);
    }

    #[tokio::test]
    async fn test_comprehensive_analysis_deterministic() {
        let series = rising_series(Timeframe::H1, 200);
        let provider = MockProvider::new().with_series(Timeframe::H1, series.clone());
        let analyzer = MarketAnalyzer::new(provider);

        let first = analyzer
            .perform_comprehensive_analysis(&symbol(), Timeframe::H1)
            .await
            .unwrap();
        let second = analyzer
            .perform_comprehensive_analysis(&symbol(), Timeframe::H1)
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
