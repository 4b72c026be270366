//! 분석 파이프라인 통합 테스트.
//!
//! 합성 캔들 시리즈로 전체 파이프라인을 검증합니다:
//! 1. 모의 제공자에 시나리오별 캔들 주입
//! 2. 레벨 → 패턴 → 점수 → 리포트 연결
//! 3. 시나리오별 기대 신호 확인

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use signal_analytics::MarketAnalyzer;
use signal_core::{CandleProvider, Kline, ProviderError, Symbol, Timeframe, TradeSignal};

/// 타임프레임별 고정 시리즈를 반환하는 모의 제공자.
struct ScenarioProvider {
    series: HashMap<Timeframe, Vec<Kline>>,
}

impl ScenarioProvider {
    fn single(timeframe: Timeframe, candles: Vec<Kline>) -> Self {
        let mut series = HashMap::new();
        series.insert(timeframe, candles);
        Self { series }
    }

    fn all_trend_timeframes(build: impl Fn(Timeframe) -> Vec<Kline>) -> Self {
        let series = Timeframe::TREND_SET
            .iter()
            .map(|&tf| (tf, build(tf)))
            .collect();
        Self { series }
    }
}

#[async_trait]
impl CandleProvider for ScenarioProvider {
    async fn get_candles(
        &self,
        _symbol: &Symbol,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Kline>, ProviderError> {
        let candles = self.series.get(&timeframe).cloned().unwrap_or_default();
        Ok(candles.into_iter().take(limit).collect())
    }
}

fn symbol() -> Symbol {
    Symbol::crypto("BTC", "USDT")
}

fn candle(
    timeframe: Timeframe,
    i: i64,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
) -> Kline {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let step = Duration::from_std(timeframe.duration()).unwrap();
    Kline::new(
        symbol(),
        timeframe,
        start + step * i as i32,
        open,
        high,
        low,
        close,
        volume,
        start + step * (i + 1) as i32,
    )
}

/// 매 캔들 일정 비율로 상승하는 시리즈.
fn geometric_rise(timeframe: Timeframe, len: i64, rate: f64) -> Vec<Kline> {
    (0..len)
        .map(|i| {
            let price = Decimal::from_f64_retain(100.0 * (1.0 + rate).powi(i as i32)).unwrap();
            candle(
                timeframe,
                i,
                price * dec!(0.998),
                price * dec!(1.004),
                price * dec!(0.996),
                price,
                dec!(1000),
            )
        })
        .collect()
}

/// 100과 110 사이를 왕복하는 박스권 시리즈.
fn box_range(timeframe: Timeframe, len: i64) -> Vec<Kline> {
    (0..len)
        .map(|i| {
            if i % 2 == 0 {
                candle(
                    timeframe,
                    i,
                    dec!(104),
                    dec!(105),
                    dec!(100),
                    dec!(101),
                    dec!(1000),
                )
            } else {
                candle(
                    timeframe,
                    i,
                    dec!(103),
                    dec!(110),
                    dec!(102),
                    dec!(108),
                    dec!(1000),
                )
            }
        })
        .collect()
}

#[tokio::test]
async fn comprehensive_analysis_on_strong_rise_signals_buy() {
    let provider = ScenarioProvider::single(Timeframe::H1, geometric_rise(Timeframe::H1, 200, 0.01));
    let analyzer = MarketAnalyzer::new(provider);

    let report = analyzer
        .perform_comprehensive_analysis(&symbol(), Timeframe::H1)
        .await
        .unwrap();

    assert_eq!(report.score.signal, TradeSignal::Buy);
    assert!(report.score.trend > 0.0);
    assert!(report.score.momentum > 0.0);
    assert!(report.failed_analyses.is_empty());
}

#[tokio::test]
async fn comprehensive_analysis_on_box_range_finds_box_pattern() {
    let provider = ScenarioProvider::single(Timeframe::H1, box_range(Timeframe::H1, 60));
    let analyzer = MarketAnalyzer::new(provider);

    let report = analyzer
        .perform_comprehensive_analysis(&symbol(), Timeframe::H1)
        .await
        .unwrap();

    let box_pattern = report
        .patterns
        .iter()
        .find(|p| p.kind == signal_core::PatternKind::Box)
        .expect("박스권 패턴이 감지되어야 한다");

    assert_eq!(box_pattern.signal, TradeSignal::Neutral);
    assert!(box_pattern.confidence >= 70.0);
    // 레벨 분석도 같은 경계를 찾아야 한다
    assert!(!report.levels.supports.is_empty());
    assert!(!report.levels.resistances.is_empty());
}

#[tokio::test]
async fn multi_timeframe_trend_aligned_on_universal_rise() {
    let provider =
        ScenarioProvider::all_trend_timeframes(|tf| geometric_rise(tf, 200, 0.005));
    let analyzer = MarketAnalyzer::new(provider);

    let trend = analyzer
        .analyze_multi_timeframe_trend(&symbol())
        .await
        .unwrap();

    assert!(trend.overall_trend.is_up());
    assert!(trend.alignment.is_aligned);
    assert_eq!(trend.timeframes.len(), Timeframe::TREND_SET.len());
    assert!(trend.alignment.conflicting_timeframes.is_empty());
    assert!(trend.failed_timeframes.is_empty());
    // 전 타임프레임 정렬 상승이면 매수 계열 제안
    assert!(matches!(
        trend.suggestion.action,
        signal_core::SuggestedAction::Buy | signal_core::SuggestedAction::StrongBuy
    ));
}

#[tokio::test]
async fn level_analysis_output_ordering_contract() {
    let provider = ScenarioProvider::single(Timeframe::H1, box_range(Timeframe::H1, 80));
    let analyzer = MarketAnalyzer::new(provider);

    let analysis = analyzer
        .analyze_support_resistance(&symbol(), Timeframe::H1)
        .await
        .unwrap();

    // 지지선은 가격 내림차순, 저항선은 오름차순
    for pair in analysis.supports.windows(2) {
        assert!(pair[0].price() >= pair[1].price());
    }
    for pair in analysis.resistances.windows(2) {
        assert!(pair[0].price() <= pair[1].price());
    }
    for level in analysis.supports.iter().chain(analysis.resistances.iter()) {
        assert!(level.confidence >= 40.0);
    }
}

#[tokio::test]
async fn short_series_never_fails_only_empties() {
    let provider = ScenarioProvider::single(Timeframe::H1, geometric_rise(Timeframe::H1, 5, 0.01));
    let analyzer = MarketAnalyzer::new(provider);

    let report = analyzer
        .perform_comprehensive_analysis(&symbol(), Timeframe::H1)
        .await
        .unwrap();

    // 데이터 부족은 에러가 아니라 빈/중립 결과
    assert_eq!(report.score.signal, TradeSignal::Neutral);
    assert!(report.patterns.is_empty());
}
