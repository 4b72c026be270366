//! 시장 데이터 제공자 추상화.
//!
//! 분석 엔진은 캔들을 직접 수집하지 않습니다. 수집 계층(REST 폴링, 스트리밍,
//! 캐시)이 이 trait를 구현하여 정렬·중복 제거된 캔들 시리즈를 제공합니다.

use crate::domain::market_data::Kline;
use crate::types::{Symbol, Timeframe};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// CandleProvider 에러.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 지원하지 않는 심볼/타임프레임
    #[error("지원하지 않는 요청: {0}")]
    Unsupported(String),

    /// 파싱 에러
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 기타 에러
    #[error("기타 에러: {0}")]
    Other(String),
}

/// 시장 데이터 제공자 trait.
///
/// 반환되는 캔들은 `open_time` 오름차순으로 정렬되고 중복이 제거되어 있어야
/// 합니다. 요청 구간 내 갭 처리는 제공자의 책임입니다. 타임아웃/취소 경계도
/// 제공자(호출자) 측에서 설정합니다.
#[async_trait]
pub trait CandleProvider: Send + Sync {
    /// 최근 캔들을 조회합니다.
    ///
    /// # 인자
    ///
    /// * `symbol` - 조회할 심볼
    /// * `timeframe` - 타임프레임
    /// * `limit` - 최대 캔들 개수
    async fn get_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Kline>, ProviderError>;

    /// 지정 구간의 캔들을 조회합니다.
    ///
    /// 기본 구현은 최근 조회 후 구간 필터링입니다. 제공자가 구간 조회를
    /// 직접 지원하면 오버라이드합니다.
    async fn get_candles_range(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        limit: usize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Kline>, ProviderError> {
        let candles = self.get_candles(symbol, timeframe, limit).await?;
        Ok(candles
            .into_iter()
            .filter(|k| k.open_time >= start && k.open_time <= end)
            .collect())
    }
}
