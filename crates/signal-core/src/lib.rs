//! # Signal Core
//!
//! 기술적 분석 시그널 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 분석 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 캔들(OHLCV) 데이터 구조체
//! - 지지/저항 레벨 타입
//! - 차트 패턴 결과 타입
//! - 타임프레임별/다중 타임프레임 추세 타입
//! - 종합 점수 타입
//! - 심볼 및 타임프레임 정의
//! - 분석 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
