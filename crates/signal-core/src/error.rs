//! 시그널 엔진의 에러 타입.
//!
//! 이 모듈은 분석 시스템 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 시그널 엔진 에러.
#[derive(Debug, Error)]
pub enum SignalError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력 (심볼/타임프레임 검증 실패)
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 시장 데이터 조회 에러
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 계산 에러
    #[error("계산 에러: {0}")]
    Calculation(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 시그널 엔진 작업을 위한 Result 타입.
pub type SignalResult<T> = Result<T, SignalError>;

impl SignalError {
    /// 호출자 입력이 원인인 에러인지 확인합니다.
    ///
    /// 입력 에러는 재시도 대상이 아니며 호출자에게 그대로 반환됩니다.
    pub fn is_caller_fault(&self) -> bool {
        matches!(
            self,
            SignalError::InvalidInput(_) | SignalError::Config(_)
        )
    }
}

impl From<serde_json::Error> for SignalError {
    fn from(err: serde_json::Error) -> Self {
        SignalError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_caller_fault() {
        let input_err = SignalError::InvalidInput("empty symbol".to_string());
        assert!(input_err.is_caller_fault());

        let data_err = SignalError::Data("fetch failed".to_string());
        assert!(!data_err.is_caller_fault());
    }
}
