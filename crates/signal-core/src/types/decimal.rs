//! 정밀한 가격 계산을 위한 Decimal 유틸리티.
//!
//! 이 모듈은 가격 계산에 필요한 정밀 소수점 타입 및 유틸리티를 제공합니다.

use rust_decimal::Decimal;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 거래량을 위한 타입.
pub type Quantity = Decimal;

/// 퍼센트 타입 (0.01 = 1%).
pub type Percentage = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 절대값을 반환합니다.
    fn abs(&self) -> Decimal;

    /// 퍼센트 문자열로 변환합니다 (예: "5.25%").
    fn to_percentage_string(&self) -> String;

    /// 지정된 소수점 자릿수로 반올림합니다.
    fn round_dp(&self, dp: u32) -> Decimal;

    /// Newton-Raphson 방법으로 제곱근을 계산합니다.
    ///
    /// Decimal 타입은 기본 제곱근 함수가 없으므로 직접 구현합니다.
    /// 0 이하의 값은 0을 반환합니다.
    fn sqrt_approx(&self) -> Decimal;
}

impl DecimalExt for Decimal {
    fn abs(&self) -> Decimal {
        if self.is_sign_negative() {
            -*self
        } else {
            *self
        }
    }

    fn to_percentage_string(&self) -> String {
        let pct = *self * Decimal::from(100);
        format!("{:.2}%", pct)
    }

    fn round_dp(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    }

    fn sqrt_approx(&self) -> Decimal {
        if *self <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let two = Decimal::from(2);
        let mut x = *self;

        // 10회 반복이면 충분한 정밀도
        for _ in 0..10 {
            x = (x + *self / x) / two;
        }

        x
    }
}
