//! 심볼 및 시장 유형 정의.
//!
//! 이 모듈은 분석 대상 상품 관련 타입을 정의합니다:
//! - `MarketType` - 시장 유형 (암호화폐, 주식, 외환 등)
//! - `Symbol` - 분석 가능한 상품을 나타내는 심볼

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 시장 유형 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    /// 암호화폐 현물 시장
    Crypto,
    /// 주식 시장
    Stock,
    /// 외환 시장
    Forex,
    /// 선물/파생상품 시장
    Futures,
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketType::Crypto => write!(f, "crypto"),
            MarketType::Stock => write!(f, "stock"),
            MarketType::Forex => write!(f, "forex"),
            MarketType::Futures => write!(f, "futures"),
        }
    }
}

/// 분석 가능한 상품을 나타내는 심볼.
///
/// 심볼은 기준 자산, 호가 자산, 시장 유형으로 구성됩니다.
/// 예: 암호화폐의 BTC/USDT, 주식의 AAPL/USD.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    /// 기준 자산 (예: BTC, AAPL, EUR)
    pub base: String,
    /// 호가 자산 (예: USDT, USD, JPY)
    pub quote: String,
    /// 시장 유형
    pub market_type: MarketType,
}

impl Symbol {
    /// 새 심볼을 생성합니다.
    pub fn new(base: impl Into<String>, quote: impl Into<String>, market_type: MarketType) -> Self {
        Self {
            base: base.into().to_uppercase(),
            quote: quote.into().to_uppercase(),
            market_type,
        }
    }

    /// 암호화폐 심볼을 생성합니다.
    pub fn crypto(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self::new(base, quote, MarketType::Crypto)
    }

    /// 주식 심볼을 생성합니다.
    pub fn stock(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self::new(base, quote, MarketType::Stock)
    }

    /// 표준 형식 문자열("BTC/USDT")을 반환합니다.
    pub fn to_standard_string(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }

    /// 심볼이 유효한지 검증합니다.
    ///
    /// 기준/호가 자산이 비어있거나 영숫자가 아니면 무효로 판정합니다.
    pub fn is_valid(&self) -> bool {
        let valid_part =
            |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric());
        valid_part(&self.base) && valid_part(&self.quote)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for Symbol {
    type Err = String;

    /// "BTC/USDT" 형식의 문자열에서 파싱합니다 (시장 유형은 Crypto로 가정).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) = s
            .split_once('/')
            .ok_or_else(|| format!("Invalid symbol: {}", s))?;
        if base.is_empty() || quote.is_empty() {
            return Err(format!("Invalid symbol: {}", s));
        }
        Ok(Symbol::crypto(base, quote))
    }
}
