// =============================================================================
// Shared types used across the analytics engine
// =============================================================================
//
// Every enum here has a lowercase wire name (serde) that matches its
// `Display` output, and a `FromStr` impl so callers can parse query-style
// strings such as "standard" or "sma,ema,rsi".

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Which side of price a level sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Support,
    Resistance,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Support => write!(f, "support"),
            Self::Resistance => write!(f, "resistance"),
        }
    }
}

/// Pivot point formula family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PivotMethod {
    Standard,
    Fibonacci,
    Camarilla,
    Woodie,
}

impl PivotMethod {
    pub fn all() -> &'static [PivotMethod] {
        &[
            PivotMethod::Standard,
            PivotMethod::Fibonacci,
            PivotMethod::Camarilla,
            PivotMethod::Woodie,
        ]
    }
}

impl std::fmt::Display for PivotMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Fibonacci => write!(f, "fibonacci"),
            Self::Camarilla => write!(f, "camarilla"),
            Self::Woodie => write!(f, "woodie"),
        }
    }
}

impl FromStr for PivotMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "fibonacci" => Ok(Self::Fibonacci),
            "camarilla" => Ok(Self::Camarilla),
            "woodie" => Ok(Self::Woodie),
            _ => Err(EngineError::UnknownVariant {
                kind: "pivot method",
                value: s.to_string(),
            }),
        }
    }
}

/// Period length of the bars a pivot set is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PivotTimeframe {
    Daily,
    Weekly,
    Monthly,
}

impl PivotTimeframe {
    pub fn all() -> &'static [PivotTimeframe] {
        &[
            PivotTimeframe::Daily,
            PivotTimeframe::Weekly,
            PivotTimeframe::Monthly,
        ]
    }
}

impl std::fmt::Display for PivotTimeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for PivotTimeframe {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(EngineError::UnknownVariant {
                kind: "pivot timeframe",
                value: s.to_string(),
            }),
        }
    }
}

/// Indicators the bundle calculator knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Macd,
    Bbands,
    Atr,
}

impl IndicatorKind {
    pub fn all() -> &'static [IndicatorKind] {
        &[
            IndicatorKind::Sma,
            IndicatorKind::Ema,
            IndicatorKind::Rsi,
            IndicatorKind::Macd,
            IndicatorKind::Bbands,
            IndicatorKind::Atr,
        ]
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sma => write!(f, "sma"),
            Self::Ema => write!(f, "ema"),
            Self::Rsi => write!(f, "rsi"),
            Self::Macd => write!(f, "macd"),
            Self::Bbands => write!(f, "bbands"),
            Self::Atr => write!(f, "atr"),
        }
    }
}

impl FromStr for IndicatorKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sma" => Ok(Self::Sma),
            "ema" => Ok(Self::Ema),
            "rsi" => Ok(Self::Rsi),
            "macd" => Ok(Self::Macd),
            "bbands" => Ok(Self::Bbands),
            "atr" => Ok(Self::Atr),
            _ => Err(EngineError::UnknownVariant {
                kind: "indicator",
                value: s.to_string(),
            }),
        }
    }
}

/// Candlestick patterns the detector recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Doji,
    Hammer,
    Engulfing,
}

impl PatternKind {
    pub fn all() -> &'static [PatternKind] {
        &[PatternKind::Doji, PatternKind::Hammer, PatternKind::Engulfing]
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Doji => write!(f, "doji"),
            Self::Hammer => write!(f, "hammer"),
            Self::Engulfing => write!(f, "engulfing"),
        }
    }
}

impl FromStr for PatternKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "doji" => Ok(Self::Doji),
            "hammer" => Ok(Self::Hammer),
            "engulfing" => Ok(Self::Engulfing),
            _ => Err(EngineError::UnknownVariant {
                kind: "pattern",
                value: s.to_string(),
            }),
        }
    }
}

/// Direction of an engulfing candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngulfingDirection {
    Bullish,
    Bearish,
}

impl std::fmt::Display for EngulfingDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
        }
    }
}

/// Confidence label attached to a pattern hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    High,
}

/// Parse a comma-separated list ("sma, ema,rsi") into distinct values,
/// preserving first-seen order.  Empty segments are ignored.
pub fn parse_list<T>(csv: &str) -> Result<Vec<T>, EngineError>
where
    T: FromStr<Err = EngineError> + PartialEq,
{
    let mut out = Vec::new();
    for part in csv.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let value = part.parse::<T>()?;
        if !out.contains(&value) {
            out.push(value);
        }
    }
    Ok(out)
}
