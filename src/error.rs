// =============================================================================
// Engine errors
// =============================================================================
//
// Indicator functions never fail: short input yields an empty series.  The
// variants below cover the few operations that reject a request outright and
// the parsing / bounds checks performed by callers before reaching the engine.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Fewer bars than the operation needs.
    #[error("insufficient data for {operation}: required {required} bars, got {actual}")]
    InsufficientData {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    /// A method / timeframe / indicator / pattern name that does not exist.
    #[error("unknown {kind}: {value:?}")]
    UnknownVariant { kind: &'static str, value: String },

    /// A request parameter outside its accepted bounds.
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = EngineError::InsufficientData {
            operation: "pattern detection",
            required: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for pattern detection: required 2 bars, got 1"
        );
    }

    #[test]
    fn unknown_variant_message() {
        let err = EngineError::UnknownVariant {
            kind: "pivot method",
            value: "gann".into(),
        };
        assert_eq!(err.to_string(), "unknown pivot method: \"gann\"");
    }
}
