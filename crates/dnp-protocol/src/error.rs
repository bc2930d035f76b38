//! Error types for parsing protocol enumerations

use thiserror::Error;

/// Errors that can occur while converting raw tags or strings into protocol types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Numeric wire tag does not map to a known value
    #[error("unknown {kind} tag: 0x{tag:02X}")]
    UnknownTag { kind: &'static str, tag: u8 },

    /// Text does not name a known value
    #[error("unknown {kind}: {value}")]
    UnknownName { kind: &'static str, value: String },
}

impl ParseError {
    pub(crate) fn tag(kind: &'static str, tag: u8) -> Self {
        Self::UnknownTag { kind, tag }
    }

    pub(crate) fn name(kind: &'static str, value: &str) -> Self {
        Self::UnknownName {
            kind,
            value: value.to_string(),
        }
    }
}
