//! Control command shapes delivered by the protocol stack
//!
//! A master controls an outstation with two families of commands:
//!
//! - **Binary** commands, carried in a control relay output block (CROB) that
//!   combines an operation type (pulse/latch) with a trip/close qualifier.
//! - **Analog** output commands, carried in one of four numeric encodings.
//!
//! Both families may arrive as a single direct operate or as the second half
//! of a select-before-operate exchange.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Operation requested by a control relay output block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperationType {
    /// No operation
    Nul,
    /// Momentary pulse on
    PulseOn,
    /// Momentary pulse off
    PulseOff,
    /// Latch the output on
    LatchOn,
    /// Latch the output off
    LatchOff,
}

impl OperationType {
    /// Wire tag for this operation
    pub fn to_type(self) -> u8 {
        match self {
            Self::Nul => 0x00,
            Self::PulseOn => 0x01,
            Self::PulseOff => 0x02,
            Self::LatchOn => 0x03,
            Self::LatchOff => 0x04,
        }
    }

    /// Parse a wire tag
    pub fn from_type(tag: u8) -> Result<Self, ParseError> {
        match tag {
            0x00 => Ok(Self::Nul),
            0x01 => Ok(Self::PulseOn),
            0x02 => Ok(Self::PulseOff),
            0x03 => Ok(Self::LatchOn),
            0x04 => Ok(Self::LatchOff),
            other => Err(ParseError::tag("operation type", other)),
        }
    }

    /// Machine-readable name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nul => "NUL",
            Self::PulseOn => "PULSE_ON",
            Self::PulseOff => "PULSE_OFF",
            Self::LatchOn => "LATCH_ON",
            Self::LatchOff => "LATCH_OFF",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NUL" => Ok(Self::Nul),
            "PULSE_ON" => Ok(Self::PulseOn),
            "PULSE_OFF" => Ok(Self::PulseOff),
            "LATCH_ON" => Ok(Self::LatchOn),
            "LATCH_OFF" => Ok(Self::LatchOff),
            other => Err(ParseError::name("operation type", other)),
        }
    }
}

/// Trip/close qualifier carried alongside the operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TripCloseCode {
    /// No qualifier
    Nul,
    /// Close (energize, "on")
    Close,
    /// Trip (de-energize, "off")
    Trip,
    /// Reserved by the standard
    Reserved,
}

impl TripCloseCode {
    /// Wire tag for this qualifier
    pub fn to_type(self) -> u8 {
        match self {
            Self::Nul => 0x00,
            Self::Close => 0x01,
            Self::Trip => 0x02,
            Self::Reserved => 0x03,
        }
    }

    /// Parse a wire tag
    pub fn from_type(tag: u8) -> Result<Self, ParseError> {
        match tag {
            0x00 => Ok(Self::Nul),
            0x01 => Ok(Self::Close),
            0x02 => Ok(Self::Trip),
            0x03 => Ok(Self::Reserved),
            other => Err(ParseError::tag("trip/close code", other)),
        }
    }

    /// Machine-readable name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nul => "NUL",
            Self::Close => "CLOSE",
            Self::Trip => "TRIP",
            Self::Reserved => "RESERVED",
        }
    }
}

impl fmt::Display for TripCloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripCloseCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NUL" => Ok(Self::Nul),
            "CLOSE" => Ok(Self::Close),
            "TRIP" => Ok(Self::Trip),
            "RESERVED" => Ok(Self::Reserved),
            other => Err(ParseError::name("trip/close code", other)),
        }
    }
}

/// How an operate request reached the outstation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperateType {
    /// Operate following a matching select
    SelectBeforeOperate,
    /// Single-pass direct operate
    DirectOperate,
    /// Direct operate without response
    DirectOperateNoAck,
}

/// Result of a select or operate request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandStatus {
    /// Command accepted
    Success,
    /// Operate arrived without the select the point requires
    NoSelect,
    /// Command shape or qualifier is not implemented by the point
    NotSupported,
    /// No point is registered at the requested index
    OutOfRange,
}

impl CommandStatus {
    /// Wire code for this status
    pub fn to_type(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::NoSelect => 2,
            Self::NotSupported => 4,
            Self::OutOfRange => 12,
        }
    }

    /// Whether the command was accepted
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Machine-readable name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::NoSelect => "NO_SELECT",
            Self::NotSupported => "NOT_SUPPORTED",
            Self::OutOfRange => "OUT_OF_RANGE",
        }
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Control relay output block (group 12 variation 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlRelayOutputBlock {
    /// Requested operation
    pub op_type: OperationType,
    /// Trip/close qualifier
    pub tcc: TripCloseCode,
    /// Clear bit
    pub clear: bool,
    /// Number of times to repeat the operation
    pub count: u8,
    /// Pulse on duration in milliseconds
    pub on_time_ms: u32,
    /// Pulse off duration in milliseconds
    pub off_time_ms: u32,
}

impl ControlRelayOutputBlock {
    /// Create a CROB with a single repetition and 100ms pulse times
    pub fn new(op_type: OperationType, tcc: TripCloseCode) -> Self {
        Self {
            op_type,
            tcc,
            clear: false,
            count: 1,
            on_time_ms: 100,
            off_time_ms: 100,
        }
    }

    /// The idle/acknowledge block: no qualifier, no operation
    pub fn nul() -> Self {
        Self::new(OperationType::Nul, TripCloseCode::Nul)
    }

    /// Unqualified latch on
    pub fn latch_on() -> Self {
        Self::new(OperationType::LatchOn, TripCloseCode::Nul)
    }

    /// Unqualified latch off
    pub fn latch_off() -> Self {
        Self::new(OperationType::LatchOff, TripCloseCode::Nul)
    }

    /// Pulse on with the given qualifier
    pub fn pulse_on(tcc: TripCloseCode) -> Self {
        Self::new(OperationType::PulseOn, tcc)
    }

    /// Whether this is the idle/acknowledge pair
    pub fn is_nul(&self) -> bool {
        self.op_type == OperationType::Nul && self.tcc == TripCloseCode::Nul
    }
}

/// Analog output, 16-bit signed encoding (group 41 variation 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalogOutputInt16 {
    pub value: i16,
}

/// Analog output, 32-bit signed encoding (group 41 variation 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalogOutputInt32 {
    pub value: i32,
}

/// Analog output, single precision encoding (group 41 variation 3)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalogOutputFloat32 {
    pub value: f32,
}

/// Analog output, double precision encoding (group 41 variation 4)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalogOutputDouble64 {
    pub value: f64,
}

impl AnalogOutputDouble64 {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}
