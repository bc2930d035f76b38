//! Measurement values reported to the master

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Quality flags attached to every measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flags(pub u8);

impl Flags {
    /// Point is online and its value is valid
    pub const ONLINE: Flags = Flags(0x01);

    /// Raw flag byte
    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether the online bit is set
    pub fn is_online(self) -> bool {
        self.0 & Self::ONLINE.0 != 0
    }
}

/// Absolute timestamp: milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DnpTime(pub u64);

impl DnpTime {
    /// Wall-clock time now
    pub fn now() -> Self {
        let ms = chrono::Utc::now().timestamp_millis();
        Self(u64::try_from(ms).unwrap_or_default())
    }

    /// Milliseconds since the Unix epoch
    pub fn as_millis(self) -> u64 {
        self.0
    }
}

/// Tri-state value of a double-bit binary input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DoubleBit {
    /// Transitioning between states
    IntermediateState,
    /// Determined off (tripped, open)
    #[default]
    DeterminedOff,
    /// Determined on (closed)
    DeterminedOn,
    /// State cannot be determined
    Indeterminate,
}

impl DoubleBit {
    /// Two-bit wire value
    pub fn to_type(self) -> u8 {
        match self {
            Self::IntermediateState => 0x00,
            Self::DeterminedOff => 0x01,
            Self::DeterminedOn => 0x02,
            Self::Indeterminate => 0x03,
        }
    }

    /// Parse a two-bit wire value
    pub fn from_type(tag: u8) -> Result<Self, ParseError> {
        match tag {
            0x00 => Ok(Self::IntermediateState),
            0x01 => Ok(Self::DeterminedOff),
            0x02 => Ok(Self::DeterminedOn),
            0x03 => Ok(Self::Indeterminate),
            other => Err(ParseError::tag("double bit", other)),
        }
    }

    /// Machine-readable name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IntermediateState => "INTERMEDIATE",
            Self::DeterminedOff => "DETERMINED_OFF",
            Self::DeterminedOn => "DETERMINED_ON",
            Self::Indeterminate => "INDETERMINATE",
        }
    }

    /// Label suitable for tables
    pub fn human_str(self) -> &'static str {
        match self {
            Self::IntermediateState => "Intermediate",
            Self::DeterminedOff => "Off",
            Self::DeterminedOn => "On",
            Self::Indeterminate => "Indeterminate",
        }
    }
}

impl fmt::Display for DoubleBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DoubleBit {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INTERMEDIATE" => Ok(Self::IntermediateState),
            "DETERMINED_OFF" => Ok(Self::DeterminedOff),
            "DETERMINED_ON" => Ok(Self::DeterminedOn),
            "INDETERMINATE" => Ok(Self::Indeterminate),
            other => Err(ParseError::name("double bit", other)),
        }
    }
}

/// Binary input measurement (group 1/2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Binary {
    pub value: bool,
    pub flags: Flags,
    pub time: DnpTime,
}

/// Double-bit binary input measurement (group 3/4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoubleBitBinary {
    pub value: DoubleBit,
    pub flags: Flags,
    pub time: DnpTime,
}

/// Analog input measurement (group 30/32)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Analog {
    pub value: f64,
    pub flags: Flags,
    pub time: DnpTime,
}

/// Counter measurement (group 20/22)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Counter {
    pub value: u32,
    pub flags: Flags,
    pub time: DnpTime,
}

/// Octet string measurement (group 110/111)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OctetString {
    pub value: Vec<u8>,
}

/// Time and interval measurement (group 50 variation 4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeAndInterval {
    pub time: DnpTime,
    pub interval: u32,
    pub units: u8,
}

impl TimeAndInterval {
    pub fn new(time: DnpTime, interval: u32, units: u8) -> Self {
        Self {
            time,
            interval,
            units,
        }
    }
}

/// Any measurement that can be reported through an update
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Measurement {
    Binary(Binary),
    DoubleBitBinary(DoubleBitBinary),
    Analog(Analog),
    Counter(Counter),
    OctetString(OctetString),
    TimeAndInterval(TimeAndInterval),
}

impl Measurement {
    /// Static object group of this measurement
    pub fn static_group(&self) -> u8 {
        match self {
            Self::Binary(_) => 1,
            Self::DoubleBitBinary(_) => 3,
            Self::Analog(_) => 30,
            Self::Counter(_) => 20,
            Self::OctetString(_) => 110,
            Self::TimeAndInterval(_) => 50,
        }
    }

    /// Quality flags, if this kind carries any
    pub fn flags(&self) -> Option<Flags> {
        match self {
            Self::Binary(m) => Some(m.flags),
            Self::DoubleBitBinary(m) => Some(m.flags),
            Self::Analog(m) => Some(m.flags),
            Self::Counter(m) => Some(m.flags),
            Self::OctetString(_) | Self::TimeAndInterval(_) => None,
        }
    }

    /// Timestamp, if this kind carries one
    pub fn time(&self) -> Option<DnpTime> {
        match self {
            Self::Binary(m) => Some(m.time),
            Self::DoubleBitBinary(m) => Some(m.time),
            Self::Analog(m) => Some(m.time),
            Self::Counter(m) => Some(m.time),
            Self::OctetString(_) => None,
            Self::TimeAndInterval(m) => Some(m.time),
        }
    }

    /// Short value text for logs
    pub fn value_display(&self) -> String {
        match self {
            Self::Binary(m) => m.value.to_string(),
            Self::DoubleBitBinary(m) => m.value.human_str().to_string(),
            Self::Analog(m) => format!("{:.3}", m.value),
            Self::Counter(m) => m.value.to_string(),
            Self::OctetString(m) => String::from_utf8_lossy(&m.value).into_owned(),
            Self::TimeAndInterval(m) => format!(
                "{}ms +{} (units {})",
                m.time.as_millis(),
                m.interval,
                m.units
            ),
        }
    }
}
