//! Outstation database configuration
//!
//! The protocol stack sizes its static database and event buffers from a
//! [`DatabaseConfig`] built once at startup. Each entry selects the event
//! class a point reports in and the object variations used for static and
//! event responses.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Event class assignment for a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointClass {
    /// Static only, no events
    Class0,
    Class1,
    Class2,
    #[default]
    Class3,
}

impl PointClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class0 => "CLASS_0",
            Self::Class1 => "CLASS_1",
            Self::Class2 => "CLASS_2",
            Self::Class3 => "CLASS_3",
        }
    }
}

impl fmt::Display for PointClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PointClass {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLASS_0" => Ok(Self::Class0),
            "CLASS_1" => Ok(Self::Class1),
            "CLASS_2" => Ok(Self::Class2),
            "CLASS_3" => Ok(Self::Class3),
            other => Err(ParseError::name("point class", other)),
        }
    }
}

/// Declares a variation enum with its default member
macro_rules! variation {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? } default $default:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $($variant),+
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }
    };
}

variation!(
    /// Binary input static variations
    StaticBinaryVariation { Group1Var1, Group1Var2 } default Group1Var2
);
variation!(
    /// Binary input event variations
    EventBinaryVariation { Group2Var1, Group2Var2, Group2Var3 } default Group2Var2
);
variation!(
    /// Double-bit binary input static variations
    StaticDoubleBinaryVariation { Group3Var2 } default Group3Var2
);
variation!(
    /// Double-bit binary input event variations
    EventDoubleBinaryVariation { Group4Var1, Group4Var2, Group4Var3 } default Group4Var2
);
variation!(
    /// Analog input static variations
    StaticAnalogVariation {
        Group30Var1,
        Group30Var2,
        Group30Var3,
        Group30Var4,
        Group30Var5,
        Group30Var6,
    } default Group30Var5
);
variation!(
    /// Analog input event variations
    EventAnalogVariation {
        Group32Var1,
        Group32Var2,
        Group32Var3,
        Group32Var4,
        Group32Var5,
        Group32Var6,
        Group32Var7,
        Group32Var8,
    } default Group32Var7
);
variation!(
    /// Counter static variations
    StaticCounterVariation { Group20Var1, Group20Var2, Group20Var5, Group20Var6 } default Group20Var1
);
variation!(
    /// Counter event variations
    EventCounterVariation { Group22Var1, Group22Var2, Group22Var5, Group22Var6 } default Group22Var5
);
variation!(
    /// Octet string static variations
    StaticOctetStringVariation { Group110Var0 } default Group110Var0
);
variation!(
    /// Octet string event variations
    EventOctetStringVariation { Group111Var0 } default Group111Var0
);
variation!(
    /// Time and interval static variations
    StaticTimeAndIntervalVariation { Group50Var4 } default Group50Var4
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryConfig {
    pub static_variation: StaticBinaryVariation,
    pub class: PointClass,
    pub event_variation: EventBinaryVariation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoubleBitBinaryConfig {
    pub static_variation: StaticDoubleBinaryVariation,
    pub class: PointClass,
    pub event_variation: EventDoubleBinaryVariation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalogConfig {
    pub static_variation: StaticAnalogVariation,
    pub class: PointClass,
    pub event_variation: EventAnalogVariation,
    /// Minimum change that produces an event
    pub deadband: f64,
}

impl Default for AnalogConfig {
    fn default() -> Self {
        Self {
            static_variation: StaticAnalogVariation::default(),
            class: PointClass::default(),
            event_variation: EventAnalogVariation::default(),
            deadband: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterConfig {
    pub static_variation: StaticCounterVariation,
    pub class: PointClass,
    pub event_variation: EventCounterVariation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OctetStringConfig {
    pub static_variation: StaticOctetStringVariation,
    pub class: PointClass,
    pub event_variation: EventOctetStringVariation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeAndIntervalConfig {
    pub static_variation: StaticTimeAndIntervalVariation,
}

/// Point configuration keyed by index, one map per point type
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DatabaseConfig {
    pub binary_input: BTreeMap<u16, BinaryConfig>,
    pub double_binary: BTreeMap<u16, DoubleBitBinaryConfig>,
    pub analog_input: BTreeMap<u16, AnalogConfig>,
    pub counter: BTreeMap<u16, CounterConfig>,
    pub octet_string: BTreeMap<u16, OctetStringConfig>,
    pub time_and_interval: BTreeMap<u16, TimeAndIntervalConfig>,
}

impl DatabaseConfig {
    /// Total number of configured points across all types
    pub fn point_count(&self) -> usize {
        self.binary_input.len()
            + self.double_binary.len()
            + self.analog_input.len()
            + self.counter.len()
            + self.octet_string.len()
            + self.time_and_interval.len()
    }
}
