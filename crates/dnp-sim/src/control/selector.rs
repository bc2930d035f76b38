//! Trip/close control selector
//!
//! Breakers and slow devices expose their trip and close actions through one
//! of two control models. The model is fixed when the device is built, and so
//! is the set of addressable outputs it registers.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use dnp_protocol::ParseError;
use serde::{Deserialize, Serialize};

use super::{ActivationOutput, BinaryAction, BinaryOutput, TwoOutput};

/// How trip and close are mapped onto binary outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TwoSignalControlModel {
    /// Two outputs, each pulsed on to fire trip or close
    Activation,
    /// One output pulsed on with a TRIP or CLOSE qualifier
    ComplementaryTwoOutput,
}

impl TwoSignalControlModel {
    /// Wire tag for this model
    pub fn to_type(self) -> u8 {
        match self {
            Self::Activation => 0,
            Self::ComplementaryTwoOutput => 1,
        }
    }

    /// Parse a wire tag
    pub fn from_type(tag: u8) -> Result<Self, ParseError> {
        match tag {
            0 => Ok(Self::Activation),
            1 => Ok(Self::ComplementaryTwoOutput),
            other => Err(ParseError::UnknownTag {
                kind: "control model",
                tag: other,
            }),
        }
    }

    /// Machine-readable name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activation => "ACTIVATION",
            Self::ComplementaryTwoOutput => "COMPLEMENTARY_TWO_OUTPUT",
        }
    }

    /// Human-readable label shown in device tables
    pub fn label(self) -> &'static str {
        match self {
            Self::Activation => "Activation Model",
            Self::ComplementaryTwoOutput => "Complementary Two-Output Model",
        }
    }
}

impl fmt::Display for TwoSignalControlModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TwoSignalControlModel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVATION" => Ok(Self::Activation),
            "COMPLEMENTARY_TWO_OUTPUT" => Ok(Self::ComplementaryTwoOutput),
            other => Err(ParseError::UnknownName {
                kind: "control model",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<u8> for TwoSignalControlModel {
    type Error = ParseError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Self::from_type(tag)
    }
}

/// The decoders realizing one control model
#[derive(Clone)]
pub enum TwoSignalControl {
    Activation {
        trip: Arc<ActivationOutput>,
        close: Arc<ActivationOutput>,
    },
    Complementary {
        control: Arc<TwoOutput>,
    },
}

impl TwoSignalControl {
    /// Build the decoders for `model` around the trip and close actions
    pub fn new(model: TwoSignalControlModel, trip: BinaryAction, close: BinaryAction) -> Self {
        match model {
            TwoSignalControlModel::Activation => Self::Activation {
                trip: ActivationOutput::new(trip, false),
                close: ActivationOutput::new(close, false),
            },
            TwoSignalControlModel::ComplementaryTwoOutput => Self::Complementary {
                control: TwoOutput::new(trip, close, false),
            },
        }
    }

    pub fn model(&self) -> TwoSignalControlModel {
        match self {
            Self::Activation { .. } => TwoSignalControlModel::Activation,
            Self::Complementary { .. } => TwoSignalControlModel::ComplementaryTwoOutput,
        }
    }

    /// Addressable outputs in registration order
    pub fn outputs(&self) -> Vec<Arc<dyn BinaryOutput>> {
        match self {
            Self::Activation { trip, close } => vec![
                Arc::clone(trip) as Arc<dyn BinaryOutput>,
                Arc::clone(close) as Arc<dyn BinaryOutput>,
            ],
            Self::Complementary { control } => vec![Arc::clone(control) as Arc<dyn BinaryOutput>],
        }
    }

    /// Name the outputs after their device
    pub fn set_point_names(&self, name: &str) {
        match self {
            Self::Activation { trip, close } => {
                trip.set_name(&format!("{}_trip", name));
                close.set_name(&format!("{}_close", name));
            }
            Self::Complementary { control } => {
                control.set_name(&format!("{}_control", name));
            }
        }
    }
}

impl fmt::Debug for TwoSignalControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.outputs().iter().map(|o| o.name()).collect();
        f.debug_struct("TwoSignalControl")
            .field("model", &self.model())
            .field("outputs", &names)
            .finish()
    }
}
