//! Measurement update batches and the sinks that consume them

use crate::measurement::Measurement;

/// One measurement reported at one point index
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Update {
    pub index: u16,
    pub measurement: Measurement,
}

/// An immutable batch of updates applied to an outstation in one call
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Updates {
    updates: Vec<Update>,
}

impl Updates {
    pub fn iter(&self) -> impl Iterator<Item = &Update> {
        self.updates.iter()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

impl IntoIterator for Updates {
    type Item = Update;
    type IntoIter = std::vec::IntoIter<Update>;

    fn into_iter(self) -> Self::IntoIter {
        self.updates.into_iter()
    }
}

/// Accumulates updates into an [`Updates`] batch
#[derive(Debug, Default)]
pub struct UpdateBuilder {
    updates: Vec<Update>,
}

impl UpdateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a measurement for the given index
    pub fn update(&mut self, measurement: impl Into<Measurement>, index: u16) -> &mut Self {
        self.updates.push(Update {
            index,
            measurement: measurement.into(),
        });
        self
    }

    /// Finish the batch
    pub fn build(self) -> Updates {
        Updates {
            updates: self.updates,
        }
    }
}

macro_rules! impl_into_measurement {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<crate::measurement::$ty> for Measurement {
                fn from(m: crate::measurement::$ty) -> Self {
                    Measurement::$ty(m)
                }
            }
        )*
    };
}

impl_into_measurement!(
    Binary,
    DoubleBitBinary,
    Analog,
    Counter,
    OctetString,
    TimeAndInterval,
);

/// The outstation side of the protocol stack: accepts measurement updates
///
/// Implementations must be callable from any thread; device workers apply
/// updates from their own threads.
pub trait Outstation: Send + Sync {
    /// Apply a batch of updates to the outstation database
    fn apply(&self, updates: Updates);
}

/// Per-request confirmation channel handed to an operate call
pub trait UpdateHandler {
    /// Report a measurement produced while handling the command
    ///
    /// Returns false if the measurement was rejected.
    fn update(&mut self, measurement: Measurement, index: u16) -> bool;
}

/// An [`UpdateHandler`] that records every confirmation it receives
#[derive(Debug, Default)]
pub struct RecordingHandler {
    updates: Vec<Update>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Confirmations received so far
    pub fn updates(&self) -> &[Update] {
        &self.updates
    }

    /// Take all confirmations, leaving the recorder empty
    pub fn drain(&mut self) -> Vec<Update> {
        std::mem::take(&mut self.updates)
    }
}

impl UpdateHandler for RecordingHandler {
    fn update(&mut self, measurement: Measurement, index: u16) -> bool {
        self.updates.push(Update { index, measurement });
        true
    }
}

/// An [`UpdateHandler`] that accepts and discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHandler;

impl UpdateHandler for NullHandler {
    fn update(&mut self, _measurement: Measurement, _index: u16) -> bool {
        true
    }
}
