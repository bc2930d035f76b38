//! Simulated field devices
//!
//! A device owns the points that report its state and the decoders that
//! command it. Registering a device with the point table registers both.
//!
//! | Device | Point | Outputs |
//! |--------|-------|---------|
//! | [`SimpleDevice`] | binary | one latch |
//! | [`Breaker`] | binary | trip/close selector |
//! | [`SlowDevice`] | double-bit | trip/close selector driving a timed motion |
//! | [`SetpointController`] | analog | one analog output unless read-only |

mod breaker;
mod setpoint;
mod simple;
mod slow;

pub use breaker::Breaker;
pub use setpoint::{SetpointController, JITTER_INTERVAL};
pub use simple::SimpleDevice;
pub use slow::{SlowDevice, MOTION_STEP};

use std::fmt;
use std::sync::Arc;

use dnp_protocol::DoubleBit;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

/// Current value of a device, as shown in device tables
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceValue {
    Binary(bool),
    DoubleBit(DoubleBit),
    Analog(f64),
}

impl fmt::Display for DeviceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary(true) => f.write_str("ON"),
            Self::Binary(false) => f.write_str("OFF"),
            Self::DoubleBit(value) => f.write_str(value.human_str()),
            Self::Analog(value) => write!(f, "{:.3}", value),
        }
    }
}

/// Snapshot of a device for display
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceView {
    pub name: String,
    /// Control model label
    pub model: String,
    pub value: DeviceValue,
}

/// Common interface of every simulated device
pub trait Device: Send + Sync {
    fn name(&self) -> &str;

    /// Snapshot the device for display
    fn render(&self) -> DeviceView;

    /// Install the signal raised whenever a background worker changes the
    /// device. Devices without workers ignore it.
    fn register_refresh(&self, _signal: RedrawSignal) {}
}

/// Wakes a display task after a background change
///
/// Requests coalesce: many requests before the display task wakes produce a
/// single wake-up.
#[derive(Debug, Clone, Default)]
pub struct RedrawSignal {
    notify: Arc<Notify>,
}

impl RedrawSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.notify.notify_one();
    }

    /// Wait for the next request
    pub async fn notified(&self) {
        self.notify.notified().await;
    }
}

/// Optional [`RedrawSignal`] installed after a device is built
#[derive(Debug, Default)]
pub(crate) struct RefreshSlot {
    signal: RwLock<Option<RedrawSignal>>,
}

impl RefreshSlot {
    pub(crate) fn set(&self, signal: RedrawSignal) {
        *self.signal.write() = Some(signal);
    }

    pub(crate) fn request(&self) {
        if let Some(signal) = self.signal.read().as_ref() {
            signal.request();
        }
    }
}

/// Which end of travel trip and close drive a slow device toward
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Trip opens (position 0, off), close closes (position 1, on)
    #[default]
    Normal,
    /// Trip drives to position 1 (on), close to position 0 (off)
    Reversed,
}

impl Polarity {
    /// Target position for a trip
    pub fn trip_position(self) -> f64 {
        match self {
            Self::Normal => 0.0,
            Self::Reversed => 1.0,
        }
    }

    /// Target position for a close
    pub fn close_position(self) -> f64 {
        match self {
            Self::Normal => 1.0,
            Self::Reversed => 0.0,
        }
    }
}
