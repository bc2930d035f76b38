//! Simulated Outstation Devices
//!
//! This crate provides the live state behind a trainer outstation:
//!
//! - **Points**: named, indexable values written by devices and read by the
//!   registry, with updates emitted to an attached [`Outstation`]
//! - **Decoders**: latch, activation, two-output and analog outputs that turn
//!   control requests into device actions
//! - **Devices**: simple latched devices, breakers, slow motor-operated
//!   switches and noisy setpoint controllers
//!
//! Slow devices and setpoint controllers run a background worker thread each;
//! dropping the device stops and joins it.
//!
//! # Example
//!
//! ```rust
//! use dnp_protocol::{CommandStatus, ControlRelayOutputBlock, NullHandler, OperateType};
//! use dnp_sim::{BinaryOutput, Device, DeviceValue, SimpleDevice};
//!
//! let fan = SimpleDevice::new("Fan");
//! let status = fan.output().operate(
//!     &ControlRelayOutputBlock::latch_on(),
//!     &mut NullHandler,
//!     OperateType::DirectOperate,
//! );
//!
//! assert_eq!(status, CommandStatus::Success);
//! assert_eq!(fan.render().value, DeviceValue::Binary(true));
//! ```
//!
//! [`Outstation`]: dnp_protocol::Outstation

pub mod control;
pub mod device;
pub mod error;
pub mod point;
pub mod worker;

pub use control::{
    ActivationOutput, AnalogAction, AnalogOutput, BinaryAction, BinaryOutput, LatchOutput,
    TwoOutput, TwoSignalControl, TwoSignalControlModel,
};
pub use device::{
    Breaker, Device, DeviceValue, DeviceView, Polarity, RedrawSignal, SetpointController,
    SimpleDevice, SlowDevice, JITTER_INTERVAL, MOTION_STEP,
};
pub use error::SimError;
pub use point::{
    sanitize_name, AnalogPoint, BinaryPoint, CounterPoint, DoubleBitPoint, OctetStringPoint,
    Point, PointMeta, TimeAndIntervalPoint, DEFAULT_ANALOG_VALUE,
};
pub use worker::{StopSignal, Worker};
