//! DNP3 Outstation Boundary Types
//!
//! This crate describes the surface an outstation protocol stack exposes to
//! application code. The stack itself (framing, link layer, sessions) lives
//! elsewhere; the simulation crates only need its data types and callbacks:
//!
//! - **Commands**: control relay output blocks and analog output shapes,
//!   plus the [`CommandStatus`] returned for each request
//! - **Measurements**: typed values with quality [`Flags`] and [`DnpTime`]
//! - **Updates**: batches of measurements applied to an [`Outstation`]
//! - **Database configuration**: per-point class and variation selection
//!
//! # Example
//!
//! ```rust
//! use dnp_protocol::{Binary, DnpTime, Flags, Measurement, UpdateBuilder};
//!
//! let mut builder = UpdateBuilder::new();
//! builder.update(
//!     Binary { value: true, flags: Flags::ONLINE, time: DnpTime::now() },
//!     0,
//! );
//! let updates = builder.build();
//!
//! for update in updates.iter() {
//!     assert!(matches!(update.measurement, Measurement::Binary(_)));
//! }
//! ```

pub mod command;
pub mod database;
pub mod error;
pub mod handler;
pub mod measurement;
pub mod update;

pub use command::{
    AnalogOutputDouble64, AnalogOutputFloat32, AnalogOutputInt16, AnalogOutputInt32,
    CommandStatus, ControlRelayOutputBlock, OperateType, OperationType, TripCloseCode,
};
pub use database::{
    AnalogConfig, BinaryConfig, CounterConfig, DatabaseConfig, DoubleBitBinaryConfig,
    EventAnalogVariation, EventBinaryVariation, EventCounterVariation,
    EventDoubleBinaryVariation, EventOctetStringVariation, OctetStringConfig, PointClass,
    StaticAnalogVariation, StaticBinaryVariation, StaticCounterVariation,
    StaticDoubleBinaryVariation, StaticOctetStringVariation, StaticTimeAndIntervalVariation,
    TimeAndIntervalConfig,
};
pub use error::ParseError;
pub use handler::CommandHandler;
pub use measurement::{
    Analog, Binary, Counter, DnpTime, DoubleBit, DoubleBitBinary, Flags, Measurement,
    OctetString, TimeAndInterval,
};
pub use update::{
    NullHandler, Outstation, RecordingHandler, Update, UpdateBuilder, UpdateHandler, Updates,
};
