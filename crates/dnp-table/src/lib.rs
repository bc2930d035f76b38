//! Outstation Point Table
//!
//! This crate assembles simulated devices into a station:
//!
//! - [`IoTable`]: the point registry and command dispatcher
//! - [`StationConfig`]: which devices a station exposes, stored as JSON
//! - [`Station`]: a built configuration, ready to attach to an outstation
//! - [`ChannelOutstation`]: an update sink feeding a tokio channel
//!
//! # Example
//!
//! ```rust
//! use dnp_protocol::{CommandHandler, CommandStatus, ControlRelayOutputBlock, NullHandler, OperateType};
//! use dnp_table::IoTable;
//!
//! let mut table = IoTable::new();
//! let fan = table.create_simple_device("Fan").unwrap();
//!
//! let status = table.operate_crob(
//!     &ControlRelayOutputBlock::latch_on(),
//!     0,
//!     &mut NullHandler,
//!     OperateType::DirectOperate,
//! );
//! assert_eq!(status, CommandStatus::Success);
//! assert!(fan.point().read());
//! ```

pub mod config;
pub mod error;
pub mod sink;
pub mod station;
pub mod table;

pub use config::{DeviceConfig, StationConfig, DEFAULT_RUNTIME_MS};
pub use error::TableError;
pub use sink::ChannelOutstation;
pub use station::Station;
pub use table::{IoTable, PointRow, ANALOG_OUTPUT_GROUP, BINARY_OUTPUT_GROUP};
