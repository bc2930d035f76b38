//! Point registry
//!
//! The [`IoTable`] owns every input point and addressable output of a station.
//! Each collection is its own index space, numbered from 0 in registration
//! order. Registration happens once at startup through `&mut self`; after
//! that the table is shared and every operation takes `&self`.
//!
//! The table is also the station's [`CommandHandler`]: select and operate
//! requests are routed by index to the registered output.

use std::sync::Arc;

use dnp_protocol::{
    AnalogOutputDouble64, AnalogOutputFloat32, AnalogOutputInt16, AnalogOutputInt32,
    CommandHandler, CommandStatus, ControlRelayOutputBlock, DatabaseConfig, OperateType,
    Outstation, UpdateHandler,
};
use dnp_sim::{
    AnalogOutput, AnalogPoint, BinaryOutput, BinaryPoint, Breaker, CounterPoint, DoubleBitPoint,
    OctetStringPoint, Point, PointMeta, Polarity, SetpointController, SimpleDevice, SlowDevice,
    TimeAndIntervalPoint, TwoSignalControlModel,
};
use tracing::{debug, info, warn};

use crate::error::TableError;

/// Object group shown for binary outputs (control relay output block)
pub const BINARY_OUTPUT_GROUP: u8 = 12;

/// Object group shown for analog outputs (double precision)
pub const ANALOG_OUTPUT_GROUP: u8 = 41;

/// One line of an input or output table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointRow {
    pub group: u8,
    pub index: u16,
    pub name: String,
    pub value: String,
}

fn assign(meta: &PointMeta, len: usize, collection: &'static str) -> Result<u16, TableError> {
    let index =
        u16::try_from(len).map_err(|_| TableError::IndexSpaceExhausted { collection })?;
    meta.assign_index(index)?;
    debug!("Registered {} {} at index {}", collection, meta.name(), index);
    Ok(index)
}

/// Fail unless a collection holding `len` entries has room for `count` more
fn reserve(len: usize, count: usize, collection: &'static str) -> Result<(), TableError> {
    if len + count > usize::from(u16::MAX) + 1 {
        return Err(TableError::IndexSpaceExhausted { collection });
    }
    Ok(())
}

fn input_row(point: &dyn Point) -> Option<PointRow> {
    Some(PointRow {
        group: point.static_group(),
        index: point.index()?,
        name: point.name(),
        value: point.value_display(),
    })
}

fn indexed<P: Point>(points: &[Arc<P>]) -> impl Iterator<Item = (u16, &Arc<P>)> {
    points
        .iter()
        .filter_map(|point| point.index().map(|index| (index, point)))
}

/// Registry of a station's points and outputs
#[derive(Default)]
pub struct IoTable {
    binary_inputs: Vec<Arc<BinaryPoint>>,
    double_bit_inputs: Vec<Arc<DoubleBitPoint>>,
    analog_inputs: Vec<Arc<AnalogPoint>>,
    counter_inputs: Vec<Arc<CounterPoint>>,
    octet_strings: Vec<Arc<OctetStringPoint>>,
    time_and_intervals: Vec<Arc<TimeAndIntervalPoint>>,
    binary_outputs: Vec<Arc<dyn BinaryOutput>>,
    analog_outputs: Vec<Arc<AnalogOutput>>,
}

impl IoTable {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    pub fn register_binary_input(&mut self, point: Arc<BinaryPoint>) -> Result<u16, TableError> {
        let index = assign(point.meta(), self.binary_inputs.len(), "binary input")?;
        self.binary_inputs.push(point);
        Ok(index)
    }

    pub fn register_double_bit_input(
        &mut self,
        point: Arc<DoubleBitPoint>,
    ) -> Result<u16, TableError> {
        let index = assign(point.meta(), self.double_bit_inputs.len(), "double-bit input")?;
        self.double_bit_inputs.push(point);
        Ok(index)
    }

    pub fn register_analog_input(&mut self, point: Arc<AnalogPoint>) -> Result<u16, TableError> {
        let index = assign(point.meta(), self.analog_inputs.len(), "analog input")?;
        self.analog_inputs.push(point);
        Ok(index)
    }

    pub fn register_counter_input(&mut self, point: Arc<CounterPoint>) -> Result<u16, TableError> {
        let index = assign(point.meta(), self.counter_inputs.len(), "counter")?;
        self.counter_inputs.push(point);
        Ok(index)
    }

    pub fn register_octet_string(
        &mut self,
        point: Arc<OctetStringPoint>,
    ) -> Result<u16, TableError> {
        let index = assign(point.meta(), self.octet_strings.len(), "octet string")?;
        self.octet_strings.push(point);
        Ok(index)
    }

    pub fn register_time_and_interval(
        &mut self,
        point: Arc<TimeAndIntervalPoint>,
    ) -> Result<u16, TableError> {
        let index = assign(
            point.meta(),
            self.time_and_intervals.len(),
            "time-and-interval",
        )?;
        self.time_and_intervals.push(point);
        Ok(index)
    }

    pub fn register_binary_output(
        &mut self,
        output: Arc<dyn BinaryOutput>,
    ) -> Result<u16, TableError> {
        let index = assign(output.meta(), self.binary_outputs.len(), "binary output")?;
        self.binary_outputs.push(output);
        Ok(index)
    }

    pub fn register_analog_output(&mut self, output: Arc<AnalogOutput>) -> Result<u16, TableError> {
        let index = assign(output.meta(), self.analog_outputs.len(), "analog output")?;
        self.analog_outputs.push(output);
        Ok(index)
    }

    // ------------------------------------------------------------------------
    // Device factories
    // ------------------------------------------------------------------------

    // Factories check capacity in every collection they touch before
    // registering anything.

    /// Build a latched on/off device and register its point and output
    pub fn create_simple_device(&mut self, name: &str) -> Result<Arc<SimpleDevice>, TableError> {
        reserve(self.binary_inputs.len(), 1, "binary input")?;
        reserve(self.binary_outputs.len(), 1, "binary output")?;

        let device = SimpleDevice::new(name);
        self.register_binary_input(Arc::clone(device.point()))?;
        self.register_binary_output(Arc::clone(device.output()) as Arc<dyn BinaryOutput>)?;
        Ok(device)
    }

    /// Build a breaker and register its point and control outputs
    pub fn create_breaker(
        &mut self,
        name: &str,
        model: TwoSignalControlModel,
    ) -> Result<Arc<Breaker>, TableError> {
        let device = Breaker::new(name, model);
        let outputs = device.control().outputs();
        reserve(self.binary_inputs.len(), 1, "binary input")?;
        reserve(self.binary_outputs.len(), outputs.len(), "binary output")?;

        self.register_binary_input(Arc::clone(device.point()))?;
        for output in outputs {
            self.register_binary_output(output)?;
        }
        Ok(device)
    }

    /// Build a slow device and register its point and control outputs
    pub fn create_slow_device(
        &mut self,
        name: &str,
        runtime_ms: u64,
        model: TwoSignalControlModel,
        polarity: Polarity,
    ) -> Result<Arc<SlowDevice>, TableError> {
        let device = SlowDevice::with_polarity(name, runtime_ms, model, polarity);
        let outputs = device.control().outputs();
        reserve(self.double_bit_inputs.len(), 1, "double-bit input")?;
        reserve(self.binary_outputs.len(), outputs.len(), "binary output")?;

        self.register_double_bit_input(Arc::clone(device.point()))?;
        for output in outputs {
            self.register_binary_output(output)?;
        }
        Ok(device)
    }

    /// Build a setpoint controller and register its point and, unless
    /// read-only, its analog output
    pub fn create_setpoint_controller(
        &mut self,
        name: &str,
        setpoint: f64,
        variance: f64,
        read_only: bool,
    ) -> Result<Arc<SetpointController>, TableError> {
        reserve(self.analog_inputs.len(), 1, "analog input")?;
        if !read_only {
            reserve(self.analog_outputs.len(), 1, "analog output")?;
        }

        let device = SetpointController::new(name, setpoint, variance, read_only);
        self.register_analog_input(Arc::clone(device.point()))?;
        if let Some(output) = device.output() {
            self.register_analog_output(Arc::clone(output))?;
        }
        Ok(device)
    }

    // ------------------------------------------------------------------------
    // Outstation wiring
    // ------------------------------------------------------------------------

    /// Snapshot the database layout of every registered input point
    pub fn configure_database(&self) -> DatabaseConfig {
        let mut config = DatabaseConfig::default();
        for (index, point) in indexed(&self.binary_inputs) {
            config.binary_input.insert(index, point.config());
        }
        for (index, point) in indexed(&self.double_bit_inputs) {
            config.double_binary.insert(index, point.config());
        }
        for (index, point) in indexed(&self.analog_inputs) {
            config.analog_input.insert(index, point.config());
        }
        for (index, point) in indexed(&self.counter_inputs) {
            config.counter.insert(index, point.config());
        }
        for (index, point) in indexed(&self.octet_strings) {
            config.octet_string.insert(index, point.config());
        }
        for (index, point) in indexed(&self.time_and_intervals) {
            config.time_and_interval.insert(index, point.config());
        }
        config
    }

    /// Attach `outstation` to every input point and publish current values
    pub fn register_outstation(&self, outstation: &Arc<dyn Outstation>) {
        let mut count = 0;
        for point in self.inputs() {
            point.register_outstation(outstation);
            point.republish();
            count += 1;
        }
        info!("Attached outstation to {} input points", count);
    }

    fn inputs(&self) -> impl Iterator<Item = &dyn Point> {
        let binary = self.binary_inputs.iter().map(|p| p.as_ref() as &dyn Point);
        let double_bit = self.double_bit_inputs.iter().map(|p| p.as_ref() as &dyn Point);
        let analog = self.analog_inputs.iter().map(|p| p.as_ref() as &dyn Point);
        let counter = self.counter_inputs.iter().map(|p| p.as_ref() as &dyn Point);
        let octet = self.octet_strings.iter().map(|p| p.as_ref() as &dyn Point);
        let time = self.time_and_intervals.iter().map(|p| p.as_ref() as &dyn Point);
        binary
            .chain(double_bit)
            .chain(analog)
            .chain(counter)
            .chain(octet)
            .chain(time)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn binary_inputs(&self) -> &[Arc<BinaryPoint>] {
        &self.binary_inputs
    }

    pub fn double_bit_inputs(&self) -> &[Arc<DoubleBitPoint>] {
        &self.double_bit_inputs
    }

    pub fn analog_inputs(&self) -> &[Arc<AnalogPoint>] {
        &self.analog_inputs
    }

    pub fn counter_inputs(&self) -> &[Arc<CounterPoint>] {
        &self.counter_inputs
    }

    pub fn octet_strings(&self) -> &[Arc<OctetStringPoint>] {
        &self.octet_strings
    }

    pub fn time_and_intervals(&self) -> &[Arc<TimeAndIntervalPoint>] {
        &self.time_and_intervals
    }

    pub fn binary_outputs(&self) -> &[Arc<dyn BinaryOutput>] {
        &self.binary_outputs
    }

    pub fn analog_outputs(&self) -> &[Arc<AnalogOutput>] {
        &self.analog_outputs
    }

    pub fn binary_output(&self, index: u16) -> Option<&Arc<dyn BinaryOutput>> {
        self.binary_outputs.get(usize::from(index))
    }

    pub fn analog_output(&self, index: u16) -> Option<&Arc<AnalogOutput>> {
        self.analog_outputs.get(usize::from(index))
    }

    /// Input points in table order: binary, double-bit, analog, counter,
    /// octet string, time-and-interval
    pub fn input_rows(&self) -> Vec<PointRow> {
        self.inputs().filter_map(input_row).collect()
    }

    /// Outputs in table order: binary, then analog
    pub fn output_rows(&self) -> Vec<PointRow> {
        let binary = self.binary_outputs.iter().filter_map(|output| {
            Some(PointRow {
                group: BINARY_OUTPUT_GROUP,
                index: output.index()?,
                name: output.name(),
                value: output.kind().to_string(),
            })
        });
        let analog = self.analog_outputs.iter().filter_map(|output| {
            Some(PointRow {
                group: ANALOG_OUTPUT_GROUP,
                index: output.index()?,
                name: output.name(),
                value: "Double64".to_string(),
            })
        });
        binary.chain(analog).collect()
    }
}

impl CommandHandler for IoTable {
    fn select_crob(&self, command: &ControlRelayOutputBlock, index: u16) -> CommandStatus {
        match self.binary_output(index) {
            Some(output) => {
                debug!("Select {} on {} [{}]", command.op_type, output.name(), index);
                CommandStatus::Success
            }
            None => {
                warn!("Select on unknown binary output {}", index);
                CommandStatus::OutOfRange
            }
        }
    }

    fn operate_crob(
        &self,
        command: &ControlRelayOutputBlock,
        index: u16,
        handler: &mut dyn UpdateHandler,
        op_type: OperateType,
    ) -> CommandStatus {
        let Some(output) = self.binary_output(index) else {
            warn!("Operate on unknown binary output {}", index);
            return CommandStatus::OutOfRange;
        };

        let status = output.operate(command, handler, op_type);
        if !status.is_success() {
            warn!(
                "{} {}/{} on {} [{}] rejected: {}",
                command.op_type,
                command.tcc,
                if op_type == OperateType::SelectBeforeOperate {
                    "SBO"
                } else {
                    "direct"
                },
                output.name(),
                index,
                status
            );
        }
        status
    }

    fn select_aoi16(&self, _command: &AnalogOutputInt16, index: u16) -> CommandStatus {
        debug!("Int16 analog output {} not supported", index);
        CommandStatus::NotSupported
    }

    fn operate_aoi16(
        &self,
        _command: &AnalogOutputInt16,
        index: u16,
        _handler: &mut dyn UpdateHandler,
        _op_type: OperateType,
    ) -> CommandStatus {
        debug!("Int16 analog output {} not supported", index);
        CommandStatus::NotSupported
    }

    fn select_aoi32(&self, _command: &AnalogOutputInt32, index: u16) -> CommandStatus {
        debug!("Int32 analog output {} not supported", index);
        CommandStatus::NotSupported
    }

    fn operate_aoi32(
        &self,
        _command: &AnalogOutputInt32,
        index: u16,
        _handler: &mut dyn UpdateHandler,
        _op_type: OperateType,
    ) -> CommandStatus {
        debug!("Int32 analog output {} not supported", index);
        CommandStatus::NotSupported
    }

    fn select_aof32(&self, _command: &AnalogOutputFloat32, index: u16) -> CommandStatus {
        debug!("Float32 analog output {} not supported", index);
        CommandStatus::NotSupported
    }

    fn operate_aof32(
        &self,
        _command: &AnalogOutputFloat32,
        index: u16,
        _handler: &mut dyn UpdateHandler,
        _op_type: OperateType,
    ) -> CommandStatus {
        debug!("Float32 analog output {} not supported", index);
        CommandStatus::NotSupported
    }

    fn select_aod64(&self, command: &AnalogOutputDouble64, index: u16) -> CommandStatus {
        match self.analog_output(index) {
            Some(output) => {
                debug!("Select {} on {} [{}]", command.value, output.name(), index);
                CommandStatus::Success
            }
            None => {
                warn!("Select on unknown analog output {}", index);
                CommandStatus::OutOfRange
            }
        }
    }

    fn operate_aod64(
        &self,
        command: &AnalogOutputDouble64,
        index: u16,
        handler: &mut dyn UpdateHandler,
        op_type: OperateType,
    ) -> CommandStatus {
        let Some(output) = self.analog_output(index) else {
            warn!("Operate on unknown analog output {}", index);
            return CommandStatus::OutOfRange;
        };

        let status = output.operate(command, handler, op_type);
        if !status.is_success() {
            warn!(
                "Set {} on {} [{}] rejected: {}",
                command.value,
                output.name(),
                index,
                status
            );
        }
        status
    }
}
