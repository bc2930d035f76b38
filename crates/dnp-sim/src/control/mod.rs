//! Command decoders
//!
//! Decoders turn a raw control request into one semantic action on a device.
//! Every decoder is addressable like a point: the registry assigns it an index
//! in the binary-output or analog-output space and routes operate requests to
//! it by that index.
//!
//! Three binary decoder models exist:
//!
//! - [`LatchOutput`]: `LATCH_ON` / `LATCH_OFF` set a bound binary point
//! - [`ActivationOutput`]: `PULSE_ON` fires a single action
//! - [`TwoOutput`]: `PULSE_ON` qualified with `TRIP` or `CLOSE` fires one of
//!   two actions
//!
//! plus [`AnalogOutput`], which hands a commanded value to an action.

mod selector;

pub use selector::{TwoSignalControl, TwoSignalControlModel};

use std::sync::Arc;

use dnp_protocol::{
    AnalogOutputDouble64, Binary, CommandStatus, ControlRelayOutputBlock, DnpTime, Flags,
    OperateType, OperationType, TripCloseCode, UpdateHandler,
};
use tracing::debug;

use crate::point::{BinaryPoint, Point, PointMeta};

/// Zero-argument action fired by a binary decoder
pub type BinaryAction = Arc<dyn Fn() + Send + Sync>;

/// Action receiving the value of an analog output command
pub type AnalogAction = Arc<dyn Fn(f64) + Send + Sync>;

/// Status returned when a select-required decoder is operated directly
fn select_status(require_select: bool, op_type: OperateType) -> Option<CommandStatus> {
    (require_select && op_type != OperateType::SelectBeforeOperate)
        .then_some(CommandStatus::NoSelect)
}

/// A decoder addressable in the binary-output index space
pub trait BinaryOutput: Send + Sync {
    fn meta(&self) -> &PointMeta;

    /// Short label for the decoder model, used in output tables
    fn kind(&self) -> &'static str;

    /// Decode and execute a control relay output block
    fn operate(
        &self,
        command: &ControlRelayOutputBlock,
        handler: &mut dyn UpdateHandler,
        op_type: OperateType,
    ) -> CommandStatus;

    fn name(&self) -> String {
        self.meta().name()
    }

    fn index(&self) -> Option<u16> {
        self.meta().index()
    }

    fn set_name(&self, name: &str) {
        self.meta().set_name(name);
    }
}

// ============================================================================
// Latch
// ============================================================================

/// Latches a binary point on or off
#[derive(Debug)]
pub struct LatchOutput {
    meta: PointMeta,
    point: Arc<BinaryPoint>,
    require_select: bool,
}

impl LatchOutput {
    pub fn new(point: Arc<BinaryPoint>, require_select: bool) -> Arc<Self> {
        Arc::new(Self {
            meta: PointMeta::new(),
            point,
            require_select,
        })
    }

    /// The point this decoder drives
    pub fn point(&self) -> &Arc<BinaryPoint> {
        &self.point
    }
}

impl BinaryOutput for LatchOutput {
    fn meta(&self) -> &PointMeta {
        &self.meta
    }

    fn kind(&self) -> &'static str {
        "Latch"
    }

    fn operate(
        &self,
        command: &ControlRelayOutputBlock,
        handler: &mut dyn UpdateHandler,
        op_type: OperateType,
    ) -> CommandStatus {
        if let Some(status) = select_status(self.require_select, op_type) {
            return status;
        }
        if command.is_nul() {
            return CommandStatus::Success;
        }
        if command.tcc != TripCloseCode::Nul {
            return CommandStatus::NotSupported;
        }

        let value = match command.op_type {
            OperationType::LatchOn => true,
            OperationType::LatchOff => false,
            _ => return CommandStatus::NotSupported,
        };
        debug!("{} {} -> {}", self.name(), command.op_type, value);
        self.point.write(value);

        if let Some(index) = self.point.meta().index() {
            let confirmation = Binary {
                value: self.point.read(),
                flags: Flags::ONLINE,
                time: DnpTime::now(),
            };
            handler.update(confirmation.into(), index);
        }
        CommandStatus::Success
    }
}

// ============================================================================
// Activation
// ============================================================================

/// Fires one action on `PULSE_ON`, whatever the trip/close qualifier
pub struct ActivationOutput {
    meta: PointMeta,
    action: BinaryAction,
    require_select: bool,
}

impl ActivationOutput {
    pub fn new(action: BinaryAction, require_select: bool) -> Arc<Self> {
        Arc::new(Self {
            meta: PointMeta::new(),
            action,
            require_select,
        })
    }
}

impl BinaryOutput for ActivationOutput {
    fn meta(&self) -> &PointMeta {
        &self.meta
    }

    fn kind(&self) -> &'static str {
        "Activation"
    }

    fn operate(
        &self,
        command: &ControlRelayOutputBlock,
        _handler: &mut dyn UpdateHandler,
        op_type: OperateType,
    ) -> CommandStatus {
        if let Some(status) = select_status(self.require_select, op_type) {
            return status;
        }
        if command.is_nul() {
            return CommandStatus::Success;
        }
        if command.op_type != OperationType::PulseOn {
            return CommandStatus::NotSupported;
        }

        debug!("{} activated ({})", self.name(), command.tcc);
        (self.action)();
        CommandStatus::Success
    }
}

// ============================================================================
// Two-output
// ============================================================================

/// Fires a trip or close action from a single qualified `PULSE_ON`
pub struct TwoOutput {
    meta: PointMeta,
    trip: BinaryAction,
    close: BinaryAction,
    require_select: bool,
}

impl TwoOutput {
    pub fn new(trip: BinaryAction, close: BinaryAction, require_select: bool) -> Arc<Self> {
        Arc::new(Self {
            meta: PointMeta::new(),
            trip,
            close,
            require_select,
        })
    }
}

impl BinaryOutput for TwoOutput {
    fn meta(&self) -> &PointMeta {
        &self.meta
    }

    fn kind(&self) -> &'static str {
        "Two-Output"
    }

    fn operate(
        &self,
        command: &ControlRelayOutputBlock,
        _handler: &mut dyn UpdateHandler,
        op_type: OperateType,
    ) -> CommandStatus {
        if let Some(status) = select_status(self.require_select, op_type) {
            return status;
        }
        if command.is_nul() {
            return CommandStatus::Success;
        }

        let action = match (command.tcc, command.op_type) {
            (TripCloseCode::Trip, OperationType::PulseOn) => &self.trip,
            (TripCloseCode::Close, OperationType::PulseOn) => &self.close,
            _ => return CommandStatus::NotSupported,
        };
        debug!("{} {}", self.name(), command.tcc);
        action();
        CommandStatus::Success
    }
}

// ============================================================================
// Analog
// ============================================================================

/// Passes the commanded value of a double-precision analog output to an action
pub struct AnalogOutput {
    meta: PointMeta,
    action: AnalogAction,
    require_select: bool,
}

impl AnalogOutput {
    pub fn new(action: AnalogAction, require_select: bool) -> Arc<Self> {
        Arc::new(Self {
            meta: PointMeta::new(),
            action,
            require_select,
        })
    }

    pub fn meta(&self) -> &PointMeta {
        &self.meta
    }

    pub fn name(&self) -> String {
        self.meta.name()
    }

    pub fn index(&self) -> Option<u16> {
        self.meta.index()
    }

    pub fn set_name(&self, name: &str) {
        self.meta.set_name(name);
    }

    pub fn operate(
        &self,
        command: &AnalogOutputDouble64,
        _handler: &mut dyn UpdateHandler,
        op_type: OperateType,
    ) -> CommandStatus {
        if let Some(status) = select_status(self.require_select, op_type) {
            return status;
        }

        debug!("{} set to {}", self.name(), command.value);
        (self.action)(command.value);
        CommandStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use dnp_protocol::{Measurement, NullHandler, RecordingHandler};
    use parking_lot::Mutex;

    fn counter() -> (Arc<AtomicUsize>, BinaryAction) {
        let count = Arc::new(AtomicUsize::new(0));
        let hits = Arc::clone(&count);
        let action: BinaryAction = Arc::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        (count, action)
    }

    fn crob(op_type: OperationType, tcc: TripCloseCode) -> ControlRelayOutputBlock {
        ControlRelayOutputBlock::new(op_type, tcc)
    }

    #[test]
    fn test_latch_direct_operate() {
        let point = BinaryPoint::new();
        let latch = LatchOutput::new(Arc::clone(&point), false);
        let mut handler = NullHandler;

        let status = latch.operate(
            &ControlRelayOutputBlock::latch_on(),
            &mut handler,
            OperateType::DirectOperate,
        );
        assert_eq!(status, CommandStatus::Success);
        assert!(point.read());

        let status = latch.operate(
            &ControlRelayOutputBlock::latch_off(),
            &mut handler,
            OperateType::DirectOperate,
        );
        assert_eq!(status, CommandStatus::Success);
        assert!(!point.read());
    }

    #[test]
    fn test_latch_requires_select() {
        let point = BinaryPoint::new();
        let latch = LatchOutput::new(Arc::clone(&point), true);
        let mut handler = NullHandler;

        let status = latch.operate(
            &ControlRelayOutputBlock::latch_on(),
            &mut handler,
            OperateType::DirectOperate,
        );
        assert_eq!(status, CommandStatus::NoSelect);
        assert!(!point.read());

        let status = latch.operate(
            &ControlRelayOutputBlock::latch_on(),
            &mut handler,
            OperateType::SelectBeforeOperate,
        );
        assert_eq!(status, CommandStatus::Success);
        assert!(point.read());
    }

    #[test]
    fn test_latch_select_checked_before_nul() {
        let latch = LatchOutput::new(BinaryPoint::new(), true);
        let status = latch.operate(
            &ControlRelayOutputBlock::nul(),
            &mut NullHandler,
            OperateType::DirectOperateNoAck,
        );
        assert_eq!(status, CommandStatus::NoSelect);
    }

    #[test]
    fn test_latch_rejects_qualified_and_pulse() {
        let point = BinaryPoint::new();
        let latch = LatchOutput::new(Arc::clone(&point), false);
        let mut handler = NullHandler;

        for command in [
            crob(OperationType::LatchOn, TripCloseCode::Close),
            crob(OperationType::PulseOn, TripCloseCode::Nul),
            crob(OperationType::PulseOff, TripCloseCode::Nul),
        ] {
            assert_eq!(
                latch.operate(&command, &mut handler, OperateType::DirectOperate),
                CommandStatus::NotSupported
            );
        }
        assert!(!point.read());
    }

    #[test]
    fn test_latch_confirms_only_when_indexed() {
        let point = BinaryPoint::new();
        let latch = LatchOutput::new(Arc::clone(&point), false);
        let mut handler = RecordingHandler::new();

        latch.operate(
            &ControlRelayOutputBlock::latch_on(),
            &mut handler,
            OperateType::DirectOperate,
        );
        assert!(handler.updates().is_empty());

        point.meta().assign_index(5).unwrap();
        latch.operate(
            &ControlRelayOutputBlock::latch_on(),
            &mut handler,
            OperateType::DirectOperate,
        );
        let updates = handler.drain();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].index, 5);
        assert!(matches!(
            updates[0].measurement,
            Measurement::Binary(Binary { value: true, .. })
        ));
    }

    #[test]
    fn test_nul_pair_succeeds_without_effect() {
        let (count, action) = counter();
        let activation = ActivationOutput::new(action, false);
        let status = activation.operate(
            &ControlRelayOutputBlock::nul(),
            &mut NullHandler,
            OperateType::DirectOperate,
        );
        assert_eq!(status, CommandStatus::Success);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_activation_fires_on_any_pulse_on() {
        let (count, action) = counter();
        let activation = ActivationOutput::new(action, false);

        for tcc in [TripCloseCode::Nul, TripCloseCode::Trip, TripCloseCode::Close] {
            let status = activation.operate(
                &ControlRelayOutputBlock::pulse_on(tcc),
                &mut NullHandler,
                OperateType::DirectOperate,
            );
            assert_eq!(status, CommandStatus::Success);
        }
        assert_eq!(count.load(Ordering::SeqCst), 3);

        let status = activation.operate(
            &ControlRelayOutputBlock::latch_on(),
            &mut NullHandler,
            OperateType::DirectOperate,
        );
        assert_eq!(status, CommandStatus::NotSupported);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_two_output_routes_trip_and_close() {
        let (trips, trip) = counter();
        let (closes, close) = counter();
        let output = TwoOutput::new(trip, close, false);

        let status = output.operate(
            &ControlRelayOutputBlock::pulse_on(TripCloseCode::Trip),
            &mut NullHandler,
            OperateType::DirectOperate,
        );
        assert_eq!(status, CommandStatus::Success);
        assert_eq!(trips.load(Ordering::SeqCst), 1);
        assert_eq!(closes.load(Ordering::SeqCst), 0);

        let status = output.operate(
            &ControlRelayOutputBlock::pulse_on(TripCloseCode::Close),
            &mut NullHandler,
            OperateType::DirectOperate,
        );
        assert_eq!(status, CommandStatus::Success);
        assert_eq!(trips.load(Ordering::SeqCst), 1);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_two_output_rejects_other_combinations() {
        let (trips, trip) = counter();
        let (closes, close) = counter();
        let output = TwoOutput::new(trip, close, false);

        for command in [
            crob(OperationType::PulseOff, TripCloseCode::Trip),
            crob(OperationType::PulseOff, TripCloseCode::Close),
            crob(OperationType::PulseOn, TripCloseCode::Nul),
            crob(OperationType::LatchOn, TripCloseCode::Close),
        ] {
            assert_eq!(
                output.operate(&command, &mut NullHandler, OperateType::DirectOperate),
                CommandStatus::NotSupported
            );
        }
        assert_eq!(trips.load(Ordering::SeqCst), 0);
        assert_eq!(closes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_analog_output_passes_value() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let output = AnalogOutput::new(Arc::new(move |v: f64| sink.lock().push(v)), false);
        output.set_name("Voltage control");

        let status = output.operate(
            &AnalogOutputDouble64::new(481.5),
            &mut NullHandler,
            OperateType::DirectOperate,
        );
        assert_eq!(status, CommandStatus::Success);
        assert_eq!(*seen.lock(), vec![481.5]);
        assert_eq!(output.name(), "Voltage_control");
    }

    #[test]
    fn test_analog_output_requires_select() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let output = AnalogOutput::new(Arc::new(move |v: f64| sink.lock().push(v)), true);

        let status = output.operate(
            &AnalogOutputDouble64::new(1.0),
            &mut NullHandler,
            OperateType::DirectOperate,
        );
        assert_eq!(status, CommandStatus::NoSelect);
        assert!(seen.lock().is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn operation() -> impl Strategy<Value = OperationType> {
            (0u8..=4).prop_map(|tag| OperationType::from_type(tag).unwrap())
        }

        fn qualifier() -> impl Strategy<Value = TripCloseCode> {
            (0u8..=3).prop_map(|tag| TripCloseCode::from_type(tag).unwrap())
        }

        fn operate_type() -> impl Strategy<Value = OperateType> {
            prop_oneof![
                Just(OperateType::SelectBeforeOperate),
                Just(OperateType::DirectOperate),
                Just(OperateType::DirectOperateNoAck),
            ]
        }

        proptest! {
            #[test]
            fn two_output_fires_at_most_one_action(
                op in operation(),
                tcc in qualifier(),
                mode in operate_type(),
            ) {
                let (trips, trip) = counter();
                let (closes, close) = counter();
                let output = TwoOutput::new(trip, close, false);

                let status = output.operate(&crob(op, tcc), &mut NullHandler, mode);
                let fired = trips.load(Ordering::SeqCst) + closes.load(Ordering::SeqCst);

                let nul = op == OperationType::Nul && tcc == TripCloseCode::Nul;
                prop_assert!(fired <= 1);
                prop_assert_eq!(fired == 1, status == CommandStatus::Success && !nul);
            }

            #[test]
            fn select_required_rejects_direct_operate(op in operation(), tcc in qualifier()) {
                let point = BinaryPoint::new();
                let latch = LatchOutput::new(Arc::clone(&point), true);

                for mode in [OperateType::DirectOperate, OperateType::DirectOperateNoAck] {
                    let status = latch.operate(&crob(op, tcc), &mut NullHandler, mode);
                    prop_assert_eq!(status, CommandStatus::NoSelect);
                }
                prop_assert!(!point.read());
            }
        }
    }
}
