//! Integration tests for the outstation point table
//!
//! These tests verify end-to-end behavior of a station including:
//! - Command dispatch by index through the command handler interface
//! - Point updates reaching an attached outstation
//! - Timed travel of slow devices driven through the table
//! - Default station layout and configuration files

use std::sync::Arc;
use std::time::Duration;

use dnp_protocol::{
    AnalogOutputDouble64, CommandHandler, CommandStatus, ControlRelayOutputBlock, DoubleBit,
    Measurement, NullHandler, OperateType, Outstation, RecordingHandler, TripCloseCode, Update,
};
use dnp_sim::{BinaryPoint, LatchOutput, Point, Polarity, TwoSignalControlModel};
use dnp_table::{ChannelOutstation, DeviceConfig, IoTable, Station, StationConfig, TableError};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    use dnp_protocol::Updates;
    use tokio::sync::mpsc::UnboundedReceiver;

    /// Drain every update batch currently queued
    pub fn drain(rx: &mut UnboundedReceiver<Updates>) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Ok(batch) = rx.try_recv() {
            updates.extend(batch);
        }
        updates
    }

    /// Attach a channel outstation to `table`, discarding the seeding batch
    pub fn attach(table: &IoTable) -> (Arc<dyn Outstation>, UnboundedReceiver<Updates>) {
        let (sink, mut rx) = ChannelOutstation::shared();
        table.register_outstation(&sink);
        drain(&mut rx);
        (sink, rx)
    }

    pub fn binary_values(updates: &[Update]) -> Vec<(u16, bool)> {
        updates
            .iter()
            .filter_map(|u| match &u.measurement {
                Measurement::Binary(b) => Some((u.index, b.value)),
                _ => None,
            })
            .collect()
    }

    pub fn direct(table: &IoTable, command: ControlRelayOutputBlock, index: u16) -> CommandStatus {
        table.operate_crob(&command, index, &mut NullHandler, OperateType::DirectOperate)
    }
}

// ============================================================================
// End-to-End Latch
// ============================================================================

#[test]
fn test_fan_latch_on_off() {
    let mut table = IoTable::new();
    let fan = table.create_simple_device("Fan").unwrap();
    let (_sink, mut rx) = helpers::attach(&table);

    let mut handler = RecordingHandler::new();
    let status = table.operate_crob(
        &ControlRelayOutputBlock::latch_on(),
        0,
        &mut handler,
        OperateType::DirectOperate,
    );
    assert_eq!(status, CommandStatus::Success);
    assert!(fan.point().read());

    let status = table.operate_crob(
        &ControlRelayOutputBlock::latch_off(),
        0,
        &mut handler,
        OperateType::DirectOperate,
    );
    assert_eq!(status, CommandStatus::Success);
    assert!(!fan.point().read());

    // One update per write reached the outstation
    let updates = helpers::drain(&mut rx);
    assert_eq!(helpers::binary_values(&updates), vec![(0, true), (0, false)]);

    // And each operate confirmed the resulting value
    assert_eq!(
        helpers::binary_values(handler.updates()),
        vec![(0, true), (0, false)]
    );
}

#[test]
fn test_operate_past_last_output_is_out_of_range() {
    let mut table = IoTable::new();
    table.create_simple_device("Device 0").unwrap();
    table
        .create_breaker("Breaker 5", TwoSignalControlModel::Activation)
        .unwrap();

    let last = table.binary_outputs().len() as u16;
    assert_eq!(
        helpers::direct(&table, ControlRelayOutputBlock::latch_on(), last),
        CommandStatus::OutOfRange
    );
    assert_eq!(
        table.select_crob(&ControlRelayOutputBlock::latch_on(), last),
        CommandStatus::OutOfRange
    );
}

#[test]
fn test_select_required_output_via_direct_operate() {
    let mut table = IoTable::new();
    let point = BinaryPoint::new();
    point.set_name("Pump status");
    table.register_binary_input(Arc::clone(&point)).unwrap();
    let output = LatchOutput::new(Arc::clone(&point), true);
    table.register_binary_output(output).unwrap();

    assert_eq!(
        helpers::direct(&table, ControlRelayOutputBlock::latch_on(), 0),
        CommandStatus::NoSelect
    );
    assert!(!point.read());

    let crob = ControlRelayOutputBlock::latch_on();
    assert_eq!(table.select_crob(&crob, 0), CommandStatus::Success);
    assert_eq!(
        table.operate_crob(&crob, 0, &mut NullHandler, OperateType::SelectBeforeOperate),
        CommandStatus::Success
    );
    assert!(point.read());
}

// ============================================================================
// Outstation Attachment
// ============================================================================

#[test]
fn test_register_outstation_seeds_current_values() {
    let mut table = IoTable::new();
    let fan = table.create_simple_device("Fan").unwrap();
    table
        .create_setpoint_controller("Temperature", 62.0, 0.5, true)
        .unwrap();
    table
        .create_slow_device("Switch", 1_000, TwoSignalControlModel::Activation, Polarity::Normal)
        .unwrap();

    // Written before any outstation exists: stored locally only
    fan.point().write(true);

    let (sink, mut rx) = ChannelOutstation::shared();
    table.register_outstation(&sink);
    let updates = helpers::drain(&mut rx);

    assert_eq!(updates.len(), 3);
    assert_eq!(helpers::binary_values(&updates), vec![(0, true)]);
    assert!(updates.iter().any(|u| matches!(
        &u.measurement,
        Measurement::DoubleBitBinary(d) if d.value == DoubleBit::DeterminedOff
    )));
    assert!(updates.iter().any(|u| matches!(
        &u.measurement,
        Measurement::Analog(a) if a.value == 62.0
    )));
}

#[test]
fn test_dropped_outstation_leaves_table_working() {
    let mut table = IoTable::new();
    let fan = table.create_simple_device("Fan").unwrap();
    {
        let (sink, _rx) = ChannelOutstation::shared();
        table.register_outstation(&sink);
    }

    assert_eq!(
        helpers::direct(&table, ControlRelayOutputBlock::latch_on(), 0),
        CommandStatus::Success
    );
    assert!(fan.point().read());
}

// ============================================================================
// Breakers and Slow Devices
// ============================================================================

#[test]
fn test_breaker_models_through_table() {
    let mut table = IoTable::new();
    let complementary = table
        .create_breaker("Breaker 0", TwoSignalControlModel::ComplementaryTwoOutput)
        .unwrap();
    let activation = table
        .create_breaker("Breaker 5", TwoSignalControlModel::Activation)
        .unwrap();
    let (_sink, mut rx) = helpers::attach(&table);

    let close = ControlRelayOutputBlock::pulse_on(TripCloseCode::Close);
    let trip = ControlRelayOutputBlock::pulse_on(TripCloseCode::Trip);
    let pulse = ControlRelayOutputBlock::pulse_on(TripCloseCode::Nul);

    assert_eq!(helpers::direct(&table, close, 0), CommandStatus::Success);
    assert!(complementary.point().read());
    assert_eq!(helpers::direct(&table, pulse, 0), CommandStatus::NotSupported);
    assert_eq!(helpers::direct(&table, trip, 0), CommandStatus::Success);
    assert!(!complementary.point().read());

    // Activation: index 1 trips, index 2 closes
    assert_eq!(helpers::direct(&table, pulse, 2), CommandStatus::Success);
    assert!(activation.point().read());
    assert_eq!(helpers::direct(&table, pulse, 1), CommandStatus::Success);
    assert!(!activation.point().read());

    let updates = helpers::drain(&mut rx);
    assert_eq!(
        helpers::binary_values(&updates),
        vec![(0, true), (0, false), (1, true), (1, false)]
    );
}

#[tokio::test]
async fn test_slow_device_close_reports_travel() {
    let mut table = IoTable::new();
    let switch = table
        .create_slow_device("Switch 0", 500, TwoSignalControlModel::Activation, Polarity::Normal)
        .unwrap();
    let (_sink, mut rx) = helpers::attach(&table);

    assert_eq!(
        helpers::direct(&table, ControlRelayOutputBlock::pulse_on(TripCloseCode::Nul), 1),
        CommandStatus::Success
    );

    let mut states = Vec::new();
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(batch) = rx.recv().await {
            for update in batch {
                if let Measurement::DoubleBitBinary(d) = update.measurement {
                    states.push(d.value);
                    if d.value == DoubleBit::DeterminedOn {
                        return;
                    }
                }
            }
        }
    })
    .await;

    assert!(result.is_ok(), "switch never closed: {:?}", states);
    assert_eq!(
        states,
        vec![DoubleBit::IntermediateState, DoubleBit::DeterminedOn]
    );
    assert_eq!(switch.position(), 1.0);
}

#[test]
fn test_slow_device_trip_right_after_close() {
    let mut table = IoTable::new();
    let switch = table
        .create_slow_device("Switch 1", 1_000, TwoSignalControlModel::Activation, Polarity::Normal)
        .unwrap();

    let (_sink, mut rx) = helpers::attach(&table);

    let pulse = ControlRelayOutputBlock::pulse_on(TripCloseCode::Nul);
    for _ in 0..20 {
        assert_eq!(helpers::direct(&table, pulse, 1), CommandStatus::Success);
        assert_eq!(helpers::direct(&table, pulse, 0), CommandStatus::Success);
    }

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while switch.is_moving() && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    std::thread::sleep(Duration::from_millis(250));
    assert_eq!(switch.point().read(), DoubleBit::DeterminedOff);

    let states: Vec<DoubleBit> = helpers::drain(&mut rx)
        .into_iter()
        .filter_map(|u| match u.measurement {
            Measurement::DoubleBitBinary(d) => Some(d.value),
            _ => None,
        })
        .collect();
    assert!(
        !states.contains(&DoubleBit::DeterminedOn),
        "stale On reported: {:?}",
        states
    );
}

#[test]
fn test_analog_output_moves_setpoint() {
    let mut table = IoTable::new();
    let frequency = table
        .create_setpoint_controller("Frequency", 60.0, 0.2, false)
        .unwrap();

    let command = AnalogOutputDouble64::new(50.0);
    assert_eq!(
        table.operate_aod64(&command, 0, &mut NullHandler, OperateType::DirectOperate),
        CommandStatus::Success
    );
    assert_eq!(frequency.base(), 50.0);
    assert_eq!(
        table.operate_aod64(&command, 1, &mut NullHandler, OperateType::DirectOperate),
        CommandStatus::OutOfRange
    );
}

// ============================================================================
// Station Layout and Configuration
// ============================================================================

#[test]
fn test_default_station_indices() {
    let station = Station::build(&StationConfig::default()).unwrap();
    let table = station.table();

    let analog: Vec<String> = table.analog_inputs().iter().map(|p| p.name()).collect();
    assert_eq!(
        analog,
        vec!["Temperature_status", "Voltage_status", "Frequency_status"]
    );

    // Temperature is read-only
    let analog_outputs: Vec<String> = table.analog_outputs().iter().map(|o| o.name()).collect();
    assert_eq!(analog_outputs, vec!["Voltage_control", "Frequency_control"]);

    // 5 latches + 5 complementary + 5 * 2 activation + 3 * 2 switches
    assert_eq!(table.binary_outputs().len(), 26);
    assert_eq!(table.binary_outputs()[5].name(), "Breaker_0_control");
    assert_eq!(table.binary_outputs()[10].name(), "Breaker_5_trip");
    assert_eq!(table.binary_outputs()[11].name(), "Breaker_5_close");
    assert_eq!(table.binary_outputs()[20].name(), "Switch_0_trip");

    assert_eq!(table.binary_inputs().len(), 15);
    assert_eq!(table.double_bit_inputs().len(), 3);
    assert_eq!(station.devices().len(), 21);

    let db = table.configure_database();
    assert_eq!(db.point_count(), 15 + 3 + 3 + 1);
    assert_eq!(db.octet_string.len(), 1);
}

#[test]
fn test_station_attach_returns_database() {
    let config = StationConfig {
        name: "Bench".to_string(),
        devices: vec![DeviceConfig::Simple {
            name: "Fan".to_string(),
        }],
    };
    let station = Station::build(&config).unwrap();
    let (sink, mut rx) = ChannelOutstation::shared();

    let db = station.attach(&sink);
    assert_eq!(db.binary_input.len(), 1);
    assert_eq!(db.octet_string.len(), 1);

    let updates = helpers::drain(&mut rx);
    assert!(updates.iter().any(|u| matches!(
        &u.measurement,
        Measurement::OctetString(s) if s.value == b"Bench"
    )));
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("station.json");

    let mut config = StationConfig::default();
    config.name = "Substation A".to_string();
    config.devices.push(DeviceConfig::Slow {
        name: "Gate".to_string(),
        runtime_ms: 2_000,
        model: TwoSignalControlModel::ComplementaryTwoOutput,
        polarity: Polarity::Reversed,
    });

    config.save_to(&path).unwrap();
    let loaded = StationConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_config_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.json");
    assert!(matches!(
        StationConfig::load_from(&missing),
        Err(TableError::Io { .. })
    ));

    let invalid = dir.path().join("invalid.json");
    std::fs::write(&invalid, "{ \"name\": 3 }").unwrap();
    assert!(matches!(
        StationConfig::load_from(&invalid),
        Err(TableError::Json(_))
    ));
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn indices_equal_insertion_order(kinds in prop::collection::vec(0u8..3, 0..40)) {
            let mut table = IoTable::new();
            let mut expected = [0u16; 3];

            for kind in kinds {
                let index = match kind {
                    0 => table.register_binary_input(BinaryPoint::new()),
                    1 => table.register_double_bit_input(dnp_sim::DoubleBitPoint::new()),
                    _ => table.register_analog_input(dnp_sim::AnalogPoint::new()),
                }
                .unwrap();
                prop_assert_eq!(index, expected[usize::from(kind)]);
                expected[usize::from(kind)] += 1;
            }

            let binary: Vec<Option<u16>> = table.binary_inputs().iter().map(|p| p.index()).collect();
            let in_order: Vec<Option<u16>> = (0..binary.len() as u16).map(Some).collect();
            prop_assert_eq!(binary, in_order);
        }

        #[test]
        fn operate_beyond_outputs_is_out_of_range(devices in 0usize..6, extra in 0u16..100) {
            let mut table = IoTable::new();
            for i in 0..devices {
                table.create_simple_device(&format!("Device {}", i)).unwrap();
            }

            let index = devices as u16 + extra;
            prop_assert_eq!(
                helpers::direct(&table, ControlRelayOutputBlock::latch_on(), index),
                CommandStatus::OutOfRange
            );
        }
    }
}
