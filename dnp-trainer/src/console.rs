//! Operator console
//!
//! Reads one command per line and dispatches it through the station's
//! [`CommandHandler`], exactly as a master's request would arrive. Any command
//! may end in `--select` to perform select-before-operate instead of a direct
//! operate.
//!
//! ```text
//! inputs | outputs | devices
//! latch <idx> on|off
//! trip <idx> | close <idx> | pulse <idx>
//! set <idx> <value>
//! help | quit
//! ```

use std::io::{self, BufRead, Write};

use dnp_protocol::{
    AnalogOutputDouble64, CommandHandler, CommandStatus, ControlRelayOutputBlock, OperateType,
    RecordingHandler, TripCloseCode,
};
use dnp_table::{PointRow, Station};
use thiserror::Error;
use tracing::debug;

const HELP: &str = "\
Commands:
  inputs                 list input points
  outputs                list binary and analog outputs
  devices                list devices and their state
  latch <idx> on|off     latch a binary output
  trip <idx>             pulse on with TRIP
  close <idx>            pulse on with CLOSE
  pulse <idx>            pulse on without qualifier
  set <idx> <value>      operate a double-precision analog output
  help                   show this text
  quit                   exit (also q, x, exit)
Append --select to any command to select before operating.";

/// Errors from parsing a console line
#[derive(Debug, Error, PartialEq)]
pub enum ConsoleError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("missing {0}")]
    MissingArgument(&'static str),

    #[error("invalid index: {0}")]
    InvalidIndex(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("expected on or off, got {0}")]
    InvalidLatch(String),

    #[error("unexpected argument: {0}")]
    TrailingArgument(String),
}

/// A parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    Help,
    Inputs,
    Outputs,
    Devices,
    Latch { index: u16, on: bool, select: bool },
    Trip { index: u16, select: bool },
    Close { index: u16, select: bool },
    Pulse { index: u16, select: bool },
    Set { index: u16, value: f64, select: bool },
}

fn parse_index(arg: Option<&str>) -> Result<u16, ConsoleError> {
    let arg = arg.ok_or(ConsoleError::MissingArgument("index"))?;
    arg.parse()
        .map_err(|_| ConsoleError::InvalidIndex(arg.to_string()))
}

/// Parse one line; blank lines yield `None`
pub fn parse(line: &str) -> Result<Option<Command>, ConsoleError> {
    let mut words: Vec<&str> = line.split_whitespace().collect();
    let select = words.last() == Some(&"--select");
    if select {
        words.pop();
    }

    let mut args = words.into_iter();
    let Some(keyword) = args.next() else {
        return Ok(None);
    };

    let command = match keyword.to_ascii_lowercase().as_str() {
        "quit" | "q" | "exit" | "x" => Command::Quit,
        "help" | "?" => Command::Help,
        "inputs" => Command::Inputs,
        "outputs" => Command::Outputs,
        "devices" => Command::Devices,
        "latch" => {
            let index = parse_index(args.next())?;
            let on = match args.next().map(str::to_ascii_lowercase).as_deref() {
                Some("on") => true,
                Some("off") => false,
                Some(other) => return Err(ConsoleError::InvalidLatch(other.to_string())),
                None => return Err(ConsoleError::MissingArgument("on|off")),
            };
            Command::Latch { index, on, select }
        }
        "trip" => Command::Trip {
            index: parse_index(args.next())?,
            select,
        },
        "close" => Command::Close {
            index: parse_index(args.next())?,
            select,
        },
        "pulse" => Command::Pulse {
            index: parse_index(args.next())?,
            select,
        },
        "set" => {
            let index = parse_index(args.next())?;
            let arg = args.next().ok_or(ConsoleError::MissingArgument("value"))?;
            let value = arg
                .parse()
                .map_err(|_| ConsoleError::InvalidValue(arg.to_string()))?;
            Command::Set {
                index,
                value,
                select,
            }
        }
        other => return Err(ConsoleError::UnknownCommand(other.to_string())),
    };

    match args.next() {
        Some(extra) => Err(ConsoleError::TrailingArgument(extra.to_string())),
        None => Ok(Some(command)),
    }
}

fn operate_crob(
    station: &Station,
    crob: ControlRelayOutputBlock,
    index: u16,
    select: bool,
    handler: &mut RecordingHandler,
) -> CommandStatus {
    let table = station.table();
    table.begin();
    let status = if select {
        match table.select_crob(&crob, index) {
            CommandStatus::Success => {
                table.operate_crob(&crob, index, handler, OperateType::SelectBeforeOperate)
            }
            rejected => rejected,
        }
    } else {
        table.operate_crob(&crob, index, handler, OperateType::DirectOperate)
    };
    table.end();
    status
}

fn operate_analog(
    station: &Station,
    command: AnalogOutputDouble64,
    index: u16,
    select: bool,
    handler: &mut RecordingHandler,
) -> CommandStatus {
    let table = station.table();
    table.begin();
    let status = if select {
        match table.select_aod64(&command, index) {
            CommandStatus::Success => {
                table.operate_aod64(&command, index, handler, OperateType::SelectBeforeOperate)
            }
            rejected => rejected,
        }
    } else {
        table.operate_aod64(&command, index, handler, OperateType::DirectOperate)
    };
    table.end();
    status
}

fn write_rows(out: &mut impl Write, rows: &[PointRow]) -> io::Result<()> {
    writeln!(out, "{:>5} {:>5}  {:<28} Value", "Group", "Index", "Name")?;
    for row in rows {
        writeln!(
            out,
            "{:>5} {:>5}  {:<28} {}",
            row.group, row.index, row.name, row.value
        )?;
    }
    Ok(())
}

/// Execute a command, writing its result to `out`
///
/// Returns `false` once the operator asked to quit.
pub fn execute(station: &Station, command: &Command, out: &mut impl Write) -> io::Result<bool> {
    let mut handler = RecordingHandler::new();
    let status = match *command {
        Command::Quit => return Ok(false),
        Command::Help => {
            writeln!(out, "{}", HELP)?;
            return Ok(true);
        }
        Command::Inputs => {
            write_rows(out, &station.table().input_rows())?;
            return Ok(true);
        }
        Command::Outputs => {
            write_rows(out, &station.table().output_rows())?;
            return Ok(true);
        }
        Command::Devices => {
            writeln!(out, "{:<16} {:<32} Value", "Device", "Model")?;
            for view in station.device_views() {
                writeln!(out, "{:<16} {:<32} {}", view.name, view.model, view.value)?;
            }
            return Ok(true);
        }
        Command::Latch { index, on, select } => {
            let crob = if on {
                ControlRelayOutputBlock::latch_on()
            } else {
                ControlRelayOutputBlock::latch_off()
            };
            operate_crob(station, crob, index, select, &mut handler)
        }
        Command::Trip { index, select } => {
            let crob = ControlRelayOutputBlock::pulse_on(TripCloseCode::Trip);
            operate_crob(station, crob, index, select, &mut handler)
        }
        Command::Close { index, select } => {
            let crob = ControlRelayOutputBlock::pulse_on(TripCloseCode::Close);
            operate_crob(station, crob, index, select, &mut handler)
        }
        Command::Pulse { index, select } => {
            let crob = ControlRelayOutputBlock::pulse_on(TripCloseCode::Nul);
            operate_crob(station, crob, index, select, &mut handler)
        }
        Command::Set {
            index,
            value,
            select,
        } => operate_analog(
            station,
            AnalogOutputDouble64::new(value),
            index,
            select,
            &mut handler,
        ),
    };

    writeln!(out, "{}", status)?;
    for update in handler.drain() {
        writeln!(
            out,
            "  confirmed [{}] = {}",
            update.index,
            update.measurement.value_display()
        )?;
    }
    Ok(true)
}

/// Read and execute commands until quit or end of input
pub fn run(station: &Station, input: impl BufRead, mut out: impl Write) -> io::Result<()> {
    writeln!(out, "{} ready. Type help for commands.", station.name())?;
    for line in input.lines() {
        let line = line?;
        match parse(&line) {
            Ok(None) => {}
            Ok(Some(command)) => {
                debug!("Console command {:?}", command);
                if !execute(station, &command, &mut out)? {
                    break;
                }
            }
            Err(e) => writeln!(out, "{}", e)?,
        }
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use dnp_table::{DeviceConfig, StationConfig};

    fn bench() -> Station {
        let config = StationConfig {
            name: "Bench".to_string(),
            devices: vec![
                DeviceConfig::Simple {
                    name: "Fan".to_string(),
                },
                DeviceConfig::Setpoint {
                    name: "Voltage".to_string(),
                    setpoint: 480.0,
                    variance: 0.0,
                    read_only: false,
                },
            ],
        };
        Station::build(&config).unwrap()
    }

    fn output_of(station: &Station, command: Command) -> String {
        let mut out = Vec::new();
        assert!(execute(station, &command, &mut out).unwrap());
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("  "), Ok(None));
        assert_eq!(parse("q"), Ok(Some(Command::Quit)));
        assert_eq!(parse("EXIT"), Ok(Some(Command::Quit)));
        assert_eq!(
            parse("latch 3 on"),
            Ok(Some(Command::Latch {
                index: 3,
                on: true,
                select: false
            }))
        );
        assert_eq!(
            parse("trip 10 --select"),
            Ok(Some(Command::Trip {
                index: 10,
                select: true
            }))
        );
        assert_eq!(
            parse("set 1 480.5"),
            Ok(Some(Command::Set {
                index: 1,
                value: 480.5,
                select: false
            }))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse("open 1"),
            Err(ConsoleError::UnknownCommand("open".to_string()))
        );
        assert_eq!(parse("close"), Err(ConsoleError::MissingArgument("index")));
        assert_eq!(
            parse("close -1"),
            Err(ConsoleError::InvalidIndex("-1".to_string()))
        );
        assert_eq!(
            parse("latch 0 maybe"),
            Err(ConsoleError::InvalidLatch("maybe".to_string()))
        );
        assert_eq!(
            parse("set 0 hot"),
            Err(ConsoleError::InvalidValue("hot".to_string()))
        );
        assert_eq!(
            parse("pulse 0 1"),
            Err(ConsoleError::TrailingArgument("1".to_string()))
        );
    }

    #[test]
    fn test_latch_prints_status_and_confirmation() {
        let station = bench();
        let text = output_of(
            &station,
            Command::Latch {
                index: 0,
                on: true,
                select: true,
            },
        );
        assert!(text.starts_with("SUCCESS"));
        assert!(text.contains("confirmed [0] = true"));
        assert!(station.table().binary_inputs()[0].read());
    }

    #[test]
    fn test_out_of_range_and_unsupported() {
        let station = bench();
        let text = output_of(
            &station,
            Command::Pulse {
                index: 7,
                select: false,
            },
        );
        assert_eq!(text.trim(), "OUT_OF_RANGE");

        let text = output_of(
            &station,
            Command::Trip {
                index: 0,
                select: false,
            },
        );
        assert_eq!(text.trim(), "NOT_SUPPORTED");
    }

    #[test]
    fn test_set_moves_setpoint() {
        let station = bench();
        let text = output_of(
            &station,
            Command::Set {
                index: 0,
                value: 400.0,
                select: false,
            },
        );
        assert_eq!(text.trim(), "SUCCESS");
    }

    #[test]
    fn test_tables_list_points() {
        let station = bench();
        let inputs = output_of(&station, Command::Inputs);
        assert!(inputs.contains("Fan_status"));
        assert!(inputs.contains("Voltage_status"));
        assert!(inputs.contains("station_name"));

        let outputs = output_of(&station, Command::Outputs);
        assert!(outputs.contains("Fan_control"));
        assert!(outputs.contains("Voltage_control"));

        let devices = output_of(&station, Command::Devices);
        assert!(devices.contains("Latch Model"));
        assert!(devices.contains("Analog Output (Double64)"));
    }

    #[test]
    fn test_run_stops_at_quit() {
        let station = bench();
        let input = "latch 0 on\nbogus\nquit\nlatch 0 off\n".as_bytes();
        let mut out = Vec::new();
        run(&station, input, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("unknown command: bogus"));
        // The line after quit never ran
        assert!(station.table().binary_inputs()[0].read());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn parse_never_panics(line in ".{0,64}") {
                let _ = parse(&line);
            }

            #[test]
            fn index_commands_round_trip(index in any::<u16>(), select in any::<bool>()) {
                let suffix = if select { " --select" } else { "" };
                prop_assert_eq!(
                    parse(&format!("close {}{}", index, suffix)),
                    Ok(Some(Command::Close { index, select }))
                );
                prop_assert_eq!(
                    parse(&format!("latch {} off{}", index, suffix)),
                    Ok(Some(Command::Latch { index, on: false, select }))
                );
            }
        }
    }
}
