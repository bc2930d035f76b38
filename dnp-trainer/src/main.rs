//! DNP3 Outstation Trainer
//!
//! Builds a simulated outstation from a station configuration, logs every
//! point update and accepts operator commands on stdin.

mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dnp_sim::{DeviceView, RedrawSignal};
use dnp_table::{ChannelOutstation, Station, StationConfig};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Simulated DNP3 outstation with an operator console
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Station configuration file (defaults to the XDG config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the default station configuration and exit
    #[arg(long)]
    write_default_config: bool,

    /// Don't log individual point updates
    #[arg(long)]
    quiet_updates: bool,
}

fn load_config(args: &Args) -> anyhow::Result<StationConfig> {
    match &args.config {
        Some(path) => StationConfig::load_from(path)
            .with_context(|| format!("Failed to load station from {}", path.display())),
        None => Ok(StationConfig::load()),
    }
}

fn write_default_config(args: &Args) -> anyhow::Result<()> {
    let config = StationConfig::default();
    let path = match &args.config {
        Some(path) => {
            config.save_to(path)?;
            path.clone()
        }
        None => config.save()?,
    };
    info!("Wrote default station to {}", path.display());
    Ok(())
}

/// Log the devices whose value changed between two snapshots
fn log_changes(previous: &[DeviceView], current: &[DeviceView]) {
    for (before, after) in previous.iter().zip(current) {
        if before.value != after.value {
            debug!("{}: {} -> {}", after.name, before.value, after.value);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "dnp_trainer=info,dnp_protocol=info,dnp_sim=info,dnp_table=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    if args.write_default_config {
        return write_default_config(&args);
    }

    info!("Starting DNP3 outstation trainer");
    let config = load_config(&args)?;
    let station = Arc::new(Station::build(&config).context("Failed to build station")?);

    let (outstation, mut updates) = ChannelOutstation::shared();
    let database = station.attach(&outstation);
    info!(
        "Outstation database: {} binary, {} double-bit, {} analog, {} octet string points",
        database.binary_input.len(),
        database.double_binary.len(),
        database.analog_input.len(),
        database.octet_string.len()
    );

    let quiet = args.quiet_updates;
    tokio::spawn(async move {
        while let Some(batch) = updates.recv().await {
            if quiet {
                continue;
            }
            for update in batch {
                info!(
                    "Update g{} [{}] = {}",
                    update.measurement.static_group(),
                    update.index,
                    update.measurement.value_display()
                );
            }
        }
    });

    let redraw = RedrawSignal::new();
    station.register_refresh(&redraw);
    {
        let station = Arc::clone(&station);
        tokio::spawn(async move {
            let mut previous = station.device_views();
            loop {
                redraw.notified().await;
                let current = station.device_views();
                log_changes(&previous, &current);
                previous = current;
            }
        });
    }

    let console_station = Arc::clone(&station);
    tokio::task::spawn_blocking(move || {
        console::run(&console_station, std::io::stdin().lock(), std::io::stdout())
    })
    .await?
    .context("Console I/O failed")?;

    info!("Shutting down {}", station.name());
    Ok(())
}
