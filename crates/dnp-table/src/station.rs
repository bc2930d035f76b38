//! A configured station: its point table and devices

use std::sync::Arc;

use dnp_protocol::{DatabaseConfig, Outstation};
use dnp_sim::{Device, DeviceView, OctetStringPoint, Point, RedrawSignal};
use tracing::info;

use crate::config::{DeviceConfig, StationConfig};
use crate::error::TableError;
use crate::table::IoTable;

/// Every device of a station, registered in one [`IoTable`]
pub struct Station {
    name: String,
    table: IoTable,
    devices: Vec<Arc<dyn Device>>,
    name_point: Arc<OctetStringPoint>,
}

impl Station {
    /// Create and register every device of `config`, in order
    pub fn build(config: &StationConfig) -> Result<Self, TableError> {
        let mut table = IoTable::new();
        let mut devices: Vec<Arc<dyn Device>> = Vec::with_capacity(config.devices.len());

        for device in &config.devices {
            let built: Arc<dyn Device> = match device {
                DeviceConfig::Simple { name } => table.create_simple_device(name)?,
                DeviceConfig::Breaker { name, model } => table.create_breaker(name, *model)?,
                DeviceConfig::Slow {
                    name,
                    runtime_ms,
                    model,
                    polarity,
                } => table.create_slow_device(name, *runtime_ms, *model, *polarity)?,
                DeviceConfig::Setpoint {
                    name,
                    setpoint,
                    variance,
                    read_only,
                } => table.create_setpoint_controller(name, *setpoint, *variance, *read_only)?,
            };
            devices.push(built);
        }

        let name_point = OctetStringPoint::new(config.name.as_str());
        name_point.set_name("station_name");
        table.register_octet_string(Arc::clone(&name_point))?;

        info!(
            "Built station {}: {} devices, {} binary outputs, {} analog outputs",
            config.name,
            devices.len(),
            table.binary_outputs().len(),
            table.analog_outputs().len()
        );
        Ok(Self {
            name: config.name.clone(),
            table,
            devices,
            name_point,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &IoTable {
        &self.table
    }

    pub fn devices(&self) -> &[Arc<dyn Device>] {
        &self.devices
    }

    /// Point reporting the station name
    pub fn name_point(&self) -> &Arc<OctetStringPoint> {
        &self.name_point
    }

    /// Snapshot every device for display
    pub fn device_views(&self) -> Vec<DeviceView> {
        self.devices.iter().map(|d| d.render()).collect()
    }

    /// Install one redraw signal on every device
    pub fn register_refresh(&self, signal: &RedrawSignal) {
        for device in &self.devices {
            device.register_refresh(signal.clone());
        }
    }

    /// Attach an outstation and return the database layout it should serve
    pub fn attach(&self, outstation: &Arc<dyn Outstation>) -> DatabaseConfig {
        let database = self.table.configure_database();
        self.table.register_outstation(outstation);
        database
    }
}
