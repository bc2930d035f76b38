//! On/off device driven by a single latch

use std::sync::Arc;

use tracing::info;

use super::{Device, DeviceValue, DeviceView};
use crate::control::{BinaryOutput, LatchOutput};
use crate::point::{BinaryPoint, Point};

/// A binary status point with one latch output bound to it
#[derive(Debug)]
pub struct SimpleDevice {
    name: String,
    point: Arc<BinaryPoint>,
    output: Arc<LatchOutput>,
}

impl SimpleDevice {
    pub fn new(name: &str) -> Arc<Self> {
        let point = BinaryPoint::new();
        point.meta().set_name(&format!("{}_status", name));

        let output = LatchOutput::new(Arc::clone(&point), false);
        output.set_name(&format!("{}_control", name));

        info!("Created simple device {}", name);
        Arc::new(Self {
            name: name.to_string(),
            point,
            output,
        })
    }

    pub fn point(&self) -> &Arc<BinaryPoint> {
        &self.point
    }

    pub fn output(&self) -> &Arc<LatchOutput> {
        &self.output
    }
}

impl Device for SimpleDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self) -> DeviceView {
        DeviceView {
            name: self.name.clone(),
            model: "Latch Model".to_string(),
            value: DeviceValue::Binary(self.point.read()),
        }
    }
}
