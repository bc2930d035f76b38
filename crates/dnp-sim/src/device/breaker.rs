//! Instantaneous circuit breaker

use std::sync::Arc;

use tracing::info;

use super::{Device, DeviceValue, DeviceView};
use crate::control::{BinaryAction, TwoSignalControl, TwoSignalControlModel};
use crate::point::{BinaryPoint, Point};

/// A binary status point switched by trip (false) and close (true)
#[derive(Debug)]
pub struct Breaker {
    name: String,
    point: Arc<BinaryPoint>,
    control: TwoSignalControl,
}

impl Breaker {
    pub fn new(name: &str, model: TwoSignalControlModel) -> Arc<Self> {
        let point = BinaryPoint::new();
        point.meta().set_name(&format!("{}_status", name));

        let trip: BinaryAction = {
            let point = Arc::clone(&point);
            Arc::new(move || point.write(false))
        };
        let close: BinaryAction = {
            let point = Arc::clone(&point);
            Arc::new(move || point.write(true))
        };
        let control = TwoSignalControl::new(model, trip, close);
        control.set_point_names(name);

        info!("Created breaker {} ({})", name, model);
        Arc::new(Self {
            name: name.to_string(),
            point,
            control,
        })
    }

    pub fn point(&self) -> &Arc<BinaryPoint> {
        &self.point
    }

    pub fn control(&self) -> &TwoSignalControl {
        &self.control
    }

    pub fn trip(&self) {
        self.point.write(false);
    }

    pub fn close(&self) {
        self.point.write(true);
    }
}

impl Device for Breaker {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self) -> DeviceView {
        DeviceView {
            name: self.name.clone(),
            model: self.control.model().label().to_string(),
            value: DeviceValue::Binary(self.point.read()),
        }
    }
}
