//! Analog measurement that wanders around a settable base value

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info};

use super::{Device, DeviceValue, DeviceView, RedrawSignal, RefreshSlot};
use crate::control::{AnalogAction, AnalogOutput};
use crate::point::{AnalogPoint, Point};
use crate::worker::{StopSignal, Worker};

/// Time between noisy samples
pub const JITTER_INTERVAL: Duration = Duration::from_secs(1);

/// State shared between the controller and its jitter worker
#[derive(Debug)]
struct Jitter {
    point: Arc<AnalogPoint>,
    /// IEEE-754 bits of the base value
    base: AtomicU64,
    variance: f64,
    refresh: RefreshSlot,
}

impl Jitter {
    fn base(&self) -> f64 {
        f64::from_bits(self.base.load(Ordering::SeqCst))
    }

    fn run(&self, signal: &StopSignal) {
        let mut rng = StdRng::from_entropy();
        // Uniform panics on an empty range
        let noise = (self.variance > 0.0)
            .then(|| Uniform::new_inclusive(-self.variance, self.variance));

        loop {
            let offset = noise.as_ref().map_or(0.0, |n| n.sample(&mut rng));
            self.point.write(self.base() + offset);
            self.refresh.request();

            if !signal.wait(JITTER_INTERVAL) {
                break;
            }
        }
    }
}

/// An analog point reporting `base ± variance`, with an optional output that
/// moves the base
pub struct SetpointController {
    name: String,
    jitter: Arc<Jitter>,
    output: Option<Arc<AnalogOutput>>,
    worker: Mutex<Option<Worker>>,
}

impl SetpointController {
    pub fn new(name: &str, setpoint: f64, variance: f64, read_only: bool) -> Arc<Self> {
        let variance = variance.abs();

        let point = AnalogPoint::with_initial(setpoint);
        point.meta().set_name(&format!("{}_status", name));
        point.set_deadband(2.0 * variance);

        let jitter = Arc::new(Jitter {
            point,
            base: AtomicU64::new(setpoint.to_bits()),
            variance,
            refresh: RefreshSlot::default(),
        });

        let (output, worker) = if read_only {
            jitter.point.write(setpoint);
            (None, None)
        } else {
            let action: AnalogAction = {
                let jitter = Arc::clone(&jitter);
                Arc::new(move |value: f64| jitter.base.store(value.to_bits(), Ordering::SeqCst))
            };
            let output = AnalogOutput::new(action, false);
            output.set_name(&format!("{}_control", name));

            let shared = Arc::clone(&jitter);
            let worker = match Worker::spawn(format!("{}-jitter", name), move |signal| {
                shared.run(signal)
            }) {
                Ok(worker) => Some(worker),
                Err(e) => {
                    error!("{} will not vary: {}", name, e);
                    None
                }
            };
            (Some(output), worker)
        };

        info!(
            "Created setpoint controller {} ({} ± {}{})",
            name,
            setpoint,
            variance,
            if read_only { ", read-only" } else { "" }
        );
        Arc::new(Self {
            name: name.to_string(),
            jitter,
            output,
            worker: Mutex::new(worker),
        })
    }

    pub fn point(&self) -> &Arc<AnalogPoint> {
        &self.jitter.point
    }

    /// The output that sets the base value, absent when read-only
    pub fn output(&self) -> Option<&Arc<AnalogOutput>> {
        self.output.as_ref()
    }

    pub fn is_read_only(&self) -> bool {
        self.output.is_none()
    }

    pub fn base(&self) -> f64 {
        self.jitter.base()
    }

    pub fn variance(&self) -> f64 {
        self.jitter.variance
    }

    /// Replace the base value; the point follows on the next sample
    pub fn set(&self, value: f64) {
        debug!("{} base set to {}", self.name, value);
        self.jitter.base.store(value.to_bits(), Ordering::SeqCst);
    }

    /// Last value written to the point
    pub fn value(&self) -> f64 {
        self.jitter.point.read()
    }
}

impl Device for SetpointController {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self) -> DeviceView {
        let model = if self.is_read_only() {
            "Read-Only"
        } else {
            "Analog Output (Double64)"
        };
        DeviceView {
            name: self.name.clone(),
            model: model.to_string(),
            value: DeviceValue::Analog(self.value()),
        }
    }

    fn register_refresh(&self, signal: RedrawSignal) {
        self.jitter.refresh.set(signal);
    }
}

impl Drop for SetpointController {
    fn drop(&mut self) {
        if let Some(mut worker) = self.worker.get_mut().take() {
            worker.stop();
        }
    }
}
