//! Device that travels between its end positions over time
//!
//! A slow device models a motor-operated switch: a trip or close command
//! starts a motion that moves a continuous position in `[0, 1]` one step at a
//! time. The double-bit point reports the collapsed state:
//!
//! | Position | State |
//! |----------|-------|
//! | `< 0.1` | off (position snaps to 0) |
//! | `> 0.9` | on (position snaps to 1) |
//! | otherwise | intermediate |
//!
//! Only one motion runs at a time. A new command cancels and joins the
//! previous motion before starting its own.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dnp_protocol::DoubleBit;
use parking_lot::Mutex;
use tracing::{debug, error, info};

use super::{Device, DeviceValue, DeviceView, Polarity, RedrawSignal, RefreshSlot};
use crate::control::{BinaryAction, TwoSignalControl, TwoSignalControlModel};
use crate::point::{DoubleBitPoint, Point};
use crate::worker::{StopSignal, Worker};

/// Position change per motion step
pub const MOTION_STEP: f64 = 0.1;

/// Number of steps in a full end-to-end travel
const STEPS_PER_TRAVEL: u32 = 10;

const OFF_THRESHOLD: f64 = 0.1;
const ON_THRESHOLD: f64 = 0.9;

fn state_at(position: f64) -> DoubleBit {
    if position < OFF_THRESHOLD {
        DoubleBit::DeterminedOff
    } else if position > ON_THRESHOLD {
        DoubleBit::DeterminedOn
    } else {
        DoubleBit::IntermediateState
    }
}

/// State shared between the device and its motion worker
#[derive(Debug)]
struct Travel {
    point: Arc<DoubleBitPoint>,
    /// IEEE-754 bits of the position
    position: AtomicU64,
    step_interval: Duration,
    refresh: RefreshSlot,
}

impl Travel {
    fn position(&self) -> f64 {
        f64::from_bits(self.position.load(Ordering::SeqCst))
    }

    /// Store a position and write the point if the collapsed state changed
    fn set_position(&self, position: f64) {
        let state = state_at(position);
        let snapped = match state {
            DoubleBit::DeterminedOff => 0.0,
            DoubleBit::DeterminedOn => 1.0,
            _ => position,
        };
        self.position.store(snapped.to_bits(), Ordering::SeqCst);

        if self.point.read() != state {
            self.point.write(state);
        }
    }

    fn run(&self, target: f64, signal: &StopSignal) {
        let delta = if target > self.position() {
            MOTION_STEP
        } else {
            -MOTION_STEP
        };

        while signal.is_running() {
            let next = (self.position() + delta).clamp(0.0, 1.0);
            self.set_position(next);
            self.refresh.request();

            let position = self.position();
            let arrived = if delta > 0.0 {
                position >= target
            } else {
                position <= target
            };
            if arrived || !signal.wait(self.step_interval) {
                break;
            }
        }
    }
}

/// A double-bit point whose trip and close take `runtime` to complete
pub struct SlowDevice {
    name: String,
    runtime: Duration,
    polarity: Polarity,
    travel: Arc<Travel>,
    motion: Mutex<Option<Worker>>,
    control: TwoSignalControl,
}

impl SlowDevice {
    pub fn new(name: &str, runtime_ms: u64, model: TwoSignalControlModel) -> Arc<Self> {
        Self::with_polarity(name, runtime_ms, model, Polarity::Normal)
    }

    pub fn with_polarity(
        name: &str,
        runtime_ms: u64,
        model: TwoSignalControlModel,
        polarity: Polarity,
    ) -> Arc<Self> {
        let point = DoubleBitPoint::new();
        point.meta().set_name(&format!("{}_status", name));

        let runtime = Duration::from_millis(runtime_ms);
        let travel = Arc::new(Travel {
            point,
            position: AtomicU64::new(0.0f64.to_bits()),
            step_interval: runtime / STEPS_PER_TRAVEL,
            refresh: RefreshSlot::default(),
        });

        let device = Arc::new_cyclic(|this: &Weak<Self>| {
            let trip: BinaryAction = {
                let this = this.clone();
                Arc::new(move || {
                    if let Some(device) = this.upgrade() {
                        device.trip();
                    }
                })
            };
            let close: BinaryAction = {
                let this = this.clone();
                Arc::new(move || {
                    if let Some(device) = this.upgrade() {
                        device.close();
                    }
                })
            };
            let control = TwoSignalControl::new(model, trip, close);
            control.set_point_names(name);

            Self {
                name: name.to_string(),
                runtime,
                polarity,
                travel,
                motion: Mutex::new(None),
                control,
            }
        });

        info!(
            "Created slow device {} ({}, {} ms)",
            name, model, runtime_ms
        );
        device
    }

    pub fn point(&self) -> &Arc<DoubleBitPoint> {
        &self.travel.point
    }

    pub fn control(&self) -> &TwoSignalControl {
        &self.control
    }

    pub fn runtime(&self) -> Duration {
        self.runtime
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Continuous position in `[0, 1]`
    pub fn position(&self) -> f64 {
        self.travel.position()
    }

    /// Collapse `position` to a state and write the point if it changed
    pub fn set_position(&self, position: f64) {
        self.travel.set_position(position);
    }

    /// Whether a motion is in progress
    pub fn is_moving(&self) -> bool {
        self.motion
            .lock()
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    pub fn trip(&self) {
        self.move_to(self.polarity.trip_position());
    }

    pub fn close(&self) {
        self.move_to(self.polarity.close_position());
    }

    fn move_to(&self, target: f64) {
        let mut motion = self.motion.lock();

        let moving = motion.as_ref().is_some_and(|worker| !worker.is_finished());
        if !moving && self.travel.point.read() == state_at(target) {
            debug!("{} already at {}", self.name, state_at(target));
            return;
        }

        if let Some(mut previous) = motion.take() {
            previous.stop();
        }

        debug!(
            "{} moving from {:.1} to {:.1}",
            self.name,
            self.travel.position(),
            target
        );
        let travel = Arc::clone(&self.travel);
        match Worker::spawn(format!("{}-motion", self.name), move |signal| {
            travel.run(target, signal)
        }) {
            Ok(worker) => *motion = Some(worker),
            Err(e) => error!("{} cannot move: {}", self.name, e),
        }
    }
}

impl Device for SlowDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self) -> DeviceView {
        DeviceView {
            name: self.name.clone(),
            model: self.control.model().label().to_string(),
            value: DeviceValue::DoubleBit(self.travel.point.read()),
        }
    }

    fn register_refresh(&self, signal: RedrawSignal) {
        self.travel.refresh.set(signal);
    }
}

impl Drop for SlowDevice {
    fn drop(&mut self) {
        if let Some(mut worker) = self.motion.get_mut().take() {
            worker.stop();
        }
    }
}
