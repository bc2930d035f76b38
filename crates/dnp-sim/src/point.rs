//! Measurement points
//!
//! A point is a named, indexable container for one live value. Values are
//! stored in atomics (or swapped as whole snapshots for composite kinds), so
//! device workers can write while the registry and display layers read
//! without locking.
//!
//! Once the registry assigns an index and attaches an [`Outstation`], every
//! `write` also emits a timestamped update carrying the ONLINE flag. Points
//! without an index, or without a live outstation, only store the value.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use arc_swap::ArcSwap;
use dnp_protocol::{
    Analog, AnalogConfig, Binary, BinaryConfig, Counter, CounterConfig, DnpTime, DoubleBit,
    DoubleBitBinary, DoubleBitBinaryConfig, EventBinaryVariation, EventCounterVariation,
    EventDoubleBinaryVariation, Flags, Measurement, OctetString, OctetStringConfig, Outstation,
    PointClass, StaticBinaryVariation, StaticCounterVariation, StaticDoubleBinaryVariation,
    TimeAndInterval, TimeAndIntervalConfig, UpdateBuilder,
};
use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::error::SimError;

/// Characters replaced with `_` in point names
const INVALID_NAME_CHARS: [char; 3] = [' ', '.', ','];

/// Replace spaces, periods and commas with underscores
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if INVALID_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Identity shared by points and addressable outputs
///
/// Holds the sanitized name, the registry index (assigned at most once) and a
/// weak reference to the outstation that receives updates.
#[derive(Default)]
pub struct PointMeta {
    name: RwLock<String>,
    index: OnceLock<u16>,
    outstation: RwLock<Option<Weak<dyn Outstation>>>,
}

impl PointMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name, sanitizing it first
    pub fn set_name(&self, name: &str) {
        *self.name.write() = sanitize_name(name);
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    /// Assign the registry index
    ///
    /// Fails if an index was already assigned; the original index is kept.
    pub fn assign_index(&self, index: u16) -> Result<(), SimError> {
        self.index
            .set(index)
            .map_err(|requested| SimError::IndexAlreadyAssigned {
                name: self.name(),
                existing: self.index.get().copied().unwrap_or(requested),
                requested,
            })
    }

    pub fn index(&self) -> Option<u16> {
        self.index.get().copied()
    }

    /// Attach the outstation that receives this point's updates
    pub fn register_outstation(&self, outstation: &Arc<dyn Outstation>) {
        *self.outstation.write() = Some(Arc::downgrade(outstation));
    }

    /// Whether a live outstation is attached
    pub fn has_outstation(&self) -> bool {
        self.outstation
            .read()
            .as_ref()
            .is_some_and(|os| os.strong_count() > 0)
    }

    /// Report a measurement at this point's index, if indexed and attached
    fn emit(&self, measurement: impl Into<Measurement>) {
        let Some(index) = self.index() else {
            return;
        };
        let Some(outstation) = self.outstation.read().as_ref().and_then(|os| os.upgrade()) else {
            return;
        };

        let measurement = measurement.into();
        trace!(
            "Point {} [{}] -> {}",
            self.name(),
            index,
            measurement.value_display()
        );
        let mut builder = UpdateBuilder::new();
        builder.update(measurement, index);
        outstation.apply(builder.build());
    }
}

impl fmt::Debug for PointMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointMeta")
            .field("name", &self.name())
            .field("index", &self.index())
            .field("attached", &self.has_outstation())
            .finish()
    }
}

/// Common view of every point kind, used for tables and registration
pub trait Point: Send + Sync {
    fn meta(&self) -> &PointMeta;

    /// Object group reported in static responses
    fn static_group(&self) -> u8;

    /// Current value formatted for display
    fn value_display(&self) -> String;

    fn name(&self) -> String {
        self.meta().name()
    }

    fn index(&self) -> Option<u16> {
        self.meta().index()
    }

    fn set_name(&self, name: &str) {
        self.meta().set_name(name);
    }

    fn register_outstation(&self, outstation: &Arc<dyn Outstation>) {
        self.meta().register_outstation(outstation);
    }

    /// Re-write the current value so an attached outstation sees it
    fn republish(&self);
}

fn online_now() -> (Flags, DnpTime) {
    (Flags::ONLINE, DnpTime::now())
}

// ============================================================================
// Binary
// ============================================================================

/// Single-bit binary input (group 1)
#[derive(Debug, Default)]
pub struct BinaryPoint {
    meta: PointMeta,
    value: AtomicBool,
    config: Mutex<BinaryConfig>,
}

impl BinaryPoint {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn read(&self) -> bool {
        self.value.load(Ordering::SeqCst)
    }

    pub fn write(&self, value: bool) {
        self.value.store(value, Ordering::SeqCst);
        let (flags, time) = online_now();
        self.meta.emit(Binary { value, flags, time });
    }

    pub fn config(&self) -> BinaryConfig {
        *self.config.lock()
    }

    pub fn set_class(&self, class: PointClass) {
        self.config.lock().class = class;
    }

    pub fn set_variation(&self, variation: StaticBinaryVariation) {
        self.config.lock().static_variation = variation;
    }

    pub fn set_event_variation(&self, variation: EventBinaryVariation) {
        self.config.lock().event_variation = variation;
    }
}

impl Point for BinaryPoint {
    fn meta(&self) -> &PointMeta {
        &self.meta
    }

    fn static_group(&self) -> u8 {
        1
    }

    fn value_display(&self) -> String {
        let text = if self.read() { "TRUE" } else { "FALSE" };
        text.to_string()
    }

    fn republish(&self) {
        self.write(self.read());
    }
}

// ============================================================================
// Double-bit
// ============================================================================

/// Tri-state double-bit binary input (group 3)
#[derive(Debug)]
pub struct DoubleBitPoint {
    meta: PointMeta,
    value: AtomicU8,
    config: Mutex<DoubleBitBinaryConfig>,
}

impl Default for DoubleBitPoint {
    fn default() -> Self {
        Self {
            meta: PointMeta::default(),
            value: AtomicU8::new(DoubleBit::DeterminedOff.to_type()),
            config: Mutex::new(DoubleBitBinaryConfig::default()),
        }
    }
}

impl DoubleBitPoint {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn read(&self) -> DoubleBit {
        DoubleBit::from_type(self.value.load(Ordering::SeqCst)).unwrap_or(DoubleBit::Indeterminate)
    }

    pub fn write(&self, value: DoubleBit) {
        self.value.store(value.to_type(), Ordering::SeqCst);
        let (flags, time) = online_now();
        self.meta.emit(DoubleBitBinary { value, flags, time });
    }

    pub fn config(&self) -> DoubleBitBinaryConfig {
        *self.config.lock()
    }

    pub fn set_class(&self, class: PointClass) {
        self.config.lock().class = class;
    }

    pub fn set_variation(&self, variation: StaticDoubleBinaryVariation) {
        self.config.lock().static_variation = variation;
    }

    pub fn set_event_variation(&self, variation: EventDoubleBinaryVariation) {
        self.config.lock().event_variation = variation;
    }
}

impl Point for DoubleBitPoint {
    fn meta(&self) -> &PointMeta {
        &self.meta
    }

    fn static_group(&self) -> u8 {
        3
    }

    fn value_display(&self) -> String {
        self.read().human_str().to_string()
    }

    fn republish(&self) {
        self.write(self.read());
    }
}

// ============================================================================
// Analog
// ============================================================================

/// Default value of a freshly created analog point
pub const DEFAULT_ANALOG_VALUE: f64 = 100.0;

/// Floating-point analog input (group 30)
#[derive(Debug)]
pub struct AnalogPoint {
    meta: PointMeta,
    /// IEEE-754 bits of the current value
    value: AtomicU64,
    config: Mutex<AnalogConfig>,
}

impl Default for AnalogPoint {
    fn default() -> Self {
        Self::with_value(DEFAULT_ANALOG_VALUE)
    }
}

impl AnalogPoint {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_value(value: f64) -> Self {
        Self {
            meta: PointMeta::default(),
            value: AtomicU64::new(value.to_bits()),
            config: Mutex::new(AnalogConfig::default()),
        }
    }

    /// Create a point holding `value` without emitting anything
    pub fn with_initial(value: f64) -> Arc<Self> {
        Arc::new(Self::with_value(value))
    }

    pub fn read(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::SeqCst))
    }

    pub fn write(&self, value: f64) {
        self.value.store(value.to_bits(), Ordering::SeqCst);
        let (flags, time) = online_now();
        self.meta.emit(Analog { value, flags, time });
    }

    pub fn config(&self) -> AnalogConfig {
        *self.config.lock()
    }

    pub fn set_class(&self, class: PointClass) {
        self.config.lock().class = class;
    }

    pub fn set_deadband(&self, deadband: f64) {
        self.config.lock().deadband = deadband;
    }
}

impl Point for AnalogPoint {
    fn meta(&self) -> &PointMeta {
        &self.meta
    }

    fn static_group(&self) -> u8 {
        30
    }

    fn value_display(&self) -> String {
        format!("{:.6}", self.read())
    }

    fn republish(&self) {
        self.write(self.read());
    }
}

// ============================================================================
// Counter
// ============================================================================

/// Unsigned 32-bit counter (group 20)
#[derive(Debug, Default)]
pub struct CounterPoint {
    meta: PointMeta,
    value: AtomicU32,
    config: Mutex<CounterConfig>,
}

impl CounterPoint {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn read(&self) -> u32 {
        self.value.load(Ordering::SeqCst)
    }

    pub fn write(&self, value: u32) {
        self.value.store(value, Ordering::SeqCst);
        let (flags, time) = online_now();
        self.meta.emit(Counter { value, flags, time });
    }

    pub fn config(&self) -> CounterConfig {
        *self.config.lock()
    }

    pub fn set_class(&self, class: PointClass) {
        self.config.lock().class = class;
    }

    pub fn set_variation(&self, variation: StaticCounterVariation) {
        self.config.lock().static_variation = variation;
    }

    pub fn set_event_variation(&self, variation: EventCounterVariation) {
        self.config.lock().event_variation = variation;
    }
}

impl Point for CounterPoint {
    fn meta(&self) -> &PointMeta {
        &self.meta
    }

    fn static_group(&self) -> u8 {
        20
    }

    fn value_display(&self) -> String {
        self.read().to_string()
    }

    fn republish(&self) {
        self.write(self.read());
    }
}

// ============================================================================
// Octet string
// ============================================================================

/// Text value reported as an octet string (group 110)
#[derive(Debug)]
pub struct OctetStringPoint {
    meta: PointMeta,
    value: ArcSwap<String>,
    config: Mutex<OctetStringConfig>,
}

impl OctetStringPoint {
    pub fn new(value: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            meta: PointMeta::default(),
            value: ArcSwap::from_pointee(value.into()),
            config: Mutex::new(OctetStringConfig::default()),
        })
    }

    pub fn read(&self) -> String {
        self.value.load().as_ref().clone()
    }

    pub fn write(&self, value: impl Into<String>) {
        let value = Arc::new(value.into());
        self.value.store(Arc::clone(&value));
        self.meta.emit(OctetString {
            value: value.as_bytes().to_vec(),
        });
    }

    pub fn config(&self) -> OctetStringConfig {
        *self.config.lock()
    }

    pub fn set_class(&self, class: PointClass) {
        self.config.lock().class = class;
    }
}

impl Point for OctetStringPoint {
    fn meta(&self) -> &PointMeta {
        &self.meta
    }

    fn static_group(&self) -> u8 {
        110
    }

    fn value_display(&self) -> String {
        self.read()
    }

    fn republish(&self) {
        self.write(self.read());
    }
}

// ============================================================================
// Time and interval
// ============================================================================

/// Time-and-interval value (group 50 variation 4)
#[derive(Debug)]
pub struct TimeAndIntervalPoint {
    meta: PointMeta,
    value: ArcSwap<TimeAndInterval>,
    config: TimeAndIntervalConfig,
}

impl TimeAndIntervalPoint {
    pub fn new(time: DnpTime, interval: u32, units: u8) -> Arc<Self> {
        Arc::new(Self {
            meta: PointMeta::default(),
            value: ArcSwap::from_pointee(TimeAndInterval::new(time, interval, units)),
            config: TimeAndIntervalConfig::default(),
        })
    }

    pub fn read(&self) -> TimeAndInterval {
        **self.value.load()
    }

    pub fn write(&self, value: TimeAndInterval) {
        self.value.store(Arc::new(value));
        self.meta.emit(value);
    }

    pub fn config(&self) -> TimeAndIntervalConfig {
        self.config
    }
}

impl Point for TimeAndIntervalPoint {
    fn meta(&self) -> &PointMeta {
        &self.meta
    }

    fn static_group(&self) -> u8 {
        50
    }

    fn value_display(&self) -> String {
        Measurement::TimeAndInterval(self.read()).value_display()
    }

    fn republish(&self) {
        self.write(self.read());
    }
}
