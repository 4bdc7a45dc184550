use std::sync::Arc;

use crate::note::Pitch;

/// The synthesis surface a track routes note events into.
///
/// Implementations live in the audio engine, not here; the core only ever
/// dispatches into them. `time` is the transport position in seconds at the
/// moment of dispatch.
pub trait Instrument: Send + Sync {
    fn trigger_attack(&self, pitch: Pitch, time: f64);
    fn trigger_release(&self, pitch: Pitch, time: f64);
}

/// Shared handle to an instrument. Tracks hold these opaquely.
pub type InstrumentHandle = Arc<dyn Instrument>;

/// Instrument that produces no sound. Default routing for new tracks until
/// the engine assigns a real one.
#[derive(Debug, Default)]
pub struct NullInstrument;

impl Instrument for NullInstrument {
    fn trigger_attack(&self, _pitch: Pitch, _time: f64) {}
    fn trigger_release(&self, _pitch: Pitch, _time: f64) {}
}
