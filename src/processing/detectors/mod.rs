pub mod peak;

pub use peak::PeakBeatDetector;

// DETECTOR COMPONENT ----------------------------------------------------------

/// Reports heartbeat edges in a stream of raw IR samples.
///
/// Implementations keep whatever state they need across calls; the pipeline
/// only feeds them samples taken while a finger is present.
pub trait BeatDetector: Send {
    fn detect_beat(&mut self, ir_value: i32) -> bool;
}

impl<D: BeatDetector + ?Sized> BeatDetector for Box<D> {
    fn detect_beat(&mut self, ir_value: i32) -> bool {
        (**self).detect_beat(ir_value)
    }
}
