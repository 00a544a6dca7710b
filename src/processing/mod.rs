pub mod averager;
pub mod clock;
pub mod detectors;
pub mod filters;
pub mod heart_monitor;
pub mod measurement;
pub mod pipeline;
pub mod query;
pub mod queue;
pub mod ring_buffer;
pub mod source;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use detectors::{BeatDetector, PeakBeatDetector};
pub use heart_monitor::{BatchReport, HeartMonitor, MonitorError};
pub use measurement::{Measurement, MeasurementBatch};
pub use pipeline::MeasurementPipeline;
pub use query::MeasurementQuery;
pub use source::{SampleSource, SourceError};
