use std::path::Path;

use log::info;
use thiserror::Error;

use super::console::print_measurement;
use super::csv_source::CsvSampleSource;
use crate::config::Config;
use crate::processing::clock::ManualClock;
use crate::processing::detectors::PeakBeatDetector;
use crate::processing::heart_monitor::{HeartMonitor, MonitorError};
use crate::processing::query::MeasurementQuery;
use crate::processing::source::SourceError;
use crate::utils::record::{MeasurementRecorder, RecordError};

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Could not read recording: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error("Could not record measurements: {0}")]
    Record(#[from] RecordError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReplaySummary {
    pub samples_processed: usize,
    pub measurements: usize,
    /// Measurements taken with a finger on the sensor.
    pub contact_measurements: usize,
    pub final_average_bpm: f32,
}

/// Replays a recorded IR signal through the full monitor, printing every
/// measurement it produces.
///
/// Time is simulated: the clock moves one sample period per sample, so
/// timestamps match the rate the recording was taken at.
pub fn run<P: AsRef<Path>>(csv_path: P, config: &Config) -> Result<ReplaySummary, ReplayError> {
    run_with(csv_path, config, true)
}

pub(crate) fn run_with<P: AsRef<Path>>(
    csv_path: P,
    config: &Config,
    print: bool,
) -> Result<ReplaySummary, ReplayError> {
    let csv_path = csv_path.as_ref();
    let source = CsvSampleSource::open(csv_path, 1)?;
    info!(
        "Replaying {} samples from {}",
        source.remaining(),
        csv_path.display()
    );

    let clock = ManualClock::new(0);
    let detector = PeakBeatDetector::new(
        config.detector.clone(),
        config.sensor.effective_sample_rate_hz(),
    );
    let mut monitor = HeartMonitor::initialize(source, detector, clock.clone(), config)?;

    let mut recorder = if config.recording.enabled {
        let recorder = MeasurementRecorder::create_in(&config.recording.directory)?;
        info!("Recording measurements to {}", recorder.path().display());
        Some(recorder)
    } else {
        None
    };

    let period_ms = config.sensor.sample_period_ms();
    let threshold = config.monitor.presence_threshold_ir;
    let mut summary = ReplaySummary::default();
    let mut step: u64 = 0;

    while !monitor.source().is_exhausted() {
        clock.set((step as f64 * period_ms).round() as u64);
        step += 1;

        let report = monitor.update_sensor_values();
        summary.samples_processed += report.processed;

        let drained = monitor.drain_measurements(config.monitor.queue_capacity);
        for measurement in &drained {
            if measurement.ir_value > threshold {
                summary.contact_measurements += 1;
            }
            if print {
                print_measurement(measurement, threshold);
            }
        }
        summary.measurements += drained.len();

        if let Some(recorder) = recorder.as_mut() {
            recorder.record_all(&drained)?;
        }
    }

    summary.final_average_bpm = monitor.pipeline().session().average_bpm;
    info!(
        "Replay finished: {} samples, {} with contact, average {:.2} BPM",
        summary.samples_processed, summary.contact_measurements, summary.final_average_bpm
    );

    Ok(summary)
}
