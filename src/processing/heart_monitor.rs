use super::clock::Clock;
use super::detectors::BeatDetector;
use super::measurement::Measurement;
use super::pipeline::MeasurementPipeline;
use super::query::MeasurementQuery;
use super::source::{SampleSource, SourceError};
use crate::config::{Config, ConfigError};

use log::{debug, error, info};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Sensor not detected. Check power and wiring: {0}")]
    SensorNotDetected(#[source] SourceError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Outcome of one `update_sensor_values` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    /// Samples were still waiting after the cap and were thrown away.
    pub backlog_cleared: bool,
}

/// A sample source, a beat detector and a clock wired to one pipeline.
pub struct HeartMonitor<S, D, C> {
    source: S,
    detector: D,
    clock: C,
    pipeline: MeasurementPipeline,
    max_samples_per_call: usize,
}

impl<S: SampleSource, D: BeatDetector, C: Clock> HeartMonitor<S, D, C> {
    /// Brings the sensor up. A sensor that does not answer is fatal: the
    /// error is returned and no monitor is built.
    pub fn initialize(
        mut source: S,
        detector: D,
        clock: C,
        config: &Config,
    ) -> Result<Self, MonitorError> {
        config.validate()?;

        if let Err(e) = source.begin(&config.sensor) {
            error!("Sensor not detected. Check power and wiring. ({})", e);
            return Err(MonitorError::SensorNotDetected(e));
        }

        info!(
            "Heart monitor ready: {} Hz effective sample rate, presence above {} IR counts",
            config.sensor.effective_sample_rate_hz(),
            config.monitor.presence_threshold_ir
        );

        Ok(HeartMonitor {
            source,
            detector,
            clock,
            pipeline: MeasurementPipeline::new(&config.monitor),
            max_samples_per_call: config.monitor.max_samples_per_call,
        })
    }

    /// Processes up to `max_samples_per_call` waiting samples. Anything left
    /// in the source after that is discarded rather than carried over.
    pub fn update_sensor_values(&mut self) -> BatchReport {
        self.source.check_for_new_data();
        if !self.source.has_available_sample() {
            return BatchReport::default();
        }

        let mut processed = 0;
        while self.source.has_available_sample() && processed < self.max_samples_per_call {
            let sample = self.source.read_sample();
            self.source.advance();
            let now_ms = self.clock.now_ms();
            self.pipeline
                .process_sample(sample, now_ms, &mut self.detector);
            processed += 1;
        }

        let backlog_cleared = self.source.has_available_sample();
        if backlog_cleared {
            debug!("Discarding sensor backlog after {} samples", processed);
            self.source.clear_backlog();
        }

        BatchReport {
            processed,
            backlog_cleared,
        }
    }

    pub fn pipeline(&self) -> &MeasurementPipeline {
        &self.pipeline
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: SampleSource, D: BeatDetector, C: Clock> MeasurementQuery for HeartMonitor<S, D, C> {
    fn latest_snapshot(&self) -> Measurement {
        self.pipeline.latest_snapshot()
    }

    fn drain_measurements(&mut self, max_count: usize) -> Vec<Measurement> {
        self.pipeline.drain_measurements(max_count)
    }
}
