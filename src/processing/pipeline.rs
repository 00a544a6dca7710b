use super::averager::BpmAverager;
use super::detectors::BeatDetector;
use super::filters::{PlausibilityFilter, PresenceFilter};
use super::measurement::Measurement;
use super::query::MeasurementQuery;
use super::queue::MeasurementQueue;
use crate::config::MonitorConfig;

use log::{debug, info};

// -----------------------------------------------------------------------------
// MEASUREMENT PIPELINE
// -----------------------------------------------------------------------------

/// Turns raw IR samples into measurements.
///
/// Owns every piece of per-sensor state: the session scalars, the rolling
/// BPM window and the measurement queue. Nothing here blocks or fails; odd
/// input shows up as zeroed or unchanged BPM fields in the output.
pub struct MeasurementPipeline {
    presence: PresenceFilter,
    plausibility: PlausibilityFilter,
    averager: BpmAverager,
    session: SessionState,
    queue: MeasurementQueue,
}

impl MeasurementPipeline {
    pub fn new(config: &MonitorConfig) -> Self {
        MeasurementPipeline {
            presence: PresenceFilter::new(config.presence_threshold_ir),
            plausibility: PlausibilityFilter::new(
                config.min_valid_bpm,
                config.max_valid_bpm,
                config.ir_jump_threshold,
            ),
            averager: BpmAverager::new(config.averaging_window_size),
            session: SessionState::new(),
            queue: MeasurementQueue::new(config.queue_capacity),
        }
    }

    /// Runs one sample through presence detection, beat timing and
    /// plausibility filtering, enqueues the resulting measurement and
    /// returns a copy of it.
    pub fn process_sample<D: BeatDetector + ?Sized>(
        &mut self,
        sample: i32,
        now_ms: u64,
        detector: &mut D,
    ) -> Measurement {
        self.session.ir_value = sample;
        self.session.timestamp_ms = now_ms;

        if !self.presence.is_present(sample) {
            if self.session.finger_present {
                info!("Finger removed (IR={}), resetting BPM data", sample);
            }
            self.session.finger_present = false;
            self.reset_bpm_data();
            return self.enqueue_measurement();
        }

        if !self.session.finger_present {
            info!("Finger detected (IR={})", sample);
            self.session.finger_present = true;
        }

        if detector.detect_beat(sample) {
            self.handle_beat(now_ms);
        }

        let measurement = self.enqueue_measurement();
        self.session.last_ir_value = Some(sample);
        measurement
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn averager(&self) -> &BpmAverager {
        &self.averager
    }

    pub fn queue(&self) -> &MeasurementQueue {
        &self.queue
    }

    pub fn drain_into(&mut self, dest: &mut [Measurement]) -> usize {
        self.queue.drain_into(dest)
    }

    fn handle_beat(&mut self, now_ms: u64) {
        if let Some(last_beat) = self.session.last_beat_ms {
            let delta_ms = now_ms.saturating_sub(last_beat);
            let bpm = 60_000.0 / delta_ms as f32;

            match self
                .plausibility
                .check(bpm, self.session.ir_value, self.session.last_ir_value)
            {
                Ok(()) => {
                    self.session.beats_per_minute = bpm;
                    self.session.average_bpm = self.averager.update(bpm);
                    debug!(
                        "Beat after {} ms: bpm={:.1}, avg={:.1}",
                        delta_ms, bpm, self.session.average_bpm
                    );
                }
                Err(rejection) => {
                    debug!("Dropped beat after {} ms: {:?}", delta_ms, rejection);
                }
            }
        }

        self.session.last_beat_ms = Some(now_ms);
    }

    fn reset_bpm_data(&mut self) {
        self.session.beats_per_minute = 0.0;
        self.session.average_bpm = 0.0;
        // last_beat_ms is kept across a dropout.
        self.averager.reset();
    }

    fn enqueue_measurement(&mut self) -> Measurement {
        let measurement = self.session.snapshot();
        self.queue.enqueue(measurement);
        measurement
    }
}

impl MeasurementQuery for MeasurementPipeline {
    fn latest_snapshot(&self) -> Measurement {
        self.session.snapshot()
    }

    fn drain_measurements(&mut self, max_count: usize) -> Vec<Measurement> {
        self.queue.drain(max_count)
    }
}

// -----------------------------------------------------------------------------
// SESSION STATE
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub ir_value: i32,
    /// IR value of the last sample that made it past the presence check.
    pub last_ir_value: Option<i32>,
    pub last_beat_ms: Option<u64>,
    pub beats_per_minute: f32,
    pub average_bpm: f32,
    pub timestamp_ms: u64,
    pub finger_present: bool,
}

impl SessionState {
    fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Measurement {
        Measurement::new(
            self.timestamp_ms,
            self.ir_value,
            self.beats_per_minute,
            self.average_bpm,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reports a beat on the samples whose index is listed.
    struct ScriptedDetector {
        beats_at: Vec<usize>,
        calls: usize,
    }

    impl ScriptedDetector {
        fn new(beats_at: &[usize]) -> Self {
            Self {
                beats_at: beats_at.to_vec(),
                calls: 0,
            }
        }
    }

    impl BeatDetector for ScriptedDetector {
        fn detect_beat(&mut self, _ir_value: i32) -> bool {
            let beat = self.beats_at.contains(&self.calls);
            self.calls += 1;
            beat
        }
    }

    fn pipeline() -> MeasurementPipeline {
        MeasurementPipeline::new(&MonitorConfig::default())
    }

    #[test]
    fn test_absent_sample_is_zeroed() {
        let mut pipeline = pipeline();
        let mut detector = ScriptedDetector::new(&[0]);

        let measurement = pipeline.process_sample(50_000, 10, &mut detector);
        assert_eq!(measurement, Measurement::new(10, 50_000, 0.0, 0.0));
        // No beat detection while absent.
        assert_eq!(detector.calls, 0);
        assert_eq!(pipeline.queue().len(), 1);
    }

    #[test]
    fn test_beats_at_zero_and_750_ms() {
        let mut pipeline = pipeline();
        let mut detector = ScriptedDetector::new(&[0, 1]);

        let first = pipeline.process_sample(150_000, 0, &mut detector);
        assert_eq!(first.beats_per_minute, 0.0);
        assert_eq!(pipeline.session().last_beat_ms, Some(0));

        let second = pipeline.process_sample(150_000, 750, &mut detector);
        assert_eq!(second.beats_per_minute, 80.0);
        assert_eq!(second.average_bpm, 20.0);
        assert_eq!(pipeline.averager().window(), &[80.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_out_of_range_bpm_leaves_state_unchanged() {
        let mut pipeline = pipeline();
        let mut detector = ScriptedDetector::new(&[0, 1, 2, 3]);

        pipeline.process_sample(150_000, 0, &mut detector);
        pipeline.process_sample(150_000, 1000, &mut detector); // 60 bpm
        // 100 ms => 600 bpm, too fast
        let fast = pipeline.process_sample(150_000, 1100, &mut detector);
        assert_eq!(fast.beats_per_minute, 60.0);
        assert_eq!(fast.average_bpm, 15.0);

        // Timing continues from the rejected edge: 4 s => 15 bpm, too slow
        let slow = pipeline.process_sample(150_000, 5100, &mut detector);
        assert_eq!(slow.beats_per_minute, 60.0);
        assert_eq!(slow.average_bpm, 15.0);
        assert_eq!(pipeline.session().last_beat_ms, Some(5100));
    }

    #[test]
    fn test_ir_jump_invalidates_interval() {
        let mut pipeline = pipeline();
        let mut detector = ScriptedDetector::new(&[0, 1]);

        pipeline.process_sample(150_000, 0, &mut detector);
        let jumped = pipeline.process_sample(152_000, 750, &mut detector);
        assert_eq!(jumped.beats_per_minute, 0.0);
        assert_eq!(jumped.average_bpm, 0.0);
        assert_eq!(pipeline.session().last_beat_ms, Some(750));
        assert_eq!(pipeline.session().last_ir_value, Some(152_000));
    }

    #[test]
    fn test_presence_loss_resets_bpm() {
        let mut pipeline = pipeline();
        let mut detector = ScriptedDetector::new(&[0, 1]);

        pipeline.process_sample(150_000, 0, &mut detector);
        pipeline.process_sample(150_000, 800, &mut detector);
        assert_eq!(pipeline.latest_snapshot().beats_per_minute, 75.0);

        let lost = pipeline.process_sample(40_000, 900, &mut detector);
        assert_eq!(lost.beats_per_minute, 0.0);
        assert_eq!(lost.average_bpm, 0.0);
        assert!(pipeline.averager().window().iter().all(|&slot| slot == 0.0));
        assert_eq!(pipeline.session().last_beat_ms, Some(800));
        // The jump reference is the last present reading.
        assert_eq!(pipeline.session().last_ir_value, Some(150_000));
    }

    #[test]
    fn test_beat_after_dropout_is_timed_from_previous_edge() {
        let mut pipeline = pipeline();
        let mut detector = ScriptedDetector::new(&[0, 1, 2]);

        pipeline.process_sample(150_000, 0, &mut detector);
        pipeline.process_sample(150_000, 750, &mut detector);
        pipeline.process_sample(50_000, 1000, &mut detector);
        let resumed = pipeline.process_sample(150_000, 1500, &mut detector);

        assert_eq!(resumed.beats_per_minute, 80.0);
        assert_eq!(resumed.average_bpm, 20.0);
        assert_eq!(pipeline.averager().window(), &[80.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_same_millisecond_beats_are_rejected() {
        let mut pipeline = pipeline();
        let mut detector = ScriptedDetector::new(&[0, 1]);

        pipeline.process_sample(150_000, 500, &mut detector);
        let measurement = pipeline.process_sample(150_000, 500, &mut detector);
        assert_eq!(measurement.beats_per_minute, 0.0);
    }

    #[test]
    fn test_bpm_carries_over_between_beats() {
        let mut pipeline = pipeline();
        let mut detector = ScriptedDetector::new(&[0, 1]);

        pipeline.process_sample(150_000, 0, &mut detector);
        pipeline.process_sample(150_000, 750, &mut detector);
        let quiet = pipeline.process_sample(150_010, 760, &mut detector);
        assert_eq!(quiet, Measurement::new(760, 150_010, 80.0, 20.0));
    }

    #[test]
    fn test_snapshot_does_not_touch_queue() {
        let mut pipeline = pipeline();
        let mut detector = ScriptedDetector::new(&[]);

        pipeline.process_sample(150_000, 5, &mut detector);
        let snapshot = pipeline.latest_snapshot();
        assert_eq!(snapshot, Measurement::new(5, 150_000, 0.0, 0.0));
        assert_eq!(pipeline.queue().len(), 1);

        assert_eq!(pipeline.drain_measurements(10), vec![snapshot]);
        assert_eq!(pipeline.latest_snapshot(), snapshot);
    }
}
