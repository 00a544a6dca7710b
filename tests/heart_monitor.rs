use std::collections::VecDeque;

use ppg_heart_monitor::config::{Config, SensorConfig, SimulationConfig};
use ppg_heart_monitor::local::SimulatedSensor;
use ppg_heart_monitor::processing::{
    BeatDetector, HeartMonitor, ManualClock, MeasurementQuery, MonitorError, PeakBeatDetector,
    SampleSource, SourceError,
};

/// Hands out one scripted batch of samples per `check_for_new_data`.
struct ScriptedSource {
    batches: VecDeque<Vec<i32>>,
    fifo: VecDeque<i32>,
    detected: bool,
}

impl ScriptedSource {
    fn new(batches: Vec<Vec<i32>>) -> Self {
        Self {
            batches: batches.into(),
            fifo: VecDeque::new(),
            detected: true,
        }
    }

    fn absent() -> Self {
        Self {
            detected: false,
            ..Self::new(Vec::new())
        }
    }
}

impl SampleSource for ScriptedSource {
    fn begin(&mut self, _config: &SensorConfig) -> Result<(), SourceError> {
        if self.detected {
            Ok(())
        } else {
            Err(SourceError::NotDetected("no reply on I2C".to_string()))
        }
    }

    fn check_for_new_data(&mut self) -> usize {
        match self.batches.pop_front() {
            Some(batch) => {
                let added = batch.len();
                self.fifo.extend(batch);
                added
            }
            None => 0,
        }
    }

    fn has_available_sample(&self) -> bool {
        !self.fifo.is_empty()
    }

    fn read_sample(&self) -> i32 {
        self.fifo.front().copied().unwrap_or(0)
    }

    fn advance(&mut self) {
        self.fifo.pop_front();
    }

    fn clear_backlog(&mut self) {
        self.fifo.clear();
    }
}

/// Reports a beat on every sample carrying this IR value.
const BEAT_IR: i32 = 150_500;

struct MarkerDetector;

impl BeatDetector for MarkerDetector {
    fn detect_beat(&mut self, ir_value: i32) -> bool {
        ir_value == BEAT_IR
    }
}

fn scripted_monitor(
    batches: Vec<Vec<i32>>,
    clock: &ManualClock,
) -> HeartMonitor<ScriptedSource, MarkerDetector, ManualClock> {
    HeartMonitor::initialize(
        ScriptedSource::new(batches),
        MarkerDetector,
        clock.clone(),
        &Config::default(),
    )
    .unwrap()
}

#[test]
fn test_update_processes_at_most_four_and_drops_backlog() {
    let clock = ManualClock::new(100);
    let mut monitor = scripted_monitor(vec![(0..10).map(|i| 150_000 + i).collect()], &clock);

    let report = monitor.update_sensor_values();
    assert_eq!(report.processed, 4);
    assert!(report.backlog_cleared);
    assert!(!monitor.source().has_available_sample());

    let drained = monitor.drain_measurements(64);
    let values: Vec<i32> = drained.iter().map(|m| m.ir_value).collect();
    assert_eq!(values, vec![150_000, 150_001, 150_002, 150_003]);

    let report = monitor.update_sensor_values();
    assert_eq!(report.processed, 0);
    assert!(!report.backlog_cleared);
}

#[test]
fn test_samples_in_one_update_share_a_timestamp_per_clock_read() {
    let clock = ManualClock::new(500);
    let mut monitor = scripted_monitor(vec![vec![150_000, 150_001, 150_002]], &clock);

    let report = monitor.update_sensor_values();
    assert_eq!(report.processed, 3);
    assert!(!report.backlog_cleared);
    assert!(monitor
        .drain_measurements(64)
        .iter()
        .all(|m| m.timestamp == 500));
}

#[test]
fn test_missing_sensor_fails_initialization() {
    let result = HeartMonitor::initialize(
        ScriptedSource::absent(),
        MarkerDetector,
        ManualClock::new(0),
        &Config::default(),
    );
    assert!(matches!(
        result,
        Err(MonitorError::SensorNotDetected(SourceError::NotDetected(_)))
    ));
}

#[test]
fn test_invalid_config_fails_initialization() {
    let mut config = Config::default();
    config.monitor.min_valid_bpm = 300.0;
    let result = HeartMonitor::initialize(
        ScriptedSource::new(Vec::new()),
        MarkerDetector,
        ManualClock::new(0),
        &config,
    );
    assert!(matches!(result, Err(MonitorError::Config(_))));
}

/// Runs one update per entry of `times`, each expected to take one sample.
fn feed(
    monitor: &mut HeartMonitor<ScriptedSource, MarkerDetector, ManualClock>,
    clock: &ManualClock,
    times: &[u64],
) {
    for &t in times {
        clock.set(t);
        assert_eq!(monitor.update_sensor_values().processed, 1);
    }
}

#[test]
fn test_beats_750_ms_apart_give_80_bpm() {
    let clock = ManualClock::new(0);
    let times = [0, 750];
    let mut monitor = scripted_monitor(vec![vec![BEAT_IR], vec![BEAT_IR]], &clock);
    feed(&mut monitor, &clock, &times);

    let drained = monitor.drain_measurements(64);
    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].beats_per_minute, 0.0);
    assert_eq!(drained[1].timestamp, 750);
    assert_eq!(drained[1].beats_per_minute, 80.0);
    assert_eq!(drained[1].average_bpm, 20.0);
}

#[test]
fn test_contact_loss_resets_average_but_keeps_beat_reference() {
    let clock = ManualClock::new(0);
    let batches = vec![
        vec![BEAT_IR],
        vec![BEAT_IR],
        vec![50_000],
        vec![BEAT_IR],
        vec![BEAT_IR],
    ];
    let times = [0, 750, 1000, 1500, 2250];
    let mut monitor = scripted_monitor(batches, &clock);
    feed(&mut monitor, &clock, &times);

    let drained = monitor.drain_measurements(64);
    let bpm: Vec<f32> = drained.iter().map(|m| m.beats_per_minute).collect();
    let avg: Vec<f32> = drained.iter().map(|m| m.average_bpm).collect();
    // The beat at 1500 ms is timed against the one at 750 ms, into a
    // window that was zeroed while the finger was off.
    assert_eq!(bpm, vec![0.0, 80.0, 0.0, 80.0, 80.0]);
    assert_eq!(avg, vec![0.0, 20.0, 0.0, 20.0, 40.0]);
    assert_eq!(monitor.pipeline().averager().window(), &[80.0, 80.0, 0.0, 0.0]);
}

#[test]
fn test_next_batch_falls_back_to_latest_snapshot() {
    let clock = ManualClock::new(40);
    let mut monitor = scripted_monitor(vec![vec![150_000]], &clock);
    monitor.update_sensor_values();

    assert_eq!(monitor.next_batch(32).measurements.len(), 1);
    let batch = monitor.next_batch(32);
    assert_eq!(batch.measurements.len(), 1);
    assert_eq!(batch.measurements[0].timestamp, 40);
    assert_eq!(batch.measurements[0].ir_value, 150_000);
    assert!(monitor.pipeline().queue().is_empty());
}

#[test]
fn test_simulated_sensor_settles_on_its_heart_rate() {
    let clock = ManualClock::new(0);
    let config = Config {
        simulation: SimulationConfig {
            heart_rate_bpm: 75.0,
            variability_bpm: 0.0,
            noise: 0,
            seed: Some(42),
            ..SimulationConfig::default()
        },
        ..Config::default()
    };
    let sensor = SimulatedSensor::new(clock.clone(), config.simulation.clone());
    let detector = PeakBeatDetector::new(
        config.detector.clone(),
        config.sensor.effective_sample_rate_hz(),
    );
    let mut monitor = HeartMonitor::initialize(sensor, detector, clock.clone(), &config).unwrap();

    for _ in 0..2000 {
        clock.advance(10);
        let report = monitor.update_sensor_values();
        assert_eq!(report.processed, 1);
        monitor.drain_measurements(64);
    }

    let snapshot = monitor.latest_snapshot();
    assert_eq!(snapshot.timestamp, 20_000);
    assert!(
        (snapshot.average_bpm - 75.0).abs() < 5.0,
        "average {}",
        snapshot.average_bpm
    );
    assert!(monitor.pipeline().session().finger_present);
}
