use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::f64::consts::PI;

use crate::config::{SensorConfig, SimulationConfig};
use crate::processing::clock::Clock;
use crate::processing::source::{SampleSource, SourceError};

// -----------------------------------------------------------------------------
// SETUP FOR THE SIMULATED SIGNAL
// -----------------------------------------------------------------------------

/// Depth of the MAX3010x sample FIFO.
pub const FIFO_DEPTH: usize = 32;

/// IR counts with nothing on the sensor: ambient light only.
const AMBIENT_IR: f64 = 5_000.0;
/// Slow drift of the simulated heart rate around its mean.
const VARIABILITY_FREQ: f64 = 0.1;
/// Relative amplitude of the second harmonic (dicrotic shoulder).
const HARMONIC_RATIO: f64 = 0.2;

/// Software stand-in for a PPG sensor.
///
/// Samples accumulate at the effective sample rate as the clock advances,
/// in a FIFO that drops its oldest sample on overflow like the real part.
pub struct SimulatedSensor<C> {
    clock: C,
    config: SimulationConfig,
    rng: StdRng,
    fifo: VecDeque<i32>,
    sample_period_ms: f64,
    next_sample_ms: f64,
    phase: f64,
    overflowed: usize,
}

impl<C: Clock> SimulatedSensor<C> {
    pub fn new(clock: C, config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        SimulatedSensor {
            clock,
            config,
            rng,
            fifo: VecDeque::with_capacity(FIFO_DEPTH),
            sample_period_ms: SensorConfig::default().sample_period_ms(),
            next_sample_ms: 0.0,
            phase: 0.0,
            overflowed: 0,
        }
    }

    /// Samples lost to FIFO overflow since start.
    pub fn overflowed(&self) -> usize {
        self.overflowed
    }

    fn finger_present_at(&self, t_seconds: f64) -> bool {
        match (self.config.finger_off_every_s, self.config.finger_off_duration_s) {
            (Some(every), Some(duration)) if every > 0.0 => {
                let position = t_seconds % every;
                position < every - duration
            }
            _ => true,
        }
    }

    fn generate_sample(&mut self, t_ms: f64) -> i32 {
        let t_seconds = t_ms / 1000.0;
        let noise = if self.config.noise > 0 {
            self.rng.gen_range(-self.config.noise..=self.config.noise) as f64
        } else {
            0.0
        };

        if !self.finger_present_at(t_seconds) {
            return (AMBIENT_IR + noise) as i32;
        }

        let bpm = self.config.heart_rate_bpm
            + self.config.variability_bpm * (2.0 * PI * VARIABILITY_FREQ * t_seconds).sin();
        self.phase += 2.0 * PI * (bpm / 60.0) * (self.sample_period_ms / 1000.0);
        self.phase %= 2.0 * PI;

        let pulse = self.phase.sin() + HARMONIC_RATIO * (2.0 * self.phase).sin();
        (self.config.baseline_ir as f64 + self.config.amplitude * pulse + noise) as i32
    }

    fn push_sample(&mut self, sample: i32) {
        if self.fifo.len() == FIFO_DEPTH {
            self.fifo.pop_front();
            self.overflowed += 1;
        }
        self.fifo.push_back(sample);
    }
}

impl<C: Clock> SampleSource for SimulatedSensor<C> {
    fn begin(&mut self, config: &SensorConfig) -> Result<(), SourceError> {
        self.sample_period_ms = config.sample_period_ms();
        self.next_sample_ms = self.clock.now_ms() as f64 + self.sample_period_ms;
        self.fifo.clear();
        Ok(())
    }

    fn check_for_new_data(&mut self) -> usize {
        let now = self.clock.now_ms() as f64;
        let mut added = 0;
        while self.next_sample_ms <= now {
            let sample = self.generate_sample(self.next_sample_ms);
            self.push_sample(sample);
            self.next_sample_ms += self.sample_period_ms;
            added += 1;
        }
        added
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::clock::ManualClock;

    fn quiet_config() -> SimulationConfig {
        SimulationConfig {
            noise: 0,
            variability_bpm: 0.0,
            seed: Some(7),
            ..SimulationConfig::default()
        }
    }

    fn started(clock: &ManualClock, config: SimulationConfig) -> SimulatedSensor<ManualClock> {
        let mut sensor = SimulatedSensor::new(clock.clone(), config);
        sensor.begin(&SensorConfig::default()).unwrap();
        sensor
    }

    #[test]
    fn test_samples_follow_the_clock() {
        let clock = ManualClock::new(0);
        let mut sensor = started(&clock, quiet_config());

        assert_eq!(sensor.check_for_new_data(), 0);
        assert!(!sensor.has_available_sample());

        clock.advance(100);
        assert_eq!(sensor.check_for_new_data(), 10);
        assert!(sensor.has_available_sample());
    }

    #[test]
    fn test_fifo_overflow_drops_oldest() {
        let clock = ManualClock::new(0);
        let mut sensor = started(&clock, quiet_config());

        clock.advance(1000);
        assert_eq!(sensor.check_for_new_data(), 100);
        assert_eq!(sensor.overflowed(), 100 - FIFO_DEPTH);

        let mut drained = 0;
        while sensor.has_available_sample() {
            sensor.advance();
            drained += 1;
        }
        assert_eq!(drained, FIFO_DEPTH);
    }

    #[test]
    fn test_signal_sits_above_presence_threshold() {
        let clock = ManualClock::new(0);
        let mut sensor = started(&clock, quiet_config());

        clock.advance(300);
        sensor.check_for_new_data();
        while sensor.has_available_sample() {
            let sample = sensor.read_sample();
            assert!(sample > 140_000 && sample < 160_000, "sample {}", sample);
            sensor.advance();
        }
    }

    #[test]
    fn test_finger_off_interval_reads_ambient() {
        let clock = ManualClock::new(0);
        let config = SimulationConfig {
            finger_off_every_s: Some(2.0),
            finger_off_duration_s: Some(1.0),
            ..quiet_config()
        };
        let mut sensor = started(&clock, config);

        clock.set(1500);
        sensor.check_for_new_data();
        sensor.clear_backlog();
        assert!(!sensor.has_available_sample());

        clock.set(1600);
        sensor.check_for_new_data();
        assert!(sensor.read_sample() < 10_000);
    }
}
