use super::BeatDetector;
use crate::config::DetectorConfig;
use crate::processing::filters::bandpass::BandPassFilter;
use crate::processing::filters::FilterInstance;

/// Beat detector for the IR channel of a PPG sensor.
///
/// The raw signal is band-passed around the cardiac band. Between two upward
/// zero crossings of the filtered signal the detector tracks the wave's
/// minimum and maximum; at the next upward crossing it reports a beat if the
/// wave's peak-to-peak amplitude falls inside the configured window. Waves
/// that are too small are noise, waves that are too large are motion.
pub struct PeakBeatDetector {
    config: DetectorConfig,
    filter: BandPassFilter,
    last_sample: f64,
    wave_min: f64,
    wave_max: f64,
    seen_crossing: bool,
}

impl PeakBeatDetector {
    pub fn new(config: DetectorConfig, fs: f64) -> Self {
        let filter = BandPassFilter::new(config.f_low, config.f_high, fs);
        PeakBeatDetector {
            config,
            filter,
            last_sample: 0.0,
            wave_min: 0.0,
            wave_max: 0.0,
            seen_crossing: false,
        }
    }

    pub fn reset(&mut self) {
        self.filter.reset();
        self.last_sample = 0.0;
        self.clear_wave_data();
        self.seen_crossing = false;
    }

    fn clear_wave_data(&mut self) {
        self.wave_min = 0.0;
        self.wave_max = 0.0;
    }

    fn is_upcrossing(&self, current_sample: f64) -> bool {
        self.last_sample < 0.0 && current_sample >= 0.0
    }

    fn amplitude_in_window(&self) -> bool {
        let amplitude = self.wave_max - self.wave_min;
        amplitude >= self.config.min_amplitude && amplitude <= self.config.max_amplitude
    }
}

impl BeatDetector for PeakBeatDetector {
    fn detect_beat(&mut self, ir_value: i32) -> bool {
        let filtered_sample = self.filter.filter_sample(ir_value as f64);

        let mut beat = false;
        if self.is_upcrossing(filtered_sample) {
            // The first crossing only opens a complete wave.
            beat = self.seen_crossing && self.amplitude_in_window();
            self.seen_crossing = true;
            self.clear_wave_data();
        }

        self.wave_min = self.wave_min.min(filtered_sample);
        self.wave_max = self.wave_max.max(filtered_sample);
        self.last_sample = filtered_sample;
        beat
    }
}
