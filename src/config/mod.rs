// src/config/mod.rs
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const PRESENCE_THRESHOLD_IR: i32 = 100_000;
pub const IR_JUMP_THRESHOLD: i64 = 1000;
pub const MIN_VALID_BPM: f32 = 20.0;
pub const MAX_VALID_BPM: f32 = 255.0;
pub const AVG_SAMPLING_WINDOW_SIZE: usize = 4;
pub const MEASUREMENT_QUEUE_SIZE: usize = 64;
pub const MAX_SAMPLES_PER_CALL: usize = 4;
pub const MAX_BATCH_SIZE: usize = 32;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read or write config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(serde_yaml::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub sensor: SensorConfig,
    pub detector: DetectorConfig,
    pub server: ServerConfig,
    pub simulation: SimulationConfig,
    pub recording: RecordingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    pub presence_threshold_ir: i32,
    pub ir_jump_threshold: i64,
    pub min_valid_bpm: f32,
    pub max_valid_bpm: f32,
    pub averaging_window_size: usize,
    pub queue_capacity: usize,
    pub max_samples_per_call: usize,
    pub enable_debug_logging: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            presence_threshold_ir: PRESENCE_THRESHOLD_IR,
            ir_jump_threshold: IR_JUMP_THRESHOLD,
            min_valid_bpm: MIN_VALID_BPM,
            max_valid_bpm: MAX_VALID_BPM,
            averaging_window_size: AVG_SAMPLING_WINDOW_SIZE,
            queue_capacity: MEASUREMENT_QUEUE_SIZE,
            max_samples_per_call: MAX_SAMPLES_PER_CALL,
            enable_debug_logging: false,
        }
    }
}

/// Register settings handed to the sample source when it is brought up.
/// Values follow the MAX3010x datasheet.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SensorConfig {
    pub sda_pin: u8,
    pub scl_pin: u8,
    pub led_brightness: u8,
    pub sample_average: u8,
    pub led_mode: u8, // 2 = red + IR
    pub sample_rate: u32,
    pub pulse_width: u32,
    pub adc_range: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            sda_pin: 21,
            scl_pin: 22,
            led_brightness: 0x1F,
            sample_average: 4,
            led_mode: 2,
            sample_rate: 400,
            pulse_width: 411,
            adc_range: 4096,
        }
    }
}

impl SensorConfig {
    /// Rate at which averaged samples leave the sensor FIFO.
    pub fn effective_sample_rate_hz(&self) -> f64 {
        self.sample_rate as f64 / self.sample_average.max(1) as f64
    }

    pub fn sample_period_ms(&self) -> f64 {
        1000.0 / self.effective_sample_rate_hz()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    pub f_low: f64,
    pub f_high: f64,
    pub min_amplitude: f64,
    pub max_amplitude: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            f_low: 0.5,
            f_high: 4.0,
            min_amplitude: 20.0,
            max_amplitude: 1000.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub max_batch_size: usize,
    pub poll_interval_ms: u64,
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8080,
            max_batch_size: MAX_BATCH_SIZE,
            poll_interval_ms: 10,
            static_dir: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub heart_rate_bpm: f64,
    pub variability_bpm: f64,
    pub baseline_ir: i32,
    pub amplitude: f64,
    pub noise: i32,
    pub finger_off_every_s: Option<f64>,
    pub finger_off_duration_s: Option<f64>,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            heart_rate_bpm: 72.0,
            variability_bpm: 3.0,
            baseline_ir: 150_000,
            amplitude: 200.0,
            noise: 20,
            finger_off_every_s: None,
            finger_off_duration_s: None,
            seed: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RecordingConfig {
    pub enabled: bool,
    pub directory: String,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: "logs".to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let monitor = &self.monitor;
        if monitor.averaging_window_size == 0 {
            return Err(ConfigError::Invalid(
                "monitor.averaging_window_size must be at least 1".to_string(),
            ));
        }
        if monitor.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "monitor.queue_capacity must be at least 1".to_string(),
            ));
        }
        if monitor.max_samples_per_call == 0 {
            return Err(ConfigError::Invalid(
                "monitor.max_samples_per_call must be at least 1".to_string(),
            ));
        }
        if monitor.min_valid_bpm > monitor.max_valid_bpm {
            return Err(ConfigError::Invalid(format!(
                "monitor.min_valid_bpm ({}) exceeds monitor.max_valid_bpm ({})",
                monitor.min_valid_bpm, monitor.max_valid_bpm
            )));
        }
        if self.sensor.sample_rate == 0 {
            return Err(ConfigError::Invalid(
                "sensor.sample_rate must be positive".to_string(),
            ));
        }
        if self.detector.f_low <= 0.0 || self.detector.f_low >= self.detector.f_high {
            return Err(ConfigError::Invalid(format!(
                "detector band {}..{} Hz is empty",
                self.detector.f_low, self.detector.f_high
            )));
        }
        if self.detector.f_high >= self.sensor.effective_sample_rate_hz() / 2.0 {
            return Err(ConfigError::Invalid(format!(
                "detector.f_high ({} Hz) must be below the Nyquist rate of {} Hz",
                self.detector.f_high,
                self.sensor.effective_sample_rate_hz() / 2.0
            )));
        }
        if self.server.max_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "server.max_batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let config_str = fs::read_to_string(path)?;

    let config: Config = serde_yaml::from_str(&config_str).map_err(ConfigError::Parse)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(config: &Config, path: P) -> Result<(), ConfigError> {
    let yaml = serde_yaml::to_string(config).map_err(ConfigError::Serialize)?;

    fs::write(path, yaml)?;
    Ok(())
}
