use serde::{Deserialize, Serialize, Serializer};

/// One processed sample: the raw IR reading and the BPM state that held
/// once the sample had been through the pipeline.
///
/// Serialises with the field names the web front end reads
/// (`timestamp`, `irValue`, `beatsPerMinute`, `averageBPM`), BPM fields
/// rounded to two decimal places.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Monotonic milliseconds since boot.
    pub timestamp: u64,
    #[serde(rename = "irValue")]
    pub ir_value: i32,
    #[serde(rename = "beatsPerMinute", serialize_with = "two_decimal_places")]
    pub beats_per_minute: f32,
    #[serde(rename = "averageBPM", serialize_with = "two_decimal_places")]
    pub average_bpm: f32,
}

impl Measurement {
    pub fn new(timestamp: u64, ir_value: i32, beats_per_minute: f32, average_bpm: f32) -> Self {
        Self {
            timestamp,
            ir_value,
            beats_per_minute,
            average_bpm,
        }
    }
}

/// Body of `GET /api/measurements`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasurementBatch {
    pub measurements: Vec<Measurement>,
}

pub fn round_two_places(value: f32) -> f64 {
    (value as f64 * 100.0).round() / 100.0
}

fn two_decimal_places<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_two_places(*value))
}
