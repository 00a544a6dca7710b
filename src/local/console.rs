use colored::Colorize;

use crate::processing::measurement::Measurement;

/// Longest bar drawn for the heart rate, in characters.
const MAX_BAR_LEN: usize = 60;

/// One line per measurement: the raw reading, both BPM figures and a bar
/// scaled to the average. Without contact the bar becomes a hint.
pub fn format_measurement(measurement: &Measurement, presence_threshold_ir: i32) -> String {
    let readings = format!(
        "IR={}, BPM={:.2}, Avg BPM={:.2}",
        measurement.ir_value, measurement.beats_per_minute, measurement.average_bpm
    );

    let status = if measurement.ir_value <= presence_threshold_ir {
        "No finger?".yellow()
    } else if measurement.average_bpm > 0.0 {
        // 4 BPM per character keeps resting rates readable
        let bar_len = ((measurement.average_bpm / 4.0) as usize).min(MAX_BAR_LEN);
        "|".repeat(bar_len).red()
    } else {
        "Detecting heartbeat...".white()
    };

    format!("[{:>8} ms] {} {}", measurement.timestamp, readings, status)
}

pub fn print_measurement(measurement: &Measurement, presence_threshold_ir: i32) {
    println!("{}", format_measurement(measurement, presence_threshold_ir));
}
