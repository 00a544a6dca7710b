use crate::config::SensorConfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Sensor not detected: {0}")]
    NotDetected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse sample data: {0}")]
    Parse(String),
}

/// A sensor FIFO seen from the pipeline.
///
/// `check_for_new_data` pulls whatever the device has produced into the
/// source's buffer; the remaining calls walk that buffer one sample at a
/// time.
pub trait SampleSource: Send {
    /// Brings the device up with the given register settings.
    fn begin(&mut self, _config: &SensorConfig) -> Result<(), SourceError> {
        Ok(())
    }

    /// Loads new data if any is ready. Returns the number of samples added.
    fn check_for_new_data(&mut self) -> usize;

    fn has_available_sample(&self) -> bool;

    /// Current sample. Only meaningful while `has_available_sample` holds.
    fn read_sample(&self) -> i32;

    /// Moves past the current sample.
    fn advance(&mut self);

    /// Drops every buffered sample.
    fn clear_backlog(&mut self);
}
