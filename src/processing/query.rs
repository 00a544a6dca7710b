use super::measurement::{Measurement, MeasurementBatch};

/// Read side of the pipeline, as seen by a request handler.
pub trait MeasurementQuery {
    /// Current pipeline state. Never mutates the queue.
    fn latest_snapshot(&self) -> Measurement;

    /// Removes up to `max_count` queued measurements, oldest first.
    fn drain_measurements(&mut self, max_count: usize) -> Vec<Measurement>;

    /// Whatever is queued (up to `max_count`), or the latest snapshot when
    /// the queue is empty, so a consumer always has something to report.
    fn next_batch(&mut self, max_count: usize) -> MeasurementBatch {
        let mut measurements = self.drain_measurements(max_count);
        if measurements.is_empty() {
            measurements.push(self.latest_snapshot());
        }
        MeasurementBatch { measurements }
    }
}
