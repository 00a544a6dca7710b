use std::collections::VecDeque;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::processing::source::{SampleSource, SourceError};

// -----------------------------------------------------------------------------
// SETUP FOR IMPORTING SAMPLES FROM CSV
// -----------------------------------------------------------------------------

/// Reads IR samples from the first column of a CSV file with a header row.
pub fn read_samples_from_csv<R: Read>(reader: R) -> Result<Vec<i32>, SourceError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut samples = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| SourceError::Parse(e.to_string()))?;
        let field = record
            .get(0)
            .ok_or_else(|| SourceError::Parse(format!("row {} is empty", line + 1)))?;
        let sample = field.trim().parse::<i32>().map_err(|e| {
            SourceError::Parse(format!("row {}: {:?} is not an IR value ({})", line + 1, field, e))
        })?;
        samples.push(sample);
    }

    Ok(samples)
}

/// Replays recorded IR samples, `samples_per_check` of them each time the
/// pipeline asks for new data.
pub struct CsvSampleSource {
    pending: VecDeque<i32>,
    fifo: VecDeque<i32>,
    samples_per_check: usize,
}

impl CsvSampleSource {
    pub fn new(samples: Vec<i32>, samples_per_check: usize) -> Self {
        Self {
            pending: samples.into(),
            fifo: VecDeque::new(),
            samples_per_check: samples_per_check.max(1),
        }
    }

    pub fn open<P: AsRef<Path>>(path: P, samples_per_check: usize) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::new(read_samples_from_csv(file)?, samples_per_check))
    }

    /// Every recorded sample has been handed out or discarded.
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty() && self.fifo.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.pending.len() + self.fifo.len()
    }
}

impl SampleSource for CsvSampleSource {
    fn begin(&mut self, _config: &crate::config::SensorConfig) -> Result<(), SourceError> {
        if self.pending.is_empty() {
            return Err(SourceError::NotDetected(
                "recording holds no samples".to_string(),
            ));
        }
        Ok(())
    }

    fn check_for_new_data(&mut self) -> usize {
        let take = self.samples_per_check.min(self.pending.len());
        self.fifo.extend(self.pending.drain(..take));
        take
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
