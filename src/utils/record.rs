use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use crate::processing::measurement::Measurement;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Appends measurements to a CSV file, one row each, with the same column
/// names the HTTP endpoint uses.
pub struct MeasurementRecorder {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows: usize,
}

impl MeasurementRecorder {
    /// Creates `<directory>/measurements_<local time>.csv`, making the
    /// directory if needed.
    pub fn create_in<P: AsRef<Path>>(directory: P) -> Result<Self, RecordError> {
        let directory = directory.as_ref();
        if !directory.exists() {
            fs::create_dir_all(directory)?;
        }
        let filename = format!("measurements_{}.csv", Local::now().format("%Y%m%d_%H%M%S"));
        Self::create(directory.join(filename))
    }

    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, RecordError> {
        let path = path.as_ref().to_path_buf();
        let writer = csv::Writer::from_path(&path)?;
        Ok(Self {
            writer,
            path,
            rows: 0,
        })
    }

    pub fn record(&mut self, measurement: &Measurement) -> Result<(), RecordError> {
        self.writer.serialize(measurement)?;
        self.rows += 1;
        Ok(())
    }

    pub fn record_all(&mut self, measurements: &[Measurement]) -> Result<(), RecordError> {
        for measurement in measurements {
            self.record(measurement)?;
        }
        self.flush()
    }

    pub fn flush(&mut self) -> Result<(), RecordError> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}
