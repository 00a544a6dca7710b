pub mod console;
pub mod csv_source;
pub mod process_file;
pub mod server;
pub mod simulated;

pub use csv_source::CsvSampleSource;
pub use simulated::SimulatedSensor;
