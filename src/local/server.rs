use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use thiserror::Error;
use tokio::sync::Mutex;
use warp::filters::BoxedFilter;
use warp::{Filter, Reply};

use super::simulated::SimulatedSensor;
use crate::config::Config;
use crate::processing::clock::{Clock, MonotonicClock};
use crate::processing::detectors::{BeatDetector, PeakBeatDetector};
use crate::processing::heart_monitor::{HeartMonitor, MonitorError};
use crate::processing::measurement::Measurement;
use crate::processing::query::MeasurementQuery;
use crate::processing::source::SampleSource;
use crate::utils::record::{MeasurementRecorder, RecordError};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error("Invalid listen address {0}")]
    Address(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not record measurements: {0}")]
    Record(#[from] RecordError),
}

// -----------------------------------------------------------------------------
// ROUTES
// -----------------------------------------------------------------------------

/// `GET /api/measurements`, plus the dashboard files when a static
/// directory is configured.
pub fn routes<M>(
    monitor: Arc<Mutex<M>>,
    max_batch_size: usize,
    static_dir: Option<PathBuf>,
) -> BoxedFilter<(Box<dyn Reply>,)>
where
    M: MeasurementQuery + Send + 'static,
{
    let measurements = warp::path!("api" / "measurements")
        .and(warp::get())
        .and(with_monitor(monitor))
        .and(warp::any().map(move || max_batch_size))
        .and_then(handle_get_measurements::<M>)
        .map(boxed_reply);

    match static_dir {
        Some(dir) => measurements
            .or(warp::get().and(warp::fs::dir(dir)).map(boxed_reply))
            .unify()
            .boxed(),
        None => measurements.boxed(),
    }
}

fn with_monitor<M: Send>(
    monitor: Arc<Mutex<M>>,
) -> impl Filter<Extract = (Arc<Mutex<M>>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&monitor))
}

fn boxed_reply<R: Reply + 'static>(reply: R) -> Box<dyn Reply> {
    Box::new(reply)
}

async fn handle_get_measurements<M: MeasurementQuery>(
    monitor: Arc<Mutex<M>>,
    max_batch_size: usize,
) -> Result<impl Reply, Infallible> {
    let batch = monitor.lock().await.next_batch(max_batch_size);
    Ok(warp::reply::json(&batch))
}

// -----------------------------------------------------------------------------
// SENSOR POLLING
// -----------------------------------------------------------------------------

/// Calls `update_sensor_values` every `interval_ms` for as long as the
/// server runs. Each poll's measurements are copied to the recorder, if
/// any, without taking them off the queue.
pub async fn poll_sensor<S, D, C>(
    monitor: Arc<Mutex<HeartMonitor<S, D, C>>>,
    interval_ms: u64,
    mut recorder: Option<MeasurementRecorder>,
) where
    S: SampleSource,
    D: BeatDetector,
    C: Clock,
{
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    loop {
        ticker.tick().await;

        let recent: Vec<Measurement> = {
            let mut monitor = monitor.lock().await;
            let report = monitor.update_sensor_values();
            match recorder {
                Some(_) if report.processed > 0 => {
                    let queue = monitor.pipeline().queue();
                    queue
                        .iter()
                        .skip(queue.len().saturating_sub(report.processed))
                        .collect()
                }
                _ => Vec::new(),
            }
        };

        if let Some(active) = recorder.as_mut() {
            if let Err(e) = active.record_all(&recent) {
                warn!("Stopping measurement recording: {}", e);
                recorder = None;
            }
        }
    }
}

// -----------------------------------------------------------------------------
// RUN CODE
// -----------------------------------------------------------------------------

/// Serves the simulated sensor until the process is stopped.
pub fn run(config: Config) -> Result<(), ServerError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))
}

pub async fn serve(config: Config) -> Result<(), ServerError> {
    let address = format!("{}:{}", config.server.address, config.server.port);
    let address: SocketAddr = address
        .parse()
        .map_err(|_| ServerError::Address(address.clone()))?;

    let clock = MonotonicClock::new();
    let sensor = SimulatedSensor::new(clock, config.simulation.clone());
    let detector = PeakBeatDetector::new(
        config.detector.clone(),
        config.sensor.effective_sample_rate_hz(),
    );
    let monitor = HeartMonitor::initialize(sensor, detector, clock, &config)?;
    let monitor = Arc::new(Mutex::new(monitor));

    let recorder = if config.recording.enabled {
        let recorder = MeasurementRecorder::create_in(&config.recording.directory)?;
        info!("Recording measurements to {}", recorder.path().display());
        Some(recorder)
    } else {
        None
    };

    tokio::spawn(poll_sensor(
        Arc::clone(&monitor),
        config.server.poll_interval_ms,
        recorder,
    ));

    let static_dir = config.server.static_dir.as_ref().map(PathBuf::from);
    let routes = routes(monitor, config.server.max_batch_size, static_dir);

    info!("Serving measurements on http://{}/api/measurements", address);
    warp::serve(routes).run(address).await;

    Ok(())
}
