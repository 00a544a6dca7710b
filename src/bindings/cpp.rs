use crate::config::{DetectorConfig, MonitorConfig};
use crate::processing::detectors::{BeatDetector, PeakBeatDetector};
use crate::processing::measurement::Measurement;
use crate::processing::pipeline::MeasurementPipeline;
use crate::processing::query::MeasurementQuery;

use std::os::raw::c_void;
use std::slice;

/// Beat primitive supplied by the firmware: gets the raw IR value, returns
/// true on a beat edge.
pub type BeatCallback = extern "C" fn(ir_value: i32) -> bool;

struct CallbackDetector {
    callback: BeatCallback,
}

impl BeatDetector for CallbackDetector {
    fn detect_beat(&mut self, ir_value: i32) -> bool {
        (self.callback)(ir_value)
    }
}

pub struct HeartMonitorFFI {
    pipeline: MeasurementPipeline,
    detector: Box<dyn BeatDetector>,
}

impl HeartMonitorFFI {
    fn new(detector: Box<dyn BeatDetector>) -> Self {
        Self {
            pipeline: MeasurementPipeline::new(&MonitorConfig::default()),
            detector,
        }
    }
}

fn into_handle(monitor: HeartMonitorFFI) -> *mut c_void {
    Box::into_raw(Box::new(monitor)) as *mut c_void
}

unsafe fn from_handle<'a>(monitor_ptr: *mut c_void) -> Option<&'a mut HeartMonitorFFI> {
    (monitor_ptr as *mut HeartMonitorFFI).as_mut()
}

#[no_mangle]
pub extern "C" fn create_heart_monitor(callback: BeatCallback) -> *mut c_void {
    into_handle(HeartMonitorFFI::new(Box::new(CallbackDetector { callback })))
}

/// Same pipeline, with the band-pass peak detector in place of a callback.
#[no_mangle]
pub extern "C" fn create_heart_monitor_with_peak_detector(fs: f64) -> *mut c_void {
    let detector = PeakBeatDetector::new(DetectorConfig::default(), fs);
    into_handle(HeartMonitorFFI::new(Box::new(detector)))
}

#[no_mangle]
pub extern "C" fn delete_heart_monitor(monitor_ptr: *mut c_void) {
    if !monitor_ptr.is_null() {
        unsafe {
            drop(Box::from_raw(monitor_ptr as *mut HeartMonitorFFI));
        }
    }
}

/// Feeds one sample taken at `now_ms`. Returns whether a finger is on the
/// sensor.
#[no_mangle]
pub extern "C" fn heart_monitor_process_sample(
    monitor_ptr: *mut c_void,
    ir_value: i32,
    now_ms: u64,
) -> bool {
    match unsafe { from_handle(monitor_ptr) } {
        Some(monitor) => {
            monitor
                .pipeline
                .process_sample(ir_value, now_ms, monitor.detector.as_mut());
            monitor.pipeline.session().finger_present
        }
        None => false,
    }
}

#[no_mangle]
pub extern "C" fn heart_monitor_latest_snapshot(
    monitor_ptr: *mut c_void,
    out: *mut Measurement,
) -> bool {
    let monitor = match unsafe { from_handle(monitor_ptr) } {
        Some(monitor) => monitor,
        None => return false,
    };
    if out.is_null() {
        return false;
    }
    unsafe {
        *out = monitor.pipeline.latest_snapshot();
    }
    true
}

/// Moves up to `max_count` queued measurements into `dest`, oldest first,
/// and returns how many were written.
#[no_mangle]
pub extern "C" fn heart_monitor_drain(
    monitor_ptr: *mut c_void,
    dest: *mut Measurement,
    max_count: usize,
) -> usize {
    let monitor = match unsafe { from_handle(monitor_ptr) } {
        Some(monitor) => monitor,
        None => return 0,
    };
    if dest.is_null() || max_count == 0 {
        return 0;
    }
    let dest = unsafe { slice::from_raw_parts_mut(dest, max_count) };
    monitor.pipeline.drain_into(dest)
}
