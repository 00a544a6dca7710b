pub mod bandpass;
pub mod plausibility;
pub mod presence;

pub use plausibility::{PlausibilityFilter, Rejection};
pub use presence::PresenceFilter;

/// A stateful one-sample-in, one-sample-out signal filter.
pub trait FilterInstance: Send {
    fn filter_sample(&mut self, sample: f64) -> f64;

    /// Forget all history, as if no sample had been seen.
    fn reset(&mut self);
}
