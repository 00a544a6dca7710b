pub mod config;
pub mod local;
pub mod processing;
pub mod utils;

#[cfg(feature = "cpp")]
pub mod bindings;
