pub mod config;
pub mod constants;
pub mod devices;
pub mod logging;
pub mod tracking;
pub mod workers;
