// Adaptive character drill engine. The binary in main.rs is a thin
// line-based driver over this library; benchmarks and integration tests
// import from here as well.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod session;
pub mod store;
