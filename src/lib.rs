pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod probes;
pub mod report;
pub mod runner;
pub mod session;
pub mod suite;

// Re-export commonly used types
pub use error::{ProbeError, Result};
