pub mod executor;
pub mod reporter;
pub mod types;

pub use executor::ProbeExecutor;
pub use reporter::TestReporter;
pub use types::{Failure, ProbeCase, ProbeOutcome, ProbeRecord, Tally};
