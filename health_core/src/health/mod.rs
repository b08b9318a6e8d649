pub mod checks;
pub mod orchestrator;
pub mod probe;
pub mod timer;
pub mod verdict;


pub use checks::{CacheProbe, DatabaseProbe, DependencyProbe};
pub use orchestrator::{Aggregation, Orchestrator, RunMode, RunOutcome, VerdictCollector};
pub use probe::Probe;
pub use timer::{measure, Stopwatch};
pub use verdict::Verdict;
