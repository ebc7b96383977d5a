//! Microbenchmarks for memory-subsystem effects: stride-dependent cache
//! misses, false sharing between neighbouring atomics, and coherence traffic
//! on a single contended cell.

pub mod config;
pub mod engine;
pub mod error;
pub mod experiment;
pub mod layout;
pub mod stats;
pub mod stride;
pub mod trace;
pub mod workload;

pub use engine::{Trial, run_trial};
pub use error::{Error, Result};
pub use experiment::Experiment;
pub use layout::{CACHE_LINE_SIZE, CachePadded, CellRegion, Layout, MemoryCell};
pub use stats::{SampleSet, Summary, repeat_and_summarize};
pub use workload::{MemoryOrdering, Operation, Target, Workload};
