use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("stride size must be a positive number, got {0}")]
    InvalidStride(i64),

    #[error("stride size {0:?} is not a number")]
    UnparsableStride(String),

    #[error(
        "no stride sizes provided; either pass them as arguments or set the STRIDE_SIZES environment variable"
    )]
    NoStrides,

    #[error("thread count must be at least 1")]
    ZeroThreads,

    #[error("iteration count must be at least 1")]
    ZeroIterations,

    #[error("pass count must be at least 1")]
    ZeroPasses,

    #[error("buffer length must be at least 1 byte")]
    EmptyBuffer,

    #[error("stride {stride} times {passes} passes does not fit in memory")]
    BufferTooLarge { stride: usize, passes: usize },

    #[error("workload has no operations to assign to workers")]
    NoRoles,

    #[error("workload needs {needed} cells but the region only holds {available}")]
    NotEnoughCells { needed: usize, available: usize },

    #[error("repetition count must be at least 1")]
    ZeroRepetitions,

    #[error("sample set holds {actual} of {expected} samples")]
    IncompleteSampleSet { expected: usize, actual: usize },

    #[error("sample set already holds all {expected} samples")]
    SampleSetFull { expected: usize },

    #[error("failed to start worker thread: {0}")]
    Spawn(#[from] io::Error),

    #[error("a worker thread panicked during the trial")]
    WorkerPanicked,
}
