use std::fmt;
use std::hint::black_box;
use std::sync::atomic::Ordering;

use crate::error::{Error, Result};
use crate::layout::MemoryCell;

/// What a worker does to its cell on every iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Non-atomic baseline: one snapshot of the cell, then plain reads of a
    /// local copy. No coherence traffic after the first load.
    Read,
    /// `fetch_add(1)`.
    Increment,
    /// Atomic load, result discarded through `black_box`.
    Load,
    /// Atomic store of `1`.
    Store,
    /// Atomic load, summed into the worker's observation.
    LoadAccumulate,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Increment => "increment",
            Operation::Load => "load",
            Operation::Store => "store",
            Operation::LoadAccumulate => "load_accumulate",
        }
    }

    /// Runs `iterations` of this operation against `cell` and returns the
    /// worker's observation (the accumulated loaded values; zero for
    /// operations that do not accumulate).
    pub fn apply(self, cell: &MemoryCell, ordering: MemoryOrdering, iterations: u64) -> u64 {
        match self {
            Operation::Read => {
                let local = cell.load(Ordering::Relaxed);
                let mut accum = 0u64;
                for _ in 0..iterations {
                    accum = accum.wrapping_add(black_box(local));
                }
                black_box(accum)
            }
            Operation::Increment => {
                for _ in 0..iterations {
                    cell.fetch_add(1, ordering.rmw());
                }
                0
            }
            Operation::Load => {
                for _ in 0..iterations {
                    black_box(cell.load(ordering.load()));
                }
                0
            }
            Operation::Store => {
                for _ in 0..iterations {
                    cell.store(black_box(1), ordering.store());
                }
                0
            }
            Operation::LoadAccumulate => {
                let mut accum = 0u64;
                for _ in 0..iterations {
                    accum = accum.wrapping_add(cell.load(ordering.load()));
                }
                black_box(accum)
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordering strength for atomic operations. Each level maps to the valid
/// `Ordering` for loads, stores and read-modify-writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemoryOrdering {
    #[default]
    Relaxed,
    AcquireRelease,
    SequentiallyConsistent,
}

impl MemoryOrdering {
    pub fn load(self) -> Ordering {
        match self {
            MemoryOrdering::Relaxed => Ordering::Relaxed,
            MemoryOrdering::AcquireRelease => Ordering::Acquire,
            MemoryOrdering::SequentiallyConsistent => Ordering::SeqCst,
        }
    }

    pub fn store(self) -> Ordering {
        match self {
            MemoryOrdering::Relaxed => Ordering::Relaxed,
            MemoryOrdering::AcquireRelease => Ordering::Release,
            MemoryOrdering::SequentiallyConsistent => Ordering::SeqCst,
        }
    }

    pub fn rmw(self) -> Ordering {
        match self {
            MemoryOrdering::Relaxed => Ordering::Relaxed,
            MemoryOrdering::AcquireRelease => Ordering::AcqRel,
            MemoryOrdering::SequentiallyConsistent => Ordering::SeqCst,
        }
    }
}

/// Which cell a worker touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Worker `i` owns cell `i` (false-sharing experiments).
    PerThread,
    /// Every worker touches cell `0` (coherence experiments).
    Shared,
}

impl Target {
    pub fn cell_index(self, worker: usize) -> usize {
        match self {
            Target::PerThread => worker,
            Target::Shared => 0,
        }
    }

    /// Cells a region must hold for `threads` workers.
    pub fn cells_needed(self, threads: usize) -> usize {
        match self {
            Target::PerThread => threads,
            Target::Shared => 1,
        }
    }
}

/// Parameters of one trial. Carries no state between trials, so cloning it
/// (or building it again with the same arguments) yields comparable runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    roles: Vec<Operation>,
    ordering: MemoryOrdering,
    iterations: u64,
    target: Target,
}

impl Workload {
    /// Every worker runs `operation` with relaxed ordering.
    pub fn new(operation: Operation, iterations: u64, target: Target) -> Result<Workload> {
        Workload::with_roles(vec![operation], iterations, target)
    }

    /// Worker `i` runs `roles[i % roles.len()]`.
    pub fn with_roles(roles: Vec<Operation>, iterations: u64, target: Target) -> Result<Workload> {
        if iterations == 0 {
            return Err(Error::ZeroIterations);
        }
        if roles.is_empty() {
            return Err(Error::NoRoles);
        }
        Ok(Workload {
            roles,
            ordering: MemoryOrdering::Relaxed,
            iterations,
            target,
        })
    }

    pub fn ordering(mut self, ordering: MemoryOrdering) -> Workload {
        self.ordering = ordering;
        self
    }

    pub fn operation_for(&self, worker: usize) -> Operation {
        self.roles[worker % self.roles.len()]
    }

    pub fn roles(&self) -> &[Operation] {
        &self.roles
    }

    pub fn memory_ordering(&self) -> MemoryOrdering {
        self.ordering
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn target(&self) -> Target {
        self.target
    }
}
