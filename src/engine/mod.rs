use std::thread::available_parallelism;
use std::time::{Duration, Instant};

use crossbeam::thread;
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::layout::CellRegion;
use crate::workload::Workload;

/// One finished trial: its wall-clock duration and what each worker observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    elapsed: Duration,
    observations: Vec<u64>,
}

impl Trial {
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Per-worker observation, indexed by worker number.
    pub fn observations(&self) -> &[u64] {
        &self.observations
    }
}

/// Number of hardware threads, or 1 if the platform will not say.
pub fn available_cores() -> usize {
    available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Runs `workload` on `threads` freshly spawned OS threads against `cells`.
///
/// Time runs from just before the first spawn to just after the last join.
/// Each worker borrows only the cell its target rule assigns to it. If any
/// worker fails to start, the workers already running are joined and the
/// trial is discarded.
pub fn run_trial(workload: &Workload, threads: usize, cells: &CellRegion) -> Result<Trial> {
    if threads == 0 {
        return Err(Error::ZeroThreads);
    }
    let target = workload.target();
    let needed = target.cells_needed(threads);
    if cells.len() < needed {
        return Err(Error::NotEnoughCells {
            needed,
            available: cells.len(),
        });
    }
    let cores = available_cores();
    if threads > cores {
        warn!("{threads} workers on {cores} cores, results will be dominated by oversubscription");
    }

    let ordering = workload.memory_ordering();
    let iterations = workload.iterations();

    let start = Instant::now();
    let joined = thread::scope(|s| -> Result<Vec<u64>> {
        let mut handles = Vec::with_capacity(threads);
        for worker in 0..threads {
            let cell = cells.cell(target.cell_index(worker));
            let operation = workload.operation_for(worker);
            let handle = s
                .builder()
                .spawn(move |_| operation.apply(cell, ordering, iterations))?;
            handles.push(handle);
        }
        handles
            .into_iter()
            .map(|handle| handle.join().map_err(|_| Error::WorkerPanicked))
            .collect()
    });
    let elapsed = start.elapsed();

    let observations = joined.map_err(|_| Error::WorkerPanicked)??;
    debug!(
        "trial: {threads} threads, {} layout, {:?}",
        cells.layout(),
        elapsed
    );
    Ok(Trial {
        elapsed,
        observations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use crate::workload::{MemoryOrdering, Operation, Target};

    #[test]
    fn each_worker_increments_only_its_own_cell() {
        for layout in Layout::ALL {
            let threads = 4;
            let workload = Workload::new(Operation::Increment, 10_000, Target::PerThread).unwrap();
            let cells = CellRegion::new(threads, layout);
            let trial = run_trial(&workload, threads, &cells).unwrap();
            assert_eq!(cells.values(), vec![10_000; threads]);
            assert_eq!(trial.observations().len(), threads);
        }
    }

    #[test]
    fn shared_readers_see_initial_value() {
        let workload = Workload::new(Operation::LoadAccumulate, 50_000, Target::Shared).unwrap();
        let cells = CellRegion::new(1, Layout::Padded);
        let trial = run_trial(&workload, 3, &cells).unwrap();
        assert_eq!(trial.observations(), &[0, 0, 0]);
        assert_eq!(cells.values(), vec![0]);
    }

    #[test]
    fn contended_loader_only_sees_stored_values() {
        let iterations = 100_000;
        let workload = Workload::with_roles(
            vec![Operation::Store, Operation::LoadAccumulate],
            iterations,
            Target::Shared,
        )
        .unwrap();
        let cells = CellRegion::new(1, Layout::Padded);
        let trial = run_trial(&workload, 2, &cells).unwrap();
        assert_eq!(trial.observations()[0], 0);
        assert!(trial.observations()[1] <= iterations);
        assert_eq!(cells.values(), vec![1]);
    }

    #[test]
    fn increments_under_every_ordering_are_exact() {
        for ordering in [
            MemoryOrdering::Relaxed,
            MemoryOrdering::AcquireRelease,
            MemoryOrdering::SequentiallyConsistent,
        ] {
            let workload = Workload::new(Operation::Increment, 1_000, Target::Shared)
                .unwrap()
                .ordering(ordering);
            let cells = CellRegion::new(1, Layout::Packed);
            run_trial(&workload, 4, &cells).unwrap();
            assert_eq!(cells.values(), vec![4_000]);
        }
    }

    #[test]
    fn rejects_bad_thread_and_cell_counts() {
        let workload = Workload::new(Operation::Increment, 10, Target::PerThread).unwrap();
        let cells = CellRegion::new(2, Layout::Padded);
        assert!(matches!(
            run_trial(&workload, 0, &cells),
            Err(Error::ZeroThreads)
        ));
        assert!(matches!(
            run_trial(&workload, 3, &cells),
            Err(Error::NotEnoughCells {
                needed: 3,
                available: 2
            })
        ));
        assert_eq!(cells.values(), vec![0, 0]);
    }
}
