use std::time::Duration;

use log::info;

use crate::engine::{Trial, run_trial};
use crate::error::{Error, Result};
use crate::layout::{CellRegion, Layout};
use crate::stats::{Summary, repeat_and_summarize};
use crate::workload::{Operation, Target, Workload};

pub const DEFAULT_FALSE_SHARING_THREADS: [usize; 4] = [1, 2, 3, 5];
pub const DEFAULT_FALSE_SHARING_ITERATIONS: u64 = 10_000;
pub const DEFAULT_COHERENCE_ITERATIONS: u64 = 100_000;
pub const DEFAULT_REPETITIONS: usize = 25;

/// An immutable snapshot of everything one measured configuration needs.
#[derive(Debug, Clone)]
pub struct Experiment {
    name: String,
    layout: Layout,
    threads: usize,
    workload: Workload,
}

impl Experiment {
    pub fn new(
        name: impl Into<String>,
        layout: Layout,
        threads: usize,
        workload: Workload,
    ) -> Result<Experiment> {
        if threads == 0 {
            return Err(Error::ZeroThreads);
        }
        Ok(Experiment {
            name: name.into(),
            layout,
            threads,
            workload,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn workload(&self) -> &Workload {
        &self.workload
    }

    /// A fresh region sized for this experiment.
    pub fn allocate(&self) -> CellRegion {
        CellRegion::new(
            self.workload.target().cells_needed(self.threads),
            self.layout,
        )
    }

    /// Allocates a new region, runs one trial on it, then drops it, so no
    /// cell value carries into the next trial.
    pub fn run_once(&self) -> Result<Trial> {
        let cells = self.allocate();
        run_trial(&self.workload, self.threads, &cells)
    }

    pub fn summarize(&self, repetitions: usize) -> Result<Summary<Duration>> {
        info!("{}: {repetitions} repetitions", self.name);
        repeat_and_summarize(|| self.run_once().map(|trial| trial.elapsed()), repetitions)
    }
}

/// Every worker increments its own cell; one experiment per layout and
/// thread count.
pub fn false_sharing_suite(thread_counts: &[usize], iterations: u64) -> Result<Vec<Experiment>> {
    let workload = Workload::new(Operation::Increment, iterations, Target::PerThread)?;
    let mut experiments = Vec::with_capacity(Layout::ALL.len() * thread_counts.len());
    for layout in Layout::ALL {
        for &threads in thread_counts {
            experiments.push(Experiment::new(
                format!("false_sharing/{layout}/{threads}"),
                layout,
                threads,
                workload.clone(),
            )?);
        }
    }
    Ok(experiments)
}

/// Single-cell experiments: a local-read control, two readers, and one
/// writer racing one reader.
pub fn coherence_suite(iterations: u64) -> Result<Vec<Experiment>> {
    Ok(vec![
        Experiment::new(
            "control",
            Layout::Padded,
            1,
            Workload::new(Operation::Read, iterations, Target::Shared)?,
        )?,
        Experiment::new(
            "coherence_no_contention",
            Layout::Padded,
            2,
            Workload::with_roles(
                vec![Operation::Load, Operation::LoadAccumulate],
                iterations,
                Target::Shared,
            )?,
        )?,
        Experiment::new(
            "coherence_contention",
            Layout::Padded,
            2,
            Workload::with_roles(
                vec![Operation::Store, Operation::LoadAccumulate],
                iterations,
                Target::Shared,
            )?,
        )?,
    ])
}
