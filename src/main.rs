use std::env;
use std::ffi::OsString;
use std::process::ExitCode;

use cache_effects::config::{STRIDE_SIZES_VAR, resolve_strides};
use cache_effects::experiment::{
    DEFAULT_COHERENCE_ITERATIONS, DEFAULT_FALSE_SHARING_ITERATIONS, DEFAULT_FALSE_SHARING_THREADS,
    DEFAULT_REPETITIONS, Experiment, coherence_suite, false_sharing_suite,
};
use cache_effects::stride::{
    DEFAULT_PASSES, DEFAULT_STRIDES, DEFAULT_TIMING_BUFFER_LEN, DEFAULT_TIMING_REPETITIONS,
    StrideConfig, StrideTiming, run_with_markers,
};
use cache_effects::trace::LogMarker;
use cache_effects::{CACHE_LINE_SIZE, Result, config};
use clap::{Parser, Subcommand};
use log::info;

#[derive(Parser)]
#[command(version, about = "Measure cache misses, false sharing and coherence cost")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Time a strided walk over a large buffer for each stride size
    Strides {
        /// Stride sizes in bytes; falls back to the STRIDE_SIZES environment variable
        #[arg(allow_negative_numbers = true)]
        strides: Vec<String>,
        #[arg(long, default_value_t = DEFAULT_TIMING_BUFFER_LEN)]
        buffer_len: usize,
        #[arg(long, default_value_t = DEFAULT_TIMING_REPETITIONS)]
        repetitions: usize,
    },
    /// Walk a buffer touching the same number of bytes per stride, with trace markers
    Misses {
        /// Stride sizes in bytes [default: 1 4 16 64 128 256]
        #[arg(allow_negative_numbers = true)]
        strides: Vec<String>,
        #[arg(long, default_value_t = DEFAULT_PASSES)]
        passes: usize,
    },
    /// Per-thread increments on padded versus packed cells
    FalseSharing {
        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_FALSE_SHARING_THREADS)]
        threads: Vec<usize>,
        #[arg(long, default_value_t = DEFAULT_FALSE_SHARING_ITERATIONS)]
        iterations: u64,
        #[arg(long, default_value_t = DEFAULT_REPETITIONS)]
        repetitions: usize,
    },
    /// Loads and stores on a single shared cell
    Coherence {
        #[arg(long, default_value_t = DEFAULT_COHERENCE_ITERATIONS)]
        iterations: u64,
        #[arg(long, default_value_t = DEFAULT_REPETITIONS)]
        repetitions: usize,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let env_strides = env::var(STRIDE_SIZES_VAR).ok();
    ExitCode::from(status(env::args_os(), env_strides.as_deref()))
}

/// Parses `args`, runs the command and returns the process exit status:
/// 0 on success (or help/version), 1 for any bad configuration or failed run.
fn status<I, T>(args: I, env_strides: Option<&str>) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() { 1 } else { 0 };
        }
    };
    match run(cli.command, env_strides) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

fn run(command: Command, env_strides: Option<&str>) -> Result<()> {
    match command {
        Command::Strides {
            strides,
            buffer_len,
            repetitions,
        } => {
            let strides = resolve_strides(&strides, env_strides)?;
            let timing = StrideTiming::new(buffer_len, repetitions)?;
            for stride in strides {
                let summary = timing.measure(stride)?.as_micros();
                println!("Timing results (in microseconds) for stride size {stride} bytes:");
                println!("Min time: {} us", summary.min);
                println!("Median time: {} us", summary.median);
                println!("Max time: {} us", summary.max);
                println!();
            }
        }
        Command::Misses { strides, passes } => {
            let strides = if strides.is_empty() {
                DEFAULT_STRIDES.to_vec()
            } else {
                config::parse_strides(&strides)?
                    .into_iter()
                    .map(|s| s.get())
                    .collect()
            };
            let configs = strides
                .into_iter()
                .map(|stride| StrideConfig::new(stride, passes))
                .collect::<Result<Vec<_>>>()?;
            info!(
                "cache line {CACHE_LINE_SIZE} bytes, {} strides, {passes} touches each",
                configs.len()
            );
            run_with_markers(&configs, &LogMarker::new("cache_misses", "PointsOfInterest"));
        }
        Command::FalseSharing {
            threads,
            iterations,
            repetitions,
        } => report(&false_sharing_suite(&threads, iterations)?, repetitions)?,
        Command::Coherence {
            iterations,
            repetitions,
        } => report(&coherence_suite(iterations)?, repetitions)?,
    }
    Ok(())
}

fn report(experiments: &[Experiment], repetitions: usize) -> Result<()> {
    for experiment in experiments {
        let summary = experiment.summarize(repetitions)?;
        println!("{}: {summary}", experiment.name());
    }
    Ok(())
}
