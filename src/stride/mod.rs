use std::hint::black_box;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::layout::CACHE_LINE_SIZE;
use crate::stats::{Summary, repeat_and_summarize};
use crate::trace::TraceMarker;

/// Strides used by the cache-miss run when none are given.
pub const DEFAULT_STRIDES: [usize; 6] = [1, 4, 16, 64, 128, 256];
pub const DEFAULT_PASSES: usize = 10_000;

/// Buffer walked by the timing variant: one million cache lines.
pub const DEFAULT_TIMING_BUFFER_LEN: usize = CACHE_LINE_SIZE * 1_000_000;
pub const DEFAULT_TIMING_REPETITIONS: usize = 100;

/// Adds one to every `stride`-th byte of `buffer`, starting at 0.
/// Returns the number of bytes touched.
pub fn walk(buffer: &mut [u8], stride: NonZeroUsize) -> usize {
    let stride = stride.get();
    let mut touched = 0;
    let mut pos = 0;
    while pos < buffer.len() {
        buffer[pos] = buffer[pos].wrapping_add(1);
        pos += stride;
        touched += 1;
    }
    black_box(&*buffer);
    touched
}

/// One stride value for the single-threaded cache-miss run.
///
/// The buffer holds `stride * passes` bytes, so every stride touches exactly
/// `passes` bytes and only the spacing between touches varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrideConfig {
    stride: NonZeroUsize,
    passes: usize,
    buffer_len: usize,
}

impl StrideConfig {
    pub fn new(stride: usize, passes: usize) -> Result<StrideConfig> {
        let stride = NonZeroUsize::new(stride).ok_or(Error::InvalidStride(0))?;
        if passes == 0 {
            return Err(Error::ZeroPasses);
        }
        let buffer_len = stride
            .get()
            .checked_mul(passes)
            .ok_or(Error::BufferTooLarge {
                stride: stride.get(),
                passes,
            })?;
        Ok(StrideConfig {
            stride,
            passes,
            buffer_len,
        })
    }

    pub fn stride(&self) -> NonZeroUsize {
        self.stride
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    /// Allocates the backing buffer and walks it once. Returns bytes touched.
    pub fn run(&self) -> usize {
        let mut buffer = vec![0u8; self.buffer_len()];
        walk(&mut buffer, self.stride)
    }
}

/// Runs each configuration in order, bracketing every one with markers.
pub fn run_with_markers(configs: &[StrideConfig], marker: &dyn TraceMarker) {
    marker.event("Starting");
    for config in configs {
        let mut buffer = vec![0u8; config.buffer_len()];
        marker.event("Starting Stride");
        let touched = walk(&mut buffer, config.stride);
        marker.event("Finished Stride");
        debug!("stride {}: touched {touched} bytes", config.stride);
    }
    marker.event("Ending");
}

/// Settings for the timed stride walk over a fixed-size buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrideTiming {
    buffer_len: usize,
    repetitions: usize,
}

impl Default for StrideTiming {
    fn default() -> Self {
        StrideTiming {
            buffer_len: DEFAULT_TIMING_BUFFER_LEN,
            repetitions: DEFAULT_TIMING_REPETITIONS,
        }
    }
}

impl StrideTiming {
    pub fn new(buffer_len: usize, repetitions: usize) -> Result<StrideTiming> {
        if repetitions == 0 {
            return Err(Error::ZeroRepetitions);
        }
        if buffer_len == 0 {
            return Err(Error::EmptyBuffer);
        }
        Ok(StrideTiming {
            buffer_len,
            repetitions,
        })
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    pub fn repetitions(&self) -> usize {
        self.repetitions
    }

    /// Times a full walk of a fresh zeroed buffer, `repetitions` times.
    pub fn measure(&self, stride: NonZeroUsize) -> Result<Summary<Duration>> {
        info!(
            "timing stride {stride} over {} bytes, {} repetitions",
            self.buffer_len, self.repetitions
        );
        repeat_and_summarize(
            || {
                let mut buffer = vec![0u8; self.buffer_len];
                let start = Instant::now();
                walk(&mut buffer, stride);
                Ok(start.elapsed())
            },
            self.repetitions,
        )
    }
}
