use std::fmt;
use std::time::Duration;

use log::debug;

use crate::error::{Error, Result};

/// Minimum, median and maximum of a complete sample set.
///
/// `median` is the sort-index median: the element at `n / 2` of the ascending
/// samples. For even `n` that is the upper-middle sample, never an average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary<T> {
    pub min: T,
    pub median: T,
    pub max: T,
}

impl Summary<Duration> {
    pub fn as_micros(&self) -> Summary<u128> {
        Summary {
            min: self.min.as_micros(),
            median: self.median.as_micros(),
            max: self.max.as_micros(),
        }
    }
}

impl fmt::Display for Summary<Duration> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min {:?}, median {:?}, max {:?}",
            self.min, self.median, self.max
        )
    }
}

/// Samples for one configuration, in recording order.
///
/// Sized up front; reduction is refused until every expected sample is in.
#[derive(Debug, Clone)]
pub struct SampleSet<T> {
    expected: usize,
    samples: Vec<T>,
}

impl<T: Ord + Copy> SampleSet<T> {
    pub fn new(expected: usize) -> Result<SampleSet<T>> {
        if expected == 0 {
            return Err(Error::ZeroRepetitions);
        }
        Ok(SampleSet {
            expected,
            samples: Vec::with_capacity(expected),
        })
    }

    /// Refuses samples once the set is complete.
    pub fn record(&mut self, sample: T) -> Result<()> {
        if self.is_complete() {
            return Err(Error::SampleSetFull {
                expected: self.expected,
            });
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.samples.len() == self.expected
    }

    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    pub fn summarize(&self) -> Result<Summary<T>> {
        if !self.is_complete() {
            return Err(Error::IncompleteSampleSet {
                expected: self.expected,
                actual: self.samples.len(),
            });
        }
        let mut sorted = self.samples.clone();
        sorted.sort_unstable();
        Ok(Summary {
            min: sorted[0],
            median: sorted[sorted.len() / 2],
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Calls `trial` exactly `repetitions` times and reduces the samples.
///
/// The first failing call ends the run; no partial summary is produced.
pub fn repeat_and_summarize<T, F>(mut trial: F, repetitions: usize) -> Result<Summary<T>>
where
    T: Ord + Copy + fmt::Debug,
    F: FnMut() -> Result<T>,
{
    let mut set = SampleSet::new(repetitions)?;
    for rep in 0..repetitions {
        let sample = trial()?;
        debug!("repetition {rep}: {sample:?}");
        set.record(sample)?;
    }
    set.summarize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summarize_values(values: &[u64]) -> Summary<u64> {
        let mut iter = values.iter().copied();
        repeat_and_summarize(|| Ok(iter.next().unwrap()), values.len()).unwrap()
    }

    #[test]
    fn odd_count_takes_middle() {
        let s = summarize_values(&[10, 50, 30, 20, 40]);
        assert_eq!(
            s,
            Summary {
                min: 10,
                median: 30,
                max: 50
            }
        );
    }

    #[test]
    fn even_count_takes_upper_middle() {
        let s = summarize_values(&[10, 20, 30, 40]);
        assert_eq!(s.median, 30);
        let s = summarize_values(&[40, 30, 20, 10]);
        assert_eq!(s.median, 30);
    }

    #[test]
    fn single_sample_is_all_three() {
        let s = summarize_values(&[7]);
        assert_eq!((s.min, s.median, s.max), (7, 7, 7));
    }

    #[test]
    fn bounds_match_true_extremes() {
        let values = [5, 3, 9, 9, 1, 4, 8, 2, 7, 6, 3];
        let s = summarize_values(&values);
        assert_eq!(s.min, *values.iter().min().unwrap());
        assert_eq!(s.max, *values.iter().max().unwrap());
        assert!(s.min <= s.median && s.median <= s.max);
    }

    #[test]
    fn zero_repetitions_never_calls_trial() {
        let mut calls = 0;
        let result = repeat_and_summarize(
            || {
                calls += 1;
                Ok(1u64)
            },
            0,
        );
        assert!(matches!(result, Err(Error::ZeroRepetitions)));
        assert_eq!(calls, 0);
    }

    #[test]
    fn calls_trial_exactly_repetitions_times() {
        let mut calls = 0u64;
        repeat_and_summarize(
            || {
                calls += 1;
                Ok(calls)
            },
            12,
        )
        .unwrap();
        assert_eq!(calls, 12);
    }

    #[test]
    fn failing_trial_yields_no_summary() {
        let mut calls = 0;
        let result = repeat_and_summarize(
            || {
                calls += 1;
                if calls == 3 {
                    Err(Error::WorkerPanicked)
                } else {
                    Ok(calls)
                }
            },
            5,
        );
        assert!(matches!(result, Err(Error::WorkerPanicked)));
        assert_eq!(calls, 3);
    }

    #[test]
    fn partial_sample_set_is_not_reducible() {
        let mut set = SampleSet::new(3).unwrap();
        set.record(1u64).unwrap();
        set.record(2).unwrap();
        assert!(matches!(
            set.summarize(),
            Err(Error::IncompleteSampleSet {
                expected: 3,
                actual: 2
            })
        ));
        set.record(3).unwrap();
        assert_eq!(set.summarize().unwrap().median, 2);
    }

    #[test]
    fn complete_sample_set_refuses_more() {
        let mut set = SampleSet::new(2).unwrap();
        set.record(5u64).unwrap();
        set.record(1).unwrap();
        assert!(matches!(
            set.record(9),
            Err(Error::SampleSetFull { expected: 2 })
        ));
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.summarize().unwrap(),
            Summary {
                min: 1,
                median: 5,
                max: 5
            }
        );
    }

    #[test]
    fn durations_convert_to_micros() {
        let s = Summary {
            min: Duration::from_micros(10),
            median: Duration::from_micros(25),
            max: Duration::from_millis(1),
        };
        assert_eq!(
            s.as_micros(),
            Summary {
                min: 10,
                median: 25,
                max: 1000
            }
        );
    }
}
