//! Points-of-interest markers so an external profiler can line up hardware
//! counters with a measured region.

use log::info;

/// Receives named point-of-interest events.
pub trait TraceMarker {
    fn event(&self, name: &str);
}

/// Emits each event as a `log` record targeted at `<subsystem>::<category>`.
///
/// Run with `RUST_LOG=<subsystem>=info` to keep only the markers.
#[derive(Debug, Clone)]
pub struct LogMarker {
    target: String,
}

impl LogMarker {
    pub fn new(subsystem: &str, category: &str) -> LogMarker {
        LogMarker {
            target: format!("{subsystem}::{category}"),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl TraceMarker for LogMarker {
    fn event(&self, name: &str) {
        info!(target: self.target.as_str(), "{name}");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Collects event names in order.
    #[derive(Default)]
    pub(crate) struct RecordingMarker {
        pub(crate) events: Mutex<Vec<String>>,
    }

    impl TraceMarker for RecordingMarker {
        fn event(&self, name: &str) {
            self.events.lock().unwrap().push(name.to_string());
        }
    }

    #[test]
    fn log_marker_target_joins_subsystem_and_category() {
        let marker = LogMarker::new("cache_misses", "PointsOfInterest");
        assert_eq!(marker.target(), "cache_misses::PointsOfInterest");
        marker.event("Starting");
    }
}
