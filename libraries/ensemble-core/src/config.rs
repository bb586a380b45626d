//! Coordinator configuration

use std::time::Duration;

/// Tunables for the coordination core
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Maximum number of entries the tracklist may hold
    pub max_tracklist_length: usize,

    /// Maximum number of entries kept in the play history
    pub max_history_length: usize,

    /// Upper bound on any single backend or mixer call
    ///
    /// `None` lets a call block until the backend answers; an elapsed timeout
    /// is contained like any other backend fault.
    pub backend_call_timeout: Option<Duration>,

    /// Buffer size of the event broadcast channel
    ///
    /// Slow subscribers that fall more than this many events behind start
    /// losing the oldest ones.
    pub event_buffer_size: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_tracklist_length: 10_000,
            max_history_length: 100,
            backend_call_timeout: None,
            event_buffer_size: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.max_tracklist_length, 10_000);
        assert_eq!(config.max_history_length, 100);
        assert!(config.backend_call_timeout.is_none());
    }
}
