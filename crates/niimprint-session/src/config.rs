use std::time::Duration;

use niimprint_frame::{ResyncPolicy, DEFAULT_READ_CHUNK_SIZE};

/// Default number of polls while waiting for a response.
pub const DEFAULT_RESPONSE_ATTEMPTS: u32 = 10;

/// Default pause between response polls.
pub const DEFAULT_RESPONSE_INTERVAL: Duration = Duration::from_millis(100);

/// Controls how a session waits for responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Polls before giving up; at least one poll is always made.
    pub response_attempts: u32,
    /// Sleep between polls. Not slept after the last poll.
    pub response_interval: Duration,
    /// Bytes requested from the transport per poll.
    pub read_chunk_size: usize,
    /// What the reassembler does after a corrupt frame.
    pub resync: ResyncPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            response_attempts: DEFAULT_RESPONSE_ATTEMPTS,
            response_interval: DEFAULT_RESPONSE_INTERVAL,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            resync: ResyncPolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_response_attempts(mut self, response_attempts: u32) -> Self {
        self.response_attempts = response_attempts;
        self
    }

    pub fn with_response_interval(mut self, response_interval: Duration) -> Self {
        self.response_interval = response_interval;
        self
    }

    pub fn with_read_chunk_size(mut self, read_chunk_size: usize) -> Self {
        self.read_chunk_size = read_chunk_size;
        self
    }

    pub fn with_resync(mut self, resync: ResyncPolicy) -> Self {
        self.resync = resync;
        self
    }
}
