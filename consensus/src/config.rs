//! Runtime configuration for a PBFT replica.
//!
//! A fluent builder over a single tunable knob: the mailbox-wait deadline
//! that drives the view-change path.

use std::time::Duration;

/// Tunable parameters recognised by a replica's constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaConfig {
    /// How long a replica waits on an empty mailbox before treating it as
    /// a timeout and starting a view change.
    pub timeout: Duration,
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

/// Fluent builder for [`ReplicaConfig`].
pub struct ReplicaConfigBuilder {
    inner: ReplicaConfig,
}

impl ReplicaConfigBuilder {
    /// Starts a new builder pre-populated with [`ReplicaConfig::default`].
    pub fn new() -> Self {
        Self {
            inner: ReplicaConfig::default(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner.timeout = timeout;
        self
    }

    /// Consumes the builder, returning an immutable configuration value.
    pub fn finish(self) -> ReplicaConfig {
        self.inner
    }
}

impl Default for ReplicaConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
