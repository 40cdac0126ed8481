//! Pacing of document requests.
//!
//! The document endpoint is throttled with a pause after every request. The
//! default [`RatePolicy::Fixed`] pauses the same amount every time. The opt-in
//! [`RatePolicy::Adaptive`] widens the pause after a `429 Too Many Requests`
//! and follows the observed response latency otherwise.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Default pause between document requests.
const DEFAULT_DELAY: Duration = Duration::from_secs(5);

/// Pacing policy between consecutive document requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RatePolicy {
    /// Pause the same delay after every request.
    Fixed {
        /// Pause after each request.
        delay: Duration,
    },
    /// Pause between `base` and `max`, adjusted from observed responses.
    Adaptive {
        /// Smallest pause.
        base: Duration,
        /// Largest pause.
        max: Duration,
    },
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self::Fixed {
            delay: DEFAULT_DELAY,
        }
    }
}

impl RatePolicy {
    /// Fixed pause after every request.
    #[must_use]
    pub const fn fixed(delay: Duration) -> Self {
        Self::Fixed { delay }
    }

    /// Adaptive pause bounded by `base` and `max`.
    ///
    /// A `max` below `base` is raised to `base`.
    #[must_use]
    pub fn adaptive(base: Duration, max: Duration) -> Self {
        Self::Adaptive {
            base,
            max: max.max(base),
        }
    }

    /// Pause used before any response has been observed.
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        match self {
            Self::Fixed { delay } => *delay,
            Self::Adaptive { base, .. } => *base,
        }
    }
}

/// What a single request looked like to the pacer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Observation {
    /// HTTP status, `None` when the request never got a response.
    pub(crate) status: Option<u16>,
    /// Time between sending the request and reading the response.
    pub(crate) latency: Duration,
}

/// Rate limiter holding the current pause of a [`RatePolicy`].
#[derive(Debug)]
pub(crate) struct RateLimiter {
    policy: RatePolicy,
    current: Duration,
}

impl RateLimiter {
    pub(crate) const fn new(policy: RatePolicy) -> Self {
        Self {
            current: policy.base_delay(),
            policy,
        }
    }

    /// Current pause.
    pub(crate) const fn delay(&self) -> Duration {
        self.current
    }

    /// Updates the pause from a finished request.
    pub(crate) fn observe(&mut self, observation: Observation) {
        let RatePolicy::Adaptive { base, max } = self.policy else {
            return;
        };

        match observation.status {
            Some(429) => {
                self.current = self.current.saturating_mul(2).max(base).min(max);
                debug!(delay = ?self.current, "Throttled, widening request pause");
            }
            Some(200) => {
                self.current = observation.latency.max(base).min(max);
            }
            _ => {}
        }
    }

    /// Sleeps for the current pause.
    pub(crate) async fn wait(&self) {
        if !self.current.is_zero() {
            sleep(self.current).await;
        }
    }
}
