//! Exponential backoff with bounded jitter for registry requests.
//!
//! Delays double from `base` up to `cap`. Each value is perturbed by up to
//! `jitter * delay` in either direction and clamped to `[0, cap]`. The
//! sequence is a pure function of its inputs and a seed, so a fixed seed
//! reproduces it exactly.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Default number of retries after the first attempt.
const DEFAULT_ATTEMPTS: usize = 5;

/// Default first backoff delay in seconds.
const DEFAULT_BASE_SECS: f64 = 1.0;

/// Default ceiling for any single delay in seconds.
const DEFAULT_CAP_SECS: f64 = 64.0;

/// Default jitter as a fraction of the current delay.
const DEFAULT_JITTER: f64 = 0.10;

/// Upper bound on retries, whatever the configuration asks for.
pub const MAX_ATTEMPTS: usize = 32;

/// Upper bound on any single delay in seconds.
pub const MAX_CAP_SECS: f64 = 3600.0;

/// Compute a backoff sequence in seconds.
///
/// Returns exactly `attempts` values, each within `[0, cap]`. Jitter is
/// clamped to `[0, 1]` and NaN inputs collapse to zero.
pub fn backoff_delays(attempts: usize, base: f64, cap: f64, jitter: f64, seed: u64) -> Vec<f64> {
    let cap = cap.max(0.0);
    let jitter = jitter.clamp(0.0, 1.0);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut delay = base.max(0.0).min(cap);
    let mut delays = Vec::with_capacity(attempts.min(MAX_ATTEMPTS));

    for _ in 0..attempts {
        let delta = if jitter > 0.0 {
            delay * jitter * rng.gen_range(-1.0..=1.0)
        } else {
            0.0
        };
        delays.push((delay + delta).clamp(0.0, cap));
        delay = (delay * 2.0).min(cap);
    }

    delays
}

/// Retry configuration for registry API calls.
///
/// Only transient statuses are retried (see
/// [`RetryClass`](crate::errors::RetryClass)); the first attempt never waits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt.
    pub attempts: usize,
    /// First backoff delay in seconds.
    pub base_secs: f64,
    /// Maximum single delay in seconds.
    pub cap_secs: f64,
    /// Jitter fraction (0.0 disables jitter).
    pub jitter: f64,
    /// Fixed seed for reproducible delays. `None` draws a fresh seed per sequence.
    pub seed: Option<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            base_secs: DEFAULT_BASE_SECS,
            cap_secs: DEFAULT_CAP_SECS,
            jitter: DEFAULT_JITTER,
            seed: None,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            attempts: 0,
            ..Self::default()
        }
    }

    /// Backoff delays for a fresh sequence, excluding the first attempt.
    ///
    /// Attempts are capped at [`MAX_ATTEMPTS`] and delays at
    /// [`MAX_CAP_SECS`], so out-of-range configuration degrades to the
    /// longest permitted schedule.
    pub fn backoff(&self) -> Vec<Duration> {
        let seed = self.seed.unwrap_or_else(rand::random);
        let cap = self.cap_secs.clamp(0.0, MAX_CAP_SECS);
        let ceiling = Duration::from_secs_f64(MAX_CAP_SECS);

        backoff_delays(
            self.attempts.min(MAX_ATTEMPTS),
            self.base_secs,
            cap,
            self.jitter,
            seed,
        )
        .into_iter()
        .map(|secs| Duration::try_from_secs_f64(secs).unwrap_or(ceiling))
        .collect()
    }

    /// Delay before every attempt: zero for the first, then the backoff.
    pub fn schedule(&self) -> Vec<Duration> {
        std::iter::once(Duration::ZERO)
            .chain(self.backoff())
            .collect()
    }
}
