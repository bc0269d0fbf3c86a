use std::time::Duration;

use crate::retry::RetryPolicy;

/// How a whole-job failure (agent `failed` status or a lost status query)
/// is counted in the final summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureAccounting {
    /// A single failure stands in for "job outcome unknown".
    #[default]
    SingleFailure,
    /// Every submitted target is counted as failed.
    WholeRange,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Wait between two status queries of the same job.
    pub poll_interval: Duration,
    /// Upper bound for a single submit or status request.
    pub request_timeout: Duration,
    /// Pause between a terminal status and the summary, so that a device-list
    /// refresh started by the caller can land first.
    pub settle_delay: Duration,
    pub retry: RetryPolicy,
    pub failure_accounting: FailureAccounting,
    /// Output verbosity of the CLI. `0` prints everything.
    pub quiet: u8,
}

impl Default for Config {
    fn default() -> Self {
        let poll_interval = Duration::from_millis(2_000);
        Self {
            poll_interval,
            request_timeout: Duration::from_secs(10),
            settle_delay: Duration::from_millis(1_000),
            retry: RetryPolicy::fixed(poll_interval, 1),
            failure_accounting: FailureAccounting::default(),
            quiet: 0,
        }
    }
}
