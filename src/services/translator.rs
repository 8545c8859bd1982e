use std::thread;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::model::config::Config;
use crate::services::backends::{BackendError, TranslationBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: usize,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        RetryPolicy {
            max_retries: config.max_retries,
            base_delay: config.retry_delay(),
        }
    }

    /// Linear backoff: the n-th retry (1-based) waits `base_delay * n`.
    pub fn delay_before_retry(&self, retry: usize) -> Duration {
        self.base_delay.saturating_mul(u32::try_from(retry).unwrap_or(u32::MAX))
    }

    pub fn max_attempts(&self) -> usize {
        self.max_retries + 1
    }
}

type SleepFn = dyn Fn(Duration) + Send + Sync;

/// Walks an ordered list of backends, retrying whole attempts with linear backoff.
pub struct RetryingTranslator {
    backends: Vec<Box<dyn TranslationBackend>>,
    policy: RetryPolicy,
    sleep: Box<SleepFn>,
}

impl RetryingTranslator {
    pub fn new(backends: Vec<Box<dyn TranslationBackend>>, policy: RetryPolicy) -> Self {
        RetryingTranslator {
            backends,
            policy,
            sleep: Box::new(thread::sleep),
        }
    }

    /// Replaces the blocking sleep between attempts.
    pub fn with_sleep(mut self, sleep: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    /// Returns `None` once every attempt failed; the failure is logged once.
    pub fn translate(&self, text: &str, source: &str, target: &str) -> Option<String> {
        let mut last_err: Option<BackendError> = None;

        for attempt in 0..self.policy.max_attempts() {
            if attempt > 0 {
                let delay = self.policy.delay_before_retry(attempt);
                debug!(
                    attempt = attempt + 1,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "retrying translation"
                );
                (self.sleep)(delay);
            }

            match self.attempt(text, source, target) {
                Ok(translated) => return Some(translated),
                Err(err) => {
                    warn!(attempt = attempt + 1, src = source, dst = target, error = %err, "translation attempt failed");
                    last_err = Some(err);
                }
            }
        }

        error!(
            src = source,
            dst = target,
            retries = self.policy.max_retries,
            error = %last_err.unwrap_or(BackendError::NoBackend),
            "translation failed after {} retries: {}",
            self.policy.max_retries,
            text
        );
        None
    }

    fn attempt(&self, text: &str, source: &str, target: &str) -> Result<String, BackendError> {
        let mut last = BackendError::NoBackend;

        for backend in &self.backends {
            match backend.translate(text, source, target) {
                Ok(translated) if !translated.trim().is_empty() => return Ok(translated),
                Ok(_) => {
                    debug!(backend = backend.name(), "backend returned an empty translation");
                    last = BackendError::Empty;
                }
                Err(err) => {
                    debug!(backend = backend.name(), error = %err, "backend failed");
                    last = err;
                }
            }
        }

        Err(last)
    }
}
