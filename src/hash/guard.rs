//! Cooperative cancellation for searches.
//!
//! The nearest-bucket scan is linear in the number of distinct codes, which
//! approaches `n` when `2^k` dwarfs `n`. A [`SearchGuard`] bounds that work by
//! a deadline, a shared flag, or both.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{LshError, Result};

/// Buckets scanned between guard polls.
pub(crate) const POLL_INTERVAL: usize = 256;

/// Deadline and/or cancellation flag checked during a search.
#[derive(Debug, Clone, Default)]
pub struct SearchGuard {
    deadline: Option<Instant>,
    flag: Option<Arc<AtomicBool>>,
}

impl SearchGuard {
    /// A guard that never fires.
    pub fn none() -> Self {
        Self::default()
    }

    /// Fire once `timeout` has elapsed from now.
    pub fn with_deadline(timeout: Duration) -> Self {
        Self::none().deadline(timeout)
    }

    /// Fire once `flag` is set to `true` (by any thread).
    pub fn with_flag(flag: Arc<AtomicBool>) -> Self {
        Self::none().flag(flag)
    }

    /// Add a deadline `timeout` from now.
    pub fn deadline(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    /// Add a cancellation flag.
    pub fn flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.flag = Some(flag);
        self
    }

    /// `Err` if the search should stop.
    pub fn check(&self) -> Result<()> {
        if let Some(flag) = &self.flag {
            if flag.load(Ordering::Relaxed) {
                return Err(LshError::Cancelled);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(LshError::DeadlineExceeded);
            }
        }
        Ok(())
    }
}
