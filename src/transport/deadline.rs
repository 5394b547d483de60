//! Absolute deadlines for socket reads.
//!
//! A [`Deadline`] remembers both the instant it expires and the budget it
//! was created with, so a timeout error can report the original duration
//! no matter how many reads shared it.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, timeout_at};

use crate::error::{Error, Result};

// ============================================================================
// Deadline
// ============================================================================

/// An absolute point in time that bounds a sequence of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    /// When the deadline expires.
    at: Instant,
    /// The duration the deadline was created with.
    budget: Duration,
}

impl Deadline {
    /// Creates a deadline `budget` from now.
    #[inline]
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    /// Returns the instant the deadline expires.
    #[inline]
    #[must_use]
    pub const fn instant(&self) -> Instant {
        self.at
    }

    /// Returns the budget the deadline was created with.
    #[inline]
    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    /// Returns the budget in whole milliseconds.
    #[inline]
    #[must_use]
    pub fn budget_ms(&self) -> u64 {
        u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX)
    }

    /// Returns the time left, zero once expired.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Returns `true` once the deadline has passed.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Runs `future` to completion unless the deadline passes first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] naming `operation` when the deadline wins.
    pub async fn run<F, T>(&self, operation: &str, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match timeout_at(self.at, future).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout(operation, self.budget_ms())),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
