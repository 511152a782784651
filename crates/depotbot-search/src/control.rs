//! Cooperative cancellation for searches running against a wall-clock deadline.
//!
//! A [`SearchControl`] is checked at every node of the search tree. Once it reports that the
//! search must stop, the recursion unwinds with [`SearchAborted`] and everything computed in
//! the interrupted depth pass is discarded. Results that must survive the cancellation live
//! outside the search call stack (see [`BestMoveCell`](crate::controller::BestMoveCell)).
//!
//! Three conditions stop a search:
//!
//! - the deadline has passed (the clock is read every [`CLOCK_CHECK_INTERVAL`] nodes)
//! - [`SearchControl::stop`] was called, possibly from another thread
//! - the optional node budget is exhausted

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

/// How often (in nodes) the wall clock is read.
pub const CLOCK_CHECK_INTERVAL: u64 = 32;

/// The search was interrupted before the current depth pass completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("search aborted")]
pub struct SearchAborted;

/// Cancellation token shared between a search and whoever may interrupt it.
///
/// Clones share the stop flag, so stopping any clone stops them all.
#[derive(Debug, Clone)]
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    deadline: Option<Instant>,
    node_limit: Option<u64>,
}

impl Default for SearchControl {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl SearchControl {
    /// A control that only stops when [`stop`](Self::stop) is called.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            deadline: None,
            node_limit: None,
        }
    }

    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::unbounded()
        }
    }

    #[must_use]
    pub fn with_time_limit(limit: Duration) -> Self {
        Self::with_deadline(Instant::now() + limit)
    }

    /// Additionally stops once `limit` nodes have been visited in one search.
    #[must_use]
    pub fn node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Forces every search using this control (or a clone of it) to stop.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// Returns `true` if a search that has visited `nodes` nodes must stop now.
    ///
    /// The stop flag and node budget are checked on every call, the clock every
    /// [`CLOCK_CHECK_INTERVAL`] nodes. An expired deadline latches the stop flag.
    #[must_use]
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.is_stopped() {
            return true;
        }
        if self.node_limit.is_some_and(|limit| nodes >= limit) {
            return true;
        }
        if nodes.is_multiple_of(CLOCK_CHECK_INTERVAL)
            && let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            self.stop();
            return true;
        }
        false
    }

    /// Like [`should_stop`](Self::should_stop) but returns an error suitable for `?`.
    pub fn check(&self, nodes: u64) -> Result<(), SearchAborted> {
        if self.should_stop(nodes) {
            Err(SearchAborted)
        } else {
            Ok(())
        }
    }
}
