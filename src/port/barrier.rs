//! Phase-scoped counting barrier.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

/// Tracks the backend operations in flight for one batch.
///
/// Each operation holds a [`Permit`]; dropping it releases the operation's
/// share of the barrier, so a release happens exactly once whether the
/// operation succeeds, fails or panics. [`PhaseBarrier::wait`] consumes the
/// barrier and resolves once every permit is gone.
#[derive(Debug)]
pub struct PhaseBarrier {
    guard: mpsc::Sender<()>,
    released: mpsc::Receiver<()>,
    in_flight: Arc<AtomicUsize>,
}

/// One operation's share of a [`PhaseBarrier`].
#[derive(Debug)]
pub struct Permit {
    in_flight: Arc<AtomicUsize>,
    // Dropped after `Drop::drop` runs, so the count is already lowered when
    // the barrier observes the release.
    _guard: mpsc::Sender<()>,
}

impl PhaseBarrier {
    pub fn new() -> Self {
        let (guard, released) = mpsc::channel(1);
        Self {
            guard,
            released,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register one operation.
    pub fn enter(&self) -> Permit {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        Permit {
            in_flight: Arc::clone(&self.in_flight),
            _guard: self.guard.clone(),
        }
    }

    /// Operations entered and not yet released.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Wait until every permit has been released.
    pub async fn wait(self) {
        let Self {
            guard,
            mut released,
            ..
        } = self;
        drop(guard);
        // Nothing is ever sent; `recv` returns `None` once the last permit drops.
        while released.recv().await.is_some() {}
    }
}

impl Default for PhaseBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
