//! Transfer-active flag and completion accounting
//!
//! One [`TransferState`] is shared between the foreground task that issues
//! color transfers and the vendor completion callback that runs in ISR or
//! DMA-completion context. The foreground side only sets the active flag,
//! the signalling side only clears it; the single-writer-per-direction
//! discipline of the vendor driver is kept, expressed with atomics.

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Shared state of the color-transfer handshake.
///
/// Tracks whether a color transfer is in flight and how many completions have
/// been signalled but not yet serviced by the foreground task.
#[derive(Debug)]
pub struct TransferState {
    active: AtomicBool,
    pending: AtomicUsize,
}

impl TransferState {
    /// Creates an idle transfer state.
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            pending: AtomicUsize::new(0),
        }
    }

    /// Attempts to claim the color path for a new transfer.
    ///
    /// Returns `false` while a previous transfer is still in flight.
    #[inline]
    pub fn try_begin(&self) -> bool {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether a color transfer is currently in flight.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Signals completion of the in-flight transfer.
    ///
    /// Safe to call from ISR context: touches only atomics. The pending count
    /// is raised before the active flag drops, so a waiter that observes the
    /// flag clear also observes the completion event. The returned `bool` is
    /// the vendor callback's "context switch requested" answer and is always
    /// `false`.
    #[inline]
    pub fn complete_from_isr(&self) -> bool {
        self.pending.fetch_add(1, Ordering::Release);
        self.active.store(false, Ordering::Release);
        false
    }

    /// Releases the active flag without recording a completion.
    ///
    /// Used when the vendor driver rejects a queued transfer, so a failed
    /// `tx_color` does not leave the flag wedged.
    #[inline]
    pub fn abort(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Takes all completions signalled since the last call.
    #[inline]
    pub fn take_pending(&self) -> usize {
        self.pending.swap(0, Ordering::AcqRel)
    }
}

impl Default for TransferState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_is_exclusive_until_completion() {
        let state = TransferState::new();
        assert!(state.try_begin());
        assert!(!state.try_begin());
        assert!(state.is_active());

        assert!(!state.complete_from_isr());
        assert!(!state.is_active());
        assert!(state.try_begin());
    }

    #[test]
    fn completions_accumulate_and_drain_once() {
        let state = TransferState::new();
        state.try_begin();
        state.complete_from_isr();
        state.try_begin();
        state.complete_from_isr();

        assert_eq!(state.take_pending(), 2);
        assert_eq!(state.take_pending(), 0);
    }

    #[test]
    fn abort_releases_flag_without_completion() {
        let state = TransferState::new();
        assert!(state.try_begin());
        state.abort();
        assert!(!state.is_active());
        assert_eq!(state.take_pending(), 0);
    }
}
