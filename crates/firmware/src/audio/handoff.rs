//! Interrupt-to-foreground buffer hand-off.
//!
//! # Protocol
//!
//! ```text
//!                 on_half_complete()                on_full_complete()
//!   Idle ─────────────────────────► PendingFirstHalf   Idle ───────────► PendingSecondHalf
//!     ▲                                   │              ▲                      │
//!     └────── complete(First) ────────────┘              └── complete(Second) ──┘
//! ```
//!
//! A single byte holds the state. The DMA interrupt is the only writer of
//! the two pending states and writes them with `swap`, unconditionally;
//! the foreground refill loop is the only writer of `Idle` and writes it
//! with `compare_exchange`, so a request raised while a refill is running
//! survives the refill's completion.
//!
//! # Under-runs
//!
//! A request that overwrites an unserved request is an under-run: the
//! foreground missed a block deadline and the DMA is now reading a half
//! that was never refilled (or is being refilled). The overwrite is never
//! queued, only counted in [`RefillRequest::underruns`].
//!
//! # Transfer errors
//!
//! A DMA transfer error leaves the state untouched and bumps
//! [`RefillRequest::transfer_errors`]. The stream keeps running.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use platform::{BufferHalf, DmaEvent};

/// Observable hand-off state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RefillState {
    /// Nothing to refill.
    Idle = 0,
    /// First half is free; the DMA is reading the second.
    PendingFirstHalf = 1,
    /// Second half is free; the DMA is reading the first.
    PendingSecondHalf = 2,
}

impl RefillState {
    /// Decode a stored byte. Only the three discriminants are ever stored.
    const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Idle),
            1 => Some(Self::PendingFirstHalf),
            2 => Some(Self::PendingSecondHalf),
            _ => None,
        }
    }

    const fn pending(half: BufferHalf) -> Self {
        match half {
            BufferHalf::First => Self::PendingFirstHalf,
            BufferHalf::Second => Self::PendingSecondHalf,
        }
    }

    /// Half waiting for a refill, if any.
    pub const fn half(self) -> Option<BufferHalf> {
        match self {
            Self::Idle => None,
            Self::PendingFirstHalf => Some(BufferHalf::First),
            Self::PendingSecondHalf => Some(BufferHalf::Second),
        }
    }
}

/// Single-slot refill request shared between the DMA interrupt and the
/// foreground loop. Lives in a `static`.
///
/// ```rust,ignore
/// static REQUEST: RefillRequest = RefillRequest::new();
///
/// #[interrupt]
/// fn DMA1_STREAM4() {
///     // after clearing the HT / TC / TE flag:
///     REQUEST.on_half_complete();
/// }
/// ```
#[derive(Debug)]
pub struct RefillRequest {
    state: AtomicU8,
    underruns: AtomicU32,
    transfer_errors: AtomicU32,
}

impl RefillRequest {
    /// Idle request with zeroed counters.
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(RefillState::Idle as u8),
            underruns: AtomicU32::new(0),
            transfer_errors: AtomicU32::new(0),
        }
    }

    // ── Interrupt side ──────────────────────────────────────────────────────

    /// Half-transfer interrupt: the first half is free.
    pub fn on_half_complete(&self) {
        self.raise(RefillState::PendingFirstHalf);
    }

    /// Transfer-complete interrupt: the second half is free.
    pub fn on_full_complete(&self) {
        self.raise(RefillState::PendingSecondHalf);
    }

    /// Transfer-error interrupt: count it, keep the pending state.
    pub fn on_transfer_error(&self) {
        self.transfer_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Dispatch a decoded DMA interrupt event.
    pub fn on_event(&self, event: DmaEvent) {
        match event {
            DmaEvent::HalfTransfer => self.on_half_complete(),
            DmaEvent::TransferComplete => self.on_full_complete(),
            DmaEvent::TransferError => self.on_transfer_error(),
        }
    }

    fn raise(&self, next: RefillState) {
        let previous = self.state.swap(next as u8, Ordering::AcqRel);
        if previous != RefillState::Idle as u8 {
            self.underruns.fetch_add(1, Ordering::Relaxed);
        }
    }

    // ── Foreground side ─────────────────────────────────────────────────────

    /// Current state.
    ///
    /// # Panics
    ///
    /// If the state byte holds anything but a `RefillState` discriminant,
    /// which only memory corruption can cause.
    pub fn state(&self) -> RefillState {
        let raw = self.state.load(Ordering::Acquire);
        match RefillState::from_raw(raw) {
            Some(state) => state,
            None => corrupted(raw),
        }
    }

    /// Half waiting for a refill, if any.
    pub fn pending(&self) -> Option<BufferHalf> {
        self.state().half()
    }

    /// Mark `half` as refilled.
    ///
    /// Returns to `Idle` only if the state still requests `half`. Returns
    /// `false` when a newer request arrived during the refill; that request
    /// stays pending and was already counted as an under-run.
    pub fn complete(&self, half: BufferHalf) -> bool {
        self.state
            .compare_exchange(
                RefillState::pending(half) as u8,
                RefillState::Idle as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Requests that overwrote an unserved request (wrapping).
    pub fn underruns(&self) -> u32 {
        self.underruns.load(Ordering::Relaxed)
    }

    /// DMA transfer errors seen (wrapping).
    pub fn transfer_errors(&self) -> u32 {
        self.transfer_errors.load(Ordering::Relaxed)
    }
}

#[cold]
#[allow(clippy::panic)] // Safety: corrupted shared state is a contract violation; fail fast
fn corrupted(raw: u8) -> ! {
    panic!("refill state byte corrupted: {raw}")
}

impl Default for RefillRequest {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
