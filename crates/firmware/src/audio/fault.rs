//! DMA transfer-fault monitor.
//!
//! # Policy
//!
//! A transfer error (bus error, FIFO error) is cleared by the streaming
//! engine's interrupt handler and counted by the hand-off. The stream is
//! **not** stopped or resynchronised: circular DMA keeps running from the
//! same buffer, so at worst one block is corrupted. The monitor only turns
//! the raw counter into state the refill loop can log and report.
//!
//! # Usage Pattern
//!
//! ```rust,ignore
//! let mut monitor = TransferFaultMonitor::new();
//!
//! loop {
//!     if let Some(new_faults) = monitor.observe(REQUEST.transfer_errors()) {
//!         defmt::warn!("{} new DMA transfer error(s)", new_faults);
//!     }
//!     // ... refill ...
//! }
//! ```

// ─── State machine ───────────────────────────────────────────────────────────

/// Transfer-fault state.
///
/// Fed with the hand-off's transfer-error counter on every poll via
/// [`observe`][Self::observe]. Once faulted, the state stays faulted until
/// [`acknowledge`][Self::acknowledge]; the count keeps growing.
///
/// `count` saturates at [`u32::MAX`] and does not wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultState {
    /// No transfer error since start or since the last acknowledge.
    Healthy,
    /// One or more transfer errors seen.
    Faulted {
        /// Transfer errors since the last acknowledge. Saturates at `u32::MAX`.
        count: u32,
    },
}

/// Watches the hand-off's transfer-error counter for new faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferFaultMonitor {
    state: FaultState,
    last_seen: u32,
}

impl TransferFaultMonitor {
    /// Healthy monitor, expecting a counter that starts at zero.
    pub const fn new() -> Self {
        Self {
            state: FaultState::Healthy,
            last_seen: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> FaultState {
        self.state
    }

    /// Returns `true` once any transfer error has been seen since the last acknowledge.
    pub fn is_faulted(&self) -> bool {
        matches!(self.state, FaultState::Faulted { .. })
    }

    /// Faults since the last acknowledge, or 0 if healthy.
    pub fn fault_count(&self) -> u32 {
        match self.state {
            FaultState::Faulted { count } => count,
            FaultState::Healthy => 0,
        }
    }

    /// Feed the current value of the (wrapping) transfer-error counter.
    ///
    /// Returns the number of faults that arrived since the previous call,
    /// or `None` if there were none. Each fault is reported exactly once.
    pub fn observe(&mut self, transfer_errors: u32) -> Option<u32> {
        let new_faults = transfer_errors.wrapping_sub(self.last_seen);
        self.last_seen = transfer_errors;
        if new_faults == 0 {
            return None;
        }
        self.state = FaultState::Faulted {
            count: self.fault_count().saturating_add(new_faults),
        };
        Some(new_faults)
    }

    /// Return to [`FaultState::Healthy`] after the faults were reported.
    /// Safe to call while healthy (no-op).
    pub fn acknowledge(&mut self) {
        self.state = FaultState::Healthy;
    }
}

impl Default for TransferFaultMonitor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
