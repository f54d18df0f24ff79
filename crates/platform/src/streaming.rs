//! Contract toward the external I2S + DMA streaming engine.
//!
//! The engine owns all register-level work: GPIO alternate functions,
//! PLLI2S and prescaler programming, the DMA stream in circular mode with
//! half-transfer and transfer-complete interrupts, and the NVIC priority.
//! From its interrupt handler it forwards each [`DmaEvent`] to the refill
//! hand-off. It never touches sample data after start.

use crate::audio_mode::{AudioMode, ModeConfig};
use crate::dma_buffer::{BufferHalf, DoubleBuffer};

/// Interrupt-level event raised by the DMA stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaEvent {
    /// DMA finished reading the first half and moved into the second.
    HalfTransfer,
    /// DMA finished reading the second half and wrapped to the first.
    TransferComplete,
    /// Bus or FIFO error on the DMA stream.
    TransferError,
}

impl DmaEvent {
    /// The half that became free for refilling, if any.
    pub const fn refill_half(self) -> Option<BufferHalf> {
        match self {
            Self::HalfTransfer => Some(BufferHalf::First),
            Self::TransferComplete => Some(BufferHalf::Second),
            Self::TransferError => None,
        }
    }
}

/// External I2S + DMA streaming engine.
///
/// `start` is called exactly once, after both halves of `buffer` have been
/// primed. Implementations apply the mode's [`ClockParams`][crate::ClockParams],
/// point the DMA at [`DoubleBuffer::as_dma_slice`] and return the mode row
/// whose `actual_sample_rate` the refill loop must use.
///
/// The returned row must describe `mode`: same `mode` and `bit_depth`, since
/// the buffer was primed for that word layout. Only `actual_sample_rate` may
/// differ from the table (e.g. a measured rate). A caller that gets any other
/// row back has an engine already streaming the wrong layout and must stop
/// it itself; `start` has no counterpart to undo it.
pub trait StreamingEngine {
    /// Error type
    type Error: core::fmt::Debug;

    /// Configure clocks, bind the buffer and start circular streaming.
    fn start(&mut self, buffer: &mut DoubleBuffer, mode: AudioMode) -> Result<ModeConfig, Self::Error>;
}
