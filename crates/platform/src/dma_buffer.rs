//! Circular DMA double buffer shared between the I2S stream and the refill loop.
//!
//! ## Layout
//!
//! ```text
//! words:  0 .............. H-1 | H .............. 2H-1
//!         ├──── First half ────┼──── Second half ────┤
//!         ▲ half-transfer IRQ  ▲ transfer-complete IRQ
//!           fires when DMA       fires when DMA wraps
//!           enters the Second    back to the First half
//! ```
//!
//! `H` is `BLOCK_SIZE x words_per_frame`: 256 words at 16 bit, 512 at 32 bit.
//! The half the DMA is *not* reading is the one the refill loop may write.
//!
//! ## Ownership
//! The buffer is owned by the refill loop. The streaming engine receives
//! it once, at start, to program the DMA source address and length; after
//! that the loop writes halves through [`DoubleBuffer::half_mut`] while the
//! engine's DMA reads the other half in hardware.

use crate::audio_mode::BitDepth;

// ── Sizing constants ─────────────────────────────────────────────────────────

/// Stereo frames per buffer half.
///
/// At 48 kHz one half lasts 128 / 48 000 ≈ 2.67 ms: the refill deadline.
pub const BLOCK_SIZE: usize = 128;

/// Raw word width the DMA moves per request (I2S data register is 16 bit).
pub type RawWord = u16;

/// Largest half size: 128 frames x 4 words (32-bit stereo).
pub const MAX_HALF_WORDS: usize = BLOCK_SIZE * 4;

/// Backing storage for both halves at the largest bit depth (2 KiB).
pub const DOUBLE_BUFFER_WORDS: usize = MAX_HALF_WORDS * 2;

// ── Halves ───────────────────────────────────────────────────────────────────

/// One of the two ping-pong halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferHalf {
    /// Words `0..H`.
    First,
    /// Words `H..2H`.
    Second,
}

impl BufferHalf {
    /// The opposite half.
    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

// ── Buffer ───────────────────────────────────────────────────────────────────

/// Two contiguous halves of raw I2S words, sized for the active bit depth.
///
/// Storage is fixed at [`DOUBLE_BUFFER_WORDS`]; only the first `2 x H`
/// words are handed to the DMA. Keep instances in a `static`, not on the stack.
pub struct DoubleBuffer {
    words: [RawWord; DOUBLE_BUFFER_WORDS],
    half_words: usize,
}

impl DoubleBuffer {
    /// Zeroed buffer configured for 16-bit words.
    pub const fn new() -> Self {
        Self {
            words: [0; DOUBLE_BUFFER_WORDS],
            half_words: half_words_for(BitDepth::Sixteen),
        }
    }

    /// Resize the active region for `bit_depth` and zero it.
    ///
    /// Must only be called while the stream is stopped.
    pub fn configure(&mut self, bit_depth: BitDepth) {
        self.half_words = half_words_for(bit_depth);
        self.words.fill(0);
    }

    /// Words per half for the current configuration.
    pub const fn half_words(&self) -> usize {
        self.half_words
    }

    /// Words handed to the DMA (both halves).
    #[allow(clippy::arithmetic_side_effects)] // Safety: half_words <= 512
    pub const fn len(&self) -> usize {
        self.half_words * 2
    }

    /// Always false; present for API symmetry with `len`.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Read-only view of one half.
    pub fn half(&self, half: BufferHalf) -> &[RawWord] {
        let (first, rest) = self.as_dma_slice().split_at(self.half_words);
        match half {
            BufferHalf::First => first,
            BufferHalf::Second => rest,
        }
    }

    /// Mutable view of one half; the refill loop writes samples here.
    pub fn half_mut(&mut self, half: BufferHalf) -> &mut [RawWord] {
        let half_words = self.half_words;
        let (first, rest) = self.as_mut_dma_slice().split_at_mut(half_words);
        match half {
            BufferHalf::First => first,
            BufferHalf::Second => rest,
        }
    }

    /// Both halves as one contiguous region (DMA source).
    pub fn as_dma_slice(&self) -> &[RawWord] {
        let (active, _) = self.words.split_at(self.len());
        active
    }

    /// Mutable view of both halves.
    pub fn as_mut_dma_slice(&mut self) -> &mut [RawWord] {
        let len = self.len();
        let (active, _) = self.words.split_at_mut(len);
        active
    }
}

impl Default for DoubleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::arithmetic_side_effects)] // Safety: 128 x 4 is a small constant product
const fn half_words_for(bit_depth: BitDepth) -> usize {
    BLOCK_SIZE * bit_depth.words_per_frame()
}

// ── Tests ────────────────────────────────────────────────────────────────────
