//! Float block to raw I2S words.
//!
//! ## Word layout per sample (mono duplicated to both channels)
//!
//! ```text
//! 16-bit:  [ L ][ R ]                      L = R = trunc(s * 32767)
//! 32-bit:  [ MSB_L ][ LSB_L ][ MSB_R ][ LSB_R ]   v = trunc(s * 2^31)
//! ```
//!
//! The I2S data register is 16 bits wide, so a 32-bit frame goes out as two
//! half-words per channel. The peripheral shifts the most-significant half
//! first; swapping the halves is audible corruption, not an error.
//!
//! ## Out-of-range input
//! Float-to-int `as` casts saturate: anything above 1.0 packs as full scale,
//! anything below -1.0 as negative full scale, NaN as zero. Such samples are
//! counted in [`PackStats::clipped`].

use platform::{BitDepth, RawWord, BLOCK_SIZE};

use crate::{Block, Sample};

/// Scale for 16-bit words (`i16::MAX`).
const SCALE_16: f32 = 32_767.0;

/// Scale for 32-bit words. `i32::MAX` is not representable in `f32`; this is
/// the nearest value, 2^31, and saturation maps +1.0 onto `i32::MAX`.
#[allow(clippy::cast_precision_loss)] // Safety: rounds to exactly 2^31
const SCALE_32: f32 = i32::MAX as f32;

/// What one `pack` call observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PackStats {
    /// Samples outside `[-1.0, 1.0]` (NaN included), saturated on output.
    pub clipped: u32,
}

/// Pack `block` into `destination`, one buffer half.
///
/// # Panics
///
/// If `destination.len()` is not `BLOCK_SIZE * bit_depth.words_per_frame()`.
/// A wrong length means the caller picked the wrong half or bit depth.
#[allow(clippy::arithmetic_side_effects)] // Safety: BLOCK_SIZE x 4 is a small constant product
pub fn pack(block: &Block, bit_depth: BitDepth, destination: &mut [RawWord]) -> PackStats {
    let words_per_frame = bit_depth.words_per_frame();
    assert_eq!(
        destination.len(),
        BLOCK_SIZE * words_per_frame,
        "destination does not match one {}-bit half",
        bit_depth.bits()
    );

    let frames = block.iter().zip(destination.chunks_exact_mut(words_per_frame));
    match bit_depth {
        BitDepth::Sixteen => {
            for (&sample, frame) in frames {
                frame.fill(to_word_16(sample));
            }
        }
        BitDepth::ThirtyTwo => {
            for (&sample, frame) in frames {
                let (msb, lsb) = to_words_32(sample);
                frame.copy_from_slice(&[msb, lsb, msb, lsb]);
            }
        }
    }

    PackStats {
        clipped: count_clipped(block),
    }
}

/// Samples outside `[-1.0, 1.0]`, NaN included.
fn count_clipped(block: &Block) -> u32 {
    let clipped = block
        .iter()
        .filter(|sample| !(-1.0..=1.0).contains(*sample))
        .count();
    u32::try_from(clipped).unwrap_or(u32::MAX)
}

/// Zero-fill one buffer half.
pub fn silence(destination: &mut [RawWord]) {
    destination.fill(0);
}

/// `s * 32767`, truncated toward zero, as a raw two's-complement word.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Safety: saturating cast, then bit reinterpretation
fn to_word_16(sample: Sample) -> RawWord {
    (sample * SCALE_16) as i16 as u16
}

/// `s * 2^31`, truncated toward zero, split into (most, least) significant half-words.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Safety: saturating cast, then bit extraction
#[allow(clippy::arithmetic_side_effects)] // Safety: constant arithmetic shift of an i32
fn to_words_32(sample: Sample) -> (RawWord, RawWord) {
    let value = (sample * SCALE_32) as i32;
    ((value >> 16) as u16, value as u16)
}
