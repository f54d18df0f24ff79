//! Block synthesis and I2S word packing for the refill loop.
//!
//! One refill is always the same two steps:
//!
//! ```text
//! Oscillator::generate  ->  [f32; BLOCK_SIZE]  ->  packer::pack  ->  &mut [u16] (one buffer half)
//! ```
//!
//! Both steps are pure arithmetic with no allocation and no transcendental
//! calls, so they fit inside one block period on a Cortex-M4F.
#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]

pub mod oscillator;
pub mod packer;

pub use oscillator::{Oscillator, Waveform};
pub use packer::{pack, silence, PackStats};

/// Normalised sample, nominally in `[-1.0, 1.0]`.
pub type Sample = f32;

/// One block of mono samples: fills exactly one buffer half once packed.
pub type Block = [Sample; platform::BLOCK_SIZE];

/// Tone used by the reference application (A4).
pub const DEFAULT_TONE_HZ: f32 = 440.0;
