//! Hardware-independent types for the I2S DMA streaming pipeline.
//!
//! This crate holds everything the refill loop needs to know about the
//! hardware without touching a register:
//!
//! ```text
//! Refill loop (firmware crate)
//!         ↓
//! Synthesis + packing (synth crate)
//!         ↓
//! Platform types (this crate - modes, clocks, buffer, engine trait)
//!         ↓
//! Streaming engine (external: I2S + DMA bring-up)
//! ```
//!
//! # Modules
//!
//! - [`audio_mode`] - Mode table: per-mode divider parameters and true sample rate
//! - [`clock_math`] - PLLI2S / I2S prescaler formula, limits and offline solver
//! - [`dma_buffer`] - Circular double buffer split into two refillable halves
//! - [`streaming`] - Contract toward the external streaming engine
//! - [`mocks`] - Host-side engine mock (tests and `std` feature only)
//!
//! # Features
//!
//! - `std`: Enable the host-side mocks outside of `cargo test`
//! - `defmt`: Derive `defmt::Format` on public types

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
// Pedantic lints suppressed for this hardware crate:
#![allow(clippy::doc_markdown)] // register and peripheral names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod audio_mode;
pub mod clock_math;
pub mod dma_buffer;
pub mod streaming;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export the types every consumer touches
pub use audio_mode::{
    lookup, AudioMode, BitDepth, ModeConfig, ModeError, DEFAULT_MODE, MODE_TABLE,
};
pub use clock_math::{ClockError, ClockParams};
pub use dma_buffer::{BufferHalf, DoubleBuffer, RawWord, BLOCK_SIZE};
pub use streaming::{DmaEvent, StreamingEngine};
