//! I2S DMA streaming firmware core
//!
//! Keeps a circular DMA double buffer fed with synthesised audio on an
//! STM32F411, busy-polling a refill request raised by the DMA interrupt.
//!
//! # Architecture
//!
//! ```text
//! DMA interrupt (engine)  ──on_half_complete / on_full_complete──►  RefillRequest
//!                                                                        │
//! Foreground loop: StreamingCore::poll ◄─────────── pending() ───────────┘
//!         ↓
//! Oscillator::generate → pack → DoubleBuffer half
//! ```
//!
//! # Features
//!
//! - `defmt` - Structured logging at stream start, per under-run and per transfer fault
//! - `std` - Enable standard library (host tests, mock engine)

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(unsafe_op_in_unsafe_fn)]
// unsafe fn body is not implicitly unsafe block
// Logging discipline
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)] // common in Rust crates; not a real issue
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]

pub mod audio;

// Re-export key types
pub use audio::{RefillRequest, StreamStats, StreamingCore};
pub use platform::DEFAULT_MODE;
