//! Audio streaming core: interrupt hand-off, refill loop, fault monitor.
//!
//! # Structure
//!
//! - `handoff` - `RefillRequest`, the single-byte slot the DMA interrupt writes
//! - `refill` - `StreamingCore`, the foreground loop that serves it
//! - `fault` - `TransferFaultMonitor`, turns transfer-error counts into state
//!
//! # Wiring
//!
//! The streaming engine is injected at start; the request lives in a static
//! shared with the DMA interrupt handler:
//!
//! ```rust,ignore
//! static REQUEST: RefillRequest = RefillRequest::new();
//!
//! let mut streaming = StreamingCore::start(&mut engine, buffer, DEFAULT_MODE, DEFAULT_TONE_HZ, Waveform::ParabolicSine)?;
//! streaming.run(&REQUEST, buffer);
//! ```

pub mod fault;
pub mod handoff;
pub mod refill;

pub use fault::{FaultState, TransferFaultMonitor};
pub use handoff::{RefillRequest, RefillState};
pub use refill::{
    NoProbe, RefillProbe, StartError, StreamStats, StreamingCore, DEFAULT_TONE_HZ,
};
