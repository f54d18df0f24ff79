//! Mock streaming engine for host-side tests
//!
//! Stands in for the I2S + DMA engine: records each `start` call, keeps a
//! snapshot of the buffer as it looked at start (so tests can check that
//! both halves were primed), and replays a script of DMA events that the
//! test feeds into the refill hand-off.

#![cfg(any(test, feature = "std"))]

use thiserror_no_std::Error;

use crate::dma_buffer::{RawWord, DOUBLE_BUFFER_WORDS};
use crate::*;

/// Failures reported by [`MockStreamingEngine::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MockEngineError {
    /// `start` was called a second time.
    #[error("streaming engine already started")]
    AlreadyStarted,
    /// The test asked the engine to refuse to start.
    #[error("streaming engine rejected start")]
    Rejected,
}

/// Mock streaming engine
pub struct MockStreamingEngine {
    starts: heapless::Vec<AudioMode, 4>,
    snapshot: heapless::Vec<RawWord, DOUBLE_BUFFER_WORDS>,
    events: heapless::Deque<DmaEvent, 32>,
    reject_start: bool,
}

impl MockStreamingEngine {
    /// Create an engine that accepts the first `start`.
    pub fn new() -> Self {
        Self {
            starts: heapless::Vec::new(),
            snapshot: heapless::Vec::new(),
            events: heapless::Deque::new(),
            reject_start: false,
        }
    }

    /// Create an engine whose `start` fails with [`MockEngineError::Rejected`].
    pub fn rejecting() -> Self {
        Self {
            reject_start: true,
            ..Self::new()
        }
    }

    /// Modes passed to every accepted `start` call.
    pub fn starts(&self) -> &[AudioMode] {
        &self.starts
    }

    /// Buffer contents (DMA region only) at the moment `start` was called.
    pub fn buffer_at_start(&self) -> &[RawWord] {
        &self.snapshot
    }

    /// Queue a DMA event for the test to replay.
    pub fn push_event(&mut self, event: DmaEvent) -> Result<(), DmaEvent> {
        self.events.push_back(event)
    }

    /// Next scripted DMA event, oldest first.
    pub fn next_event(&mut self) -> Option<DmaEvent> {
        self.events.pop_front()
    }

    /// Scripted events not yet replayed.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

impl Default for MockStreamingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingEngine for MockStreamingEngine {
    type Error = MockEngineError;

    fn start(&mut self, buffer: &mut DoubleBuffer, mode: AudioMode) -> Result<ModeConfig, Self::Error> {
        if self.reject_start {
            return Err(MockEngineError::Rejected);
        }
        if !self.starts.is_empty() {
            return Err(MockEngineError::AlreadyStarted);
        }
        self.snapshot.clear();
        self.snapshot
            .extend_from_slice(buffer.as_dma_slice())
            .map_err(|_| MockEngineError::Rejected)?;
        self.starts
            .push(mode)
            .map_err(|_| MockEngineError::AlreadyStarted)?;
        Ok(*lookup(mode))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_engine_start_returns_mode_row() {
        let mut engine = MockStreamingEngine::new();
        let mut buffer = DoubleBuffer::new();

        let config = engine.start(&mut buffer, AudioMode::Fs48kBits16).unwrap();
        assert_eq!(config.mode, AudioMode::Fs48kBits16);
        assert_eq!(engine.starts(), &[AudioMode::Fs48kBits16]);
        assert_eq!(engine.buffer_at_start().len(), buffer.len());
    }

    #[test]
    fn test_mock_engine_refuses_second_start() {
        let mut engine = MockStreamingEngine::new();
        let mut buffer = DoubleBuffer::new();

        engine.start(&mut buffer, AudioMode::Fs48kBits16).unwrap();
        assert_eq!(
            engine.start(&mut buffer, AudioMode::Fs48kBits16),
            Err(MockEngineError::AlreadyStarted)
        );
        assert_eq!(engine.starts().len(), 1);
    }

    #[test]
    fn test_mock_engine_rejecting() {
        let mut engine = MockStreamingEngine::rejecting();
        let mut buffer = DoubleBuffer::new();

        assert_eq!(
            engine.start(&mut buffer, AudioMode::Fs44k1Bits32),
            Err(MockEngineError::Rejected)
        );
        assert!(engine.starts().is_empty());
    }

    #[test]
    fn test_mock_engine_replays_events_in_order() {
        let mut engine = MockStreamingEngine::new();
        engine.push_event(DmaEvent::HalfTransfer).unwrap();
        engine.push_event(DmaEvent::TransferComplete).unwrap();

        assert_eq!(engine.next_event(), Some(DmaEvent::HalfTransfer));
        assert_eq!(engine.next_event(), Some(DmaEvent::TransferComplete));
        assert_eq!(engine.next_event(), None);
    }
}
