//! Foreground refill loop: synthesise one block into whichever half is free.
//!
//! # Timing
//!
//! One refill (generate + pack) must finish inside one block period,
//! `BLOCK_SIZE / actual_sample_rate` (2.67 ms at 48 kHz), or the DMA starts
//! reading a half that was never refilled. Missed deadlines show up in
//! [`StreamStats::underruns`].
//!
//! # Start-up
//!
//! ```text
//! configure buffer ─► prime First ─► prime Second ─► engine.start ─► poll loop
//! ```
//!
//! Both halves are filled before the engine starts, so the first samples on
//! the wire are signal, not zeros. The engine's returned `actual_sample_rate`
//! then sets the oscillator increment for every later block.

use thiserror_no_std::Error;

use platform::{AudioMode, BitDepth, BufferHalf, DoubleBuffer, ModeConfig, StreamingEngine};
use synth::{pack, Block, Oscillator, Waveform};

use super::fault::TransferFaultMonitor;
use super::handoff::RefillRequest;

pub use synth::DEFAULT_TONE_HZ;

/// Errors from [`StreamingCore::start`].
#[derive(Debug, Error)]
pub enum StartError<E: core::fmt::Debug> {
    /// Tone must be positive, finite and below half the sample rate.
    #[error("tone frequency is not in (0, fs/2)")]
    InvalidTone,
    /// The streaming engine refused to start.
    #[error("streaming engine failed to start: {0:?}")]
    Engine(E),
    /// The engine started a mode whose word length differs from the primed buffer.
    ///
    /// The engine is left running, streaming a buffer laid out for the other
    /// depth; the caller must stop it.
    #[error("engine started {started:?}, buffer was primed for {expected:?}")]
    BitDepthMismatch {
        /// Word length the buffer was configured for.
        expected: BitDepth,
        /// Word length the engine reported.
        started: BitDepth,
    },
    /// The engine reported a row for another mode than the one requested.
    ///
    /// The engine is left running; the caller must stop it.
    #[error("engine started {started:?}, {requested:?} was requested")]
    ModeMismatch {
        /// Mode passed to `start`.
        requested: AudioMode,
        /// Mode of the row the engine returned.
        started: AudioMode,
    },
}

/// Hooks around every refill, for timing the refill on a logic analyser.
///
/// ```rust,ignore
/// struct ProbePin(Output<'static>);
///
/// impl RefillProbe for ProbePin {
///     fn on_refill_start(&mut self, _half: BufferHalf) { self.0.set_high(); }
///     fn on_refill_end(&mut self, _half: BufferHalf) { self.0.set_low(); }
/// }
/// ```
pub trait RefillProbe {
    /// Called before the block is generated.
    fn on_refill_start(&mut self, half: BufferHalf);
    /// Called after the half is packed and the request completed.
    fn on_refill_end(&mut self, half: BufferHalf);
}

/// Probe that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl RefillProbe for NoProbe {
    fn on_refill_start(&mut self, _half: BufferHalf) {}
    fn on_refill_end(&mut self, _half: BufferHalf) {}
}

/// Counters as of the last poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamStats {
    /// Halves refilled since start (priming excluded).
    pub refills: u32,
    /// Requests that overwrote an unserved request.
    pub underruns: u32,
    /// DMA transfer errors.
    pub transfer_errors: u32,
    /// Samples that fell outside [-1, 1] and were saturated.
    pub clipped_samples: u32,
}

/// Refill loop state: oscillator, active mode and counters.
pub struct StreamingCore<P: RefillProbe = NoProbe> {
    oscillator: Oscillator,
    config: ModeConfig,
    increment: f32,
    block: Block,
    probe: P,
    stats: StreamStats,
    faults: TransferFaultMonitor,
}

impl StreamingCore<NoProbe> {
    /// Prime `buffer`, start `engine` once and return the refill loop.
    ///
    /// Errors other than [`StartError::InvalidTone`] and
    /// [`StartError::Engine`] are raised after the engine started, which
    /// leaves it running.
    pub fn start<E: StreamingEngine>(
        engine: &mut E,
        buffer: &mut DoubleBuffer,
        mode: AudioMode,
        tone_hz: f32,
        waveform: Waveform,
    ) -> Result<Self, StartError<E::Error>> {
        Self::start_with_probe(engine, buffer, mode, tone_hz, waveform, NoProbe)
    }
}

impl<P: RefillProbe> StreamingCore<P> {
    /// Like [`StreamingCore::start`], with a probe around every refill.
    pub fn start_with_probe<E: StreamingEngine>(
        engine: &mut E,
        buffer: &mut DoubleBuffer,
        mode: AudioMode,
        tone_hz: f32,
        waveform: Waveform,
        probe: P,
    ) -> Result<Self, StartError<E::Error>> {
        let table = *mode.config();
        if !valid_tone(&table, tone_hz) {
            return Err(StartError::InvalidTone);
        }

        buffer.configure(table.bit_depth);
        let mut streaming = Self {
            oscillator: Oscillator::new(waveform),
            increment: table.increment_for(tone_hz),
            config: table,
            block: [0.0; platform::BLOCK_SIZE],
            probe,
            stats: StreamStats::default(),
            faults: TransferFaultMonitor::new(),
        };
        streaming.fill(buffer, BufferHalf::First);
        streaming.fill(buffer, BufferHalf::Second);

        let started = engine.start(buffer, mode).map_err(StartError::Engine)?;
        if started.bit_depth != table.bit_depth {
            return Err(StartError::BitDepthMismatch {
                expected: table.bit_depth,
                started: started.bit_depth,
            });
        }
        if started.mode != mode {
            return Err(StartError::ModeMismatch {
                requested: mode,
                started: started.mode,
            });
        }
        streaming.increment = started.increment_for(tone_hz);
        streaming.config = started;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "streaming {} at {=f32} Hz, tone {=f32} Hz, increment {=f32}",
            mode,
            started.actual_sample_rate,
            tone_hz,
            streaming.increment
        );

        Ok(streaming)
    }

    /// Serve one pending request, if any.
    ///
    /// Returns the half that was refilled. With nothing pending this is a
    /// no-op: the buffer and the request are left untouched.
    pub fn poll(&mut self, request: &RefillRequest, buffer: &mut DoubleBuffer) -> Option<BufferHalf> {
        self.observe(request);
        let half = request.pending()?;

        self.probe.on_refill_start(half);
        self.fill(buffer, half);
        request.complete(half);
        self.stats.refills = self.stats.refills.wrapping_add(1);
        self.probe.on_refill_end(half);

        Some(half)
    }

    /// Busy-poll forever.
    pub fn run(&mut self, request: &RefillRequest, buffer: &mut DoubleBuffer) -> ! {
        loop {
            if self.poll(request, buffer).is_none() {
                core::hint::spin_loop();
            }
        }
    }

    /// Counters as of the last poll.
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Mode row the engine started with.
    pub fn config(&self) -> &ModeConfig {
        &self.config
    }

    /// Oscillator phase increment per sample.
    pub fn increment(&self) -> f32 {
        self.increment
    }

    /// Oscillator state.
    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }

    /// Switch waveform between blocks; phase is kept.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.oscillator.set_waveform(waveform);
    }

    /// Transfer-fault monitor, for reporting and acknowledging faults.
    pub fn faults(&mut self) -> &mut TransferFaultMonitor {
        &mut self.faults
    }

    /// The probe passed at start.
    pub fn probe(&self) -> &P {
        &self.probe
    }

    fn fill(&mut self, buffer: &mut DoubleBuffer, half: BufferHalf) {
        self.oscillator.generate(&mut self.block, self.increment);
        let packed = pack(&self.block, self.config.bit_depth, buffer.half_mut(half));
        self.stats.clipped_samples = self.stats.clipped_samples.saturating_add(packed.clipped);
    }

    fn observe(&mut self, request: &RefillRequest) {
        let underruns = request.underruns();
        if underruns != self.stats.underruns {
            #[cfg(feature = "defmt")]
            defmt::debug!("refill under-run: {=u32} total", underruns);
            self.stats.underruns = underruns;
        }

        let transfer_errors = request.transfer_errors();
        if let Some(_new_faults) = self.faults.observe(transfer_errors) {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "DMA transfer error: {=u32} new, {=u32} total; streaming continues",
                _new_faults,
                transfer_errors
            );
        }
        self.stats.transfer_errors = transfer_errors;
    }
}

/// Positive, finite and below Nyquist for the mode's true rate.
fn valid_tone(config: &ModeConfig, tone_hz: f32) -> bool {
    tone_hz.is_finite() && tone_hz > 0.0 && tone_hz < config.actual_sample_rate / 2.0
}
