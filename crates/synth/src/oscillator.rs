//! Phase-accumulator oscillator producing one block per refill.
//!
//! The accumulator is a fraction of a cycle in `[0, 1)`. Each output sample
//! is taken at the current phase, then the phase advances by
//! `increment = tone_hz / actual_sample_rate` and wraps modulo 1.0.
//!
//! # Waveforms
//!
//! | Waveform        | Shape                                    | Use                           |
//! |-----------------|------------------------------------------|-------------------------------|
//! | `Sawtooth`      | `2 * phase - 1`, no band limiting        | Test signal only (aliases)    |
//! | `ParabolicSine` | Parabola on a triangle angle + one pass  | Real-time sine, peak error    |
//! |                 | of precision shaping                     | about 1.1e-3 against `sin`    |
//!
//! The parabolic sine maps phase to an angle `a` in `(-pi, pi]`, then
//!
//! ```text
//! y   = B*a + C*a*|a|          B = 4/pi, C = -4/pi^2
//! out = P*(y*|y| - y) + y      P = 0.225
//! ```
//!
//! Only multiplies, adds and `fabsf`, so it runs on an FPU without a fast
//! `sinf`.

use core::f32::consts::PI;

use crate::{Block, Sample};

/// Parabola slope term.
const B: f32 = 4.0 / PI;
/// Parabola curvature term.
const C: f32 = -4.0 / (PI * PI);
/// Precision shaping weight.
const P: f32 = 0.225;

/// Synthesis strategy. Both produce the same external contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Waveform {
    /// Naive linear ramp from -1 to 1.
    Sawtooth,
    /// Polynomial sine approximation.
    #[default]
    ParabolicSine,
}

impl Waveform {
    /// Value of one cycle at `phase` in `[0, 1)`.
    #[inline]
    pub fn sample_at(self, phase: f32) -> Sample {
        match self {
            Self::Sawtooth => 2.0 * phase - 1.0,
            Self::ParabolicSine => {
                let angle = PI - phase * 2.0 * PI;
                let y = B * angle + C * angle * libm::fabsf(angle);
                // Rounding near the peaks lands one ulp past full scale.
                (P * (y * libm::fabsf(y) - y) + y).clamp(-1.0, 1.0)
            }
        }
    }
}

/// Persistent oscillator state.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Oscillator {
    phase: f32,
    waveform: Waveform,
}

impl Oscillator {
    /// Oscillator at phase 0.
    pub const fn new(waveform: Waveform) -> Self {
        Self {
            phase: 0.0,
            waveform,
        }
    }

    /// Start from `phase` (any value; wrapped into `[0, 1)`).
    #[must_use]
    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = wrap(phase);
        self
    }

    /// Current accumulator value in `[0, 1)`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Active synthesis strategy.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Swap strategy; the phase carries over.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Fill `block` and advance the phase by `increment` per sample.
    ///
    /// `increment` must be strictly positive.
    pub fn generate(&mut self, block: &mut Block, increment: f32) {
        debug_assert!(increment > 0.0, "oscillator increment must be positive");
        let waveform = self.waveform;
        let mut phase = self.phase;
        for out in block.iter_mut() {
            *out = waveform.sample_at(phase);
            phase += increment;
            if phase >= 1.0 {
                phase = wrap(phase);
            }
        }
        self.phase = phase;
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(Waveform::default())
    }
}

/// Fractional part, mapped into `[0, 1)`.
fn wrap(phase: f32) -> f32 {
    let fraction = phase - libm::floorf(phase);
    // A tiny negative input rounds up to exactly 1.0.
    if fraction >= 1.0 {
        0.0
    } else {
        fraction
    }
}
