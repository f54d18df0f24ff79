//! PLLI2S and I2S prescaler calculations for the STM32F411 SPI/I2S peripheral.
//!
//! Every row of the mode table is derived from the formula in this module.
//! The table itself is data; this module is how the data is checked.
//!
//! # Clock Tree
//!
//!   HSE (25 MHz) -> PLLI2SM (div 25) -> PLLI2S_IN (1 MHz)
//!                                    -> VCO (x N, 100-432 MHz)
//!                                      -> PLLI2SR (div R) = I2SCLK (<= 192 MHz)
//!                                         |
//!                                      I2S prescaler (2 x DIV + ODD)
//!                                         |
//!                                      MCK / CK / WS -> external DAC
//!
//! # Sample Rate Formula (RM0383 S20.4.4)
//!
//!   MCKOE = 1:  Fs = I2SCLK / (256 x (2 x DIV + ODD))
//!   MCKOE = 0:  Fs = I2SCLK / (32  x (2 x DIV + ODD))   16-bit frame
//!               Fs = I2SCLK / (64  x (2 x DIV + ODD))   32-bit frame
//!
//! With the master clock enabled the packet length is 256 bit-clock periods
//! regardless of word length, so 16-bit and 32-bit modes share dividers.
//!
//! # Worked Example: 48 kHz, MCLK on
//!
//!   Target I2SCLK = 256 x 48 000 x 7 = 86.016 MHz
//!   N = 258, R = 3  -> I2SCLK = 86.0 MHz
//!   DIV = 3, ODD = 1 -> 2 x 3 + 1 = 7
//!   Fs = 86 000 000 / (256 x 7) = 47 991.07 Hz   (186 ppm low)
//!
//! No integer N/R pair inside the VCO limits does better at 48 kHz with MCLK
//! enabled. Synthesis must therefore run at 47 991.07 Hz, not 48 000 Hz, or
//! every tone is sharp by the same 186 ppm.
//!
//! References:
//! - STM32F411 RM0383 Rev 3, S6.3.23 (RCC_PLLI2SCFGR, N/R ranges)
//! - STM32F411 RM0383 Rev 3, S20.4.4 (I2S clock generator, Table 90)
//! - STM32F411 datasheet DS10314, Table 37 (PLLI2S VCO output range)

use thiserror_no_std::Error;

use crate::audio_mode::BitDepth;

/// PLLI2S VCO input frequency (Hz): HSE / PLLI2SM.
///
/// RM0383 recommends 2 MHz to limit jitter; 1 MHz is used so that N maps
/// directly onto MHz and the table can be checked by hand.
pub const PLLI2S_IN_HZ: u32 = 1_000_000;

/// Smallest legal PLLI2SN multiplier (RM0383 S6.3.23).
pub const PLLI2S_N_MIN: u16 = 50;

/// Largest legal PLLI2SN multiplier.
pub const PLLI2S_N_MAX: u16 = 432;

/// Smallest legal PLLI2SR post-divider.
pub const PLLI2S_R_MIN: u8 = 2;

/// Largest legal PLLI2SR post-divider.
pub const PLLI2S_R_MAX: u8 = 7;

/// Smallest legal I2SDIV prescaler value. 0 and 1 are forbidden.
pub const I2S_DIV_MIN: u8 = 2;

/// Largest legal I2SDIV prescaler value (8-bit field).
pub const I2S_DIV_MAX: u8 = 255;

/// Lowest PLLI2S VCO output (Hz), DS10314 Table 37.
pub const VCO_MIN_HZ: u32 = 100_000_000;

/// Highest PLLI2S VCO output (Hz), DS10314 Table 37.
pub const VCO_MAX_HZ: u32 = 432_000_000;

/// Highest I2SCLK (PLLI2SR output) the I2S peripheral accepts (Hz), RM0383 S6.3.23.
pub const I2S_CLOCK_MAX_HZ: u32 = 192_000_000;

/// Bit-clock periods per frame when the master clock output is enabled.
pub const MCLK_PACKET_BITS: u32 = 256;

/// Errors reported by [`ClockParams::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// PLLI2SN outside 50..=432.
    #[error("PLLI2SN multiplier {0} outside 50..=432")]
    MultiplierOutOfRange(u16),
    /// PLLI2SR outside 2..=7.
    #[error("PLLI2SR divider {0} outside 2..=7")]
    PostDividerOutOfRange(u8),
    /// I2SDIV outside 2..=255.
    #[error("I2SDIV prescaler {0} outside 2..=255")]
    PrescalerOutOfRange(u8),
    /// VCO output outside 100..=432 MHz.
    #[error("PLLI2S VCO output {0} Hz outside 100..=432 MHz")]
    VcoOutOfRange(u32),
    /// I2SCLK (VCO output / R) above 192 MHz. Carries the truncated clock in Hz.
    #[error("I2SCLK {0} Hz above 192 MHz")]
    I2sClockOutOfRange(u32),
}

/// Divider tuple applied by the streaming engine to PLLI2S and SPI_I2SPR.
///
/// Opaque to the refill loop: only the engine writes it to hardware, and
/// only the mode table and the tests interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockParams {
    /// PLLI2SN VCO multiplier.
    pub plli2s_n: u16,
    /// PLLI2SR post-divider producing I2SCLK.
    pub plli2s_r: u8,
    /// I2SDIV linear prescaler.
    pub i2s_div: u8,
    /// I2SPR.ODD: adds one to the effective prescaler.
    pub odd: bool,
    /// I2SPR.MCKOE: master clock output enabled.
    pub mckoe: bool,
}

impl ClockParams {
    /// Build a divider tuple. No validation; see [`validate`][Self::validate].
    pub const fn new(plli2s_n: u16, plli2s_r: u8, i2s_div: u8, odd: bool, mckoe: bool) -> Self {
        Self {
            plli2s_n,
            plli2s_r,
            i2s_div,
            odd,
            mckoe,
        }
    }

    /// PLLI2S VCO output in Hz.
    #[allow(clippy::arithmetic_side_effects)] // Safety: 1 MHz x u16::MAX < u32::MAX
    pub fn vco_output_hz(&self) -> u32 {
        PLLI2S_IN_HZ * u32::from(self.plli2s_n)
    }

    /// I2SCLK in Hz (VCO output / R). Not always an integer, hence `f64`.
    pub fn i2s_clock_hz(&self) -> f64 {
        f64::from(self.vco_output_hz()) / f64::from(self.plli2s_r)
    }

    /// Effective prescaler: `2 x DIV + ODD`.
    #[allow(clippy::arithmetic_side_effects)] // Safety: 2 x 255 + 1 = 511 fits u32
    pub fn prescaler(&self) -> u32 {
        2 * u32::from(self.i2s_div) + u32::from(self.odd)
    }

    /// Achieved frame rate in Hz for the given word length.
    #[allow(clippy::arithmetic_side_effects)] // Safety: 7 x 256 x 511 < u32::MAX
    pub fn sample_rate_hz(&self, bit_depth: BitDepth) -> f64 {
        let divisor = u32::from(self.plli2s_r) * packet_bits(bit_depth, self.mckoe) * self.prescaler();
        f64::from(self.vco_output_hz()) / f64::from(divisor)
    }

    /// Check every field against the RM0383 / DS10314 limits.
    pub fn validate(&self) -> Result<(), ClockError> {
        if !(PLLI2S_N_MIN..=PLLI2S_N_MAX).contains(&self.plli2s_n) {
            return Err(ClockError::MultiplierOutOfRange(self.plli2s_n));
        }
        if !(PLLI2S_R_MIN..=PLLI2S_R_MAX).contains(&self.plli2s_r) {
            return Err(ClockError::PostDividerOutOfRange(self.plli2s_r));
        }
        if self.i2s_div < I2S_DIV_MIN {
            return Err(ClockError::PrescalerOutOfRange(self.i2s_div));
        }
        let vco = self.vco_output_hz();
        if !(VCO_MIN_HZ..=VCO_MAX_HZ).contains(&vco) {
            return Err(ClockError::VcoOutOfRange(vco));
        }
        if exceeds_i2s_clock_max(vco, self.plli2s_r) {
            let i2s_clock = vco.checked_div(u32::from(self.plli2s_r)).unwrap_or(vco);
            return Err(ClockError::I2sClockOutOfRange(i2s_clock));
        }
        Ok(())
    }
}

/// `vco / r > I2S_CLOCK_MAX_HZ`, compared without dividing.
#[allow(clippy::arithmetic_side_effects)] // Safety: u32 x u8 fits u64
fn exceeds_i2s_clock_max(vco_hz: u32, plli2s_r: u8) -> bool {
    u64::from(vco_hz) > u64::from(I2S_CLOCK_MAX_HZ) * u64::from(plli2s_r)
}

/// Bit-clock periods per frame seen by the prescaler.
pub fn packet_bits(bit_depth: BitDepth, mckoe: bool) -> u32 {
    if mckoe {
        MCLK_PACKET_BITS
    } else {
        match bit_depth {
            BitDepth::Sixteen => 32,
            BitDepth::ThirtyTwo => 64,
        }
    }
}

/// Absolute distance between two rates.
pub fn rate_error_hz(achieved: f64, target: f64) -> f64 {
    if achieved > target {
        achieved - target
    } else {
        target - achieved
    }
}

/// Offline divider search: the legal (N, R, DIV, ODD) minimising
/// |achieved - target|. N/R pairs whose I2SCLK exceeds 192 MHz are skipped.
///
/// For each N/R pair the ideal prescaler is bracketed by its integer floor and
/// ceiling, so the search is O(N x R) rather than O(N x R x DIV). Ties keep
/// the first pair found (lowest N, then lowest R).
///
/// Returns `None` only when no legal prescaler exists for any N/R pair.
#[allow(clippy::arithmetic_side_effects)] // Safety: u64 products of u32-range values, divisor > 0
pub fn solve(target_hz: u32, bit_depth: BitDepth, mckoe: bool) -> Option<ClockParams> {
    if target_hz == 0 {
        return None;
    }
    let packet = u64::from(packet_bits(bit_depth, mckoe));
    let target = f64::from(target_hz);
    let mut best: Option<(ClockParams, f64)> = None;

    for n in PLLI2S_N_MIN..=PLLI2S_N_MAX {
        let vco = u64::from(PLLI2S_IN_HZ) * u64::from(n);
        if vco < u64::from(VCO_MIN_HZ) || vco > u64::from(VCO_MAX_HZ) {
            continue;
        }
        for r in PLLI2S_R_MIN..=PLLI2S_R_MAX {
            if exceeds_i2s_clock_max(PLLI2S_IN_HZ * u32::from(n), r) {
                continue;
            }
            let ideal = vco / (u64::from(r) * packet * u64::from(target_hz));
            for prescaler in [ideal, ideal + 1] {
                let div = prescaler / 2;
                if div < u64::from(I2S_DIV_MIN) || div > u64::from(I2S_DIV_MAX) {
                    continue;
                }
                let Ok(i2s_div) = u8::try_from(div) else {
                    continue;
                };
                let candidate = ClockParams::new(n, r, i2s_div, prescaler % 2 == 1, mckoe);
                let error = rate_error_hz(candidate.sample_rate_hz(bit_depth), target);
                if best.map_or(true, |(_, best_error)| error < best_error) {
                    best = Some((candidate, error));
                }
            }
        }
    }

    best.map(|(params, _)| params)
}
