//! Audio mode table: clock dividers and true sample rate per streaming mode.
//!
//! The table is a build-time constant indexed by [`AudioMode`]. It is read
//! once, at stream start, by the streaming engine (which applies
//! [`ClockParams`] to hardware) and by the refill loop (which needs
//! [`ModeConfig::actual_sample_rate`] to compute oscillator increments).
//!
//! # Table (PLLI2S_IN = 1 MHz)
//!
//! | Mode              | Bits | N   | R | DIV | ODD | MCKOE | Actual Fs (Hz) |
//! |-------------------|------|-----|---|-----|-----|-------|----------------|
//! | `Fs44k1Bits16`    | 16   | 302 | 2 | 53  | 1   | 0     | 44 100.467     |
//! | `Fs48kBits16`     | 16   | 192 | 5 | 12  | 1   | 0     | 48 000.000     |
//! | `Fs44k1Bits16Mclk`| 16   | 271 | 2 | 6   | 0   | 1     | 44 108.073     |
//! | `Fs48kBits16Mclk` | 16   | 258 | 3 | 3   | 1   | 1     | 47 991.071     |
//! | `Fs44k1Bits32`    | 32   | 429 | 4 | 19  | 0   | 0     | 44 099.507     |
//! | `Fs48kBits32`     | 32   | 384 | 5 | 12  | 1   | 0     | 48 000.000     |
//! | `Fs44k1Bits32Mclk`| 32   | 271 | 2 | 6   | 0   | 1     | 44 108.073     |
//! | `Fs48kBits32Mclk` | 32   | 258 | 3 | 3   | 1   | 1     | 47 991.071     |
//!
//! Every row keeps I2SCLK at or below 192 MHz. Under that ceiling the best
//! 44.1 kHz MCLK setting is N=271, R=2, DIV=6, ODD=0 at 44 108 Hz, 183 ppm
//! sharp. Closer dividers exist (N=429, R=2, DIV=9, ODD=1 is 11 ppm flat)
//! but need a 214.5 MHz I2SCLK.
//!
//! Rows are re-derived with [`crate::clock_math::solve`] and checked against
//! the formula in `tests/mode_table.rs`. Re-run those tests whenever the
//! board's HSE, PLLI2SM or a target rate changes.

use thiserror_no_std::Error;

use crate::clock_math::ClockParams;
use crate::dma_buffer::BLOCK_SIZE;

/// Errors when selecting a mode or bit depth from a raw configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeError {
    /// Numeric mode selector has no row in the table.
    #[error("no audio mode with index {0}")]
    UnknownMode(u8),
    /// Word length other than 16 or 32 bits.
    #[error("unsupported bit depth {0}")]
    UnsupportedBitDepth(u8),
}

/// Word length on the I2S bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitDepth {
    /// 16-bit words; one `u16` per channel.
    Sixteen,
    /// 32-bit words (24 significant bits on the bus); two `u16` per channel,
    /// most-significant half first.
    ThirtyTwo,
}

impl BitDepth {
    /// Word length in bits.
    pub const fn bits(self) -> u8 {
        match self {
            Self::Sixteen => 16,
            Self::ThirtyTwo => 32,
        }
    }

    /// `u16` DMA words per stereo frame: 2 (16-bit) or 4 (32-bit).
    pub const fn words_per_frame(self) -> usize {
        match self {
            Self::Sixteen => 2,
            Self::ThirtyTwo => 4,
        }
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = ModeError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            16 => Ok(Self::Sixteen),
            32 => Ok(Self::ThirtyTwo),
            other => Err(ModeError::UnsupportedBitDepth(other)),
        }
    }
}

/// Streaming mode selector: one row of [`MODE_TABLE`].
///
/// `Mclk` variants enable the master clock output (MCKOE) for DACs that need
/// a 256 x fs system clock; the fixed 256-period packet makes those rates
/// less exact than the plain variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AudioMode {
    /// 44.1 kHz, 16-bit, no MCLK.
    Fs44k1Bits16 = 0,
    /// 48 kHz, 16-bit, no MCLK.
    Fs48kBits16 = 1,
    /// 44.1 kHz, 16-bit, MCLK out.
    Fs44k1Bits16Mclk = 2,
    /// 48 kHz, 16-bit, MCLK out.
    Fs48kBits16Mclk = 3,
    /// 44.1 kHz, 32-bit, no MCLK.
    Fs44k1Bits32 = 4,
    /// 48 kHz, 32-bit, no MCLK.
    Fs48kBits32 = 5,
    /// 44.1 kHz, 32-bit, MCLK out.
    Fs44k1Bits32Mclk = 6,
    /// 48 kHz, 32-bit, MCLK out.
    Fs48kBits32Mclk = 7,
}

/// Mode used by the reference application (CS43L22-style DAC needing MCLK).
pub const DEFAULT_MODE: AudioMode = AudioMode::Fs48kBits32Mclk;

impl AudioMode {
    /// Every mode, in table order.
    pub const ALL: [AudioMode; 8] = [
        Self::Fs44k1Bits16,
        Self::Fs48kBits16,
        Self::Fs44k1Bits16Mclk,
        Self::Fs48kBits16Mclk,
        Self::Fs44k1Bits32,
        Self::Fs48kBits32,
        Self::Fs44k1Bits32Mclk,
        Self::Fs48kBits32Mclk,
    ];

    /// Select a mode from a numeric configuration value.
    pub const fn from_index(index: u8) -> Result<Self, ModeError> {
        match index {
            0 => Ok(Self::Fs44k1Bits16),
            1 => Ok(Self::Fs48kBits16),
            2 => Ok(Self::Fs44k1Bits16Mclk),
            3 => Ok(Self::Fs48kBits16Mclk),
            4 => Ok(Self::Fs44k1Bits32),
            5 => Ok(Self::Fs48kBits32),
            6 => Ok(Self::Fs44k1Bits32Mclk),
            7 => Ok(Self::Fs48kBits32Mclk),
            other => Err(ModeError::UnknownMode(other)),
        }
    }

    /// The table row for this mode.
    pub const fn config(self) -> &'static ModeConfig {
        match self {
            Self::Fs44k1Bits16 => &FS44K1_BITS16,
            Self::Fs48kBits16 => &FS48K_BITS16,
            Self::Fs44k1Bits16Mclk => &FS44K1_BITS16_MCLK,
            Self::Fs48kBits16Mclk => &FS48K_BITS16_MCLK,
            Self::Fs44k1Bits32 => &FS44K1_BITS32,
            Self::Fs48kBits32 => &FS48K_BITS32,
            Self::Fs44k1Bits32Mclk => &FS44K1_BITS32_MCLK,
            Self::Fs48kBits32Mclk => &FS48K_BITS32_MCLK,
        }
    }
}

/// One row of the mode table.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeConfig {
    /// Selector this row belongs to.
    pub mode: AudioMode,
    /// Word length on the bus.
    pub bit_depth: BitDepth,
    /// Divider tuple for the streaming engine.
    pub clock: ClockParams,
    /// Rate the mode is named after (Hz).
    pub nominal_rate_hz: u32,
    /// Rate the dividers actually produce (Hz).
    ///
    /// Use this, never `nominal_rate_hz`, for oscillator increments.
    pub actual_sample_rate: f32,
}

impl ModeConfig {
    /// Oscillator phase increment per sample for a tone at `tone_hz`.
    pub fn increment_for(&self, tone_hz: f32) -> f32 {
        tone_hz / self.actual_sample_rate
    }

    /// `u16` DMA words in one buffer half for this mode.
    #[allow(clippy::arithmetic_side_effects)] // Safety: 128 x 4 is a small constant product
    pub const fn half_words(&self) -> usize {
        BLOCK_SIZE * self.bit_depth.words_per_frame()
    }

    /// Duration of one block (one buffer half) in microseconds: the refill deadline.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Safety: ~2.9 ms fits u32
    #[allow(clippy::cast_precision_loss)] // Safety: BLOCK_SIZE = 128 is exact in f32
    pub fn block_period_us(&self) -> u32 {
        (BLOCK_SIZE as f32 * 1_000_000.0 / self.actual_sample_rate) as u32
    }
}

/// Look up the table row for `mode`.
pub const fn lookup(mode: AudioMode) -> &'static ModeConfig {
    mode.config()
}

const MCLK_44K1: ClockParams = ClockParams::new(271, 2, 6, false, true);
const MCLK_48K: ClockParams = ClockParams::new(258, 3, 3, true, true);

const FS44K1_BITS16: ModeConfig = ModeConfig {
    mode: AudioMode::Fs44k1Bits16,
    bit_depth: BitDepth::Sixteen,
    clock: ClockParams::new(302, 2, 53, true, false),
    nominal_rate_hz: 44_100,
    actual_sample_rate: 44_100.467,
};

const FS48K_BITS16: ModeConfig = ModeConfig {
    mode: AudioMode::Fs48kBits16,
    bit_depth: BitDepth::Sixteen,
    clock: ClockParams::new(192, 5, 12, true, false),
    nominal_rate_hz: 48_000,
    actual_sample_rate: 48_000.0,
};

const FS44K1_BITS16_MCLK: ModeConfig = ModeConfig {
    mode: AudioMode::Fs44k1Bits16Mclk,
    bit_depth: BitDepth::Sixteen,
    clock: MCLK_44K1,
    nominal_rate_hz: 44_100,
    actual_sample_rate: 44_108.073,
};

const FS48K_BITS16_MCLK: ModeConfig = ModeConfig {
    mode: AudioMode::Fs48kBits16Mclk,
    bit_depth: BitDepth::Sixteen,
    clock: MCLK_48K,
    nominal_rate_hz: 48_000,
    actual_sample_rate: 47_991.071,
};

const FS44K1_BITS32: ModeConfig = ModeConfig {
    mode: AudioMode::Fs44k1Bits32,
    bit_depth: BitDepth::ThirtyTwo,
    clock: ClockParams::new(429, 4, 19, false, false),
    nominal_rate_hz: 44_100,
    actual_sample_rate: 44_099.507,
};

const FS48K_BITS32: ModeConfig = ModeConfig {
    mode: AudioMode::Fs48kBits32,
    bit_depth: BitDepth::ThirtyTwo,
    clock: ClockParams::new(384, 5, 12, true, false),
    nominal_rate_hz: 48_000,
    actual_sample_rate: 48_000.0,
};

const FS44K1_BITS32_MCLK: ModeConfig = ModeConfig {
    mode: AudioMode::Fs44k1Bits32Mclk,
    bit_depth: BitDepth::ThirtyTwo,
    clock: MCLK_44K1,
    nominal_rate_hz: 44_100,
    actual_sample_rate: 44_108.073,
};

const FS48K_BITS32_MCLK: ModeConfig = ModeConfig {
    mode: AudioMode::Fs48kBits32Mclk,
    bit_depth: BitDepth::ThirtyTwo,
    clock: MCLK_48K,
    nominal_rate_hz: 48_000,
    actual_sample_rate: 47_991.071,
};

/// Every supported mode, in [`AudioMode`] discriminant order.
pub const MODE_TABLE: [ModeConfig; 8] = [
    FS44K1_BITS16,
    FS48K_BITS16,
    FS44K1_BITS16_MCLK,
    FS48K_BITS16_MCLK,
    FS44K1_BITS32,
    FS48K_BITS32,
    FS44K1_BITS32_MCLK,
    FS48K_BITS32_MCLK,
];
