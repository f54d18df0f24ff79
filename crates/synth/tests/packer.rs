//! Packer layout and quantisation tests.
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::arithmetic_side_effects)]

use platform::{BitDepth, BufferHalf, DoubleBuffer, BLOCK_SIZE};
use synth::{pack, silence, Block};

/// Rebuild the signed 32-bit value from an (MSB, LSB) pair.
fn join(msb: u16, lsb: u16) -> i32 {
    ((u32::from(msb) << 16) | u32::from(lsb)) as i32
}

proptest::proptest! {
    /// 16-bit: both channel words equal s * 32767 to within one LSB of rounding.
    #[test]
    fn sixteen_bit_words_match_rounded_scale(s in -1.0f32..=1.0f32) {
        let block: Block = [s; BLOCK_SIZE];
        let mut out = [0u16; BLOCK_SIZE * 2];
        let stats = pack(&block, BitDepth::Sixteen, &mut out);
        assert_eq!(stats.clipped, 0);

        let rounded = (f64::from(s) * 32_767.0).round();
        for frame in out.chunks_exact(2) {
            assert_eq!(frame[0], frame[1], "left and right differ");
            let word = f64::from(frame[0] as i16);
            assert!((word - rounded).abs() <= 1.0, "s={s} word={word} rounded={rounded}");
        }
    }

    /// 32-bit: left and right pairs are identical and rescale back to s.
    #[test]
    fn thirty_two_bit_pairs_reconstruct_sample(s in -1.0f32..=1.0f32) {
        let block: Block = [s; BLOCK_SIZE];
        let mut out = [0u16; BLOCK_SIZE * 4];
        pack(&block, BitDepth::ThirtyTwo, &mut out);

        for frame in out.chunks_exact(4) {
            assert_eq!(frame[0], frame[2], "MSB differs between channels");
            assert_eq!(frame[1], frame[3], "LSB differs between channels");
            let value = join(frame[0], frame[1]);
            let rescaled = f64::from(value) / 2_147_483_648.0;
            assert!((rescaled - f64::from(s)).abs() <= 1.0 / 2_147_483_648.0,
                "s={s} value={value:#010x}");
        }
    }

    /// Samples outside [-1, 1] are always counted and never wrap sign.
    #[test]
    fn out_of_range_saturates_with_sign(s in 1.0001f32..100.0f32, negative in proptest::bool::ANY) {
        let value = if negative { -s } else { s };
        let block: Block = [value; BLOCK_SIZE];
        let mut out = [0u16; BLOCK_SIZE * 4];
        let stats = pack(&block, BitDepth::ThirtyTwo, &mut out);
        assert_eq!(stats.clipped as usize, BLOCK_SIZE);
        let joined = join(out[0], out[1]);
        assert_eq!(joined, if negative { i32::MIN } else { i32::MAX });
    }
}

// ── Known words ─────────────────────────────────────────────────────────────

#[test]
fn full_scale_32_bit_words() {
    let block: Block = [1.0; BLOCK_SIZE];
    let mut out = [0u16; BLOCK_SIZE * 4];
    pack(&block, BitDepth::ThirtyTwo, &mut out);
    for frame in out.chunks_exact(4) {
        assert_eq!(frame, &[0x7FFF, 0xFFFF, 0x7FFF, 0xFFFF]);
    }
}

#[test]
fn full_scale_16_bit_words() {
    let block: Block = [1.0; BLOCK_SIZE];
    let mut out = [0u16; BLOCK_SIZE * 2];
    pack(&block, BitDepth::Sixteen, &mut out);
    assert!(out.iter().all(|&w| w == 0x7FFF));
}

#[test]
fn samples_land_in_order() {
    let block: Block = core::array::from_fn(|i| i as f32 / BLOCK_SIZE as f32);
    let mut out = [0u16; BLOCK_SIZE * 2];
    pack(&block, BitDepth::Sixteen, &mut out);
    let lefts: Vec<i16> = out.chunks_exact(2).map(|f| f[0] as i16).collect();
    assert!(lefts.windows(2).all(|w| w[0] < w[1]));
}

// ── Buffer halves ───────────────────────────────────────────────────────────

#[test]
fn packing_second_half_leaves_first_untouched() {
    let mut buffer = DoubleBuffer::new();
    buffer.configure(BitDepth::ThirtyTwo);
    buffer.half_mut(BufferHalf::First).fill(0x1234);

    let block: Block = [-0.75; BLOCK_SIZE];
    pack(&block, BitDepth::ThirtyTwo, buffer.half_mut(BufferHalf::Second));

    assert!(buffer.half(BufferHalf::First).iter().all(|&w| w == 0x1234));
    assert_eq!(buffer.half(BufferHalf::Second)[0], 0xA000);
}

#[test]
fn silence_clears_one_half() {
    let mut buffer = DoubleBuffer::new();
    buffer.as_mut_dma_slice().fill(0xFFFF);
    silence(buffer.half_mut(BufferHalf::Second));
    assert!(buffer.half(BufferHalf::First).iter().all(|&w| w == 0xFFFF));
    assert!(buffer.half(BufferHalf::Second).iter().all(|&w| w == 0));
}

#[test]
#[should_panic(expected = "destination does not match")]
fn sixteen_bit_block_into_thirty_two_bit_half_panics() {
    let mut buffer = DoubleBuffer::new();
    buffer.configure(BitDepth::ThirtyTwo);
    let block: Block = [0.0; BLOCK_SIZE];
    pack(&block, BitDepth::Sixteen, buffer.half_mut(BufferHalf::First));
}
