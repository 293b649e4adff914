//! Conversion register decoding and threshold encoding

use crate::config::{ChipVariant, Gain, Resolution};

/// Low threshold value that keeps the lower bound of the comparator out of
/// the way when only a high threshold is wanted.
pub const LOW_THRESHOLD_DISABLED: u16 = 0x8000;

/// Turn a raw conversion register value into a signed sample.
///
/// The ADS1015 left-justifies its 12-bit result, so the register is shifted
/// right and bits 12..15 are filled from bit 11. The ADS1115 result is
/// already a full `i16`.
pub fn decode(raw: u16, bit_shift: u8) -> i16 {
    if bit_shift == 0 {
        return raw as i16;
    }

    let mut res = raw >> bit_shift;
    // Logical shift on a u16 drops the sign, put it back
    if res > 0x07FF {
        res |= 0xF000;
    }
    res as i16
}

/// Align a threshold given in ADC counts with the register's native width.
pub fn encode_threshold(threshold: i16, bit_shift: u8) -> u16 {
    (threshold as u16) << bit_shift
}

/// Volts represented by one count of the decoded result.
///
/// | Gain      | ADS1115 (16-bit) | ADS1015 (12-bit) |
/// | :---      | ---:             | ---:             |
/// | TwoThirds | 187.5µV          | 3mV              |
/// | One       | 125µV            | 2mV              |
/// | Two       | 62.5µV           | 1mV              |
/// | Four      | 31.25µV          | 0.5mV            |
/// | Eight     | 15.625µV         | 0.25mV           |
/// | Sixteen   | 7.8125µV         | 0.125mV          |
pub fn volts_per_bit(variant: &ChipVariant, gain: Gain) -> f32 {
    match (variant.resolution(), gain) {
        (Resolution::Bits16, Gain::TwoThirds) => 0.000_187_5,
        (Resolution::Bits16, Gain::One) => 0.000_125,
        (Resolution::Bits16, Gain::Two) => 0.000_062_5,
        (Resolution::Bits16, Gain::Four) => 0.000_031_25,
        (Resolution::Bits16, Gain::Eight) => 0.000_015_625,
        (Resolution::Bits16, Gain::Sixteen) => 0.000_007_812_5,
        (Resolution::Bits12, Gain::TwoThirds) => 0.003,
        (Resolution::Bits12, Gain::One) => 0.002,
        (Resolution::Bits12, Gain::Two) => 0.001,
        (Resolution::Bits12, Gain::Four) => 0.000_5,
        (Resolution::Bits12, Gain::Eight) => 0.000_25,
        (Resolution::Bits12, Gain::Sixteen) => 0.000_125,
    }
}

/// Scale a decoded sample to volts
pub fn compute_volts(counts: i16, variant: &ChipVariant, gain: Gain) -> f32 {
    f32::from(counts) * volts_per_bit(variant, gain)
}
