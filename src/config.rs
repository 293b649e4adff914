//! Configuration types read from and written to the ADS1015/ADS1115

use embassy_time::Duration;

/// Number of config register reads before a polled conversion gives up.
///
/// Polls are a quarter sample interval apart, so this allows two full
/// conversion periods.
pub const DEFAULT_MAX_POLLS: u16 = 8;

/// The register pointer values of the ADS1x15
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Register {
    /// Last conversion result, read only
    Conversion,
    /// Configuration word
    Config,
    /// Comparator low threshold
    LowThreshold,
    /// Comparator high threshold
    HighThreshold,
}

impl Register {
    /// The value written to the pointer register to select this register
    pub fn addr(&self) -> u8 {
        match self {
            Register::Conversion => 0x00,
            Register::Config => 0x01,
            Register::LowThreshold => 0x02,
            Register::HighThreshold => 0x03,
        }
    }
}

/// The ADS1x15 has a single ADDR pin, and the address is selected by
/// which pin it is strapped to.
///
/// | ADDR pin | Address (binary) | Address (hex, right aligned) |
/// | :---     | :---             | :---                         |
/// | GND      | `0b1001_000x`    | `0x48`                       |
/// | VDD      | `0b1001_001x`    | `0x49`                       |
/// | SDA      | `0b1001_010x`    | `0x4A`                       |
/// | SCL      | `0b1001_011x`    | `0x4B`                       |
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Address {
    /// ADDR tied to GND
    #[default]
    Gnd,
    /// ADDR tied to VDD
    Vdd,
    /// ADDR tied to SDA
    Sda,
    /// ADDR tied to SCL
    Scl,
}

impl Address {
    /// Convert into the right-aligned 7-bit address
    pub fn into_addr(&self) -> u8 {
        match self {
            Address::Gnd => 0x48,
            Address::Vdd => 0x49,
            Address::Sda => 0x4A,
            Address::Scl => 0x4B,
        }
    }
}

/// Native width of the conversion result
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Resolution {
    /// ADS1015: 12-bit result, left-justified in the 16-bit register
    Bits12,
    /// ADS1115: 16-bit result
    Bits16,
}

/// Which member of the family we are talking to.
///
/// Both chips share one register layout; they differ in how the conversion
/// register is packed, in the meaning of the data rate codes, and in how long
/// a conversion takes at the default data rate.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ChipVariant {
    resolution: Resolution,
    conversion_delay: Duration,
}

impl ChipVariant {
    /// 12-bit, up to 3300sps. 1600sps by default, so 2ms covers a conversion
    /// with room to spare.
    pub const ADS1015: Self = Self {
        resolution: Resolution::Bits12,
        conversion_delay: Duration::from_millis(2),
    };

    /// 16-bit, up to 860sps. 128sps by default, so 9ms covers a conversion.
    pub const ADS1115: Self = Self {
        resolution: Resolution::Bits16,
        conversion_delay: Duration::from_millis(9),
    };

    /// A variant with a custom delay for [ConversionWait::FixedDelay].
    ///
    /// Needed when running slower than the default data rate, otherwise the
    /// fixed delay ends before the conversion does:
    ///
    /// ```
    /// use ads1x15_async::config::{ChipVariant, DataRate, Resolution};
    ///
    /// let delay = DataRate::ADS1115_8SPS.interval(&ChipVariant::ADS1115);
    /// let slow = ChipVariant::new(Resolution::Bits16, delay);
    /// assert_eq!(slow.conversion_delay().as_millis(), 125);
    /// ```
    pub const fn new(resolution: Resolution, conversion_delay: Duration) -> Self {
        Self {
            resolution,
            conversion_delay,
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Bits the conversion and threshold registers are shifted by
    pub fn bit_shift(&self) -> u8 {
        match self.resolution {
            Resolution::Bits12 => 4,
            Resolution::Bits16 => 0,
        }
    }

    /// Worst case conversion time used by [ConversionWait::FixedDelay]
    pub fn conversion_delay(&self) -> Duration {
        self.conversion_delay
    }
}

/// How the driver waits for a single-shot conversion to finish
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConversionWait {
    /// Read the config register until the OS bit reports "not busy",
    /// sleeping a quarter of the sample interval between reads.
    ///
    /// Gives up with a timeout after `max_polls` busy reads.
    Poll { max_polls: u16 },
    /// Sleep for [ChipVariant::conversion_delay], then read the result
    /// without checking the OS bit.
    ///
    /// The built-in variants only cover the default data rate. At a slower
    /// rate, build the variant with [ChipVariant::new] and
    /// [DataRate::interval], or the previous result is returned.
    FixedDelay,
}

impl Default for ConversionWait {
    fn default() -> Self {
        ConversionWait::Poll {
            max_polls: DEFAULT_MAX_POLLS,
        }
    }
}

/// Operational status / single-shot start, bit 15
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Start {
    /// Write: 0, nothing happens
    DontStart,
    /// Write: 1, start a single conversion (when powered down)
    StartConversion,
}

/// Operational status as read back from bit 15
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OperationalStatus {
    /// Read: 0, a conversion is in progress
    Busy,
    /// Read: 1, the device is not performing a conversion
    NotBusy,
}

/// A single-ended input
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Channel {
    A0,
    A1,
    A2,
    A3,
}

impl TryFrom<u8> for Channel {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Channel::A0),
            1 => Ok(Channel::A1),
            2 => Ok(Channel::A2),
            3 => Ok(Channel::A3),
            other => Err(other),
        }
    }
}

/// A differential input pair, positive input first
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DifferentialPair {
    /// P = AIN0, N = AIN1
    P0N1,
    /// P = AIN0, N = AIN3
    P0N3,
    /// P = AIN1, N = AIN3
    P1N3,
    /// P = AIN2, N = AIN3
    P2N3,
}

/// Input multiplexer selection, bits 14:12
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Mux {
    SingleEnded(Channel),
    Differential(DifferentialPair),
}

impl Default for Mux {
    /// Power-on default of the device
    fn default() -> Self {
        Mux::Differential(DifferentialPair::P0N1)
    }
}

impl From<Channel> for Mux {
    fn from(value: Channel) -> Self {
        Mux::SingleEnded(value)
    }
}

impl From<DifferentialPair> for Mux {
    fn from(value: DifferentialPair) -> Self {
        Mux::Differential(value)
    }
}

/// Programmable gain amplifier, bits 11:9
///
/// | Gain      | Full scale range |
/// | :---      | ---:             |
/// | TwoThirds | ±6.144V          |
/// | One       | ±4.096V          |
/// | Two       | ±2.048V          |
/// | Four      | ±1.024V          |
/// | Eight     | ±0.512V          |
/// | Sixteen   | ±0.256V          |
///
/// Never drive an input above VDD + 0.3V, whatever the range says.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Gain {
    /// R/W: 000
    #[default]
    TwoThirds,
    /// R/W: 001
    One,
    /// R/W: 010
    Two,
    /// R/W: 011
    Four,
    /// R/W: 100
    Eight,
    /// R/W: 101, also read as 110 and 111
    Sixteen,
}

impl Gain {
    /// Full scale range in volts
    pub fn full_scale_volts(&self) -> f32 {
        match self {
            Gain::TwoThirds => 6.144,
            Gain::One => 4.096,
            Gain::Two => 2.048,
            Gain::Four => 1.024,
            Gain::Eight => 0.512,
            Gain::Sixteen => 0.256,
        }
    }
}

/// Conversion mode, bit 8
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConversionMode {
    /// R/W: 0
    Continuous,
    /// R/W: 1, power-down single-shot
    SingleShot,
}

/// Data rate, bits 7:5.
///
/// The same 3-bit code means a different rate on each chip, so the rates are
/// named for the chip they belong to. Use the constants for your part.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DataRate(u8);

impl DataRate {
    pub const ADS1015_128SPS: Self = Self(0b000);
    pub const ADS1015_250SPS: Self = Self(0b001);
    pub const ADS1015_490SPS: Self = Self(0b010);
    pub const ADS1015_920SPS: Self = Self(0b011);
    pub const ADS1015_1600SPS: Self = Self(0b100);
    pub const ADS1015_2400SPS: Self = Self(0b101);
    pub const ADS1015_3300SPS: Self = Self(0b110);

    pub const ADS1115_8SPS: Self = Self(0b000);
    pub const ADS1115_16SPS: Self = Self(0b001);
    pub const ADS1115_32SPS: Self = Self(0b010);
    pub const ADS1115_64SPS: Self = Self(0b011);
    pub const ADS1115_128SPS: Self = Self(0b100);
    pub const ADS1115_250SPS: Self = Self(0b101);
    pub const ADS1115_475SPS: Self = Self(0b110);
    pub const ADS1115_860SPS: Self = Self(0b111);

    /// 1600sps on the ADS1015, 128sps on the ADS1115
    pub const DEFAULT: Self = Self(0b100);

    /// The 3-bit field value
    pub fn code(&self) -> u8 {
        self.0
    }

    /// Samples per second for this code on the given chip
    pub fn samples_per_second(&self, variant: &ChipVariant) -> u16 {
        match variant.resolution() {
            Resolution::Bits12 => match self.0 {
                0b000 => 128,
                0b001 => 250,
                0b010 => 490,
                0b011 => 920,
                0b100 => 1600,
                0b101 => 2400,
                _ => 3300,
            },
            Resolution::Bits16 => match self.0 {
                0b000 => 8,
                0b001 => 16,
                0b010 => 32,
                0b011 => 64,
                0b100 => 128,
                0b101 => 250,
                0b110 => 475,
                _ => 860,
            },
        }
    }

    /// Get the interval between samples as a [`Duration`].
    pub fn interval(&self, variant: &ChipVariant) -> Duration {
        let sps = u64::from(self.samples_per_second(variant));
        Duration::from_micros(1_000_000_u64.div_ceil(sps))
    }

    /// Get 1/4 of the interval between samples as a [`Duration`].
    pub fn quarter_interval(&self, variant: &ChipVariant) -> Duration {
        let sps = u64::from(self.samples_per_second(variant));
        Duration::from_micros(250_000_u64.div_ceil(sps))
    }
}

impl Default for DataRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Comparator mode, bit 4
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ComparatorMode {
    /// R/W: 0, with hysteresis
    Traditional,
    /// R/W: 1
    Window,
}

/// ALERT/RDY polarity, bit 3
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ComparatorPolarity {
    /// R/W: 0
    ActiveLow,
    /// R/W: 1
    ActiveHigh,
}

/// Whether ALERT/RDY stays asserted until the conversion register is read, bit 2
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ComparatorLatch {
    /// R/W: 0
    NonLatching,
    /// R/W: 1
    Latching,
}

/// Comparator queue, bits 1:0
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ComparatorQueue {
    /// R/W: 00, assert after one conversion
    One,
    /// R/W: 01, assert after two conversions
    Two,
    /// R/W: 10, assert after four conversions
    Four,
    /// R/W: 11, comparator off, ALERT/RDY high impedance
    Disabled,
}

/// The four comparator fields of the config word
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ComparatorSettings {
    pub mode: ComparatorMode,
    pub polarity: ComparatorPolarity,
    pub latch: ComparatorLatch,
    pub queue: ComparatorQueue,
}

impl ComparatorSettings {
    /// Comparator off. Used for every plain conversion.
    pub const DISABLED: Self = Self {
        mode: ComparatorMode::Traditional,
        polarity: ComparatorPolarity::ActiveLow,
        latch: ComparatorLatch::NonLatching,
        queue: ComparatorQueue::Disabled,
    };

    /// ALERT/RDY as a conversion-ready output. Only takes effect once the
    /// high threshold's MSB is set and the low threshold's MSB is clear, see
    /// [crate::Ads1x15::start_adc_reading_with_ready].
    pub const READY: Self = Self {
        mode: ComparatorMode::Traditional,
        polarity: ComparatorPolarity::ActiveLow,
        latch: ComparatorLatch::NonLatching,
        queue: ComparatorQueue::One,
    };

    /// Assert on the first conversion that crosses the threshold, and hold
    /// ALERT/RDY low until the conversion register is read.
    pub const fn latching(mode: ComparatorMode) -> Self {
        Self {
            mode,
            polarity: ComparatorPolarity::ActiveLow,
            latch: ComparatorLatch::Latching,
            queue: ComparatorQueue::One,
        }
    }
}

impl Default for ComparatorSettings {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// Per-instance settings applied to every conversion the driver starts
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Settings {
    pub gain: Gain,
    pub data_rate: DataRate,
    pub wait: ConversionWait,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct WriteSettings {
    pub start: Start,
    pub mux: Mux,
    pub pga: Gain,
    pub mode: ConversionMode,
    pub dr: DataRate,
    pub comparator: ComparatorSettings,
}

impl Default for WriteSettings {
    /// The power-on value of the config register, `0x8583`
    fn default() -> Self {
        Self {
            start: Start::DontStart,
            mux: Mux::default(),
            pga: Gain::Two,
            mode: ConversionMode::SingleShot,
            dr: DataRate::DEFAULT,
            comparator: ComparatorSettings::DISABLED,
        }
    }
}

impl WriteSettings {
    /// Start one conversion on `mux`, comparator disabled
    pub fn single_shot(mux: Mux, pga: Gain, dr: DataRate) -> Self {
        Self {
            start: Start::StartConversion,
            mux,
            pga,
            mode: ConversionMode::SingleShot,
            dr,
            comparator: ComparatorSettings::DISABLED,
        }
    }

    /// Convert `mux` continuously. The start bit is left clear.
    pub fn continuous(
        mux: Mux,
        pga: Gain,
        dr: DataRate,
        comparator: ComparatorSettings,
    ) -> Self {
        Self {
            start: Start::DontStart,
            mux,
            pga,
            mode: ConversionMode::Continuous,
            dr,
            comparator,
        }
    }

    pub fn to_value(&self) -> u16 {
        let mut output = 0u16;
        output |= match self.start {
            Start::DontStart => 0x0000,
            Start::StartConversion => 0x8000,
        };
        output |= match self.mux {
            Mux::Differential(DifferentialPair::P0N1) => 0x0000,
            Mux::Differential(DifferentialPair::P0N3) => 0x1000,
            Mux::Differential(DifferentialPair::P1N3) => 0x2000,
            Mux::Differential(DifferentialPair::P2N3) => 0x3000,
            Mux::SingleEnded(Channel::A0) => 0x4000,
            Mux::SingleEnded(Channel::A1) => 0x5000,
            Mux::SingleEnded(Channel::A2) => 0x6000,
            Mux::SingleEnded(Channel::A3) => 0x7000,
        };
        output |= match self.pga {
            Gain::TwoThirds => 0x0000,
            Gain::One => 0x0200,
            Gain::Two => 0x0400,
            Gain::Four => 0x0600,
            Gain::Eight => 0x0800,
            Gain::Sixteen => 0x0A00,
        };
        output |= match self.mode {
            ConversionMode::Continuous => 0x0000,
            ConversionMode::SingleShot => 0x0100,
        };
        output |= u16::from(self.dr.code()) << 5;
        output |= match self.comparator.mode {
            ComparatorMode::Traditional => 0x0000,
            ComparatorMode::Window => 0x0010,
        };
        output |= match self.comparator.polarity {
            ComparatorPolarity::ActiveLow => 0x0000,
            ComparatorPolarity::ActiveHigh => 0x0008,
        };
        output |= match self.comparator.latch {
            ComparatorLatch::NonLatching => 0x0000,
            ComparatorLatch::Latching => 0x0004,
        };
        output |= match self.comparator.queue {
            ComparatorQueue::One => 0x0000,
            ComparatorQueue::Two => 0x0001,
            ComparatorQueue::Four => 0x0002,
            ComparatorQueue::Disabled => 0x0003,
        };
        output
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ReadSettings {
    pub os: OperationalStatus,
    pub mux: Mux,
    pub pga: Gain,
    pub mode: ConversionMode,
    pub dr: DataRate,
    pub comparator: ComparatorSettings,
}

impl From<u16> for ReadSettings {
    fn from(value: u16) -> Self {
        let os = if (value & 0x8000) == 0 {
            OperationalStatus::Busy
        } else {
            OperationalStatus::NotBusy
        };

        let mux = match (value >> 12) & 0b111 {
            0b000 => Mux::Differential(DifferentialPair::P0N1),
            0b001 => Mux::Differential(DifferentialPair::P0N3),
            0b010 => Mux::Differential(DifferentialPair::P1N3),
            0b011 => Mux::Differential(DifferentialPair::P2N3),
            0b100 => Mux::SingleEnded(Channel::A0),
            0b101 => Mux::SingleEnded(Channel::A1),
            0b110 => Mux::SingleEnded(Channel::A2),
            _ => Mux::SingleEnded(Channel::A3),
        };

        let pga = match (value >> 9) & 0b111 {
            0b000 => Gain::TwoThirds,
            0b001 => Gain::One,
            0b010 => Gain::Two,
            0b011 => Gain::Four,
            0b100 => Gain::Eight,
            _ => Gain::Sixteen,
        };

        let mode = if (value & 0x0100) == 0 {
            ConversionMode::Continuous
        } else {
            ConversionMode::SingleShot
        };

        let dr = DataRate(((value >> 5) & 0b111) as u8);

        let comparator = ComparatorSettings {
            mode: if (value & 0x0010) == 0 {
                ComparatorMode::Traditional
            } else {
                ComparatorMode::Window
            },
            polarity: if (value & 0x0008) == 0 {
                ComparatorPolarity::ActiveLow
            } else {
                ComparatorPolarity::ActiveHigh
            },
            latch: if (value & 0x0004) == 0 {
                ComparatorLatch::NonLatching
            } else {
                ComparatorLatch::Latching
            },
            queue: match value & 0b11 {
                0b00 => ComparatorQueue::One,
                0b01 => ComparatorQueue::Two,
                0b10 => ComparatorQueue::Four,
                _ => ComparatorQueue::Disabled,
            },
        };

        Self {
            os,
            mux,
            pga,
            mode,
            dr,
            comparator,
        }
    }
}
