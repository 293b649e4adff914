use ads1x15_async::config::{
    Address, Channel, ChipVariant, ComparatorLatch, ComparatorMode, ComparatorQueue,
    ConversionMode, ConversionWait, DataRate, DifferentialPair, Gain, Mux, OperationalStatus,
    Resolution, DEFAULT_MAX_POLLS,
};
use ads1x15_async::{Ads1x15, Error};
use embassy_futures::block_on;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::ErrorKind;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

const ADDR: u8 = 0x48;

/// Records every requested sleep, in microseconds, and returns immediately
#[derive(Default)]
struct RecordingDelay {
    sleeps_us: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.sleeps_us.push(ns / 1_000);
    }

    async fn delay_us(&mut self, us: u32) {
        self.sleeps_us.push(us);
    }
}

fn write_reg(reg: u8, value: u16) -> I2cTransaction {
    let [hi, lo] = value.to_be_bytes();
    I2cTransaction::write(ADDR, vec![reg, hi, lo])
}

fn read_reg(reg: u8, value: u16) -> I2cTransaction {
    I2cTransaction::write_read(ADDR, vec![reg], value.to_be_bytes().to_vec())
}

fn finish(adc: Ads1x15<I2cMock, RecordingDelay>) -> Vec<u32> {
    let (mut i2c, delay) = adc.release();
    i2c.done();
    delay.sleeps_us
}

#[test]
fn ads1115_single_ended_read_polls_until_not_busy() {
    // OS | AIN0 | ±4.096V | single-shot | 128sps | comparator off
    let config = 0x8000 | 0x4000 | 0x0200 | 0x0100 | 0x0080 | 0x0003;
    let expectations = [
        write_reg(0x01, config),
        read_reg(0x01, config & 0x7FFF),
        read_reg(0x01, config),
        read_reg(0x00, 0x1234),
    ];
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1115(i2c, RecordingDelay::default(), Address::default());
    adc.set_gain(Gain::One);

    let value = block_on(adc.read_single_ended(0)).unwrap();
    assert_eq!(value, 0x1234);

    // One quarter of a 128sps period between the two polls
    assert_eq!(finish(adc), vec![1_954]);
}

#[test]
fn ads1015_fixed_delay_sign_extends() {
    // OS | AIN1 | ±6.144V | single-shot | 1600sps | comparator off
    let config = 0x8000 | 0x5000 | 0x0100 | 0x0080 | 0x0003;
    let expectations = [write_reg(0x01, config), read_reg(0x00, 0x8000)];
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1015(i2c, RecordingDelay::default(), Address::Gnd);
    adc.set_wait(ConversionWait::FixedDelay);

    assert_eq!(block_on(adc.read_single_ended(1)).unwrap(), -2048);
    assert_eq!(finish(adc), vec![2_000]);
}

#[test]
fn ads1115_fixed_delay_is_longer() {
    let config = 0x8000 | 0x7000 | 0x0100 | 0x0080 | 0x0003;
    let expectations = [write_reg(0x01, config), read_reg(0x00, 0xFFFF)];
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1115(i2c, RecordingDelay::default(), Address::Gnd);
    adc.set_wait(ConversionWait::FixedDelay);

    assert_eq!(block_on(adc.read_single_ended(3)).unwrap(), -1);
    assert_eq!(finish(adc), vec![9_000]);
}

#[test]
fn invalid_channel_reads_zero_without_bus_traffic() {
    let i2c = I2cMock::new(&[]);
    let mut adc = Ads1x15::new_ads1115(i2c, RecordingDelay::default(), Address::default());

    assert_eq!(block_on(adc.read_single_ended(4)), Ok(0));
    assert_eq!(block_on(adc.read_single_ended(200)), Ok(0));
    assert!(finish(adc).is_empty());
}

#[test]
fn unresponsive_device_times_out() {
    let config = 0x8000 | 0x4000 | 0x0100 | 0x0080 | 0x0003;
    let expectations = [
        write_reg(0x01, config),
        read_reg(0x01, 0x0000),
        read_reg(0x01, 0x0000),
        read_reg(0x01, 0x0000),
    ];
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1015(i2c, RecordingDelay::default(), Address::default());
    adc.set_wait(ConversionWait::Poll { max_polls: 3 });

    assert_eq!(block_on(adc.read_single_ended(0)), Err(Error::Timeout));
    // 1600sps: quarter period is 157us, slept between each pair of polls
    assert_eq!(finish(adc), vec![157, 157]);
}

#[test]
fn bus_errors_are_surfaced() {
    let config = 0x8000 | 0x4000 | 0x0100 | 0x0080 | 0x0003;
    let expectations = [write_reg(0x01, config).with_error(ErrorKind::Other)];
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1115(i2c, RecordingDelay::default(), Address::default());

    assert_eq!(
        block_on(adc.read_single_ended(0)),
        Err(Error::I2c(ErrorKind::Other))
    );
    assert!(finish(adc).is_empty());
}

#[test]
fn bus_error_while_reading_result() {
    let config = 0x8000 | 0x0100 | 0x0080 | 0x0003;
    let expectations = [
        write_reg(0x01, config),
        read_reg(0x01, config),
        read_reg(0x00, 0x0000).with_error(ErrorKind::Other),
    ];
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1115(i2c, RecordingDelay::default(), Address::default());

    assert_eq!(
        block_on(adc.read_differential_0_1()),
        Err(Error::I2c(ErrorKind::Other))
    );
    finish(adc);
}

#[test]
fn differential_reads_use_pair_mux() {
    let base = 0x8000 | 0x0100 | 0x0080 | 0x0003;
    let pairs = [
        (DifferentialPair::P0N1, 0x0000),
        (DifferentialPair::P0N3, 0x1000),
        (DifferentialPair::P1N3, 0x2000),
        (DifferentialPair::P2N3, 0x3000),
    ];
    let mut expectations = Vec::new();
    for (_, mux) in pairs {
        expectations.push(write_reg(0x01, base | mux));
        expectations.push(read_reg(0x01, base | mux));
        expectations.push(read_reg(0x00, 0xFF00));
    }
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1115(i2c, RecordingDelay::default(), Address::default());

    for (pair, _) in pairs {
        assert_eq!(block_on(adc.read_differential(pair)).unwrap(), -256);
    }
    assert!(finish(adc).is_empty());
}

#[test]
fn comparator_writes_shifted_high_threshold() {
    let expectations = [
        write_reg(0x03, 1000 << 4),
        write_reg(0x02, 0x8000),
        // AIN0 | continuous | 1600sps | latching, assert after one
        write_reg(0x01, 0x4000 | 0x0080 | 0x0004),
    ];
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1015(i2c, RecordingDelay::default(), Address::default());

    block_on(adc.start_comparator_single_ended(0, 1000)).unwrap();
    assert!(finish(adc).is_empty());
}

#[test]
fn window_comparator_writes_both_thresholds() {
    let expectations = [
        write_reg(0x03, 2000),
        write_reg(0x02, (-100i16) as u16),
        // AIN2 | continuous | 128sps | window | latching, assert after one
        write_reg(0x01, 0x6000 | 0x0080 | 0x0010 | 0x0004),
    ];
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1115(i2c, RecordingDelay::default(), Address::default());

    block_on(adc.start_window_comparator_single_ended(2, -100, 2000)).unwrap();
    finish(adc);
}

#[test]
fn comparator_rejects_bad_channel() {
    let i2c = I2cMock::new(&[]);
    let mut adc = Ads1x15::new_ads1015(i2c, RecordingDelay::default(), Address::default());

    assert_eq!(
        block_on(adc.start_comparator_single_ended(4, 100)),
        Err(Error::InvalidChannel(4))
    );
    assert_eq!(
        block_on(adc.start_window_comparator_single_ended(9, 0, 100)),
        Err(Error::InvalidChannel(9))
    );
    assert_eq!(
        block_on(adc.start_continuous_single_ended(5)),
        Err(Error::InvalidChannel(5))
    );
    finish(adc);
}

#[test]
fn continuous_differential_then_fetch_results() {
    // AIN1 - AIN3 | ±1.024V | continuous | 1600sps | comparator off, no start bit
    let expectations = [
        write_reg(0x01, 0x2000 | 0x0600 | 0x0080 | 0x0003),
        read_reg(0x00, 0x7FF0),
        read_reg(0x00, 0xFFF0),
    ];
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1015(i2c, RecordingDelay::default(), Address::default());
    adc.set_gain(Gain::Four);

    block_on(adc.start_continuous_differential(DifferentialPair::P1N3)).unwrap();
    assert_eq!(block_on(adc.get_last_conversion_results()).unwrap(), 2047);
    assert_eq!(block_on(adc.get_last_conversion_results()).unwrap(), -1);
    finish(adc);
}

#[test]
fn non_blocking_start_and_poll() {
    let config = 0x8000 | 0x6000 | 0x0100 | 0x00E0 | 0x0003;
    let expectations = [
        write_reg(0x01, config),
        read_reg(0x01, config & 0x7FFF),
        read_reg(0x01, config),
        read_reg(0x00, 0x0100),
    ];
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1115(i2c, RecordingDelay::default(), Address::default());
    adc.set_data_rate(DataRate::ADS1115_860SPS);

    block_on(adc.start_adc_reading(Mux::SingleEnded(Channel::A2), ConversionMode::SingleShot))
        .unwrap();
    assert!(!block_on(adc.conversion_complete()).unwrap());
    assert!(block_on(adc.conversion_complete()).unwrap());
    assert_eq!(block_on(adc.get_last_conversion_results()).unwrap(), 256);
    finish(adc);
}

#[test]
fn volts_follow_gain() {
    // OS | AIN0 | ±2.048V | single-shot | 128sps | comparator off
    let config = 0x8000 | 0x4000 | 0x0400 | 0x0100 | 0x0080 | 0x0003;
    let expectations = [
        write_reg(0x01, config),
        read_reg(0x01, config),
        read_reg(0x00, 0x4000),
    ];
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1115(i2c, RecordingDelay::default(), Address::default());
    adc.set_gain(Gain::Two);

    let volts = block_on(adc.read_single_ended_volts(0)).unwrap();
    assert!((volts - 1.024).abs() < 1e-6);
    assert!((adc.volts_per_bit() - 0.000_062_5).abs() < 1e-12);
    finish(adc);
}

#[test]
fn read_settings_decodes_config_register() {
    let expectations = [I2cTransaction::write_read(0x4B, vec![0x01], vec![0x45, 0x94])];
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1015(i2c, RecordingDelay::default(), Address::Scl);
    assert_eq!(adc.address(), 0x4B);

    let settings = block_on(adc.read_settings()).unwrap();
    assert_eq!(settings.os, OperationalStatus::Busy);
    assert_eq!(settings.mux, Mux::SingleEnded(Channel::A0));
    assert_eq!(settings.pga, Gain::Two);
    assert_eq!(settings.mode, ConversionMode::SingleShot);
    assert_eq!(settings.dr, DataRate::ADS1015_1600SPS);
    assert_eq!(settings.comparator.mode, ComparatorMode::Window);
    assert_eq!(settings.comparator.latch, ComparatorLatch::Latching);
    assert_eq!(settings.comparator.queue, ComparatorQueue::One);
    finish(adc);
}

#[test]
fn ready_mode_arms_alert_pin_after_config() {
    // OS | AIN0 | ±6.144V | single-shot | 1600sps | comparator queue one
    let expectations = [
        write_reg(0x01, 0x8000 | 0x4000 | 0x0100 | 0x0080),
        write_reg(0x03, 0x8000),
        write_reg(0x02, 0x0000),
    ];
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1015(i2c, RecordingDelay::default(), Address::default());

    block_on(adc.start_adc_reading_with_ready(Channel::A0.into(), ConversionMode::SingleShot))
        .unwrap();
    assert!(finish(adc).is_empty());
}

#[test]
fn ready_mode_in_continuous_conversion() {
    // AIN0 - AIN3 | ±6.144V | continuous | 128sps | comparator queue one
    let expectations = [
        write_reg(0x01, 0x1000 | 0x0080),
        write_reg(0x03, 0x8000),
        write_reg(0x02, 0x0000),
    ];
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1115(i2c, RecordingDelay::default(), Address::default());

    block_on(adc.start_adc_reading_with_ready(
        DifferentialPair::P0N3.into(),
        ConversionMode::Continuous,
    ))
    .unwrap();
    finish(adc);
}

#[test]
fn default_poll_limit_times_out() {
    let config = 0x8000 | 0x4000 | 0x0100 | 0x0080 | 0x0003;
    let mut expectations = vec![write_reg(0x01, config)];
    for _ in 0..DEFAULT_MAX_POLLS {
        expectations.push(read_reg(0x01, config & 0x7FFF));
    }
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1115(i2c, RecordingDelay::default(), Address::default());
    assert_eq!(adc.wait(), ConversionWait::default());

    assert_eq!(block_on(adc.read_single_ended(0)), Err(Error::Timeout));
    let sleeps = finish(adc);
    assert_eq!(sleeps.len(), usize::from(DEFAULT_MAX_POLLS) - 1);
    assert!(sleeps.iter().all(|&us| us == 1_954));
}

#[test]
fn differential_volts_are_signed() {
    // AIN2 - AIN3 | ±4.096V | single-shot | 1600sps | comparator off
    let config = 0x8000 | 0x3000 | 0x0200 | 0x0100 | 0x0080 | 0x0003;
    let expectations = [
        write_reg(0x01, config),
        read_reg(0x01, config),
        // -500 counts, left-justified
        read_reg(0x00, ((-500i16) << 4) as u16),
    ];
    let i2c = I2cMock::new(&expectations);
    let mut adc = Ads1x15::new_ads1015(i2c, RecordingDelay::default(), Address::default());
    adc.set_gain(Gain::One);

    let volts = block_on(adc.read_differential_volts(DifferentialPair::P2N3)).unwrap();
    assert!((volts + 1.0).abs() < 1e-6);
    finish(adc);
}

#[test]
fn fixed_delay_at_slow_rate_uses_custom_variant() {
    // AIN0 | ±6.144V | single-shot | 8sps | comparator off
    let config = 0x8000 | 0x4000 | 0x0100 | 0x0003;
    let expectations = [write_reg(0x01, config), read_reg(0x00, 0x0042)];
    let i2c = I2cMock::new(&expectations);
    let dr = DataRate::ADS1115_8SPS;
    let variant = ChipVariant::new(Resolution::Bits16, dr.interval(&ChipVariant::ADS1115));
    let mut adc = Ads1x15::new(i2c, RecordingDelay::default(), Address::default(), variant);
    adc.set_data_rate(dr);
    adc.set_wait(ConversionWait::FixedDelay);

    assert_eq!(block_on(adc.read_single_ended(0)).unwrap(), 0x42);
    assert_eq!(finish(adc), vec![125_000]);
}
