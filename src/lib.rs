//! `ads1x15-async`
//!
//! A basic async driver for the ADS1015 (12-bit) and ADS1115 (16-bit) ADCs from TI.
//!
//! Both chips are driven by the same code; the differences are captured by a
//! [ChipVariant]. The bus is any [`embedded_hal_async::i2c::I2c`], and the driver
//! sleeps and yields through an injected [`embedded_hal_async::delay::DelayNs`].
//!
//! Consider using the [`ads1x1x`](https://docs.rs/ads1x1x) crate if you need blocking
//! or more full-featured support for this family.

#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod config;
pub mod conversion;

use config::{
    Address, ChipVariant, ComparatorMode, ComparatorSettings, ConversionMode, ConversionWait,
    DataRate, DifferentialPair, Gain, Mux, OperationalStatus, ReadSettings, Register, Settings,
    WriteSettings,
};
use conversion::LOW_THRESHOLD_DISABLED;
use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

pub use config::Channel;

/// Driver error type
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq)]
pub enum Error<E> {
    /// The conversion did not finish within the configured number of polls
    Timeout,
    /// An error with the underlying I2C bus
    I2c(E),
    /// A single-ended channel outside of 0..=3 was requested
    InvalidChannel(u8),
}

/// Async driver for the ADS1015 and ADS1115 ADCs
pub struct Ads1x15<I, D> {
    addr: u8,
    i2c: I,
    delay: D,
    variant: ChipVariant,
    settings: Settings,
}

impl<I, D> Ads1x15<I, D>
where
    I: I2c,
    D: DelayNs,
{
    /// Create a new [Ads1x15] for the given chip, with default [Settings].
    ///
    /// Nothing is sent to the device until the first read or start call.
    pub fn new(i2c: I, delay: D, addr: Address, variant: ChipVariant) -> Self {
        Self {
            addr: addr.into_addr(),
            i2c,
            delay,
            variant,
            settings: Settings::default(),
        }
    }

    /// Create a driver for a 12-bit ADS1015
    pub fn new_ads1015(i2c: I, delay: D, addr: Address) -> Self {
        Self::new(i2c, delay, addr, ChipVariant::ADS1015)
    }

    /// Create a driver for a 16-bit ADS1115
    pub fn new_ads1115(i2c: I, delay: D, addr: Address) -> Self {
        Self::new(i2c, delay, addr, ChipVariant::ADS1115)
    }

    /// The right-aligned 7-bit address this driver talks to
    pub fn address(&self) -> u8 {
        self.addr
    }

    pub fn variant(&self) -> &ChipVariant {
        &self.variant
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Replace all settings. Takes effect on the next conversion started.
    pub fn set_settings(&mut self, settings: Settings) {
        debug!("ads1x15 settings: {}", settings);
        self.settings = settings;
    }

    pub fn gain(&self) -> Gain {
        self.settings.gain
    }

    pub fn set_gain(&mut self, gain: Gain) {
        debug!("ads1x15 gain: {}", gain);
        self.settings.gain = gain;
    }

    pub fn data_rate(&self) -> DataRate {
        self.settings.data_rate
    }

    /// Takes effect on the next conversion started.
    ///
    /// With [ConversionWait::FixedDelay], a rate slower than the chip default
    /// needs a longer [ChipVariant::conversion_delay]; see [ChipVariant::new].
    pub fn set_data_rate(&mut self, data_rate: DataRate) {
        debug!("ads1x15 data rate: {}", data_rate);
        self.settings.data_rate = data_rate;
    }

    pub fn wait(&self) -> ConversionWait {
        self.settings.wait
    }

    pub fn set_wait(&mut self, wait: ConversionWait) {
        self.settings.wait = wait;
    }

    /// Take a single-ended reading from AIN`channel`.
    ///
    /// A channel above 3 returns `Ok(0)` without touching the bus, so check
    /// the channel yourself if 0 is a meaningful reading.
    pub async fn read_single_ended(&mut self, channel: u8) -> Result<i16, Error<I::Error>> {
        let Ok(channel) = Channel::try_from(channel) else {
            warn!("ads1x15: no single-ended channel {=u8}", channel);
            return Ok(0);
        };
        self.read(channel.into()).await
    }

    /// Take a differential reading. The result is negative when the N input
    /// is above the P input.
    pub async fn read_differential(
        &mut self,
        pair: DifferentialPair,
    ) -> Result<i16, Error<I::Error>> {
        self.read(pair.into()).await
    }

    /// AIN0 - AIN1
    pub async fn read_differential_0_1(&mut self) -> Result<i16, Error<I::Error>> {
        self.read_differential(DifferentialPair::P0N1).await
    }

    /// AIN0 - AIN3
    pub async fn read_differential_0_3(&mut self) -> Result<i16, Error<I::Error>> {
        self.read_differential(DifferentialPair::P0N3).await
    }

    /// AIN1 - AIN3
    pub async fn read_differential_1_3(&mut self) -> Result<i16, Error<I::Error>> {
        self.read_differential(DifferentialPair::P1N3).await
    }

    /// AIN2 - AIN3
    pub async fn read_differential_2_3(&mut self) -> Result<i16, Error<I::Error>> {
        self.read_differential(DifferentialPair::P2N3).await
    }

    /// Run one single-shot conversion on `mux` and return the signed sample.
    ///
    /// This starts the conversion, waits according to [Settings::wait], and
    /// reads back the conversion register. A conversion started by anything
    /// else in the meantime would be clobbered, which `&mut self` prevents.
    pub async fn read(&mut self, mux: Mux) -> Result<i16, Error<I::Error>> {
        self.start_adc_reading(mux, ConversionMode::SingleShot)
            .await?;
        self.wait_for_conversion().await?;
        self.get_last_conversion_results().await
    }

    /// Like [Self::read_single_ended], scaled to volts with the current gain
    pub async fn read_single_ended_volts(&mut self, channel: u8) -> Result<f32, Error<I::Error>> {
        let counts = self.read_single_ended(channel).await?;
        Ok(self.compute_volts(counts))
    }

    /// Like [Self::read_differential], scaled to volts with the current gain
    pub async fn read_differential_volts(
        &mut self,
        pair: DifferentialPair,
    ) -> Result<f32, Error<I::Error>> {
        let counts = self.read_differential(pair).await?;
        Ok(self.compute_volts(counts))
    }

    /// Start a conversion without waiting for it.
    ///
    /// In single-shot mode, poll [Self::conversion_complete] and then call
    /// [Self::get_last_conversion_results]. In continuous mode the conversion
    /// register always holds the latest result.
    pub async fn start_adc_reading(
        &mut self,
        mux: Mux,
        mode: ConversionMode,
    ) -> Result<(), Error<I::Error>> {
        let settings = self.conversion_settings(mux, mode, ComparatorSettings::DISABLED);
        self.write_settings(settings).await
    }

    /// Like [Self::start_adc_reading], but ALERT/RDY pulses low each time a
    /// conversion finishes, so the host can wait on the pin instead of
    /// polling the bus.
    ///
    /// Overwrites both threshold registers. Start the comparator again to
    /// restore them.
    pub async fn start_adc_reading_with_ready(
        &mut self,
        mux: Mux,
        mode: ConversionMode,
    ) -> Result<(), Error<I::Error>> {
        let settings = self.conversion_settings(mux, mode, ComparatorSettings::READY);
        self.write_settings(settings).await?;

        // RDY mode: high threshold MSB set, low threshold MSB clear
        self.write_register(Register::HighThreshold, 0x8000).await?;
        self.write_register(Register::LowThreshold, 0x0000).await
    }

    /// Put AIN`channel` into continuous conversion
    pub async fn start_continuous_single_ended(
        &mut self,
        channel: u8,
    ) -> Result<(), Error<I::Error>> {
        let channel = Channel::try_from(channel).map_err(Error::InvalidChannel)?;
        self.start_adc_reading(channel.into(), ConversionMode::Continuous)
            .await
    }

    /// Put a differential pair into continuous conversion
    pub async fn start_continuous_differential(
        &mut self,
        pair: DifferentialPair,
    ) -> Result<(), Error<I::Error>> {
        self.start_adc_reading(pair.into(), ConversionMode::Continuous)
            .await
    }

    /// Returns `true` once the device reports it is not converting.
    pub async fn conversion_complete(&mut self) -> Result<bool, Error<I::Error>> {
        let config = self.read_register(Register::Config).await?;
        Ok(ReadSettings::from(config).os == OperationalStatus::NotBusy)
    }

    /// Read back and decode the config register
    pub async fn read_settings(&mut self) -> Result<ReadSettings, Error<I::Error>> {
        let config = self.read_register(Register::Config).await?;
        Ok(ReadSettings::from(config))
    }

    /// Read the conversion register without starting a conversion.
    ///
    /// Use this in continuous mode, or after the comparator fires. Reading
    /// also clears a latched ALERT/RDY output.
    pub async fn get_last_conversion_results(&mut self) -> Result<i16, Error<I::Error>> {
        let raw = self.read_register(Register::Conversion).await?;
        Ok(conversion::decode(raw, self.variant.bit_shift()))
    }

    /// Convert continuously on AIN`channel` and latch ALERT/RDY low when a
    /// conversion exceeds `high_threshold` (in ADC counts).
    ///
    /// The low threshold is parked at the bottom of the range. Read the
    /// result with [Self::get_last_conversion_results], which also releases
    /// the latch.
    pub async fn start_comparator_single_ended(
        &mut self,
        channel: u8,
        high_threshold: i16,
    ) -> Result<(), Error<I::Error>> {
        let channel = Channel::try_from(channel).map_err(Error::InvalidChannel)?;
        let shift = self.variant.bit_shift();

        self.write_register(
            Register::HighThreshold,
            conversion::encode_threshold(high_threshold, shift),
        )
        .await?;
        self.write_register(Register::LowThreshold, LOW_THRESHOLD_DISABLED)
            .await?;

        self.write_settings(WriteSettings::continuous(
            channel.into(),
            self.settings.gain,
            self.settings.data_rate,
            ComparatorSettings::latching(ComparatorMode::Traditional),
        ))
        .await
    }

    /// Like [Self::start_comparator_single_ended], but ALERT/RDY asserts when
    /// a conversion falls outside `low_threshold..=high_threshold`.
    pub async fn start_window_comparator_single_ended(
        &mut self,
        channel: u8,
        low_threshold: i16,
        high_threshold: i16,
    ) -> Result<(), Error<I::Error>> {
        let channel = Channel::try_from(channel).map_err(Error::InvalidChannel)?;
        let shift = self.variant.bit_shift();

        self.write_register(
            Register::HighThreshold,
            conversion::encode_threshold(high_threshold, shift),
        )
        .await?;
        self.write_register(
            Register::LowThreshold,
            conversion::encode_threshold(low_threshold, shift),
        )
        .await?;

        self.write_settings(WriteSettings::continuous(
            channel.into(),
            self.settings.gain,
            self.settings.data_rate,
            ComparatorSettings::latching(ComparatorMode::Window),
        ))
        .await
    }

    /// Volts per count for the current chip and gain
    pub fn volts_per_bit(&self) -> f32 {
        conversion::volts_per_bit(&self.variant, self.settings.gain)
    }

    /// Scale a sample to volts using the current gain.
    ///
    /// Only meaningful if the gain has not changed since the sample was taken.
    pub fn compute_volts(&self, counts: i16) -> f32 {
        conversion::compute_volts(counts, &self.variant, self.settings.gain)
    }

    /// Give back the I2C bus and the delay
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn conversion_settings(
        &self,
        mux: Mux,
        mode: ConversionMode,
        comparator: ComparatorSettings,
    ) -> WriteSettings {
        match mode {
            ConversionMode::SingleShot => WriteSettings {
                comparator,
                ..WriteSettings::single_shot(mux, self.settings.gain, self.settings.data_rate)
            },
            ConversionMode::Continuous => WriteSettings::continuous(
                mux,
                self.settings.gain,
                self.settings.data_rate,
                comparator,
            ),
        }
    }

    async fn wait_for_conversion(&mut self) -> Result<(), Error<I::Error>> {
        match self.settings.wait {
            ConversionWait::FixedDelay => {
                let period = self.variant.conversion_delay();
                self.sleep(period).await;
                Ok(())
            }
            ConversionWait::Poll { max_polls } => {
                let qperiod = self.settings.data_rate.quarter_interval(&self.variant);
                let mut polls = 0;
                loop {
                    if self.conversion_complete().await? {
                        return Ok(());
                    }
                    polls += 1;
                    if polls >= max_polls {
                        warn!("ads1x15: still busy after {=u16} polls", polls);
                        return Err(Error::Timeout);
                    }
                    self.sleep(qperiod).await;
                }
            }
        }
    }

    async fn sleep(&mut self, period: Duration) {
        let us = u32::try_from(period.as_micros()).unwrap_or(u32::MAX);
        self.delay.delay_us(us).await;
    }

    async fn write_settings(&mut self, settings: WriteSettings) -> Result<(), Error<I::Error>> {
        debug!("ads1x15 config: {}", settings);
        self.write_register(Register::Config, settings.to_value())
            .await
    }

    async fn write_register(&mut self, reg: Register, value: u16) -> Result<(), Error<I::Error>> {
        let [hi, lo] = value.to_be_bytes();
        trace!("ads1x15 write {} = {=u16:#x}", reg, value);
        self.i2c
            .write(self.addr, &[reg.addr(), hi, lo])
            .await
            .map_err(Error::I2c)
    }

    async fn read_register(&mut self, reg: Register) -> Result<u16, Error<I::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.addr, &[reg.addr()], &mut buf)
            .await
            .map_err(Error::I2c)?;
        let value = u16::from_be_bytes(buf);
        trace!("ads1x15 read {} = {=u16:#x}", reg, value);
        Ok(value)
    }
}
