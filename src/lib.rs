//! RFM9x / SX1276 LoRa Radio Driver
//! Copyright 2018 Ryan Kurte
//!
//! Blocking register-level driver for SX1276 based LoRa modules (HopeRF RFM95/96/97/98).
//! The driver is generic over a [`base::Base`] implementation, an embedded-hal SPI
//! implementation is provided by [`base::Spi`].
//!
//! ```no_run
//! # use radio_rfm9x::prelude::*;
//! # fn run<B: radio_rfm9x::base::Base<(), ()>>(hal: B) -> Result<(), Error<(), ()>> {
//! let mut radio = Rfm9x::new(hal, &Config::long_range(915_000_000))?;
//! radio.transmit(b"Click!")?;
//! # Ok(())
//! # }
//! ```

#![no_std]

#[macro_use]
extern crate log;

use core::convert::TryFrom;
use core::fmt;
use core::marker::PhantomData;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::{Mode as SpiMode, Phase, Polarity, SpiDevice};

pub mod base;
use base::Base;

pub mod device;
use device::lora::{
    DetectionOptimize, DETECTIONTHRESHOLD_SF6, DETECTIONTHRESHOLD_SF7TO12, INVERTIQ2_OFF,
    INVERTIQ2_ON, INVERTIQ_RX_MASK, INVERTIQ_RX_OFF, INVERTIQ_RX_ON, INVERTIQ_TX_MASK,
    INVERTIQ_TX_OFF, INVERTIQ_TX_ON, SpreadingFactor,
};
use device::regs::{Common, LoRa};
use device::{Config, FrequencyMode, Irq, State};

pub mod lora;

pub mod telemetry;

pub mod prelude;

/// RFM9x SPI operating mode
pub const SPI_MODE: SpiMode = SpiMode {
    polarity: Polarity::IdleLow,
    phase: Phase::CaptureOnFirstTransition,
};

/// RFM9x device object
pub struct Rfm9x<Base, CommsError, PinError> {
    hal: Base,
    config: Config,
    freq_mode: FrequencyMode,

    _ce: PhantomData<CommsError>,
    _pe: PhantomData<PinError>,
}

/// RFM9x error type
#[derive(Debug, Clone, PartialEq)]
pub enum Error<CommsError, PinError> {
    /// Communications (SPI) error
    Comms(CommsError),
    /// Pin control error
    Pin(PinError),
    /// Unexpected silicon version, usually a wiring fault or unsupported chip
    BadVersion(u8),
    /// Payload length outside 1..=255
    InvalidLength(usize),
    /// Unrecognised operating mode read back from the device
    InvalidState(u8),
    /// Configuration is not supported by the device
    InvalidConfiguration,
    /// Timeout waiting for an operation to complete
    Timeout,
    /// Received packet failed the payload CRC check
    Crc,
}

impl<CommsError: fmt::Debug, PinError: fmt::Debug> fmt::Display for Error<CommsError, PinError> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Comms(e) => write!(f, "communication error: {:?}", e),
            Error::Pin(e) => write!(f, "pin error: {:?}", e),
            Error::BadVersion(v) => write!(
                f,
                "unexpected silicon version 0x{:02X} (expected 0x{:02X})",
                v,
                device::VERSION
            ),
            Error::InvalidLength(n) => write!(f, "invalid payload length: {} bytes", n),
            Error::InvalidState(v) => write!(f, "invalid operating mode: 0x{:02X}", v),
            Error::InvalidConfiguration => write!(f, "invalid configuration"),
            Error::Timeout => write!(f, "operation timed out"),
            Error::Crc => write!(f, "payload CRC error"),
        }
    }
}

impl<SPI, Rst, Dio0, Delay, PinError> Rfm9x<base::Spi<SPI, Rst, Dio0, Delay>, SPI::Error, PinError>
where
    SPI: SpiDevice<u8>,
    Rst: OutputPin<Error = PinError>,
    Dio0: InputPin<Error = PinError>,
    Delay: DelayNs,
{
    /// Create an RFM9x instance over an SPI device with the provided configuration.
    ///
    /// DIO0 is optional, when not connected completion is detected by polling IRQFLAGS.
    pub fn spi(
        spi: SPI,
        rst: Rst,
        dio0: Option<Dio0>,
        delay: Delay,
        config: &Config,
    ) -> Result<Self, Error<SPI::Error, PinError>> {
        let hal = base::Spi::new(spi, rst, dio0, delay);
        Self::new(hal, config)
    }
}

impl<Hal, CommsError, PinError> Rfm9x<Hal, CommsError, PinError>
where
    Hal: Base<CommsError, PinError>,
{
    /// Create a new radio instance and run the initialisation sequence.
    ///
    /// Fails with [`Error::BadVersion`] if the device does not identify as an SX1276.
    pub fn new(hal: Hal, config: &Config) -> Result<Self, Error<CommsError, PinError>> {
        let mut rfm9x = Self::build(hal);

        debug!("Resetting radio & checking silicon version");

        rfm9x.hal.reset()?;

        let version = rfm9x.silicon_version()?;
        if version != device::VERSION {
            warn!(
                "Unexpected silicon version 0x{:02X} (expected 0x{:02X})",
                version,
                device::VERSION
            );
            return Err(Error::BadVersion(version));
        }

        debug!("Found silicon version 0x{:02X}", version);

        rfm9x.configure(config)?;

        Ok(rfm9x)
    }

    pub(crate) fn build(hal: Hal) -> Self {
        Rfm9x {
            hal,
            config: Config::default(),
            freq_mode: FrequencyMode::Hf,
            _ce: PhantomData,
            _pe: PhantomData,
        }
    }

    /// Apply a full radio configuration, leaving the radio in standby
    pub fn configure(&mut self, config: &Config) -> Result<(), Error<CommsError, PinError>> {
        debug!("Configuring lora mode");

        if config.xtal_freq == 0
            || !(device::FREQ_MIN..=device::FREQ_MAX).contains(&config.channel.freq)
        {
            return Err(Error::InvalidConfiguration);
        }

        self.config = config.clone();
        self.freq_mode = FrequencyMode::for_frequency(config.channel.freq);

        // Modem mode may only be changed in sleep
        self.set_state(State::Sleep)?;

        self.set_frequency(config.channel.freq)?;

        self.write_modem_config()?;

        // Set output configuration
        self.write_pa_config()?;
        self.write_reg(Common::OCP, config.ocp.register())?;
        self.write_reg(Common::LNA, config.lna.register())?;

        // Use whole FIFO for both TX and RX
        self.write_reg(LoRa::FIFOTXBASEADDR, 0x00)?;
        self.write_reg(LoRa::FIFORXBASEADDR, 0x00)?;

        // Unmask and clear all interrupts
        self.write_reg(LoRa::IRQFLAGSMASK, 0x00)?;
        self.write_reg(LoRa::IRQFLAGS, Irq::all().bits())?;

        self.set_state(State::Standby)?;
        self.hal.delay_ms(10);

        debug!(
            "Configured {} Hz, {:?}, {:?}, {:?}",
            config.channel.freq, config.channel.bw, config.channel.sf, config.channel.cr
        );

        Ok(())
    }

    /// Write modem, preamble and detection configuration from the stored config
    pub(crate) fn write_modem_config(&mut self) -> Result<(), Error<CommsError, PinError>> {
        let channel = self.config.channel;
        let modem = self.config.modem;

        let (mc1, mc2, mc3) = device::lora::modem_config(&channel, &modem);
        self.write_reg(LoRa::MODEMCONFIG1, mc1)?;
        self.write_reg(LoRa::MODEMCONFIG2, mc2)?;
        self.write_reg(LoRa::MODEMCONFIG3, mc3)?;

        // Set symbol timeout (MSBs live in MODEMCONFIG2)
        self.write_reg(LoRa::SYMBTIMEOUTLSB, (modem.symbol_timeout & 0xFF) as u8)?;

        // Set preamble length
        self.write_reg(LoRa::PREAMBLEMSB, (modem.preamble_len >> 8) as u8)?;
        self.write_reg(LoRa::PREAMBLELSB, (modem.preamble_len & 0xFF) as u8)?;

        self.write_reg(LoRa::SYNCWORD, modem.sync_word)?;

        // Configure detection optimisation
        if channel.sf == SpreadingFactor::Sf6 {
            self.write_reg(LoRa::DETECTOPTIMIZE, DetectionOptimize::Sf6 as u8)?;
            self.write_reg(LoRa::DETECTIONTHRESHOLD, DETECTIONTHRESHOLD_SF6)?;
        } else {
            self.write_reg(LoRa::DETECTOPTIMIZE, DetectionOptimize::Sf7To12 as u8)?;
            self.write_reg(LoRa::DETECTIONTHRESHOLD, DETECTIONTHRESHOLD_SF7TO12)?;
        }

        Ok(())
    }

    /// Write PACONFIG and PADAC from the stored config
    pub(crate) fn write_pa_config(&mut self) -> Result<(), Error<CommsError, PinError>> {
        let pa = self.config.pa_config;
        let power = pa.clamped_power();
        if power != pa.power {
            warn!(
                "Requested power {} dBm out of range for {:?} output, using {} dBm",
                pa.power, pa.output, power
            );
        }

        let (pa_config, pa_dac) = pa.registers();
        self.write_reg(Common::PACONFIG, pa_config)?;
        self.write_reg(Common::PADAC, pa_dac)?;

        debug!("Set output power {} dBm (PACONFIG: {:#04x})", power, pa_config);

        Ok(())
    }

    /// Configure IQ inversion for the next transmit or receive operation
    pub(crate) fn set_invert_iq(&mut self, tx: bool) -> Result<(), Error<CommsError, PinError>> {
        let (value, iq2) = match (self.config.modem.invert_iq, tx) {
            (false, _) => (INVERTIQ_RX_OFF | INVERTIQ_TX_OFF, INVERTIQ2_OFF),
            (true, true) => (INVERTIQ_RX_OFF | INVERTIQ_TX_ON, INVERTIQ2_ON),
            (true, false) => (INVERTIQ_RX_ON | INVERTIQ_TX_OFF, INVERTIQ2_ON),
        };

        self.hal.update_reg(
            LoRa::INVERTIQ as u8,
            !(INVERTIQ_RX_MASK & INVERTIQ_TX_MASK),
            value,
        )?;
        self.write_reg(LoRa::INVERTIQ2, iq2)
    }

    /// Fetch the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch the device silicon version
    pub fn silicon_version(&mut self) -> Result<u8, Error<CommsError, PinError>> {
        self.read_reg(Common::VERSION)
    }

    /// Set the operating state (always in LoRa mode)
    pub fn set_state(&mut self, state: State) -> Result<(), Error<CommsError, PinError>> {
        trace!("Set state: {:?}", state);
        self.write_reg(Common::OPMODE, device::opmode(state, self.freq_mode))
    }

    /// Read the operating state
    pub fn get_state(&mut self) -> Result<State, Error<CommsError, PinError>> {
        let v = self.read_reg(Common::OPMODE)?;
        State::try_from(v).map_err(Error::InvalidState)
    }

    /// Set the channel frequency in Hz
    pub fn set_frequency(&mut self, freq: u32) -> Result<(), Error<CommsError, PinError>> {
        if !(device::FREQ_MIN..=device::FREQ_MAX).contains(&freq) {
            warn!("Frequency {} Hz outside supported range", freq);
            return Err(Error::InvalidConfiguration);
        }

        let frf = device::frequency_to_frf(freq, self.config.xtal_freq);

        trace!("Set frequency {} Hz (FRF: 0x{:06X})", freq, frf);

        self.hal
            .write_regs(Common::FRFMSB as u8, &[(frf >> 16) as u8, (frf >> 8) as u8, frf as u8])?;

        Ok(())
    }

    /// Read the channel frequency in Hz from the device
    pub fn get_frequency(&mut self) -> Result<u32, Error<CommsError, PinError>> {
        let mut frf = [0u8; 3];
        self.hal.read_regs(Common::FRFMSB as u8, &mut frf)?;

        let frf = (frf[0] as u32) << 16 | (frf[1] as u32) << 8 | frf[2] as u32;
        Ok(device::frf_to_frequency(frf, self.config.xtal_freq))
    }

    /// Wait for any of the provided interrupt flags, up to the configured timeout.
    ///
    /// When DIO0 is connected IRQFLAGS is only read once DIO0 is asserted.
    pub(crate) fn wait_irq(&mut self, flags: Irq) -> Result<Irq, Error<CommsError, PinError>> {
        for _ in 0..self.config.timeout_ms {
            if self.hal.irq_pending()? != Some(false) {
                let irq = Irq::from_bits_truncate(self.read_reg(LoRa::IRQFLAGS)?);
                if irq.intersects(flags) {
                    return Ok(irq);
                }
            }

            self.hal.delay_ms(1);
        }

        Err(Error::Timeout)
    }

    /// Read a register
    pub fn read_reg<R: Into<u8>>(&mut self, reg: R) -> Result<u8, Error<CommsError, PinError>> {
        self.hal.read_reg(reg.into())
    }

    /// Write a register
    pub fn write_reg<R: Into<u8>>(
        &mut self,
        reg: R,
        value: u8,
    ) -> Result<(), Error<CommsError, PinError>> {
        self.hal.write_reg(reg.into(), value)
    }

    /// Release the underlying hal
    pub fn free(self) -> Hal {
        self.hal
    }
}
