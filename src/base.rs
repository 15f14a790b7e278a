//! Basic HAL functions for communicating with the radio device
//!
//! This provides decoupling between embedded hal traits and the RF device implementation.
// Copyright 2019 Ryan Kurte

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::{Operation, SpiDevice};

use crate::device::regs::{Common, READ_MASK, WRITE_FLAG};
use crate::Error;

/// Base interface to the radio, implemented by [`Spi`] for embedded-hal devices
pub trait Base<CommsError, PinError> {
    /// Reset the device
    fn reset(&mut self) -> Result<(), Error<CommsError, PinError>>;

    /// Delay for the specified time
    fn delay_ms(&mut self, ms: u32);

    /// Read the DIO0 interrupt line, None if the line is not connected
    fn irq_pending(&mut self) -> Result<Option<bool>, Error<CommsError, PinError>>;

    /// Write a slice of data to the specified register
    fn write_regs(&mut self, reg: u8, data: &[u8]) -> Result<(), Error<CommsError, PinError>>;
    /// Read a slice of data from the specified register
    fn read_regs(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Error<CommsError, PinError>>;

    /// Write to the FIFO buffer
    fn write_buff(&mut self, data: &[u8]) -> Result<(), Error<CommsError, PinError>> {
        self.write_regs(Common::FIFO as u8, data)
    }
    /// Read from the FIFO buffer
    fn read_buff(&mut self, data: &mut [u8]) -> Result<(), Error<CommsError, PinError>> {
        self.read_regs(Common::FIFO as u8, data)
    }

    /// Read a single u8 value from the specified register
    fn read_reg(&mut self, reg: u8) -> Result<u8, Error<CommsError, PinError>> {
        let mut incoming = [0u8; 1];
        self.read_regs(reg, &mut incoming)?;
        Ok(incoming[0])
    }

    /// Write a single u8 value to the specified register
    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Error<CommsError, PinError>> {
        self.write_regs(reg, &[value])
    }

    /// Update the specified register with the provided value & mask
    fn update_reg(
        &mut self,
        reg: u8,
        mask: u8,
        value: u8,
    ) -> Result<u8, Error<CommsError, PinError>> {
        let existing = self.read_reg(reg)?;
        let updated = (existing & !mask) | (value & mask);
        self.write_reg(reg, updated)?;
        Ok(updated)
    }
}

/// SPI connected radio with reset line, optional DIO0 line, and delay provider
///
/// Chip select is managed by the `SpiDevice`, each register access is a single transaction.
pub struct Spi<SPI, Rst, Dio0, Delay> {
    spi: SPI,
    rst: Rst,
    dio0: Option<Dio0>,
    delay: Delay,
}

impl<SPI, Rst, Dio0, Delay> Spi<SPI, Rst, Dio0, Delay> {
    pub fn new(spi: SPI, rst: Rst, dio0: Option<Dio0>, delay: Delay) -> Self {
        Self {
            spi,
            rst,
            dio0,
            delay,
        }
    }

    /// Release the underlying hardware
    pub fn free(self) -> (SPI, Rst, Option<Dio0>, Delay) {
        (self.spi, self.rst, self.dio0, self.delay)
    }
}

impl<SPI, Rst, Dio0, Delay, PinError> Base<SPI::Error, PinError> for Spi<SPI, Rst, Dio0, Delay>
where
    SPI: SpiDevice<u8>,
    Rst: OutputPin<Error = PinError>,
    Dio0: InputPin<Error = PinError>,
    Delay: DelayNs,
{
    /// Reset the radio
    fn reset(&mut self) -> Result<(), Error<SPI::Error, PinError>> {
        self.rst.set_low().map_err(Error::Pin)?;
        self.delay.delay_ms(10);
        self.rst.set_high().map_err(Error::Pin)?;
        self.delay.delay_ms(10);

        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn irq_pending(&mut self) -> Result<Option<bool>, Error<SPI::Error, PinError>> {
        match &mut self.dio0 {
            Some(p) => p.is_high().map(Some).map_err(Error::Pin),
            None => Ok(None),
        }
    }

    /// Read from the specified register
    fn read_regs(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Error<SPI::Error, PinError>> {
        let out_buf: [u8; 1] = [reg & READ_MASK];
        self.spi
            .transaction(&mut [Operation::Write(&out_buf), Operation::Read(data)])
            .map_err(Error::Comms)
    }

    /// Write to the specified register
    fn write_regs(&mut self, reg: u8, data: &[u8]) -> Result<(), Error<SPI::Error, PinError>> {
        let out_buf: [u8; 1] = [reg | WRITE_FLAG];
        self.spi
            .transaction(&mut [Operation::Write(&out_buf), Operation::Write(data)])
            .map_err(Error::Comms)
    }
}
