//! RFM9x LoRa mode RF implementation
//!
//! Transmit and receive state machines, plus `radio` trait implementations.
//!
//! Transmit: stage the FIFO, enter TX, wait for TX_DONE, return to standby.
//! Receive: enter continuous RX, wait for RX_DONE, drain the FIFO from the current RX address.
//!
//! Copyright 2019 Ryan Kurte

use core::fmt::Debug;

use crate::base::Base;
use crate::device::lora::LoRaChannel;
use crate::device::regs::{Common, LoRa};
use crate::device::{self, Dio0Mapping, Irq, PacketInfo, State, DIOMAPPING1_DIO0_MASK};
use crate::{Error, Rfm9x};

impl<Hal, CommsError, PinError> Rfm9x<Hal, CommsError, PinError>
where
    Hal: Base<CommsError, PinError>,
{
    /// Start sending a packet, see [`Rfm9x::check_transmit`] to poll for completion
    pub fn start_transmit(&mut self, data: &[u8]) -> Result<(), Error<CommsError, PinError>> {
        if data.is_empty() || data.len() > device::MAX_PAYLOAD_LEN {
            warn!("Invalid payload length: {} bytes", data.len());
            return Err(Error::InvalidLength(data.len()));
        }

        debug!("Starting send (data: {:?})", data);

        self.set_state(State::Standby)?;

        self.set_invert_iq(true)?;

        // Stage payload at the TX base address
        self.write_reg(LoRa::FIFOADDRPTR, 0x00)?;
        self.hal.write_buff(data)?;
        self.write_reg(LoRa::PAYLOADLENGTH, data.len() as u8)?;

        // Clear stale flags and route TX_DONE to DIO0
        self.write_reg(LoRa::IRQFLAGS, Irq::all().bits())?;
        self.set_dio0(Dio0Mapping::TxDone)?;

        self.set_state(State::Tx)?;

        Ok(())
    }

    /// Check for transmission completion
    pub fn check_transmit(&mut self) -> Result<bool, Error<CommsError, PinError>> {
        let irq = self.get_interrupts(true)?;
        trace!("Poll check send, irq: {:?}", irq);

        if irq.contains(Irq::TX_DONE) {
            debug!("Send complete!");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Send a packet and block until it has been transmitted.
    ///
    /// The radio is returned to standby on completion and on timeout.
    pub fn transmit(&mut self, data: &[u8]) -> Result<(), Error<CommsError, PinError>> {
        self.start_transmit(data)?;

        match self.wait_irq(Irq::TX_DONE) {
            Ok(_) => {
                self.write_reg(LoRa::IRQFLAGS, Irq::TX_DONE.bits())?;
                self.set_state(State::Standby)?;
                debug!("Sent {} bytes", data.len());
                Ok(())
            }
            Err(Error::Timeout) => {
                warn!("TX timeout, returning to standby");
                self.set_state(State::Standby)?;
                Err(Error::Timeout)
            }
            Err(e) => Err(e),
        }
    }

    /// Enter continuous receive mode
    pub fn start_receive(&mut self) -> Result<(), Error<CommsError, PinError>> {
        debug!("Starting receive");

        self.set_state(State::Standby)?;

        self.set_invert_iq(false)?;

        self.write_reg(LoRa::IRQFLAGS, Irq::all().bits())?;
        self.set_dio0(Dio0Mapping::RxDone)?;

        self.write_reg(LoRa::FIFOADDRPTR, 0x00)?;
        self.write_reg(LoRa::PAYLOADMAXLENGTH, device::MAX_PAYLOAD_LEN as u8)?;

        self.set_state(State::Rx)?;

        Ok(())
    }

    /// Check receive state
    ///
    /// Returns true once a packet with a valid CRC has been received.
    /// The restart option specifies whether CRC errors and timeouts should be
    /// handled internally (returning Ok(false)) or passed back to the caller as errors.
    pub fn check_receive(&mut self, restart: bool) -> Result<bool, Error<CommsError, PinError>> {
        let irq = self.get_interrupts(true)?;

        if !irq.is_empty() {
            debug!("Poll check receive, irq: {:?}", irq);
        }

        let res = if irq.contains(Irq::CRC_ERROR) {
            debug!("RX CRC error");
            Err(Error::Crc)
        } else if irq.contains(Irq::RX_DONE) {
            debug!("RX complete");
            Ok(true)
        } else if irq.contains(Irq::RX_TIMEOUT) {
            debug!("RX timeout");
            Err(Error::Timeout)
        } else {
            Ok(false)
        };

        match (restart, res) {
            (true, Err(Error::Crc)) | (true, Err(Error::Timeout)) => {
                debug!("RX restarting");
                self.start_receive()?;
                Ok(false)
            }
            (_, r) => r,
        }
    }

    /// Fetch a received packet
    ///
    /// Copies at most `data.len()` bytes from the FIFO and returns the number of bytes copied
    /// with the packet RSSI and SNR. Longer packets are truncated.
    pub fn get_received(
        &mut self,
        data: &mut [u8],
    ) -> Result<(usize, PacketInfo), Error<CommsError, PinError>> {
        // Fetch the number of bytes and current RX address pointer
        let n = self.read_reg(LoRa::RXNBBYTES)? as usize;
        let r = self.read_reg(LoRa::FIFORXCURRENTADDR)?;

        let rssi = self.read_reg(LoRa::PKTRSSIVALUE)?;
        let snr = self.read_reg(LoRa::PKTSNRVALUE)?;
        let info = PacketInfo::from_raw(rssi, snr, self.freq_mode);

        let len = if n > data.len() {
            warn!("Truncating {} byte packet to {} bytes", n, data.len());
            data.len()
        } else {
            n
        };

        debug!("FIFO RX {} bytes with fifo rx ptr: {}", n, r);

        // Update FIFO pointer to current RX address
        self.write_reg(LoRa::FIFOADDRPTR, r)?;

        self.hal.read_buff(&mut data[..len])?;

        trace!("Read data: {:?}", &data[..len]);

        Ok((len, info))
    }

    /// Receive a packet, blocking until one arrives or the configured timeout elapses.
    ///
    /// Packets failing the CRC check are discarded and reception restarted.
    /// The radio stays in continuous receive mode after a packet is received,
    /// and is returned to standby on timeout.
    pub fn receive(
        &mut self,
        data: &mut [u8],
    ) -> Result<(usize, PacketInfo), Error<CommsError, PinError>> {
        self.start_receive()?;

        for _ in 0..self.config.timeout_ms {
            if self.hal.irq_pending()? != Some(false) && self.check_receive(true)? {
                return self.get_received(data);
            }

            self.hal.delay_ms(1);
        }

        warn!("RX timeout, returning to standby");
        self.set_state(State::Standby)?;

        Err(Error::Timeout)
    }

    /// Fetch pending LoRa interrupts, clearing them if `clear` is set
    pub fn get_interrupts(&mut self, clear: bool) -> Result<Irq, Error<CommsError, PinError>> {
        let reg = self.read_reg(LoRa::IRQFLAGS)?;
        let irq = Irq::from_bits_truncate(reg);

        if clear && reg != 0 {
            self.write_reg(LoRa::IRQFLAGS, reg)?;
        }

        Ok(irq)
    }

    /// Poll the current channel RSSI, this is only valid in receive mode
    pub fn poll_rssi(&mut self) -> Result<i16, Error<CommsError, PinError>> {
        let raw = self.read_reg(LoRa::RSSIVALUE)?;
        Ok(self.freq_mode.rssi_offset() + raw as i16)
    }

    /// Set transmit power in dBm, clamped to the limits of the configured PA output
    pub fn set_power(&mut self, power: i8) -> Result<(), Error<CommsError, PinError>> {
        self.config.pa_config.power = power;
        self.write_pa_config()
    }

    /// Change the channel for future transmit and receive operations
    pub fn set_channel(&mut self, channel: &LoRaChannel) -> Result<(), Error<CommsError, PinError>> {
        if !(device::FREQ_MIN..=device::FREQ_MAX).contains(&channel.freq) {
            warn!("Channel frequency {} Hz outside supported range", channel.freq);
            return Err(Error::InvalidConfiguration);
        }

        self.config.channel = *channel;
        self.freq_mode = device::FrequencyMode::for_frequency(channel.freq);

        // Frequency and modem settings are only written in standby
        self.set_state(State::Standby)?;
        self.set_frequency(channel.freq)?;
        self.write_modem_config()?;

        Ok(())
    }

    fn set_dio0(&mut self, mapping: Dio0Mapping) -> Result<(), Error<CommsError, PinError>> {
        self.hal.update_reg(
            Common::DIOMAPPING1 as u8,
            DIOMAPPING1_DIO0_MASK,
            mapping as u8,
        )?;
        Ok(())
    }
}

impl<Hal, CommsError, PinError> radio::State for Rfm9x<Hal, CommsError, PinError>
where
    Hal: Base<CommsError, PinError>,
    CommsError: Debug,
    PinError: Debug,
{
    type State = State;
    type Error = Error<CommsError, PinError>;

    fn set_state(&mut self, state: State) -> Result<(), Self::Error> {
        Rfm9x::set_state(self, state)
    }

    fn get_state(&mut self) -> Result<State, Self::Error> {
        Rfm9x::get_state(self)
    }
}

impl<Hal, CommsError, PinError> radio::Channel for Rfm9x<Hal, CommsError, PinError>
where
    Hal: Base<CommsError, PinError>,
    CommsError: Debug,
    PinError: Debug,
{
    type Channel = LoRaChannel;
    type Error = Error<CommsError, PinError>;

    fn set_channel(&mut self, channel: &LoRaChannel) -> Result<(), Self::Error> {
        Rfm9x::set_channel(self, channel)
    }
}

impl<Hal, CommsError, PinError> radio::Power for Rfm9x<Hal, CommsError, PinError>
where
    Hal: Base<CommsError, PinError>,
    CommsError: Debug,
    PinError: Debug,
{
    type Error = Error<CommsError, PinError>;

    fn set_power(&mut self, power: i8) -> Result<(), Self::Error> {
        Rfm9x::set_power(self, power)
    }
}

impl<Hal, CommsError, PinError> radio::Interrupts for Rfm9x<Hal, CommsError, PinError>
where
    Hal: Base<CommsError, PinError>,
    CommsError: Debug,
    PinError: Debug,
{
    type Irq = Irq;
    type Error = Error<CommsError, PinError>;

    fn get_interrupts(&mut self, clear: bool) -> Result<Irq, Self::Error> {
        Rfm9x::get_interrupts(self, clear)
    }
}

impl<Hal, CommsError, PinError> radio::Transmit for Rfm9x<Hal, CommsError, PinError>
where
    Hal: Base<CommsError, PinError>,
    CommsError: Debug,
    PinError: Debug,
{
    type Error = Error<CommsError, PinError>;

    fn start_transmit(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        Rfm9x::start_transmit(self, data)
    }

    fn check_transmit(&mut self) -> Result<bool, Self::Error> {
        Rfm9x::check_transmit(self)
    }
}

impl<Hal, CommsError, PinError> radio::Receive for Rfm9x<Hal, CommsError, PinError>
where
    Hal: Base<CommsError, PinError>,
    CommsError: Debug,
    PinError: Debug,
{
    type Info = PacketInfo;
    type Error = Error<CommsError, PinError>;

    fn start_receive(&mut self) -> Result<(), Self::Error> {
        Rfm9x::start_receive(self)
    }

    fn check_receive(&mut self, restart: bool) -> Result<bool, Self::Error> {
        Rfm9x::check_receive(self, restart)
    }

    fn get_received(&mut self, data: &mut [u8]) -> Result<(usize, PacketInfo), Self::Error> {
        Rfm9x::get_received(self, data)
    }
}

impl<Hal, CommsError, PinError> radio::Rssi for Rfm9x<Hal, CommsError, PinError>
where
    Hal: Base<CommsError, PinError>,
    CommsError: Debug,
    PinError: Debug,
{
    type Error = Error<CommsError, PinError>;

    fn poll_rssi(&mut self) -> Result<i16, Self::Error> {
        Rfm9x::poll_rssi(self)
    }
}
