use std::fmt::Debug;
use std::time::Duration;

use log::{debug, info, warn};

use radio_rfm9x::base::Base;
use radio_rfm9x::prelude::*;

use super::options::*;

pub fn do_command<Hal, CE, PE>(
    radio: &mut Rfm9x<Hal, CE, PE>,
    operation: Operation,
) -> Result<(), Error<CE, PE>>
where
    Hal: Base<CE, PE>,
    CE: Debug,
    PE: Debug,
{
    match operation {
        Operation::Transmit(config) => do_transmit(
            radio,
            config.data.as_bytes(),
            config.power,
            config.continuous,
            *config.period,
        ),
        Operation::Receive(config) => {
            let mut buff = [0u8; 255];
            do_receive(radio, &mut buff, config.continuous).map(|_| ())
        }
        Operation::Repeat(config) => {
            let mut buff = [0u8; 255];
            do_repeat(radio, &mut buff, config.power, config.continuous, *config.delay)
        }
        Operation::Rssi(config) => do_rssi(radio, config.continuous, *config.period),
        Operation::Telemetry(config) => do_telemetry(radio, config.continuous),
    }
}

pub fn do_transmit<Hal, CE, PE>(
    radio: &mut Rfm9x<Hal, CE, PE>,
    data: &[u8],
    power: Option<i8>,
    continuous: bool,
    period: Duration,
) -> Result<(), Error<CE, PE>>
where
    Hal: Base<CE, PE>,
{
    if let Some(p) = power {
        radio.set_power(p)?;
    }

    loop {
        info!("Sending {} bytes", data.len());
        radio.transmit(data)?;
        info!("Send complete");

        if !continuous {
            break;
        }
        std::thread::sleep(period);
    }

    Ok(())
}

/// Receive with retries on timeout when running continuously
fn receive_next<Hal, CE, PE>(
    radio: &mut Rfm9x<Hal, CE, PE>,
    buff: &mut [u8],
    continuous: bool,
) -> Result<Option<(usize, PacketInfo)>, Error<CE, PE>>
where
    Hal: Base<CE, PE>,
{
    match radio.receive(buff) {
        Ok(r) => Ok(Some(r)),
        Err(Error::Timeout) if continuous => {
            debug!("Receive timeout, waiting");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn log_packet(data: &[u8], info: &PacketInfo) {
    match std::str::from_utf8(data) {
        Ok(s) => info!("Received: '{}' info: {:?}", s, info),
        Err(_) => info!("Received: '{:02x?}' info: {:?}", data, info),
    }
}

pub fn do_receive<Hal, CE, PE>(
    radio: &mut Rfm9x<Hal, CE, PE>,
    buff: &mut [u8],
    continuous: bool,
) -> Result<usize, Error<CE, PE>>
where
    Hal: Base<CE, PE>,
{
    loop {
        if let Some((n, info)) = receive_next(radio, buff, continuous)? {
            log_packet(&buff[..n], &info);

            if !continuous {
                return Ok(n);
            }
        }
    }
}

pub fn do_telemetry<Hal, CE, PE>(
    radio: &mut Rfm9x<Hal, CE, PE>,
    continuous: bool,
) -> Result<(), Error<CE, PE>>
where
    Hal: Base<CE, PE>,
{
    let mut buff = [0u8; 255];

    loop {
        if let Some((n, info)) = receive_next(radio, &mut buff, continuous)? {
            match Reading::decode(&buff[..n]) {
                Ok(r) => info!(
                    "Temp: {:.2}C Humidity: {:.2}% (rssi: {} snr: {})",
                    r.temperature_c(),
                    r.humidity_pct(),
                    info.rssi,
                    info.snr
                ),
                Err(e) => warn!("Ignoring {} byte packet: {:?}", n, e),
            }

            if !continuous {
                return Ok(());
            }
        }
    }
}

pub fn do_rssi<Hal, CE, PE>(
    radio: &mut Rfm9x<Hal, CE, PE>,
    continuous: bool,
    period: Duration,
) -> Result<(), Error<CE, PE>>
where
    Hal: Base<CE, PE>,
{
    // Enter receive mode
    radio.start_receive()?;

    // Poll for RSSI
    loop {
        let rssi = radio.poll_rssi()?;

        info!("rssi: {}", rssi);

        radio.check_receive(true)?;

        if !continuous {
            break;
        }

        std::thread::sleep(period);
    }

    Ok(())
}

pub fn do_repeat<Hal, CE, PE>(
    radio: &mut Rfm9x<Hal, CE, PE>,
    buff: &mut [u8],
    power: Option<i8>,
    continuous: bool,
    delay: Duration,
) -> Result<(), Error<CE, PE>>
where
    Hal: Base<CE, PE>,
{
    if let Some(p) = power {
        radio.set_power(p)?;
    }

    loop {
        if let Some((n, info)) = receive_next(radio, buff, continuous)? {
            log_packet(&buff[..n], &info);

            std::thread::sleep(delay);

            radio.transmit(&buff[..n])?;
            debug!("Repeat complete");

            if !continuous {
                return Ok(());
            }
        }
    }
}
