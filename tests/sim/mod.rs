//! Simulated RFM9x register map for driver testing
//!
//! Models the parts of the chip the driver depends on: FIFO pointer auto-increment,
//! write-one-to-clear interrupt flags, TX completion and RX packet delivery
//! advancing with elapsed (delayed) time, and the DIO0 line.

#![allow(dead_code)]

use radio_rfm9x::base::Base;
use radio_rfm9x::device::regs::{Common, LoRa};
use radio_rfm9x::device::Irq;
use radio_rfm9x::Error;

pub type SimError = Error<(), ()>;

/// Receive event queued for delivery once the radio enters receive mode
pub struct Packet {
    pub data: Vec<u8>,
    pub rssi: u8,
    pub snr: u8,
    /// Interrupt flags raised on delivery
    pub flags: Irq,
}

impl Packet {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            rssi: 0x40,
            snr: 0x20,
            flags: Irq::RX_DONE | Irq::VALID_HEADER,
        }
    }

    pub fn corrupt(data: &[u8]) -> Self {
        Self {
            flags: Irq::RX_DONE | Irq::VALID_HEADER | Irq::CRC_ERROR,
            ..Self::new(data)
        }
    }

    /// Raise only the provided flags, without packet data
    pub fn flags_only(flags: Irq) -> Self {
        Self {
            flags,
            ..Self::new(&[])
        }
    }
}

pub struct SimChip {
    pub regs: [u8; 0x80],
    pub fifo: [u8; 256],

    /// Milliseconds in TX before TX_DONE is raised, None to never complete
    pub tx_done_after: Option<u32>,
    /// Milliseconds in RX before each queued packet arrives
    pub rx_after: u32,
    /// Packets delivered in order while receiving
    pub rx_queue: Vec<Packet>,
    /// FIFO address received packets are written at
    pub rx_addr: u8,

    pub dio0_wired: bool,

    /// Raw RSSIVALUE reported for the current channel
    pub channel_rssi: u8,

    /// Register writes (address, value), FIFO writes excluded
    pub writes: Vec<(u8, u8)>,
    pub fifo_writes: usize,
    pub irq_reads: usize,
    pub delays: u32,
    pub resets: u32,

    elapsed: u32,
}

impl SimChip {
    pub fn new() -> Self {
        let mut s = Self {
            regs: [0u8; 0x80],
            fifo: [0u8; 256],
            tx_done_after: Some(3),
            rx_after: 2,
            rx_queue: Vec::new(),
            rx_addr: 0x20,
            dio0_wired: false,
            channel_rssi: 0,
            writes: Vec::new(),
            fifo_writes: 0,
            irq_reads: 0,
            delays: 0,
            resets: 0,
            elapsed: 0,
        };
        s.power_on(0x12);
        s
    }

    pub fn with_version(version: u8) -> Self {
        let mut s = Self::new();
        s.power_on(version);
        s
    }

    fn power_on(&mut self, version: u8) {
        self.regs = [0u8; 0x80];
        self.regs[Common::OPMODE as usize] = 0x09;
        self.regs[Common::LNA as usize] = 0x20;
        self.regs[Common::VERSION as usize] = version;
        self.regs[Common::PADAC as usize] = 0x84;
        self.regs[LoRa::INVERTIQ as usize] = 0x27;
        self.regs[LoRa::INVERTIQ2 as usize] = 0x1D;
    }

    pub fn reg<R: Into<u8>>(&self, reg: R) -> u8 {
        self.regs[reg.into() as usize]
    }

    pub fn state(&self) -> u8 {
        self.reg(Common::OPMODE) & 0x07
    }

    /// Values written to a register, in order
    pub fn writes_to<R: Into<u8>>(&self, reg: R) -> Vec<u8> {
        let reg = reg.into();
        self.writes
            .iter()
            .filter(|(r, _)| *r == reg)
            .map(|(_, v)| *v)
            .collect()
    }

    fn write(&mut self, addr: u8, value: u8) {
        self.writes.push((addr, value));

        if addr == LoRa::IRQFLAGS as u8 {
            self.regs[addr as usize] &= !value;
            return;
        }

        self.regs[addr as usize] = value;

        if addr == Common::OPMODE as u8 {
            self.elapsed = 0;

            // Packets already in flight arrive as soon as receive starts
            if self.state() == 0x05 && self.rx_after == 0 && !self.rx_queue.is_empty() {
                let p = self.rx_queue.remove(0);
                self.deliver(p);
            }
        }
    }

    fn tick(&mut self) {
        self.elapsed += 1;

        match self.state() {
            // Tx
            0x03 => {
                if let Some(n) = self.tx_done_after {
                    if self.elapsed >= n {
                        self.regs[LoRa::IRQFLAGS as usize] |= Irq::TX_DONE.bits();
                        // Chip falls back to standby after transmission
                        let opmode = self.reg(Common::OPMODE);
                        self.regs[Common::OPMODE as usize] = (opmode & !0x07) | 0x01;
                    }
                }
            }
            // Rx continuous
            0x05 => {
                if self.elapsed >= self.rx_after && !self.rx_queue.is_empty() {
                    self.elapsed = 0;
                    let p = self.rx_queue.remove(0);
                    self.deliver(p);
                }
            }
            _ => (),
        }
    }

    fn deliver(&mut self, p: Packet) {
        let mut addr = self.rx_addr;
        for b in &p.data {
            self.fifo[addr as usize] = *b;
            addr = addr.wrapping_add(1);
        }

        self.regs[LoRa::FIFORXCURRENTADDR as usize] = self.rx_addr;
        self.regs[LoRa::RXNBBYTES as usize] = p.data.len() as u8;
        self.regs[LoRa::PKTRSSIVALUE as usize] = p.rssi;
        self.regs[LoRa::PKTSNRVALUE as usize] = p.snr;

        self.regs[LoRa::IRQFLAGS as usize] |= p.flags.bits();
    }
}

impl Base<(), ()> for SimChip {
    fn reset(&mut self) -> Result<(), SimError> {
        self.resets += 1;
        let version = self.reg(Common::VERSION);
        self.power_on(version);
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delays += 1;
            self.tick();
        }
    }

    fn irq_pending(&mut self) -> Result<Option<bool>, SimError> {
        if !self.dio0_wired {
            return Ok(None);
        }

        let flags = Irq::from_bits_truncate(self.reg(LoRa::IRQFLAGS));
        let level = match self.reg(Common::DIOMAPPING1) & 0xC0 {
            0x00 => flags.contains(Irq::RX_DONE),
            0x40 => flags.contains(Irq::TX_DONE),
            _ => flags.contains(Irq::CAD_DONE),
        };

        Ok(Some(level))
    }

    fn write_regs(&mut self, reg: u8, data: &[u8]) -> Result<(), SimError> {
        assert!(reg & 0x80 == 0, "address must be passed without the access flag");

        if reg == Common::FIFO as u8 {
            for b in data {
                let ptr = self.reg(LoRa::FIFOADDRPTR);
                self.fifo[ptr as usize] = *b;
                self.regs[LoRa::FIFOADDRPTR as usize] = ptr.wrapping_add(1);
            }
            self.fifo_writes += data.len();
            return Ok(());
        }

        for (i, b) in data.iter().enumerate() {
            self.write(reg + i as u8, *b);
        }

        Ok(())
    }

    fn read_regs(&mut self, reg: u8, data: &mut [u8]) -> Result<(), SimError> {
        if reg == Common::FIFO as u8 {
            for b in data.iter_mut() {
                let ptr = self.reg(LoRa::FIFOADDRPTR);
                *b = self.fifo[ptr as usize];
                self.regs[LoRa::FIFOADDRPTR as usize] = ptr.wrapping_add(1);
            }
            return Ok(());
        }

        if reg == LoRa::IRQFLAGS as u8 {
            self.irq_reads += 1;
        }

        for (i, b) in data.iter_mut().enumerate() {
            let addr = reg as usize + i;
            *b = if addr == LoRa::RSSIVALUE as usize {
                self.channel_rssi
            } else {
                self.regs[addr]
            };
        }

        Ok(())
    }
}
