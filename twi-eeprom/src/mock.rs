//! Simulated 24C02 on a TWI bus
//!
//! A deterministic [`TwiBus`] double that answers like a real controller
//! with a 24Cxx EEPROM attached: START vs repeated START, address ACK/NAK,
//! the device's internal address pointer, page-buffered writes committed on
//! STOP, and a number of busy NAKs after every write cycle. Every primitive
//! call is recorded so tests can assert exact bus sequences.

use heapless::Vec;
use twi_hal::{Direction, StatusCode, TwiBus, TwiConfig, TwiError};

use crate::config::{MAX_CAPACITY, PAGE_SIZE};

/// Events kept in the bus log; later events are dropped
pub const EVENT_CAPACITY: usize = 1024;

const MEMORY_SIZE: usize = MAX_CAPACITY as usize;

/// One primitive call as seen on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    Init,
    Start,
    Stop,
    Address {
        address: u8,
        direction: Direction,
        acked: bool,
    },
    Transmit(u8),
    Receive {
        data: u8,
        ack: bool,
    },
}

/// Where the simulated device is within a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Started,
    /// Addressed for writing, next byte is the word address
    WordAddress,
    Writing,
    Reading,
    /// Address phase was not acknowledged
    Unselected,
}

/// Simulated EEPROM and controller
pub struct SimulatedEeprom {
    memory: [u8; MEMORY_SIZE],
    device_address: u8,
    busy_polls: u32,
    busy_remaining: u32,
    prescaler_bits: u8,
    status: StatusCode,
    phase: Phase,
    pointer: u8,
    page_latch: [Option<u8>; PAGE_SIZE],
    page_base: u8,
    nak_data: bool,
    hung: bool,
    write_cycles: u32,
    events: Vec<BusEvent, EVENT_CAPACITY>,
}

impl SimulatedEeprom {
    /// Erased device (all bytes `0xFF`) answering at `device_address`
    pub fn new(device_address: u8) -> Self {
        Self {
            memory: [0xFF; MEMORY_SIZE],
            device_address,
            busy_polls: 0,
            busy_remaining: 0,
            prescaler_bits: 0,
            status: StatusCode::IDLE,
            phase: Phase::Idle,
            pointer: 0,
            page_latch: [None; PAGE_SIZE],
            page_base: 0,
            nak_data: false,
            hung: false,
            write_cycles: 0,
            events: Vec::new(),
        }
    }

    /// NAK this many address attempts after every write cycle
    pub fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }

    /// Preload memory contents starting at address 0
    pub fn with_memory(mut self, contents: &[u8]) -> Self {
        let len = contents.len().min(MEMORY_SIZE);
        self.memory[..len].copy_from_slice(&contents[..len]);
        self
    }

    /// NAK every data byte sent to the device
    pub fn set_data_nak(&mut self, nak: bool) {
        self.nak_data = nak;
    }

    /// Make every primitive time out, as if TWINT never rose
    pub fn set_hung(&mut self, hung: bool) {
        self.hung = hung;
    }

    /// Device memory
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Recorded bus events
    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Completed internal write cycles
    pub fn write_cycles(&self) -> u32 {
        self.write_cycles
    }

    /// Number of START conditions in the log
    pub fn starts(&self) -> usize {
        self.count(|e| matches!(e, BusEvent::Start))
    }

    /// Number of STOP conditions in the log
    pub fn stops(&self) -> usize {
        self.count(|e| matches!(e, BusEvent::Stop))
    }

    /// Number of address headers sent, acknowledged or not
    pub fn address_attempts(&self) -> usize {
        self.count(|e| matches!(e, BusEvent::Address { .. }))
    }

    /// Bytes transmitted by the master, in order
    pub fn transmitted(&self) -> impl Iterator<Item = u8> + '_ {
        self.events.iter().filter_map(|e| match e {
            BusEvent::Transmit(byte) => Some(*byte),
            _ => None,
        })
    }

    /// Acknowledge flags of every received byte, in order
    pub fn receive_acks(&self) -> impl Iterator<Item = bool> + '_ {
        self.events.iter().filter_map(|e| match e {
            BusEvent::Receive { ack, .. } => Some(*ack),
            _ => None,
        })
    }

    fn count(&self, predicate: impl Fn(&BusEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(*e)).count()
    }

    fn record(&mut self, event: BusEvent) {
        // Full log: drop the event rather than fail the bus step
        let _ = self.events.push(event);
    }

    fn check_hung(&self) -> Result<(), TwiError> {
        if self.hung {
            Err(TwiError::Timeout)
        } else {
            Ok(())
        }
    }

    /// Commit latched page bytes and start the internal write cycle
    fn commit(&mut self) {
        if self.page_latch.iter().all(Option::is_none) {
            return;
        }
        for (offset, slot) in self.page_latch.iter_mut().enumerate() {
            if let Some(byte) = slot.take() {
                let address = usize::from(self.page_base) + offset;
                self.memory[address] = byte;
            }
        }
        self.write_cycles += 1;
        self.busy_remaining = self.busy_polls;
    }
}

impl TwiBus for SimulatedEeprom {
    fn init(&mut self, config: &TwiConfig) -> Result<(), TwiError> {
        config.bit_rate()?;
        self.prescaler_bits = config.prescaler.bits();
        self.status = StatusCode::IDLE;
        self.phase = Phase::Idle;
        self.record(BusEvent::Init);
        Ok(())
    }

    fn read_status(&self) -> StatusCode {
        // Real TWSR carries the prescaler in its low bits
        StatusCode::from_raw(self.status.bits() | self.prescaler_bits)
    }

    fn start(&mut self) -> Result<(), TwiError> {
        self.check_hung()?;
        self.status = if self.phase == Phase::Idle {
            StatusCode::START
        } else {
            StatusCode::REPEATED_START
        };
        self.phase = Phase::Started;
        self.record(BusEvent::Start);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), TwiError> {
        self.check_hung()?;
        self.commit();
        self.status = StatusCode::IDLE;
        self.phase = Phase::Idle;
        self.record(BusEvent::Stop);
        Ok(())
    }

    fn transmit_address(&mut self, address: u8, direction: Direction) -> Result<(), TwiError> {
        self.check_hung()?;
        let mut acked = self.phase == Phase::Started && address == self.device_address;
        if acked && self.busy_remaining > 0 {
            // Internal write cycle still running
            self.busy_remaining -= 1;
            acked = false;
        }

        self.status = if acked {
            StatusCode::address_ack(direction)
        } else {
            match direction {
                Direction::Write => StatusCode::SLA_W_NAK,
                Direction::Read => StatusCode::SLA_R_NAK,
            }
        };
        self.phase = match (acked, direction) {
            (false, _) => Phase::Unselected,
            (true, Direction::Write) => Phase::WordAddress,
            (true, Direction::Read) => Phase::Reading,
        };
        self.record(BusEvent::Address {
            address,
            direction,
            acked,
        });
        Ok(())
    }

    fn transmit_byte(&mut self, data: u8) -> Result<(), TwiError> {
        self.check_hung()?;
        let phase = self.phase;
        let acked = match phase {
            _ if self.nak_data => false,
            Phase::WordAddress => {
                self.pointer = data;
                self.page_base = data & !(PAGE_SIZE as u8 - 1);
                self.phase = Phase::Writing;
                true
            }
            Phase::Writing => {
                let offset = usize::from(self.pointer) % PAGE_SIZE;
                self.page_latch[offset] = Some(data);
                // The pointer rolls over within the page
                self.pointer = self.page_base | ((offset as u8 + 1) % PAGE_SIZE as u8);
                true
            }
            _ => false,
        };

        self.status = if acked {
            StatusCode::DATA_SENT_ACK
        } else {
            StatusCode::DATA_SENT_NAK
        };
        self.record(BusEvent::Transmit(data));
        Ok(())
    }

    fn receive_byte(&mut self, ack: bool) -> Result<u8, TwiError> {
        self.check_hung()?;
        let data = if self.phase == Phase::Reading {
            let byte = self.memory[usize::from(self.pointer)];
            self.pointer = self.pointer.wrapping_add(1);
            byte
        } else {
            // Nobody drives SDA; the pull-up reads as ones
            0xFF
        };

        self.status = StatusCode::received(ack);
        self.record(BusEvent::Receive { data, ack });
        Ok(data)
    }
}
