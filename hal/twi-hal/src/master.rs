//! `embedded-hal` I2C adapter
//!
//! Wraps any [`TwiBus`] so the primitives can drive ordinary
//! `embedded-hal` 1.0 device drivers. Every step is checked against the
//! status the protocol expects, and the bus is always released with a STOP,
//! also after a failed step.

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};

use crate::error::TwiError;
use crate::i2c::{Direction, TwiBus};
use crate::status::StatusCode;

/// I2C master built from step-level primitives
pub struct TwiMaster<B> {
    bus: B,
}

impl<B: TwiBus> TwiMaster<B> {
    /// Wrap a bus that has already been initialised
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Access the underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }

    fn check(&self, expected: &[StatusCode]) -> Result<(), TwiError> {
        self.bus.read_status().expect_any(expected)
    }

    fn address(&mut self, address: u8, direction: Direction) -> Result<(), TwiError> {
        self.bus.start()?;
        self.check(&[StatusCode::START, StatusCode::REPEATED_START])?;
        self.bus.transmit_address(address, direction)?;
        self.check(&[StatusCode::address_ack(direction)])
    }

    fn run(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), TwiError> {
        let mut current: Option<Direction> = None;

        for i in 0..operations.len() {
            // Adjacent reads form one burst; only its very last byte is NAKed
            let next_is_read = matches!(operations.get(i + 1), Some(Operation::Read(_)));

            match &mut operations[i] {
                Operation::Write(bytes) => {
                    if current != Some(Direction::Write) {
                        self.address(address, Direction::Write)?;
                        current = Some(Direction::Write);
                    }
                    for &byte in bytes.iter() {
                        self.bus.transmit_byte(byte)?;
                        self.check(&[StatusCode::DATA_SENT_ACK])?;
                    }
                }
                Operation::Read(buffer) => {
                    if current != Some(Direction::Read) {
                        self.address(address, Direction::Read)?;
                        current = Some(Direction::Read);
                    }
                    let len = buffer.len();
                    for (j, byte) in buffer.iter_mut().enumerate() {
                        let ack = next_is_read || j + 1 < len;
                        *byte = self.bus.receive_byte(ack)?;
                        self.check(&[StatusCode::received(ack)])?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl<B: TwiBus> ErrorType for TwiMaster<B> {
    type Error = TwiError;
}

impl<B: TwiBus> I2c for TwiMaster<B> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if operations.is_empty() {
            return Ok(());
        }

        match self.run(address, operations) {
            Ok(()) => self.bus.stop(),
            Err(e) => {
                // Release the bus; the step error is the one worth reporting
                let _ = self.bus.stop();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i2c::{header, TwiConfig};

    /// Scripted bus: one register byte behind a single slave address
    struct ScriptedBus {
        slave: u8,
        status: StatusCode,
        selected: bool,
        register: u8,
        log: [u8; 32],
        logged: usize,
        stops: usize,
    }

    impl ScriptedBus {
        fn new(slave: u8) -> Self {
            Self {
                slave,
                status: StatusCode::IDLE,
                selected: false,
                register: 0x3C,
                log: [0; 32],
                logged: 0,
                stops: 0,
            }
        }

        fn record(&mut self, byte: u8) {
            self.log[self.logged] = byte;
            self.logged += 1;
        }
    }

    impl TwiBus for ScriptedBus {
        fn init(&mut self, _config: &TwiConfig) -> Result<(), TwiError> {
            Ok(())
        }

        fn read_status(&self) -> StatusCode {
            self.status
        }

        fn start(&mut self) -> Result<(), TwiError> {
            self.status = if self.status == StatusCode::IDLE {
                StatusCode::START
            } else {
                StatusCode::REPEATED_START
            };
            Ok(())
        }

        fn stop(&mut self) -> Result<(), TwiError> {
            self.stops += 1;
            self.status = StatusCode::IDLE;
            Ok(())
        }

        fn transmit_address(&mut self, address: u8, direction: Direction) -> Result<(), TwiError> {
            self.record(header(address, direction));
            self.selected = address == self.slave;
            self.status = match (self.selected, direction) {
                (true, Direction::Write) => StatusCode::SLA_W_ACK,
                (false, Direction::Write) => StatusCode::SLA_W_NAK,
                (true, Direction::Read) => StatusCode::SLA_R_ACK,
                (false, Direction::Read) => StatusCode::SLA_R_NAK,
            };
            Ok(())
        }

        fn transmit_byte(&mut self, data: u8) -> Result<(), TwiError> {
            self.record(data);
            self.status = StatusCode::DATA_SENT_ACK;
            Ok(())
        }

        fn receive_byte(&mut self, ack: bool) -> Result<u8, TwiError> {
            self.status = StatusCode::received(ack);
            self.record(if ack { 0xAA } else { 0x55 });
            Ok(self.register)
        }
    }

    #[test]
    fn test_write_read_uses_repeated_start() {
        let mut master = TwiMaster::new(ScriptedBus::new(0x48));
        let mut buffer = [0u8; 2];

        master.write_read(0x48, &[0x01], &mut buffer).unwrap();

        let bus = master.release();
        assert_eq!(buffer, [0x3C, 0x3C]);
        // SLA+W, register, SLA+R, ACKed byte, NAKed byte
        assert_eq!(&bus.log[..bus.logged], &[0x90, 0x01, 0x91, 0xAA, 0x55]);
        assert_eq!(bus.stops, 1);
    }

    #[test]
    fn test_adjacent_reads_share_one_burst() {
        let mut master = TwiMaster::new(ScriptedBus::new(0x48));
        let mut first = [0u8; 1];
        let mut second = [0u8; 1];

        master
            .transaction(
                0x48,
                &mut [Operation::Read(&mut first), Operation::Read(&mut second)],
            )
            .unwrap();

        let bus = master.release();
        assert_eq!(&bus.log[..bus.logged], &[0x91, 0xAA, 0x55]);
    }

    #[test]
    fn test_missing_device_is_address_nak() {
        let mut master = TwiMaster::new(ScriptedBus::new(0x48));

        let result = master.write(0x21, &[0x00]);

        assert_eq!(result, Err(TwiError::Nak(StatusCode::SLA_W_NAK)));
        // Bus is still released after the failure
        assert_eq!(master.bus().stops, 1);
        assert_eq!(master.bus().read_status(), StatusCode::IDLE);
    }

    #[test]
    fn test_empty_transaction_is_a_no_op() {
        let mut master = TwiMaster::new(ScriptedBus::new(0x48));
        master.transaction(0x48, &mut []).unwrap();
        assert_eq!(master.bus().stops, 0);
    }
}
