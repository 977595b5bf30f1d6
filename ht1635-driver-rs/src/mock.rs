//! Recording I2C bus and delay for host tests.
//!
//! [`MockI2c`] records every write transaction and keeps a model of the
//! controller's display RAM, so tests can assert both the exact byte stream
//! and what ends up on the LEDs. [`MockDelay`] returns immediately and
//! accumulates the requested time.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};
use heapless::Vec;

use crate::registers::{CMD_DISPLAY_DATA, MAX_PAYLOAD, RAM_BYTES};

/// Maximum number of recorded writes. Older writes are kept; later ones are
/// still applied to the RAM model but no longer recorded.
pub const MAX_RECORDED: usize = 256;

/// One recorded write transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub address: u8,
    pub bytes: Vec<u8, { MAX_PAYLOAD + 2 }>,
}

impl Write {
    /// First byte of the transaction.
    pub fn opcode(&self) -> Option<u8> {
        self.bytes.first().copied()
    }

    /// Whether this is a display RAM write.
    pub fn is_ram_write(&self) -> bool {
        self.opcode() == Some(CMD_DISPLAY_DATA)
    }
}

/// In-memory I2C bus recording writes.
#[derive(Debug)]
pub struct MockI2c {
    writes: Vec<Write, MAX_RECORDED>,
    ram: [u8; RAM_BYTES],
    attempts: usize,
    fail_at: Option<usize>,
}

impl Default for MockI2c {
    fn default() -> Self {
        Self::new()
    }
}

impl MockI2c {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            ram: [0; RAM_BYTES],
            attempts: 0,
            fail_at: None,
        }
    }

    /// All recorded writes, oldest first.
    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    /// Recorded display RAM writes only.
    pub fn ram_writes(&self) -> impl Iterator<Item = &Write> {
        self.writes.iter().filter(|w| w.is_ram_write())
    }

    /// Recorded configuration commands as `(opcode, parameter)` pairs.
    pub fn commands(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.writes
            .iter()
            .filter(|w| !w.is_ram_write() && w.bytes.len() == 2)
            .map(|w| (w.bytes[0], w.bytes[1]))
    }

    /// Display RAM as the controller would hold it.
    pub fn ram(&self) -> [u8; RAM_BYTES] {
        self.ram
    }

    /// Number of transactions attempted, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Fail the transaction with this zero-based attempt number.
    pub fn fail_at(&mut self, attempt: usize) {
        self.fail_at = Some(attempt);
    }

    /// Fail the next transaction.
    pub fn fail_next(&mut self) {
        self.fail_at = Some(self.attempts);
    }

    /// Forget recorded writes. The RAM model is kept.
    pub fn clear(&mut self) {
        self.writes.clear();
    }

    fn record(&mut self, address: u8, bytes: &[u8]) {
        if bytes.first() == Some(&CMD_DISPLAY_DATA) && bytes.len() >= 2 {
            let start = bytes[1] as usize / 2;
            for (i, &b) in bytes[2..].iter().enumerate() {
                if let Some(cell) = self.ram.get_mut(start + i) {
                    *cell = b;
                }
            }
        }

        let mut recorded = Vec::new();
        let _ = recorded.extend_from_slice(&bytes[..bytes.len().min(MAX_PAYLOAD + 2)]);
        let _ = self.writes.push(Write {
            address,
            bytes: recorded,
        });
    }
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c<SevenBitAddress> for MockI2c {
    async fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_at == Some(attempt) {
            self.fail_at = None;
            return Err(ErrorKind::Bus);
        }

        for op in operations {
            match op {
                Operation::Write(bytes) => self.record(address, bytes),
                Operation::Read(buf) => buf.fill(0),
            }
        }
        Ok(())
    }
}

/// Delay that returns immediately and accumulates the requested time.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockDelay {
    total_ns: u64,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_us(&self) -> u64 {
        self.total_ns / 1_000
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }

    async fn delay_us(&mut self, us: u32) {
        self.total_ns += us as u64 * 1_000;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.total_ns += ms as u64 * 1_000_000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn ram_model_follows_display_writes() {
        let mut i2c = MockI2c::new();
        block_on(i2c.write(0x68, &[0x80, 4, 0xAA, 0xBB])).unwrap();
        let ram = i2c.ram();
        assert_eq!(ram[2], 0xAA);
        assert_eq!(ram[3], 0xBB);
        assert_eq!(ram[0], 0);
    }

    #[test]
    fn commands_are_listed_separately() {
        let mut i2c = MockI2c::new();
        block_on(i2c.write(0x68, &[0x82, 0x03])).unwrap();
        block_on(i2c.write(0x68, &[0x80, 0, 1])).unwrap();
        let cmds: heapless::Vec<(u8, u8), 4> = i2c.commands().collect();
        assert_eq!(cmds.as_slice(), &[(0x82, 0x03)]);
        assert_eq!(i2c.ram_writes().count(), 1);
    }

    #[test]
    fn injected_failure_is_not_recorded() {
        let mut i2c = MockI2c::new();
        i2c.fail_next();
        assert_eq!(block_on(i2c.write(0x68, &[0x82, 0x03])), Err(ErrorKind::Bus));
        assert!(i2c.writes().is_empty());
        assert!(block_on(i2c.write(0x68, &[0x82, 0x03])).is_ok());
        assert_eq!(i2c.attempts(), 2);
    }

    #[test]
    fn delay_accumulates() {
        let mut d = MockDelay::new();
        block_on(d.delay_ms(3));
        block_on(d.delay_us(500));
        assert_eq!(d.total_us(), 3_500);
        assert_eq!(d.total_ms(), 3);
    }
}
