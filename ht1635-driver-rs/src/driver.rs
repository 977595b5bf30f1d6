//! Low-level HT1635 transaction framing.
//!
//! Builds command and RAM-write transactions and applies the mandatory
//! pause after each one.
//!
//! This module is crate-private. Consumers use [`Ht1635`](crate::Ht1635).

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::error::Ht1635Error;
use crate::registers::{CMD_DISPLAY_DATA, MAX_PAYLOAD, RAM_BYTES, TRANSACTION_DELAY_US};

/// Transaction-level HT1635 driver.
///
/// Owns the I2C peripheral and the delay provider.
pub(crate) struct Ht1635Bus<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D> Ht1635Bus<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    pub async fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    /// Send a two-byte `[opcode, parameter]` command.
    pub async fn command(&mut self, opcode: u8, param: u8) -> Result<(), Ht1635Error<I2C::Error>> {
        let result = self.i2c.write(self.address, &[opcode, param]).await;
        self.delay.delay_us(TRANSACTION_DELAY_US).await;
        result?;
        Ok(())
    }

    /// Write `bytes` to display RAM starting at byte `start`.
    ///
    /// Splits into transactions of at most [`MAX_PAYLOAD`] data bytes, each
    /// prefixed with `[CMD_DISPLAY_DATA, 2·index]` for its first byte.
    /// Stops at the first bus error. Returns the byte index after the
    /// region.
    pub async fn write_ram(
        &mut self,
        start: usize,
        bytes: &[u8],
    ) -> Result<usize, Ht1635Error<I2C::Error>> {
        let end = start
            .checked_add(bytes.len())
            .filter(|&end| end <= RAM_BYTES)
            .ok_or(Ht1635Error::OutOfRange)?;

        let mut index = start;
        for chunk in bytes.chunks(MAX_PAYLOAD) {
            // Full write buffer: [opcode, nibble_address, d0, d1, …]
            let mut buf = [0u8; MAX_PAYLOAD + 2];
            buf[0] = CMD_DISPLAY_DATA;
            buf[1] = (index * 2) as u8;
            buf[2..2 + chunk.len()].copy_from_slice(chunk);

            let result = self.i2c.write(self.address, &buf[..2 + chunk.len()]).await;
            self.delay.delay_us(TRANSACTION_DELAY_US).await;
            result?;

            index += chunk.len();
        }
        Ok(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDelay, MockI2c};
    use embassy_futures::block_on;

    fn bus() -> Ht1635Bus<MockI2c, MockDelay> {
        Ht1635Bus::new(MockI2c::new(), MockDelay::new(), 0x68)
    }

    #[test]
    fn command_is_two_bytes_followed_by_delay() {
        let mut bus = bus();
        block_on(bus.command(0x82, 0x03)).unwrap();
        let (i2c, delay) = bus.release();
        assert_eq!(i2c.writes().len(), 1);
        assert_eq!(i2c.writes()[0].address, 0x68);
        assert_eq!(i2c.writes()[0].bytes.as_slice(), &[0x82, 0x03]);
        assert_eq!(delay.total_us(), 1_000);
    }

    #[test]
    fn ram_write_splits_at_payload_limit() {
        let mut bus = bus();
        let data = [0xAAu8; 40];
        block_on(bus.write_ram(0, &data)).unwrap();
        let (i2c, delay) = bus.release();

        let w = i2c.writes();
        assert_eq!(w.len(), 2);
        assert_eq!(w[0].bytes.len(), 32);
        assert_eq!(&w[0].bytes[..2], &[0x80, 0]);
        assert_eq!(w[1].bytes.len(), 12);
        assert_eq!(&w[1].bytes[..2], &[0x80, 60]);
        assert_eq!(delay.total_us(), 2_000);
    }

    #[test]
    fn ram_write_address_continues_from_offset() {
        let mut bus = bus();
        block_on(bus.write_ram(5, &[1, 2, 3])).unwrap();
        let (i2c, _) = bus.release();
        assert_eq!(i2c.writes()[0].bytes.as_slice(), &[0x80, 10, 1, 2, 3]);
    }

    #[test]
    fn ram_write_rejects_overrun() {
        let mut bus = bus();
        assert_eq!(
            block_on(bus.write_ram(40, &[0; 5])),
            Err(Ht1635Error::OutOfRange)
        );
        let (i2c, _) = bus.release();
        assert!(i2c.writes().is_empty());
    }

    #[test]
    fn ram_write_rejects_overflowing_start() {
        let mut bus = bus();
        assert_eq!(
            block_on(bus.write_ram(usize::MAX, &[0; 2])),
            Err(Ht1635Error::OutOfRange)
        );
        let (i2c, _) = bus.release();
        assert_eq!(i2c.attempts(), 0);
    }

    #[test]
    fn ram_write_returns_end_index() {
        let mut bus = bus();
        assert_eq!(block_on(bus.write_ram(40, &[0; 4])), Ok(44));
    }

    #[test]
    fn ram_write_stops_at_first_error() {
        let mut i2c = MockI2c::new();
        i2c.fail_at(0);
        let mut bus = Ht1635Bus::new(i2c, MockDelay::new(), 0x68);
        assert!(matches!(
            block_on(bus.write_ram(0, &[0; 40])),
            Err(Ht1635Error::I2c(_))
        ));
        let (i2c, _) = bus.release();
        assert_eq!(i2c.attempts(), 1);
    }
}
