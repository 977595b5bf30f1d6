//! High-level interface for the HT1635 on the 5-panel tuner display.
//!
//! [`Ht1635`] wraps the transaction layer with the register mirror,
//! range-checked RAM writes and the controller bring-up sequence.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::bitmap::Bitmap;
use crate::driver::Ht1635Bus;
use crate::error::Ht1635Error;
use crate::registers::{
    BlinkRate, CascadeMode, ComPins, DeviceRegisters, PowerMode, CMD_BLINK,
    CMD_CASCADE, CMD_COM_OPTION, CMD_PWM_DUTY, CMD_SYSTEM_MODE, PWM_MAX, RAM_BYTES,
};

/// HT1635 LED matrix controller.
///
/// Owns the I2C bus and a delay provider. Every transaction is followed by
/// a 1 ms pause. Configuration setters update the register mirror first,
/// so a failed transmission is repaired by the next
/// [`reinitialize`](Self::reinitialize).
///
/// # Example
///
/// ```no_run
/// use ht1635_driver::{Bitmap, Ht1635, PowerMode, DEFAULT_ADDRESS};
///
/// # async fn example<I: embedded_hal_async::i2c::I2c, D: embedded_hal_async::delay::DelayNs>(i2c: I, delay: D) -> Result<(), ht1635_driver::Ht1635Error<I::Error>> {
/// let mut display = Ht1635::new(i2c, delay, DEFAULT_ADDRESS);
/// display.reinitialize().await?;
/// display.set_pwm_duty(8).await?;
///
/// // Light the leftmost column of panel 4, row 6.
/// display.write_byte(4 * 8 + 6, 0x80).await?;
/// # Ok(())
/// # }
/// ```
pub struct Ht1635<I2C, D> {
    bus: Ht1635Bus<I2C, D>,
    registers: DeviceRegisters,
    cursor: u8,
}

impl<I2C, D> Ht1635<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Create a driver. No bus traffic until the first call.
    ///
    /// # Arguments
    /// * `i2c` — I2C peripheral (takes ownership for exclusive access)
    /// * `delay` — delay provider for the inter-transaction pause
    /// * `address` — 7-bit I2C address (typically [`DEFAULT_ADDRESS`](crate::DEFAULT_ADDRESS))
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            bus: Ht1635Bus::new(i2c, delay, address),
            registers: DeviceRegisters::default(),
            cursor: 0,
        }
    }

    /// Current register mirror.
    pub fn registers(&self) -> &DeviceRegisters {
        &self.registers
    }

    /// RAM byte index following the last byte written.
    pub fn cursor(&self) -> u8 {
        self.cursor
    }

    /// Give back the bus and the delay provider.
    pub fn release(self) -> (I2C, D) {
        self.bus.release()
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    pub async fn set_power_mode(&mut self, mode: PowerMode) -> Result<(), Ht1635Error<I2C::Error>> {
        self.registers.power = mode;
        self.bus.command(CMD_SYSTEM_MODE, mode as u8).await
    }

    pub async fn set_blink_rate(&mut self, rate: BlinkRate) -> Result<(), Ht1635Error<I2C::Error>> {
        self.registers.blink = rate;
        self.bus.command(CMD_BLINK, rate as u8).await
    }

    /// Set the global brightness. Values above [`PWM_MAX`] are clamped.
    pub async fn set_pwm_duty(&mut self, duty: u8) -> Result<(), Ht1635Error<I2C::Error>> {
        let duty = duty.min(PWM_MAX);
        self.registers.pwm = duty;
        self.bus.command(CMD_PWM_DUTY, duty).await
    }

    pub async fn set_cascade_mode(
        &mut self,
        mode: CascadeMode,
    ) -> Result<(), Ht1635Error<I2C::Error>> {
        self.registers.cascade = mode;
        self.bus.command(CMD_CASCADE, mode as u8).await
    }

    pub async fn set_com_pins(&mut self, pins: ComPins) -> Result<(), Ht1635Error<I2C::Error>> {
        self.registers.com_pins = pins;
        self.bus.command(CMD_COM_OPTION, pins as u8).await
    }

    /// Replay the register mirror and clear the display RAM.
    ///
    /// Order: standby, blink, cascade, COM pins, PWM, clear RAM, power on.
    /// Stops at the first bus error.
    pub async fn reinitialize(&mut self) -> Result<(), Ht1635Error<I2C::Error>> {
        let regs = self.registers;
        self.cursor = 0;
        self.set_power_mode(PowerMode::Standby).await?;
        self.set_blink_rate(regs.blink).await?;
        self.set_cascade_mode(regs.cascade).await?;
        self.set_com_pins(regs.com_pins).await?;
        self.set_pwm_duty(regs.pwm).await?;
        self.clear().await?;
        self.set_power_mode(PowerMode::On).await
    }

    /// Restore the power-on register defaults and reinitialise.
    pub async fn reset_defaults(&mut self) -> Result<(), Ht1635Error<I2C::Error>> {
        self.registers = DeviceRegisters::default();
        self.reinitialize().await
    }

    // -----------------------------------------------------------------------
    // Display RAM
    // -----------------------------------------------------------------------

    /// Transmit bytes `start_byte..40` of `bitmap`.
    ///
    /// # Errors
    /// * [`Ht1635Error::OutOfRange`] if `start_byte > 40`
    /// * [`Ht1635Error::I2c`] on the first failed transaction
    pub async fn write_bitmap(
        &mut self,
        bitmap: &Bitmap,
        start_byte: usize,
    ) -> Result<(), Ht1635Error<I2C::Error>> {
        let bytes = bitmap
            .as_bytes()
            .get(start_byte..)
            .ok_or(Ht1635Error::OutOfRange)?;
        self.write_region(start_byte, bytes).await
    }

    /// Transmit `bytes` to display RAM starting at byte `start_byte`.
    ///
    /// # Errors
    /// * [`Ht1635Error::OutOfRange`] if the region extends past RAM byte 43
    /// * [`Ht1635Error::I2c`] on the first failed transaction
    pub async fn write_region(
        &mut self,
        start_byte: usize,
        bytes: &[u8],
    ) -> Result<(), Ht1635Error<I2C::Error>> {
        let end = self.bus.write_ram(start_byte, bytes).await?;
        self.cursor = end as u8;
        Ok(())
    }

    /// Write a single RAM byte and return the advanced cursor (`index + 1`).
    pub async fn write_byte(
        &mut self,
        index: usize,
        value: u8,
    ) -> Result<u8, Ht1635Error<I2C::Error>> {
        if index >= RAM_BYTES {
            return Err(Ht1635Error::OutOfRange);
        }
        let end = self.bus.write_ram(index, &[value]).await?;
        self.cursor = end as u8;
        Ok(self.cursor)
    }

    /// Zero all 44 RAM bytes, including the four not wired to LEDs.
    pub async fn clear(&mut self) -> Result<(), Ht1635Error<I2C::Error>> {
        self.write_region(0, &[0; RAM_BYTES]).await?;
        self.cursor = 0;
        Ok(())
    }

    /// Startup effect: show `bitmap` at zero brightness, then ramp the PWM
    /// duty up one step every `step_ms`, holding the last step as well.
    pub async fn fade_in(
        &mut self,
        bitmap: &Bitmap,
        step_ms: u32,
    ) -> Result<(), Ht1635Error<I2C::Error>> {
        self.set_pwm_duty(0).await?;
        self.write_bitmap(bitmap, 0).await?;
        for level in 0..=PWM_MAX {
            self.set_pwm_duty(level).await?;
            self.bus.delay_ms(step_ms).await;
        }
        self.bus.delay_ms(step_ms).await;

        #[cfg(feature = "defmt")]
        defmt::debug!("ht1635: fade-in done at duty {}", PWM_MAX);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDelay, MockI2c};
    use crate::registers::{BITMAP_LEN, CMD_DISPLAY_DATA, DEFAULT_ADDRESS};
    use embassy_futures::block_on;
    use heapless::Vec;

    fn display() -> Ht1635<MockI2c, MockDelay> {
        Ht1635::new(MockI2c::new(), MockDelay::new(), DEFAULT_ADDRESS)
    }

    fn commands(i2c: &MockI2c) -> Vec<(u8, u8), 64> {
        i2c.commands().collect()
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn new_sends_nothing() {
        let d = display();
        assert_eq!(d.registers(), &DeviceRegisters::default());
        assert_eq!(d.cursor(), 0);
        let (i2c, _) = d.release();
        assert_eq!(i2c.attempts(), 0);
    }

    // ── Configuration ────────────────────────────────────────────────

    #[test]
    fn setters_send_opcode_and_update_mirror() {
        let mut d = display();
        block_on(d.set_blink_rate(BlinkRate::Hz1)).unwrap();
        block_on(d.set_cascade_mode(CascadeMode::Slave)).unwrap();
        block_on(d.set_com_pins(ComPins::NMos)).unwrap();
        block_on(d.set_power_mode(PowerMode::On)).unwrap();
        assert_eq!(d.registers().blink, BlinkRate::Hz1);
        assert_eq!(d.registers().cascade, CascadeMode::Slave);
        assert_eq!(d.registers().com_pins, ComPins::NMos);
        assert_eq!(d.registers().power, PowerMode::On);

        let (i2c, _) = d.release();
        assert_eq!(
            commands(&i2c).as_slice(),
            &[(0x84, 0x02), (0xA0, 0x00), (0x88, 0x00), (0x82, 0x03)]
        );
        assert!(i2c.writes().iter().all(|w| w.address == 0x68));
    }

    #[test]
    fn pwm_duty_is_clamped() {
        let mut d = display();
        block_on(d.set_pwm_duty(200)).unwrap();
        assert_eq!(d.registers().pwm, 15);
        let (i2c, _) = d.release();
        assert_eq!(commands(&i2c).as_slice(), &[(0xC0, 15)]);
    }

    #[test]
    fn mirror_updated_even_when_bus_fails() {
        let mut i2c = MockI2c::new();
        i2c.fail_next();
        let mut d = Ht1635::new(i2c, MockDelay::new(), DEFAULT_ADDRESS);
        assert!(matches!(
            block_on(d.set_pwm_duty(9)),
            Err(Ht1635Error::I2c(_))
        ));
        assert_eq!(d.registers().pwm, 9);
    }

    #[test]
    fn reinitialize_sequence() {
        let mut d = display();
        block_on(d.set_pwm_duty(7)).unwrap();
        block_on(d.reinitialize()).unwrap();
        assert_eq!(d.registers().power, PowerMode::On);
        assert_eq!(d.cursor(), 0);

        let (i2c, _) = d.release();
        let w = i2c.writes();
        // pwm, then standby, blink, cascade, com, pwm, clear ×2, on.
        assert_eq!(w.len(), 9);
        assert_eq!(w[1].bytes.as_slice(), &[0x82, 0x02]);
        assert_eq!(w[2].bytes.as_slice(), &[0x84, 0x00]);
        assert_eq!(w[3].bytes.as_slice(), &[0xA0, 0x04]);
        assert_eq!(w[4].bytes.as_slice(), &[0x88, 0x01]);
        assert_eq!(w[5].bytes.as_slice(), &[0xC0, 7]);
        assert_eq!(w[6].opcode(), Some(CMD_DISPLAY_DATA));
        assert_eq!(w[6].bytes.len(), 32);
        assert_eq!(&w[7].bytes[..2], &[0x80, 60]);
        assert_eq!(w[7].bytes.len(), 16);
        assert_eq!(w[8].bytes.as_slice(), &[0x82, 0x03]);
    }

    #[test]
    fn reset_defaults_restores_mirror() {
        let mut d = display();
        block_on(d.set_pwm_duty(12)).unwrap();
        block_on(d.set_com_pins(ComPins::NMos)).unwrap();
        block_on(d.reset_defaults()).unwrap();
        let expected = DeviceRegisters {
            power: PowerMode::On,
            ..DeviceRegisters::default()
        };
        assert_eq!(d.registers(), &expected);
    }

    #[test]
    fn reinitialize_stops_at_first_error() {
        let mut i2c = MockI2c::new();
        i2c.fail_at(2);
        let mut d = Ht1635::new(i2c, MockDelay::new(), DEFAULT_ADDRESS);
        assert!(block_on(d.reinitialize()).is_err());
        let (i2c, _) = d.release();
        assert_eq!(i2c.attempts(), 3);
    }

    // ── Display RAM ──────────────────────────────────────────────────

    #[test]
    fn full_bitmap_is_split_into_two_transactions() {
        let mut d = display();
        let mut frame = Bitmap::new();
        for (i, b) in frame.bytes_mut().iter_mut().enumerate() {
            *b = i as u8;
        }
        block_on(d.write_bitmap(&frame, 0)).unwrap();
        assert_eq!(d.cursor(), 40);

        let (i2c, delay) = d.release();
        let w = i2c.writes();
        assert_eq!(w.len(), 2);
        assert_eq!(&w[0].bytes[..3], &[0x80, 0, 0]);
        assert_eq!(w[0].bytes.len(), 32);
        assert_eq!(&w[1].bytes[..3], &[0x80, 60, 30]);
        assert_eq!(w[1].bytes.len(), 12);
        assert_eq!(&i2c.ram()[..40], frame.as_bytes());
        assert_eq!(delay.total_us(), 2_000);
    }

    #[test]
    fn partial_bitmap_starts_at_offset() {
        let mut d = display();
        let frame = Bitmap::from_bytes([0x55; BITMAP_LEN]);
        block_on(d.write_bitmap(&frame, 32)).unwrap();
        let (i2c, _) = d.release();
        let w = i2c.writes();
        assert_eq!(w.len(), 1);
        assert_eq!(&w[0].bytes[..2], &[0x80, 64]);
        assert_eq!(w[0].bytes.len(), 10);
    }

    #[test]
    fn bitmap_start_past_end_is_rejected() {
        let mut d = display();
        let frame = Bitmap::new();
        assert_eq!(
            block_on(d.write_bitmap(&frame, 41)),
            Err(Ht1635Error::OutOfRange)
        );
        // Start at the end is an empty write.
        assert_eq!(block_on(d.write_bitmap(&frame, 40)), Ok(()));
        let (i2c, _) = d.release();
        assert_eq!(i2c.attempts(), 0);
    }

    #[test]
    fn write_byte_addresses_nibble_pairs() {
        let mut d = display();
        assert_eq!(block_on(d.write_byte(38, 0xA5)), Ok(39));
        assert_eq!(d.cursor(), 39);
        assert_eq!(block_on(d.write_byte(43, 0x01)), Ok(44));
        assert_eq!(
            block_on(d.write_byte(44, 0x01)),
            Err(Ht1635Error::OutOfRange)
        );

        let (i2c, _) = d.release();
        assert_eq!(i2c.writes()[0].bytes.as_slice(), &[0x80, 76, 0xA5]);
        assert_eq!(i2c.writes()[1].bytes.as_slice(), &[0x80, 86, 0x01]);
        assert_eq!(i2c.ram()[38], 0xA5);
    }

    #[test]
    fn write_region_bounds() {
        let mut d = display();
        assert_eq!(
            block_on(d.write_region(40, &[0; 5])),
            Err(Ht1635Error::OutOfRange)
        );
        assert_eq!(block_on(d.write_region(40, &[1; 4])), Ok(()));
        assert_eq!(d.cursor(), 44);
        assert_eq!(
            block_on(d.write_region(usize::MAX, &[0; 1])),
            Err(Ht1635Error::OutOfRange)
        );
        assert_eq!(
            block_on(d.write_byte(usize::MAX, 0)),
            Err(Ht1635Error::OutOfRange)
        );
        assert_eq!(d.cursor(), 44);
    }

    #[test]
    fn clear_zeroes_all_ram() {
        let mut d = display();
        block_on(d.write_region(0, &[0xFF; RAM_BYTES])).unwrap();
        block_on(d.clear()).unwrap();
        assert_eq!(d.cursor(), 0);
        let (i2c, _) = d.release();
        assert_eq!(i2c.ram(), [0; RAM_BYTES]);
    }

    #[test]
    fn bus_error_is_propagated() {
        let mut i2c = MockI2c::new();
        i2c.fail_next();
        let mut d = Ht1635::new(i2c, MockDelay::new(), DEFAULT_ADDRESS);
        assert!(matches!(
            block_on(d.write_byte(0, 1)),
            Err(Ht1635Error::I2c(_))
        ));
        assert_eq!(d.cursor(), 0);
    }

    // ── Fade-in ──────────────────────────────────────────────────────

    #[test]
    fn fade_in_ramps_brightness() {
        let mut d = display();
        let frame = Bitmap::from_bytes([0x18; BITMAP_LEN]);
        block_on(d.fade_in(&frame, 200)).unwrap();
        assert_eq!(d.registers().pwm, 15);

        let (i2c, delay) = d.release();
        let pwm: Vec<u8, 32> = i2c
            .commands()
            .filter(|&(op, _)| op == 0xC0)
            .map(|(_, v)| v)
            .collect();
        assert_eq!(pwm.len(), 17);
        assert_eq!(pwm[0], 0);
        assert_eq!(&pwm[1..], &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
        assert_eq!(&i2c.ram()[..40], frame.as_bytes());
        // 17 · 200 ms of holds plus 19 transactions.
        assert_eq!(delay.total_us(), 17 * 200_000 + 19 * 1_000);
    }
}
