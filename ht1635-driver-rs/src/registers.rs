//! HT1635 command opcodes, parameter encodings and RAM geometry.
//!
//! Every configuration command is a two-byte write: `[opcode, parameter]`.
//! Display RAM is written with `[CMD_DISPLAY_DATA, nibble_address, data…]`;
//! one data byte fills two consecutive 4-bit RAM cells, so logical byte `i`
//! lives at nibble address `2·i`.

// ---------------------------------------------------------------------------
// Command opcodes
// ---------------------------------------------------------------------------

/// Display data input: followed by a nibble address and data bytes.
pub const CMD_DISPLAY_DATA: u8 = 0x80;

/// System mode (power state).
pub const CMD_SYSTEM_MODE: u8 = 0x82;

/// Blink frequency.
pub const CMD_BLINK: u8 = 0x84;

/// COM output option (N-MOS / P-MOS drive).
pub const CMD_COM_OPTION: u8 = 0x88;

/// Cascade and clock source.
pub const CMD_CASCADE: u8 = 0xA0;

/// PWM duty (global brightness).
pub const CMD_PWM_DUTY: u8 = 0xC0;

// ---------------------------------------------------------------------------
// Geometry and protocol limits
// ---------------------------------------------------------------------------

/// Default 7-bit I2C address.
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Number of 8×8 panels on the board.
pub const PANEL_COUNT: usize = 5;

/// Rows per panel.
pub const PANEL_ROWS: usize = 8;

/// Bytes in one full frame (five panels of eight rows).
pub const BITMAP_LEN: usize = PANEL_COUNT * PANEL_ROWS;

/// Bytes of display RAM on the controller. The last four are not wired to
/// LEDs on this board.
pub const RAM_BYTES: usize = 44;

/// Largest data payload per RAM-write transaction, after the two-byte
/// header, so one transaction fits a 32-byte I2C buffer.
pub const MAX_PAYLOAD: usize = 30;

/// Highest PWM duty step.
pub const PWM_MAX: u8 = 15;

/// Pause after every transaction.
pub const TRANSACTION_DELAY_US: u32 = 1_000;

// ---------------------------------------------------------------------------
// Parameter encodings
// ---------------------------------------------------------------------------

/// System mode parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PowerMode {
    /// Oscillator and display off.
    #[default]
    Off = 0x00,
    /// Oscillator on, display off.
    Standby = 0x02,
    /// Oscillator and display on.
    On = 0x03,
}

/// Blink frequency parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BlinkRate {
    #[default]
    Off = 0x00,
    Hz2 = 0x01,
    Hz1 = 0x02,
    HalfHz = 0x03,
}

/// Cascade and clock source parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CascadeMode {
    /// Slave, clock from the cascade master.
    Slave = 0x00,
    /// Master with on-chip RC oscillator.
    #[default]
    RcMaster0 = 0x04,
    /// Master with on-chip RC oscillator, alternate sync mode.
    RcMaster1 = 0x05,
    /// Master with external clock.
    ExtClockMaster0 = 0x06,
    /// Master with external clock, alternate sync mode.
    ExtClockMaster1 = 0x07,
}

/// COM output drive parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ComPins {
    NMos = 0x00,
    #[default]
    PMos = 0x01,
}

/// Host-side mirror of the controller's configuration registers.
///
/// The controller has no readable registers; this mirror is what
/// [`Ht1635::reinitialize`](crate::Ht1635::reinitialize) replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceRegisters {
    pub power: PowerMode,
    pub blink: BlinkRate,
    /// PWM duty, 0–[`PWM_MAX`].
    pub pwm: u8,
    pub cascade: CascadeMode,
    pub com_pins: ComPins,
}
