//! Error types for the HT1635 driver.

use core::fmt;

/// Errors that can occur when talking to the HT1635.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ht1635Error<E> {
    /// Underlying I2C bus error.
    I2c(E),

    /// RAM index or range beyond the controller's display RAM.
    OutOfRange,
}

// Allow ergonomic `?` propagation from raw I2C errors.
impl<E> From<E> for Ht1635Error<E> {
    fn from(error: E) -> Self {
        Ht1635Error::I2c(error)
    }
}

impl<E: fmt::Debug> fmt::Display for Ht1635Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Ht1635Error::I2c(e) => write!(f, "I2C error: {:?}", e),
            Ht1635Error::OutOfRange => write!(f, "RAM address out of range (must be < 44)"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for Ht1635Error<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Ht1635Error::I2c(e) => defmt::write!(f, "I2C error: {}", e),
            Ht1635Error::OutOfRange => defmt::write!(f, "RAM address out of range"),
        }
    }
}
