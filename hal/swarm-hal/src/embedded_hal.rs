//! `embedded-hal` 1.0 I2C bridge

use ::embedded_hal::i2c::I2c;

use crate::i2c::I2cBus;

/// Wraps any `embedded_hal::i2c::I2c` master as an [`I2cBus`]
pub struct EmbeddedHalI2c<I>(pub I);

impl<I: I2c> I2cBus for EmbeddedHalI2c<I> {
    type Error = I::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.0.read(address, buf)
    }
}
