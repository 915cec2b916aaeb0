use embedded_hal::blocking::i2c::{Read, Write};
use std::fmt;

use crate::config::{Channel, ConversionConfig, REG_CONVERSION};
use crate::sample::RawSample;

/// ADDR pin tied to GND.
pub const DEFAULT_ADDRESS: u8 = 0x48;

/// At 128 SPS a conversion takes ~8 ms, which is a few dozen status reads on
/// a 100 kHz bus.
pub const DEFAULT_MAX_POLLS: u32 = 10_000;

// OS bit of the config register, as seen in the first byte read back.
const OS_READY_MASK: u8 = 0x80;

/// How many status reads `await_ready` may issue before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollLimit {
    Unbounded,
    /// At least one read is always made.
    Attempts(u32),
}

impl PollLimit {
    fn exhausted(&self, polls: u32) -> bool {
        match self {
            PollLimit::Unbounded => false,
            PollLimit::Attempts(max) => polls >= *max,
        }
    }
}

impl Default for PollLimit {
    fn default() -> Self {
        PollLimit::Attempts(DEFAULT_MAX_POLLS)
    }
}

#[derive(Debug)]
pub enum Error<E> {
    ConfigWrite(E),
    StatusRead(E),
    PointerWrite(E),
    ConversionRead(E),
    Timeout { polls: u32 },
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigWrite(e) => write!(f, "writing config register failed: {:?}", e),
            Error::StatusRead(e) => write!(f, "reading conversion status failed: {:?}", e),
            Error::PointerWrite(e) => write!(f, "selecting conversion register failed: {:?}", e),
            Error::ConversionRead(e) => write!(f, "reading conversion register failed: {:?}", e),
            Error::Timeout { polls } => write!(f, "conversion not ready after {} polls", polls),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for Error<E> {}

pub struct Ads1115<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C, E> Ads1115<I2C>
where
    I2C: Write<Error = E> + Read<Error = E>,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        Ads1115 { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Writes the config register, which also starts a single conversion.
    pub fn configure_and_start(&mut self, channel: Channel) -> Result<ConversionConfig, Error<E>> {
        let config = ConversionConfig::single_shot(channel);
        self.i2c
            .write(self.address, &config.write_frame())
            .map_err(Error::ConfigWrite)?;
        Ok(config)
    }

    /// Reads the config register back once. The pointer still selects it
    /// after `configure_and_start`.
    pub fn is_ready(&mut self) -> Result<bool, Error<E>> {
        let mut buf = [0u8; 2];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(Error::StatusRead)?;
        Ok(buf[0] & OS_READY_MASK != 0)
    }

    /// Polls without delay until the conversion completes. Returns the number
    /// of status reads it took.
    pub fn await_ready(&mut self, limit: PollLimit) -> Result<u32, Error<E>> {
        let mut polls: u32 = 0;
        loop {
            polls = polls.saturating_add(1);
            if self.is_ready()? {
                return Ok(polls);
            }
            if limit.exhausted(polls) {
                return Err(Error::Timeout { polls });
            }
        }
    }

    pub fn read_sample(&mut self) -> Result<RawSample, Error<E>> {
        self.i2c
            .write(self.address, &[REG_CONVERSION])
            .map_err(Error::PointerWrite)?;
        let mut buf = [0u8; 2];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(Error::ConversionRead)?;
        Ok(RawSample::from_be_bytes(buf))
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}
