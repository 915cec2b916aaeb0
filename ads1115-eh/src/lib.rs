//! Single-shot driver for the TI ADS1115 16-bit ADC on embedded-hal 0.2
//! blocking I2C.
//!
//! Only the single-ended, fixed-gain, one-conversion-at-a-time mode used by
//! 4-20 mA loop sensors is supported.

pub mod ads1115;
pub mod config;
pub mod sample;

pub use ads1115::{Ads1115, Error, PollLimit, DEFAULT_ADDRESS, DEFAULT_MAX_POLLS};
pub use config::{Channel, ConversionConfig, InvalidChannel, REG_CONFIG, REG_CONVERSION};
pub use sample::RawSample;
