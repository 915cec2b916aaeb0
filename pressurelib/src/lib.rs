//! Pressure checks for 4-20 mA sensors wired to an ADS1115.
//!
//! [`check::check_device`] is the entry point: it validates the settings,
//! opens the i2c-dev node, runs one single-shot [`acquisition`], converts the
//! code with [`transform`] and classifies the result with [`verdict`].

pub mod acquisition;
pub mod check;
pub mod transform;
pub mod verdict;

pub use ads1115_eh::{Channel, PollLimit, RawSample, DEFAULT_ADDRESS, DEFAULT_MAX_POLLS};
