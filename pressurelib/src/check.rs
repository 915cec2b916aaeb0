use std::fmt::{self, Display, Formatter};
use std::path::Path;

use ads1115_eh::{Ads1115, Channel, PollLimit, RawSample, DEFAULT_ADDRESS};
use embedded_hal::blocking::i2c::{Read, Write};
use error_stack::{Context, Report, Result, ResultExt};
use linux_embedded_hal::I2cdev;

use log::debug;

use crate::acquisition::{acquire, Acquired, AcquisitionError};
use crate::transform::{self, LinearCoefficients, SensorCalibration};
use crate::verdict::{classify, Thresholds, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckError {
    InvalidArgument,
    BusOpen,
    BusIo,
    Timeout,
}

impl Context for CheckError {}

impl Display for CheckError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            CheckError::InvalidArgument => write!(f, "invalid arguments"),
            CheckError::BusOpen => write!(f, "cannot open I2C bus"),
            CheckError::BusIo => write!(f, "I2C transfer failed"),
            CheckError::Timeout => write!(f, "conversion timed out"),
        }
    }
}

/// Caller supplied parameters of one pressure check, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSettings {
    /// Input number, 1-4.
    pub input: u8,
    pub address: u8,
    /// Bar at 4 mA.
    pub low: f32,
    /// Bar at 20 mA.
    pub high: f32,
    pub min_pressure: Option<f32>,
    pub max_pressure: Option<f32>,
    pub poll_limit: PollLimit,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            input: 1,
            address: DEFAULT_ADDRESS,
            low: 0.0,
            high: 10.0,
            min_pressure: None,
            max_pressure: None,
            poll_limit: PollLimit::default(),
        }
    }
}

impl CheckSettings {
    pub fn validate(&self) -> Result<CheckPlan, CheckError> {
        let channel = Channel::try_from(self.input).change_context(CheckError::InvalidArgument)?;

        let thresholds = match (self.min_pressure, self.max_pressure) {
            (Some(min), Some(max)) if min.is_finite() && max.is_finite() => Thresholds { min, max },
            (Some(min), Some(max)) => {
                return Err(Report::new(CheckError::InvalidArgument)
                    .attach_printable(format!("thresholds must be finite, got {} and {}", min, max)))
            }
            _ => {
                return Err(Report::new(CheckError::InvalidArgument)
                    .attach_printable(String::from("both minimum and maximum pressure must be given")))
            }
        };

        Ok(CheckPlan {
            channel,
            address: self.address,
            calibration: SensorCalibration::STANDARD,
            coefficients: SensorCalibration::STANDARD.coefficients(self.low, self.high),
            thresholds,
            poll_limit: self.poll_limit,
        })
    }
}

/// Validated settings, ready to run against a bus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckPlan {
    pub channel: Channel,
    pub address: u8,
    pub calibration: SensorCalibration,
    pub coefficients: LinearCoefficients,
    pub thresholds: Thresholds,
    pub poll_limit: PollLimit,
}

impl CheckPlan {
    pub fn evaluate(&self, acquired: &Acquired) -> CheckReport {
        let sample = acquired.sample;
        let voltage = transform::to_voltage(sample);
        let pressure = transform::to_pressure(sample, &self.coefficients);
        debug!(
            "{}: HEX 0x{:02x}, DEC {}, voltage {:.4}, pressure {:.3} bar",
            self.channel,
            sample.code(),
            sample.code(),
            voltage,
            pressure
        );

        CheckReport {
            channel: self.channel,
            address: self.address,
            sample,
            polls: acquired.polls,
            voltage,
            pressure,
            thresholds: self.thresholds,
            verdict: classify(pressure, &self.thresholds),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckReport {
    pub channel: Channel,
    pub address: u8,
    pub sample: RawSample,
    pub polls: u32,
    pub voltage: f32,
    pub pressure: f32,
    pub thresholds: Thresholds,
    pub verdict: Verdict,
}

/// Runs one check. Settings are validated before `open_bus` is called, and
/// the bus is dropped before this returns.
pub fn check<I2C, E, O>(settings: &CheckSettings, open_bus: O) -> Result<CheckReport, CheckError>
where
    O: FnOnce() -> Result<I2C, CheckError>,
    I2C: Write<Error = E> + Read<Error = E>,
    E: fmt::Debug + Send + Sync + 'static,
{
    let plan = settings.validate()?;
    debug!(
        "maxval {}, minval {}, slope {}, constant {}",
        plan.calibration.raw_at_20ma(),
        plan.calibration.raw_at_4ma(),
        plan.coefficients.slope,
        plan.coefficients.intercept
    );

    let mut adc = Ads1115::new(open_bus()?, plan.address);
    debug!(
        "Address 0x{:02x} ({}), Input {}",
        adc.address(),
        adc.address(),
        plan.channel.number()
    );
    let acquired = acquire(&mut adc, plan.channel, plan.poll_limit).map_err(|report| {
        let context = match report.current_context() {
            AcquisitionError::Timeout => CheckError::Timeout,
            _ => CheckError::BusIo,
        };
        report.change_context(context)
    });
    drop(adc);

    Ok(plan.evaluate(&acquired?))
}

/// Runs one check against a Linux i2c-dev node such as `/dev/i2c-1`.
pub fn check_device(settings: &CheckSettings, device: &Path) -> Result<CheckReport, CheckError> {
    debug!("Device {}", device.display());
    check(settings, || {
        I2cdev::new(device)
            .change_context(CheckError::BusOpen)
            .attach_printable_lazy(|| format!("couldn't open device {}", device.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use embedded_hal_mock::i2c::{Mock as MockI2c, Transaction as I2cTransaction};
    use embedded_hal_mock::MockError;
    use std::io::ErrorKind;

    struct DeadBus;

    impl Write for DeadBus {
        type Error = &'static str;

        fn write(&mut self, _address: u8, _bytes: &[u8]) -> core::result::Result<(), Self::Error> {
            Err("nack")
        }
    }

    impl Read for DeadBus {
        type Error = &'static str;

        fn read(&mut self, _address: u8, _buffer: &mut [u8]) -> core::result::Result<(), Self::Error> {
            Err("nack")
        }
    }

    fn settings() -> CheckSettings {
        CheckSettings {
            min_pressure: Some(2.0),
            max_pressure: Some(8.0),
            ..Default::default()
        }
    }

    fn conversion(code: u16) -> Vec<I2cTransaction> {
        let [hi, lo] = code.to_be_bytes();
        vec![
            I2cTransaction::write(DEFAULT_ADDRESS, vec![0x01, 0xC1, 0x85]),
            I2cTransaction::read(DEFAULT_ADDRESS, vec![0x41, 0x85]),
            I2cTransaction::read(DEFAULT_ADDRESS, vec![0xC1, 0x85]),
            I2cTransaction::write(DEFAULT_ADDRESS, vec![0x00]),
            I2cTransaction::read(DEFAULT_ADDRESS, vec![hi, lo]),
        ]
    }

    fn run(code: u16) -> CheckReport {
        check(&settings(), || Ok(MockI2c::new(&conversion(code)))).unwrap()
    }

    #[test]
    fn test_4ma_is_below_minimum() {
        let report = run(2090);
        assert_eq!(report.pressure, 0.0);
        assert_eq!(report.verdict, Verdict::BelowMinimum);
    }

    #[test]
    fn test_midpoint_is_ok() {
        let report = run(6360);
        assert!((report.pressure - 5.0).abs() < 1e-4);
        assert_eq!(report.verdict, Verdict::Ok);
        assert_eq!(report.polls, 2);
    }

    #[test]
    fn test_20ma_is_above_maximum() {
        let report = run(10630);
        assert!((report.pressure - 10.0).abs() < 1e-4);
        assert!((report.voltage - 6.144).abs() < 1e-4);
        assert_eq!(report.verdict, Verdict::AboveMaximum);
    }

    #[test]
    fn test_out_of_range_code_is_clamped() {
        let report = run(40000);
        assert!(report.sample.is_clamped());
        assert_eq!(report.sample.code(), 0);
        assert_eq!(report.pressure, 0.0);
        assert_eq!(report.verdict, Verdict::BelowMinimum);
    }

    #[test]
    fn test_invalid_input_never_opens_bus() {
        for input in [0, 5] {
            let opened = Cell::new(false);
            let bad = CheckSettings { input, ..settings() };
            let err = check(&bad, || {
                opened.set(true);
                Ok(MockI2c::new(&[]))
            })
            .unwrap_err();
            assert_eq!(*err.current_context(), CheckError::InvalidArgument);
            assert!(!opened.get());
        }
    }

    #[test]
    fn test_missing_thresholds() {
        let missing = CheckSettings {
            max_pressure: None,
            ..settings()
        };
        let err = missing.validate().unwrap_err();
        assert_eq!(*err.current_context(), CheckError::InvalidArgument);
        assert!(err.downcast_ref::<String>().is_some());
    }

    #[test]
    fn test_open_failure() {
        let err = check::<MockI2c, _, _>(&settings(), || Err(Report::new(CheckError::BusOpen))).unwrap_err();
        assert_eq!(*err.current_context(), CheckError::BusOpen);
    }

    #[test]
    fn test_status_read_failure() {
        let expectations = [
            I2cTransaction::write(DEFAULT_ADDRESS, vec![0x01, 0xC1, 0x85]),
            I2cTransaction::read(DEFAULT_ADDRESS, vec![0x41, 0x85]),
            I2cTransaction::read(DEFAULT_ADDRESS, vec![0x00, 0x00]).with_error(MockError::Io(ErrorKind::Other)),
        ];
        let err = check(&settings(), || Ok(MockI2c::new(&expectations))).unwrap_err();
        assert_eq!(*err.current_context(), CheckError::BusIo);
    }

    #[test]
    fn test_conversion_read_failure() {
        let expectations = [
            I2cTransaction::write(DEFAULT_ADDRESS, vec![0x01, 0xC1, 0x85]),
            I2cTransaction::read(DEFAULT_ADDRESS, vec![0xC1, 0x85]),
            I2cTransaction::write(DEFAULT_ADDRESS, vec![0x00]),
            I2cTransaction::read(DEFAULT_ADDRESS, vec![0x00, 0x00]).with_error(MockError::Io(ErrorKind::Other)),
        ];
        let err = check(&settings(), || Ok(MockI2c::new(&expectations))).unwrap_err();
        assert_eq!(*err.current_context(), CheckError::BusIo);
    }

    #[test]
    fn test_non_finite_thresholds() {
        for (min, max) in [(f32::NAN, 8.0), (2.0, f32::NAN), (2.0, f32::INFINITY)] {
            let bad = CheckSettings {
                min_pressure: Some(min),
                max_pressure: Some(max),
                ..settings()
            };
            let err = bad.validate().unwrap_err();
            assert_eq!(*err.current_context(), CheckError::InvalidArgument);
        }
    }

    #[test]
    fn test_bus_failure() {
        let err = check(&settings(), || Ok(DeadBus)).unwrap_err();
        assert_eq!(*err.current_context(), CheckError::BusIo);
    }

    #[test]
    fn test_timeout() {
        let expectations = [
            I2cTransaction::write(DEFAULT_ADDRESS, vec![0x01, 0xC1, 0x85]),
            I2cTransaction::read(DEFAULT_ADDRESS, vec![0x41, 0x85]),
        ];
        let limited = CheckSettings {
            poll_limit: PollLimit::Attempts(1),
            ..settings()
        };
        let err = check(&limited, || Ok(MockI2c::new(&expectations))).unwrap_err();
        assert_eq!(*err.current_context(), CheckError::Timeout);
    }

    #[test]
    fn test_missing_device_node() {
        let err = check_device(&settings(), Path::new("/nonexistent/i2c-42")).unwrap_err();
        assert_eq!(*err.current_context(), CheckError::BusOpen);
    }

    #[test]
    fn test_custom_address_and_input() {
        let expectations = [
            I2cTransaction::write(0x4A, vec![0x01, 0xF1, 0x85]),
            I2cTransaction::read(0x4A, vec![0xF1, 0x85]),
            I2cTransaction::write(0x4A, vec![0x00]),
            I2cTransaction::read(0x4A, vec![0x18, 0xD8]),
        ];
        let custom = CheckSettings {
            input: 4,
            address: 0x4A,
            ..settings()
        };
        let report = check(&custom, || Ok(MockI2c::new(&expectations))).unwrap();
        assert_eq!(report.channel, Channel::Ain3);
        assert_eq!(report.address, 0x4A);
        assert_eq!(report.polls, 1);
        assert_eq!(report.verdict, Verdict::Ok);
    }
}
