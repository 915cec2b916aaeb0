use ads1115_eh::RawSample;

/// Full-scale voltage of the ±6.144 V gain setting.
pub const REFERENCE_VOLTAGE: f32 = 6.144;
/// Code divisor used for volts-per-step.
pub const FULL_SCALE_CODE: f32 = 10630.0;

/// Converts raw codes to bar for a 4-20 mA sensor read through the shunt
/// divider on the ADC input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorCalibration {
    raw_at_4ma: f32,
    raw_at_20ma: f32,
}

impl SensorCalibration {
    /// Codes read at 4 mA (no pressure) and at 20 mA (full scale).
    pub const STANDARD: Self = Self {
        raw_at_4ma: 2090.0,
        raw_at_20ma: 10630.0,
    };

    /// Returns `None` when both endpoints are the same code.
    pub fn new(raw_at_4ma: f32, raw_at_20ma: f32) -> Option<Self> {
        if raw_at_20ma == raw_at_4ma || !(raw_at_20ma - raw_at_4ma).is_finite() {
            return None;
        }
        Some(Self { raw_at_4ma, raw_at_20ma })
    }

    pub fn raw_at_4ma(&self) -> f32 {
        self.raw_at_4ma
    }

    pub fn raw_at_20ma(&self) -> f32 {
        self.raw_at_20ma
    }

    /// Slope spreads `high - low` across the 4-20 mA code span.
    pub fn coefficients(&self, low: f32, high: f32) -> LinearCoefficients {
        let slope = (high - low) / (self.raw_at_20ma - self.raw_at_4ma);
        LinearCoefficients {
            slope,
            intercept: slope * self.raw_at_4ma,
        }
    }
}

impl Default for SensorCalibration {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// `pressure = slope * raw - intercept`
///
/// The intercept pins the 4 mA code to zero; `low` only shapes the slope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearCoefficients {
    pub slope: f32,
    pub intercept: f32,
}

impl LinearCoefficients {
    /// Bar, floored at zero.
    pub fn pressure(&self, sample: RawSample) -> f32 {
        let pressure = self.slope * f32::from(sample.code()) - self.intercept;
        // max() also maps NaN to 0.0
        pressure.max(0.0)
    }
}

pub fn derive_coefficients(low: f32, high: f32) -> LinearCoefficients {
    SensorCalibration::STANDARD.coefficients(low, high)
}

pub fn to_pressure(sample: RawSample, coefficients: &LinearCoefficients) -> f32 {
    coefficients.pressure(sample)
}

pub fn to_voltage(sample: RawSample) -> f32 {
    f32::from(sample.code()) * (REFERENCE_VOLTAGE / FULL_SCALE_CODE)
}
