/// Largest code accepted as a valid single-ended reading.
pub const MAX_CODE: i32 = 32768;

/// A conversion result after the wiring-fault clamp.
///
/// Codes below zero or above [`MAX_CODE`] are reported as zero. The code the
/// device actually returned is kept for diagnostics, and `is_clamped` tells a
/// clamped zero apart from a genuine one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    code: u16,
    received: i32,
}

impl RawSample {
    pub fn from_code(received: i32) -> Self {
        let code = if (0..=MAX_CODE).contains(&received) {
            received as u16
        } else {
            0
        };
        RawSample { code, received }
    }

    /// Conversion register contents, MSB first.
    pub fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self::from_code(i16::from_be_bytes(bytes).into())
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn received(&self) -> i32 {
        self.received
    }

    pub fn is_clamped(&self) -> bool {
        self.received != i32::from(self.code)
    }
}
