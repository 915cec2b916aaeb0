use std::fmt;

/// Pointer register values.
pub const REG_CONVERSION: u8 = 0x00;
pub const REG_CONFIG: u8 = 0x01;

// Config register fields (datasheet table 8).
const OS_START_SINGLE: u16 = 1 << 15;
const PGA_6_144V: u16 = 0b000 << 9;
const MODE_SINGLE_SHOT: u16 = 1 << 8;
const DR_128_SPS: u16 = 0b100 << 5;
// Latching comparator, assert after two conversions.
const COMP_BITS: u16 = 0b0_0101;

const MUX_SHIFT: u16 = 12;

/// One of the four single-ended inputs, numbered 1-4 on the command line
/// and AIN0-AIN3 on the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Ain0,
    Ain1,
    Ain2,
    Ain3,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Ain0, Channel::Ain1, Channel::Ain2, Channel::Ain3];

    /// MUX[2:0] selecting this input against GND.
    pub fn mux_code(self) -> u16 {
        match self {
            Channel::Ain0 => 0b100,
            Channel::Ain1 => 0b101,
            Channel::Ain2 => 0b110,
            Channel::Ain3 => 0b111,
        }
    }

    /// The 1-based input number.
    pub fn number(self) -> u8 {
        match self {
            Channel::Ain0 => 1,
            Channel::Ain1 => 2,
            Channel::Ain2 => 3,
            Channel::Ain3 => 4,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AIN{}", self.number() - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidChannel(pub u8);

impl fmt::Display for InvalidChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input must be 1, 2, 3 or 4, got {}", self.0)
    }
}

impl std::error::Error for InvalidChannel {}

impl TryFrom<u8> for Channel {
    type Error = InvalidChannel;

    fn try_from(input: u8) -> Result<Self, Self::Error> {
        match input {
            1 => Ok(Channel::Ain0),
            2 => Ok(Channel::Ain1),
            3 => Ok(Channel::Ain2),
            4 => Ok(Channel::Ain3),
            other => Err(InvalidChannel(other)),
        }
    }
}

/// Contents of the config register for one single-shot conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionConfig(u16);

impl ConversionConfig {
    pub fn single_shot(channel: Channel) -> Self {
        ConversionConfig(
            OS_START_SINGLE
                | channel.mux_code() << MUX_SHIFT
                | PGA_6_144V
                | MODE_SINGLE_SHOT
                | DR_128_SPS
                | COMP_BITS,
        )
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    /// Pointer byte followed by the register value, MSB first.
    pub fn write_frame(&self) -> [u8; 3] {
        let [hi, lo] = self.0.to_be_bytes();
        [REG_CONFIG, hi, lo]
    }
}
