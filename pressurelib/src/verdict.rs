use std::fmt::{self, Display, Formatter};

/// Monitoring plugin states and their process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    pub fn exit_code(&self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::Warning => write!(f, "WARNING"),
            Status::Critical => write!(f, "CRITICAL"),
            Status::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Inclusive pressure bounds in bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    BelowMinimum,
    AboveMaximum,
}

impl Verdict {
    pub fn status(&self) -> Status {
        match self {
            Verdict::Ok => Status::Ok,
            Verdict::BelowMinimum | Verdict::AboveMaximum => Status::Critical,
        }
    }
}

pub fn classify(pressure: f32, thresholds: &Thresholds) -> Verdict {
    if pressure < thresholds.min {
        Verdict::BelowMinimum
    } else if pressure > thresholds.max {
        Verdict::AboveMaximum
    } else {
        Verdict::Ok
    }
}
