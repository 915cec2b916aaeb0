// Sequencing of one single-shot acquisition on the ADS1115.
//
// Each step of the bus protocol feeds the state machine below, so a failed
// or repeated step is caught instead of silently reusing a stale
// configuration.

use std::fmt::{self, Display, Formatter};

use ads1115_eh::{Ads1115, Channel, ConversionConfig, PollLimit, RawSample};
use embedded_hal::blocking::i2c::{Read, Write};
use error_stack::{Context, Report, Result};
use rust_fsm::*;

use log::{debug, warn};

state_machine! {
    derive(Debug)
    AcquisitionMachine(Idle)

    Idle => {
        ConfigWritten => Converting [PollStatus],
        BusFault => Failed,
    },
    Converting => {
        ConversionReady => Ready [FetchSample],
        PollTimedOut => Failed,
        BusFault => Failed,
    },
    Ready => {
        SampleFetched => SampleRead [ScaleSample],
        BusFault => Failed,
    },
    SampleRead(Finish) => Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionError {
    Configure,
    Poll,
    Timeout,
    Sample,
    Sequence,
}

impl Context for AcquisitionError {}

impl Display for AcquisitionError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            AcquisitionError::Configure => write!(f, "starting conversion failed"),
            AcquisitionError::Poll => write!(f, "polling conversion status failed"),
            AcquisitionError::Timeout => write!(f, "conversion did not complete"),
            AcquisitionError::Sample => write!(f, "reading conversion result failed"),
            AcquisitionError::Sequence => write!(f, "acquisition step out of order"),
        }
    }
}

/// Result of a completed acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquired {
    pub channel: Channel,
    pub config: ConversionConfig,
    pub sample: RawSample,
    pub polls: u32,
}

/// One pass through the acquisition sequence. A finished or failed
/// acquisition cannot be restarted; create a new one.
pub struct Acquisition {
    machine: StateMachine<AcquisitionMachine>,
}

impl Acquisition {
    pub fn new() -> Self {
        Self {
            machine: StateMachine::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.machine.state(), AcquisitionMachineState::Done)
    }

    pub fn has_failed(&self) -> bool {
        matches!(self.machine.state(), AcquisitionMachineState::Failed)
    }

    pub fn run<I2C, E>(
        &mut self,
        adc: &mut Ads1115<I2C>,
        channel: Channel,
        limit: PollLimit,
    ) -> Result<Acquired, AcquisitionError>
    where
        I2C: Write<Error = E> + Read<Error = E>,
        E: fmt::Debug + Send + Sync + 'static,
    {
        if !matches!(self.machine.state(), AcquisitionMachineState::Idle) {
            return Err(Report::new(AcquisitionError::Sequence).attach_printable(format!(
                "acquisition already left Idle ({:?})",
                self.machine.state()
            )));
        }

        let config = match adc.configure_and_start(channel) {
            Ok(config) => config,
            Err(e) => return Err(self.abort(e, AcquisitionError::Configure)),
        };
        debug!("Started conversion on {} with config 0x{:04x}", channel, config.bits());
        self.advance(AcquisitionMachineInput::ConfigWritten)?;

        let polls = match adc.await_ready(limit) {
            Ok(polls) => polls,
            Err(e) => return Err(self.abort(e, AcquisitionError::Poll)),
        };
        debug!("Conversion ready after {} polls", polls);
        self.advance(AcquisitionMachineInput::ConversionReady)?;

        let sample = match adc.read_sample() {
            Ok(sample) => sample,
            Err(e) => return Err(self.abort(e, AcquisitionError::Sample)),
        };
        self.advance(AcquisitionMachineInput::SampleFetched)?;
        if sample.is_clamped() {
            warn!(
                "{} returned code {} outside 0..=32768, reading it as 0",
                channel,
                sample.received()
            );
        }

        self.advance(AcquisitionMachineInput::Finish)?;
        Ok(Acquired {
            channel,
            config,
            sample,
            polls,
        })
    }

    fn advance(&mut self, input: AcquisitionMachineInput) -> Result<(), AcquisitionError> {
        let output = self.machine.consume(&input).map_err(|_| {
            Report::new(AcquisitionError::Sequence).attach_printable(format!(
                "{:?} not accepted in state {:?}",
                input,
                self.machine.state()
            ))
        })?;
        debug!("Acquisition state: {:?}, next: {:?}", self.machine.state(), output);
        Ok(())
    }

    fn abort<E>(&mut self, error: ads1115_eh::Error<E>, context: AcquisitionError) -> Report<AcquisitionError>
    where
        E: fmt::Debug + Send + Sync + 'static,
    {
        let (input, context) = match &error {
            ads1115_eh::Error::Timeout { .. } => {
                (AcquisitionMachineInput::PollTimedOut, AcquisitionError::Timeout)
            }
            _ => (AcquisitionMachineInput::BusFault, context),
        };
        if let Err(e) = self.advance(input) {
            warn!("{:?}", e);
        }
        Report::new(error).change_context(context)
    }
}

impl Default for Acquisition {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a fresh acquisition to completion.
pub fn acquire<I2C, E>(
    adc: &mut Ads1115<I2C>,
    channel: Channel,
    limit: PollLimit,
) -> Result<Acquired, AcquisitionError>
where
    I2C: Write<Error = E> + Read<Error = E>,
    E: fmt::Debug + Send + Sync + 'static,
{
    Acquisition::new().run(adc, channel, limit)
}
