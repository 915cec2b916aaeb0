mod output;

use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use pressurelib::check::{check_device, CheckSettings};
use pressurelib::verdict::Status;
use pressurelib::{PollLimit, DEFAULT_ADDRESS, DEFAULT_MAX_POLLS};

use log::{debug, error};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

/// Monitoring check for an analog 4-20 mA pressure sensor read through an
/// ADS1115 ADC on I2C.
#[derive(Parser, Debug)]
#[command(name = "check_ads1115_pressure", version, about, disable_help_flag = true)]
struct Args {
    /// Print additional info on what the program is doing
    #[arg(short, long)]
    verbose: bool,

    /// ADS1115 input to read, 1-4
    #[arg(short, long, default_value_t = 1)]
    input: u8,

    /// Minimum pressure in bar
    #[arg(short = 'm', long = "min", allow_negative_numbers = true)]
    min_pressure: Option<f32>,

    /// Maximum pressure in bar
    #[arg(short = 'M', long = "max", allow_negative_numbers = true)]
    max_pressure: Option<f32>,

    /// I2C device to open
    #[arg(short, long, default_value = "/dev/i2c-1")]
    device: PathBuf,

    /// Address of the ADS1115 in hexadecimal [default: 48]
    #[arg(short = 'a', long = "address", value_parser = parse_hex_address, conflicts_with = "address_dec")]
    address_hex: Option<u8>,

    /// Address of the ADS1115 in decimal
    #[arg(short = 'A', long = "address-dec", value_parser = parse_dec_address)]
    address_dec: Option<u8>,

    /// Pressure in bar at 4 mA (lowest reading)
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    low: f32,

    /// Pressure in bar at 20 mA (highest reading)
    #[arg(short = 'h', long, default_value_t = 10.0, allow_negative_numbers = true)]
    high: f32,

    /// Status reads to wait for a conversion, 0 waits forever
    #[arg(long, default_value_t = DEFAULT_MAX_POLLS)]
    max_polls: u32,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    #[allow(dead_code)]
    help: Option<bool>,
}

impl Args {
    fn settings(&self) -> CheckSettings {
        CheckSettings {
            input: self.input,
            address: self.address_dec.or(self.address_hex).unwrap_or(DEFAULT_ADDRESS),
            low: self.low,
            high: self.high,
            min_pressure: self.min_pressure,
            max_pressure: self.max_pressure,
            poll_limit: match self.max_polls {
                0 => PollLimit::Unbounded,
                n => PollLimit::Attempts(n),
            },
        }
    }
}

fn seven_bit(address: u8) -> Result<u8, String> {
    if address > 0x7f {
        return Err(format!("0x{:02x} is not a 7-bit I2C address", address));
    }
    Ok(address)
}

fn parse_hex_address(s: &str) -> Result<u8, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    let address = u8::from_str_radix(digits, 16).map_err(|e| format!("{}: {}", s, e))?;
    seven_bit(address)
}

fn parse_dec_address(s: &str) -> Result<u8, String> {
    let address = s.parse::<u8>().map_err(|e| format!("{}: {}", s, e))?;
    seven_bit(address)
}

fn initiate_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    // stdout carries the status line only
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Never);
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            let status = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Status::Ok,
                _ => Status::Unknown,
            };
            process::exit(status.exit_code());
        }
    };
    initiate_logging(args.verbose);
    debug!("{:?}", args);

    let status = match check_device(&args.settings(), &args.device) {
        Ok(report) => {
            println!("{}", output::status_line(&report, &args.device));
            report.verdict.status()
        }
        Err(report) => {
            error!("{}", output::failure_log(&report, args.verbose));
            println!("{}", output::failure_line(&report));
            Status::Unknown
        }
    };
    process::exit(status.exit_code());
}
