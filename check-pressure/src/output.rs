use std::path::Path;

use error_stack::Report;
use pressurelib::check::{CheckError, CheckReport};
use pressurelib::verdict::{Status, Verdict};

/// First line of plugin output, with the `'pressure'` perfdata metric.
pub fn status_line(report: &CheckReport, device: &Path) -> String {
    let target = format!("{}:0x{:02x}", device.display(), report.address);
    let status = report.verdict.status();
    match report.verdict {
        Verdict::Ok => format!(
            "{}: Pressure on probe '{}' is {:4.3} | 'pressure'={:4.3}",
            status, target, report.pressure, report.pressure
        ),
        Verdict::BelowMinimum => format!(
            "{}: Pressure on probe '{}' is {:4.3} which is below {:4.3} | 'pressure'={:4.4}",
            status, target, report.pressure, report.thresholds.min, report.pressure
        ),
        Verdict::AboveMaximum => format!(
            "{}: Pressure on probe '{}' is {:4.3} which is over {:4.3} | 'pressure'={:4.4}",
            status, target, report.pressure, report.thresholds.max, report.pressure
        ),
    }
}

pub fn failure_line(report: &Report<CheckError>) -> String {
    match report.downcast_ref::<String>() {
        Some(detail) => format!("{}: {:#}: {}", Status::Unknown, report, detail),
        None => format!("{}: {:#}", Status::Unknown, report),
    }
}

/// Stderr message for a failed check. The full report, with attachments and
/// any captured backtrace, only with `-v`.
pub fn failure_log(report: &Report<CheckError>, verbose: bool) -> String {
    if verbose {
        format!("{:?}", report)
    } else {
        format!("{:#}", report)
    }
}
