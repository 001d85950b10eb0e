use std::process::ExitCode;

/// Exit status for CLI commands, following common conventions for build
/// tools.
///
/// - `Success` (0): Build completed with no errors.
/// - `Failure` (1): Build completed but the project has errors.
/// - `Error` (2): The build itself could not run (config error, I/O error).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
