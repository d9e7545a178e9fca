use engine_runtime::report::RunReport;

/// Exit codes for the CLI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    /// A resource failed or the run was aborted.
    GeneralError = 1,
}

impl ExitCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn for_report(report: &RunReport) -> Self {
        if report.succeeded() {
            ExitCode::Success
        } else {
            ExitCode::GeneralError
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_u8())
    }
}
