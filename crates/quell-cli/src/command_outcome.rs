use std::process::ExitCode;

/// A subcommand's final report: text bound for stdout on success, or for
/// stderr on failure.
#[derive(Debug, Eq, PartialEq)]
pub(crate) enum CommandOutcome {
    Success(String),
    Failure(String),
}

impl CommandOutcome {
    pub fn success(fmt_args: std::fmt::Arguments<'_>) -> Self {
        Self::Success(format!("{fmt_args}"))
    }

    pub fn failure(fmt_args: std::fmt::Arguments<'_>) -> Self {
        Self::Failure(format!("{fmt_args}"))
    }

    /// Prints the report to its stream and converts to the process exit
    /// code.
    pub fn report(self) -> ExitCode {
        match self {
            Self::Success(report) => {
                println!("{report}");
                ExitCode::SUCCESS
            }
            Self::Failure(report) => {
                eprintln!("{report}");
                ExitCode::FAILURE
            }
        }
    }
}
