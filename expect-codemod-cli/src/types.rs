//! CLI-specific type definitions.
//!
//! Types only the binary needs; the library knows nothing about exit codes.

/// Exit codes for the CLI application.
///
/// - 0: every file was processed (diagnostics do not count as failures)
/// - 2: at least one file could not be processed, or the invocation was invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// All files processed
    Success,

    /// A file failed or the configuration was rejected
    Error,
}

impl ExitCode {
    /// Convert to the integer exit code for process::exit()
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Error => 2,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(exit_code: ExitCode) -> Self {
        exit_code.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::Error), 2);
    }
}
