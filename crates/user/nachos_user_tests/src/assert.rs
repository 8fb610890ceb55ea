//! Uniform failure reporting.
//!
//! A broken invariant is a [`Violation`]. Violations are never recovered
//! from: they travel up with `?` to the program entry point, which prints
//! the message and exits with the violation's code.

use std::fmt;

use nachos_syscall::Syscalls;
use nachos_types::fs::STDOUT_FD;

/// Exit code of ordinary harness failures.
pub const FAILURE: i32 = 1;

/// Exit code of a wrong final value or a wrong child status in the
/// multi-process scenarios.
pub const WRONG_RESULT: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Violation {
    code: i32,
    message: String,
}

impl Violation {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn code(&self) -> i32 {
        self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prints the message and terminates the calling process.
    pub fn exit<S>(self, sys: &mut S) -> !
    where
        S: Syscalls,
    {
        print_message(sys, format_args!("{}", self.message));
        sys.exit(self.code)
    }
}

/// Writes `args` and a newline to standard output.
///
/// Output is best effort: a process that cannot write to its console has no
/// better channel to complain through.
pub fn print_line<S>(sys: &mut S, args: fmt::Arguments<'_>)
where
    S: Syscalls,
{
    let line = format!("{args}\n");
    let _ = sys.write(STDOUT_FD, line.as_bytes());
}

/// Like [`print_line`], prefixed with the program name.
pub fn print_message<S>(sys: &mut S, args: fmt::Arguments<'_>)
where
    S: Syscalls,
{
    let line = format!("{}: {args}\n", sys.program_name());
    let _ = sys.write(STDOUT_FD, line.as_bytes());
}
