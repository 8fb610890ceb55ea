//! Runnable test programs.
//!
//! Every program is generic over [`Syscalls`] and follows the same shape:
//! the body returns the exit status or a [`Violation`], and the entry point
//! turns the latter into a diagnostic and a non-zero exit.

use std::str::FromStr;

use nachos_sim::{Kernel, Process};
use nachos_syscall::{Program, Syscalls};

use crate::{Violation, assert::FAILURE, traits::OrExit as _};

pub mod exectest;
pub mod exitcode;
pub mod fdtest;
pub mod fibonacci;
pub mod multiprog;
pub mod seqfib;

/// Every program, by the name it is exec'd under.
pub const PROGRAMS: &[(&str, Program<Process>)] = &[
    (exectest::NAME, exectest::main),
    (exitcode::NAME, exitcode::main),
    (fdtest::NAME, fdtest::main),
    (fibonacci::NAME, fibonacci::main),
    (multiprog::NAME, multiprog::main),
    (seqfib::NAME, seqfib::main),
];

/// Registers every program with `kernel`.
pub fn install(kernel: &Kernel) {
    for &(name, program) in PROGRAMS {
        kernel.register(name, program);
    }
}

/// Exits with the status produced by a program body.
fn finish<S>(sys: &mut S, result: Result<i32, Violation>) -> !
where
    S: Syscalls,
{
    let status = result.or_exit(|v| v.exit(sys));
    sys.exit(status)
}

/// Parses `argv[index]`, or returns `None` if there are fewer arguments.
fn arg<T>(argv: &[String], index: usize, what: &str) -> Result<Option<T>, Violation>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    argv.get(index)
        .map(|s| {
            s.parse()
                .map_err(|e| Violation::new(FAILURE, format!("invalid {what} {s:?}: {e}")))
        })
        .transpose()
}
