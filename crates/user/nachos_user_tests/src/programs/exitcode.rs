//! `exitcode <status>`: exits with `status`.

use nachos_syscall::Syscalls;

use crate::{Violation, assert::FAILURE};

pub const NAME: &str = "exitcode";

pub fn main<S>(sys: &mut S, argv: &[String]) -> !
where
    S: Syscalls,
{
    let result = super::arg(argv, 1, "status").and_then(|status| {
        status.ok_or_else(|| Violation::new(FAILURE, "usage: exitcode <status>"))
    });
    super::finish(sys, result)
}
