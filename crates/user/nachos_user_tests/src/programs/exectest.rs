//! `exectest`: basic exec/join/exit contract.

use std::num::NonZero;

use nachos_syscall::{SyscallError, Syscalls};
use nachos_types::process::ProcId;

use crate::{Violation, assert::FAILURE, ensure, message, programs::exitcode, report};

pub const NAME: &str = "exectest";

const RUNS: i32 = 10;

const MISSING_PROGRAM: &str = "asd.coff";

/// A process id that is never a child of this program.
const UNRELATED_PID: ProcId = ProcId::new(NonZero::<u32>::MIN.saturating_add(99));

fn run<S>(sys: &mut S) -> Result<i32, Violation>
where
    S: Syscalls,
{
    for i in 1..=RUNS {
        let arg = i.to_string();
        let pid = sys
            .exec(exitcode::NAME, &[exitcode::NAME, arg.as_str()])
            .map_err(|e| Violation::new(FAILURE, format!("exec exitcode {i} failed: {e}")))?;
        let status = sys
            .join(pid)
            .map_err(|e| Violation::new(FAILURE, format!("join {pid} failed: {e}")))?;
        message!(sys, "new pid: {status} {pid}");
        ensure!(
            status.code() == i && !status.is_abnormal(),
            FAILURE,
            "exitcode {i}: {status}"
        );
    }

    let missing = sys.exec(MISSING_PROGRAM, &[MISSING_PROGRAM]);
    message!(sys, "no process: {missing:?}");
    ensure!(missing.is_err(), FAILURE, "exec {MISSING_PROGRAM} succeeded");

    let unrelated = sys.join(UNRELATED_PID);
    message!(sys, "join un-child: {unrelated:?}");
    ensure!(
        unrelated == Err(SyscallError::NoChildProcess),
        FAILURE,
        "join {UNRELATED_PID}: {unrelated:?}"
    );

    report!(sys, "--- PASS exectest");
    Ok(0)
}

pub fn main<S>(sys: &mut S, _argv: &[String]) -> !
where
    S: Syscalls,
{
    let result = run(sys);
    super::finish(sys, result)
}
