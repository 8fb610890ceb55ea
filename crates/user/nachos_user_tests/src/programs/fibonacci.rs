//! `fibonacci [signature instance]`: sequential-state validator.

use nachos_syscall::Syscalls;

use crate::{
    Violation,
    assert::FAILURE,
    ensure, report,
    validator::{self, RecordPair},
};

pub const NAME: &str = "fibonacci";

fn run<S>(sys: &mut S, argv: &[String]) -> Result<i32, Violation>
where
    S: Syscalls,
{
    ensure!(
        argv.len() != 2,
        FAILURE,
        "usage: fibonacci [signature instance]"
    );
    let signature = super::arg(argv, 1, "signature")?.unwrap_or(0);
    let instance = super::arg(argv, 2, "instance")?.unwrap_or(0);

    validator::validate(sys, &RecordPair::for_instance(instance))?;
    report!(sys, "--- PASS fibonacci {instance}");
    Ok(signature)
}

pub fn main<S>(sys: &mut S, argv: &[String]) -> !
where
    S: Syscalls,
{
    let result = run(sys, argv);
    super::finish(sys, result)
}
