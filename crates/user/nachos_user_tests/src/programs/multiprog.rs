//! `multiprog`: concurrent descriptor probes.
//!
//! Runs [`CHILDREN`] instances of `fdtest` in multi-process mode, each on
//! its own backing file, and checks that instance `i` exits with `i`.

use nachos_syscall::Syscalls;

use crate::{
    Violation,
    programs::fdtest,
    report,
    spawner::{self, WorkUnit},
};

pub const NAME: &str = "multiprog";

pub const CHILDREN: i32 = 2;

#[must_use]
pub fn backing_file(instance: i32) -> String {
    format!("test.txt.test.{instance}")
}

fn run<S>(sys: &mut S) -> Result<i32, Violation>
where
    S: Syscalls,
{
    let work = (0..CHILDREN).map(|i| {
        WorkUnit::new(fdtest::NAME, i)
            .arg(i)
            .arg(backing_file(i))
    });
    let result = spawner::run_all(sys, work);
    for i in 0..CHILDREN {
        let _ = sys.unlink(&backing_file(i));
    }
    result?;

    report!(sys, "--- PASS multiprogramming");
    Ok(0)
}

pub fn main<S>(sys: &mut S, _argv: &[String]) -> !
where
    S: Syscalls,
{
    let result = run(sys);
    super::finish(sys, result)
}
