//! `fdtest [instance file]`: descriptor-exhaustion probe.
//!
//! Without arguments the probe runs alone against its default file and
//! exits with 0. With arguments it runs as one of several concurrent
//! instances and exits with `instance`.

use nachos_syscall::Syscalls;
use rand::{SeedableRng as _, rngs::StdRng};

use crate::{
    Violation,
    assert::WRONG_RESULT,
    ensure,
    prober::{self, ProbeConfig},
    report,
};

pub const NAME: &str = "fdtest";

/// Seed of the single-process probe; multi-process instances are seeded
/// with their index.
const SINGLE_SEED: u64 = 0;

fn run<S>(sys: &mut S, argv: &[String]) -> Result<i32, Violation>
where
    S: Syscalls,
{
    if argv.len() <= 1 {
        let mut rng = StdRng::seed_from_u64(SINGLE_SEED);
        prober::probe(sys, &ProbeConfig::single(), &mut rng)?;
        report!(sys, "--- PASS test_fd");
        return Ok(0);
    }

    ensure!(argv.len() >= 3, WRONG_RESULT, "test_fd: argc < 3");
    report!(sys, "multiprogramming: {}", argv[1]);
    let instance = super::arg(argv, 1, "instance")?.unwrap_or_default();
    let config = ProbeConfig::multi(instance, argv[2].as_str());
    let mut rng = StdRng::seed_from_u64(u64::from(instance.unsigned_abs()));
    prober::probe(sys, &config, &mut rng)?;
    report!(sys, "--- PASS test_fd {instance}");
    Ok(instance)
}

pub fn main<S>(sys: &mut S, argv: &[String]) -> !
where
    S: Syscalls,
{
    let result = run(sys, argv);
    super::finish(sys, result)
}
