//! `seqfib [units [seed]]`: many validator instances under admission
//! control.
//!
//! Each unit runs `fibonacci` with a random signature in `0..16`. Units are
//! numbered from `units` down to 1 and each uses its number as its instance
//! index, so no two live validators share files.

use nachos_syscall::Syscalls;
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};

use crate::{
    Violation,
    programs::fibonacci,
    report,
    spawner::{self, WorkUnit},
};

pub const NAME: &str = "seqfib";

pub const DEFAULT_UNITS: usize = 100;
pub const DEFAULT_SEED: u64 = 0;

/// Signatures are drawn from `0..SIGNATURES`.
const SIGNATURES: i32 = 16;

fn run<S>(sys: &mut S, argv: &[String]) -> Result<i32, Violation>
where
    S: Syscalls,
{
    let units = super::arg(argv, 1, "unit count")?.unwrap_or(DEFAULT_UNITS);
    let seed = super::arg(argv, 2, "seed")?.unwrap_or(DEFAULT_SEED);
    let mut rng = StdRng::seed_from_u64(seed);

    let work = (1..=units).rev().map(|instance| {
        let signature = rng.random_range(0..SIGNATURES);
        WorkUnit::new(fibonacci::NAME, signature)
            .arg(signature)
            .arg(instance)
    });
    let summary = spawner::run_all(sys, work)?;
    log::debug!("seqfib: {summary:?}");

    report!(sys, "--- PASS sequential fibonacci");
    Ok(0)
}

pub fn main<S>(sys: &mut S, argv: &[String]) -> !
where
    S: Syscalls,
{
    let result = run(sys, argv);
    super::finish(sys, result)
}
