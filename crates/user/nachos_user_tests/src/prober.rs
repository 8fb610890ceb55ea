//! Randomized descriptor-exhaustion probing.
//!
//! The prober fills a process's descriptor table one slot per round. Between
//! rounds it releases its slots in a random order and reopens them, so that
//! the system has to recycle descriptors in every possible pattern without
//! ever handing out a descriptor twice or running out early.

use nachos_syscall::Syscalls;
use nachos_types::fs::RawFd;
use rand::Rng;

use crate::{Violation, assert::FAILURE, bail, ensure, report};

/// Descriptor capacity assumed in single-process mode.
pub const SINGLE_CAPACITY: usize = 16;

/// Descriptor capacity assumed by each instance in multi-process mode.
pub const MULTI_CAPACITY: usize = 8;

/// Backing file of single-process mode.
pub const DEFAULT_FILE: &str = "nachos_test_fd.txt.test";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    /// The only prober on the system: checks exact saturation and removes
    /// its backing file.
    Single,
    /// One of several concurrent probers. Slot 0 is never released and the
    /// backing file is left for the parent to remove.
    Multi { instance: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub capacity: usize,
    pub file: String,
    pub mode: ProbeMode,
}

impl ProbeConfig {
    #[must_use]
    pub fn single() -> Self {
        Self {
            capacity: SINGLE_CAPACITY,
            file: DEFAULT_FILE.to_owned(),
            mode: ProbeMode::Single,
        }
    }

    pub fn multi(instance: i32, file: impl Into<String>) -> Self {
        Self {
            capacity: MULTI_CAPACITY,
            file: file.into(),
            mode: ProbeMode::Multi { instance },
        }
    }

    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

/// Descriptor slots under test.
#[derive(Debug, Default)]
struct Slots {
    slots: Vec<Option<RawFd>>,
}

impl Slots {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Checks that slots `0..n` hold valid, distinct, non-standard
    /// descriptors.
    fn check(&self, round: usize, n: usize) -> Result<(), Violation> {
        for (j, slot) in self.slots[..n].iter().enumerate() {
            let Some(fd) = slot else {
                bail!(FAILURE, "test_fd: round {round} fd[{j}] fails");
            };
            ensure!(
                !fd.is_standard_stream(),
                FAILURE,
                "test_fd: illegal use fd {fd}."
            );
            ensure!(
                !self.slots[..j].contains(slot),
                FAILURE,
                "test_fd: round {round} fd[{j}] = {fd} is already held"
            );
        }
        Ok(())
    }

    fn held(&self, n: usize) -> impl Iterator<Item = RawFd> + '_ {
        self.slots[..n].iter().flatten().copied()
    }
}

/// Random permutation of `0..n`, built with the inside-out Fisher-Yates
/// shuffle.
pub fn permutation<R>(rng: &mut R, n: usize) -> Vec<usize>
where
    R: Rng + ?Sized,
{
    let mut p = Vec::with_capacity(n);
    for j in 0..n {
        let x = rng.random_range(0..=j);
        p.push(j);
        p.swap(j, x);
    }
    p
}

/// Runs the probe, returning the descriptors held when the last round
/// started.
///
/// The backing file is removed on failure, and on success in
/// single-process mode.
pub fn probe<S, R>(
    sys: &mut S,
    config: &ProbeConfig,
    rng: &mut R,
) -> Result<Vec<RawFd>, Violation>
where
    S: Syscalls,
    R: Rng + ?Sized,
{
    let result = probe_rounds(sys, config, rng);
    if result.is_err() || config.mode == ProbeMode::Single {
        let _ = sys.unlink(&config.file);
    }
    result
}

fn probe_rounds<S, R>(
    sys: &mut S,
    config: &ProbeConfig,
    rng: &mut R,
) -> Result<Vec<RawFd>, Violation>
where
    S: Syscalls,
    R: Rng + ?Sized,
{
    let ProbeConfig {
        capacity,
        file,
        mode,
    } = config;
    let capacity = *capacity;
    ensure!(capacity >= 2, FAILURE, "test_fd: capacity {capacity} is too small");

    let verbose = *mode == ProbeMode::Single;
    if verbose {
        ensure!(
            sys.open(file).is_err(),
            FAILURE,
            "test_fd: {file} exists before creation. check unlink."
        );
    }

    let mut slots = Slots::with_capacity(capacity);
    slots.slots[0] = Some(
        sys.creat(file)
            .map_err(|e| Violation::new(FAILURE, format!("test_fd: {file} create fails: {e}")))?,
    );
    // Closing stdin leaves descriptor 0 free; it must never be reassigned.
    let _ = sys.close(RawFd::new(0));

    for round in 1..capacity {
        slots.check(round, round)?;
        if verbose {
            let fds = slots
                .held(round)
                .map(|fd| fd.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            report!(sys, "round {round} fds: {fds}");
        }

        let order = permutation(rng, round);
        if round == capacity - 1 {
            break;
        }

        for &j in &order {
            if j == 0 && matches!(mode, ProbeMode::Multi { .. }) {
                continue;
            }
            if let Some(fd) = slots.slots[j].take() {
                let _ = sys.close(fd);
            }
        }

        for (j, slot) in slots.slots[..=round].iter_mut().enumerate() {
            if slot.is_none() {
                *slot = sys
                    .open(file)
                    .inspect_err(|e| log::debug!("round {round}: reopen fd[{j}] failed: {e}"))
                    .ok();
            }
        }
    }

    if verbose && let Ok(fd) = sys.open(file) {
        let _ = sys.close(fd);
        bail!(FAILURE, "test_fd: available fds exceed.");
    }

    Ok(slots.held(capacity - 1).collect())
}
