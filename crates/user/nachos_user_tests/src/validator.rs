//! File-mediated sequential-state validation.
//!
//! Two files hold consecutive terms of the Fibonacci recurrence. Every round
//! reads both, computes the next term and writes the pair back, with each
//! file opened and closed around every access. If any read or write is torn
//! or lost, the final value is wrong.

use nachos_syscall::Syscalls;
use nachos_types::fs::RawFd;

use crate::{
    Violation,
    assert::{FAILURE, WRONG_RESULT},
    ensure,
    record::{self, RECORD_WIDTH},
};

/// Rounds performed by a default validator run.
pub const DEFAULT_ROUNDS: usize = 100;

/// Value of the second file after [`DEFAULT_ROUNDS`] rounds: the 101st
/// Fibonacci number, wrapped to 32 bits.
pub const FIB_ROUNDS_100: i32 = -1_869_596_475;

/// The file pair of one validator instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPair {
    pub file_a: String,
    pub file_b: String,
}

impl RecordPair {
    #[must_use]
    pub fn for_instance(instance: i32) -> Self {
        Self {
            file_a: format!("fb_temp_a_{instance}"),
            file_b: format!("fb_temp_b_{instance}"),
        }
    }
}

/// Value of the second file after `rounds` rounds, computed in memory.
#[must_use]
pub fn expected_value(rounds: usize) -> i32 {
    let (mut a, mut b) = (0_i32, 1_i32);
    for _ in 0..rounds {
        (a, b) = (b, a.wrapping_add(b));
    }
    b
}

fn open<S>(sys: &mut S, name: &str) -> Result<RawFd, Violation>
where
    S: Syscalls,
{
    sys.open(name)
        .map_err(|e| Violation::new(FAILURE, format!("open {name} failed: {e}")))
}

fn create<S>(sys: &mut S, name: &str) -> Result<RawFd, Violation>
where
    S: Syscalls,
{
    sys.creat(name)
        .map_err(|e| Violation::new(FAILURE, format!("creat {name} failed: {e}")))
}

fn close<S>(sys: &mut S, fd: RawFd) -> Result<(), Violation>
where
    S: Syscalls,
{
    sys.close(fd)
        .map_err(|e| Violation::new(FAILURE, format!("close {fd} failed: {e}")))
}

fn read_record<S>(sys: &mut S, fd: RawFd, name: &str) -> Result<i32, Violation>
where
    S: Syscalls,
{
    let mut buf = [0; RECORD_WIDTH];
    let n = sys
        .read(fd, &mut buf)
        .map_err(|e| Violation::new(FAILURE, format!("read {name} failed: {e}")))?;
    ensure!(
        n == RECORD_WIDTH,
        FAILURE,
        "short read from {name}: {n} of {RECORD_WIDTH} bytes"
    );
    record::decode(&buf).map_err(|e| Violation::new(FAILURE, format!("{name}: {e}")))
}

fn write_record<S>(sys: &mut S, fd: RawFd, name: &str, value: i32) -> Result<(), Violation>
where
    S: Syscalls,
{
    let n = sys
        .write(fd, &record::encode(value))
        .map_err(|e| Violation::new(FAILURE, format!("write {name} failed: {e}")))?;
    ensure!(
        n == RECORD_WIDTH,
        FAILURE,
        "short write to {name}: {n} of {RECORD_WIDTH} bytes"
    );
    Ok(())
}

fn store<S>(sys: &mut S, fd: RawFd, name: &str, value: i32) -> Result<(), Violation>
where
    S: Syscalls,
{
    write_record(sys, fd, name, value)?;
    close(sys, fd)
}

/// Runs `rounds` rounds over `pair` and returns the final value.
///
/// Both files are removed before returning, whether or not the run
/// succeeded.
pub fn run<S>(sys: &mut S, pair: &RecordPair, rounds: usize) -> Result<i32, Violation>
where
    S: Syscalls,
{
    let result = run_rounds(sys, pair, rounds);
    let _ = sys.unlink(&pair.file_a);
    let _ = sys.unlink(&pair.file_b);
    result
}

fn run_rounds<S>(sys: &mut S, pair: &RecordPair, rounds: usize) -> Result<i32, Violation>
where
    S: Syscalls,
{
    let RecordPair { file_a, file_b } = pair;

    let fd = create(sys, file_a)?;
    store(sys, fd, file_a, 0)?;
    let fd = create(sys, file_b)?;
    store(sys, fd, file_b, 1)?;

    let mut c = 1;
    for round in 0..rounds {
        let fd_a = open(sys, file_a)?;
        let fd_b = open(sys, file_b)?;
        let b = read_record(sys, fd_b, file_b)?;
        let a = read_record(sys, fd_a, file_a)?;
        c = a.wrapping_add(b);
        close(sys, fd_a)?;
        close(sys, fd_b)?;

        let fd_a = open(sys, file_a)?;
        write_record(sys, fd_a, file_a, b)?;
        let fd_b = open(sys, file_b)?;
        write_record(sys, fd_b, file_b, c)?;
        close(sys, fd_a)?;
        close(sys, fd_b)?;
        log::trace!("round {round}: {a} + {b} = {c}");
    }
    Ok(c)
}

/// Runs the default number of rounds and checks the final value.
pub fn validate<S>(sys: &mut S, pair: &RecordPair) -> Result<(), Violation>
where
    S: Syscalls,
{
    let c = run(sys, pair, DEFAULT_ROUNDS)?;
    ensure!(
        c == FIB_ROUNDS_100,
        WRONG_RESULT,
        "wrong {DEFAULT_ROUNDS}-round result: {c}, expected {FIB_ROUNDS_100}"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_constant_matches_recurrence() {
        assert_eq!(expected_value(DEFAULT_ROUNDS), FIB_ROUNDS_100);
    }

    #[test]
    fn small_rounds() {
        let values = (0..8).map(expected_value).collect::<Vec<_>>();
        assert_eq!(values, [1, 1, 2, 3, 5, 8, 13, 21]);
    }

    #[test]
    fn instance_files_are_disjoint() {
        let a = RecordPair::for_instance(1);
        let b = RecordPair::for_instance(2);
        assert_eq!(a.file_a, "fb_temp_a_1");
        assert_ne!(a.file_a, b.file_a);
        assert_ne!(a.file_b, b.file_b);
    }
}
