//! Admission-controlled spawning.
//!
//! The process ceiling of the system under test is not known in advance. A
//! [`Spawner`] discovers it by spawning until `exec` fails, then makes room
//! by retiring its oldest outstanding child. Every child carries the exit
//! status it is expected to publish, so the completion order of children
//! does not matter.

use std::collections::VecDeque;

use nachos_syscall::Syscalls;
use nachos_types::process::ProcId;

use crate::{Violation, assert::FAILURE, ensure};

/// One program run to be issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    program: String,
    argv: Vec<String>,
    signature: i32,
}

impl WorkUnit {
    /// A run of `program` that must exit with `signature`.
    ///
    /// The argument list starts out as `[program]`.
    pub fn new(program: impl Into<String>, signature: i32) -> Self {
        let program = program.into();
        Self {
            argv: vec![program.clone()],
            program,
            signature,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl ToString) -> Self {
        self.argv.push(arg.to_string());
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn signature(&self) -> i32 {
        self.signature
    }
}

/// A spawned child that has not been joined yet.
///
/// Retiring consumes the handle, so a child cannot be joined twice.
#[must_use = "a dropped handle leaves its child unjoined"]
#[derive(Debug, PartialEq, Eq)]
pub struct ChildHandle {
    pid: ProcId,
    signature: i32,
    spawn_order: usize,
}

impl ChildHandle {
    #[must_use]
    pub fn pid(&self) -> ProcId {
        self.pid
    }

    #[must_use]
    pub fn signature(&self) -> i32 {
        self.signature
    }

    #[must_use]
    pub fn spawn_order(&self) -> usize {
        self.spawn_order
    }
}

#[must_use = "a spawned child must be joined"]
#[derive(Debug, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned(ChildHandle),
    /// The system refused to start another process.
    AtCapacity,
}

/// Summary of a spawner's work so far.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SpawnReport {
    pub spawned: usize,
    pub retired: usize,
    /// `exec` calls that were refused.
    pub refusals: usize,
    pub peak_outstanding: usize,
    /// Spawn order of every retired child, in retirement order.
    pub retirement_order: Vec<usize>,
}

/// Sliding window of outstanding children, retired oldest first.
#[derive(Debug, Default)]
pub struct Spawner {
    outstanding: VecDeque<ChildHandle>,
    next_order: usize,
    report: SpawnReport,
}

impl Spawner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    #[must_use]
    pub fn report(&self) -> &SpawnReport {
        &self.report
    }

    /// Makes a single attempt to start `unit`.
    ///
    /// A refusal is not an error; it only says the system is full right now.
    /// A spawned child is not tracked by the spawner; the caller joins it.
    pub fn try_spawn<S>(&mut self, sys: &mut S, unit: &WorkUnit) -> SpawnOutcome
    where
        S: Syscalls,
    {
        let argv = unit.argv.iter().map(String::as_str).collect::<Vec<_>>();
        match sys.exec(&unit.program, &argv) {
            Ok(pid) => {
                let handle = ChildHandle {
                    pid,
                    signature: unit.signature,
                    spawn_order: self.next_order,
                };
                self.next_order += 1;
                self.report.spawned += 1;
                SpawnOutcome::Spawned(handle)
            }
            Err(e) => {
                log::debug!("exec {} refused: {e}", unit.program);
                self.report.refusals += 1;
                SpawnOutcome::AtCapacity
            }
        }
    }

    /// Starts `unit`, retiring the oldest children until the system accepts
    /// it.
    pub fn submit<S>(&mut self, sys: &mut S, unit: &WorkUnit) -> Result<(), Violation>
    where
        S: Syscalls,
    {
        loop {
            match self.try_spawn(sys, unit) {
                SpawnOutcome::Spawned(handle) => {
                    self.outstanding.push_back(handle);
                    self.report.peak_outstanding =
                        usize::max(self.report.peak_outstanding, self.outstanding.len());
                    return Ok(());
                }
                SpawnOutcome::AtCapacity => {
                    ensure!(
                        !self.outstanding.is_empty(),
                        FAILURE,
                        "cannot exec {} with no children outstanding",
                        unit.program
                    );
                    self.retire_oldest(sys)?;
                }
            }
        }
    }

    /// Joins the oldest outstanding child and checks its exit status.
    ///
    /// Returns `Ok(false)` if nothing was outstanding.
    pub fn retire_oldest<S>(&mut self, sys: &mut S) -> Result<bool, Violation>
    where
        S: Syscalls,
    {
        let Some(handle) = self.outstanding.pop_front() else {
            return Ok(false);
        };
        let order = handle.spawn_order;
        retire(sys, handle)?;
        self.report.retired += 1;
        self.report.retirement_order.push(order);
        Ok(true)
    }

    /// Retires every outstanding child in spawn order.
    pub fn drain<S>(&mut self, sys: &mut S) -> Result<&SpawnReport, Violation>
    where
        S: Syscalls,
    {
        while self.retire_oldest(sys)? {}
        Ok(&self.report)
    }
}

fn retire<S>(sys: &mut S, handle: ChildHandle) -> Result<(), Violation>
where
    S: Syscalls,
{
    let status = sys
        .join(handle.pid)
        .map_err(|e| Violation::new(FAILURE, format!("join {} failed: {e}", handle.pid)))?;
    ensure!(
        !status.is_abnormal(),
        FAILURE,
        "child {} (spawn #{}) {status}",
        handle.pid,
        handle.spawn_order
    );
    ensure!(
        status.code() == handle.signature,
        FAILURE,
        "wrong status: child {} (spawn #{}) exited with {}, expected {}",
        handle.pid,
        handle.spawn_order,
        status.code(),
        handle.signature
    );
    Ok(())
}

/// Issues every unit in order and retires all children.
pub fn run_all<S, I>(sys: &mut S, units: I) -> Result<SpawnReport, Violation>
where
    S: Syscalls,
    I: IntoIterator<Item = WorkUnit>,
{
    let mut spawner = Spawner::new();
    for unit in units {
        spawner.submit(sys, &unit)?;
    }
    spawner.drain(sys).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_unit_argv_starts_with_program() {
        let unit = WorkUnit::new("fibonacci", 7).arg(7).arg("3");
        assert_eq!(unit.argv, ["fibonacci", "7", "3"]);
        assert_eq!(unit.program(), "fibonacci");
        assert_eq!(unit.signature(), 7);
    }
}
