//! Process table.
//!
//! A slot is held from a successful `exec` until the parent reaps the
//! process, so zombies count against the process ceiling.

use std::{collections::BTreeMap, mem, num::NonZero};

use nachos_syscall::SyscallError;
use nachos_types::process::{ExitStatus, ProcId};

/// Who may join a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parent {
    /// Started by the host through [`Kernel::spawn`](crate::Kernel::spawn).
    Host,
    /// Started by another simulated process.
    Proc(ProcId),
    /// The parent exited first; the process is freed as soon as it exits.
    Detached,
}

/// One entry of the kernel's lifecycle journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Spawned {
        pid: ProcId,
        parent: Parent,
        program: String,
    },
    Exited {
        pid: ProcId,
        status: ExitStatus,
    },
    Reaped {
        pid: ProcId,
        parent: Parent,
        status: ExitStatus,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcState {
    Running,
    Zombie(ExitStatus),
}

#[derive(Debug)]
struct ProcEntry {
    parent: Parent,
    state: ProcState,
}

#[derive(Debug)]
pub(crate) struct ProcTable {
    next_pid: u32,
    procs: BTreeMap<ProcId, ProcEntry>,
    max_procs: usize,
    journal: Vec<Event>,
}

impl ProcTable {
    pub(crate) fn new(max_procs: usize) -> Self {
        Self {
            next_pid: 1,
            procs: BTreeMap::new(),
            max_procs,
            journal: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.procs.len()
    }

    pub(crate) fn journal(&self) -> &[Event] {
        &self.journal
    }

    pub(crate) fn take_journal(&mut self) -> Vec<Event> {
        mem::take(&mut self.journal)
    }

    /// Takes a process slot for a new child of `parent`.
    pub(crate) fn allocate(
        &mut self,
        parent: Parent,
        program: &str,
    ) -> Result<ProcId, SyscallError> {
        if self.procs.len() >= self.max_procs {
            return Err(SyscallError::ResourceTemporarilyUnavailable);
        }
        let pid = loop {
            let candidate = NonZero::new(self.next_pid).map(ProcId::new);
            self.next_pid = self.next_pid.checked_add(1).unwrap_or(1);
            if let Some(pid) = candidate.filter(|pid| !self.procs.contains_key(pid)) {
                break pid;
            }
        };
        self.procs.insert(
            pid,
            ProcEntry {
                parent,
                state: ProcState::Running,
            },
        );
        self.journal.push(Event::Spawned {
            pid,
            parent,
            program: program.to_owned(),
        });
        Ok(pid)
    }

    /// Gives back a slot whose process never started running.
    pub(crate) fn abandon(&mut self, pid: ProcId) {
        self.procs.remove(&pid);
        self.journal.retain(
            |event| !matches!(event, Event::Spawned { pid: spawned, .. } if *spawned == pid),
        );
    }

    /// Records the termination of `pid`.
    ///
    /// Children of `pid` are detached: zombies among them are freed now, the
    /// others when they exit.
    pub(crate) fn exit(&mut self, pid: ProcId, status: ExitStatus) {
        let mut freed = vec![];
        for (child, entry) in &mut self.procs {
            if entry.parent != Parent::Proc(pid) {
                continue;
            }
            entry.parent = Parent::Detached;
            if let ProcState::Zombie(_) = entry.state {
                freed.push(*child);
            }
        }
        for child in freed {
            self.procs.remove(&child);
        }

        self.journal.push(Event::Exited { pid, status });
        let Some(entry) = self.procs.get_mut(&pid) else {
            return;
        };
        if entry.parent == Parent::Detached {
            self.procs.remove(&pid);
        } else {
            entry.state = ProcState::Zombie(status);
        }
    }

    /// Reaps `pid` on behalf of `caller` if it has exited.
    ///
    /// Returns `Ok(None)` while the child is still running.
    pub(crate) fn try_reap(
        &mut self,
        caller: Parent,
        pid: ProcId,
    ) -> Result<Option<ExitStatus>, SyscallError> {
        let entry = self
            .procs
            .get(&pid)
            .filter(|entry| entry.parent == caller && caller != Parent::Detached)
            .ok_or(SyscallError::NoChildProcess)?;
        let ProcState::Zombie(status) = entry.state else {
            return Ok(None);
        };
        self.procs.remove(&pid);
        self.journal.push(Event::Reaped {
            pid,
            parent: caller,
            status,
        });
        Ok(Some(status))
    }
}
