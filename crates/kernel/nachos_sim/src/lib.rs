//! An in-process model of the Nachos resource manager.
//!
//! Every simulated process runs its program on a dedicated host thread and
//! talks to the kernel through [`Syscalls`](nachos_syscall::Syscalls). The
//! kernel enforces the process ceiling, the per-process descriptor ceiling
//! and the join contract; everything else (scheduling, memory) is left to
//! the host.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use self::{
    config::KernelConfig,
    kernel::{Kernel, Usage},
    proc::{Event, Parent},
    syscall::Process,
};

mod config;
mod console;
mod file;
mod fs;
mod kernel;
mod proc;
mod program;
mod syscall;

/// Locks `mutex`, ignoring poisoning.
///
/// A faulting program unwinds through its own thread only, so kernel state
/// is consistent whenever a lock is released.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
