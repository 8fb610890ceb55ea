//! The syscall surface of the system under test.
//!
//! Test programs are written against [`Syscalls`] only. Every operation is
//! synchronous from the caller's point of view, and every failure is reported
//! through [`SyscallError`]; whether a failure is an expected flow-control
//! signal or an invariant violation is for the caller to decide.

use nachos_types::{
    fs::RawFd,
    process::{ExitStatus, ProcId},
};
use strum::{Display, EnumString, FromRepr};

pub use self::error::SyscallError;

pub mod error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumString, Display)]
#[repr(usize)]
#[strum(serialize_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum SyscallCode {
    Exit = 1,
    Exec,
    Join,
    Creat,
    Open,
    Read,
    Write,
    Close,
    Unlink,
}

impl SyscallCode {
    /// All syscalls, in ABI order.
    pub const ALL: [Self; 9] = [
        Self::Exit,
        Self::Exec,
        Self::Join,
        Self::Creat,
        Self::Open,
        Self::Read,
        Self::Write,
        Self::Close,
        Self::Unlink,
    ];

    /// Bit of this syscall in a trace mask.
    #[must_use]
    pub const fn mask_bit(self) -> u64 {
        1 << (self as usize)
    }
}

/// Operations one process can request from the resource manager.
///
/// One value of the implementing type represents the calling process, so the
/// process identity is implicit in `self`.
pub trait Syscalls {
    /// Name the calling process was started as (its `argv[0]`).
    fn program_name(&self) -> &str;

    /// Creates a new child process running `program` with `argv`.
    ///
    /// Failure is an expected outcome: the manager may be out of process
    /// slots, or `program` may not exist. Both come through the same channel.
    fn exec(&mut self, program: &str, argv: &[&str]) -> Result<ProcId, SyscallError>;

    /// Blocks until child `pid` terminates and returns its exit status.
    ///
    /// Returns [`SyscallError::NoChildProcess`] without blocking if `pid` is
    /// not an unreaped child of the caller.
    fn join(&mut self, pid: ProcId) -> Result<ExitStatus, SyscallError>;

    /// Terminates the calling process, publishing `status` to its parent.
    fn exit(&mut self, status: i32) -> !;

    /// Creates `name`, truncating it if it exists, and opens it.
    fn creat(&mut self, name: &str) -> Result<RawFd, SyscallError>;

    /// Opens the existing file `name`.
    fn open(&mut self, name: &str) -> Result<RawFd, SyscallError>;

    fn read(&mut self, fd: RawFd, buf: &mut [u8]) -> Result<usize, SyscallError>;

    fn write(&mut self, fd: RawFd, buf: &[u8]) -> Result<usize, SyscallError>;

    fn close(&mut self, fd: RawFd) -> Result<(), SyscallError>;

    /// Removes `name` from the namespace.
    ///
    /// Descriptors already open on the file stay usable until closed.
    fn unlink(&mut self, name: &str) -> Result<(), SyscallError>;
}

/// Entry point of a program image.
///
/// A program never returns; it ends by calling [`Syscalls::exit`].
pub type Program<S> = fn(&mut S, &[String]) -> !;
