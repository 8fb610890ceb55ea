//! Process-lifecycle and file-descriptor conformance tests.
//!
//! The building blocks ([`spawner`], [`prober`], [`validator`]) are generic
//! over [`Syscalls`](nachos_syscall::Syscalls) and report broken invariants
//! as [`Violation`]s. The [`programs`] module composes them into runnable
//! test programs, and [`test_runner`] drives those programs on a simulated
//! kernel.

pub use self::assert::Violation;

mod macros;

pub mod assert;
pub mod programs;
pub mod prober;
pub mod record;
pub mod spawner;
pub mod test_runner;
pub mod traits;
pub mod validator;
