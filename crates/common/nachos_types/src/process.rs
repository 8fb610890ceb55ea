use core::{fmt, num::NonZero, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ProcId(NonZero<u32>);

impl fmt::Display for ProcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<ProcId> for u32 {
    fn from(value: ProcId) -> Self {
        value.0.get()
    }
}

impl From<NonZero<u32>> for ProcId {
    fn from(value: NonZero<u32>) -> Self {
        Self(value)
    }
}

impl ProcId {
    #[must_use]
    pub const fn new(value: NonZero<u32>) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> NonZero<u32> {
        self.0
    }
}

impl FromStr for ProcId {
    type Err = <NonZero<u32> as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self::new)
    }
}

/// Represents the exit status of a process.
///
/// A process that reached `exit` carries the status it published. A process
/// that faulted before reaching `exit` is reported as abnormal with code `-1`.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    status: i32,
    abnormal: bool,
}

impl ExitStatus {
    /// Status code published by a faulted process.
    pub const FAULT_CODE: i32 = -1;

    /// Creates a new `ExitStatus` with the given status code.
    #[must_use]
    pub const fn new(status: i32) -> Self {
        Self {
            status,
            abnormal: false,
        }
    }

    /// Creates the status of a process that terminated without calling `exit`.
    #[must_use]
    pub const fn faulted() -> Self {
        Self {
            status: Self::FAULT_CODE,
            abnormal: true,
        }
    }

    /// Checks if the process exited successfully.
    #[must_use]
    pub const fn success(&self) -> bool {
        !self.abnormal && self.status == 0
    }

    /// Returns the status code of the process.
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.status
    }

    /// Returns `true` if the process terminated without calling `exit`.
    #[must_use]
    pub const fn is_abnormal(&self) -> bool {
        self.abnormal
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.abnormal {
            write!(f, "faulted ({})", self.status)
        } else {
            write!(f, "exit status {}", self.status)
        }
    }
}
