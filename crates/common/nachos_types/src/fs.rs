use core::fmt;

/// Console input, open in every process at start.
pub const STDIN_FD: RawFd = RawFd::new(0);
/// Console output, open in every process at start.
pub const STDOUT_FD: RawFd = RawFd::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct RawFd(usize);

impl fmt::Display for RawFd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<RawFd> for usize {
    fn from(value: RawFd) -> Self {
        value.0
    }
}

impl From<usize> for RawFd {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl RawFd {
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Returns `true` for the descriptors bound to the console at process
    /// start.
    #[must_use]
    pub const fn is_standard_stream(self) -> bool {
        self.0 == STDIN_FD.0 || self.0 == STDOUT_FD.0
    }
}
