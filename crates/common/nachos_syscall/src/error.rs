use strum::FromRepr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, thiserror::Error)]
#[repr(isize)]
pub enum SyscallError {
    // ENOENT
    #[error("no such file or directory")]
    FsEntryNotFound = 2,
    // E2BIG
    #[error("argument list too long")]
    ArgumentListTooLong = 7,
    // EBADF
    #[error("bad file descriptor")]
    BadFileDescriptor = 9,
    // ECHILD
    #[error("no child process")]
    NoChildProcess = 10,
    // EAGAIN
    #[error("resource temporarily unavailable")]
    ResourceTemporarilyUnavailable = 11,
    // EMFILE
    #[error("too many open files")]
    TooManyOpenFiles = 24,
    // ENAMETOOLONG
    #[error("file name too long")]
    InvalidFilename = 36,
}

impl SyscallError {
    /// errno value of this error.
    #[must_use]
    pub const fn errno(self) -> isize {
        self as isize
    }
}
