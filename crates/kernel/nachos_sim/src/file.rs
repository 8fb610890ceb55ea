//! Per-process descriptor table.

use std::sync::Arc;

use nachos_syscall::SyscallError;
use nachos_types::fs::RawFd;

use crate::fs::Inode;

/// Lowest descriptor handed out for files. Lower numbers belong to the
/// standard streams and are never reassigned, even after being closed.
const FIRST_FILE_FD: usize = 2;

#[derive(Debug)]
pub(crate) enum OpenFile {
    Stdin,
    Stdout,
    File { inode: Arc<Inode>, offset: usize },
}

impl OpenFile {
    pub(crate) fn file(inode: Arc<Inode>) -> Self {
        Self::File { inode, offset: 0 }
    }
}

#[derive(Debug)]
pub(crate) struct FdTable {
    ofile: Vec<Option<OpenFile>>,
    max_open: usize,
}

impl FdTable {
    pub(crate) fn new(max_open: usize) -> Self {
        let ofile = vec![Some(OpenFile::Stdin), Some(OpenFile::Stdout)];
        Self { ofile, max_open }
    }

    pub(crate) fn open_count(&self) -> usize {
        self.ofile.iter().flatten().count()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.open_count() >= self.max_open
    }

    /// Installs `file` at the lowest free descriptor.
    pub(crate) fn add(&mut self, file: OpenFile) -> Result<RawFd, SyscallError> {
        if self.is_full() {
            return Err(SyscallError::TooManyOpenFiles);
        }
        let free = self.ofile[FIRST_FILE_FD..]
            .iter()
            .position(Option::is_none)
            .map(|i| i + FIRST_FILE_FD);
        let fd = match free {
            Some(fd) => {
                self.ofile[fd] = Some(file);
                fd
            }
            None => {
                self.ofile.push(Some(file));
                self.ofile.len() - 1
            }
        };
        Ok(RawFd::new(fd))
    }

    pub(crate) fn get_mut(&mut self, fd: RawFd) -> Result<&mut OpenFile, SyscallError> {
        self.ofile
            .get_mut(fd.get())
            .and_then(Option::as_mut)
            .ok_or(SyscallError::BadFileDescriptor)
    }

    pub(crate) fn remove(&mut self, fd: RawFd) -> Result<OpenFile, SyscallError> {
        self.ofile
            .get_mut(fd.get())
            .and_then(Option::take)
            .ok_or(SyscallError::BadFileDescriptor)
    }

    pub(crate) fn clear(&mut self) {
        self.ofile.iter_mut().for_each(|of| *of = None);
    }
}
