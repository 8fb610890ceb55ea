use std::{fmt, panic};

use nachos_syscall::{SyscallCode, SyscallError, Syscalls};
use nachos_types::{
    fs::RawFd,
    process::{ExitStatus, ProcId},
};

use crate::{
    Kernel,
    file::{FdTable, OpenFile},
    kernel::ExitRequest,
    lock,
    proc::Parent,
};

/// The calling context of one simulated process.
///
/// Each process owns its `Process` value on its own thread; the descriptor
/// table lives here and is never shared.
#[derive(Debug)]
pub struct Process {
    kernel: Kernel,
    pid: ProcId,
    name: String,
    fds: FdTable,
}

impl Process {
    pub(crate) fn new(kernel: Kernel, pid: ProcId, name: String) -> Self {
        let fds = FdTable::new(kernel.config().max_open_files);
        Self {
            kernel,
            pid,
            name,
            fds,
        }
    }

    #[must_use]
    pub fn id(&self) -> ProcId {
        self.pid
    }

    pub(crate) fn describe(&self) -> String {
        format!("{}({})", self.name, self.pid)
    }

    /// Releases everything the process holds and publishes its status.
    pub(crate) fn terminate(mut self, status: ExitStatus) {
        self.fds.clear();
        self.kernel.exit(self.pid, status);
    }

    fn trace<T>(
        &self,
        code: SyscallCode,
        args: fmt::Arguments<'_>,
        ret: Result<T, SyscallError>,
    ) -> Result<T, SyscallError>
    where
        T: fmt::Debug,
    {
        let outcome = match &ret {
            Ok(value) => format!("{value:?}"),
            Err(e) => format!("{e} (errno {})", e.errno()),
        };
        log::trace!("{}: syscall {code} ({args}) -> {outcome}", self.describe());
        if self.kernel.config().is_traced(code) {
            let line = format!("{}: syscall {code} ({args}) -> {outcome}\n", self.describe());
            lock(self.kernel.console()).write(line.as_bytes());
        }
        ret
    }

    fn open_file(
        &mut self,
        name: &str,
        create: bool,
    ) -> Result<RawFd, SyscallError> {
        if self.fds.is_full() {
            log::debug!("{}: descriptor table full, cannot open {name:?}", self.describe());
            return Err(SyscallError::TooManyOpenFiles);
        }
        let inode = {
            let mut fs = lock(self.kernel.fs());
            if create {
                fs.create(name)?
            } else {
                fs.lookup(name)?
            }
        };
        self.fds.add(OpenFile::file(inode))
    }
}

impl Syscalls for Process {
    fn program_name(&self) -> &str {
        &self.name
    }

    fn exec(&mut self, program: &str, argv: &[&str]) -> Result<ProcId, SyscallError> {
        let ret = self.kernel.exec(Parent::Proc(self.pid), program, argv);
        self.trace(SyscallCode::Exec, format_args!("{program:?}, {argv:?}"), ret)
    }

    fn join(&mut self, pid: ProcId) -> Result<ExitStatus, SyscallError> {
        let ret = self.kernel.join(Parent::Proc(self.pid), pid);
        self.trace(SyscallCode::Join, format_args!("{pid}"), ret)
    }

    fn exit(&mut self, status: i32) -> ! {
        let _ = self.trace(SyscallCode::Exit, format_args!("{status}"), Ok(()));
        panic::resume_unwind(Box::new(ExitRequest(status)))
    }

    fn creat(&mut self, name: &str) -> Result<RawFd, SyscallError> {
        let ret = self.open_file(name, true);
        self.trace(SyscallCode::Creat, format_args!("{name:?}"), ret)
    }

    fn open(&mut self, name: &str) -> Result<RawFd, SyscallError> {
        let ret = self.open_file(name, false);
        self.trace(SyscallCode::Open, format_args!("{name:?}"), ret)
    }

    fn read(&mut self, fd: RawFd, buf: &mut [u8]) -> Result<usize, SyscallError> {
        let ret = self.fds.get_mut(fd).and_then(|file| match file {
            OpenFile::Stdin => Ok(0),
            OpenFile::Stdout => Err(SyscallError::BadFileDescriptor),
            OpenFile::File { inode, offset } => {
                let n = inode.read_at(*offset, buf);
                *offset += n;
                Ok(n)
            }
        });
        self.trace(SyscallCode::Read, format_args!("{fd}, {}", buf.len()), ret)
    }

    fn write(&mut self, fd: RawFd, buf: &[u8]) -> Result<usize, SyscallError> {
        let console = self.kernel.console();
        let ret = self.fds.get_mut(fd).and_then(|file| match file {
            OpenFile::Stdin => Err(SyscallError::BadFileDescriptor),
            OpenFile::Stdout => {
                lock(console).write(buf);
                Ok(buf.len())
            }
            OpenFile::File { inode, offset } => {
                let n = inode.write_at(*offset, buf);
                *offset += n;
                Ok(n)
            }
        });
        self.trace(SyscallCode::Write, format_args!("{fd}, {}", buf.len()), ret)
    }

    fn close(&mut self, fd: RawFd) -> Result<(), SyscallError> {
        let ret = self.fds.remove(fd).map(drop);
        self.trace(SyscallCode::Close, format_args!("{fd}"), ret)
    }

    fn unlink(&mut self, name: &str) -> Result<(), SyscallError> {
        let ret = lock(self.kernel.fs()).remove(name);
        self.trace(SyscallCode::Unlink, format_args!("{name:?}"), ret)
    }
}
