use std::{
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Condvar, Mutex, PoisonError},
    thread,
};

use nachos_kernel_params::MAX_ARG;
use nachos_syscall::{Program, SyscallError};
use nachos_types::process::{ExitStatus, ProcId};

use crate::{
    KernelConfig, Process,
    console::Console,
    fs::FileSystem,
    lock,
    proc::{Event, Parent, ProcTable},
    program::ProgramTable,
};

/// Payload carried by the unwind that implements `exit`.
pub(crate) struct ExitRequest(pub(crate) i32);

#[derive(Debug)]
struct Shared {
    config: KernelConfig,
    programs: Mutex<ProgramTable>,
    procs: Mutex<ProcTable>,
    child_ended: Condvar,
    fs: Mutex<FileSystem>,
    console: Mutex<Console>,
}

/// Resources still held by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    /// Process slots in use, zombies included.
    pub processes: usize,
    /// Names in the file namespace.
    pub files: usize,
}

/// A simulated resource manager.
///
/// Cloning a `Kernel` yields another handle to the same machine.
#[derive(Debug, Clone)]
pub struct Kernel {
    shared: Arc<Shared>,
}

impl Kernel {
    #[must_use]
    pub fn new(config: KernelConfig) -> Self {
        let shared = Shared {
            programs: Mutex::default(),
            procs: Mutex::new(ProcTable::new(config.max_processes)),
            child_ended: Condvar::new(),
            fs: Mutex::new(FileSystem::new(config.max_name_len)),
            console: Mutex::new(Console::new(config.echo_console)),
            config,
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    #[must_use]
    pub fn config(&self) -> &KernelConfig {
        &self.shared.config
    }

    /// Makes `program` loadable under `name`.
    pub fn register(&self, name: &str, program: Program<Process>) {
        lock(&self.shared.programs).register(name, program);
    }

    /// Starts `program` as a process owned by the host.
    pub fn spawn(&self, program: &str, argv: &[&str]) -> Result<ProcId, SyscallError> {
        self.exec(Parent::Host, program, argv)
    }

    /// Waits for a process started by [`Kernel::spawn`].
    pub fn wait(&self, pid: ProcId) -> Result<ExitStatus, SyscallError> {
        self.join(Parent::Host, pid)
    }

    /// Starts `program` and waits for it to exit.
    pub fn run(&self, program: &str, argv: &[&str]) -> Result<ExitStatus, SyscallError> {
        let pid = self.spawn(program, argv)?;
        self.wait(pid)
    }

    #[must_use]
    pub fn usage(&self) -> Usage {
        Usage {
            processes: lock(&self.shared.procs).len(),
            files: lock(&self.shared.fs).len(),
        }
    }

    /// Returns every spawn, exit and reap recorded so far, in order.
    #[must_use]
    pub fn journal(&self) -> Vec<Event> {
        lock(&self.shared.procs).journal().to_vec()
    }

    /// Returns the journal and clears it.
    pub fn take_journal(&self) -> Vec<Event> {
        lock(&self.shared.procs).take_journal()
    }

    /// Returns everything written to standard output so far.
    #[must_use]
    pub fn console_output(&self) -> String {
        lock(&self.shared.console).contents()
    }

    /// Returns and clears the console output.
    pub fn take_console_output(&self) -> String {
        lock(&self.shared.console).take()
    }

    /// Creates a file from the host side.
    pub fn install_file(&self, name: &str, contents: &[u8]) -> Result<(), SyscallError> {
        lock(&self.shared.fs).install(name, contents)
    }

    /// Returns the contents of `name`, if it exists.
    #[must_use]
    pub fn file_contents(&self, name: &str) -> Option<Vec<u8>> {
        lock(&self.shared.fs).contents(name)
    }

    pub(crate) fn fs(&self) -> &Mutex<FileSystem> {
        &self.shared.fs
    }

    pub(crate) fn console(&self) -> &Mutex<Console> {
        &self.shared.console
    }

    pub(crate) fn exec(
        &self,
        parent: Parent,
        program: &str,
        argv: &[&str],
    ) -> Result<ProcId, SyscallError> {
        if argv.len() > MAX_ARG {
            return Err(SyscallError::ArgumentListTooLong);
        }
        let image = lock(&self.shared.programs).load(program)?;
        let pid = lock(&self.shared.procs).allocate(parent, program)?;

        let name = argv.first().copied().unwrap_or(program).to_owned();
        let argv = argv.iter().map(|&arg| arg.to_owned()).collect::<Vec<_>>();
        let process = Process::new(self.clone(), pid, name);

        let spawned = thread::Builder::new()
            .name(format!("{program}({pid})"))
            .spawn(move || run(process, image, &argv));
        if let Err(e) = spawned {
            log::warn!("cannot start thread for {program}: {e}");
            lock(&self.shared.procs).abandon(pid);
            return Err(SyscallError::ResourceTemporarilyUnavailable);
        }

        log::debug!("exec {program} -> pid {pid} (parent {parent:?})");
        Ok(pid)
    }

    pub(crate) fn join(&self, caller: Parent, pid: ProcId) -> Result<ExitStatus, SyscallError> {
        let mut procs = lock(&self.shared.procs);
        loop {
            if let Some(status) = procs.try_reap(caller, pid)? {
                log::debug!("join {pid} -> {status}");
                return Ok(status);
            }
            procs = self
                .shared
                .child_ended
                .wait(procs)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub(crate) fn exit(&self, pid: ProcId, status: ExitStatus) {
        lock(&self.shared.procs).exit(pid, status);
        log::debug!("pid {pid} exited: {status}");
        self.shared.child_ended.notify_all();
    }
}

fn enter(process: &mut Process, image: Program<Process>, argv: &[String]) {
    image(process, argv)
}

fn run(mut process: Process, image: Program<Process>, argv: &[String]) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| enter(&mut process, image, argv)));
    let status = match result {
        Ok(()) => ExitStatus::new(0),
        Err(payload) => match payload.downcast::<ExitRequest>() {
            Ok(request) => ExitStatus::new(request.0),
            Err(_) => {
                log::warn!("{} faulted", process.describe());
                ExitStatus::faulted()
            }
        },
    };
    process.terminate(status);
}
