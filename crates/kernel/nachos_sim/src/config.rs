use nachos_kernel_params::{MAX_NAME, NOFILE, NPROC};
use nachos_syscall::SyscallCode;

/// Resource ceilings and diagnostics of a simulated kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    /// Process slots, counting both running and not-yet-reaped processes.
    pub max_processes: usize,
    /// Open descriptors per process, standard streams included.
    pub max_open_files: usize,
    /// Longest accepted file name, in bytes.
    pub max_name_len: usize,
    /// Copy console output to the host's standard output.
    pub echo_console: bool,
    /// Syscalls whose invocations are written to the console.
    pub trace_mask: u64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_processes: NPROC,
            max_open_files: NOFILE,
            max_name_len: MAX_NAME,
            echo_console: false,
            trace_mask: 0,
        }
    }
}

impl KernelConfig {
    #[must_use]
    pub fn max_processes(mut self, n: usize) -> Self {
        self.max_processes = n;
        self
    }

    #[must_use]
    pub fn max_open_files(mut self, n: usize) -> Self {
        self.max_open_files = n;
        self
    }

    #[must_use]
    pub fn echo_console(mut self, echo: bool) -> Self {
        self.echo_console = echo;
        self
    }

    #[must_use]
    pub fn trace(mut self, code: SyscallCode) -> Self {
        self.trace_mask |= code.mask_bit();
        self
    }

    #[must_use]
    pub fn is_traced(&self, code: SyscallCode) -> bool {
        self.trace_mask & code.mask_bit() != 0
    }
}
