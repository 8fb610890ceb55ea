/// Maximum number of process slots (running or not yet reaped).
pub const NPROC: usize = 16;

/// Open files per process, standard streams included.
pub const NOFILE: usize = 16;

/// Maximum file name length.
pub const MAX_NAME: usize = 256;

/// Maximum number of arguments passed to `exec`.
pub const MAX_ARG: usize = 16;

/// Width of one integer record in the sequential-state files.
pub const RECORD_WIDTH: usize = 20;
