use std::{collections::HashMap, fmt};

use nachos_syscall::{Program, SyscallError};

use crate::Process;

/// Program images the loader can start, by name.
#[derive(Default)]
pub(crate) struct ProgramTable {
    programs: HashMap<String, Program<Process>>,
}

impl ProgramTable {
    pub(crate) fn register(&mut self, name: &str, program: Program<Process>) {
        self.programs.insert(name.to_owned(), program);
    }

    pub(crate) fn load(&self, name: &str) -> Result<Program<Process>, SyscallError> {
        self.programs
            .get(name)
            .copied()
            .ok_or(SyscallError::FsEntryNotFound)
    }
}

impl fmt::Debug for ProgramTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.programs.keys()).finish()
    }
}
