//! Flat, in-memory file namespace.
//!
//! A name refers to an [`Inode`]; open descriptors hold their own reference,
//! so removing a name never invalidates a descriptor that is already open.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use nachos_syscall::SyscallError;

use crate::lock;

#[derive(Debug, Default)]
pub(crate) struct Inode {
    data: Mutex<Vec<u8>>,
}

impl Inode {
    fn with_contents(contents: &[u8]) -> Self {
        Self {
            data: Mutex::new(contents.to_vec()),
        }
    }

    /// Reads into `buf` starting at `offset`, returning the number of bytes
    /// read. Reading at or past the end returns 0.
    pub(crate) fn read_at(&self, offset: usize, buf: &mut [u8]) -> usize {
        let data = lock(&self.data);
        let Some(available) = data.get(offset..) else {
            return 0;
        };
        let n = usize::min(available.len(), buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        n
    }

    /// Writes `buf` at `offset`, growing the file (zero-filled) as needed.
    pub(crate) fn write_at(&self, offset: usize, buf: &[u8]) -> usize {
        let mut data = lock(&self.data);
        let end = offset + buf.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[offset..end].copy_from_slice(buf);
        buf.len()
    }

    fn truncate(&self) {
        lock(&self.data).clear();
    }

    fn contents(&self) -> Vec<u8> {
        lock(&self.data).clone()
    }
}

#[derive(Debug)]
pub(crate) struct FileSystem {
    entries: HashMap<String, Arc<Inode>>,
    max_name_len: usize,
}

impl FileSystem {
    pub(crate) fn new(max_name_len: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_name_len,
        }
    }

    fn validate_name(&self, name: &str) -> Result<(), SyscallError> {
        if name.is_empty() || name.len() > self.max_name_len || name.contains('\0') {
            return Err(SyscallError::InvalidFilename);
        }
        Ok(())
    }

    pub(crate) fn lookup(&self, name: &str) -> Result<Arc<Inode>, SyscallError> {
        self.validate_name(name)?;
        self.entries
            .get(name)
            .cloned()
            .ok_or(SyscallError::FsEntryNotFound)
    }

    /// Returns the inode named `name`, created empty or truncated.
    pub(crate) fn create(&mut self, name: &str) -> Result<Arc<Inode>, SyscallError> {
        self.validate_name(name)?;
        let inode = self.entries.entry(name.to_owned()).or_default();
        inode.truncate();
        Ok(Arc::clone(inode))
    }

    pub(crate) fn remove(&mut self, name: &str) -> Result<(), SyscallError> {
        self.validate_name(name)?;
        self.entries
            .remove(name)
            .map(drop)
            .ok_or(SyscallError::FsEntryNotFound)
    }

    pub(crate) fn install(&mut self, name: &str, contents: &[u8]) -> Result<(), SyscallError> {
        self.validate_name(name)?;
        self.entries
            .insert(name.to_owned(), Arc::new(Inode::with_contents(contents)));
        Ok(())
    }

    pub(crate) fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.entries.get(name).map(|inode| inode.contents())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
