//! Fixed-width integer records.
//!
//! A record is the decimal text of an `i32` padded with NUL bytes to
//! [`RECORD_WIDTH`] bytes.

use std::{
    num::ParseIntError,
    str::{self, Utf8Error},
};

pub use nachos_kernel_params::RECORD_WIDTH;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("empty record")]
    Empty,
    #[error("record is not text: {0}")]
    NotText(#[from] Utf8Error),
    #[error("record is not a number: {0}")]
    NotNumber(#[from] ParseIntError),
}

#[must_use]
pub fn encode(value: i32) -> [u8; RECORD_WIDTH] {
    let text = value.to_string();
    let mut record = [0; RECORD_WIDTH];
    record[..text.len()].copy_from_slice(text.as_bytes());
    record
}

/// Parses a record, ignoring everything from the first NUL on.
pub fn decode(record: &[u8]) -> Result<i32, RecordError> {
    let end = memchr::memchr(0, record).unwrap_or(record.len());
    let text = str::from_utf8(&record[..end])?;
    if text.is_empty() {
        return Err(RecordError::Empty);
    }
    Ok(text.parse()?)
}
