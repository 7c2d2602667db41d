//! WAL Reader
//!
//! Walks a buffer of concatenated frames.

use crate::error::Result;

use super::entry::FrameHeader;
use super::{WalEntry, HEADER_SIZE};

/// Reads entries from a buffer of encoded frames
pub struct WalReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> WalReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Read the next entry
    ///
    /// Returns `Ok(None)` at the end of the buffer and also when only a torn
    /// (incomplete) frame remains; use `is_torn_tail` to tell them apart.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        if self.is_torn_tail() || self.remaining().is_empty() {
            return Ok(None);
        }

        let (entry, consumed) = WalEntry::deserialize(self.remaining())?;
        self.position += consumed;
        Ok(Some(entry))
    }

    /// True if the unread bytes hold an incomplete frame
    pub fn is_torn_tail(&self) -> bool {
        let rest = self.remaining();
        if rest.is_empty() {
            return false;
        }
        if rest.len() < HEADER_SIZE {
            return true;
        }
        match FrameHeader::parse(rest) {
            Ok(header) => rest.len() < header.frame_len(),
            Err(_) => false,
        }
    }

    /// Byte offset of the next unread frame
    pub fn position(&self) -> usize {
        self.position
    }

    fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.position..]
    }

    /// Iterate over all entries, stopping at the first error
    pub fn entries(self) -> WalIterator<'a> {
        WalIterator {
            reader: self,
            failed: false,
        }
    }
}

/// Iterator over WAL entries
pub struct WalIterator<'a> {
    reader: WalReader<'a>,
    failed: bool,
}

impl Iterator for WalIterator<'_> {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
