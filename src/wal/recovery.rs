//! WAL Recovery
//!
//! Rebuilds the entry sequence from persisted frames.

use crate::error::{AtlasError, Result};

use super::{WalEntry, WalReader};

/// Handles replay of persisted log frames
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Last valid LSN (0 if the log was empty)
    pub last_lsn: u64,

    /// Whether an incomplete trailing frame was dropped
    pub was_truncated: bool,

    /// Bytes of the input that hold complete, valid frames
    pub valid_len: usize,
}

impl WalRecovery {
    /// Decode every frame in `bytes`
    ///
    /// This will:
    /// 1. Read all frames in order
    /// 2. Fail on a CRC mismatch or undecodable payload
    /// 3. Fail if LSNs do not strictly increase
    /// 4. Drop a torn frame at the very end (partial write)
    pub fn replay(bytes: &[u8]) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let mut reader = WalReader::new(bytes);
        let mut entries = Vec::new();
        let mut last_lsn = 0u64;

        while let Some(entry) = reader.next_entry()? {
            if entry.lsn <= last_lsn {
                return Err(AtlasError::corruption(format!(
                    "LSN regression in log: {} follows {}",
                    entry.lsn, last_lsn
                )));
            }
            last_lsn = entry.lsn;
            entries.push(entry);
        }

        let was_truncated = reader.is_torn_tail();
        if was_truncated {
            tracing::warn!(
                offset = reader.position(),
                dropped = bytes.len() - reader.position(),
                "dropping torn frame at end of log"
            );
        }

        let result = RecoveryResult {
            entries_recovered: entries.len() as u64,
            last_lsn,
            was_truncated,
            valid_len: reader.position(),
        };

        tracing::debug!(
            entries = result.entries_recovered,
            last_lsn = result.last_lsn,
            truncated = result.was_truncated,
            "log replay finished"
        );

        Ok((entries, result))
    }

    /// Verify integrity of a log buffer without keeping the entries
    pub fn verify(bytes: &[u8]) -> Result<RecoveryResult> {
        Self::replay(bytes).map(|(_, result)| result)
    }
}
