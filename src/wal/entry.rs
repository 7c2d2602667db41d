//! WAL Entry definitions
//!
//! Defines the structure and framing of individual log entries.

use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, Result};
use crate::schema::RowKey;
use crate::store::Record;

/// Frame header: LSN (8) + CRC (4) + payload length (4)
pub const HEADER_SIZE: usize = 16;

/// Largest payload a frame may declare (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// A single entry in the cell log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalEntry {
    /// Log Sequence Number - strictly increasing
    pub lsn: u64,

    /// Row the record belongs to
    pub row_key: RowKey,

    /// The appended record
    pub record: Record,
}

/// Serialized body of a frame
#[derive(Serialize, Deserialize)]
struct Payload {
    row_key: RowKey,
    record: Record,
}

#[derive(Serialize)]
struct PayloadRef<'a> {
    row_key: &'a RowKey,
    record: &'a Record,
}

impl WalEntry {
    pub fn new(lsn: u64, row_key: RowKey, record: Record) -> Self {
        Self { lsn, row_key, record }
    }

    /// Encode as `[lsn][crc][len][payload]`, integers big-endian
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(&PayloadRef {
            row_key: &self.row_key,
            record: &self.record,
        })
        .map_err(|e| AtlasError::Serialization(e.to_string()))?;

        let len = u32::try_from(payload.len())
            .ok()
            .filter(|len| *len <= MAX_PAYLOAD_SIZE)
            .ok_or_else(|| {
                AtlasError::Serialization(format!(
                    "log payload of {} bytes exceeds {} bytes",
                    payload.len(),
                    MAX_PAYLOAD_SIZE
                ))
            })?;

        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
        frame.extend_from_slice(&self.lsn.to_be_bytes());
        frame.extend_from_slice(&compute_crc(self.lsn, &payload).to_be_bytes());
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    /// Decode one frame from the front of `bytes`
    ///
    /// Returns the entry and the number of bytes consumed.
    pub fn deserialize(bytes: &[u8]) -> Result<(Self, usize)> {
        let header = FrameHeader::parse(bytes)?;
        let total = header.frame_len();

        if bytes.len() < total {
            return Err(AtlasError::corruption(format!(
                "truncated frame at lsn {}: expected {} bytes, got {}",
                header.lsn,
                total,
                bytes.len()
            )));
        }

        let payload = &bytes[HEADER_SIZE..total];
        let actual = compute_crc(header.lsn, payload);
        if actual != header.crc {
            return Err(AtlasError::corruption(format!(
                "CRC mismatch at lsn {}: stored {:08x}, computed {:08x}",
                header.lsn, header.crc, actual
            )));
        }

        let Payload { row_key, record } = bincode::deserialize(payload).map_err(|e| {
            AtlasError::corruption(format!("undecodable payload at lsn {}: {}", header.lsn, e))
        })?;

        Ok((Self::new(header.lsn, row_key, record), total))
    }
}

/// Parsed fixed-size frame header
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameHeader {
    pub lsn: u64,
    pub crc: u32,
    pub len: u32,
}

impl FrameHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(AtlasError::corruption(format!(
                "incomplete frame header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut lsn = [0u8; 8];
        lsn.copy_from_slice(&bytes[0..8]);
        let crc = u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let len = u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

        if len > MAX_PAYLOAD_SIZE {
            return Err(AtlasError::corruption(format!(
                "frame declares {} byte payload (max {})",
                len, MAX_PAYLOAD_SIZE
            )));
        }

        Ok(Self {
            lsn: u64::from_be_bytes(lsn),
            crc,
            len,
        })
    }

    pub fn frame_len(&self) -> usize {
        HEADER_SIZE + self.len as usize
    }
}

/// CRC32 over the LSN and the payload
fn compute_crc(lsn: u64, payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&lsn.to_be_bytes());
    hasher.update(payload);
    hasher.finalize()
}
