//! 55AA message framing.
//!
//! ```text
//! prefix:u32 seq:u32 command:u32 length:u32 payload[..] check suffix:u32
//! ```
//!
//! `length` covers payload, check and suffix. The check is a CRC32 for
//! protocol 3.3 and below and an HMAC-SHA256 from 3.4 on. All integers are
//! big-endian.

use super::cipher::{hmac_sha256, verify_hmac_sha256};
use crate::error::BulbError;

pub const PREFIX: u32 = 0x0000_55AA;
pub const SUFFIX: u32 = 0x0000_AA55;
pub const HEADER_LEN: usize = 16;
/// Upper bound on `length`; real devices stay far below this.
pub const MAX_BODY_LEN: usize = 64 * 1024;

pub mod command {
    pub const SESS_KEY_NEG_START: u32 = 0x03;
    pub const SESS_KEY_NEG_RESP: u32 = 0x04;
    pub const SESS_KEY_NEG_FINISH: u32 = 0x05;
    pub const CONTROL: u32 = 0x07;
    pub const STATUS: u32 = 0x08;
    pub const DP_QUERY: u32 = 0x0a;
    pub const CONTROL_NEW: u32 = 0x0d;
    pub const DP_QUERY_NEW: u32 = 0x10;
}

/// How the frame trailer protects header and payload.
#[derive(Debug, Clone, Copy)]
pub enum Integrity<'a> {
    Crc,
    Hmac(&'a [u8]),
}

impl Integrity<'_> {
    fn check_len(&self) -> usize {
        match self {
            Integrity::Crc => 4,
            Integrity::Hmac(_) => 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub seq: u32,
    pub command: u32,
    pub payload: Vec<u8>,
}

fn be_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

impl Frame {
    pub fn new(seq: u32, command: u32, payload: Vec<u8>) -> Self {
        Self {
            seq,
            command,
            payload,
        }
    }

    pub fn encode(&self, integrity: Integrity<'_>) -> Result<Vec<u8>, BulbError> {
        let length = self.payload.len() + integrity.check_len() + 4;
        let length = u32::try_from(length)
            .map_err(|_| BulbError::Frame(format!("payload too large: {length} bytes")))?;

        let mut out = Vec::with_capacity(HEADER_LEN + length as usize);
        out.extend_from_slice(&PREFIX.to_be_bytes());
        out.extend_from_slice(&self.seq.to_be_bytes());
        out.extend_from_slice(&self.command.to_be_bytes());
        out.extend_from_slice(&length.to_be_bytes());
        out.extend_from_slice(&self.payload);
        match integrity {
            Integrity::Crc => {
                let crc = crc32fast::hash(&out);
                out.extend_from_slice(&crc.to_be_bytes());
            }
            Integrity::Hmac(key) => {
                let tag = hmac_sha256(key, &out)?;
                out.extend_from_slice(&tag);
            }
        }
        out.extend_from_slice(&SUFFIX.to_be_bytes());
        Ok(out)
    }

    /// Validate a header and return how many bytes follow it.
    pub fn body_len(header: &[u8; HEADER_LEN]) -> Result<usize, BulbError> {
        let prefix = be_u32(header, 0);
        if prefix != PREFIX {
            return Err(BulbError::Frame(format!("bad prefix {prefix:#010x}")));
        }
        let length = be_u32(header, 12) as usize;
        if length > MAX_BODY_LEN {
            return Err(BulbError::Frame(format!("declared length {length} too large")));
        }
        Ok(length)
    }

    /// Decode exactly one frame.
    pub fn decode(bytes: &[u8], integrity: Integrity<'_>) -> Result<Self, BulbError> {
        let header: &[u8; HEADER_LEN] = bytes
            .get(..HEADER_LEN)
            .and_then(|h| h.try_into().ok())
            .ok_or_else(|| BulbError::Frame(format!("short frame: {} bytes", bytes.len())))?;
        let length = Self::body_len(header)?;
        let trailer = integrity.check_len() + 4;
        if length < trailer || bytes.len() != HEADER_LEN + length {
            return Err(BulbError::Frame(format!(
                "length field {length} does not match {} received bytes",
                bytes.len()
            )));
        }

        let check_at = bytes.len() - trailer;
        let suffix = be_u32(bytes, bytes.len() - 4);
        if suffix != SUFFIX {
            return Err(BulbError::Frame(format!("bad suffix {suffix:#010x}")));
        }

        let covered = &bytes[..check_at];
        let check = &bytes[check_at..bytes.len() - 4];
        match integrity {
            Integrity::Crc => {
                let expected = crc32fast::hash(covered);
                let found = be_u32(check, 0);
                if expected != found {
                    return Err(BulbError::Frame(format!(
                        "CRC mismatch: expected {expected:#010x}, found {found:#010x}"
                    )));
                }
            }
            Integrity::Hmac(key) => verify_hmac_sha256(key, covered, check)?,
        }

        Ok(Self {
            seq: be_u32(bytes, 4),
            command: be_u32(bytes, 8),
            payload: bytes[HEADER_LEN..check_at].to_vec(),
        })
    }

    /// Payload with the device return code removed, when one is present.
    ///
    /// Replies usually start with a 4-byte status; a value of 256 or more is
    /// taken to be ciphertext instead.
    pub fn body(&self) -> &[u8] {
        match self.payload.get(..4) {
            Some([0, 0, 0, _]) => &self.payload[4..],
            _ => &self.payload,
        }
    }
}
