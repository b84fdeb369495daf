//! Bus frame definition
//!
//! Frame format (14 bytes):
//!
//! ```text
//! ┌──────┬─────┬─────┬─────┬──────────┬──────────┬──────┐
//! │ 0x32 │ SRC │ DST │ CMD │ DATA (8) │ XOR (1)  │ 0x34 │
//! └──────┴─────┴─────┴─────┴──────────┴──────────┴──────┘
//! ```
//!
//! The checksum is the XOR of SRC through the last DATA byte.
//!
//! The bridge forwards frames unparsed. The header and checksum accessors
//! below only feed diagnostics and statistics; nothing gates on them.

use crate::error::{Error, Result};
use std::fmt;

/// Total frame length in bytes
pub const FRAME_SIZE: usize = 14;

/// First byte of every frame
pub const START_MARKER: u8 = 0x32;

/// Last byte of every frame
pub const END_MARKER: u8 = 0x34;

/// Payload length between the header and the checksum
pub const DATA_SIZE: usize = 8;

// Byte offsets within a frame
const OFFSET_SRC: usize = 1;
const OFFSET_DST: usize = 2;
const OFFSET_CMD: usize = 3;
const OFFSET_DATA: usize = 4;
const OFFSET_CHECKSUM: usize = FRAME_SIZE - 2;

/// XOR checksum used by the bus protocol
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// Addressing header of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameId {
    /// Source address
    pub src: u8,
    /// Destination address
    pub dst: u8,
    /// Command
    pub cmd: u8,
}

/// One aligned frame, exactly [`FRAME_SIZE`] bytes
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; FRAME_SIZE],
}

impl Frame {
    /// Wrap raw frame bytes without any validation
    #[inline]
    pub const fn new(bytes: [u8; FRAME_SIZE]) -> Self {
        Self { bytes }
    }

    /// Build a well-formed frame with markers and checksum filled in
    pub fn encode(id: FrameId, data: [u8; DATA_SIZE]) -> Self {
        let mut bytes = [0u8; FRAME_SIZE];
        bytes[0] = START_MARKER;
        bytes[OFFSET_SRC] = id.src;
        bytes[OFFSET_DST] = id.dst;
        bytes[OFFSET_CMD] = id.cmd;
        bytes[OFFSET_DATA..OFFSET_CHECKSUM].copy_from_slice(&data);
        bytes[OFFSET_CHECKSUM] = checksum(&bytes[OFFSET_SRC..OFFSET_CHECKSUM]);
        bytes[FRAME_SIZE - 1] = END_MARKER;
        Self { bytes }
    }

    /// Raw frame bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8; FRAME_SIZE] {
        &self.bytes
    }

    /// Consume the frame, returning its bytes
    #[inline]
    pub fn into_bytes(self) -> [u8; FRAME_SIZE] {
        self.bytes
    }

    /// True when both the start and end marker are in place
    #[inline]
    pub fn has_valid_markers(&self) -> bool {
        self.bytes[0] == START_MARKER && self.bytes[FRAME_SIZE - 1] == END_MARKER
    }

    /// SRC, DST and CMD header bytes
    pub fn id(&self) -> FrameId {
        FrameId {
            src: self.bytes[OFFSET_SRC],
            dst: self.bytes[OFFSET_DST],
            cmd: self.bytes[OFFSET_CMD],
        }
    }

    /// The 8 payload bytes
    pub fn data(&self) -> &[u8] {
        &self.bytes[OFFSET_DATA..OFFSET_CHECKSUM]
    }

    /// Checksum byte as received
    #[inline]
    pub fn checksum(&self) -> u8 {
        self.bytes[OFFSET_CHECKSUM]
    }

    /// Checksum recomputed over SRC..DATA
    pub fn computed_checksum(&self) -> u8 {
        checksum(&self.bytes[OFFSET_SRC..OFFSET_CHECKSUM])
    }

    #[inline]
    pub fn checksum_ok(&self) -> bool {
        self.checksum() == self.computed_checksum()
    }
}

impl TryFrom<&[u8]> for Frame {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; FRAME_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::InvalidFrame(bytes.len()))?;
        Ok(Self { bytes })
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame[{}]", self)
    }
}
