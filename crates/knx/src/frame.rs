// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Length-prefixed frame codec for the routing daemon's TCP protocol.
//!
//! Wire layout, big-endian: `[u16 size][u16 type][body]` where
//! `size == 2 + body.len()`.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Open a group-socket endpoint on the daemon.
pub const OPEN_GROUP_SOCKET: u16 = 0x0022;
/// A group telegram (request or indication).
pub const GROUP_PACKET: u16 = 0x0025;

/// Smallest legal frame size (type only, empty body).
pub const MIN_FRAME_SIZE: u16 = 2;
/// Largest frame size accepted from the wire; bigger values are treated as
/// stream corruption rather than buffered.
pub const MAX_FRAME_SIZE: u16 = 256;

/// Frame codec failures
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame size {0} outside {MIN_FRAME_SIZE}..={MAX_FRAME_SIZE}")]
    SizeOutOfBounds(u16),
    #[error("frame body {0} exceeds u16 size field")]
    BodyTooLarge(usize),
}

/// One protocol frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub frame_type: u16,
    pub body: Vec<u8>,
}

impl Frame {
    pub fn new(frame_type: u16, body: Vec<u8>) -> Self {
        Self { frame_type, body }
    }

    /// Serialize to the wire layout.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        let size = self
            .body
            .len()
            .checked_add(2)
            .filter(|s| *s <= u16::MAX as usize)
            .ok_or(FrameError::BodyTooLarge(self.body.len()))?;
        let mut out = Vec::with_capacity(size + 2);
        out.extend_from_slice(&(size as u16).to_be_bytes());
        out.extend_from_slice(&self.frame_type.to_be_bytes());
        out.extend_from_slice(&self.body);
        Ok(out)
    }
}

/// Write one frame.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    frame: &Frame,
) -> Result<(), FrameError> {
    let bytes = frame.encode()?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame, enforcing the size bounds before buffering the body.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Frame, FrameError> {
    let mut header = [0u8; 4];
    reader.read_exact(&mut header).await?;
    let size = u16::from_be_bytes([header[0], header[1]]);
    let frame_type = u16::from_be_bytes([header[2], header[3]]);
    if !(MIN_FRAME_SIZE..=MAX_FRAME_SIZE).contains(&size) {
        return Err(FrameError::SizeOutOfBounds(size));
    }
    let mut body = vec![0u8; (size - 2) as usize];
    reader.read_exact(&mut body).await?;
    Ok(Frame { frame_type, body })
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
