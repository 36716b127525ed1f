// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Bus-dialogue health probe.
//!
//! Verifies that a device on the field bus answers a group read through the
//! routing daemon: open a group socket, send a group-value-read, and watch
//! the telegram stream for a group-value-response.

use crate::address::GroupAddress;
use crate::frame::{self, Frame, FrameError, GROUP_PACKET, OPEN_GROUP_SOCKET};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};

/// Default wall-clock budget for one probe exchange.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// USB interfaces drop telegrams sent immediately after the group socket
/// opens; give the stack time to settle.
const SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Telegrams examined before giving up on a response.
const MAX_RESPONSE_FRAMES: usize = 50;

/// APCI mask and value identifying a group-value-response.
const APCI_MASK: u8 = 0xC0;
const APCI_GROUP_RESPONSE: u8 = 0x40;

/// Bus probe failures
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connect to daemon port {port} failed: {source}")]
    Connect {
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("probe deadline exceeded")]
    Deadline,
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
    #[error("unexpected frame type {got:#06x}, expected {expected:#06x}")]
    Protocol { expected: u16, got: u16 },
    #[error("no group-value-response within {MAX_RESPONSE_FRAMES} telegrams")]
    NoResponse,
}

/// Probe a single group address through the daemon's TCP port.
///
/// The whole exchange shares one deadline derived from `timeout`.
pub async fn probe_group_address(
    port: u16,
    address: GroupAddress,
    timeout: Duration,
) -> Result<(), ProbeError> {
    let deadline = Instant::now() + timeout;

    let mut stream = timeout_at(deadline, TcpStream::connect(("127.0.0.1", port)))
        .await
        .map_err(|_| ProbeError::Deadline)?
        .map_err(|source| ProbeError::Connect { port, source })?;

    // Open a group socket; 0xFF selects write-enabled access
    let raw = address.to_u16();
    let open = Frame::new(OPEN_GROUP_SOCKET, vec![(raw >> 8) as u8, raw as u8, 0xFF]);
    timeout_at(deadline, frame::write_frame(&mut stream, &open))
        .await
        .map_err(|_| ProbeError::Deadline)??;

    let reply = timeout_at(deadline, frame::read_frame(&mut stream))
        .await
        .map_err(|_| ProbeError::Deadline)??;
    if reply.frame_type != OPEN_GROUP_SOCKET {
        return Err(ProbeError::Protocol {
            expected: OPEN_GROUP_SOCKET,
            got: reply.frame_type,
        });
    }

    tokio::time::sleep(SETTLE_DELAY).await;

    // APCI 0x0000 = group-value-read
    let read_request = Frame::new(GROUP_PACKET, vec![0x00, 0x00]);
    timeout_at(deadline, frame::write_frame(&mut stream, &read_request))
        .await
        .map_err(|_| ProbeError::Deadline)??;

    for _ in 0..MAX_RESPONSE_FRAMES {
        let telegram = timeout_at(deadline, frame::read_frame(&mut stream))
            .await
            .map_err(|_| ProbeError::Deadline)??;
        if telegram.frame_type != GROUP_PACKET || telegram.body.len() < 4 {
            continue;
        }
        // body[0..2] = source individual address, body[2..4] = APCI
        if telegram.body[3] & APCI_MASK == APCI_GROUP_RESPONSE {
            tracing::debug!(address = %address, "bus dialogue succeeded");
            return Ok(());
        }
    }
    Err(ProbeError::NoResponse)
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
