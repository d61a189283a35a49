//! # Network Module
//!
//! This module provides the command socket abstraction over UDP, the
//! transport chosen for the remote control link. The socket performs
//! bounded-timeout receives so the control loop can never block
//! indefinitely waiting for a command.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use std::io;
use std::net::{ToSocketAddrs, UdpSocket};
use std::time::Duration;

use crate::cmd::{CmdDecodeError, DriveCmd};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Size of the receive buffer.
///
/// Larger than the wire size so that oversized datagrams are seen as such
/// (and rejected by the decoder) rather than silently truncated to a valid
/// length.
const RECV_BUFFER_SIZE: usize = 64;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A UDP socket which receives [`DriveCmd`] datagrams.
///
/// The socket is bound once at construction and performs single bounded
/// receives. There is no connection state: any sender reaching the bound
/// address is accepted.
pub struct CmdSocket {
    socket: UdpSocket,

    recv_buf: [u8; RECV_BUFFER_SIZE],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in the [`CmdSocket`]
#[derive(Debug, thiserror::Error)]
pub enum CmdSocketError {
    #[error("No command received within the receive timeout")]
    Timeout,

    #[error("Received a malformed command: {0}")]
    Decode(#[from] CmdDecodeError),

    #[error("Socket error: {0}")]
    Io(io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CmdSocket {
    /// Bind a new command socket to the given local address.
    ///
    /// `recv_timeout` bounds every subsequent [`recv_cmd`] call.
    ///
    /// [`recv_cmd`]: CmdSocket::recv_cmd
    pub fn bind<A: ToSocketAddrs>(
        addr: A,
        recv_timeout: Duration,
    ) -> Result<Self, CmdSocketError> {
        let socket = UdpSocket::bind(addr).map_err(CmdSocketError::Io)?;

        socket
            .set_read_timeout(Some(recv_timeout))
            .map_err(CmdSocketError::Io)?;

        Ok(Self {
            socket,
            recv_buf: [0u8; RECV_BUFFER_SIZE],
        })
    }

    /// Attempt to receive a single command.
    ///
    /// Returns [`CmdSocketError::Timeout`] if no datagram arrives within the
    /// receive timeout, and [`CmdSocketError::Decode`] if one arrives but
    /// does not parse. Both are expected during normal operation and must be
    /// treated as non-fatal by the caller.
    pub fn recv_cmd(&mut self) -> Result<DriveCmd, CmdSocketError> {
        match self.socket.recv_from(&mut self.recv_buf) {
            Ok((len, _)) => {
                let cmd = DriveCmd::from_datagram(&self.recv_buf[..len])?;
                trace!("Received command: {:?}", cmd);
                Ok(cmd)
            }
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::TimedOut =>
            {
                Err(CmdSocketError::Timeout)
            }
            Err(e) => Err(CmdSocketError::Io(e)),
        }
    }

    /// Get the local address the socket is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, CmdSocketError> {
        self.socket.local_addr().map_err(CmdSocketError::Io)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_recv_cmd() {
        let mut rx =
            CmdSocket::bind("127.0.0.1:0", Duration::from_millis(500)).unwrap();
        let rx_addr = rx.local_addr().unwrap();

        let tx = UdpSocket::bind("127.0.0.1:0").unwrap();

        // A valid command decodes
        let cmd = DriveCmd {
            forward: 0.5,
            lateral: -0.25,
        };
        tx.send_to(&cmd.to_datagram(), rx_addr).unwrap();

        assert_eq!(rx.recv_cmd().unwrap(), cmd);

        // A short payload is a decode error, not a crash or partial parse
        tx.send_to(&[0u8; 7], rx_addr).unwrap();

        assert!(matches!(
            rx.recv_cmd(),
            Err(CmdSocketError::Decode(CmdDecodeError::WrongLength(7)))
        ));
    }

    #[test]
    fn test_recv_timeout() {
        let mut rx =
            CmdSocket::bind("127.0.0.1:0", Duration::from_millis(20)).unwrap();

        assert!(matches!(rx.recv_cmd(), Err(CmdSocketError::Timeout)));
    }
}
