//! # Drive Command Module
//!
//! Defines the command sent from the remote controller to the car. The wire
//! format is a single UDP datagram carrying exactly 8 bytes: two
//! little-endian IEEE-754 32-bit floats in the order `(forward, lateral)`.
//! There is no header, sequence number, or acknowledgement - the link is
//! unidirectional and best-effort.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Size of a drive command datagram in bytes (two `f32`s).
pub const DRIVE_CMD_WIRE_SIZE: usize = 8;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A demand for the car's motion, as produced by the remote joystick.
///
/// Both values are nominally in the range [-1, +1] but are not validated at
/// decode time - the motor shaping policies clamp whatever arrives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveCmd {
    /// Forward (+) / backward (-) demand.
    pub forward: f64,

    /// Left (+) / right (-) steering demand.
    pub lateral: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur when decoding a drive command datagram.
#[derive(Debug, thiserror::Error)]
pub enum CmdDecodeError {
    #[error("Expected a payload of exactly 8 bytes, got {0}")]
    WrongLength(usize),

    #[error("Payload does not decode to two finite floats")]
    NonFinite,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveCmd {
    /// Decode a command from a received datagram payload.
    ///
    /// Payloads of any length other than [`DRIVE_CMD_WIRE_SIZE`] are rejected
    /// outright rather than partially parsed.
    pub fn from_datagram(data: &[u8]) -> Result<Self, CmdDecodeError> {
        if data.len() != DRIVE_CMD_WIRE_SIZE {
            return Err(CmdDecodeError::WrongLength(data.len()));
        }

        let forward = LittleEndian::read_f32(&data[0..4]) as f64;
        let lateral = LittleEndian::read_f32(&data[4..8]) as f64;

        if !forward.is_finite() || !lateral.is_finite() {
            return Err(CmdDecodeError::NonFinite);
        }

        Ok(DriveCmd { forward, lateral })
    }

    /// Encode this command into a datagram payload.
    pub fn to_datagram(&self) -> [u8; DRIVE_CMD_WIRE_SIZE] {
        let mut buf = [0u8; DRIVE_CMD_WIRE_SIZE];
        LittleEndian::write_f32(&mut buf[0..4], self.forward as f32);
        LittleEndian::write_f32(&mut buf[4..8], self.lateral as f32);
        buf
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_decode() {
        let cmd = DriveCmd {
            forward: 0.5,
            lateral: -0.25,
        };

        let decoded = DriveCmd::from_datagram(&cmd.to_datagram()).unwrap();

        assert_eq!(decoded, cmd);
    }

    #[test]
    fn test_decode_wrong_length() {
        assert!(matches!(
            DriveCmd::from_datagram(&[0u8; 7]),
            Err(CmdDecodeError::WrongLength(7))
        ));
        assert!(matches!(
            DriveCmd::from_datagram(&[0u8; 9]),
            Err(CmdDecodeError::WrongLength(9))
        ));
        assert!(matches!(
            DriveCmd::from_datagram(&[]),
            Err(CmdDecodeError::WrongLength(0))
        ));
    }

    #[test]
    fn test_decode_non_finite() {
        let mut buf = [0u8; DRIVE_CMD_WIRE_SIZE];
        LittleEndian::write_f32(&mut buf[0..4], f32::NAN);
        LittleEndian::write_f32(&mut buf[4..8], 0.5);

        assert!(matches!(
            DriveCmd::from_datagram(&buf),
            Err(CmdDecodeError::NonFinite)
        ));

        LittleEndian::write_f32(&mut buf[0..4], 0.5);
        LittleEndian::write_f32(&mut buf[4..8], f32::INFINITY);

        assert!(matches!(
            DriveCmd::from_datagram(&buf),
            Err(CmdDecodeError::NonFinite)
        ));
    }
}
