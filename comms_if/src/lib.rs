//! # Communications interface crate.
//!
//! Provides the command wire format and command socket shared between the
//! minicar executable and any remote command sender.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Drive command definitions
pub mod cmd;

/// Network module
pub mod net;
