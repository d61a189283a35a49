//! Utility library for the minicar software

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod logger;
pub mod maths;
pub mod params;
pub mod session;
