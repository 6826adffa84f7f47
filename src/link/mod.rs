// src/link/mod.rs

// Serial session with the mesh radio: AT command framing, status polling
// with fallback, and the non-blocking inbound drain.
pub mod session;

// Re-export the public LinkSession struct
pub use session::{LinkSession, MAX_DRAIN_PER_CALL};
