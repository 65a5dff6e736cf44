//! Application layer containing the attestation orchestration.
//!
//! This module defines the `AttestationExecutor`, the entry point for every
//! transition on a payment record. It runs each transition as an optimistic
//! store transaction and queues notifications for the counterpart once the
//! transition has committed.

pub mod dispute;
pub mod executor;
pub mod registration;
