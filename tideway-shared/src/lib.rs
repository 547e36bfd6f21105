//! Shared types for the tideway workflow service.
//!
//! This crate holds the wire-level data model exchanged between deciders and
//! the history service: history events, decisions, their attribute records,
//! and the classified service errors.

pub mod error;
pub mod shared;

pub use error::*;
pub use shared::*;
