//! Error types for the tree engine.

use std::io;
use thiserror::Error;

/// Errors raised by layout generation, animation and the hand feed
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied value is outside its valid domain
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A particle group was advanced or read before `initialize()`
    #[error("Particle group '{group}' used before initialization ({len} particles)")]
    Uninitialized {
        /// Name of the group's category
        group: &'static str,
        /// Number of particles the group owns
        len: usize,
    },

    /// An instance slot that does not exist was addressed
    #[error("Instance slot {index} out of range (group has {len} slots)")]
    SlotOutOfRange {
        /// Requested slot
        index: usize,
        /// Number of slots
        len: usize,
    },

    /// The hand feed produced a payload that could not be understood
    #[error("Hand feed error: {0}")]
    HandFeed(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
