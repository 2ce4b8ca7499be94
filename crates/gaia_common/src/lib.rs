//! Shared foundational types for the gaia generation cache.
//!
//! This crate provides content hashing for change detection and unique,
//! filesystem-safe tokens used to name unpack directories and materialized
//! asset files.

#![warn(missing_docs)]

pub mod hash;
pub mod token;

pub use hash::ContentHash;
pub use token::{Token, TokenError};
