//! # sweepr common
//!
//! Data model shared by the scan engine and its front ends: address and port
//! ranges, scan configuration, probe outcomes and the error type used to
//! reject bad input before a sweep starts.

pub mod config;
pub mod error;
pub mod macros;
pub mod network;
pub mod scanning;

#[doc(hidden)]
pub use tracing;
