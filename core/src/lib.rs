//! # sweepr core
//!
//! The concurrent scan engine.
//!
//! * **[`scanner`]**: the [`scanner::Probe`] abstraction and the bounded sweep coordinator.
//! * **[`timing`]**: adaptive per-probe timeout from calibration samples.
//! * **[`network`]**: concrete probes (ICMP echo, TCP connect, TCP handshake liveness).
//! * **[`discovery`]**: the service tying calibration and both sweeps together.

pub mod discovery;
pub mod network;
pub mod scanner;
pub mod timing;
