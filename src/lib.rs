// FPGA User Logic Accelerator Driver
// Copyright 2025 Henk-Jan Lebbink
// SPDX-License-Identifier: MIT

//! # FPGA User Logic Accelerator Driver
//!
//! This crate provides a minimal, blocking control-plane driver for
//! FPGA-hosted inference accelerators ("user logic" cores) with a
//! fixed register map, such as the elastic node skeleton.
//!
//! ## Supported Operations
//!
//! - Deploy: verify the expected accelerator design is loaded and
//!   addressable (configure, settle, design-ID read-back)
//! - Predict: one synchronous inference request (input frame write,
//!   compute trigger, busy poll, result read-back)
//! - Streaming predict over chunked input frames
//! - Standalone design-ID read-back
//!
//! ## Architecture
//!
//! | Layer | Role |
//! |-------|------|
//! | [`UserLogicDriver`] | Deploy/predict protocol sequencing |
//! | [`Transport`] | Register-transport boundary (bus-specific, supplied by the embedder) |
//! | [`SimTransport`] | In-memory simulated device for hosts without hardware |
//!
//! The driver owns no state between calls: each deploy or predict
//! acquires a transport session, runs its sequence, and releases the
//! session, returning the device to idle on every exit path. Calls are
//! fully blocking and must be serialized by the caller; the accelerator
//! is a singleton resource.
//!
//! ## Example
//!
//! ```rust
//! use userlogic_rs::{AcceleratorConfig, SimTransport, UserLogicDriver};
//!
//! // A simulated device standing in for real hardware.
//! let mut sim = SimTransport::new(47);
//! sim.preload(1, &[42]);
//!
//! let config = AcceleratorConfig::new(47, 4000);
//! let mut driver = UserLogicDriver::new(sim, config);
//!
//! assert!(driver.deploy()?.is_deployed());
//! let speed = driver.predict(&[1, -2, 3, -4, 5, -6], false)?;
//! assert_eq!(speed, 42);
//! # Ok::<(), userlogic_rs::UserLogicError>(())
//! ```
//!
//! ## Hardware Requirements
//!
//! Any accelerator exposing the skeleton register layout:
//! a 6-byte input block with a 1-byte more-inputs flag after it, a 1-byte
//! signed result register, a 1-byte compute-enable command register, and
//! a readable design-ID register. Addresses are configurable through
//! [`RegisterMap`]; driving real hardware means implementing [`Transport`]
//! for the bus in question (SPI middleware, AXI bridge, ...).

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// Module declarations
pub mod config;
pub mod driver;
pub mod error;
pub mod session;
pub mod sim;
pub mod transport;

// Re-exports for convenient access
pub use config::{
    AcceleratorConfig, ComputeControl, PollPolicy, RegisterMap, INPUT_FRAME_LEN, SETTLE_DELAY,
};
pub use driver::{DeployStatus, UserLogicDriver};
pub use error::{TransportError, UserLogicError, UserLogicResult};
pub use session::{LogicGuard, Session};
pub use sim::{SimOp, SimTransport};
pub use transport::Transport;
