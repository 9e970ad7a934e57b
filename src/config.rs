// FPGA User Logic Accelerator Driver
// Copyright 2025 Henk-Jan Lebbink
// SPDX-License-Identifier: MIT

//! Accelerator configuration: identity, register layout, poll policy.
//!
//! All fixed constants of a deployed design (expected design ID, bitstream
//! configuration address, register offsets) live in [`AcceleratorConfig`]
//! so that several accelerator instances can be driven from one binary
//! without recompilation.

use bitflags::bitflags;
use std::time::Duration;

/// Size of the input frame in bytes.
///
/// The skeleton exposes exactly one 6-byte input block; the more-inputs
/// flag is the single byte immediately after it.
pub const INPUT_FRAME_LEN: usize = 6;

/// Settle wait after issuing the bitstream configuration command.
///
/// Configuration is fire-and-forget; the hardware gives no completion
/// signal, so deploy waits this long before verifying the design ID.
pub const SETTLE_DELAY: Duration = Duration::from_millis(200);

bitflags! {
    /// Command byte written to the compute-enable register.
    ///
    /// The hardware only interprets bit 0: `ENABLE` starts a computation,
    /// an empty set stops it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ComputeControl: u8 {
        /// Run the model on the currently written inputs.
        const ENABLE = 1 << 0;
    }
}

/// Register address layout of the user-logic skeleton.
///
/// Offsets are fixed per design. The defaults match the elastic node
/// skeleton: input block at 0, result register at 1 (read side),
/// compute-enable command register at 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    /// Base address of the 6-byte input block (write side).
    pub input_base: u32,
    /// Address of the 1-byte signed result register (read side).
    pub result: u32,
    /// Address of the 1-byte compute-enable command register.
    pub compute_enable: u32,
}

impl RegisterMap {
    /// Address of the 1-byte more-inputs flag, immediately after the
    /// input block.
    #[inline]
    pub const fn more_inputs(&self) -> u32 {
        self.input_base + INPUT_FRAME_LEN as u32
    }
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self {
            input_base: 0,
            result: 1,
            compute_enable: 100,
        }
    }
}

/// Busy-poll policy for the predict protocol.
///
/// The skeleton reports completion only through its busy flag, so predict
/// polls until not-busy. The poll is bounded: once `max_polls` status
/// queries have all come back busy, predict gives up with
/// [`UserLogicError::HardwareTimeout`](crate::UserLogicError::HardwareTimeout)
/// instead of spinning forever on hung hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of busy-status queries before giving up.
    pub max_polls: u32,
    /// Delay between polls, routed through the transport.
    ///
    /// `None` spins with `core::hint::spin_loop()` between polls, which
    /// preserves the timing of a bare busy-wait loop.
    pub poll_interval: Option<Duration>,
}

/// Default poll budget while waiting for a computation.
const DEFAULT_MAX_POLLS: u32 = 1_000_000;

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_polls: DEFAULT_MAX_POLLS,
            poll_interval: None,
        }
    }
}

/// Immutable configuration of one deployed accelerator design.
///
/// # Example
///
/// ```rust
/// use userlogic_rs::AcceleratorConfig;
///
/// let config = AcceleratorConfig::new(47, 4000);
/// assert_eq!(config.design_id, 47);
/// assert_eq!(config.registers.more_inputs(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceleratorConfig {
    /// Design ID the hardware must report for deploy to succeed.
    pub design_id: u8,
    /// Flash/configuration address of the bitstream to load.
    pub bitstream_addr: u32,
    /// Register layout of the skeleton.
    pub registers: RegisterMap,
    /// Busy-poll policy for predict.
    pub poll: PollPolicy,
}

impl AcceleratorConfig {
    /// Create a configuration with the default register layout and poll
    /// policy.
    pub fn new(design_id: u8, bitstream_addr: u32) -> Self {
        Self {
            design_id,
            bitstream_addr,
            registers: RegisterMap::default(),
            poll: PollPolicy::default(),
        }
    }

    /// Replace the register layout.
    #[must_use]
    pub fn with_registers(mut self, registers: RegisterMap) -> Self {
        self.registers = registers;
        self
    }

    /// Replace the busy-poll policy.
    #[must_use]
    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_map_defaults() {
        let regs = RegisterMap::default();
        assert_eq!(regs.input_base, 0);
        assert_eq!(regs.result, 1);
        assert_eq!(regs.compute_enable, 100);
        assert_eq!(regs.more_inputs(), 6);
    }

    #[test]
    fn test_more_inputs_follows_input_block() {
        let regs = RegisterMap {
            input_base: 16,
            ..RegisterMap::default()
        };
        assert_eq!(regs.more_inputs(), 16 + INPUT_FRAME_LEN as u32);
    }

    #[test]
    fn test_compute_control_command_bytes() {
        assert_eq!(ComputeControl::ENABLE.bits(), 1);
        assert_eq!(ComputeControl::empty().bits(), 0);
    }

    #[test]
    fn test_config_builders() {
        let config = AcceleratorConfig::new(47, 4000)
            .with_poll(PollPolicy {
                max_polls: 64,
                poll_interval: Some(Duration::from_micros(50)),
            })
            .with_registers(RegisterMap {
                input_base: 8,
                result: 9,
                compute_enable: 200,
            });

        assert_eq!(config.bitstream_addr, 4000);
        assert_eq!(config.poll.max_polls, 64);
        assert_eq!(config.registers.more_inputs(), 14);
    }
}
