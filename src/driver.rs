// FPGA User Logic Accelerator Driver
// Copyright 2025 Henk-Jan Lebbink
// SPDX-License-Identifier: MIT

//! High-level driver API: the deploy and predict protocols.
//!
//! [`UserLogicDriver`] wraps a [`Transport`] and an [`AcceleratorConfig`]
//! and runs the two control-plane protocols of the user-logic skeleton:
//!
//! - **deploy** — configure the bitstream, wait for the hardware to
//!   settle, read back the design ID and compare it against the expected
//!   identity.
//! - **predict** — write one input frame, trigger a computation, poll the
//!   busy flag, read back the result.
//!
//! Every protocol call opens its own transport session and returns the
//! device to idle (compute disarmed, logic disabled, transport
//! deinitialized) on every exit path, including failures. Calls take
//! `&mut self`: one outstanding request at a time, callers serialize.

use crate::config::{AcceleratorConfig, ComputeControl, PollPolicy, INPUT_FRAME_LEN, SETTLE_DELAY};
use crate::error::{TransportError, UserLogicError, UserLogicResult};
use crate::session::{LogicGuard, Session};
use crate::transport::Transport;
use scopeguard::ScopeGuard;

/// Outcome of a deploy, distinguishing identity mismatch from success.
///
/// Transport failures are reported separately through
/// [`UserLogicError::Transport`]; this type only describes what a
/// reachable device answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStatus {
    /// The device reported the expected design ID.
    Deployed,
    /// The device is reachable but runs a different design.
    IdentityMismatch { expected: u8, actual: u8 },
}

impl DeployStatus {
    /// `true` iff the expected design was verified.
    #[inline]
    pub const fn is_deployed(self) -> bool {
        matches!(self, Self::Deployed)
    }
}

impl From<DeployStatus> for bool {
    fn from(status: DeployStatus) -> bool {
        status.is_deployed()
    }
}

/// Driver for one FPGA-hosted user-logic accelerator.
///
/// # Example
///
/// ```rust
/// use userlogic_rs::{AcceleratorConfig, SimTransport, UserLogicDriver};
///
/// let mut sim = SimTransport::new(47);
/// sim.preload(1, &[42]);
///
/// let mut driver = UserLogicDriver::new(sim, AcceleratorConfig::new(47, 4000));
/// assert!(driver.deploy().unwrap().is_deployed());
///
/// let result = driver.predict(&[1, -2, 3, -4, 5, -6], false).unwrap();
/// assert_eq!(result, 42);
/// ```
pub struct UserLogicDriver<T: Transport> {
    transport: T,
    config: AcceleratorConfig,
}

impl<T: Transport> UserLogicDriver<T> {
    /// Create a driver over a transport for the given accelerator design.
    pub fn new(transport: T, config: AcceleratorConfig) -> Self {
        Self { transport, config }
    }

    /// The accelerator configuration.
    pub fn config(&self) -> &AcceleratorConfig {
        &self.config
    }

    /// Get a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the driver, returning the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Confirm the accelerator is present, configured, and running the
    /// expected design.
    ///
    /// Initializes the transport, issues the bitstream configuration
    /// command, waits the fixed settle delay (configuration is
    /// fire-and-forget, there is no completion signal to wait on), reads
    /// back the design ID inside a logic enable/disable bracket, and
    /// deinitializes. Teardown runs on every path.
    ///
    /// # Errors
    ///
    /// Returns [`UserLogicError::Transport`] if the register-transport
    /// layer fails. A reachable device with the wrong design is not an
    /// error; it is reported as [`DeployStatus::IdentityMismatch`].
    pub fn deploy(&mut self) -> UserLogicResult<DeployStatus> {
        let expected = self.config.design_id;
        let bitstream_addr = self.config.bitstream_addr;

        log::debug!("deploy: configuring bitstream at {bitstream_addr:#06x}");

        let mut session = Session::open(&mut self.transport)?;
        session.transport().configure(bitstream_addr)?;
        session.transport().delay(SETTLE_DELAY);

        let actual = design_id_in_session(&mut session)?;
        session.close()?;

        if actual == expected {
            log::debug!("deploy: design {expected} verified");
            Ok(DeployStatus::Deployed)
        } else {
            log::debug!("deploy: expected design {expected}, device reports {actual}");
            Ok(DeployStatus::IdentityMismatch { expected, actual })
        }
    }

    /// Collapsed boolean view of [`deploy`](Self::deploy).
    ///
    /// `true` iff the expected design was verified; identity mismatch and
    /// transport failure both collapse to `false`.
    pub fn deploy_ok(&mut self) -> bool {
        match self.deploy() {
            Ok(status) => status.is_deployed(),
            Err(err) => {
                log::warn!("deploy failed: {err}");
                false
            }
        }
    }

    /// Read the design ID of the currently loaded logic.
    ///
    /// Opens a session and brackets the read with logic enable/disable.
    /// No error conditions of its own; transport failures propagate.
    pub fn read_design_id(&mut self) -> UserLogicResult<u8> {
        let mut session = Session::open(&mut self.transport)?;
        let id = design_id_in_session(&mut session)?;
        session.close()?;
        Ok(id)
    }

    /// Execute one synchronous inference call.
    ///
    /// Writes the 6-byte input frame to the input block, the more-inputs
    /// flag to the byte after it, arms the compute-enable register, polls
    /// the busy flag until the computation finishes, and reads back the
    /// result register. `more_inputs` tells the accelerator whether
    /// further input chunks follow in a streaming sequence.
    ///
    /// The result register is read twice and the second read wins; the
    /// skeleton latches the result on read-back, so the first sample is
    /// discarded.
    ///
    /// # Errors
    ///
    /// - [`UserLogicError::Transport`] if the register-transport layer
    ///   fails.
    /// - [`UserLogicError::HardwareTimeout`] if the busy flag never
    ///   clears within [`PollPolicy::max_polls`] queries.
    ///
    /// On every error path the compute register is disarmed, the logic
    /// interface disabled, and the transport deinitialized, best effort.
    pub fn predict(
        &mut self,
        inputs: &[i8; INPUT_FRAME_LEN],
        more_inputs: bool,
    ) -> UserLogicResult<i8> {
        let regs = self.config.registers;
        let poll = self.config.poll;

        log::debug!("predict: inputs {inputs:?}, more_inputs {more_inputs}");

        let mut session = Session::open(&mut self.transport)?;
        let mut logic = LogicGuard::enable(&mut session)?;

        let mut frame = [0u8; INPUT_FRAME_LEN];
        for (byte, value) in frame.iter_mut().zip(inputs) {
            *byte = *value as u8;
        }
        logic.transport().write_blocking(regs.input_base, &frame)?;
        logic
            .transport()
            .write_blocking(regs.more_inputs(), &[more_inputs as u8])?;

        logic
            .transport()
            .write_blocking(regs.compute_enable, &[ComputeControl::ENABLE.bits()])?;

        // Disarm compute if polling or read-back fails; defused on the
        // orderly path below.
        let mut armed = scopeguard::guard(logic, |mut logic| {
            if let Err(err) = logic
                .transport()
                .write_blocking(regs.compute_enable, &[ComputeControl::empty().bits()])
            {
                log::warn!("compute disarm failed during teardown: {err}");
            }
        });

        poll_until_idle(armed.transport(), &poll)?;

        let mut result = [0u8; 1];
        armed.transport().read_blocking(regs.result, &mut result)?;
        armed.transport().read_blocking(regs.result, &mut result)?;

        let mut logic = ScopeGuard::into_inner(armed);
        logic
            .transport()
            .write_blocking(regs.compute_enable, &[ComputeControl::empty().bits()])?;
        logic.disable()?;
        session.close()?;

        log::debug!("predict: result {}", result[0] as i8);
        Ok(result[0] as i8)
    }

    /// Run a streaming sequence of input frames through the accelerator.
    ///
    /// Every frame but the last is submitted with `more_inputs = true`,
    /// the last with `false`; the result of the final call is returned.
    ///
    /// # Errors
    ///
    /// [`UserLogicError::InvalidArgument`] if `frames` is empty; otherwise
    /// the same errors as [`predict`](Self::predict).
    pub fn predict_stream(&mut self, frames: &[[i8; INPUT_FRAME_LEN]]) -> UserLogicResult<i8> {
        let (last, rest) = frames.split_last().ok_or_else(|| {
            UserLogicError::InvalidArgument("input stream needs at least one frame".into())
        })?;

        for frame in rest {
            self.predict(frame, true)?;
        }
        self.predict(last, false)
    }
}

/// Read the design ID inside a logic enable/disable bracket.
fn design_id_in_session<T: Transport>(
    session: &mut Session<'_, T>,
) -> Result<u8, TransportError> {
    let mut logic = LogicGuard::enable(session)?;
    let id = logic.transport().logic_design_id()?;
    logic.disable()?;
    Ok(id)
}

/// Poll the busy flag until the accelerator reports idle.
fn poll_until_idle<T: Transport>(transport: &mut T, policy: &PollPolicy) -> UserLogicResult<()> {
    for _ in 0..policy.max_polls {
        if !transport.logic_busy()? {
            return Ok(());
        }
        match policy.poll_interval {
            Some(interval) => transport.delay(interval),
            None => core::hint::spin_loop(),
        }
    }

    Err(UserLogicError::HardwareTimeout {
        polls: policy.max_polls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_status_bool_view() {
        assert!(DeployStatus::Deployed.is_deployed());
        assert!(bool::from(DeployStatus::Deployed));

        let mismatch = DeployStatus::IdentityMismatch {
            expected: 47,
            actual: 3,
        };
        assert!(!mismatch.is_deployed());
        assert!(!bool::from(mismatch));
    }

    #[test]
    fn test_deploy_reports_mismatch() {
        let sim = crate::SimTransport::new(3);
        let mut driver = UserLogicDriver::new(sim, AcceleratorConfig::new(47, 4000));

        let status = driver.deploy().unwrap();
        assert_eq!(
            status,
            DeployStatus::IdentityMismatch {
                expected: 47,
                actual: 3,
            }
        );
        assert!(!driver.deploy_ok());
    }

    #[test]
    fn test_into_transport_returns_journal() {
        let sim = crate::SimTransport::new(47);
        let mut driver = UserLogicDriver::new(sim, AcceleratorConfig::new(47, 4000));
        driver.deploy().unwrap();

        let sim = driver.into_transport();
        assert!(!sim.ops().is_empty());
    }
}
