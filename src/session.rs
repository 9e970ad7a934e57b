// FPGA User Logic Accelerator Driver
// Copyright 2025 Henk-Jan Lebbink
// SPDX-License-Identifier: MIT

//! Scoped transport session and logic-enable guards.
//!
//! Deploy and predict must return the device to its idle state (logic
//! disabled, transport deinitialized) on every exit path. The guards here
//! make that structural: an orderly exit calls [`Session::close`] /
//! [`LogicGuard::disable`] so teardown failures surface as errors, while an
//! early `?` return falls back to best-effort teardown in `Drop`.

use crate::error::TransportError;
use crate::transport::Transport;

/// An initialized transport session.
///
/// Created with [`Session::open`], which runs `init()` on the transport.
/// Exactly one `deinit()` runs when the session ends, either through
/// [`close`](Session::close) or through `Drop`.
pub struct Session<'t, T: Transport> {
    transport: &'t mut T,
    open: bool,
}

impl<'t, T: Transport> Session<'t, T> {
    /// Initialize the transport and open a session.
    pub fn open(transport: &'t mut T) -> Result<Self, TransportError> {
        transport.init()?;
        Ok(Self {
            transport,
            open: true,
        })
    }

    /// Access the underlying transport.
    pub fn transport(&mut self) -> &mut T {
        self.transport
    }

    /// Deinitialize the transport, consuming the session.
    ///
    /// Use this on the orderly path so a failing `deinit` is reported
    /// instead of swallowed by `Drop`.
    pub fn close(mut self) -> Result<(), TransportError> {
        self.open = false;
        self.transport.deinit()
    }
}

impl<T: Transport> Drop for Session<'_, T> {
    fn drop(&mut self) {
        if self.open {
            if let Err(err) = self.transport.deinit() {
                log::warn!("transport deinit failed during teardown: {err}");
            }
        }
    }
}

/// An enabled user-logic interface within a session.
///
/// Brackets the period during which the skeleton registers are
/// addressable. Exactly one `logic_disable()` runs when the guard ends,
/// either through [`disable`](LogicGuard::disable) or through `Drop`.
pub struct LogicGuard<'s, 't, T: Transport> {
    session: &'s mut Session<'t, T>,
    enabled: bool,
}

impl<'s, 't, T: Transport> LogicGuard<'s, 't, T> {
    /// Enable the user-logic interface.
    pub fn enable(session: &'s mut Session<'t, T>) -> Result<Self, TransportError> {
        session.transport().logic_enable()?;
        Ok(Self {
            session,
            enabled: true,
        })
    }

    /// Access the underlying transport.
    pub fn transport(&mut self) -> &mut T {
        self.session.transport()
    }

    /// Disable the user-logic interface, consuming the guard.
    pub fn disable(mut self) -> Result<(), TransportError> {
        self.enabled = false;
        self.session.transport().logic_disable()
    }
}

impl<T: Transport> Drop for LogicGuard<'_, '_, T> {
    fn drop(&mut self) {
        if self.enabled {
            if let Err(err) = self.session.transport().logic_disable() {
                log::warn!("logic disable failed during teardown: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimOp, SimTransport};

    #[test]
    fn test_session_close_deinits_once() {
        let mut sim = SimTransport::new(47);
        let session = Session::open(&mut sim).unwrap();
        session.close().unwrap();

        assert_eq!(sim.ops(), &[SimOp::Init, SimOp::Deinit]);
    }

    #[test]
    fn test_session_drop_deinits() {
        let mut sim = SimTransport::new(47);
        {
            let _session = Session::open(&mut sim).unwrap();
            // dropped without close, as on an error path
        }
        assert_eq!(sim.ops(), &[SimOp::Init, SimOp::Deinit]);
    }

    #[test]
    fn test_logic_guard_brackets_enable_disable() {
        let mut sim = SimTransport::new(47);
        {
            let mut session = Session::open(&mut sim).unwrap();
            let guard = LogicGuard::enable(&mut session).unwrap();
            guard.disable().unwrap();
            session.close().unwrap();
        }
        assert_eq!(
            sim.ops(),
            &[
                SimOp::Init,
                SimOp::LogicEnable,
                SimOp::LogicDisable,
                SimOp::Deinit,
            ]
        );
    }

    #[test]
    fn test_logic_guard_drop_disables_before_session_deinit() {
        let mut sim = SimTransport::new(47);
        {
            let mut session = Session::open(&mut sim).unwrap();
            let _guard = LogicGuard::enable(&mut session).unwrap();
            // both dropped; guard must unwind before the session
        }
        assert_eq!(
            sim.ops(),
            &[
                SimOp::Init,
                SimOp::LogicEnable,
                SimOp::LogicDisable,
                SimOp::Deinit,
            ]
        );
    }
}
