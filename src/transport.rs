// FPGA User Logic Accelerator Driver
// Copyright 2025 Henk-Jan Lebbink
// SPDX-License-Identifier: MIT

//! Register-transport boundary.
//!
//! The driver never talks to hardware directly; every register access goes
//! through a [`Transport`] implementation. On the elastic node this is the
//! middleware over SPI, in tests it is [`SimTransport`](crate::SimTransport),
//! and embedders supply their own implementation for other buses.
//!
//! All calls are blocking: a method returns only once the underlying bus
//! transaction has completed. The driver holds `&mut` access for the whole
//! duration of a deploy or predict call, so a transport does not need
//! interior locking of its own.

use crate::error::TransportError;
use std::time::Duration;

/// Blocking register access to one accelerator device.
///
/// A session is bracketed by [`init`](Transport::init) and
/// [`deinit`](Transport::deinit); register reads and writes are only valid
/// in between. The user-logic interface additionally has to be enabled via
/// [`logic_enable`](Transport::logic_enable) before the skeleton registers
/// are addressable.
pub trait Transport {
    /// Acquire and prepare the channel to the device.
    ///
    /// Idempotent within a session: a second `init` before `deinit` is a
    /// no-op.
    fn init(&mut self) -> Result<(), TransportError>;

    /// Release the channel.
    fn deinit(&mut self) -> Result<(), TransportError>;

    /// Issue a device (re)configuration command for the bitstream at
    /// `bitstream_addr`.
    ///
    /// Fire-and-forget: no acknowledgment is read back. Callers wait a
    /// settle delay before relying on the new configuration.
    fn configure(&mut self, bitstream_addr: u32) -> Result<(), TransportError>;

    /// Enable the accelerator's active-logic interface.
    fn logic_enable(&mut self) -> Result<(), TransportError>;

    /// Disable the accelerator's active-logic interface.
    fn logic_disable(&mut self) -> Result<(), TransportError>;

    /// Single-shot query of whether the accelerator is computing.
    fn logic_busy(&mut self) -> Result<bool, TransportError>;

    /// Read the design-ID register.
    fn logic_design_id(&mut self) -> Result<u8, TransportError>;

    /// Blocking write of `data.len()` bytes starting at `addr`.
    fn write_blocking(&mut self, addr: u32, data: &[u8]) -> Result<(), TransportError>;

    /// Blocking read of `buf.len()` bytes starting at `addr` into `buf`.
    fn read_blocking(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), TransportError>;

    /// Block the calling thread for `duration`.
    ///
    /// Part of the transport so that timing is observable in simulation; a
    /// hardware transport typically forwards to `std::thread::sleep`.
    fn delay(&mut self, duration: Duration);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn init(&mut self) -> Result<(), TransportError> {
        (**self).init()
    }

    fn deinit(&mut self) -> Result<(), TransportError> {
        (**self).deinit()
    }

    fn configure(&mut self, bitstream_addr: u32) -> Result<(), TransportError> {
        (**self).configure(bitstream_addr)
    }

    fn logic_enable(&mut self) -> Result<(), TransportError> {
        (**self).logic_enable()
    }

    fn logic_disable(&mut self) -> Result<(), TransportError> {
        (**self).logic_disable()
    }

    fn logic_busy(&mut self) -> Result<bool, TransportError> {
        (**self).logic_busy()
    }

    fn logic_design_id(&mut self) -> Result<u8, TransportError> {
        (**self).logic_design_id()
    }

    fn write_blocking(&mut self, addr: u32, data: &[u8]) -> Result<(), TransportError> {
        (**self).write_blocking(addr, data)
    }

    fn read_blocking(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), TransportError> {
        (**self).read_blocking(addr, buf)
    }

    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }
}
