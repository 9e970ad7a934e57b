// FPGA User Logic Accelerator Driver
// Copyright 2025 Henk-Jan Lebbink
// SPDX-License-Identifier: MIT

//! Simulated register transport.
//!
//! [`SimTransport`] stands in for a real accelerator on hosts without
//! hardware: it models the register file as byte-addressed memory, answers
//! busy polls from a script, and journals every transport operation so
//! protocol sequencing can be asserted exactly.
//!
//! The simulator also enforces the transport invariants a real bus would
//! only punish at runtime: register access before `init()` and register
//! access while the user logic is disabled both fail.

use crate::error::TransportError;
use crate::transport::Transport;
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

/// One journaled transport operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimOp {
    Init,
    Deinit,
    Configure(u32),
    Delay(Duration),
    LogicEnable,
    LogicDisable,
    BusyPoll,
    DesignIdRead,
    Write { addr: u32, data: Vec<u8> },
    Read { addr: u32, len: usize },
}

/// In-memory simulated accelerator device.
///
/// # Example
///
/// ```rust
/// use userlogic_rs::{SimTransport, Transport};
///
/// let mut sim = SimTransport::new(47);
/// sim.init().unwrap();
/// sim.logic_enable().unwrap();
/// assert_eq!(sim.logic_design_id().unwrap(), 47);
/// ```
pub struct SimTransport {
    design_id: u8,
    initialized: bool,
    logic_enabled: bool,
    mem: BTreeMap<u32, u8>,
    read_queues: BTreeMap<u32, VecDeque<u8>>,
    busy: VecDeque<bool>,
    busy_default: bool,
    fail_write_at: Option<u32>,
    ops: Vec<SimOp>,
}

impl SimTransport {
    /// Create a simulated device reporting the given design ID.
    ///
    /// The device starts uninitialized, logic-disabled, never busy, with
    /// all registers reading as zero.
    pub fn new(design_id: u8) -> Self {
        Self {
            design_id,
            initialized: false,
            logic_enabled: false,
            mem: BTreeMap::new(),
            read_queues: BTreeMap::new(),
            busy: VecDeque::new(),
            busy_default: false,
            fail_write_at: None,
            ops: Vec::new(),
        }
    }

    /// Script the answers to successive busy polls.
    ///
    /// Once the script is exhausted, polls return the busy default
    /// (`false` unless changed with [`set_busy_default`](Self::set_busy_default)).
    pub fn set_busy_sequence(&mut self, sequence: impl IntoIterator<Item = bool>) {
        self.busy = sequence.into_iter().collect();
    }

    /// Set the busy answer returned after the script is exhausted.
    ///
    /// `true` simulates hardware that hangs in the busy state.
    pub fn set_busy_default(&mut self, busy: bool) {
        self.busy_default = busy;
    }

    /// Queue scripted values for successive 1-byte reads of `addr`.
    ///
    /// Reads consume the queue front first and fall back to register
    /// memory once it is empty.
    pub fn queue_read(&mut self, addr: u32, values: impl IntoIterator<Item = u8>) {
        self.read_queues.entry(addr).or_default().extend(values);
    }

    /// Store bytes into register memory without journaling a write.
    pub fn preload(&mut self, addr: u32, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            self.mem.insert(addr + i as u32, *byte);
        }
    }

    /// Fail the next write touching `addr` with a bus fault.
    pub fn fail_next_write_at(&mut self, addr: u32) {
        self.fail_write_at = Some(addr);
    }

    /// The operation journal, in execution order.
    pub fn ops(&self) -> &[SimOp] {
        &self.ops
    }

    /// Clear the operation journal.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Whether a transport session is currently open.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether the user-logic interface is currently enabled.
    pub fn is_logic_enabled(&self) -> bool {
        self.logic_enabled
    }

    /// Current value of a register byte, if it was ever written or
    /// preloaded.
    pub fn register(&self, addr: u32) -> Option<u8> {
        self.mem.get(&addr).copied()
    }

    fn record(&mut self, op: SimOp) {
        log::trace!("sim: {op:?}");
        self.ops.push(op);
    }

    fn check_session(&self) -> Result<(), TransportError> {
        if self.initialized {
            Ok(())
        } else {
            Err(TransportError::NotInitialized)
        }
    }

    fn check_logic(&self) -> Result<(), TransportError> {
        self.check_session()?;
        if self.logic_enabled {
            Ok(())
        } else {
            Err(TransportError::LogicInactive)
        }
    }
}

impl Transport for SimTransport {
    fn init(&mut self) -> Result<(), TransportError> {
        self.record(SimOp::Init);
        self.initialized = true;
        Ok(())
    }

    fn deinit(&mut self) -> Result<(), TransportError> {
        self.record(SimOp::Deinit);
        self.initialized = false;
        Ok(())
    }

    fn configure(&mut self, bitstream_addr: u32) -> Result<(), TransportError> {
        self.check_session()?;
        self.record(SimOp::Configure(bitstream_addr));
        Ok(())
    }

    fn logic_enable(&mut self) -> Result<(), TransportError> {
        self.check_session()?;
        self.record(SimOp::LogicEnable);
        self.logic_enabled = true;
        Ok(())
    }

    fn logic_disable(&mut self) -> Result<(), TransportError> {
        self.check_session()?;
        self.record(SimOp::LogicDisable);
        self.logic_enabled = false;
        Ok(())
    }

    fn logic_busy(&mut self) -> Result<bool, TransportError> {
        self.check_logic()?;
        self.record(SimOp::BusyPoll);
        Ok(self.busy.pop_front().unwrap_or(self.busy_default))
    }

    fn logic_design_id(&mut self) -> Result<u8, TransportError> {
        self.check_logic()?;
        self.record(SimOp::DesignIdRead);
        Ok(self.design_id)
    }

    fn write_blocking(&mut self, addr: u32, data: &[u8]) -> Result<(), TransportError> {
        self.check_logic()?;
        self.record(SimOp::Write {
            addr,
            data: data.to_vec(),
        });

        if self.fail_write_at == Some(addr) {
            self.fail_write_at = None;
            return Err(TransportError::Bus { addr });
        }

        for (i, byte) in data.iter().enumerate() {
            self.mem.insert(addr + i as u32, *byte);
        }
        Ok(())
    }

    fn read_blocking(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), TransportError> {
        self.check_logic()?;
        self.record(SimOp::Read {
            addr,
            len: buf.len(),
        });

        for (i, slot) in buf.iter_mut().enumerate() {
            let byte_addr = addr + i as u32;
            let scripted = self
                .read_queues
                .get_mut(&byte_addr)
                .and_then(|queue| queue.pop_front());
            *slot = scripted.unwrap_or_else(|| self.mem.get(&byte_addr).copied().unwrap_or(0));
        }
        Ok(())
    }

    fn delay(&mut self, duration: Duration) {
        self.record(SimOp::Delay(duration));
    }
}
