// FPGA User Logic Accelerator Driver
// Copyright 2025 Henk-Jan Lebbink
// SPDX-License-Identifier: MIT

//! Error types for user-logic driver operations.

use thiserror::Error;

/// Errors reported by the register-transport layer.
///
/// These cover the bus between the host and the accelerator. The driver
/// never interprets them; they are wrapped into [`UserLogicError::Transport`]
/// and surfaced to the caller.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error from the underlying channel (character device, SPI, ...).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bus-level fault while accessing a register.
    #[error("bus fault at address {addr:#06x}")]
    Bus { addr: u32 },

    /// Register access before the transport session was initialized.
    #[error("transport not initialized")]
    NotInitialized,

    /// Register access while the user-logic interface is disabled.
    #[error("user logic not enabled")]
    LogicInactive,
}

/// Errors that can occur during deploy/predict operations.
#[derive(Debug, Error)]
pub enum UserLogicError {
    /// Failure in the external register-transport layer.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The accelerator never reported not-busy within the poll budget.
    #[error("accelerator still busy after {polls} status polls")]
    HardwareTimeout { polls: u32 },

    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for driver operations.
pub type UserLogicResult<T> = Result<T, UserLogicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransportError::Bus { addr: 100 };
        assert_eq!(format!("{}", err), "bus fault at address 0x0064");

        let err = UserLogicError::HardwareTimeout { polls: 32 };
        assert_eq!(
            format!("{}", err),
            "accelerator still busy after 32 status polls"
        );
    }

    #[test]
    fn test_transport_error_wraps() {
        let err: UserLogicError = TransportError::NotInitialized.into();
        assert!(matches!(
            err,
            UserLogicError::Transport(TransportError::NotInitialized)
        ));
    }
}
