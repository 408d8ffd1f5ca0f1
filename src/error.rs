//! Error types for Argyle
//!
//! This module defines all custom error types used throughout the application.

use crate::socks::{
    SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE, SOCKS5_REPLY_GENERAL_FAILURE, SOCKS5_VERSION,
};
use std::io;
use thiserror::Error;

/// Main error type for Argyle operations
#[derive(Error, Debug)]
pub enum ArgyleError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SOCKS5 protocol error
    #[error("SOCKS5 error: {0}")]
    Socks5(#[from] Socks5Error),
}

/// SOCKS5 specific errors
///
/// Every variant is fatal for the session that produced it. Waiting for more
/// bytes is never an error and is not represented here.
#[derive(Error, Debug)]
pub enum Socks5Error {
    /// Unsupported SOCKS version
    #[error("Unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// No acceptable authentication method
    #[error("No acceptable authentication method")]
    NoAcceptableMethod,

    /// Command not supported
    #[error("Command not supported: {0}")]
    CommandNotSupported(u8),

    /// Address type not supported
    #[error("Address type not supported: {0}")]
    AddressTypeNotSupported(u8),

    /// Dialing the destination failed
    #[error("Destination unreachable: {0}")]
    DestinationUnreachable(#[source] io::Error),
}

impl Socks5Error {
    /// Fixed bytes written to the client before closing, if any.
    ///
    /// A version mismatch is answered by closing the connection with no
    /// reply. `DestinationUnreachable` is answered with the echoed request
    /// template instead, so it has no fixed reply either.
    pub fn reply(&self) -> Option<[u8; 2]> {
        match self {
            Socks5Error::UnsupportedVersion(_) | Socks5Error::DestinationUnreachable(_) => None,
            Socks5Error::NoAcceptableMethod => {
                Some([SOCKS5_VERSION, SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE])
            }
            Socks5Error::CommandNotSupported(_) | Socks5Error::AddressTypeNotSupported(_) => {
                Some([SOCKS5_VERSION, SOCKS5_REPLY_GENERAL_FAILURE])
            }
        }
    }
}

/// Reply codes for SOCKS5 protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Socks5ReplyCode {
    /// Command succeeded
    Succeeded = 0x00,
    /// General SOCKS server failure
    GeneralFailure = 0x01,
}

impl From<Socks5ReplyCode> for u8 {
    fn from(code: Socks5ReplyCode) -> Self {
        code as u8
    }
}
