//! SOCKS5 request parsing
//!
//! Validates the request header and hands the address part to
//! [`decode_address`].

use crate::error::Socks5Error;
use crate::socks::address::{decode_address, DecodedAddress};
use crate::socks::consts::*;
use crate::socks::types::SocksCommand;

/// Inspect the request at the front of `buf`.
///
/// Returns `Ok(None)` while more bytes are needed. Version and command are
/// validated as soon as the four-byte header is present, so a BIND or UDP
/// ASSOCIATE request is rejected before its address arrives.
pub fn parse_request(buf: &[u8]) -> Result<Option<DecodedAddress>, Socks5Error> {
    if buf.len() < REQUEST_HEADER_LEN {
        return Ok(None);
    }

    let version = buf[0];
    if version != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(version));
    }

    let cmd_byte = buf[1];
    match SocksCommand::from_byte(cmd_byte) {
        Some(SocksCommand::Connect) => {}
        Some(other) => {
            tracing::debug!("Rejecting {} request", other);
            return Err(Socks5Error::CommandNotSupported(cmd_byte));
        }
        None => return Err(Socks5Error::CommandNotSupported(cmd_byte)),
    }

    decode_address(buf)
}
