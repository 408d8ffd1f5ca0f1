//! SOCKS5 method selection
//!
//! ```text
//! +----+----------+----------+
//! |VER | NMETHODS | METHODS  |
//! +----+----------+----------+
//! | 1  |    1     | 1 to 255 |
//! +----+----------+----------+
//! ```
//!
//! Only "no authentication required" is ever selected.

use crate::error::Socks5Error;
use crate::socks::consts::*;

/// Reply sent when the client offers "no authentication"
pub const NO_AUTH_REPLY: [u8; 2] = [SOCKS5_VERSION, SOCKS5_AUTH_METHOD_NONE];

/// Inspect the method-selection message at the front of `buf`.
///
/// Returns `Ok(None)` while more bytes are needed, or `Ok(Some(n))` with the
/// length of the accepted message. The version is checked as soon as the
/// two-byte header is present, before the method list has arrived.
pub fn parse_handshake(buf: &[u8]) -> Result<Option<usize>, Socks5Error> {
    if buf.len() < HANDSHAKE_HEADER_LEN {
        return Ok(None);
    }

    let version = buf[0];
    if version != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(version));
    }

    let num_methods = buf[1] as usize;
    let consumed = HANDSHAKE_HEADER_LEN + num_methods;
    if buf.len() < consumed {
        return Ok(None);
    }

    if buf[HANDSHAKE_HEADER_LEN..consumed].contains(&SOCKS5_AUTH_METHOD_NONE) {
        Ok(Some(consumed))
    } else {
        Err(Socks5Error::NoAcceptableMethod)
    }
}
