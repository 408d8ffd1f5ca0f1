//! SOCKS5 reply construction
//!
//! ```text
//! +----+-----+-------+------+----------+----------+
//! |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
//! +----+-----+-------+------+----------+----------+
//! | 1  |  1  | X'00' |  1   | Variable |    2     |
//! +----+-----+-------+------+----------+----------+
//! ```
//!
//! The gateway does not report its bound address. The reply echoes the
//! request's `ATYP DST.ADDR DST.PORT` verbatim and only rewrites REP and RSV.

use crate::error::Socks5ReplyCode;
use crate::socks::consts::*;
use bytes::{Bytes, BytesMut};

/// The consumed request bytes, kept to be echoed back as the reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTemplate {
    raw: BytesMut,
}

impl ReplyTemplate {
    /// Wrap the exact bytes of a decoded request
    pub fn new(raw: BytesMut) -> Self {
        debug_assert!(raw.len() >= REQUEST_HEADER_LEN);
        Self { raw }
    }

    /// Produce the reply with the given result code
    pub fn finish(mut self, code: Socks5ReplyCode) -> Bytes {
        self.raw[REPLY_CODE_OFFSET] = code.into();
        self.raw[REPLY_RESERVED_OFFSET] = SOCKS5_RESERVED;
        self.raw.freeze()
    }
}
