//! SOCKS5 wire protocol for Argyle
//!
//! Pure, incremental parsers for the method-selection and CONNECT request
//! messages. Every parser looks at the bytes received so far and answers
//! either "need more bytes" or a complete result, so the session can feed
//! them whatever TCP delivered.

mod address;
mod consts;
mod handshake;
mod reply;
mod request;
mod types;

pub use address::{decode_address, DecodedAddress};
pub use consts::*;
pub use handshake::{parse_handshake, NO_AUTH_REPLY};
pub use reply::ReplyTemplate;
pub use request::parse_request;
pub use types::{SocksCommand, TargetAddr};
