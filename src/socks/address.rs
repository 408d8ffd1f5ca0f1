//! SOCKS5 address decoding
//!
//! Decodes the `ATYP DST.ADDR DST.PORT` part of a request held in a buffer
//! that starts at the request's first byte.
//!
//! ```text
//! +----+-----+-------+------+----------+----------+
//! |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
//! +----+-----+-------+------+----------+----------+
//! | 1  |  1  | X'00' |  1   | Variable |    2     |
//! +----+-----+-------+------+----------+----------+
//! ```

use crate::error::Socks5Error;
use crate::socks::consts::*;
use crate::socks::types::TargetAddr;
use std::net::Ipv4Addr;

const IPV4_LEN: usize = 4;
const IPV6_LEN: usize = 16;
/// Index of the domain length byte
const DOMAIN_LEN_OFFSET: usize = REQUEST_HEADER_LEN;

/// A fully decoded destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAddress {
    /// Destination host and port
    pub target: TargetAddr,
    /// Bytes consumed from the start of the request, header included
    pub consumed: usize,
}

/// Decode the destination of the request at the front of `buf`.
///
/// Returns `Ok(None)` while the buffer does not yet hold the whole address;
/// nothing is consumed in that case and the caller retries with more bytes.
pub fn decode_address(buf: &[u8]) -> Result<Option<DecodedAddress>, Socks5Error> {
    if buf.len() < REQUEST_HEADER_LEN {
        return Ok(None);
    }

    let addr_type = buf[REQUEST_HEADER_LEN - 1];
    match addr_type {
        SOCKS5_ADDR_TYPE_IPV4 => {
            let consumed = REQUEST_HEADER_LEN + IPV4_LEN + PORT_LEN;
            if buf.len() < consumed {
                return Ok(None);
            }
            let ip = Ipv4Addr::new(buf[4], buf[5], buf[6], buf[7]);
            let port = read_port(buf, REQUEST_HEADER_LEN + IPV4_LEN);
            Ok(Some(DecodedAddress {
                target: TargetAddr::ipv4(ip, port),
                consumed,
            }))
        }

        SOCKS5_ADDR_TYPE_DOMAIN => {
            // The length byte has to arrive before the full size is known
            if buf.len() <= DOMAIN_LEN_OFFSET {
                return Ok(None);
            }
            let domain_len = buf[DOMAIN_LEN_OFFSET] as usize;
            let host_start = DOMAIN_LEN_OFFSET + 1;
            let consumed = host_start + domain_len + PORT_LEN;
            if buf.len() < consumed {
                return Ok(None);
            }
            let domain =
                String::from_utf8_lossy(&buf[host_start..host_start + domain_len]).into_owned();
            let port = read_port(buf, host_start + domain_len);
            Ok(Some(DecodedAddress {
                target: TargetAddr::domain(domain, port),
                consumed,
            }))
        }

        SOCKS5_ADDR_TYPE_IPV6 => {
            let consumed = REQUEST_HEADER_LEN + IPV6_LEN + PORT_LEN;
            if buf.len() < consumed {
                return Ok(None);
            }
            let mut octets = [0u8; IPV6_LEN];
            octets.copy_from_slice(&buf[REQUEST_HEADER_LEN..REQUEST_HEADER_LEN + IPV6_LEN]);
            let port = read_port(buf, REQUEST_HEADER_LEN + IPV6_LEN);
            Ok(Some(DecodedAddress {
                target: TargetAddr::ipv6(octets, port),
                consumed,
            }))
        }

        _ => Err(Socks5Error::AddressTypeNotSupported(addr_type)),
    }
}

fn read_port(buf: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buf[offset], buf[offset + 1]])
}
