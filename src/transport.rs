//! UDP/TCP socket transport (§4.4): a single `ask` exchanges one message
//! for one reply, reopening (and scoping) its socket per call.
use std::io::{Read, Write};
use std::net::{IpAddr, SocketAddr, TcpStream, UdpSocket};
use std::time::Duration;

use crate::error::{DNSError, DNSResult};
use crate::message::Message;

/// Library-level default when no caller-supplied timeout is given. The
/// CLI's own `-timeout` flag defaults to 800ms (§6); this wider default
/// is for direct library use without a configured value.
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Max UDP payload this transport will send/expect without EDNS(0) (§6:
/// "Message size for UDP is capped at 512 octets").
const MAX_UDP_PAYLOAD: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Udp,
    Tcp,
}

#[derive(Debug, Clone)]
pub struct Transport {
    pub protocol: Protocol,
    pub timeout: Duration,
    /// When true, a truncated UDP reply is returned as-is instead of being
    /// retried over TCP (the CLI's `-ignore` flag).
    pub ignore_truncation: bool,
}

impl Transport {
    pub fn new(protocol: Protocol, timeout_ms: u64, ignore_truncation: bool) -> Self {
        Transport { protocol, timeout: Duration::from_millis(timeout_ms), ignore_truncation }
    }

    /// Sends `msg` to `peer` and returns the decoded reply. Applies the
    /// UDP->TCP truncation fallback unless `ignore_truncation` is set.
    pub fn ask(&self, msg: &Message, peer: SocketAddr) -> DNSResult<Message> {
        match self.protocol {
            Protocol::Tcp => self.ask_tcp(msg, peer),
            Protocol::Udp => {
                let reply = self.ask_udp(msg, peer)?;
                if reply.flags.tc && !self.ignore_truncation {
                    log::debug!("reply from {} truncated, retrying over TCP", peer);
                    self.ask_tcp(msg, peer)
                } else {
                    Ok(reply)
                }
            }
        }
    }

    fn ask_udp(&self, msg: &Message, peer: SocketAddr) -> DNSResult<Message> {
        let local: SocketAddr = match peer.ip() {
            IpAddr::V4(_) => "0.0.0.0:0".parse().unwrap(),
            IpAddr::V6(_) => "[::]:0".parse().unwrap(),
        };
        let socket = UdpSocket::bind(local).map_err(|e| transport_err(peer, e.to_string()))?;
        socket
            .set_read_timeout(Some(self.timeout))
            .map_err(|e| transport_err(peer, e.to_string()))?;

        let bytes = msg.pack()?;
        socket.send_to(&bytes, peer).map_err(|e| transport_err(peer, e.to_string()))?;

        let mut buf = [0u8; MAX_UDP_PAYLOAD];
        let (n, from) = socket.recv_from(&mut buf).map_err(|e| transport_err(peer, e.to_string()))?;
        if from.ip() != peer.ip() {
            return Err(DNSError::Transport {
                peer,
                reason: format!("reply came from unexpected address {}", from.ip()),
            });
        }
        Message::unpack(&buf[..n])
    }

    fn ask_tcp(&self, msg: &Message, peer: SocketAddr) -> DNSResult<Message> {
        let mut stream =
            TcpStream::connect_timeout(&peer, self.timeout).map_err(|e| transport_err(peer, e.to_string()))?;
        stream
            .set_read_timeout(Some(self.timeout))
            .map_err(|e| transport_err(peer, e.to_string()))?;
        stream
            .set_write_timeout(Some(self.timeout))
            .map_err(|e| transport_err(peer, e.to_string()))?;

        let bytes = msg.pack()?;
        if bytes.len() > u16::MAX as usize {
            return Err(DNSError::Protocol("message too large for TCP length prefix".into()));
        }
        let mut framed = Vec::with_capacity(2 + bytes.len());
        framed.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
        framed.extend_from_slice(&bytes);
        stream.write_all(&framed).map_err(|e| transport_err(peer, e.to_string()))?;

        let mut len_buf = [0u8; 2];
        stream.read_exact(&mut len_buf).map_err(|e| transport_err(peer, e.to_string()))?;
        let reply_len = u16::from_be_bytes(len_buf) as usize;
        let mut reply = vec![0u8; reply_len];
        stream.read_exact(&mut reply).map_err(|e| transport_err(peer, e.to_string()))?;

        Message::unpack(&reply)
    }
}

fn transport_err(peer: SocketAddr, reason: String) -> DNSError {
    DNSError::Transport { peer, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn udp_reply_over_max_payload_is_reported_not_panicked() {
        // recv_from only ever reads MAX_UDP_PAYLOAD bytes into a fixed
        // buffer; a larger datagram from a real OS socket would be
        // truncated by the kernel itself, not this code, so there is
        // nothing to unit-test here beyond the constant's value.
        assert_eq!(MAX_UDP_PAYLOAD, 512);
    }

    #[test]
    fn transport_new_sets_fields() {
        let t = Transport::new(Protocol::Udp, 800, true);
        assert_eq!(t.timeout, Duration::from_millis(800));
        assert!(t.ignore_truncation);
        assert_eq!(t.protocol, Protocol::Udp);
    }
}
