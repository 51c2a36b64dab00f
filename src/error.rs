//! A dedicated error for all possible errors in DNS queries: I/O, DNS packet
//! inconsistencies, transport failures and resolver-level failures.
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::str;

use crate::message::types::ResponseCode;

#[derive(Debug)]
pub enum DNSError {
    Io(io::Error),
    FromUtf8(std::string::FromUtf8Error),
    Utf8(str::Utf8Error),
    LoggerError(log::SetLoggerError),
    DNS(String),

    /// Name fails length or label-size validation (§4.1 `VerifyDN`).
    InvalidName(String),
    /// A string alias for a QTYPE wasn't recognized.
    UnknownType(String),
    /// A string alias for a QCLASS wasn't recognized.
    UnknownClass(String),
    /// Connect, write, read or timeout failure at the socket layer.
    Transport { peer: SocketAddr, reason: String },
    /// Malformed wire bytes: short buffer, pointer loop, bad rdlength, bad NSEC window, ...
    Protocol(String),
    /// The server answered with a non-zero rcode.
    Rcode(ResponseCode),
    /// The nameserver pool emptied before a send succeeded.
    NoServers,
    /// An address-resolution helper (`get_domain_addrs`) found no A/AAAA records.
    NoAddresses,
    /// A trace exceeded its configured delegation depth.
    MaxDelegations(u32),
    /// A batched action needed a dictionary and none was supplied.
    DictionaryEmpty,
}

impl DNSError {
    // Helper function to create a new DNS error from a string
    pub fn new(s: &str) -> Self {
        DNSError::DNS(String::from(s))
    }
}

/// A specific custom `Result` for all functions
pub type DNSResult<T> = Result<T, DNSError>;

impl fmt::Display for DNSError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DNSError::Io(e) => write!(f, "I/O error: {}", e),
            DNSError::FromUtf8(e) => write!(f, "UTF-8 conversion error: {}", e),
            DNSError::Utf8(e) => write!(f, "UTF-8 error: {}", e),
            DNSError::LoggerError(e) => write!(f, "logger error: {}", e),
            DNSError::DNS(s) => write!(f, "{}", s),
            DNSError::InvalidName(n) => write!(f, "invalid domain name '{}'", n),
            DNSError::UnknownType(s) => write!(f, "unknown query type '{}'", s),
            DNSError::UnknownClass(s) => write!(f, "unknown query class '{}'", s),
            DNSError::Transport { peer, reason } => {
                write!(f, "transport error with {}: {}", peer, reason)
            }
            DNSError::Protocol(s) => write!(f, "protocol error: {}", s),
            DNSError::Rcode(rc) => write!(f, "server returned {:?}: {}", rc, rc.message()),
            DNSError::NoServers => write!(f, "no DNS servers available"),
            DNSError::NoAddresses => write!(f, "no addresses found"),
            DNSError::MaxDelegations(n) => write!(f, "max level of delegation ({}) reached", n),
            DNSError::DictionaryEmpty => write!(f, "a dictionary file is required for this mode"),
        }
    }
}

impl std::error::Error for DNSError {}

// All conversions for internal errors for DNSError
impl From<io::Error> for DNSError {
    fn from(err: io::Error) -> Self {
        DNSError::Io(err)
    }
}

impl From<String> for DNSError {
    fn from(err: String) -> Self {
        DNSError::DNS(err)
    }
}

impl From<std::string::FromUtf8Error> for DNSError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        DNSError::FromUtf8(err)
    }
}

impl From<str::Utf8Error> for DNSError {
    fn from(err: str::Utf8Error) -> Self {
        DNSError::Utf8(err)
    }
}

impl From<log::SetLoggerError> for DNSError {
    fn from(err: log::SetLoggerError) -> Self {
        DNSError::LoggerError(err)
    }
}
