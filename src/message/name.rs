//! Domain name codec (§4.1): encoding with compression-pointer writing,
//! decoding with pointer-following and loop/forward-pointer rejection.
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;

use crate::error::{DNSError, DNSResult};
use crate::util::is_pointer;

/// Maximum encoded (dotted, pre-wire) length accepted. The RFC1035 wire
/// limit is 255 octets including the terminating zero; SPEC_FULL §9
/// resolves the off-by-a-couple ambiguity in the original source in favor
/// of the literal boundary scenario quoted in the spec (253 accepted, 254
/// rejected), so that's what's enforced here rather than the RFC's raw 255.
const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;
/// Pointers are only 14 bits; names rooted further into the message than
/// this can never be the *target* of a pointer, only a writer of one.
const MAX_POINTER_OFFSET: usize = 0x3FFF;
/// Guards against pathological pointer chains in decode.
const MAX_POINTER_JUMPS: usize = 128;

/// A dot-joined sequence of labels. The root / empty name is the empty
/// label list; its wire encoding is a single zero octet either way.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Name(pub Vec<String>);

/// Shared per-message compression dictionary: lowercased dotted suffix ->
/// absolute offset (from the start of the message, header included) where
/// that suffix was first written.
pub type Dictionary = HashMap<String, u16>;

impl Name {
    pub fn root() -> Self {
        Name(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn verify(&self) -> DNSResult<()> {
        if self.0.iter().any(|l| l.is_empty()) {
            return Err(DNSError::InvalidName(self.to_string()));
        }
        if let Some(bad) = self.0.iter().find(|l| l.len() > MAX_LABEL_LEN) {
            return Err(DNSError::InvalidName(format!(
                "label '{}' exceeds {} octets",
                bad, MAX_LABEL_LEN
            )));
        }
        let encoded_len: usize = self.0.iter().map(|l| l.len() + 1).sum::<usize>() + 1;
        if encoded_len > MAX_NAME_LEN {
            return Err(DNSError::InvalidName(format!(
                "'{}' exceeds {} octets encoded",
                self, MAX_NAME_LEN
            )));
        }
        Ok(())
    }

    /// `Name2Qname` at the API level: parses a dotted string. Empty string
    /// and "." both mean root.
    pub fn parse(s: &str) -> DNSResult<Self> {
        if s.is_empty() || s == "." {
            return Ok(Name::root());
        }
        if s.starts_with('.') || s.contains("..") {
            return Err(DNSError::InvalidName(s.to_string()));
        }
        let trimmed = s.strip_suffix('.').unwrap_or(s);
        let name = Name(trimmed.split('.').map(String::from).collect());
        name.verify()?;
        Ok(name)
    }

    /// Encodes `self` at `offset` (the absolute position in the final
    /// message this name's first byte will occupy) into `buffer`, using
    /// `dict` for compression when present. Returns bytes written.
    pub fn encode(
        &self,
        buffer: &mut Vec<u8>,
        offset: usize,
        mut dict: Option<&mut Dictionary>,
    ) -> DNSResult<usize> {
        if self.0.is_empty() {
            buffer.push(0);
            return Ok(1);
        }

        // Find the longest already-known suffix (searchDN).
        let mut pointer: Option<u16> = None;
        let mut split_at = self.0.len();
        if let Some(d) = dict.as_deref() {
            for i in 0..self.0.len() {
                let suffix = self.0[i..].join(".").to_ascii_lowercase();
                if let Some(&off) = d.get(&suffix) {
                    pointer = Some(off);
                    split_at = i;
                    break;
                }
            }
        }

        let mut written = 0usize;
        for i in 0..split_at {
            if let Some(d) = dict.as_deref_mut() {
                let abs = offset + written;
                if abs <= MAX_POINTER_OFFSET {
                    let suffix = self.0[i..].join(".").to_ascii_lowercase();
                    d.entry(suffix).or_insert(abs as u16);
                }
            }
            let label = self.0[i].as_bytes();
            buffer.push(label.len() as u8);
            buffer.extend_from_slice(label);
            written += 1 + label.len();
        }

        match pointer {
            Some(off) => {
                buffer.extend_from_slice(&(0xC000u16 | off).to_be_bytes());
                written += 2;
            }
            None => {
                buffer.push(0);
                written += 1;
            }
        }

        Ok(written)
    }

    /// Decodes a name starting at `pos` in the full message buffer `buf`.
    /// Returns the name and the cursor position just past *this* name's
    /// own bytes (i.e. past the terminator or the 2-byte pointer that
    /// first ended the outer cursor's walk -- jumps don't move it further).
    pub fn decode(buf: &[u8], pos: usize) -> DNSResult<(Self, usize)> {
        let mut labels = Vec::new();
        let mut cursor = pos;
        let mut end_pos: Option<usize> = None;
        let mut visited: HashSet<usize> = HashSet::new();
        let mut jumps = 0usize;

        loop {
            if cursor >= buf.len() {
                return Err(DNSError::Protocol("name decode ran past end of message".into()));
            }
            let len = buf[cursor];

            if len == 0 {
                if end_pos.is_none() {
                    end_pos = Some(cursor + 1);
                }
                break;
            } else if is_pointer(len) {
                if cursor + 1 >= buf.len() {
                    return Err(DNSError::Protocol("truncated compression pointer".into()));
                }
                let off = (((len as u16) & 0x3F) << 8 | buf[cursor + 1] as u16) as usize;
                if end_pos.is_none() {
                    end_pos = Some(cursor + 2);
                }
                if off >= cursor {
                    return Err(DNSError::Protocol(
                        "compression pointer is not strictly backward".into(),
                    ));
                }
                if !visited.insert(off) {
                    return Err(DNSError::Protocol("compression pointer loop".into()));
                }
                jumps += 1;
                if jumps > MAX_POINTER_JUMPS {
                    return Err(DNSError::Protocol("too many compression pointer jumps".into()));
                }
                cursor = off;
            } else {
                let l = len as usize;
                if l > MAX_LABEL_LEN {
                    return Err(DNSError::Protocol(format!("label length {} exceeds 63", l)));
                }
                if cursor + 1 + l > buf.len() {
                    return Err(DNSError::Protocol("label runs past end of message".into()));
                }
                let label = std::str::from_utf8(&buf[cursor + 1..cursor + 1 + l])?;
                labels.push(label.to_string());
                cursor += 1 + l;
            }
        }

        Ok((Name(labels), end_pos.expect("terminator or pointer always sets end_pos")))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.0.join("."))
        }
    }
}

impl TryFrom<&str> for Name {
    type Error = DNSError;

    fn try_from(s: &str) -> DNSResult<Self> {
        Name::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_plain(name: &Name) -> Vec<u8> {
        let mut buf = Vec::new();
        name.encode(&mut buf, 0, None).unwrap();
        buf
    }

    #[test]
    fn root_and_empty_encode_to_single_zero() {
        assert_eq!(encode_plain(&Name::parse("").unwrap()), vec![0]);
        assert_eq!(encode_plain(&Name::parse(".").unwrap()), vec![0]);
    }

    #[test]
    fn name_roundtrip() {
        let n = Name::parse("example.com").unwrap();
        let mut buf = Vec::new();
        n.encode(&mut buf, 0, None).unwrap();
        let (decoded, end) = Name::decode(&buf, 0).unwrap();
        assert_eq!(decoded, n);
        assert_eq!(end, buf.len());
        assert_eq!(decoded.to_string(), "example.com");
    }

    #[test]
    fn label_length_boundary() {
        let ok = "a".repeat(63);
        let bad = "a".repeat(64);
        assert!(Name::parse(&ok).is_ok());
        assert!(Name::parse(&bad).is_err());
    }

    #[test]
    fn total_length_boundary() {
        // 253 accepted, 254 rejected per the spec's literal boundary scenario.
        // Four 62-octet labels: encoded length = 4*(62+1) + 1 (terminator) = 253.
        let labels_253: Vec<String> = vec!["a".repeat(62); 4];
        let dotted_253 = labels_253.join(".");
        assert!(Name::parse(&dotted_253).is_ok());

        // Bump one label to 63 octets: encoded length becomes 254.
        let mut labels_254 = labels_253.clone();
        labels_254[3] = "a".repeat(63);
        let dotted_254 = labels_254.join(".");
        assert!(Name::parse(&dotted_254).is_err());
    }

    #[test]
    fn compression_writes_pointer_for_known_suffix() {
        let mut dict = Dictionary::new();
        let mut buf = vec![0u8; 12]; // pretend header
        let base = Name::parse("example.com").unwrap();
        base.encode(&mut buf, 12, Some(&mut dict)).unwrap();

        let suffixed = Name::parse("www.example.com").unwrap();
        let before = buf.len();
        suffixed.encode(&mut buf, before, Some(&mut dict)).unwrap();

        // "www" label then a 2-byte pointer back into the first name.
        let www_start = before;
        assert_eq!(buf[www_start], 3);
        assert_eq!(&buf[www_start + 1..www_start + 4], b"www");
        assert_eq!(buf[www_start + 4] & 0xC0, 0xC0);

        let (decoded, _) = Name::decode(&buf, www_start).unwrap();
        assert_eq!(decoded, suffixed);
    }

    #[test]
    fn decode_rejects_forward_pointer() {
        // Pointer at offset 0 pointing to offset 5: forward, must be rejected.
        let buf = [0xC0, 0x05, 0x00, 0x00, 0x00, 0x00];
        assert!(Name::decode(&buf, 0).is_err());
    }

    #[test]
    fn decode_rejects_pointer_loop() {
        // Offset 0: pointer to 2. Offset 2: pointer to 0. Cyclic.
        let buf = [0xC0, 0x02, 0xC0, 0x00];
        assert!(Name::decode(&buf, 2).is_err());
    }
}
