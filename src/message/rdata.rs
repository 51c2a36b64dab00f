//! RDATA registry (§4.2): one variant per supported record type plus a
//! catch-all `Unknown`. Encoding/decoding is a dispatch table keyed on the
//! 16-bit type code, not virtual dispatch (SPEC_FULL §9's "polymorphic
//! RDATA" design note).
use std::net::{Ipv4Addr, Ipv6Addr};

use byteorder::{BigEndian, ByteOrder};

use crate::error::{DNSError, DNSResult};
use crate::message::name::{Dictionary, Name};
use crate::message::types::QType;
use crate::util::is_pointer;

#[derive(Debug, Clone, PartialEq)]
pub struct SoaData {
    pub mname: Name,
    pub rname: Name,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MxData {
    pub preference: u16,
    pub exchange: Name,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HinfoData {
    pub cpu: Vec<u8>,
    pub os: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinfoData {
    pub rmailbx: Name,
    pub emailbx: Name,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WksData {
    pub address: Ipv4Addr,
    pub protocol: u8,
    pub bitmap: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SrvData {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: Name,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NaptrData {
    pub order: u16,
    pub preference: u16,
    pub flags: Vec<u8>,
    pub services: Vec<u8>,
    pub regexp: Vec<u8>,
    pub replacement: Name,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RpData {
    pub mbox: Name,
    pub txt: Name,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AfsdbData {
    pub subtype: u16,
    pub hostname: Name,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocData {
    pub version: u8,
    pub size: u8,
    pub horiz_pre: u8,
    pub vert_pre: u8,
    pub latitude: u32,
    pub longitude: u32,
    pub altitude: u32,
}

/// One window of the NSEC type bitmap: `<window><len><bits>`.
#[derive(Debug, Clone, PartialEq)]
pub struct NsecWindow {
    pub window: u8,
    pub bitmap: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NsecData {
    pub next_domain: Name,
    pub windows: Vec<NsecWindow>,
}

impl NsecData {
    /// True iff type `t` is set in the bitmap (`T mod 256` bit of window
    /// `T / 256`, big-endian within each octet).
    pub fn has_type(&self, t: u16) -> bool {
        let window = (t / 256) as u8;
        let bit = (t % 256) as usize;
        self.windows
            .iter()
            .find(|w| w.window == window)
            .map(|w| {
                let byte = bit / 8;
                let mask = 0x80 >> (bit % 8);
                w.bitmap.get(byte).map(|b| b & mask != 0).unwrap_or(false)
            })
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DnskeyData {
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    NS(Name),
    CNAME(Name),
    SOA(SoaData),
    PTR(Name),
    MX(MxData),
    TXT(Vec<Vec<u8>>),
    HINFO(HinfoData),
    MINFO(MinfoData),
    MB(Name),
    MD(Name),
    MF(Name),
    MG(Name),
    MR(Name),
    NULL(Vec<u8>),
    WKS(WksData),
    SRV(SrvData),
    NAPTR(NaptrData),
    DNAME(Name),
    DHCID(Vec<u8>),
    RP(RpData),
    AFSDB(AfsdbData),
    LOC(LocData),
    NSEC(NsecData),
    DNSKEY(DnskeyData),
    Unknown(u16, Vec<u8>),
}

fn read_character_string(buf: &[u8], pos: usize) -> DNSResult<(Vec<u8>, usize)> {
    if pos >= buf.len() {
        return Err(DNSError::Protocol("character-string length byte missing".into()));
    }
    let len = buf[pos] as usize;
    let end = pos + 1 + len;
    if end > buf.len() {
        return Err(DNSError::Protocol("character-string runs past end of RDATA".into()));
    }
    Ok((buf[pos + 1..end].to_vec(), end))
}

fn write_character_string(buffer: &mut Vec<u8>, s: &[u8]) -> DNSResult<usize> {
    if s.len() > 255 {
        return Err(DNSError::Protocol("character-string longer than 255 octets".into()));
    }
    buffer.push(s.len() as u8);
    buffer.extend_from_slice(s);
    Ok(1 + s.len())
}

impl RData {
    pub fn rtype(&self) -> u16 {
        match self {
            RData::A(_) => QType::A.value(),
            RData::AAAA(_) => QType::AAAA.value(),
            RData::NS(_) => QType::NS.value(),
            RData::CNAME(_) => QType::CNAME.value(),
            RData::SOA(_) => QType::SOA.value(),
            RData::PTR(_) => QType::PTR.value(),
            RData::MX(_) => QType::MX.value(),
            RData::TXT(_) => QType::TXT.value(),
            RData::HINFO(_) => QType::HINFO.value(),
            RData::MINFO(_) => QType::MINFO.value(),
            RData::MB(_) => QType::MB.value(),
            RData::MD(_) => QType::MD.value(),
            RData::MF(_) => QType::MF.value(),
            RData::MG(_) => QType::MG.value(),
            RData::MR(_) => QType::MR.value(),
            RData::NULL(_) => QType::NULL.value(),
            RData::WKS(_) => QType::WKS.value(),
            RData::SRV(_) => QType::SRV.value(),
            RData::NAPTR(_) => QType::NAPTR.value(),
            RData::DNAME(_) => QType::DNAME.value(),
            RData::DHCID(_) => QType::DHCID.value(),
            RData::RP(_) => QType::RP.value(),
            RData::AFSDB(_) => QType::AFSDB.value(),
            RData::LOC(_) => QType::LOC.value(),
            RData::NSEC(_) => QType::NSEC.value(),
            RData::DNSKEY(_) => QType::DNSKEY.value(),
            RData::Unknown(t, _) => *t,
        }
    }

    /// Uncompressed serialization (compression disabled).
    pub fn to_bytes(&self) -> DNSResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.pack(&mut buffer, 0, None)?;
        Ok(buffer)
    }

    /// Serializes into `buffer`, with `current_offset` being the absolute
    /// position the first RDATA byte lands at -- used as the compression
    /// base for embedded names. Returns bytes written.
    pub fn pack(
        &self,
        buffer: &mut Vec<u8>,
        current_offset: usize,
        mut dict: Option<&mut Dictionary>,
    ) -> DNSResult<usize> {
        let start = buffer.len();
        match self {
            RData::A(addr) => buffer.extend_from_slice(&addr.octets()),
            RData::AAAA(addr) => buffer.extend_from_slice(&addr.octets()),
            RData::NS(n) | RData::CNAME(n) | RData::PTR(n) | RData::DNAME(n) | RData::MB(n)
            | RData::MD(n) | RData::MF(n) | RData::MG(n) | RData::MR(n) => {
                n.encode(buffer, current_offset, dict.as_deref_mut())?;
            }
            RData::SOA(soa) => {
                soa.mname.encode(buffer, current_offset, dict.as_deref_mut())?;
                let rname_offset = current_offset + (buffer.len() - start);
                soa.rname.encode(buffer, rname_offset, dict.as_deref_mut())?;
                buffer.extend_from_slice(&soa.serial.to_be_bytes());
                buffer.extend_from_slice(&soa.refresh.to_be_bytes());
                buffer.extend_from_slice(&soa.retry.to_be_bytes());
                buffer.extend_from_slice(&soa.expire.to_be_bytes());
                buffer.extend_from_slice(&soa.minimum.to_be_bytes());
            }
            RData::MX(mx) => {
                buffer.extend_from_slice(&mx.preference.to_be_bytes());
                mx.exchange.encode(buffer, current_offset + 2, dict)?;
            }
            RData::TXT(strings) => {
                for s in strings {
                    write_character_string(buffer, s)?;
                }
            }
            RData::HINFO(h) => {
                write_character_string(buffer, &h.cpu)?;
                write_character_string(buffer, &h.os)?;
            }
            RData::MINFO(m) => {
                m.rmailbx.encode(buffer, current_offset, dict.as_deref_mut())?;
                let emailbx_offset = current_offset + (buffer.len() - start);
                m.emailbx.encode(buffer, emailbx_offset, dict)?;
            }
            RData::NULL(raw) => buffer.extend_from_slice(raw),
            RData::WKS(wks) => {
                buffer.extend_from_slice(&wks.address.octets());
                buffer.push(wks.protocol);
                buffer.extend_from_slice(&wks.bitmap);
            }
            RData::SRV(srv) => {
                buffer.extend_from_slice(&srv.priority.to_be_bytes());
                buffer.extend_from_slice(&srv.weight.to_be_bytes());
                buffer.extend_from_slice(&srv.port.to_be_bytes());
                srv.target.encode(buffer, current_offset + 6, dict)?;
            }
            RData::NAPTR(naptr) => {
                buffer.extend_from_slice(&naptr.order.to_be_bytes());
                buffer.extend_from_slice(&naptr.preference.to_be_bytes());
                write_character_string(buffer, &naptr.flags)?;
                write_character_string(buffer, &naptr.services)?;
                write_character_string(buffer, &naptr.regexp)?;
                let name_offset = current_offset + (buffer.len() - start);
                naptr.replacement.encode(buffer, name_offset, dict)?;
            }
            RData::DHCID(raw) => buffer.extend_from_slice(raw),
            RData::RP(rp) => {
                rp.mbox.encode(buffer, current_offset, dict.as_deref_mut())?;
                let txt_offset = current_offset + (buffer.len() - start);
                rp.txt.encode(buffer, txt_offset, dict)?;
            }
            RData::AFSDB(afsdb) => {
                buffer.extend_from_slice(&afsdb.subtype.to_be_bytes());
                afsdb.hostname.encode(buffer, current_offset + 2, dict)?;
            }
            RData::LOC(loc) => {
                buffer.push(loc.version);
                buffer.push(loc.size);
                buffer.push(loc.horiz_pre);
                buffer.push(loc.vert_pre);
                buffer.extend_from_slice(&loc.latitude.to_be_bytes());
                buffer.extend_from_slice(&loc.longitude.to_be_bytes());
                buffer.extend_from_slice(&loc.altitude.to_be_bytes());
            }
            RData::NSEC(nsec) => {
                nsec.next_domain.encode(buffer, current_offset, dict)?;
                for w in &nsec.windows {
                    buffer.push(w.window);
                    buffer.push(w.bitmap.len() as u8);
                    buffer.extend_from_slice(&w.bitmap);
                }
            }
            RData::DNSKEY(key) => {
                buffer.extend_from_slice(&key.flags.to_be_bytes());
                buffer.push(key.protocol);
                buffer.push(key.algorithm);
                buffer.extend_from_slice(&key.public_key);
            }
            RData::Unknown(_, raw) => buffer.extend_from_slice(raw),
        }
        Ok(buffer.len() - start)
    }

    /// Deserializes an RDATA payload of wire type `rtype` from
    /// `buf[start..start+rdlength]`. Name decoding may legally follow a
    /// pointer outside that window (§4.2).
    pub fn unpack(buf: &[u8], rtype: u16, start: usize, rdlength: usize) -> DNSResult<Self> {
        let end = start + rdlength;
        if end > buf.len() {
            return Err(DNSError::Protocol("rdlength runs past end of message".into()));
        }
        let body = &buf[start..end];

        let rdata = match QType::from_value(rtype) {
            QType::A => {
                if body.len() != 4 {
                    return Err(DNSError::Protocol("A record must be 4 octets".into()));
                }
                RData::A(Ipv4Addr::new(body[0], body[1], body[2], body[3]))
            }
            QType::AAAA => {
                if body.len() != 16 {
                    return Err(DNSError::Protocol("AAAA record must be 16 octets".into()));
                }
                let mut octets = [0u8; 16];
                octets.copy_from_slice(body);
                RData::AAAA(Ipv6Addr::from(octets))
            }
            QType::NS => RData::NS(Name::decode(buf, start)?.0),
            QType::CNAME => RData::CNAME(Name::decode(buf, start)?.0),
            QType::PTR => RData::PTR(Name::decode(buf, start)?.0),
            QType::DNAME => RData::DNAME(Name::decode(buf, start)?.0),
            QType::MB => RData::MB(Name::decode(buf, start)?.0),
            QType::MD => RData::MD(Name::decode(buf, start)?.0),
            QType::MF => RData::MF(Name::decode(buf, start)?.0),
            QType::MG => RData::MG(Name::decode(buf, start)?.0),
            QType::MR => RData::MR(Name::decode(buf, start)?.0),
            QType::SOA => {
                let (mname, after_mname) = Name::decode(buf, start)?;
                let (rname, after_rname) = Name::decode(buf, after_mname)?;
                if after_rname + 20 > buf.len() {
                    return Err(DNSError::Protocol("SOA numeric fields truncated".into()));
                }
                let nums = &buf[after_rname..after_rname + 20];
                RData::SOA(SoaData {
                    mname,
                    rname,
                    serial: BigEndian::read_u32(&nums[0..4]),
                    refresh: BigEndian::read_u32(&nums[4..8]),
                    retry: BigEndian::read_u32(&nums[8..12]),
                    expire: BigEndian::read_u32(&nums[12..16]),
                    minimum: BigEndian::read_u32(&nums[16..20]),
                })
            }
            QType::MX => {
                if body.len() < 2 {
                    return Err(DNSError::Protocol("MX preference truncated".into()));
                }
                let preference = BigEndian::read_u16(&body[0..2]);
                let (exchange, _) = Name::decode(buf, start + 2)?;
                RData::MX(MxData { preference, exchange })
            }
            QType::TXT => {
                let mut strings = Vec::new();
                let mut pos = 0usize;
                while pos < body.len() {
                    let (s, next) = read_character_string(body, pos)?;
                    strings.push(s);
                    pos = next;
                }
                RData::TXT(strings)
            }
            QType::HINFO => {
                let (cpu, after_cpu) = read_character_string(body, 0)?;
                let (os, _) = read_character_string(body, after_cpu)?;
                RData::HINFO(HinfoData { cpu, os })
            }
            QType::MINFO => {
                let (rmailbx, after_r) = Name::decode(buf, start)?;
                let (emailbx, _) = Name::decode(buf, after_r)?;
                RData::MINFO(MinfoData { rmailbx, emailbx })
            }
            QType::NULL => RData::NULL(body.to_vec()),
            QType::WKS => {
                if body.len() < 5 {
                    return Err(DNSError::Protocol("WKS record truncated".into()));
                }
                RData::WKS(WksData {
                    address: Ipv4Addr::new(body[0], body[1], body[2], body[3]),
                    protocol: body[4],
                    bitmap: body[5..].to_vec(),
                })
            }
            QType::SRV => {
                if body.len() < 6 {
                    return Err(DNSError::Protocol("SRV record truncated".into()));
                }
                let priority = BigEndian::read_u16(&body[0..2]);
                let weight = BigEndian::read_u16(&body[2..4]);
                let port = BigEndian::read_u16(&body[4..6]);
                let (target, _) = Name::decode(buf, start + 6)?;
                RData::SRV(SrvData { priority, weight, port, target })
            }
            QType::NAPTR => {
                if body.len() < 4 {
                    return Err(DNSError::Protocol("NAPTR record truncated".into()));
                }
                let order = BigEndian::read_u16(&body[0..2]);
                let preference = BigEndian::read_u16(&body[2..4]);
                let (flags, after_flags) = read_character_string(body, 4)?;
                let (services, after_services) = read_character_string(body, after_flags)?;
                let (regexp, after_regexp) = read_character_string(body, after_services)?;
                let (replacement, _) = Name::decode(buf, start + after_regexp)?;
                RData::NAPTR(NaptrData { order, preference, flags, services, regexp, replacement })
            }
            QType::DHCID => RData::DHCID(body.to_vec()),
            QType::RP => {
                let (mbox, after_mbox) = Name::decode(buf, start)?;
                let (txt, _) = Name::decode(buf, after_mbox)?;
                RData::RP(RpData { mbox, txt })
            }
            QType::AFSDB => {
                if body.len() < 2 {
                    return Err(DNSError::Protocol("AFSDB record truncated".into()));
                }
                let subtype = BigEndian::read_u16(&body[0..2]);
                let (hostname, _) = Name::decode(buf, start + 2)?;
                RData::AFSDB(AfsdbData { subtype, hostname })
            }
            QType::LOC => {
                if body.len() != 16 {
                    return Err(DNSError::Protocol("LOC record must be 16 octets".into()));
                }
                RData::LOC(LocData {
                    version: body[0],
                    size: body[1],
                    horiz_pre: body[2],
                    vert_pre: body[3],
                    latitude: BigEndian::read_u32(&body[4..8]),
                    longitude: BigEndian::read_u32(&body[8..12]),
                    altitude: BigEndian::read_u32(&body[12..16]),
                })
            }
            QType::NSEC => {
                let (next_domain, after_name) = Name::decode(buf, start)?;
                // The bitmap portion is bounded by rdlength, not by where
                // the name decoder's cursor ended up (it may have jumped).
                let name_len_in_rdata = {
                    // Recompute the name's own wire length from `body`
                    // directly since `after_name` is a message-absolute
                    // position that may lie outside [start, end) when the
                    // name was itself compressed.
                    let mut i = 0usize;
                    loop {
                        if i >= body.len() {
                            return Err(DNSError::Protocol("NSEC next-domain truncated".into()));
                        }
                        let b = body[i];
                        if b == 0 {
                            i += 1;
                            break;
                        } else if is_pointer(b) {
                            i += 2;
                            break;
                        } else {
                            i += 1 + b as usize;
                        }
                    }
                    i
                };
                let _ = after_name;
                let mut windows = Vec::new();
                let mut pos = name_len_in_rdata;
                let mut last_window: Option<i32> = None;
                while pos < body.len() {
                    if pos + 2 > body.len() {
                        return Err(DNSError::Protocol("NSEC window header truncated".into()));
                    }
                    let window = body[pos];
                    let len = body[pos + 1] as usize;
                    if len == 0 || len > 32 {
                        return Err(DNSError::Protocol(format!(
                            "NSEC window length {} out of range (1..=32)",
                            len
                        )));
                    }
                    if let Some(last) = last_window {
                        if window as i32 <= last {
                            return Err(DNSError::Protocol("NSEC windows not strictly increasing".into()));
                        }
                    }
                    last_window = Some(window as i32);
                    let bitmap_start = pos + 2;
                    let bitmap_end = bitmap_start + len;
                    if bitmap_end > body.len() {
                        return Err(DNSError::Protocol("NSEC bitmap runs past end of RDATA".into()));
                    }
                    windows.push(NsecWindow { window, bitmap: body[bitmap_start..bitmap_end].to_vec() });
                    pos = bitmap_end;
                }
                RData::NSEC(NsecData { next_domain, windows })
            }
            QType::DNSKEY => {
                if body.len() < 4 {
                    return Err(DNSError::Protocol("DNSKEY record truncated".into()));
                }
                RData::DNSKEY(DnskeyData {
                    flags: BigEndian::read_u16(&body[0..2]),
                    protocol: body[2],
                    algorithm: body[3],
                    public_key: body[4..].to_vec(),
                })
            }
            _ => RData::Unknown(rtype, body.to_vec()),
        };

        Ok(rdata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_record_roundtrip() {
        let rdata = RData::A(Ipv4Addr::new(93, 184, 216, 34));
        let bytes = rdata.to_bytes().unwrap();
        assert_eq!(bytes, vec![93, 184, 216, 34]);
        let decoded = RData::unpack(&bytes, QType::A.value(), 0, 4).unwrap();
        assert_eq!(decoded, rdata);
    }

    #[test]
    fn soa_includes_minimum_and_compresses_rname_suffix() {
        // Build a message whose question is "example.com" so SOA's Rname
        // suffix "example.com" should compress against it.
        let mut dict = Dictionary::new();
        let mut buf = vec![0u8; 12];
        let question_name = Name::parse("example.com").unwrap();
        question_name.encode(&mut buf, 12, Some(&mut dict)).unwrap();

        let rr_start = buf.len();
        let soa = SoaData {
            mname: Name::parse("ns.example.com").unwrap(),
            rname: Name::parse("hostmaster.example.com").unwrap(),
            serial: 1,
            refresh: 2,
            retry: 3,
            expire: 4,
            minimum: 5,
        };
        let rdata = RData::SOA(soa.clone());
        rdata.pack(&mut buf, rr_start, Some(&mut dict)).unwrap();

        // Somewhere in the packed bytes there must be a pointer (0xC0 high bits).
        assert!(buf[rr_start..].iter().any(|b| b & 0xC0 == 0xC0));

        // And it round-trips back out to the same SOA fields, minimum included.
        let rdlength = buf.len() - rr_start;
        let decoded = RData::unpack(&buf, QType::SOA.value(), rr_start, rdlength).unwrap();
        assert_eq!(decoded, RData::SOA(soa));
    }

    #[test]
    fn nsec_single_type_window0_roundtrips() {
        let nsec = NsecData {
            next_domain: Name::parse("b.example.com").unwrap(),
            windows: vec![NsecWindow { window: 0, bitmap: vec![0b0100_0000] }], // bit 1 => type NS(2)
        };
        assert!(nsec.has_type(2));
        assert!(!nsec.has_type(1));

        let rdata = RData::NSEC(nsec.clone());
        let bytes = rdata.to_bytes().unwrap();
        let decoded = RData::unpack(&bytes, QType::NSEC.value(), 0, bytes.len()).unwrap();
        assert_eq!(decoded, RData::NSEC(nsec));
    }

    #[test]
    fn nsec_rejects_out_of_order_windows() {
        let mut buf = Vec::new();
        Name::parse("a.example.com").unwrap().encode(&mut buf, 0, None).unwrap();
        buf.push(1); // window 1
        buf.push(1);
        buf.push(0x01);
        buf.push(0); // window 0, out of order
        buf.push(1);
        buf.push(0x01);
        assert!(RData::unpack(&buf, QType::NSEC.value(), 0, buf.len()).is_err());
    }

    #[test]
    fn unknown_type_does_not_panic() {
        let raw = vec![1, 2, 3, 4];
        let decoded = RData::unpack(&raw, 9999, 0, raw.len()).unwrap();
        assert_eq!(decoded, RData::Unknown(9999, raw));
    }

    #[test]
    fn mx_uses_prefix_offset_for_compression_base() {
        let mut dict = Dictionary::new();
        let mut buf = vec![0u8; 12];
        Name::parse("example.com").unwrap().encode(&mut buf, 12, Some(&mut dict)).unwrap();
        let rr_start = buf.len();
        let mx = RData::MX(MxData { preference: 10, exchange: Name::parse("mail.example.com").unwrap() });
        mx.pack(&mut buf, rr_start, Some(&mut dict)).unwrap();
        // byte after the 2-byte preference should start the "mail" label.
        assert_eq!(buf[rr_start + 2], 4);
    }
}
