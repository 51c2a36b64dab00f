//! RFC1035 message codec: header, flags, resource records, and the full
//! message pack/unpack orchestration sharing one compression dictionary.
pub mod name;
pub mod rdata;
pub mod types;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{DNSError, DNSResult};
use crate::message::name::{Dictionary, Name};
use crate::message::rdata::RData;
use crate::message::types::{OpCode, QClass, QType, ResponseCode};

const HEADER_LEN: usize = 12;

/// The 16 flag/opcode/rcode bits that follow the ID in the header, laid out
/// MSB-first exactly as the wire does: QR(15) OPCODE(11-14) AA(10) TC(9)
/// RD(8) RA(7) Z(6) AD(5) CD(4) RCODE(0-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    pub qr: bool,
    pub opcode: OpCode,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub z: bool,
    pub ad: bool,
    pub cd: bool,
    pub rcode: ResponseCode,
}

impl Flags {
    pub fn to_u16(&self) -> u16 {
        let mut v: u16 = 0;
        if self.qr {
            v |= 1 << 15;
        }
        v |= (self.opcode.value() & 0x0F) << 11;
        if self.aa {
            v |= 1 << 10;
        }
        if self.tc {
            v |= 1 << 9;
        }
        if self.rd {
            v |= 1 << 8;
        }
        if self.ra {
            v |= 1 << 7;
        }
        if self.z {
            v |= 1 << 6;
        }
        if self.ad {
            v |= 1 << 5;
        }
        if self.cd {
            v |= 1 << 4;
        }
        v |= self.rcode.value() & 0x0F;
        v
    }

    pub fn from_u16(v: u16) -> Self {
        Flags {
            qr: v & (1 << 15) != 0,
            opcode: OpCode::from_value((v >> 11) & 0x0F),
            aa: v & (1 << 10) != 0,
            tc: v & (1 << 9) != 0,
            rd: v & (1 << 8) != 0,
            ra: v & (1 << 7) != 0,
            z: v & (1 << 6) != 0,
            ad: v & (1 << 5) != 0,
            cd: v & (1 << 4) != 0,
            rcode: ResponseCode::from_value(v & 0x0F),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub id: u16,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub qname: Name,
    pub qtype: QType,
    pub qclass: QClass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    pub name: Name,
    pub rtype: QType,
    pub rclass: QClass,
    pub ttl: u32,
    pub rdata: RData,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    pub header: Header,
    pub flags: Flags,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
}

impl Message {
    pub fn new() -> Self {
        Message::default()
    }

    /// Builds a fresh query message for `qname`/`qtype`/`qclass` with a
    /// random ID and RD set according to `rd_desired`.
    pub fn new_query(id: u16, qname: Name, qtype: QType, qclass: QClass, rd_desired: bool) -> Self {
        let mut msg = Message::new();
        msg.header.id = id;
        msg.header.qdcount = 1;
        msg.flags.rd = rd_desired;
        msg.flags.opcode = OpCode::Query;
        msg.questions.push(Question { qname, qtype, qclass });
        msg
    }

    /// Serializes the full message, patching each RR's rdlength once its
    /// RDATA is packed and maintaining one compression dictionary across
    /// the whole message (questions and all three RR sections share it).
    pub fn pack(&self) -> DNSResult<Vec<u8>> {
        let mut buffer = Vec::with_capacity(512);
        buffer.extend_from_slice(&self.header.id.to_be_bytes());
        buffer.extend_from_slice(&self.flags.to_u16().to_be_bytes());
        buffer.extend_from_slice(&(self.questions.len() as u16).to_be_bytes());
        buffer.extend_from_slice(&(self.answers.len() as u16).to_be_bytes());
        buffer.extend_from_slice(&(self.authority.len() as u16).to_be_bytes());
        buffer.extend_from_slice(&(self.additional.len() as u16).to_be_bytes());
        debug_assert_eq!(buffer.len(), HEADER_LEN);

        let mut dict = Dictionary::new();

        for q in &self.questions {
            q.qname.encode(&mut buffer, buffer.len(), Some(&mut dict))?;
            buffer.extend_from_slice(&q.qtype.value().to_be_bytes());
            buffer.extend_from_slice(&q.qclass.value().to_be_bytes());
        }

        for section in [&self.answers, &self.authority, &self.additional] {
            for rr in section {
                pack_rr(&mut buffer, rr, &mut dict)?;
            }
        }

        Ok(buffer)
    }

    /// Deserializes a full message from `buf`. Section counts in the
    /// header drive how many questions/RRs are read; a section that claims
    /// more records than the buffer holds is a protocol error, not a panic.
    pub fn unpack(buf: &[u8]) -> DNSResult<Self> {
        if buf.len() < HEADER_LEN {
            return Err(DNSError::Protocol("message shorter than header".into()));
        }
        let id = BigEndian::read_u16(&buf[0..2]);
        let flags = Flags::from_u16(BigEndian::read_u16(&buf[2..4]));
        let qdcount = BigEndian::read_u16(&buf[4..6]);
        let ancount = BigEndian::read_u16(&buf[6..8]);
        let nscount = BigEndian::read_u16(&buf[8..10]);
        let arcount = BigEndian::read_u16(&buf[10..12]);

        let mut pos = HEADER_LEN;
        let mut questions = Vec::with_capacity(qdcount as usize);
        for _ in 0..qdcount {
            let (qname, after_name) = Name::decode(buf, pos)?;
            if after_name + 4 > buf.len() {
                return Err(DNSError::Protocol("question truncated".into()));
            }
            let qtype = QType::from_value(BigEndian::read_u16(&buf[after_name..after_name + 2]));
            let qclass = QClass::from_value(BigEndian::read_u16(&buf[after_name + 2..after_name + 4]));
            questions.push(Question { qname, qtype, qclass });
            pos = after_name + 4;
        }

        let mut answers = Vec::with_capacity(ancount as usize);
        for _ in 0..ancount {
            let (rr, next) = unpack_rr(buf, pos)?;
            answers.push(rr);
            pos = next;
        }

        let mut authority = Vec::with_capacity(nscount as usize);
        for _ in 0..nscount {
            let (rr, next) = unpack_rr(buf, pos)?;
            authority.push(rr);
            pos = next;
        }

        let mut additional = Vec::with_capacity(arcount as usize);
        for _ in 0..arcount {
            let (rr, next) = unpack_rr(buf, pos)?;
            additional.push(rr);
            pos = next;
        }

        Ok(Message {
            header: Header { id, qdcount, ancount, nscount, arcount },
            flags,
            questions,
            answers,
            authority,
            additional,
        })
    }
}

fn pack_rr(buffer: &mut Vec<u8>, rr: &ResourceRecord, dict: &mut Dictionary) -> DNSResult<()> {
    rr.name.encode(buffer, buffer.len(), Some(dict))?;
    buffer.extend_from_slice(&rr.rtype.value().to_be_bytes());
    buffer.extend_from_slice(&rr.rclass.value().to_be_bytes());
    buffer.extend_from_slice(&rr.ttl.to_be_bytes());

    let rdlength_pos = buffer.len();
    buffer.extend_from_slice(&[0, 0]); // placeholder, patched below
    let rdata_offset = buffer.len();
    let written = rr.rdata.pack(buffer, rdata_offset, Some(dict))?;
    BigEndian::write_u16(&mut buffer[rdlength_pos..rdlength_pos + 2], written as u16);
    Ok(())
}

fn unpack_rr(buf: &[u8], pos: usize) -> DNSResult<(ResourceRecord, usize)> {
    let (name, after_name) = Name::decode(buf, pos)?;
    if after_name + 10 > buf.len() {
        return Err(DNSError::Protocol("resource record header truncated".into()));
    }
    let rtype_val = BigEndian::read_u16(&buf[after_name..after_name + 2]);
    let rclass = QClass::from_value(BigEndian::read_u16(&buf[after_name + 2..after_name + 4]));
    let ttl = BigEndian::read_u32(&buf[after_name + 4..after_name + 8]);
    let rdlength = BigEndian::read_u16(&buf[after_name + 8..after_name + 10]) as usize;
    let rdata_start = after_name + 10;
    if rdata_start + rdlength > buf.len() {
        return Err(DNSError::Protocol("rdlength exceeds message bounds".into()));
    }
    let rdata = RData::unpack(buf, rtype_val, rdata_start, rdlength)?;
    let rr = ResourceRecord { name, rtype: QType::from_value(rtype_val), rclass, ttl, rdata };
    Ok((rr, rdata_start + rdlength))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::rdata::{RData, SoaData};
    use std::net::Ipv4Addr;

    #[test]
    fn query_message_roundtrip() {
        let msg = Message::new_query(
            0x1234,
            Name::parse("example.com").unwrap(),
            QType::A,
            QClass::IN,
            true,
        );
        let bytes = msg.pack().unwrap();
        let decoded = Message::unpack(&bytes).unwrap();
        assert_eq!(decoded.header.id, 0x1234);
        assert_eq!(decoded.header.qdcount, 1);
        assert!(decoded.flags.rd);
        assert!(!decoded.flags.qr);
        assert_eq!(decoded.questions[0].qname.to_string(), "example.com");
        assert_eq!(decoded.questions[0].qtype, QType::A);
    }

    #[test]
    fn response_with_answer_and_additional_glue_roundtrips() {
        let mut msg = Message::new();
        msg.header.id = 42;
        msg.flags.qr = true;
        msg.flags.aa = true;
        msg.header.qdcount = 1;
        msg.questions.push(Question {
            qname: Name::parse("example.com").unwrap(),
            qtype: QType::NS,
            qclass: QClass::IN,
        });
        msg.authority.push(ResourceRecord {
            name: Name::parse("example.com").unwrap(),
            rtype: QType::NS,
            rclass: QClass::IN,
            ttl: 3600,
            rdata: RData::NS(Name::parse("ns1.example.com").unwrap()),
        });
        msg.additional.push(ResourceRecord {
            name: Name::parse("ns1.example.com").unwrap(),
            rtype: QType::A,
            rclass: QClass::IN,
            ttl: 3600,
            rdata: RData::A(Ipv4Addr::new(192, 0, 2, 1)),
        });

        let bytes = msg.pack().unwrap();
        // The glue A record's owner name ("ns1.example.com") should compress
        // against the NS rdata written just before it.
        let decoded = Message::unpack(&bytes).unwrap();
        assert_eq!(decoded.authority.len(), 1);
        assert_eq!(decoded.additional.len(), 1);
        assert_eq!(decoded.additional[0].name.to_string(), "ns1.example.com");
        match &decoded.additional[0].rdata {
            RData::A(addr) => assert_eq!(*addr, Ipv4Addr::new(192, 0, 2, 1)),
            other => panic!("expected A, got {:?}", other),
        }
    }

    #[test]
    fn soa_answer_roundtrips_through_full_message() {
        let mut msg = Message::new();
        msg.header.id = 7;
        msg.flags.qr = true;
        msg.header.qdcount = 1;
        msg.questions.push(Question {
            qname: Name::parse("example.com").unwrap(),
            qtype: QType::SOA,
            qclass: QClass::IN,
        });
        msg.answers.push(ResourceRecord {
            name: Name::parse("example.com").unwrap(),
            rtype: QType::SOA,
            rclass: QClass::IN,
            ttl: 3600,
            rdata: RData::SOA(SoaData {
                mname: Name::parse("ns.example.com").unwrap(),
                rname: Name::parse("hostmaster.example.com").unwrap(),
                serial: 2024010100,
                refresh: 7200,
                retry: 3600,
                expire: 1209600,
                minimum: 300,
            }),
        });

        let bytes = msg.pack().unwrap();
        let decoded = Message::unpack(&bytes).unwrap();
        match &decoded.answers[0].rdata {
            RData::SOA(soa) => assert_eq!(soa.minimum, 300),
            other => panic!("expected SOA, got {:?}", other),
        }
    }

    #[test]
    fn truncated_message_rejected_not_panicked() {
        let msg = Message::new_query(1, Name::parse("a.com").unwrap(), QType::A, QClass::IN, true);
        let mut bytes = msg.pack().unwrap();
        bytes.truncate(bytes.len() - 3);
        assert!(Message::unpack(&bytes).is_err());
    }
}
