//! Human-readable formatting of parsed messages and records, carried over
//! from the teacher's `DisplayWrapper` pattern and generalized to the full
//! RDATA registry -- every variant has a display case, the catch-all falls
//! back to a hex dump rather than `unimplemented!()`.
use std::fmt;

use dnslib::message::rdata::RData;
use dnslib::message::types::algo2str;
use dnslib::message::{Message, ResourceRecord};

pub struct DisplayWrapper<'a, T>(pub &'a T);

impl fmt::Display for DisplayWrapper<'_, Message> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = self.0;
        writeln!(
            f,
            "id:{:04x} qr:{} opcode:{} aa:{} tc:{} rd:{} ra:{} ad:{} cd:{} rcode:{} ({})",
            msg.header.id,
            msg.flags.qr,
            msg.flags.opcode,
            msg.flags.aa,
            msg.flags.tc,
            msg.flags.rd,
            msg.flags.ra,
            msg.flags.ad,
            msg.flags.cd,
            msg.flags.rcode,
            msg.flags.rcode.message(),
        )?;
        writeln!(
            f,
            ";; qd:{} an:{} ns:{} ar:{}",
            msg.questions.len(),
            msg.answers.len(),
            msg.authority.len(),
            msg.additional.len()
        )?;
        for q in &msg.questions {
            writeln!(f, ";; QUESTION: {} {} {}", q.qname, q.qclass, q.qtype)?;
        }
        for (label, section) in [
            ("ANSWER", &msg.answers),
            ("AUTHORITY", &msg.authority),
            ("ADDITIONAL", &msg.additional),
        ] {
            if !section.is_empty() {
                writeln!(f, ";; {} SECTION:", label)?;
                for rr in section {
                    writeln!(f, "{}", DisplayWrapper(rr))?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for DisplayWrapper<'_, ResourceRecord> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rr = self.0;
        write!(f, "{}\t{}\t{}\t{}\t", rr.name, rr.ttl, rr.rclass, rr.rtype)?;
        write!(f, "{}", DisplayWrapper(&rr.rdata))
    }
}

impl fmt::Display for DisplayWrapper<'_, RData> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            RData::A(addr) => write!(f, "{}", addr),
            RData::AAAA(addr) => write!(f, "{}", addr),
            RData::NS(n) | RData::CNAME(n) | RData::PTR(n) | RData::DNAME(n) | RData::MB(n)
            | RData::MD(n) | RData::MF(n) | RData::MG(n) | RData::MR(n) => write!(f, "{}", n),
            RData::SOA(soa) => write!(
                f,
                "{} {} {} {} {} {} {}",
                soa.mname, soa.rname, soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum
            ),
            RData::MX(mx) => write!(f, "{} {}", mx.preference, mx.exchange),
            RData::TXT(strings) => {
                let rendered: Vec<String> = strings
                    .iter()
                    .map(|s| format!("\"{}\"", String::from_utf8_lossy(s)))
                    .collect();
                write!(f, "{}", rendered.join(" "))
            }
            RData::HINFO(h) => write!(
                f,
                "\"{}\" \"{}\"",
                String::from_utf8_lossy(&h.cpu),
                String::from_utf8_lossy(&h.os)
            ),
            RData::MINFO(m) => write!(f, "{} {}", m.rmailbx, m.emailbx),
            RData::NULL(raw) => write!(f, "\\# {} {}", raw.len(), hex(raw)),
            RData::WKS(wks) => write!(f, "{} {} {}", wks.address, wks.protocol, hex(&wks.bitmap)),
            RData::SRV(srv) => write!(f, "{} {} {} {}", srv.priority, srv.weight, srv.port, srv.target),
            RData::NAPTR(naptr) => write!(
                f,
                "{} {} \"{}\" \"{}\" \"{}\" {}",
                naptr.order,
                naptr.preference,
                String::from_utf8_lossy(&naptr.flags),
                String::from_utf8_lossy(&naptr.services),
                String::from_utf8_lossy(&naptr.regexp),
                naptr.replacement
            ),
            RData::DHCID(raw) => write!(f, "{}", hex(raw)),
            RData::RP(rp) => write!(f, "{} {}", rp.mbox, rp.txt),
            RData::AFSDB(afsdb) => write!(f, "{} {}", afsdb.subtype, afsdb.hostname),
            RData::LOC(loc) => write!(
                f,
                "v{} size:{} horiz:{} vert:{} lat:{} lon:{} alt:{}",
                loc.version, loc.size, loc.horiz_pre, loc.vert_pre, loc.latitude, loc.longitude, loc.altitude
            ),
            RData::NSEC(nsec) => write!(f, "{} ({} window(s))", nsec.next_domain, nsec.windows.len()),
            RData::DNSKEY(key) => write!(
                f,
                "{} {} {} ({}) {}",
                key.flags,
                key.protocol,
                key.algorithm,
                algo2str(key.algorithm),
                hex(&key.public_key)
            ),
            RData::Unknown(t, raw) => write!(f, "TYPE{} \\# {} {}", t, raw.len(), hex(raw)),
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    dnslib::format_buffer!("X", bytes)
}
