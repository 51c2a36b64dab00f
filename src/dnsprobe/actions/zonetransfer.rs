//! `-mode zt`: issues an AXFR query over TCP against the domain's NS
//! servers, trying each resolved nameserver in turn until one permits the
//! transfer (§10.5; `original_source/action/zt.go`'s `Exec`/`transfer` pair
//! retries across every NS RR rather than giving up on the first refusal).
use dnslib::error::{DNSError, DNSResult};
use dnslib::message::name::Name;
use dnslib::message::rdata::RData;
use dnslib::message::types::QType;
use dnslib::query::Query;

use super::ActionContext;
use crate::display::DisplayWrapper;

pub fn run(ctx: &ActionContext) -> DNSResult<()> {
    let name = Name::parse(&ctx.options.domain)?;
    let class = ctx.options.qclass;

    let ns_query = Query { qname: name.clone(), qtype: QType::NS, qclass: class };
    let ns_resp = ctx.resolver.resolve(ns_query, true)?;
    if ns_resp.msg.answers.is_empty() {
        return Err(DNSError::new(&format!("no NS servers found for {}", name)));
    }

    for rr in &ns_resp.msg.answers {
        let RData::NS(ns_name) = &rr.rdata else { continue };

        let addr = match ctx.resolver.get_domain_addrs(ns_name, class, false) {
            Ok(addrs) => addrs[0],
            Err(e) => {
                println!("[!] could not resolve {}: {}", ns_name, e);
                continue;
            }
        };

        println!("[!] trying zone transfer on {} ({})...", ns_name, addr);
        let query = Query { qname: name.clone(), qtype: QType::AXFR, qclass: class };
        match ctx.resolver.resolve_with(&query, false, true, addr, 53) {
            Ok(resp) if !resp.msg.answers.is_empty() => {
                println!("[+] zone transfer succeeded on {} ({})", ns_name, addr);
                for answer in &resp.msg.answers {
                    println!("{}", DisplayWrapper(answer));
                }
                return Ok(());
            }
            Ok(_) => println!("[!] {} returned no records", ns_name),
            Err(e) => println!("[!] {} refused: {}", ns_name, e),
        }
    }

    Err(DNSError::new("zone transfer failed on every NS server"))
}
