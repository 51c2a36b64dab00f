//! `-mode walk`: NSEC zone walking -- starting from a name, repeatedly
//! query for the next NSEC record and follow `next_domain` until it cycles
//! back to the start (§10.5, GLOSSARY "NSEC walk").
use std::collections::HashSet;

use dnslib::error::DNSResult;
use dnslib::message::name::Name;
use dnslib::message::rdata::RData;
use dnslib::message::types::QType;
use dnslib::query::Query;

use super::ActionContext;

/// Guards against a misbehaving/NSEC-less zone producing an infinite walk.
const MAX_STEPS: usize = 100_000;

pub fn run(ctx: &ActionContext) -> DNSResult<()> {
    let start = Name::parse(&ctx.options.domain)?;
    let mut current = start.clone();
    let mut visited: HashSet<Name> = HashSet::new();

    for _ in 0..MAX_STEPS {
        let query = Query { qname: current.clone(), qtype: QType::NSEC, qclass: ctx.options.qclass };
        let resp = ctx.resolver.resolve(query, true)?;

        let next_domain = resp.msg.answers.iter().find_map(|rr| match &rr.rdata {
            RData::NSEC(n) => Some(n.next_domain.clone()),
            _ => None,
        });

        let Some(next_domain) = next_domain else {
            println!("[!] no NSEC record at {}, stopping walk", current);
            break;
        };

        println!("{}", current);

        if !visited.insert(current.clone()) {
            println!("[!] revisited {}, zone walk complete", current);
            break;
        }
        if next_domain == start {
            println!("[+] walk cycled back to {}", start);
            break;
        }
        current = next_domain;
    }

    Ok(())
}
