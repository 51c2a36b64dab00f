//! `-mode dnsbl`: reverses an IPv4 address into `in-addr.arpa` form,
//! appends each configured blacklist zone, and resolves as A/TXT to detect
//! listing (§10.5; SPEC_FULL.md:334). A positive A hit triggers a follow-up
//! TXT query for the blacklist's human-readable listing reason, matching
//! `original_source/action/dnsbl.go`'s `worker` function.
use std::net::Ipv4Addr;

use dnslib::error::{DNSError, DNSResult};
use dnslib::message::rdata::RData;
use dnslib::message::types::{QClass, QType};
use dnslib::query::Query;

use super::ActionContext;

/// Well-known public blacklist zones, queried when `-dict` isn't supplied.
const DEFAULT_ZONES: &[&str] = &["zen.spamhaus.org", "bl.spamcop.net"];

pub fn run(ctx: &ActionContext) -> DNSResult<()> {
    let addr: Ipv4Addr = ctx
        .options
        .domain
        .parse()
        .map_err(|_| DNSError::new("dnsbl mode requires an IPv4 address as the target"))?;
    let reversed = reverse_ipv4(addr);

    let zones: Vec<String> = match &ctx.options.dict {
        Some(path) => crate::loaders::load_dictionary(path)?,
        None => DEFAULT_ZONES.iter().map(|z| z.to_string()).collect(),
    };

    for zone in zones {
        let qname = format!("{}.{}", reversed, zone);
        let query = Query::new(&qname, QType::A, QClass::IN)?;
        match ctx.resolver.resolve(query, true) {
            Ok(resp) if resp.has_answers() => {
                let reason = lookup_reason(ctx, &qname);
                match reason {
                    Some(text) => println!("[+] {} is listed on {} with info:\n\t{}", addr, zone, text),
                    None => println!("[+] {} is listed on {}", addr, zone),
                }
            }
            Ok(_) => println!("[!] {} not listed on {}", addr, zone),
            Err(e) => println!("[X] {}: {}", zone, e),
        }
    }

    Ok(())
}

/// Follow-up TXT query issued on a positive A hit to fetch the blacklist's
/// human-readable listing reason, if it publishes one.
fn lookup_reason(ctx: &ActionContext, qname: &str) -> Option<String> {
    let query = Query::new(qname, QType::TXT, QClass::IN).ok()?;
    let resp = ctx.resolver.resolve(query, true).ok()?;
    resp.msg.answers.iter().find_map(|rr| match &rr.rdata {
        RData::TXT(strings) => {
            Some(strings.iter().map(|s| String::from_utf8_lossy(s).into_owned()).collect::<Vec<_>>().join(" "))
        }
        _ => None,
    })
}

fn reverse_ipv4(addr: Ipv4Addr) -> String {
    let o = addr.octets();
    format!("{}.{}.{}.{}", o[3], o[2], o[1], o[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverses_octets() {
        assert_eq!(reverse_ipv4(Ipv4Addr::new(192, 0, 2, 1)), "1.2.0.192");
    }
}
