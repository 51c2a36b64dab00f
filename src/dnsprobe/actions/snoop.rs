//! `-mode snoop`: sends a non-recursive (RD=0) query per dictionary entry
//! against a single target server to probe its cache (§10.5).
use dnslib::error::{DNSError, DNSResult};
use dnslib::query::Query;

use super::ActionContext;
use crate::loaders::load_dictionary;

pub fn run(ctx: &ActionContext) -> DNSResult<()> {
    let dict_path = ctx.options.dict.as_ref().ok_or(DNSError::DictionaryEmpty)?;
    let entries = load_dictionary(dict_path)?;
    let target = ctx.resolver.pool().pick().ok_or(DNSError::NoServers)?;

    for name in entries {
        let query = match Query::new(&name, ctx.options.qtype, ctx.options.qclass) {
            Ok(q) => q,
            Err(e) => {
                println!("[X] {}: {}", name, e);
                continue;
            }
        };
        match ctx.resolver.resolve_with(&query, false, ctx.options.tcp, target.addr, target.port) {
            Ok(resp) if resp.has_answers() => {
                println!("[+] {} appears cached on {}", name, target.addr)
            }
            Ok(_) => println!("[!] {} not cached on {}", name, target.addr),
            Err(e) => println!("[X] {}: {}", name, e),
        }
    }

    Ok(())
}
