//! CLI entry point: argument parsing, resolver/pool construction from
//! `-ns`/`-list`, and dispatch to either a single `resolve`/`trace` call or
//! an action runner selected by `-mode` (§11).
use std::net::IpAddr;
use std::process::ExitCode;

use log::debug;

use dnslib::error::DNSResult;
use dnslib::query::{DtQuery, Query};
use dnslib::resolver::Resolver;

mod actions;
mod args;
mod display;
mod loaders;

use actions::ActionContext;
use args::{parse_server_addr, CliOptions};
use display::DisplayWrapper;

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[X] {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> DNSResult<()> {
    let options = CliOptions::options()?;
    debug!("options: {:?}", &options);
    if options.debug {
        eprintln!("{:#?}", options);
    }

    let resolver = Resolver::new(options.tcp, options.timeout, options.ignore, options.deleg);
    seed_pool(&resolver, &options)?;

    if let Some(mode) = options.mode.clone() {
        let ctx = ActionContext { resolver: &resolver, options: &options };
        return actions::dispatch(&mode, &ctx);
    }

    let query = Query::new(&options.domain, options.qtype, options.qclass)?;
    let rd = !options.nord;

    if options.trace {
        let resp = resolver.trace(&query)?;
        println!("[+] trace via {} delegation step(s)", resp.ns_chain.len());
        println!("{}", DisplayWrapper(&resp.msg));
    } else {
        let dtq = DtQuery::new(query, rd).with_aa(options.aa).with_ad(options.ad).with_cd(options.cd);
        let resp = resolver.resolve_dtquery(dtq)?;
        println!("{}", DisplayWrapper(&resp.msg));
    }

    Ok(())
}

fn seed_pool(resolver: &Resolver, options: &CliOptions) -> DNSResult<()> {
    for ns in &options.ns {
        let (addr, port) = parse_server_addr(ns)?;
        resolver.pool().add(addr, port);
    }

    if let Some(list_path) = &options.list {
        for (addr, port) in loaders::load_nameserver_list(list_path)? {
            resolver.pool().add(addr, port);
        }
    }

    if resolver.pool().is_empty() {
        // Fall back to a well-known public resolver rather than reading
        // /etc/resolv.conf (explicitly out of scope, §1).
        let fallback: IpAddr = "1.1.1.1".parse().unwrap();
        resolver.pool().add(fallback, 53);
    }

    Ok(())
}
