//! Iterative stub resolver (§4.6): single-shot resolution against a pool,
//! direct resolution against one server, and root-to-authoritative
//! delegation tracing with concurrent glue resolution.
use std::collections::VecDeque;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};

use crate::error::{DNSError, DNSResult};
use crate::message::name::Name;
use crate::message::rdata::RData;
use crate::message::types::{QClass, QType, ResponseCode};
use crate::message::ResourceRecord;
use crate::pool::NameserverPool;
use crate::query::{DtQuery, Query};
use crate::response::Response;
use crate::transport::{Protocol, Transport};
use crate::worker::WorkerHarness;

/// Default bound on delegation steps in `trace` (§6: `-deleg N`, default 24).
pub const DEFAULT_MAX_DELEGATIONS: u32 = 24;

/// Cap on concurrent glue-resolution workers per referral (§4.6.1: "Up to
/// 3 worker coroutines consume the scheduled queries").
const MAX_GLUE_WORKERS: usize = 3;

struct ResolverInner {
    pool: NameserverPool,
    tcp: bool,
    timeout_ms: u64,
    ignore_truncation: bool,
    max_delegations: u32,
}

/// Cheaply `Clone`-able handle (an `Arc` around shared state) so glue
/// resolution can hand clones into worker threads without borrowing issues.
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<ResolverInner>,
}

impl Resolver {
    pub fn new(tcp: bool, timeout_ms: u64, ignore_truncation: bool, max_delegations: u32) -> Self {
        Resolver {
            inner: Arc::new(ResolverInner {
                pool: NameserverPool::new(),
                tcp,
                timeout_ms,
                ignore_truncation,
                max_delegations,
            }),
        }
    }

    pub fn pool(&self) -> &NameserverPool {
        &self.inner.pool
    }

    fn transport(&self) -> Transport {
        let protocol = if self.inner.tcp { Protocol::Tcp } else { Protocol::Udp };
        Transport::new(protocol, self.inner.timeout_ms, self.inner.ignore_truncation)
    }

    /// Picks an upstream from the pool, retrying on transport failure until
    /// the pool drains (§4.6: `resolve`).
    pub fn resolve(&self, query: Query, rd_desired: bool) -> DNSResult<Response> {
        self.resolve_dtquery(DtQuery::new(query, rd_desired))
    }

    /// As `resolve`, but takes a fully-formed `DtQuery` so a caller can set
    /// `aa`/`ad`/`cd` or pin a message id -- `resolve` itself only exposes
    /// `rd_desired` per §4.6's literal signature.
    pub fn resolve_dtquery(&self, dtq: DtQuery) -> DNSResult<Response> {
        loop {
            let entry = self.inner.pool.pick().ok_or(DNSError::NoServers)?;
            let msg = dtq.to_message();
            let peer = SocketAddr::new(entry.addr, entry.port);
            match self.transport().ask(&msg, peer) {
                Ok(reply) => {
                    self.inner.pool.record_success(entry.addr);
                    return Ok(Response::new(dtq, reply));
                }
                Err(e) => {
                    log::debug!("transport failure against {}: {}", peer, e);
                    self.inner.pool.record_failure(entry.addr);
                }
            }
        }
    }

    /// Bypasses the pool entirely and sends directly to `server:port`
    /// (§4.6: `resolve_with`).
    pub fn resolve_with(
        &self,
        query: &Query,
        rd_desired: bool,
        tcp: bool,
        server: IpAddr,
        port: u16,
    ) -> DNSResult<Response> {
        let protocol = if tcp { Protocol::Tcp } else { Protocol::Udp };
        let transport = Transport::new(protocol, self.inner.timeout_ms, self.inner.ignore_truncation);
        let dtq = DtQuery::new(query.clone(), rd_desired);
        let msg = dtq.to_message();
        let reply = transport.ask(&msg, SocketAddr::new(server, port))?;
        Ok(Response::new(dtq, reply))
    }

    /// Iterative root-to-authoritative resolution (§4.6: `trace`). The
    /// pool must already hold at least one bootstrap server (typically a
    /// root hint) for step 1's `resolve` to succeed.
    pub fn trace(&self, query: &Query) -> DNSResult<Response> {
        let root_query = Query { qname: Name::root(), qtype: QType::NS, qclass: QClass::IN };
        let root_resp = self.resolve(root_query, true)?;

        let mut working = self.process_referral(&root_resp.msg.answers, &root_resp.msg.additional);
        if working.is_empty() {
            return Err(DNSError::NoAddresses);
        }

        let mut ns_chain: Vec<ResourceRecord> = Vec::new();

        for _ in 0..self.inner.max_delegations {
            let (addr_rr, reply) = loop {
                let addr_rr = working.pop().ok_or(DNSError::NoServers)?;
                let addr = match &addr_rr.rdata {
                    RData::A(a) => IpAddr::V4(*a),
                    RData::AAAA(a) => IpAddr::V6(*a),
                    _ => continue,
                };
                let dtq = DtQuery::new(query.clone(), true);
                let msg = dtq.to_message();
                let peer = SocketAddr::new(addr, 53);
                match self.transport().ask(&msg, peer) {
                    Ok(reply) => break (addr_rr, reply),
                    Err(e) => {
                        log::debug!("trace: skipping {} after transport error: {}", peer, e);
                        continue;
                    }
                }
            };

            ns_chain.push(addr_rr);

            if reply.flags.rcode != ResponseCode::NoError {
                return Err(DNSError::Rcode(reply.flags.rcode));
            }

            if !reply.answers.is_empty() && reply.flags.aa {
                let mut resp = Response::new(DtQuery::new(query.clone(), true), reply);
                resp.ns_chain = ns_chain;
                return Ok(resp);
            }

            let next = self.process_referral(&reply.authority, &reply.additional);
            if next.is_empty() {
                return Err(DNSError::NoAddresses);
            }
            working = next;
        }

        Err(DNSError::MaxDelegations(self.inner.max_delegations))
    }

    /// Referral processing (§4.6.1): glue where available, parallel A/AAAA
    /// resolution via the worker harness otherwise.
    fn process_referral(
        &self,
        authority: &[ResourceRecord],
        additional: &[ResourceRecord],
    ) -> Vec<ResourceRecord> {
        let mut output = Vec::new();
        let mut need_resolution: Vec<Name> = Vec::new();

        for rr in authority {
            let Some(target) = referral_target_name(rr) else { continue };
            let glue: Vec<ResourceRecord> = additional
                .iter()
                .filter(|a| a.name == target && matches!(a.rtype, QType::A | QType::AAAA))
                .cloned()
                .collect();
            if glue.is_empty() {
                need_resolution.push(target);
            } else {
                output.extend(glue);
            }
        }

        if !need_resolution.is_empty() {
            output.extend(self.resolve_glue_parallel(&need_resolution));
        }

        output
    }

    fn resolve_glue_parallel(&self, names: &[Name]) -> Vec<ResourceRecord> {
        let mut tasks: VecDeque<(Name, QType)> = VecDeque::new();
        for name in names {
            tasks.push_back((name.clone(), QType::A));
            tasks.push_back((name.clone(), QType::AAAA));
        }
        let worker_count = tasks.len().min(MAX_GLUE_WORKERS).max(1);
        let tasks = Arc::new(Mutex::new(tasks));
        let results: Arc<Mutex<Vec<ResourceRecord>>> = Arc::new(Mutex::new(Vec::new()));

        let resolver = self.clone();
        let tasks_for_bg = Arc::clone(&tasks);
        let results_for_fg = Arc::clone(&results);

        let harness: WorkerHarness<ResourceRecord> = WorkerHarness::spawn(
            worker_count,
            0,
            move |_cancel, _idx| match tasks_for_bg.lock().unwrap().pop_front() {
                None => (None, true),
                Some((name, qtype)) => {
                    let query = Query { qname: name, qtype, qclass: QClass::IN };
                    let found = resolver
                        .resolve(query, true)
                        .ok()
                        .and_then(|resp| resp.msg.answers.into_iter().find(|rr| matches!(rr.rtype, QType::A | QType::AAAA)));
                    (found, false)
                }
            },
            move |rr: ResourceRecord| {
                results_for_fg.lock().unwrap().push(rr);
            },
        );
        harness.wait();

        Arc::try_unwrap(results).map(|m| m.into_inner().unwrap()).unwrap_or_default()
    }

    /// `get_domain_addrs` (§4.6.2): A then AAAA (unless `v4_only`),
    /// flattened into addresses.
    pub fn get_domain_addrs(&self, name: &Name, class: QClass, v4_only: bool) -> DNSResult<Vec<IpAddr>> {
        let mut out = Vec::new();

        let a_query = Query { qname: name.clone(), qtype: QType::A, qclass: class };
        if let Ok(resp) = self.resolve(a_query, true) {
            for rr in &resp.msg.answers {
                if let RData::A(addr) = rr.rdata {
                    out.push(IpAddr::V4(addr));
                }
            }
        }

        if !v4_only {
            let aaaa_query = Query { qname: name.clone(), qtype: QType::AAAA, qclass: class };
            if let Ok(resp) = self.resolve(aaaa_query, true) {
                for rr in &resp.msg.answers {
                    if let RData::AAAA(addr) = rr.rdata {
                        out.push(IpAddr::V6(addr));
                    }
                }
            }
        }

        if out.is_empty() {
            return Err(DNSError::NoAddresses);
        }
        Ok(out)
    }

    /// `get_soa_addr` (§4.6.2): resolves SOA, then the Mname's address.
    pub fn get_soa_addr(&self, name: &Name, class: QClass) -> DNSResult<IpAddr> {
        let soa_query = Query { qname: name.clone(), qtype: QType::SOA, qclass: class };
        let resp = self.resolve(soa_query, true)?;
        let mname = resp
            .msg
            .answers
            .iter()
            .find_map(|rr| match &rr.rdata {
                RData::SOA(soa) => Some(soa.mname.clone()),
                _ => None,
            })
            .ok_or(DNSError::NoAddresses)?;
        let addrs = self.get_domain_addrs(&mname, class, false)?;
        addrs.into_iter().next().ok_or(DNSError::NoAddresses)
    }
}

/// Extracts the name a referring RR points at, if it's one of the types
/// §4.6.1 treats as selecting a nameserver/mail host (NS, MD, MF, MB, MX).
fn referral_target_name(rr: &ResourceRecord) -> Option<Name> {
    match &rr.rdata {
        RData::NS(n) | RData::MD(n) | RData::MF(n) | RData::MB(n) => Some(n.clone()),
        RData::MX(mx) => Some(mx.exchange.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn process_referral_prefers_glue_over_network_resolution() {
        let resolver = Resolver::new(false, 800, false, DEFAULT_MAX_DELEGATIONS);
        let ns_name = Name::parse("ns1.example.com").unwrap();
        let authority = vec![ResourceRecord {
            name: Name::parse("example.com").unwrap(),
            rtype: QType::NS,
            rclass: QClass::IN,
            ttl: 3600,
            rdata: RData::NS(ns_name.clone()),
        }];
        let additional = vec![ResourceRecord {
            name: ns_name.clone(),
            rtype: QType::A,
            rclass: QClass::IN,
            ttl: 3600,
            rdata: RData::A(Ipv4Addr::new(192, 0, 2, 53)),
        }];

        let result = resolver.process_referral(&authority, &additional);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, ns_name);
    }

    #[test]
    fn referral_target_name_covers_ns_and_mx() {
        let name = Name::parse("mail.example.com").unwrap();
        let ns_rr = ResourceRecord {
            name: Name::parse("example.com").unwrap(),
            rtype: QType::NS,
            rclass: QClass::IN,
            ttl: 1,
            rdata: RData::NS(name.clone()),
        };
        assert_eq!(referral_target_name(&ns_rr), Some(name.clone()));

        let mx_rr = ResourceRecord {
            name: Name::parse("example.com").unwrap(),
            rtype: QType::MX,
            rclass: QClass::IN,
            ttl: 1,
            rdata: RData::MX(crate::message::rdata::MxData { preference: 10, exchange: name.clone() }),
        };
        assert_eq!(referral_target_name(&mx_rr), Some(name));
    }

    #[test]
    fn resolve_fails_with_no_servers_on_empty_pool() {
        let resolver = Resolver::new(false, 800, false, DEFAULT_MAX_DELEGATIONS);
        let query = Query::new("example.com", QType::A, QClass::IN).unwrap();
        let err = resolver.resolve(query, true).unwrap_err();
        assert!(matches!(err, DNSError::NoServers));
    }
}
