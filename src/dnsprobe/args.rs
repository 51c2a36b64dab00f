//! Manage command line arguments here.
use std::net::IpAddr;
use std::str::FromStr;

use clap::{App, Arg};

use dnslib::error::DNSResult;
use dnslib::message::types::{QClass, QType};

/// This structure holds the command line arguments (§6 flag table).
#[derive(Debug)]
pub struct CliOptions {
    pub domain: String,
    pub qtype: QType,
    pub qclass: QClass,
    pub aa: bool,
    pub ad: bool,
    pub cd: bool,
    pub nord: bool,
    pub ignore: bool,
    pub tcp: bool,
    pub trace: bool,
    pub timeout: u64,
    pub delay: u64,
    pub workers: usize,
    pub deleg: u32,
    pub ns: Vec<String>,
    pub list: Option<String>,
    pub dict: Option<String>,
    pub mode: Option<String>,
    pub debug: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        CliOptions {
            domain: String::new(),
            qtype: QType::A,
            qclass: QClass::IN,
            aa: false,
            ad: false,
            cd: false,
            nord: false,
            ignore: false,
            tcp: false,
            trace: false,
            timeout: 800,
            delay: 0,
            workers: 1,
            deleg: 24,
            ns: Vec::new(),
            list: None,
            dict: None,
            mode: None,
            debug: false,
        }
    }
}

impl CliOptions {
    pub fn options() -> DNSResult<Self> {
        let matches = App::new("dnsprobe")
            .version("0.1")
            .about("A DNS reconnaissance tool: queries, iterative trace, and batched probing actions")
            .arg(
                Arg::new("domain")
                    .required(true)
                    .long_help("Domain name to query")
                    .takes_value(true),
            )
            .arg(Arg::new("type").long("type").long_help("Question type").takes_value(true).default_value("A"))
            .arg(Arg::new("class").long("class").long_help("Question class").takes_value(true).default_value("IN"))
            .arg(Arg::new("aa").long("aa").long_help("Set the AA flag on the query").takes_value(false))
            .arg(Arg::new("ad").long("ad").long_help("Set the AD flag on the query").takes_value(false))
            .arg(Arg::new("cd").long("cd").long_help("Set the CD flag on the query").takes_value(false))
            .arg(Arg::new("nord").long("nord").long_help("Clear RD on the query").takes_value(false))
            .arg(Arg::new("ignore").long("ignore").long_help("Disable UDP to TCP truncation fallback").takes_value(false))
            .arg(Arg::new("tcp").long("tcp").long_help("Use TCP as the default protocol").takes_value(false))
            .arg(Arg::new("trace").long("trace").long_help("Use iterative root-to-authoritative trace").takes_value(false))
            .arg(Arg::new("timeout").long("timeout").long_help("Per-read deadline in ms").takes_value(true).default_value("800"))
            .arg(Arg::new("delay").long("delay").long_help("Inter-request delay in ms for batched actions").takes_value(true).default_value("0"))
            .arg(Arg::new("workers").long("workers").long_help("Worker count for batched actions").takes_value(true).default_value("1"))
            .arg(Arg::new("deleg").long("deleg").long_help("Max delegation depth in trace mode").takes_value(true).default_value("24"))
            .arg(Arg::new("ns").long("ns").long_help("Add an upstream nameserver (repeatable)").takes_value(true).multiple_occurrences(true))
            .arg(Arg::new("list").long("list").long_help("Load upstream nameservers from a file").takes_value(true))
            .arg(Arg::new("dict").long("dict").long_help("Dictionary file for batched actions").takes_value(true))
            .arg(Arg::new("mode").long("mode").long_help("Batched action: enum, snoop, zt, walk, dnsbl").takes_value(true))
            .arg(Arg::new("debug").short('g').long("debug").long_help("Debug mode").takes_value(false))
            .get_matches();

        let mut options = CliOptions::default();

        options.domain = String::from(matches.value_of("domain").unwrap());
        options.qtype = QType::from_str(&matches.value_of("type").unwrap().to_uppercase())
            .map_err(dnslib::error::DNSError::UnknownType)?;
        options.qclass = QClass::from_str(&matches.value_of("class").unwrap().to_uppercase())
            .map_err(dnslib::error::DNSError::UnknownClass)?;
        options.aa = matches.is_present("aa");
        options.ad = matches.is_present("ad");
        options.cd = matches.is_present("cd");
        options.nord = matches.is_present("nord");
        options.ignore = matches.is_present("ignore");
        options.tcp = matches.is_present("tcp");
        options.trace = matches.is_present("trace");
        options.timeout = matches.value_of("timeout").unwrap().parse().unwrap_or(800);
        options.delay = matches.value_of("delay").unwrap().parse().unwrap_or(0);
        options.workers = matches.value_of("workers").unwrap().parse().unwrap_or(1);
        options.deleg = matches.value_of("deleg").unwrap().parse().unwrap_or(24);
        options.ns = matches
            .values_of("ns")
            .map(|vs| vs.map(String::from).collect())
            .unwrap_or_default();
        options.list = matches.value_of("list").map(String::from);
        options.dict = matches.value_of("dict").map(String::from);
        options.mode = matches.value_of("mode").map(String::from);
        options.debug = matches.is_present("debug");

        Ok(options)
    }
}

/// Parses `addr`, `addr:port` or `[v6addr]:port` (§6). Port defaults to 53.
pub fn parse_server_addr(s: &str) -> DNSResult<(IpAddr, u16)> {
    if let Some(rest) = s.strip_prefix('[') {
        let (addr_part, port_part) = rest
            .split_once(']')
            .ok_or_else(|| dnslib::error::DNSError::new(&format!("malformed IPv6 literal '{}'", s)))?;
        let addr: IpAddr = addr_part
            .parse()
            .map_err(|_| dnslib::error::DNSError::new(&format!("invalid address '{}'", addr_part)))?;
        let port = match port_part.strip_prefix(':') {
            Some(p) => p.parse().map_err(|_| dnslib::error::DNSError::new(&format!("invalid port '{}'", p)))?,
            None => 53,
        };
        return Ok((addr, port));
    }

    if let Ok(addr) = s.parse::<IpAddr>() {
        return Ok((addr, 53));
    }

    let (addr_part, port_part) = s
        .rsplit_once(':')
        .ok_or_else(|| dnslib::error::DNSError::new(&format!("invalid address '{}'", s)))?;
    let addr: IpAddr = addr_part
        .parse()
        .map_err(|_| dnslib::error::DNSError::new(&format!("invalid address '{}'", addr_part)))?;
    let port = port_part
        .parse()
        .map_err(|_| dnslib::error::DNSError::new(&format!("invalid port '{}'", port_part)))?;
    Ok((addr, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn parses_bare_v4() {
        assert_eq!(parse_server_addr("192.0.2.1").unwrap(), (IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)), 53));
    }

    #[test]
    fn parses_v4_with_port() {
        assert_eq!(parse_server_addr("192.0.2.1:5353").unwrap(), (IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)), 5353));
    }

    #[test]
    fn parses_bracketed_v6_with_port() {
        let (addr, port) = parse_server_addr("[2001:db8::1]:53").unwrap();
        assert_eq!(port, 53);
        assert!(addr.is_ipv6());
    }
}
