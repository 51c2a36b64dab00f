//! Thin wiring layer over the core (Resolver/Pool/Worker harness) for the
//! five batched probing actions named by `-mode` (§10.5). Each runner's
//! body is intentionally small: it sequences core calls, it doesn't
//! reimplement them.
pub mod dnsbl;
pub mod enumerate;
pub mod snoop;
pub mod walk;
pub mod zonetransfer;

use dnslib::error::{DNSError, DNSResult};
use dnslib::resolver::Resolver;

use crate::args::CliOptions;

pub struct ActionContext<'a> {
    pub resolver: &'a Resolver,
    pub options: &'a CliOptions,
}

pub fn dispatch(mode: &str, ctx: &ActionContext) -> DNSResult<()> {
    match mode {
        "enum" => enumerate::run(ctx),
        "snoop" => snoop::run(ctx),
        "zt" => zonetransfer::run(ctx),
        "walk" => walk::run(ctx),
        "dnsbl" => dnsbl::run(ctx),
        other => Err(DNSError::new(&format!("unrecognized mode '{}'", other))),
    }
}
