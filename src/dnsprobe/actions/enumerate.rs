//! `-mode enum`: reads names from a dictionary, prefixes the target
//! domain, resolves each via the worker harness (§10.5).
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use dnslib::error::{DNSError, DNSResult};
use dnslib::message::types::{QClass, QType};
use dnslib::query::Query;
use dnslib::response::Response;
use dnslib::worker::WorkerHarness;

use super::ActionContext;
use crate::display::DisplayWrapper;
use crate::loaders::load_dictionary;

pub fn run(ctx: &ActionContext) -> DNSResult<()> {
    let dict_path = ctx.options.dict.as_ref().ok_or(DNSError::DictionaryEmpty)?;
    let entries = load_dictionary(dict_path)?;
    if entries.is_empty() {
        return Err(DNSError::DictionaryEmpty);
    }

    let domain = ctx.options.domain.clone();
    let names: VecDeque<String> = entries.iter().map(|e| format!("{}.{}", e, domain)).collect();
    let queue = Arc::new(Mutex::new(names));
    let workers = ctx.options.workers.max(1);
    let delay = ctx.options.delay;
    let resolver = ctx.resolver.clone();

    let queue_bg = Arc::clone(&queue);
    let harness: WorkerHarness<(String, Response)> = WorkerHarness::spawn(
        workers,
        delay,
        move |_cancel, _idx| match queue_bg.lock().unwrap().pop_front() {
            None => (None, true),
            Some(name) => {
                let result = Query::new(&name, QType::A, QClass::IN)
                    .ok()
                    .and_then(|q| resolver.resolve(q, true).ok())
                    .filter(|resp| resp.has_answers())
                    .map(|resp| (name, resp));
                (result, false)
            }
        },
        |(name, resp): (String, Response)| {
            println!("[+] {}", name);
            for rr in &resp.msg.answers {
                println!("    {}", DisplayWrapper(rr));
            }
        },
    );
    harness.wait();

    Ok(())
}
