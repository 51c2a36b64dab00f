//! The resolver's view of an answer: the message received plus the trail
//! of nameservers that were consulted to get it (§5, §7's delegation trace).
use crate::message::{Message, ResourceRecord};
use crate::query::DtQuery;

#[derive(Debug, Clone)]
pub struct Response {
    pub query: DtQuery,
    pub msg: Message,
    /// NS records seen along the referral chain, oldest first; empty for a
    /// direct (non-tracing) query.
    pub ns_chain: Vec<ResourceRecord>,
}

impl Response {
    pub fn new(query: DtQuery, msg: Message) -> Self {
        Response { query, msg, ns_chain: Vec::new() }
    }

    pub fn is_authoritative(&self) -> bool {
        self.msg.flags.aa
    }

    pub fn is_truncated(&self) -> bool {
        self.msg.flags.tc
    }

    pub fn has_answers(&self) -> bool {
        !self.msg.answers.is_empty()
    }
}
