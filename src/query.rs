//! Query construction: a validated `(name, type, class)` triple plus the
//! per-query transport knobs the resolver and CLI both need to set.
use rand::Rng;

use crate::error::DNSResult;
use crate::message::name::Name;
use crate::message::types::{QClass, QType};
use crate::message::{Message, Question};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub qname: Name,
    pub qtype: QType,
    pub qclass: QClass,
}

impl Query {
    pub fn new(qname: &str, qtype: QType, qclass: QClass) -> DNSResult<Self> {
        let qname = Name::parse(qname)?;
        Ok(Query { qname, qtype, qclass })
    }

    pub fn into_question(self) -> Question {
        Question { qname: self.qname, qtype: self.qtype, qclass: self.qclass }
    }
}

/// A query plus the header-level bits that vary per send: recursion
/// desired, an optional fixed message id (random otherwise), and the
/// AA/AD/CD bits a caller might want to set (§3: "DtQuery ... wraps a
/// Query with an optional message id and the per-query flag set (aa, rd,
/// ad, cd)").
#[derive(Debug, Clone)]
pub struct DtQuery {
    pub query: Query,
    pub id: Option<u16>,
    pub rd: bool,
    pub aa: bool,
    pub ad: bool,
    pub cd: bool,
}

impl DtQuery {
    pub fn new(query: Query, rd: bool) -> Self {
        DtQuery { query, id: None, rd, aa: false, ad: false, cd: false }
    }

    pub fn with_id(mut self, id: u16) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_aa(mut self, aa: bool) -> Self {
        self.aa = aa;
        self
    }

    pub fn with_ad(mut self, ad: bool) -> Self {
        self.ad = ad;
        self
    }

    pub fn with_cd(mut self, cd: bool) -> Self {
        self.cd = cd;
        self
    }

    /// Builds the wire message to send, picking a random 16-bit id unless
    /// one was pinned with `with_id`.
    pub fn to_message(&self) -> Message {
        let id = self.id.unwrap_or_else(|| rand::thread_rng().gen());
        let mut msg = Message::new_query(
            id,
            self.query.qname.clone(),
            self.query.qtype,
            self.query.qclass,
            self.rd,
        );
        msg.flags.aa = self.aa;
        msg.flags.ad = self.ad;
        msg.flags.cd = self.cd;
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_rejects_invalid_name() {
        assert!(Query::new("..bad", QType::A, QClass::IN).is_err());
    }

    #[test]
    fn dtquery_to_message_honors_pinned_id_and_rd() {
        let q = Query::new("example.com", QType::A, QClass::IN).unwrap();
        let dt = DtQuery::new(q, true).with_id(0xBEEF).with_cd(true);
        let msg = dt.to_message();
        assert_eq!(msg.header.id, 0xBEEF);
        assert!(msg.flags.rd);
        assert!(msg.flags.cd);
        assert!(!msg.flags.qr);
    }
}
