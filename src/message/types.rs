//! Closed-but-extensible wire enums: QTYPE, QCLASS, OPCODE and RCODE.
//!
//! Each is generated by `wire_enum!` so that decoding a value we don't have
//! a name for never fails or panics -- it lands in the `Unknown(repr)`
//! catch-all, exactly as §3 requires ("Type and class are opaque 16-bit
//! codes; named aliases ... are resolved via string tables").
use crate::wire_enum;

wire_enum!(
    QType: u16 {
        A = 1 => "A",
        NS = 2 => "NS",
        MD = 3 => "MD",
        MF = 4 => "MF",
        CNAME = 5 => "CNAME",
        SOA = 6 => "SOA",
        MB = 7 => "MB",
        MG = 8 => "MG",
        MR = 9 => "MR",
        NULL = 10 => "NULL",
        WKS = 11 => "WKS",
        PTR = 12 => "PTR",
        HINFO = 13 => "HINFO",
        MINFO = 14 => "MINFO",
        MX = 15 => "MX",
        TXT = 16 => "TXT",
        RP = 17 => "RP",
        AFSDB = 18 => "AFSDB",
        X25 = 19 => "X25",
        ISDN = 20 => "ISDN",
        RT = 21 => "RT",
        NSAP = 22 => "NSAP",
        NSAPPTR = 23 => "NSAP-PTR",
        SIG = 24 => "SIG",
        KEY = 25 => "KEY",
        PX = 26 => "PX",
        GPOS = 27 => "GPOS",
        AAAA = 28 => "AAAA",
        LOC = 29 => "LOC",
        NXT = 30 => "NXT",
        SRV = 33 => "SRV",
        NAPTR = 35 => "NAPTR",
        KX = 36 => "KX",
        CERT = 37 => "CERT",
        DNAME = 39 => "DNAME",
        OPT = 41 => "OPT",
        APL = 42 => "APL",
        DS = 43 => "DS",
        SSHFP = 44 => "SSHFP",
        IPSECKEY = 45 => "IPSECKEY",
        RRSIG = 46 => "RRSIG",
        NSEC = 47 => "NSEC",
        DNSKEY = 48 => "DNSKEY",
        DHCID = 49 => "DHCID",
        NSEC3 = 50 => "NSEC3",
        NSEC3PARAM = 51 => "NSEC3PARAM",
        TLSA = 52 => "TLSA",
        SMIMEA = 53 => "SMIMEA",
        HIP = 55 => "HIP",
        CDS = 59 => "CDS",
        CDNSKEY = 60 => "CDNSKEY",
        OPENPGPKEY = 61 => "OPENPGPKEY",
        CSYNC = 62 => "CSYNC",
        ZONEMD = 63 => "ZONEMD",
        SVCB = 64 => "SVCB",
        HTTPS = 65 => "HTTPS",
        SPF = 99 => "SPF",
        TKEY = 249 => "TKEY",
        TSIG = 250 => "TSIG",
        IXFR = 251 => "IXFR",
        AXFR = 252 => "AXFR",
        MAILB = 253 => "MAILB",
        MAILA = 254 => "MAILA",
        ANY = 255 => "ANY",
        URI = 256 => "URI",
        CAA = 257 => "CAA",
    }
);

wire_enum!(
    QClass: u16 {
        IN = 1 => "IN",
        CS = 2 => "CS",
        CH = 3 => "CH",
        HS = 4 => "HS",
        NONE = 254 => "NONE",
        ANY = 255 => "ANY",
    }
);

wire_enum!(
    OpCode: u16 {
        Query = 0 => "QUERY",
        IQuery = 1 => "IQUERY",
        Status = 2 => "STATUS",
        Notify = 4 => "NOTIFY",
        Update = 5 => "UPDATE",
        Dso = 6 => "DSO",
    }
);

wire_enum!(
    ResponseCode: u16 {
        NoError = 0 => "NOERROR",
        FormErr = 1 => "FORMERR",
        ServFail = 2 => "SERVFAIL",
        NXDomain = 3 => "NXDOMAIN",
        NotImp = 4 => "NOTIMP",
        Refused = 5 => "REFUSED",
        YXDomain = 6 => "YXDOMAIN",
        YXRRSet = 7 => "YXRRSET",
        NXRRSet = 8 => "NXRRSET",
        NotAuth = 9 => "NOTAUTH",
        NotZone = 10 => "NOTZONE",
        DsoTypeNi = 11 => "DSOTYPENI",
        BadVers = 16 => "BADVERS",
        BadKey = 17 => "BADKEY",
        BadTime = 18 => "BADTIME",
        BadMode = 19 => "BADMODE",
        BadName = 20 => "BADNAME",
        BadAlg = 21 => "BADALG",
        BadTrunc = 22 => "BADTRUNC",
        BadCookie = 23 => "BADCOOKIE",
    }
);

impl ResponseCode {
    /// The canonical human-readable message for this rcode, grounded in
    /// the original source's `Rcode2Msg` table (see SPEC_FULL §10.5).
    pub fn message(&self) -> &'static str {
        match self {
            ResponseCode::NoError => "no error",
            ResponseCode::FormErr => "format error: the name server was unable to interpret the query",
            ResponseCode::ServFail => "server failure: the name server was unable to process this query",
            ResponseCode::NXDomain => "non-existent domain",
            ResponseCode::NotImp => "not implemented: the name server does not support the requested kind of query",
            ResponseCode::Refused => "query refused",
            ResponseCode::YXDomain => "name exists when it should not",
            ResponseCode::YXRRSet => "RR set exists when it should not",
            ResponseCode::NXRRSet => "RR set that should exist does not",
            ResponseCode::NotAuth => "not authorized",
            ResponseCode::NotZone => "name not contained in zone",
            ResponseCode::DsoTypeNi => "DSO-TYPE not implemented",
            ResponseCode::BadVers => "bad OPT version",
            ResponseCode::BadKey => "key not recognized",
            ResponseCode::BadTime => "signature out of time window",
            ResponseCode::BadMode => "bad TKEY mode",
            ResponseCode::BadName => "duplicate key name",
            ResponseCode::BadAlg => "algorithm not supported",
            ResponseCode::BadTrunc => "bad truncation",
            ResponseCode::BadCookie => "bad/missing server cookie",
            ResponseCode::Unknown(_) => "unrecognized rcode",
        }
    }
}

/// DNSSEC algorithm-name display for DNSKEY, purely informational (§4.2:
/// "cryptographic parsing is not required").
pub fn algo2str(algo: u8) -> &'static str {
    match algo {
        1 => "RSAMD5",
        3 => "DSA",
        5 => "RSASHA1",
        6 => "DSA-NSEC3-SHA1",
        7 => "RSASHA1-NSEC3-SHA1",
        8 => "RSASHA256",
        10 => "RSASHA512",
        13 => "ECDSAP256SHA256",
        14 => "ECDSAP384SHA384",
        15 => "ED25519",
        16 => "ED448",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn qtype_roundtrip() {
        assert_eq!(QType::from_value(1), QType::A);
        assert_eq!(QType::A.value(), 1);
        assert_eq!(QType::from_str("aaaa").unwrap(), QType::AAAA);
        assert_eq!(QType::from_value(0xFFFF), QType::Unknown(0xFFFF));
        assert_eq!(QType::Unknown(0xFFFF).alias(), "UNKNOWN");
    }

    #[test]
    fn rcode_message_known_and_unknown() {
        assert_eq!(ResponseCode::NXDomain.message(), "non-existent domain");
        assert_eq!(ResponseCode::from_value(200).message(), "unrecognized rcode");
    }
}
