use crate::rdata::RData;
use crate::record_class::{class_name, RecordClass};
use crate::record_type::{type_name, RecordType};
use std::fmt;

/// DNS message opcode (header bits 11-14).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Query,
    IQuery,
    Status,
    Notify,
    Update,
    Unknown(u8),
}

impl Opcode {
    pub fn to_u8(&self) -> u8 {
        match self {
            Opcode::Query => 0,
            Opcode::IQuery => 1,
            Opcode::Status => 2,
            Opcode::Notify => 4,
            Opcode::Update => 5,
            Opcode::Unknown(code) => *code,
        }
    }

    pub fn from_u8(code: u8) -> Self {
        match code {
            0 => Opcode::Query,
            1 => Opcode::IQuery,
            2 => Opcode::Status,
            4 => Opcode::Notify,
            5 => Opcode::Update,
            other => Opcode::Unknown(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Opcode::Query => "QUERY",
            Opcode::IQuery => "IQUERY",
            Opcode::Status => "STATUS",
            Opcode::Notify => "NOTIFY",
            Opcode::Update => "UPDATE",
            Opcode::Unknown(_) => "RESERVED",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// DNS response code (header low nibble).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    NoError,
    FormErr,
    ServFail,
    NxDomain,
    NotImp,
    Refused,
    Unknown(u8),
}

impl ResponseCode {
    pub fn to_u8(&self) -> u8 {
        match self {
            ResponseCode::NoError => 0,
            ResponseCode::FormErr => 1,
            ResponseCode::ServFail => 2,
            ResponseCode::NxDomain => 3,
            ResponseCode::NotImp => 4,
            ResponseCode::Refused => 5,
            ResponseCode::Unknown(code) => *code,
        }
    }

    pub fn from_u8(code: u8) -> Self {
        match code {
            0 => ResponseCode::NoError,
            1 => ResponseCode::FormErr,
            2 => ResponseCode::ServFail,
            3 => ResponseCode::NxDomain,
            4 => ResponseCode::NotImp,
            5 => ResponseCode::Refused,
            other => ResponseCode::Unknown(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::FormErr => "FORMERR",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::NxDomain => "NXDOMAIN",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decoded view of the 16 flag bits in the DNS header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFlags {
    pub qr: bool,
    pub opcode: Opcode,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub rcode: ResponseCode,
}

impl HeaderFlags {
    /// Flags for a fresh query: QR=0, opcode QUERY, RD per caller.
    pub fn query(recursion_desired: bool) -> Self {
        Self {
            qr: false,
            opcode: Opcode::Query,
            aa: false,
            tc: false,
            rd: recursion_desired,
            ra: false,
            rcode: ResponseCode::NoError,
        }
    }

    pub fn to_u16(&self) -> u16 {
        let mut bits: u16 = 0;
        if self.qr {
            bits |= 0x8000;
        }
        bits |= ((self.opcode.to_u8() & 0x0F) as u16) << 11;
        if self.aa {
            bits |= 0x0400;
        }
        if self.tc {
            bits |= 0x0200;
        }
        if self.rd {
            bits |= 0x0100;
        }
        if self.ra {
            bits |= 0x0080;
        }
        bits |= (self.rcode.to_u8() & 0x0F) as u16;
        bits
    }

    /// The Z bits (0x0070) are ignored on decode, per RFC 1035.
    pub fn from_u16(bits: u16) -> Self {
        Self {
            qr: bits & 0x8000 != 0,
            opcode: Opcode::from_u8(((bits >> 11) & 0x0F) as u8),
            aa: bits & 0x0400 != 0,
            tc: bits & 0x0200 != 0,
            rd: bits & 0x0100 != 0,
            ra: bits & 0x0080 != 0,
            rcode: ResponseCode::from_u8((bits & 0x000F) as u8),
        }
    }
}

/// The fixed 12-byte DNS header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub flags: HeaderFlags,
    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

/// One entry of the question section. The type and class are kept as raw
/// codes because the registry of types is open; use the typed accessors
/// when a known code is expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub qtype: u16,
    pub qclass: u16,
}

impl Question {
    pub fn new(name: impl Into<String>, rtype: RecordType, rclass: RecordClass) -> Self {
        Self {
            name: name.into(),
            qtype: rtype.to_u16(),
            qclass: rclass.to_u16(),
        }
    }

    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::from_u16(self.qtype)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ";{}.\t\t{}\t{}",
            self.name.trim_end_matches('.'),
            class_name(self.qclass),
            type_name(self.qtype)
        )
    }
}

/// A decoded resource record from the answer, authority or additional
/// section. For OPT pseudo-records the `ttl` field holds the raw 32 bits
/// that EDNS reinterprets; the decoded view lives in [`RData::Opt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: String,
    pub rr_type: u16,
    pub class: u16,
    pub ttl: u32,
    pub rdata: RData,
}

impl ResourceRecord {
    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::from_u16(self.rr_type)
    }

    pub fn is_opt(&self) -> bool {
        self.rr_type == RecordType::OPT.to_u16()
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.\t{}\t{}\t{}\t{}",
            self.name.trim_end_matches('.'),
            self.ttl,
            class_name(self.class),
            type_name(self.rr_type),
            self.rdata
        )
    }
}

/// A complete DNS message. Section vectors are the source of truth for
/// the encoder; after a decode the header counts always equal the section
/// lengths (the decoder fails otherwise).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
    pub additionals: Vec<ResourceRecord>,
}

impl Message {
    /// The EDNS OPT pseudo-record, if the additional section carries one.
    pub fn opt(&self) -> Option<&ResourceRecord> {
        self.additionals.iter().find(|rr| rr.is_opt())
    }

    pub fn rcode(&self) -> ResponseCode {
        self.header.flags.rcode
    }

    pub fn is_truncated(&self) -> bool {
        self.header.flags.tc
    }
}
