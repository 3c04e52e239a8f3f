//! Resource-record payload registry.
//!
//! Dispatch is table-driven: a numeric TYPE maps to a decoder function,
//! and adding support for a new type is adding one row to
//! [`RDATA_DECODERS`]. Types without a row decode to [`RData::Unknown`]
//! with the raw bytes — an unknown type never aborts the message decode.

use super::MessageReader;
use ferrous_dig_domain::{DnsError, RData};
use std::net::{Ipv4Addr, Ipv6Addr};

pub type RdataDecoder = fn(&mut MessageReader<'_>, usize) -> Result<RData, DnsError>;

/// TYPE code -> payload decoder. OPT (41) is absent on purpose: it is a
/// pseudo-record whose CLASS and TTL fields are reinterpreted, so the
/// record layer in `codec` handles it before reaching this table.
static RDATA_DECODERS: &[(u16, RdataDecoder)] = &[
    (1, decode_a),
    (2, decode_ns),
    (5, decode_cname),
    (6, decode_soa),
    (12, decode_ptr),
    (13, decode_hinfo),
    (15, decode_mx),
    (16, decode_txt),
    (28, decode_aaaa),
    (33, decode_srv),
    (35, decode_naptr),
];

pub fn lookup_decoder(rr_type: u16) -> Option<RdataDecoder> {
    RDATA_DECODERS
        .iter()
        .find(|(code, _)| *code == rr_type)
        .map(|(_, decoder)| *decoder)
}

pub fn decode_rdata(
    rr_type: u16,
    reader: &mut MessageReader<'_>,
    rdlen: usize,
) -> Result<RData, DnsError> {
    match lookup_decoder(rr_type) {
        Some(decoder) => decoder(reader, rdlen),
        None => Ok(RData::Unknown {
            rr_type,
            bytes: reader.read_bytes(rdlen)?.to_vec(),
        }),
    }
}

fn expect_rdlen(rr_type: &str, expected: usize, rdlen: usize) -> Result<(), DnsError> {
    if rdlen != expected {
        return Err(DnsError::MalformedMessage(format!(
            "{} rdata must be {} bytes, got {}",
            rr_type, expected, rdlen
        )));
    }
    Ok(())
}

fn decode_a(reader: &mut MessageReader<'_>, rdlen: usize) -> Result<RData, DnsError> {
    expect_rdlen("A", 4, rdlen)?;
    let bytes = reader.read_bytes(4)?;
    Ok(RData::A(Ipv4Addr::new(
        bytes[0], bytes[1], bytes[2], bytes[3],
    )))
}

fn decode_aaaa(reader: &mut MessageReader<'_>, rdlen: usize) -> Result<RData, DnsError> {
    expect_rdlen("AAAA", 16, rdlen)?;
    let bytes = reader.read_bytes(16)?;
    let mut octets = [0u8; 16];
    octets.copy_from_slice(bytes);
    Ok(RData::Aaaa(Ipv6Addr::from(octets)))
}

fn decode_ns(reader: &mut MessageReader<'_>, _rdlen: usize) -> Result<RData, DnsError> {
    Ok(RData::Ns(reader.read_name()?))
}

fn decode_cname(reader: &mut MessageReader<'_>, _rdlen: usize) -> Result<RData, DnsError> {
    Ok(RData::Cname(reader.read_name()?))
}

fn decode_ptr(reader: &mut MessageReader<'_>, _rdlen: usize) -> Result<RData, DnsError> {
    Ok(RData::Ptr(reader.read_name()?))
}

fn decode_soa(reader: &mut MessageReader<'_>, _rdlen: usize) -> Result<RData, DnsError> {
    let mname = reader.read_name()?;
    let rname = reader.read_name()?;
    Ok(RData::Soa {
        mname,
        rname,
        serial: reader.read_u32()?,
        refresh: reader.read_u32()?,
        retry: reader.read_u32()?,
        expire: reader.read_u32()?,
        minimum: reader.read_u32()?,
    })
}

fn decode_mx(reader: &mut MessageReader<'_>, _rdlen: usize) -> Result<RData, DnsError> {
    Ok(RData::Mx {
        preference: reader.read_u16()?,
        exchange: reader.read_name()?,
    })
}

fn decode_txt(reader: &mut MessageReader<'_>, rdlen: usize) -> Result<RData, DnsError> {
    let end = reader.pos() + rdlen;
    let mut strings = Vec::new();
    while reader.pos() < end {
        let len = reader.read_u8()? as usize;
        if reader.pos() + len > end {
            return Err(DnsError::MalformedMessage(format!(
                "TXT string of {} bytes overruns rdata",
                len
            )));
        }
        let bytes = reader.read_bytes(len)?;
        strings.push(String::from_utf8_lossy(bytes).into_owned());
    }
    Ok(RData::Txt(strings))
}

fn decode_hinfo(reader: &mut MessageReader<'_>, rdlen: usize) -> Result<RData, DnsError> {
    let end = reader.pos() + rdlen;
    let cpu = reader.read_character_string()?;
    let os = reader.read_character_string()?;
    if reader.pos() > end {
        return Err(DnsError::MalformedMessage(
            "HINFO strings overrun rdata".to_string(),
        ));
    }
    Ok(RData::Hinfo { cpu, os })
}

fn decode_srv(reader: &mut MessageReader<'_>, rdlen: usize) -> Result<RData, DnsError> {
    if rdlen < 7 {
        return Err(DnsError::MalformedMessage(format!(
            "SRV rdata of {} bytes cannot hold priority/weight/port/target",
            rdlen
        )));
    }
    Ok(RData::Srv {
        priority: reader.read_u16()?,
        weight: reader.read_u16()?,
        port: reader.read_u16()?,
        target: reader.read_name()?,
    })
}

fn decode_naptr(reader: &mut MessageReader<'_>, rdlen: usize) -> Result<RData, DnsError> {
    if rdlen < 8 {
        return Err(DnsError::MalformedMessage(format!(
            "NAPTR rdata of {} bytes is too short",
            rdlen
        )));
    }
    Ok(RData::Naptr {
        order: reader.read_u16()?,
        preference: reader.read_u16()?,
        flags: reader.read_character_string()?,
        services: reader.read_character_string()?,
        regexp: reader.read_character_string()?,
        replacement: reader.read_name()?,
    })
}
