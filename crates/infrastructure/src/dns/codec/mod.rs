//! DNS wire codec (RFC 1035 §4, RFC 6891)
//!
//! Encodes query messages and decodes responses natively. All multi-byte
//! fields are big-endian. The decoder supports name compression; the
//! encoder never emits pointers (a query carries one name, so there is
//! nothing to compress against).

pub mod rdata;

use ferrous_dig_domain::{
    DnsError, EdnsOption, Header, HeaderFlags, Message, OptData, Question, RData, RecordClass,
    RecordType, ResourceRecord,
};

/// Maximum length of a single label (RFC 1035 §2.3.4).
pub const MAX_LABEL_LEN: usize = 63;

/// Maximum encoded length of a full name, root byte included.
pub const MAX_NAME_LEN: usize = 255;

/// Compression pointer chains longer than this are rejected as cyclic.
pub const MAX_POINTER_HOPS: usize = 10;

const HEADER_LEN: usize = 12;
const TYPE_OPT: u16 = 41;

fn malformed(reason: impl Into<String>) -> DnsError {
    DnsError::MalformedMessage(reason.into())
}

/// Bounded big-endian cursor over a raw DNS message.
///
/// `read_name` chases compression pointers through the whole buffer but
/// always leaves the cursor just past the name's bytes in the current
/// section, so callers never notice the jumps.
pub struct MessageReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> MessageReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_u8(&mut self) -> Result<u8, DnsError> {
        let byte = *self
            .buf
            .get(self.pos)
            .ok_or_else(|| malformed("unexpected end of message"))?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_u16(&mut self) -> Result<u16, DnsError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, DnsError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DnsError> {
        if len > self.remaining() {
            return Err(malformed(format!(
                "need {} bytes at offset {}, only {} remain",
                len,
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Reads a domain name, expanding compression pointers.
    ///
    /// Pointers must point strictly backward (RFC 1035 §4.1.4 refers to
    /// "a prior occurrence"); a pointer at or past its own offset, or a
    /// chain longer than [`MAX_POINTER_HOPS`], is rejected.
    pub fn read_name(&mut self) -> Result<String, DnsError> {
        let mut name = String::new();
        let mut pos = self.pos;
        let mut jumped = false;
        let mut hops = 0usize;

        loop {
            let len_byte = *self
                .buf
                .get(pos)
                .ok_or_else(|| malformed("name runs past end of message"))?
                as usize;

            if len_byte & 0xC0 == 0xC0 {
                let low = *self
                    .buf
                    .get(pos + 1)
                    .ok_or_else(|| malformed("truncated compression pointer"))?
                    as usize;
                let target = ((len_byte & 0x3F) << 8) | low;
                if target >= pos {
                    return Err(malformed(format!(
                        "compression pointer at offset {} points forward to {}",
                        pos, target
                    )));
                }
                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return Err(malformed(format!(
                        "compression pointer chain exceeds {} hops",
                        MAX_POINTER_HOPS
                    )));
                }
                if !jumped {
                    self.pos = pos + 2;
                    jumped = true;
                }
                pos = target;
                continue;
            }

            if len_byte & 0xC0 != 0 {
                return Err(malformed(format!(
                    "unsupported label type 0x{:02x}",
                    len_byte & 0xC0
                )));
            }

            if len_byte == 0 {
                pos += 1;
                break;
            }

            if pos + 1 + len_byte > self.buf.len() {
                return Err(malformed("label runs past end of message"));
            }
            if !name.is_empty() {
                name.push('.');
            }
            // +1 for the label's length byte; the expanded name must still
            // fit the 255-byte encoded bound even when assembled via pointers.
            if name.len() + len_byte + 1 > MAX_NAME_LEN {
                return Err(malformed("expanded name exceeds 255 bytes"));
            }
            name.push_str(&String::from_utf8_lossy(&self.buf[pos + 1..pos + 1 + len_byte]));
            pos += 1 + len_byte;
        }

        if !jumped {
            self.pos = pos;
        }
        Ok(name)
    }

    /// Reads a `<character-string>`: one length byte then that many bytes.
    pub fn read_character_string(&mut self) -> Result<String, DnsError> {
        let len = self.read_u8()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// EDNS0 parameters for an outgoing query's OPT record.
#[derive(Debug, Clone, Copy)]
pub struct EdnsParams {
    pub udp_payload_size: u16,
    pub dnssec_ok: bool,
}

fn validate_name(name: &str) -> Result<(), DnsError> {
    let trimmed = name.trim_end_matches('.');
    if trimmed.is_empty() {
        // the root name encodes as a single zero byte
        return Ok(());
    }
    let mut encoded_len = 1usize;
    for label in trimmed.split('.') {
        if label.is_empty() {
            return Err(DnsError::InvalidName(format!("Empty label in '{}'", name)));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(DnsError::InvalidName(format!(
                "Label '{}' exceeds {} bytes",
                label, MAX_LABEL_LEN
            )));
        }
        encoded_len += 1 + label.len();
        if encoded_len > MAX_NAME_LEN {
            return Err(DnsError::InvalidName(format!(
                "Name '{}' exceeds {} bytes encoded",
                name, MAX_NAME_LEN
            )));
        }
    }
    Ok(())
}

/// Appends `name` in length-prefixed label form. The name must already
/// have passed [`validate_name`]; the buffer is untouched on invalid input.
fn write_name(name: &str, out: &mut Vec<u8>) -> Result<(), DnsError> {
    validate_name(name)?;
    let trimmed = name.trim_end_matches('.');
    if !trimmed.is_empty() {
        for label in trimmed.split('.') {
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
    }
    out.push(0);
    Ok(())
}

fn write_u16(value: u16, out: &mut Vec<u8>) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn write_u32(value: u32, out: &mut Vec<u8>) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Encodes a single-question query message.
///
/// With `edns` set, an OPT pseudo-record advertising the given payload
/// size (clamped up to 512) is appended to the additional section and
/// ARCOUNT becomes 1. Fails with [`DnsError::InvalidName`] before any
/// bytes are produced if `name` violates the label or name bounds.
pub fn encode_query(
    name: &str,
    rtype: RecordType,
    rclass: RecordClass,
    id: u16,
    recursion_desired: bool,
    edns: Option<EdnsParams>,
) -> Result<Vec<u8>, DnsError> {
    validate_name(name)?;

    let mut out = Vec::with_capacity(HEADER_LEN + name.len() + 16);
    write_u16(id, &mut out);
    write_u16(HeaderFlags::query(recursion_desired).to_u16(), &mut out);
    write_u16(1, &mut out); // QDCOUNT
    write_u16(0, &mut out); // ANCOUNT
    write_u16(0, &mut out); // NSCOUNT
    write_u16(if edns.is_some() { 1 } else { 0 }, &mut out); // ARCOUNT

    write_name(name, &mut out)?;
    write_u16(rtype.to_u16(), &mut out);
    write_u16(rclass.to_u16(), &mut out);

    if let Some(params) = edns {
        out.push(0); // root owner name
        write_u16(TYPE_OPT, &mut out);
        write_u16(params.udp_payload_size.max(512), &mut out);
        // TTL carries extended RCODE (0), version (0) and the DO bit.
        let flags: u32 = if params.dnssec_ok { 0x8000 } else { 0 };
        write_u32(flags, &mut out);
        write_u16(0, &mut out); // RDLENGTH, no options
    }

    Ok(out)
}

fn decode_opt_rdata(
    reader: &mut MessageReader<'_>,
    class: u16,
    ttl: u32,
    rdlen: usize,
) -> Result<RData, DnsError> {
    let end = reader.pos() + rdlen;
    let mut options = Vec::new();
    while reader.pos() < end {
        if end - reader.pos() < 4 {
            return Err(malformed("truncated EDNS option header"));
        }
        let code = reader.read_u16()?;
        let len = reader.read_u16()? as usize;
        if reader.pos() + len > end {
            return Err(malformed(format!(
                "EDNS option {} length {} exceeds OPT rdata",
                code, len
            )));
        }
        let data = reader.read_bytes(len)?.to_vec();
        options.push(EdnsOption { code, data });
    }

    let flags = (ttl & 0xFFFF) as u16;
    Ok(RData::Opt(OptData {
        udp_payload_size: class,
        extended_rcode: (ttl >> 24) as u8,
        version: ((ttl >> 16) & 0xFF) as u8,
        dnssec_ok: flags & 0x8000 != 0,
        flags,
        options,
    }))
}

fn read_question(reader: &mut MessageReader<'_>) -> Result<Question, DnsError> {
    let name = reader.read_name()?;
    let qtype = reader.read_u16()?;
    let qclass = reader.read_u16()?;
    Ok(Question {
        name,
        qtype,
        qclass,
    })
}

fn read_record(reader: &mut MessageReader<'_>) -> Result<ResourceRecord, DnsError> {
    let name = reader.read_name()?;
    let rr_type = reader.read_u16()?;
    let class = reader.read_u16()?;
    let ttl = reader.read_u32()?;
    let rdlen = reader.read_u16()? as usize;

    if rdlen > reader.remaining() {
        return Err(malformed(format!(
            "rdata length {} exceeds {} remaining bytes",
            rdlen,
            reader.remaining()
        )));
    }

    let rdata_start = reader.pos();
    let rdata = if rr_type == TYPE_OPT {
        decode_opt_rdata(reader, class, ttl, rdlen)?
    } else {
        rdata::decode_rdata(rr_type, reader, rdlen)?
    };

    if reader.pos() != rdata_start + rdlen {
        return Err(malformed(format!(
            "rdata of type {} decoded to {} bytes, header declared {}",
            rr_type,
            reader.pos() - rdata_start,
            rdlen
        )));
    }

    Ok(ResourceRecord {
        name,
        rr_type,
        class,
        ttl,
        rdata,
    })
}

fn read_section(
    reader: &mut MessageReader<'_>,
    count: u16,
) -> Result<Vec<ResourceRecord>, DnsError> {
    let mut records = Vec::with_capacity(count.min(64) as usize);
    for _ in 0..count {
        records.push(read_record(reader)?);
    }
    Ok(records)
}

/// Decodes a full message: header, questions, then the three record
/// sections in order. The returned section vectors always match the
/// header counts; running out of bytes mid-section is an error rather
/// than a short read.
pub fn decode_message(buf: &[u8]) -> Result<Message, DnsError> {
    if buf.len() < HEADER_LEN {
        return Err(malformed(format!(
            "message of {} bytes is shorter than the 12-byte header",
            buf.len()
        )));
    }

    let mut reader = MessageReader::new(buf);
    let id = reader.read_u16()?;
    let flags = HeaderFlags::from_u16(reader.read_u16()?);
    let question_count = reader.read_u16()?;
    let answer_count = reader.read_u16()?;
    let authority_count = reader.read_u16()?;
    let additional_count = reader.read_u16()?;

    let mut questions = Vec::with_capacity(question_count.min(16) as usize);
    for _ in 0..question_count {
        questions.push(read_question(&mut reader)?);
    }

    let answers = read_section(&mut reader, answer_count)?;
    let authorities = read_section(&mut reader, authority_count)?;
    let additionals = read_section(&mut reader, additional_count)?;

    Ok(Message {
        header: Header {
            id,
            flags,
            question_count,
            answer_count,
            authority_count,
            additional_count,
        },
        questions,
        answers,
        authorities,
        additionals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_header_and_question_layout() {
        let bytes = encode_query(
            "example.com",
            RecordType::A,
            RecordClass::IN,
            0x1234,
            true,
            None,
        )
        .unwrap();

        assert_eq!(
            &bytes[..12],
            &[0x12, 0x34, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        );
        let mut expected_question = vec![7u8];
        expected_question.extend_from_slice(b"example");
        expected_question.push(3);
        expected_question.extend_from_slice(b"com");
        expected_question.push(0);
        expected_question.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
        assert_eq!(&bytes[12..], &expected_question[..]);
    }

    #[test]
    fn query_without_recursion_clears_rd() {
        let bytes = encode_query(
            "example.com",
            RecordType::A,
            RecordClass::IN,
            1,
            false,
            None,
        )
        .unwrap();
        assert_eq!(bytes[2] & 0x01, 0);
    }

    #[test]
    fn edns_opt_is_appended_and_counted() {
        let bytes = encode_query(
            "example.com",
            RecordType::A,
            RecordClass::IN,
            1,
            true,
            Some(EdnsParams {
                udp_payload_size: 4096,
                dnssec_ok: true,
            }),
        )
        .unwrap();

        // ARCOUNT
        assert_eq!(u16::from_be_bytes([bytes[10], bytes[11]]), 1);
        // OPT trailer: root name, TYPE 41, CLASS 4096, TTL DO bit, RDLEN 0
        let opt = &bytes[bytes.len() - 11..];
        assert_eq!(opt[0], 0x00);
        assert_eq!(u16::from_be_bytes([opt[1], opt[2]]), 41);
        assert_eq!(u16::from_be_bytes([opt[3], opt[4]]), 4096);
        assert_eq!(opt[7] & 0x80, 0x80, "DO bit must be set");
        assert_eq!(u16::from_be_bytes([opt[9], opt[10]]), 0);
    }

    #[test]
    fn edns_payload_size_clamped_to_512() {
        let bytes = encode_query(
            "example.com",
            RecordType::A,
            RecordClass::IN,
            1,
            true,
            Some(EdnsParams {
                udp_payload_size: 100,
                dnssec_ok: false,
            }),
        )
        .unwrap();
        let opt = &bytes[bytes.len() - 11..];
        assert_eq!(u16::from_be_bytes([opt[3], opt[4]]), 512);
    }

    #[test]
    fn root_name_encodes_as_zero_byte() {
        let bytes =
            encode_query(".", RecordType::NS, RecordClass::IN, 1, true, None).unwrap();
        assert_eq!(bytes[12], 0x00);
        assert_eq!(bytes.len(), 12 + 1 + 4);
    }

    #[test]
    fn oversized_label_is_rejected() {
        let long_label = "a".repeat(64);
        let err = encode_query(
            &format!("{}.com", long_label),
            RecordType::A,
            RecordClass::IN,
            1,
            true,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DnsError::InvalidName(_)));
    }

    #[test]
    fn maximal_label_is_accepted() {
        let label = "a".repeat(63);
        assert!(encode_query(
            &format!("{}.com", label),
            RecordType::A,
            RecordClass::IN,
            1,
            true,
            None,
        )
        .is_ok());
    }

    #[test]
    fn oversized_name_is_rejected() {
        // Four 62-byte labels encode to 4*63+1 = 253 bytes; adding one more
        // label pushes past 255.
        let label = "b".repeat(62);
        let ok_name = [label.as_str(); 4].join(".");
        assert!(encode_query(&ok_name, RecordType::A, RecordClass::IN, 1, true, None).is_ok());

        let too_long = [label.as_str(); 5].join(".");
        let err =
            encode_query(&too_long, RecordType::A, RecordClass::IN, 1, true, None).unwrap_err();
        assert!(matches!(err, DnsError::InvalidName(_)));
    }

    #[test]
    fn empty_label_is_rejected() {
        let err = encode_query(
            "bad..name",
            RecordType::A,
            RecordClass::IN,
            1,
            true,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DnsError::InvalidName(_)));
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let err = decode_message(&[0u8; 11]).unwrap_err();
        assert!(matches!(err, DnsError::MalformedMessage(_)));
    }

    #[test]
    fn decode_rejects_counts_past_end() {
        // Header claims one question, no question bytes follow.
        let buf = [
            0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let err = decode_message(&buf).unwrap_err();
        assert!(matches!(err, DnsError::MalformedMessage(_)));
    }

    #[test]
    fn decode_rejects_forward_pointer() {
        let mut buf = vec![
            0x00, 0x01, 0x80, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        // QNAME is a pointer to its own offset (12).
        buf.extend_from_slice(&[0xC0, 0x0C, 0x00, 0x01, 0x00, 0x01]);
        let err = decode_message(&buf).unwrap_err();
        assert!(matches!(err, DnsError::MalformedMessage(_)));
    }

    #[test]
    fn name_compression_round_trips_through_reader() {
        // "example.com" at offset 0, then a pointer to it at offset 13.
        let mut buf = vec![7u8];
        buf.extend_from_slice(b"example");
        buf.push(3);
        buf.extend_from_slice(b"com");
        buf.push(0);
        buf.extend_from_slice(&[0xC0, 0x00]);

        let mut reader = MessageReader::new(&buf);
        assert_eq!(reader.read_name().unwrap(), "example.com");
        assert_eq!(reader.read_name().unwrap(), "example.com");
        assert_eq!(reader.remaining(), 0);
    }
}
