//! Canonical encoding of the hash-relevant part of a block.
//!
//! The output is compact JSON with object keys in byte order:
//! `{"data":[..],"nonce":N,"number":n,"previousHash":".."}`. Two encoders that
//! agree on this layout produce the same digest for the same logical block.

use crate::constants::MAX_PAYLOAD_DEPTH;
use crate::error::{LedgerError, Result};
use crate::payload::{too_deep, Payload, Transaction};
use num_bigint::BigInt;

/// The four fields a block hash commits to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HashInput<'a> {
    pub previous_hash: &'a str,
    pub nonce: &'a BigInt,
    pub number: u64,
    pub data: &'a [Transaction],
}

pub fn encode(input: &HashInput<'_>) -> Result<Vec<u8>> {
    let template = HashTemplate::new(input.previous_hash, input.number, input.data)?;
    Ok(template.with_nonce(input.nonce))
}

/// Pre-encoded bytes on either side of the nonce. `data`, `number` and
/// `previousHash` are fixed for a whole nonce search, so they are encoded once.
#[derive(Clone, Debug)]
pub struct HashTemplate {
    head: Vec<u8>,
    tail: Vec<u8>,
}

impl HashTemplate {
    pub fn new(previous_hash: &str, number: u64, data: &[Transaction]) -> Result<Self> {
        let mut head = Vec::with_capacity(64);
        head.extend_from_slice(b"{\"data\":[");
        for (i, tx) in data.iter().enumerate() {
            if i > 0 {
                head.push(b',');
            }
            encode_payload(tx.payload(), &mut head)?;
        }
        head.extend_from_slice(b"],\"nonce\":");

        let mut tail = Vec::with_capacity(80);
        tail.extend_from_slice(b",\"number\":");
        tail.extend_from_slice(number.to_string().as_bytes());
        tail.extend_from_slice(b",\"previousHash\":");
        encode_str(previous_hash, &mut tail)?;
        tail.push(b'}');

        Ok(Self { head, tail })
    }

    pub fn with_nonce(&self, nonce: &BigInt) -> Vec<u8> {
        let digits = nonce.to_string();
        let mut out = Vec::with_capacity(self.head.len() + digits.len() + self.tail.len());
        out.extend_from_slice(&self.head);
        out.extend_from_slice(digits.as_bytes());
        out.extend_from_slice(&self.tail);
        out
    }
}

pub fn encode_payload(payload: &Payload, out: &mut Vec<u8>) -> Result<()> {
    encode_payload_at(payload, out, 0)
}

fn encode_payload_at(payload: &Payload, out: &mut Vec<u8>, depth: usize) -> Result<()> {
    if depth > MAX_PAYLOAD_DEPTH {
        return Err(too_deep());
    }
    match payload {
        Payload::Null => out.extend_from_slice(b"null"),
        Payload::Bool(true) => out.extend_from_slice(b"true"),
        Payload::Bool(false) => out.extend_from_slice(b"false"),
        Payload::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Payload::String(s) => encode_str(s, out)?,
        Payload::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                encode_payload_at(item, out, depth + 1)?;
            }
            out.push(b']');
        }
        Payload::Object(members) => {
            // BTreeMap iterates keys in byte order
            out.push(b'{');
            for (i, (key, item)) in members.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                encode_str(key, out)?;
                out.push(b':');
                encode_payload_at(item, out, depth + 1)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

fn encode_str(s: &str, out: &mut Vec<u8>) -> Result<()> {
    serde_json::to_writer(&mut *out, s).map_err(|e| LedgerError::Encoding(e.to_string()))
}
