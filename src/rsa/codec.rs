use std::fmt::{Display, Formatter};
use std::str::FromStr;
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use crate::rsa::error::RsaError;

pub const SEPARATOR: char = '|';

/// Big-endian: `sum(byte[i] * 256^(len - 1 - i))`. Empty input is zero.
pub fn text_to_int(bytes: &[u8]) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, bytes)
}

/// Inverse of [`text_to_int`] up to leading zero bytes, which are lost: zero maps to no bytes.
pub fn int_to_bytes(n: &BigInt) -> Vec<u8> {
    if n.is_zero() { return Vec::new(); }
    n.to_bytes_be().1
}

pub fn decode_text(bytes: Vec<u8>) -> Result<String, RsaError> {
    Ok(String::from_utf8(bytes)?)
}

/// Splits on character boundaries, `chunk_len` characters per chunk, order preserved.
pub fn split_text(text: &str, chunk_len: usize) -> Vec<&str> {
    // zero-length chunks would never consume input
    let chunk_len = chunk_len.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    for (count, (idx, _)) in text.char_indices().enumerate() {
        if count > 0 && count % chunk_len == 0 {
            chunks.push(&text[start..idx]);
            start = idx;
        }
    }
    if start < text.len() { chunks.push(&text[start..]); }
    chunks
}

pub fn split_bytes(data: &[u8], chunk_len: usize) -> Vec<&[u8]> {
    data.chunks(chunk_len.max(1)).collect()
}

/// Ordered cipher blocks. On the wire: decimal digits joined by `|`, nothing else.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ciphertext {
    pub blocks: Vec<BigInt>,
}

impl Display for Ciphertext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 { write!(f, "{}", SEPARATOR)?; }
            write!(f, "{}", block)?;
        }
        Ok(())
    }
}

impl FromStr for Ciphertext {
    type Err = RsaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() { return Ok(Ciphertext::default()); }
        let blocks = s.split(SEPARATOR)
            .map(|token| {
                if token.is_empty() || !token.bytes().all(|c| c.is_ascii_digit()) {
                    return Err(RsaError::MalformedCiphertext(token.to_string()));
                }
                BigInt::parse_bytes(token.as_bytes(), 10)
                    .ok_or_else(|| RsaError::MalformedCiphertext(token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Ciphertext { blocks })
    }
}
