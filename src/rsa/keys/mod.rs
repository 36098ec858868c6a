pub mod key_pair;

pub use key_pair::*;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use num_bigint::BigInt;
use num_traits::Zero;

/// One half of a key pair: exponent `base` (e or d) over modulus `m`.
#[derive(Debug, Clone)]
pub struct Key {
    pub base: BigInt,
    pub m: BigInt,
}

impl Default for Key {
    fn default() -> Self {
        Self { base: BigInt::zero(), m: BigInt::zero() }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.m == other.m && self.base == other.base
    }
}

/// Same `(e, n)` / `(d, n)` rendering the key display uses.
impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.base, self.m)
    }
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('(').unwrap_or(s);
        let s = s.strip_suffix(')').unwrap_or(s);
        let mut parts = s.split(',').map(|p| p.trim());
        let (base, m) = match (parts.next(), parts.next(), parts.next()) {
            (Some(base), Some(m), None) => (base, m),
            _ => return Err(KeyError::ParseError(format!("expected `(exponent, modulus)`, got {:?}", s))),
        };
        let parse = |t: &str| -> Result<BigInt, KeyError> {
            if t.is_empty() || !t.bytes().all(|c| c.is_ascii_digit()) {
                return Err(KeyError::ParseError(format!("not a decimal integer: {:?}", t)));
            }
            BigInt::parse_bytes(t.as_bytes(), 10)
                .ok_or_else(|| KeyError::ParseError(format!("not a decimal integer: {:?}", t)))
        };
        let key = Key { base: parse(base)?, m: parse(m)? };
        if key.m.is_zero() {
            return Err(KeyError::FormatError);
        }
        Ok(key)
    }
}

pub enum KeyError {
    ParseError(String),
    /// Parsed fine but the modulus is zero.
    FormatError,
}

impl KeyError {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyError::ParseError(msg) => write!(f, "Key parse error: {}", msg),
            KeyError::FormatError => write!(f, "Key modulus must be positive"),
        }
    }
}

impl Display for KeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl std::fmt::Debug for KeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Error for KeyError {}
