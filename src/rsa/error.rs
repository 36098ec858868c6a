use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::io;
use std::string::FromUtf8Error;
use crate::rsa::keys::{KeyError, MIN_KEY_BITS};

/// Every failure of a generate / encrypt / decrypt call. None of them touch the loaded keys.
pub enum RsaError {
    /// Encrypt or decrypt before the matching key was generated or loaded.
    NoKey(&'static str),
    NoInverse,
    /// Chunk `index` encodes to an integer not below the modulus.
    ChunkTooLarge { index: usize },
    MalformedCiphertext(String),
    Decode(FromUtf8Error),
    KeySize(u64),
    Key(KeyError),
    Io(io::Error),
}

impl RsaError {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RsaError::NoKey(which) => write!(f, "No {} key loaded, generate a key pair first", which),
            RsaError::NoInverse => write!(f, "Modular inverse does not exist"),
            RsaError::ChunkTooLarge { index } =>
                write!(f, "Chunk {} is too large for the current key size, lower the chunk length or raise the key bits", index),
            RsaError::MalformedCiphertext(token) => write!(f, "Malformed ciphertext block: {:?}", token),
            RsaError::Decode(e) => write!(f, "Decrypted bytes are not valid UTF-8: {}", e),
            RsaError::KeySize(bits) => write!(f, "Key size of {} bits is too small, need at least {}", bits, MIN_KEY_BITS),
            RsaError::Key(e) => write!(f, "{}", e),
            RsaError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Display for RsaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Debug for RsaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Error for RsaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RsaError::Decode(e) => Some(e),
            RsaError::Io(e) => Some(e),
            RsaError::Key(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FromUtf8Error> for RsaError {
    fn from(e: FromUtf8Error) -> Self {
        RsaError::Decode(e)
    }
}

impl From<io::Error> for RsaError {
    fn from(e: io::Error) -> Self {
        RsaError::Io(e)
    }
}

impl From<KeyError> for RsaError {
    fn from(e: KeyError) -> Self {
        RsaError::Key(e)
    }
}
