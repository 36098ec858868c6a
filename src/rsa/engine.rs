use num_bigint::BigInt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::io::{AsyncRead, AsyncReadExt};
use crate::rsa::codec::*;
use crate::rsa::config::EngineConfig;
use crate::rsa::error::RsaError;
use crate::rsa::keys::{Key, KeyPair};
use crate::rsa::process::process;
use crate::verbose;

pub const TEXT_PLAIN: &str = "text/plain";
pub const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// UTF-8 input, chunked by characters.
    Text,
    /// Raw bytes, chunked by bytes.
    Binary,
}

/// Result of a file transform: the bytes to hand back plus how to label them.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Holds the active keys and the entropy source used to generate them.
///
/// `StdRng` is the default; it is seeded from the OS but nothing here is hardened, so this is
/// for teaching and testing, not for protecting data.
pub struct RsaEngine<R: Rng = StdRng> {
    pub config: EngineConfig,
    public: Option<Key>,
    private: Option<Key>,
    rng: R,
}

impl RsaEngine<StdRng> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn seeded(config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RsaEngine<R> {
    pub fn with_rng(config: EngineConfig, rng: R) -> Self {
        Self { config, public: None, private: None, rng }
    }

    /// Replaces both keys at once. On error the previous keys stay loaded.
    pub fn generate_keys(&mut self, bits: u64) -> Result<KeyPair, RsaError> {
        let keys = KeyPair::generate(bits, self.config.rounds, &mut self.rng)?;
        verbose!("generated {}-bit key pair", bits);
        self.public = Some(keys.public.clone());
        self.private = Some(keys.private.clone());
        Ok(keys)
    }

    pub fn load_public(&mut self, key: Key) {
        self.public = Some(key);
    }

    pub fn load_private(&mut self, key: Key) {
        self.private = Some(key);
    }

    pub fn public_key(&self) -> Option<&Key> {
        self.public.as_ref()
    }

    pub fn private_key(&self) -> Option<&Key> {
        self.private.as_ref()
    }

    fn encrypt_chunks(&self, chunks: &[&[u8]]) -> Result<Ciphertext, RsaError> {
        let key = self.public.as_ref().ok_or(RsaError::NoKey("public"))?;
        let blocks = chunks.iter()
            .enumerate()
            .map(|(index, chunk)| {
                let m = text_to_int(chunk);
                if m >= key.m { Err(RsaError::ChunkTooLarge { index }) } else { Ok(m) }
            })
            .collect::<Result<Vec<_>, _>>()?;
        verbose!("encrypt {} chunks", blocks.len());
        Ok(Ciphertext { blocks: process(blocks, key, self.config.threads, self.config.progress) })
    }

    fn decrypt_chunks(&self, ciphertext: &Ciphertext) -> Result<Vec<BigInt>, RsaError> {
        let key = self.private.as_ref().ok_or(RsaError::NoKey("private"))?;
        verbose!("decrypt {} blocks", ciphertext.blocks.len());
        Ok(process(ciphertext.blocks.clone(), key, self.config.threads, self.config.progress))
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<Ciphertext, RsaError> {
        let chunks = split_text(plaintext, self.config.chunk_len)
            .into_iter()
            .map(|c| c.as_bytes())
            .collect::<Vec<_>>();
        self.encrypt_chunks(&chunks)
    }

    /// Every chunk must decode on its own; a failure is reported, never replaced.
    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<String, RsaError> {
        self.decrypt_chunks(ciphertext)?
            .iter()
            .map(|m| decode_text(int_to_bytes(m)))
            .collect::<Result<String, _>>()
    }

    pub fn encrypt_bytes(&self, data: &[u8]) -> Result<Ciphertext, RsaError> {
        self.encrypt_chunks(&split_bytes(data, self.config.chunk_len))
    }

    /// Chunks that started with 0x00 come back without their leading zero bytes.
    pub fn decrypt_bytes(&self, ciphertext: &Ciphertext) -> Result<Vec<u8>, RsaError> {
        Ok(self.decrypt_chunks(ciphertext)?
            .iter()
            .flat_map(|m| int_to_bytes(m))
            .collect())
    }

    pub fn encrypt_str(&self, plaintext: &str) -> Result<String, RsaError> {
        Ok(self.encrypt(plaintext)?.to_string())
    }

    pub fn decrypt_str(&self, ciphertext: &str) -> Result<String, RsaError> {
        self.decrypt(&ciphertext.parse()?)
    }

    /// Reads the whole source, then encrypts. The read is the only await.
    pub async fn encrypt_file<S: AsyncRead + Unpin>(&self, source: &mut S, mode: FileMode) -> Result<Payload, RsaError> {
        if self.public.is_none() { return Err(RsaError::NoKey("public")); }
        let data = read_all(source).await?;
        let ciphertext = match mode {
            FileMode::Text => self.encrypt(&decode_text(data)?)?,
            FileMode::Binary => self.encrypt_bytes(&data)?,
        };
        Ok(Payload { bytes: ciphertext.to_string().into_bytes(), content_type: TEXT_PLAIN })
    }

    pub async fn decrypt_file<S: AsyncRead + Unpin>(&self, source: &mut S, mode: FileMode) -> Result<Payload, RsaError> {
        if self.private.is_none() { return Err(RsaError::NoKey("private")); }
        let data = read_all(source).await?;
        let text = String::from_utf8(data)
            .map_err(|e| RsaError::MalformedCiphertext(String::from_utf8_lossy(e.as_bytes()).into_owned()))?;
        let ciphertext = text.parse::<Ciphertext>()?;
        Ok(match mode {
            FileMode::Text => Payload { bytes: self.decrypt(&ciphertext)?.into_bytes(), content_type: TEXT_PLAIN },
            FileMode::Binary => Payload { bytes: self.decrypt_bytes(&ciphertext)?, content_type: OCTET_STREAM },
        })
    }
}

pub async fn read_all<S: AsyncRead + Unpin>(source: &mut S) -> Result<Vec<u8>, RsaError> {
    let mut data = Vec::new();
    source.read_to_end(&mut data).await?;
    verbose!("read {} bytes", data.len());
    Ok(data)
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use num_bigint::BigInt;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use super::*;

    fn toy_engine(chunk_len: usize) -> RsaEngine {
        let mut engine = RsaEngine::seeded(EngineConfig { chunk_len, ..EngineConfig::default() }, 0);
        engine.load_public(Key { base: BigInt::from(17), m: BigInt::from(3233) });
        engine.load_private(Key { base: BigInt::from(2753), m: BigInt::from(3233) });
        engine
    }

    #[test]
    fn round_trip_text() -> Result<(), Box<dyn Error>> {
        let mut engine = RsaEngine::seeded(EngineConfig::default(), 11);
        engine.generate_keys(512)?;
        let long = "0123456789".repeat(23);
        for msg in ["", "Hello, RSA Encryption!", long.as_str()] {
            let c = engine.encrypt(msg)?;
            assert_eq!(c.blocks.len(), (msg.len() + 49) / 50);
            assert_eq!(engine.decrypt(&c)?, msg);
        }
        Ok(())
    }

    #[test]
    fn round_trip_small_key() -> Result<(), Box<dyn Error>> {
        let mut engine = RsaEngine::seeded(EngineConfig { chunk_len: 4, threads: 3, ..EngineConfig::default() }, 64);
        engine.generate_keys(64)?;
        let msg = "textbook RSA, no padding";
        let c = engine.encrypt_str(msg)?;
        assert_eq!(engine.decrypt_str(&c)?, msg);
        Ok(())
    }

    #[test]
    fn round_trip_multibyte_text() -> Result<(), Box<dyn Error>> {
        let mut engine = RsaEngine::seeded(EngineConfig { chunk_len: 10, ..EngineConfig::default() }, 5);
        engine.generate_keys(512)?;
        let msg = "Grüße, 世界! ünïcödé chunks split on characters ✓";
        assert_eq!(engine.decrypt(&engine.encrypt(msg)?)?, msg);
        Ok(())
    }

    #[test]
    fn round_trip_bytes() -> Result<(), Box<dyn Error>> {
        let mut engine = RsaEngine::seeded(EngineConfig { chunk_len: 16, threads: 4, ..EngineConfig::default() }, 9);
        engine.generate_keys(256)?;
        let mut rng = StdRng::seed_from_u64(99);
        // first byte of every chunk non-zero so nothing is lost
        let data = (0..300).map(|i| if i % 16 == 0 { rng.gen_range(1..=255) } else { rng.gen() }).collect::<Vec<u8>>();
        let c = engine.encrypt_bytes(&data)?;
        assert_eq!(engine.decrypt_bytes(&c)?, data);
        Ok(())
    }

    #[test]
    fn operations_need_keys() {
        let engine = RsaEngine::seeded(EngineConfig::default(), 1);
        assert!(matches!(engine.encrypt("hi"), Err(RsaError::NoKey("public"))));
        assert!(matches!(engine.decrypt_str("12"), Err(RsaError::NoKey("private"))));
        assert!(matches!(engine.encrypt_bytes(b"hi"), Err(RsaError::NoKey("public"))));
    }

    #[test]
    fn chunk_boundary_at_modulus() -> Result<(), Box<dyn Error>> {
        let engine = toy_engine(2);
        // 3233 == 0x0ca1
        let c = engine.encrypt_bytes(&[0x0c, 0xa0])?;
        assert_eq!(engine.decrypt_bytes(&c)?, vec![0x0c, 0xa0]);
        assert!(matches!(engine.encrypt_bytes(&[0x0c, 0xa1]), Err(RsaError::ChunkTooLarge { index: 0 })));
        assert!(matches!(engine.encrypt_bytes(&[0x01, 0x01, 0xff, 0xff]), Err(RsaError::ChunkTooLarge { index: 1 })));
        Ok(())
    }

    #[test]
    fn too_long_chunk_for_key() -> Result<(), Box<dyn Error>> {
        let mut engine = RsaEngine::seeded(EngineConfig::default(), 2);
        engine.generate_keys(64)?;
        assert!(matches!(engine.encrypt(&"x".repeat(50)), Err(RsaError::ChunkTooLarge { index: 0 })));
        Ok(())
    }

    #[test]
    fn failed_generation_keeps_old_keys() -> Result<(), Box<dyn Error>> {
        let mut engine = RsaEngine::seeded(EngineConfig::default(), 4);
        let keys = engine.generate_keys(64)?;
        assert!(engine.generate_keys(8).is_err());
        assert_eq!(engine.public_key(), Some(&keys.public));
        assert_eq!(engine.private_key(), Some(&keys.private));
        let replaced = engine.generate_keys(64)?;
        assert_ne!(replaced.public.m, keys.public.m);
        assert_eq!(engine.public_key(), Some(&replaced.public));
        Ok(())
    }

    #[test]
    fn malformed_and_empty_ciphertext() -> Result<(), Box<dyn Error>> {
        let engine = toy_engine(1);
        assert!(matches!(engine.decrypt_str("12a|34"), Err(RsaError::MalformedCiphertext(_))));
        assert_eq!(engine.decrypt_str("")?, "");
        Ok(())
    }

    #[test]
    fn undecodable_plaintext_is_an_error() -> Result<(), Box<dyn Error>> {
        let engine = toy_engine(1);
        let c = engine.encrypt_bytes(&[0xff])?;
        assert!(matches!(engine.decrypt(&c), Err(RsaError::Decode(_))));
        assert_eq!(engine.decrypt_bytes(&c)?, vec![0xff]);
        Ok(())
    }

    #[test]
    fn leading_zero_chunks_lose_zeros() -> Result<(), Box<dyn Error>> {
        let engine = toy_engine(2);
        let c = engine.encrypt_bytes(&[0x00, 0x05, 0x01, 0x02])?;
        assert_eq!(engine.decrypt_bytes(&c)?, vec![0x05, 0x01, 0x02]);
        Ok(())
    }

    #[test]
    fn blocks_never_contain_separator() -> Result<(), Box<dyn Error>> {
        let mut engine = RsaEngine::seeded(EngineConfig { chunk_len: 8, ..EngineConfig::default() }, 77);
        engine.generate_keys(128)?;
        let mut rng = StdRng::seed_from_u64(78);
        for _ in 0..30 {
            let len = rng.gen_range(0..100);
            let msg = (0..len).map(|_| rng.gen_range(' '..='~')).collect::<String>();
            let c = engine.encrypt_str(&msg)?;
            if !msg.is_empty() {
                assert!(c.split('|').all(|t| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit())));
            }
            assert_eq!(engine.decrypt_str(&c)?, msg);
        }
        Ok(())
    }

    #[tokio::test]
    async fn file_round_trip_text() -> Result<(), Box<dyn Error>> {
        let mut engine = RsaEngine::seeded(EngineConfig::default(), 21);
        engine.generate_keys(512)?;
        let source = "line one\nline two\n".repeat(10);
        let encrypted = engine.encrypt_file(&mut source.as_bytes(), FileMode::Text).await?;
        assert_eq!(encrypted.content_type, TEXT_PLAIN);
        let decrypted = engine.decrypt_file(&mut encrypted.bytes.as_slice(), FileMode::Text).await?;
        assert_eq!(decrypted.content_type, TEXT_PLAIN);
        assert_eq!(decrypted.bytes, source.into_bytes());
        Ok(())
    }

    #[tokio::test]
    async fn file_round_trip_binary() -> Result<(), Box<dyn Error>> {
        let mut engine = RsaEngine::seeded(EngineConfig { chunk_len: 20, ..EngineConfig::default() }, 22);
        engine.generate_keys(256)?;
        let source = (1..=200u8).collect::<Vec<_>>();
        let encrypted = engine.encrypt_file(&mut source.as_slice(), FileMode::Binary).await?;
        let decrypted = engine.decrypt_file(&mut encrypted.bytes.as_slice(), FileMode::Binary).await?;
        assert_eq!(decrypted.content_type, OCTET_STREAM);
        assert_eq!(decrypted.bytes, source);
        Ok(())
    }

    #[tokio::test]
    async fn file_errors() {
        let engine = toy_engine(1);
        let mut bad_text: &[u8] = &[0xc3, 0x28];
        assert!(matches!(engine.encrypt_file(&mut bad_text, FileMode::Text).await, Err(RsaError::Decode(_))));
        let mut bad_cipher: &[u8] = &[b'1', 0xff];
        assert!(matches!(engine.decrypt_file(&mut bad_cipher, FileMode::Text).await, Err(RsaError::MalformedCiphertext(_))));
        let empty = RsaEngine::seeded(EngineConfig::default(), 0);
        assert!(matches!(empty.encrypt_file(&mut &b"x"[..], FileMode::Text).await, Err(RsaError::NoKey("public"))));
    }
}
