use std::error::Error;
use std::fs::File;
use std::io;
use std::io::Write;
use clap::Parser;
use tokio::io::AsyncRead;

pub mod arith;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod keys;
pub mod prime_gen;
pub mod process;

use config::*;
use engine::*;
use error::RsaError;
use keys::Key;
use crate::verbose;

#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    Generate,
    Encrypt,
    Decrypt,
    Test,
}

#[macro_export]
macro_rules! rsa_t {
    ($CONFIG: expr, $NAME: ident) => {
#[derive(Debug, Clone, Parser)]
pub struct $NAME {
    #[clap(short, long, value_parser, default_value = $CONFIG.mode.as_str(), help = "Run mode: generate, encrypt, decrypt, test")]
    pub mode: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.key.as_str(), help = "Key as `(exponent, modulus)', public for encrypt, private for decrypt")]
    pub key: String,
    #[clap(long, value_parser, default_value = $CONFIG.message.as_str(), help = "Message round-tripped in test mode")]
    pub message: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.input.as_str(), help = "Input filename")]
    pub input: String,
    #[clap(short, long, value_parser, default_value = $CONFIG.output.as_str(), help = "Output filename")]
    pub output: String,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.bits, help = "Key size in bits")]
    pub bits: u64,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.chunk_len, help = "Plaintext chunk length, characters (or bytes with --binary)")]
    pub chunk_len: usize,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.rounds, help = "Miller Rabin calculate rounds")]
    pub rounds: u32,
    #[clap(long, value_parser, default_value_t = $CONFIG.binary, help = "Treat input as raw bytes instead of UTF-8 text")]
    pub binary: bool,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.silent, help = "Disable log output")]
    pub silent: bool,
    #[clap(short, long, value_parser, default_value_t = $CONFIG.threads, help = "Calculate in <THREADS> threads")]
    pub threads: usize,
    #[clap(long, value_parser, help = "Seed the random source, for reproducible keys")]
    pub seed: Option<u64>,
}
    };
}

rsa_t!(CONFIG_DEF, RSA);

impl RSA {
    pub fn get(&self) -> &RSA {
        self
    }

    pub async fn reader(&self) -> Result<Box<dyn AsyncRead + Unpin>, RsaError> {
        Ok(match self.input.as_str() {
            "stdin" => Box::new(tokio::io::stdin()),
            f => Box::new(tokio::fs::File::open(f).await?),
        })
    }

    pub fn writer(&mut self) -> Result<Box<dyn Write>, RsaError> {
        Ok(match self.output.as_str() {
            "stdout" => {
                self.silent = true;
                Box::new(io::stdout())
            }
            f => Box::new(File::create(f)?),
        })
    }

    fn run_mode(&self) -> Result<RunMode, String> {
        match self.mode.as_str() {
            "encrypt" | "encode" => Ok(RunMode::Encrypt),
            "decrypt" | "decode" => Ok(RunMode::Decrypt),
            "generate" => Ok(RunMode::Generate),
            "test" => Ok(RunMode::Test),
            m => Err(format!("Unknown run mode {:?}! available: generate(default), encrypt, decrypt, test", m)),
        }
    }

    fn file_mode(&self) -> FileMode {
        if self.binary { FileMode::Binary } else { FileMode::Text }
    }

    pub fn engine(&self) -> RsaEngine {
        let config = EngineConfig::from(self);
        match self.seed {
            Some(seed) => RsaEngine::seeded(config, seed),
            None => RsaEngine::new(config),
        }
    }

    fn key(&self) -> Result<Key, RsaError> {
        if self.key.is_empty() {
            return Err(RsaError::NoKey(match self.run_mode() {
                Ok(RunMode::Decrypt) => "private",
                _ => "public",
            }));
        }
        Ok(self.key.parse::<Key>()?)
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn Error>> {
        match self.run_mode()? {
            RunMode::Generate => {
                let mut engine = self.engine();
                let key_pair = engine.generate_keys(self.bits)?;
                let mut writer = self.writer()?;
                writeln!(writer, "Public Key (e, n): {}", key_pair.public)?;
                writeln!(writer, "Private Key (d, n): {}", key_pair.private)?;
                writer.flush()?;
            }
            RunMode::Test => {
                let mut engine = self.engine();
                let key_pair = engine.generate_keys(self.bits)?;
                println!("Public Key (e, n): {}", key_pair.public);
                println!("Private Key (d, n): {}", key_pair.private);
                println!("\nOriginal Message: {}", self.message);
                let ciphertext = engine.encrypt_str(&self.message)?;
                println!("Encrypted: {}", ciphertext);
                let decrypted = engine.decrypt_str(&ciphertext)?;
                println!("Decrypted: {}", decrypted);
                if decrypted != self.message {
                    return Err("Test failed: decrypted message differs".into());
                }
                verbose!("Test pass");
            }
            mode @ (RunMode::Encrypt | RunMode::Decrypt) => {
                let key = self.key()?;
                let mut writer = self.writer()?;
                let mut engine = self.engine();
                let mut reader = self.reader().await?;
                let payload = if mode == RunMode::Encrypt {
                    engine.load_public(key);
                    engine.encrypt_file(&mut reader, self.file_mode()).await?
                } else {
                    engine.load_private(key);
                    engine.decrypt_file(&mut reader, self.file_mode()).await?
                };
                writer.write_all(&payload.bytes)?;
                writer.flush()?;
                verbose!("Done, wrote {} bytes of {}", payload.bytes.len(), payload.content_type);
            }
        }
        Ok(())
    }
}
