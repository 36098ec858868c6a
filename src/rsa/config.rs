use lazy_static::lazy_static;
use mut_static::MutStatic;
use num_cpus;
use crate::RSA;

lazy_static! {
    pub static ref CONFIG_DEF: RSA = RSA {
        mode: String::from("generate"),
        key: String::from(""),
        message: String::from("Hello, RSA Encryption!"),
        input: String::from("stdin"),
        output: String::from("stdout"),
        bits: 1024,
        chunk_len: 50,
        rounds: 5,
        binary: false,
        silent: false,
        threads: num_cpus::get(),
        seed: None,
    };
    pub static ref SILENT: MutStatic<bool> =
        MutStatic::new();
}

/// Unset counts as verbose, so tests and library callers still see progress output.
pub fn silent() -> bool {
    match SILENT.read() {
        Ok(s) => *s,
        Err(_) => false,
    }
}

#[macro_export]
macro_rules! verbose {
    ($($arg: tt)*) => {
        if !$crate::rsa::config::silent() { println!($($arg)*); }
    };
}

/// Knobs the engine needs at encrypt / decrypt / generate time.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Chunk length in characters (text) or bytes (binary).
    pub chunk_len: usize,
    /// Miller-Rabin rounds per candidate.
    pub rounds: u32,
    pub threads: usize,
    pub progress: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let r = CONFIG_DEF.get();
        Self {
            chunk_len: r.chunk_len,
            rounds: r.rounds,
            threads: 1,
            progress: false,
        }
    }
}

impl From<&RSA> for EngineConfig {
    fn from(r: &RSA) -> Self {
        Self {
            chunk_len: r.chunk_len,
            rounds: r.rounds,
            threads: r.threads.max(1),
            progress: !r.silent,
        }
    }
}
