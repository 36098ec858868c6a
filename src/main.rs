mod rsa;

pub use crate::rsa::*;
pub use crate::rsa::config::SILENT;
pub use crate::RSA;

use std::error::Error;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut rsa = RSA::parse();
    if rsa.output == "stdout" && rsa.mode != "test" {
        rsa.silent = true;
    }
    if !SILENT.is_set()? { SILENT.set(rsa.silent)?; }
    if !rsa.silent { println!("Run args: {:?}", rsa); }
    rsa.run().await?;
    Ok(())
}
