//! Encrypts and decrypts a message with an existing encryption key.
//!
//! This example shows how to:
//! - Build a client from `NCRYPTYR_BASE_URL` and `NCRYPTYR_API_KEY`
//! - Look up an encryption key
//! - Round-trip a message through `/encrypt` and `/decrypt`
//! - Tell structured errors apart from transport failures
//!
//! Run with: `NCRYPTYR_API_KEY=... cargo run --example encrypt_roundtrip -- <key-id> <message>`

use ncryptyr_client::types::DescribeEncryptionKeyCommand;
use ncryptyr_client::{Client, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("ncryptyr_client=debug,encrypt_roundtrip=info")
        .init();

    let mut args = std::env::args().skip(1);
    let key_id = args.next().unwrap_or_else(|| "default".to_string());
    let message = args.next().unwrap_or_else(|| "hello".to_string());

    let client = Client::from_env()?;
    println!("Using {}", client.base_url());

    let command = DescribeEncryptionKeyCommand { id: key_id.clone() };
    match client.describe_encryption_key(&command).await {
        Ok(key) => println!("Key {} ({}) created at {}", key.id, key.key_type, key.created_date),
        Err(Error::NotFound { message }) => {
            eprintln!("Key {} does not exist: {}", key_id, message);
            return Ok(());
        }
        Err(e) => return Err(e),
    }

    let ciphertext = client.encrypt(&key_id, &message).await?;
    println!("Ciphertext: {}", ciphertext);

    let plaintext = client.decrypt(&ciphertext).await?;
    println!("Plaintext:  {}", plaintext);

    Ok(())
}
