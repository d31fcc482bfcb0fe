//! Operator tooling for the encrypted key-file format `trustora-keys`
//! implements, mirroring `original_source`'s `scripts/encrypt_key.py`
//! and `scripts/decrypt_test.py`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "trustora-keytool")]
#[command(about = "Encrypt or verify signer key files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypts a plaintext private key (or a JSON array of keys) into
    /// a key file, mirroring `encrypt_key.py`.
    Encrypt {
        /// Plaintext private key, or a JSON array of hex-encoded keys.
        #[arg(long)]
        key: String,
        /// Output path for the encrypted blob.
        #[arg(long)]
        out: PathBuf,
        /// Passphrase the key file is encrypted under.
        #[arg(long = "encryption-key")]
        encryption_key: String,
    },
    /// Decrypts a key file and reports success without printing any
    /// key material, mirroring `decrypt_test.py`.
    DecryptCheck {
        /// Path to the encrypted key file.
        #[arg(long)]
        file: PathBuf,
        /// Passphrase the key file is encrypted under.
        #[arg(long = "encryption-key")]
        encryption_key: String,
    },
}

fn parse_key_list(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(keys) => keys,
        Err(_) => vec![raw.to_owned()],
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trustora_keytool=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Encrypt { key, out, encryption_key } => {
            let keys = parse_key_list(&key);
            let encrypted = trustora_keys::encrypt_key_list(&keys, &encryption_key)?;
            std::fs::write(&out, encrypted)?;
            println!("Encrypted key written to {}", out.display());
        }
        Command::DecryptCheck { file, encryption_key } => {
            let bytes = std::fs::read(&file)?;
            let keys = trustora_keys::decrypt_key_list(&bytes, &encryption_key)?;
            println!("Decryption succeeded ({} key(s)).", keys.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_array_of_keys() {
        let parsed = parse_key_list(r#"["key-one", "key-two"]"#);
        assert_eq!(parsed, vec!["key-one".to_owned(), "key-two".to_owned()]);
    }

    #[test]
    fn falls_back_to_single_key_when_not_json() {
        let parsed = parse_key_list("a-bare-hex-key");
        assert_eq!(parsed, vec!["a-bare-hex-key".to_owned()]);
    }
}
