//! Coffre CLI - Command line interface.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coffre_crypto::{encoding, Algorithm};
use coffre_keyring::KeyMaterial;
use coffre_session::CipherSession;

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "coffre")]
#[command(about = "Coffre - symmetric key management and CBC encryption")]
#[command(version)]
struct Cli {
    /// Key file path
    #[arg(long, short, default_value = "coffre.key", env = "COFFRE_KEY_FILE")]
    key_file: PathBuf,

    /// Cipher algorithm (des, aes128, aes256)
    #[arg(long, short, default_value = "aes256", env = "COFFRE_ALGORITHM")]
    algorithm: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate key material and write it to the key file
    Keygen {
        /// Overwrite the key file if it already exists
        #[arg(long)]
        force: bool,
    },
    /// Encrypt a string and print the encoded ciphertext
    Encrypt {
        /// Plaintext (read from stdin when omitted)
        plaintext: Option<String>,
        /// Output encoding (base64, hex)
        #[arg(long, default_value = "base64")]
        format: String,
    },
    /// Decrypt an encoded ciphertext string and write the plaintext to stdout
    Decrypt {
        /// Encoded ciphertext
        ciphertext: String,
        /// Input encoding (base64, hex)
        #[arg(long, default_value = "base64")]
        format: String,
    },
    /// Encrypt a file (output starts with the IV header)
    EncryptFile {
        /// Input path
        input: PathBuf,
        /// Output path
        output: PathBuf,
    },
    /// Decrypt a file produced by encrypt-file
    DecryptFile {
        /// Input path
        input: PathBuf,
        /// Output path
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for ciphertext/plaintext
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let algorithm: Algorithm = cli
        .algorithm
        .parse()
        .with_context(|| format!("unsupported algorithm '{}'", cli.algorithm))?;

    match cli.command {
        Commands::Keygen { force } => keygen(algorithm, &cli.key_file, force),
        Commands::Encrypt { plaintext, format } => {
            encrypt_string(algorithm, &cli.key_file, plaintext, &format)
        }
        Commands::Decrypt { ciphertext, format } => {
            decrypt_string(algorithm, &cli.key_file, &ciphertext, &format)
        }
        Commands::EncryptFile { input, output } => {
            let material = load_material(algorithm, &cli.key_file)?;
            CipherSession::new(&material).encrypt_file(&input, &output)?;
            println!("Encrypted {} -> {}", input.display(), output.display());
            Ok(())
        }
        Commands::DecryptFile { input, output } => {
            let material = load_material(algorithm, &cli.key_file)?;
            CipherSession::new(&material).decrypt_file(&input, &output)?;
            println!("Decrypted {} -> {}", input.display(), output.display());
            Ok(())
        }
    }
}

// ============================================================================
// Command Handlers
// ============================================================================

fn keygen(algorithm: Algorithm, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "key file {} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let material = KeyMaterial::generate(algorithm)?;
    material.save_to_file(path)?;

    // Key bytes are deliberately never printed
    println!(
        "Key material ({}) written to {}",
        algorithm,
        path.display()
    );
    Ok(())
}

fn encrypt_string(
    algorithm: Algorithm,
    key_file: &Path,
    plaintext: Option<String>,
    format: &str,
) -> Result<()> {
    let material = load_material(algorithm, key_file)?;

    let plaintext = match plaintext {
        Some(text) => text.into_bytes(),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read plaintext from stdin")?;
            buf
        }
    };

    let ciphertext = CipherSession::new(&material).encrypt(&plaintext)?;
    println!("{}", encode(&ciphertext, format)?);
    Ok(())
}

fn decrypt_string(
    algorithm: Algorithm,
    key_file: &Path,
    ciphertext: &str,
    format: &str,
) -> Result<()> {
    let material = load_material(algorithm, key_file)?;

    let ciphertext = decode(ciphertext, format)?;
    let plaintext = CipherSession::new(&material).decrypt(&ciphertext)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&plaintext)?;
    stdout.flush()?;
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn load_material(algorithm: Algorithm, key_file: &Path) -> Result<KeyMaterial> {
    KeyMaterial::load_from_file(algorithm, key_file).with_context(|| {
        format!(
            "failed to load {} key material from {} (run `coffre keygen` first?)",
            algorithm,
            key_file.display()
        )
    })
}

fn encode(data: &[u8], format: &str) -> Result<String> {
    match format {
        "base64" => Ok(encoding::to_base64(data)),
        "hex" => Ok(encoding::to_hex(data)),
        _ => bail!("unsupported format '{format}' (expected base64 or hex)"),
    }
}

fn decode(text: &str, format: &str) -> Result<Vec<u8>> {
    match format {
        "base64" => Ok(encoding::from_base64(text)?),
        "hex" => Ok(encoding::from_hex(text)?),
        _ => bail!("unsupported format '{format}' (expected base64 or hex)"),
    }
}
