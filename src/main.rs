use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
mod auth;
use keyseal::{KdfParams, KeyPair, KeystoreCodec, Storage, default_storage, format};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

#[derive(Debug, clap::Args)]
struct Pbkdf2Args {
    /// PBKDF2 iteration count (default: 262144)
    #[arg(long = "pbkdf2-iterations", value_name = "N")]
    iterations: Option<u32>,
}

impl Pbkdf2Args {
    fn to_kdf_params(&self) -> Result<KdfParams> {
        match self.iterations {
            Some(n) => Ok(KdfParams::new(n)?),
            None => Ok(KdfParams::default()),
        }
    }
}

#[derive(Debug, clap::Args)]
#[group(required = true, multiple = false)]
struct KeySource {
    /// Hex-encoded Ed25519 private key (32-byte seed or 64-byte seed||public)
    #[arg(long, value_name = "HEX", env = "KEYSEAL_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Generate a fresh key pair
    #[arg(long)]
    generate: bool,
}

impl KeySource {
    fn into_key_pair(self) -> Result<KeyPair> {
        match self.private_key {
            Some(hex_key) => {
                let hex_key = Zeroizing::new(hex_key);
                let bytes = Zeroizing::new(
                    hex::decode(hex_key.trim()).context("private key is not valid hex")?,
                );
                Ok(KeyPair::from_private_key(&bytes)?)
            }
            None if self.generate => Ok(KeyPair::generate()?),
            None => bail!("either --private-key or --generate is required"),
        }
    }
}

fn resolve_storage(path: Option<PathBuf>) -> Result<Storage> {
    match path {
        Some(p) => Ok(Storage::new(p)),
        None => default_storage(),
    }
}

#[derive(Debug, Parser)]
#[command(name = "keyseal")]
#[command(version, about = "Passphrase-encrypted keystore for Ed25519 signing keys.")]
struct Cli {
    /// Path to the keystore document
    #[arg(long, global = true, value_name = "PATH", env = "KEYSEAL_PATH")]
    keystore: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts a private key into a new keystore
    Create {
        #[command(flatten)]
        key: KeySource,

        #[command(flatten)]
        pbkdf2: Pbkdf2Args,
    },

    /// Decrypts the keystore and prints the public key
    Show {
        /// Also print the private key
        #[arg(long, default_value_t = false)]
        reveal: bool,
    },

    /// Shows the keystore parameters without decrypting
    Info,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("KEYSEAL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Cli::parse();
    let storage = resolve_storage(args.keystore)?;

    match args.command {
        Commands::Create { key, pbkdf2 } => {
            if storage.exists() {
                bail!("keystore already exists at {}", storage.path().display());
            }
            let kdf = pbkdf2.to_kdf_params()?;
            let pair = key.into_key_pair()?;
            let passphrase = auth::read_new_passphrase_with_confirmation()?;

            let document = KeystoreCodec::new()
                .with_kdf(kdf)
                .encode(pair.private_key(), &passphrase)?;
            drop(passphrase);

            storage.save(&document)?;
            tracing::info!(path = %storage.path().display(), "keystore written");
            println!("keystore created");
            println!("public key: {}", pair.public_key_hex());
        }

        Commands::Show { reveal } => {
            let document = load_existing(&storage)?;
            let passphrase = auth::read_passphrase()?;
            let pair = KeystoreCodec::new().decode(&document, &passphrase)?;
            drop(passphrase);

            println!("public key: {}", pair.public_key_hex());
            if reveal {
                let private_hex = Zeroizing::new(hex::encode(pair.private_key()));
                println!("private key: {}", private_hex.as_str());
            }
        }

        Commands::Info => {
            let document = load_existing(&storage)?;
            let file = format::parse(&document)?;
            let kdf = file.kdf_params();

            println!("path:       {}", storage.path().display());
            println!("version:    {}", file.version());
            println!("cipher:     {}", file.cipher().as_str());
            println!("kdf:        {}", file.kdf().as_str());
            println!("prf:        {}", kdf.prf().as_str());
            println!("iterations: {}", kdf.iterations());
            println!("dkLen:      {}", kdf.dk_len());
        }
    }

    Ok(())
}

fn load_existing(storage: &Storage) -> Result<Vec<u8>> {
    if !storage.exists() {
        bail!("keystore does not exist at {}", storage.path().display());
    }
    storage.load()
}
