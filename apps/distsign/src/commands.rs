//! Command implementations

use crate::error::CliError;
use distsign_client::{Client, TrustStore, VerifiedDownload};
use distsign_config::Config;
use distsign_errors::Error;
use distsign_signing::{key_id, ArtifactSigner, KeyPair, RootSigner};
use serde_json::json;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Result of a command, rendered as text or JSON
#[derive(Debug)]
pub enum Output {
    Keygen {
        private: PathBuf,
        public: PathBuf,
        key_id: String,
    },
    Signed {
        input: PathBuf,
        signature: PathBuf,
        key_id: String,
    },
    Downloaded {
        dst: PathBuf,
        result: VerifiedDownload,
    },
}

impl Output {
    pub fn render(&self, json_mode: bool) {
        if json_mode {
            let value = match self {
                Output::Keygen {
                    private,
                    public,
                    key_id,
                } => json!({
                    "private": private.display().to_string(),
                    "public": public.display().to_string(),
                    "key_id": key_id,
                }),
                Output::Signed {
                    input,
                    signature,
                    key_id,
                } => json!({
                    "input": input.display().to_string(),
                    "signature": signature.display().to_string(),
                    "key_id": key_id,
                }),
                Output::Downloaded { dst, result } => json!({
                    "dst": dst.display().to_string(),
                    "size": result.size,
                    "sha512": result.digest.to_hex(),
                    "key_index": result.key_index,
                }),
            };
            println!("{value}");
            return;
        }

        match self {
            Output::Keygen {
                private,
                public,
                key_id,
            } => {
                println!("Generated key {key_id}");
                println!("  private: {}", private.display());
                println!("  public:  {}", public.display());
            }
            Output::Signed {
                input,
                signature,
                key_id,
            } => {
                println!(
                    "Signed {} with key {key_id} -> {}",
                    input.display(),
                    signature.display()
                );
            }
            Output::Downloaded { dst, result } => {
                println!("Verified {} ({} bytes)", dst.display(), result.size);
                println!("  sha512: {}", result.digest);
            }
        }
    }
}

/// Generate a key pair, refusing to replace existing files
pub async fn keygen(private: &Path, public: &Path) -> Result<Output, CliError> {
    for path in [private, public] {
        if fs::try_exists(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?
        {
            return Err(CliError::InvalidArguments(format!(
                "{} already exists, refusing to overwrite",
                path.display()
            )));
        }
    }

    let pair = KeyPair::generate();
    write_new(private, pair.private_pem().as_bytes(), true).await?;
    write_new(public, pair.public_pem().as_bytes(), false).await?;

    let key_id = key_id(&pair.public_key());
    info!(key = %key_id, "generated key pair");
    Ok(Output::Keygen {
        private: private.to_path_buf(),
        public: public.to_path_buf(),
        key_id,
    })
}

/// Sign a signing-key bundle with a root key
pub async fn sign_keys(
    root_key: &Path,
    bundle: &Path,
    out: Option<PathBuf>,
) -> Result<Output, CliError> {
    let signer = RootSigner::load(root_key).await?;
    let data = fs::read(bundle)
        .await
        .map_err(|e| Error::io_with_path(&e, bundle))?;
    let signature = signer.sign_signing_keys(&data)?;

    let out = out.unwrap_or_else(|| signature_path(bundle));
    write_file(&out, &signature.to_bytes()).await?;

    Ok(Output::Signed {
        input: bundle.to_path_buf(),
        signature: out,
        key_id: key_id(&signer.verifying_key()),
    })
}

/// Sign a file with a signing key
pub async fn sign(key: &Path, file: &Path, out: Option<PathBuf>) -> Result<Output, CliError> {
    let signer = ArtifactSigner::load(key).await?;
    let signature = signer.sign_file(file).await?;

    let out = out.unwrap_or_else(|| signature_path(file));
    write_file(&out, &signature.to_bytes()).await?;

    Ok(Output::Signed {
        input: file.to_path_buf(),
        signature: out,
        key_id: key_id(&signer.verifying_key()),
    })
}

/// Download `src` into `dst` through a sibling partial file.
///
/// `dst` is only replaced once the signature has validated; the partial
/// file is removed on every failure.
pub async fn download(
    config: &Config,
    roots: TrustStore,
    src: &str,
    dst: &Path,
) -> Result<Output, CliError> {
    let client = Client::from_config(roots, config)?;
    let partial = partial_path(dst);

    let result = match client.download(src, &partial).await {
        Ok(result) => result,
        Err(e) => {
            if let Err(remove) = fs::remove_file(&partial).await {
                if remove.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %partial.display(), error = %remove, "failed to remove partial download");
                }
            }
            return Err(e.into());
        }
    };

    fs::rename(&partial, dst)
        .await
        .map_err(|e| Error::io_with_path(&e, dst))?;

    Ok(Output::Downloaded {
        dst: dst.to_path_buf(),
        result,
    })
}

fn signature_path(path: &Path) -> PathBuf {
    append_extension(path, ".sig")
}

fn partial_path(path: &Path) -> PathBuf {
    append_extension(path, ".partial")
}

fn append_extension(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), Error> {
    fs::write(path, contents)
        .await
        .map_err(|e| Error::io_with_path(&e, path))
}

async fn write_new(path: &Path, contents: &[u8], private: bool) -> Result<(), Error> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    if private {
        options.mode(0o600);
    }
    #[cfg(not(unix))]
    let _ = private;

    let mut file = options
        .open(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;
    file.write_all(contents)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;
    file.sync_all()
        .await
        .map_err(|e| Error::io_with_path(&e, path))
}
