//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// distsign - sign and verify distributable files
#[derive(Parser)]
#[command(name = "distsign")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sign and verify distributable files with two-tier Ed25519 keys")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a new Ed25519 key pair
    Keygen {
        /// Where to write the private key
        #[arg(long, value_name = "PATH")]
        private: PathBuf,

        /// Where to write the public key
        #[arg(long, value_name = "PATH")]
        public: PathBuf,
    },

    /// Sign a signing-key bundle with a root key
    SignKeys {
        /// Root private key
        #[arg(long, value_name = "PATH")]
        root_key: PathBuf,

        /// Bundle of signing public keys (distsign.pub)
        #[arg(long, value_name = "PATH")]
        bundle: PathBuf,

        /// Signature output (defaults to <bundle>.sig)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// Sign a file with a signing key
    Sign {
        /// Signing private key
        #[arg(long, value_name = "PATH")]
        key: PathBuf,

        /// File to sign
        file: PathBuf,

        /// Signature output (defaults to <file>.sig)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// Download a file and verify its signature
    #[command(alias = "dl")]
    Download {
        /// Base URL of the distribution server
        #[arg(long, env = "DISTSIGN_SERVER_URL")]
        url: Option<String>,

        /// Path of the file on the server
        src: String,

        /// Local destination
        dst: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_download() {
        let cli = Cli::try_parse_from([
            "distsign",
            "--json",
            "download",
            "--url",
            "https://dl.example.com/",
            "hello",
            "/tmp/hello",
        ])
        .unwrap();
        assert!(cli.global.json);
        match cli.command {
            Commands::Download { url, src, dst } => {
                assert_eq!(url.as_deref(), Some("https://dl.example.com/"));
                assert_eq!(src, "hello");
                assert_eq!(dst, PathBuf::from("/tmp/hello"));
            }
            _ => panic!("expected download"),
        }
    }

    #[test]
    fn test_sign_keys_requires_bundle() {
        assert!(Cli::try_parse_from(["distsign", "sign-keys", "--root-key", "root.key"]).is_err());
    }
}
