//! Download-and-verify client

use distsign_config::Config;
use distsign_errors::{Error, FetchError, TrustError, VerificationError};
use distsign_hash::Hash;
use distsign_net::{fetch_to_file, fetch_to_memory, parse_url, FetchOptions, NetClient, NetConfig};
use distsign_signing::{
    key_id, Signature, SigningKeyBundle, TrustStore, BUNDLE_SIZE_LIMIT, DOWNLOAD_SIZE_LIMIT,
    SIGNATURE_LENGTH,
};
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

/// Path of the signing-key bundle under the base URL
pub const BUNDLE_PATH: &str = "distsign.pub";

/// Suffix appended to a path to find its detached signature
pub const SIGNATURE_SUFFIX: &str = ".sig";

const SIGNATURE_LIMIT: u64 = SIGNATURE_LENGTH as u64;

/// Outcome of a download whose signature validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedDownload {
    /// SHA-512 of the bytes written to the destination
    pub digest: Hash,
    pub size: u64,
    /// Position of the validating key in the signing-key bundle
    pub key_index: usize,
}

/// Fetches files from a distribution server and verifies them against the
/// signing keys currently published there.
///
/// The bundle is fetched and checked against the root keys on every
/// download. Nothing is cached between calls, so clones can be used from
/// several tasks at once.
///
/// A per-call deadline set with [`Client::with_call_deadline`] starts
/// when each [`Client::download`] or [`Client::signing_keys`] call begins
/// and covers every fetch in that call.
#[derive(Debug, Clone)]
pub struct Client {
    roots: TrustStore,
    base: Url,
    net: NetClient,
    options: FetchOptions,
    call_deadline: Option<Duration>,
}

impl Client {
    /// # Errors
    /// Returns [`FetchError::InvalidUrl`] if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(roots: TrustStore, base_url: &str, net: NetClient) -> Result<Self, Error> {
        let base = parse_url(base_url)?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(format!("{base_url}: cannot be a base URL")).into());
        }
        Ok(Self {
            roots,
            base,
            net,
            options: FetchOptions::default(),
            call_deadline: None,
        })
    }

    /// Build a client from loaded configuration.
    ///
    /// A configured `[download] deadline` bounds each download separately.
    ///
    /// # Errors
    /// Returns an error if no server URL is configured, the URL is invalid,
    /// or the HTTP client cannot be created.
    pub fn from_config(roots: TrustStore, config: &Config) -> Result<Self, Error> {
        let net = NetClient::new(&NetConfig::from(&config.network))?;
        let mut client = Self::new(roots, config.server_url()?, net)?;
        client.call_deadline = config.download.deadline();
        Ok(client)
    }

    /// Replace the deadline and cancellation applied to every fetch
    #[must_use]
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Limit each call to `deadline`, measured from the start of the call.
    /// An absolute deadline from [`Client::with_options`] still applies if
    /// it is earlier.
    #[must_use]
    pub fn with_call_deadline(mut self, deadline: Duration) -> Self {
        self.call_deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    #[must_use]
    pub fn roots(&self) -> &TrustStore {
        &self.roots
    }

    /// Resolve `path` under the base URL, one segment at a time.
    ///
    /// # Errors
    /// Returns [`FetchError::InvalidUrl`] for an empty path or one with
    /// `.` or `..` segments.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Err(FetchError::InvalidUrl(format!("{path:?}: empty path")).into());
        }
        if segments.iter().any(|s| *s == "." || *s == "..") {
            return Err(
                FetchError::InvalidUrl(format!("{path:?}: relative path segments")).into(),
            );
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl(format!("{}: cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(&segments);
        Ok(url)
    }

    /// Fetch the signing-key bundle and check it against the root keys.
    ///
    /// # Errors
    /// Returns a fetch error if either file cannot be retrieved,
    /// [`TrustError`] if the bundle signature is malformed or no root key
    /// validates it, and a parse error if the bundle holds no usable keys.
    pub async fn signing_keys(&self) -> Result<SigningKeyBundle, Error> {
        self.fetch_signing_keys(&self.call_options()).await
    }

    async fn fetch_signing_keys(&self, options: &FetchOptions) -> Result<SigningKeyBundle, Error> {
        let bundle_url = self.url(BUNDLE_PATH)?;
        let signature_url = self.url(&format!("{BUNDLE_PATH}{SIGNATURE_SUFFIX}"))?;

        let raw = fetch_to_memory(
            &self.net,
            bundle_url.as_str(),
            BUNDLE_SIZE_LIMIT,
            options,
        )
        .await?;
        let signature = self
            .fetch_signature(&signature_url, options, bundle_signature_error)
            .await?;

        if !self.roots.verify_bundle(&raw, &signature) {
            return Err(TrustError::UntrustedBundle {
                bundle_url: bundle_url.to_string(),
                signature_url: signature_url.to_string(),
                roots: self.roots.len(),
            }
            .into());
        }

        let bundle = SigningKeyBundle::parse(&raw, bundle_url.as_str())?;
        debug!(url = %bundle_url, keys = bundle.len(), "loaded signing keys");
        Ok(bundle)
    }

    /// Download `src` (relative to the base URL) into `dst` and verify it.
    ///
    /// `dst` is written before the signature is checked. On any error its
    /// contents must not be used; removing it is up to the caller.
    ///
    /// # Errors
    /// Everything [`Client::signing_keys`] returns, plus fetch errors for
    /// the file or its signature and [`VerificationError`] when no current
    /// signing key validates the file.
    pub async fn download(&self, src: &str, dst: &Path) -> Result<VerifiedDownload, Error> {
        let options = self.call_options();
        let bundle = self.fetch_signing_keys(&options).await?;

        let artifact_url = self.url(src)?;
        let signature_url = self.url(&format!("{src}{SIGNATURE_SUFFIX}"))?;

        let result = fetch_to_file(
            &self.net,
            artifact_url.as_str(),
            dst,
            DOWNLOAD_SIZE_LIMIT,
            &options,
        )
        .await?;
        let signature = self
            .fetch_signature(&signature_url, &options, artifact_signature_error)
            .await?;

        let Some(key_index) = bundle.verify_artifact(&result.digest, &signature) else {
            warn!(
                url = %artifact_url,
                keys = bundle.len(),
                "signature does not validate with any signing key"
            );
            return Err(VerificationError::SignatureMismatch {
                artifact_url: artifact_url.to_string(),
                signature_url: signature_url.to_string(),
                keys: bundle.len(),
            }
            .into());
        };

        let digest = result.digest.hash();
        info!(
            url = %artifact_url,
            bytes = result.size,
            key = %key_id(&bundle.keys()[key_index]),
            sha512 = %digest,
            "download verified"
        );
        Ok(VerifiedDownload {
            digest,
            size: result.size,
            key_index,
        })
    }

    /// Options for one call: the configured ones, tightened by the
    /// per-call deadline starting now.
    fn call_options(&self) -> FetchOptions {
        let Some(limit) = self.call_deadline else {
            return self.options.clone();
        };
        let deadline = Instant::now() + limit;
        let deadline = match self.options.deadline {
            Some(fixed) => fixed.min(deadline),
            None => deadline,
        };
        self.options.clone().with_deadline(deadline)
    }

    async fn fetch_signature(
        &self,
        url: &Url,
        options: &FetchOptions,
        malformed: fn(String, String) -> Error,
    ) -> Result<Signature, Error> {
        let bytes = match fetch_to_memory(&self.net, url.as_str(), SIGNATURE_LIMIT, options).await
        {
            Ok(bytes) => bytes,
            Err(Error::Fetch(FetchError::SizeLimitExceeded { .. })) => {
                return Err(malformed(
                    url.to_string(),
                    format!("longer than {SIGNATURE_LENGTH} bytes"),
                ));
            }
            Err(e) => return Err(e),
        };

        let Ok(bytes) = <[u8; SIGNATURE_LENGTH]>::try_from(bytes.as_slice()) else {
            return Err(malformed(
                url.to_string(),
                format!("expected {SIGNATURE_LENGTH} bytes, got {}", bytes.len()),
            ));
        };
        Ok(Signature::from_bytes(&bytes))
    }
}

fn bundle_signature_error(url: String, reason: String) -> Error {
    TrustError::MalformedSignature { url, reason }.into()
}

fn artifact_signature_error(url: String, reason: String) -> Error {
    VerificationError::MalformedSignature { url, reason }.into()
}
