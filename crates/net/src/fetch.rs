//! Size-bounded fetches into memory or onto disk

use crate::client::{request_error, NetClient};
use crate::options::FetchOptions;
use crate::writer::DigestingWriter;
use distsign_errors::{Error, FetchError};
use distsign_hash::Sha512Digest;
use futures::StreamExt;
use reqwest::Response;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Result of a download to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// SHA-512 state over exactly the bytes written
    pub digest: Sha512Digest,
    pub size: u64,
}

/// Read the body at `url` into memory.
///
/// # Errors
///
/// Returns a [`FetchError`] on transport failure, non-success status,
/// deadline or cancellation, or when the body is larger than `limit`.
/// No more than `limit` bytes are ever buffered.
pub async fn fetch_to_memory(
    client: &NetClient,
    url: &str,
    limit: u64,
    options: &FetchOptions,
) -> Result<Vec<u8>, Error> {
    let response = client.get(url, options).await?;

    let mut body = Vec::new();
    let size = copy_body(response, url, limit, options, &mut body, "memory").await?;
    debug!(url, bytes = size, "fetched into memory");
    Ok(body)
}

/// Stream the body at `url` into `dest`, hashing it with SHA-512 on the way.
///
/// The destination is closed on every path; a close failure after an
/// otherwise successful transfer fails the fetch. On failure `dest` may
/// hold a partial file, which the caller must not trust.
///
/// # Errors
///
/// Returns a [`FetchError`] on transport or file-system failure, deadline or
/// cancellation, or when the body is larger than `limit`.
pub async fn fetch_to_file(
    client: &NetClient,
    url: &str,
    dest: &Path,
    limit: u64,
    options: &FetchOptions,
) -> Result<DownloadResult, Error> {
    let response = client.get(url, options).await?;

    let mut writer = DigestingWriter::create(dest).await?;
    let label = dest.display().to_string();
    let copied = copy_body(response, url, limit, options, &mut writer, &label).await;
    let closed = writer.close().await;

    let size = copied?;
    let digest = closed?;
    debug!(url, dest = %label, bytes = size, sha512 = %digest.hash(), "fetched to file");
    Ok(DownloadResult { digest, size })
}

async fn copy_body<W>(
    response: Response,
    url: &str,
    limit: u64,
    options: &FetchOptions,
    sink: &mut W,
    sink_label: &str,
) -> Result<u64, Error>
where
    W: AsyncWrite + Unpin,
{
    if let Some(declared) = response.content_length() {
        if declared > limit {
            warn!(url, limit, declared, "declared content length exceeds limit");
            return Err(size_limit_exceeded(url, limit));
        }
    }

    let mut stream = response.bytes_stream();
    let mut received = 0u64;

    while let Some(chunk) = options.run(url, stream.next()).await? {
        let chunk = chunk.map_err(|e| request_error(url, &e))?;
        let len = chunk.len() as u64;

        if received.saturating_add(len) > limit {
            warn!(url, limit, received, "response body exceeds limit");
            return Err(size_limit_exceeded(url, limit));
        }

        sink.write_all(&chunk).await.map_err(|e| FetchError::File {
            path: sink_label.to_string(),
            message: e.to_string(),
        })?;
        received += len;
    }

    Ok(received)
}

fn size_limit_exceeded(url: &str, limit: u64) -> Error {
    FetchError::SizeLimitExceeded {
        url: url.to_string(),
        limit,
    }
    .into()
}
