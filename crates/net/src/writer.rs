//! File writer that hashes exactly what it persists

use distsign_errors::{Error, FetchError};
use distsign_hash::Sha512Digest;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Owns the destination file and the SHA-512 accumulator for one download.
///
/// The digest is fed only the bytes the file accepted, so it always
/// describes what was written. [`DigestingWriter::close`] flushes and syncs
/// the file; a failure there fails the download. Dropping the writer
/// without closing it still releases the file.
#[derive(Debug)]
pub struct DigestingWriter {
    file: File,
    path: PathBuf,
    digest: Sha512Digest,
}

impl DigestingWriter {
    /// Create (or truncate) the file at `path`
    ///
    /// # Errors
    /// Returns [`FetchError::File`] if the file cannot be created.
    pub async fn create(path: &Path) -> Result<Self, Error> {
        let file = File::create(path)
            .await
            .map_err(|e| file_error(path, &e))?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            digest: Sha512Digest::new(),
        })
    }

    /// Bytes accepted so far
    #[must_use]
    pub fn written(&self) -> u64 {
        self.digest.len()
    }

    /// Flush and sync the file, then hand back the digest of its contents.
    ///
    /// # Errors
    /// Returns [`FetchError::File`] if buffered data cannot be written or
    /// the file cannot be synced to disk.
    pub async fn close(mut self) -> Result<Sha512Digest, Error> {
        self.file
            .flush()
            .await
            .map_err(|e| file_error(&self.path, &e))?;
        self.file
            .sync_all()
            .await
            .map_err(|e| file_error(&self.path, &e))?;
        Ok(self.digest)
    }
}

impl AsyncWrite for DigestingWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        match Pin::new(&mut this.file).poll_write(cx, buf) {
            Poll::Ready(Ok(n)) => {
                this.digest.update(&buf[..n]);
                Poll::Ready(Ok(n))
            }
            other => other,
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().file).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().file).poll_shutdown(cx)
    }
}

pub(crate) fn file_error(path: &Path, error: &io::Error) -> Error {
    FetchError::File {
        path: path.display().to_string(),
        message: error.to_string(),
    }
    .into()
}
