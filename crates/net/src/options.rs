//! Caller-supplied deadline and cancellation for fetches

use distsign_errors::{Error, FetchError};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Bounds on how long a fetch may run.
///
/// The deadline is absolute, so one value can bound a whole sequence of
/// fetches. Both limits are checked while connecting and before every
/// body chunk; a stalled server cannot hold a fetch past either.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub deadline: Option<Instant>,
    pub cancel: Option<CancellationToken>,
}

impl FetchOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Drive `future` to completion unless the deadline passes or the
    /// token is cancelled first.
    pub(crate) async fn run<F>(&self, url: &str, future: F) -> Result<F::Output, Error>
    where
        F: Future,
    {
        let bounded = async {
            match self.deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, future).await {
                    Ok(output) => Ok(output),
                    Err(_) => Err(Error::from(FetchError::Timeout {
                        url: url.to_string(),
                    })),
                },
                None => Ok(future.await),
            }
        };

        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => Err(FetchError::Cancelled {
                    url: url.to_string(),
                }
                .into()),
                result = bounded => result,
            },
            None => bounded.await,
        }
    }
}
