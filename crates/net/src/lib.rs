#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for distsign
//!
//! Every fetch is size-bounded and honors a caller-supplied deadline and
//! cancellation token. Downloads to disk compute a SHA-512 digest of the
//! bytes as they are written.

mod client;
mod fetch;
mod options;
mod writer;

pub use client::{parse_url, NetClient, NetConfig};
pub use fetch::{fetch_to_file, fetch_to_memory, DownloadResult};
pub use options::FetchOptions;
pub use writer::DigestingWriter;

pub use tokio_util::sync::CancellationToken;
