//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use distsign_errors::{Error, FetchError};
    use distsign_hash::Sha512Digest;
    use distsign_net::*;
    use httpmock::prelude::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_fetch_to_memory() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/distsign.pub");
                then.status(200).body("bundle bytes");
            })
            .await;

        let client = NetClient::with_defaults().unwrap();
        let body = fetch_to_memory(
            &client,
            &server.url("/distsign.pub"),
            1024,
            &FetchOptions::new(),
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(body, b"bundle bytes");
    }

    #[tokio::test]
    async fn test_fetch_exactly_at_limit() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/sig");
                then.status(200).body([9u8; 64]);
            })
            .await;

        let client = NetClient::with_defaults().unwrap();
        let body = fetch_to_memory(&client, &server.url("/sig"), 64, &FetchOptions::new())
            .await
            .unwrap();
        assert_eq!(body.len(), 64);
    }

    #[tokio::test]
    async fn test_memory_size_limit() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/big");
                then.status(200).body(vec![0u8; 4096]);
            })
            .await;

        let client = NetClient::with_defaults().unwrap();
        let err = fetch_to_memory(&client, &server.url("/big"), 100, &FetchOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Fetch(FetchError::SizeLimitExceeded { limit: 100, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_to_file_digest() {
        let server = MockServer::start_async().await;
        let content = b"artifact payload".repeat(1000);
        let body = content.clone();
        server
            .mock_async(move |when, then| {
                when.method(GET).path("/pkg.tgz");
                then.status(200).body(body.clone());
            })
            .await;

        let temp = tempdir().unwrap();
        let dest = temp.path().join("pkg.tgz");
        let client = NetClient::with_defaults().unwrap();

        let result = fetch_to_file(
            &client,
            &server.url("/pkg.tgz"),
            &dest,
            1 << 20,
            &FetchOptions::new(),
        )
        .await
        .unwrap();

        assert_eq!(result.size, content.len() as u64);
        assert_eq!(result.digest, Sha512Digest::from_data(&content));
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), content);
    }

    #[tokio::test]
    async fn test_file_size_limit_never_writes_past_limit() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/huge");
                then.status(200).body(vec![1u8; 10_000]);
            })
            .await;

        let temp = tempdir().unwrap();
        let dest = temp.path().join("huge");
        let client = NetClient::with_defaults().unwrap();

        let err = fetch_to_file(&client, &server.url("/huge"), &dest, 1000, &FetchOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Fetch(FetchError::SizeLimitExceeded { limit: 1000, .. })
        ));
        let written = tokio::fs::metadata(&dest).await.map(|m| m.len()).unwrap_or(0);
        assert!(written <= 1000);
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404).body("Not Found");
            })
            .await;

        let client = NetClient::with_defaults().unwrap();
        let err = fetch_to_memory(&client, &server.url("/missing"), 1024, &FetchOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Fetch(FetchError::HttpStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_deadline_against_stalled_server() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/stall");
                then.status(200)
                    .delay(Duration::from_secs(10))
                    .body("late");
            })
            .await;

        let client = NetClient::with_defaults().unwrap();
        let options = FetchOptions::new().with_timeout(Duration::from_millis(200));
        let err = fetch_to_memory(&client, &server.url("/stall"), 1024, &options)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_cancellation_against_stalled_server() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/stall");
                then.status(200)
                    .delay(Duration::from_secs(10))
                    .body("late");
            })
            .await;

        let client = NetClient::with_defaults().unwrap();
        let token = CancellationToken::new();
        let options = FetchOptions::new().with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            token.cancel();
        });

        let err = fetch_to_memory(&client, &server.url("/stall"), 1024, &options)
            .await
            .unwrap_err();
        canceller.await.unwrap();
        assert!(matches!(err, Error::Fetch(FetchError::Cancelled { .. })));
    }

    /// Serve one response whose body arrives in `chunks` pieces with
    /// `pause` between them.
    async fn trickle_server(body: &'static [u8], chunks: usize, pause: Duration) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 4096];
            let _ = socket.read(&mut request).await.unwrap();

            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            for piece in body.chunks(body.len().div_ceil(chunks)) {
                socket.flush().await.unwrap();
                tokio::time::sleep(pause).await;
                socket.write_all(piece).await.unwrap();
            }
            socket.flush().await.unwrap();
        });
        format!("http://{addr}/artifact")
    }

    #[tokio::test]
    async fn test_slow_steady_transfer_outlasts_read_timeout() {
        let url = trickle_server(b"0123456789", 5, Duration::from_millis(400)).await;
        let config = NetConfig {
            read_timeout: Duration::from_secs(1),
            ..NetConfig::default()
        };
        let client = NetClient::new(&config).unwrap();

        // Five pauses of 400ms add up to twice the read timeout
        let body = fetch_to_memory(&client, &url, 1024, &FetchOptions::new())
            .await
            .unwrap();
        assert_eq!(body, b"0123456789");
    }

    #[tokio::test]
    async fn test_stalled_body_hits_read_timeout() {
        let url = trickle_server(b"0123456789", 2, Duration::from_secs(5)).await;
        let config = NetConfig {
            read_timeout: Duration::from_millis(300),
            ..NetConfig::default()
        };
        let client = NetClient::new(&config).unwrap();

        let err = fetch_to_memory(&client, &url, 1024, &FetchOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_connection_refused_is_retryable() {
        use distsign_errors::UserFacingError;

        // Bind and drop a listener to get a port with nothing behind it
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let client = NetClient::with_defaults().unwrap();
        let url = format!("http://127.0.0.1:{port}/distsign.pub");
        let err = fetch_to_memory(&client, &url, 1024, &FetchOptions::new())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(!err.is_security_failure());
    }
}
