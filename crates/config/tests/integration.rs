//! Integration tests for config

#[cfg(test)]
mod tests {
    use distsign_config::*;
    use std::io::Write;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        std::env::remove_var("DISTSIGN_SERVER_URL");
        std::env::remove_var("DISTSIGN_TIMEOUT");
        std::env::remove_var("DISTSIGN_DEADLINE");
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
url = "https://pkgs.example.com/stable"

[network]
timeout = 120
connect_timeout = 10
user_agent = "updater/1.0"

[download]
deadline = 900
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(
            config.server_url().unwrap(),
            "https://pkgs.example.com/stable"
        );
        assert_eq!(config.network.timeout(), Duration::from_secs(120));
        assert_eq!(config.network.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.network.user_agent, "updater/1.0");
        assert_eq!(config.download.deadline(), Some(Duration::from_secs(900)));
    }

    #[tokio::test]
    async fn test_load_or_default_with_explicit_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("config.toml");
        let err = Config::load_or_default(Some(missing.as_path())).await.unwrap_err();
        assert!(matches!(
            err,
            distsign_errors::Error::Config(distsign_errors::ConfigError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[server\nurl = 1").unwrap();

        let err = Config::load_from_file(temp_file.path()).await.unwrap_err();
        assert!(matches!(
            err,
            distsign_errors::Error::Config(distsign_errors::ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("DISTSIGN_SERVER_URL", "https://mirror.example.com");
        std::env::set_var("DISTSIGN_TIMEOUT", "42");
        std::env::set_var("DISTSIGN_DEADLINE", "300");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.server_url().unwrap(), "https://mirror.example.com");
        assert_eq!(config.network.timeout, 42);
        assert_eq!(config.download.deadline, Some(300));

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("DISTSIGN_TIMEOUT", "soon");

        let mut config = Config::default();
        let result = config.merge_env();
        assert!(result.is_err());

        clear_env();
    }
}
