use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for reviewing plans on localhost;
/// override via environment variables where needed.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `3456`).
    pub port: u16,
    /// Directory containing the documents under review.
    pub docs_dir: PathBuf,
    /// Directory holding the per-document annotation set files.
    pub reviews_dir: PathBuf,
    /// Seconds between file watcher polling ticks (default: `1`).
    pub watch_interval_secs: u64,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `127.0.0.1`             |
    /// | `PORT`                 | `3456`                  |
    /// | `REDLINE_DOCS_DIR`     | `plans`                 |
    /// | `REDLINE_REVIEWS_DIR`  | `plan-reviews`          |
    /// | `WATCH_INTERVAL_SECS`  | `1`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3456".into())
            .parse()
            .expect("PORT must be a valid u16");

        let docs_dir = PathBuf::from(
            std::env::var("REDLINE_DOCS_DIR").unwrap_or_else(|_| "plans".into()),
        );

        let reviews_dir = PathBuf::from(
            std::env::var("REDLINE_REVIEWS_DIR").unwrap_or_else(|_| "plan-reviews".into()),
        );

        let watch_interval_secs: u64 = std::env::var("WATCH_INTERVAL_SECS")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("WATCH_INTERVAL_SECS must be a valid u64");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            docs_dir,
            reviews_dir,
            watch_interval_secs,
            cors_origins,
            request_timeout_secs,
        }
    }
}
