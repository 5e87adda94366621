use serde::Deserialize;

/// Main configuration structure for Novel-Loom
///
/// Every section has sensible defaults, so a config file is optional and may
/// override only the fields it cares about.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub crawl: CrawlSettings,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// HTTP fetch behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchSettings {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Additional attempts after the first failed request
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base for the linear retry backoff (delay = base * attempt index)
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

/// Chapter-walk behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlSettings {
    /// Back-to-back failed chapter slots after which the walk halts
    #[serde(
        rename = "max-consecutive-failures",
        default = "default_max_consecutive_failures"
    )]
    pub max_consecutive_failures: u32,

    /// Overrides the site's politeness delay between requests (milliseconds)
    #[serde(rename = "politeness-override-ms", default)]
    pub politeness_override_ms: Option<u64>,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_consecutive_failures: default_max_consecutive_failures(),
            politeness_override_ms: None,
        }
    }
}

/// Database configuration
///
/// The `NOVEL_DB_PATH` environment variable overrides the configured path;
/// with neither set the database lives at `./novels.db`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl DatabaseConfig {
    /// Applies the `NOVEL_DB_PATH` environment override, if present
    pub fn apply_env_override(&mut self) {
        if let Ok(path) = std::env::var("NOVEL_DB_PATH") {
            if !path.is_empty() {
                self.path = path;
            }
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    5000
}

fn default_max_consecutive_failures() -> u32 {
    5
}

fn default_database_path() -> String {
    "./novels.db".to_string()
}
