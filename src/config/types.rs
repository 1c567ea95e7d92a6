use serde::Deserialize;

/// Default request timeout, in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;

/// Default capacity of the in-memory visited-URL cache
pub const DEFAULT_VISITED_CACHE_CAPACITY: usize = 10_000;

/// Default SQLite database file
pub const DEFAULT_DATABASE_PATH: &str = "media_crawler.db";

/// Main configuration structure for the media crawler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Deepest level the traversal may reach; `None` crawls without a limit
    #[serde(rename = "max-depth", default)]
    pub max_depth: Option<u32>,

    /// Connection and request timeout (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Number of URLs remembered in the session cache
    #[serde(
        rename = "visited-cache-capacity",
        default = "default_visited_cache_capacity"
    )]
    pub visited_cache_capacity: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            visited_cache_capacity: DEFAULT_VISITED_CACHE_CAPACITY,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(default = "default_crawler_name")]
    pub name: String,

    /// Optional version suffix, sent as `name/version`
    #[serde(default)]
    pub version: Option<String>,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    pub fn header_value(&self) -> String {
        match &self.version {
            Some(version) => format!("{}/{}", self.name, version),
            None => self.name.clone(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: default_crawler_name(),
            version: None,
        }
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database holding the frontier and history
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_visited_cache_capacity() -> usize {
    DEFAULT_VISITED_CACHE_CAPACITY
}

fn default_crawler_name() -> String {
    "MediaCrawler".to_string()
}

fn default_database_path() -> String {
    DEFAULT_DATABASE_PATH.to_string()
}
