use serde::Deserialize;

/// Main configuration structure for Product-Scout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Extra product patterns merged over the built-in host table
    #[serde(default, rename = "pattern")]
    pub patterns: Vec<PatternEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum depth to follow links from each seed URL
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of concurrent fetches per seed
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Cap on the number of pages visited per seed
    #[serde(default)]
    pub max_pages: Option<usize>,

    /// Total attempts made by the first fetch tier before escalating
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff before the second attempt (milliseconds), doubled on every failure
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Seed URLs (scheme optional)
    #[serde(default)]
    pub seeds: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            concurrency: default_concurrency(),
            max_pages: None,
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            seeds: Vec::new(),
        }
    }
}

/// Lightweight HTTP tier configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept")]
    pub accept: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    #[serde(default = "default_referer")]
    pub referer: String,

    /// Total request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Tolerate invalid or self-signed TLS certificates
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
            referer: default_referer(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            accept_invalid_certs: true,
        }
    }
}

/// Rendering tier configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RenderConfig {
    /// Enable the JavaScript session tier
    #[serde(default = "default_true")]
    pub session_enabled: bool,

    /// Enable the full headless browser tier
    #[serde(default = "default_true")]
    pub browser_enabled: bool,

    /// Upper bound on a single rendered page (seconds)
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,

    /// How long to wait for the root element to appear (seconds)
    #[serde(default = "default_root_wait_secs")]
    pub root_wait_secs: u64,

    #[serde(default = "default_root_selector")]
    pub root_selector: String,

    /// Scroll to trigger lazy-loaded content before collecting links
    #[serde(default = "default_true")]
    pub scroll: bool,

    #[serde(default = "default_max_scroll_attempts")]
    pub max_scroll_attempts: u32,

    /// Consecutive unchanged page heights that end the scroll loop
    #[serde(default = "default_stable_height_checks")]
    pub stable_height_checks: u32,

    #[serde(default = "default_scroll_pause_ms")]
    pub scroll_pause_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            session_enabled: true,
            browser_enabled: true,
            page_timeout_secs: default_page_timeout_secs(),
            root_wait_secs: default_root_wait_secs(),
            root_selector: default_root_selector(),
            scroll: true,
            max_scroll_attempts: default_max_scroll_attempts(),
            stable_height_checks: default_stable_height_checks(),
            scroll_pause_ms: default_scroll_pause_ms(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory the snapshot files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Snapshot file name used when none is given on the command line or request
    #[serde(default = "default_filename")]
    pub default_filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            default_filename: default_filename(),
        }
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Product pattern for a single host
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PatternEntry {
    /// Exact hostname (no wildcards)
    pub host: String,

    /// Regular expression searched in the URL path
    pub pattern: String,

    /// Match against `path?query` instead of the bare path
    #[serde(default)]
    pub match_query: bool,
}

fn default_max_depth() -> u32 {
    2
}

fn default_concurrency() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_referer() -> String {
    "https://www.google.com/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_page_timeout_secs() -> u64 {
    55
}

fn default_root_wait_secs() -> u64 {
    45
}

fn default_root_selector() -> String {
    "body".to_string()
}

fn default_max_scroll_attempts() -> u32 {
    10
}

fn default_stable_height_checks() -> u32 {
    3
}

fn default_scroll_pause_ms() -> u64 {
    1000
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_filename() -> String {
    "products.json".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_true() -> bool {
    true
}
