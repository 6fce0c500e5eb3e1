use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub lookup: LookupSettings,
    #[serde(default)]
    pub profiles: ProfileSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }

/// ZIP lookup form driven through WebDriver
#[derive(Debug, Clone, Deserialize)]
pub struct LookupSettings {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_lookup_url")]
    pub lookup_url: String,
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_true")]
    pub headless: bool,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            lookup_url: default_lookup_url(),
            wait_timeout_secs: default_wait_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            headless: true,
        }
    }
}

impl LookupSettings {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

fn default_webdriver_url() -> String { "http://localhost:4444".to_string() }
fn default_lookup_url() -> String {
    "https://tools.usps.com/zip-code-lookup.htm?citybyzipcode".to_string()
}
fn default_wait_timeout_secs() -> u64 { 20 }
fn default_retry_attempts() -> u32 { 4 }
fn default_retry_delay_secs() -> u64 { 10 }
fn default_true() -> bool { true }

/// People-search site
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_allowed_domains")]
    pub allowed_domains: Vec<String>,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            allowed_domains: default_allowed_domains(),
        }
    }
}

fn default_base_url() -> String { "https://www.cyberbackgroundchecks.com".to_string() }

pub fn default_allowed_domains() -> Vec<String> {
    [
        "@yahoo.com",
        "@hotmail.com",
        "@gmail.com",
        "@aol.com",
        "@msn.com",
        "@outlook.com",
        "@live.com",
    ]
    .iter()
    .map(|d| d.to_string())
    .collect()
}

/// Outbound HTTP client
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// Proxy URLs used in rotation; empty means direct connections
    #[serde(default)]
    pub proxies: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            proxies: Vec::new(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 { 30 }
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_path: default_output_path(),
        }
    }
}

fn default_input_path() -> PathBuf { PathBuf::from("input.csv") }
fn default_output_path() -> PathBuf { PathBuf::from("results.csv") }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "pretty".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ENRICH_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ENRICH__LOOKUP__WEBDRIVER_URL -> lookup.webdriver_url
            .add_source(
                Environment::with_prefix("ENRICH")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("http.proxies")
                    .try_parsing(true),
            )
            .build()?;

        let settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }
}

/// Apply the conventional unprefixed variables on top of the loaded config.
/// `WEBDRIVER_URL` overrides lookup.webdriver_url, `PROXY_LIST` (comma separated)
/// overrides http.proxies.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("WEBDRIVER_URL") {
        builder = builder.set_override("lookup.webdriver_url", url)?;
    }

    if let Ok(list) = env::var("PROXY_LIST") {
        let proxies = parse_proxy_list(&list);
        builder = builder.set_override("http.proxies", proxies)?;
    }

    builder.build()
}

fn parse_proxy_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
