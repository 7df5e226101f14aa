use serde::{Deserialize, Serialize};

/// Static configuration loaded at startup
///
/// - server: bind address and worker count
/// - database: connection and retry settings
/// - logging: level, format and output
/// - api: rate limiting, CORS and error doc links
/// - analytics: export and listing limits
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl StaticConfig {
    /// Load from a TOML file and environment variables
    ///
    /// Priority: ENV > file > defaults.
    /// ENV prefix `LH`, separator `__`, e.g. `LH__SERVER__PORT=9999`.
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("LH")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// Sample TOML with every default filled in
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Sustained requests per minute allowed for one API key
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,
    #[serde(default = "default_rate_limit_burst")]
    pub rate_limit_burst: u32,
    /// Empty means same-origin only; `"*"` allows any origin
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
    #[serde(default = "default_payload_limit")]
    pub payload_limit_bytes: usize,
    /// Base URL linked from error bodies
    #[serde(default = "default_doc_url")]
    pub doc_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Hard cap on rows in one CSV export
    #[serde(default = "default_export_row_limit")]
    pub export_row_limit: u64,
    /// Rows fetched per database round trip while streaming an export
    #[serde(default = "default_export_batch_size")]
    pub export_batch_size: u64,
    #[serde(default = "default_events_limit")]
    pub events_default_limit: u64,
    #[serde(default = "default_events_max_limit")]
    pub events_max_limit: u64,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "sqlite://linkhub.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_rate_limit_per_minute() -> u32 {
    600
}

fn default_rate_limit_burst() -> u32 {
    60
}

fn default_payload_limit() -> usize {
    1024 * 1024
}

pub fn default_doc_url() -> String {
    "https://linkhub.dev/docs/api-reference/errors".to_string()
}

fn default_export_row_limit() -> u64 {
    100_000
}

fn default_export_batch_size() -> u64 {
    5_000
}

fn default_events_limit() -> u64 {
    100
}

fn default_events_max_limit() -> u64 {
    1_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_minute: default_rate_limit_per_minute(),
            rate_limit_burst: default_rate_limit_burst(),
            cors_allowed_origins: Vec::new(),
            payload_limit_bytes: default_payload_limit(),
            doc_url: default_doc_url(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            export_row_limit: default_export_row_limit(),
            export_batch_size: default_export_batch_size(),
            events_default_limit: default_events_limit(),
            events_max_limit: default_events_max_limit(),
        }
    }
}
