use crate::*;
use confique::Config as _;
use std::path::PathBuf;

#[derive(confique::Config)]
pub struct Config {
    #[config(nested)]
    pub server: ServerConfig,
    #[config(nested)]
    pub completion: CompletionConfig,
    #[config(nested)]
    pub catalog: CatalogConfig,
    #[config(nested)]
    pub log: LogConfig,
    #[cfg(test)]
    #[config(env = "SQLCTX_CONTAINER_RAMDISKED", default = true)]
    pub container_ramdisked: bool,
    #[cfg(test)]
    #[config(env = "SQLCTX_CONTAINER_LOGS", default = false)]
    pub container_logs: bool,
}

#[derive(confique::Config)]
pub struct ServerConfig {
    #[config(env = "SQLCTX_HOST", default = "127.0.0.1")]
    pub host: String,
    #[config(env = "PORT", default = 3000)]
    pub port: u16,
}

#[derive(confique::Config)]
pub struct CompletionConfig {
    /// Upper bound on candidates returned per request.
    #[config(env = "SQLCTX_MAX_SUGGESTIONS", default = 20)]
    pub max_suggestions: usize,
    /// Lifetime of a cached extraction, keyed by exact SQL text.
    #[config(env = "SQLCTX_CACHE_TTL_MS", default = 5000)]
    pub cache_ttl_ms: u64,
    #[config(env = "SQLCTX_CACHE_CAPACITY", default = 1024)]
    pub cache_capacity: u64,
}

#[derive(confique::Config)]
pub struct CatalogConfig {
    /// JSON catalog snapshot. Takes precedence over `database_url`.
    #[config(env = "SQLCTX_CATALOG_FILE")]
    pub file: Option<PathBuf>,
    #[config(env = "SQLCTX_DATABASE_URL")]
    pub database_url: Option<String>,
    #[config(env = "SQLCTX_CATALOG_REFRESH_SECS", default = 60)]
    pub refresh_secs: u64,
    #[config(env = "SQLCTX_DEFAULT_DATABASE")]
    pub default_database: Option<String>,
}

#[derive(confique::Config)]
pub struct LogConfig {
    #[config(env = "SQLCTX_LOG", default = "info")]
    pub filter: String,
}

impl Config {
    /// Environment first, then the optional TOML file, then defaults.
    pub fn load() -> Result<Self> {
        let file = std::env::var_os("SQLCTX_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("sqlctx.toml"));
        Ok(Config::builder().env().file(file).load()?)
    }
}

/// Process-wide configuration, loaded lazily from the environment.
#[cfg(test)]
pub fn config() -> &'static Config {
    use std::sync::OnceLock;
    static CONFIG: OnceLock<Config> = OnceLock::new();
    CONFIG.get_or_init(|| {
        Config::builder()
            .env()
            .load()
            .expect("Failed to load one or more value configuration from the current environment")
    })
}
