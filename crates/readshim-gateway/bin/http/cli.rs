use clap::{Parser, ValueEnum};
use readshim_cache::redis::DEFAULT_KEY_PREFIX;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use url::Url;

pub const LISTEN_ADDR_ENV: &str = "READSHIM_LISTEN_ADDR";
pub const UPSTREAM_URL_ENV: &str = "READSHIM_UPSTREAM_URL";
pub const UPSTREAM_TIMEOUT_ENV: &str = "READSHIM_UPSTREAM_TIMEOUT_SECS";
pub const CACHE_BACKEND_ENV: &str = "READSHIM_CACHE_BACKEND";
pub const REDIS_URL_ENV: &str = "READSHIM_REDIS_URL";
pub const REDIS_KEY_PREFIX_ENV: &str = "READSHIM_REDIS_KEY_PREFIX";
pub const CACHE_CAPACITY_ENV: &str = "READSHIM_CACHE_CAPACITY";
pub const CACHE_TTL_ENV: &str = "READSHIM_CACHE_TTL_SECS";
pub const LOG_FORMAT_ENV: &str = "READSHIM_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8788";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CACHE_CAPACITY: u64 = 100_000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "memory")]
    Memory,
    #[value(name = "redis")]
    Redis,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::Memory => write!(f, "memory"),
            CacheBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "readshim-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Base URL of the backend serving /work, /book and /author.
    #[arg(long, env = UPSTREAM_URL_ENV)]
    pub upstream_url: Url,

    #[arg(long, env = UPSTREAM_TIMEOUT_ENV, default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS)]
    pub upstream_timeout_secs: u64,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Memory
    )]
    pub cache: CacheBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("cache", "redis"))]
    pub redis_url: Option<String>,

    /// Prefix for every key written to Redis.
    #[arg(long, env = REDIS_KEY_PREFIX_ENV, default_value = DEFAULT_KEY_PREFIX)]
    pub redis_key_prefix: String,

    #[arg(long, env = CACHE_CAPACITY_ENV, default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: u64,

    #[arg(long, env = CACHE_TTL_ENV, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}
