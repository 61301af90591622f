//! Configuration loaded from the environment (and `.env`).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Where the library document lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageBackend {
    /// One JSON file per key under the data directory
    Fs,
    /// Process memory, gone on exit
    Memory,
    /// The HTTP document endpoint, mirrored into the data directory
    Remote,
    /// Redis key-value store (requires the `redis` feature)
    Redis,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fs" | "file" => Ok(Self::Fs),
            "memory" => Ok(Self::Memory),
            "remote" | "http" => Ok(Self::Remote),
            "redis" => Ok(Self::Redis),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Directory holding the JSON documents
    pub data_dir: PathBuf,
    /// Key of the current document
    pub db_key: String,
    /// Key a pre-playlist release stored its document under
    pub legacy_db_key: String,
    pub backend: StorageBackend,
    /// Base URL of the document endpoint
    pub remote_url: String,
    /// Redis connection URL
    pub redis_url: String,
}

impl AppConfig {
    pub const DEFAULT_DB_KEY: &'static str = "learning_hub_db";
    pub const DEFAULT_LEGACY_DB_KEY: &'static str = "vidlib_db";

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!("{}, using the filesystem", e);
                StorageBackend::Fs
            }),
            Err(_) => StorageBackend::Fs,
        };

        Self {
            addr: env::var("ADDR").unwrap_or_else(|_| String::from("127.0.0.1")),
            port: env::var("PORT").unwrap_or_else(|_| String::from("3000")),
            data_dir: PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| String::from("./db"))),
            db_key: env::var("DB_KEY").unwrap_or_else(|_| String::from(Self::DEFAULT_DB_KEY)),
            legacy_db_key: env::var("LEGACY_DB_KEY")
                .unwrap_or_else(|_| String::from(Self::DEFAULT_LEGACY_DB_KEY)),
            backend,
            remote_url: env::var("REMOTE_URL")
                .unwrap_or_else(|_| String::from("http://127.0.0.1:3000")),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| String::from("redis://127.0.0.1/")),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("fs".parse::<StorageBackend>(), Ok(StorageBackend::Fs));
        assert_eq!(" Remote ".parse::<StorageBackend>(), Ok(StorageBackend::Remote));
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }
}
