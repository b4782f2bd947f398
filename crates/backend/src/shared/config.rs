use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::shared::pagination::ListingConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub listing: ListingSection,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
    /// Держать документы в памяти процесса вместо SQLite
    #[serde(default)]
    pub in_memory: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Каталог загруженных изображений и URL, под которым он раздаётся
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_root")]
    pub root: String,
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            public_url: default_public_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListingSection {
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,
}

impl Default for ListingSection {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout_secs(),
            idle_ttl_secs: default_idle_ttl_secs(),
        }
    }
}

impl ListingSection {
    pub fn to_listing_config(&self) -> ListingConfig {
        ListingConfig {
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            idle_ttl: Duration::from_secs(self.idle_ttl_secs),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_storage_root() -> String {
    "target/media".to_string()
}

fn default_public_url() -> String {
    "/media".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_idle_ttl_secs() -> u64 {
    1800
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/app.db"

[server]
port = 3000

[storage]
root = "target/media"
public_url = "/media"

[listing]
fetch_timeout_secs = 30
idle_ttl_secs = 1800
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if config.listing.fetch_timeout_secs == 0 {
        anyhow::bail!("listing.fetch_timeout_secs must be at least 1");
    }
    Ok(config)
}

/// Relative paths resolve against the executable directory
fn resolve_path(path_str: &str) -> PathBuf {
    let path = Path::new(path_str);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(path);
        }
    }

    PathBuf::from(path_str)
}

/// Get the database file path from configuration
pub fn get_database_path(config: &Config) -> PathBuf {
    resolve_path(&config.database.path)
}

/// Каталог, куда складываются загруженные файлы
pub fn get_storage_root(config: &Config) -> PathBuf {
    resolve_path(&config.storage.root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/app.db");
        assert!(!config.database.in_memory);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.public_url, "/media");
        assert_eq!(config.listing.fetch_timeout_secs, 30);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[database]\npath = \"app.db\"\n").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.root, "target/media");

        let listing = config.listing.to_listing_config();
        assert_eq!(listing.fetch_timeout, Duration::from_secs(30));
        assert_eq!(listing.idle_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn test_zero_fetch_timeout_is_rejected() {
        let toml_text = "[database]\npath = \"app.db\"\n\n[listing]\nfetch_timeout_secs = 0\n";
        let err = parse_config(toml_text).unwrap_err();
        assert!(err.to_string().contains("fetch_timeout_secs"));
    }

    #[test]
    fn test_in_memory_switch() {
        let config = parse_config("[database]\npath = \"\"\nin_memory = true\n").unwrap();
        assert!(config.database.in_memory);
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let root = std::env::temp_dir().join("stars-db.sqlite");
        let toml_text = format!("[database]\npath = {:?}\n", root.display().to_string());
        let config: Config = toml::from_str(&toml_text).unwrap();
        assert_eq!(get_database_path(&config), root);
    }
}
