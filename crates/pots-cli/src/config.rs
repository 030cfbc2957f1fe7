//! Configuration file management for pots.
//!
//! Provides a TOML-based config file at `~/.config/pots/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use pots_db::config::DbConfig;

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Origin allowed to call the API from a browser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors_origin: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the pots config directory: `$XDG_CONFIG_HOME/pots` or
/// `~/.config/pots`, on every platform.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("pots");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("pots")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// HTTP listener settings after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub cors_origin: String,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct PotsConfig {
    pub db_config: DbConfig,
    pub server: ServerConfig,
}

impl PotsConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `POTS_DATABASE_URL` > `[database].url` > `DbConfig::DEFAULT_URL`
    /// - Bind: `cli_bind` > `POTS_BIND` > `[server].bind` > `127.0.0.1`
    /// - Port: `cli_port` > `POTS_PORT` > `[server].port` > `8080`
    /// - CORS origin: `POTS_CORS_ORIGIN` > `[server].cors_origin` > `http://localhost:3000`
    pub fn resolve(
        cli_db_url: Option<&str>,
        cli_bind: Option<&str>,
        cli_port: Option<u16>,
    ) -> Result<Self> {
        let file_config = load_config().ok();
        let file_server = file_config.as_ref().map(|cfg| &cfg.server);

        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        let bind = if let Some(bind) = cli_bind {
            bind.to_string()
        } else if let Ok(bind) = std::env::var("POTS_BIND") {
            bind
        } else if let Some(bind) = file_server.and_then(|s| s.bind.clone()) {
            bind
        } else {
            DEFAULT_BIND.to_string()
        };

        let port = if let Some(port) = cli_port {
            port
        } else if let Ok(port) = std::env::var("POTS_PORT") {
            port.parse()
                .with_context(|| format!("POTS_PORT is not a valid port: {port:?}"))?
        } else if let Some(port) = file_server.and_then(|s| s.port) {
            port
        } else {
            DEFAULT_PORT
        };

        let cors_origin = if let Ok(origin) = std::env::var("POTS_CORS_ORIGIN") {
            origin
        } else if let Some(origin) = file_server.and_then(|s| s.cors_origin.clone()) {
            origin
        } else {
            DEFAULT_CORS_ORIGIN.to_string()
        };

        Ok(Self {
            db_config: DbConfig::new(db_url),
            server: ServerConfig {
                bind,
                port,
                cors_origin,
            },
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, MutexGuard};

    use super::*;

    const VARS: [&str; 5] = [
        "POTS_DATABASE_URL",
        "POTS_BIND",
        "POTS_PORT",
        "POTS_CORS_ORIGIN",
        "XDG_CONFIG_HOME",
    ];

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that touch process env, with every pots variable
    /// cleared and `XDG_CONFIG_HOME` pointed at an empty temp dir.
    struct EnvGuard {
        _lock: MutexGuard<'static, ()>,
        _home: tempfile::TempDir,
        saved: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
            let saved = VARS.iter().map(|v| (*v, std::env::var(v).ok())).collect();
            let home = tempfile::TempDir::new().unwrap();
            for var in VARS {
                unsafe { std::env::remove_var(var) };
            }
            unsafe { std::env::set_var("XDG_CONFIG_HOME", home.path()) };
            Self {
                _lock: lock,
                _home: home,
                saved,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (var, value) in &self.saved {
                match value {
                    Some(v) => unsafe { std::env::set_var(var, v) },
                    None => unsafe { std::env::remove_var(var) },
                }
            }
        }
    }

    fn sample_config() -> ConfigFile {
        ConfigFile {
            database: DatabaseSection {
                url: "postgresql://filehost:5432/filedb".to_string(),
            },
            server: ServerSection {
                bind: Some("0.0.0.0".to_string()),
                port: Some(9000),
                cors_origin: Some("https://garden.example".to_string()),
            },
        }
    }

    #[test]
    fn defaults_when_nothing_set() {
        let _env = EnvGuard::new();

        let config = PotsConfig::resolve(None, None, None).unwrap();
        assert_eq!(config.db_config.database_url, DbConfig::DEFAULT_URL);
        assert_eq!(
            config.server,
            ServerConfig {
                bind: DEFAULT_BIND.to_string(),
                port: DEFAULT_PORT,
                cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn save_config_writes_owner_only_file() {
        use std::os::unix::fs::PermissionsExt;

        let _env = EnvGuard::new();
        save_config(&sample_config()).unwrap();

        let meta = std::fs::metadata(config_path()).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);

        let loaded = load_config().unwrap();
        assert_eq!(loaded.database.url, "postgresql://filehost:5432/filedb");
        assert_eq!(loaded.server.port, Some(9000));
    }

    #[test]
    fn config_file_beats_defaults() {
        let _env = EnvGuard::new();
        save_config(&sample_config()).unwrap();

        let config = PotsConfig::resolve(None, None, None).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://filehost:5432/filedb");
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.cors_origin, "https://garden.example");
    }

    #[test]
    fn env_beats_config_file() {
        let _env = EnvGuard::new();
        save_config(&sample_config()).unwrap();
        unsafe { std::env::set_var("POTS_DATABASE_URL", "postgresql://env:5432/envdb") };
        unsafe { std::env::set_var("POTS_PORT", "7000") };
        unsafe { std::env::set_var("POTS_CORS_ORIGIN", "http://env.example") };

        let config = PotsConfig::resolve(None, None, None).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://env:5432/envdb");
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.cors_origin, "http://env.example");
    }

    #[test]
    fn cli_flags_override_all() {
        let _env = EnvGuard::new();
        save_config(&sample_config()).unwrap();
        unsafe { std::env::set_var("POTS_DATABASE_URL", "postgresql://env:5432/envdb") };
        unsafe { std::env::set_var("POTS_BIND", "10.0.0.1") };

        let config =
            PotsConfig::resolve(Some("postgresql://cli:5432/clidb"), Some("::1"), Some(8123))
                .unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://cli:5432/clidb");
        assert_eq!(config.server.bind, "::1");
        assert_eq!(config.server.port, 8123);
    }

    #[test]
    fn bad_port_env_is_an_error() {
        let _env = EnvGuard::new();
        unsafe { std::env::set_var("POTS_PORT", "eighty") };

        let err = PotsConfig::resolve(None, None, None).unwrap_err();
        assert!(err.to_string().contains("POTS_PORT"), "unexpected error: {err}");
    }

    #[test]
    fn server_section_is_optional() {
        let cfg: ConfigFile = toml::from_str("[database]\nurl = \"postgresql://x/y\"\n").unwrap();
        assert!(cfg.server.bind.is_none());
        assert!(cfg.server.port.is_none());
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("pots/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
