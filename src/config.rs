use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

use anyhow::{bail, Context, Result};
use log::warn;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::navigate::LOGIN_PATH;

pub struct PathSet {
    pub config_path: PathBuf,
    pub data_path: PathBuf,
}

impl PathSet {
    pub fn new(config_path: Option<PathBuf>, data_path: Option<PathBuf>) -> Result<Self> {
        let is_root = Self::is_root();

        let config_path = if let Some(path) = config_path {
            path
        } else if let Ok(path) = env::var("TOKENWIRE_CONFIG") {
            PathBuf::from(path)
        } else if is_root {
            PathBuf::from("/etc/tokenwire")
        } else {
            Self::home_dir()?.join(".config").join("tokenwire")
        };

        let data_path = if let Some(path) = data_path {
            path
        } else if let Ok(path) = env::var("TOKENWIRE_DATA") {
            PathBuf::from(path)
        } else if is_root {
            PathBuf::from("/var/lib/tokenwire")
        } else {
            Self::home_dir()?
                .join(".local")
                .join("share")
                .join("tokenwire")
        };

        ensure_dir_exists(&config_path)
            .with_context(|| format!("ensure config directory: {}", config_path.display()))?;
        ensure_dir_exists(&data_path)
            .with_context(|| format!("ensure data directory: {}", data_path.display()))?;

        Ok(Self {
            config_path,
            data_path,
        })
    }

    pub fn load_config<T, F>(&self, name: &str, default_func: F) -> Result<T>
    where
        T: CommonConfig + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let path = self.config_path.join(format!("{name}.toml"));
        let mut cfg: T = match fs::read_to_string(&path) {
            Ok(s) => toml::from_str(&s).context("parse config toml")?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("Config file for {name} not found, using defaults");
                default_func()
            }
            Err(err) => {
                return Err(err).context(format!("read config file: {}", path.display()));
            }
        };

        cfg.complete(self).context("validate config")?;
        Ok(cfg)
    }

    #[cfg(unix)]
    fn is_root() -> bool {
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    fn is_root() -> bool {
        false
    }

    fn home_dir() -> Result<PathBuf> {
        let dir = env::var_os("HOME")
            .or_else(|| env::var_os("USERPROFILE"))
            .map(PathBuf::from);
        match dir {
            Some(dir) => Ok(dir),
            None => {
                bail!("could not determine home directory, please specify config path manually")
            }
        }
    }
}

pub trait CommonConfig {
    fn default() -> Self;
    fn complete(&mut self, ps: &PathSet) -> Result<()>;
}

/// See: [`shellexpand::full`].
pub fn expandenv(name: &str, s: impl AsRef<str>) -> Result<String> {
    let s =
        shellexpand::full(s.as_ref()).with_context(|| format!("expand env value for '{name}'"))?;
    Ok(s.to_string())
}

fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClientConfig {
    #[serde(default = "ClientConfig::default_server")]
    pub server: String,

    #[serde(default = "ClientConfig::default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "ClientConfig::default_store_path")]
    pub store_path: String,

    #[serde(default = "ClientConfig::default_login_path")]
    pub login_path: String,

    /// Carry the current location to the login view so it can return there.
    #[serde(default = "ClientConfig::default_login_return")]
    pub login_return: bool,

    #[serde(default = "ClientConfig::default_log_level")]
    pub log_level: String,
}

impl CommonConfig for ClientConfig {
    fn default() -> Self {
        Self {
            server: Self::default_server(),
            timeout_ms: Self::default_timeout_ms(),
            store_path: Self::default_store_path(),
            login_path: Self::default_login_path(),
            login_return: Self::default_login_return(),
            log_level: Self::default_log_level(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        self.server = expandenv("server", &self.server)?;
        if self.server.is_empty() {
            bail!("server cannot be empty");
        }
        if Url::parse(&self.server).is_err() {
            bail!("invalid server url '{}'", self.server);
        }

        if self.timeout_ms < Self::MIN_TIMEOUT_MS || self.timeout_ms > Self::MAX_TIMEOUT_MS {
            bail!(
                "timeout_ms should be in range [{},{}], found {}",
                Self::MIN_TIMEOUT_MS,
                Self::MAX_TIMEOUT_MS,
                self.timeout_ms
            );
        }

        self.store_path = expandenv("store_path", &self.store_path)?;
        if self.store_path.is_empty() {
            let path = ps.data_path.join("store.json");
            self.store_path = format!("{}", path.display());
        }

        self.login_path = expandenv("login_path", &self.login_path)?;
        if !self.login_path.starts_with('/') {
            bail!(
                "login_path should start with '/', found '{}'",
                self.login_path
            );
        }

        match self.log_level.as_str() {
            "error" | "warn" | "info" | "debug" => {}
            _ => bail!("unknown log_level '{}'", self.log_level),
        }

        Ok(())
    }
}

impl ClientConfig {
    const MIN_TIMEOUT_MS: u64 = 100;
    const MAX_TIMEOUT_MS: u64 = 10 * 60 * 1000;

    pub fn default_server() -> String {
        String::from("http://127.0.0.1:8080")
    }

    pub fn default_timeout_ms() -> u64 {
        50 * 1000
    }

    pub fn default_store_path() -> String {
        String::new()
    }

    pub fn default_login_path() -> String {
        String::from(LOGIN_PATH)
    }

    pub fn default_login_return() -> bool {
        false
    }

    pub fn default_log_level() -> String {
        String::from("info")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
