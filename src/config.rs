//! Process configuration from the environment
//!
//! - `PORT`: listen port on all interfaces (default 3000)
//! - `STATIC_DIR`: browser client assets (default `frontend`, skipped if missing)

use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default static asset directory
pub const DEFAULT_STATIC_DIR: &str = "frontend";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl Config {
    /// Read `PORT` and `STATIC_DIR`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_values(env::var("PORT").ok(), env::var("STATIC_DIR").ok())
    }

    fn from_values(port: Option<String>, static_dir: Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(port) = port.filter(|p| !p.trim().is_empty()) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| AppError::InvalidPort(port.clone()))?;
        }
        if let Some(dir) = static_dir.filter(|d| !d.is_empty()) {
            config.static_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// 0.0.0.0:PORT
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// Static directory, only if it exists on disk
    pub fn static_dir_if_present(&self) -> Option<&Path> {
        self.static_dir
            .is_dir()
            .then_some(self.static_dir.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_values(None, None).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_port_override() {
        let config = Config::from_values(Some("8081".to_string()), None).unwrap();
        assert_eq!(config.bind_addr().port(), 8081);
    }

    #[test]
    fn test_bad_port() {
        let result = Config::from_values(Some("eighty".to_string()), None);
        assert!(matches!(result, Err(AppError::InvalidPort(p)) if p == "eighty"));
    }

    #[test]
    fn test_missing_static_dir_is_skipped() {
        let config =
            Config::from_values(None, Some("/definitely/not/here".to_string())).unwrap();
        assert!(config.static_dir_if_present().is_none());
    }
}
