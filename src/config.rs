//! Runtime configuration, read from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `WATCH_NAMESPACE` | unset (cluster-wide) |
//! | `WEBHOOK_PORT` | `9443` |
//! | `HEALTH_PORT` | `8080` |
//! | `WEBHOOK_CERT_PATH` | `/etc/webhook/certs/tls.crt` |
//! | `WEBHOOK_KEY_PATH` | `/etc/webhook/certs/tls.key` |

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Default path to webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/etc/webhook/certs/tls.crt";
/// Default path to webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/etc/webhook/certs/tls.key";
/// Default webhook server port
pub const WEBHOOK_PORT: u16 = 9443;
/// Default health server port
pub const HEALTH_PORT: u16 = 8080;

/// Service configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Namespace drivers are watched in; `None` watches cluster-wide
    pub watch_namespace: Option<String>,
    pub webhook_port: u16,
    pub health_port: u16,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_namespace: None,
            webhook_port: WEBHOOK_PORT,
            health_port: HEALTH_PORT,
            cert_path: PathBuf::from(WEBHOOK_CERT_PATH),
            key_path: PathBuf::from(WEBHOOK_KEY_PATH),
        }
    }
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for unset keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let watch_namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());

        Ok(Self {
            watch_namespace,
            webhook_port: parse_port(&lookup, "WEBHOOK_PORT", defaults.webhook_port)?,
            health_port: parse_port(&lookup, "HEALTH_PORT", defaults.health_port)?,
            cert_path: lookup("WEBHOOK_CERT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cert_path),
            key_path: lookup("WEBHOOK_KEY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.key_path),
        })
    }

    /// Whether both TLS files are present on disk
    pub fn tls_available(&self) -> bool {
        self.cert_path.exists() && self.key_path.exists()
    }
}

fn parse_port<F>(lookup: &F, key: &str, default: u16) -> Result<u16>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
            .ok_or_else(|| Error::Config(format!("{} must be a port number, got {:?}", key, raw))),
    }
}
