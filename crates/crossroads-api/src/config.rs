//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

/// Default port of the hub.
pub const HUB_PORT: u16 = 10340;

/// Default port of a domain server.
pub const WORLD_PORT: u16 = 3400;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Settings shared by both servers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// URL this server advertises to its peer.
    pub public_url: String,
    /// Timeout for every cross-server call.
    pub remote_timeout: Duration,
    /// Domain content pack; `None` selects the built-in pack.
    pub content_pack: Option<PathBuf>,
}

impl ServerConfig {
    /// Reads `HOST`, `PORT`, `PUBLIC_URL`, `REMOTE_TIMEOUT_MS` and
    /// `CONTENT_PACK` from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_env(default_port: u16) -> Result<Self, AppError> {
        Self::from_lookup(default_port, |key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an explicit variable source.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_lookup(
        default_port: u16,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => default_port,
        };
        let public_url = lookup("PUBLIC_URL")
            .map(|url| url.trim().trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{port}"));
        let timeout_ms = match lookup("REMOTE_TIMEOUT_MS") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("REMOTE_TIMEOUT_MS must be milliseconds: {e}"))
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };
        if timeout_ms == 0 {
            return Err(AppError::Config(
                "REMOTE_TIMEOUT_MS must be positive".to_owned(),
            ));
        }
        let content_pack = lookup("CONTENT_PACK")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            public_url,
            remote_timeout: Duration::from_millis(timeout_ms),
            content_pack,
        })
    }

    /// The socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an unparsable `HOST:PORT`.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)], default_port: u16) -> Result<ServerConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(default_port, |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[], HUB_PORT).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 10340);
        assert_eq!(config.public_url, "http://localhost:10340");
        assert_eq!(config.remote_timeout, Duration::from_secs(3));
        assert_eq!(config.content_pack, None);
        assert_eq!(config.bind_addr().unwrap().port(), 10340);
    }

    #[test]
    fn test_overrides() {
        let config = config(
            &[
                ("HOST", "127.0.0.1"),
                ("PORT", "4000"),
                ("PUBLIC_URL", "http://world.example:4000/"),
                ("REMOTE_TIMEOUT_MS", "250"),
                ("CONTENT_PACK", "packs/custom.yaml"),
            ],
            WORLD_PORT,
        )
        .unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.public_url, "http://world.example:4000");
        assert_eq!(config.remote_timeout, Duration::from_millis(250));
        assert_eq!(config.content_pack, Some(PathBuf::from("packs/custom.yaml")));
    }

    #[test]
    fn test_public_url_follows_port() {
        let config = config(&[("PORT", "3401")], WORLD_PORT).unwrap();

        assert_eq!(config.public_url, "http://localhost:3401");
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        assert!(matches!(
            config(&[("PORT", "http")], HUB_PORT),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config(&[("REMOTE_TIMEOUT_MS", "soon")], HUB_PORT),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config(&[("REMOTE_TIMEOUT_MS", "0")], HUB_PORT),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config(&[("HOST", "not a host")], HUB_PORT)
                .unwrap()
                .bind_addr(),
            Err(AppError::Config(_))
        ));
    }
}
