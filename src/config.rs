//! Environment-driven settings for the demo server.

use std::net::{IpAddr, Ipv4Addr};

use crate::middleware::{LoginRedirect, RedirectStatus};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub login_path: String,
    pub redirect_status: RedirectStatus,
    pub log_level: String,
}

impl Config {
    /// Reads `WICKET_*` variables, falling back to defaults for any unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env_or = |var: &str, default: &str| get(var).unwrap_or_else(|| default.to_owned());

        let host: IpAddr = env_or("WICKET_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| invalid("WICKET_HOST", e))?;

        let port: u16 = env_or("WICKET_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| invalid("WICKET_PORT", e))?;

        let login_path = env_or("WICKET_LOGIN_PATH", "/login");
        if !login_path.starts_with('/') {
            return Err(invalid("WICKET_LOGIN_PATH", "must start with `/`"));
        }
        if login_path.contains(['?', '#', '{', '}']) {
            return Err(invalid("WICKET_LOGIN_PATH", "must be a bare path without route parameters"));
        }

        let redirect_status = match env_or("WICKET_REDIRECT_STATUS", "302").as_str() {
            "302" => RedirectStatus::Found,
            "303" => RedirectStatus::SeeOther,
            other => return Err(invalid("WICKET_REDIRECT_STATUS", format!("`{other}`, expected 302 or 303"))),
        };

        let log_level = env_or("WICKET_LOG_LEVEL", "info");

        Ok(Self { host, port, login_path, redirect_status, log_level })
    }

    pub fn addr(&self) -> String {
        std::net::SocketAddr::new(self.host, self.port).to_string()
    }

    /// The login redirect this configuration describes.
    pub fn login_redirect(&self) -> LoginRedirect {
        LoginRedirect::new()
            .login_path(self.login_path.clone())
            .status(self.redirect_status)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            login_path: "/login".to_owned(),
            redirect_status: RedirectStatus::Found,
            log_level: "info".to_owned(),
        }
    }
}

fn invalid(var: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid { var, reason: reason.to_string() }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars.iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.addr(), Config::default().addr());
        assert_eq!(cfg.addr(), "0.0.0.0:3000");
        assert_eq!(cfg.login_path, "/login");
        assert_eq!(cfg.redirect_status, RedirectStatus::Found);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("WICKET_HOST", "127.0.0.1"),
            ("WICKET_PORT", "8080"),
            ("WICKET_LOGIN_PATH", "/auth/login"),
            ("WICKET_REDIRECT_STATUS", "303"),
        ])
        .unwrap();
        assert_eq!(cfg.addr(), "127.0.0.1:8080");
        assert_eq!(cfg.redirect_status, RedirectStatus::SeeOther);
        assert_eq!(cfg.login_redirect().location_for("/x"), "/auth/login?returnUrl=/x");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("WICKET_PORT", "http")]).is_err());
        assert!(config(&[("WICKET_REDIRECT_STATUS", "301")]).is_err());
        assert!(config(&[("WICKET_LOGIN_PATH", "/login?x=1")]).is_err());
        assert!(config(&[("WICKET_LOGIN_PATH", "/log{in}")]).is_err());
        assert!(config(&[("WICKET_LOGIN_PATH", "/users/{id}/login")]).is_err());
        let err = config(&[("WICKET_LOGIN_PATH", "login")]).unwrap_err();
        assert_eq!(err.to_string(), "invalid WICKET_LOGIN_PATH: must start with `/`");
    }
}
