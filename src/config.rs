//! Configuration management for snowcap.
//!
//! This module handles loading configuration from environment variables,
//! with validation to ensure the required values are present. A `Config`
//! can also be built directly and handed to the client.

use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::SnowcapError;

/// Page size used by the read path when neither the caller nor the
/// environment supplies one.
pub const DEFAULT_LIMIT: u32 = 10;

/// Table that incidents are created in when no explicit create URL is set.
pub const INCIDENT_TABLE: &str = "incident";

/// Environment variable holding the Basic-auth password.
pub const PASSWORD_ENV: &str = "password";

/// Configuration for connecting to the table API.
///
/// The password is stored but never logged; `Debug` output redacts it.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the table API (e.g., `https://dev.service-now.com/api/now/table`).
    pub base_url: String,

    /// Basic-auth user name.
    pub username: String,

    /// Basic-auth password. Not validated; `None` is sent as a bare user name.
    password: Option<String>,

    /// Full URL incidents are POSTed to.
    pub incident_url: String,

    /// Page size for reads that do not specify one.
    pub default_limit: u32,

    /// Per-request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl Config {
    /// Creates a configuration with default create URL, page size and no timeout.
    ///
    /// # Errors
    ///
    /// Returns `SnowcapError::Config` if the base URL is not an absolute
    /// `http`/`https` URL or the user name is empty.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: Option<String>,
    ) -> Result<Self, SnowcapError> {
        let base_url = Self::validate_base_url(base_url.into())?;
        let username = username.into();
        if username.trim().is_empty() {
            return Err(SnowcapError::invalid_config("username must not be empty"));
        }
        let incident_url = format!("{}/{}", base_url, INCIDENT_TABLE);

        Ok(Config {
            base_url,
            username,
            password,
            incident_url,
            default_limit: DEFAULT_LIMIT,
            timeout: None,
        })
    }

    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SNOW_BASE_URL` (required): base URL of the table API
    /// - `SNOW_USERNAME` (required): Basic-auth user name
    /// - `password` (optional): Basic-auth password, passed through unchecked
    /// - `SNOW_INCIDENT_URL` (optional): full create endpoint
    /// - `SNOW_DEFAULT_LIMIT` (optional): default page size
    /// - `SNOW_TIMEOUT_SECS` (optional): request timeout in seconds
    ///
    /// # Errors
    ///
    /// Returns `SnowcapError::Config` if any required variable is missing
    /// or if values fail validation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// dotenvy::dotenv().ok();
    /// let config = Config::from_env()?;
    /// ```
    pub fn from_env() -> Result<Self, SnowcapError> {
        let base_url = Self::get_required_env("SNOW_BASE_URL")?;
        let username = Self::get_required_env("SNOW_USERNAME")?;
        let password = env::var(PASSWORD_ENV).ok();

        let mut config = Config::new(base_url, username, password)?;

        if let Some(url) = Self::get_optional_env("SNOW_INCIDENT_URL") {
            config = config.with_incident_url(url)?;
        }
        if let Some(limit) = Self::get_optional_env("SNOW_DEFAULT_LIMIT") {
            config = config.with_default_limit(Self::parse_positive("SNOW_DEFAULT_LIMIT", &limit)?);
        }
        if let Some(secs) = Self::get_optional_env("SNOW_TIMEOUT_SECS") {
            let secs = Self::parse_positive("SNOW_TIMEOUT_SECS", &secs)?;
            config = config.with_timeout(Duration::from_secs(u64::from(secs)));
        }

        Ok(config)
    }

    /// Overrides the URL incidents are created at.
    ///
    /// # Errors
    ///
    /// Returns `SnowcapError::Config` if the URL is not absolute `http`/`https`.
    pub fn with_incident_url(mut self, url: impl Into<String>) -> Result<Self, SnowcapError> {
        let url = url.into();
        Self::parse_http_url(url.trim())?;
        self.incident_url = url.trim().to_string();
        Ok(self)
    }

    /// Sets the page size used when a read does not specify a limit.
    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit;
        self
    }

    /// Sets a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the password, if one was supplied.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Gets a required environment variable, returning an error if missing or empty.
    fn get_required_env(name: &str) -> Result<String, SnowcapError> {
        env::var(name)
            .map_err(|_| SnowcapError::missing_env(name))
            .and_then(|value| {
                if value.trim().is_empty() {
                    Err(SnowcapError::missing_env(name))
                } else {
                    Ok(value)
                }
            })
    }

    /// Gets an optional environment variable, treating blank values as unset.
    fn get_optional_env(name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.trim().is_empty())
    }

    fn parse_positive(name: &str, value: &str) -> Result<u32, SnowcapError> {
        match value.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(SnowcapError::invalid_config(format!(
                "{} must be a positive integer, got: {:?}",
                name, value
            ))),
        }
    }

    /// Validates and normalizes the base URL.
    fn validate_base_url(url: String) -> Result<String, SnowcapError> {
        let url = url.trim();

        // Remove trailing slash so table names can be appended with '/'
        let url = url.trim_end_matches('/').to_string();

        Self::parse_http_url(&url)?;
        Ok(url)
    }

    fn parse_http_url(url: &str) -> Result<Url, SnowcapError> {
        let parsed = Url::parse(url)
            .map_err(|e| SnowcapError::invalid_config(format!("invalid URL {:?}: {}", url, e)))?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(SnowcapError::invalid_config(format!(
                "URL must use http:// or https://, got scheme {:?}",
                other
            ))),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("incident_url", &self.incident_url)
            .field("default_limit", &self.default_limit)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 6] = [
        "SNOW_BASE_URL",
        "SNOW_USERNAME",
        PASSWORD_ENV,
        "SNOW_INCIDENT_URL",
        "SNOW_DEFAULT_LIMIT",
        "SNOW_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for name in ENV_VARS {
            env::remove_var(name);
        }
    }

    // Environment variables are process-wide, so every from_env() case lives
    // in this one test; no other test in the crate touches them.
    #[test]
    fn test_from_env() {
        clear_env();
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("SNOW_BASE_URL"));

        env::set_var("SNOW_BASE_URL", "https://dev342687.service-now.com/api/now/table/");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("SNOW_USERNAME"));

        // password unset: passed through as None
        env::set_var("SNOW_USERNAME", "deen-web");
        let config = Config::from_env().unwrap();
        assert_eq!(config.base_url, "https://dev342687.service-now.com/api/now/table");
        assert_eq!(config.username, "deen-web");
        assert!(config.password().is_none());
        assert_eq!(
            config.incident_url,
            "https://dev342687.service-now.com/api/now/table/incident"
        );
        assert_eq!(config.default_limit, DEFAULT_LIMIT);
        assert!(config.timeout.is_none());

        // password is not validated, even when blank
        env::set_var(PASSWORD_ENV, "");
        assert_eq!(Config::from_env().unwrap().password(), Some(""));

        env::set_var(PASSWORD_ENV, "s3cret");
        env::set_var(
            "SNOW_INCIDENT_URL",
            "https://dev342687.service-now.com/api/now/v2/table/incident",
        );
        env::set_var("SNOW_DEFAULT_LIMIT", "25");
        env::set_var("SNOW_TIMEOUT_SECS", "30");
        let config = Config::from_env().unwrap();
        assert_eq!(config.password(), Some("s3cret"));
        assert_eq!(
            config.incident_url,
            "https://dev342687.service-now.com/api/now/v2/table/incident"
        );
        assert_eq!(config.default_limit, 25);
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));

        // blank optional values count as unset
        env::set_var("SNOW_DEFAULT_LIMIT", "  ");
        env::set_var("SNOW_TIMEOUT_SECS", "");
        let config = Config::from_env().unwrap();
        assert_eq!(config.default_limit, DEFAULT_LIMIT);
        assert!(config.timeout.is_none());

        env::set_var("SNOW_DEFAULT_LIMIT", "0");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("SNOW_DEFAULT_LIMIT"));

        env::set_var("SNOW_DEFAULT_LIMIT", "5");
        env::set_var("SNOW_TIMEOUT_SECS", "soon");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("SNOW_TIMEOUT_SECS"));

        clear_env();
    }

    #[test]
    fn test_validate_base_url_removes_trailing_slash() {
        let result =
            Config::validate_base_url("https://dev342687.service-now.com/api/now/table/".to_string())
                .unwrap();
        assert_eq!(result, "https://dev342687.service-now.com/api/now/table");
    }

    #[test]
    fn test_validate_base_url_requires_scheme() {
        assert!(Config::validate_base_url("example.com/api/now/table".to_string()).is_err());
        assert!(Config::validate_base_url("ftp://example.com".to_string()).is_err());
    }

    #[test]
    fn test_new_derives_incident_url() {
        let config = Config::new("https://example.com/api/now/table/", "deen-web", None).unwrap();
        assert_eq!(config.incident_url, "https://example.com/api/now/table/incident");
        assert_eq!(config.default_limit, DEFAULT_LIMIT);
        assert!(config.timeout.is_none());
        assert!(config.password().is_none());
    }

    #[test]
    fn test_new_rejects_empty_username() {
        let err = Config::new("https://example.com", "  ", None).unwrap_err();
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn test_with_incident_url_validates() {
        let config = Config::new("https://example.com", "user", None).unwrap();
        assert!(config.clone().with_incident_url("not a url").is_err());

        let config = config
            .with_incident_url("https://example.com/api/now/v2/table/incident")
            .unwrap();
        assert_eq!(
            config.incident_url,
            "https://example.com/api/now/v2/table/incident"
        );
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(Config::parse_positive("X", "25").unwrap(), 25);
        assert!(Config::parse_positive("X", "0").is_err());
        assert!(Config::parse_positive("X", "ten").is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config =
            Config::new("https://example.com", "user", Some("s3cret".to_string())).unwrap();
        let shown = format!("{:?}", config);
        assert!(!shown.contains("s3cret"));
        assert!(shown.contains("[REDACTED]"));
        assert_eq!(config.password(), Some("s3cret"));
    }
}
