//! Configuration for the HTTP naming client.
//!
//! This module provides [`HttpNamingConfig`], which tells
//! [`HttpNamingService`](crate::HttpNamingService) where the naming service's
//! REST interface lives and how long to wait for it.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{HttpNamingError, Result};

/// Default resource root under the base URL.
pub const DEFAULT_RESOURCE_ROOT: &str = "jersey";

/// Default request timeout (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (5 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for [`HttpNamingService`](crate::HttpNamingService).
///
/// Requests go to `{base_url}/{resource_root}/...`, e.g.
/// `http://10.0.0.1:8081/jersey/keygroups/app/tenant/group`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use fogbase_naming_http::HttpNamingConfig;
///
/// let config = HttpNamingConfig::builder()
///     .base_url("http://localhost:8081")
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// assert_eq!(config.resource_root(), "jersey");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpNamingConfig {
    /// Absolute http or https URL of the node hosting the REST interface.
    pub(crate) base_url: String,

    /// Path prefix of the REST resources.
    #[serde(default = "default_resource_root")]
    pub(crate) resource_root: String,

    /// Request timeout.
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub(crate) timeout: Duration,

    /// Connection timeout.
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub(crate) connect_timeout: Duration,

    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub(crate) user_agent: String,
}

fn default_resource_root() -> String {
    DEFAULT_RESOURCE_ROOT.to_owned()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_owned()
}

#[bon::bon]
impl HttpNamingConfig {
    /// Creates a new configuration, validating all fields.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Absolute http or https URL of the naming service node.
    ///
    /// # Optional Fields
    ///
    /// * `resource_root` - Path prefix of the REST resources (default: `jersey`).
    /// * `timeout` - Request timeout (default: 30 seconds).
    /// * `connect_timeout` - Connection timeout (default: 5 seconds).
    /// * `user_agent` - `User-Agent` header (default: crate name and version).
    ///
    /// # Errors
    ///
    /// Returns [`HttpNamingError::Config`] if:
    /// - `base_url` is not an absolute http or https URL
    /// - Either timeout is zero
    #[builder]
    pub fn new(
        #[builder(into)] base_url: String,
        #[builder(into, default = default_resource_root())] resource_root: String,
        #[builder(default = DEFAULT_TIMEOUT)] timeout: Duration,
        #[builder(default = DEFAULT_CONNECT_TIMEOUT)] connect_timeout: Duration,
        #[builder(into, default = default_user_agent())] user_agent: String,
    ) -> Result<Self> {
        let config = Self { base_url, resource_root, timeout, connect_timeout, user_agent };
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration.
    ///
    /// Configurations built with [`builder`](Self::builder) are already
    /// valid; this is for configurations obtained through deserialization.
    ///
    /// # Errors
    ///
    /// Same conditions as [`new`](Self::new).
    pub fn validate(&self) -> Result<()> {
        self.endpoint()?;

        if self.timeout.is_zero() {
            return Err(HttpNamingError::Config("timeout must be greater than zero".into()));
        }

        if self.connect_timeout.is_zero() {
            return Err(HttpNamingError::Config(
                "connect_timeout must be greater than zero".into(),
            ));
        }

        Ok(())
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the resource root.
    #[must_use]
    pub fn resource_root(&self) -> &str {
        &self.resource_root
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the connection timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the `User-Agent` header value.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the base URL with the resource root appended.
    pub(crate) fn endpoint(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            HttpNamingError::Config(format!("invalid base_url '{}': {e}", self.base_url))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(HttpNamingError::Config(format!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }

        url.path_segments_mut()
            .map_err(|()| {
                HttpNamingError::Config(format!("base_url '{}' cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(self.resource_root.split('/').filter(|s| !s.is_empty()));

        Ok(url)
    }
}
