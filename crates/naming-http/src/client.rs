//! REST implementation of the naming-service traits.
//!
//! [`HttpNamingService`] talks to the REST interface a FogBase node exposes
//! for its naming service:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `get_keygroup_config` | `GET keygroups/{app}/{tenant}/{group}` |
//! | `create_keygroup` | `POST keygroups` |
//! | `add_client` | `PUT keygroups/{app}/{tenant}/{group}/addClient` |
//! | `delete_client` | `PUT keygroups/{app}/{tenant}/{group}/deleteClient` |
//! | `add_replica_node` | `PUT keygroups/{app}/{tenant}/{group}/addReplicaNode` |
//! | `add_trigger_node` | `PUT keygroups/{app}/{tenant}/{group}/addTriggerNode` |
//! | `delete_node` | `PUT keygroups/{app}/{tenant}/{group}/deleteNode` |
//! | `create_node_config` | `POST nodes` |
//! | `create_client_config` | `POST clients` |
//!
//! Any 2xx response acknowledges a mutation. A 404 on the keygroup read
//! means the keygroup does not exist.

use async_trait::async_trait;
use fogbase_naming::{
    ClientConfig, ClientId, KeygroupConfig, KeygroupId, NamingError, NamingResult, NamingService,
    NodeConfig, NodeId, NodeRegistry, ReplicaNodeConfig, TriggerNodeConfig,
};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;

use crate::{
    config::HttpNamingConfig,
    error::{HttpNamingError, Result},
    wire::{IdBody, Message},
};

/// Naming service reached over HTTP.
///
/// # Cloning
///
/// Cloning is cheap; clones share the underlying connection pool.
///
/// # Example
///
/// ```no_run
/// use fogbase_naming::NamingService;
/// use fogbase_naming_http::{HttpNamingConfig, HttpNamingService};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = HttpNamingConfig::builder().base_url("http://localhost:8081").build()?;
/// let service = HttpNamingService::new(config)?;
///
/// let keygroup = service.get_keygroup_config(&"app/tenant/group".parse()?).await?;
/// println!("exists: {}", keygroup.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpNamingService {
    client: reqwest::Client,
    endpoint: Url,
    config: HttpNamingConfig,
}

impl HttpNamingService {
    /// Creates a client for the naming service described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpNamingError::Config`] if `config` is invalid and
    /// [`HttpNamingError::Request`] if the HTTP client cannot be built.
    pub fn new(config: HttpNamingConfig) -> Result<Self> {
        config.validate()?;
        let endpoint = config.endpoint()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        tracing::debug!(endpoint = %endpoint, "Created HTTP naming client");
        Ok(Self { client, endpoint, config })
    }

    /// Returns the configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &HttpNamingConfig {
        &self.config
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        // `PathSegmentsMut` drops `.` and `..` instead of encoding them.
        if let Some(segment) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(HttpNamingError::Config(format!(
                "path segment {segment:?} is not allowed"
            )));
        }
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| HttpNamingError::Config(format!("'{}' cannot be a base", self.endpoint)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn keygroup_url(&self, keygroup: &KeygroupId, action: Option<&str>) -> Result<Url> {
        let [app, tenant, group] = keygroup.segments();
        match action {
            Some(action) => self.url(&["keygroups", app, tenant, group, action]),
            None => self.url(&["keygroups", app, tenant, group]),
        }
    }

    /// Sends a request and fails on any non-2xx status.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        tracing::debug!(%method, url = %url, "Sending naming request");

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "Naming service responded");
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_owned();
        let body = response.text().await.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Failed to read error response body");
            String::new()
        });
        Err(HttpNamingError::Status { status, path, body })
    }

    async fn put<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<()> {
        self.send(Method::PUT, url, Some(body)).await.map(drop)
    }

    async fn post<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<()> {
        self.send(Method::POST, url, Some(body)).await.map(drop)
    }

    async fn fetch_keygroup(&self, keygroup: &KeygroupId) -> Result<Option<KeygroupConfig>> {
        let url = self.keygroup_url(keygroup, None)?;
        let response = match self.send::<()>(Method::GET, url, None).await {
            Ok(response) => response,
            Err(HttpNamingError::Status { status: StatusCode::NOT_FOUND, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let text = response.text().await?;
        let message: Message = serde_json::from_str(&text).map_err(|source| {
            HttpNamingError::Decode { message: "response envelope".into(), source }
        })?;
        let content = message.content.unwrap_or_default();
        let config = serde_json::from_str(&content).map_err(|source| HttpNamingError::Decode {
            message: format!("keygroup configuration of {keygroup}"),
            source,
        })?;
        Ok(Some(config))
    }
}

#[async_trait]
impl NamingService for HttpNamingService {
    #[tracing::instrument(skip(self), fields(keygroup = %keygroup))]
    async fn get_keygroup_config(
        &self,
        keygroup: &KeygroupId,
    ) -> NamingResult<Option<KeygroupConfig>> {
        self.fetch_keygroup(keygroup).await.map_err(NamingError::from)
    }

    #[tracing::instrument(skip(self, config), fields(keygroup = %config.keygroup_id()))]
    async fn create_keygroup(&self, config: &KeygroupConfig) -> NamingResult<()> {
        let url = self.url(&["keygroups"])?;
        Ok(self.post(url, config).await?)
    }

    #[tracing::instrument(skip(self), fields(keygroup = %keygroup, client = %client))]
    async fn add_client(&self, keygroup: &KeygroupId, client: &ClientId) -> NamingResult<()> {
        let url = self.keygroup_url(keygroup, Some("addClient"))?;
        Ok(self.put(url, &IdBody { id: client }).await?)
    }

    #[tracing::instrument(skip(self), fields(keygroup = %keygroup, client = %client))]
    async fn delete_client(&self, keygroup: &KeygroupId, client: &ClientId) -> NamingResult<()> {
        let url = self.keygroup_url(keygroup, Some("deleteClient"))?;
        Ok(self.put(url, &IdBody { id: client }).await?)
    }

    #[tracing::instrument(
        skip(self, replica),
        fields(keygroup = %keygroup, node = %replica.node_id, ttl = %replica.time_to_live)
    )]
    async fn add_replica_node(
        &self,
        keygroup: &KeygroupId,
        replica: &ReplicaNodeConfig,
    ) -> NamingResult<()> {
        let url = self.keygroup_url(keygroup, Some("addReplicaNode"))?;
        Ok(self.put(url, replica).await?)
    }

    #[tracing::instrument(skip(self, trigger), fields(keygroup = %keygroup, node = %trigger.node_id))]
    async fn add_trigger_node(
        &self,
        keygroup: &KeygroupId,
        trigger: &TriggerNodeConfig,
    ) -> NamingResult<()> {
        let url = self.keygroup_url(keygroup, Some("addTriggerNode"))?;
        Ok(self.put(url, trigger).await?)
    }

    #[tracing::instrument(skip(self), fields(keygroup = %keygroup, node = %node))]
    async fn delete_node(&self, keygroup: &KeygroupId, node: &NodeId) -> NamingResult<()> {
        let url = self.keygroup_url(keygroup, Some("deleteNode"))?;
        Ok(self.put(url, &IdBody { id: node }).await?)
    }
}

#[async_trait]
impl NodeRegistry for HttpNamingService {
    #[tracing::instrument(skip(self, node), fields(node = %node.node_id))]
    async fn create_node_config(&self, node: &NodeConfig) -> NamingResult<()> {
        let url = self.url(&["nodes"])?;
        Ok(self.post(url, node).await?)
    }

    #[tracing::instrument(skip(self, client), fields(client = %client.client_id))]
    async fn create_client_config(&self, client: &ClientConfig) -> NamingResult<()> {
        let url = self.url(&["clients"])?;
        Ok(self.post(url, client).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service(base_url: &str) -> HttpNamingService {
        HttpNamingService::new(HttpNamingConfig::builder().base_url(base_url).build().unwrap())
            .unwrap()
    }

    #[test]
    fn test_keygroup_url() {
        let service = service("http://localhost:8081");
        let keygroup: KeygroupId = "smarthome/lights/floor1".parse().unwrap();

        assert_eq!(
            service.keygroup_url(&keygroup, None).unwrap().as_str(),
            "http://localhost:8081/jersey/keygroups/smarthome/lights/floor1"
        );
        assert_eq!(
            service.keygroup_url(&keygroup, Some("addReplicaNode")).unwrap().as_str(),
            "http://localhost:8081/jersey/keygroups/smarthome/lights/floor1/addReplicaNode"
        );
    }

    #[test]
    fn test_keygroup_url_keeps_every_segment() {
        let service = service("http://localhost:8081");
        let keygroup: KeygroupId = ".app/tenant../..x".parse().unwrap();

        assert_eq!(
            service.keygroup_url(&keygroup, Some("addClient")).unwrap().as_str(),
            "http://localhost:8081/jersey/keygroups/.app/tenant../..x/addClient"
        );
    }

    #[test]
    fn test_url_rejects_dot_segments() {
        let service = service("http://localhost:8081");

        for segments in [&["keygroups", "..", "b", "c"][..], &["keygroups", "a", ".", "c"][..]] {
            assert!(matches!(service.url(segments), Err(HttpNamingError::Config(_))));
        }
    }

    #[test]
    fn test_collection_urls_respect_base_path() {
        let service = service("http://10.0.0.1:8081/fbase/");

        assert_eq!(service.url(&["nodes"]).unwrap().as_str(), "http://10.0.0.1:8081/fbase/jersey/nodes");
        assert_eq!(
            service.url(&["keygroups"]).unwrap().as_str(),
            "http://10.0.0.1:8081/fbase/jersey/keygroups"
        );
    }

    #[test]
    fn test_new_rejects_invalid_deserialized_config() {
        let config: HttpNamingConfig =
            serde_json::from_str(r#"{ "base_url": "not a url" }"#).unwrap();
        assert!(matches!(HttpNamingService::new(config), Err(HttpNamingError::Config(_))));
    }
}
