//! Mock REST naming service for testing the HTTP client.
//!
//! [`MockNamingServer`] binds a local TCP port and answers the REST routes of
//! the naming service from a [`MemoryNamingService`]. It is feature-gated
//! behind `testutil` to prevent leaking into production builds.
//!
//! The server understands just enough HTTP/1.1 for
//! [`HttpNamingService`](crate::HttpNamingService): one request per
//! connection, bodies delimited by `Content-Length`.
//!
//! # Usage
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use fogbase_naming::MemoryNamingService;
//! use fogbase_naming_http::{HttpNamingService, testutil::MockNamingServer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let server = MockNamingServer::start(MemoryNamingService::new()).await?;
//! let client = HttpNamingService::new(server.config())?;
//! # Ok(())
//! # }
//! ```

use std::{net::SocketAddr, sync::Arc};

use fogbase_naming::{
    ClientConfig, ClientId, KeygroupConfig, KeygroupId, MemoryNamingService, NamingError,
    NamingResult, NamingService, NodeConfig, NodeId, NodeRegistry, ReplicaNodeConfig,
    TriggerNodeConfig,
};
use serde::de::DeserializeOwned;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::Mutex,
    task::JoinHandle,
};

use crate::{
    config::{DEFAULT_RESOURCE_ROOT, HttpNamingConfig},
    wire::{IdBody, Message},
};

/// A request received by a [`MockNamingServer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// HTTP method, e.g. `PUT`.
    pub method: String,
    /// Request path without query string.
    pub path: String,
    /// Raw request body.
    pub body: String,
}

impl RecordedRequest {
    /// Parses the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

#[derive(Default)]
struct ServerState {
    requests: Vec<RecordedRequest>,
    forced: Option<(u16, String)>,
}

/// Local HTTP server emulating the naming service's REST interface.
///
/// The accept loop is aborted when the server is dropped.
pub struct MockNamingServer {
    addr: SocketAddr,
    service: MemoryNamingService,
    state: Arc<Mutex<ServerState>>,
    task: JoinHandle<()>,
}

impl MockNamingServer {
    /// Binds an ephemeral port on `127.0.0.1` and starts serving.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the port cannot be bound.
    pub async fn start(service: MemoryNamingService) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ServerState::default()));

        let task = tokio::spawn({
            let service = service.clone();
            let state = Arc::clone(&state);
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let service = service.clone();
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(stream, &service, &state).await {
                            tracing::debug!(error = %e, "Mock naming connection failed");
                        }
                    });
                }
            }
        });

        Ok(Self { addr, service, state, task })
    }

    /// Returns the base URL of the server, e.g. `http://127.0.0.1:40123`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Returns a client configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Never in practice: the base URL is always valid.
    #[must_use]
    pub fn config(&self) -> HttpNamingConfig {
        HttpNamingConfig::builder()
            .base_url(self.base_url())
            .build()
            .expect("mock server URL is a valid base URL")
    }

    /// Returns the in-memory service backing this server.
    #[must_use]
    pub fn service(&self) -> &MemoryNamingService {
        &self.service
    }

    /// Returns every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }

    /// Answers every following request with `status` and `body` without
    /// touching the backing service.
    pub async fn force_status(&self, status: u16, body: impl Into<String>) {
        self.state.lock().await.forced = Some((status, body.into()));
    }

    /// Resumes normal request handling after [`force_status`](Self::force_status).
    pub async fn clear_forced_status(&self) {
        self.state.lock().await.forced = None;
    }
}

impl Drop for MockNamingServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl std::fmt::Debug for MockNamingServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockNamingServer").field("addr", &self.addr).finish_non_exhaustive()
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    service: &MemoryNamingService,
    state: &Mutex<ServerState>,
) -> std::io::Result<()> {
    let Some(request) = read_request(&mut stream).await? else {
        return Ok(());
    };

    let forced = {
        let mut state = state.lock().await;
        state.requests.push(request.clone());
        state.forced.clone()
    };

    let (status, body) = match forced {
        Some(forced) => forced,
        None => route(service, &request).await,
    };
    write_response(&mut stream, status, &body).await
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<Option<RecordedRequest>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_owned();
    let target = request_line.next().unwrap_or_default();
    let path = target.split_once('?').map_or(target, |(path, _)| path).to_owned();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let end = buf.len().min(head_end + content_length);
    let body = String::from_utf8_lossy(&buf[head_end..end]).into_owned();
    Ok(Some(RecordedRequest { method, path, body }))
}

async fn write_response(stream: &mut TcpStream, status: u16, body: &str) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        reason_phrase(status),
        body.len(),
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

type Reply = (u16, String);

async fn route(service: &MemoryNamingService, request: &RecordedRequest) -> Reply {
    let segments: Vec<&str> = request
        .path
        .split('/')
        .filter(|s| !s.is_empty())
        .skip_while(|s| *s == DEFAULT_RESOURCE_ROOT)
        .collect();

    match (request.method.as_str(), segments.as_slice()) {
        ("GET", ["keygroups", app, tenant, group]) => match keygroup_id(app, tenant, group) {
            Ok(id) => match service.get_keygroup_config(&id).await {
                Ok(Some(config)) => match Message::wrap(&config).and_then(|m| serde_json::to_string(&m)) {
                    Ok(body) => (200, body),
                    Err(e) => (500, e.to_string()),
                },
                Ok(None) => (404, "Keygroup does not exist".to_owned()),
                Err(e) => error_reply(&e),
            },
            Err(reply) => reply,
        },
        ("POST", ["keygroups"]) => {
            with_body::<KeygroupConfig, _, _>(request, |config| async move {
                service.create_keygroup(&config).await
            })
            .await
        },
        ("POST", ["nodes"]) => {
            with_body::<NodeConfig, _, _>(request, |node| async move {
                service.create_node_config(&node).await
            })
            .await
        },
        ("POST", ["clients"]) => {
            with_body::<ClientConfig, _, _>(request, |client| async move {
                service.create_client_config(&client).await
            })
            .await
        },
        ("PUT", ["keygroups", app, tenant, group, action]) => {
            let id = match keygroup_id(app, tenant, group) {
                Ok(id) => id,
                Err(reply) => return reply,
            };
            let id = &id;
            match *action {
                "addClient" => {
                    with_body::<IdBody<ClientId>, _, _>(request, |body| async move {
                        service.add_client(id, &body.id).await
                    })
                    .await
                },
                "deleteClient" => {
                    with_body::<IdBody<ClientId>, _, _>(request, |body| async move {
                        service.delete_client(id, &body.id).await
                    })
                    .await
                },
                "addReplicaNode" => {
                    with_body::<ReplicaNodeConfig, _, _>(request, |replica| async move {
                        service.add_replica_node(id, &replica).await
                    })
                    .await
                },
                "addTriggerNode" => {
                    with_body::<TriggerNodeConfig, _, _>(request, |trigger| async move {
                        service.add_trigger_node(id, &trigger).await
                    })
                    .await
                },
                "deleteNode" => {
                    with_body::<IdBody<NodeId>, _, _>(request, |body| async move {
                        service.delete_node(id, &body.id).await
                    })
                    .await
                },
                _ => (404, format!("unknown keygroup action {action}")),
            }
        },
        _ => (405, format!("{} {} is not supported", request.method, request.path)),
    }
}

fn keygroup_id(app: &str, tenant: &str, group: &str) -> Result<KeygroupId, Reply> {
    KeygroupId::new(app, tenant, group).map_err(|e| (400, e.to_string()))
}

async fn with_body<T, F, Fut>(request: &RecordedRequest, handler: F) -> Reply
where
    T: DeserializeOwned,
    F: FnOnce(T) -> Fut,
    Fut: std::future::Future<Output = NamingResult<()>>,
{
    match serde_json::from_str::<T>(&request.body) {
        Ok(body) => match handler(body).await {
            Ok(()) => (200, String::new()),
            Err(e) => error_reply(&e),
        },
        Err(e) => (400, format!("malformed body: {e}")),
    }
}

fn error_reply(err: &NamingError) -> Reply {
    let status = match err {
        NamingError::NotFound { .. } => 404,
        NamingError::Rejected { .. } => 409,
        NamingError::Serialization { .. } => 400,
        NamingError::Connection { .. } | NamingError::Timeout => 503,
        _ => 500,
    };
    (status, err.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_route_is_not_supported() {
        let service = MemoryNamingService::new();
        let request =
            RecordedRequest { method: "DELETE".into(), path: "/jersey/nodes".into(), body: String::new() };

        let (status, _) = route(&service, &request).await;
        assert_eq!(status, 405);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let service = MemoryNamingService::new();
        let request = RecordedRequest {
            method: "POST".into(),
            path: "/jersey/nodes".into(),
            body: "{".into(),
        };

        let (status, _) = route(&service, &request).await;
        assert_eq!(status, 400);
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_keygroup_is_404() {
        let service = MemoryNamingService::new();
        let request = RecordedRequest {
            method: "GET".into(),
            path: "/jersey/keygroups/a/b/c".into(),
            body: String::new(),
        };

        assert_eq!(route(&service, &request).await, (404, "Keygroup does not exist".to_owned()));
    }

    #[test]
    fn test_error_reply_statuses() {
        assert_eq!(error_reply(&NamingError::not_found("a/b/c")).0, 404);
        assert_eq!(error_reply(&NamingError::rejected("dup")).0, 409);
        assert_eq!(error_reply(&NamingError::internal("boom")).0, 500);
    }
}
