//! RDS Server
//!
//! Root of the resource hierarchy. Owns the API url and the transport every
//! child resource talks through.

use super::catalog::Catalog;
use super::http::{self, HttpResponse, ReqwestTransport, Transport};
use crate::error::Result;
use crate::models::{CatalogDetails, RdsVersion, ServerInformation};
use crate::resource::{self, spawn_resolution, AsyncResource, ResolutionPolicy, ResolutionState};
use crate::urls::{parse_url, strip_trailing_slashes, ParsedUrl};
use async_trait::async_trait;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// An RDS API server
///
/// Cheap to clone; clones share resolution state and resolved data.
///
/// ```ignore
/// let server = Server::new("https://covid19.richdataservices.com/rds")?;
/// let info = server.get_info().await?.into_body();
/// ```
#[derive(Clone)]
pub struct Server {
    inner: Arc<ServerInner>,
}

struct ServerInner {
    parsed_url: ParsedUrl,
    api_url: String,
    transport: Arc<dyn Transport>,
    state: ResolutionState,
    info: RwLock<ServerInformation>,
}

impl Server {
    /// Create a server talking through a reqwest transport
    ///
    /// Trailing slashes are stripped before parsing.
    pub fn new(url: &str) -> Result<Self> {
        Self::builder(url).build()
    }

    /// Create a server talking through `transport`
    pub fn with_transport(url: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        Self::builder(url).transport(transport).build()
    }

    /// Assemble `protocol://host[:port]path` and create a server from it
    pub fn from_url_parts(protocol: &str, host: &str, port: Option<u16>, path: &str) -> Result<Self> {
        Self::new(&join_url_parts(protocol, host, port, path))
    }

    pub fn builder(url: &str) -> ServerBuilder {
        ServerBuilder {
            url: url.to_string(),
            transport: None,
            timeout: None,
            policy: ResolutionPolicy::default(),
            resolve: false,
        }
    }

    /// Base url every endpoint is derived from, without trailing slash
    pub fn api_url(&self) -> &str {
        &self.inner.api_url
    }

    pub fn parsed_url(&self) -> &ParsedUrl {
        &self.inner.parsed_url
    }

    /// Policy children created from this server inherit
    pub fn policy(&self) -> ResolutionPolicy {
        self.inner.state.policy()
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }

    pub fn server_info_url(&self) -> String {
        format!("{}/api/server/info", self.api_url())
    }

    pub fn changelog_url(&self) -> String {
        format!("{}/api/server/changelog", self.api_url())
    }

    pub fn root_catalog_url(&self) -> String {
        format!("{}/api/catalog", self.api_url())
    }

    /// Base url for query endpoints
    pub fn query_url(&self) -> String {
        format!("{}/api/query", self.api_url())
    }

    /// Server information merged by the last successful resolution
    pub fn info(&self) -> ServerInformation {
        resource::read(&self.inner.info).clone()
    }

    /// Get server information
    pub async fn get_info(&self) -> Result<HttpResponse<ServerInformation>> {
        http::get(self.transport(), &self.server_info_url()).await
    }

    /// Get the changelog, one entry per released version
    pub async fn get_changelog(&self) -> Result<HttpResponse<Vec<RdsVersion>>> {
        http::get(self.transport(), &self.changelog_url()).await
    }

    /// Get the root catalog with every catalog and data product on the server
    pub async fn get_root_catalog(&self) -> Result<HttpResponse<CatalogDetails>> {
        http::get(self.transport(), &self.root_catalog_url()).await
    }

    /// Create a catalog on this server without resolving it
    pub fn get_catalog(&self, catalog_id: &str) -> Catalog {
        Catalog::new(self, catalog_id, false)
    }
}

#[async_trait]
impl AsyncResource for Server {
    fn resolution(&self) -> &ResolutionState {
        &self.inner.state
    }

    fn detail_url(&self) -> String {
        self.server_info_url()
    }

    async fn fetch_and_merge(&self) -> Result<()> {
        let response = self.get_info().await?;
        resource::write(&self.inner.info).merge(response.into_body());
        Ok(())
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("api_url", &self.inner.api_url)
            .field("state", &self.inner.state)
            .finish()
    }
}

/// Configures a [`Server`] before creating it
pub struct ServerBuilder {
    url: String,
    transport: Option<Arc<dyn Transport>>,
    timeout: Option<Duration>,
    policy: ResolutionPolicy,
    resolve: bool,
}

impl ServerBuilder {
    /// Use `transport` instead of the default reqwest transport
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Request timeout for the default transport
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Start resolving server information as soon as the server is built
    pub fn resolve(mut self, resolve: bool) -> Self {
        self.resolve = resolve;
        self
    }

    pub fn build(self) -> Result<Server> {
        let parsed_url = parse_url(strip_trailing_slashes(&self.url))?;
        let api_url = parsed_url.base_url();

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::with_timeout(self.timeout)?),
        };

        tracing::debug!("RDS server at {}", api_url);

        let server = Server {
            inner: Arc::new(ServerInner {
                parsed_url,
                api_url,
                transport,
                state: ResolutionState::new(self.policy),
                info: RwLock::new(ServerInformation::default()),
            }),
        };

        if self.resolve {
            spawn_resolution(&server);
        }

        Ok(server)
    }
}

fn join_url_parts(protocol: &str, host: &str, port: Option<u16>, path: &str) -> String {
    let protocol = protocol.trim_end_matches("://").trim_end_matches(':');
    let port = port.map(|p| format!(":{}", p)).unwrap_or_default();
    let separator = if path.is_empty() || path.starts_with('/') { "" } else { "/" };
    format!("{}://{}{}{}{}", protocol, host, port, separator, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COVID_API_URL: &str = "https://covid19.richdataservices.com/rds";

    #[test]
    fn test_sets_api_url() {
        let server = Server::new(COVID_API_URL).unwrap();
        assert_eq!(server.api_url(), COVID_API_URL);
        assert_eq!(server.parsed_url().protocol, "https");
        assert_eq!(server.parsed_url().host, "covid19.richdataservices.com");
        assert_eq!(server.parsed_url().path, "/rds");
    }

    #[test]
    fn test_removes_trailing_slashes() {
        let server = Server::new(&format!("{}//", COVID_API_URL)).unwrap();
        assert_eq!(server.parsed_url().source, COVID_API_URL);
        assert_eq!(server.api_url(), COVID_API_URL);
    }

    #[test]
    fn test_endpoint_urls() {
        let server = Server::new(COVID_API_URL).unwrap();
        assert_eq!(server.server_info_url(), format!("{}/api/server/info", COVID_API_URL));
        assert_eq!(server.changelog_url(), format!("{}/api/server/changelog", COVID_API_URL));
        assert_eq!(server.root_catalog_url(), format!("{}/api/catalog", COVID_API_URL));
        assert_eq!(server.query_url(), format!("{}/api/query", COVID_API_URL));
    }

    #[test]
    fn test_from_url_parts() {
        let server = Server::from_url_parts("https", "covid19.richdataservices.com", None, "/rds").unwrap();
        assert_eq!(server.api_url(), COVID_API_URL);

        let server = Server::from_url_parts("http://", "localhost", Some(8080), "rds/").unwrap();
        assert_eq!(server.api_url(), "http://localhost:8080/rds");
    }

    #[test]
    fn test_malformed_url_is_rejected() {
        assert!(matches!(
            Server::new("covid19.richdataservices.com/rds"),
            Err(crate::error::RdsError::MalformedUrl { .. })
        ));
    }

    #[test]
    fn test_get_catalog_creates_unresolved_child() {
        let server = Server::new(COVID_API_URL).unwrap();
        let catalog = server.get_catalog("int");
        assert_eq!(catalog.catalog_id(), "int");
        assert!(!catalog.is_resolved());
        assert!(!server.is_resolved());
    }
}
