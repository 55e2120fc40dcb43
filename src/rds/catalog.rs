//! RDS Catalog
//!
//! A named collection of data products on a server.

use super::data_product::DataProduct;
use super::http::{self, HttpResponse};
use super::server::Server;
use crate::error::Result;
use crate::models::CatalogDetails;
use crate::resource::{self, spawn_resolution, AsyncResource, ResolutionState};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, RwLock};

/// A catalog on an RDS server
///
/// ```ignore
/// let catalog = Catalog::new(&server, "covid19", false);
/// let metadata = catalog.get_metadata().await?.into_body();
/// ```
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    server: Server,
    catalog_id: String,
    state: ResolutionState,
    details: RwLock<CatalogDetails>,
}

impl Catalog {
    /// Create a catalog on `server`
    ///
    /// With `resolve` set, resolution starts in the background; failures are
    /// logged, not returned.
    pub fn new(server: &Server, catalog_id: &str, resolve: bool) -> Self {
        let catalog = Self {
            inner: Arc::new(CatalogInner {
                server: server.clone(),
                catalog_id: catalog_id.to_string(),
                state: ResolutionState::new(server.policy()),
                details: RwLock::new(CatalogDetails::default()),
            }),
        };

        if resolve {
            spawn_resolution(&catalog);
        }

        catalog
    }

    pub fn catalog_id(&self) -> &str {
        &self.inner.catalog_id
    }

    pub fn server(&self) -> &Server {
        &self.inner.server
    }

    pub fn api_url(&self) -> &str {
        self.inner.server.api_url()
    }

    /// The url for catalog related endpoints
    pub fn catalog_url(&self) -> String {
        format!("{}/{}", self.inner.server.root_catalog_url(), self.inner.catalog_id)
    }

    pub fn metadata_url(&self) -> String {
        format!("{}/metadata", self.catalog_url())
    }

    /// Catalog fields merged by resolution so far
    pub fn details(&self) -> CatalogDetails {
        resource::read(&self.inner.details).clone()
    }

    pub fn name(&self) -> Option<String> {
        resource::read(&self.inner.details).name.clone()
    }

    pub fn catalog_count(&self) -> Option<u64> {
        resource::read(&self.inner.details).catalog_count
    }

    /// Get catalog metadata
    ///
    /// Record layouts for every data product in the catalog, with the
    /// classifications their variables reference.
    pub async fn get_metadata(&self) -> Result<HttpResponse<Value>> {
        http::get(self.inner.server.transport(), &self.metadata_url()).await
    }

    /// Create a data product in this catalog without resolving it
    pub fn get_data_product(&self, data_product_id: &str) -> DataProduct {
        DataProduct::new(self, data_product_id, false)
    }
}

#[async_trait]
impl AsyncResource for Catalog {
    fn resolution(&self) -> &ResolutionState {
        &self.inner.state
    }

    fn detail_url(&self) -> String {
        self.catalog_url()
    }

    async fn fetch_and_merge(&self) -> Result<()> {
        let response =
            http::get::<CatalogDetails>(self.inner.server.transport(), &self.detail_url()).await?;
        resource::write(&self.inner.details).merge(response.into_body());
        Ok(())
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("catalog_id", &self.inner.catalog_id)
            .field("api_url", &self.api_url())
            .field("state", &self.inner.state)
            .finish()
    }
}
