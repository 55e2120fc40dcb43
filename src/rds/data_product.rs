//! RDS Data Product
//!
//! A queryable dataset within a catalog. Besides resolution it exposes the
//! query endpoints: record count, select and tabulate.

use super::catalog::Catalog;
use super::http::{self, HttpResponse};
use crate::error::Result;
use crate::models::{DataProductDetails, SelectParameters, TabulateParameters};
use crate::resource::{self, spawn_resolution, AsyncResource, ResolutionState};
use crate::urls::serialize_parameters;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, RwLock};

/// A data product in an RDS catalog
///
/// ```ignore
/// let server = Server::new("https://covid19.richdataservices.com/rds")?;
/// let product = server.get_catalog("covid19").get_data_product("us_jhu_ccse_country");
/// let rows: serde_json::Value = product.select(None).await?.into_body();
/// ```
#[derive(Clone)]
pub struct DataProduct {
    inner: Arc<DataProductInner>,
}

struct DataProductInner {
    catalog: Catalog,
    data_product_id: String,
    state: ResolutionState,
    details: RwLock<DataProductDetails>,
}

impl DataProduct {
    /// Create a data product in `catalog`
    ///
    /// With `resolve` set, resolution starts in the background; failures are
    /// logged, not returned.
    pub fn new(catalog: &Catalog, data_product_id: &str, resolve: bool) -> Self {
        let product = Self {
            inner: Arc::new(DataProductInner {
                catalog: catalog.clone(),
                data_product_id: data_product_id.to_string(),
                state: ResolutionState::new(catalog.server().policy()),
                details: RwLock::new(DataProductDetails::default()),
            }),
        };

        if resolve {
            spawn_resolution(&product);
        }

        product
    }

    pub fn data_product_id(&self) -> &str {
        &self.inner.data_product_id
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// The url for data product related endpoints
    pub fn data_product_url(&self) -> String {
        format!("{}/{}", self.inner.catalog.catalog_url(), self.inner.data_product_id)
    }

    /// The url for query endpoints of this data product
    pub fn query_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.inner.catalog.server().query_url(),
            self.inner.catalog.catalog_id(),
            self.inner.data_product_id
        )
    }

    pub fn count_url(&self) -> String {
        format!("{}/count", self.query_url())
    }

    /// `{query_url}/select?{parameters}`; the `?` is always present
    pub fn select_url(&self, parameters: Option<&SelectParameters>) -> Result<String> {
        self.operation_url("select", parameters)
    }

    /// `{query_url}/tabulate?{parameters}`; the `?` is always present
    pub fn tabulate_url(&self, parameters: Option<&TabulateParameters>) -> Result<String> {
        self.operation_url("tabulate", parameters)
    }

    fn operation_url<P: Serialize>(&self, operation: &str, parameters: Option<&P>) -> Result<String> {
        Ok(format!(
            "{}/{}?{}",
            self.query_url(),
            operation,
            serialize_parameters(parameters)?
        ))
    }

    /// Data product fields merged by resolution so far
    pub fn details(&self) -> DataProductDetails {
        resource::read(&self.inner.details).clone()
    }

    pub fn name(&self) -> Option<String> {
        resource::read(&self.inner.details).name.clone()
    }

    pub fn description(&self) -> Option<String> {
        resource::read(&self.inner.details).description.clone()
    }

    /// Get record count
    pub async fn count(&self) -> Result<HttpResponse<u64>> {
        http::get(self.transport(), &self.count_url()).await
    }

    /// Run a select query
    ///
    /// Returns record level microdata. The shape of `DS` depends on the
    /// `format` parameter; `serde_json::Value` accepts any of them.
    pub async fn select<DS: DeserializeOwned>(
        &self,
        parameters: Option<&SelectParameters>,
    ) -> Result<HttpResponse<DS>> {
        let url = self.select_url(parameters)?;
        http::get(self.transport(), &url).await
    }

    /// Run a tabulation
    ///
    /// Returns aggregate level data about the requested dimensions and
    /// measures. The shape of `DS` depends on the `format` parameter.
    pub async fn tabulate<DS: DeserializeOwned>(
        &self,
        parameters: Option<&TabulateParameters>,
    ) -> Result<HttpResponse<DS>> {
        let url = self.tabulate_url(parameters)?;
        http::get(self.transport(), &url).await
    }

    fn transport(&self) -> &dyn http::Transport {
        self.inner.catalog.server().transport()
    }
}

#[async_trait]
impl AsyncResource for DataProduct {
    fn resolution(&self) -> &ResolutionState {
        &self.inner.state
    }

    fn detail_url(&self) -> String {
        self.data_product_url()
    }

    async fn fetch_and_merge(&self) -> Result<()> {
        let response = http::get::<DataProductDetails>(self.transport(), &self.detail_url()).await?;
        resource::write(&self.inner.details).merge(response.into_body());
        Ok(())
    }
}

impl fmt::Debug for DataProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataProduct")
            .field("catalog_id", &self.inner.catalog.catalog_id())
            .field("data_product_id", &self.inner.data_product_id)
            .field("state", &self.inner.state)
            .finish()
    }
}
