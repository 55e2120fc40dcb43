//! Query controller
//!
//! Query endpoints addressed by catalog and data product ID against the
//! process-wide server (see [`global`](super::global)).

use super::global;
use super::http::HttpResponse;
use crate::error::Result;
use crate::models::{SelectParameters, TabulateParameters};
use serde::de::DeserializeOwned;

/// Base url for query endpoints on the process-wide server
pub fn query_url() -> Result<String> {
    Ok(global::instance()?.query_url())
}

/// Get record count
pub async fn count(catalog_id: &str, data_product_id: &str) -> Result<HttpResponse<u64>> {
    let server = global::instance()?;
    server
        .get_catalog(catalog_id)
        .get_data_product(data_product_id)
        .count()
        .await
}

/// Run a select query
pub async fn select<DS: DeserializeOwned>(
    catalog_id: &str,
    data_product_id: &str,
    parameters: Option<&SelectParameters>,
) -> Result<HttpResponse<DS>> {
    let server = global::instance()?;
    server
        .get_catalog(catalog_id)
        .get_data_product(data_product_id)
        .select(parameters)
        .await
}

/// Run a tabulation
pub async fn tabulate<DS: DeserializeOwned>(
    catalog_id: &str,
    data_product_id: &str,
    parameters: Option<&TabulateParameters>,
) -> Result<HttpResponse<DS>> {
    let server = global::instance()?;
    server
        .get_catalog(catalog_id)
        .get_data_product(data_product_id)
        .tabulate(parameters)
        .await
}
