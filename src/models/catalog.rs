//! Catalog and data product response shapes
//!
//! These are partial-update structures: each field is optional, and merging
//! one into a resource overwrites only the fields the response carried.

use super::merge_option;
use serde::{Deserialize, Serialize};

/// Response of `GET {api}/api/catalog[/{catalogId}]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Number of nested catalogs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_product_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalogs: Option<Vec<CatalogDetails>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_products: Option<Vec<DataProductDetails>>,
}

impl CatalogDetails {
    /// Overwrite every field `update` carries
    pub fn merge(&mut self, update: CatalogDetails) {
        merge_option(&mut self.id, update.id);
        merge_option(&mut self.name, update.name);
        merge_option(&mut self.description, update.description);
        merge_option(&mut self.catalog_count, update.catalog_count);
        merge_option(&mut self.data_product_count, update.data_product_count);
        merge_option(&mut self.catalogs, update.catalogs);
        merge_option(&mut self.data_products, update.data_products);
    }
}

/// Response of `GET {api}/api/catalog/{catalogId}/{dataProductId}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataProductDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
}

impl DataProductDetails {
    /// Overwrite every field `update` carries
    pub fn merge(&mut self, update: DataProductDetails) {
        merge_option(&mut self.id, update.id);
        merge_option(&mut self.name, update.name);
        merge_option(&mut self.description, update.description);
        merge_option(&mut self.record_count, update.record_count);
        merge_option(&mut self.variable_count, update.variable_count);
        merge_option(&mut self.last_update, update.last_update);
    }
}
