//! RDS API interaction module
//!
//! This module provides the resource hierarchy of an RDS API and the HTTP
//! plumbing underneath it.
//!
//! # Module Structure
//!
//! - [`server`] - root resource, owns the API url and transport
//! - [`catalog`] - catalogs on a server
//! - [`data_product`] - data products in a catalog, with count/select/tabulate
//! - [`http`] - transport trait, reqwest transport and typed requests
//! - [`global`] - write-once process-wide server
//! - [`query`] - query endpoints against the process-wide server
//!
//! # Example
//!
//! ```ignore
//! use rds_sdk::rds::Server;
//! use rds_sdk::resource::AsyncResource;
//!
//! async fn example() -> rds_sdk::Result<()> {
//!     let server = Server::new("https://covid19.richdataservices.com/rds")?;
//!     let product = server.get_catalog("covid19").get_data_product("us_jhu_ccse_country");
//!     product.resolve().await?;
//!     let total = product.count().await?.into_body();
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod data_product;
pub mod global;
pub mod http;
pub mod query;
pub mod server;

pub use catalog::Catalog;
pub use data_product::DataProduct;
pub use http::{HttpRequest, HttpResponse, Method, RawResponse, ReqwestTransport, Transport};
pub use server::{Server, ServerBuilder};
