//! Client for Rich Data Services (RDS) APIs
//!
//! An RDS API exposes a hierarchy of resources (server, catalog, data
//! product) and query operations (count, select, tabulate) on data products.
//!
//! - [`urls`] - URL parsing and query parameter serialization
//! - [`resource`] - the resolution lifecycle shared by every resource
//! - [`rds`] - the resource hierarchy and HTTP transport
//! - [`models`] - typed parameters and response shapes
//! - [`config`] - persisted configuration for the `rds` CLI

pub mod config;
pub mod error;
pub mod models;
pub mod rds;
pub mod resource;
pub mod urls;

pub use error::{RdsError, Result};
pub use rds::{Catalog, DataProduct, Server};
pub use resource::{AsyncResource, ResolutionPolicy};
