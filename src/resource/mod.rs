//! Resource abstraction layer
//!
//! Every remote entity of an RDS API (server, catalog, data product) is a
//! resource: it derives its endpoint URLs from its parent and can be
//! resolved, i.e. fetched and merged into local state.
//!
//! # Architecture
//!
//! - [`resolution`] - the shared resolution lifecycle: [`ResolutionState`] and
//!   the [`AsyncResource`] trait every resource implements
//!
//! # Example
//!
//! ```ignore
//! use rds_sdk::resource::AsyncResource;
//! use rds_sdk::rds::Server;
//!
//! async fn describe(server: &Server) -> rds_sdk::Result<()> {
//!     let catalog = server.get_catalog("covid19");
//!     catalog.register_resolution_listener(|| tracing::info!("catalog ready"));
//!     catalog.resolve().await?;
//!     println!("{:?}", catalog.details());
//!     Ok(())
//! }
//! ```

pub mod resolution;

pub use resolution::{
    spawn_resolution, AsyncResource, ResolutionListener, ResolutionPolicy, ResolutionState,
};

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Read resolved data, ignoring poisoning from a panicked listener
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
