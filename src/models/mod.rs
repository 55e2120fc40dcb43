//! Typed request and response shapes
//!
//! - [`parameters`] - select and tabulate query parameters
//! - [`server`] - server information and changelog entries
//! - [`catalog`] - catalog and data product details

pub mod catalog;
pub mod parameters;
pub mod server;

pub use catalog::{CatalogDetails, DataProductDetails};
pub use parameters::{CommonQueryParameters, Format, SelectParameters, TabulateParameters};
pub use server::{RdsVersion, ServerInformation};

/// Replace `target` when the update carries a value
pub(crate) fn merge_option<T>(target: &mut Option<T>, update: Option<T>) {
    if update.is_some() {
        *target = update;
    }
}
