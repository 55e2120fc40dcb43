//! Process-wide server
//!
//! Single-process tools (the `rds` CLI) configure one server at startup and
//! reach it from anywhere. It is initialized exactly once and read-only
//! afterwards. Library code that can thread a [`Server`] through should do so
//! instead.

use super::server::Server;
use crate::error::{RdsError, Result};
use std::sync::OnceLock;

static INSTANCE: OnceLock<Server> = OnceLock::new();

/// Install the process-wide server
///
/// Fails with [`RdsError::DoubleInitialization`] on every call after the first.
pub fn init(server: Server) -> Result<&'static Server> {
    INSTANCE
        .set(server)
        .map_err(|_| RdsError::DoubleInitialization)?;
    instance()
}

/// The process-wide server
///
/// Fails with [`RdsError::UninitializedSingleton`] before [`init`].
pub fn instance() -> Result<&'static Server> {
    INSTANCE.get().ok_or(RdsError::UninitializedSingleton)
}

pub fn is_initialized() -> bool {
    INSTANCE.get().is_some()
}
