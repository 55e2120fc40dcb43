//! Server response shapes

use super::merge_option;
use serde::{Deserialize, Serialize};

/// Response of `GET {api}/api/server/info`
///
/// Every field is optional so a partial response only overwrites what it
/// carries when merged into a [`Server`](crate::rds::server::Server).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerInformation {
    /// RDS API server name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Date the version was released
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
}

impl ServerInformation {
    /// Overwrite every field `update` carries
    pub fn merge(&mut self, update: ServerInformation) {
        merge_option(&mut self.name, update.name);
        merge_option(&mut self.version, update.version);
        merge_option(&mut self.released, update.released);
    }
}

/// One entry of `GET {api}/api/server/changelog`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RdsVersion {
    pub version: String,
    /// Date the version was released
    #[serde(default)]
    pub released: String,
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub changed: Vec<String>,
    #[serde(default)]
    pub deprecated: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
    #[serde(default)]
    pub fixed: Vec<String>,
    #[serde(default)]
    pub security: Vec<String>,
}
