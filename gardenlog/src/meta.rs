// Garden display metadata (meta.json). Read-only; a missing or broken file
// is an empty metadata map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub garden_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct MetaFile {
    #[serde(default)]
    metadata: Metadata,
}

/// Load metadata from `meta.json`. Any failure is logged and yields the
/// default, mirroring the dashboard's render-something-over-crash policy.
pub fn load(path: &Path) -> Metadata {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("Meta file {} unreadable: {e}", path.display());
            return Metadata::default();
        }
    };

    match serde_json::from_str::<MetaFile>(&raw) {
        Ok(file) => file.metadata,
        Err(e) => {
            log::warn!("Meta file {} unparsable: {e}", path.display());
            Metadata::default()
        }
    }
}
