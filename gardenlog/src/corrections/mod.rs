// Correction catalog - reusable if/then snippets with usage counters.
// Data-independent from plants; shares the JSON-document persistence style.

use crate::error::{GardenLogError, Result};
use crate::util::write_atomic;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const SCHEMA_VERSION: u32 = 1;

/// Prefix used when a correction title slugs down to nothing.
const FALLBACK_PREFIX: &str = "CORRECTION";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub trigger_if: String,
    #[serde(default)]
    pub response_then: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub anti_patterns: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub count: u64,
}

/// Fields a catalog update may overwrite. `None` leaves the stored value
/// alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorrectionPatch {
    #[serde(default)]
    pub trigger_if: Option<String>,
    #[serde(default)]
    pub response_then: Option<String>,
    #[serde(default)]
    pub anti_patterns: Option<BTreeSet<String>>,
    #[serde(default)]
    pub tags: Option<BTreeSet<String>>,
}

/// Input for `create`. Without an explicit `id` the catalog assigns the next
/// `{PREFIX}-{NNN}` suffix for the title-derived prefix.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCorrection {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub trigger_if: String,
    #[serde(default)]
    pub response_then: String,
    #[serde(default)]
    pub anti_patterns: BTreeSet<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// The catalog file envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default = "default_schema_version")]
    schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    corrections: Vec<Correction>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for CatalogFile {
    fn default() -> Self {
        CatalogFile {
            schema_version: SCHEMA_VERSION,
            last_updated: None,
            corrections: Vec::new(),
        }
    }
}

pub struct CorrectionCatalog {
    catalog_file: PathBuf,
}

impl CorrectionCatalog {
    pub fn new(catalog_file: impl Into<PathBuf>) -> Self {
        CorrectionCatalog {
            catalog_file: catalog_file.into(),
        }
    }

    pub fn catalog_file(&self) -> &Path {
        &self.catalog_file
    }

    /// A missing file is an empty catalog; `create` bootstraps it on first
    /// write. A malformed file is a `Parse` error, never silently reset.
    fn load(&self) -> Result<CatalogFile> {
        if !self.catalog_file.exists() {
            return Ok(CatalogFile::default());
        }

        let raw = std::fs::read_to_string(&self.catalog_file)?;
        serde_json::from_str(&raw).map_err(|source| GardenLogError::Parse {
            path: self.catalog_file.clone(),
            source,
        })
    }

    /// Rewrite the whole catalog file, refreshing `last_updated`.
    fn persist(&self, catalog: &mut CatalogFile) -> Result<()> {
        catalog.last_updated = Some(Utc::now());

        if let Some(dir) = self.catalog_file.parent() {
            std::fs::create_dir_all(dir).map_err(|source| GardenLogError::Persistence {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(catalog)?;
        write_atomic(&self.catalog_file, json.as_bytes())
    }

    pub fn list(&self) -> Result<Vec<Correction>> {
        Ok(self.load()?.corrections)
    }

    pub fn get(&self, correction_id: &str) -> Result<Correction> {
        self.load()?
            .corrections
            .into_iter()
            .find(|c| c.id == correction_id)
            .ok_or_else(|| GardenLogError::not_found("correction", correction_id))
    }

    /// Bump a correction's usage counter. Returns `Ok(false)` without
    /// touching the file when the ID is unknown.
    pub fn increment(&self, correction_id: &str) -> Result<bool> {
        let mut catalog = self.load()?;

        let Some(correction) = catalog
            .corrections
            .iter_mut()
            .find(|c| c.id == correction_id)
        else {
            return Ok(false);
        };

        correction.count += 1;
        self.persist(&mut catalog)?;
        Ok(true)
    }

    /// Overwrite only the supplied fields of an existing correction.
    pub fn update(&self, correction_id: &str, patch: CorrectionPatch) -> Result<()> {
        let mut catalog = self.load()?;

        let correction = catalog
            .corrections
            .iter_mut()
            .find(|c| c.id == correction_id)
            .ok_or_else(|| GardenLogError::not_found("correction", correction_id))?;

        if let Some(trigger_if) = patch.trigger_if {
            correction.trigger_if = trigger_if;
        }
        if let Some(response_then) = patch.response_then {
            correction.response_then = response_then;
        }
        if let Some(anti_patterns) = patch.anti_patterns {
            correction.anti_patterns = anti_patterns;
        }
        if let Some(tags) = patch.tags {
            correction.tags = tags;
        }

        self.persist(&mut catalog)
    }

    /// Append a new correction and rewrite the file. Returns the assigned
    /// ID.
    pub fn create(&self, new: NewCorrection) -> Result<String> {
        let mut catalog = self.load()?;

        let id = match new.id {
            Some(id) => {
                if catalog.corrections.iter().any(|c| c.id == id) {
                    return Err(GardenLogError::Validation(format!(
                        "correction ID already exists: {id}"
                    )));
                }
                id
            }
            None => next_id(&new.title, &catalog.corrections),
        };

        catalog.corrections.push(Correction {
            id: id.clone(),
            title: new.title,
            category: new.category,
            sub_category: new.sub_category,
            trigger_if: new.trigger_if,
            response_then: new.response_then,
            anti_patterns: new.anti_patterns,
            tags: new.tags,
            count: 0,
        });

        self.persist(&mut catalog)?;
        Ok(id)
    }
}

/// Derive the ID prefix from the title (slugged, uppercased) and assign the
/// next numeric suffix among existing IDs with that prefix.
fn next_id(title: &str, existing: &[Correction]) -> String {
    let slugged = slug::slugify(title).to_uppercase();
    let prefix = if slugged.is_empty() {
        FALLBACK_PREFIX.to_string()
    } else {
        slugged
    };

    let pattern = Regex::new(&format!(r"^{}-(\d+)$", regex::escape(&prefix)))
        .expect("suffix pattern is valid");

    let next = existing
        .iter()
        .filter_map(|c| pattern.captures(&c.id))
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .max()
        .unwrap_or(0)
        + 1;

    format!("{prefix}-{next:03}")
}
