use crate::error::{GardenLogError, Result};
use crate::plant::{Plant, PlantStatus};
use crate::util::write_atomic;
use std::path::{Path, PathBuf};

/// Subdirectory of the plants directory holding retired plants. Moving a
/// document there is a manual filing operation, not a store API.
const INACTIVE_DIR: &str = "inactive";

/// Durable key-value access to plant documents, one JSON file per plant
/// named `{id}.json`. The active directory and its `inactive/` subdirectory
/// form one logical namespace for reads; writes always land in the active
/// directory. There is no cache; every call re-reads the filesystem.
pub struct PlantStore {
    plants_dir: PathBuf,
}

/// Per-file outcomes of a directory scan. A failure records the offending
/// path and error; the caller decides whether to log-and-continue (as
/// `list` does) or surface it.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub plants: Vec<Plant>,
    pub failures: Vec<ScanFailure>,
}

#[derive(Debug)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: GardenLogError,
}

impl PlantStore {
    pub fn new(plants_dir: impl Into<PathBuf>) -> Self {
        PlantStore {
            plants_dir: plants_dir.into(),
        }
    }

    pub fn plants_dir(&self) -> &Path {
        &self.plants_dir
    }

    fn inactive_dir(&self) -> PathBuf {
        self.plants_dir.join(INACTIVE_DIR)
    }

    /// Get a plant by ID, checking the active directory first and falling
    /// back to `inactive/`.
    pub fn get(&self, plant_id: &str) -> Result<Plant> {
        let file_name = format!("{plant_id}.json");

        let primary = self.plants_dir.join(&file_name);
        if primary.exists() {
            return read_plant(&primary);
        }

        let inactive = self.inactive_dir().join(&file_name);
        if inactive.exists() {
            return read_plant(&inactive);
        }

        Err(GardenLogError::not_found("plant", plant_id))
    }

    /// Read every document from both directories, recording each file as
    /// either a parsed plant or a failure. A malformed document never aborts
    /// the scan.
    pub fn scan(&self) -> Result<ScanReport> {
        let mut report = ScanReport::default();

        for dir in [self.plants_dir.clone(), self.inactive_dir()] {
            if !dir.exists() {
                continue;
            }

            let pattern = format!("{}/*.json", dir.display());
            let paths = glob::glob(&pattern)
                .map_err(|e| GardenLogError::Other(format!("Glob error: {e}")))?;

            for path in paths.filter_map(|r| r.ok()) {
                match read_plant(&path) {
                    Ok(plant) => report.plants.push(plant),
                    Err(error) => report.failures.push(ScanFailure { path, error }),
                }
            }
        }

        Ok(report)
    }

    /// All readable plants from both directories, sorted by display name.
    /// Failed documents are logged and skipped; ties keep enumeration order
    /// (the sort is stable).
    pub fn list(&self) -> Result<Vec<Plant>> {
        let report = self.scan()?;

        for failure in &report.failures {
            log::warn!(
                "Skipping plant document {}: {}",
                failure.path.display(),
                failure.error
            );
        }

        let mut plants = report.plants;
        plants.sort_by(|a, b| a.display_name().cmp(b.display_name()));
        Ok(plants)
    }

    /// Plants whose `status` is `Active`.
    pub fn list_active(&self) -> Result<Vec<Plant>> {
        Ok(self.list()?.into_iter().filter(Plant::is_active).collect())
    }

    /// Plants whose `status` is `Inactive`.
    pub fn list_inactive(&self) -> Result<Vec<Plant>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|p| p.status == Some(PlantStatus::Inactive))
            .collect())
    }

    /// Serialize and overwrite the whole document in the active directory,
    /// creating the directory if absent. Last writer wins; there is no
    /// locking.
    pub fn save(&self, plant_id: &str, plant: &Plant) -> Result<()> {
        std::fs::create_dir_all(&self.plants_dir).map_err(|source| {
            GardenLogError::Persistence {
                path: self.plants_dir.clone(),
                source,
            }
        })?;

        let path = self.plants_dir.join(format!("{plant_id}.json"));
        let json = serde_json::to_string_pretty(plant)?;
        write_atomic(&path, json.as_bytes())
    }
}

fn read_plant(path: &Path) -> Result<Plant> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| GardenLogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
