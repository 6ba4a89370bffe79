// Dashboard ordering - a human-curated category/plant sequence, resolved
// against the store at read time. Display order comes entirely from the
// ordering document, never from storage enumeration order.

use crate::plant::Plant;
use crate::store::PlantStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The on-disk ordering document (`dashboard_order.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardOrder {
    #[serde(default)]
    pub categories: Vec<CategoryOrder>,
}

/// One category as authored in the ordering document: display metadata plus
/// plant IDs in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(default)]
    pub plants: Vec<String>,
}

/// A category with its plant IDs resolved to full documents, in the authored
/// order.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    pub plants: Vec<Plant>,
}

pub struct DashboardResolver {
    order_file: PathBuf,
}

impl DashboardResolver {
    pub fn new(order_file: impl Into<PathBuf>) -> Self {
        DashboardResolver {
            order_file: order_file.into(),
        }
    }

    pub fn order_file(&self) -> &Path {
        &self.order_file
    }

    /// Load the ordering document. A missing or unparsable file yields an
    /// empty order (logged), so the caller renders an empty dashboard
    /// instead of crashing.
    pub fn load_order(&self) -> DashboardOrder {
        let raw = match std::fs::read_to_string(&self.order_file) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!(
                    "Dashboard order file {} unreadable: {e}",
                    self.order_file.display()
                );
                return DashboardOrder::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(order) => order,
            Err(e) => {
                log::warn!(
                    "Dashboard order file {} unparsable: {e}",
                    self.order_file.display()
                );
                DashboardOrder::default()
            }
        }
    }

    /// Resolve every category's plant IDs against the store. An ID with no
    /// matching plant is dropped with a warning; the remaining plants keep
    /// the authored order.
    pub fn resolve(&self, store: &PlantStore) -> Result<Vec<ResolvedCategory>> {
        let by_id: HashMap<String, Plant> = store
            .list()?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let order = self.load_order();
        let mut resolved = Vec::with_capacity(order.categories.len());

        for category in order.categories {
            let mut plants = Vec::with_capacity(category.plants.len());
            for plant_id in &category.plants {
                match by_id.get(plant_id) {
                    Some(plant) => plants.push(plant.clone()),
                    None => {
                        log::warn!("Plant {plant_id} listed in dashboard order but not found")
                    }
                }
            }

            resolved.push(ResolvedCategory {
                parent_order: category.parent_order,
                parent: category.parent,
                name: category.name,
                emoji: category.emoji,
                anchor: category.anchor,
                plants,
            });
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn seed_plant(store: &PlantStore, id: &str, name: &str) {
        let plant: Plant =
            serde_json::from_value(serde_json::json!({ "id": id, "plant": name })).unwrap();
        store.save(id, &plant).unwrap();
    }

    #[test]
    fn test_resolve_keeps_authored_order_and_drops_unknown_ids() {
        let tmp = TempDir::new().unwrap();
        let store = PlantStore::new(tmp.path().join("plants"));
        seed_plant(&store, "tomato_001", "Tomato");
        seed_plant(&store, "basil_001", "Basil");

        let order_file = tmp.path().join("dashboard_order.json");
        std::fs::write(
            &order_file,
            serde_json::json!({
                "categories": [{
                    "name": "Vegetables",
                    "emoji": "🍅",
                    "anchor": "vegetables",
                    "plants": ["tomato_001", "ghost_001", "basil_001"]
                }]
            })
            .to_string(),
        )
        .unwrap();

        let resolver = DashboardResolver::new(&order_file);
        let categories = resolver.resolve(&store).unwrap();

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Vegetables");
        let ids: Vec<&str> = categories[0].plants.iter().map(|p| p.id.as_str()).collect();
        // ghost_001 dropped, authored order kept (not the store's sorted order)
        assert_eq!(ids, vec!["tomato_001", "basil_001"]);
    }

    #[test]
    fn test_missing_order_file_yields_empty_dashboard() {
        let tmp = TempDir::new().unwrap();
        let store = PlantStore::new(tmp.path().join("plants"));

        let resolver = DashboardResolver::new(tmp.path().join("dashboard_order.json"));
        assert!(resolver.resolve(&store).unwrap().is_empty());
    }

    #[test]
    fn test_unparsable_order_file_yields_empty_dashboard() {
        let tmp = TempDir::new().unwrap();
        let store = PlantStore::new(tmp.path().join("plants"));

        let order_file = tmp.path().join("dashboard_order.json");
        std::fs::write(&order_file, "{{ nope").unwrap();

        let resolver = DashboardResolver::new(&order_file);
        assert!(resolver.resolve(&store).unwrap().is_empty());
    }

    #[test]
    fn test_category_metadata_carried_through() {
        let tmp = TempDir::new().unwrap();
        let store = PlantStore::new(tmp.path().join("plants"));

        let order_file = tmp.path().join("dashboard_order.json");
        std::fs::write(
            &order_file,
            serde_json::json!({
                "categories": [
                    { "name": "Herbs", "parent": "Kitchen", "parent_order": 2, "plants": [] }
                ]
            })
            .to_string(),
        )
        .unwrap();

        let resolver = DashboardResolver::new(&order_file);
        let categories = resolver.resolve(&store).unwrap();
        assert_eq!(categories[0].parent.as_deref(), Some("Kitchen"));
        assert_eq!(categories[0].parent_order, Some(2));
        assert!(categories[0].plants.is_empty());
    }
}
