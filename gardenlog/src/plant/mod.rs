// Plant documents - typed known fields plus opaque extras preserved on round-trip

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle status of a plant. Inactive plants live under the `inactive/`
/// subdirectory but remain part of the store's namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlantStatus {
    Active,
    Inactive,
}

/// One plant's JSON document. The `id` is the primary key and matches the
/// file name (`{id}.json`); every other scalar is freely mutable. Fields this
/// model doesn't know about are kept in `extra` and written back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PlantStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub garden_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_sun_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_shade_start: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub journal: Vec<JournalEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Plant {
    /// Display name used for sorting; plants without one sort first.
    pub fn display_name(&self) -> &str {
        self.plant.as_deref().unwrap_or("")
    }

    pub fn is_active(&self) -> bool {
        self.status == Some(PlantStatus::Active)
    }
}

/// One dated/timed observation inside a plant's journal. `date` is
/// `M/D/YYYY`, `time` is `h:mm AM/PM`; everything else (observations,
/// photos, ...) rides along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub date: String,
    pub time: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unknown_fields_round_trip() {
        let raw = serde_json::json!({
            "id": "basil_001",
            "plant": "Basil",
            "status": "Active",
            "watering_notes": "every other day",
            "journal": [
                { "date": "11/1/2025", "time": "7:45 AM", "observations": "sprouted" }
            ]
        });

        let plant: Plant = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(plant.extra["watering_notes"], "every other day");
        assert_eq!(plant.journal[0].extra["observations"], "sprouted");

        let back = serde_json::to_value(&plant).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let plant: Plant = serde_json::from_value(serde_json::json!({
            "id": "mum_002"
        }))
        .unwrap();
        assert_eq!(plant.display_name(), "");
        assert!(!plant.is_active());

        let back = serde_json::to_value(&plant).unwrap();
        assert_eq!(back, serde_json::json!({ "id": "mum_002" }));
    }
}
