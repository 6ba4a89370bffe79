// Journal merging - the one real ordering/merge policy in the core.
// Entries are keyed by their exact (date, time) string pair; the journal is
// kept sorted newest-first by parsed timestamp.

use crate::error::{GardenLogError, Result};
use crate::plant::{JournalEntry, Plant};
use crate::store::PlantStore;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which merge mode an update request selects. The caller states the mode
/// explicitly; nothing is inferred from the fragment's keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateAction {
    JournalEntry,
    PlantMainData,
}

/// Datetime format of a journal entry: `M/D/YYYY h:mm AM/PM`.
const ENTRY_FORMAT: &str = "%m/%d/%Y %I:%M %p";

fn entry_timestamp(entry: &JournalEntry) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&format!("{} {}", entry.date, entry.time), ENTRY_FORMAT).ok()
}

/// Sort newest-first. Entries whose date/time don't parse compare as a
/// minimum sentinel and land at the oldest end; the sort is stable so they
/// keep their relative order.
fn sort_journal(journal: &mut [JournalEntry]) {
    journal.sort_by(|a, b| entry_timestamp(b).cmp(&entry_timestamp(a)));
}

/// Insert or replace one journal entry on the plant. A fragment matching an
/// existing `(date, time)` pair replaces that entry wholesale; otherwise the
/// entry is appended. The journal is re-sorted afterwards.
pub fn merge_entry(plant: &mut Plant, fragment: Value) -> Result<()> {
    let obj = fragment
        .as_object()
        .ok_or_else(|| GardenLogError::Validation("journal entry must be a JSON object".into()))?;

    let date = obj
        .get("date")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            GardenLogError::Validation("journal entry requires a string 'date' field".into())
        })?
        .to_string();
    let time = obj
        .get("time")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            GardenLogError::Validation("journal entry requires a string 'time' field".into())
        })?
        .to_string();

    let entry: JournalEntry = serde_json::from_value(fragment)?;

    match plant
        .journal
        .iter()
        .position(|e| e.date == date && e.time == time)
    {
        Some(i) => plant.journal[i] = entry,
        None => plant.journal.push(entry),
    }

    sort_journal(&mut plant.journal);
    Ok(())
}

/// Overwrite top-level plant fields from the fragment. Every key except
/// `journal` is written onto the document; `journal` is excluded even when
/// the fragment carries one. Keys absent from the fragment are untouched.
pub fn merge_main_data(plant: &mut Plant, fragment: Value) -> Result<()> {
    let patch = match fragment {
        Value::Object(map) => map,
        _ => {
            return Err(GardenLogError::Validation(
                "plant main data must be a JSON object".into(),
            ))
        }
    };

    let mut doc = serde_json::to_value(&*plant)?;
    let obj = doc
        .as_object_mut()
        .ok_or_else(|| GardenLogError::Other("plant did not serialize to an object".into()))?;

    for (key, value) in patch {
        if key == "journal" {
            continue;
        }
        obj.insert(key, value);
    }

    *plant = serde_json::from_value(doc).map_err(|e| {
        GardenLogError::Validation(format!("plant document invalid after update: {e}"))
    })?;
    Ok(())
}

/// Load a plant, apply one update fragment in the selected mode, and persist
/// it. A save failure propagates as `Persistence`; the merged in-memory
/// state is simply dropped (the caller owns retry or discard).
pub fn apply_update(
    store: &PlantStore,
    plant_id: &str,
    action: UpdateAction,
    fragment: Value,
) -> Result<Plant> {
    let mut plant = store.get(plant_id)?;

    match action {
        UpdateAction::JournalEntry => merge_entry(&mut plant, fragment)?,
        UpdateAction::PlantMainData => merge_main_data(&mut plant, fragment)?,
    }

    store.save(plant_id, &plant)?;
    Ok(plant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn basil() -> Plant {
        serde_json::from_value(serde_json::json!({
            "id": "basil_001",
            "plant": "Basil",
            "status": "Active",
            "journal": [
                { "date": "11/1/2025", "time": "7:45 AM", "observations": "sprouted" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_matching_pair_replaces_in_place() {
        let mut plant = basil();
        merge_entry(
            &mut plant,
            serde_json::json!({
                "date": "11/1/2025",
                "time": "7:45 AM",
                "observations": "leafed out"
            }),
        )
        .unwrap();

        assert_eq!(plant.journal.len(), 1);
        assert_eq!(plant.journal[0].extra["observations"], "leafed out");
    }

    #[test]
    fn test_new_pair_appends_and_sorts_descending() {
        let mut plant = basil();
        merge_entry(
            &mut plant,
            serde_json::json!({
                "date": "11/2/2025",
                "time": "8:00 AM",
                "observations": "watered"
            }),
        )
        .unwrap();

        assert_eq!(plant.journal.len(), 2);
        assert_eq!(plant.journal[0].date, "11/2/2025");
        assert_eq!(plant.journal[1].date, "11/1/2025");
    }

    #[test]
    fn test_replacement_is_wholesale() {
        let mut plant: Plant = serde_json::from_value(serde_json::json!({
            "id": "basil_001",
            "journal": [
                {
                    "date": "11/1/2025",
                    "time": "7:45 AM",
                    "observations": "sprouted",
                    "photos": ["basil_001_20251101_0745_01.jpg"]
                }
            ]
        }))
        .unwrap();

        merge_entry(
            &mut plant,
            serde_json::json!({
                "date": "11/1/2025",
                "time": "7:45 AM",
                "observations": "leafed out"
            }),
        )
        .unwrap();

        // No field-level merge: the old photos list is gone.
        assert_eq!(plant.journal.len(), 1);
        assert!(!plant.journal[0].extra.contains_key("photos"));
    }

    #[test]
    fn test_unparsable_dates_sort_oldest() {
        let mut plant: Plant = serde_json::from_value(serde_json::json!({
            "id": "basil_001",
            "journal": [
                { "date": "someday", "time": "morning", "observations": "???" },
                { "date": "11/1/2025", "time": "7:45 AM", "observations": "sprouted" }
            ]
        }))
        .unwrap();

        merge_entry(
            &mut plant,
            serde_json::json!({ "date": "11/2/2025", "time": "8:00 AM" }),
        )
        .unwrap();

        let dates: Vec<&str> = plant.journal.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["11/2/2025", "11/1/2025", "someday"]);
    }

    #[test]
    fn test_single_digit_and_padded_fields_parse_alike() {
        let mut plant = basil();
        merge_entry(
            &mut plant,
            serde_json::json!({ "date": "11/02/2025", "time": "12:15 PM" }),
        )
        .unwrap();
        merge_entry(
            &mut plant,
            serde_json::json!({ "date": "11/3/2025", "time": "9:05 AM" }),
        )
        .unwrap();

        let dates: Vec<&str> = plant.journal.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["11/3/2025", "11/02/2025", "11/1/2025"]);
    }

    #[test]
    fn test_missing_date_or_time_is_validation_error() {
        let mut plant = basil();

        let err = merge_entry(&mut plant, serde_json::json!({ "time": "7:45 AM" })).unwrap_err();
        assert!(matches!(err, GardenLogError::Validation(_)));

        let err = merge_entry(&mut plant, serde_json::json!({ "date": "11/1/2025" })).unwrap_err();
        assert!(matches!(err, GardenLogError::Validation(_)));

        // Non-string date counts as missing.
        let err = merge_entry(
            &mut plant,
            serde_json::json!({ "date": 20251101, "time": "7:45 AM" }),
        )
        .unwrap_err();
        assert!(matches!(err, GardenLogError::Validation(_)));

        assert_eq!(plant.journal.len(), 1);
    }

    #[test]
    fn test_main_data_overwrites_fields_but_never_journal() {
        let mut plant = basil();
        merge_main_data(
            &mut plant,
            serde_json::json!({
                "current_stage": "flowering",
                "garden_location": "Panel 3",
                "pot_size": "10in",
                "journal": []
            }),
        )
        .unwrap();

        assert_eq!(plant.current_stage.as_deref(), Some("flowering"));
        assert_eq!(plant.garden_location.as_deref(), Some("Panel 3"));
        assert_eq!(plant.extra["pot_size"], "10in");
        // journal excluded even though the fragment tried to clear it
        assert_eq!(plant.journal.len(), 1);
        // untouched fields stay put
        assert_eq!(plant.plant.as_deref(), Some("Basil"));
    }

    #[test]
    fn test_apply_update_persists_through_store() {
        let tmp = TempDir::new().unwrap();
        let store = PlantStore::new(tmp.path().join("plants"));
        store.save("basil_001", &basil()).unwrap();

        let merged = apply_update(
            &store,
            "basil_001",
            UpdateAction::JournalEntry,
            serde_json::json!({
                "date": "11/2/2025",
                "time": "8:00 AM",
                "observations": "watered"
            }),
        )
        .unwrap();
        assert_eq!(merged.journal.len(), 2);

        let reloaded = store.get("basil_001").unwrap();
        assert_eq!(reloaded, merged);
    }

    #[test]
    fn test_apply_update_unknown_plant() {
        let tmp = TempDir::new().unwrap();
        let store = PlantStore::new(tmp.path().join("plants"));

        let err = apply_update(
            &store,
            "ghost_001",
            UpdateAction::PlantMainData,
            serde_json::json!({ "current_state": "thriving" }),
        )
        .unwrap_err();
        assert!(matches!(err, GardenLogError::NotFound { .. }));
    }
}
