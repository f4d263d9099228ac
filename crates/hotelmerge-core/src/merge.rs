//! Per-hotel accumulation of provider documents.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::{SourceKind, Tree};

/// One hotel's documents, one slot per provider.
///
/// Slots are replaced wholesale; a later document never deep-merges into an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HotelRecord {
    pub giata: Option<Tree>,
    pub coah: Option<Tree>,
}

impl HotelRecord {
    pub fn slot(&self, kind: SourceKind) -> Option<&Tree> {
        match kind {
            SourceKind::Giata => self.giata.as_ref(),
            SourceKind::Coah => self.coah.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: SourceKind) -> &mut Option<Tree> {
        match kind {
            SourceKind::Giata => &mut self.giata,
            SourceKind::Coah => &mut self.coah,
        }
    }
}

/// Hotel id → record. Serializes as a JSON object ordered by hotel id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HotelIndex {
    hotels: BTreeMap<String, HotelRecord>,
}

impl HotelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the `kind` slot of `hotel_id` with `content`, creating the record if needed.
    ///
    /// Last write wins: a second document of the same kind for the same hotel
    /// overwrites the first without error.
    pub fn upsert(&mut self, hotel_id: &str, kind: SourceKind, content: Tree) {
        let record = self.hotels.entry(hotel_id.to_string()).or_default();
        let slot = record.slot_mut(kind);
        if slot.is_some() {
            debug!(hotel_id, source = %kind, "replacing earlier document");
        }
        *slot = Some(content);
    }

    pub fn get(&self, hotel_id: &str) -> Option<&HotelRecord> {
        self.hotels.get(hotel_id)
    }

    pub fn len(&self) -> usize {
        self.hotels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotels.is_empty()
    }

    pub fn hotel_ids(&self) -> impl Iterator<Item = &str> {
        self.hotels.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_upsert_creates_record_with_one_slot() {
        let mut index = HotelIndex::new();
        index.upsert("123", SourceKind::Giata, json!({"a": 1}));

        let record = index.get("123").unwrap();
        assert_eq!(record.giata, Some(json!({"a": 1})));
        assert_eq!(record.coah, None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn same_kind_replaces_rather_than_merges() {
        let mut index = HotelIndex::new();
        index.upsert("123", SourceKind::Giata, json!({"a": 1}));
        index.upsert("123", SourceKind::Giata, json!({"b": 2}));

        assert_eq!(
            index.get("123").unwrap().slot(SourceKind::Giata),
            Some(&json!({"b": 2}))
        );
    }

    #[test]
    fn other_slot_is_preserved() {
        let mut index = HotelIndex::new();
        index.upsert("123", SourceKind::Coah, json!({"c": 3}));
        index.upsert("123", SourceKind::Giata, json!({"a": 1}));
        index.upsert("123", SourceKind::Giata, json!({"b": 2}));

        let record = index.get("123").unwrap();
        assert_eq!(record.coah, Some(json!({"c": 3})));
        assert_eq!(record.giata, Some(json!({"b": 2})));
    }

    #[test]
    fn hotels_are_independent() {
        let mut index = HotelIndex::new();
        index.upsert("B", SourceKind::Giata, json!(1));
        index.upsert("A", SourceKind::Coah, json!(2));

        assert_eq!(index.hotel_ids().collect::<Vec<_>>(), vec!["A", "B"]);
        assert!(index.get("A").unwrap().giata.is_none());
        assert!(index.get("B").unwrap().coah.is_none());
    }

    #[test]
    fn serializes_as_object_keyed_by_hotel() {
        let mut index = HotelIndex::new();
        index.upsert("123", SourceKind::Giata, json!({"name": "Grand"}));

        let value = serde_json::to_value(&index).unwrap();
        assert_eq!(
            value,
            json!({"123": {"giata": {"name": "Grand"}, "coah": null}})
        );
    }

    #[test]
    fn empty_index_serializes_as_empty_object() {
        let index = HotelIndex::new();
        assert!(index.is_empty());
        assert_eq!(serde_json::to_string(&index).unwrap(), "{}");
    }
}
