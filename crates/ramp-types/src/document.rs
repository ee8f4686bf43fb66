//! The quarterly roadmap document, one per product and quarter.

use crate::ids::{EpicId, ProductId};
use crate::item::RoadmapItem;
use crate::quarter::{PlanningPeriod, Quarter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product's roadmap for one quarter.
///
/// `id` and the timestamps are minted by the backend; a document that
/// has never been saved carries `None` for all three. A backend miss is
/// represented by [`RoadmapDocument::empty`], so callers never deal
/// with "no document" as a separate case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub product_id: ProductId,
    pub year: i32,
    pub quarter: Quarter,
    #[serde(default)]
    pub roadmap_items: Vec<RoadmapItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RoadmapDocument {
    /// An unsaved document with no items.
    pub fn empty(product_id: ProductId, period: PlanningPeriod) -> Self {
        Self {
            id: None,
            product_id,
            year: period.year,
            quarter: period.quarter,
            roadmap_items: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn period(&self) -> PlanningPeriod {
        PlanningPeriod::new(self.year, self.quarter)
    }

    pub fn contains(&self, epic_id: &EpicId) -> bool {
        self.roadmap_items.iter().any(|item| &item.epic_id == epic_id)
    }

    pub fn item(&self, epic_id: &EpicId) -> Option<&RoadmapItem> {
        self.roadmap_items.iter().find(|item| &item.epic_id == epic_id)
    }

    /// Position of an epic's item in document order.
    pub fn position_of(&self, epic_id: &EpicId) -> Option<usize> {
        self.roadmap_items
            .iter()
            .position(|item| &item.epic_id == epic_id)
    }

    pub fn item_mut(&mut self, epic_id: &EpicId) -> Option<&mut RoadmapItem> {
        self.roadmap_items
            .iter_mut()
            .find(|item| &item.epic_id == epic_id)
    }

    /// Ids of every epic in the document, in item order.
    pub fn epic_ids(&self) -> impl Iterator<Item = &EpicId> {
        self.roadmap_items.iter().map(|item| &item.epic_id)
    }

    /// Re-derives every item's RICE score from its factors and returns
    /// how many stored scores were stale. Run on every document adopted
    /// from the wire, since serde fills the score field directly.
    pub fn normalize_scores(&mut self) -> usize {
        self.roadmap_items
            .iter_mut()
            .map(|item| item.recompute_rice())
            .filter(|&stale| stale)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epic::Epic;
    use crate::rating::Rating;

    fn period() -> PlanningPeriod {
        PlanningPeriod::new(2025, Quarter::Q2)
    }

    #[test]
    fn test_empty_document_has_no_identity() {
        let doc = RoadmapDocument::empty(ProductId(7), period());
        assert_eq!(doc.id, None);
        assert_eq!(doc.year, 2025);
        assert_eq!(doc.quarter, Quarter::Q2);
        assert!(doc.roadmap_items.is_empty());
        assert_eq!(doc.created_at, None);
    }

    #[test]
    fn test_item_lookup_and_mutation() {
        let epic = Epic::new("EPIC-1", "Self-serve signup");
        let mut doc = RoadmapDocument::empty(ProductId(7), period());
        doc.roadmap_items.push(RoadmapItem::new(&epic, period()));

        assert!(doc.contains(&EpicId::from("EPIC-1")));
        assert!(!doc.contains(&EpicId::from("EPIC-2")));

        let item = doc.item_mut(&EpicId::from("EPIC-1")).unwrap();
        item.set_reach(Rating::new(5).unwrap());
        assert_eq!(doc.item(&EpicId::from("EPIC-1")).unwrap().reach().value(), 5);
        assert_eq!(doc.position_of(&EpicId::from("EPIC-1")), Some(0));
        assert_eq!(doc.position_of(&EpicId::from("EPIC-2")), None);
    }

    #[test]
    fn test_normalize_scores_counts_stale_entries() {
        let json = r#"{
            "productId": 7,
            "year": 2025,
            "quarter": 2,
            "roadmapItems": [
                {
                    "epicId": "EPIC-1",
                    "epicName": "Self-serve signup",
                    "reach": 5,
                    "impact": 4,
                    "confidence": 3,
                    "riceScore": 60
                },
                {
                    "epicId": "EPIC-2",
                    "epicName": "Push notifications",
                    "reach": 2,
                    "impact": 2,
                    "confidence": 2,
                    "riceScore": 125
                }
            ]
        }"#;
        let mut doc: RoadmapDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.normalize_scores(), 1);
        assert_eq!(doc.item(&EpicId::from("EPIC-2")).unwrap().rice_score(), 8);
        // A second pass finds nothing left to fix.
        assert_eq!(doc.normalize_scores(), 0);
    }

    #[test]
    fn test_document_wire_shape() {
        let doc = RoadmapDocument::empty(ProductId(7), period());
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["productId"], 7);
        assert_eq!(value["quarter"], 2);
        assert!(value.get("id").is_none());
        assert!(value.get("roadmapItems").is_some());
    }
}
