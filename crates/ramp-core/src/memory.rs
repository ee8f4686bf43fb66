//! In-memory store implementations for development and testing.
//!
//! `InMemoryRoadmaps` re-implements the backend's cross-quarter
//! uniqueness check, including the exact conflict message shape, so the
//! conflict paths are exercisable without a server.

use async_trait::async_trait;
use chrono::Utc;
use ramp_types::{
    CapacityPlan, Epic, EpicId, PlanningPeriod, ProductId, Rating, RoadmapDocument, RoadmapItem,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::{BacklogStore, CapacityStore, RoadmapStore};

/// Backlog store backed by a per-product epic list.
#[derive(Clone, Default)]
pub struct InMemoryBacklog {
    epics: Arc<RwLock<HashMap<ProductId, Vec<Epic>>>>,
}

impl InMemoryBacklog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the product's backlog.
    pub async fn put_epics(&self, product: ProductId, epics: Vec<Epic>) {
        self.epics.write().await.insert(product, epics);
    }
}

#[async_trait]
impl BacklogStore for InMemoryBacklog {
    async fn backlog_epics(&self, product: ProductId) -> StoreResult<Vec<Epic>> {
        let epics = self.epics.read().await;
        Ok(epics.get(&product).cloned().unwrap_or_default())
    }
}

/// Roadmap store holding one document per (product, period).
#[derive(Clone)]
pub struct InMemoryRoadmaps {
    documents: Arc<RwLock<HashMap<(ProductId, PlanningPeriod), RoadmapDocument>>>,
    next_id: Arc<AtomicI64>,
}

impl Default for InMemoryRoadmaps {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoadmaps {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Inserts a document as-is, bypassing the conflict check. Test
    /// seeding only.
    pub async fn put_document(&self, document: RoadmapDocument) {
        let key = (document.product_id, document.period());
        self.documents.write().await.insert(key, document);
    }

    fn mint_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// The narrow effort-rating write the capacity store delegates to.
    async fn set_effort_rating(
        &self,
        product: ProductId,
        period: PlanningPeriod,
        epic: &EpicId,
        rating: Rating,
    ) -> StoreResult<Rating> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(&(product, period))
            .ok_or_else(|| StoreError::NotFound(format!("no roadmap document for {period}")))?;
        let item = document
            .item_mut(epic)
            .ok_or_else(|| StoreError::NotFound(format!("epic {epic} is not assigned to {period}")))?;
        item.effort_rating = rating;
        document.updated_at = Some(Utc::now());
        Ok(rating)
    }
}

#[async_trait]
impl RoadmapStore for InMemoryRoadmaps {
    async fn fetch_roadmap(
        &self,
        product: ProductId,
        period: PlanningPeriod,
    ) -> StoreResult<Option<RoadmapDocument>> {
        let documents = self.documents.read().await;
        Ok(documents.get(&(product, period)).cloned())
    }

    async fn save_roadmap(
        &self,
        product: ProductId,
        period: PlanningPeriod,
        items: Vec<RoadmapItem>,
    ) -> StoreResult<RoadmapDocument> {
        let mut documents = self.documents.write().await;

        // The backend rejects the whole write when any submitted epic is
        // already assigned to a different quarter of the product. Entries
        // keep submission order; the uniqueness invariant guarantees at
        // most one prior assignment per epic.
        let mut conflicts = Vec::new();
        for item in &items {
            for ((owner, other_period), document) in documents.iter() {
                if *owner != product || *other_period == period {
                    continue;
                }
                if let Some(existing) = document.item(&item.epic_id) {
                    conflicts.push(format!("{} ({})", existing.epic_name, other_period));
                }
            }
        }
        if !conflicts.is_empty() {
            return Err(StoreError::Conflict(format!(
                "The following epics are already assigned to other quarters: {}",
                conflicts.join(", ")
            )));
        }

        let now = Utc::now();
        let existing = documents.get(&(product, period));
        let id = existing.and_then(|d| d.id).unwrap_or_else(|| self.mint_id());
        let created_at = existing.and_then(|d| d.created_at).or(Some(now));
        let document = RoadmapDocument {
            id: Some(id),
            product_id: product,
            year: period.year,
            quarter: period.quarter,
            roadmap_items: items,
            created_at,
            updated_at: Some(now),
        };
        documents.insert((product, period), document.clone());
        Ok(document)
    }

    async fn assigned_epic_ids(
        &self,
        product: ProductId,
        exclude: PlanningPeriod,
    ) -> StoreResult<HashSet<EpicId>> {
        let documents = self.documents.read().await;
        let mut assigned = HashSet::new();
        for ((owner, period), document) in documents.iter() {
            if *owner != product || *period == exclude {
                continue;
            }
            assigned.extend(document.epic_ids().cloned());
        }
        Ok(assigned)
    }
}

/// Capacity store holding one plan per (product, period). Effort-rating
/// writes go through the roadmap store, as they do on the backend.
#[derive(Clone)]
pub struct InMemoryCapacity {
    plans: Arc<RwLock<HashMap<(ProductId, PlanningPeriod), CapacityPlan>>>,
    roadmaps: InMemoryRoadmaps,
}

impl InMemoryCapacity {
    pub fn new(roadmaps: InMemoryRoadmaps) -> Self {
        Self {
            plans: Arc::new(RwLock::new(HashMap::new())),
            roadmaps,
        }
    }

    /// Replaces the quarter's capacity plan.
    pub async fn put_plan(&self, plan: CapacityPlan) {
        let key = (plan.product_id, plan.period());
        self.plans.write().await.insert(key, plan);
    }
}

#[async_trait]
impl CapacityStore for InMemoryCapacity {
    async fn capacity_plan(
        &self,
        product: ProductId,
        period: PlanningPeriod,
    ) -> StoreResult<Option<CapacityPlan>> {
        let plans = self.plans.read().await;
        Ok(plans.get(&(product, period)).cloned())
    }

    async fn update_effort_rating(
        &self,
        product: ProductId,
        period: PlanningPeriod,
        epic: &EpicId,
        rating: Rating,
    ) -> StoreResult<Rating> {
        self.roadmaps
            .set_effort_rating(product, period, epic, rating)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ramp_types::Quarter;

    fn q1() -> PlanningPeriod {
        PlanningPeriod::new(2025, Quarter::Q1)
    }

    fn q2() -> PlanningPeriod {
        PlanningPeriod::new(2025, Quarter::Q2)
    }

    fn item(id: &str, name: &str, period: PlanningPeriod) -> RoadmapItem {
        RoadmapItem::new(&Epic::new(id, name), period)
    }

    #[tokio::test]
    async fn test_fetch_missing_document_is_none() {
        let store = InMemoryRoadmaps::new();
        let fetched = store.fetch_roadmap(ProductId(1), q1()).await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_save_mints_identity_and_round_trips() {
        let store = InMemoryRoadmaps::new();
        let saved = store
            .save_roadmap(ProductId(1), q1(), vec![item("E1", "Checkout", q1())])
            .await
            .unwrap();
        assert_eq!(saved.id, Some(1));
        assert!(saved.created_at.is_some());

        let fetched = store.fetch_roadmap(ProductId(1), q1()).await.unwrap();
        assert_eq!(fetched, Some(saved));
    }

    #[tokio::test]
    async fn test_resave_is_idempotent() {
        let store = InMemoryRoadmaps::new();
        let items = vec![item("E1", "Checkout", q1())];
        let first = store
            .save_roadmap(ProductId(1), q1(), items.clone())
            .await
            .unwrap();
        let second = store.save_roadmap(ProductId(1), q1(), items).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(first.roadmap_items, second.roadmap_items);
    }

    #[tokio::test]
    async fn test_cross_quarter_conflict_message() {
        let store = InMemoryRoadmaps::new();
        store
            .save_roadmap(ProductId(1), q1(), vec![item("E1", "Checkout", q1())])
            .await
            .unwrap();

        let err = store
            .save_roadmap(ProductId(1), q2(), vec![item("E1", "Checkout", q2())])
            .await
            .unwrap_err();
        match err {
            StoreError::Conflict(message) => assert_eq!(
                message,
                "The following epics are already assigned to other quarters: Checkout (Q1 2025)"
            ),
            other => panic!("expected conflict, got {other:?}"),
        }

        // The rejected write left the target quarter untouched.
        assert!(store.fetch_roadmap(ProductId(1), q2()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_same_quarter_resave_is_not_a_conflict() {
        let store = InMemoryRoadmaps::new();
        store
            .save_roadmap(ProductId(1), q1(), vec![item("E1", "Checkout", q1())])
            .await
            .unwrap();
        let resaved = store
            .save_roadmap(ProductId(1), q1(), vec![item("E1", "Checkout", q1())])
            .await;
        assert!(resaved.is_ok());
    }

    #[tokio::test]
    async fn test_conflicts_do_not_cross_products() {
        let store = InMemoryRoadmaps::new();
        store
            .save_roadmap(ProductId(1), q1(), vec![item("E1", "Checkout", q1())])
            .await
            .unwrap();
        let other_product = store
            .save_roadmap(ProductId(2), q2(), vec![item("E1", "Checkout", q2())])
            .await;
        assert!(other_product.is_ok());
    }

    #[tokio::test]
    async fn test_assigned_epic_ids_excludes_own_quarter() {
        let store = InMemoryRoadmaps::new();
        store
            .save_roadmap(ProductId(1), q1(), vec![item("E1", "Checkout", q1())])
            .await
            .unwrap();
        store
            .save_roadmap(ProductId(1), q2(), vec![item("E2", "Search", q2())])
            .await
            .unwrap();

        let assigned = store.assigned_epic_ids(ProductId(1), q2()).await.unwrap();
        assert!(assigned.contains(&EpicId::from("E1")));
        assert!(!assigned.contains(&EpicId::from("E2")));
    }

    #[tokio::test]
    async fn test_effort_rating_updates_the_document() {
        let roadmaps = InMemoryRoadmaps::new();
        roadmaps
            .save_roadmap(ProductId(1), q1(), vec![item("E1", "Checkout", q1())])
            .await
            .unwrap();
        let capacity = InMemoryCapacity::new(roadmaps.clone());

        let stored = capacity
            .update_effort_rating(ProductId(1), q1(), &EpicId::from("E1"), Rating::new(4).unwrap())
            .await
            .unwrap();
        assert_eq!(stored.value(), 4);

        let document = roadmaps.fetch_roadmap(ProductId(1), q1()).await.unwrap().unwrap();
        assert_eq!(
            document.item(&EpicId::from("E1")).unwrap().effort_rating.value(),
            4
        );
    }

    #[tokio::test]
    async fn test_effort_rating_requires_assignment() {
        let roadmaps = InMemoryRoadmaps::new();
        let capacity = InMemoryCapacity::new(roadmaps.clone());

        let missing_document = capacity
            .update_effort_rating(ProductId(1), q1(), &EpicId::from("E1"), Rating::MAX)
            .await
            .unwrap_err();
        assert!(missing_document.is_not_found());

        roadmaps
            .save_roadmap(ProductId(1), q1(), vec![item("E1", "Checkout", q1())])
            .await
            .unwrap();
        let missing_epic = capacity
            .update_effort_rating(ProductId(1), q1(), &EpicId::from("E9"), Rating::MAX)
            .await
            .unwrap_err();
        assert!(missing_epic.is_not_found());
    }

    #[tokio::test]
    async fn test_backlog_and_capacity_seeding() {
        let backlog = InMemoryBacklog::new();
        backlog
            .put_epics(ProductId(1), vec![Epic::new("E1", "Checkout")])
            .await;
        let epics = backlog.backlog_epics(ProductId(1)).await.unwrap();
        assert_eq!(epics.len(), 1);
        assert!(backlog.backlog_epics(ProductId(9)).await.unwrap().is_empty());

        let capacity = InMemoryCapacity::new(InMemoryRoadmaps::new());
        capacity
            .put_plan(CapacityPlan::empty(ProductId(1), q1()))
            .await;
        assert!(capacity.capacity_plan(ProductId(1), q1()).await.unwrap().is_some());
        assert!(capacity.capacity_plan(ProductId(1), q2()).await.unwrap().is_none());
    }
}
