//! Store contracts for the three external collaborators.
//!
//! The planner only ever talks to these traits; the REST
//! implementations live in `ramp-client` and the in-memory doubles in
//! [`crate::memory`].

use async_trait::async_trait;
use ramp_types::{
    CapacityPlan, Epic, EpicId, PlanningPeriod, ProductId, Rating, RoadmapDocument, RoadmapItem,
};
use std::collections::HashSet;

use crate::error::StoreResult;

/// Read access to a product's backlog of candidate epics.
#[async_trait]
pub trait BacklogStore: Send + Sync {
    /// Every epic of the product, in backend order.
    async fn backlog_epics(&self, product: ProductId) -> StoreResult<Vec<Epic>>;
}

/// Persistence of quarterly roadmap documents.
#[async_trait]
pub trait RoadmapStore: Send + Sync {
    /// The document for one quarter, or `None` when nothing has been
    /// saved yet. A missing document is an empty state, not an error.
    async fn fetch_roadmap(
        &self,
        product: ProductId,
        period: PlanningPeriod,
    ) -> StoreResult<Option<RoadmapDocument>>;

    /// Full-replace write of one quarter's item list. Returns the
    /// canonical stored document; fails with `Conflict` when any
    /// submitted epic is already assigned to a different quarter of
    /// the product.
    async fn save_roadmap(
        &self,
        product: ProductId,
        period: PlanningPeriod,
        items: Vec<RoadmapItem>,
    ) -> StoreResult<RoadmapDocument>;

    /// Ids of every epic committed to any quarter other than `exclude`.
    async fn assigned_epic_ids(
        &self,
        product: ProductId,
        exclude: PlanningPeriod,
    ) -> StoreResult<HashSet<EpicId>>;
}

/// Capacity plans and the narrow effort-rating write path.
#[async_trait]
pub trait CapacityStore: Send + Sync {
    /// The capacity plan for one quarter, or `None` when none exists.
    async fn capacity_plan(
        &self,
        product: ProductId,
        period: PlanningPeriod,
    ) -> StoreResult<Option<CapacityPlan>>;

    /// Sets one epic's effort rating on the quarter's roadmap, bypassing
    /// the bulk item-list write. Fails with `NotFound` when the epic is
    /// not assigned to that quarter. Returns the stored value.
    async fn update_effort_rating(
        &self,
        product: ProductId,
        period: PlanningPeriod,
        epic: &EpicId,
        rating: Rating,
    ) -> StoreResult<Rating>;
}
