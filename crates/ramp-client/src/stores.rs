//! Store trait implementations backed by [`RestClient`].

use crate::client::RestClient;
use async_trait::async_trait;
use ramp_core::error::StoreResult;
use ramp_core::store::{BacklogStore, CapacityStore, RoadmapStore};
use ramp_types::{
    CapacityPlan, Epic, EpicId, PlanningPeriod, ProductId, Rating, RoadmapDocument, RoadmapItem,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Backlog reads over HTTP.
#[derive(Clone)]
pub struct RestBacklogStore {
    client: Arc<RestClient>,
}

impl RestBacklogStore {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BacklogStore for RestBacklogStore {
    async fn backlog_epics(&self, product: ProductId) -> StoreResult<Vec<Epic>> {
        self.client.backlog_epics(product).await
    }
}

/// Roadmap reads and writes over HTTP.
#[derive(Clone)]
pub struct RestRoadmapStore {
    client: Arc<RestClient>,
}

impl RestRoadmapStore {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RoadmapStore for RestRoadmapStore {
    async fn fetch_roadmap(
        &self,
        product: ProductId,
        period: PlanningPeriod,
    ) -> StoreResult<Option<RoadmapDocument>> {
        self.client.roadmap(product, period).await
    }

    async fn save_roadmap(
        &self,
        product: ProductId,
        period: PlanningPeriod,
        items: Vec<RoadmapItem>,
    ) -> StoreResult<RoadmapDocument> {
        self.client.save_roadmap(product, period, items).await
    }

    async fn assigned_epic_ids(
        &self,
        product: ProductId,
        exclude: PlanningPeriod,
    ) -> StoreResult<HashSet<EpicId>> {
        self.client.assigned_epic_ids(product, exclude).await
    }
}

/// Capacity reads and the effort-rating write over HTTP.
#[derive(Clone)]
pub struct RestCapacityStore {
    client: Arc<RestClient>,
}

impl RestCapacityStore {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CapacityStore for RestCapacityStore {
    async fn capacity_plan(
        &self,
        product: ProductId,
        period: PlanningPeriod,
    ) -> StoreResult<Option<CapacityPlan>> {
        self.client.capacity_plan(product, period).await
    }

    async fn update_effort_rating(
        &self,
        product: ProductId,
        period: PlanningPeriod,
        epic: &EpicId,
        rating: Rating,
    ) -> StoreResult<Rating> {
        self.client
            .update_effort_rating(product, period, epic, rating)
            .await
    }
}
