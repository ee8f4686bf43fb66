//! HTTP client for the planning backend.

use ramp_core::error::{StoreError, StoreResult};
use ramp_types::{
    CapacityPlan, Epic, EpicId, PlanningPeriod, ProductId, Rating, RoadmapDocument, RoadmapItem,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the backlog, roadmap and capacity endpoints.
///
/// Carries an optional bearer token; session lifecycle (obtaining and
/// discarding the token) belongs to the caller.
pub struct RestClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Full-replace roadmap write, as the backend expects it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveRoadmapRequest {
    year: i32,
    quarter: u8,
    roadmap_items: Vec<RoadmapItem>,
}

/// Body and confirmation shape of the effort-rating endpoint.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EffortRatingPayload {
    effort_rating: Rating,
}

impl RestClient {
    /// A client with the default 30 second timeout.
    pub fn new(endpoint: &str, token: Option<String>) -> StoreResult<Self> {
        Self::with_timeout(endpoint, token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(request_error)?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            token,
        })
    }

    // ========== Backlog API ==========

    /// Every epic of the product, in backend order.
    pub async fn backlog_epics(&self, product: ProductId) -> StoreResult<Vec<Epic>> {
        self.get(&format!("/api/products/{}/backlog/epics", product))
            .await
    }

    // ========== Roadmap API ==========

    /// One quarter's document; `None` when nothing has been saved yet.
    pub async fn roadmap(
        &self,
        product: ProductId,
        period: PlanningPeriod,
    ) -> StoreResult<Option<RoadmapDocument>> {
        let path = format!(
            "/api/products/{}/roadmap/{}/{}",
            product,
            period.year,
            period.quarter.number()
        );
        match self.get(&path).await {
            Ok(document) => Ok(Some(document)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Full-replace write of one quarter's item list. Every submitted
    /// item's RICE score is re-derived first so no stale value reaches
    /// the wire.
    pub async fn save_roadmap(
        &self,
        product: ProductId,
        period: PlanningPeriod,
        mut items: Vec<RoadmapItem>,
    ) -> StoreResult<RoadmapDocument> {
        for item in &mut items {
            item.recompute_rice();
        }
        let request = SaveRoadmapRequest {
            year: period.year,
            quarter: period.quarter.number(),
            roadmap_items: items,
        };
        self.post(&format!("/api/products/{}/roadmap", product), &request)
            .await
    }

    /// Ids committed to quarters other than `exclude`.
    pub async fn assigned_epic_ids(
        &self,
        product: ProductId,
        exclude: PlanningPeriod,
    ) -> StoreResult<HashSet<EpicId>> {
        let path = format!(
            "/api/products/{}/roadmap/assigned-epics?excludeYear={}&excludeQuarter={}",
            product,
            exclude.year,
            exclude.quarter.number()
        );
        let ids: Vec<EpicId> = self.get(&path).await?;
        Ok(ids.into_iter().collect())
    }

    // ========== Capacity API ==========

    /// One quarter's capacity plan; `None` when none exists.
    pub async fn capacity_plan(
        &self,
        product: ProductId,
        period: PlanningPeriod,
    ) -> StoreResult<Option<CapacityPlan>> {
        let path = format!(
            "/api/products/{}/capacity-planning/{}/{}",
            product,
            period.year,
            period.quarter.number()
        );
        match self.get(&path).await {
            Ok(plan) => Ok(Some(plan)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Sets one epic's effort rating through the dedicated endpoint,
    /// never the bulk item list.
    pub async fn update_effort_rating(
        &self,
        product: ProductId,
        period: PlanningPeriod,
        epic: &EpicId,
        rating: Rating,
    ) -> StoreResult<Rating> {
        let path = format!(
            "/api/products/{}/roadmap/{}/{}/epics/{}/effort-rating",
            product,
            period.year,
            period.quarter.number(),
            epic
        );
        let confirmed: EffortRatingPayload = self
            .put(&path, &EffortRatingPayload { effort_rating: rating })
            .await?;
        Ok(confirmed.effort_rating)
    }

    // ========== Internal HTTP helpers ==========

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> StoreResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(request_error)?;
        self.handle_response(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> StoreResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .authorize(self.client.post(&url).json(body))
            .send()
            .await
            .map_err(request_error)?;
        self.handle_response(response).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> StoreResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .authorize(self.client.put(&url).json(body))
            .send()
            .await
            .map_err(request_error)?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> StoreResult<T> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(request_error)
        } else if status == StatusCode::NOT_FOUND {
            let message = response.text().await.unwrap_or_default();
            Err(StoreError::NotFound(with_fallback(message, "resource not found")))
        } else if status == StatusCode::CONFLICT {
            // Conflict bodies are server-authored and surfaced verbatim.
            let message = response.text().await.unwrap_or_default();
            Err(StoreError::Conflict(message))
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(StoreError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

fn with_fallback(message: String, fallback: &str) -> String {
    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

fn request_error(err: reqwest::Error) -> StoreError {
    if err.is_decode() {
        StoreError::InvalidData(err.to_string())
    } else {
        StoreError::Transport(err.to_string())
    }
}
