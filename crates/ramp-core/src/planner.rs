//! The quarterly planning session.
//!
//! `RoadmapPlanner` owns the client-side state for one product quarter:
//! the last adopted canonical document, the cached backlog, the set of
//! epics committed to other quarters, and the edit surface mode. All
//! mutating operations take `&mut self`, so saves from one session are
//! serialized; whichever server response resolves last is adopted as
//! truth, and adoption always re-derives RICE scores locally instead of
//! trusting the echoed values.

use chrono::NaiveDate;
use ramp_types::{
    available_epics, CapacityPlan, EffortBands, Epic, EpicFilter, EpicId, PlanningPeriod, Priority,
    ProductId, Rating, RoadmapDocument, RoadmapItem, RoadmapStatus,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{PlanError, PlanResult, StoreError};
use crate::store::{BacklogStore, CapacityStore, RoadmapStore};

/// A dismissible inline message left behind by a failed save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Epic-uniqueness violation; text is the store's, verbatim.
    Conflict(String),
    /// Any other save failure.
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Conflict(message) | Notice::Error(message) => message,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Notice::Conflict(_))
    }
}

/// How a persist attempt ended. None of these abort the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The store accepted the write and its canonical document was
    /// adopted.
    Saved,
    /// The store rejected the write over epic uniqueness; the message
    /// is the store's, verbatim.
    Conflict(String),
    /// The write failed for any other reason.
    Failed(String),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}

/// One field change on a roadmap item. Rating edits re-derive the RICE
/// score when applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Reach(Rating),
    Impact(Rating),
    Confidence(Rating),
    Status(RoadmapStatus),
    Priority(Priority),
    StartDate(Option<NaiveDate>),
    EndDate(Option<NaiveDate>),
}

impl FieldEdit {
    fn apply(&self, item: &mut RoadmapItem) {
        match self {
            FieldEdit::Reach(rating) => item.set_reach(*rating),
            FieldEdit::Impact(rating) => item.set_impact(*rating),
            FieldEdit::Confidence(rating) => item.set_confidence(*rating),
            FieldEdit::Status(status) => item.status = *status,
            FieldEdit::Priority(priority) => item.priority = *priority,
            FieldEdit::StartDate(date) => item.start_date = *date,
            FieldEdit::EndDate(date) => item.end_date = *date,
        }
    }
}

/// The edit surface state machine.
///
/// `Viewing` autosaves every field change immediately; `Editing`
/// buffers changes in a draft that one save commits wholesale. Each
/// surface's behavior is fixed by the state, never toggled ad hoc.
#[derive(Debug, Clone, PartialEq)]
pub enum EditMode {
    Viewing,
    Editing { draft: RoadmapDocument },
}

/// Client-side planning session for one product quarter.
pub struct RoadmapPlanner {
    backlog: Arc<dyn BacklogStore>,
    roadmaps: Arc<dyn RoadmapStore>,
    capacity: Arc<dyn CapacityStore>,
    product: ProductId,
    period: PlanningPeriod,
    document: RoadmapDocument,
    backlog_epics: Vec<Epic>,
    assigned_elsewhere: HashSet<EpicId>,
    mode: EditMode,
    notice: Option<Notice>,
}

impl RoadmapPlanner {
    /// A session with empty local state; call [`RoadmapPlanner::load`]
    /// before anything else.
    pub fn new(
        backlog: Arc<dyn BacklogStore>,
        roadmaps: Arc<dyn RoadmapStore>,
        capacity: Arc<dyn CapacityStore>,
        product: ProductId,
        period: PlanningPeriod,
    ) -> Self {
        Self {
            backlog,
            roadmaps,
            capacity,
            product,
            period,
            document: RoadmapDocument::empty(product, period),
            backlog_epics: Vec::new(),
            assigned_elsewhere: HashSet::new(),
            mode: EditMode::Viewing,
            notice: None,
        }
    }

    pub fn product(&self) -> ProductId {
        self.product
    }

    pub fn period(&self) -> PlanningPeriod {
        self.period
    }

    /// The last adopted canonical document.
    pub fn document(&self) -> &RoadmapDocument {
        &self.document
    }

    /// The buffered draft, present in `Editing` mode only.
    pub fn draft(&self) -> Option<&RoadmapDocument> {
        match &self.mode {
            EditMode::Editing { draft } => Some(draft),
            EditMode::Viewing => None,
        }
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, EditMode::Editing { .. })
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// The cached backlog, in backend order.
    pub fn backlog(&self) -> &[Epic] {
        &self.backlog_epics
    }

    /// Ids committed to other quarters, as of the last load.
    pub fn assigned_elsewhere(&self) -> &HashSet<EpicId> {
        &self.assigned_elsewhere
    }

    /// Fetches the document, backlog and assigned-elsewhere set. A
    /// missing document is adopted as the empty state.
    pub async fn load(&mut self) -> PlanResult<()> {
        let fetched = self.roadmaps.fetch_roadmap(self.product, self.period).await?;
        let document =
            fetched.unwrap_or_else(|| RoadmapDocument::empty(self.product, self.period));
        self.adopt(document);
        self.backlog_epics = self.backlog.backlog_epics(self.product).await?;
        self.assigned_elsewhere = self
            .roadmaps
            .assigned_epic_ids(self.product, self.period)
            .await?;
        info!(
            product = %self.product,
            period = %self.period,
            items = self.document.roadmap_items.len(),
            backlog = self.backlog_epics.len(),
            "Roadmap data loaded"
        );
        Ok(())
    }

    /// Candidate epics for this quarter: the backlog minus everything
    /// assigned elsewhere, narrowed by the filter. Order-preserving and
    /// idempotent.
    pub fn available_epics(&self, filter: &EpicFilter) -> Vec<Epic> {
        available_epics(&self.backlog_epics, &self.assigned_elsewhere, filter)
    }

    /// Applies one field change and autosaves the whole item list.
    /// Viewing mode only.
    ///
    /// The edit is applied locally first, so the session shows the new
    /// value while the save is in flight. On success the store's
    /// canonical document replaces local state; on conflict or failure
    /// the change is rolled back by reloading, since it could not be
    /// durably applied.
    pub async fn update_field(
        &mut self,
        epic_id: &EpicId,
        edit: FieldEdit,
    ) -> PlanResult<SaveOutcome> {
        if self.is_editing() {
            return Err(PlanError::EditInProgress);
        }
        {
            let item = self
                .document
                .item_mut(epic_id)
                .ok_or_else(|| PlanError::NotOnRoadmap(epic_id.clone()))?;
            edit.apply(item);
        }
        debug!(epic = %epic_id, "Autosaving field edit");
        let items = self.document.roadmap_items.clone();
        self.persist_autosave(items).await
    }

    /// Sets one epic's effort rating through the dedicated capacity
    /// path, never the bulk item list. Viewing mode only; local state
    /// changes only after the store confirms.
    pub async fn update_effort_rating(
        &mut self,
        epic_id: &EpicId,
        rating: Rating,
    ) -> PlanResult<Rating> {
        if self.is_editing() {
            return Err(PlanError::EditInProgress);
        }
        if !self.document.contains(epic_id) {
            return Err(PlanError::NotOnRoadmap(epic_id.clone()));
        }
        let stored = self
            .capacity
            .update_effort_rating(self.product, self.period, epic_id, rating)
            .await?;
        if let Some(item) = self.document.item_mut(epic_id) {
            item.effort_rating = stored;
        }
        self.notice = None;
        debug!(epic = %epic_id, rating = stored.value(), "Effort rating updated");
        Ok(stored)
    }

    /// Viewing → Editing: the draft starts as a copy of the canonical
    /// document.
    pub fn enter_edit(&mut self) -> PlanResult<()> {
        if self.is_editing() {
            return Err(PlanError::EditInProgress);
        }
        debug!(period = %self.period, "Entering batch edit");
        self.mode = EditMode::Editing {
            draft: self.document.clone(),
        };
        Ok(())
    }

    /// Adds an epic to the draft. Prior ratings and dates carry forward
    /// when the epic was already on the canonical document; otherwise
    /// the item starts with defaults spanning the quarter.
    ///
    /// Ids known to be assigned to another quarter are rejected locally,
    /// before any network call; the store re-checks on save regardless.
    pub fn add_epic(&mut self, epic_id: &EpicId) -> PlanResult<()> {
        if !self.is_editing() {
            return Err(PlanError::NotEditing);
        }
        let epic = self
            .backlog_epics
            .iter()
            .find(|epic| &epic.id == epic_id)
            .cloned()
            .ok_or_else(|| PlanError::UnknownEpic(epic_id.clone()))?;
        if self.assigned_elsewhere.contains(epic_id) {
            let rejection = PlanError::AssignedElsewhere(epic_id.clone());
            self.notice = Some(Notice::Conflict(rejection.to_string()));
            return Err(rejection);
        }
        let prior = self.document.item(epic_id).cloned();
        let period = self.period;
        let EditMode::Editing { draft } = &mut self.mode else {
            return Err(PlanError::NotEditing);
        };
        if draft.contains(epic_id) {
            return Err(PlanError::AlreadyOnRoadmap(epic_id.clone()));
        }
        draft
            .roadmap_items
            .push(RoadmapItem::for_epic(&epic, period, prior.as_ref()));
        Ok(())
    }

    /// Removes an epic from the draft.
    pub fn remove_epic(&mut self, epic_id: &EpicId) -> PlanResult<()> {
        let EditMode::Editing { draft } = &mut self.mode else {
            return Err(PlanError::NotEditing);
        };
        match draft.position_of(epic_id) {
            Some(position) => {
                draft.roadmap_items.remove(position);
                Ok(())
            }
            None => Err(PlanError::NotOnRoadmap(epic_id.clone())),
        }
    }

    /// Applies one field change to the draft. No network.
    pub fn edit_draft(&mut self, epic_id: &EpicId, edit: FieldEdit) -> PlanResult<()> {
        let EditMode::Editing { draft } = &mut self.mode else {
            return Err(PlanError::NotEditing);
        };
        let item = draft
            .item_mut(epic_id)
            .ok_or_else(|| PlanError::NotOnRoadmap(epic_id.clone()))?;
        edit.apply(item);
        Ok(())
    }

    /// Commits the draft as a full-replace write.
    ///
    /// Success adopts the canonical document and returns to Viewing.
    /// A conflict keeps the draft and the Editing state intact so the
    /// other buffered changes are not lost; the verbatim store message
    /// is surfaced. Other failures likewise keep the draft.
    pub async fn save_edits(&mut self) -> PlanResult<SaveOutcome> {
        let items = match &mut self.mode {
            EditMode::Editing { draft } => {
                draft.normalize_scores();
                draft.roadmap_items.clone()
            }
            EditMode::Viewing => return Err(PlanError::NotEditing),
        };
        match self.roadmaps.save_roadmap(self.product, self.period, items).await {
            Ok(canonical) => {
                info!(
                    period = %self.period,
                    items = canonical.roadmap_items.len(),
                    "Roadmap saved"
                );
                self.adopt(canonical);
                self.mode = EditMode::Viewing;
                self.notice = None;
                Ok(SaveOutcome::Saved)
            }
            Err(StoreError::Conflict(message)) => {
                warn!(period = %self.period, "Batch save rejected: epic conflict");
                self.notice = Some(Notice::Conflict(message.clone()));
                Ok(SaveOutcome::Conflict(message))
            }
            Err(err) => {
                let message = err.to_string();
                warn!(period = %self.period, error = %message, "Batch save failed");
                self.notice = Some(Notice::Error(message.clone()));
                Ok(SaveOutcome::Failed(message))
            }
        }
    }

    /// Editing → Viewing, discarding the draft and reloading canonical
    /// state.
    pub async fn cancel_edits(&mut self) -> PlanResult<()> {
        if !self.is_editing() {
            return Err(PlanError::NotEditing);
        }
        debug!(period = %self.period, "Cancelling batch edit");
        self.mode = EditMode::Viewing;
        self.load().await
    }

    /// The auto-fill flow: aggregate the capacity plan's per-epic
    /// totals, band them into star ratings, and push each through the
    /// dedicated effort path. Epics absent from the roadmap or with
    /// zero recorded effort are skipped. Returns what was applied.
    pub async fn sync_effort_ratings(
        &mut self,
        bands: &EffortBands,
    ) -> PlanResult<Vec<(EpicId, Rating)>> {
        if self.is_editing() {
            return Err(PlanError::EditInProgress);
        }
        let plan: Option<CapacityPlan> =
            self.capacity.capacity_plan(self.product, self.period).await?;
        let Some(plan) = plan else {
            debug!(period = %self.period, "No capacity plan; nothing to sync");
            return Ok(Vec::new());
        };
        let mut applied = Vec::new();
        for (epic_id, rating) in plan.auto_effort_ratings(bands) {
            if !self.document.contains(&epic_id) {
                continue;
            }
            let stored = self
                .capacity
                .update_effort_rating(self.product, self.period, &epic_id, rating)
                .await?;
            if let Some(item) = self.document.item_mut(&epic_id) {
                item.effort_rating = stored;
            }
            applied.push((epic_id, stored));
        }
        info!(period = %self.period, applied = applied.len(), "Effort ratings synced");
        Ok(applied)
    }

    /// Adopts a document as canonical truth, re-deriving every RICE
    /// score from its factors first.
    fn adopt(&mut self, mut document: RoadmapDocument) {
        let stale = document.normalize_scores();
        if stale > 0 {
            debug!(count = stale, "Recomputed stale RICE scores");
        }
        self.document = document;
    }

    /// Autosave write plus the Viewing-mode failure handling: conflicts
    /// and errors roll the optimistic change back by reloading.
    async fn persist_autosave(&mut self, items: Vec<RoadmapItem>) -> PlanResult<SaveOutcome> {
        match self.roadmaps.save_roadmap(self.product, self.period, items).await {
            Ok(canonical) => {
                self.adopt(canonical);
                self.notice = None;
                Ok(SaveOutcome::Saved)
            }
            Err(StoreError::Conflict(message)) => {
                warn!(period = %self.period, "Autosave rejected: epic conflict");
                self.notice = Some(Notice::Conflict(message.clone()));
                self.rollback().await;
                Ok(SaveOutcome::Conflict(message))
            }
            Err(err) => {
                let message = err.to_string();
                warn!(period = %self.period, error = %message, "Autosave failed");
                self.notice = Some(Notice::Error(message.clone()));
                self.rollback().await;
                Ok(SaveOutcome::Failed(message))
            }
        }
    }

    /// Discards local state in favor of the stores' truth after a
    /// failed autosave. The notice set by the failure survives.
    async fn rollback(&mut self) {
        if let Err(err) = self.load().await {
            warn!(error = %err, "Reload after failed save did not complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryBacklog, InMemoryCapacity, InMemoryRoadmaps};
    use ramp_types::{EffortUnit, EpicEffort, Quarter, TeamId};

    const PRODUCT: ProductId = ProductId(1);

    fn q1() -> PlanningPeriod {
        PlanningPeriod::new(2025, Quarter::Q1)
    }

    fn q2() -> PlanningPeriod {
        PlanningPeriod::new(2025, Quarter::Q2)
    }

    fn rating(value: u8) -> Rating {
        Rating::new(value).unwrap()
    }

    fn epic(id: &str, name: &str) -> Epic {
        Epic::new(id, name)
    }

    struct Stores {
        backlog: InMemoryBacklog,
        roadmaps: InMemoryRoadmaps,
        capacity: InMemoryCapacity,
    }

    async fn stores() -> Stores {
        let backlog = InMemoryBacklog::new();
        backlog
            .put_epics(
                PRODUCT,
                vec![
                    epic("E1", "Checkout"),
                    epic("E2", "Search"),
                    epic("E3", "Billing"),
                ],
            )
            .await;
        let roadmaps = InMemoryRoadmaps::new();
        let capacity = InMemoryCapacity::new(roadmaps.clone());
        Stores {
            backlog,
            roadmaps,
            capacity,
        }
    }

    fn planner(stores: &Stores, period: PlanningPeriod) -> RoadmapPlanner {
        RoadmapPlanner::new(
            Arc::new(stores.backlog.clone()),
            Arc::new(stores.roadmaps.clone()),
            Arc::new(stores.capacity.clone()),
            PRODUCT,
            period,
        )
    }

    async fn seed_q2_with(stores: &Stores, ids: &[(&str, &str)]) {
        let items = ids
            .iter()
            .map(|(id, name)| RoadmapItem::new(&epic(id, name), q2()))
            .collect();
        stores
            .roadmaps
            .save_roadmap(PRODUCT, q2(), items)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_load_without_document_is_empty_state() {
        let stores = stores().await;
        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();

        assert!(planner.document().roadmap_items.is_empty());
        assert_eq!(planner.document().id, None);
        assert_eq!(planner.backlog().len(), 3);
        assert!(!planner.is_editing());
    }

    #[tokio::test]
    async fn test_load_normalizes_stale_scores() {
        let stores = stores().await;
        let stale: RoadmapItem = serde_json::from_str(
            r#"{
                "epicId": "E1",
                "epicName": "Checkout",
                "reach": 5,
                "impact": 4,
                "confidence": 3,
                "riceScore": 999
            }"#,
        )
        .unwrap();
        stores
            .roadmaps
            .save_roadmap(PRODUCT, q2(), vec![stale])
            .await
            .unwrap();

        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();
        assert_eq!(
            planner.document().item(&EpicId::from("E1")).unwrap().rice_score(),
            60
        );
    }

    #[tokio::test]
    async fn test_update_field_autosaves_and_adopts_canonical() {
        let stores = stores().await;
        seed_q2_with(&stores, &[("E2", "Search")]).await;
        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();

        let outcome = planner
            .update_field(&EpicId::from("E2"), FieldEdit::Reach(rating(5)))
            .await
            .unwrap();
        assert!(outcome.is_saved());
        planner
            .update_field(&EpicId::from("E2"), FieldEdit::Impact(rating(4)))
            .await
            .unwrap();
        planner
            .update_field(&EpicId::from("E2"), FieldEdit::Confidence(rating(3)))
            .await
            .unwrap();

        let item = planner.document().item(&EpicId::from("E2")).unwrap();
        assert_eq!(item.rice_score(), 60);
        assert!(planner.notice().is_none());

        // The store holds the same canonical state.
        let stored = stores
            .roadmaps
            .fetch_roadmap(PRODUCT, q2())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.item(&EpicId::from("E2")).unwrap().rice_score(), 60);
    }

    #[tokio::test]
    async fn test_update_field_requires_viewing_mode() {
        let stores = stores().await;
        seed_q2_with(&stores, &[("E2", "Search")]).await;
        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();
        planner.enter_edit().unwrap();

        let err = planner
            .update_field(&EpicId::from("E2"), FieldEdit::Reach(rating(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::EditInProgress));
    }

    #[tokio::test]
    async fn test_update_field_unknown_epic() {
        let stores = stores().await;
        seed_q2_with(&stores, &[("E2", "Search")]).await;
        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();

        let err = planner
            .update_field(&EpicId::from("E9"), FieldEdit::Reach(rating(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::NotOnRoadmap(_)));
    }

    #[tokio::test]
    async fn test_autosave_conflict_rolls_back_by_reload() {
        let stores = stores().await;
        // Out-of-band state: E1 sits in both quarters, as happens when
        // another session commits E1 to Q1 after ours loaded Q2.
        let mut q2_doc = RoadmapDocument::empty(PRODUCT, q2());
        q2_doc.roadmap_items = vec![
            RoadmapItem::new(&epic("E1", "Checkout"), q2()),
            RoadmapItem::new(&epic("E2", "Search"), q2()),
        ];
        q2_doc.id = Some(42);
        stores.roadmaps.put_document(q2_doc).await;
        let mut q1_doc = RoadmapDocument::empty(PRODUCT, q1());
        q1_doc.roadmap_items = vec![RoadmapItem::new(&epic("E1", "Checkout"), q1())];
        stores.roadmaps.put_document(q1_doc).await;

        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();

        let outcome = planner
            .update_field(&EpicId::from("E2"), FieldEdit::Reach(rating(5)))
            .await
            .unwrap();
        match &outcome {
            SaveOutcome::Conflict(message) => assert_eq!(
                message,
                "The following epics are already assigned to other quarters: Checkout (Q1 2025)"
            ),
            other => panic!("expected conflict, got {other:?}"),
        }

        // The optimistic reach change was rolled back by the reload.
        let item = planner.document().item(&EpicId::from("E2")).unwrap();
        assert_eq!(item.reach().value(), 0);

        // The notice carries the verbatim message and survives the
        // reload.
        let notice = planner.notice().unwrap();
        assert!(notice.is_conflict());
        assert!(notice.message().contains("Checkout (Q1 2025)"));

        // The Q1 assignment is intact.
        let q1_doc = stores
            .roadmaps
            .fetch_roadmap(PRODUCT, q1())
            .await
            .unwrap()
            .unwrap();
        assert!(q1_doc.contains(&EpicId::from("E1")));
    }

    #[tokio::test]
    async fn test_batch_flow_saves_draft_and_returns_to_viewing() {
        let stores = stores().await;
        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();

        planner.enter_edit().unwrap();
        planner.add_epic(&EpicId::from("E2")).unwrap();
        planner.add_epic(&EpicId::from("E3")).unwrap();
        planner
            .edit_draft(&EpicId::from("E2"), FieldEdit::Priority(Priority::High))
            .unwrap();
        planner.remove_epic(&EpicId::from("E3")).unwrap();

        // Nothing hit the store while drafting.
        assert!(stores
            .roadmaps
            .fetch_roadmap(PRODUCT, q2())
            .await
            .unwrap()
            .is_none());

        let outcome = planner.save_edits().await.unwrap();
        assert!(outcome.is_saved());
        assert!(!planner.is_editing());
        assert!(planner.draft().is_none());

        let document = planner.document();
        assert_eq!(document.roadmap_items.len(), 1);
        let item = document.item(&EpicId::from("E2")).unwrap();
        assert_eq!(item.priority, Priority::High);
        assert_eq!(item.status, RoadmapStatus::Proposed);
        assert_eq!(item.start_date, Some(q2().start_date()));
        assert_eq!(item.end_date, Some(q2().end_date()));
    }

    #[tokio::test]
    async fn test_add_epic_rejects_assigned_elsewhere_locally() {
        let stores = stores().await;
        stores
            .roadmaps
            .save_roadmap(
                PRODUCT,
                q1(),
                vec![RoadmapItem::new(&epic("E1", "Checkout"), q1())],
            )
            .await
            .unwrap();

        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();
        planner.enter_edit().unwrap();

        let err = planner.add_epic(&EpicId::from("E1")).unwrap_err();
        assert!(matches!(err, PlanError::AssignedElsewhere(_)));
        assert!(planner.notice().unwrap().is_conflict());
        assert!(!planner.draft().unwrap().contains(&EpicId::from("E1")));
        // The rejection happened before any write.
        assert!(stores
            .roadmaps
            .fetch_roadmap(PRODUCT, q2())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_add_epic_rejects_duplicates_and_unknown_ids() {
        let stores = stores().await;
        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();
        planner.enter_edit().unwrap();

        planner.add_epic(&EpicId::from("E2")).unwrap();
        assert!(matches!(
            planner.add_epic(&EpicId::from("E2")),
            Err(PlanError::AlreadyOnRoadmap(_))
        ));
        assert!(matches!(
            planner.add_epic(&EpicId::from("E9")),
            Err(PlanError::UnknownEpic(_))
        ));
    }

    #[tokio::test]
    async fn test_readding_epic_carries_canonical_ratings_forward() {
        let stores = stores().await;
        let mut rated = RoadmapItem::new(&epic("E2", "Search"), q2());
        rated.set_reach(rating(5));
        rated.set_impact(rating(4));
        rated.set_confidence(rating(3));
        stores
            .roadmaps
            .save_roadmap(PRODUCT, q2(), vec![rated])
            .await
            .unwrap();

        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();
        planner.enter_edit().unwrap();
        planner.remove_epic(&EpicId::from("E2")).unwrap();
        planner.add_epic(&EpicId::from("E2")).unwrap();

        let draft_item = planner
            .draft()
            .unwrap()
            .item(&EpicId::from("E2"))
            .unwrap();
        assert_eq!(draft_item.rice_score(), 60);
        assert_eq!(draft_item.reach().value(), 5);
    }

    #[tokio::test]
    async fn test_batch_conflict_keeps_draft_and_mode() {
        let stores = stores().await;
        seed_q2_with(&stores, &[("E2", "Search")]).await;
        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();

        // E1 lands in Q1 after our load, so the local availability
        // check cannot catch it; only the store's check can.
        stores
            .roadmaps
            .save_roadmap(
                PRODUCT,
                q1(),
                vec![RoadmapItem::new(&epic("E1", "Checkout"), q1())],
            )
            .await
            .unwrap();

        planner.enter_edit().unwrap();
        planner.add_epic(&EpicId::from("E1")).unwrap();
        planner
            .edit_draft(&EpicId::from("E2"), FieldEdit::Status(RoadmapStatus::Committed))
            .unwrap();

        let outcome = planner.save_edits().await.unwrap();
        assert!(matches!(outcome, SaveOutcome::Conflict(_)));

        // Draft and mode survive, buffered changes included.
        assert!(planner.is_editing());
        let draft = planner.draft().unwrap();
        assert!(draft.contains(&EpicId::from("E1")));
        assert_eq!(
            draft.item(&EpicId::from("E2")).unwrap().status,
            RoadmapStatus::Committed
        );

        // The store kept the pre-edit canonical state.
        let stored = stores
            .roadmaps
            .fetch_roadmap(PRODUCT, q2())
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.contains(&EpicId::from("E1")));
    }

    #[tokio::test]
    async fn test_cancel_edits_discards_draft() {
        let stores = stores().await;
        seed_q2_with(&stores, &[("E2", "Search")]).await;
        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();

        planner.enter_edit().unwrap();
        planner.add_epic(&EpicId::from("E3")).unwrap();
        planner.cancel_edits().await.unwrap();

        assert!(!planner.is_editing());
        assert!(!planner.document().contains(&EpicId::from("E3")));
        let stored = stores
            .roadmaps
            .fetch_roadmap(PRODUCT, q2())
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.contains(&EpicId::from("E3")));
    }

    #[tokio::test]
    async fn test_draft_ops_require_editing_mode() {
        let stores = stores().await;
        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();

        assert!(matches!(
            planner.add_epic(&EpicId::from("E2")),
            Err(PlanError::NotEditing)
        ));
        assert!(matches!(
            planner.remove_epic(&EpicId::from("E2")),
            Err(PlanError::NotEditing)
        ));
        assert!(matches!(
            planner.edit_draft(&EpicId::from("E2"), FieldEdit::Reach(rating(1))),
            Err(PlanError::NotEditing)
        ));
        assert!(matches!(planner.save_edits().await, Err(PlanError::NotEditing)));
        assert!(matches!(
            planner.cancel_edits().await,
            Err(PlanError::NotEditing)
        ));
    }

    #[tokio::test]
    async fn test_available_epics_excludes_assigned_and_filters() {
        let stores = stores().await;
        stores
            .roadmaps
            .save_roadmap(
                PRODUCT,
                q1(),
                vec![RoadmapItem::new(&epic("E1", "Checkout"), q1())],
            )
            .await
            .unwrap();
        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();

        let available = planner.available_epics(&EpicFilter::new());
        let ids: Vec<&str> = available.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["E2", "E3"]);

        let searched = planner.available_epics(&EpicFilter::new().with_search("bill"));
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].id, EpicId::from("E3"));
    }

    #[tokio::test]
    async fn test_effort_rating_goes_through_capacity_path() {
        let stores = stores().await;
        seed_q2_with(&stores, &[("E2", "Search")]).await;
        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();

        let stored = planner
            .update_effort_rating(&EpicId::from("E2"), rating(4))
            .await
            .unwrap();
        assert_eq!(stored.value(), 4);
        assert_eq!(
            planner
                .document()
                .item(&EpicId::from("E2"))
                .unwrap()
                .effort_rating
                .value(),
            4
        );

        // The document's updated_at moved without a bulk save: the
        // narrow path wrote through.
        let stored_doc = stores
            .roadmaps
            .fetch_roadmap(PRODUCT, q2())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored_doc.item(&EpicId::from("E2")).unwrap().effort_rating.value(),
            4
        );

        planner.enter_edit().unwrap();
        assert!(matches!(
            planner.update_effort_rating(&EpicId::from("E2"), rating(1)).await,
            Err(PlanError::EditInProgress)
        ));
    }

    #[tokio::test]
    async fn test_effort_rating_requires_membership() {
        let stores = stores().await;
        seed_q2_with(&stores, &[("E2", "Search")]).await;
        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();

        assert!(matches!(
            planner.update_effort_rating(&EpicId::from("E9"), rating(2)).await,
            Err(PlanError::NotOnRoadmap(_))
        ));
    }

    #[tokio::test]
    async fn test_sync_effort_ratings_bands_and_skips() {
        let stores = stores().await;
        seed_q2_with(&stores, &[("E2", "Search"), ("E3", "Billing")]).await;
        let plan = CapacityPlan {
            effort_unit: EffortUnit::Days,
            epic_efforts: vec![
                // E2: 8 + 14 = 22 days -> 4 stars on the days bands.
                EpicEffort::new("E2", TeamId(1), 8),
                EpicEffort::new("E2", TeamId(2), 14),
                // E3 has zero recorded effort: skipped.
                EpicEffort::new("E3", TeamId(1), 0),
                // E9 is not on the roadmap: skipped.
                EpicEffort::new("E9", TeamId(1), 30),
            ],
            ..CapacityPlan::empty(PRODUCT, q2())
        };
        stores.capacity.put_plan(plan).await;

        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();

        let applied = planner
            .sync_effort_ratings(&EffortBands::default_for(EffortUnit::Days))
            .await
            .unwrap();
        assert_eq!(applied, vec![(EpicId::from("E2"), rating(4))]);
        assert_eq!(
            planner
                .document()
                .item(&EpicId::from("E2"))
                .unwrap()
                .effort_rating
                .value(),
            4
        );
        assert_eq!(
            planner
                .document()
                .item(&EpicId::from("E3"))
                .unwrap()
                .effort_rating
                .value(),
            0
        );
    }

    #[tokio::test]
    async fn test_sync_without_plan_is_a_no_op() {
        let stores = stores().await;
        seed_q2_with(&stores, &[("E2", "Search")]).await;
        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();

        let applied = planner
            .sync_effort_ratings(&EffortBands::default_for(EffortUnit::Sprints))
            .await
            .unwrap();
        assert!(applied.is_empty());
    }

    #[tokio::test]
    async fn test_saving_unchanged_document_is_idempotent() {
        let stores = stores().await;
        seed_q2_with(&stores, &[("E2", "Search")]).await;
        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();

        planner.enter_edit().unwrap();
        planner.save_edits().await.unwrap();
        let first = planner.document().clone();

        planner.enter_edit().unwrap();
        planner.save_edits().await.unwrap();
        let second = planner.document().clone();

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(first.roadmap_items, second.roadmap_items);
    }

    #[tokio::test]
    async fn test_dismiss_notice() {
        let stores = stores().await;
        stores
            .roadmaps
            .save_roadmap(
                PRODUCT,
                q1(),
                vec![RoadmapItem::new(&epic("E1", "Checkout"), q1())],
            )
            .await
            .unwrap();
        let mut planner = planner(&stores, q2());
        planner.load().await.unwrap();
        planner.enter_edit().unwrap();
        let _ = planner.add_epic(&EpicId::from("E1"));
        assert!(planner.notice().is_some());
        planner.dismiss_notice();
        assert!(planner.notice().is_none());
    }
}
