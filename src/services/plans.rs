use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    db::{PlanStore, StoreError},
    models::plan::{
        is_valid_plan_id, CreatePlanRequest, DayMeals, PlanDraft, PlanSummary, Violation, WeeklyPlan, MAX_AGE,
        MIN_AGE,
    },
    services::{
        metrics::record_write,
        validation::{is_full_week, validate_plan},
    },
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{} meal field(s) contain numbers or special characters", .0.len())]
    ValidationFailed(Vec<Violation>),
    #[error("plan {0} not found")]
    NotFound(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl PlanError {
    fn metric_label(&self) -> &'static str {
        match self {
            PlanError::InvalidInput(_) => "invalid",
            PlanError::ValidationFailed(_) => "rejected",
            PlanError::NotFound(_) => "not_found",
            PlanError::StorageUnavailable(_) => "unavailable",
        }
    }
}

impl From<StoreError> for PlanError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => PlanError::NotFound(id),
            StoreError::Unavailable(reason) => PlanError::StorageUnavailable(reason),
        }
    }
}

/// Checks a week before it is written: Monday through Sunday in order, and
/// no meal field breaking the character policy. Any violation rejects the
/// whole week.
pub fn check_week(days: &[DayMeals]) -> Result<(), PlanError> {
    if !is_full_week(days) {
        return Err(PlanError::InvalidInput(
            "Plan must list Monday through Sunday, in order".into(),
        ));
    }
    let violations = validate_plan(days);
    if !violations.is_empty() {
        return Err(PlanError::ValidationFailed(violations));
    }
    Ok(())
}

/// Ids that cannot name a single stored record are reported as missing.
fn check_id(id: &str) -> Result<(), PlanError> {
    if is_valid_plan_id(id) {
        Ok(())
    } else {
        Err(PlanError::NotFound(id.to_string()))
    }
}

/// Weekly plan workflow: input checks, all-or-nothing validation, then the store.
pub struct PlanService {
    store: Option<Arc<dyn PlanStore>>,
}

impl PlanService {
    pub fn new(store: Option<Arc<dyn PlanStore>>) -> Self {
        Self { store }
    }

    /// Tag of the backing store, `None` when no store is connected.
    pub fn backend_tag(&self) -> Option<&'static str> {
        self.store.as_ref().map(|s| s.backend_tag())
    }

    fn store(&self) -> Result<&dyn PlanStore, PlanError> {
        self.store
            .as_deref()
            .ok_or_else(|| PlanError::StorageUnavailable("plan store not connected".into()))
    }

    pub async fn create(&self, req: CreatePlanRequest) -> Result<WeeklyPlan, PlanError> {
        let result = self.try_create(req).await;
        record_write("create", result.as_ref().map_or_else(PlanError::metric_label, |_| "ok"));
        result
    }

    async fn try_create(&self, req: CreatePlanRequest) -> Result<WeeklyPlan, PlanError> {
        let store = self.store()?;

        let child_name = req.child_name.trim();
        if child_name.is_empty() {
            return Err(PlanError::InvalidInput("Please enter the child's name".into()));
        }
        let age = u8::try_from(req.age)
            .ok()
            .filter(|a| (MIN_AGE..=MAX_AGE).contains(a))
            .ok_or_else(|| {
                PlanError::InvalidInput(format!("Age must be between {MIN_AGE} and {MAX_AGE}"))
            })?;

        if let Err(e) = check_week(&req.days) {
            tracing::warn!("Plan for {} not saved: {}", child_name, e);
            return Err(e);
        }

        let draft = PlanDraft {
            child_name: child_name.to_string(),
            age,
            email: req.email.as_deref().map(str::trim).unwrap_or_default().to_string(),
            days: req.days,
        };
        let plan = store.create(draft).await?;
        tracing::info!("Created plan {} for {}", plan.id, plan.child_name);
        Ok(plan)
    }

    pub async fn list(&self) -> Result<BTreeMap<String, PlanSummary>, PlanError> {
        Ok(self.store()?.list().await?)
    }

    pub async fn get(&self, id: &str) -> Result<WeeklyPlan, PlanError> {
        check_id(id)?;
        Ok(self.store()?.get(id).await?)
    }

    /// Replace the full week of an existing plan and return the stored result.
    pub async fn update(&self, id: &str, days: Vec<DayMeals>) -> Result<WeeklyPlan, PlanError> {
        let result = self.try_update(id, days).await;
        record_write("update", result.as_ref().map_or_else(PlanError::metric_label, |_| "ok"));
        result
    }

    async fn try_update(&self, id: &str, days: Vec<DayMeals>) -> Result<WeeklyPlan, PlanError> {
        check_id(id)?;
        if let Err(e) = check_week(&days) {
            tracing::warn!("Update of plan {} cancelled: {}", id, e);
            return Err(e);
        }
        let store = self.store()?;
        store.update_days(id, &days).await?;
        tracing::info!("Updated plan {}", id);
        Ok(store.get(id).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), PlanError> {
        let result = self.try_delete(id).await;
        record_write("delete", result.as_ref().map_or_else(PlanError::metric_label, |_| "ok"));
        result
    }

    async fn try_delete(&self, id: &str) -> Result<(), PlanError> {
        check_id(id)?;
        self.store()?.delete(id).await?;
        tracing::info!("Deleted plan {}", id);
        Ok(())
    }
}
