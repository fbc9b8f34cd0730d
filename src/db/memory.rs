use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{PlanStore, StoreError};
use crate::models::plan::{new_plan_id, DayMeals, PlanDraft, PlanSummary, WeeklyPlan};

/// In-process plan store for local development and tests.
#[derive(Default)]
pub struct MemoryStore {
    plans: Mutex<HashMap<String, WeeklyPlan>>,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Make every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, draft: PlanDraft) -> Result<WeeklyPlan, StoreError> {
        self.ensure_online()?;
        let mut plans = self.plans.lock().await;
        let id = loop {
            let id = new_plan_id();
            if !plans.contains_key(&id) {
                break id;
            }
        };
        let plan = draft.with_id(id.clone());
        plans.insert(id, plan.clone());
        Ok(plan)
    }

    async fn list(&self) -> Result<BTreeMap<String, PlanSummary>, StoreError> {
        self.ensure_online()?;
        Ok(self
            .plans
            .lock()
            .await
            .iter()
            .map(|(id, plan)| (id.clone(), PlanSummary::from(plan)))
            .collect())
    }

    async fn get(&self, id: &str) -> Result<WeeklyPlan, StoreError> {
        self.ensure_online()?;
        self.plans
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update_days(&self, id: &str, days: &[DayMeals]) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut plans = self.plans.lock().await;
        let plan = plans
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        plan.days = days.to_vec();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.ensure_online()?;
        self.plans
            .lock()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
