pub mod firebase;
pub mod memory;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::{Config, StoreBackend},
    models::plan::{DayMeals, PlanDraft, PlanSummary, WeeklyPlan},
};

use self::{firebase::FirebaseStore, memory::MemoryStore};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("plan {0} not found")]
    NotFound(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// CRUD boundary over the hierarchical store holding weekly plans.
/// Implementations keep no local cache; every call reads the backing store.
#[async_trait]
pub trait PlanStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// Assign a fresh id and write the plan.
    async fn create(&self, draft: PlanDraft) -> Result<WeeklyPlan, StoreError>;

    async fn list(&self) -> Result<BTreeMap<String, PlanSummary>, StoreError>;

    async fn get(&self, id: &str) -> Result<WeeklyPlan, StoreError>;

    /// Replace the whole `plan` field of an existing record.
    async fn update_days(&self, id: &str, days: &[DayMeals]) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Build the configured store. `None` when the Firebase backend is selected
/// but no database URL is set.
pub fn build_store(config: &Config) -> anyhow::Result<Option<Arc<dyn PlanStore>>> {
    let store: Option<Arc<dyn PlanStore>> = match config.store_backend {
        StoreBackend::Memory => Some(Arc::new(MemoryStore::default())),
        StoreBackend::Firebase => match config.firebase_database_url.as_deref() {
            Some(url) => Some(Arc::new(FirebaseStore::new(
                url,
                &config.plan_collection,
                config.firebase_auth.clone(),
            )?)),
            None => None,
        },
    };
    Ok(store)
}
