use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{PlanStore, StoreError};
use crate::models::plan::{new_plan_id, DayMeals, PlanDraft, PlanSummary, WeeklyPlan};

/// Attempts at drawing an unused id before giving up on a create.
const ID_ATTEMPTS: usize = 5;

/// Plan store backed by the Firebase Realtime Database REST API.
///
/// Records live at `{database_url}/{collection}/{id}.json`.
pub struct FirebaseStore {
    client: Client,
    database_url: Url,
    collection: Vec<String>,
    auth: Option<String>,
}

/// Only the fields the list view needs; older records may miss some.
#[derive(Deserialize)]
struct SummaryRecord {
    #[serde(default = "unknown_child")]
    child_name: String,
    #[serde(default)]
    age: u8,
}

fn unknown_child() -> String {
    "Unknown".to_string()
}

impl FirebaseStore {
    pub fn new(database_url: &str, collection: &str, auth: Option<String>) -> anyhow::Result<Self> {
        let parsed = Url::parse(database_url)?;
        anyhow::ensure!(
            matches!(parsed.scheme(), "http" | "https") && !parsed.cannot_be_a_base(),
            "database URL must be http(s): {database_url}"
        );
        let collection: Vec<String> = collection
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        anyhow::ensure!(!collection.is_empty(), "plan collection must not be empty");

        Ok(Self {
            client: Client::new(),
            database_url: parsed,
            collection,
            auth,
        })
    }

    /// URL of the collection, or of one record when `id` is given. The id is
    /// pushed as a single escaped segment, so it can never address a child node.
    fn node_url(&self, id: Option<&str>) -> Result<Url, StoreError> {
        let mut leaf = self.collection.clone();
        match id {
            Some(id) => leaf.push(format!("{id}.json")),
            None => {
                if let Some(last) = leaf.last_mut() {
                    last.push_str(".json");
                }
            }
        }

        let mut url = self.database_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Unavailable("database URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(&leaf);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Some(token) => request.query(&[("auth", token.as_str())]),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("Firebase error {}: {}", status, text);
            return Err(StoreError::Unavailable(format!("store returned {status}")));
        }
        Ok(response)
    }

    async fn read_json(&self, request: RequestBuilder) -> Result<Value, StoreError> {
        self.send(request)
            .await?
            .json::<Value>()
            .await
            .map_err(|e| StoreError::Unavailable(format!("unreadable store response: {e}")))
    }

    async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        let value = self
            .read_json(
                self.client
                    .get(self.node_url(Some(id))?)
                    .query(&[("shallow", "true")]),
            )
            .await?;
        Ok(!value.is_null())
    }
}

/// Turn the collection snapshot into summaries. The database answers `null`
/// for an empty collection.
fn parse_listing(value: Value) -> Result<BTreeMap<String, PlanSummary>, StoreError> {
    let entries = match value {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Object(entries) => entries,
        other => {
            return Err(StoreError::Unavailable(format!(
                "unexpected collection shape: {other}"
            )))
        }
    };

    let mut summaries = BTreeMap::new();
    for (id, record) in entries {
        match serde_json::from_value::<SummaryRecord>(record) {
            Ok(r) => {
                summaries.insert(
                    id,
                    PlanSummary {
                        child_name: r.child_name,
                        age: r.age,
                    },
                );
            }
            Err(e) => tracing::warn!("Skipping unreadable plan record {}: {}", id, e),
        }
    }
    Ok(summaries)
}

fn parse_plan(id: &str, value: Value) -> Result<WeeklyPlan, StoreError> {
    if value.is_null() {
        return Err(StoreError::NotFound(id.to_string()));
    }
    let mut plan: WeeklyPlan = serde_json::from_value(value)
        .map_err(|e| StoreError::Unavailable(format!("malformed plan record {id}: {e}")))?;
    // The key is authoritative.
    plan.id = id.to_string();
    Ok(plan)
}

#[async_trait]
impl PlanStore for FirebaseStore {
    fn backend_tag(&self) -> &'static str {
        "firebase"
    }

    async fn create(&self, draft: PlanDraft) -> Result<WeeklyPlan, StoreError> {
        let mut id = None;
        for _ in 0..ID_ATTEMPTS {
            let candidate = new_plan_id();
            if !self.exists(&candidate).await? {
                id = Some(candidate);
                break;
            }
        }
        let id = id.ok_or_else(|| StoreError::Unavailable("could not allocate a plan id".into()))?;

        let plan = draft.with_id(id);
        self.send(self.client.put(self.node_url(Some(&plan.id))?).json(&plan))
            .await?;
        tracing::info!("Saved weekly plan {} for {}", plan.id, plan.child_name);
        Ok(plan)
    }

    async fn list(&self) -> Result<BTreeMap<String, PlanSummary>, StoreError> {
        let value = self.read_json(self.client.get(self.node_url(None)?)).await?;
        parse_listing(value)
    }

    async fn get(&self, id: &str) -> Result<WeeklyPlan, StoreError> {
        let value = self
            .read_json(self.client.get(self.node_url(Some(id))?))
            .await?;
        parse_plan(id, value)
    }

    async fn update_days(&self, id: &str, days: &[DayMeals]) -> Result<(), StoreError> {
        // PATCH on a missing node would create it.
        if !self.exists(id).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.send(
            self.client
                .patch(self.node_url(Some(id))?)
                .json(&json!({ "plan": days })),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        if !self.exists(id).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.send(self.client.delete(self.node_url(Some(id))?)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::{
        body::Bytes,
        extract::State,
        http::{Method, StatusCode, Uri},
        Json, Router,
    };

    use super::*;
    use crate::services::plans::{PlanError, PlanService};

    fn store() -> FirebaseStore {
        FirebaseStore::new(
            "https://nutricare-planner-default-rtdb.firebaseio.com/",
            "/weekly_plans/",
            None,
        )
        .unwrap()
    }

    /// Minimal stand-in for the Realtime Database REST surface: nodes keyed
    /// by request path, every request recorded as `METHOD path?query`.
    #[derive(Clone, Default)]
    struct MockDatabase {
        requests: Arc<Mutex<Vec<String>>>,
        nodes: Arc<Mutex<HashMap<String, Value>>>,
        fail_with: Arc<Mutex<Option<StatusCode>>>,
    }

    impl MockDatabase {
        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn node(&self, path: &str) -> Option<Value> {
            self.nodes.lock().unwrap().get(path).cloned()
        }
    }

    async fn answer(
        State(db): State<MockDatabase>,
        method: Method,
        uri: Uri,
        body: Bytes,
    ) -> (StatusCode, Json<Value>) {
        db.requests.lock().unwrap().push(format!("{method} {uri}"));
        if let Some(status) = *db.fail_with.lock().unwrap() {
            return (status, Json(json!({ "error": "Permission denied" })));
        }

        let path = uri.path().to_string();
        let shallow = uri.query().is_some_and(|q| q.contains("shallow=true"));
        let mut nodes = db.nodes.lock().unwrap();
        let reply = match method {
            Method::GET => match nodes.get(&path) {
                Some(_) if shallow => json!(true),
                Some(node) => node.clone(),
                None => Value::Null,
            },
            Method::PUT => {
                let node: Value = serde_json::from_slice(&body).unwrap();
                nodes.insert(path, node.clone());
                node
            }
            Method::PATCH => {
                let patch: Value = serde_json::from_slice(&body).unwrap();
                let node = nodes.entry(path).or_insert_with(|| json!({}));
                if let (Some(node), Some(fields)) = (node.as_object_mut(), patch.as_object()) {
                    for (key, value) in fields {
                        node.insert(key.clone(), value.clone());
                    }
                }
                patch
            }
            Method::DELETE => {
                nodes.remove(&path);
                Value::Null
            }
            _ => return (StatusCode::METHOD_NOT_ALLOWED, Json(Value::Null)),
        };
        (StatusCode::OK, Json(reply))
    }

    async fn serve(db: MockDatabase) -> String {
        let app = Router::new().fallback(answer).with_state(db);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve mock database") });
        format!("http://{addr}")
    }

    async fn mock_store(auth: Option<&str>) -> (MockDatabase, FirebaseStore) {
        let db = MockDatabase::default();
        let url = serve(db.clone()).await;
        let store = FirebaseStore::new(&url, "weekly_plans", auth.map(str::to_string)).unwrap();
        (db, store)
    }

    fn draft() -> PlanDraft {
        let mut days = DayMeals::blank_week();
        days[0].breakfast = "Oatmeal".into();
        PlanDraft {
            child_name: "Mia".into(),
            age: 6,
            email: "parent@example.com".into(),
            days,
        }
    }

    #[test]
    fn node_urls_follow_collection_layout() {
        let s = store();
        assert_eq!(
            s.node_url(None).unwrap().as_str(),
            "https://nutricare-planner-default-rtdb.firebaseio.com/weekly_plans.json"
        );
        assert_eq!(
            s.node_url(Some("ab12cd34")).unwrap().as_str(),
            "https://nutricare-planner-default-rtdb.firebaseio.com/weekly_plans/ab12cd34.json"
        );
    }

    #[test]
    fn ids_are_escaped_as_one_segment() {
        assert_eq!(
            store().node_url(Some("ab12cd34/plan")).unwrap().as_str(),
            "https://nutricare-planner-default-rtdb.firebaseio.com/weekly_plans/ab12cd34%2Fplan.json"
        );
    }

    #[test]
    fn rejects_non_http_urls_and_empty_collections() {
        assert!(FirebaseStore::new("not a url", "weekly_plans", None).is_err());
        assert!(FirebaseStore::new("ftp://example.com", "weekly_plans", None).is_err());
        assert!(FirebaseStore::new("https://example.com", "/", None).is_err());
    }

    #[test]
    fn null_collection_is_empty_listing() {
        assert!(parse_listing(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn listing_defaults_missing_names() {
        let listing = parse_listing(json!({
            "ab12cd34": { "id": "ab12cd34", "child_name": "Mia", "age": 6, "plan": [] },
            "ef56ab78": { "age": 9 }
        }))
        .unwrap();

        assert_eq!(listing.len(), 2);
        assert_eq!(listing["ab12cd34"].child_name, "Mia");
        assert_eq!(listing["ef56ab78"].child_name, "Unknown");
        assert_eq!(listing["ef56ab78"].age, 9);
    }

    #[test]
    fn null_record_is_not_found() {
        assert_eq!(
            parse_plan("gone", Value::Null).unwrap_err(),
            StoreError::NotFound("gone".into())
        );
    }

    #[test]
    fn record_key_overrides_stored_id() {
        let plan = parse_plan(
            "ab12cd34",
            json!({
                "id": "stale",
                "child_name": "Mia",
                "age": 6,
                "email": "",
                "plan": [{ "Day": "Monday", "Breakfast": "Toast" }]
            }),
        )
        .unwrap();
        assert_eq!(plan.id, "ab12cd34");
        assert_eq!(plan.days[0].breakfast, "Toast");
    }

    #[tokio::test]
    async fn create_puts_the_full_record() {
        let (db, store) = mock_store(None).await;
        let plan = store.create(draft()).await.unwrap();

        let path = format!("/weekly_plans/{}.json", plan.id);
        assert_eq!(
            db.requests(),
            vec![format!("GET {path}?shallow=true"), format!("PUT {path}")]
        );

        let record = db.node(&path).expect("record written");
        let mut keys: Vec<&str> = record.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["age", "child_name", "email", "id", "plan"]);
        assert_eq!(record["id"], json!(plan.id));
        assert_eq!(record["child_name"], "Mia");
        assert_eq!(record["age"], 6);
        assert_eq!(record["email"], "parent@example.com");
        assert_eq!(record["plan"].as_array().unwrap().len(), 7);
        assert_eq!(
            record["plan"][0],
            json!({ "Day": "Monday", "Breakfast": "Oatmeal", "Lunch": "", "Snack": "", "Dinner": "" })
        );
    }

    #[tokio::test]
    async fn update_patches_only_the_plan_field() {
        let (db, store) = mock_store(None).await;
        let plan = store.create(draft()).await.unwrap();

        let mut days = DayMeals::blank_week();
        days[6].dinner = "Pasta".into();
        store.update_days(&plan.id, &days).await.unwrap();

        let path = format!("/weekly_plans/{}.json", plan.id);
        assert!(db.requests().contains(&format!("PATCH {path}")));
        let stored = store.get(&plan.id).await.unwrap();
        assert_eq!(stored.days, days);
        assert_eq!(stored.child_name, "Mia");
        assert_eq!(stored.email, "parent@example.com");
    }

    #[tokio::test]
    async fn missing_record_is_never_written() {
        let (db, store) = mock_store(None).await;

        assert_eq!(
            store.update_days("deadbeef", &DayMeals::blank_week()).await,
            Err(StoreError::NotFound("deadbeef".into()))
        );
        assert_eq!(
            store.delete("deadbeef").await,
            Err(StoreError::NotFound("deadbeef".into()))
        );

        let requests = db.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.starts_with("GET ")));
        assert!(db.node("/weekly_plans/deadbeef.json").is_none());
    }

    #[tokio::test]
    async fn error_status_is_unavailable() {
        let (db, store) = mock_store(None).await;
        *db.fail_with.lock().unwrap() = Some(StatusCode::UNAUTHORIZED);

        assert!(matches!(store.list().await, Err(StoreError::Unavailable(_))));
        assert!(matches!(store.get("ab12cd34").await, Err(StoreError::Unavailable(_))));
        assert!(matches!(store.create(draft()).await, Err(StoreError::Unavailable(_))));
        assert!(db.requests().iter().all(|r| !r.starts_with("PUT ")));
    }

    #[tokio::test]
    async fn auth_travels_as_query_parameter() {
        let (db, store) = mock_store(Some("secret")).await;
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(db.requests(), ["GET /weekly_plans.json?auth=secret"]);
    }

    #[tokio::test]
    async fn nested_id_cannot_delete_part_of_a_plan() {
        let (db, store) = mock_store(None).await;
        let store = Arc::new(store);
        let plan = store.create(draft()).await.unwrap();
        let plans = PlanService::new(Some(store.clone() as Arc<dyn PlanStore>));
        let before = db.requests().len();

        let nested = format!("{}/plan", plan.id);
        assert_eq!(plans.delete(&nested).await, Err(PlanError::NotFound(nested.clone())));
        assert_eq!(
            plans.update(&nested, DayMeals::blank_week()).await,
            Err(PlanError::NotFound(nested))
        );

        assert_eq!(db.requests().len(), before);
        assert_eq!(store.get(&plan.id).await.unwrap().days.len(), 7);
    }
}
