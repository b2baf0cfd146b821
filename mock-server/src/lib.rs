//! In-process emulator of the cnstrc service, used by end-to-end tests.
//!
//! Search-style endpoints answer canned but parameter-dependent results and
//! echo the query they received under `request`. Catalog endpoints keep an
//! in-memory store so writes are visible to later reads, and every write
//! records a task that `/v1/tasks` reports.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, State},
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const TEST_API_KEY: &str = "key-test";
pub const TEST_API_TOKEN: &str = "tok-test";

/// Total number of results every search and browse listing pretends to have.
pub const TOTAL_RESULTS: usize = 45;

const DEFAULT_PER_PAGE: usize = 20;

#[derive(Clone, Debug)]
pub struct Credentials {
    pub api_key: String,
    pub api_token: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            api_key: TEST_API_KEY.to_string(),
            api_token: TEST_API_TOKEN.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Task {
    pub id: u64,
    #[serde(rename = "type")]
    pub task_type: String,
    pub status: String,
    pub submission_time: String,
    /// Query the write was submitted with.
    pub request: Value,
}

#[derive(Default)]
pub struct Store {
    items: BTreeMap<String, Value>,
    variations: BTreeMap<String, Value>,
    item_groups: BTreeMap<String, Value>,
    tasks: Vec<Task>,
}

impl Store {
    fn record_task(&mut self, task_type: &str, request: Value) -> Value {
        let id = self.tasks.len() as u64 + 1;
        self.tasks.push(Task {
            id,
            task_type: task_type.to_string(),
            status: "DONE".to_string(),
            submission_time: "2024-01-01T00:00:00Z".to_string(),
            request,
        });
        json!({ "task_id": id, "task_status_path": format!("/v1/tasks/{id}") })
    }

    fn collection(&mut self, kind: Kind) -> &mut BTreeMap<String, Value> {
        match kind {
            Kind::Items => &mut self.items,
            Kind::Variations => &mut self.variations,
            Kind::ItemGroups => &mut self.item_groups,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    credentials: Credentials,
    store: Arc<RwLock<Store>>,
}

/// Error body in the service's format: `{"message": ...}`.
#[derive(Debug)]
pub struct ApiFailure(StatusCode, String);

impl ApiFailure {
    fn bad_request(message: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, message.into())
    }

    fn unprocessable(message: impl Into<String>) -> Self {
        Self(StatusCode::UNPROCESSABLE_ENTITY, message.into())
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self(StatusCode::NOT_FOUND, message.into())
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "message": self.1 }))).into_response()
    }
}

type Reply = Result<Json<Value>, ApiFailure>;

/// Query parameters in arrival order; keys may repeat.
pub struct Params(Vec<(String, String)>);

impl Params {
    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    fn all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    fn number(&self, key: &str, default: usize) -> Result<usize, ApiFailure> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value
                .parse()
                .map_err(|_| ApiFailure::bad_request(format!("{key} must be an integer"))),
        }
    }

    /// Single values as strings, repeated keys as arrays. Credentials are
    /// left out.
    fn echo(&self) -> Value {
        let mut echo = Map::new();
        for (key, value) in &self.0 {
            if key == "key" || key == "x-cnstrc-token" {
                continue;
            }
            let value = Value::String(value.clone());
            match echo.get_mut(key) {
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => *existing = Value::Array(vec![existing.clone(), value]),
                None => {
                    echo.insert(key.clone(), value);
                }
            }
        }
        Value::Object(echo)
    }
}

pub fn app() -> Router {
    app_with(Credentials::default())
}

pub fn app_with(credentials: Credentials) -> Router {
    let state = AppState {
        credentials,
        store: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/autocomplete/{query}", get(autocomplete))
        .route("/search/{query}", get(search))
        .route("/browse/items", get(browse_items))
        .route("/browse/groups", get(browse_groups))
        .route("/browse/facets", get(browse_facets))
        .route("/browse/facet_options", get(browse_facet_options))
        .route("/browse/{filter_name}/{filter_value}", get(browse))
        .route("/recommendations/v1/pods/{pod_id}", get(recommendations))
        .route("/v1/quizzes/{quiz_id}/next", get(quiz_next))
        .route("/v1/quizzes/{quiz_id}/finalize", get(quiz_finalize))
        .route("/v1/tasks", get(list_tasks))
        .route("/v1/tasks/{task_id}", get(get_task))
        .route("/v1/catalog", axum::routing::put(replace_catalog).patch(update_catalog))
        .route(
            "/v2/items",
            get(retrieve_items)
                .put(upsert_items)
                .patch(upsert_items)
                .delete(delete_items),
        )
        .route(
            "/v2/variations",
            get(retrieve_variations)
                .put(upsert_variations)
                .patch(upsert_variations)
                .delete(delete_variations),
        )
        .route(
            "/v1/item_groups",
            get(retrieve_item_groups)
                .post(create_item_groups)
                .put(replace_item_groups)
                .patch(update_item_groups)
                .delete(delete_item_groups),
        )
        .route("/v1/item_groups/{item_group_id}", get(retrieve_item_group))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn require_key(state: &AppState, params: &Params) -> Result<(), ApiFailure> {
    match params.get("key") {
        Some(key) if key == state.credentials.api_key => Ok(()),
        _ => Err(ApiFailure(
            StatusCode::UNAUTHORIZED,
            "You have supplied an invalid `key` or `autocomplete_key`.".to_string(),
        )),
    }
}

/// Catalog and task endpoints also need `Authorization: Basic base64(token:)`.
fn require_token(state: &AppState, params: &Params, headers: &HeaderMap) -> Result<(), ApiFailure> {
    require_key(state, params)?;
    let expected = format!("Basic {}", STANDARD.encode(format!("{}:", state.credentials.api_token)));
    match headers.get("authorization").and_then(|value| value.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(ApiFailure(
            StatusCode::UNAUTHORIZED,
            "Invalid auth_token. If you've forgotten your token, you can generate a new one in the dashboard".to_string(),
        )),
    }
}

fn results(prefix: &str, start: usize, count: usize) -> Vec<Value> {
    (start..start + count)
        .map(|n| {
            json!({
                "value": format!("{prefix} {}", n + 1),
                "data": { "id": (n + 1).to_string() },
            })
        })
        .collect()
}

fn listing(prefix: &str, params: &Params) -> Result<Value, ApiFailure> {
    let page = params.number("page", 1)?.max(1);
    let per_page = params.number("num_results_per_page", DEFAULT_PER_PAGE)?;
    let start = ((page - 1) * per_page).min(TOTAL_RESULTS);
    let count = per_page.min(TOTAL_RESULTS - start);
    Ok(json!({
        "results": results(prefix, start, count),
        "total_num_results": TOTAL_RESULTS,
        "facets": [],
        "groups": [],
    }))
}

async fn autocomplete(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    let params = Params(params);
    require_key(&state, &params)?;
    debug!(%query, "autocomplete");

    let per_section = |section: &str| {
        params.number(&format!("num_results_{section}"), 2)
    };
    Ok(Json(json!({
        "result_id": Uuid::new_v4().to_string(),
        "request": params.echo(),
        "sections": {
            "Products": results(&query, 0, per_section("Products")?),
            "Search Suggestions": results(&query, 0, per_section("Search Suggestions")?),
        },
    })))
}

async fn search(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    let params = Params(params);
    require_key(&state, &params)?;
    debug!(%query, "search");

    let response = if query == "redirect" {
        json!({ "redirect": { "data": { "url": "/sale", "match_id": 1 } } })
    } else {
        listing(&query, &params)?
    };
    Ok(Json(json!({
        "result_id": Uuid::new_v4().to_string(),
        "request": params.echo(),
        "response": response,
    })))
}

async fn browse(
    State(state): State<AppState>,
    Path((filter_name, filter_value)): Path<(String, String)>,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    let params = Params(params);
    require_key(&state, &params)?;
    let mut request = params.echo();
    request["browse_filter_name"] = json!(filter_name);
    request["browse_filter_value"] = json!(filter_value);
    Ok(Json(json!({
        "result_id": Uuid::new_v4().to_string(),
        "request": request,
        "response": listing(&filter_value, &params)?,
    })))
}

async fn browse_items(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    let params = Params(params);
    require_key(&state, &params)?;
    let ids = params.all("ids");
    if ids.is_empty() {
        return Err(ApiFailure::bad_request("ids is required"));
    }
    let results: Vec<Value> = ids
        .iter()
        .map(|id| json!({ "value": format!("item {id}"), "data": { "id": id } }))
        .collect();
    Ok(Json(json!({
        "result_id": Uuid::new_v4().to_string(),
        "request": params.echo(),
        "response": { "results": results, "total_num_results": ids.len() },
    })))
}

async fn browse_groups(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    let params = Params(params);
    require_key(&state, &params)?;
    Ok(Json(json!({
        "request": params.echo(),
        "response": {
            "groups": [{ "group_id": "all", "display_name": "All", "count": TOTAL_RESULTS }],
        },
    })))
}

async fn browse_facets(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    let params = Params(params);
    require_key(&state, &params)?;
    Ok(Json(json!({
        "request": params.echo(),
        "response": {
            "facets": [
                { "name": "color", "display_name": "Color", "type": "multiple" },
                { "name": "price", "display_name": "Price", "type": "range" },
            ],
            "total_num_results": 2,
        },
    })))
}

async fn browse_facet_options(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    let params = Params(params);
    require_key(&state, &params)?;
    let facet_name = params
        .get("facet_name")
        .ok_or_else(|| ApiFailure::bad_request("facet_name is required"))?;
    Ok(Json(json!({
        "request": params.echo(),
        "response": {
            "facets": [{
                "name": facet_name,
                "options": [{ "value": "red", "count": 3 }, { "value": "blue", "count": 1 }],
            }],
        },
    })))
}

async fn recommendations(
    State(state): State<AppState>,
    Path(pod_id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    let params = Params(params);
    require_key(&state, &params)?;
    if pod_id == "unknown_pod" {
        return Err(ApiFailure::bad_request(format!("Pod {pod_id} does not exist")));
    }
    let count = params.number("num_results", 5)?;
    Ok(Json(json!({
        "result_id": Uuid::new_v4().to_string(),
        "request": params.echo(),
        "response": {
            "pod": { "id": pod_id, "display_name": "Recommended" },
            "results": results("recommended", 0, count),
            "total_num_results": count,
        },
    })))
}

async fn quiz_next(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    let params = Params(params);
    require_key(&state, &params)?;
    let answered = params.all("a").len();
    Ok(Json(json!({
        "quiz_id": quiz_id,
        "version_id": params.get("version_id").unwrap_or("v-1"),
        "next_question": {
            "id": answered + 1,
            "title": format!("Question {}", answered + 1),
            "type": "multiple",
            "options": [{ "id": 1, "value": "Yes" }, { "id": 2, "value": "No" }],
        },
        "is_last_question": answered >= 2,
    })))
}

async fn quiz_finalize(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    let params = Params(params);
    require_key(&state, &params)?;
    let answers = params.all("a");
    if answers.is_empty() {
        return Err(ApiFailure::bad_request("a is a required parameter"));
    }
    Ok(Json(json!({
        "quiz_id": quiz_id,
        "version_id": params.get("version_id").unwrap_or("v-1"),
        "result": {
            "filter_expression": { "answers": answers },
            "results_url": format!("/browse/quiz/{quiz_id}"),
        },
    })))
}

async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    let params = Params(params);
    require_token(&state, &params, &headers)?;
    let page = params.number("page", 1)?.max(1);
    let per_page = params.number("num_results_per_page", DEFAULT_PER_PAGE)?;

    let store = state.store.read().await;
    let matching: Vec<&Task> = store
        .tasks
        .iter()
        .filter(|task| params.get("status").map_or(true, |status| task.status == status))
        .filter(|task| params.get("type").map_or(true, |kind| task.task_type == kind))
        .collect();
    let mut status_counts = Map::new();
    for task in &matching {
        let count = status_counts
            .get(&task.status)
            .and_then(Value::as_u64)
            .unwrap_or(0);
        status_counts.insert(task.status.clone(), json!(count + 1));
    }
    let tasks: Vec<&Task> = matching
        .iter()
        .copied()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();
    Ok(Json(json!({
        "total_count": matching.len(),
        "status_counts": status_counts,
        "tasks": tasks,
    })))
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<u64>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    let params = Params(params);
    require_token(&state, &params, &headers)?;
    let store = state.store.read().await;
    let task = store
        .tasks
        .iter()
        .find(|task| task.id == task_id)
        .ok_or_else(|| ApiFailure::not_found(format!("Task {task_id} not found")))?;
    Ok(Json(json!(task)))
}

/// Data rows (lines after the header) in each uploaded CSV part.
async fn read_catalog_files(mut multipart: Multipart) -> Result<Map<String, Value>, ApiFailure> {
    let mut files = Map::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiFailure::bad_request(err.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if !matches!(name.as_str(), "items" | "variations" | "item_groups") {
            return Err(ApiFailure::bad_request(format!("unexpected file {name}")));
        }
        let text = field
            .text()
            .await
            .map_err(|err| ApiFailure::bad_request(err.body_text()))?;
        let rows = text.lines().skip(1).filter(|line| !line.trim().is_empty()).count();
        files.insert(name, json!(rows));
    }
    if files.is_empty() {
        return Err(ApiFailure::bad_request(
            "At least one of items, variations or item_groups is required",
        ));
    }
    Ok(files)
}

async fn ingest(state: AppState, params: Params, headers: HeaderMap, multipart: Multipart) -> Reply {
    require_token(&state, &params, &headers)?;
    let files = read_catalog_files(multipart).await?;
    debug!(files = ?files, "catalog upload");
    let mut request = params.echo();
    request["files"] = Value::Object(files);
    if let Some(length) = headers.get(CONTENT_LENGTH).and_then(|value| value.to_str().ok()) {
        request["content_length"] = json!(length);
    }
    let task = state.store.write().await.record_task("ingestion", request);
    Ok(Json(task))
}

async fn replace_catalog(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
    multipart: Multipart,
) -> Reply {
    ingest(state, Params(params), headers, multipart).await
}

async fn update_catalog(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
    multipart: Multipart,
) -> Reply {
    ingest(state, Params(params), headers, multipart).await
}

#[derive(Clone, Copy, Debug)]
enum Kind {
    Items,
    Variations,
    ItemGroups,
}

impl Kind {
    fn key(self) -> &'static str {
        match self {
            Kind::Items => "items",
            Kind::Variations => "variations",
            Kind::ItemGroups => "item_groups",
        }
    }
}

/// The non-empty record list under `kind.key()`, each with a string `id`.
fn records(kind: Kind, body: Result<Json<Value>, JsonRejection>) -> Result<Vec<Value>, ApiFailure> {
    let key = kind.key();
    let Json(body) = body.map_err(|rejection| ApiFailure::bad_request(rejection.body_text()))?;
    let records = match body.get(key) {
        None | Some(Value::Null) => {
            return Err(ApiFailure::unprocessable(format!("{key}: none is not an allowed value")))
        }
        Some(Value::Array(records)) => records.clone(),
        Some(_) => {
            return Err(ApiFailure::unprocessable(format!("{key}: value is not a valid list")))
        }
    };
    if records.is_empty() {
        return Err(ApiFailure::unprocessable(format!(
            "{key}: ensure this value has at least 1 items"
        )));
    }
    if records.iter().any(|record| !record.get("id").is_some_and(Value::is_string)) {
        return Err(ApiFailure::unprocessable(format!("{key}: every record needs a string id")));
    }
    Ok(records)
}

fn record_id(record: &Value) -> String {
    record
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

async fn upsert(
    kind: Kind,
    state: AppState,
    params: Params,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Reply {
    require_token(&state, &params, &headers)?;
    let records = records(kind, body)?;
    let mut store = state.store.write().await;
    let collection = store.collection(kind);
    for record in records {
        collection.insert(record_id(&record), record);
    }
    Ok(Json(store.record_task("ingestion", params.echo())))
}

async fn delete(
    kind: Kind,
    state: AppState,
    params: Params,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Reply {
    require_token(&state, &params, &headers)?;
    let records = records(kind, body)?;
    let mut store = state.store.write().await;
    let collection = store.collection(kind);
    for record in &records {
        collection.remove(&record_id(record));
    }
    Ok(Json(store.record_task("ingestion", params.echo())))
}

async fn retrieve(kind: Kind, state: AppState, params: Params, headers: HeaderMap) -> Reply {
    require_token(&state, &params, &headers)?;
    let page = params.number("page", 1)?.max(1);
    let per_page = params.number("num_results_per_page", 100)?;
    let ids = params.all("id");

    let mut store = state.store.write().await;
    let matching: Vec<Value> = store
        .collection(kind)
        .values()
        .filter(|record| ids.is_empty() || ids.contains(&record_id(record).as_str()))
        .filter(|record| {
            params
                .get("item_id")
                .map_or(true, |item_id| record.get("item_id").and_then(Value::as_str) == Some(item_id))
        })
        .cloned()
        .collect();
    let total_count = matching.len();
    let page_of: Vec<Value> = matching
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();
    let mut body = Map::new();
    body.insert(kind.key().to_string(), Value::Array(page_of));
    body.insert("total_count".to_string(), json!(total_count));
    Ok(Json(Value::Object(body)))
}

async fn upsert_items(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Reply {
    upsert(Kind::Items, state, Params(params), headers, body).await
}

async fn delete_items(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Reply {
    delete(Kind::Items, state, Params(params), headers, body).await
}

async fn retrieve_items(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    retrieve(Kind::Items, state, Params(params), headers).await
}

async fn upsert_variations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Reply {
    upsert(Kind::Variations, state, Params(params), headers, body).await
}

async fn delete_variations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Reply {
    delete(Kind::Variations, state, Params(params), headers, body).await
}

async fn retrieve_variations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    retrieve(Kind::Variations, state, Params(params), headers).await
}

/// How an item group write treats existing groups.
#[derive(Clone, Copy, PartialEq, Eq)]
enum GroupWrite {
    /// POST: only new ids are accepted.
    Create,
    /// PUT: groups not in the payload are deleted.
    Replace,
    /// PATCH: insert or overwrite.
    Upsert,
}

async fn write_item_groups(
    mode: GroupWrite,
    state: AppState,
    params: Params,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Reply {
    require_token(&state, &params, &headers)?;
    let records = records(Kind::ItemGroups, body)?;
    let mut store = state.store.write().await;

    let ids: Vec<String> = records.iter().map(record_id).collect();
    if mode == GroupWrite::Create {
        if let Some(id) = ids.iter().find(|id| store.item_groups.contains_key(*id)) {
            return Err(ApiFailure::unprocessable(format!("Item group {id} already exists")));
        }
    }
    let mut deleted = 0;
    if mode == GroupWrite::Replace {
        let before = store.item_groups.len();
        store.item_groups.retain(|id, _| ids.contains(id));
        deleted = before - store.item_groups.len();
    }
    let (mut inserted, mut updated) = (0, 0);
    for (id, record) in ids.into_iter().zip(records) {
        if store.item_groups.insert(id, record).is_some() {
            updated += 1;
        } else {
            inserted += 1;
        }
    }
    Ok(Json(json!({
        "item_groups": {
            "processed": inserted + updated,
            "inserted": inserted,
            "updated": updated,
            "deleted": deleted,
        },
    })))
}

async fn create_item_groups(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Reply {
    write_item_groups(GroupWrite::Create, state, Params(params), headers, body).await
}

async fn replace_item_groups(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Reply {
    write_item_groups(GroupWrite::Replace, state, Params(params), headers, body).await
}

async fn update_item_groups(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Reply {
    write_item_groups(GroupWrite::Upsert, state, Params(params), headers, body).await
}

async fn retrieve_item_groups(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    retrieve(Kind::ItemGroups, state, Params(params), headers).await
}

async fn retrieve_item_group(
    State(state): State<AppState>,
    Path(item_group_id): Path<String>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    let params = Params(params);
    require_token(&state, &params, &headers)?;
    let store = state.store.read().await;
    store
        .item_groups
        .get(&item_group_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::not_found("Item group not found"))
}

async fn delete_item_groups(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Reply {
    let params = Params(params);
    require_token(&state, &params, &headers)?;
    state.store.write().await.item_groups.clear();
    Ok(Json(json!({
        "message": "We've started deleting all of your groups. This may take some time to complete.",
    })))
}
