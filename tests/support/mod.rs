//! In-process Taskerrand backend for integration tests.
//!
//! Tokens map to users: `poster` (1), `seeker` (2), `other` (3), `admin` (9).
//! Every request is recorded as `"METHOD /path"` so tests can count calls.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};

use taskerrand::api::ApiClient;
use taskerrand::auth::{AuthBridge, Identity, StaticTokenProvider};

pub const POSTER: i64 = 1;
pub const SEEKER: i64 = 2;
pub const OTHER: i64 = 3;
pub const ADMIN: i64 = 9;

#[derive(Default)]
pub struct MockState {
    pub tokens: HashMap<String, i64>,
    pub users: BTreeMap<i64, Value>,
    pub tasks: BTreeMap<i64, Value>,
    pub messages: Vec<Value>,
    pub notifications: Vec<Value>,
    pub reports: Vec<Value>,
    pub feedback: Vec<Value>,
    pub uploads: Vec<(String, String)>,
    pub calls: Vec<String>,
    pub next_id: i64,
}

#[derive(Clone, Default)]
pub struct Mock {
    pub state: Arc<Mutex<MockState>>,
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

pub fn user(id: i64, name: &str, email: &str, is_admin: bool) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": email,
        "first_name": name.split(' ').next().unwrap_or(name),
        "last_name": name.split(' ').nth(1).unwrap_or(""),
        "address": "",
        "is_admin": is_admin,
        "created_at": "2025-01-01T00:00:00"
    })
}

impl Mock {
    pub fn new() -> Self {
        let mock = Self::default();
        {
            let mut s = mock.state.lock().unwrap();
            for (token, id) in [("poster", POSTER), ("seeker", SEEKER), ("other", OTHER), ("admin", ADMIN)] {
                s.tokens.insert(token.to_string(), id);
            }
            s.users.insert(POSTER, user(POSTER, "Ana Cruz", "ana@example.com", false));
            s.users.insert(SEEKER, user(SEEKER, "Ben Reyes", "ben@example.com", false));
            s.users.insert(OTHER, user(OTHER, "Cy Santos", "cy@example.com", false));
            s.users.insert(ADMIN, user(ADMIN, "Admin", "admin@example.com", true));
            s.next_id = 100;
        }
        mock
    }

    /// Insert a task posted by `poster` and return its id.
    pub fn add_task(&self, title: &str, status: &str, seeker: Option<i64>) -> i64 {
        let mut s = self.state.lock().unwrap();
        s.next_id += 1;
        let id = s.next_id;
        s.tasks.insert(
            id,
            json!({
                "id": id,
                "title": title,
                "description": format!("{} description", title),
                "payment": 250.0,
                "status": status,
                "poster_id": POSTER,
                "seeker_id": seeker,
                "location_lat": 14.6,
                "location_lng": 121.0,
                "location_address": "Quezon City",
                "schedule": "2030-01-01T10:00:00",
                "contact_number": "09171234567",
                "created_at": "2025-01-01T00:00:00"
            }),
        );
        id
    }

    pub fn add_notification(&self, id: i64, task_id: Option<i64>, seen: bool) {
        self.state.lock().unwrap().notifications.push(json!({
            "id": id,
            "task_id": task_id,
            "title": format!("Notification {}", id),
            "message": "Your task was accepted",
            "notif_type": "task_accepted",
            "seen": seen,
            "created_at": "2025-01-01T00:00:00"
        }));
    }

    pub fn add_report(&self, id: i64, task_id: i64) {
        self.state.lock().unwrap().reports.push(json!({
            "id": id,
            "task_id": task_id,
            "reporter_id": OTHER,
            "report_type": "scam",
            "description": "Looks fake",
            "created_at": "2025-01-01T00:00:00"
        }));
    }

    pub fn task(&self, id: i64) -> Option<Value> {
        self.state.lock().unwrap().tasks.get(&id).cloned()
    }

    pub fn set_task_field(&self, id: i64, field: &str, value: Value) {
        if let Some(task) = self.state.lock().unwrap().tasks.get_mut(&id) {
            task[field] = value;
        }
    }

    pub fn calls(&self, needle: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.as_str() == needle)
            .count()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/users/me", get(me).put(update_me))
            .route("/api/users/me/tasks", get(my_tasks))
            .route("/api/users/{id}", get(user_by_id))
            .route("/api/users/{id}/feedback", get(user_feedback))
            .route("/api/tasks", get(list_tasks).post(create_task))
            .route("/api/tasks/search", get(search_tasks))
            .route("/api/tasks/{id}", get(get_task).put(update_task).delete(delete_task))
            .route("/api/tasks/{id}/accept", post(accept_task))
            .route("/api/tasks/{id}/complete", post(complete_task))
            .route("/api/tasks/{id}/confirm", post(confirm_task))
            .route("/api/tasks/{id}/cancel", post(cancel_task))
            .route("/api/tasks/{id}/proof", post(upload_proof))
            .route("/api/tasks/{id}/messages", get(task_messages))
            .route("/api/messages", post(send_message))
            .route("/api/feedback", post(create_feedback))
            .route("/api/admin/users", get(admin_users))
            .route("/api/admin/tasks", get(admin_tasks))
            .route("/api/admin/tasks/{id}", delete(admin_delete_task))
            .route("/api/reports", get(list_reports).post(create_report))
            .route("/api/reports/{id}", get(get_report).delete(delete_report))
            .route("/api/notifications", get(list_notifications))
            .route("/api/notifications/{id}", delete(delete_notification))
            .route("/api/notifications/{id}/read", put(read_notification))
            .layer(middleware::from_fn_with_state(self.clone(), record))
            .with_state(self.clone())
    }

    /// Serve on an ephemeral port and return the base URL.
    pub async fn spawn(&self) -> String {
        serve(self.router()).await
    }
}

pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Client authenticated with one of the mock tokens.
pub fn client(base_url: &str, token: &str) -> ApiClient {
    let provider = StaticTokenProvider::new(Some(token.to_string()), Identity::default());
    ApiClient::new(
        base_url,
        AuthBridge::new(Arc::new(provider)),
        Duration::from_secs(5),
    )
    .unwrap()
}

async fn record(State(mock): State<Mock>, req: Request, next: Next) -> Response {
    let line = format!("{} {}", req.method(), req.uri().path());
    mock.state.lock().unwrap().calls.push(line);
    next.run(req).await
}

fn viewer(mock: &Mock, headers: &HeaderMap) -> Result<i64, Response> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();
    mock.state
        .lock()
        .unwrap()
        .tokens
        .get(token)
        .copied()
        .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Invalid authentication credentials"))
}

fn is_admin(s: &MockState, id: i64) -> bool {
    s.users.get(&id).is_some_and(|u| u["is_admin"] == json!(true))
}

macro_rules! authed {
    ($mock:expr, $headers:expr) => {
        match viewer(&$mock, &$headers) {
            Ok(id) => id,
            Err(resp) => return resp,
        }
    };
}

// ── users ────────────────────────────────────────────────────────────

async fn me(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    let me = authed!(mock, headers);
    let s = mock.state.lock().unwrap();
    Json(s.users[&me].clone()).into_response()
}

async fn update_me(State(mock): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let me = authed!(mock, headers);
    let mut s = mock.state.lock().unwrap();
    let Some(user) = s.users.get_mut(&me) else {
        return detail(StatusCode::NOT_FOUND, "User not found");
    };
    if let Some(fields) = body.as_object() {
        for (k, v) in fields {
            user[k] = v.clone();
        }
    }
    Json(user.clone()).into_response()
}

async fn user_by_id(State(mock): State<Mock>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    authed!(mock, headers);
    match mock.state.lock().unwrap().users.get(&id) {
        Some(u) => Json(u.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn user_feedback(State(mock): State<Mock>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    authed!(mock, headers);
    let s = mock.state.lock().unwrap();
    let list: Vec<Value> = s
        .feedback
        .iter()
        .filter(|f| f["seeker_id"] == json!(id))
        .cloned()
        .collect();
    Json(list).into_response()
}

// ── tasks ────────────────────────────────────────────────────────────

fn with_status(tasks: impl Iterator<Item = Value>, status: Option<&String>) -> Vec<Value> {
    tasks
        .filter(|t| status.is_none_or(|s| t["status"] == json!(s)))
        .collect()
}

async fn my_tasks(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    let me = authed!(mock, headers);
    let s = mock.state.lock().unwrap();
    let list: Vec<Value> = s
        .tasks
        .values()
        .filter(|t| t["poster_id"] == json!(me) || t["seeker_id"] == json!(me))
        .cloned()
        .collect();
    Json(list).into_response()
}

async fn list_tasks(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    authed!(mock, headers);
    let s = mock.state.lock().unwrap();
    Json(with_status(s.tasks.values().cloned(), q.get("status_filter"))).into_response()
}

async fn search_tasks(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    authed!(mock, headers);
    let needle = q.get("query").map(|s| s.to_lowercase()).unwrap_or_default();
    let s = mock.state.lock().unwrap();
    let hits = s.tasks.values().filter(|t| {
        t["title"]
            .as_str()
            .is_some_and(|title| title.to_lowercase().contains(&needle))
    });
    Json(with_status(hits.cloned(), q.get("status_filter"))).into_response()
}

async fn get_task(State(mock): State<Mock>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    authed!(mock, headers);
    match mock.task(id) {
        Some(t) => Json(t).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn create_task(State(mock): State<Mock>, headers: HeaderMap, Json(mut body): Json<Value>) -> Response {
    let me = authed!(mock, headers);
    let mut s = mock.state.lock().unwrap();
    s.next_id += 1;
    let id = s.next_id;
    body["id"] = json!(id);
    body["poster_id"] = json!(me);
    body["status"] = json!("available");
    body["seeker_id"] = Value::Null;
    s.tasks.insert(id, body.clone());
    Json(body).into_response()
}

async fn update_task(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let me = authed!(mock, headers);
    let mut s = mock.state.lock().unwrap();
    let Some(task) = s.tasks.get_mut(&id) else {
        return detail(StatusCode::NOT_FOUND, "Task not found");
    };
    if task["poster_id"] != json!(me) {
        return detail(StatusCode::FORBIDDEN, "Not authorized to update this task");
    }
    if let Some(fields) = body.as_object() {
        for (k, v) in fields {
            task[k] = v.clone();
        }
    }
    Json(task.clone()).into_response()
}

async fn delete_task(State(mock): State<Mock>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    authed!(mock, headers);
    mock.state.lock().unwrap().tasks.remove(&id);
    StatusCode::NO_CONTENT.into_response()
}

/// Apply a lifecycle transition under the lock.
fn transition(
    mock: &Mock,
    id: i64,
    apply: impl FnOnce(&mut Value) -> Result<(), &'static str>,
) -> Response {
    let mut s = mock.state.lock().unwrap();
    let Some(task) = s.tasks.get_mut(&id) else {
        return detail(StatusCode::NOT_FOUND, "Task not found");
    };
    match apply(task) {
        Ok(()) => Json(task.clone()).into_response(),
        Err(msg) => detail(StatusCode::BAD_REQUEST, msg),
    }
}

async fn accept_task(State(mock): State<Mock>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let me = authed!(mock, headers);
    transition(&mock, id, |t| {
        if t["status"] != json!("available") {
            return Err("Task is not available");
        }
        if t["poster_id"] == json!(me) {
            return Err("Cannot accept your own task");
        }
        t["status"] = json!("ongoing");
        t["seeker_id"] = json!(me);
        Ok(())
    })
}

async fn complete_task(State(mock): State<Mock>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let me = authed!(mock, headers);
    transition(&mock, id, |t| {
        if t["seeker_id"] != json!(me) {
            return Err("Only the seeker can mark this task as done");
        }
        if t["status"] != json!("ongoing") {
            return Err("Task is not ongoing");
        }
        t["status"] = json!("pending_confirmation");
        Ok(())
    })
}

async fn confirm_task(State(mock): State<Mock>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let me = authed!(mock, headers);
    transition(&mock, id, |t| {
        if t["poster_id"] != json!(me) {
            return Err("Only the poster can confirm completion");
        }
        if t["status"] != json!("pending_confirmation") {
            return Err("Task is not pending confirmation");
        }
        t["status"] = json!("completed");
        Ok(())
    })
}

async fn cancel_task(State(mock): State<Mock>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let me = authed!(mock, headers);
    transition(&mock, id, |t| {
        if t["poster_id"] != json!(me) {
            return Err("Only the poster can cancel this task");
        }
        if t["status"] != json!("available") && t["status"] != json!("ongoing") {
            return Err("Task cannot be cancelled");
        }
        t["status"] = json!("cancelled");
        Ok(())
    })
}

async fn upload_proof(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Response {
    authed!(mock, headers);
    let mut received = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or_default().to_string();
            let mime = field.content_type().unwrap_or_default().to_string();
            let _ = field.bytes().await;
            received = Some((name, mime));
        }
    }
    let Some((name, mime)) = received else {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "file is required");
    };
    mock.state.lock().unwrap().uploads.push((name.clone(), mime));
    transition(&mock, id, |t| {
        t["proof_image"] = json!(format!("/uploads/{}", name));
        Ok(())
    })
}

// ── messages and feedback ────────────────────────────────────────────

async fn task_messages(State(mock): State<Mock>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    authed!(mock, headers);
    let s = mock.state.lock().unwrap();
    let list: Vec<Value> = s
        .messages
        .iter()
        .filter(|m| m["task_id"] == json!(id))
        .cloned()
        .collect();
    Json(list).into_response()
}

async fn send_message(State(mock): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let me = authed!(mock, headers);
    let mut s = mock.state.lock().unwrap();
    s.next_id += 1;
    let message = json!({
        "id": s.next_id,
        "task_id": body["task_id"],
        "sender_id": me,
        "content": body["content"],
        "created_at": "2025-01-01T12:00:00"
    });
    s.messages.push(message.clone());
    Json(message).into_response()
}

async fn create_feedback(State(mock): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let me = authed!(mock, headers);
    let mut s = mock.state.lock().unwrap();
    s.next_id += 1;
    let mut feedback = body.clone();
    feedback["id"] = json!(s.next_id);
    feedback["poster_id"] = json!(me);
    feedback["created_at"] = json!("2025-01-02T09:00:00");
    if let Some(task) = body["task_id"].as_i64().and_then(|id| s.tasks.get_mut(&id)) {
        task["feedback"] = feedback.clone();
    }
    s.feedback.push(feedback.clone());
    Json(feedback).into_response()
}

// ── admin ────────────────────────────────────────────────────────────

async fn admin_users(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    let me = authed!(mock, headers);
    let s = mock.state.lock().unwrap();
    if !is_admin(&s, me) {
        return detail(StatusCode::FORBIDDEN, "Admin access required");
    }
    Json(s.users.values().cloned().collect::<Vec<_>>()).into_response()
}

async fn admin_tasks(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let me = authed!(mock, headers);
    let s = mock.state.lock().unwrap();
    if !is_admin(&s, me) {
        return detail(StatusCode::FORBIDDEN, "Admin access required");
    }
    Json(with_status(s.tasks.values().cloned(), q.get("status_filter"))).into_response()
}

async fn admin_delete_task(State(mock): State<Mock>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let me = authed!(mock, headers);
    let mut s = mock.state.lock().unwrap();
    if !is_admin(&s, me) {
        return detail(StatusCode::FORBIDDEN, "Admin access required");
    }
    s.tasks.remove(&id);
    StatusCode::NO_CONTENT.into_response()
}

// ── reports ──────────────────────────────────────────────────────────

async fn list_reports(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    authed!(mock, headers);
    Json(mock.state.lock().unwrap().reports.clone()).into_response()
}

async fn create_report(State(mock): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let me = authed!(mock, headers);
    let mut s = mock.state.lock().unwrap();
    s.next_id += 1;
    let mut report = body;
    report["id"] = json!(s.next_id);
    report["reporter_id"] = json!(me);
    s.reports.push(report.clone());
    Json(report).into_response()
}

async fn get_report(State(mock): State<Mock>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    authed!(mock, headers);
    let s = mock.state.lock().unwrap();
    match s.reports.iter().find(|r| r["id"] == json!(id)) {
        Some(r) => Json(r.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Report not found"),
    }
}

async fn delete_report(State(mock): State<Mock>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    authed!(mock, headers);
    mock.state
        .lock()
        .unwrap()
        .reports
        .retain(|r| r["id"] != json!(id));
    StatusCode::NO_CONTENT.into_response()
}

// ── notifications ────────────────────────────────────────────────────

async fn list_notifications(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    authed!(mock, headers);
    Json(mock.state.lock().unwrap().notifications.clone()).into_response()
}

async fn read_notification(State(mock): State<Mock>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    authed!(mock, headers);
    let mut s = mock.state.lock().unwrap();
    for n in s.notifications.iter_mut().filter(|n| n["id"] == json!(id)) {
        n["seen"] = json!(true);
    }
    Json(json!({ "message": "Notification marked as read" })).into_response()
}

async fn delete_notification(State(mock): State<Mock>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    authed!(mock, headers);
    mock.state
        .lock()
        .unwrap()
        .notifications
        .retain(|n| n["id"] != json!(id));
    StatusCode::NO_CONTENT.into_response()
}
