//! REST client for the Taskerrand backend.
//!
//! Every call goes through [`ApiClient::request`], which attaches a fresh
//! bearer token, normalizes backend errors into [`ApiError`] and treats
//! `204 No Content` as "no body". The resource methods below are plain
//! parameter-to-path mappings; validation belongs to the callers.

use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth::AuthBridge;
use crate::errors::ApiError;
use crate::models::{
    Feedback, FeedbackPayload, Id, Message, MessagePayload, Notification, ProfileUpdate, Report,
    ReportPayload, Task, TaskPayload, TaskStatus, User,
};

const AUTHORIZATION: &str = "authorization";
const CONTENT_TYPE: &str = "content-type";

/// Request body variants.
#[derive(Debug, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(reqwest::multipart::Form),
}

/// Per-call options for [`ApiClient::request`].
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub body: Body,
    /// Extra headers, merged over the defaults.
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn json<T: Serialize>(payload: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(payload).map_err(|e| ApiError::Decode {
            endpoint: "request body".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            body: Body::Json(value),
            ..Default::default()
        })
    }

    pub fn query(pairs: Vec<(String, String)>) -> Self {
        Self {
            query: pairs,
            ..Default::default()
        }
    }
}

/// Which side of "my tasks" to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRole {
    Posted,
    Accepted,
}

impl TaskRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskRole::Posted => "posted",
            TaskRole::Accepted => "accepted",
        }
    }
}

/// Merge caller headers over the defaults.
///
/// Names compare case-insensitively and a caller header replaces the default
/// of the same name, with one exception: `Authorization` always carries the
/// bridge's token.
pub fn merge_headers(
    defaults: &[(String, String)],
    caller: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = defaults.to_vec();
    for (name, value) in caller {
        if name.eq_ignore_ascii_case(AUTHORIZATION) {
            tracing::debug!("ignoring caller-supplied Authorization header");
            continue;
        }
        match merged
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value.clone(),
            None => merged.push((name.clone(), value.clone())),
        }
    }
    merged
}

/// User-facing message for a non-2xx response.
///
/// A JSON body's `detail` wins. FastAPI validation errors arrive as a list
/// of objects with a `msg` field; those are joined. A body that is not JSON
/// falls back to the reason phrase, and anything else to
/// `HTTP error! status: <code>`.
pub fn error_message(status: u16, reason: Option<&str>, body: &str) -> String {
    let fallback = || format!("HTTP error! status: {}", status);
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => match json.get("detail") {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Array(items)) if !items.is_empty() => items
                .iter()
                .map(|item| match item.get("msg").and_then(|m| m.as_str()) {
                    Some(msg) => msg.to_string(),
                    None => item.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; "),
            Some(serde_json::Value::Null) | None => fallback(),
            Some(serde_json::Value::String(_)) | Some(serde_json::Value::Array(_)) => fallback(),
            Some(other) => other.to_string(),
        },
        Err(_) => match reason {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => fallback(),
        },
    }
}

fn to_header_map(pairs: &[(String, String)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(n), Ok(v)) => {
                map.insert(n, v);
            }
            _ => tracing::warn!(header = %name, "dropping malformed header"),
        }
    }
    map
}

/// Authenticated client. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: AuthBridge,
}

impl ApiClient {
    pub fn new(base_url: &str, auth: AuthBridge, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Network)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn auth(&self) -> &AuthBridge {
        &self.auth
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request. `Ok(None)` means the backend returned no body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        opts: RequestOptions,
    ) -> Result<Option<T>, ApiError> {
        let token = self.auth.token().await?;
        let url = format!("{}{}", self.base_url, endpoint);

        let mut defaults = vec![(AUTHORIZATION.to_string(), format!("Bearer {}", token))];
        // Multipart bodies need reqwest's boundary content type.
        if !matches!(opts.body, Body::Multipart(_)) {
            defaults.push((CONTENT_TYPE.to_string(), "application/json".to_string()));
        }
        let headers = merge_headers(&defaults, &opts.headers);

        tracing::debug!(method = %method, endpoint, "api request");

        let mut builder = self
            .http
            .request(method, &url)
            .headers(to_header_map(&headers));
        if !opts.query.is_empty() {
            builder = builder.query(&opts.query);
        }
        builder = match opts.body {
            Body::Empty => builder,
            Body::Json(value) => builder.body(value.to_string()),
            Body::Multipart(form) => builder.multipart(form),
        };

        let resp = builder.send().await.map_err(ApiError::Network)?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = error_message(status.as_u16(), status.canonical_reason(), &body);
            tracing::debug!(status = status.as_u16(), endpoint, %message, "api error");
            return Err(ApiError::from_status(status.as_u16(), message));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = resp.bytes().await.map_err(ApiError::Network)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ApiError::Decode {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        opts: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(method, endpoint, opts)
            .await?
            .ok_or_else(|| ApiError::Decode {
                endpoint: endpoint.to_string(),
                message: "empty response body".to_string(),
            })
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.fetch(Method::GET, endpoint, RequestOptions::default())
            .await
    }

    async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.fetch(Method::POST, endpoint, RequestOptions::default())
            .await
    }

    async fn send_json<P: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        payload: &P,
    ) -> Result<T, ApiError> {
        self.fetch(method, endpoint, RequestOptions::json(payload)?)
            .await
    }

    async fn no_content(&self, method: Method, endpoint: &str) -> Result<(), ApiError> {
        self.request::<serde_json::Value>(method, endpoint, RequestOptions::default())
            .await
            .map(|_| ())
    }

    // ── users ────────────────────────────────────────────────────────

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/api/users/me").await
    }

    pub async fn user(&self, user_id: &Id) -> Result<User, ApiError> {
        self.get(&format!("/api/users/{}", user_id)).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.send_json(Method::PUT, "/api/users/me", update).await
    }

    pub async fn my_tasks(&self, role: Option<TaskRole>) -> Result<Vec<Task>, ApiError> {
        let query = role
            .map(|r| vec![("task_type".to_string(), r.as_str().to_string())])
            .unwrap_or_default();
        self.fetch(Method::GET, "/api/users/me/tasks", RequestOptions::query(query))
            .await
    }

    // ── tasks ────────────────────────────────────────────────────────

    pub async fn tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, ApiError> {
        self.fetch(Method::GET, "/api/tasks", status_query(status))
            .await
    }

    pub async fn task(&self, task_id: &Id) -> Result<Task, ApiError> {
        self.get(&format!("/api/tasks/{}", task_id)).await
    }

    pub async fn create_task(&self, payload: &TaskPayload) -> Result<Task, ApiError> {
        self.send_json(Method::POST, "/api/tasks", payload).await
    }

    pub async fn update_task(&self, task_id: &Id, payload: &TaskPayload) -> Result<Task, ApiError> {
        self.send_json(Method::PUT, &format!("/api/tasks/{}", task_id), payload)
            .await
    }

    pub async fn delete_task(&self, task_id: &Id) -> Result<(), ApiError> {
        self.no_content(Method::DELETE, &format!("/api/tasks/{}", task_id))
            .await
    }

    pub async fn accept_task(&self, task_id: &Id) -> Result<Task, ApiError> {
        self.post_empty(&format!("/api/tasks/{}/accept", task_id))
            .await
    }

    pub async fn complete_task(&self, task_id: &Id) -> Result<Task, ApiError> {
        self.post_empty(&format!("/api/tasks/{}/complete", task_id))
            .await
    }

    pub async fn confirm_task(&self, task_id: &Id) -> Result<Task, ApiError> {
        self.post_empty(&format!("/api/tasks/{}/confirm", task_id))
            .await
    }

    pub async fn cancel_task(&self, task_id: &Id) -> Result<Task, ApiError> {
        self.post_empty(&format!("/api/tasks/{}/cancel", task_id))
            .await
    }

    /// Title substring search. Blank queries are omitted.
    pub async fn search_tasks(
        &self,
        query: Option<&str>,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, ApiError> {
        let mut pairs = Vec::new();
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            pairs.push(("query".to_string(), q.to_string()));
        }
        if let Some(s) = status {
            pairs.push(("status_filter".to_string(), s.as_str().to_string()));
        }
        self.fetch(Method::GET, "/api/tasks/search", RequestOptions::query(pairs))
            .await
    }

    /// Upload a proof image as multipart field `file`.
    pub async fn upload_proof(&self, task_id: &Id, path: &Path) -> Result<Task, ApiError> {
        let data = tokio::fs::read(path).await.map_err(|source| ApiError::Upload {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "proof".to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name)
            .mime_str(mime.as_ref())
            .map_err(ApiError::Network)?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let opts = RequestOptions {
            body: Body::Multipart(form),
            ..Default::default()
        };
        self.fetch(Method::POST, &format!("/api/tasks/{}/proof", task_id), opts)
            .await
    }

    // ── messages ─────────────────────────────────────────────────────

    pub async fn task_messages(&self, task_id: &Id) -> Result<Vec<Message>, ApiError> {
        self.get(&format!("/api/tasks/{}/messages", task_id)).await
    }

    pub async fn send_message(&self, task_id: &Id, content: &str) -> Result<Message, ApiError> {
        let payload = MessagePayload {
            task_id: task_id.clone(),
            content: content.to_string(),
        };
        self.send_json(Method::POST, "/api/messages", &payload).await
    }

    // ── feedback ─────────────────────────────────────────────────────

    pub async fn create_feedback(&self, payload: &FeedbackPayload) -> Result<Feedback, ApiError> {
        self.send_json(Method::POST, "/api/feedback", payload).await
    }

    pub async fn user_feedback(&self, user_id: &Id) -> Result<Vec<Feedback>, ApiError> {
        self.get(&format!("/api/users/{}/feedback", user_id)).await
    }

    // ── admin ────────────────────────────────────────────────────────

    pub async fn all_users(&self) -> Result<Vec<User>, ApiError> {
        self.get("/api/admin/users").await
    }

    pub async fn all_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, ApiError> {
        self.fetch(Method::GET, "/api/admin/tasks", status_query(status))
            .await
    }

    pub async fn admin_delete_task(&self, task_id: &Id) -> Result<(), ApiError> {
        self.no_content(Method::DELETE, &format!("/api/admin/tasks/{}", task_id))
            .await
    }

    // ── reports ──────────────────────────────────────────────────────

    pub async fn create_report(&self, payload: &ReportPayload) -> Result<Report, ApiError> {
        self.send_json(Method::POST, "/api/reports", payload).await
    }

    pub async fn reports(&self) -> Result<Vec<Report>, ApiError> {
        self.get("/api/reports").await
    }

    pub async fn report(&self, report_id: &Id) -> Result<Report, ApiError> {
        self.get(&format!("/api/reports/{}", report_id)).await
    }

    pub async fn delete_report(&self, report_id: &Id) -> Result<(), ApiError> {
        self.no_content(Method::DELETE, &format!("/api/reports/{}", report_id))
            .await
    }

    // ── notifications ────────────────────────────────────────────────

    pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.get("/api/notifications").await
    }

    pub async fn mark_notification_read(&self, notification_id: &Id) -> Result<(), ApiError> {
        self.no_content(
            Method::PUT,
            &format!("/api/notifications/{}/read", notification_id),
        )
        .await
    }

    pub async fn delete_notification(&self, notification_id: &Id) -> Result<(), ApiError> {
        self.no_content(
            Method::DELETE,
            &format!("/api/notifications/{}", notification_id),
        )
        .await
    }
}

fn status_query(status: Option<TaskStatus>) -> RequestOptions {
    let pairs = status
        .map(|s| vec![("status_filter".to_string(), s.as_str().to_string())])
        .unwrap_or_default();
    RequestOptions::query(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    // ── merge_headers ────────────────────────────────────────────────

    #[test]
    fn test_caller_overrides_content_type() {
        let defaults = vec![
            pair("authorization", "Bearer real"),
            pair("content-type", "application/json"),
        ];
        let merged = merge_headers(&defaults, &[pair("Content-Type", "text/plain")]);
        assert_eq!(merged.len(), 2);
        assert!(merged.contains(&pair("content-type", "text/plain")));
    }

    #[test]
    fn test_caller_cannot_replace_authorization() {
        let defaults = vec![pair("authorization", "Bearer real")];
        let merged = merge_headers(&defaults, &[pair("Authorization", "Bearer forged")]);
        assert_eq!(merged, vec![pair("authorization", "Bearer real")]);
    }

    #[test]
    fn test_caller_adds_new_headers() {
        let defaults = vec![pair("authorization", "Bearer real")];
        let merged = merge_headers(&defaults, &[pair("X-Trace", "abc")]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1], pair("X-Trace", "abc"));
    }

    // ── error_message ────────────────────────────────────────────────

    #[test]
    fn test_detail_string_wins() {
        let msg = error_message(400, Some("Bad Request"), r#"{"detail":"Task is not available"}"#);
        assert_eq!(msg, "Task is not available");
    }

    #[test]
    fn test_validation_list_is_joined() {
        let body = r#"{"detail":[{"loc":["body","payment"],"msg":"field required"},{"msg":"value is not a valid float"}]}"#;
        assert_eq!(
            error_message(422, Some("Unprocessable Entity"), body),
            "field required; value is not a valid float"
        );
    }

    #[test]
    fn test_non_json_body_uses_reason_phrase() {
        assert_eq!(
            error_message(502, Some("Bad Gateway"), "<html>oops</html>"),
            "Bad Gateway"
        );
    }

    #[test]
    fn test_json_without_detail_uses_status_fallback() {
        assert_eq!(
            error_message(500, Some("Internal Server Error"), r#"{"error":"x"}"#),
            "HTTP error! status: 500"
        );
    }

    #[test]
    fn test_no_reason_uses_status_fallback() {
        assert_eq!(error_message(599, None, ""), "HTTP error! status: 599");
    }

    #[test]
    fn test_task_role_query_values() {
        assert_eq!(TaskRole::Posted.as_str(), "posted");
        assert_eq!(TaskRole::Accepted.as_str(), "accepted");
    }
}
