use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier as it arrives over JSON.
///
/// The backend sends integers, but ids also travel through query strings and
/// config files as text, so equality is decided on the string form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Num(i64),
    Text(String),
}

impl Id {
    /// String-normalized comparison: `Id::Num(7)` matches `Id::Text("7")`.
    pub fn matches(&self, other: &Id) -> bool {
        self.to_string() == other.to_string()
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl Eq for Id {}

impl std::hash::Hash for Id {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Id::Num(n) => write!(f, "{}", n),
            Id::Text(s) => f.write_str(s.trim()),
        }
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Num(n)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::Text(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::Text(s)
    }
}

/// Compare an optional id against a viewer id; `None` never matches.
pub fn same_id(a: Option<&Id>, b: &Id) -> bool {
    a.is_some_and(|a| a.matches(b))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Available,
    Ongoing,
    PendingConfirmation,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Ongoing => "ongoing",
            Self::PendingConfirmation => "pending_confirmation",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Human label: underscores become spaces.
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Chat is shown exactly while the task is being worked on.
    pub fn chat_visible(&self) -> bool {
        matches!(self, Self::Ongoing | Self::PendingConfirmation)
    }

    pub fn all() -> [TaskStatus; 5] {
        [
            Self::Available,
            Self::Ongoing,
            Self::PendingConfirmation,
            Self::Completed,
            Self::Cancelled,
        ]
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "ongoing" => Ok(Self::Ongoing),
            "pending_confirmation" => Ok(Self::PendingConfirmation),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub idx: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub task_id: Option<Id>,
    #[serde(default)]
    pub poster_id: Option<Id>,
    #[serde(default)]
    pub seeker_id: Option<Id>,
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub payment: f64,
    pub status: TaskStatus,
    pub poster_id: Id,
    #[serde(default)]
    pub seeker_id: Option<Id>,
    #[serde(default)]
    pub location_lat: Option<f64>,
    #[serde(default)]
    pub location_lng: Option<f64>,
    #[serde(default)]
    pub location_address: Option<String>,
    #[serde(default)]
    pub locations: Option<Vec<TaskLocation>>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub proof_image: Option<String>,
    #[serde(default)]
    pub feedback: Option<Feedback>,
    #[serde(default)]
    pub report_count: Option<i64>,
    #[serde(default)]
    pub accepted_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Task {
    /// All known locations, falling back to the primary one for older records.
    pub fn all_locations(&self) -> Vec<TaskLocation> {
        match &self.locations {
            Some(list) if !list.is_empty() => list.clone(),
            _ => match (self.location_lat, self.location_lng) {
                (Some(lat), Some(lng)) => vec![TaskLocation {
                    id: None,
                    lat,
                    lng,
                    address: self.location_address.clone(),
                    idx: Some(0),
                }],
                _ => Vec::new(),
            },
        }
    }

    pub fn has_proof(&self) -> bool {
        self.proof_image
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    /// Name, then email, then a generic placeholder.
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.email.as_deref().filter(|e| !e.trim().is_empty()))
            .unwrap_or("User")
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Id,
    pub task_id: Id,
    pub sender_id: Id,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Id,
    #[serde(default)]
    pub task_id: Option<Id>,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub notif_type: Option<String>,
    #[serde(default)]
    pub seen: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Id,
    pub task_id: Id,
    pub reporter_id: Id,
    pub report_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// Request payloads

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskPayload {
    pub title: String,
    pub description: String,
    pub payment: f64,
    pub contact_number: String,
    pub location_lat: f64,
    pub location_lng: f64,
    pub location_address: String,
    pub locations: Vec<TaskLocation>,
    pub schedule: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackPayload {
    pub task_id: Id,
    pub seeker_id: Id,
    pub rating: u8,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagePayload {
    pub task_id: Id,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportPayload {
    pub task_id: Id,
    pub report_type: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_roundtrip() {
        for status in TaskStatus::all() {
            let parsed: TaskStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("archived".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_task_status_label_replaces_underscore() {
        assert_eq!(TaskStatus::PendingConfirmation.label(), "pending confirmation");
        assert_eq!(TaskStatus::Available.label(), "available");
    }

    #[test]
    fn test_chat_visible_only_while_in_progress() {
        assert!(TaskStatus::Ongoing.chat_visible());
        assert!(TaskStatus::PendingConfirmation.chat_visible());
        assert!(!TaskStatus::Available.chat_visible());
        assert!(!TaskStatus::Completed.chat_visible());
        assert!(!TaskStatus::Cancelled.chat_visible());
    }

    #[test]
    fn test_id_matches_across_number_and_string() {
        assert!(Id::Num(42).matches(&Id::Text("42".into())));
        assert!(Id::Text(" 42 ".into()).matches(&Id::Num(42)));
        assert!(!Id::Num(42).matches(&Id::Num(43)));
        assert_eq!(Id::Num(7), Id::from("7"));
    }

    #[test]
    fn test_same_id_none_never_matches() {
        assert!(!same_id(None, &Id::Num(1)));
        assert!(same_id(Some(&Id::Num(1)), &Id::from("1")));
    }

    #[test]
    fn test_task_deserializes_backend_shape() {
        let json = r#"{
            "id": 12,
            "title": "Buy groceries",
            "description": "Milk and eggs",
            "payment": 150.5,
            "status": "pending_confirmation",
            "poster_id": 3,
            "seeker_id": "9",
            "location_lat": 14.6,
            "location_lng": 121.0,
            "location_address": "Quezon City",
            "proof_image": null,
            "report_count": 0,
            "created_at": "2025-01-01T10:00:00",
            "updated_at": "2025-01-01T10:00:00",
            "seeker": {"id": 9, "email": "s@example.com"}
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, TaskStatus::PendingConfirmation);
        assert!(same_id(task.seeker_id.as_ref(), &Id::Num(9)));
        assert!(!task.has_proof());
        let locations = task.all_locations();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].address.as_deref(), Some("Quezon City"));
    }

    #[test]
    fn test_user_display_name_fallbacks() {
        let mut user: User = serde_json::from_str(r#"{"id": 1, "email": "a@b.c"}"#).unwrap();
        assert_eq!(user.display_name(), "a@b.c");
        user.name = Some("Ana Cruz".into());
        assert_eq!(user.display_name(), "Ana Cruz");
        user.name = Some("  ".into());
        user.email = None;
        assert_eq!(user.display_name(), "User");
    }

    #[test]
    fn test_serde_produces_snake_case_status() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::PendingConfirmation).unwrap(),
            "\"pending_confirmation\""
        );
    }
}
