//! Task lifecycle rules as seen from one viewer.
//!
//! The backend owns every status transition. This module only decides which
//! transitions to *offer*, given the task snapshot and who is looking at it:
//!
//! | status               | poster          | seeker                        | others |
//! |----------------------|-----------------|-------------------------------|--------|
//! | available            | Edit, Cancel    | -                             | Accept |
//! | ongoing              | -               | UploadProof, MarkDone, Cancel | -      |
//! | pending_confirmation | ConfirmCompletion | -                           | -      |
//! | completed, no feedback | LeaveFeedback | -                             | -      |

use crate::errors::ValidationError;
use crate::models::{Feedback, Id, Task, TaskStatus, User, same_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerRole {
    Poster,
    Seeker,
    Other,
}

impl ViewerRole {
    pub fn of(task: &Task, viewer_id: &Id) -> Self {
        if task.poster_id.matches(viewer_id) {
            ViewerRole::Poster
        } else if same_id(task.seeker_id.as_ref(), viewer_id) {
            ViewerRole::Seeker
        } else {
            ViewerRole::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleAction {
    Edit,
    Cancel,
    Accept,
    UploadProof,
    MarkDone,
    ConfirmCompletion,
    LeaveFeedback,
}

impl LifecycleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Cancel => "cancel",
            Self::Accept => "accept",
            Self::UploadProof => "upload_proof",
            Self::MarkDone => "mark_done",
            Self::ConfirmCompletion => "confirm_completion",
            Self::LeaveFeedback => "leave_feedback",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Edit => "Edit",
            Self::Cancel => "Cancel Task",
            Self::Accept => "Accept Task",
            Self::UploadProof => "Upload Proof",
            Self::MarkDone => "Mark as Done",
            Self::ConfirmCompletion => "Confirm Completion",
            Self::LeaveFeedback => "Leave Feedback",
        }
    }
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions offered to `viewer_id` for this task snapshot, in display order.
pub fn offered_actions(task: &Task, viewer_id: &Id) -> Vec<LifecycleAction> {
    use LifecycleAction::*;

    let role = ViewerRole::of(task, viewer_id);
    match (task.status, role) {
        (TaskStatus::Available, ViewerRole::Poster) => vec![Edit, Cancel],
        (TaskStatus::Available, _) => vec![Accept],
        (TaskStatus::Ongoing, ViewerRole::Seeker) => vec![UploadProof, MarkDone, Cancel],
        (TaskStatus::PendingConfirmation, ViewerRole::Poster) => vec![ConfirmCompletion],
        (TaskStatus::Completed, ViewerRole::Poster) if task.feedback.is_none() => {
            vec![LeaveFeedback]
        }
        _ => Vec::new(),
    }
}

/// Mark-done is refused until a proof image is attached.
pub fn check_mark_done(task: &Task) -> Result<(), ValidationError> {
    if task.has_proof() {
        Ok(())
    } else {
        Err(ValidationError::ProofRequired)
    }
}

/// Parse a 1-5 star rating typed by the user.
pub fn parse_rating(input: &str) -> Result<u8, ValidationError> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::RatingOutOfRange)?;
    if !value.is_finite() || !(1.0..=5.0).contains(&value) {
        return Err(ValidationError::RatingOutOfRange);
    }
    Ok((value.trunc() as i64).clamp(1, 5) as u8)
}

/// Posters cannot report their own task.
pub fn can_report(task: &Task, viewer_id: &Id) -> bool {
    !task.poster_id.matches(viewer_id)
}

/// Per-user counters shown on the dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskSummary {
    pub posted: usize,
    pub accepted: usize,
    /// Completed tasks where the user was the seeker.
    pub completed: usize,
    /// Ongoing or awaiting confirmation, with the user on either side.
    pub active: usize,
}

pub fn summarize(tasks: &[Task], viewer_id: &Id) -> TaskSummary {
    let mut summary = TaskSummary::default();
    for task in tasks {
        let is_poster = task.poster_id.matches(viewer_id);
        let is_seeker = same_id(task.seeker_id.as_ref(), viewer_id);
        if is_poster {
            summary.posted += 1;
        }
        if is_seeker {
            summary.accepted += 1;
            if task.status == TaskStatus::Completed {
                summary.completed += 1;
            }
        }
        if task.status.chat_visible() && (is_poster || is_seeker) {
            summary.active += 1;
        }
    }
    summary
}

/// Site-wide counters for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminSummary {
    pub total_users: usize,
    pub total_tasks: usize,
    pub available: usize,
    pub ongoing: usize,
    pub completed: usize,
}

impl AdminSummary {
    pub fn from(users: &[User], tasks: &[Task]) -> Self {
        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
        Self {
            total_users: users.len(),
            total_tasks: tasks.len(),
            available: count(TaskStatus::Available),
            ongoing: count(TaskStatus::Ongoing),
            completed: count(TaskStatus::Completed),
        }
    }
}

/// Aggregate of the feedback a seeker has received.
#[derive(Debug, Clone, PartialEq)]
pub struct SeekerRating {
    pub average: f64,
    pub stars: u8,
    pub reviews: usize,
}

impl SeekerRating {
    /// `None` when the seeker has no ratings yet.
    pub fn from_feedback(list: &[Feedback]) -> Option<Self> {
        if list.is_empty() {
            return None;
        }
        let total: i64 = list.iter().map(|f| f.rating).sum();
        let average = total as f64 / list.len() as f64;
        Some(Self {
            average,
            stars: average.round().clamp(0.0, 5.0) as u8,
            reviews: list.len(),
        })
    }

    pub fn describe(&self) -> String {
        format!(
            "{} {:.1}/5 ({} review{})",
            render_stars(i64::from(self.stars)),
            self.average,
            self.reviews,
            if self.reviews > 1 { "s" } else { "" }
        )
    }
}

/// Five stars, filled up to `score` (clamped to 0..=5).
pub fn render_stars(score: i64) -> String {
    let filled = score.clamp(0, 5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}
