//! Task detail controller.
//!
//! One [`TaskSession`] exists per opened task. It owns the last snapshot, the
//! viewer, a name cache and at most one live-update subscription; dropping the
//! session drops the subscription with it.
//!
//! Lifecycle requests are never applied optimistically. A request either
//! fails, leaving the snapshot untouched, or succeeds and is followed by a
//! fresh `GET` of the task.

use std::path::PathBuf;

use crate::api::ApiClient;
use crate::errors::{ApiError, SessionError};
use crate::lifecycle::{
    LifecycleAction, SeekerRating, ViewerRole, can_report, check_mark_done, offered_actions,
    parse_rating,
};
use crate::models::{FeedbackPayload, Id, Task, TaskLocation, User};
use crate::names::NameCache;
use crate::poll::{Baseline, Subscription, TaskChange, TaskUpdates, has_changed};
use crate::timefmt::{self, DateStyle};
use crate::views::format_payment;

/// A lifecycle request from the viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionRequest {
    Accept,
    UploadProof(PathBuf),
    MarkDone,
    Confirm,
    Cancel,
    Feedback {
        rating: String,
        comment: Option<String>,
    },
}

impl ActionRequest {
    pub fn action(&self) -> LifecycleAction {
        match self {
            Self::Accept => LifecycleAction::Accept,
            Self::UploadProof(_) => LifecycleAction::UploadProof,
            Self::MarkDone => LifecycleAction::MarkDone,
            Self::Confirm => LifecycleAction::ConfirmCompletion,
            Self::Cancel => LifecycleAction::Cancel,
            Self::Feedback { .. } => LifecycleAction::LeaveFeedback,
        }
    }

    /// Message shown after the backend accepts the request.
    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Accept => "Task accepted successfully!",
            Self::UploadProof(_) => "Proof uploaded successfully!",
            Self::MarkDone => "Task marked as done! Waiting for poster confirmation.",
            Self::Confirm => "Task confirmed as completed!",
            Self::Cancel => "Task cancelled successfully!",
            Self::Feedback { .. } => "Feedback submitted successfully!",
        }
    }
}

/// Feedback already left on a completed task.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackView {
    pub rating: i64,
    pub comment: Option<String>,
    pub submitted: String,
}

/// Everything the detail page renders.
#[derive(Debug, Clone)]
pub struct TaskDetail {
    pub id: Id,
    pub title: String,
    pub poster_id: Id,
    pub poster_name: String,
    pub status_label: String,
    pub description: String,
    pub payment: String,
    pub contact_number: Option<String>,
    pub schedule: Option<String>,
    pub locations: Vec<TaskLocation>,
    pub proof_image: Option<String>,
    pub role: ViewerRole,
    pub actions: Vec<LifecycleAction>,
    pub chat_visible: bool,
    pub can_report: bool,
    /// `Some` only once the task is completed.
    pub feedback: Option<Option<FeedbackView>>,
    pub seeker_rating: Option<SeekerRating>,
}

pub struct TaskSession {
    api: ApiClient,
    viewer: User,
    task: Task,
    names: NameCache,
    baseline: Baseline,
    subscription: Option<Subscription>,
}

impl TaskSession {
    /// Load the viewer and the task. A missing task surfaces as `NotFound`.
    pub async fn open(api: ApiClient, task_id: &Id) -> Result<Self, ApiError> {
        let (viewer, task) = tokio::try_join!(api.current_user(), api.task(task_id))?;
        let names = NameCache::new();
        names.prime(&viewer);
        tracing::debug!(task_id = %task_id, viewer = %viewer.id, "task session opened");
        Ok(Self {
            api,
            viewer,
            baseline: Baseline::new(Some(task.clone())),
            task,
            names,
            subscription: None,
        })
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn viewer(&self) -> &User {
        &self.viewer
    }

    pub fn names(&self) -> &NameCache {
        &self.names
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn role(&self) -> ViewerRole {
        ViewerRole::of(&self.task, &self.viewer.id)
    }

    pub fn actions(&self) -> Vec<LifecycleAction> {
        offered_actions(&self.task, &self.viewer.id)
    }

    pub fn chat_visible(&self) -> bool {
        self.task.status.chat_visible()
    }

    /// Re-fetch the task and replace the snapshot the live feed compares against.
    pub async fn refresh(&mut self) -> Result<&Task, ApiError> {
        self.task = self.api.task(&self.task.id).await?;
        self.baseline.set(self.task.clone());
        Ok(&self.task)
    }

    /// Perform one lifecycle request, then reload the task.
    pub async fn dispatch(&mut self, request: ActionRequest) -> Result<&Task, SessionError> {
        let action = request.action();
        if !self.actions().contains(&action) {
            return Err(SessionError::NotOffered {
                action: action.label().to_string(),
            });
        }

        let id = self.task.id.clone();
        match &request {
            ActionRequest::Accept => {
                self.api.accept_task(&id).await?;
            }
            ActionRequest::UploadProof(path) => {
                self.api.upload_proof(&id, path).await?;
            }
            ActionRequest::MarkDone => {
                check_mark_done(&self.task)?;
                self.api.complete_task(&id).await?;
            }
            ActionRequest::Confirm => {
                self.api.confirm_task(&id).await?;
            }
            ActionRequest::Cancel => {
                self.api.cancel_task(&id).await?;
            }
            ActionRequest::Feedback { rating, comment } => {
                let rating = parse_rating(rating)?;
                let seeker_id = self
                    .task
                    .seeker_id
                    .clone()
                    .ok_or_else(|| SessionError::NotOffered {
                        action: action.label().to_string(),
                    })?;
                let payload = FeedbackPayload {
                    task_id: id.clone(),
                    seeker_id,
                    rating,
                    comment: comment.clone().filter(|c| !c.trim().is_empty()),
                };
                self.api.create_feedback(&payload).await?;
            }
        }

        tracing::info!(task_id = %id, action = %action, "lifecycle action accepted");
        Ok(self.refresh().await?)
    }

    pub async fn accept(&mut self) -> Result<&Task, SessionError> {
        self.dispatch(ActionRequest::Accept).await
    }

    pub async fn mark_done(&mut self) -> Result<&Task, SessionError> {
        self.dispatch(ActionRequest::MarkDone).await
    }

    pub async fn confirm(&mut self) -> Result<&Task, SessionError> {
        self.dispatch(ActionRequest::Confirm).await
    }

    pub async fn cancel(&mut self) -> Result<&Task, SessionError> {
        self.dispatch(ActionRequest::Cancel).await
    }

    pub async fn upload_proof(&mut self, path: impl Into<PathBuf>) -> Result<&Task, SessionError> {
        self.dispatch(ActionRequest::UploadProof(path.into())).await
    }

    pub async fn leave_feedback(
        &mut self,
        rating: &str,
        comment: Option<String>,
    ) -> Result<&Task, SessionError> {
        self.dispatch(ActionRequest::Feedback {
            rating: rating.to_string(),
            comment,
        })
        .await
    }

    /// Rating summary for the task's seeker. Lookup failures yield `None`.
    pub async fn seeker_rating(&self) -> Option<SeekerRating> {
        let seeker_id = self.task.seeker_id.as_ref()?;
        match self.api.user_feedback(seeker_id).await {
            Ok(list) => SeekerRating::from_feedback(&list),
            Err(e) => {
                tracing::warn!(seeker = %seeker_id, error = %e, "seeker feedback lookup failed");
                None
            }
        }
    }

    pub async fn detail_view(&self) -> TaskDetail {
        let task = &self.task;
        let poster_name = self
            .names
            .resolve_or(&self.api, &task.poster_id, "Unknown")
            .await;
        let completed = task.status == crate::models::TaskStatus::Completed;

        let feedback = completed.then(|| {
            task.feedback.as_ref().map(|f| FeedbackView {
                rating: f.rating,
                comment: f.comment.clone(),
                submitted: timefmt::format_opt(f.created_at.as_deref(), DateStyle::DateTime),
            })
        });
        let seeker_rating = if completed {
            self.seeker_rating().await
        } else {
            None
        };

        TaskDetail {
            id: task.id.clone(),
            title: task.title.clone(),
            poster_id: task.poster_id.clone(),
            poster_name,
            status_label: task.status.label(),
            description: task.description.clone(),
            payment: format_payment(task.payment),
            contact_number: task.contact_number.clone().filter(|c| !c.is_empty()),
            schedule: task
                .schedule
                .as_deref()
                .map(|s| timefmt::format_local(s, DateStyle::DateTime)),
            locations: task.all_locations(),
            proof_image: task.proof_image.clone().filter(|p| !p.trim().is_empty()),
            role: self.role(),
            actions: self.actions(),
            chat_visible: self.chat_visible(),
            can_report: can_report(task, &self.viewer.id),
            feedback,
            seeker_rating,
        }
    }

    // ── live updates ─────────────────────────────────────────────────

    /// Start watching the task. Returns `false` when already watching.
    pub fn start_live_updates(&mut self, updates: &dyn TaskUpdates) -> bool {
        if self.subscription.as_ref().is_some_and(Subscription::is_active) {
            return false;
        }
        self.baseline.set(self.task.clone());
        self.subscription = Some(updates.subscribe(self.task.id.clone(), self.baseline.clone()));
        true
    }

    pub fn stop_live_updates(&mut self) {
        if let Some(mut sub) = self.subscription.take() {
            sub.cancel();
        }
    }

    pub fn is_live(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }

    /// Wait for the next change and adopt its snapshot. Changes the snapshot
    /// already reflects are skipped.
    ///
    /// Returns `None` when not watching or the feed stopped.
    pub async fn next_change(&mut self) -> Option<TaskChange> {
        loop {
            let change = self.subscription.as_mut()?.recv().await?;
            if has_changed(Some(&self.task), &change.task) {
                self.task = change.task.clone();
                return Some(change);
            }
        }
    }
}
