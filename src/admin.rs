//! Admin moderation: site stats, users and reported tasks.

use std::collections::HashMap;

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::lifecycle::AdminSummary;
use crate::models::{Id, Report, Task, User};

pub const ACCESS_DENIED: &str = "Access denied. Admin privileges required.";
pub const TASK_UNAVAILABLE: &str = "Task details not available";

/// A report together with the task it points at, when that task still loads.
#[derive(Debug, Clone)]
pub struct ReportedTask {
    pub report: Report,
    pub task: Option<Task>,
}

impl ReportedTask {
    pub fn task_title(&self) -> &str {
        self.task
            .as_ref()
            .map(|t| t.title.as_str())
            .unwrap_or(TASK_UNAVAILABLE)
    }
}

pub struct AdminConsole {
    api: ApiClient,
    admin: User,
    tasks: HashMap<Id, Option<Task>>,
}

impl AdminConsole {
    /// Open the console. Non-admins get `Forbidden`.
    pub async fn open(api: ApiClient) -> Result<Self, ApiError> {
        let admin = api.current_user().await?;
        if !admin.is_admin {
            return Err(ApiError::Forbidden(ACCESS_DENIED.to_string()));
        }
        Ok(Self {
            api,
            admin,
            tasks: HashMap::new(),
        })
    }

    pub fn admin(&self) -> &User {
        &self.admin
    }

    pub async fn dashboard(&self) -> Result<(AdminSummary, Vec<User>), ApiError> {
        let (users, tasks) = tokio::try_join!(self.api.all_users(), self.api.all_tasks(None))?;
        Ok((AdminSummary::from(&users, &tasks), users))
    }

    /// Every open report, each with its task looked up once per console.
    pub async fn reported(&mut self) -> Result<Vec<ReportedTask>, ApiError> {
        let reports = self.api.reports().await?;
        let mut out = Vec::with_capacity(reports.len());
        for report in reports {
            let task = self.cached_task(&report.task_id).await;
            out.push(ReportedTask { report, task });
        }
        Ok(out)
    }

    async fn cached_task(&mut self, task_id: &Id) -> Option<Task> {
        if let Some(hit) = self.tasks.get(task_id) {
            return hit.clone();
        }
        let task = match self.api.task(task_id).await {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::warn!(task_id = %task_id, error = %e, "reported task lookup failed");
                None
            }
        };
        self.tasks.insert(task_id.clone(), task.clone());
        task
    }

    /// Delete the task, then clear the report. A failed report delete is only logged.
    pub async fn delete_reported_task(
        &mut self,
        task_id: &Id,
        report_id: Option<&Id>,
    ) -> Result<(), ApiError> {
        self.api.admin_delete_task(task_id).await?;
        self.tasks.remove(task_id);
        tracing::info!(task_id = %task_id, "task deleted by admin");
        if let Some(report_id) = report_id {
            if let Err(e) = self.api.delete_report(report_id).await {
                tracing::warn!(report_id = %report_id, error = %e, "report cleanup failed");
            }
        }
        Ok(())
    }

    /// Drop a report without touching its task.
    pub async fn dismiss(&self, report_id: &Id) -> Result<(), ApiError> {
        self.api.delete_report(report_id).await?;
        tracing::info!(report_id = %report_id, "report dismissed");
        Ok(())
    }
}
