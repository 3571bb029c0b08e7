//! Task list views: browse, search, dashboards.
//!
//! All list pages share one pipeline: fetch → filter → paginate → render
//! cards. Only the source of tasks and the empty-state text differ.

use futures::future::join_all;

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::models::{Id, Task, TaskStatus, same_id};
use crate::names::NameCache;

/// Page size used by every list (20).
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Pagination controls appear at this many results (40).
pub const DEFAULT_PAGINATION_THRESHOLD: usize = 40;
/// Pages shown on either side of the current one.
const WINDOW_RADIUS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    pub total: usize,
    pub page_size: usize,
    pub threshold: usize,
}

impl Paginator {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            page_size: DEFAULT_PAGE_SIZE,
            threshold: DEFAULT_PAGINATION_THRESHOLD,
        }
    }

    pub fn with_limits(total: usize, page_size: usize, threshold: usize) -> Self {
        Self {
            total,
            page_size: page_size.max(1),
            threshold,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    /// Clamp a requested page into `1..=total_pages` (1 for empty lists).
    pub fn clamp(&self, page: usize) -> usize {
        page.clamp(1, self.total_pages().max(1))
    }

    /// Half-open index range of `page` (1-based), clamped to the list length.
    pub fn page_range(&self, page: usize) -> std::ops::Range<usize> {
        let page = self.clamp(page);
        let start = ((page - 1) * self.page_size).min(self.total);
        let end = (start + self.page_size).min(self.total);
        start..end
    }

    pub fn page<'a, T>(&self, items: &'a [T], page: usize) -> &'a [T] {
        let range = self.page_range(page);
        let end = range.end.min(items.len());
        let start = range.start.min(end);
        &items[start..end]
    }

    pub fn shows_controls(&self) -> bool {
        self.total >= self.threshold && self.total_pages() > 1
    }

    /// Page numbers shown around `current`: at most five.
    pub fn window(&self, current: usize) -> std::ops::RangeInclusive<usize> {
        let current = self.clamp(current);
        let first = current.saturating_sub(WINDOW_RADIUS).max(1);
        let last = (current + WINDOW_RADIUS).min(self.total_pages().max(1));
        first..=last
    }

    pub fn prev(&self, current: usize) -> usize {
        self.clamp(current.saturating_sub(1))
    }

    pub fn next(&self, current: usize) -> usize {
        self.clamp(current + 1)
    }
}

/// Cut `text` to `max` characters, appending "..." when anything was removed.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Peso amount with two decimals, e.g. `₱150.50`.
pub fn format_payment(amount: f64) -> String {
    format!("₱{:.2}", amount)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskCard {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub status_label: String,
    pub payment: String,
    pub poster_name: String,
    pub seeker_name: Option<String>,
}

/// Where a list's tasks come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ListSource {
    /// Available tasks for anyone to accept.
    Browse,
    Search {
        query: String,
        status: Option<TaskStatus>,
    },
    /// The viewer's tasks, filtered client-side.
    MyTasks { status: Option<TaskStatus> },
    Admin { status: Option<TaskStatus> },
    /// Tasks another user posted or accepted.
    OtherUser {
        user_id: Id,
        status: Option<TaskStatus>,
    },
}

impl ListSource {
    pub fn empty_message(&self) -> &'static str {
        match self {
            ListSource::Browse => "No available tasks at the moment. Check back later!",
            ListSource::Search { .. } => "No tasks match your search.",
            _ => "No tasks match the selected filter.",
        }
    }

    fn truncate_len(&self, cfg: &ViewConfig) -> usize {
        match self {
            ListSource::Browse | ListSource::Search { .. } => cfg.browse_truncate,
            _ => cfg.dashboard_truncate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    pub page_size: usize,
    pub pagination_threshold: usize,
    pub browse_truncate: usize,
    pub dashboard_truncate: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            pagination_threshold: DEFAULT_PAGINATION_THRESHOLD,
            browse_truncate: 150,
            dashboard_truncate: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListOutcome {
    Empty(String),
    Page {
        cards: Vec<TaskCard>,
        paginator: Paginator,
        page: usize,
    },
}

fn filter_status(tasks: Vec<Task>, status: Option<TaskStatus>) -> Vec<Task> {
    match status {
        Some(s) => tasks.into_iter().filter(|t| t.status == s).collect(),
        None => tasks,
    }
}

/// Tasks `user_id` posted or accepted.
pub fn involving(tasks: Vec<Task>, user_id: &Id) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|t| t.poster_id.matches(user_id) || same_id(t.seeker_id.as_ref(), user_id))
        .collect()
}

/// Every task for `source`, before pagination.
pub async fn fetch_tasks(api: &ApiClient, source: &ListSource) -> Result<Vec<Task>, ApiError> {
    match source {
        ListSource::Browse => api.tasks(Some(TaskStatus::Available)).await,
        ListSource::Search { query, status } => {
            api.search_tasks(Some(query.trim()), *status).await
        }
        ListSource::MyTasks { status } => Ok(filter_status(api.my_tasks(None).await?, *status)),
        ListSource::Admin { status } => api.all_tasks(*status).await,
        ListSource::OtherUser { user_id, status } => {
            let tasks = match api.all_tasks(None).await {
                Ok(tasks) => tasks,
                Err(e) => {
                    tracing::debug!(error = %e, "admin task list unavailable, using public list");
                    api.tasks(None).await?
                }
            };
            Ok(filter_status(involving(tasks, user_id), *status))
        }
    }
}

pub struct TaskListView {
    api: ApiClient,
    names: NameCache,
    cfg: ViewConfig,
}

impl TaskListView {
    pub fn new(api: ApiClient, names: NameCache, cfg: ViewConfig) -> Self {
        Self { api, names, cfg }
    }

    /// Fetch `source` and render `page`. Zero results are an empty state.
    pub async fn load(&self, source: &ListSource, page: usize) -> Result<ListOutcome, ApiError> {
        let tasks = fetch_tasks(&self.api, source).await?;
        Ok(self.paginate(source, &tasks, page).await)
    }

    pub async fn paginate(&self, source: &ListSource, tasks: &[Task], page: usize) -> ListOutcome {
        if tasks.is_empty() {
            return ListOutcome::Empty(source.empty_message().to_string());
        }
        let paginator = Paginator::with_limits(
            tasks.len(),
            self.cfg.page_size,
            self.cfg.pagination_threshold,
        );
        let page = paginator.clamp(page);
        let limit = source.truncate_len(&self.cfg);

        let cards = join_all(
            paginator
                .page(tasks, page)
                .iter()
                .map(|task| self.card(task, limit)),
        )
        .await;
        ListOutcome::Page {
            cards,
            paginator,
            page,
        }
    }

    async fn card(&self, task: &Task, limit: usize) -> TaskCard {
        let poster_name = self
            .names
            .resolve_or(&self.api, &task.poster_id, "Unknown")
            .await;
        let seeker_name = match &task.seeker_id {
            Some(id) => Some(self.names.resolve_or(&self.api, id, "Unknown").await),
            None => None,
        };
        TaskCard {
            id: task.id.clone(),
            title: task.title.clone(),
            description: truncate(&task.description, limit),
            status: task.status,
            status_label: task.status.label(),
            payment: format_payment(task.payment),
            poster_name,
            seeker_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── paginator ────────────────────────────────────────────────────

    #[test]
    fn test_pages_of_twenty() {
        let items: Vec<usize> = (0..45).collect();
        let p = Paginator::new(items.len());
        assert_eq!(p.total_pages(), 3);
        assert_eq!(p.page(&items, 1), &items[0..20]);
        assert_eq!(p.page(&items, 2), &items[20..40]);
        assert_eq!(p.page(&items, 3), &items[40..45]);
    }

    #[test]
    fn test_controls_threshold() {
        assert!(!Paginator::new(39).shows_controls());
        assert!(Paginator::new(40).shows_controls());
        assert!(!Paginator::new(0).shows_controls());
    }

    #[test]
    fn test_out_of_range_pages_clamp() {
        let items: Vec<usize> = (0..25).collect();
        let p = Paginator::new(items.len());
        assert_eq!(p.page(&items, 0), &items[0..20]);
        assert_eq!(p.page(&items, 9), &items[20..25]);
        assert_eq!(p.page_range(2), 20..25);
    }

    #[test]
    fn test_empty_list_has_no_pages() {
        let p = Paginator::new(0);
        assert_eq!(p.total_pages(), 0);
        assert_eq!(p.page_range(1), 0..0);
        assert_eq!(p.window(1), 1..=1);
    }

    #[test]
    fn test_window_at_most_five_pages() {
        let p = Paginator::new(200);
        assert_eq!(p.window(1), 1..=3);
        assert_eq!(p.window(5), 3..=7);
        assert_eq!(p.window(10), 8..=10);
        assert_eq!(p.prev(1), 1);
        assert_eq!(p.next(10), 10);
        assert_eq!(p.next(4), 5);
    }

    // ── card text ────────────────────────────────────────────────────

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly", 7), "exactly");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ñandú₱", 2), "ña...");
    }

    #[test]
    fn test_format_payment() {
        assert_eq!(format_payment(150.5), "₱150.50");
        assert_eq!(format_payment(0.0), "₱0.00");
    }

    #[test]
    fn test_empty_messages() {
        assert!(ListSource::Browse.empty_message().contains("No available tasks"));
        let search = ListSource::Search {
            query: "x".into(),
            status: None,
        };
        assert_eq!(search.empty_message(), "No tasks match your search.");
        assert_eq!(
            ListSource::MyTasks { status: None }.empty_message(),
            "No tasks match the selected filter."
        );
    }

    #[test]
    fn test_involving_matches_either_side() {
        let tasks: Vec<Task> = serde_json::from_str(
            r#"[
                {"id": 1, "title": "a", "payment": 1, "status": "available", "poster_id": 7},
                {"id": 2, "title": "b", "payment": 1, "status": "ongoing", "poster_id": 1, "seeker_id": "7"},
                {"id": 3, "title": "c", "payment": 1, "status": "ongoing", "poster_id": 1, "seeker_id": 2}
            ]"#,
        )
        .unwrap();
        let mine = involving(tasks, &Id::Num(7));
        let ids: Vec<String> = mine.iter().map(|t| t.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
