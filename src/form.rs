//! Post/edit task form, profile form and report form.
//!
//! Validation runs entirely client-side and stops at the first failing rule;
//! nothing is sent until every rule passes.

use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use regex::Regex;

use crate::api::ApiClient;
use crate::errors::{SessionError, ValidationError};
use crate::models::{
    Id, ProfileUpdate, Report, ReportPayload, Task, TaskLocation, TaskPayload, User,
};
use crate::timefmt;

static SCHEDULE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}$").unwrap());

const SCHEDULE_FORMAT: &str = "%Y-%m-%dT%H:%M";
const MIN_CONTACT_DIGITS: usize = 7;

/// Keep digits and the first decimal point, with at most two decimals.
pub fn sanitize_payment(input: &str) -> String {
    let kept: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    match kept.split_once('.') {
        Some((int_part, rest)) => {
            let decimals: String = rest.chars().filter(|c| *c != '.').take(2).collect();
            format!("{}.{}", int_part, decimals)
        }
        None => kept,
    }
}

/// Digits only, at least seven of them.
pub fn validate_contact(raw: &str) -> Result<String, ValidationError> {
    if !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::ContactNotDigits);
    }
    if raw.len() < MIN_CONTACT_DIGITS {
        return Err(ValidationError::ContactTooShort);
    }
    Ok(raw.to_string())
}

/// Validate a `YYYY-MM-DDTHH:MM` wall-clock time in `tz` and return it as UTC ISO-8601.
pub fn validate_schedule_in<Tz: TimeZone>(
    raw: &str,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<String, ValidationError> {
    if !SCHEDULE_PATTERN.is_match(raw) {
        return Err(ValidationError::ScheduleFormat);
    }
    let naive = NaiveDateTime::parse_from_str(raw, SCHEDULE_FORMAT)
        .map_err(|_| ValidationError::ScheduleInvalid)?;
    let instant = tz
        .from_local_datetime(&naive)
        .earliest()
        .ok_or(ValidationError::ScheduleInvalid)?
        .with_timezone(&Utc);
    if instant < now {
        return Err(ValidationError::ScheduleInPast);
    }
    Ok(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// [`validate_schedule_in`] for the user's local zone.
pub fn validate_schedule(raw: &str, now: DateTime<Utc>) -> Result<String, ValidationError> {
    validate_schedule_in(raw, now, &Local)
}

/// One map-picked location as typed into the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationInput {
    pub address: String,
    pub lat: String,
    pub lng: String,
}

impl LocationInput {
    pub fn new(address: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            address: address.into(),
            lat: lat.to_string(),
            lng: lng.to_string(),
        }
    }

    /// Parse `address:lat:lng`. The address may itself contain colons.
    pub fn parse(raw: &str) -> Option<Self> {
        let (rest, lng) = raw.rsplit_once(':')?;
        let (address, lat) = rest.rsplit_once(':')?;
        Some(Self {
            address: address.to_string(),
            lat: lat.to_string(),
            lng: lng.to_string(),
        })
    }

    /// Non-empty address and numeric coordinates.
    fn qualify(&self) -> Option<(String, f64, f64)> {
        let address = self.address.trim();
        if address.is_empty() {
            return None;
        }
        let lat: f64 = self.lat.trim().parse().ok().filter(|v: &f64| v.is_finite())?;
        let lng: f64 = self.lng.trim().parse().ok().filter(|v: &f64| v.is_finite())?;
        Some((address.to_string(), lat, lng))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Id),
}

/// Where to go after a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Dashboard,
    TaskDetail(Id),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub payment: String,
    pub contact_number: String,
    pub schedule: String,
    pub locations: Vec<LocationInput>,
}

impl TaskForm {
    /// Prefill from an existing task. The schedule is shown in local time.
    pub fn from_task(task: &Task) -> Self {
        let schedule = task
            .schedule
            .as_deref()
            .and_then(timefmt::parse_server_timestamp)
            .map(|dt| dt.with_timezone(&Local).format(SCHEDULE_FORMAT).to_string())
            .unwrap_or_default();
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            payment: format!("{}", task.payment),
            contact_number: task.contact_number.clone().unwrap_or_default(),
            schedule,
            locations: task
                .all_locations()
                .into_iter()
                .map(|l| LocationInput {
                    address: l.address.unwrap_or_default(),
                    lat: l.lat.to_string(),
                    lng: l.lng.to_string(),
                })
                .collect(),
        }
    }

    /// Validate in the user's local zone.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<TaskPayload, ValidationError> {
        self.validate_in(now, &Local)
    }

    pub fn validate_in<Tz: TimeZone>(
        &self,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<TaskPayload, ValidationError> {
        let required = [
            &self.title,
            &self.description,
            &self.payment,
            &self.contact_number,
            &self.schedule,
        ];
        if required.iter().any(|f| f.trim().is_empty()) {
            return Err(ValidationError::MissingFields);
        }

        let qualifying: Vec<(String, f64, f64)> =
            self.locations.iter().filter_map(LocationInput::qualify).collect();
        let Some((primary_address, primary_lat, primary_lng)) = qualifying.first().cloned() else {
            return Err(ValidationError::NoLocation);
        };

        let contact = validate_contact(&self.contact_number)?;
        let schedule = validate_schedule_in(&self.schedule, now, tz)?;
        let payment: f64 = sanitize_payment(&self.payment)
            .parse()
            .map_err(|_| ValidationError::PaymentInvalid)?;

        let locations = qualifying
            .into_iter()
            .enumerate()
            .map(|(idx, (address, lat, lng))| TaskLocation {
                id: None,
                lat,
                lng,
                address: Some(address),
                idx: Some(idx as i32),
            })
            .collect();

        Ok(TaskPayload {
            title: self.title.clone(),
            description: self.description.clone(),
            payment,
            contact_number: contact,
            location_lat: primary_lat,
            location_lng: primary_lng,
            location_address: primary_address,
            locations,
            schedule,
        })
    }

    /// Validate and create or update. Edit mode requires the viewer to be the poster.
    pub async fn submit(
        &self,
        api: &ApiClient,
        mode: &FormMode,
        now: DateTime<Utc>,
    ) -> Result<(Task, Redirect), SessionError> {
        let payload = self.validate(now)?;
        match mode {
            FormMode::Edit(id) => {
                let (viewer, existing) = tokio::try_join!(api.current_user(), api.task(id))?;
                ensure_poster(&existing, &viewer)?;
                let task = api.update_task(id, &payload).await?;
                tracing::info!(task_id = %id, "task updated");
                Ok((task, Redirect::TaskDetail(id.clone())))
            }
            FormMode::Create => {
                let task = api.create_task(&payload).await?;
                tracing::info!(task_id = %task.id, "task posted");
                Ok((task, Redirect::Dashboard))
            }
        }
    }
}

/// Only the poster may edit.
pub fn ensure_poster(task: &Task, viewer: &User) -> Result<(), ValidationError> {
    if task.poster_id.matches(&viewer.id) {
        Ok(())
    } else {
        Err(ValidationError::NotPoster)
    }
}

// ── profile ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone().unwrap_or_default(),
            address: user.address.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<ProfileUpdate, ValidationError> {
        let first = self.first_name.trim();
        let last = self.last_name.trim();
        let address = self.address.trim();

        if first.is_empty() {
            return Err(ValidationError::Profile(
                "Please enter your first name".to_string(),
            ));
        }
        if first.chars().count() > 50 {
            return Err(ValidationError::Profile(
                "First name must be between 1 and 50 characters".to_string(),
            ));
        }
        if last.chars().count() > 50 {
            return Err(ValidationError::Profile(
                "Last name must be between 1 and 50 characters if provided".to_string(),
            ));
        }
        let address_len = address.chars().count();
        if !address.is_empty() && !(5..=200).contains(&address_len) {
            return Err(ValidationError::Profile(
                "Address must be between 5 and 200 characters if provided".to_string(),
            ));
        }

        Ok(ProfileUpdate {
            first_name: first.to_string(),
            last_name: last.to_string(),
            name: format!("{} {}", first, last).trim().to_string(),
            address: address.to_string(),
        })
    }

    pub async fn submit(&self, api: &ApiClient) -> Result<User, SessionError> {
        let update = self.validate()?;
        Ok(api.update_profile(&update).await?)
    }
}

// ── report ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ReportForm {
    pub task_id: Id,
    pub report_type: String,
    pub description: String,
}

impl ReportForm {
    pub fn validate(&self) -> Result<ReportPayload, ValidationError> {
        let report_type = self.report_type.trim();
        if report_type.is_empty() {
            return Err(ValidationError::MissingReportType);
        }
        let description = self.description.trim();
        Ok(ReportPayload {
            task_id: self.task_id.clone(),
            report_type: report_type.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }

    /// File the report. Refused when the viewer posted the task.
    pub async fn submit(&self, api: &ApiClient) -> Result<(Report, Redirect), SessionError> {
        let payload = self.validate()?;
        let viewer = api.current_user().await?;
        match api.task(&self.task_id).await {
            Ok(task) if task.poster_id.matches(&viewer.id) => {
                return Err(ValidationError::OwnTaskReport.into());
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(task_id = %self.task_id, error = %e, "task lookup before report failed")
            }
        }
        let report = api.create_report(&payload).await?;
        Ok((report, Redirect::TaskDetail(self.task_id.clone())))
    }
}
