//! Typed error hierarchy for the Taskerrand client.
//!
//! Four enums cover the four places a failure can originate:
//! - `AuthError`: identity bridge could not produce a signed-in user or token
//! - `ApiError`: transport failures and non-2xx backend responses
//! - `ValidationError`: client-side checks that run before any request
//! - `SessionError`: task-detail controller refusing or failing an action
//!
//! Every variant's `Display` is the message shown to the user.

use thiserror::Error;

/// Errors from the identity bridge.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not signed in")]
    SignedOut,

    #[error("Failed to obtain an access token: {0}")]
    TokenUnavailable(String),

    #[error("Token command failed to start: {0}")]
    CommandSpawn(#[source] std::io::Error),
}

/// Errors from the REST client.
///
/// Backend-originated variants carry the normalized message: the JSON `detail`
/// when present, otherwise the HTTP reason phrase.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Failed to read upload {path}: {source}")]
    Upload {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Build the error for a non-2xx response.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => ApiError::Unauthenticated(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            _ => ApiError::Status { status, message },
        }
    }

    /// HTTP status code, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthenticated(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthenticated(_))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, ApiError::Forbidden(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthenticated(err.to_string())
    }
}

/// Client-side validation failures. Raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields are required")]
    MissingFields,

    #[error("Contact number must contain digits only.")]
    ContactNotDigits,

    #[error("Please enter a valid contact number (at least 7 digits).")]
    ContactTooShort,

    #[error("Please use a valid date and time with a 4-digit year (YYYY-MM-DDTHH:MM).")]
    ScheduleFormat,

    #[error("The provided schedule is invalid. Please pick a valid date and time.")]
    ScheduleInvalid,

    #[error("The selected date and time cannot be in the past")]
    ScheduleInPast,

    #[error("Payment must be a number")]
    PaymentInvalid,

    #[error("Please select a location on the map")]
    NoLocation,

    #[error("Please enter a valid rating between 1 and 5")]
    RatingOutOfRange,

    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Please upload a proof image before marking the task as done")]
    ProofRequired,

    #[error("You are not authorized to edit this task.")]
    NotPoster,

    #[error("You cannot report your own task.")]
    OwnTaskReport,

    #[error("Please select a report type")]
    MissingReportType,

    #[error("{0}")]
    Profile(String),
}

/// Errors from the task-detail controller.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("'{action}' is not available for this task")]
    NotOffered { action: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
