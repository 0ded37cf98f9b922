//! Error types for the gomeet ecosystem.

use thiserror::Error;

pub const BLANK_FIELDS_ALERT: &str = "Please fill in all required fields.";
pub const INVALID_DURATION_ALERT: &str = "Please input a valid duration: 0-23 hours 0-59 minutes";
pub const ZERO_DURATION_ALERT: &str = "Duration should be at least 1 minute";
pub const INVALID_EMAILS_ALERT: &str = "The email(s) you have entered are invalid";
pub const INVALID_TIME_ERROR: &str =
    "The dates and times entered should be unique and be in the future.";
pub const INVALID_TIME_PERIOD: &str =
    "Please enter a valid period: both times in the future, end later than start.";
pub const INSUFFICIENT_REQUEST_PARAM: &str =
    "Please provide all required parameters to the GET request";
pub const INVALID_PARAM_TYPE: &str = "Invalid parameter type";
pub const INVALID_PARAM_VALUE: &str = "Invalid parameter value. Please check that the parameters are of the correct format and range";
pub const UNABLE_TO_SUBMIT_MEETING: &str = "Unable to create the meeting event. Please try again.";

/// Errors that can occur in gomeet operations.
#[derive(Error, Debug)]
pub enum GoMeetError {
    /// A required input was empty. Carries the field name.
    #[error("{alert} (missing: {0})", alert = BLANK_FIELDS_ALERT)]
    BlankField(String),

    #[error("{0}")]
    InvalidValue(String),

    #[error("{alert}: {0}", alert = INSUFFICIENT_REQUEST_PARAM)]
    MissingParam(&'static str),

    #[error("{alert}: {0}", alert = INVALID_PARAM_TYPE)]
    InvalidParamType(&'static str),

    #[error("A location titled '{0}' has already been proposed")]
    DuplicateTitle(String),

    #[error("Maximum number of proposed locations: {0}")]
    MaxCandidatesReached(usize),

    #[error("Maximum number of proposed times: {0}")]
    MaxTimesReached(usize),

    #[error("{alert}", alert = INVALID_TIME_ERROR)]
    InvalidTime(String),

    #[error("{alert}", alert = INVALID_TIME_PERIOD)]
    InvalidPeriod,

    #[error("You have already voted for this option")]
    AlreadyVoted(String),

    #[error("You have used all {0} of your votes")]
    MaxVotesReached(usize),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("ERROR {status} {message}")]
    Remote { status: u16, message: String },

    #[error("{alert}", alert = UNABLE_TO_SUBMIT_MEETING)]
    SubmissionFailed,

    #[error("Please log in first: {0}")]
    NotLoggedIn(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GoMeetError {
    /// Errors caused by what the user typed. These abort only the current
    /// operation and leave the rest of the draft intact.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            GoMeetError::BlankField(_)
                | GoMeetError::InvalidValue(_)
                | GoMeetError::DuplicateTitle(_)
                | GoMeetError::MaxCandidatesReached(_)
                | GoMeetError::MaxTimesReached(_)
                | GoMeetError::InvalidTime(_)
                | GoMeetError::InvalidPeriod
        )
    }

    /// Caller contract violations. Never expected to reach an end user.
    pub fn is_programmatic(&self) -> bool {
        matches!(
            self,
            GoMeetError::MissingParam(_) | GoMeetError::InvalidParamType(_)
        )
    }
}

/// Result type alias for gomeet operations.
pub type GoMeetResult<T> = Result<T, GoMeetError>;
