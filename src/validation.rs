//! Timer form validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_TITLE_LENGTH: usize = 50;
pub const MAX_DURATION_SECONDS: i64 = 24 * 60 * 60;

/// Raw fields of the create/edit form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hours: i64,
    #[serde(default)]
    pub minutes: i64,
    #[serde(default)]
    pub seconds: i64,
}

/// First rule a form broke, with the message shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required")]
    TitleRequired,
    #[error("Title must be less than 50 characters")]
    TitleTooLong,
    #[error("Time values cannot be negative")]
    NegativeTime,
    #[error("Minutes and seconds must be between 0 and 59")]
    OutOfRange,
    #[error("Please set a time greater than 0")]
    ZeroDuration,
    #[error("Timer cannot exceed 24 hours")]
    TooLong,
}

impl TimerForm {
    /// Total duration in seconds, unchecked
    pub fn total_seconds(&self) -> i64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }
}

/// Check the form and return its duration in seconds
pub fn check_timer_form(form: &TimerForm) -> Result<u64, ValidationError> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong);
    }
    if form.hours < 0 || form.minutes < 0 || form.seconds < 0 {
        return Err(ValidationError::NegativeTime);
    }
    if form.minutes > 59 || form.seconds > 59 {
        return Err(ValidationError::OutOfRange);
    }

    let total = form.total_seconds();
    if total == 0 {
        return Err(ValidationError::ZeroDuration);
    }
    if total > MAX_DURATION_SECONDS {
        return Err(ValidationError::TooLong);
    }
    // Non-negative and bounded by the checks above
    Ok(total as u64)
}

/// Boolean form of [`check_timer_form`]; the failure message goes to `emit`
pub fn validate(form: &TimerForm, mut emit: impl FnMut(&str)) -> bool {
    match check_timer_form(form) {
        Ok(_) => true,
        Err(e) => {
            emit(&e.to_string());
            false
        }
    }
}
