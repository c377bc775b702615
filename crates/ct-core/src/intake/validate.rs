//! Per-step validation of the intake form.
//!
//! Checks run in a fixed order and stop at the first failure; the message
//! of that failure is what the requester sees.

use super::options::{is_known_stage, is_known_topic, OTHER_STAGE};
use ct_common::NewRequest;
use ct_config::IntakePolicy;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("regex"));

/// A validation failure shown to the requester.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("Name is required")]
    NameRequired,

    #[error("Email is required")]
    EmailRequired,

    #[error("Location is required")]
    LocationRequired,

    #[error("Please select a stage of reparations initiative")]
    StageRequired,

    #[error("Unknown stage of reparations initiative: {0}")]
    UnknownStage(String),

    #[error("Please elaborate on the stage of your reparations initiative")]
    StageDetailRequired,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please select at least one topic of interest")]
    TopicRequired,

    #[error("Please select at most {max} topics")]
    TooManyTopics { max: usize },

    #[error("Unknown consultation topic: {0}")]
    UnknownTopic(String),

    #[error("Please provide additional context about your consultation needs")]
    ContextRequired,

    #[error("Please complete the CAPTCHA before submitting.")]
    CaptchaRequired,

    #[error("the form can only be submitted from the consultation step")]
    NotReadyToSubmit,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Contact step: who is asking and where their initiative stands.
pub fn validate_contact(draft: &NewRequest) -> Result<(), IntakeError> {
    if draft.name.trim().is_empty() {
        return Err(IntakeError::NameRequired);
    }
    if draft.email.trim().is_empty() {
        return Err(IntakeError::EmailRequired);
    }
    if draft.location.is_none() {
        return Err(IntakeError::LocationRequired);
    }
    if draft.stage.is_empty() {
        return Err(IntakeError::StageRequired);
    }
    if !is_known_stage(&draft.stage) {
        return Err(IntakeError::UnknownStage(draft.stage.clone()));
    }
    if draft.stage == OTHER_STAGE && draft.other_stage_detail.trim().is_empty() {
        return Err(IntakeError::StageDetailRequired);
    }
    if !is_valid_email(&draft.email) {
        return Err(IntakeError::InvalidEmail);
    }
    Ok(())
}

/// Consultation step: what the consultation should cover.
pub fn validate_consultation(draft: &NewRequest, policy: &IntakePolicy) -> Result<(), IntakeError> {
    if draft.topics.is_empty() {
        return Err(IntakeError::TopicRequired);
    }
    if draft.topics.len() > policy.max_topics {
        return Err(IntakeError::TooManyTopics {
            max: policy.max_topics,
        });
    }
    if let Some(unknown) = draft.topics.iter().find(|t| !is_known_topic(t)) {
        return Err(IntakeError::UnknownTopic(unknown.clone()));
    }
    if draft.additional_context.trim().is_empty() {
        return Err(IntakeError::ContextRequired);
    }
    Ok(())
}
