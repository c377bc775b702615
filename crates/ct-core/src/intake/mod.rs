//! Public multi-step consultation request form.
//!
//! The form moves through four steps. Advancing is gated on the current
//! step validating; submission only happens from the consultation step and
//! hands the draft to the request store.
//!
//! ```text
//! Welcome → Contact → Consultation → Submitted
//! ```

pub mod options;
pub mod validate;

pub use options::{OTHER_STAGE, STAGE_OPTIONS, TOPIC_OPTIONS};
pub use validate::{validate_consultation, validate_contact, IntakeError};

use crate::store::{RequestStore, StoreError};
use chrono::{DateTime, Utc};
use ct_common::{Location, NewRequest, RequestId};
use ct_config::IntakePolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Message shown once a request has been stored.
pub const CONFIRMATION_MESSAGE: &str =
    "A member of the FirstRepair team will be in touch with you in the next 10 business days.";

/// Form step, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    Welcome,
    Contact,
    Consultation,
    Submitted,
}

impl FormStep {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Free-text fields of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    Organization,
    Email,
    Phone,
    OtherStageDetail,
    AdditionalContext,
}

/// Errors from submitting the form.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Invalid(#[from] IntakeError),

    #[error("Error: {0}")]
    Store(#[from] StoreError),
}

impl From<SubmitError> for ct_common::Error {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Invalid(invalid) => ct_common::Error::Intake(invalid.to_string()),
            SubmitError::Store(store) => ct_common::Error::Submission(store.to_string()),
        }
    }
}

/// State of one requester's pass through the form.
#[derive(Debug, Clone)]
pub struct IntakeForm {
    policy: IntakePolicy,
    step: FormStep,
    draft: NewRequest,
    captcha_token: Option<String>,
    step_error: Option<IntakeError>,
    message: Option<String>,
}

impl IntakeForm {
    pub fn new(policy: IntakePolicy) -> Self {
        Self {
            policy,
            step: FormStep::Welcome,
            draft: NewRequest::default(),
            captcha_token: None,
            step_error: None,
            message: None,
        }
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    pub fn draft(&self) -> &NewRequest {
        &self.draft
    }

    /// The validation error blocking the current step, if any.
    pub fn step_error(&self) -> Option<&IntakeError> {
        self.step_error.as_ref()
    }

    /// Outcome message of the last submission attempt.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_text(&mut self, field: TextField, value: impl Into<String>) {
        let value = value.into();
        let slot = match field {
            TextField::Name => &mut self.draft.name,
            TextField::Organization => &mut self.draft.organization,
            TextField::Email => &mut self.draft.email,
            TextField::Phone => &mut self.draft.phone,
            TextField::OtherStageDetail => &mut self.draft.other_stage_detail,
            TextField::AdditionalContext => &mut self.draft.additional_context,
        };
        *slot = value;
    }

    /// Choose the initiative stage. Moving off `Other` discards its detail.
    pub fn set_stage(&mut self, stage: impl Into<String>) {
        self.draft.stage = stage.into();
        if self.draft.stage != OTHER_STAGE {
            self.draft.other_stage_detail.clear();
        }
    }

    pub fn set_topics(&mut self, topics: Vec<String>) {
        self.draft.topics = topics;
    }

    pub fn set_location(&mut self, location: Option<Location>) {
        self.draft.location = location;
    }

    pub fn set_captcha_token(&mut self, token: Option<String>) {
        self.captcha_token = token.filter(|t| !t.trim().is_empty());
    }

    fn validate_step(&self) -> Result<(), IntakeError> {
        match self.step {
            FormStep::Contact => validate_contact(&self.draft),
            FormStep::Consultation => validate_consultation(&self.draft, &self.policy),
            FormStep::Welcome | FormStep::Submitted => Ok(()),
        }
    }

    fn record(&mut self, result: Result<(), IntakeError>) -> Result<(), IntakeError> {
        self.step_error = result.as_ref().err().cloned();
        result
    }

    /// Validate the current step and move forward.
    ///
    /// Only `Welcome` and `Contact` advance; leaving `Consultation` takes
    /// [`IntakeForm::submit`].
    pub fn next(&mut self) -> Result<FormStep, IntakeError> {
        let checked = self.validate_step();
        self.record(checked)?;
        self.step = match self.step {
            FormStep::Welcome => FormStep::Contact,
            FormStep::Contact => FormStep::Consultation,
            other => other,
        };
        debug!(step = ?self.step, "intake step advanced");
        Ok(self.step)
    }

    /// Move one step back, clearing any step error.
    pub fn back(&mut self) -> FormStep {
        self.step_error = None;
        self.step = match self.step {
            FormStep::Contact => FormStep::Welcome,
            FormStep::Consultation => FormStep::Contact,
            other => other,
        };
        self.step
    }

    fn check_submittable(&self) -> Result<(), IntakeError> {
        if self.step != FormStep::Consultation {
            return Err(IntakeError::NotReadyToSubmit);
        }
        if self.policy.require_captcha && self.captcha_token.is_none() {
            return Err(IntakeError::CaptchaRequired);
        }
        validate_contact(&self.draft)?;
        validate_consultation(&self.draft, &self.policy)
    }

    /// Store the request.
    ///
    /// On success the form is cleared and moves to `Submitted`. On failure
    /// the draft and step are kept so the requester can retry.
    pub fn submit<S: RequestStore + ?Sized>(
        &mut self,
        store: &S,
        now: DateTime<Utc>,
    ) -> Result<RequestId, SubmitError> {
        let checked = self.check_submittable();
        self.record(checked)?;

        match store.add(self.draft.clone(), now) {
            Ok(id) => {
                info!(%id, "intake form submitted");
                self.draft = NewRequest::default();
                self.captcha_token = None;
                self.step = FormStep::Submitted;
                self.message = Some(CONFIRMATION_MESSAGE.to_string());
                Ok(id)
            }
            Err(err) => {
                let err = SubmitError::Store(err);
                self.message = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Start over with an empty form.
    pub fn restart(&mut self) {
        *self = Self::new(self.policy);
    }
}

/// A complete set of form answers, as read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeAnswers {
    #[serde(flatten)]
    pub request: NewRequest,
    #[serde(default)]
    pub captcha_token: Option<String>,
}

/// Walk `answers` through every step of the form and submit them.
pub fn submit_answers<S: RequestStore + ?Sized>(
    policy: IntakePolicy,
    answers: IntakeAnswers,
    store: &S,
    now: DateTime<Utc>,
) -> Result<RequestId, SubmitError> {
    let IntakeAnswers {
        request,
        captcha_token,
    } = answers;

    let mut form = IntakeForm::new(policy);
    form.next()?;

    form.set_text(TextField::Name, request.name);
    form.set_text(TextField::Organization, request.organization);
    form.set_text(TextField::Email, request.email);
    form.set_text(TextField::Phone, request.phone);
    form.set_location(request.location);
    form.set_stage(request.stage);
    form.set_text(TextField::OtherStageDetail, request.other_stage_detail);
    form.next()?;

    form.set_topics(request.topics);
    form.set_text(TextField::AdditionalContext, request.additional_context);
    form.set_captcha_token(captcha_token);
    form.submit(store, now)
}
