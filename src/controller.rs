//! Client-side interaction state machine.
//!
//! One [`InteractionController`] exists per UI session. It moves between
//! [`Phase::Idle`] and [`Phase::Generating`]; success and failure are
//! transient outcomes that raise a [`Notification`] and return to idle.
//!
//! Hosts that await the model outside the controller (for example with the
//! controller behind a lock that must not be held across the await) use
//! [`InteractionController::begin`] and [`InteractionController::finish`].
//! Everyone else calls [`InteractionController::submit`].

use crate::error::Result;
use crate::export::{DEFAULT_EXPORT_FILE_NAME, ScriptArtifact};
use crate::invoker::Invoker;
use crate::operations::{Operations, ScriptGenerationRequest, ScriptImprovementRequest};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, info, warn};

/// Submission ids are unique across every session in the process
static NEXT_SUBMISSION_ID: AtomicU64 = AtomicU64::new(1);

/// User-facing message stored when any call fails
pub const FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Shown in the result area after a failure
pub const FAILURE_PLACEHOLDER: &str =
    "-- An error occurred while generating the script. Please check the logs for details.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Generating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationLevel {
    Success,
    Failure,
    Warning,
    Info,
}

/// A toast-style message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    fn new(level: NotificationLevel, title: &str, description: &str) -> Self {
        Self {
            level,
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

/// Form input from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitEvent {
    Generate(ScriptGenerationRequest),
    Improve(ScriptImprovementRequest),
}

impl SubmitEvent {
    fn form_text(&self) -> &str {
        match self {
            SubmitEvent::Generate(request) => &request.prompt,
            SubmitEvent::Improve(request) => &request.improvement_description,
        }
    }

    fn success_notification(&self) -> Notification {
        match self {
            SubmitEvent::Generate(_) => Notification::new(
                NotificationLevel::Success,
                "Script Generated!",
                "Your FiveM script has been successfully generated.",
            ),
            SubmitEvent::Improve(_) => Notification::new(
                NotificationLevel::Success,
                "Script Improved!",
                "Your FiveM script has been successfully improved.",
            ),
        }
    }

    fn failure_notification(&self) -> Notification {
        let title = match self {
            SubmitEvent::Generate(_) => "Error Generating Script",
            SubmitEvent::Improve(_) => "Error Improving Script",
        };
        Notification::new(NotificationLevel::Failure, title, FAILURE_MESSAGE)
    }

    /// Run the matching operation and reduce its result to display text
    pub async fn dispatch(self, invoker: &Invoker, operations: &Operations) -> Result<String> {
        match self {
            SubmitEvent::Generate(request) => invoker
                .invoke(&operations.generate, request)
                .await
                .map(|result| result.code),
            SubmitEvent::Improve(request) => invoker
                .invoke(&operations.improve, request)
                .await
                .map(|result| result.improved_script),
        }
    }
}

/// Handle for the single in-flight call of a session
#[must_use = "an accepted submission must be passed back to finish()"]
#[derive(Debug)]
pub struct Submission {
    id: u64,
    event: SubmitEvent,
}

impl Submission {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn event(&self) -> &SubmitEvent {
        &self.event
    }
}

/// Outcome of [`InteractionController::submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    /// The call ran and the controller is idle again
    Completed,
    /// A call was already in flight; nothing changed
    Rejected,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionState {
    pub prompt_text: String,
    pub is_generating: bool,
    pub last_result: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub struct InteractionController {
    state: InteractionState,
    in_flight: Option<u64>,
    export_file_name: String,
    notifications: Vec<Notification>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::with_export_file_name(DEFAULT_EXPORT_FILE_NAME)
    }

    pub fn with_export_file_name(file_name: impl Into<String>) -> Self {
        Self {
            state: InteractionState::default(),
            in_flight: None,
            export_file_name: file_name.into(),
            notifications: Vec::new(),
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight.is_some() {
            Phase::Generating
        } else {
            Phase::Idle
        }
    }

    /// The stored result, if it holds any text
    fn result(&self) -> Option<&str> {
        self.state.last_result.as_deref().filter(|text| !text.is_empty())
    }

    /// Text for the result area: the result, the failure placeholder, or nothing
    pub fn display_text(&self) -> Option<&str> {
        match (self.result(), &self.state.last_error) {
            (Some(result), _) => Some(result),
            (None, Some(_)) => Some(FAILURE_PLACEHOLDER),
            (None, None) => None,
        }
    }

    /// Whether the export action is currently available
    pub fn can_export(&self) -> bool {
        self.in_flight.is_none() && self.result().is_some()
    }

    /// Drain pending notifications, oldest first
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Accept a submission if idle. Clears the previous result and error.
    ///
    /// Returns `None` without touching any state while a call is in flight.
    pub fn begin(&mut self, event: SubmitEvent) -> Option<Submission> {
        if let Some(id) = self.in_flight {
            debug!("Ignoring submit while submission {} is in flight", id);
            return None;
        }

        let id = NEXT_SUBMISSION_ID.fetch_add(1, Ordering::Relaxed);
        self.in_flight = Some(id);
        self.state = InteractionState {
            prompt_text: event.form_text().to_string(),
            is_generating: true,
            last_result: None,
            last_error: None,
        };

        debug!("Submission {} started", id);
        Some(Submission { id, event })
    }

    /// Record the outcome of `submission` and return to idle
    pub fn finish(&mut self, submission: Submission, outcome: Result<String>) {
        if self.in_flight != Some(submission.id) {
            warn!("Discarding outcome of stale submission {}", submission.id);
            return;
        }

        self.in_flight = None;
        self.state.is_generating = false;

        match outcome {
            Ok(text) => {
                info!(
                    "Submission {} succeeded ({} bytes)",
                    submission.id,
                    text.len()
                );
                self.state.last_result = Some(text);
                self.notifications
                    .push(submission.event.success_notification());
            }
            Err(e) => {
                error!("Submission {} failed: {}", submission.id, e);
                self.state.last_error = Some(FAILURE_MESSAGE.to_string());
                self.notifications
                    .push(submission.event.failure_notification());
            }
        }
    }

    /// Submit, run the call, and record its outcome
    pub async fn submit(
        &mut self,
        invoker: &Invoker,
        operations: &Operations,
        event: SubmitEvent,
    ) -> SubmitStatus {
        let Some(submission) = self.begin(event) else {
            return SubmitStatus::Rejected;
        };

        let outcome = submission.event.clone().dispatch(invoker, operations).await;
        self.finish(submission, outcome);
        SubmitStatus::Completed
    }

    /// Package the stored result for download
    pub fn export(&mut self) -> Option<ScriptArtifact> {
        if !self.can_export() {
            warn!("Export requested with no result available");
            self.notifications.push(Notification::new(
                NotificationLevel::Warning,
                "No Code to Download",
                "Please generate a script first.",
            ));
            return None;
        }

        let content = self.result().unwrap_or_default().to_string();

        let artifact = ScriptArtifact::new(self.export_file_name.clone(), content);
        self.notifications.push(Notification::new(
            NotificationLevel::Info,
            "Download Started",
            "Your script is being downloaded.",
        ));
        info!("Exporting result as {}", artifact.file_name);
        Some(artifact)
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}
