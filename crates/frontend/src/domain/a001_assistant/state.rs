//! Assistant page state
//!
//! Everything the page shows lives in [`AssistantState`]. It is mutated only
//! through the operations below; the view model wraps it in a signal and
//! performs the HTTP calls that `begin_*` asks for.
//!
//! Each action (upload, chat, image analysis) owns a [`RequestSlot`]. Starting
//! an action issues a [`Ticket`] with the next sequence number, and only the
//! latest issued ticket may settle the slot. Late answers to older tickets are
//! dropped, so a slow first reply can never overwrite a faster second one.

use contracts::assistant::{ChatReply, ChatRequest, DiagnosisReply};
use serde::{Deserialize, Serialize};

use crate::shared::api_utils::ApiError;

/// Prompt sent with an image when the user leaves the prompt field empty
pub const DEFAULT_IMAGE_PROMPT: &str = "Describe any medical findings in this image.";

/// How long a toast stays on screen
pub const NOTIFICATION_TTL_MS: u32 = 3000;

pub const UPLOAD_SUCCESS_TEXT: &str = "Document uploaded successfully.";
pub const UPLOAD_FAILURE_TEXT: &str = "Document upload failed.";
pub const CHAT_FAILURE_TEXT: &str = "Error getting response";
pub const ANALYSIS_FAILURE_TEXT: &str = "Image analysis failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveTab {
    #[default]
    Document,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Upload,
    Chat,
    AnalyzeImage,
}

/// Proof that an action was started; handed back when it completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub action: Action,
    pub seq: u64,
}

/// In-flight bookkeeping for one action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSlot {
    issued: u64,
    settled: u64,
}

impl RequestSlot {
    pub fn is_loading(&self) -> bool {
        self.issued > self.settled
    }

    fn issue(&mut self, action: Action) -> Ticket {
        self.issued += 1;
        Ticket {
            action,
            seq: self.issued,
        }
    }

    /// Returns false when the ticket is no longer the latest one
    fn settle(&mut self, ticket: Ticket) -> bool {
        if ticket.seq != self.issued || !self.is_loading() {
            return false;
        }
        self.settled = ticket.seq;
        true
    }

    /// Abandon whatever is in flight; its completion will be stale
    fn supersede(&mut self) {
        self.settled = self.issued;
    }
}

/// What the state keeps about a picked file. The browser handle itself stays
/// in the view model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
    pub mime: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSelection {
    pub file: FileMeta,
    /// Object URL used for the `<img>` preview
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub text: String,
    pub ttl_ms: u32,
}

/// Image analysis the view model should send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub ticket: Ticket,
    pub prompt: String,
}

/// Result of handing a completion back to the state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The completion was the latest for its action and has been applied.
    /// Carries the toast it raised, if any, so a dismiss timer can be armed.
    Applied { notification: Option<Notification> },
    /// A newer request superseded this one; nothing changed
    Stale,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantState {
    pub active_tab: ActiveTab,

    pub document: Option<FileMeta>,
    pub question: String,
    pub answer: Option<String>,

    pub image: Option<ImageSelection>,
    pub image_prompt: String,
    pub diagnosis: Option<String>,

    pub notification: Option<Notification>,

    upload: RequestSlot,
    chat: RequestSlot,
    analysis: RequestSlot,
    last_notification_id: u64,
}

impl AssistantState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self, action: Action) -> bool {
        self.slot(action).is_loading()
    }

    /// The analyze button is enabled only with an image and no analysis running
    pub fn can_analyze(&self) -> bool {
        self.image.is_some() && !self.analysis.is_loading()
    }

    pub fn switch_tab(&mut self, tab: ActiveTab) {
        self.active_tab = tab;
    }

    pub fn set_question(&mut self, text: String) {
        self.question = text;
    }

    pub fn set_image_prompt(&mut self, text: String) {
        self.image_prompt = text;
    }

    pub fn select_document(&mut self, file: FileMeta) {
        self.document = Some(file);
    }

    /// Store a new image and drop the previous result.
    ///
    /// Returns the previous preview URL so the caller can revoke it.
    pub fn select_image(&mut self, file: FileMeta, preview_url: Option<String>) -> Option<String> {
        let previous = self
            .image
            .replace(ImageSelection { file, preview_url })
            .and_then(|old| old.preview_url);
        self.diagnosis = None;
        if self.analysis.is_loading() {
            log::debug!("image replaced while analysis was running; its result will be dropped");
        }
        self.analysis.supersede();
        previous
    }

    // ------------------------------------------------------------------
    // Upload
    // ------------------------------------------------------------------

    pub fn begin_upload(&mut self) -> Option<Ticket> {
        self.document.as_ref()?;
        Some(self.upload.issue(Action::Upload))
    }

    pub fn finish_upload(&mut self, ticket: Ticket, result: Result<(), ApiError>) -> Outcome {
        if !self.upload.settle(ticket) {
            if let Err(e) = &result {
                log::warn!("stale upload #{} failed: {}", ticket.seq, e);
            }
            return Outcome::Stale;
        }
        let notification = match result {
            Ok(()) => self.notify(NotificationKind::Success, UPLOAD_SUCCESS_TEXT),
            Err(e) => {
                log::error!("Upload failed: {}", e);
                self.notify(NotificationKind::Error, UPLOAD_FAILURE_TEXT)
            }
        };
        Outcome::Applied {
            notification: Some(notification),
        }
    }

    // ------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------

    pub fn begin_chat(&mut self) -> Option<(Ticket, ChatRequest)> {
        if self.question.is_empty() {
            return None;
        }
        let ticket = self.chat.issue(Action::Chat);
        Some((
            ticket,
            ChatRequest {
                message: self.question.clone(),
            },
        ))
    }

    pub fn finish_chat(&mut self, ticket: Ticket, result: Result<ChatReply, ApiError>) -> Outcome {
        if !self.chat.settle(ticket) {
            log::warn!("dropping stale chat reply #{}", ticket.seq);
            return Outcome::Stale;
        }
        match result {
            Ok(reply) => {
                self.answer = Some(reply.reply);
                Outcome::Applied { notification: None }
            }
            Err(e) => {
                log::error!("Chat failed: {}", e);
                Outcome::Applied {
                    notification: Some(self.notify(NotificationKind::Error, CHAT_FAILURE_TEXT)),
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Image analysis
    // ------------------------------------------------------------------

    /// Prompt that goes out with the next analysis
    pub fn effective_prompt(&self) -> &str {
        if self.image_prompt.is_empty() {
            DEFAULT_IMAGE_PROMPT
        } else {
            &self.image_prompt
        }
    }

    pub fn begin_analysis(&mut self) -> Option<AnalysisRequest> {
        if !self.can_analyze() {
            return None;
        }
        let prompt = self.effective_prompt().to_string();
        Some(AnalysisRequest {
            ticket: self.analysis.issue(Action::AnalyzeImage),
            prompt,
        })
    }

    pub fn finish_analysis(
        &mut self,
        ticket: Ticket,
        result: Result<DiagnosisReply, ApiError>,
    ) -> Outcome {
        if !self.analysis.settle(ticket) {
            log::warn!("dropping stale image analysis #{}", ticket.seq);
            return Outcome::Stale;
        }
        match result {
            Ok(reply) => {
                self.diagnosis = Some(reply.diagnosis);
                Outcome::Applied { notification: None }
            }
            Err(e) => {
                log::error!("Image analysis failed: {}", e);
                Outcome::Applied {
                    notification: Some(
                        self.notify(NotificationKind::Error, ANALYSIS_FAILURE_TEXT),
                    ),
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    /// Show a toast, replacing the current one
    pub fn notify(&mut self, kind: NotificationKind, text: impl Into<String>) -> Notification {
        self.last_notification_id += 1;
        let notification = Notification {
            id: self.last_notification_id,
            kind,
            text: text.into(),
            ttl_ms: NOTIFICATION_TTL_MS,
        };
        self.notification = Some(notification.clone());
        notification
    }

    /// Clear the toast if it is still the one with `id`
    pub fn dismiss_notification(&mut self, id: u64) -> bool {
        match &self.notification {
            Some(current) if current.id == id => {
                self.notification = None;
                true
            }
            _ => false,
        }
    }

    fn slot(&self, action: Action) -> &RequestSlot {
        match action {
            Action::Upload => &self.upload,
            Action::Chat => &self.chat,
            Action::AnalyzeImage => &self.analysis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str, mime: &str) -> FileMeta {
        FileMeta {
            name: name.to_string(),
            size: 1024,
            mime: mime.to_string(),
        }
    }

    fn network_error() -> ApiError {
        ApiError::Network("connection refused".to_string())
    }

    fn reply(text: &str) -> ChatReply {
        ChatReply {
            reply: text.to_string(),
        }
    }

    fn diagnosis(text: &str) -> DiagnosisReply {
        DiagnosisReply {
            diagnosis: text.to_string(),
        }
    }

    fn notification_of(outcome: Outcome) -> Notification {
        match outcome {
            Outcome::Applied {
                notification: Some(n),
            } => n,
            other => panic!("expected a notification, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_inputs_are_noops() {
        let mut state = AssistantState::new();
        let before = state.clone();

        assert_eq!(state.begin_upload(), None);
        assert_eq!(state.begin_chat(), None);
        assert_eq!(state.begin_analysis(), None);

        assert_eq!(state, before);
        assert!(state.notification.is_none());
    }

    #[test]
    fn test_upload_success_raises_success_toast() {
        let mut state = AssistantState::new();
        state.select_document(meta("labs.pdf", "application/pdf"));

        let ticket = state.begin_upload().unwrap();
        assert!(state.is_loading(Action::Upload));

        let n = notification_of(state.finish_upload(ticket, Ok(())));
        assert!(!state.is_loading(Action::Upload));
        assert_eq!(n.kind, NotificationKind::Success);
        assert_eq!(n.text, UPLOAD_SUCCESS_TEXT);
        assert_eq!(n.ttl_ms, 3000);
        assert_eq!(state.notification, Some(n));
    }

    #[test]
    fn test_upload_failure_raises_error_toast_and_releases_flag() {
        let mut state = AssistantState::new();
        state.select_document(meta("notes.txt", "text/plain"));

        let ticket = state.begin_upload().unwrap();
        let n = notification_of(state.finish_upload(
            ticket,
            Err(ApiError::from_status(400, r#"{"error": "No file uploaded"}"#)),
        ));
        assert!(!state.is_loading(Action::Upload));
        assert_eq!(n.kind, NotificationKind::Error);
        assert_eq!(n.text, UPLOAD_FAILURE_TEXT);
        // the document stays selected for another attempt
        assert!(state.document.is_some());
    }

    #[test]
    fn test_chat_success_stores_reply_exactly() {
        let mut state = AssistantState::new();
        state.set_question("Any allergies?".to_string());

        let (ticket, request) = state.begin_chat().unwrap();
        assert_eq!(request.message, "Any allergies?");
        assert!(state.is_loading(Action::Chat));

        let outcome = state.finish_chat(ticket, Ok(reply("  Penicillin.\n")));
        assert_eq!(outcome, Outcome::Applied { notification: None });
        assert_eq!(state.answer.as_deref(), Some("  Penicillin.\n"));
        assert!(!state.is_loading(Action::Chat));
        // the question is kept after submission
        assert_eq!(state.question, "Any allergies?");
    }

    #[test]
    fn test_chat_failure_keeps_previous_answer() {
        let mut state = AssistantState::new();
        state.set_question("Blood pressure?".to_string());
        let (ticket, _) = state.begin_chat().unwrap();
        state.finish_chat(ticket, Ok(reply("120/80")));

        let (ticket, _) = state.begin_chat().unwrap();
        let n = notification_of(state.finish_chat(ticket, Err(network_error())));

        assert_eq!(n.text, CHAT_FAILURE_TEXT);
        assert_eq!(state.answer.as_deref(), Some("120/80"));
        assert!(!state.is_loading(Action::Chat));
    }

    #[test]
    fn test_stale_chat_reply_is_dropped() {
        let mut state = AssistantState::new();
        state.set_question("first".to_string());
        let (first, _) = state.begin_chat().unwrap();
        state.set_question("second".to_string());
        let (second, _) = state.begin_chat().unwrap();
        assert!(second.seq > first.seq);

        assert_eq!(state.finish_chat(second, Ok(reply("answer two"))), Outcome::Applied { notification: None });
        assert!(!state.is_loading(Action::Chat));

        assert_eq!(state.finish_chat(first, Ok(reply("answer one"))), Outcome::Stale);
        assert_eq!(state.answer.as_deref(), Some("answer two"));
        assert!(!state.is_loading(Action::Chat));
    }

    #[test]
    fn test_early_stale_reply_keeps_flag_until_latest_settles() {
        let mut state = AssistantState::new();
        state.set_question("q".to_string());
        let (first, _) = state.begin_chat().unwrap();
        let (second, _) = state.begin_chat().unwrap();

        assert_eq!(state.finish_chat(first, Err(network_error())), Outcome::Stale);
        assert!(state.is_loading(Action::Chat));
        assert!(state.notification.is_none());

        state.finish_chat(second, Ok(reply("done")));
        assert!(!state.is_loading(Action::Chat));
        assert_eq!(state.answer.as_deref(), Some("done"));
    }

    #[test]
    fn test_settling_twice_is_stale() {
        let mut state = AssistantState::new();
        state.select_document(meta("a.txt", "text/plain"));
        let ticket = state.begin_upload().unwrap();

        assert!(matches!(state.finish_upload(ticket, Ok(())), Outcome::Applied { .. }));
        assert_eq!(state.finish_upload(ticket, Ok(())), Outcome::Stale);
    }

    #[test]
    fn test_prompt_defaults_when_empty() {
        let mut state = AssistantState::new();
        state.select_image(meta("ct.png", "image/png"), None);

        let request = state.begin_analysis().unwrap();
        assert_eq!(request.prompt, DEFAULT_IMAGE_PROMPT);
        state.finish_analysis(request.ticket, Ok(diagnosis("ok")));

        state.set_image_prompt("Look for nodules in the left lung".to_string());
        let request = state.begin_analysis().unwrap();
        assert_eq!(request.prompt, "Look for nodules in the left lung");
    }

    #[test]
    fn test_analysis_is_blocked_while_pending() {
        let mut state = AssistantState::new();
        state.select_image(meta("mri.jpg", "image/jpeg"), None);

        let request = state.begin_analysis().unwrap();
        assert!(!state.can_analyze());
        assert_eq!(state.begin_analysis(), None);

        state.finish_analysis(request.ticket, Err(network_error()));
        assert!(state.can_analyze());
    }

    #[test]
    fn test_analysis_failure_keeps_previous_diagnosis() {
        let mut state = AssistantState::new();
        state.select_image(meta("knee.png", "image/png"), None);
        let request = state.begin_analysis().unwrap();
        state.finish_analysis(request.ticket, Ok(diagnosis("Mild effusion.")));

        let request = state.begin_analysis().unwrap();
        let n = notification_of(state.finish_analysis(request.ticket, Err(network_error())));
        assert_eq!(n.text, ANALYSIS_FAILURE_TEXT);
        assert_eq!(state.diagnosis.as_deref(), Some("Mild effusion."));
        assert!(!state.is_loading(Action::AnalyzeImage));
    }

    #[test]
    fn test_new_image_clears_diagnosis_and_returns_old_preview() {
        let mut state = AssistantState::new();
        let previous = state.select_image(meta("a.png", "image/png"), Some("blob:a".to_string()));
        assert_eq!(previous, None);

        let request = state.begin_analysis().unwrap();
        state.finish_analysis(request.ticket, Ok(diagnosis("Normal study.")));
        assert!(state.diagnosis.is_some());

        let previous = state.select_image(meta("b.png", "image/png"), Some("blob:b".to_string()));
        assert_eq!(previous.as_deref(), Some("blob:a"));
        assert_eq!(state.diagnosis, None);
        assert_eq!(
            state.image.as_ref().and_then(|i| i.preview_url.as_deref()),
            Some("blob:b")
        );
    }

    #[test]
    fn test_new_image_drops_result_for_old_image() {
        let mut state = AssistantState::new();
        state.select_image(meta("old.png", "image/png"), None);
        let request = state.begin_analysis().unwrap();

        state.select_image(meta("new.png", "image/png"), None);
        assert!(!state.is_loading(Action::AnalyzeImage));
        assert!(state.can_analyze());

        assert_eq!(
            state.finish_analysis(request.ticket, Ok(diagnosis("for the old image"))),
            Outcome::Stale
        );
        assert_eq!(state.diagnosis, None);
    }

    #[test]
    fn test_switching_tabs_preserves_everything_else() {
        let mut state = AssistantState::new();
        state.set_question("Summarize discharge notes".to_string());
        let (ticket, _) = state.begin_chat().unwrap();
        state.finish_chat(ticket, Ok(reply("Discharged on day 3.")));
        state.select_image(meta("chest.png", "image/png"), None);
        state.set_image_prompt("Check for pneumonia".to_string());
        let request = state.begin_analysis().unwrap();
        state.finish_analysis(request.ticket, Ok(diagnosis("Clear lungs.")));

        let before = state.clone();
        state.switch_tab(ActiveTab::Image);
        assert_eq!(state.active_tab, ActiveTab::Image);
        state.switch_tab(ActiveTab::Document);

        assert_eq!(state, before);
    }

    #[test]
    fn test_xray_scenario() {
        let mut state = AssistantState::new();
        state.switch_tab(ActiveTab::Image);
        state.select_image(meta("xray.png", "image/png"), Some("blob:xray".to_string()));

        let request = state.begin_analysis().unwrap();
        assert_eq!(request.prompt, DEFAULT_IMAGE_PROMPT);
        assert!(state.is_loading(Action::AnalyzeImage));

        let outcome = state.finish_analysis(request.ticket, Ok(diagnosis("No fracture detected.")));
        assert_eq!(outcome, Outcome::Applied { notification: None });
        assert_eq!(state.diagnosis.as_deref(), Some("No fracture detected."));
        assert!(!state.is_loading(Action::AnalyzeImage));
    }

    #[test]
    fn test_actions_are_independent() {
        let mut state = AssistantState::new();
        state.select_document(meta("labs.pdf", "application/pdf"));
        state.set_question("HbA1c?".to_string());
        state.select_image(meta("eye.png", "image/png"), None);

        let upload = state.begin_upload().unwrap();
        let (chat, _) = state.begin_chat().unwrap();
        let analysis = state.begin_analysis().unwrap();
        assert!(state.is_loading(Action::Upload));
        assert!(state.is_loading(Action::Chat));
        assert!(state.is_loading(Action::AnalyzeImage));

        state.finish_chat(chat, Ok(reply("7.2%")));
        assert!(state.is_loading(Action::Upload));
        assert!(state.is_loading(Action::AnalyzeImage));

        state.finish_analysis(analysis.ticket, Ok(diagnosis("No retinopathy.")));
        state.finish_upload(upload, Ok(()));
        assert!(!state.is_loading(Action::Upload));
        assert_eq!(state.answer.as_deref(), Some("7.2%"));
        assert_eq!(state.diagnosis.as_deref(), Some("No retinopathy."));
    }

    #[test]
    fn test_dismiss_only_clears_matching_notification() {
        let mut state = AssistantState::new();
        let first = state.notify(NotificationKind::Success, "one");
        let second = state.notify(NotificationKind::Error, "two");
        assert_ne!(first.id, second.id);

        // the first toast's timer firing late must not hide the second
        assert!(!state.dismiss_notification(first.id));
        assert_eq!(state.notification.as_ref().map(|n| n.text.as_str()), Some("two"));

        assert!(state.dismiss_notification(second.id));
        assert!(state.notification.is_none());
    }

    #[test]
    fn test_state_serializes() {
        let mut state = AssistantState::new();
        state.switch_tab(ActiveTab::Image);
        state.set_image_prompt("Describe".to_string());

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["active_tab"], "image");
        assert_eq!(json["image_prompt"], "Describe");

        let back: AssistantState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
